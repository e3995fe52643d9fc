// ./src/negotiation/ranking.rs

use super::header_values::{HeaderValueWithQualityScore, MediaTypeHeader};
use std::cmp::Ordering;

/// Orders header values by client preference.
///
/// Zero-quality values are dropped. The rest sort by quality descending, then
/// by specificity descending (`*/*` < `type/*` < `type/subtype`, `*` < token).
/// The sort is stable, so exact ties keep header order and re-ranking a ranked
/// list is a no-op.
pub fn rank<H>(headers: &[H]) -> Vec<H>
where
    H: HeaderValueWithQualityScore + Clone,
{
    let mut ranked: Vec<H> = headers
        .iter()
        .filter(|header| header.quality() > 0.0)
        .cloned()
        .collect();

    ranked.sort_by(compare);
    ranked
}

/// Ranks media type candidates when their kind carries quality scores;
/// unscored candidates (a `Content-Type`) are returned as given.
pub fn rank_media_types<H: MediaTypeHeader>(headers: &[H]) -> Vec<H> {
    if !H::QUALITY_SCORED {
        return headers.to_vec();
    }
    let mut ranked: Vec<H> = headers
        .iter()
        .filter(|header| header.quality_score() > 0.0)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        by_preference(
            (a.quality_score(), a.specificity_score()),
            (b.quality_score(), b.specificity_score()),
        )
    });
    ranked
}

pub(crate) fn compare<H: HeaderValueWithQualityScore>(a: &H, b: &H) -> Ordering {
    by_preference((a.quality(), a.specificity()), (b.quality(), b.specificity()))
}

fn by_preference((a_quality, a_specificity): (f32, u8), (b_quality, b_specificity): (f32, u8)) -> Ordering {
    b_quality
        .partial_cmp(&a_quality)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b_specificity.cmp(&a_specificity))
}
