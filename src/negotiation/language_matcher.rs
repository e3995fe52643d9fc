// ./src/negotiation/language_matcher.rs

use super::header_values::AcceptLanguageHeaderValue;
use super::ranking::rank;

/// Chooses a content language from the languages the application supports.
#[derive(Debug, Clone)]
pub struct LanguageMatcher {
    supported: Vec<String>,
}

impl LanguageMatcher {
    /// `supported` is in preference order; a `*` request gets the first entry.
    pub fn new<I, S>(supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supported: supported.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supported_languages(&self) -> &[String] {
        &self.supported
    }

    /// Best supported language for the ranked `Accept-Language` values.
    ///
    /// Tags are truncated one `-` segment at a time until something matches,
    /// so `en-US-123` falls back to `en-US` and then `en`.
    pub fn best_language(&self, headers: &[AcceptLanguageHeaderValue]) -> Option<String> {
        for header in rank(headers) {
            if header.is_wildcard() {
                return self.supported.first().cloned();
            }

            let segments: Vec<&str> = header.language().split('-').collect();
            for len in (1..=segments.len()).rev() {
                let candidate = segments[..len].join("-");
                if let Some(found) = self
                    .supported
                    .iter()
                    .find(|supported| supported.eq_ignore_ascii_case(&candidate))
                {
                    return Some(found.clone());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn languages(raw: &str) -> Vec<AcceptLanguageHeaderValue> {
        AcceptLanguageHeaderValue::parse_list(raw).unwrap()
    }

    #[rstest]
    #[case(&["en-US"], "en-US-123;q=1", Some("en-US"))]
    #[case(&["en"], "en-US-123", Some("en"))]
    #[case(&["en-US"], "EN-us", Some("en-US"))]
    #[case(&["fr", "en"], "de, en;q=0.5", Some("en"))]
    #[case(&["fr", "en"], "*", Some("fr"))]
    #[case(&["fr", "en"], "*;q=0.1, en", Some("en"))]
    #[case(&["en"], "en;q=0", None)]
    #[case(&["en"], "de", None)]
    fn best_language(#[case] supported: &[&str], #[case] header: &str, #[case] expected: Option<&str>) {
        let matcher = LanguageMatcher::new(supported.iter().copied());
        assert_eq!(matcher.best_language(&languages(header)).as_deref(), expected);
    }

    #[test]
    fn no_header_no_language() {
        assert_eq!(LanguageMatcher::new(["en"]).best_language(&[]), None);
    }

    #[test]
    fn truncation_does_not_split_inside_segments() {
        let matcher = LanguageMatcher::new(["e"]);
        assert_eq!(matcher.best_language(&languages("en-US")), None);
    }

    #[test]
    fn wildcard_with_no_supported_languages() {
        assert_eq!(LanguageMatcher::new(Vec::<String>::new()).best_language(&languages("*")), None);
    }
}
