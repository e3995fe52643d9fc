// ./src/negotiation/header_values.rs

use crate::error::HeaderError;
use indexmap::IndexMap;
use std::fmt;

// ════════════════════════════════════════════════════════════
// 1. Shared traits
// ════════════════════════════════════════════════════════════

/// A header value carrying a client preference weight (`q`).
pub trait HeaderValueWithQualityScore {
    fn quality(&self) -> f32;

    /// Higher is more specific. Wildcards rank below concrete values at equal quality.
    fn specificity(&self) -> u8;
}

/// A header value that names a media type; implemented by both `Accept`
/// entries (quality scored) and `Content-Type` values (not scored).
pub trait MediaTypeHeader: Clone {
    /// Whether candidates of this kind are ranked before matching.
    const QUALITY_SCORED: bool;

    fn media_type_value(&self) -> &MediaTypeHeaderValue;

    fn quality_score(&self) -> f32 {
        1.0
    }

    fn specificity_score(&self) -> u8 {
        self.media_type_value().specificity()
    }
}

// ════════════════════════════════════════════════════════════
// 2. Media types
// ════════════════════════════════════════════════════════════

/// `type/subtype` plus ordered parameters, e.g. `text/html; charset=utf-8`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTypeHeaderValue {
    media_type: String,
    type_: String,
    sub_type: String,
    suffix: Option<String>,
    parameters: IndexMap<String, String>,
}

/// A request's `Content-Type`: a media type without a quality score.
pub type ContentTypeHeaderValue = MediaTypeHeaderValue;

impl MediaTypeHeaderValue {
    /// Builds a value from a bare media type and already-parsed parameters.
    pub fn new(
        media_type: &str,
        parameters: IndexMap<String, String>,
    ) -> Result<Self, HeaderError> {
        let media_type = media_type.trim();
        let (type_, sub_type) = media_type
            .split_once('/')
            .filter(|(t, s)| is_token(t) && is_token(s) && (*t != "*" || *s == "*"))
            .ok_or_else(|| HeaderError::InvalidMediaType(media_type.to_owned()))?;

        let suffix = sub_type
            .split_once('+')
            .map(|(_, suffix)| suffix.to_owned())
            .filter(|suffix| !suffix.is_empty());

        Ok(Self {
            media_type: media_type.to_owned(),
            type_: type_.to_owned(),
            sub_type: sub_type.to_owned(),
            suffix,
            parameters,
        })
    }

    /// Parses `type/subtype; key=value; ...`.
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        let mut segments = split_unquoted(value, ';').into_iter();
        let media_type = segments.next().unwrap_or_default();
        Self::new(media_type, parse_parameters(segments))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Structured syntax suffix, e.g. `json` for `application/vnd.api+json`.
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset").filter(|c| !c.is_empty())
    }

    pub fn specificity(&self) -> u8 {
        match (self.type_.as_str(), self.sub_type.as_str()) {
            ("*", "*") => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }

    /// Whether this (possibly wildcarded) value accepts the concrete `type/subtype`.
    pub fn matches(&self, concrete: &str) -> bool {
        let Some((type_, sub_type)) = concrete.split_once('/') else {
            return false;
        };
        if self.type_ == "*" && self.sub_type == "*" {
            return true;
        }
        self.type_.eq_ignore_ascii_case(type_)
            && (self.sub_type == "*" || self.sub_type.eq_ignore_ascii_case(sub_type))
    }
}

impl MediaTypeHeader for MediaTypeHeaderValue {
    const QUALITY_SCORED: bool = false;

    fn media_type_value(&self) -> &MediaTypeHeaderValue {
        self
    }
}

impl fmt::Display for MediaTypeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        write_parameters(f, &self.parameters)
    }
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptMediaTypeHeaderValue {
    value: MediaTypeHeaderValue,
    quality: f32,
}

impl AcceptMediaTypeHeaderValue {
    pub fn new(value: MediaTypeHeaderValue, quality: f32) -> Result<Self, HeaderError> {
        Ok(Self {
            value,
            quality: check_quality(quality)?,
        })
    }

    /// Parses one entry; a `q` parameter becomes the quality score.
    pub fn parse(entry: &str) -> Result<Self, HeaderError> {
        let mut segments = split_unquoted(entry, ';').into_iter();
        let media_type = segments.next().unwrap_or_default();
        let (parameters, quality) = take_quality(parse_parameters(segments))?;
        Ok(Self {
            value: MediaTypeHeaderValue::new(media_type, parameters)?,
            quality,
        })
    }

    /// Parses a comma-separated list, skipping empty list elements.
    pub fn parse_list(header: &str) -> Result<Vec<Self>, HeaderError> {
        parse_list(header, Self::parse)
    }

    pub fn value(&self) -> &MediaTypeHeaderValue {
        &self.value
    }

    pub fn media_type(&self) -> &str {
        self.value.media_type()
    }

    pub fn charset(&self) -> Option<&str> {
        self.value.charset()
    }
}

impl HeaderValueWithQualityScore for AcceptMediaTypeHeaderValue {
    fn quality(&self) -> f32 {
        self.quality
    }

    fn specificity(&self) -> u8 {
        self.value.specificity()
    }
}

impl MediaTypeHeader for AcceptMediaTypeHeaderValue {
    const QUALITY_SCORED: bool = true;

    fn media_type_value(&self) -> &MediaTypeHeaderValue {
        &self.value
    }

    fn quality_score(&self) -> f32 {
        self.quality
    }
}

impl fmt::Display for AcceptMediaTypeHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        write_quality(f, self.quality)
    }
}

// ════════════════════════════════════════════════════════════
// 3. Accept-Charset / Accept-Language entries
// ════════════════════════════════════════════════════════════

macro_rules! define_token_header_value {
    ($struct_name:ident, $field:ident, $header:expr) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $struct_name {
            $field: String,
            quality: f32,
            parameters: IndexMap<String, String>,
        }

        impl $struct_name {
            pub fn new(value: impl Into<String>, quality: f32) -> Result<Self, HeaderError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(HeaderError::EmptyValue { header: $header });
                }
                Ok(Self {
                    $field: value.trim().to_owned(),
                    quality: check_quality(quality)?,
                    parameters: IndexMap::new(),
                })
            }

            pub fn parse(entry: &str) -> Result<Self, HeaderError> {
                let mut segments = split_unquoted(entry, ';').into_iter();
                let value = segments.next().unwrap_or_default().trim();
                if value.is_empty() {
                    return Err(HeaderError::EmptyValue { header: $header });
                }
                let (parameters, quality) = take_quality(parse_parameters(segments))?;
                Ok(Self {
                    $field: value.to_owned(),
                    quality,
                    parameters,
                })
            }

            pub fn parse_list(header: &str) -> Result<Vec<Self>, HeaderError> {
                parse_list(header, Self::parse)
            }

            pub fn $field(&self) -> &str {
                &self.$field
            }

            pub fn parameters(&self) -> &IndexMap<String, String> {
                &self.parameters
            }

            pub fn is_wildcard(&self) -> bool {
                self.$field == "*"
            }
        }

        impl HeaderValueWithQualityScore for $struct_name {
            fn quality(&self) -> f32 {
                self.quality
            }

            fn specificity(&self) -> u8 {
                if self.is_wildcard() {
                    0
                } else {
                    2
                }
            }
        }

        impl fmt::Display for $struct_name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.$field)?;
                write_parameters(f, &self.parameters)?;
                write_quality(f, self.quality)
            }
        }
    };
}

define_token_header_value!(AcceptCharsetHeaderValue, charset, "accept-charset");
define_token_header_value!(AcceptLanguageHeaderValue, language, "accept-language");

// ════════════════════════════════════════════════════════════
// 4. Lexing helpers
// ════════════════════════════════════════════════════════════

/// Splits on `separator`, ignoring separators inside double-quoted strings.
pub(crate) fn split_unquoted(value: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

/// `key=value` segments into an ordered map with lowercase keys. A bare key maps to "".
pub(crate) fn parse_parameters<'a>(
    segments: impl Iterator<Item = &'a str>,
) -> IndexMap<String, String> {
    segments
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (key.trim().to_ascii_lowercase(), unquote(value.trim())),
            None => (segment.to_ascii_lowercase(), String::new()),
        })
        .collect()
}

fn parse_list<T>(
    header: &str,
    parse: impl Fn(&str) -> Result<T, HeaderError>,
) -> Result<Vec<T>, HeaderError> {
    split_unquoted(header, ',')
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(parse)
        .collect()
}

fn take_quality(
    mut parameters: IndexMap<String, String>,
) -> Result<(IndexMap<String, String>, f32), HeaderError> {
    let quality = match parameters.shift_remove("q") {
        Some(raw) => parse_quality(&raw)?,
        None => 1.0,
    };
    Ok((parameters, quality))
}

fn parse_quality(raw: &str) -> Result<f32, HeaderError> {
    raw.trim()
        .parse::<f32>()
        .map_err(|_| HeaderError::InvalidQuality(raw.to_owned()))
        .and_then(check_quality)
}

fn check_quality(quality: f32) -> Result<f32, HeaderError> {
    if (0.0..=1.0).contains(&quality) {
        Ok(quality)
    } else {
        Err(HeaderError::InvalidQuality(quality.to_string()))
    }
}

fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => value.to_owned(),
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '/' | ';' | ',' | '"' | '=' | '(' | ')'))
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &IndexMap<String, String>) -> fmt::Result {
    for (key, value) in parameters {
        if value.is_empty() {
            write!(f, "; {key}")?;
        } else {
            write!(f, "; {key}={value}")?;
        }
    }
    Ok(())
}

fn write_quality(f: &mut fmt::Formatter<'_>, quality: f32) -> fmt::Result {
    if quality < 1.0 {
        write!(f, "; q={quality}")?;
    }
    Ok(())
}
