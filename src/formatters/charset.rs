// ./src/formatters/charset.rs

//! Transcoding between Rust strings and the character encodings formatters
//! advertise.

use crate::error::SerializationError;

/// Finds `requested` among `supported`, ignoring case, and returns the
/// formatter's own spelling. `None` picks the first supported encoding.
pub fn resolve_encoding(
    requested: Option<&str>,
    supported: &[&'static str],
) -> Result<&'static str, SerializationError> {
    match requested {
        None => supported
            .first()
            .copied()
            .ok_or_else(|| SerializationError::UnsupportedEncoding("<none>".to_owned())),
        Some(requested) => supported
            .iter()
            .copied()
            .find(|candidate| candidate.eq_ignore_ascii_case(requested.trim()))
            .ok_or_else(|| SerializationError::UnsupportedEncoding(requested.to_owned())),
    }
}

pub fn encode_text(text: &str, encoding: &str) -> Result<Vec<u8>, SerializationError> {
    match encoding.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Ok(text.as_bytes().to_vec()),
        // Big-endian with a byte order mark, so readers need not guess.
        "utf-16" => {
            let mut bytes = vec![0xFE, 0xFF];
            bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
            Ok(bytes)
        }
        "utf-16be" => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        "utf-16le" => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        _ => Err(SerializationError::UnsupportedEncoding(encoding.to_owned())),
    }
}

pub fn decode_text(bytes: &[u8], encoding: &str) -> Result<String, SerializationError> {
    let malformed = || SerializationError::MalformedText {
        encoding: encoding.to_owned(),
    };

    match encoding.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => {
            let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|_| malformed())
        }
        "utf-16" => match bytes {
            [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes).ok_or_else(malformed),
            [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes).ok_or_else(malformed),
            _ => utf16(bytes, u16::from_be_bytes).ok_or_else(malformed),
        },
        "utf-16be" => utf16(bytes, u16::from_be_bytes).ok_or_else(malformed),
        "utf-16le" => utf16(bytes, u16::from_le_bytes).ok_or_else(malformed),
        _ => Err(SerializationError::UnsupportedEncoding(encoding.to_owned())),
    }
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}
