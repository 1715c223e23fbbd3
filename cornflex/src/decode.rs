//! Byte-to-text decoding for downloaded files.
//!
//! Three modes are supported:
//! - strict UTF-8 ([`decode_utf8`]), used for CSV and XML downloads
//! - an explicit encoding label ([`decode_with_label`]), e.g. `"latin-1"`
//! - sniffing ([`decode_detected`]): a BOM wins, then valid UTF-8, then
//!   chardetng's statistical guess

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{EncodingError, Result};

/// Decode bytes as UTF-8, failing on invalid sequences.
pub fn decode_utf8(bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(EncodingError::InvalidUtf8)?;
    Ok(text.to_string())
}

/// Resolve an encoding label.
///
/// Accepts WHATWG labels (`utf-8`, `iso-8859-1`, `shift_jis`, ...) and the
/// common spellings without separators, so `latin-1` and `utf_8` work too.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
        return Ok(encoding);
    }

    let compact: String = label
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect();
    Encoding::for_label(compact.as_bytes()).ok_or_else(|| {
        EncodingError::UnknownLabel {
            label: label.to_string(),
        }
        .into()
    })
}

/// Labels naming ISO-8859-1 proper, with separators removed.
///
/// WHATWG folds these into windows-1252, which remaps 0x80..=0x9F.
const LATIN1_LABELS: &[&str] = &[
    "latin1",
    "l1",
    "iso88591",
    "iso885911987",
    "isoir100",
    "cp819",
    "ibm819",
    "csisolatin1",
];

fn is_latin1_label(label: &str) -> bool {
    let compact: String = label
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ':'))
        .flat_map(char::to_lowercase)
        .collect();
    LATIN1_LABELS.contains(&compact.as_str())
}

/// Decode bytes with the encoding named by `label`.
///
/// Latin-1 labels map every byte to the code point of the same value.
pub fn decode_with_label(bytes: &[u8], label: &str) -> Result<String> {
    if is_latin1_label(label) {
        return Ok(encoding_rs::mem::decode_latin1(bytes).into_owned());
    }
    let encoding = encoding_for_label(label)?;
    decode_strict(bytes, encoding)
}

/// Guess the encoding of `bytes`.
///
/// Returns the encoding and the length of a byte order mark to skip.
pub fn detect_encoding(bytes: &[u8]) -> (&'static Encoding, usize) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return (encoding, bom_len);
    }

    if std::str::from_utf8(bytes).is_ok() {
        return (UTF_8, 0);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    (detector.guess(None, true), 0)
}

/// Decode bytes with a sniffed encoding.
pub fn decode_detected(bytes: &[u8]) -> Result<String> {
    let (encoding, bom_len) = detect_encoding(bytes);
    log::debug!("Detected encoding {}", encoding.name());
    decode_strict(&bytes[bom_len..], encoding)
}

fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            EncodingError::Malformed {
                encoding: encoding.name().to_string(),
            }
            .into()
        })
}
