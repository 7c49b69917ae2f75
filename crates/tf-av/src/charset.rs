//! Statistical charset detection for text subtitle files.

use std::path::Path;

use tf_probe::CharsetGuess;

/// Detect the charset (and, for single-byte encodings, the language) of a
/// text file.
///
/// Returns `Ok(None)` when the detector has no answer.
pub fn detect_file(path: &Path) -> tf_core::Result<Option<CharsetGuess>> {
    let bytes = std::fs::read(path)?;
    Ok(detect_bytes(&bytes))
}

/// Run the detector over raw bytes.
pub fn detect_bytes(bytes: &[u8]) -> Option<CharsetGuess> {
    if bytes.is_empty() {
        return None;
    }
    let (encoding, confidence, language) = chardet::detect(&bytes.to_vec());
    if encoding.is_empty() {
        return None;
    }
    Some(CharsetGuess {
        encoding,
        confidence,
        language: (!language.is_empty()).then_some(language),
    })
}
