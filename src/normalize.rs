use unicode_normalization::UnicodeNormalization;

/// Normalize raw input into lines: canonical composition plus line-ending
/// normalization. Lines are kept verbatim otherwise; trailing whitespace is a
/// per-entry formatting concern, not an input one.
pub fn normalize_lines(text: &str) -> Vec<String> {
    let text: String = text.nfc().collect();
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    text.split('\n').map(|l| l.to_string()).collect()
}
