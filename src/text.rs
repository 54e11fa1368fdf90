/// Keeps at most `max` characters (not bytes) of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Collapses every whitespace run to a single space and trims both ends.
pub(crate) fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decodes UTF-8, dropping a leading BOM and any undecodable byte sequences.
pub(crate) fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        text.chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect()
    } else {
        text.into_owned()
    }
}
