/// Marker added on a side of a snippet that was cut.
pub const ELLIPSIS: &str = "...";

/// Cuts a display excerpt of at most `max_chars` characters out of `line`,
/// centred on the match at `match_start` (a character index) spanning
/// `match_len` characters. Lines that already fit come back unchanged; cut
/// sides are marked with [`ELLIPSIS`]. A `max_chars` of zero disables the
/// limit.
pub fn build_snippet(line: &str, match_start: usize, match_len: usize, max_chars: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    if max_chars == 0 || chars.len() <= max_chars {
        return line.to_string();
    }

    let context = max_chars.saturating_sub(match_len) / 2;
    let start = match_start
        .saturating_sub(context)
        .min(chars.len() - max_chars);
    let end = start + max_chars;

    let window: String = chars[start..end].iter().collect();
    let mut snippet = String::with_capacity(window.len() + 2 * ELLIPSIS.len());
    if start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(window.trim());
    if end < chars.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}
