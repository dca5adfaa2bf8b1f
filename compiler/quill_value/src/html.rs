//! Markup escaping.

/// Escape `s` for inclusion in markup.
///
/// `&`, `'`, `<`, `>` and `"` are replaced by `&amp;`, `&#39;`, `&lt;`,
/// `&gt;` and `&#34;`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}
