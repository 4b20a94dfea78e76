//! Formatting utilities for Telegram HTML parse mode.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `<b>escaped</b>`
pub fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape_html(text))
}

/// `<code>escaped</code>`
pub fn code(text: &str) -> String {
    format!("<code>{}</code>", escape_html(text))
}

/// Number of characters (Unicode scalar values), the unit Telegram limits are counted in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Keep at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// `{prefix}<code>{escaped raw}</code>`, bounded to `max_chars` characters.
///
/// The raw text is cut before escaping so an entity or the closing tag is never
/// split. If even the empty code span does not fit, only the prefix is cut.
pub fn prefixed_code_within(prefix: &str, raw: &str, max_chars: usize) -> String {
    const OPEN: &str = "<code>";
    const CLOSE: &str = "</code>";

    let fixed = char_len(prefix) + OPEN.len() + CLOSE.len();
    if fixed > max_chars {
        return truncate_chars(prefix, max_chars).to_string();
    }

    let mut budget = max_chars - fixed;
    let mut body = String::new();
    for ch in raw.chars() {
        let escaped = match ch {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            other => other.to_string(),
        };
        let cost = char_len(&escaped);
        if cost > budget {
            break;
        }
        budget -= cost;
        body.push_str(&escaped);
    }

    format!("{prefix}{OPEN}{body}{CLOSE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        assert_eq!(escape_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }

    #[test]
    fn bold_and_code_escape_their_content() {
        assert_eq!(bold("A<B"), "<b>A&lt;B</b>");
        assert_eq!(code("x > y"), "<code>x &gt; y</code>");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn prefixed_code_fits_short_text() {
        assert_eq!(
            prefixed_code_within("Err: ", "a<b", 100),
            "Err: <code>a&lt;b</code>"
        );
    }

    #[test]
    fn prefixed_code_stays_within_limit_and_balanced() {
        let raw = "<".repeat(5000);
        let out = prefixed_code_within("Ошибка: ", &raw, 4000);
        assert!(char_len(&out) <= 4000);
        assert!(out.starts_with("Ошибка: <code>"));
        assert!(out.ends_with("&lt;</code>"));
    }

    #[test]
    fn prefixed_code_with_tiny_limit_keeps_prefix_only() {
        assert_eq!(prefixed_code_within("abcdef", "x", 3), "abc");
    }
}
