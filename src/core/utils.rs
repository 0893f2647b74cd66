//! Text utilities: digit localization and HTML helpers

/// Persian-Arabic digit glyphs, index = numeric value.
const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];

/// Maps each Persian-Arabic digit glyph to its Western-Arabic equivalent,
/// leaving every other character untouched.
///
/// # Example
///
/// ```
/// use sloganbot::core::utils::normalize_digits;
///
/// assert_eq!(normalize_digits("۱۵"), "15");
/// assert_eq!(normalize_digits("-۳ امتیاز"), "-3 امتیاز");
/// ```
pub fn normalize_digits(input: &str) -> String {
    input
        .chars()
        .map(|c| match PERSIAN_DIGITS.iter().position(|&d| d == c) {
            Some(value) => char::from(b'0' + value as u8),
            None => c,
        })
        .collect()
}

/// Parses an integer out of user input, accepting Persian-Arabic digits and
/// surrounding whitespace. Returns `None` for anything that is not a whole
/// number.
pub fn parse_score(input: &str) -> Option<i64> {
    normalize_digits(input).trim().parse().ok()
}

/// Builds a `tg://user` HTML mention, stripping angle brackets from the
/// display name so it cannot break out of the anchor tag.
pub fn mention_html(user_id: i64, name: &str) -> String {
    let safe: String = name.chars().filter(|c| *c != '<' && *c != '>').collect();
    format!("<a href=\"tg://user?id={}\">{}</a>", user_id, safe)
}

/// Escapes text for embedding in Telegram HTML messages.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_digits_full_persian() {
        assert_eq!(normalize_digits("۰۱۲۳۴۵۶۷۸۹"), "0123456789");
    }

    #[test]
    fn test_normalize_digits_mixed() {
        assert_eq!(normalize_digits("a۵b6"), "a5b6");
    }

    #[test]
    fn test_normalize_digits_passthrough() {
        assert_eq!(normalize_digits("hello"), "hello");
    }

    #[test]
    fn test_parse_score_persian() {
        assert_eq!(parse_score("۱۵"), Some(15));
    }

    #[test]
    fn test_parse_score_negative_persian() {
        assert_eq!(parse_score("-۲۰"), Some(-20));
    }

    #[test]
    fn test_parse_score_western() {
        assert_eq!(parse_score(" 42 "), Some(42));
    }

    #[test]
    fn test_parse_score_rejects_non_numeric() {
        assert_eq!(parse_score("پنج"), None);
        assert_eq!(parse_score("1.5"), None);
        assert_eq!(parse_score(""), None);
    }

    #[test]
    fn test_mention_html_strips_angle_brackets() {
        let mention = mention_html(7, "<b>Ali</b>");
        assert_eq!(mention, "<a href=\"tg://user?id=7\">bAli/b</a>");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
