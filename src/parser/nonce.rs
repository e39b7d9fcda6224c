use crate::constants::NONCE_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;

static NONCE: Lazy<Regex> = Lazy::new(|| Regex::new(NONCE_PATTERN).expect("nonce pattern"));

/// First `_wpnonce=<token>` value anywhere in the page text
pub fn extract_nonce(markup: &str) -> Option<String> {
    NONCE
        .captures(markup)
        .map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nonce_in_calendar_link() {
        let html = r#"<a href="https://wedding.seoulwomen.or.kr/facilities/4187?to=2026-5&amp;_wpnonce=5767884a9b">다음달</a>"#;
        assert_eq!(extract_nonce(html).as_deref(), Some("5767884a9b"));
    }

    #[test]
    fn stops_at_first_non_alphanumeric() {
        assert_eq!(
            extract_nonce("...&_wpnonce=5767884a9b...").as_deref(),
            Some("5767884a9b")
        );
    }

    #[test]
    fn first_match_wins() {
        let html = "?_wpnonce=aaa111 and later ?_wpnonce=bbb222";
        assert_eq!(extract_nonce(html).as_deref(), Some("aaa111"));
    }

    #[test]
    fn absent_nonce() {
        assert_eq!(extract_nonce("<html><body>no token here</body></html>"), None);
        assert_eq!(extract_nonce("_wpnonce="), None);
    }
}
