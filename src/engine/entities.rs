//! Entity encoding applied to substituted values.

use std::fmt::Write as _;

/// Text transform applied to dictionary values before insertion.
pub trait EntityEncoder: std::fmt::Debug {
    fn encode(&self, text: &str) -> String;
}

/// Encodes HTML special characters and every non-ASCII character.
///
/// `&`, `<`, `>`, `"` and `'` use named or short numeric references; other
/// non-ASCII characters become `&#xHEX;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEntityEncoder;

impl EntityEncoder for HtmlEntityEncoder {
    fn encode(&self, text: &str) -> String {
        let mut encoded = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '&' => encoded.push_str("&amp;"),
                '<' => encoded.push_str("&lt;"),
                '>' => encoded.push_str("&gt;"),
                '"' => encoded.push_str("&quot;"),
                '\'' => encoded.push_str("&#x27;"),
                c if c.is_ascii() => encoded.push(c),
                c => {
                    let _ = write!(encoded, "&#x{:X};", u32::from(c));
                }
            }
        }
        encoded
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEncoder;

impl EntityEncoder for NoopEncoder {
    fn encode(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("Hello", "Hello")]
    #[case::markup("<b>Tom & Jerry</b>", "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;")]
    #[case::quotes(r#"say "hi" 'now'"#, "say &quot;hi&quot; &#x27;now&#x27;")]
    #[case::accents("café", "caf&#xE9;")]
    #[case::astral("👋", "&#x1F44B;")]
    fn html_encoder(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(HtmlEntityEncoder.encode(input), expected);
    }

    #[rstest]
    fn noop_encoder_is_identity() {
        assert_eq!(NoopEncoder.encode("<café>"), "<café>");
    }
}
