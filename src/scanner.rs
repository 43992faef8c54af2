//! Placeholder token scanning over raw bytes.
//!
//! Sources are never decoded: literal text between tokens is copied byte for
//! byte, so input that is not valid UTF-8 survives untouched.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::bytes::Regex;

/// Default token prefix.
pub const DEFAULT_PREFIX: &str = "R.";

/// Default stop condition: the first character that is not a letter, digit,
/// underscore, hyphen or dot ends the token.
pub const DEFAULT_STOP_CONDITION: &str = r"[^\w.\-]";

/// How tokens begin and end.
#[derive(Debug, Clone)]
pub enum DelimiterRule {
    /// `prefix` + key + a match of `suffix`.
    Bounded { prefix: String, suffix: Regex },
    /// `prefix` + key, where the key stops before the first `stop` match.
    Unbounded { prefix: String, stop: Regex },
}

impl DelimiterRule {
    /// # Errors
    /// Returns the compile error of an invalid suffix pattern.
    pub fn bounded(prefix: impl Into<String>, suffix: &str) -> Result<Self, regex::Error> {
        Ok(Self::Bounded { prefix: prefix.into(), suffix: Regex::new(suffix)? })
    }

    /// # Errors
    /// Returns the compile error of an invalid stop pattern.
    pub fn unbounded(prefix: impl Into<String>, stop: &str) -> Result<Self, regex::Error> {
        Ok(Self::Unbounded { prefix: prefix.into(), stop: Regex::new(stop)? })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        match self {
            Self::Bounded { prefix, .. } | Self::Unbounded { prefix, .. } => prefix,
        }
    }
}

/// Compiled [`DEFAULT_STOP_CONDITION`].
#[allow(clippy::unwrap_used)]
static DEFAULT_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_STOP_CONDITION).unwrap());

impl Default for DelimiterRule {
    fn default() -> Self {
        Self::Unbounded { prefix: DEFAULT_PREFIX.to_string(), stop: DEFAULT_STOP.clone() }
    }
}

/// A located placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte range of the whole token, prefix and suffix included.
    pub span: Range<usize>,
    /// Raw lookup key.
    pub key: &'a [u8],
}

impl<'a> Token<'a> {
    /// The key as text. Bytes that are not UTF-8 become U+FFFD, so such a key
    /// never matches a dictionary entry.
    #[must_use]
    pub fn key_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.key)
    }
}

/// Offset of the first occurrence of `needle` in `haystack`.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Finds the first token starting at or after byte offset `from`.
///
/// Offsets past the end yield `None`.
#[must_use]
pub fn next_token<'a>(text: &'a [u8], from: usize, rule: &DelimiterRule) -> Option<Token<'a>> {
    let prefix = rule.prefix().as_bytes();
    if prefix.is_empty() {
        return None;
    }
    let start = from + find_bytes(text.get(from..)?, prefix)?;
    let key_start = start + prefix.len();

    match rule {
        DelimiterRule::Bounded { suffix, .. } => {
            let found = suffix.find_at(text, key_start)?;
            Some(Token { span: start..found.end(), key: text.get(key_start..found.start())? })
        }
        DelimiterRule::Unbounded { stop, .. } => {
            let end = stop.find_at(text, key_start).map_or(text.len(), |found| found.start());
            Some(Token { span: start..end, key: text.get(key_start..end)? })
        }
    }
}

/// Iterator over the non-overlapping tokens of a buffer, left to right.
#[derive(Debug)]
pub struct Scanner<'a, 'r> {
    /// Scanned bytes
    text: &'a [u8],
    /// Active rule
    rule: &'r DelimiterRule,
    /// Where the next search starts
    position: usize,
}

impl<'a, 'r> Scanner<'a, 'r> {
    #[must_use]
    pub const fn new(text: &'a [u8], rule: &'r DelimiterRule) -> Self {
        Self { text, rule, position: 0 }
    }
}

impl<'a> Iterator for Scanner<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = next_token(self.text, self.position, self.rule)?;
        self.position = token.span.end;
        Some(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn keys(text: &str, rule: &DelimiterRule) -> Vec<String> {
        Scanner::new(text.as_bytes(), rule).map(|token| token.key_str().into_owned()).collect()
    }

    #[googletest::test]
    fn finds_token_with_default_rule() {
        let rule = DelimiterRule::default();

        let token = next_token(b"R.greeting, world", 0, &rule).unwrap();

        expect_that!(token.key_str(), eq("greeting"));
        expect_that!(token.span, eq(&(0..10)));
    }

    #[rstest]
    #[case::dotted("<p>R.menu.file.open</p>", vec!["menu.file.open"])]
    #[case::hyphen_and_underscore("R.a-b_c R.d", vec!["a-b_c", "d"])]
    #[case::runs_to_end("title: R.page.title", vec!["page.title"])]
    #[case::no_prefix("plain text", vec![])]
    #[case::adjacent("R.aR.b", vec!["aR.b"])]
    #[case::unicode_key("R.größe!", vec!["größe"])]
    fn scans_unbounded_tokens(#[case] text: &str, #[case] expected: Vec<&str>) {
        let rule = DelimiterRule::default();

        assert_that!(keys(text, &rule), eq(&expected));
    }

    #[googletest::test]
    fn stop_at_first_char_gives_empty_key() {
        let rule = DelimiterRule::default();

        let token = next_token(b"x R. y", 0, &rule).unwrap();

        expect_that!(token.key_str(), eq(""));
        expect_that!(token.span, eq(&(2..4)));
    }

    #[googletest::test]
    fn bounded_rule_strips_suffix() {
        let rule = DelimiterRule::bounded("{{", r"\}\}").unwrap();

        let tokens: Vec<_> = Scanner::new(b"a {{ hello }} b {{x}}", &rule).collect();

        expect_that!(tokens.len(), eq(2));
        expect_that!(tokens[0].key_str(), eq(" hello "));
        expect_that!(tokens[0].span, eq(&(2..13)));
        expect_that!(tokens[1].key_str(), eq("x"));
    }

    #[googletest::test]
    fn bounded_rule_without_suffix_match_ends_scan() {
        let rule = DelimiterRule::bounded("{{", r"\}\}").unwrap();

        expect_that!(keys("{{a}} then {{ unterminated", &rule), elements_are![eq("a")]);
    }

    #[googletest::test]
    fn suffix_pattern_may_be_a_class() {
        let rule = DelimiterRule::bounded("$", r"[;$]").unwrap();

        expect_that!(keys("$one;$two$", &rule), elements_are![eq("one"), eq("two")]);
    }

    #[googletest::test]
    fn resumes_after_token_end() {
        let rule = DelimiterRule::default();
        let text = b"R.a R.b";

        let first = next_token(text, 0, &rule).unwrap();
        let second = next_token(text, first.span.end, &rule).unwrap();

        expect_that!(second.key_str(), eq("b"));
        expect_that!(next_token(text, second.span.end, &rule), none());
    }

    #[googletest::test]
    fn out_of_range_start_yields_none() {
        let rule = DelimiterRule::default();

        expect_that!(next_token(b"R.a", 99, &rule), none());
    }

    #[googletest::test]
    fn scans_around_bytes_that_are_not_utf8() {
        let rule = DelimiterRule::default();
        let text = b"caf\xe9 R.greeting \xff R.farewell";

        let tokens: Vec<_> = Scanner::new(text, &rule).collect();

        expect_that!(tokens.len(), eq(2));
        expect_that!(tokens[0].key, eq(b"greeting".as_slice()));
        expect_that!(tokens[0].span, eq(&(5..15)));
        expect_that!(tokens[1].key, eq(b"farewell".as_slice()));
    }

    #[googletest::test]
    fn key_with_invalid_bytes_is_decoded_lossily() {
        let token = Token { span: 0..5, key: b"a\xe9b" };

        expect_that!(token.key_str(), eq("a\u{fffd}b"));
    }
}
