//! Dictionary file readers.
//!
//! Every reader produces the same flat shape: dotted key -> string.

use std::collections::HashMap;
use std::path::Path;

use jsonc_parser::ParseOptions;
use serde_json::Value;
use thiserror::Error;

use super::Dictionary;

/// Separator joining nested keys, INI sections and CSV key columns.
pub const KEY_SEPARATOR: &str = ".";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Syntax error reported by the JSON reader
    #[error("Failed to parse JSON: {0}")]
    Json(String),
    /// The document root is an array or a scalar
    #[error("Root value must be an object")]
    RootNotObject,
}

/// On-disk dictionary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryFormat {
    /// Nested key/value object (`.json`, `.jsonc`)
    Structured,
    /// `[section]` + `key=value`
    Ini,
    /// `key1,key2,...,value`
    Csv,
}

impl DictionaryFormat {
    /// Detect format from file extension. Unknown extensions yield `None`.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" | "jsonc" => Some(Self::Structured),
            "ini" => Some(Self::Ini),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension().and_then(|ext| ext.to_str()).and_then(Self::from_extension)
    }

    /// Parses `text` in this format.
    pub fn parse(self, text: &str) -> Result<Dictionary, ParseError> {
        match self {
            Self::Structured => parse_structured(text),
            Self::Ini => Ok(parse_ini(text)),
            Self::Csv => Ok(parse_csv(text)),
        }
    }
}

/// Parses a JSON document (comments and trailing commas allowed) and flattens it.
///
/// An empty document yields an empty dictionary.
pub fn parse_structured(text: &str) -> Result<Dictionary, ParseError> {
    let value = jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
        .map_err(|e| ParseError::Json(e.to_string()))?;

    match value {
        None => Ok(Dictionary::new()),
        Some(value @ Value::Object(_)) => Ok(flatten_json(&value, KEY_SEPARATOR, None).into()),
        Some(_) => Err(ParseError::RootNotObject),
    }
}

/// Flatten nested JSON object into dot-separated key map.
///
/// Array elements are keyed by their index, like object members.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use token_i18n::dictionary::flatten_json;
///
/// let json = json!({
///     "common": {
///         "hello": "Hello",
///         "items": ["one", "two"]
///     }
/// });
///
/// let flattened = flatten_json(&json, ".", None);
/// assert_eq!(flattened.get("common.hello"), Some(&"Hello".to_string()));
/// assert_eq!(flattened.get("common.items.1"), Some(&"two".to_string()));
/// ```
#[must_use]
pub fn flatten_json(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    flatten_json_value(json, separator, prefix, &mut result);
    result
}

/// Recursive step of [`flatten_json`], inserting into `result`.
fn flatten_json_value(
    json: &Value,
    separator: &str,
    prefix: Option<&str>,
    result: &mut HashMap<String, String>,
) {
    let join = |key: &str| prefix.map_or_else(|| key.to_string(), |p| format!("{p}{separator}{key}"));

    match json {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_json_value(value, separator, Some(&join(key)), result);
            }
        }
        Value::Array(arr) => {
            for (index, value) in arr.iter().enumerate() {
                flatten_json_value(value, separator, Some(&join(&index.to_string())), result);
            }
        }
        Value::String(s) => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), s.clone());
            }
        }
        _ => {
            if let Some(key) = prefix {
                result.insert(key.to_string(), json.to_string());
            }
        }
    }
}

/// Parses INI text.
///
/// `[section]` lines prefix the keys that follow with `section.`; lines
/// without `=` and entries with a blank key are ignored. Only the first `=`
/// separates key from value.
#[must_use]
pub fn parse_ini(text: &str) -> Dictionary {
    let mut dictionary = Dictionary::new();
    let mut section: Option<&str> = None;

    for line in text.lines().map(str::trim) {
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = name.trim();
            section = (!name.is_empty()).then_some(name);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let full_key =
            section.map_or_else(|| key.to_string(), |s| format!("{s}{KEY_SEPARATOR}{key}"));
        dictionary.insert(full_key, value.trim());
    }

    dictionary
}

/// Parses CSV text, one `key1,key2,...,value` record per line.
///
/// Fields are trimmed and empty fields dropped; the last remaining field is
/// the value and the others form the dotted key. Records left without a key
/// are skipped.
#[must_use]
pub fn parse_csv(text: &str) -> Dictionary {
    let mut dictionary = Dictionary::new();

    for line in text.lines() {
        let mut fields: Vec<String> = split_record(line)
            .into_iter()
            .map(|field| field.trim().to_string())
            .filter(|field| !field.is_empty())
            .collect();

        let Some(value) = fields.pop() else {
            continue;
        };
        if fields.is_empty() {
            tracing::debug!("Skipping CSV record without key: {line:?}");
            continue;
        }

        dictionary.insert(fields.join(KEY_SEPARATOR), value);
    }

    dictionary
}

/// Splits one CSV line on commas outside quotes.
///
/// A `"` toggles quoting unless preceded by `\`, in which case the pair
/// becomes a literal `"`.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut previous = None;

    for ch in line.chars() {
        match ch {
            '"' if previous == Some('\\') => {
                current.pop();
                current.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
        previous = Some(ch);
    }
    fields.push(current);

    fields
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[googletest::test]
    fn test_flatten_json_nested() {
        let json = json!({
            "common": {
                "hello": "Hello",
                "goodbye": "Goodbye"
            },
            "errors": {
                "notFound": "Not found"
            }
        });

        let result = flatten_json(&json, ".", None);

        expect_that!(result.get("common.hello"), some(eq(&"Hello".to_string())));
        expect_that!(result.get("common.goodbye"), some(eq(&"Goodbye".to_string())));
        expect_that!(result.get("errors.notFound"), some(eq(&"Not found".to_string())));
        expect_that!(result.len(), eq(3));
    }

    #[googletest::test]
    fn test_flatten_json_arrays_keyed_by_index() {
        let json = json!({
            "users": [
                { "name": "Alice" },
                { "name": "Bob" }
            ],
            "matrix": [["a", "b"]]
        });

        let result = flatten_json(&json, ".", None);

        expect_that!(result.get("users.0.name"), some(eq(&"Alice".to_string())));
        expect_that!(result.get("users.1.name"), some(eq(&"Bob".to_string())));
        expect_that!(result.get("matrix.0.1"), some(eq(&"b".to_string())));
    }

    #[googletest::test]
    fn test_flatten_json_non_string_values() {
        let json = json!({
            "number": 42,
            "boolean": true,
            "null": null
        });

        let result = flatten_json(&json, ".", None);

        expect_that!(result.get("number"), some(eq(&"42".to_string())));
        expect_that!(result.get("boolean"), some(eq(&"true".to_string())));
        expect_that!(result.get("null"), some(eq(&"null".to_string())));
    }

    #[googletest::test]
    fn test_flatten_json_is_idempotent() {
        let nested = json!({ "a": { "b": "x", "c": ["y"] }, "d": "z" });
        let flat = flatten_json(&nested, ".", None);

        let again = flatten_json(&serde_json::to_value(&flat).unwrap(), ".", None);

        expect_that!(again, eq(&flat));
    }

    #[googletest::test]
    fn parses_structured_with_comments() {
        let text = r#"{
            // greeting shown on the landing page
            "greeting": "Hi",
            "nav": { "home": "Home", },
        }"#;

        let dictionary = parse_structured(text).unwrap();

        expect_that!(dictionary.get("greeting"), some(eq("Hi")));
        expect_that!(dictionary.get("nav.home"), some(eq("Home")));
    }

    #[rstest]
    #[case::array_root("[1, 2]", ParseError::RootNotObject)]
    #[case::string_root(r#""text""#, ParseError::RootNotObject)]
    fn rejects_non_object_root(#[case] text: &str, #[case] expected: ParseError) {
        assert_eq!(parse_structured(text), Err(expected));
    }

    #[googletest::test]
    fn rejects_malformed_json() {
        expect_that!(parse_structured(r#"{"a": "#), err(anything()));
    }

    #[googletest::test]
    fn empty_structured_document_is_empty() {
        expect_that!(parse_structured("").unwrap().is_empty(), eq(true));
    }

    #[googletest::test]
    fn parses_ini_sections() {
        let text = "title = Home\n[sect]\nkey=val\n  spaced  =  a = b  \n[other]\nkey=2\n";

        let dictionary = parse_ini(text);

        expect_that!(dictionary.get("title"), some(eq("Home")));
        expect_that!(dictionary.get("sect.key"), some(eq("val")));
        expect_that!(dictionary.get("sect.spaced"), some(eq("a = b")));
        expect_that!(dictionary.get("other.key"), some(eq("2")));
        expect_that!(dictionary.len(), eq(4));
    }

    #[rstest]
    #[case::no_separator("[s]\njust text\n")]
    #[case::blank_key("[s]\n = value\n")]
    #[case::comment_line("; comment\n# another\n")]
    fn ini_ignores_lines(#[case] text: &str) {
        assert!(parse_ini(text).is_empty());
    }

    #[googletest::test]
    fn ini_later_duplicates_win() {
        let dictionary = parse_ini("a=1\na=2\n");

        expect_that!(dictionary.get("a"), some(eq("2")));
    }

    #[rstest]
    #[case::composite_key("a,b,value1", "a.b", "value1")]
    #[case::single_key("greeting,Hi", "greeting", "Hi")]
    #[case::quoted_comma(r#"msg,"Hello, world""#, "msg", "Hello, world")]
    #[case::escaped_quote(r#"q,"say \"hi\"""#, "q", r#"say "hi""#)]
    #[case::empty_middle("a,,b, ,v", "a.b", "v")]
    #[case::trimmed(" a , b , v ", "a.b", "v")]
    fn parses_csv_record(#[case] line: &str, #[case] key: &str, #[case] value: &str) {
        let dictionary = parse_csv(line);

        assert_eq!(dictionary.get(key), Some(value));
        assert_eq!(dictionary.len(), 1);
    }

    #[rstest]
    #[case::blank("")]
    #[case::only_commas(",,,")]
    #[case::single_field("lonely")]
    fn csv_skips_records_without_key(#[case] line: &str) {
        assert!(parse_csv(line).is_empty());
    }

    #[googletest::test]
    fn csv_handles_crlf() {
        let dictionary = parse_csv("a,1\r\nb,2\r\n");

        expect_that!(dictionary.get("a"), some(eq("1")));
        expect_that!(dictionary.get("b"), some(eq("2")));
    }

    #[rstest]
    #[case("en.json", Some(DictionaryFormat::Structured))]
    #[case("en.JSONC", Some(DictionaryFormat::Structured))]
    #[case("fr.ini", Some(DictionaryFormat::Ini))]
    #[case("de.csv", Some(DictionaryFormat::Csv))]
    #[case("README.md", None)]
    #[case("noext", None)]
    fn detects_format(#[case] path: &str, #[case] expected: Option<DictionaryFormat>) {
        assert_eq!(DictionaryFormat::from_path(Path::new(path)), expected);
    }
}
