//! Path tokens
//!
//! A token is classified once, when the path is parsed:
//!
//! - `[N]` selects a sequence element by 0-based index
//! - `[prop=value]` selects the first sequence element whose `prop` field
//!   stringifies to `value` (percent-decoded)
//! - anything else is a plain mapping key
//!
//! Bracketed tokens that are neither form are kept as [`TokenKind::Invalid`]
//! so that the resolver can report them when they meet a sequence. Against a
//! mapping every token, bracketed or not, is looked up by its raw text.

use std::fmt;

/// Classification of a single path token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain mapping key
    Key,
    /// `[N]`, may be negative (and then never in range)
    Index(i64),
    /// `[prop=value]` with `value` already decoded
    Match { prop: String, value: String },
    /// Bracketed but unparsable selector
    Invalid(String),
}

/// One `/`-delimited segment of a state path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    raw: String,
    kind: TokenKind,
}

impl PathToken {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = classify(&raw);
        Self { raw, kind }
    }

    /// The token text as it appeared in the path
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Whether the token is wrapped in `[` `]`
    pub fn is_array_selector(&self) -> bool {
        !matches!(self.kind, TokenKind::Key)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Interior of a bracketed token, `None` if the token is not bracketed
fn array_selector_interior(token: &str) -> Option<&str> {
    if token.len() > 2 && token.starts_with('[') && token.ends_with(']') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

fn classify(token: &str) -> TokenKind {
    let Some(interior) = array_selector_interior(token) else {
        return TokenKind::Key;
    };

    if let Ok(index) = interior.parse::<i64>() {
        return TokenKind::Index(index);
    }

    let parts: Vec<&str> = interior.split('=').collect();
    if parts.len() != 2 {
        return TokenKind::Invalid(format!(
            "expected \"[index]\" or \"[propName=propValue]\", found {} '=' separators",
            parts.len() - 1
        ));
    }

    match decode_selector_value(parts[1]) {
        Some(value) => TokenKind::Match {
            prop: parts[0].to_string(),
            value,
        },
        None => TokenKind::Invalid(format!("malformed percent-encoding in \"{}\"", parts[1])),
    }
}

/// Percent-decode a selector value.
///
/// Every `%` has to start a two digit hex escape and the decoded bytes have
/// to be UTF-8, otherwise the value is rejected.
fn decode_selector_value(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'%'
            || bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    urlencoding::decode(value).ok().map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_key() {
        let token = PathToken::parse("pipelines");
        assert_eq!(token.kind(), &TokenKind::Key);
        assert!(!token.is_array_selector());
    }

    #[test]
    fn test_short_brackets_are_keys() {
        assert_eq!(PathToken::parse("[]").kind(), &TokenKind::Key);
        assert_eq!(PathToken::parse("[").kind(), &TokenKind::Key);
        assert_eq!(PathToken::parse("[0").kind(), &TokenKind::Key);
    }

    #[test]
    fn test_index() {
        assert_eq!(PathToken::parse("[2]").kind(), &TokenKind::Index(2));
        assert_eq!(PathToken::parse("[-1]").kind(), &TokenKind::Index(-1));
    }

    #[test]
    fn test_match_is_decoded() {
        let token = PathToken::parse("[name=John%20Doe]");
        assert_eq!(
            token.kind(),
            &TokenKind::Match {
                prop: "name".to_string(),
                value: "John Doe".to_string()
            }
        );
        assert_eq!(token.raw(), "[name=John%20Doe]");
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(PathToken::parse("[abc]").kind(), TokenKind::Invalid(_)));
        assert!(matches!(PathToken::parse("[a=b=c]").kind(), TokenKind::Invalid(_)));
        assert!(matches!(PathToken::parse("[name=%zz]").kind(), TokenKind::Invalid(_)));
    }

    #[test]
    fn test_selector_value_decoding() {
        assert_eq!(decode_selector_value("a%2Fb").as_deref(), Some("a/b"));
        assert_eq!(decode_selector_value("caf%C3%A9").as_deref(), Some("café"));
        assert_eq!(decode_selector_value("plain").as_deref(), Some("plain"));
        assert_eq!(decode_selector_value("%4"), None);
        assert_eq!(decode_selector_value("50%"), None);
        assert_eq!(decode_selector_value("%FF"), None);
    }

    #[test]
    fn test_encoded_names_round_trip_through_selectors() {
        let name = "team/job [x=1] 50% café";
        let token = PathToken::parse(format!("[name={}]", urlencoding::encode(name)));
        assert_eq!(
            token.kind(),
            &TokenKind::Match {
                prop: "name".to_string(),
                value: name.to_string()
            }
        );
    }
}
