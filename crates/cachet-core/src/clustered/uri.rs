//! Cluster connection URIs.
//!
//! A [`ClusterUri`] is checked against the generic URI-reference grammar of
//! RFC 3986 and otherwise kept exactly as written. No scheme-specific
//! normalization is applied, so multi-host authorities such as
//! `terracotta://server1:9410,server2:9410/app` and relative references
//! survive a decode/encode cycle byte for byte.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons a string is not a URI reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// The string is empty.
    #[error("URI is empty")]
    Empty,

    /// The text before the first ':' is not a valid scheme.
    #[error("invalid scheme '{scheme}'")]
    InvalidScheme { scheme: String },

    /// A character is not allowed at its position.
    #[error("invalid character {character:?} at offset {offset}")]
    InvalidCharacter { character: char, offset: usize },

    /// A '%' is not followed by two hexadecimal digits.
    #[error("malformed percent-encoding at offset {offset}")]
    InvalidPercentEncoding { offset: usize },
}

/// A cluster connection URI, stored verbatim.
///
/// # Example
///
/// ```
/// use cachet_core::ClusterUri;
///
/// let uri: ClusterUri = "terracotta://server1:9410,server2:9410/app".parse().unwrap();
/// assert_eq!(uri.scheme(), Some("terracotta"));
/// assert_eq!(uri.as_str(), "terracotta://server1:9410,server2:9410/app");
///
/// assert!("not a uri".parse::<ClusterUri>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterUri(String);

impl ClusterUri {
    /// Validates `value` and wraps it unchanged.
    pub fn parse(value: impl Into<String>) -> Result<Self, UriError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Returns the URI exactly as it was given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the scheme, or `None` for a relative reference.
    pub fn scheme(&self) -> Option<&str> {
        scheme_end(&self.0).map(|end| &self.0[..end])
    }
}

impl FromStr for ClusterUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClusterUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClusterUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Byte offset of the scheme delimiter, if the reference has a scheme.
fn scheme_end(value: &str) -> Option<usize> {
    value
        .find([':', '/', '?', '#'])
        .filter(|&i| value.as_bytes()[i] == b':')
}

fn validate(value: &str) -> Result<(), UriError> {
    if value.is_empty() {
        return Err(UriError::Empty);
    }

    let mut offset = 0;
    if let Some(end) = scheme_end(value) {
        let scheme = &value[..end];
        if !is_scheme(scheme) {
            return Err(UriError::InvalidScheme {
                scheme: scheme.to_string(),
            });
        }
        offset = end + 1;
    }

    let rest = &value[offset..];
    let (before_fragment, fragment) = match rest.find('#') {
        Some(i) => (&rest[..i], Some(i + 1)),
        None => (rest, None),
    };
    let (hier, query) = match before_fragment.find('?') {
        Some(i) => (&before_fragment[..i], Some(i + 1)),
        None => (before_fragment, None),
    };

    let path_start = if let Some(authority) = hier.strip_prefix("//") {
        let len = authority.find('/').unwrap_or(authority.len());
        check(&authority[..len], offset + 2, is_authority_char)?;
        2 + len
    } else {
        0
    };
    check(&hier[path_start..], offset + path_start, |c| {
        is_pchar(c) || c == '/'
    })?;

    if let Some(start) = query {
        check(&before_fragment[start..], offset + start, is_query_char)?;
    }
    if let Some(start) = fragment {
        check(&rest[start..], offset + start, is_query_char)?;
    }
    Ok(())
}

fn check(part: &str, base: usize, allowed: impl Fn(char) -> bool) -> Result<(), UriError> {
    let bytes = part.as_bytes();
    for (i, c) in part.char_indices() {
        if c == '%' {
            let hex = bytes.get(i + 1..i + 3);
            if !hex.is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit)) {
                return Err(UriError::InvalidPercentEncoding { offset: base + i });
            }
        } else if !allowed(c) {
            return Err(UriError::InvalidCharacter {
                character: c,
                offset: base + i,
            });
        }
    }
    Ok(())
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}

fn is_pchar(c: char) -> bool {
    is_unreserved(c) || is_sub_delim(c) || matches!(c, ':' | '@')
}

// Registry-style authority; IP literals keep their brackets.
fn is_authority_char(c: char) -> bool {
    is_pchar(c) || matches!(c, '[' | ']')
}

fn is_query_char(c: char) -> bool {
    is_pchar(c) || matches!(c, '/' | '?')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_host_authority_is_kept() {
        let uri = ClusterUri::parse("terracotta://server1:9410,server2:9410/app").unwrap();

        assert_eq!(uri.as_str(), "terracotta://server1:9410,server2:9410/app");
        assert_eq!(uri.scheme(), Some("terracotta"));
    }

    #[test]
    fn test_special_schemes_are_not_normalized() {
        for text in ["http://Host:80/app", "HTTP://host/a/../b", "file:///tmp/x"] {
            let uri: ClusterUri = text.parse().unwrap();
            assert_eq!(uri.to_string(), text);
        }
    }

    #[test]
    fn test_relative_references() {
        let uri = ClusterUri::parse("/relative/path").unwrap();
        assert_eq!(uri.scheme(), None);

        assert!(ClusterUri::parse("app?name=a#b").is_ok());
        assert!(ClusterUri::parse("//host:9410").is_ok());
    }

    #[test]
    fn test_ip_literal_authority() {
        assert!(ClusterUri::parse("terracotta://[::1]:9410/app").is_ok());
    }

    #[test]
    fn test_whitespace_is_rejected() {
        assert_eq!(
            ClusterUri::parse("not a uri"),
            Err(UriError::InvalidCharacter {
                character: ' ',
                offset: 3
            })
        );
    }

    #[test]
    fn test_invalid_scheme() {
        assert!(matches!(
            ClusterUri::parse("9p://host"),
            Err(UriError::InvalidScheme { ref scheme }) if scheme == "9p"
        ));
        assert!(matches!(
            ClusterUri::parse(":nothing"),
            Err(UriError::InvalidScheme { .. })
        ));
    }

    #[test]
    fn test_percent_encoding() {
        assert!(ClusterUri::parse("terracotta://host/a%20b").is_ok());
        assert_eq!(
            ClusterUri::parse("terracotta://host/a%2"),
            Err(UriError::InvalidPercentEncoding { offset: 19 })
        );
        assert_eq!(
            ClusterUri::parse("terracotta://ho%zzst"),
            Err(UriError::InvalidPercentEncoding { offset: 15 })
        );
    }

    #[test]
    fn test_offsets_point_into_each_component() {
        assert_eq!(
            ClusterUri::parse("terracotta://host/app?a=b c"),
            Err(UriError::InvalidCharacter {
                character: ' ',
                offset: 25
            })
        );
        assert_eq!(
            ClusterUri::parse("terracotta://host/app#x#y"),
            Err(UriError::InvalidCharacter {
                character: '#',
                offset: 23
            })
        );
        assert_eq!(
            ClusterUri::parse("terracotta://ho st/app"),
            Err(UriError::InvalidCharacter {
                character: ' ',
                offset: 15
            })
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(ClusterUri::parse(""), Err(UriError::Empty));
    }
}
