//! String format patterns
//!
//! [`Pattern`] is what a string schema's `matches` field holds. Custom
//! patterns use `regex` crate syntax. The named patterns below reproduce a
//! fixed set of ECMAScript expressions: `\d` is spelled `[0-9]`, `.` is
//! spelled "anything but a line terminator", and look-aheads become extra
//! conjuncts that must all match. A trailing `.{8,}` counts UTF-16 code
//! units, so the password patterns check it as a minimum UTF-16 length.
//!
//! In schema documents, a `matches` string of the form `@name` refers to a
//! named pattern.
//!
//! Copyright (c) 2025 Jsonshape Team
//! Licensed under the Apache-2.0 license

use crate::classify::utf16_len;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// A compiled string pattern
#[derive(Clone)]
pub struct Pattern {
    source: String,
    name: Option<&'static str>,
    regex: Regex,
    lookaheads: Vec<Regex>,
    min_utf16_len: usize,
}

impl Pattern {
    /// Compile a custom pattern
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let regex = compile(&source)?;
        Ok(Self {
            source,
            name: None,
            regex,
            lookaheads: Vec::new(),
            min_utf16_len: 0,
        })
    }

    /// Parse a schema-document reference: `@name` or a custom source
    pub fn parse(text: &str) -> Result<Self> {
        match text.strip_prefix('@') {
            Some(name) => named(name)
                .cloned()
                .ok_or_else(|| Error::UnknownPattern(name.to_string())),
            None => Self::new(text),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        utf16_len(text) >= self.min_utf16_len
            && self.regex.is_match(text)
            && self.lookaheads.iter().all(|lookahead| lookahead.is_match(text))
    }

    /// Source text as shown in messages
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name of a built-in pattern
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|source_error| Error::InvalidPattern {
        pattern: source.to_string(),
        source: source_error,
    })
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.name == other.name
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.name {
            Some(name) => serializer.serialize_str(&format!("@{}", name)),
            None => serializer.serialize_str(&self.source),
        }
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Pattern::parse(&text).map_err(serde::de::Error::custom)
    }
}

struct Builtin {
    name: &'static str,
    source: &'static str,
    regex: &'static str,
    lookaheads: &'static [&'static str],
    min_utf16_len: usize,
}

const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "integer",
        source: r"^-?\d+$",
        regex: r"^-?[0-9]+$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "number",
        source: r"^-?\d*(\.\d+)?$",
        regex: r"^-?[0-9]*(\.[0-9]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "positive-integer",
        source: r"^\d+$",
        regex: r"^[0-9]+$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "positive-number",
        source: r"^\d*(\.\d+)?$",
        regex: r"^[0-9]*(\.[0-9]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "negative-integer",
        source: r"^-\d+$",
        regex: r"^-[0-9]+$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "negative-number",
        source: r"^-\d*(\.\d+)?$",
        regex: r"^-[0-9]*(\.[0-9]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "iso-date",
        source: r"^\d{4}-(([0][0-9])|([1][012]))-(([012][1-9])|([3][01]))$",
        regex: r"^[0-9]{4}-(([0][0-9])|([1][012]))-(([012][1-9])|([3][01]))$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "iso-date-hhmm",
        source: r"^\d{4}-(([0][0-9])|([1][012]))-(([012][0-9])|([3][01]))(T|\ )(([01][0-9])|([2][0-3]))\:[0-5][0-9]$",
        regex: r"^[0-9]{4}-(([0][0-9])|([1][012]))-(([012][0-9])|([3][01]))(T| )(([01][0-9])|([2][0-3])):[0-5][0-9]$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "iso-date-hhmmss",
        source: r"^\d{4}-(([0][0-9])|([1][012]))-(([012][0-9])|([3][01]))(T|\ )(([01][0-9])|([2][0-3]))\:[0-5][0-9]\:[0-5][0-9]$",
        regex: r"^[0-9]{4}-(([0][0-9])|([1][012]))-(([012][0-9])|([3][01]))(T| )(([01][0-9])|([2][0-3])):[0-5][0-9]:[0-5][0-9]$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "datetime",
        source: r"^[+-]?\d{4}-[01]\d-[0-3]\d(T[0-2]\d:[0-5]\d?(:[0-5]\d(\.\d+)?)?([+-][0-2]\d:[0-5]\d)?Z?)?$",
        regex: r"^[+\-]?[0-9]{4}-[01][0-9]-[0-3][0-9](T[0-2][0-9]:[0-5][0-9]?(:[0-5][0-9](\.[0-9]+)?)?([+\-][0-2][0-9]:[0-5][0-9])?Z?)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "email",
        source: r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        regex: concat!(
            r#"^(([^<>()\[\]\\.,;:@"\t\n\x0B\x0C\r \u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}\u{feff}]+"#,
            r#"(\.[^<>()\[\]\\.,;:@"\t\n\x0B\x0C\r \u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}\u{feff}]+)*)"#,
            r#"|("[^\n\r\u{2028}\u{2029}]+"))"#,
            r#"@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        ),
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "url",
        source: r"^(?:http|https):\/\/[A-Za-z0-9\-]{0,63}(\.[A-Za-z0-9\-]{0,63})+(:\d{1,4})?\/*(\/*[A-Za-z0-9\-._]+\/*)*(\?.*)?(#.*)?$",
        regex: r"^(?:http|https)://[A-Za-z0-9\-]{0,63}(\.[A-Za-z0-9\-]{0,63})+(:[0-9]{1,4})?/*(/*[A-Za-z0-9\-._]+/*)*(\?[^\n\r\u{2028}\u{2029}]*)?(#[^\n\r\u{2028}\u{2029}]*)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "ipv4",
        source: r"^(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])$",
        regex: r"^(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "ipv6",
        source: concat!(
            r"^(([0-9a-fA-F]{1,4}:){7,7}[0-9a-fA-F]{1,4}|([0-9a-fA-F]{1,4}:){1,7}:|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}",
            r"|([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}|([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}",
            r"|([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}|([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}",
            r"|[0-9a-fA-F]{1,4}:((:[0-9a-fA-F]{1,4}){1,6})|:((:[0-9a-fA-F]{1,4}){1,7}|:)",
            r"|fe80:(:[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]{1,}",
            r"|::(ffff(:0{1,4}){0,1}:){0,1}((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])",
            r"|([0-9a-fA-F]{1,4}:){1,4}:((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9]))$",
        ),
        regex: concat!(
            r"^(([0-9a-fA-F]{1,4}:){7,7}[0-9a-fA-F]{1,4}|([0-9a-fA-F]{1,4}:){1,7}:|([0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}",
            r"|([0-9a-fA-F]{1,4}:){1,5}(:[0-9a-fA-F]{1,4}){1,2}|([0-9a-fA-F]{1,4}:){1,4}(:[0-9a-fA-F]{1,4}){1,3}",
            r"|([0-9a-fA-F]{1,4}:){1,3}(:[0-9a-fA-F]{1,4}){1,4}|([0-9a-fA-F]{1,4}:){1,2}(:[0-9a-fA-F]{1,4}){1,5}",
            r"|[0-9a-fA-F]{1,4}:((:[0-9a-fA-F]{1,4}){1,6})|:((:[0-9a-fA-F]{1,4}){1,7}|:)",
            r"|fe80:(:[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]{1,}",
            r"|::(ffff(:0{1,4}){0,1}:){0,1}((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])",
            r"|([0-9a-fA-F]{1,4}:){1,4}:((25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9])\.){3,3}(25[0-5]|(2[0-4]|1{0,1}[0-9]){0,1}[0-9]))$",
        ),
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "slug",
        source: r"^[a-z0-9]+(?:-[a-z0-9]+)*$",
        regex: r"^[a-z0-9]+(?:-[a-z0-9]+)*$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "name",
        source: r"^[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*$",
        regex: r"^[a-zA-Z0-9]+(?:-[a-zA-Z0-9]+)*$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "path",
        source: r"^((\/|\\|\/\/)?[a-z0-9 _@\-^!#$%&+={}.\/\\\[\]]+)+(\.[a-z]+)?$",
        regex: r"^((/|\\|//)?[a-z0-9 _@\-\^!\#$%\&+={}./\\\[\]]+)+(\.[a-z]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "unix-path",
        source: r"^((\/)?[a-z0-9 _@\-^!#$%&+={}.\/]+)+(\.[a-z]+)?$",
        regex: r"^((/)?[a-z0-9 _@\-\^!\#$%\&+={}./]+)+(\.[a-z]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "win32-path",
        source: r"^((\\|\\\\)?[a-z0-9 _@\-^!#$%&+={}.\\\[\]]+)+(\.[a-z]+)?$",
        regex: r"^((\\|\\\\)?[a-z0-9 _@\-\^!\#$%\&+={}.\\\[\]]+)+(\.[a-z]+)?$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "username",
        source: r"^[a-z0-9_-]{3,16}$",
        regex: r"^[a-z0-9_\-]{3,16}$",
        lookaheads: &[],
        min_utf16_len: 0,
    },
    Builtin {
        name: "complex-password",
        source: r#"^(?=(.*[0-9]))(?=.*[\!@#$%^&*()\\[\]{}\-_+=~`|:;"'<>,./?])(?=.*[a-z])(?=(.*[A-Z]))(?=(.*)).{8,}$"#,
        regex: r"^[^\n\r\u{2028}\u{2029}]*$",
        lookaheads: &[
            r"^[^\n\r\u{2028}\u{2029}]*[0-9]",
            r#"^[^\n\r\u{2028}\u{2029}]*[!@\#$%\^\&*()\\\[\]{}\-_+=\~`|:;"'<>,./?]"#,
            r"^[^\n\r\u{2028}\u{2029}]*[a-z]",
            r"^[^\n\r\u{2028}\u{2029}]*[A-Z]",
        ],
        min_utf16_len: 8,
    },
    Builtin {
        name: "moderate-password",
        source: r"^(?=(.*[0-9]))((?=.*[A-Za-z0-9])(?=.*[A-Z])(?=.*[a-z]))^.{8,}$",
        regex: r"^[^\n\r\u{2028}\u{2029}]*$",
        lookaheads: &[
            r"^[^\n\r\u{2028}\u{2029}]*[0-9]",
            r"^[^\n\r\u{2028}\u{2029}]*[A-Za-z0-9]",
            r"^[^\n\r\u{2028}\u{2029}]*[A-Z]",
            r"^[^\n\r\u{2028}\u{2029}]*[a-z]",
        ],
        min_utf16_len: 8,
    },
];

fn registry() -> &'static [Pattern] {
    static REGISTRY: OnceLock<Vec<Pattern>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        BUILTINS
            .iter()
            .map(|builtin| Pattern {
                source: builtin.source.to_string(),
                name: Some(builtin.name),
                regex: Regex::new(builtin.regex).expect("built-in pattern compiles"),
                lookaheads: builtin
                    .lookaheads
                    .iter()
                    .map(|lookahead| Regex::new(lookahead).expect("built-in look-ahead compiles"))
                    .collect(),
                min_utf16_len: builtin.min_utf16_len,
            })
            .collect()
    })
}

/// Look up a built-in pattern by name (`email`, `iso-date`, `unix-path`, ...)
///
/// Underscores are accepted in place of hyphens.
pub fn named(name: &str) -> Option<&'static Pattern> {
    let name = name.replace('_', "-").to_ascii_lowercase();
    registry().iter().find(|pattern| pattern.name == Some(name.as_str()))
}

/// Names of all built-in patterns
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

macro_rules! accessors {
    ($($func:ident => $index:literal),+ $(,)?) => {
        $(
            pub fn $func() -> &'static Pattern {
                &registry()[$index]
            }
        )+
    };
}

accessors! {
    integer => 0,
    number => 1,
    positive_integer => 2,
    positive_number => 3,
    negative_integer => 4,
    negative_number => 5,
    iso_date => 6,
    iso_date_hhmm => 7,
    iso_date_hhmmss => 8,
    datetime => 9,
    email => 10,
    url => 11,
    ipv4 => 12,
    ipv6 => 13,
    slug => 14,
    name => 15,
    path => 16,
    unix_path => 17,
    win32_path => 18,
    username => 19,
    complex_password => 20,
    moderate_password => 21,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_compiles() {
        assert_eq!(registry().len(), BUILTINS.len());
        for name in names() {
            assert!(named(name).is_some(), "{}", name);
        }
    }

    #[test]
    fn test_accessors_line_up_with_names() {
        assert_eq!(email().name(), Some("email"));
        assert_eq!(moderate_password().name(), Some("moderate-password"));
        assert_eq!(win32_path().name(), Some("win32-path"));
        assert_eq!(named("unix_path"), Some(unix_path()));
    }

    #[test]
    fn test_numbers() {
        assert!(integer().is_match("-12"));
        assert!(!integer().is_match("1.5"));
        assert!(number().is_match(".5"));
        assert!(number().is_match(""));
        assert!(!positive_number().is_match("-1"));
        assert!(negative_integer().is_match("-3"));
        assert!(!integer().is_match("١٢"));
    }

    #[test]
    fn test_dates() {
        assert!(iso_date().is_match("2024-02-29"));
        assert!(!iso_date().is_match("2024-02-30T"));
        assert!(iso_date_hhmm().is_match("2024-02-01 13:45"));
        assert!(iso_date_hhmmss().is_match("2024-02-01T13:45:59"));
        assert!(datetime().is_match("2024-02-01T13:45:59.123+02:00"));
        assert!(!datetime().is_match("2024-02-01X"));
    }

    #[test]
    fn test_network() {
        assert!(email().is_match("john.doe@example.com"));
        assert!(email().is_match("\"odd name\"@[10.0.0.1]"));
        assert!(!email().is_match("john doe@example.com"));
        assert!(url().is_match("https://example.com/path/to?x=1#top"));
        assert!(!url().is_match("ftp://example.com"));
        assert!(ipv4().is_match("192.168.0.255"));
        assert!(!ipv4().is_match("256.1.1.1"));
        assert!(ipv6().is_match("2001:db8::1"));
        assert!(ipv6().is_match("::ffff:192.0.2.128"));
        assert!(!ipv6().is_match("2001:::1"));
    }

    #[test]
    fn test_identifiers_and_paths() {
        assert!(slug().is_match("hello-world-2"));
        assert!(!slug().is_match("Hello"));
        assert!(name().is_match("Hello-World"));
        assert!(username().is_match("joe_99"));
        assert!(!username().is_match("jo"));
        assert!(unix_path().is_match("/usr/local/bin"));
        assert!(win32_path().is_match("\\windows\\system32"));
        assert!(path().is_match("/var/log/app.log"));
    }

    #[test]
    fn test_passwords() {
        assert!(complex_password().is_match("Abcdef1!"));
        assert!(!complex_password().is_match("Abcdefg1"));
        assert!(!complex_password().is_match("Abc1!"));
        assert!(moderate_password().is_match("Abcdefg1"));
        assert!(!moderate_password().is_match("abcdefg1"));
        assert!(!moderate_password().is_match("Abcdefg1\nxyz"));
    }

    #[test]
    fn test_password_length_counts_utf16_units() {
        // two astral characters make eight UTF-16 units
        assert!(complex_password().is_match("aA1!\u{1F600}\u{1F600}"));
        assert!(moderate_password().is_match("aA1b\u{1F600}\u{1F600}"));
        assert!(!complex_password().is_match("aA1!\u{1F600}"));
        assert!(!moderate_password().is_match("aA1bcd\u{e9}"));
    }

    #[test]
    fn test_parse_references_and_custom_sources() {
        assert_eq!(Pattern::parse("@email").unwrap().name(), Some("email"));
        assert!(matches!(Pattern::parse("@nope"), Err(Error::UnknownPattern(name)) if name == "nope"));
        assert!(matches!(Pattern::new("(unclosed"), Err(Error::InvalidPattern { .. })));
        assert_eq!(Pattern::new("^a+$").unwrap().to_string(), "/^a+$/");
    }

    #[test]
    fn test_display_uses_original_source() {
        assert_eq!(integer().to_string(), r"/^-?\d+$/");
    }
}
