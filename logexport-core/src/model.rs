use std::fmt;

use serde::Deserialize;

/// A single backlog line as handed out by a [`crate::LineSource`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogLine {
    /// Seconds since the Unix epoch.
    #[serde(alias = "date")]
    pub timestamp: i64,
    pub prefix: String,
    #[serde(alias = "message")]
    pub text: String,
}

impl LogLine {
    pub fn new(timestamp: i64, prefix: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            prefix: prefix.into(),
            text: text.into(),
        }
    }
}

/// Selected lines in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slice {
    lines: Vec<LogLine>,
}

impl Slice {
    /// Builds a slice from lines gathered newest-first.
    pub fn from_newest_first(mut gathered: Vec<LogLine>) -> Self {
        gathered.reverse();
        Self { lines: gathered }
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<LogLine> {
        self.lines
    }
}

impl<'a> IntoIterator for &'a Slice {
    type Item = &'a LogLine;
    type IntoIter = std::slice::Iter<'a, LogLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

/// Name of a display color, rendered as the `color-<name>` CSS class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorToken(String);

impl ColorToken {
    pub const DEFAULT: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn default_color() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn css_class(&self) -> String {
        format!("color-{}", self.0)
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel role carried by the first character of a nick prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Op,
    HalfOp,
    Voice,
    None,
}

impl Role {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '~' => Some(Self::Owner),
            '@' => Some(Self::Op),
            '%' => Some(Self::HalfOp),
            '+' => Some(Self::Voice),
            ' ' => Some(Self::None),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Op => write!(f, "op"),
            Self::HalfOp => write!(f, "halfop"),
            Self::Voice => write!(f, "voice"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Prefixes WeeChat uses for lines that are not written by a person.
pub const SENTINEL_PREFIXES: &[&str] = &["", "-->", "<--", "--", "=!=", "*", " *"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author<'a> {
    /// Join, part, quit, network and error lines.
    Event,
    Human {
        role: Role,
        marker: Option<char>,
        name: &'a str,
    },
}

impl<'a> Author<'a> {
    pub fn classify(prefix: &'a str) -> Self {
        if SENTINEL_PREFIXES.contains(&prefix) {
            return Self::Event;
        }

        let mut chars = prefix.chars();
        if let Some(first) = chars.next()
            && let Some(role) = Role::from_marker(first)
            && !chars.as_str().is_empty()
        {
            return Self::Human {
                role,
                marker: Some(first),
                name: chars.as_str(),
            };
        }

        Self::Human {
            role: Role::None,
            marker: None,
            name: prefix,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Self::Event)
    }
}

/// A finished HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    html: String,
}

impl Document {
    pub(crate) fn new(html: String) -> Self {
        Self { html }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Author, LogLine, Role, Slice};

    #[test]
    fn classify_splits_role_marker() {
        assert_eq!(
            Author::classify("@alice"),
            Author::Human {
                role: Role::Op,
                marker: Some('@'),
                name: "alice",
            }
        );
        assert_eq!(
            Author::classify("bob"),
            Author::Human {
                role: Role::None,
                marker: None,
                name: "bob",
            }
        );
    }

    #[test]
    fn classify_keeps_unknown_marker_in_name() {
        assert_eq!(
            Author::classify("!carol"),
            Author::Human {
                role: Role::None,
                marker: None,
                name: "!carol",
            }
        );
    }

    #[test]
    fn classify_recognizes_sentinels() {
        for prefix in ["", "-->", "<--", "--", "=!="] {
            assert!(Author::classify(prefix).is_event(), "prefix {prefix:?}");
        }
        assert!(!Author::classify("@").is_event());
    }

    #[test]
    fn slice_reverses_gathered_lines() {
        let slice = Slice::from_newest_first(vec![
            LogLine::new(3, "a", "third"),
            LogLine::new(2, "a", "second"),
            LogLine::new(1, "a", "first"),
        ]);
        let texts = slice.lines().iter().map(|l| l.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
