use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::TimeZone;

use crate::error::{LogexportError, Result};
use crate::model::LogLine;

pub mod jsonl;
pub mod memory;
pub mod weechat;

pub use jsonl::JsonlBacklog;
pub use memory::MemoryBacklog;
pub use weechat::WeechatLogBacklog;

/// A backlog read from its newest line towards its oldest.
pub trait LineSource {
    /// Returns the next older line, or `None` once the top of the backlog is reached.
    fn next_line(&mut self) -> Result<Option<LogLine>>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> Result<Option<LogLine>> {
        (**self).next_line()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BacklogFormat {
    #[default]
    Jsonl,
    Weechat,
}

impl fmt::Display for BacklogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jsonl => write!(f, "jsonl"),
            Self::Weechat => write!(f, "weechat"),
        }
    }
}

impl FromStr for BacklogFormat {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "jsonl" | "json" => Ok(Self::Jsonl),
            "weechat" | "log" => Ok(Self::Weechat),
            other => Err(format!("unknown backlog format: {other}")),
        }
    }
}

/// Opens a backlog file; `tz` is the zone WeeChat log timestamps were written in.
pub fn open_backlog<Tz>(path: &Path, format: BacklogFormat, tz: Tz) -> Result<Box<dyn LineSource>>
where
    Tz: TimeZone + 'static,
{
    let source: Box<dyn LineSource> = match format {
        BacklogFormat::Jsonl => Box::new(JsonlBacklog::open(path)?),
        BacklogFormat::Weechat => Box::new(WeechatLogBacklog::open(path, tz)?),
    };
    Ok(source)
}

/// Lines of a backlog file handed out from the bottom up, blank lines skipped.
#[derive(Debug, Clone)]
pub(crate) struct ReverseLines {
    path: PathBuf,
    lines: Vec<String>,
    remaining: usize,
}

impl ReverseLines {
    pub(crate) fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| LogexportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let lines = raw.lines().map(ToString::to_string).collect::<Vec<_>>();
        Ok(Self {
            path: path.to_path_buf(),
            remaining: lines.len(),
            lines,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the 1-based line number with the line.
    pub(crate) fn next_back(&mut self) -> Option<(usize, &str)> {
        while self.remaining > 0 {
            self.remaining -= 1;
            let line = &self.lines[self.remaining];
            if !line.trim().is_empty() {
                return Some((self.remaining + 1, line.as_str()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::backlog::{BacklogFormat, ReverseLines};

    #[test]
    fn reverse_lines_skip_blanks_and_keep_numbers() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("backlog.txt");
        fs::write(&path, "first\n\nsecond\n   \n").expect("write");

        let mut lines = ReverseLines::read(&path).expect("read");
        assert_eq!(lines.next_back(), Some((3, "second")));
        assert_eq!(lines.next_back(), Some((1, "first")));
        assert_eq!(lines.next_back(), None);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let temp = tempdir().expect("tempdir");
        let err = ReverseLines::read(&temp.path().join("missing.jsonl")).expect_err("must fail");
        assert!(format!("{err}").contains("i/o error on"));
    }

    #[test]
    fn format_parses_names() {
        assert_eq!("jsonl".parse::<BacklogFormat>(), Ok(BacklogFormat::Jsonl));
        assert_eq!("WeeChat".parse::<BacklogFormat>(), Ok(BacklogFormat::Weechat));
        assert!("csv".parse::<BacklogFormat>().is_err());
    }
}
