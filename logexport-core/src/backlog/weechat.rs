use std::path::Path;

use chrono::{NaiveDateTime, TimeZone};

use crate::backlog::{LineSource, ReverseLines};
use crate::error::{LogexportError, Result};
use crate::model::LogLine;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A WeeChat logger file: `2026-03-10 12:00:00<TAB>@alice<TAB>hello`.
#[derive(Debug, Clone)]
pub struct WeechatLogBacklog<Tz: TimeZone> {
    lines: ReverseLines,
    tz: Tz,
}

impl<Tz: TimeZone> WeechatLogBacklog<Tz> {
    pub fn open(path: &Path, tz: Tz) -> Result<Self> {
        Ok(Self {
            lines: ReverseLines::read(path)?,
            tz,
        })
    }
}

impl<Tz: TimeZone> LineSource for WeechatLogBacklog<Tz> {
    fn next_line(&mut self) -> Result<Option<LogLine>> {
        let path = self.lines.path().to_path_buf();
        let Some((line_no, raw)) = self.lines.next_back() else {
            return Ok(None);
        };

        let invalid = |reason: &str| LogexportError::InvalidBacklogLine {
            path: path.clone(),
            line: line_no,
            reason: reason.to_string(),
        };

        let mut fields = raw.splitn(3, '\t');
        let date = fields.next().unwrap_or_default();
        let Some(prefix) = fields.next() else {
            return Err(invalid("missing prefix field"));
        };
        let message = fields.next().unwrap_or_default();

        let naive = NaiveDateTime::parse_from_str(date.trim(), TIME_FORMAT)
            .map_err(|_| invalid("bad date"))?;
        let timestamp = self
            .tz
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| invalid("date does not exist in time zone"))?
            .timestamp();

        Ok(Some(LogLine::new(timestamp, prefix, message)))
    }
}
