use std::path::Path;

use crate::backlog::{LineSource, ReverseLines};
use crate::error::{LogexportError, Result};
use crate::model::LogLine;

/// One JSON object per line: `{"date": 1700000000, "prefix": "@alice", "message": "hi"}`.
#[derive(Debug, Clone)]
pub struct JsonlBacklog {
    lines: ReverseLines,
}

impl JsonlBacklog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            lines: ReverseLines::read(path)?,
        })
    }
}

impl LineSource for JsonlBacklog {
    fn next_line(&mut self) -> Result<Option<LogLine>> {
        let path = self.lines.path().to_path_buf();
        let Some((line_no, raw)) = self.lines.next_back() else {
            return Ok(None);
        };

        serde_json::from_str::<LogLine>(raw.trim())
            .map(Some)
            .map_err(|source| LogexportError::InvalidJsonLine {
                path,
                line: line_no,
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::backlog::{JsonlBacklog, LineSource};
    use crate::model::LogLine;

    #[test]
    fn reads_lines_from_the_bottom() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("backlog.jsonl");
        fs::write(
            &path,
            "{\"date\":100,\"prefix\":\"@alice\",\"message\":\"hello\"}\n\n{\"timestamp\":101,\"prefix\":\"bob\",\"text\":\"hi\"}\n",
        )
        .expect("write");

        let mut backlog = JsonlBacklog::open(&path).expect("open");
        assert_eq!(
            backlog.next_line().expect("line"),
            Some(LogLine::new(101, "bob", "hi"))
        );
        assert_eq!(
            backlog.next_line().expect("line"),
            Some(LogLine::new(100, "@alice", "hello"))
        );
        assert_eq!(backlog.next_line().expect("end"), None);
    }

    #[test]
    fn invalid_json_reports_line_number() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("backlog.jsonl");
        fs::write(
            &path,
            "{\"date\":100,\"prefix\":\"a\",\"message\":\"ok\"}\nnot json\n",
        )
        .expect("write");

        let mut backlog = JsonlBacklog::open(&path).expect("open");
        let err = backlog.next_line().expect_err("must fail");
        assert!(format!("{err}").contains("at line 2"));
    }
}
