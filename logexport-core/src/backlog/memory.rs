use crate::backlog::LineSource;
use crate::error::Result;
use crate::model::LogLine;

/// An in-memory backlog.
#[derive(Debug, Clone, Default)]
pub struct MemoryBacklog {
    lines: Vec<LogLine>,
}

impl MemoryBacklog {
    /// `lines` are given oldest first, the way a buffer displays them.
    pub fn from_chronological(lines: Vec<LogLine>) -> Self {
        Self { lines }
    }
}

impl LineSource for MemoryBacklog {
    fn next_line(&mut self) -> Result<Option<LogLine>> {
        Ok(self.lines.pop())
    }
}

#[cfg(test)]
mod tests {
    use crate::backlog::{LineSource, MemoryBacklog};
    use crate::model::LogLine;

    #[test]
    fn yields_newest_first() {
        let mut backlog = MemoryBacklog::from_chronological(vec![
            LogLine::new(1, "a", "old"),
            LogLine::new(2, "b", "new"),
        ]);
        assert_eq!(backlog.next_line().expect("line").map(|l| l.text), Some("new".to_string()));
        assert_eq!(backlog.next_line().expect("line").map(|l| l.text), Some("old".to_string()));
        assert_eq!(backlog.next_line().expect("end"), None);
    }
}
