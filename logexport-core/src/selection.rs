use chrono::{DateTime, TimeZone};

use crate::error::{LogexportError, Result};
use crate::model::LogLine;
use crate::timespec::timestamp_of_str;

/// Already-parsed selection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Inclusive range of epoch seconds.
    TimeRange { start: i64, end: i64 },
    TextMatch {
        start_text: String,
        end_text: Option<String>,
    },
    Whole,
}

impl Selection {
    /// Builds a time range from wall-clock literals; a missing end means `now`.
    pub fn time_range<Tz: TimeZone>(
        start: &str,
        end: Option<&str>,
        now: &DateTime<Tz>,
    ) -> Result<Self> {
        let start = timestamp_of_str(start, now)?;
        let end = match end {
            Some(end) => timestamp_of_str(end, now)?,
            None => now.timestamp(),
        };

        if start > end {
            return Err(LogexportError::InvalidTimeRange { start, end });
        }

        Ok(Self::TimeRange { start, end })
    }

    pub fn text_match(start_text: impl Into<String>, end_text: Option<String>) -> Self {
        Self::TextMatch {
            start_text: start_text.into(),
            end_text,
        }
    }

    pub fn predicate(&self) -> Predicate {
        match self {
            Self::TimeRange { start, end } => Predicate::TimeRange {
                start: *start,
                end: *end,
            },
            Self::TextMatch {
                start_text,
                end_text,
            } => Predicate::TextMatch(TextMatchState::new(start_text.clone(), end_text.clone())),
            Self::Whole => Predicate::Whole,
        }
    }
}

/// What to do with a line met during the backward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Include,
    Exclude,
    /// Nothing older can be selected; the line itself is dropped.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatchState {
    start_text: String,
    end_text: Option<String>,
    end_found: bool,
    done: bool,
}

impl TextMatchState {
    fn new(start_text: String, end_text: Option<String>) -> Self {
        Self {
            end_found: end_text.is_none(),
            done: false,
            start_text,
            end_text,
        }
    }

    fn decide(&mut self, line: &LogLine) -> Decision {
        if self.done {
            return Decision::Stop;
        }

        if !self.end_found {
            let end_text = self.end_text.as_deref().unwrap_or_default();
            if line.text.contains(end_text) {
                self.end_found = true;
                return Decision::Include;
            }
            return Decision::Exclude;
        }

        if line.text.contains(&self.start_text) {
            self.done = true;
        }
        Decision::Include
    }

    fn finish(&self) -> Result<()> {
        if !self.end_found {
            return Err(LogexportError::EndAnchorNotFound {
                anchor: self.end_text.clone().unwrap_or_default(),
            });
        }
        if !self.done {
            return Err(LogexportError::StartAnchorNotFound {
                anchor: self.start_text.clone(),
            });
        }
        Ok(())
    }
}

/// Per-export scan state for one [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    TimeRange { start: i64, end: i64 },
    TextMatch(TextMatchState),
    Whole,
}

impl Predicate {
    /// Decides on the next older line. Must not be called after [`Decision::Stop`].
    pub fn decide(&mut self, line: &LogLine) -> Decision {
        match self {
            Self::TimeRange { start, end } => {
                if line.timestamp < *start {
                    Decision::Stop
                } else if line.timestamp <= *end {
                    Decision::Include
                } else {
                    Decision::Exclude
                }
            }
            Self::TextMatch(state) => state.decide(line),
            Self::Whole => Decision::Include,
        }
    }

    /// Called once when the backlog ran out before any [`Decision::Stop`].
    pub fn finish(&self) -> Result<()> {
        match self {
            Self::TimeRange { .. } | Self::Whole => Ok(()),
            Self::TextMatch(state) => state.finish(),
        }
    }
}
