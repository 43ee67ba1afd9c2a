use tracing::debug;

use crate::backlog::LineSource;
use crate::error::{LogexportError, Result};
use crate::model::Slice;
use crate::selection::{Decision, Predicate};

/// Scans `source` newest-first and returns the lines `predicate` selects, oldest first.
pub fn export<S>(source: &mut S, mut predicate: Predicate) -> Result<Slice>
where
    S: LineSource + ?Sized,
{
    let mut gathered = Vec::new();
    let mut scanned = 0_usize;
    let mut stopped = false;

    while let Some(line) = source.next_line()? {
        scanned += 1;
        match predicate.decide(&line) {
            Decision::Include => gathered.push(line),
            Decision::Exclude => {}
            Decision::Stop => {
                stopped = true;
                break;
            }
        }
    }

    if scanned == 0 {
        return Err(LogexportError::EmptyBacklog);
    }

    if !stopped {
        debug!(scanned, "reached top of backlog");
        predicate.finish()?;
    }

    debug!(scanned, selected = gathered.len(), stopped, "backlog scan finished");
    Ok(Slice::from_newest_first(gathered))
}
