use std::path::Path;

use chrono::TimeZone;
use tracing::{debug, info};

use crate::backlog::LineSource;
use crate::colors::ColorLookup;
use crate::config::ExportConfig;
use crate::error::{LogexportError, Result};
use crate::export::export;
use crate::model::Document;
use crate::render::render;
use crate::selection::Selection;
use crate::sink::OutputSink;

/// Selects lines from `source` and renders them.
///
/// The theme is checked before the backlog is touched, and an empty
/// selection is refused rather than rendered as a blank page.
pub fn export_document<S, Tz>(
    source: &mut S,
    selection: &Selection,
    lookup: &dyn ColorLookup,
    config: &ExportConfig,
    tz: &Tz,
) -> Result<Document>
where
    S: LineSource + ?Sized,
    Tz: TimeZone,
{
    config.theme()?;

    debug!(?selection, "exporting backlog");
    let slice = export(source, selection.predicate())?;
    if slice.is_empty() {
        return Err(LogexportError::NothingSelected);
    }

    render(&slice, lookup, config, tz)
}

/// Hands `document` to `sink`, refusing to replace an existing file.
pub fn write_document(sink: &mut dyn OutputSink, path: &Path, document: &Document) -> Result<()> {
    if sink.exists(path) {
        return Err(LogexportError::DestinationExists {
            path: path.to_path_buf(),
        });
    }

    sink.write(path, document.as_str())?;
    info!(path = %path.display(), bytes = document.as_str().len(), "wrote export");
    Ok(())
}
