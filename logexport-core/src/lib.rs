pub mod backlog;
pub mod colors;
pub mod config;
pub mod enhance;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod selection;
pub mod service;
pub mod sink;
pub mod timespec;

pub use backlog::{BacklogFormat, LineSource, MemoryBacklog, open_backlog};
pub use colors::{ColorLookup, NickHashColors};
pub use config::ExportConfig;
pub use enhance::{AuthorColors, TextEnhancer, enhance, escape_html};
pub use error::{LogexportError, Result};
pub use export::export;
pub use model::{ColorToken, Document, LogLine, Slice, Theme};
pub use render::{render, render_body, wrap_document};
pub use selection::{Decision, Predicate, Selection};
pub use service::{export_document, write_document};
pub use sink::{FsSink, OutputSink};
