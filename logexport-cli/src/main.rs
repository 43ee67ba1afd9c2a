use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use logexport_core::{
    BacklogFormat, ExportConfig, FsSink, LogexportError, OutputSink, Selection, export_document,
    open_backlog, write_document,
};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Name that sends the document to stdout instead of a file.
const STDOUT_NAME: &str = "-";

#[derive(Debug, Parser)]
#[command(
    name = "logexport",
    version,
    about = "Export part of a chat backlog to a formatted HTML file"
)]
struct Cli {
    /// Backlog file to read
    #[arg(long, value_name = "FILE")]
    backlog: PathBuf,

    /// Backlog file format: jsonl or weechat
    #[arg(long, default_value_t = BacklogFormat::Jsonl)]
    format: BacklogFormat,

    /// Directory to write the export to (overrides the config file)
    #[arg(long, value_name = "DIR")]
    export_path: Option<PathBuf>,

    /// Use the dark theme
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Use the light theme
    #[arg(long)]
    light: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export lines between two times. A time is HH:MM:SS and refers to the
    /// last time the described time occurred: 12:42:00 is today's lunch time
    /// at 20:00, but yesterday's at 03:00. Without an end, exports up to now.
    Time {
        /// <START> [<END>] <NAME>; NAME is written as <export_path>/<NAME>.html, `-` prints to stdout
        #[arg(num_args = 2..=3, required = true, value_name = "ARGS")]
        args: Vec<String>,
    },

    /// Export from the last line containing START_TEXT up to the last line
    /// containing --end (or the newest line)
    Text {
        start_text: String,

        /// Text of the last exported line
        #[arg(long, value_name = "END_TEXT")]
        end: Option<String>,

        /// Written as <export_path>/<NAME>.html, `-` prints to stdout
        name: String,
    },

    /// Export the whole backlog
    Whole {
        /// Written as <export_path>/<NAME>.html, `-` prints to stdout
        name: String,
    },
}

impl Command {
    fn into_selection(self, now: &DateTime<Local>) -> logexport_core::Result<(Selection, String)> {
        match self {
            Self::Time { mut args } => {
                let name = args.pop().unwrap_or_default();
                let end = args.get(1).map(String::as_str);
                let start = args.first().map(String::as_str).unwrap_or_default();
                Ok((Selection::time_range(start, end, now)?, name))
            }
            Self::Text {
                start_text,
                end,
                name,
            } => Ok((Selection::text_match(start_text, end), name)),
            Self::Whole { name } => Ok((Selection::Whole, name)),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn run(cli: Cli) -> logexport_core::Result<()> {
    let mut config = ExportConfig::from_env_or_default()?;
    if let Some(export_path) = cli.export_path {
        config.export_path = export_path;
    }
    if cli.dark {
        config.dark = Some(true);
    } else if cli.light {
        config.dark = Some(false);
    }

    // Everything the user typed is checked before the backlog is read.
    let (selection, name) = cli.command.into_selection(&Local::now())?;
    let lookup = config.color_lookup()?;
    let destination = (name != STDOUT_NAME).then(|| config.destination(&name));
    let mut sink = FsSink;
    if let Some(path) = &destination
        && sink.exists(path)
    {
        return Err(LogexportError::DestinationExists { path: path.clone() });
    }

    let mut source = open_backlog(&cli.backlog, cli.format, Local)?;
    let document = export_document(&mut source, &selection, &lookup, &config, &Local)?;

    match destination {
        Some(path) => {
            write_document(&mut sink, &path, &document)?;
            println!("{}", path.display());
        }
        None => print!("{}", document.as_str()),
    }

    Ok(())
}
