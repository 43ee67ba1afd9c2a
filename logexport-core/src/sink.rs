use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{LogexportError, Result};

/// Where finished documents go.
pub trait OutputSink {
    fn exists(&self, path: &Path) -> bool;
    fn write(&mut self, path: &Path, content: &str) -> Result<()>;
}

/// Writes to the filesystem, never replacing an existing file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&mut self, path: &Path, content: &str) -> Result<()> {
        let io_err = |source| LogexportError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LogexportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| {
                if source.kind() == ErrorKind::AlreadyExists {
                    LogexportError::DestinationExists {
                        path: path.to_path_buf(),
                    }
                } else {
                    io_err(source)
                }
            })?;

        file.write_all(content.as_bytes()).map_err(io_err)
    }
}
