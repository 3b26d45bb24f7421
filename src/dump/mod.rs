//! Hex dump of a byte stream
//!
//! One line per window of `columns` bytes: an optional offset, the bytes as
//! grouped lowercase hex, and an optional ASCII sidebar. Full windows of zero
//! bytes may be collapsed to a single `*` line.

mod dumper;

pub use dumper::{Dumper, fill_window, format_row, is_printable};

use std::collections::TryReserveError;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default bytes per row
pub const DEFAULT_COLUMNS: usize = 16;
/// Default bytes per visual group
pub const DEFAULT_GROUP: usize = 8;

/// Errors raised while dumping
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("column count must be greater than zero")]
    ZeroColumns,

    #[error("column count {columns} is too large")]
    TooWide {
        columns: usize,
        #[source]
        source: Option<TryReserveError>,
    },

    #[error("{}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error")]
    Read(#[source] io::Error),

    #[error("write error")]
    Write(#[source] io::Error),
}

/// Layout switches for a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Bytes per row
    pub columns: usize,
    /// Extra space every `group` bytes, 0 disables
    pub group: usize,
    /// Show the printable-character sidebar
    pub ascii: bool,
    /// Show the 8-digit hex offset column
    pub offset: bool,
    /// Collapse runs of all-zero rows to `*`
    pub skip_zero: bool,
}

impl DumpOptions {
    pub fn new(columns: usize, group: usize) -> Self {
        Self {
            columns,
            group,
            ..Self::default()
        }
    }

    pub fn ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    pub fn offset(mut self, offset: bool) -> Self {
        self.offset = offset;
        self
    }

    pub fn skip_zero(mut self, skip_zero: bool) -> Self {
        self.skip_zero = skip_zero;
        self
    }

    pub fn validate(&self) -> Result<(), DumpError> {
        if self.columns == 0 {
            return Err(DumpError::ZeroColumns);
        }
        Ok(())
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            group: DEFAULT_GROUP,
            ascii: true,
            offset: true,
            skip_zero: false,
        }
    }
}

/// Open a file for dumping, or standard input when no path is given
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, DumpError> {
    match path {
        Some(p) => {
            let file = File::open(p).map_err(|source| DumpError::Open {
                path: p.to_path_buf(),
                source,
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}
