#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,   // Rust naming conventions
    clippy::missing_errors_doc,        // every error is a ChunklineError, documented there
    clippy::missing_panics_doc,        // same
)]

pub mod chunk;
pub mod error;
pub mod lines;
pub(crate) mod output;
pub mod types;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use chunk::RawChunks;
use error::ChunklineError;
use lines::ChunkedLineReader;
use types::{Format, Mode, Summary};

/// Bytes per read call.
pub const CHUNK_SIZE: usize = 8;

/// Input file when none is given, resolved against the working directory.
pub const DEFAULT_INPUT: &str = "message.txt";

/// Everything one run needs. Built from the CLI in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub chunk_size: usize,
    pub mode: Mode,
    pub format: Format,
}

impl Config {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            chunk_size: CHUNK_SIZE,
            mode: Mode::default(),
            format: Format::default(),
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT)
    }
}

/// Open the input, read it chunk by chunk and write one record per line
/// (or per raw chunk) to `out`. The file is closed on every return path.
///
/// Records already written stay written when a read error ends the run.
pub fn run(config: &Config, out: &mut impl Write) -> Result<Summary, ChunklineError> {
    let file = File::open(&config.path).map_err(|source| ChunklineError::OpenFailed {
        path: config.path.clone(),
        source,
    })?;
    debug!(
        path = %config.path.display(),
        mode = %config.mode,
        chunk_size = config.chunk_size,
        "reading"
    );

    let summary = match config.mode {
        Mode::Lines => drain(ChunkedLineReader::new(file, config.chunk_size)?, config, out)?,
        Mode::Raw => drain(RawChunks::new(file, config.chunk_size)?, config, out)?,
    };

    info!(records = summary.records, bytes = summary.bytes, "end of stream");
    Ok(summary)
}

fn drain(
    records: impl Iterator<Item = io::Result<Vec<u8>>>,
    config: &Config,
    out: &mut impl Write,
) -> Result<Summary, ChunklineError> {
    let mut summary = Summary::default();
    for record in records {
        let record = record.map_err(|source| ChunklineError::ReadFailed {
            path: config.path.clone(),
            source,
        })?;
        output::write_record(out, config.format, summary.records, &record)
            .map_err(|source| ChunklineError::WriteFailed { source })?;
        summary.records += 1;
        summary.bytes += record.len() as u64;
    }
    out.flush()
        .map_err(|source| ChunklineError::WriteFailed { source })?;
    Ok(summary)
}
