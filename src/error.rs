use std::path::PathBuf;

/// Every error chunkline can produce. End-of-stream is not one of them.
#[derive(Debug)]
pub enum ChunklineError {
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    WriteFailed {
        source: std::io::Error,
    },
    InvalidChunkSize,
}

impl std::fmt::Display for ChunklineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenFailed { path, source } => {
                write!(f, "error opening file {}: {source}", path.display())
            }
            Self::ReadFailed { path, source } => {
                write!(f, "error reading file {}: {source}", path.display())
            }
            Self::WriteFailed { source } => write!(f, "error writing output: {source}"),
            Self::InvalidChunkSize => write!(f, "chunk size must be at least 1 byte"),
        }
    }
}

impl std::error::Error for ChunklineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OpenFailed { source, .. }
            | Self::ReadFailed { source, .. }
            | Self::WriteFailed { source } => Some(source),
            Self::InvalidChunkSize => None,
        }
    }
}

impl ChunklineError {
    /// Process exit status. Every failure is fatal and maps to 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OpenFailed { .. }
            | Self::ReadFailed { .. }
            | Self::WriteFailed { .. }
            | Self::InvalidChunkSize => 1,
        }
    }
}
