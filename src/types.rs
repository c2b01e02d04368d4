/// What one output record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Newline-delimited lines reassembled across chunk boundaries.
    #[default]
    Lines,
    /// Each chunk exactly as read.
    Raw,
}

/// How records are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `read: <bytes>` per record.
    #[default]
    Text,
    /// One compact JSON object per record.
    Json,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lines => write!(f, "lines"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

/// Totals for one run, reported once at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub records: usize,
    pub bytes: u64,
}
