use std::io::{self, Read};
use std::iter::FusedIterator;

use tracing::{info, trace};

use crate::error::ChunklineError;

/// A byte source read through one fixed-capacity scratch buffer.
/// Both readers share this loop; they only differ in what they do with a chunk.
pub struct ChunkSource<R> {
    inner: R,
    buf: Box<[u8]>,
}

impl<R: Read> ChunkSource<R> {
    pub fn new(inner: R, chunk_size: usize) -> Result<Self, ChunklineError> {
        if chunk_size == 0 {
            return Err(ChunklineError::InvalidChunkSize);
        }
        Ok(Self {
            inner,
            buf: vec![0; chunk_size].into_boxed_slice(),
        })
    }

    /// Next chunk, `None` at end-of-stream.
    ///
    /// `Ok(0)` from `Read` is end-of-stream, so a source can never make this
    /// spin on empty reads. `Interrupted` is retried as the `Read` contract asks.
    pub fn read_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        let n = loop {
            match self.inner.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    trace!("read interrupted, retrying");
                }
                Err(e) => return Err(e),
            }
        };
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(&self.buf[..n]))
    }
}

/// Chunks exactly as read, newlines and all. No reassembly.
pub struct RawChunks<R> {
    source: ChunkSource<R>,
    done: bool,
}

impl<R: Read> RawChunks<R> {
    pub fn new(inner: R, chunk_size: usize) -> Result<Self, ChunklineError> {
        Ok(Self {
            source: ChunkSource::new(inner, chunk_size)?,
            done: false,
        })
    }
}

impl<R: Read> Iterator for RawChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.read_chunk() {
            Ok(Some(chunk)) => {
                info!(data = %String::from_utf8_lossy(chunk), "read into data");
                Some(Ok(chunk.to_vec()))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for RawChunks<R> {}
