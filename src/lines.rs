use std::collections::VecDeque;
use std::io::{self, Read};
use std::iter::FusedIterator;

use tracing::{info, warn};

use crate::chunk::ChunkSource;
use crate::error::ChunklineError;

/// Split-and-carry state for lines that straddle chunk boundaries.
///
/// Invariant: `partial` holds every byte seen since the last `\n` and never
/// contains a `\n` itself.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    partial: Vec<u8>,
}

impl LineAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk. Returns every line the chunk completes, terminator
    /// stripped. The bytes after the last `\n` (possibly none) are carried.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut start = 0;
        for pos in memchr::memchr_iter(b'\n', chunk) {
            let mut line = std::mem::take(&mut self.partial);
            line.extend_from_slice(&chunk[start..pos]);
            lines.push(line);
            start = pos + 1;
        }
        self.partial.extend_from_slice(&chunk[start..]);
        lines
    }

    /// End-of-stream: the unterminated last line, if there is one.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.partial.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.partial))
        }
    }

    /// Drop the carried bytes. Returns how many were lost.
    pub fn discard(&mut self) -> usize {
        let lost = self.partial.len();
        self.partial.clear();
        lost
    }

    #[must_use]
    pub fn partial(&self) -> &[u8] {
        &self.partial
    }
}

/// Newline-delimited lines reassembled from fixed-size chunks.
///
/// A line is yielded as soon as its terminator has been read. At end-of-stream
/// a non-empty unterminated tail is yielded as the last line. A read error is
/// yielded once and ends iteration; the carried partial line is lost.
pub struct ChunkedLineReader<R> {
    source: ChunkSource<R>,
    acc: LineAccumulator,
    ready: VecDeque<Vec<u8>>,
    done: bool,
}

impl<R: Read> ChunkedLineReader<R> {
    pub fn new(inner: R, chunk_size: usize) -> Result<Self, ChunklineError> {
        Ok(Self {
            source: ChunkSource::new(inner, chunk_size)?,
            acc: LineAccumulator::new(),
            ready: VecDeque::new(),
            done: false,
        })
    }
}

impl<R: Read> Iterator for ChunkedLineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            match self.source.read_chunk() {
                Ok(Some(chunk)) => {
                    info!(data = %String::from_utf8_lossy(chunk), "read into data");
                    self.ready.extend(self.acc.push(chunk));
                    info!(
                        partial = %String::from_utf8_lossy(self.acc.partial()),
                        "content of line buffer"
                    );
                }
                Ok(None) => {
                    self.done = true;
                    return self.acc.finish().map(Ok);
                }
                Err(e) => {
                    self.done = true;
                    let lost = self.acc.discard();
                    if lost > 0 {
                        warn!(bytes = lost, "discarding unterminated line after read error");
                    }
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: Read> FusedIterator for ChunkedLineReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::testing::ScriptedReader;

    fn lines(input: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
        ChunkedLineReader::new(input, chunk_size)
            .unwrap()
            .map(|l| l.unwrap())
            .collect()
    }

    fn strs(lines: &[Vec<u8>]) -> Vec<&str> {
        lines
            .iter()
            .map(|l| std::str::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn single_chunk_three_lines() {
        let out = lines(b"ab\ncd\nef", 8);
        assert_eq!(strs(&out), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn newline_leading_next_chunk() {
        // First read fills the buffer, the terminator arrives alone in the second.
        let out = lines(b"12345678\n", 8);
        assert_eq!(strs(&out), vec!["12345678"]);
    }

    #[test]
    fn no_newline_is_one_line() {
        let out = lines(b"no terminator anywhere in here", 8);
        assert_eq!(strs(&out), vec!["no terminator anywhere in here"]);
    }

    #[test]
    fn trailing_newline_adds_no_empty_line() {
        let out = lines(b"first\nsecond\n", 8);
        assert_eq!(strs(&out), vec!["first", "second"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(lines(b"", 8).is_empty());
    }

    #[test]
    fn blank_lines_are_kept() {
        let out = lines(b"a\n\n\nb\n", 8);
        assert_eq!(strs(&out), vec!["a", "", "", "b"]);
    }

    #[test]
    fn exact_multiple_of_chunk_size() {
        // 16 bytes, two full chunks, line split across the boundary.
        let out = lines(b"abcd\nefghijk\nlm\n", 8);
        assert_eq!(strs(&out), vec!["abcd", "efghijk", "lm"]);
    }

    #[test]
    fn line_spanning_many_chunks() {
        let long = "x".repeat(50);
        let input = format!("{long}\nshort");
        let out = lines(input.as_bytes(), 8);
        assert_eq!(strs(&out), vec![long.as_str(), "short"]);
    }

    #[test]
    fn rejoining_reconstructs_input() {
        let inputs: [&[u8]; 5] = [
            b"Do you have what it takes to be an engineer at TheStartup?\nAre you willing to work 80 hours a week?",
            b"\n\nleading blanks",
            b"\xff\xfe raw bytes\nsurvive untouched",
            b"12345678abcdefgh",
            b"one",
        ];
        for input in inputs {
            for chunk_size in [1, 3, 8, 64] {
                let out = lines(input, chunk_size);
                assert_eq!(out.join(&b'\n'), input.to_vec(), "chunk size {chunk_size}");
            }
        }
    }

    #[test]
    fn short_reads_do_not_change_lines() {
        let reader = ScriptedReader::new(b"ab\ncd\nef", 1);
        let out: Vec<_> = ChunkedLineReader::new(reader, 8)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(strs(&out), vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn read_error_discards_partial_line() {
        let reader =
            ScriptedReader::new(b"done\npartial", 8).failing_with(io::ErrorKind::BrokenPipe);
        let mut it = ChunkedLineReader::new(reader, 8).unwrap();
        assert_eq!(it.next().unwrap().unwrap(), b"done".to_vec());
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(it.next().is_none());
    }

    #[test]
    fn accumulator_carries_and_resets() {
        let mut acc = LineAccumulator::new();
        assert!(acc.push(b"abc").is_empty());
        assert_eq!(acc.partial(), b"abc");
        assert_eq!(acc.push(b"d\ne"), vec![b"abcd".to_vec()]);
        assert_eq!(acc.partial(), b"e");
        assert_eq!(acc.push(b"\n"), vec![b"e".to_vec()]);
        assert!(acc.partial().is_empty());
        assert!(acc.finish().is_none());
    }

    #[test]
    fn accumulator_discard_reports_lost_bytes() {
        let mut acc = LineAccumulator::new();
        acc.push(b"x\nyz");
        assert_eq!(acc.discard(), 2);
        assert!(acc.finish().is_none());
    }
}
