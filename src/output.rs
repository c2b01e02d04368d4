use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;

use crate::types::Format;

/// Literal tag in front of every text record.
pub const RECORD_PREFIX: &[u8] = b"read: ";

#[derive(Serialize)]
struct JsonRecord<'a> {
    index: usize,
    text: Cow<'a, str>,
}

/// Write one record followed by `\n`.
/// Text mode writes the bytes untouched; JSON mode decodes them lossily.
pub fn write_record(
    out: &mut impl Write,
    format: Format,
    index: usize,
    record: &[u8],
) -> io::Result<()> {
    match format {
        Format::Text => {
            out.write_all(RECORD_PREFIX)?;
            out.write_all(record)?;
        }
        Format::Json => {
            let json = JsonRecord {
                index,
                text: String::from_utf8_lossy(record),
            };
            serde_json::to_writer(&mut *out, &json)?;
        }
    }
    out.write_all(b"\n")
}
