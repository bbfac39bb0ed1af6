//! QIF interop file formats.
//!
//! Encoded captures are a sequence of records:
//!
//! ```text
//! +----------------+-------------+----------------+
//! | stream id (64) | length (32) | payload (len)  |
//! +----------------+-------------+----------------+
//! ```
//!
//! both integers big-endian. Stream 0 carries encoder stream data; every
//! other record is one header block.
//!
//! QIF text lists header blocks as `name<TAB>value` lines with an empty line
//! after each block. Lines starting with `#` are comments. Names and values
//! are raw octets.

use anyhow::{bail, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use qpack::FieldLine;

/// Stream id of encoder stream records.
pub const ENCODER_STREAM_ID: u64 = 0;

const RECORD_HEADER_LEN: usize = 8 + 4;

/// One record of an encoded capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub stream_id: u64,
    pub payload: Bytes,
}

impl Record {
    pub fn is_encoder_stream(&self) -> bool {
        self.stream_id == ENCODER_STREAM_ID
    }
}

/// Split an encoded capture into records.
pub fn read_records(mut data: Bytes) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut offset = 0;

    while data.has_remaining() {
        if data.remaining() < RECORD_HEADER_LEN {
            bail!(
                "truncated record header at offset {}: {} of {} bytes",
                offset,
                data.remaining(),
                RECORD_HEADER_LEN
            );
        }
        let stream_id = data.get_u64();
        let len = data.get_u32() as usize;
        if data.remaining() < len {
            bail!(
                "truncated payload for stream {} at offset {}: {} of {} bytes",
                stream_id,
                offset,
                data.remaining(),
                len
            );
        }

        let payload = data.split_to(len);
        offset += RECORD_HEADER_LEN + len;
        records.push(Record { stream_id, payload });
    }

    Ok(records)
}

/// Append one record to `buf`.
pub fn write_record<B: BufMut>(record: &Record, buf: &mut B) -> Result<()> {
    let Ok(len) = u32::try_from(record.payload.len()) else {
        bail!(
            "payload of stream {} is {} bytes, over the record limit",
            record.stream_id,
            record.payload.len()
        );
    };
    buf.put_u64(record.stream_id);
    buf.put_u32(len);
    buf.put_slice(&record.payload);
    Ok(())
}

/// Parse QIF text into header blocks.
pub fn parse_qif(text: &[u8]) -> Result<Vec<Vec<FieldLine>>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for (number, line) in text.split(|&b| b == b'\n').enumerate() {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line[0] == b'#' {
            continue;
        }

        let Some(tab) = line.iter().position(|&b| b == b'\t') else {
            bail!("line {}: expected name<TAB>value", number + 1);
        };
        current.push(FieldLine::new(
            Bytes::copy_from_slice(&line[..tab]),
            Bytes::copy_from_slice(&line[tab + 1..]),
        ));
    }

    if !current.is_empty() {
        blocks.push(current);
    }
    Ok(blocks)
}

/// Append one header block as QIF text, including its terminating empty line.
pub fn write_qif_block(fields: &[FieldLine], buf: &mut BytesMut) {
    for field in fields {
        buf.put_slice(&field.name);
        buf.put_u8(b'\t');
        buf.put_slice(&field.value);
        buf.put_u8(b'\n');
    }
    buf.put_u8(b'\n');
}
