//! Decode and encode runs over whole files.

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use qpack::{Decoder, Encoder};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::qif::{self, Record};

/// Outcome of a decode run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub header_blocks: usize,
    pub encoder_chunks: usize,
    pub failed_blocks: usize,
}

/// Replay an encoded capture through one decoder session and write QIF text.
pub fn decode_file(input: &Path, output: &Path, settings: &Settings) -> Result<DecodeSummary> {
    let data = std::fs::read(input)
        .with_context(|| format!("Failed to read capture: {}", input.display()))?;
    let records = qif::read_records(Bytes::from(data))
        .with_context(|| format!("Malformed capture: {}", input.display()))?;

    let (text, summary) = decode_records(&records, settings)?;

    std::fs::write(output, &text)
        .with_context(|| format!("Failed to write QIF: {}", output.display()))?;

    info!(
        input = %input.display(),
        streams = summary.header_blocks,
        encoder_chunks = summary.encoder_chunks,
        failed = summary.failed_blocks,
        "Decoded capture"
    );
    Ok(summary)
}

fn decode_records(records: &[Record], settings: &Settings) -> Result<(BytesMut, DecodeSummary)> {
    let mut decoder = Decoder::with_config(settings.qpack_config());
    let mut summary = DecodeSummary::default();
    let mut text = BytesMut::new();

    for record in records {
        if record.is_encoder_stream() {
            decoder
                .decode_encoder_instructions(&record.payload)
                .with_context(|| {
                    format!(
                        "Encoder stream chunk {} could not be applied",
                        summary.encoder_chunks
                    )
                })?;
            summary.encoder_chunks += 1;
            continue;
        }

        summary.header_blocks += 1;
        match decoder.decode_header_block(&record.payload) {
            Ok(fields) => {
                debug!(stream_id = record.stream_id, fields = fields.len(), "Decoded block");
                qif::write_qif_block(&fields, &mut text);
            }
            Err(e) if settings.keep_going => {
                warn!(stream_id = record.stream_id, error = %e, "Skipping undecodable header block");
                summary.failed_blocks += 1;
                qif::write_qif_block(&[], &mut text);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Header block on stream {} could not be decoded", record.stream_id)
                });
            }
        }
    }

    Ok((text, summary))
}

/// Encode QIF text into a capture, one record per block on streams 1, 2, 3, ...
pub fn encode_file(input: &Path, output: &Path) -> Result<usize> {
    let text = std::fs::read(input)
        .with_context(|| format!("Failed to read QIF: {}", input.display()))?;
    let blocks =
        qif::parse_qif(&text).with_context(|| format!("Malformed QIF: {}", input.display()))?;

    let encoder = Encoder::new();
    let mut buf = BytesMut::new();
    for (stream_id, fields) in (1u64..).zip(&blocks) {
        let record = Record {
            stream_id,
            payload: encoder.encode_fields(fields),
        };
        qif::write_record(&record, &mut buf)?;
    }

    std::fs::write(output, &buf)
        .with_context(|| format!("Failed to write capture: {}", output.display()))?;

    info!(input = %input.display(), blocks = blocks.len(), bytes = buf.len(), "Encoded QIF");
    Ok(blocks.len())
}
