// File-level helpers for the streaming encoder.
//
// `encode_file()` writes the coder property header followed by one zstd
// frame, using buffered I/O on both ends. With the `file-io` feature a
// SHA-256 of the input is computed while it streams through the encoder.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::compress::encoder::StreamEncoder;
use crate::compress::progress::ProgressSink;
use crate::error::EncodeError;
use crate::params::{CODER_PROPS_SIZE, CoderProps, EncoderConfig};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Input bytes consumed.
    pub input_size: u64,
    /// Compressed payload bytes (excluding the header).
    pub payload_size: u64,
    /// Total bytes written, header included.
    pub output_size: u64,
    /// Header written ahead of the payload.
    pub props: CoderProps,
    /// SHA-256 of the input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, create, flush).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Encoder error, including failures of the streams it was driving.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// encode_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path` as header + zstd frame.
///
/// `progress` receives cumulative (consumed, produced) totals; the produced
/// total counts payload bytes only. A partially written output file is left
/// behind on failure.
pub fn encode_file<P: ProgressSink + ?Sized>(
    input_path: &Path,
    output_path: &Path,
    config: EncoderConfig,
    progress: &mut P,
) -> Result<EncodeStats, IoError> {
    let input_file = File::open(input_path)?;
    let reader = BufReader::with_capacity(BUF_SIZE, input_file);

    let output_file = File::create(output_path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, output_file);

    let mut encoder = StreamEncoder::with_config(config);
    let props = encoder.coder_props();
    props.write_to(&mut writer)?;

    #[cfg(feature = "file-io")]
    let mut hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    {
        let mut hashing = HashingReader {
            inner: reader,
            hasher: &mut hasher,
        };
        encoder.code(&mut hashing, &mut writer, progress)?;
    }
    #[cfg(not(feature = "file-io"))]
    {
        let mut reader = reader;
        encoder.code(&mut reader, &mut writer, progress)?;
    }

    writer.flush()?;

    let (input_size, payload_size) = encoder.counters().snapshot();

    #[cfg(feature = "file-io")]
    let input_sha256 = Some(hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let input_sha256: Option<[u8; 32]> = None;

    log::debug!(
        "encoded {} -> {}: {input_size} -> {payload_size} bytes",
        input_path.display(),
        output_path.display()
    );

    Ok(EncodeStats {
        input_size,
        payload_size,
        output_size: payload_size + CODER_PROPS_SIZE as u64,
        props,
        input_sha256,
    })
}

/// Read the coder property header from the front of `reader`, leaving it
/// positioned at the payload.
pub fn read_coder_props<R: Read + ?Sized>(reader: &mut R) -> Result<CoderProps, IoError> {
    let mut buf = [0u8; CODER_PROPS_SIZE];
    reader.read_exact(&mut buf)?;
    Ok(CoderProps::from_bytes(&buf)?)
}

// ---------------------------------------------------------------------------
// Hashing reader (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingReader<'a, R: Read> {
    inner: R,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<R: Read> Read for HashingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
