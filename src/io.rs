//! Adapters between the in-memory codec and readers, writers and files.
//!
//! The codec works on fully buffered data, so each function drains its reader before anything
//! is written. Codec errors are reported as `io::Error` of kind `InvalidData` carrying the
//! [`LzwError`], which can be recovered with `into_inner` and `downcast`.
//!
//! [`LzwError`]: ../enum.LzwError.html
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::container::{self, HEADER_LEN};
use crate::error::LzwError;

/// Sizes of one compression or decompression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Uncompressed size in bytes.
    pub input_size: u64,
    /// Container size in bytes.
    pub output_size: u64,
    /// Number of codes in the container.
    pub code_count: u32,
    /// Padding bits of the final payload byte.
    pub padding_bits: u8,
    /// Width of each code.
    pub max_bits: u8,
}

impl Summary {
    /// The compression ratio, container size over original size.
    ///
    /// There is no meaningful ratio for empty data.
    pub fn ratio(&self) -> Option<f64> {
        if self.input_size == 0 {
            None
        } else {
            Some(self.output_size as f64 / self.input_size as f64)
        }
    }

    fn of(data: &[u8], compressed: &[u8]) -> io::Result<Self> {
        let header = container::inspect(compressed).map_err(invalid_data)?;
        Ok(Summary {
            input_size: data.len() as u64,
            output_size: compressed.len() as u64,
            code_count: header.code_count,
            padding_bits: header.padding_bits,
            max_bits: header.max_bits,
        })
    }
}

/// Compress all data from `read` into a container written to `write`.
pub fn compress_stream(
    mut read: impl Read,
    mut write: impl Write,
    max_bits: u8,
) -> io::Result<Summary> {
    let mut data = vec![];
    read.read_to_end(&mut data)?;
    let compressed = container::compress(&data, max_bits).map_err(invalid_data)?;
    write.write_all(&compressed)?;
    write.flush()?;

    let summary = Summary::of(&data, &compressed)?;
    log_compressed(&summary);
    Ok(summary)
}

/// Decompress a container from `read`, writing the restored data to `write`.
///
/// Nothing is written if the container is rejected.
pub fn decompress_stream(mut read: impl Read, mut write: impl Write) -> io::Result<Summary> {
    let mut compressed = vec![];
    read.read_to_end(&mut compressed)?;
    let data = container::decompress(&compressed).map_err(invalid_data)?;
    write.write_all(&data)?;
    write.flush()?;

    let summary = Summary::of(&data, &compressed)?;
    log_decompressed(&summary);
    Ok(summary)
}

/// Compress the file at `input` into a new container file at `output`.
pub fn compress_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    max_bits: u8,
) -> io::Result<Summary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    tracing::trace!(input = %input.display(), output = %output.display(), "compressing file");
    let data = fs::read(input)?;
    let compressed = container::compress(&data, max_bits).map_err(invalid_data)?;
    fs::write(output, &compressed)?;

    let summary = Summary::of(&data, &compressed)?;
    log_compressed(&summary);
    Ok(summary)
}

/// Decompress the container file at `input` into `output`.
///
/// The output file is only created once the whole container decoded successfully.
pub fn decompress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> io::Result<Summary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    tracing::trace!(input = %input.display(), output = %output.display(), "decompressing file");
    let compressed = fs::read(input)?;
    let data = container::decompress(&compressed).map_err(invalid_data)?;
    fs::write(output, &data)?;

    let summary = Summary::of(&data, &compressed)?;
    log_decompressed(&summary);
    Ok(summary)
}

/// Compress all data from an async reader into an async writer.
#[cfg(feature = "async")]
pub async fn compress_async<R, W>(mut read: R, mut write: W, max_bits: u8) -> io::Result<Summary>
where
    R: futures::io::AsyncRead + Unpin,
    W: futures::io::AsyncWrite + Unpin,
{
    use futures::io::{AsyncReadExt, AsyncWriteExt};

    let mut data = vec![];
    read.read_to_end(&mut data).await?;
    let compressed = container::compress(&data, max_bits).map_err(invalid_data)?;
    write.write_all(&compressed).await?;
    write.flush().await?;

    let summary = Summary::of(&data, &compressed)?;
    log_compressed(&summary);
    Ok(summary)
}

/// Decompress a container from an async reader into an async writer.
#[cfg(feature = "async")]
pub async fn decompress_async<R, W>(mut read: R, mut write: W) -> io::Result<Summary>
where
    R: futures::io::AsyncRead + Unpin,
    W: futures::io::AsyncWrite + Unpin,
{
    use futures::io::{AsyncReadExt, AsyncWriteExt};

    let mut compressed = vec![];
    read.read_to_end(&mut compressed).await?;
    let data = container::decompress(&compressed).map_err(invalid_data)?;
    write.write_all(&data).await?;
    write.flush().await?;

    let summary = Summary::of(&data, &compressed)?;
    log_decompressed(&summary);
    Ok(summary)
}

fn invalid_data(err: LzwError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

fn log_compressed(summary: &Summary) {
    tracing::debug!(
        input_size = summary.input_size,
        output_size = summary.output_size,
        code_count = summary.code_count,
        padding_bits = summary.padding_bits,
        max_bits = summary.max_bits,
        payload = summary.output_size - HEADER_LEN as u64,
        "compressed"
    );
}

fn log_decompressed(summary: &Summary) {
    tracing::debug!(
        input_size = summary.input_size,
        output_size = summary.output_size,
        code_count = summary.code_count,
        max_bits = summary.max_bits,
        "decompressed"
    );
}
