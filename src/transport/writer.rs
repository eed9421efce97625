//! Writes framed blobs to an async byte stream.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::MAX_CHUNK_UNITS;
use crate::codec::Codec;
use crate::error::CodecError;
use crate::types::Value;

/// Writes blobs to an `AsyncWrite` stream, one frame per blob.
pub struct FrameWriter<W> {
    writer: W,
    max_chunk_units: usize,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            max_chunk_units: MAX_CHUNK_UNITS,
        }
    }

    /// Writes a complete blob, splitting it into chunks if needed,
    /// and appends the zero-length terminator.
    pub async fn write_blob(&mut self, units: &[u16]) -> Result<(), CodecError> {
        let mut frame = BytesMut::with_capacity(units.len() * 2 + 4);
        for chunk in units.chunks(self.max_chunk_units) {
            frame.put_u16(chunk.len() as u16);
            for &unit in chunk {
                frame.put_u16(unit);
            }
        }
        frame.put_u16(0);
        self.writer.write_all(&frame).await?;
        tracing::debug!(units = units.len(), bytes = frame.len(), "wrote blob frame");
        Ok(())
    }

    /// Encodes `value` and writes it as one frame.
    pub async fn write_value(&mut self, codec: &Codec, value: &Value) -> Result<(), CodecError> {
        let units = codec.encode(value)?;
        self.write_blob(&units).await
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
