//! Reads framed blobs from an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{DEFAULT_MAX_BLOB_UNITS, MAX_CHUNK_UNITS, bytes_to_units};
use crate::codec::Codec;
use crate::error::CodecError;
use crate::types::Value;

/// Reads blobs from an `AsyncRead` stream.
///
/// Each blob consists of one or more chunks (2-byte big-endian unit count
/// followed by that many big-endian code units), terminated by a zero-length
/// chunk.
pub struct FrameReader<R> {
    reader: R,
    buf: BytesMut,
    max_blob_units: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(MAX_CHUNK_UNITS * 2),
            max_blob_units: DEFAULT_MAX_BLOB_UNITS,
        }
    }

    /// Rejects blobs longer than `limit` code units.
    pub fn max_blob_units(mut self, limit: usize) -> Self {
        self.max_blob_units = limit;
        self
    }

    /// Reads a complete blob (all chunks until the terminator).
    pub async fn read_blob(&mut self) -> Result<Vec<u16>, CodecError> {
        let mut blob = Vec::new();

        loop {
            let mut header = [0u8; 2];
            self.reader.read_exact(&mut header).await?;
            let chunk_units = u16::from_be_bytes(header) as usize;

            if chunk_units == 0 {
                break;
            }
            if blob.len() + chunk_units > self.max_blob_units {
                return Err(CodecError::Transport(format!(
                    "blob exceeds limit of {} units",
                    self.max_blob_units
                )));
            }

            let byte_len = chunk_units * 2;
            self.buf.resize(byte_len, 0);
            self.reader.read_exact(&mut self.buf[..byte_len]).await?;
            blob.extend(bytes_to_units(&self.buf[..byte_len])?);
        }

        tracing::debug!(units = blob.len(), "read blob frame");
        Ok(blob)
    }

    /// Reads one frame and decodes it as a value.
    pub async fn read_value(&mut self, codec: &Codec) -> Result<Value, CodecError> {
        let units = self.read_blob().await?;
        codec.decode(&units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FrameWriter;
    use std::io::Cursor;

    #[tokio::test]
    async fn read_single_chunk_blob() {
        let data: Vec<u8> = vec![
            0x00, 0x02, // unit count = 2
            0x80, 0x01, 0x00, 0x61, // units
            0x00, 0x00, // terminator
        ];
        let mut reader = FrameReader::new(Cursor::new(data));
        let blob = reader.read_blob().await.unwrap();
        assert_eq!(blob, vec![0x8001, 0x0061]);
    }

    #[tokio::test]
    async fn read_multi_chunk_blob() {
        let data: Vec<u8> = vec![
            0x00, 0x01, 0xAA, 0xBB, // chunk 1: 1 unit
            0x00, 0x01, 0xCC, 0xDD, // chunk 2: 1 unit
            0x00, 0x00, // terminator
        ];
        let mut reader = FrameReader::new(Cursor::new(data));
        let blob = reader.read_blob().await.unwrap();
        assert_eq!(blob, vec![0xAABB, 0xCCDD]);
    }

    #[tokio::test]
    async fn read_empty_blob() {
        let data: Vec<u8> = vec![0x00, 0x00];
        let mut reader = FrameReader::new(Cursor::new(data));
        assert!(reader.read_blob().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn truncated_frame_is_io_error() {
        let data: Vec<u8> = vec![0x00, 0x02, 0x80, 0x01];
        let mut reader = FrameReader::new(Cursor::new(data));
        assert!(matches!(reader.read_blob().await, Err(CodecError::Io(_))));
    }

    #[tokio::test]
    async fn blob_limit() {
        let data: Vec<u8> = vec![0x00, 0x02, 0x80, 0x01, 0x80, 0x02, 0x00, 0x00];
        let mut reader = FrameReader::new(Cursor::new(data)).max_blob_units(1);
        assert!(matches!(reader.read_blob().await, Err(CodecError::Transport(_))));
    }

    #[tokio::test]
    async fn default_limit_bounds_unterminated_streams() {
        let reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(reader.max_blob_units, DEFAULT_MAX_BLOB_UNITS);

        // Full chunks with no terminator stop at the limit instead of buffering on.
        let mut data = Vec::new();
        for _ in 0..3 {
            data.extend_from_slice(&[0x00, 0x02, 0x80, 0x01, 0x80, 0x02]);
        }
        let mut reader = FrameReader::new(Cursor::new(data)).max_blob_units(4);
        assert!(matches!(reader.read_blob().await, Err(CodecError::Transport(_))));
    }

    #[tokio::test]
    async fn values_round_trip_over_a_stream() {
        let codec = Codec::new();
        let first = Value::from("x".repeat(MAX_CHUNK_UNITS + 10));
        let second = Value::Array(vec![Value::from(1), Value::Bool(false)]);

        let mut wire = Vec::new();
        let mut writer = FrameWriter::new(&mut wire);
        writer.write_value(&codec, &first).await.unwrap();
        writer.write_value(&codec, &second).await.unwrap();
        writer.flush().await.unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire));
        assert_eq!(reader.read_value(&codec).await.unwrap(), first);
        assert_eq!(reader.read_value(&codec).await.unwrap(), second);
    }
}
