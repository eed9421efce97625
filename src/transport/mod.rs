//! Carrying blobs over byte- and text-oriented transports.

pub mod reader;
pub mod text;
pub mod writer;

pub use reader::FrameReader;
pub use writer::FrameWriter;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::CodecError;

/// Maximum code units per chunk of a frame.
pub const MAX_CHUNK_UNITS: usize = 32767;

/// Default cap on the code units a `FrameReader` buffers for one blob.
pub const DEFAULT_MAX_BLOB_UNITS: usize = 16 * 1024 * 1024;

/// Returns the big-endian byte form of a blob.
pub fn units_to_bytes(units: &[u16]) -> Bytes {
    let mut buf = BytesMut::with_capacity(units.len() * 2);
    for &unit in units {
        buf.put_u16(unit);
    }
    buf.freeze()
}

/// Reads a blob back from its big-endian byte form.
pub fn bytes_to_units(mut buf: impl Buf) -> Result<Vec<u16>, CodecError> {
    if buf.remaining() % 2 != 0 {
        return Err(CodecError::Transport(format!(
            "odd byte length {} for 16-bit code units",
            buf.remaining()
        )));
    }
    let mut units = Vec::with_capacity(buf.remaining() / 2);
    while buf.has_remaining() {
        units.push(buf.get_u16());
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_byte_form() {
        let bytes = units_to_bytes(&[0x8001, 0xD800]);
        assert_eq!(&bytes[..], &[0x80, 0x01, 0xD8, 0x00]);
        assert_eq!(bytes_to_units(bytes).unwrap(), vec![0x8001, 0xD800]);
    }

    #[test]
    fn odd_length_is_rejected() {
        assert!(matches!(
            bytes_to_units(&[0x80, 0x01, 0x02][..]),
            Err(CodecError::Transport(_))
        ));
    }
}
