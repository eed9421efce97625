//! Value codec over 16-bit varint code units.
//!
//! Every value that the decoder cannot infer from context is prefixed by a
//! type tag. Objects nested inside an object blob are written against a
//! per-blob structure table, so repeated key-sets are stored once.

pub mod decode;
pub mod encode;
pub mod options;
pub mod structure;
pub mod tag;

pub use decode::{decode_bool, decode_number, decode_string, decode_string_array};
pub use encode::{encode_bool, encode_number, encode_string, encode_string_array};
pub use options::{Codec, DEFAULT_MAX_DEPTH, FloatFormat};
pub use structure::StructureTable;

use crate::error::CodecError;
use crate::types::{Object, Value};

/// Encodes a value with the default codec settings.
pub fn encode_value(value: &Value) -> Result<Vec<u16>, CodecError> {
    Codec::new().encode(value)
}

/// Decodes a complete blob with the default codec settings.
pub fn decode_value(units: &[u16]) -> Result<Value, CodecError> {
    Codec::new().decode(units)
}

/// Decodes one value from the start of `units`, returning the units consumed.
pub fn decode_value_prefix(units: &[u16]) -> Result<(Value, usize), CodecError> {
    Codec::new().decode_prefix(units)
}

/// Encodes an untagged object blob: structure count, structure table, body.
pub fn encode_object(obj: &Object) -> Result<Vec<u16>, CodecError> {
    let codec = Codec::new();
    let mut buf = Vec::new();
    encode::Encoder::new(&codec).object(&mut buf, obj)?;
    Ok(buf)
}

/// Decodes an untagged object blob, returning the units consumed.
pub fn decode_object(units: &[u16]) -> Result<(Object, usize), CodecError> {
    let codec = Codec::new();
    let mut decoder = decode::Decoder::new(&codec, units);
    let obj = decoder.object()?;
    Ok((obj, decoder.position()))
}
