//! Codec configuration.

use crate::codec::{decode, encode};
use crate::error::CodecError;
use crate::types::Value;

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How non-integer numbers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatFormat {
    /// Integer part and fractional digits as two integers. Leading zeros of
    /// the fraction are lost, so `1.05` reads back as `1.5`.
    #[default]
    Legacy,
    /// Also records the fractional digit count. Decoders accept both forms.
    Exact,
}

/// Configured encoder/decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    pub(crate) float_format: FloatFormat,
    pub(crate) max_depth: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec {
    /// Creates a codec writing the legacy float format.
    pub fn new() -> Self {
        Self {
            float_format: FloatFormat::Legacy,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the float format used when encoding.
    pub fn float_format(mut self, format: FloatFormat) -> Self {
        self.float_format = format;
        self
    }

    /// Sets the maximum nesting depth accepted by encode and decode.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Encodes `value` as a tagged top-level blob.
    pub fn encode(&self, value: &Value) -> Result<Vec<u16>, CodecError> {
        let mut buf = Vec::new();
        encode::Encoder::new(self).value(&mut buf, value, None, true)?;
        Ok(buf)
    }

    /// Decodes a complete blob. Trailing units are an error.
    pub fn decode(&self, units: &[u16]) -> Result<Value, CodecError> {
        let (value, len) = self.decode_prefix(units)?;
        if len != units.len() {
            return Err(CodecError::TrailingData(units.len() - len));
        }
        Ok(value)
    }

    /// Decodes one value from the start of `units`, returning it with the
    /// number of units consumed.
    pub fn decode_prefix(&self, units: &[u16]) -> Result<(Value, usize), CodecError> {
        let mut decoder = decode::Decoder::new(self, units);
        let value = decoder.tagged(None)?;
        Ok((value, decoder.position()))
    }
}
