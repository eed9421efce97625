//! Value decoding: code units → `Value`.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::options::Codec;
use super::structure::StructureTable;
use super::tag;
use crate::error::CodecError;
use crate::types::{Object, Value};
use crate::varint::{decode_varint, decode_varint_big};

/// Cursor over a blob, decoding values recursively.
pub(crate) struct Decoder<'c, 'a> {
    codec: &'c Codec,
    units: &'a [u16],
    pos: usize,
    depth: usize,
}

impl<'c, 'a> Decoder<'c, 'a> {
    pub(crate) fn new(codec: &'c Codec, units: &'a [u16]) -> Self {
        Self {
            codec,
            units,
            pos: 0,
            depth: 0,
        }
    }

    /// Units consumed so far.
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    fn remaining(&self) -> usize {
        self.units.len() - self.pos
    }

    fn varint(&mut self) -> Result<u64, CodecError> {
        let (value, len) = decode_varint(&self.units[self.pos..])?;
        self.pos += len;
        Ok(value)
    }

    /// Reads a number payload varint no longer than `max_units`.
    fn payload(&mut self, max_units: usize) -> Result<BigUint, CodecError> {
        let rest = &self.units[self.pos..];
        let window = &rest[..rest.len().min(max_units)];
        match decode_varint_big(window) {
            Ok((value, len)) => {
                self.pos += len;
                Ok(value)
            }
            Err(_) if rest.len() > max_units => Err(CodecError::malformed(format!(
                "number payload at unit {} longer than {max_units} units",
                self.pos
            ))),
            Err(e) => Err(e),
        }
    }

    /// Reads an element count. Every element occupies at least one unit, so
    /// a count larger than the rest of the buffer is rejected up front.
    fn count(&mut self) -> Result<usize, CodecError> {
        let count = self.varint()?;
        match usize::try_from(count) {
            Ok(n) if n <= self.remaining() => Ok(n),
            _ => Err(CodecError::malformed(format!(
                "count {count} exceeds {} remaining units",
                self.remaining()
            ))),
        }
    }

    /// Reads a type tag and decodes the value it announces.
    pub(crate) fn tagged(
        &mut self,
        structures: Option<&StructureTable>,
    ) -> Result<Value, CodecError> {
        let type_tag = self.varint()?;
        self.by_type(type_tag, structures)
    }

    fn by_type(
        &mut self,
        type_tag: u64,
        structures: Option<&StructureTable>,
    ) -> Result<Value, CodecError> {
        match type_tag {
            tag::NULL => Ok(Value::Null),
            tag::UNDEFINED => Ok(Value::Undefined),
            tag::BOOLEAN => Ok(Value::Bool(self.boolean()?)),
            tag::NUMBER => Ok(Value::Number(self.number()?)),
            tag::STRING => Ok(Value::String(self.string()?)),
            tag::STRING_ARRAY | tag::NUMBER_ARRAY | tag::OBJECT_ARRAY | tag::MIX_ARRAY => {
                self.array(type_tag, structures)
            }
            tag::OBJECT => Ok(Value::Object(self.object()?)),
            tag::SUB_OBJECT => match structures {
                Some(table) => Ok(Value::Object(self.sub_object(table)?)),
                None => Err(CodecError::malformed(format!(
                    "sub_object at unit {} outside of an object blob",
                    self.pos
                ))),
            },
            other => {
                tracing::warn!(tag = other, position = self.pos, "unknown type tag");
                Err(CodecError::UnknownType(other))
            }
        }
    }

    fn array(
        &mut self,
        kind: u64,
        structures: Option<&StructureTable>,
    ) -> Result<Value, CodecError> {
        self.enter()?;
        let count = self.count()?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let item = match kind {
                tag::STRING_ARRAY => Value::String(self.string()?),
                tag::NUMBER_ARRAY => Value::Number(self.number()?),
                tag::OBJECT_ARRAY => match structures {
                    Some(table) => Value::Object(self.sub_object(table)?),
                    None => Value::Object(self.object()?),
                },
                _ => self.tagged(structures)?,
            };
            items.push(item);
        }
        self.leave();
        Ok(Value::Array(items))
    }

    /// Decodes a self-contained object blob: its structure table, its own
    /// keys, then one tagged value per key.
    pub(crate) fn object(&mut self) -> Result<Object, CodecError> {
        self.enter()?;
        let entries = self.count()?;
        let mut table = StructureTable::new();
        for _ in 0..entries {
            let keys = self.string_array()?;
            table.push(keys);
        }
        tracing::debug!(structures = table.len(), position = self.pos, "decoding object blob");

        let keys = self.string_array()?;
        let obj = self.fields(keys, &table)?;
        self.leave();
        Ok(obj)
    }

    fn sub_object(&mut self, table: &StructureTable) -> Result<Object, CodecError> {
        self.enter()?;
        let index = self.varint()?;
        let keys = usize::try_from(index)
            .ok()
            .and_then(|i| table.get(i))
            .ok_or_else(|| {
                CodecError::malformed(format!(
                    "structure index {index} out of range ({} entries)",
                    table.len()
                ))
            })?;
        let obj = self.fields(keys.iter().cloned(), table)?;
        self.leave();
        Ok(obj)
    }

    fn fields(
        &mut self,
        keys: impl IntoIterator<Item = String>,
        table: &StructureTable,
    ) -> Result<Object, CodecError> {
        let mut obj = Object::new();
        for key in keys {
            let value = self.tagged(Some(table))?;
            obj.insert(key, value);
        }
        Ok(obj)
    }

    fn string_array(&mut self) -> Result<Vec<String>, CodecError> {
        let count = self.count()?;
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            strings.push(self.string()?);
        }
        Ok(strings)
    }

    fn string(&mut self) -> Result<String, CodecError> {
        let len = self.varint()?;
        let len = match usize::try_from(len) {
            Ok(n) if n <= self.remaining() => n,
            _ => {
                return Err(CodecError::malformed(format!(
                    "string of {len} units but only {} remaining",
                    self.remaining()
                )));
            }
        };
        let data = &self.units[self.pos..self.pos + len];
        let s = String::from_utf16(data)
            .map_err(|e| CodecError::malformed(format!("invalid UTF-16 string: {e}")))?;
        self.pos += len;
        Ok(s)
    }

    fn boolean(&mut self) -> Result<bool, CodecError> {
        Ok(self.varint()? != 0)
    }

    fn number(&mut self) -> Result<f64, CodecError> {
        let subtype = self.varint()?;
        let (negative, magnitude) = match subtype {
            tag::INTEGER_POSITIVE | tag::INTEGER_NEGATIVE => {
                let int = self.payload(MAX_INTEGER_UNITS)?;
                (
                    subtype == tag::INTEGER_NEGATIVE,
                    int.to_f64().unwrap_or(f64::INFINITY),
                )
            }
            tag::FLOAT_POSITIVE | tag::FLOAT_NEGATIVE => {
                let int = self.payload(MAX_INTEGER_UNITS)?;
                let frac = self.payload(MAX_FRACTION_UNITS)?;
                (subtype == tag::FLOAT_NEGATIVE, parse_float(&int, &frac.to_string())?)
            }
            tag::FLOAT_EXACT_POSITIVE | tag::FLOAT_EXACT_NEGATIVE => {
                let int = self.payload(MAX_INTEGER_UNITS)?;
                let scale = self.varint()?;
                let frac = self.payload(MAX_FRACTION_UNITS)?.to_string();
                let scale = usize::try_from(scale)
                    .ok()
                    .filter(|&s| s >= frac.len() && s <= MAX_FRACTION_DIGITS)
                    .ok_or_else(|| {
                        CodecError::malformed(format!(
                            "fraction scale {scale} invalid for digits {frac}"
                        ))
                    })?;
                let padded = format!("{}{frac}", "0".repeat(scale - frac.len()));
                (subtype == tag::FLOAT_EXACT_NEGATIVE, parse_float(&int, &padded)?)
            }
            other => return Err(CodecError::UnknownNumberType(other)),
        };
        if !magnitude.is_finite() {
            return Err(CodecError::malformed(format!(
                "number at unit {} is out of f64 range",
                self.pos
            )));
        }
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn enter(&mut self) -> Result<(), CodecError> {
        self.depth += 1;
        if self.depth > self.codec.max_depth {
            return Err(CodecError::DepthLimit(self.codec.max_depth));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// Upper bound on fractional digits; f64 never needs more than ~1075.
const MAX_FRACTION_DIGITS: usize = 1100;

/// Units covering 1024 bits, the integer part of `f64::MAX`.
const MAX_INTEGER_UNITS: usize = 69;

/// Units covering `MAX_FRACTION_DIGITS` decimal digits (~3655 bits).
const MAX_FRACTION_UNITS: usize = 244;

fn parse_float(int: &BigUint, frac: &str) -> Result<f64, CodecError> {
    format!("{int}.{frac}")
        .parse::<f64>()
        .map_err(|e| CodecError::malformed(format!("invalid float {int}.{frac}: {e}")))
}

// -- Single-component decoders --

/// Decodes an untagged number, returning it with the units consumed.
pub fn decode_number(units: &[u16]) -> Result<(f64, usize), CodecError> {
    let codec = Codec::new();
    let mut decoder = Decoder::new(&codec, units);
    let value = decoder.number()?;
    Ok((value, decoder.position()))
}

/// Decodes an untagged string, returning it with the units consumed.
pub fn decode_string(units: &[u16]) -> Result<(String, usize), CodecError> {
    let codec = Codec::new();
    let mut decoder = Decoder::new(&codec, units);
    let value = decoder.string()?;
    Ok((value, decoder.position()))
}

/// Decodes an untagged boolean, returning it with the units consumed.
pub fn decode_bool(units: &[u16]) -> Result<(bool, usize), CodecError> {
    let codec = Codec::new();
    let mut decoder = Decoder::new(&codec, units);
    let value = decoder.boolean()?;
    Ok((value, decoder.position()))
}

/// Decodes an untagged string array, returning it with the units consumed.
pub fn decode_string_array(units: &[u16]) -> Result<(Vec<String>, usize), CodecError> {
    let codec = Codec::new();
    let mut decoder = Decoder::new(&codec, units);
    let value = decoder.string_array()?;
    Ok((value, decoder.position()))
}
