//! Value encoding: `Value` → code units.

use num_bigint::BigUint;
use num_traits::FromPrimitive;

use super::options::{Codec, FloatFormat};
use super::structure::StructureTable;
use super::tag;
use crate::error::CodecError;
use crate::types::{Kind, Object, Value};
use crate::varint::{encode_varint, encode_varint_big};

/// 2^64 as f64; integral magnitudes below it fit a u64 exactly.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Recursive encoder carrying codec settings and the current depth.
pub(crate) struct Encoder<'c> {
    codec: &'c Codec,
    depth: usize,
}

impl<'c> Encoder<'c> {
    pub(crate) fn new(codec: &'c Codec) -> Self {
        Self { codec, depth: 0 }
    }

    /// Encodes any value. `structures` is the shared table of the enclosing
    /// object blob, or `None` outside of one.
    pub(crate) fn value(
        &mut self,
        buf: &mut Vec<u16>,
        value: &Value,
        structures: Option<&mut StructureTable>,
        tagged: bool,
    ) -> Result<(), CodecError> {
        match value {
            Value::Null => encode_tag(buf, tag::NULL, tagged),
            Value::Undefined => encode_tag(buf, tag::UNDEFINED, tagged),
            Value::Bool(b) => encode_bool(buf, *b, tagged),
            Value::Number(n) => encode_number(buf, *n, tagged, self.codec.float_format),
            Value::String(s) => encode_string(buf, s, tagged),
            Value::Array(items) => self.array(buf, items, structures, tagged)?,
            Value::Object(obj) => match structures {
                Some(table) => self.sub_object(buf, obj, table, tagged)?,
                None => {
                    encode_tag(buf, tag::OBJECT, tagged);
                    self.object(buf, obj)?;
                }
            },
        }
        Ok(())
    }

    fn array(
        &mut self,
        buf: &mut Vec<u16>,
        items: &[Value],
        mut structures: Option<&mut StructureTable>,
        tagged: bool,
    ) -> Result<(), CodecError> {
        self.enter()?;
        let kind = array_tag(items);
        encode_tag(buf, kind, tagged);
        encode_varint(buf, items.len() as u64);
        // Only mixed arrays tag their elements; the others imply the type.
        let tag_items = kind == tag::MIX_ARRAY;
        for item in items {
            self.value(buf, item, structures.as_deref_mut(), tag_items)?;
        }
        self.leave();
        Ok(())
    }

    /// Encodes a self-contained object blob with its own structure table.
    ///
    /// Layout: `[table len][table entries][own keys][tagged field values]`.
    /// The blob's own keys are written inline and never enter the table.
    pub(crate) fn object(&mut self, buf: &mut Vec<u16>, obj: &Object) -> Result<(), CodecError> {
        self.enter()?;
        let fields = sorted_fields(obj);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();

        let mut table = StructureTable::new();
        let mut body = Vec::new();
        encode_string_array(&mut body, &keys, false);
        for (_, value) in &fields {
            self.value(&mut body, value, Some(&mut table), true)?;
        }

        encode_varint(buf, table.len() as u64);
        for entry in table.iter() {
            encode_string_array(buf, entry, false);
        }
        buf.extend_from_slice(&body);
        tracing::debug!(
            structures = table.len(),
            fields = fields.len(),
            units = body.len(),
            "encoded object blob"
        );
        self.leave();
        Ok(())
    }

    /// Encodes an object by reference to the shared structure table.
    fn sub_object(
        &mut self,
        buf: &mut Vec<u16>,
        obj: &Object,
        table: &mut StructureTable,
        tagged: bool,
    ) -> Result<(), CodecError> {
        self.enter()?;
        let fields = sorted_fields(obj);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        let index = table.intern(&keys);

        encode_tag(buf, tag::SUB_OBJECT, tagged);
        encode_varint(buf, index as u64);
        for (_, value) in &fields {
            self.value(buf, value, Some(&mut *table), true)?;
        }
        self.leave();
        Ok(())
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

fn encode_tag(buf: &mut Vec<u16>, type_tag: u64, tagged: bool) {
    if tagged {
        encode_varint(buf, type_tag);
    }
}

/// Picks the array tag: homogeneous non-empty arrays of strings, numbers or
/// objects get a typed tag, everything else is mixed.
pub fn array_tag(items: &[Value]) -> u64 {
    let Some(first) = items.first().map(Value::kind) else {
        return tag::MIX_ARRAY;
    };
    if items.iter().any(|item| item.kind() != first) {
        return tag::MIX_ARRAY;
    }
    match first {
        Kind::String => tag::STRING_ARRAY,
        Kind::Number => tag::NUMBER_ARRAY,
        Kind::Object => tag::OBJECT_ARRAY,
        _ => tag::MIX_ARRAY,
    }
}

/// Object fields sorted by UTF-16 code unit order of their keys.
fn sorted_fields(obj: &Object) -> Vec<(&str, &Value)> {
    let mut fields: Vec<(&str, &Value)> = obj.iter().map(|(k, v)| (k.as_str(), v)).collect();
    fields.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
    fields
}

pub fn encode_bool(buf: &mut Vec<u16>, value: bool, tagged: bool) {
    encode_tag(buf, tag::BOOLEAN, tagged);
    encode_varint(buf, u64::from(value));
}

/// Encodes a number. NaN and infinities are written as zero.
pub fn encode_number(buf: &mut Vec<u16>, value: f64, tagged: bool, format: FloatFormat) {
    let value = if value.is_finite() {
        value
    } else {
        tracing::trace!(%value, "non-finite number encoded as 0");
        0.0
    };
    encode_tag(buf, tag::NUMBER, tagged);

    let negative = value < 0.0;
    let magnitude = value.abs();
    if magnitude.fract() == 0.0 {
        let subtype = if negative { tag::INTEGER_NEGATIVE } else { tag::INTEGER_POSITIVE };
        encode_varint(buf, subtype);
        encode_varint_big(buf, &integer_magnitude(magnitude));
        return;
    }

    // f64 Display is the shortest round-trip decimal and never uses an exponent.
    let text = magnitude.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    match format {
        FloatFormat::Legacy => {
            let subtype = if negative { tag::FLOAT_NEGATIVE } else { tag::FLOAT_POSITIVE };
            encode_varint(buf, subtype);
            encode_varint_big(buf, &parse_digits(int_part));
            encode_varint_big(buf, &parse_digits(frac_part));
        }
        FloatFormat::Exact => {
            let subtype = if negative {
                tag::FLOAT_EXACT_NEGATIVE
            } else {
                tag::FLOAT_EXACT_POSITIVE
            };
            encode_varint(buf, subtype);
            encode_varint_big(buf, &parse_digits(int_part));
            encode_varint(buf, frac_part.len() as u64);
            encode_varint_big(buf, &parse_digits(frac_part));
        }
    }
}

fn integer_magnitude(magnitude: f64) -> BigUint {
    if magnitude < U64_LIMIT {
        BigUint::from(magnitude as u64)
    } else {
        BigUint::from_f64(magnitude).unwrap_or_default()
    }
}

/// Parses a run of decimal digits; an empty run is zero.
fn parse_digits(digits: &str) -> BigUint {
    BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
}

/// Encodes a string as its UTF-16 length followed by its code units.
pub fn encode_string(buf: &mut Vec<u16>, value: &str, tagged: bool) {
    encode_tag(buf, tag::STRING, tagged);
    encode_varint(buf, value.encode_utf16().count() as u64);
    buf.extend(value.encode_utf16());
}

pub fn encode_string_array<S: AsRef<str>>(buf: &mut Vec<u16>, values: &[S], tagged: bool) {
    encode_tag(buf, tag::STRING_ARRAY, tagged);
    encode_varint(buf, values.len() as u64);
    for value in values {
        encode_string(buf, value.as_ref(), false);
    }
}
