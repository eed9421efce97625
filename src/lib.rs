//! nkserial — a self-describing, schema-deduplicating value codec.
//!
//! Values are written as sequences of 16-bit code units. Integers use a
//! self-terminating varint of 15-bit groups; objects nested inside an object
//! blob share a structure table so that each distinct key-set is stored once.
//!
//! # Architecture
//!
//! - **`varint`** — 15-bit group varints packed into code units
//! - **`codec`** — value encoding/decoding and the structure table
//! - **`types`** — the `Value` model (null, undefined, bool, number, string,
//!   array, object)
//! - **`transport`** — UTF-16 safe JSON wrapping and framed byte streams
//!
//! ```
//! use nkserial::{Value, decode_value, encode_value};
//!
//! let value = Value::Array(vec![Value::from("a"), Value::from(1.5)]);
//! let units = encode_value(&value).unwrap();
//! assert_eq!(decode_value(&units).unwrap(), value);
//! ```

pub mod codec;
pub mod error;
pub mod transport;
pub mod types;
pub mod varint;

pub use codec::{Codec, FloatFormat, decode_value, decode_value_prefix, encode_value};
pub use error::CodecError;
pub use types::{Object, Value};
