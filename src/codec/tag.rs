//! Type tag and number subtype constants.

// Value type tags
pub const NULL: u64 = 4;
pub const UNDEFINED: u64 = 5;
pub const NUMBER: u64 = 6;
pub const NUMBER_ARRAY: u64 = 7;
pub const STRING: u64 = 8;
pub const STRING_ARRAY: u64 = 9;
pub const BOOLEAN: u64 = 10;
pub const OBJECT: u64 = 11;
pub const OBJECT_ARRAY: u64 = 12;
pub const SUB_OBJECT: u64 = 13;
pub const MIX_ARRAY: u64 = 14;

// Number subtypes, always written ahead of a number payload
pub const INTEGER_POSITIVE: u64 = 0;
pub const INTEGER_NEGATIVE: u64 = 1;
pub const FLOAT_POSITIVE: u64 = 2;
pub const FLOAT_NEGATIVE: u64 = 3;

// Exact float subtypes: payload also carries the fractional digit count
pub const FLOAT_EXACT_POSITIVE: u64 = 4;
pub const FLOAT_EXACT_NEGATIVE: u64 = 5;

