//! Variable-length integers packed into 16-bit code units.
//!
//! A value is split into 15-bit groups, most significant group first. Each
//! group becomes one code unit whose bit 15 is the stop flag: clear on every
//! unit except the last.
//!
//! ```text
//! 0       -> [0x8000]
//! 32767   -> [0xFFFF]
//! 32768   -> [0x0001, 0x8000]
//! ```

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::CodecError;

/// Stop flag carried by the last unit of a varint.
pub const STOP_BIT: u16 = 0x8000;

/// Payload mask of a single unit.
pub const PAYLOAD_MASK: u16 = 0x7FFF;

/// Payload bits carried per unit.
pub const GROUP_BITS: u32 = 15;

/// Returns the number of units `encode_varint` emits for `value`.
pub fn varint_len(value: u64) -> usize {
    let bits = u64::BITS - value.leading_zeros();
    (bits.div_ceil(GROUP_BITS) as usize).max(1)
}

/// Appends `value` as a varint.
pub fn encode_varint(buf: &mut Vec<u16>, value: u64) {
    let groups = varint_len(value);
    for g in (0..groups).rev() {
        let unit = ((value >> (g as u32 * GROUP_BITS)) as u16) & PAYLOAD_MASK;
        buf.push(if g == 0 { unit | STOP_BIT } else { unit });
    }
}

/// Appends a signed value as a varint, rejecting negatives.
pub fn try_encode_varint(buf: &mut Vec<u16>, value: i64) -> Result<(), CodecError> {
    let value = u64::try_from(value).map_err(|_| {
        CodecError::InvalidArgument(format!("cannot encode negative varint {value}"))
    })?;
    encode_varint(buf, value);
    Ok(())
}

/// Appends an arbitrary-precision value as a varint.
pub fn encode_varint_big(buf: &mut Vec<u16>, value: &BigUint) {
    if let Some(small) = value.to_u64() {
        encode_varint(buf, small);
        return;
    }
    let digits = value.to_u32_digits();
    let digit = |i: usize| u64::from(digits.get(i).copied().unwrap_or(0));
    let groups = value.bits().div_ceil(u64::from(GROUP_BITS)) as usize;
    for g in (0..groups).rev() {
        let offset = g * GROUP_BITS as usize;
        let (word, shift) = (offset / 32, offset % 32);
        let window = digit(word) | (digit(word + 1) << 32);
        let unit = (window >> shift) as u16 & PAYLOAD_MASK;
        buf.push(if g == 0 { unit | STOP_BIT } else { unit });
    }
}

/// Decodes a varint from the start of `units`.
///
/// Returns the value and the number of units consumed.
pub fn decode_varint(units: &[u16]) -> Result<(u64, usize), CodecError> {
    let mut value: u64 = 0;
    for (i, &unit) in units.iter().enumerate() {
        if value > u64::MAX >> GROUP_BITS {
            return Err(CodecError::Overflow);
        }
        value = (value << GROUP_BITS) | u64::from(unit & PAYLOAD_MASK);
        if unit & STOP_BIT != 0 {
            return Ok((value, i + 1));
        }
    }
    Err(unterminated(units.len()))
}

/// Decodes a varint of any magnitude from the start of `units`.
///
/// Groups are packed into 32-bit digits least significant first, so the
/// cost is linear in the varint length.
pub fn decode_varint_big(units: &[u16]) -> Result<(BigUint, usize), CodecError> {
    let len = units
        .iter()
        .position(|unit| unit & STOP_BIT != 0)
        .map(|i| i + 1)
        .ok_or_else(|| unterminated(units.len()))?;

    let mut digits = Vec::with_capacity((len * GROUP_BITS as usize).div_ceil(32));
    let mut acc: u64 = 0;
    let mut acc_bits = 0;
    for &unit in units[..len].iter().rev() {
        acc |= u64::from(unit & PAYLOAD_MASK) << acc_bits;
        acc_bits += GROUP_BITS;
        if acc_bits >= 32 {
            digits.push(acc as u32);
            acc >>= 32;
            acc_bits -= 32;
        }
    }
    if acc_bits > 0 {
        digits.push(acc as u32);
    }
    Ok((BigUint::new(digits), len))
}

fn unterminated(len: usize) -> CodecError {
    CodecError::malformed(format!("varint not terminated within {len} units"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u16> {
        let mut buf = Vec::new();
        encode_varint(&mut buf, value);
        buf
    }

    #[test]
    fn zero_is_a_single_stop_unit() {
        assert_eq!(encoded(0), vec![0x8000]);
    }

    #[test]
    fn group_boundaries() {
        assert_eq!(encoded(1), vec![0x8001]);
        assert_eq!(encoded(127), vec![0x807F]);
        assert_eq!(encoded(32767), vec![0xFFFF]);
        assert_eq!(encoded(32768), vec![0x0001, 0x8000]);
        assert_eq!(encoded(1 << 30), vec![0x0001, 0x0000, 0x8000]);
    }

    #[test]
    fn round_trip_representative_values() {
        for n in [0, 1, 127, 128, 32767, 32768, 1 << 30, (1 << 53) - 1, u64::MAX] {
            let buf = encoded(n);
            assert_eq!(buf.len(), varint_len(n), "length for {n}");
            assert_eq!(decode_varint(&buf).unwrap(), (n, buf.len()), "failed for {n}");
        }
    }

    #[test]
    fn decode_stops_at_first_terminal_unit() {
        let buf = [0x0002, 0x8003, 0x8009];
        assert_eq!(decode_varint(&buf).unwrap(), ((2 << 15) | 3, 2));
    }

    #[test]
    fn negative_input_is_rejected() {
        let mut buf = Vec::new();
        let err = try_encode_varint(&mut buf, -1).unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument(_)));
        assert!(buf.is_empty());

        try_encode_varint(&mut buf, 5).unwrap();
        assert_eq!(buf, vec![0x8005]);
    }

    #[test]
    fn unterminated_varint_is_malformed() {
        assert!(matches!(
            decode_varint(&[0x0001, 0x0002]),
            Err(CodecError::MalformedStream(_))
        ));
        assert!(matches!(decode_varint(&[]), Err(CodecError::MalformedStream(_))));
    }

    #[test]
    fn overflow_past_64_bits() {
        // Six full groups carry 90 bits.
        let buf = [0x7FFF, 0x7FFF, 0x7FFF, 0x7FFF, 0x7FFF, 0xFFFF];
        assert!(matches!(decode_varint(&buf), Err(CodecError::Overflow)));
        let (big, len) = decode_varint_big(&buf).unwrap();
        assert_eq!(len, 6);
        assert_eq!(big.bits(), 90);
    }

    #[test]
    fn long_big_varint_decodes_exactly() {
        // 2001 full groups: 2^(15 * 2001) - 1.
        let mut buf = vec![0x7FFF; 2000];
        buf.push(0xFFFF);
        buf.push(0x8001);
        let (value, len) = decode_varint_big(&buf).unwrap();
        assert_eq!(len, 2001);
        assert_eq!(value + 1u32, BigUint::from(1u32) << (15 * 2001));
    }

    #[test]
    fn big_varint_agrees_with_u64_decoding() {
        for n in [0, 1, 32767, 32768, 1 << 31, 1 << 47, u64::MAX] {
            let buf = encoded(n);
            let (big, len) = decode_varint_big(&buf).unwrap();
            assert_eq!(big, BigUint::from(n), "failed for {n}");
            assert_eq!(len, buf.len());
        }
    }

    #[test]
    fn big_varint_matches_small_encoding() {
        let mut small = Vec::new();
        let mut big = Vec::new();
        encode_varint(&mut small, 1 << 40);
        encode_varint_big(&mut big, &BigUint::from(1u64 << 40));
        assert_eq!(small, big);
    }

    #[test]
    fn big_varint_round_trip() {
        let value = BigUint::from(u64::MAX) * BigUint::from(1_000_003u64);
        let mut buf = Vec::new();
        encode_varint_big(&mut buf, &value);
        assert_eq!(buf.last().map(|u| u & STOP_BIT), Some(STOP_BIT));
        assert!(buf[..buf.len() - 1].iter().all(|u| u & STOP_BIT == 0));
        assert_eq!(decode_varint_big(&buf).unwrap(), (value, buf.len()));
    }
}
