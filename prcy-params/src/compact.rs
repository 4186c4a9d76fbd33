//! Compact difficulty ("bits") codec

use crate::{Error, Result};
use primitive_types::U256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Expand a compact difficulty into its 256-bit target.
///
/// Negative encodings and encodings whose value does not fit in 256 bits are
/// rejected; a zero mantissa decodes to zero regardless of the exponent.
pub fn decode_compact(bits: u32) -> Result<U256> {
    let size = bits >> 24;
    let word = bits & MANTISSA_MASK;
    if word == 0 {
        return Ok(U256::zero());
    }

    if bits & SIGN_BIT != 0 {
        return Err(Error::InvalidCompact(bits));
    }
    let overflow = size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32);
    if overflow {
        return Err(Error::InvalidCompact(bits));
    }

    if size <= 3 {
        Ok(U256::from(word >> (8 * (3 - size))))
    } else {
        Ok(U256::from(word) << (8 * (size - 3)) as usize)
    }
}

/// Pack a 256-bit target into normalised compact form.
pub fn encode_compact(target: U256) -> u32 {
    let mut size = ((target.bits() + 7) / 8) as u32;
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (target >> (8 * (size - 3)) as usize).low_u64() as u32
    };

    // The mantissa must not look negative.
    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }
    compact | (size << 24)
}
