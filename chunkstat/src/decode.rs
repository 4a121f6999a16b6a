use crate::error::{AggError, Result};

const ZERO: i64 = b'0' as i64;

#[inline(always)]
fn is_digit(byte: u8) -> bool {
    byte.is_ascii_digit()
}

/// Decodes `-?D{1,2}.D` at the start of `bytes` into tenths.
///
/// Returns the scaled value and the number of bytes consumed. Only the
/// position of the `.` is inspected to tell `D.D` from `DD.D`; the value
/// comes from a single expression over the character codes.
#[inline]
pub fn parse_tenths(bytes: &[u8]) -> Result<(i64, usize)> {
    let negative = bytes.first() == Some(&b'-');
    let digits = if negative { &bytes[1..] } else { bytes };

    let (value, len) = match digits {
        [a, b'.', c, ..] if is_digit(*a) && is_digit(*c) => {
            // 1.2
            (*a as i64 * 10 + *c as i64 - ZERO * 11, 3)
        }
        [a, b, b'.', c, ..] if is_digit(*a) && is_digit(*b) && is_digit(*c) => {
            // 12.3
            (
                *a as i64 * 100 + *b as i64 * 10 + *c as i64 - ZERO * 111,
                4,
            )
        }
        _ => return Err(AggError::format(bytes, "value is not -?D{1,2}.D")),
    };

    if negative {
        Ok((-value, len + 1))
    } else {
        Ok((value, len))
    }
}
