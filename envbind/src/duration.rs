//! Duration literals such as `300ms`, `1h30m` or `1.5h`
//!
//! A literal is a sequence of decimal numbers, each with an optional fraction
//! and a mandatory unit: `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`.
//! A bare `0` is accepted. Negative durations cannot be represented by
//! [`Duration`] and are rejected.

use std::time::Duration;

use crate::decode::{Decode, ValueError};
use crate::error::BoxError;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SECOND),
    ("m", 60 * NANOS_PER_SECOND),
    ("h", 3_600 * NANOS_PER_SECOND),
];

// Fraction digits past this are below a nanosecond for every unit.
const MAX_FRACTION_DIGITS: usize = 18;

pub(crate) fn parse_duration(value: &str) -> Result<Duration, ValueError> {
    let invalid = |reason: &'static str| ValueError::InvalidDuration {
        value: value.to_string(),
        reason,
    };

    let (negative, mut rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, after) = rest.split_at(int_len);

        let (frac_digits, after) = match after.strip_prefix('.') {
            Some(fraction) => {
                let frac_len = fraction.bytes().take_while(u8::is_ascii_digit).count();
                fraction.split_at(frac_len)
            }
            None => ("", after),
        };

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid("expected a number"));
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }

        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| invalid("unknown unit"))?;

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| invalid("overflow"))?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(|| invalid("overflow"))?;

        if !frac_digits.is_empty() {
            let kept = &frac_digits[..frac_digits.len().min(MAX_FRACTION_DIGITS)];
            let fraction: u128 = kept.parse().map_err(|_| invalid("overflow"))?;
            nanos = nanos
                .checked_add(fraction * scale / 10u128.pow(kept.len() as u32))
                .ok_or_else(|| invalid("overflow"))?;
        }

        total = total.checked_add(nanos).ok_or_else(|| invalid("overflow"))?;
        rest = tail;
    }

    if negative && total != 0 {
        return Err(invalid("negative durations are not supported"));
    }

    let nanos = u64::try_from(total).map_err(|_| invalid("overflow"))?;
    Ok(Duration::from_nanos(nanos))
}

impl Decode for Duration {
    fn decode(&mut self, value: &str) -> Result<(), BoxError> {
        *self = parse_duration(value)?;
        Ok(())
    }

    fn description() -> String {
        "Duration".to_string()
    }
}
