//! Duration literals: a sequence of decimal numbers, each with an optional
//! fraction and a mandatory unit suffix, such as `300ms`, `1.5h` or `2h45m`.
//!
//! Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
//! is accepted without a unit. Negative durations cannot be represented by
//! [`Duration`] and are rejected, except for `-0`.

use std::time::Duration;

use thiserror::Error as ThisError;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this are truncated; they cannot affect whole nanoseconds.
const MAX_FRACTION_DIGITS: usize = 18;

/// A duration literal could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DurationError {
    /// Not a duration at all.
    #[error("invalid duration {0:?}")]
    Invalid(String),

    /// A number without a unit suffix.
    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    /// A suffix outside the known units.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit {
        /// The unrecognized suffix.
        unit: String,
        /// The full input.
        input: String,
    },

    /// Too large to represent.
    #[error("invalid duration {0:?}: overflow")]
    Overflow(String),

    /// Below zero.
    #[error("negative duration {0:?} is not supported")]
    Negative(String),
}

/// Parses a duration literal.
///
/// # Errors
///
/// See [`DurationError`].
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;

    while !rest.is_empty() {
        let (whole, after_whole) = split_digits(rest);
        let (fraction, after_fraction) = match after_whole.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", after_whole),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = after_fraction
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_fraction.len());
        let (unit, tail) = after_fraction.split_at(unit_len);

        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }

        let scale = unit_scale(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let overflow = || DurationError::Overflow(input.to_string());

        let whole_nanos = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|n| n.checked_mul(scale))
                .ok_or_else(overflow)?
        };

        total = total
            .checked_add(whole_nanos)
            .and_then(|t| t.checked_add(fraction_nanos(fraction, scale)))
            .ok_or_else(overflow)?;

        rest = tail;
    }

    if total > u128::from(u64::MAX) {
        return Err(DurationError::Overflow(input.to_string()));
    }
    if negative && total > 0 {
        return Err(DurationError::Negative(input.to_string()));
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = u32::try_from(total % NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, nanos))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_scale(unit: &str) -> Option<u128> {
    let scale = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => NANOS_PER_MICRO,
        "ms" => NANOS_PER_MILLI,
        "s" => NANOS_PER_SEC,
        "m" => 60 * NANOS_PER_SEC,
        "h" => 3_600 * NANOS_PER_SEC,
        _ => return None,
    };
    Some(scale)
}

fn fraction_nanos(fraction: &str, scale: u128) -> u128 {
    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if digits.is_empty() {
        return 0;
    }

    // At most 18 ASCII digits.
    let numerator: u128 = digits.parse().unwrap_or(0);
    let denominator = 10u128.pow(digits.len() as u32);
    numerator * scale / denominator
}
