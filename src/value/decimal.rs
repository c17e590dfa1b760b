//! Opaque arbitrary-precision decimal scalar
//!
//! Decimals are carried as normalized digit strings. No arithmetic is
//! offered; the type only needs a canonical form for equality, a sign for
//! the standard validators and a literal for the plain form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Error returned when a string is not a decimal literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal literal '{0}'")]
pub struct ParseDecimalError(String);

/// Arbitrary-precision decimal number.
///
/// Stored as `(negative, unscaled digits, scale)` with leading and trailing
/// zeros stripped, so `"1.50"`, `"01.5"` and `"+1.5"` are all equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    digits: Arc<str>,
    scale: usize,
}

impl Decimal {
    /// Returns zero.
    pub fn zero() -> Self {
        Self {
            negative: false,
            digits: Arc::from("0"),
            scale: 0,
        }
    }

    /// Returns whether this decimal is zero.
    pub fn is_zero(&self) -> bool {
        &*self.digits == "0"
    }

    /// Returns the sign of this decimal as an ordering against zero.
    pub fn signum(&self) -> Ordering {
        if self.is_zero() {
            Ordering::Equal
        } else if self.negative {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }

    /// Returns the number of digits after the decimal point.
    pub fn scale(&self) -> usize {
        self.scale
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDecimalError(s.to_string());

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let frac_part = frac_part.trim_end_matches('0');
        let mut unscaled = String::with_capacity(int_part.len() + frac_part.len());
        unscaled.push_str(int_part);
        unscaled.push_str(frac_part);

        let trimmed = unscaled.trim_start_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::zero());
        }

        Ok(Self {
            negative,
            digits: Arc::from(trimmed),
            scale: frac_part.len(),
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        if self.scale == 0 {
            return f.write_str(&self.digits);
        }

        let padded;
        let digits: &str = if self.digits.len() <= self.scale {
            padded = format!("{:0>width$}", self.digits, width = self.scale + 1);
            &padded
        } else {
            &self.digits
        };
        let (int_part, frac_part) = digits.split_at(digits.len() - self.scale);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            digits: Arc::from(value.unsigned_abs().to_string()),
            scale: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_normalization() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("001.5"), dec("+1.5"));
        assert_eq!(dec("-0.000"), Decimal::zero());
        assert_eq!(dec("10"), Decimal::from(10));
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(dec("1.50").to_string(), "1.5");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("1200").to_string(), "1200");
        assert_eq!(dec("3.").to_string(), "3");
        assert_eq!(dec("-0").to_string(), "0");
    }

    #[test]
    fn test_signum() {
        assert_eq!(dec("0.001").signum(), Ordering::Greater);
        assert_eq!(dec("-12.5").signum(), Ordering::Less);
        assert_eq!(dec("0.0").signum(), Ordering::Equal);
    }

    #[test]
    fn test_rejects_garbage() {
        for s in ["", ".", "-", "1.2.3", "1e5", "abc", "1 0"] {
            assert!(s.parse::<Decimal>().is_err(), "accepted '{}'", s);
        }
    }

    #[test]
    fn test_large_precision_is_preserved() {
        let literal = "123456789012345678901234567890.000000000000000000001";
        assert_eq!(dec(literal).to_string(), literal);
    }
}
