//! # Percentage
//!
//! Decimal percentages used by taxes and percentage discounts.
//!
//! The remote catalog exchanges percentages as decimal strings (`"8.875"`).
//! Locally they are held as an integer scaled by 10^4, the same trick the
//! integer [`Money`](crate::money::Money) type uses, so no float ever touches
//! a rate and equality is exact.
//!
//! ```text
//!   "7.25"   ──parse──►  Percentage(72_500)  ──display──►  "7.25"
//!   "8.875"  ──parse──►  Percentage(88_750)  ──display──►  "8.875"
//!   "100"    ──parse──►  Percentage(1_000_000)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fractional digits kept.
pub const PERCENTAGE_SCALE_DIGITS: usize = 4;

const SCALE: u32 = 10_000;
const MAX_SCALED: u32 = 100 * SCALE;

/// A percentage between 0 and 100 with up to four fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Percentage(u32);

impl Percentage {
    /// Creates a percentage from basis points (825 = 8.25%).
    ///
    /// ## Example
    /// ```rust
    /// use catalog_core::percentage::Percentage;
    ///
    /// let rate = Percentage::from_bps(825).unwrap();
    /// assert_eq!(rate.to_string(), "8.25");
    /// ```
    pub fn from_bps(bps: u32) -> Result<Self, ValidationError> {
        Self::from_scaled(bps.saturating_mul(100))
    }

    /// Creates a percentage from its value scaled by 10^4.
    pub fn from_scaled(scaled: u32) -> Result<Self, ValidationError> {
        if scaled > MAX_SCALED {
            return Err(ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(Percentage(scaled))
    }

    /// Returns the value scaled by 10^4.
    #[inline]
    pub const fn scaled(&self) -> u32 {
        self.0
    }

    /// Checks if the percentage is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Percentage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::required("percentage"));
        }

        let bad = |reason: &str| ValidationError::invalid_format("percentage", reason);

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(bad("expected a decimal number such as 7.25"));
        }

        let whole: u32 = whole
            .parse()
            .map_err(|_| bad("whole part is too large"))?;
        if whole > 100 {
            return Err(ValidationError::OutOfRange {
                field: "percentage".to_string(),
                min: 0,
                max: 100,
            });
        }

        let mut fraction = 0u32;
        if let Some(frac) = frac {
            if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
                return Err(bad("expected digits after the decimal point"));
            }
            if frac.len() > PERCENTAGE_SCALE_DIGITS {
                return Err(bad("at most four fractional digits are supported"));
            }
            let padded = format!("{:0<width$}", frac, width = PERCENTAGE_SCALE_DIGITS);
            fraction = padded
                .parse()
                .map_err(|_| bad("expected digits after the decimal point"))?;
        }

        Self::from_scaled(whole * SCALE + fraction)
    }
}

impl TryFrom<String> for Percentage {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Percentage> for String {
    fn from(value: Percentage) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SCALE;
        let frac = self.0 % SCALE;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:04}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let cases = [
            ("7.25", 72_500, "7.25"),
            ("8.875", 88_750, "8.875"),
            ("0", 0, "0"),
            ("5.0", 50_000, "5"),
            ("100", 1_000_000, "100"),
            ("0.0001", 1, "0.0001"),
        ];
        for (input, scaled, shown) in cases {
            let pct: Percentage = input.parse().unwrap();
            assert_eq!(pct.scaled(), scaled, "{}", input);
            assert_eq!(pct.to_string(), shown, "{}", input);
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("".parse::<Percentage>().is_err());
        assert!("abc".parse::<Percentage>().is_err());
        assert!("-5".parse::<Percentage>().is_err());
        assert!(".5".parse::<Percentage>().is_err());
        assert!("5.".parse::<Percentage>().is_err());
        assert!("1.23456".parse::<Percentage>().is_err());
        assert!("100.5".parse::<Percentage>().is_err());
        assert!("101".parse::<Percentage>().is_err());
    }

    #[test]
    fn test_from_bps() {
        assert_eq!(Percentage::from_bps(825).unwrap().to_string(), "8.25");
        assert!(Percentage::from_bps(10_001).is_err());
    }

    #[test]
    fn test_serde_uses_decimal_string() {
        let pct: Percentage = "8.875".parse().unwrap();
        assert_eq!(serde_json::to_value(pct).unwrap(), serde_json::json!("8.875"));

        let back: Percentage = serde_json::from_value(serde_json::json!("8.875")).unwrap();
        assert_eq!(back, pct);

        assert!(serde_json::from_value::<Percentage>(serde_json::json!("lots")).is_err());
    }
}
