//! Fixed-point text rendering for readings
//!
//! Values are shown as `[-]integer.fff`: exactly three fractional digits,
//! truncated toward zero rather than rounded. The split happens only here; the
//! processing core works on `f32` throughout.

use core::fmt;

/// Fractional digits kept when rendering
pub const FRACTION_DIGITS: usize = 3;

const FRACTION_SCALE: f32 = 1000.0;

/// A reading split into sign, integer part and truncated thousandths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedParts {
    pub negative: bool,
    pub integer: u64,
    pub thousandths: u16,
}

impl FixedParts {
    /// Split a finite value. Returns `None` for NaN and infinities.
    pub fn split(value: f32) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let magnitude = if value < 0.0 { -value } else { value };
        // `as` truncates toward zero
        let integer = magnitude as u64;
        let thousandths = ((magnitude - integer as f32) * FRACTION_SCALE) as u16;
        let thousandths = thousandths.min(999);

        Some(Self {
            // -0.0004 renders as 0.000, not -0.000
            negative: value < 0.0 && (integer != 0 || thousandths != 0),
            integer,
            thousandths,
        })
    }
}

/// `Display` adapter rendering a single value with three truncated decimals.
#[derive(Debug, Clone, Copy)]
pub struct Milli(pub f32);

impl fmt::Display for Milli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match FixedParts::split(self.0) {
            Some(parts) => {
                if parts.negative {
                    f.write_str("-")?;
                }
                write!(f, "{}.{:03}", parts.integer, parts.thousandths)
            }
            None => write!(f, "{}", self.0),
        }
    }
}

/// `Display` adapter rendering a slice as `[a, b, c]`.
#[derive(Debug, Clone, Copy)]
pub struct MilliSlice<'a>(pub &'a [f32]);

impl fmt::Display for MilliSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Milli(*value))?;
        }
        f.write_str("]")
    }
}
