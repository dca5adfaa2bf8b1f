//! Arbitrary-precision base-10 numbers.
//!
//! A [`Decimal`] is `mantissa × 10^-scale` with a `BigInt` mantissa.
//! Addition, subtraction, multiplication and remainder are exact; division
//! rounds to an explicit number of fractional digits.

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Fractional digits kept by `/` when the quotient does not terminate.
pub const DIVISION_PRECISION: u32 = 28;

/// Exact decimal number.
///
/// Equality, ordering and hashing depend only on the numeric value:
/// `1.50`, `1.5` and `15e-1` are the same key.
#[derive(Clone)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

impl Decimal {
    pub fn new(mantissa: impl Into<BigInt>, scale: u32) -> Self {
        Decimal {
            mantissa: mantissa.into(),
            scale,
        }
    }

    pub fn zero() -> Self {
        Decimal::new(0, 0)
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Shortest decimal that reads back as the same `f64`, taking the
    /// digits of the standard library's shortest round-trip formatting.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        format!("{f}").parse().ok()
    }

    /// Shortest decimal that reads back as the same `f32`.
    ///
    /// Formatting at `f32` width keeps `0.1f32` as `0.1` instead of the
    /// digits of its widened `f64` value.
    pub fn from_f32(f: f32) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        format!("{f}").parse().ok()
    }

    /// Nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Same value with trailing fractional zeros removed.
    #[must_use]
    pub fn normalized(&self) -> Decimal {
        let mut mantissa = self.mantissa.clone();
        let mut scale = self.scale;
        let ten = BigInt::from(10u32);
        while scale > 0 && !mantissa.is_zero() && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }
        if mantissa.is_zero() {
            scale = 0;
        }
        Decimal { mantissa, scale }
    }

    /// Mantissa expressed at `scale`, which must be `>= self.scale`.
    fn mantissa_at(&self, scale: u32) -> BigInt {
        &self.mantissa * pow10(scale - self.scale)
    }

    /// Integer part, truncated toward zero.
    #[must_use]
    pub fn trunc(&self) -> Decimal {
        Decimal::new(&self.mantissa / pow10(self.scale), 0)
    }

    pub fn is_integer(&self) -> bool {
        (&self.mantissa % pow10(self.scale)).is_zero()
    }

    /// Exact conversion; `None` if fractional or outside `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.trunc().mantissa.to_i64()
        } else {
            None
        }
    }

    /// Exact conversion; `None` if fractional or outside `u64`.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_integer() {
            self.trunc().mantissa.to_u64()
        } else {
            None
        }
    }

    /// Integer part as `i64`; `None` if it does not fit.
    pub fn int_part(&self) -> Option<i64> {
        self.trunc().mantissa.to_i64()
    }

    /// `self / rhs` rounded half away from zero to `precision` fractional
    /// digits. `None` when `rhs` is zero.
    pub fn checked_div_round(&self, rhs: &Decimal, precision: u32) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        // q = m1 * 10^(precision + s2 - s1) / m2
        let shift = i64::from(precision) + i64::from(rhs.scale) - i64::from(self.scale);
        let (num, den) = if shift >= 0 {
            let shift = u32::try_from(shift).ok()?;
            (&self.mantissa * pow10(shift), rhs.mantissa.clone())
        } else {
            let shift = u32::try_from(-shift).ok()?;
            (self.mantissa.clone(), &rhs.mantissa * pow10(shift))
        };
        let mut quotient = &num / &den;
        let remainder = &num % &den;
        if (remainder.abs() * 2u32) >= den.abs() {
            if (num.sign() == Sign::Minus) == (den.sign() == Sign::Minus) {
                quotient += BigInt::one();
            } else {
                quotient -= BigInt::one();
            }
        }
        Some(Decimal::new(quotient, precision))
    }

    /// Truncated remainder: the result has the sign of `self`.
    /// `None` when `rhs` is zero.
    pub fn checked_rem(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        let scale = self.scale.max(rhs.scale);
        let r = self.mantissa_at(scale) % rhs.mantissa_at(scale);
        Some(Decimal::new(r, scale))
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Decimal::new(n, 0)
    }
}

impl From<u64> for Decimal {
    fn from(n: u64) -> Self {
        Decimal::new(n, 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(n: BigInt) -> Self {
        Decimal::new(n, 0)
    }
}

impl Add for &Decimal {
    type Output = Decimal;

    fn add(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(self.mantissa_at(scale) + rhs.mantissa_at(scale), scale)
    }
}

impl Sub for &Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &Decimal) -> Decimal {
        let scale = self.scale.max(rhs.scale);
        Decimal::new(self.mantissa_at(scale) - rhs.mantissa_at(scale), scale)
    }
}

impl Mul for &Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &Decimal) -> Decimal {
        Decimal::new(&self.mantissa * &rhs.mantissa, self.scale + rhs.scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-&self.mantissa, self.scale)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        -&self
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.mantissa_at(scale).cmp(&other.mantissa_at(scale))
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalized();
        n.mantissa.hash(state);
        n.scale.hash(state);
    }
}

/// Error parsing a decimal literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDecimalError(String);

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid number {:?}", self.0)
    }
}

impl std::error::Error for ParseDecimalError {}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDecimalError(s.to_owned());
        let (body, exponent) = match s.find(['e', 'E']) {
            Some(at) => {
                let exp: i64 = s[at + 1..].parse().map_err(|_| err())?;
                (&s[..at], exp)
            }
            None => (s, 0),
        };
        let (negative, body) = match body.as_bytes().first() {
            Some(b'-') => (true, &body[1..]),
            Some(b'+') => (false, &body[1..]),
            _ => (false, body),
        };
        let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(err());
        }
        if !int_digits.bytes().chain(frac_digits.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let digits = format!("{int_digits}{frac_digits}");
        let mut mantissa: BigInt = digits.parse().map_err(|_| err())?;
        if negative {
            mantissa = -mantissa;
        }
        let scale = i64::try_from(frac_digits.len()).map_err(|_| err())? - exponent;
        if scale >= 0 {
            Ok(Decimal::new(mantissa, u32::try_from(scale).map_err(|_| err())?))
        } else {
            let shift = u32::try_from(-scale).map_err(|_| err())?;
            Ok(Decimal::new(mantissa * pow10(shift), 0))
        }
    }
}

impl fmt::Display for Decimal {
    /// Plain notation without trailing fractional zeros.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.normalized();
        if n.scale == 0 {
            return write!(f, "{}", n.mantissa);
        }
        let digits = n.mantissa.abs().to_string();
        let scale = n.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{digits}", "0".repeat(scale - digits.len() + 1))
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        if n.mantissa.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "{int_part}.{frac_part}")
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
