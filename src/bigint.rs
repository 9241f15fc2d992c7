//! Arbitrary precision integers, the `BigInt` primitive.

use crate::gc::{empty_trace, Finalize, Trace};
use num_integer::Integer;
use num_traits::{pow::Pow, FromPrimitive, One, ToPrimitive, Zero};
use std::{
    fmt::{self, Display},
    ops::Deref,
    rc::Rc,
};

/// The BigInt primitive.
///
/// Cheap to clone: the underlying `num_bigint::BigInt` is behind an `Rc`,
/// and every arithmetic operation allocates a fresh value.
#[cfg_attr(feature = "deser", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Finalize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsBigInt(Rc<num_bigint::BigInt>);

// Safety: `JsBigInt` contains no garbage collected references.
unsafe impl Trace for JsBigInt {
    empty_trace!();
}

impl JsBigInt {
    #[inline]
    pub fn zero() -> Self {
        Self(Rc::new(num_bigint::BigInt::zero()))
    }

    #[inline]
    pub fn one() -> Self {
        Self(Rc::new(num_bigint::BigInt::one()))
    }

    #[inline]
    pub fn as_inner(&self) -> &num_bigint::BigInt {
        &self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Converts a string with the given radix to a `JsBigInt`, `None` when
    /// the text is not a valid integer in that radix.
    pub fn from_string_radix(string: &str, radix: u32) -> Option<Self> {
        num_bigint::BigInt::parse_bytes(string.as_bytes(), radix).map(Self::from)
    }

    /// Converts a decimal string to a `JsBigInt`. The empty string is `0n`.
    pub fn from_string(string: &str) -> Option<Self> {
        let string = string.trim();
        if string.is_empty() {
            return Some(Self::zero());
        }
        let (radix, digits) = match string.as_bytes() {
            [b'0', b'b', ..] | [b'0', b'B', ..] => (2, &string[2..]),
            [b'0', b'o', ..] | [b'0', b'O', ..] => (8, &string[2..]),
            [b'0', b'x', ..] | [b'0', b'X', ..] => (16, &string[2..]),
            _ => (10, string),
        };
        Self::from_string_radix(digits, radix)
    }

    /// Converts a finite, integral `f64` into a `JsBigInt`.
    pub fn try_from_f64(number: f64) -> Option<Self> {
        if number.is_finite() && number.fract() == 0.0 {
            num_bigint::BigInt::from_f64(number).map(Self::from)
        } else {
            None
        }
    }

    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::INFINITY)
    }

    #[inline]
    pub fn add(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() + y.as_inner())
    }

    #[inline]
    pub fn sub(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() - y.as_inner())
    }

    #[inline]
    pub fn mul(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() * y.as_inner())
    }

    /// Division truncating towards zero, `None` on division by zero.
    pub fn div(x: &Self, y: &Self) -> Option<Self> {
        if y.is_zero() {
            return None;
        }
        let (quotient, _) = x.as_inner().div_rem(y.as_inner());
        Some(Self::from(quotient))
    }

    /// Remainder with the sign of the dividend, `None` on division by zero.
    pub fn rem(x: &Self, y: &Self) -> Option<Self> {
        if y.is_zero() {
            return None;
        }
        let (_, remainder) = x.as_inner().div_rem(y.as_inner());
        Some(Self::from(remainder))
    }

    /// Exponentiation, `None` when the exponent is negative or absurdly big.
    pub fn pow(x: &Self, y: &Self) -> Option<Self> {
        let exponent = y.as_inner().to_biguint()?;
        let exponent = exponent.to_u32()?;
        Some(Self::from(Pow::pow(x.as_inner().clone(), exponent)))
    }

    #[inline]
    pub fn bitand(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() & y.as_inner())
    }

    #[inline]
    pub fn bitor(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() | y.as_inner())
    }

    #[inline]
    pub fn bitxor(x: &Self, y: &Self) -> Self {
        Self::from(x.as_inner() ^ y.as_inner())
    }

    /// Left shift; a negative shift amount shifts right instead.
    pub fn shl(x: &Self, y: &Self) -> Option<Self> {
        use std::convert::TryFrom;
        match y.as_inner().to_i64()? {
            shift if shift >= 0 => {
                let shift = usize::try_from(shift).ok()?;
                Some(Self::from(x.as_inner().clone() << shift))
            }
            shift => {
                let shift = usize::try_from(shift.checked_neg()?).ok()?;
                Some(Self::from(x.as_inner().clone() >> shift))
            }
        }
    }

    /// Right shift; a negative shift amount shifts left instead.
    pub fn shr(x: &Self, y: &Self) -> Option<Self> {
        let negated = Self::from(-y.as_inner().clone());
        Self::shl(x, &negated)
    }

    #[inline]
    pub fn neg(x: &Self) -> Self {
        Self::from(-x.as_inner().clone())
    }

    /// Bitwise not: `-x - 1`.
    #[inline]
    pub fn not(x: &Self) -> Self {
        Self::from(-x.as_inner().clone() - 1)
    }

    pub fn to_string_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }
}

impl Display for JsBigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Deref for JsBigInt {
    type Target = num_bigint::BigInt;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<num_bigint::BigInt> for JsBigInt {
    #[inline]
    fn from(value: num_bigint::BigInt) -> Self {
        Self(Rc::new(value))
    }
}

impl From<i64> for JsBigInt {
    #[inline]
    fn from(value: i64) -> Self {
        Self(Rc::new(num_bigint::BigInt::from(value)))
    }
}

impl From<i32> for JsBigInt {
    #[inline]
    fn from(value: i32) -> Self {
        Self(Rc::new(num_bigint::BigInt::from(value)))
    }
}

impl From<u64> for JsBigInt {
    #[inline]
    fn from(value: u64) -> Self {
        Self(Rc::new(num_bigint::BigInt::from(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::JsBigInt;

    #[test]
    fn parses_radix_prefixes() {
        assert_eq!(JsBigInt::from_string("0xff"), Some(JsBigInt::from(255)));
        assert_eq!(JsBigInt::from_string("0b101"), Some(JsBigInt::from(5)));
        assert_eq!(JsBigInt::from_string("0o17"), Some(JsBigInt::from(15)));
        assert_eq!(JsBigInt::from_string(""), Some(JsBigInt::zero()));
        assert_eq!(JsBigInt::from_string("12.5"), None);
    }

    #[test]
    fn division_truncates_towards_zero() {
        let a = JsBigInt::from(-7);
        let b = JsBigInt::from(2);
        assert_eq!(JsBigInt::div(&a, &b), Some(JsBigInt::from(-3)));
        assert_eq!(JsBigInt::rem(&a, &b), Some(JsBigInt::from(-1)));
        assert_eq!(JsBigInt::div(&a, &JsBigInt::zero()), None);
    }

    #[test]
    fn not_is_minus_x_minus_one() {
        assert_eq!(JsBigInt::not(&JsBigInt::from(0)), JsBigInt::from(-1));
        assert_eq!(JsBigInt::not(&JsBigInt::from(41)), JsBigInt::from(-42));
    }
}
