//! Value equality: strict, loose, `SameValue` and `SameValueZero`.

use super::{JsValue, PreferredType};
use crate::{bigint::JsBigInt, object::JsObject, Context, JsResult};

impl JsValue {
    /// Strict equality (`===`).
    pub fn strict_equals(&self, other: &Self) -> bool {
        // Numbers compare numerically across the Integer/Rational storage
        // split.
        if self.is_number() && other.is_number() {
            return number_equals(
                self.as_number().expect("number"),
                other.as_number().expect("number"),
            );
        }
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(x), Self::Boolean(y)) => x == y,
            (Self::String(ref x), Self::String(ref y)) => x == y,
            (Self::BigInt(ref x), Self::BigInt(ref y)) => x == y,
            (Self::Symbol(ref x), Self::Symbol(ref y)) => x == y,
            (Self::Object(ref x), Self::Object(ref y)) => JsObject::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Loose equality (`==`), which may trigger `ToPrimitive` conversions.
    pub fn equals(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        // Same type: strict comparison settles it.
        if self.get_type() == other.get_type() {
            return Ok(self.strict_equals(other));
        }

        Ok(match (self, other) {
            (Self::Null, Self::Undefined) | (Self::Undefined, Self::Null) => true,

            // Number == String/Boolean and mirror images: convert to number.
            (Self::Integer(_) | Self::Rational(_), Self::String(_) | Self::Boolean(_))
            | (Self::String(_), Self::Integer(_) | Self::Rational(_)) => {
                let x = self.to_number(context)?;
                let y = other.to_number(context)?;
                number_equals(x, y)
            }
            (Self::Boolean(_), _) => {
                let converted = Self::number(self.to_number(context)?);
                return converted.equals(other, context);
            }
            (_, Self::Boolean(_)) => {
                let converted = Self::number(other.to_number(context)?);
                return self.equals(&converted, context);
            }

            // BigInt == Number compares mathematically.
            (Self::BigInt(ref a), Self::Integer(_) | Self::Rational(_)) => {
                bigint_equals_number(a, other.as_number().expect("number"))
            }
            (Self::Integer(_) | Self::Rational(_), Self::BigInt(ref b)) => {
                bigint_equals_number(b, self.as_number().expect("number"))
            }

            // BigInt == String goes through StringToBigInt.
            (Self::BigInt(ref a), Self::String(ref b)) => match JsBigInt::from_string(b) {
                Some(b) => *a == b,
                None => false,
            },
            (Self::String(ref a), Self::BigInt(ref b)) => match JsBigInt::from_string(a) {
                Some(a) => a == *b,
                None => false,
            },

            // Object == primitive unwraps the object first.
            (Self::Object(_), _) => {
                let primitive = self.to_primitive(context, PreferredType::Default)?;
                return primitive.equals(other, context);
            }
            (_, Self::Object(_)) => {
                let primitive = other.to_primitive(context, PreferredType::Default)?;
                return self.equals(&primitive, context);
            }

            _ => false,
        })
    }
}

/// `==` on numbers: `NaN` equals nothing, zeros are equal.
#[inline]
pub fn number_equals(x: f64, y: f64) -> bool {
    #[allow(clippy::float_cmp)]
    {
        x == y
    }
}

fn bigint_equals_number(x: &JsBigInt, y: f64) -> bool {
    if !y.is_finite() || y.fract() != 0.0 {
        return false;
    }
    match JsBigInt::try_from_f64(y) {
        Some(y) => *x == y,
        None => false,
    }
}

/// The internal comparison operation `SameValue(x, y)`: like `===` but
/// `NaN` equals itself and `+0` differs from `-0`.
pub fn same_value(x: &JsValue, y: &JsValue) -> bool {
    if x.is_number() && y.is_number() {
        let x = x.as_number().expect("number");
        let y = y.as_number().expect("number");
        if x.is_nan() && y.is_nan() {
            return true;
        }
        #[allow(clippy::float_cmp)]
        if x == y {
            return x.is_sign_positive() == y.is_sign_positive();
        }
        return false;
    }
    x.strict_equals(y)
}

/// The internal comparison operation `SameValueZero(x, y)`: like
/// `SameValue` but `+0` equals `-0`. This is the equality used by `Map` and
/// `Set` keys.
pub fn same_value_zero(x: &JsValue, y: &JsValue) -> bool {
    if x.is_number() && y.is_number() {
        let x = x.as_number().expect("number");
        let y = y.as_number().expect("number");
        if x.is_nan() && y.is_nan() {
            return true;
        }
        return number_equals(x, y);
    }
    x.strict_equals(y)
}
