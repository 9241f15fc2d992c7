//! Operator implementations on values: the numeric and string operators
//! with their `ToPrimitive`/`ToNumeric` coercions, BigInt contagion and the
//! abstract relational comparison.

use super::{JsValue, Numeric, PreferredType};
use crate::{
    bigint::JsBigInt,
    builtins::number::{f64_to_int32, f64_to_uint32},
    Context, JsResult,
};

impl JsValue {
    /// The addition operator: string concatenation when either operand
    /// (after `ToPrimitive`) is a string, numeric addition otherwise, with a
    /// `TypeError` on BigInt/Number mixing.
    pub fn add(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self, other) {
            // Fast paths:
            (Self::Integer(x), Self::Integer(y)) => x
                .checked_add(*y)
                .map(Self::integer)
                .unwrap_or_else(|| Self::rational(f64::from(*x) + f64::from(*y))),
            (Self::Rational(x), Self::Rational(y)) => Self::rational(x + y),
            (Self::String(ref x), Self::String(ref y)) => Self::string(x.concat(y)),

            // Slow path:
            (_, _) => {
                let x = self.to_primitive(context, PreferredType::Default)?;
                let y = other.to_primitive(context, PreferredType::Default)?;
                match (x, y) {
                    (Self::String(ref x), ref y) => {
                        Self::string(x.concat(y.to_string(context)?))
                    }
                    (ref x, Self::String(ref y)) => {
                        Self::string(x.to_string(context)?.concat(y))
                    }
                    (x, y) => match (x.to_numeric(context)?, y.to_numeric(context)?) {
                        (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x + y),
                        (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                            Self::bigint(JsBigInt::add(x, y))
                        }
                        (_, _) => {
                            return context.throw_type_error(
                                "cannot mix BigInt and other types, use explicit conversions",
                            )
                        }
                    },
                }
            }
        })
    }

    /// The subtraction operator.
    pub fn sub(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => x
                .checked_sub(*y)
                .map(Self::integer)
                .unwrap_or_else(|| Self::rational(f64::from(*x) - f64::from(*y))),
            (Self::Rational(x), Self::Rational(y)) => Self::rational(x - y),
            (_, _) => match (self.to_numeric(context)?, other.to_numeric(context)?) {
                (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x - y),
                (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                    Self::bigint(JsBigInt::sub(x, y))
                }
                (_, _) => {
                    return context.throw_type_error(
                        "cannot mix BigInt and other types, use explicit conversions",
                    )
                }
            },
        })
    }

    /// The multiplication operator.
    pub fn mul(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => x
                .checked_mul(*y)
                .map(Self::integer)
                .unwrap_or_else(|| Self::rational(f64::from(*x) * f64::from(*y))),
            (Self::Rational(x), Self::Rational(y)) => Self::rational(x * y),
            (_, _) => match (self.to_numeric(context)?, other.to_numeric(context)?) {
                (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x * y),
                (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                    Self::bigint(JsBigInt::mul(x, y))
                }
                (_, _) => {
                    return context.throw_type_error(
                        "cannot mix BigInt and other types, use explicit conversions",
                    )
                }
            },
        })
    }

    /// The division operator. Number division by zero produces an infinity,
    /// BigInt division by zero throws a `RangeError`.
    pub fn div(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x / y),
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => match JsBigInt::div(x, y) {
                Some(result) => Self::bigint(result),
                None => return context.throw_range_error("BigInt division by zero"),
            },
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The remainder operator.
    pub fn rem(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x % y),
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => match JsBigInt::rem(x, y) {
                Some(result) => Self::bigint(result),
                None => return context.throw_range_error("BigInt division by zero"),
            },
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The exponentiation operator.
    pub fn pow(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => Self::rational(x.powf(y)),
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => match JsBigInt::pow(x, y) {
                Some(result) => Self::bigint(result),
                None => {
                    return context.throw_range_error("BigInt exponent must be non-negative")
                }
            },
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The bitwise AND operator.
    pub fn bitand(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Self::integer(f64_to_int32(x) & f64_to_int32(y))
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                Self::bigint(JsBigInt::bitand(x, y))
            }
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The bitwise OR operator.
    pub fn bitor(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Self::integer(f64_to_int32(x) | f64_to_int32(y))
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                Self::bigint(JsBigInt::bitor(x, y))
            }
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The bitwise XOR operator.
    pub fn bitxor(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Self::integer(f64_to_int32(x) ^ f64_to_int32(y))
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                Self::bigint(JsBigInt::bitxor(x, y))
            }
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The left shift operator. The shift count is taken modulo 32 for
    /// numbers.
    pub fn shl(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Self::integer(f64_to_int32(x).wrapping_shl(f64_to_uint32(y)))
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => match JsBigInt::shl(x, y) {
                Some(result) => Self::bigint(result),
                None => return context.throw_range_error("maximum BigInt size exceeded"),
            },
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The signed right shift operator.
    pub fn shr(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                Self::integer(f64_to_int32(x).wrapping_shr(f64_to_uint32(y)))
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => match JsBigInt::shr(x, y) {
                Some(result) => Self::bigint(result),
                None => return context.throw_range_error("maximum BigInt size exceeded"),
            },
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The unsigned right shift operator, which has no BigInt counterpart.
    pub fn ushr(&self, other: &Self, context: &mut Context) -> JsResult<Self> {
        Ok(match (self.to_numeric(context)?, other.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                let x = f64_to_uint32(x);
                let y = f64_to_uint32(y) % 32;
                Self::rational(f64::from(x.wrapping_shr(y)))
            }
            (Numeric::BigInt(_), Numeric::BigInt(_)) => {
                return context
                    .throw_type_error("BigInts have no unsigned right shift, use >> instead")
            }
            (_, _) => {
                return context.throw_type_error(
                    "cannot mix BigInt and other types, use explicit conversions",
                )
            }
        })
    }

    /// The unary negation operator.
    pub fn neg(&self, context: &mut Context) -> JsResult<Self> {
        Ok(match self.to_numeric(context)? {
            Numeric::Number(number) => Self::rational(-number),
            Numeric::BigInt(ref bigint) => Self::bigint(JsBigInt::neg(bigint)),
        })
    }

    /// The bitwise NOT operator (`~`).
    pub fn not(&self, context: &mut Context) -> JsResult<Self> {
        Ok(match self.to_numeric(context)? {
            Numeric::Number(number) => Self::integer(!f64_to_int32(number)),
            Numeric::BigInt(ref bigint) => Self::bigint(JsBigInt::not(bigint)),
        })
    }

    /// The abstract relational comparison `x < y`, returning `Undefined`
    /// when either operand compares as `NaN`.
    pub fn abstract_relation(
        &self,
        other: &Self,
        left_first: bool,
        context: &mut Context,
    ) -> JsResult<AbstractRelation> {
        let (px, py) = if left_first {
            let px = self.to_primitive(context, PreferredType::Number)?;
            let py = other.to_primitive(context, PreferredType::Number)?;
            (px, py)
        } else {
            // The original evaluation order must be reflected through the
            // conversions.
            let py = other.to_primitive(context, PreferredType::Number)?;
            let px = self.to_primitive(context, PreferredType::Number)?;
            (px, py)
        };

        if let (Self::String(ref x), Self::String(ref y)) = (&px, &py) {
            return Ok(if x.as_str() < y.as_str() {
                AbstractRelation::True
            } else {
                AbstractRelation::False
            });
        }

        // String/BigInt pairs compare mathematically.
        match (&px, &py) {
            (Self::BigInt(ref x), Self::String(ref y)) => {
                return Ok(match JsBigInt::from_string(y) {
                    Some(y) => (*x.as_inner() < *y.as_inner()).into(),
                    None => AbstractRelation::Undefined,
                })
            }
            (Self::String(ref x), Self::BigInt(ref y)) => {
                return Ok(match JsBigInt::from_string(x) {
                    Some(x) => (*x.as_inner() < *y.as_inner()).into(),
                    None => AbstractRelation::Undefined,
                })
            }
            _ => {}
        }

        Ok(match (px.to_numeric(context)?, py.to_numeric(context)?) {
            (Numeric::Number(x), Numeric::Number(y)) => {
                if x.is_nan() || y.is_nan() {
                    AbstractRelation::Undefined
                } else {
                    (x < y).into()
                }
            }
            (Numeric::BigInt(ref x), Numeric::BigInt(ref y)) => {
                (x.as_inner() < y.as_inner()).into()
            }
            (Numeric::Number(x), Numeric::BigInt(ref y)) => {
                if x.is_nan() {
                    AbstractRelation::Undefined
                } else {
                    (x < y.to_f64()).into()
                }
            }
            (Numeric::BigInt(ref x), Numeric::Number(y)) => {
                if y.is_nan() {
                    AbstractRelation::Undefined
                } else {
                    (x.to_f64() < y).into()
                }
            }
        })
    }

    /// The less than operator (`<`).
    pub fn lt(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        match self.abstract_relation(other, true, context)? {
            AbstractRelation::True => Ok(true),
            AbstractRelation::False | AbstractRelation::Undefined => Ok(false),
        }
    }

    /// The less than or equal operator (`<=`).
    pub fn le(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        match other.abstract_relation(self, false, context)? {
            AbstractRelation::False => Ok(true),
            AbstractRelation::True | AbstractRelation::Undefined => Ok(false),
        }
    }

    /// The greater than operator (`>`).
    pub fn gt(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        match other.abstract_relation(self, false, context)? {
            AbstractRelation::True => Ok(true),
            AbstractRelation::False | AbstractRelation::Undefined => Ok(false),
        }
    }

    /// The greater than or equal operator (`>=`).
    pub fn ge(&self, other: &Self, context: &mut Context) -> JsResult<bool> {
        match self.abstract_relation(other, true, context)? {
            AbstractRelation::False => Ok(true),
            AbstractRelation::True | AbstractRelation::Undefined => Ok(false),
        }
    }
}

/// The result of the abstract relational comparison; `Undefined` means a
/// `NaN` was involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractRelation {
    True,
    False,
    Undefined,
}

impl From<bool> for AbstractRelation {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}
