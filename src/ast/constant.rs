//! Literal constants.

use crate::bigint::JsBigInt;

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// A literal constant in the source.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    /// A string literal.
    String(Box<str>),

    /// A floating point number literal.
    Num(f64),

    /// An integer literal.
    Int(i32),

    /// A BigInt literal, `42n`.
    BigInt(JsBigInt),

    /// A boolean literal.
    Bool(bool),

    /// The `null` literal.
    Null,

    /// The `undefined` "literal".
    Undefined,
}

impl From<&str> for Const {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Const {
    fn from(value: String) -> Self {
        Self::String(value.into_boxed_str())
    }
}

impl From<f64> for Const {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i32> for Const {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<JsBigInt> for Const {
    fn from(value: JsBigInt) -> Self {
        Self::BigInt(value)
    }
}

impl From<bool> for Const {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
