use super::JsValue;
use crate::{
    bigint::JsBigInt, object::JsObject, object::Object, string::JsString, symbol::JsSymbol,
};
use std::convert::TryFrom;

impl From<&Self> for JsValue {
    #[inline]
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl From<JsString> for JsValue {
    #[inline]
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<&str> for JsValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for JsValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<char> for JsValue {
    #[inline]
    fn from(value: char) -> Self {
        Self::String(value.to_string().into())
    }
}

impl From<JsSymbol> for JsValue {
    #[inline]
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<f64> for JsValue {
    #[inline]
    fn from(value: f64) -> Self {
        Self::rational(value)
    }
}

impl From<i32> for JsValue {
    #[inline]
    fn from(value: i32) -> Self {
        Self::integer(value)
    }
}

impl From<u32> for JsValue {
    #[inline]
    fn from(value: u32) -> Self {
        i32::try_from(value).map_or_else(|_| Self::rational(f64::from(value)), Self::integer)
    }
}

impl From<usize> for JsValue {
    #[inline]
    fn from(value: usize) -> Self {
        i32::try_from(value).map_or_else(|_| Self::rational(value as f64), Self::integer)
    }
}

impl From<bool> for JsValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<JsBigInt> for JsValue {
    #[inline]
    fn from(value: JsBigInt) -> Self {
        Self::BigInt(value)
    }
}

impl From<JsObject> for JsValue {
    #[inline]
    fn from(object: JsObject) -> Self {
        Self::Object(object)
    }
}

impl From<Object> for JsValue {
    #[inline]
    fn from(object: Object) -> Self {
        Self::object(object)
    }
}
