//! Property keys and property descriptors.
//!
//! A property descriptor is either a data descriptor (`{value, writable,
//! enumerable, configurable}`) or an accessor descriptor (`{get, set,
//! enumerable, configurable}`); it is never both. Property keys are
//! canonicalized on construction: strings that parse as array indices
//! become [`PropertyKey::Index`].

use crate::{
    gc::{Finalize, Trace},
    object::JsObject,
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};
use std::{convert::TryFrom, fmt};

mod attribute;
pub use attribute::Attribute;

/// A data descriptor: a property with a value, which may or may not be
/// writable.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct DataDescriptor {
    pub(crate) value: JsValue,
    attributes: Attribute,
}

impl DataDescriptor {
    /// Creates a new `DataDescriptor`.
    #[inline]
    pub fn new<V>(value: V, attributes: Attribute) -> Self
    where
        V: Into<JsValue>,
    {
        Self {
            value: value.into(),
            attributes,
        }
    }

    /// Returns the `[[Value]]` of the data descriptor.
    #[inline]
    pub fn value(&self) -> JsValue {
        self.value.clone()
    }

    #[inline]
    pub fn attributes(&self) -> Attribute {
        self.attributes
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.attributes.writable()
    }

    #[inline]
    pub fn enumerable(&self) -> bool {
        self.attributes.enumerable()
    }

    #[inline]
    pub fn configurable(&self) -> bool {
        self.attributes.configurable()
    }
}

impl From<DataDescriptor> for PropertyDescriptor {
    #[inline]
    fn from(value: DataDescriptor) -> Self {
        Self::Data(value)
    }
}

/// An accessor descriptor: a property described by a getter-setter pair.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct AccessorDescriptor {
    /// The function serving as getter.
    pub(crate) get: Option<JsObject>,
    /// The function serving as setter.
    pub(crate) set: Option<JsObject>,
    pub(crate) attributes: Attribute,
}

impl AccessorDescriptor {
    /// Creates a new `AccessorDescriptor`. A `writable` flag in `attributes`
    /// is removed, since accessors cannot carry one.
    #[inline]
    pub fn new(get: Option<JsObject>, set: Option<JsObject>, mut attributes: Attribute) -> Self {
        attributes.remove(Attribute::WRITABLE);
        Self {
            get,
            set,
            attributes,
        }
    }

    #[inline]
    pub fn getter(&self) -> Option<&JsObject> {
        self.get.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&JsObject> {
        self.set.as_ref()
    }

    #[inline]
    pub fn attributes(&self) -> Attribute {
        self.attributes
    }

    #[inline]
    pub fn enumerable(&self) -> bool {
        self.attributes.enumerable()
    }

    #[inline]
    pub fn configurable(&self) -> bool {
        self.attributes.configurable()
    }
}

impl From<AccessorDescriptor> for PropertyDescriptor {
    #[inline]
    fn from(value: AccessorDescriptor) -> Self {
        Self::Accessor(value)
    }
}

/// A JavaScript property descriptor, in one of its two flavors.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum PropertyDescriptor {
    Accessor(AccessorDescriptor),
    Data(DataDescriptor),
}

impl PropertyDescriptor {
    #[inline]
    pub fn is_accessor_descriptor(&self) -> bool {
        matches!(self, Self::Accessor(_))
    }

    #[inline]
    pub fn as_accessor_descriptor(&self) -> Option<&AccessorDescriptor> {
        match self {
            Self::Accessor(ref accessor) => Some(accessor),
            Self::Data(_) => None,
        }
    }

    #[inline]
    pub fn is_data_descriptor(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    #[inline]
    pub fn as_data_descriptor(&self) -> Option<&DataDescriptor> {
        match self {
            Self::Data(ref data) => Some(data),
            Self::Accessor(_) => None,
        }
    }

    #[inline]
    pub fn enumerable(&self) -> bool {
        match self {
            Self::Accessor(ref accessor) => accessor.enumerable(),
            Self::Data(ref data) => data.enumerable(),
        }
    }

    #[inline]
    pub fn configurable(&self) -> bool {
        match self {
            Self::Accessor(ref accessor) => accessor.configurable(),
            Self::Data(ref data) => data.configurable(),
        }
    }

    /// `[[Writable]]` of a data descriptor; accessors are never writable.
    #[inline]
    pub fn writable(&self) -> bool {
        match self {
            Self::Accessor(_) => false,
            Self::Data(ref data) => data.writable(),
        }
    }

    #[inline]
    pub fn attributes(&self) -> Attribute {
        match self {
            Self::Accessor(ref accessor) => accessor.attributes(),
            Self::Data(ref data) => data.attributes(),
        }
    }

    /// The plain value of a data descriptor, `undefined` for accessors.
    #[inline]
    pub(crate) fn value_or_undefined(&self) -> JsValue {
        match self {
            Self::Data(ref data) => data.value(),
            Self::Accessor(_) => JsValue::undefined(),
        }
    }
}

/// A key into an object's property table: an array index, a string or a
/// symbol.
#[derive(Trace, Finalize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Symbol(JsSymbol),
    Index(u32),
}

impl PropertyKey {
    /// Returns the array index when the key is one.
    #[inline]
    pub fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Returns the string form of the key; symbols have none.
    pub fn as_js_string(&self) -> Option<JsString> {
        match self {
            Self::String(string) => Some(string.clone()),
            Self::Index(index) => Some(index.to_string().into()),
            Self::Symbol(_) => None,
        }
    }
}

fn parse_index(string: &str) -> Option<u32> {
    // "00" or "+1" are string keys, not indices; u32::MAX is not a valid
    // array index either.
    if string == "0" {
        return Some(0);
    }
    if string.is_empty() || !string.as_bytes()[0].is_ascii_digit() || string.starts_with('0') {
        return None;
    }
    string
        .parse::<u32>()
        .ok()
        .filter(|index| *index < u32::MAX)
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(string: JsString) -> Self {
        match parse_index(&string) {
            Some(index) => Self::Index(index),
            None => Self::String(string),
        }
    }
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(string: &str) -> Self {
        match parse_index(string) {
            Some(index) => Self::Index(index),
            None => Self::String(string.into()),
        }
    }
}

impl From<String> for PropertyKey {
    #[inline]
    fn from(string: String) -> Self {
        match parse_index(&string) {
            Some(index) => Self::Index(index),
            None => Self::String(string.into()),
        }
    }
}

impl From<JsSymbol> for PropertyKey {
    #[inline]
    fn from(symbol: JsSymbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl fmt::Display for PropertyKey {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(ref string) => string.fmt(f),
            Self::Symbol(ref symbol) => symbol.fmt(f),
            Self::Index(index) => index.fmt(f),
        }
    }
}

impl From<&PropertyKey> for JsValue {
    #[inline]
    fn from(property_key: &PropertyKey) -> Self {
        match property_key {
            PropertyKey::String(ref string) => string.clone().into(),
            PropertyKey::Symbol(ref symbol) => symbol.clone().into(),
            PropertyKey::Index(index) => {
                if let Ok(integer) = i32::try_from(*index) {
                    Self::integer(integer)
                } else {
                    Self::number(*index)
                }
            }
        }
    }
}

impl From<PropertyKey> for JsValue {
    #[inline]
    fn from(property_key: PropertyKey) -> Self {
        Self::from(&property_key)
    }
}

impl From<u32> for PropertyKey {
    #[inline]
    fn from(value: u32) -> Self {
        if value < u32::MAX {
            Self::Index(value)
        } else {
            Self::String(value.to_string().into())
        }
    }
}

impl From<usize> for PropertyKey {
    fn from(value: usize) -> Self {
        match u32::try_from(value) {
            Ok(index) => Self::from(index),
            Err(_) => Self::String(value.to_string().into()),
        }
    }
}

impl From<i32> for PropertyKey {
    fn from(value: i32) -> Self {
        match u32::try_from(value) {
            Ok(index) => Self::from(index),
            Err(_) => Self::String(value.to_string().into()),
        }
    }
}

impl PartialEq<&str> for PropertyKey {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Self::String(ref string) => string == other,
            Self::Index(index) => index.to_string() == *other,
            Self::Symbol(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertyKey;

    #[test]
    fn canonical_index_keys() {
        assert_eq!(PropertyKey::from("0"), PropertyKey::Index(0));
        assert_eq!(PropertyKey::from("42"), PropertyKey::Index(42));
        // Leading zeros and signs never canonicalize.
        assert_eq!(PropertyKey::from("01"), PropertyKey::String("01".into()));
        assert_eq!(PropertyKey::from("+1"), PropertyKey::String("+1".into()));
        assert_eq!(
            PropertyKey::from("4294967295"),
            PropertyKey::String("4294967295".into())
        );
    }
}
