//! The JavaScript value: a tagged sum over all runtime value kinds, plus
//! the conversion operations of the specification.

#[cfg(test)]
mod tests;

use crate::{
    bigint::JsBigInt,
    builtins::number::{f64_to_int32, f64_to_uint32, Number},
    context::StandardConstructor,
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    property::{Attribute, DataDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    Context, JsResult,
};
use serde_json::{map::Map, Number as JSONNumber, Value as JSONValue};
use std::fmt::{self, Display};

mod conversions;
mod display;
mod equality;
mod hash;
mod operations;
mod r#type;

pub use display::ValueDisplay;
pub use equality::{number_equals, same_value, same_value_zero};
pub use operations::AbstractRelation;
pub use r#type::Type;

/// A JavaScript value.
#[derive(Trace, Finalize, Debug, Clone)]
pub enum JsValue {
    /// `null` - A null value, for when a value doesn't exist.
    Null,
    /// `undefined` - An undefined value, for when a field or index doesn't exist.
    Undefined,
    /// `boolean` - A `true` / `false` value.
    Boolean(bool),
    /// `String` - A UTF-8 string, such as `"Hello, world"`.
    String(JsString),
    /// `Number` - A 64-bit floating point number, such as `3.1415`.
    Rational(f64),
    /// `Number` - A 32-bit integer, such as `42`. A storage optimization
    /// only: `Integer` and `Rational` are the same language type.
    Integer(i32),
    /// `BigInt` - An arbitrary precision signed integer.
    BigInt(JsBigInt),
    /// `Object` - A garbage collected object handle.
    Object(JsObject),
    /// `Symbol` - A unique symbol primitive.
    Symbol(JsSymbol),
}

impl JsValue {
    /// Creates a new `undefined` value.
    #[inline]
    pub fn undefined() -> Self {
        Self::Undefined
    }

    /// Creates a new `null` value.
    #[inline]
    pub fn null() -> Self {
        Self::Null
    }

    /// Creates a new number with `NaN` value.
    #[inline]
    pub fn nan() -> Self {
        Self::number(f64::NAN)
    }

    /// Creates a new string value.
    #[inline]
    pub fn string<S>(value: S) -> Self
    where
        S: Into<JsString>,
    {
        Self::String(value.into())
    }

    /// Creates a new floating point number value.
    #[inline]
    pub fn rational<N>(value: N) -> Self
    where
        N: Into<f64>,
    {
        Self::Rational(value.into())
    }

    /// Creates a new integer number value.
    #[inline]
    pub fn integer<I>(value: I) -> Self
    where
        I: Into<i32>,
    {
        Self::Integer(value.into())
    }

    /// Creates a new number value.
    #[inline]
    pub fn number<N>(value: N) -> Self
    where
        N: Into<f64>,
    {
        Self::rational(value.into())
    }

    /// Creates a new bigint value.
    #[inline]
    pub fn bigint<B>(value: B) -> Self
    where
        B: Into<JsBigInt>,
    {
        Self::BigInt(value.into())
    }

    /// Creates a new boolean value.
    #[inline]
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    /// Creates a new object value.
    #[inline]
    pub fn object(object: Object) -> Self {
        Self::Object(JsObject::new(object))
    }

    /// Creates a new symbol value.
    #[inline]
    pub fn symbol(symbol: JsSymbol) -> Self {
        Self::Symbol(symbol)
    }

    /// Returns a new empty ordinary object with the realm's
    /// `Object.prototype`.
    pub fn new_object(context: &Context) -> Self {
        let prototype = context.standard_objects().object_object().prototype();
        Self::object(Object::create(prototype.into()))
    }

    /// Creates a new object from the given prototype and data variant.
    pub fn new_object_from_prototype(proto: Self, data: ObjectData) -> Self {
        let mut object = Object::default();
        object.data = data;
        object.set_prototype(proto);
        Self::object(object)
    }

    /// Returns true if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    #[inline]
    pub fn as_object(&self) -> Option<&JsObject> {
        match *self {
            Self::Object(ref object) => Some(object),
            _ => None,
        }
    }

    /// Returns true if the value is a symbol.
    #[inline]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    #[inline]
    pub fn as_symbol(&self) -> Option<&JsSymbol> {
        match self {
            Self::Symbol(ref symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Returns true if the value is a callable object.
    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Object(object) if object.is_callable())
    }

    /// Returns true if the value is undefined.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns true if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is null or undefined.
    #[inline]
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Returns true if the value is a number.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Rational(_) | Self::Integer(_))
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Integer(integer) => Some(integer.into()),
            Self::Rational(rational) => Some(rational),
            _ => None,
        }
    }

    /// Returns true if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns the string if the value is a string, otherwise `None`.
    #[inline]
    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(ref string) => Some(string),
            _ => None,
        }
    }

    /// Returns true if the value is a boolean.
    #[inline]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(boolean) => Some(*boolean),
            _ => None,
        }
    }

    /// Returns true if the value is a bigint.
    #[inline]
    pub fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    #[inline]
    pub fn as_bigint(&self) -> Option<&JsBigInt> {
        match self {
            Self::BigInt(ref bigint) => Some(bigint),
            _ => None,
        }
    }

    /// Converts the value to a `bool` per `ToBoolean`.
    pub fn to_boolean(&self) -> bool {
        match *self {
            Self::Undefined | Self::Null => false,
            Self::Symbol(_) | Self::Object(_) => true,
            Self::String(ref s) => !s.is_empty(),
            Self::Rational(n) => n != 0.0 && !n.is_nan(),
            Self::Integer(n) => n != 0,
            Self::BigInt(ref n) => !n.is_zero(),
            Self::Boolean(v) => v,
        }
    }

    /// The result of the `typeof` operator on this value.
    ///
    /// Callable objects (including callable proxies) report `"function"`.
    pub fn type_of(&self) -> JsString {
        match *self {
            Self::Rational(_) | Self::Integer(_) => "number",
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Symbol(_) => "symbol",
            Self::Null => "object",
            Self::Undefined => "undefined",
            Self::BigInt(_) => "bigint",
            Self::Object(ref object) => {
                if object.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
        .into()
    }

    /// `OrdinaryToPrimitive`: try `valueOf`/`toString` in hint order.
    fn ordinary_to_primitive(&self, context: &mut Context, hint: PreferredType) -> JsResult<Self> {
        debug_assert!(self.is_object());
        debug_assert!(hint != PreferredType::Default);
        let method_names = if hint == PreferredType::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for name in &method_names {
            let method = self.get_field(*name, context)?;
            if method.is_function() {
                let result = context.call(&method, self, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        context.throw_type_error("cannot convert object to primitive value")
    }

    /// The abstract operation `ToPrimitive`, consulting
    /// `Symbol.toPrimitive` first and falling back to
    /// `OrdinaryToPrimitive`.
    pub fn to_primitive(
        &self,
        context: &mut Context,
        preferred_type: PreferredType,
    ) -> JsResult<Self> {
        if let Self::Object(_) = self {
            let to_primitive_symbol = context.well_known_symbols().to_primitive_symbol();
            let exotic = self.get_field(to_primitive_symbol, context)?;
            if !exotic.is_null_or_undefined() {
                if !exotic.is_function() {
                    return context.throw_type_error("Symbol.toPrimitive is not a function");
                }
                let hint = match preferred_type {
                    PreferredType::Default => "default",
                    PreferredType::Number => "number",
                    PreferredType::String => "string",
                };
                let result = context.call(&exotic, self, &[Self::string(hint)])?;
                if result.is_object() {
                    return context
                        .throw_type_error("Symbol.toPrimitive returned an object");
                }
                return Ok(result);
            }

            let hint = if preferred_type == PreferredType::Default {
                PreferredType::Number
            } else {
                preferred_type
            };
            self.ordinary_to_primitive(context, hint)
        } else {
            Ok(self.clone())
        }
    }

    /// Converts the value to a `BigInt`, like the `BigInt(value)` function.
    pub fn to_bigint(&self, context: &mut Context) -> JsResult<JsBigInt> {
        match self {
            Self::Null => context.throw_type_error("cannot convert null to a BigInt"),
            Self::Undefined => context.throw_type_error("cannot convert undefined to a BigInt"),
            Self::String(ref string) => match JsBigInt::from_string(string) {
                Some(bigint) => Ok(bigint),
                None => context.throw_syntax_error(format!(
                    "cannot convert string '{}' to a BigInt",
                    string
                )),
            },
            Self::Boolean(true) => Ok(JsBigInt::one()),
            Self::Boolean(false) => Ok(JsBigInt::zero()),
            Self::Integer(num) => Ok(JsBigInt::from(i64::from(*num))),
            Self::Rational(num) => match JsBigInt::try_from_f64(*num) {
                Some(bigint) => Ok(bigint),
                None => context.throw_range_error(format!(
                    "the number {} cannot be converted to a BigInt because it is not an integer",
                    num
                )),
            },
            Self::BigInt(bigint) => Ok(bigint.clone()),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::Number)?;
                primitive.to_bigint(context)
            }
            Self::Symbol(_) => context.throw_type_error("cannot convert Symbol to a BigInt"),
        }
    }

    /// Returns an object that implements `Display`.
    #[inline]
    pub fn display(&self) -> ValueDisplay<'_> {
        ValueDisplay { value: self }
    }

    /// Converts the value to a string, like `String(value)`.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_string(&self, context: &mut Context) -> JsResult<JsString> {
        match self {
            Self::Null => Ok("null".into()),
            Self::Undefined => Ok("undefined".into()),
            Self::Boolean(boolean) => Ok(boolean.to_string().into()),
            Self::Rational(rational) => Ok(Number::to_native_string(*rational).into()),
            Self::Integer(integer) => Ok(integer.to_string().into()),
            Self::String(string) => Ok(string.clone()),
            Self::Symbol(_) => context.throw_type_error("can't convert symbol to string"),
            Self::BigInt(ref bigint) => Ok(bigint.to_string().into()),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::String)?;
                primitive.to_string(context)
            }
        }
    }

    /// Converts the value to an object per `ToObject`: primitives are boxed
    /// in their respective wrapper objects.
    pub fn to_object(&self, context: &mut Context) -> JsResult<JsObject> {
        let wrap = |ctor: &StandardConstructor, data: ObjectData| {
            let mut object = Object::default();
            object.data = data;
            object.set_prototype(ctor.prototype().into());
            JsObject::new(object)
        };
        match self {
            Self::Undefined | Self::Null => {
                context.throw_type_error("cannot convert 'null' or 'undefined' to object")
            }
            Self::Boolean(boolean) => Ok(wrap(
                context.standard_objects().boolean_object(),
                ObjectData::Boolean(*boolean),
            )),
            Self::Integer(integer) => Ok(wrap(
                context.standard_objects().number_object(),
                ObjectData::Number(f64::from(*integer)),
            )),
            Self::Rational(rational) => Ok(wrap(
                context.standard_objects().number_object(),
                ObjectData::Number(*rational),
            )),
            Self::String(ref string) => Ok(wrap(
                context.standard_objects().string_object(),
                ObjectData::String(string.clone()),
            )),
            Self::Symbol(ref symbol) => Ok(wrap(
                context.standard_objects().symbol_object(),
                ObjectData::Symbol(symbol.clone()),
            )),
            Self::BigInt(ref bigint) => Ok(wrap(
                context.standard_objects().bigint_object(),
                ObjectData::BigInt(bigint.clone()),
            )),
            Self::Object(object) => Ok(object.clone()),
        }
    }

    /// Converts the value to a `PropertyKey` per `ToPropertyKey`.
    pub fn to_property_key(&self, context: &mut Context) -> JsResult<PropertyKey> {
        Ok(match self {
            // Fast path:
            Self::String(string) => string.clone().into(),
            Self::Symbol(symbol) => symbol.clone().into(),
            // Slow path:
            _ => match self.to_primitive(context, PreferredType::String)? {
                Self::String(ref string) => string.clone().into(),
                Self::Symbol(ref symbol) => symbol.clone().into(),
                primitive => primitive.to_string(context)?.into(),
            },
        })
    }

    /// Converts the value to a numeric value of type `Number` or `BigInt`.
    pub fn to_numeric(&self, context: &mut Context) -> JsResult<Numeric> {
        let primitive = self.to_primitive(context, PreferredType::Number)?;
        if let Some(bigint) = primitive.as_bigint() {
            return Ok(bigint.clone().into());
        }
        Ok(primitive.to_number(context)?.into())
    }

    /// Like [`Self::to_numeric`], but BigInts lose precision into an `f64`.
    /// This is `Number(value)`.
    pub fn to_numeric_number(&self, context: &mut Context) -> JsResult<f64> {
        let primitive = self.to_primitive(context, PreferredType::Number)?;
        if let Some(bigint) = primitive.as_bigint() {
            return Ok(bigint.to_f64());
        }
        primitive.to_number(context)
    }

    /// Converts the value to an unsigned 32 bit integer per `ToUint32`.
    pub fn to_u32(&self, context: &mut Context) -> JsResult<u32> {
        // Fast path for integers already in range.
        if let Self::Integer(number) = *self {
            if number >= 0 {
                return Ok(number as u32);
            }
        }
        let number = self.to_number(context)?;
        Ok(f64_to_uint32(number))
    }

    /// Converts the value to a signed 32 bit integer per `ToInt32`.
    pub fn to_i32(&self, context: &mut Context) -> JsResult<i32> {
        if let Self::Integer(number) = *self {
            return Ok(number);
        }
        let number = self.to_number(context)?;
        Ok(f64_to_int32(number))
    }

    /// Converts the value to a non-negative integer index per `ToIndex`.
    pub fn to_index(&self, context: &mut Context) -> JsResult<usize> {
        if self.is_undefined() {
            return Ok(0);
        }

        let integer_index = self.to_integer(context)?;

        if integer_index < 0.0 {
            return context.throw_range_error("integer index must be >= 0");
        }

        if integer_index > Number::MAX_SAFE_INTEGER {
            return context.throw_range_error("integer index must be less than 2**(53) - 1");
        }

        Ok(integer_index as usize)
    }

    /// Converts the value to an array-like length per `ToLength`.
    pub fn to_length(&self, context: &mut Context) -> JsResult<usize> {
        let len = self.to_integer(context)?;

        if len < 0.0 {
            return Ok(0);
        }

        Ok(len.min(Number::MAX_SAFE_INTEGER) as usize)
    }

    /// Converts the value to an integral `Number` per `ToInteger`.
    pub fn to_integer(&self, context: &mut Context) -> JsResult<f64> {
        let number = self.to_number(context)?;

        if !number.is_finite() {
            if number.is_nan() {
                return Ok(0.0);
            }
            return Ok(number);
        }

        // Adding 0.0 converts -0.0 to +0.0.
        Ok(number.trunc() + 0.0)
    }

    /// Converts the value to an `f64` per `ToNumber`.
    pub fn to_number(&self, context: &mut Context) -> JsResult<f64> {
        match *self {
            Self::Null => Ok(0.0),
            Self::Undefined => Ok(f64::NAN),
            Self::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
            Self::String(ref string) => Ok(Number::string_to_number(string)),
            Self::Rational(number) => Ok(number),
            Self::Integer(integer) => Ok(f64::from(integer)),
            Self::Symbol(_) => context.throw_type_error("argument must not be a symbol"),
            Self::BigInt(_) => context.throw_type_error("argument must not be a bigint"),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::Number)?;
                primitive.to_number(context)
            }
        }
    }

    /// `RequireObjectCoercible`: errors out on `null` and `undefined`.
    #[inline]
    pub fn require_object_coercible<'a>(&'a self, context: &mut Context) -> JsResult<&'a Self> {
        if self.is_null_or_undefined() {
            context.throw_type_error("cannot convert null or undefined to Object")
        } else {
            Ok(self)
        }
    }

    /// Full `[[Get]]` through a value: objects walk their prototype chain,
    /// primitives look up on the matching intrinsic prototype without
    /// materializing a wrapper object. Accessors run with this value as the
    /// receiver.
    pub fn get_field<K>(&self, key: K, context: &mut Context) -> JsResult<Self>
    where
        K: Into<PropertyKey>,
    {
        let key = key.into();
        match self {
            Self::Object(ref object) => object.get(&key, self.clone(), context),
            Self::Undefined | Self::Null => context.throw_type_error(format!(
                "cannot read property '{}' of {}",
                key,
                self.display()
            )),
            Self::String(ref string) => {
                // String exotics resolve on the primitive itself.
                if let PropertyKey::Index(index) = key {
                    return Ok(string
                        .chars()
                        .nth(index as usize)
                        .map(|c| Self::string(c.to_string()))
                        .unwrap_or_default());
                }
                if key == "length" {
                    return Ok(Self::number(string.chars().count() as f64));
                }
                let prototype = context.standard_objects().string_object().prototype();
                prototype.get(&key, self.clone(), context)
            }
            Self::Boolean(_) => {
                let prototype = context.standard_objects().boolean_object().prototype();
                prototype.get(&key, self.clone(), context)
            }
            Self::Integer(_) | Self::Rational(_) => {
                let prototype = context.standard_objects().number_object().prototype();
                prototype.get(&key, self.clone(), context)
            }
            Self::BigInt(_) => {
                let prototype = context.standard_objects().bigint_object().prototype();
                prototype.get(&key, self.clone(), context)
            }
            Self::Symbol(_) => {
                let prototype = context.standard_objects().symbol_object().prototype();
                prototype.get(&key, self.clone(), context)
            }
        }
    }

    /// Full `[[Set]]` through a value. Assignment to properties of
    /// primitives silently does nothing in sloppy mode and throws a
    /// `TypeError` in strict mode.
    pub fn set_field<K, V>(
        &self,
        key: K,
        value: V,
        strict: bool,
        context: &mut Context,
    ) -> JsResult<Self>
    where
        K: Into<PropertyKey>,
        V: Into<Self>,
    {
        let key = key.into();
        let value = value.into();
        match self {
            Self::Object(ref object) => {
                let succeeded = object.set(key.clone(), value.clone(), self.clone(), context)?;
                if !succeeded && strict {
                    return context.throw_type_error(format!(
                        "cannot assign to read only property '{}' of object",
                        key
                    ));
                }
                Ok(value)
            }
            Self::Undefined | Self::Null => context.throw_type_error(format!(
                "cannot set property '{}' of {}",
                key,
                self.display()
            )),
            _ if strict => context.throw_type_error(format!(
                "cannot create property '{}' on {}",
                key,
                self.type_of()
            )),
            _ => Ok(value),
        }
    }

    /// Defines a data property directly on an object value; a no-op on
    /// primitives.
    pub(crate) fn set_property<K>(&self, key: K, value: Self, attribute: Attribute)
    where
        K: Into<PropertyKey>,
    {
        if let Self::Object(ref object) = self {
            object
                .borrow_mut()
                .insert(key.into(), DataDescriptor::new(value, attribute));
        }
    }

    /// Convert from a JSON value to a JS value.
    pub fn from_json(json: JSONValue, context: &mut Context) -> Self {
        match json {
            JSONValue::Number(v) => {
                use std::convert::TryFrom;
                if let Some(Ok(integer_32)) = v.as_i64().map(i32::try_from) {
                    Self::integer(integer_32)
                } else {
                    Self::rational(v.as_f64().expect("Could not convert value to f64"))
                }
            }
            JSONValue::String(v) => Self::string(v),
            JSONValue::Bool(v) => Self::boolean(v),
            JSONValue::Array(vs) => {
                let array =
                    crate::builtins::array::Array::new_array(context, vs.len());
                for (index, json) in vs.into_iter().enumerate() {
                    let value = Self::from_json(json, context);
                    array.set_property(index, value, Attribute::default());
                }
                array
            }
            JSONValue::Object(obj) => {
                let new_obj = Self::new_object(context);
                for (key, json) in obj {
                    let value = Self::from_json(json, context);
                    new_obj.set_property(key, value, Attribute::default());
                }
                new_obj
            }
            JSONValue::Null => Self::null(),
        }
    }

    /// Converts the value to JSON. Values without a JSON representation
    /// (functions, symbols, undefined) map to `null` inside arrays and are
    /// skipped inside objects, matching `JSON.stringify`.
    pub fn to_json(&self, context: &mut Context) -> JsResult<JSONValue> {
        match self {
            Self::Null => Ok(JSONValue::Null),
            Self::Boolean(b) => Ok(JSONValue::Bool(*b)),
            Self::Rational(num) => Ok(JSONNumber::from_f64(*num)
                .map(JSONValue::Number)
                .unwrap_or(JSONValue::Null)),
            Self::Integer(val) => Ok(JSONValue::Number(JSONNumber::from(*val))),
            Self::String(ref string) => Ok(JSONValue::String(string.to_string())),
            Self::BigInt(_) => {
                context.throw_type_error("BigInt value can't be serialized in JSON")
            }
            Self::Object(ref object) => {
                if object.is_array() {
                    let length = self.get_field("length", context)?.to_length(context)?;
                    let mut arr = Vec::with_capacity(length);
                    for index in 0..length {
                        let value = self.get_field(index, context)?;
                        if value.is_undefined() || value.is_function() || value.is_symbol() {
                            arr.push(JSONValue::Null);
                        } else {
                            arr.push(value.to_json(context)?);
                        }
                    }
                    Ok(JSONValue::Array(arr))
                } else {
                    let keys: Vec<PropertyKey> = object.borrow().properties().keys().collect();
                    let mut map = Map::new();
                    for key in keys {
                        let value = self.get_field(key.clone(), context)?;
                        if !value.is_undefined() && !value.is_function() && !value.is_symbol() {
                            map.insert(key.to_string(), value.to_json(context)?);
                        }
                    }
                    Ok(JSONValue::Object(map))
                }
            }
            Self::Symbol(_) | Self::Undefined => {
                unreachable!("Symbols and Undefined JSON Values depend on parent type");
            }
        }
    }
}

impl Default for JsValue {
    fn default() -> Self {
        Self::Undefined
    }
}

/// The preferred type hint passed to `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreferredType {
    String,
    Number,
    Default,
}

/// Numeric value which can be of two types `Number` and `BigInt`.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// Double precision floating point number.
    Number(f64),
    /// An integer of arbitrary size.
    BigInt(JsBigInt),
}

impl From<f64> for Numeric {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Numeric {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<JsBigInt> for Numeric {
    #[inline]
    fn from(value: JsBigInt) -> Self {
        Self::BigInt(value)
    }
}

impl From<Numeric> for JsValue {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Number(number) => Self::rational(number),
            Numeric::BigInt(bigint) => Self::bigint(bigint),
        }
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.display(), f)
    }
}
