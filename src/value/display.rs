//! Human readable display for values, used by embedders and error
//! messages. Not `toString` semantics: strings are quoted and objects are
//! summarized shallowly.

use super::JsValue;
use crate::{builtins::number::Number, object::ObjectData, property::PropertyKey};
use std::fmt::{self, Display};

/// A wrapper to display a `JsValue`.
#[derive(Debug)]
pub struct ValueDisplay<'a> {
    pub(crate) value: &'a JsValue,
}

fn display_value(value: &JsValue, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match value {
        JsValue::Null => write!(f, "null"),
        JsValue::Undefined => write!(f, "undefined"),
        JsValue::Boolean(v) => write!(f, "{}", v),
        JsValue::Integer(v) => write!(f, "{}", v),
        JsValue::Rational(v) => write!(f, "{}", Number::to_native_string(*v)),
        JsValue::BigInt(ref num) => write!(f, "{}n", num),
        JsValue::String(ref v) => {
            if depth == 0 {
                write!(f, "{}", v)
            } else {
                write!(f, "\"{}\"", v)
            }
        }
        JsValue::Symbol(ref symbol) => write!(f, "{}", symbol),
        JsValue::Object(ref object) => {
            if object.is_callable() {
                let name = object
                    .borrow()
                    .properties()
                    .get(&PropertyKey::from("name"))
                    .map(|prop| prop.value_or_undefined())
                    .and_then(|value| value.as_string().cloned());
                return match name {
                    Some(name) if !name.is_empty() => write!(f, "[Function: {}]", name),
                    _ => write!(f, "[Function]"),
                };
            }
            if depth > 1 {
                let summary = match object.borrow().data {
                    ObjectData::Array => "[Array]",
                    _ => "[Object]",
                };
                return write!(f, "{}", summary);
            }
            if object.is_array() {
                let length = object
                    .borrow()
                    .properties()
                    .get(&PropertyKey::from("length"))
                    .map(|prop| prop.value_or_undefined())
                    .and_then(|value| value.as_number())
                    .unwrap_or(0.0) as u32;
                write!(f, "[")?;
                for index in 0..length {
                    if index != 0 {
                        write!(f, ",")?;
                    }
                    let element = object
                        .borrow()
                        .properties()
                        .get(&PropertyKey::Index(index))
                        .map(|prop| prop.value_or_undefined())
                        .unwrap_or_default();
                    write!(f, " ")?;
                    display_value(&element, f, depth + 1)?;
                }
                return write!(f, " ]");
            }

            let keys: Vec<PropertyKey> = object.borrow().properties().keys().collect();
            write!(f, "{{")?;
            let mut first = true;
            for key in keys {
                let property = object.borrow().properties().get(&key).cloned();
                if let Some(property) = property {
                    if !first {
                        write!(f, ",")?;
                    }
                    first = false;
                    write!(f, " {}: ", key)?;
                    display_value(&property.value_or_undefined(), f, depth + 1)?;
                }
            }
            write!(f, " }}")
        }
    }
}

impl Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value, f, 0)
    }
}
