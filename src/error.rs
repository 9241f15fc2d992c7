//! Host-level error types.
//!
//! Inside the evaluator every failure travels as a [`Flow`](crate::Flow)
//! unwind signal carrying a plain [`JsValue`]. At the embedder boundary an
//! uncaught throw is converted into a [`JsError`]: either a structured
//! native error (when the thrown value is one of the engine error objects)
//! or an opaque wrapper around whatever value was thrown.

use crate::{
    gc::{empty_trace, Finalize, Trace},
    object::ObjectData,
    value::JsValue,
};
use std::fmt::{self, Display};
use thiserror::Error;

/// The taxonomy of native errors the engine itself can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Finalize)]
pub enum NativeErrorKind {
    Error,
    Type,
    Range,
    Reference,
    Syntax,
    Eval,
    Uri,
    Aggregate,
}

// Safety: `NativeErrorKind` contains no garbage collected references.
unsafe impl Trace for NativeErrorKind {
    empty_trace!();
}

impl NativeErrorKind {
    /// The JavaScript-visible constructor name for this kind.
    pub fn constructor_name(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Type => "TypeError",
            Self::Range => "RangeError",
            Self::Reference => "ReferenceError",
            Self::Syntax => "SyntaxError",
            Self::Eval => "EvalError",
            Self::Uri => "URIError",
            Self::Aggregate => "AggregateError",
        }
    }
}

impl Display for NativeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constructor_name())
    }
}

/// A native error record: kind plus message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct JsNativeError {
    pub kind: NativeErrorKind,
    pub message: String,
}

impl JsNativeError {
    pub fn new<M>(kind: NativeErrorKind, message: M) -> Self
    where
        M: Into<String>,
    {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// An error escaping the evaluator to the embedder.
#[derive(Debug, Clone, Error)]
pub enum JsError {
    /// The thrown value was one of the engine error objects.
    #[error(transparent)]
    Native(#[from] JsNativeError),

    /// Any other thrown value. JavaScript can throw anything.
    #[error("uncaught exception: {}", .0.display())]
    Opaque(JsValue),
}

impl JsError {
    /// Builds a `JsError` from an uncaught thrown value, recovering the
    /// native kind and message when the value is an engine error object.
    pub(crate) fn from_thrown(value: JsValue, context: &mut crate::Context) -> Self {
        if let JsValue::Object(ref object) = value {
            let kind = match object.borrow().data {
                ObjectData::Error(kind) => Some(kind),
                _ => None,
            };
            if let Some(kind) = kind {
                let message = value
                    .get_field("message", context)
                    .ok()
                    .and_then(|message| message.as_string().cloned())
                    .map(|message| message.to_string())
                    .unwrap_or_default();
                return Self::Native(JsNativeError { kind, message });
            }
        }
        Self::Opaque(value)
    }

    /// Returns the native error record, if this is a native error.
    pub fn as_native(&self) -> Option<&JsNativeError> {
        match self {
            Self::Native(native) => Some(native),
            Self::Opaque(_) => None,
        }
    }
}
