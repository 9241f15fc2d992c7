//! A shared, immutable JavaScript string.

use crate::gc::{empty_trace, Finalize, Trace};
use std::{
    borrow::Borrow,
    fmt::{self, Display},
    ops::Deref,
    rc::Rc,
};

/// The string type used by the interpreter.
///
/// Cloning is cheap (a reference count bump) and the contents are immutable,
/// which matches how property keys and identifier names are shared between
/// environments, objects and the AST.
#[derive(Debug, Finalize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsString(Rc<str>);

// Safety: `JsString` contains no garbage collected references.
unsafe impl Trace for JsString {
    empty_trace!();
}

impl JsString {
    /// Creates a new `JsString` from anything stringy.
    #[inline]
    pub fn new<S>(string: S) -> Self
    where
        S: Into<Self>,
    {
        string.into()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Concatenates two strings into a fresh allocation.
    pub fn concat<S>(&self, other: S) -> Self
    where
        S: AsRef<str>,
    {
        let mut result = String::with_capacity(self.len() + other.as_ref().len());
        result.push_str(self);
        result.push_str(other.as_ref());
        Self::from(result)
    }
}

impl Default for JsString {
    #[inline]
    fn default() -> Self {
        Self(Rc::from(String::new()))
    }
}

impl Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl PartialEq<str> for JsString {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<JsString> for str {
    #[inline]
    fn eq(&self, other: &JsString) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<&str> for JsString {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<JsString> for &str {
    #[inline]
    fn eq(&self, other: &JsString) -> bool {
        *self == other.as_str()
    }
}

impl Deref for JsString {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Borrow<str> for JsString {
    #[inline]
    fn borrow(&self) -> &str {
        self.0.borrow()
    }
}

impl AsRef<str> for JsString {
    #[inline]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for JsString {
    #[inline]
    fn from(string: String) -> Self {
        Self(Rc::from(string))
    }
}

impl From<Box<str>> for JsString {
    #[inline]
    fn from(string: Box<str>) -> Self {
        Self(Rc::from(string))
    }
}

impl From<&str> for JsString {
    #[inline]
    fn from(string: &str) -> Self {
        Self(Rc::from(string))
    }
}

impl From<&JsString> for String {
    #[inline]
    fn from(string: &JsString) -> Self {
        string.to_string()
    }
}
