//! The Rust representation of a JavaScript object.
//!
//! Every object variant shares a common header: an ordered property table,
//! a prototype slot, an extensibility flag and a table of named internal
//! slots. The [`ObjectData`] tag carries the variant specific state.

use crate::{
    bigint::JsBigInt,
    builtins::{
        array::array_iterator::ArrayIterator,
        function::{arguments::Arguments, Function},
        generator::GeneratorContext,
        map::{map_iterator::MapIterator, ordered_map::OrderedMap},
        promise::Promise,
        proxy::Proxy,
        set::set_iterator::SetIterator,
    },
    error::NativeErrorKind,
    gc::{Cell, Finalize, Gc, Trace},
    module::ModuleRecord,
    property::{DataDescriptor, PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};
use rustc_hash::FxHashMap;
use std::{
    any::Any,
    fmt::{self, Debug, Display},
};

mod internal_methods;
mod jsobject;
mod property_map;

pub use jsobject::JsObject;
pub use property_map::PropertyMap;

/// Static `prototype`, usually set on constructors as a key to point to
/// their respective prototype object.
pub static PROTOTYPE: &str = "prototype";

/// This trait allows Rust types to be passed around as opaque host objects.
///
/// It is automatically implemented when a type implements `Debug`, `Any`
/// and `Trace`. This is the extension point for host-provided builtins
/// (Date, RegExp, typed arrays, weak collections and friends).
pub trait NativeObject: Debug + Any + Trace {
    /// Convert the Rust type which implements `NativeObject` to a `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Convert the Rust type which implements `NativeObject` to a `&mut dyn Any`.
    fn as_mut_any(&mut self) -> &mut dyn Any;
}

impl<T: Any + Debug + Trace> NativeObject for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }

    #[inline]
    fn as_mut_any(&mut self) -> &mut dyn Any {
        self as &mut dyn Any
    }
}

/// The internal representation of a JavaScript object.
#[derive(Debug, Trace, Finalize)]
pub struct Object {
    /// The type of the object.
    pub data: ObjectData,
    /// The ordered property table.
    properties: PropertyMap,
    /// Instance prototype, `__proto__`: another object or null.
    prototype: JsValue,
    /// Whether it can have new properties added to it.
    extensible: bool,
    /// Untyped named storage for engine internal state.
    internal_slots: FxHashMap<JsString, JsValue>,
}

/// Defines the different kinds of objects.
#[derive(Debug, Trace, Finalize)]
pub enum ObjectData {
    Ordinary,
    Array,
    ArrayIterator(ArrayIterator),
    Arguments(Arguments),
    BigInt(JsBigInt),
    Boolean(bool),
    Error(NativeErrorKind),
    Function(Function),
    Generator(Gc<Cell<GeneratorContext>>),
    Global,
    Map(OrderedMap<JsValue>),
    MapIterator(MapIterator),
    ModuleNamespace(Gc<Cell<ModuleRecord>>),
    NativeObject(Box<dyn NativeObject>),
    Number(f64),
    Promise(Promise),
    Proxy(Proxy),
    Set(OrderedMap<()>),
    SetIterator(SetIterator),
    String(JsString),
    Symbol(JsSymbol),
}

impl Display for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ordinary => "Ordinary",
                Self::Array => "Array",
                Self::ArrayIterator(_) => "ArrayIterator",
                Self::Arguments(_) => "Arguments",
                Self::BigInt(_) => "BigInt",
                Self::Boolean(_) => "Boolean",
                Self::Error(_) => "Error",
                Self::Function(_) => "Function",
                Self::Generator(_) => "Generator",
                Self::Global => "Global",
                Self::Map(_) => "Map",
                Self::MapIterator(_) => "MapIterator",
                Self::ModuleNamespace(_) => "Module",
                Self::NativeObject(_) => "NativeObject",
                Self::Number(_) => "Number",
                Self::Promise(_) => "Promise",
                Self::Proxy(_) => "Proxy",
                Self::Set(_) => "Set",
                Self::SetIterator(_) => "SetIterator",
                Self::String(_) => "String",
                Self::Symbol(_) => "Symbol",
            }
        )
    }
}

impl Default for Object {
    /// Return a new `Object`, with `data` set to `Ordinary`.
    #[inline]
    fn default() -> Self {
        Self {
            data: ObjectData::Ordinary,
            properties: PropertyMap::default(),
            prototype: JsValue::Null,
            extensible: true,
            internal_slots: FxHashMap::default(),
        }
    }
}

impl Object {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// `OrdinaryObjectCreate`: a plain object with the given prototype.
    #[inline]
    pub fn create(proto: JsValue) -> Self {
        let mut object = Self::default();
        object.prototype = proto;
        object
    }

    /// Return a new function object with the given prototype.
    #[inline]
    pub fn function(function: Function, prototype: JsValue) -> Self {
        let mut object = Self::create(prototype);
        object.data = ObjectData::Function(function);
        object
    }

    /// Create a new native object of type `T`.
    #[inline]
    pub fn native_object<T>(value: T) -> Self
    where
        T: NativeObject,
    {
        let mut object = Self::default();
        object.data = ObjectData::NativeObject(Box::new(value));
        object
    }

    /// Checks if it is an `Array` object.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self.data, ObjectData::Array)
    }

    /// Checks if it is a `Function` object.
    #[inline]
    pub fn is_function(&self) -> bool {
        matches!(self.data, ObjectData::Function(_))
    }

    #[inline]
    pub fn as_function(&self) -> Option<&Function> {
        match self.data {
            ObjectData::Function(ref function) => Some(function),
            _ => None,
        }
    }

    /// Checks if it is a `String` wrapper object.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self.data, ObjectData::String(_))
    }

    #[inline]
    pub fn as_string(&self) -> Option<JsString> {
        match self.data {
            ObjectData::String(ref string) => Some(string.clone()),
            _ => None,
        }
    }

    /// Checks if it is a `Symbol` wrapper object.
    #[inline]
    pub fn as_symbol(&self) -> Option<JsSymbol> {
        match self.data {
            ObjectData::Symbol(ref symbol) => Some(symbol.clone()),
            _ => None,
        }
    }

    /// Checks if it is an `Error` object.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.data, ObjectData::Error(_))
    }

    #[inline]
    pub fn as_boolean(&self) -> Option<bool> {
        match self.data {
            ObjectData::Boolean(boolean) => Some(boolean),
            _ => None,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self.data {
            ObjectData::Number(number) => Some(number),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bigint(&self) -> Option<JsBigInt> {
        match self.data {
            ObjectData::BigInt(ref bigint) => Some(bigint.clone()),
            _ => None,
        }
    }

    /// Checks if it is a `Proxy` object.
    #[inline]
    pub fn is_proxy(&self) -> bool {
        matches!(self.data, ObjectData::Proxy(_))
    }

    #[inline]
    pub fn as_proxy(&self) -> Option<&Proxy> {
        match self.data {
            ObjectData::Proxy(ref proxy) => Some(proxy),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_ref(&self) -> Option<&OrderedMap<JsValue>> {
        match self.data {
            ObjectData::Map(ref map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut OrderedMap<JsValue>> {
        match &mut self.data {
            ObjectData::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_set_ref(&self) -> Option<&OrderedMap<()>> {
        match self.data {
            ObjectData::Set(ref set) => Some(set),
            _ => None,
        }
    }

    #[inline]
    pub fn as_set_mut(&mut self) -> Option<&mut OrderedMap<()>> {
        match &mut self.data {
            ObjectData::Set(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the properties of the object.
    #[inline]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[inline]
    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// Helper function for property insertion without validation.
    #[inline]
    pub(crate) fn insert<K, P>(&mut self, key: K, property: P) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        P: Into<PropertyDescriptor>,
    {
        self.properties.insert(&key.into(), property.into())
    }

    /// Helper function for property removal.
    #[inline]
    pub(crate) fn remove_property(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.remove(key)
    }

    /// Inserts a data property with the given attributes, without
    /// validation.
    #[inline]
    pub(crate) fn insert_property<K, V>(
        &mut self,
        key: K,
        value: V,
        attribute: crate::property::Attribute,
    ) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.insert(key.into(), DataDescriptor::new(value, attribute))
    }

    /// Returns the prototype slot, an object or null.
    #[inline]
    pub fn prototype(&self) -> &JsValue {
        &self.prototype
    }

    /// Sets the prototype slot without any validity checks.
    ///
    /// Callers go through `JsObject::set_prototype_of` for the checked
    /// variant that enforces the acyclic chain invariant.
    #[inline]
    pub fn set_prototype(&mut self, prototype: JsValue) {
        debug_assert!(prototype.is_object() || prototype.is_null());
        self.prototype = prototype;
    }

    /// Check if it is extensible.
    #[inline]
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Disable extensibility.
    #[inline]
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// Reads a named internal slot.
    #[inline]
    pub fn get_internal_slot(&self, name: &str) -> Option<JsValue> {
        self.internal_slots.get(name).cloned()
    }

    /// Writes a named internal slot.
    #[inline]
    pub fn set_internal_slot<N>(&mut self, name: N, value: JsValue)
    where
        N: Into<JsString>,
    {
        self.internal_slots.insert(name.into(), value);
    }

    /// Checks for a named internal slot.
    #[inline]
    pub fn has_internal_slot(&self, name: &str) -> bool {
        self.internal_slots.contains_key(name)
    }
}
