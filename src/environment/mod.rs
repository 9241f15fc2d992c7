//! Environment records: the binding tables behind every scope.
//!
//! One record type serves every flavor (global, module, function, block,
//! parameter and `with` object scopes); the flavor steers where `var`
//! declarations land and which record answers `this`, `new.target` and
//! `super` lookups. Bindings carry their declaration kind and may exist
//! uninitialized, which is exactly the temporal dead zone: reading such a
//! binding is a `ReferenceError` until its declaration statement runs.

use crate::{
    gc::{Cell, Finalize, Gc, Trace},
    object::JsObject,
    property::{Attribute, DataDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
};
use rustc_hash::FxHashMap;
use std::fmt;

/// Environments are garbage collected, since closures keep their captured
/// chains alive and environments can cyclically reference the closures
/// they store.
pub type Environment = Gc<Cell<EnvironmentRecord>>;

/// The declaration kind of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Parameter,
}

// Safety: plain enum.
unsafe impl Trace for BindingKind {
    crate::gc::empty_trace!();
}

/// The flavor of an environment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum EnvironmentFlavor {
    Global,
    Module,
    Function,
    /// The separate parameter scope of functions with parameter
    /// expressions. Never a `var` target.
    Parameter,
    Block,
    /// A `with` scope backed by a binding object.
    Object,
}

// Safety: plain enum.
unsafe impl Trace for EnvironmentFlavor {
    crate::gc::empty_trace!();
}

/// The `this` slot of a record. Only function, module and global flavored
/// records carry one; arrow functions deliberately do not, so lookups walk
/// past them.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum ThisBinding {
    /// The record does not bind `this` at all.
    None,
    /// A derived constructor frame before `super()` has run.
    Uninitialized,
    Value(JsValue),
}

/// A single binding.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct Binding {
    kind: BindingKind,
    /// `None` while the binding is in its temporal dead zone.
    value: Option<JsValue>,
    /// Module import bindings are read-only views into the exporting
    /// module's environment.
    indirect: Option<(Environment, JsString)>,
}

/// Errors produced by binding operations. Converted into the proper
/// JavaScript error objects at the evaluation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    NotDeclared(JsString),
    AlreadyDeclared(JsString),
    /// Read or write of an uninitialized (TDZ) binding.
    Uninitialized(JsString),
    ImmutableAssignment(JsString),
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDeclared(name) => write!(f, "{} is not defined", name),
            Self::AlreadyDeclared(name) => {
                write!(f, "identifier '{}' has already been declared", name)
            }
            Self::Uninitialized(name) => {
                write!(f, "cannot access '{}' before initialization", name)
            }
            Self::ImmutableAssignment(name) => {
                write!(f, "assignment to constant variable '{}'", name)
            }
        }
    }
}

/// An environment record: a binding table plus the scope metadata.
#[derive(Debug, Trace, Finalize)]
pub struct EnvironmentRecord {
    bindings: FxHashMap<JsString, Binding>,
    parent: Option<Environment>,
    flavor: EnvironmentFlavor,
    this: ThisBinding,
    new_target: Option<JsValue>,
    /// `[[HomeObject]]` for `super` references in methods.
    home_object: Option<JsObject>,
    /// The binding object of global and `with` scopes.
    binding_object: Option<JsObject>,
    /// Set on class body scopes; marks the lexical region where
    /// `#private` member access is legal.
    class_object: Option<JsObject>,
}

impl EnvironmentRecord {
    pub fn new(flavor: EnvironmentFlavor, parent: Option<Environment>) -> Self {
        Self {
            bindings: FxHashMap::default(),
            parent,
            flavor,
            this: ThisBinding::None,
            new_target: None,
            home_object: None,
            binding_object: None,
            class_object: None,
        }
    }

    #[inline]
    pub fn flavor(&self) -> EnvironmentFlavor {
        self.flavor
    }

    #[inline]
    pub fn parent(&self) -> Option<Environment> {
        self.parent.clone()
    }

    #[inline]
    pub fn this_binding(&self) -> &ThisBinding {
        &self.this
    }

    pub fn bind_this(&mut self, this: ThisBinding) {
        self.this = this;
    }

    #[inline]
    pub fn new_target(&self) -> Option<&JsValue> {
        self.new_target.as_ref()
    }

    pub fn set_new_target(&mut self, new_target: JsValue) {
        self.new_target = Some(new_target);
    }

    #[inline]
    pub fn home_object(&self) -> Option<&JsObject> {
        self.home_object.as_ref()
    }

    pub fn set_home_object(&mut self, home: JsObject) {
        self.home_object = Some(home);
    }

    #[inline]
    pub fn binding_object(&self) -> Option<&JsObject> {
        self.binding_object.as_ref()
    }

    pub fn set_binding_object(&mut self, object: JsObject) {
        self.binding_object = Some(object);
    }

    #[inline]
    pub fn class_object(&self) -> Option<&JsObject> {
        self.class_object.as_ref()
    }

    pub fn set_class_object(&mut self, class: JsObject) {
        self.class_object = Some(class);
    }

    /// Does this record (not the chain) have a binding for `name`?
    pub fn has_binding(&self, name: &str) -> bool {
        if self.bindings.contains_key(name) {
            return true;
        }
        match self.binding_object {
            Some(ref object) => object_has_property(object, name),
            None => false,
        }
    }

    /// Creates a binding. `initial` of `None` leaves the binding in its
    /// dead zone. Redeclaration is an error except for `var`/`function`
    /// kinds, which rebind.
    pub fn create_binding(
        &mut self,
        name: JsString,
        kind: BindingKind,
        initial: Option<JsValue>,
    ) -> Result<(), EnvironmentError> {
        if let Some(existing) = self.bindings.get(&name) {
            let tolerated = matches!(kind, BindingKind::Var | BindingKind::Function)
                && matches!(existing.kind, BindingKind::Var | BindingKind::Function);
            if !tolerated {
                return Err(EnvironmentError::AlreadyDeclared(name));
            }
            // `var` redeclaration keeps the existing value unless a new
            // initializer is provided.
            if initial.is_none() {
                return Ok(());
            }
        }
        // Global var and function declarations reflect onto the global
        // object.
        if self.flavor == EnvironmentFlavor::Global
            && matches!(kind, BindingKind::Var | BindingKind::Function)
        {
            if let Some(object) = self.binding_object.clone() {
                object_set_property(
                    &object,
                    &name,
                    initial.clone().unwrap_or_default(),
                );
            }
        }
        self.bindings.insert(
            name,
            Binding {
                kind,
                value: initial,
                indirect: None,
            },
        );
        Ok(())
    }

    /// Replay-tolerant binding creation used while a generator or async
    /// body is being re-executed: an existing binding is simply rebound.
    pub fn create_binding_replay(
        &mut self,
        name: JsString,
        kind: BindingKind,
        initial: Option<JsValue>,
    ) {
        self.bindings.insert(
            name,
            Binding {
                kind,
                value: initial,
                indirect: None,
            },
        );
    }

    /// Creates a read-only view into another module environment's binding.
    pub fn create_import_binding(
        &mut self,
        name: JsString,
        source: Environment,
        source_name: JsString,
    ) {
        self.bindings.insert(
            name,
            Binding {
                kind: BindingKind::Const,
                value: None,
                indirect: Some((source, source_name)),
            },
        );
    }

    /// Moves a binding out of its dead zone.
    pub fn initialize_binding(&mut self, name: &str, value: JsValue) {
        if let Some(binding) = self.bindings.get_mut(name) {
            binding.value = Some(value);
            return;
        }
        // Object-backed scopes initialize through their binding object.
        if let Some(object) = self.binding_object.clone() {
            object_set_property(&object, name, value);
        }
    }

    /// Reads a binding of this record.
    pub fn get_binding_value(&self, name: &str) -> Result<JsValue, EnvironmentError> {
        if let Some(binding) = self.bindings.get(name) {
            if let Some((ref source, ref source_name)) = binding.indirect {
                // Live view: reads always go to the exporting module.
                return source.borrow().get_binding_value(source_name);
            }
            return binding
                .value
                .clone()
                .ok_or_else(|| EnvironmentError::Uninitialized(name.into()));
        }
        if let Some(ref object) = self.binding_object {
            if let Some(value) = object_get_property(object, name) {
                return Ok(value);
            }
        }
        Err(EnvironmentError::NotDeclared(name.into()))
    }

    /// Writes a binding of this record, enforcing `const` immutability and
    /// the dead zone.
    pub fn set_binding_value(
        &mut self,
        name: &str,
        value: JsValue,
    ) -> Result<(), EnvironmentError> {
        if let Some(binding) = self.bindings.get_mut(name) {
            if binding.indirect.is_some() {
                return Err(EnvironmentError::ImmutableAssignment(name.into()));
            }
            if binding.value.is_none() {
                return Err(EnvironmentError::Uninitialized(name.into()));
            }
            if binding.kind == BindingKind::Const {
                return Err(EnvironmentError::ImmutableAssignment(name.into()));
            }
            binding.value = Some(value.clone());
            if self.flavor == EnvironmentFlavor::Global {
                if let Some(object) = self.binding_object.clone() {
                    object_set_property(&object, name, value);
                }
            }
            return Ok(());
        }
        if let Some(object) = self.binding_object.clone() {
            if object_has_property(&object, name) {
                object_set_property(&object, name, value);
                return Ok(());
            }
        }
        Err(EnvironmentError::NotDeclared(name.into()))
    }

    /// Unchecked write, used by the two-way `arguments` aliasing.
    pub fn set_binding_value_unchecked(&mut self, name: &str, value: JsValue) {
        if let Some(binding) = self.bindings.get_mut(name) {
            binding.value = Some(value);
        }
    }

    /// Removes a binding; `delete` of sloppy-mode globals.
    pub fn delete_binding(&mut self, name: &str) -> bool {
        if self.bindings.remove(name).is_some() {
            if let Some(ref object) = self.binding_object {
                let mut object = object.borrow_mut();
                object.remove_property(&PropertyKey::from(name));
            }
            return true;
        }
        if let Some(ref object) = self.binding_object {
            let mut object = object.borrow_mut();
            return object.remove_property(&PropertyKey::from(name)).is_some();
        }
        false
    }

    /// Every binding name of this record, for direct-eval conflict checks.
    pub fn binding_names(&self) -> Vec<JsString> {
        self.bindings.keys().cloned().collect()
    }

    /// The kind of a binding of this record.
    pub fn binding_kind(&self, name: &str) -> Option<BindingKind> {
        self.bindings.get(name).map(|binding| binding.kind)
    }
}

// Raw property access on binding objects: global and `with` scopes read
// and write plain data properties without invoking traps.

fn object_has_property(object: &JsObject, name: &str) -> bool {
    let key = PropertyKey::from(name);
    let mut current = object.clone();
    loop {
        if current.borrow().properties().contains_key(&key) {
            return true;
        }
        let parent = current.prototype_instance();
        match parent.as_object() {
            Some(parent) => current = parent.clone(),
            None => return false,
        }
    }
}

fn object_get_property(object: &JsObject, name: &str) -> Option<JsValue> {
    let key = PropertyKey::from(name);
    let mut current = object.clone();
    loop {
        let value = current
            .borrow()
            .properties()
            .get(&key)
            .map(|descriptor| descriptor.value_or_undefined());
        if let Some(value) = value {
            return Some(value);
        }
        let parent = current.prototype_instance();
        match parent.as_object() {
            Some(parent) => current = parent.clone(),
            None => return None,
        }
    }
}

fn object_set_property(object: &JsObject, name: &str, value: JsValue) {
    object
        .borrow_mut()
        .insert(name, DataDescriptor::new(value, Attribute::default()));
}

/// Creates a block flavored environment chained to `parent`.
pub fn new_declarative_environment(parent: Option<Environment>) -> Environment {
    Gc::new(Cell::new(EnvironmentRecord::new(
        EnvironmentFlavor::Block,
        parent,
    )))
}

/// Creates a function flavored environment. `this` of `None` creates an
/// arrow scope that defers `this` lookups outwards.
pub fn new_function_environment(
    this: ThisBinding,
    new_target: Option<JsValue>,
    home_object: Option<JsObject>,
    parent: Option<Environment>,
) -> Environment {
    let mut record = EnvironmentRecord::new(EnvironmentFlavor::Function, parent);
    record.this = this;
    record.new_target = new_target;
    record.home_object = home_object;
    Gc::new(Cell::new(record))
}

/// Creates the separate parameter scope of functions with parameter
/// expressions.
pub fn new_parameter_environment(parent: Option<Environment>) -> Environment {
    Gc::new(Cell::new(EnvironmentRecord::new(
        EnvironmentFlavor::Parameter,
        parent,
    )))
}

/// Creates a module environment.
pub fn new_module_environment(parent: Option<Environment>) -> Environment {
    Gc::new(Cell::new(EnvironmentRecord::new(
        EnvironmentFlavor::Module,
        parent,
    )))
}

/// Creates a `with` scope backed by `object`.
pub fn new_object_environment(object: JsObject, parent: Option<Environment>) -> Environment {
    let mut record = EnvironmentRecord::new(EnvironmentFlavor::Object, parent);
    record.binding_object = Some(object);
    Gc::new(Cell::new(record))
}

/// Creates the global environment of a realm, bound to the global object.
pub fn new_global_environment(global: JsObject, this: JsValue) -> Environment {
    let mut record = EnvironmentRecord::new(EnvironmentFlavor::Global, None);
    record.binding_object = Some(global);
    record.this = ThisBinding::Value(this);
    Gc::new(Cell::new(record))
}

/// Finds the innermost record in the chain with a binding for `name`.
pub fn lookup(environment: &Environment, name: &str) -> Option<Environment> {
    let mut current = environment.clone();
    loop {
        if current.borrow().has_binding(name) {
            return Some(current);
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Finds the record `var` declarations land in: the nearest function,
/// module or global record.
pub fn var_scope(environment: &Environment) -> Environment {
    let mut current = environment.clone();
    loop {
        let flavor = current.borrow().flavor();
        if matches!(
            flavor,
            EnvironmentFlavor::Function | EnvironmentFlavor::Module | EnvironmentFlavor::Global
        ) {
            return current;
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// Resolves `this` through the chain. `None` when no record binds it,
/// `Some(Err)` style is avoided: the caller maps [`ThisBinding::Uninitialized`]
/// to a `ReferenceError`.
pub fn this_binding(environment: &Environment) -> ThisBinding {
    let mut current = environment.clone();
    loop {
        let this = current.borrow().this_binding().clone();
        if !matches!(this, ThisBinding::None) {
            return this;
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return ThisBinding::None,
        }
    }
}

/// The record that binds `this` for the current frame, used by `super()`
/// to initialize a derived constructor's `this`.
pub fn this_binding_environment(environment: &Environment) -> Option<Environment> {
    let mut current = environment.clone();
    loop {
        if !matches!(current.borrow().this_binding(), ThisBinding::None) {
            return Some(current);
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolves `new.target` through the chain.
pub fn new_target(environment: &Environment) -> JsValue {
    let mut current = environment.clone();
    loop {
        if let Some(new_target) = current.borrow().new_target().cloned() {
            return new_target;
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return JsValue::undefined(),
        }
    }
}

/// Is this chain lexically inside a class body? Resolves the innermost
/// class scope marker.
pub fn enclosing_class(environment: &Environment) -> Option<JsObject> {
    let mut current = environment.clone();
    loop {
        if let Some(class) = current.borrow().class_object().cloned() {
            return Some(class);
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Resolves the `[[HomeObject]]` for `super` references.
pub fn home_object(environment: &Environment) -> Option<JsObject> {
    let mut current = environment.clone();
    loop {
        if let Some(home) = current.borrow().home_object().cloned() {
            return Some(home);
        }
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tdz_read_is_an_error() {
        let env = new_declarative_environment(None);
        env.borrow_mut()
            .create_binding("x".into(), BindingKind::Let, None)
            .unwrap();
        assert_eq!(
            env.borrow().get_binding_value("x"),
            Err(EnvironmentError::Uninitialized("x".into()))
        );
        env.borrow_mut().initialize_binding("x", JsValue::integer(1));
        assert_eq!(
            env.borrow().get_binding_value("x").unwrap().as_number(),
            Some(1.0)
        );
    }

    #[test]
    fn const_assignment_fails() {
        let env = new_declarative_environment(None);
        env.borrow_mut()
            .create_binding("c".into(), BindingKind::Const, Some(JsValue::integer(1)))
            .unwrap();
        assert_eq!(
            env.borrow_mut().set_binding_value("c", JsValue::integer(2)),
            Err(EnvironmentError::ImmutableAssignment("c".into()))
        );
    }

    #[test]
    fn var_scope_skips_blocks_and_parameter_scopes() {
        let function = new_function_environment(ThisBinding::None, None, None, None);
        let params = new_parameter_environment(Some(function.clone()));
        let block = new_declarative_environment(Some(params));
        let target = var_scope(&block);
        assert!(matches!(
            target.borrow().flavor(),
            EnvironmentFlavor::Function
        ));
        assert!(std::ptr::eq(&*target, &*function));
    }

    #[test]
    fn let_redeclaration_is_an_error_but_var_rebinds() {
        let env = new_declarative_environment(None);
        env.borrow_mut()
            .create_binding("a".into(), BindingKind::Var, Some(JsValue::integer(1)))
            .unwrap();
        assert!(env
            .borrow_mut()
            .create_binding("a".into(), BindingKind::Var, None)
            .is_ok());
        assert_eq!(
            env.borrow().get_binding_value("a").unwrap().as_number(),
            Some(1.0)
        );
        assert!(env
            .borrow_mut()
            .create_binding("a".into(), BindingKind::Let, None)
            .is_err());
    }
}
