//! The garbage collected handle to an [`Object`], and the `[[Call]]` /
//! `[[Construct]]` internal methods.

use super::{Object, ObjectData, PROTOTYPE};
use crate::{
    builtins::function::{self, Function},
    gc::{Cell, Finalize, Gc, Ref, RefMut, Trace},
    property::PropertyKey,
    value::JsValue,
    Context, JsResult,
};
use std::hash::Hasher;

/// Garbage collected `Object`. Identity (`ptr_eq`) is object identity.
#[derive(Trace, Finalize, Clone, Debug)]
pub struct JsObject(Gc<Cell<Object>>);

impl JsObject {
    /// Create a new `JsObject` from an internal `Object`.
    #[inline]
    pub fn new(object: Object) -> Self {
        Self(Gc::new(Cell::new(object)))
    }

    /// Immutably borrows the `Object`.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.borrow()
    }

    /// Mutably borrows the `Object`.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    #[inline]
    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.0.borrow_mut()
    }

    /// Checks if the garbage collected memory is the same.
    #[inline]
    pub fn ptr_eq(lhs: &Self, rhs: &Self) -> bool {
        std::ptr::eq(lhs.as_raw_ptr(), rhs.as_raw_ptr())
    }

    /// A stable address for identity keyed tables (the accessor cycle
    /// guard, the replay caches).
    #[inline]
    pub(crate) fn as_raw_ptr(&self) -> *const Cell<Object> {
        &*self.0 as *const _
    }

    pub(crate) fn hash_by_identity<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.as_raw_ptr(), state);
    }

    /// It determines if the object is a callable function with a
    /// `[[Call]]` internal method. Proxies are callable when their target
    /// is, which is also what makes `typeof proxy` report `"function"`.
    pub fn is_callable(&self) -> bool {
        match self.borrow().data {
            ObjectData::Function(ref function) => function.is_callable(),
            ObjectData::Proxy(ref proxy) => proxy.target().is_callable(),
            _ => false,
        }
    }

    /// It determines if the object has a `[[Construct]]` internal method.
    pub fn is_constructor(&self) -> bool {
        match self.borrow().data {
            ObjectData::Function(ref function) => function.is_constructable(),
            ObjectData::Proxy(ref proxy) => proxy.target().is_constructor(),
            _ => false,
        }
    }

    /// `IsArray`: checks the object kind, piercing proxies.
    pub fn is_array(&self) -> bool {
        match self.borrow().data {
            ObjectData::Array => true,
            ObjectData::Proxy(ref proxy) => proxy.target().is_array(),
            _ => false,
        }
    }

    /// Returns the raw prototype slot (no proxy traps).
    #[inline]
    pub fn prototype_instance(&self) -> JsValue {
        self.borrow().prototype().clone()
    }

    /// Reads the `prototype` property of a constructor, the object new
    /// instances inherit from.
    pub(crate) fn construction_prototype(&self, context: &mut Context) -> JsResult<JsValue> {
        let prototype = JsValue::from(self.clone()).get_field(PROTOTYPE, context)?;
        if prototype.is_object() {
            Ok(prototype)
        } else {
            // A clobbered `prototype` property falls back to %Object.prototype%.
            Ok(context
                .standard_objects()
                .object_object()
                .prototype()
                .into())
        }
    }

    /// The internal `[[Call]]` method.
    pub fn call(
        &self,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let data = {
            let object = self.borrow();
            match object.data {
                ObjectData::Function(ref function) => CallDispatch::Function(function.clone()),
                ObjectData::Proxy(ref proxy) => {
                    CallDispatch::Proxy(proxy.target().clone(), proxy.handler().clone())
                }
                _ => CallDispatch::NotCallable,
            }
        };

        match data {
            CallDispatch::Function(Function::Native {
                function,
                constructable: _,
            }) => (function.0)(this, args, context),
            CallDispatch::Function(Function::Closure { ref function, .. }) => {
                function(this, args, context)
            }
            CallDispatch::Function(Function::Ordinary { .. }) => {
                function::call_ordinary(self, this, args, &JsValue::undefined(), context)
            }
            CallDispatch::Function(Function::Bound {
                ref target,
                this: ref bound_this,
                args: ref bound_args,
            }) => {
                let mut all_args = bound_args.clone();
                all_args.extend_from_slice(args);
                target.call(&bound_this, &all_args, context)
            }
            CallDispatch::Function(Function::Class(_)) => context
                .throw_type_error("class constructor cannot be invoked without 'new'"),
            CallDispatch::Proxy(target, handler) => {
                let trap = JsValue::from(handler).get_field("apply", context)?;
                if trap.is_null_or_undefined() {
                    return target.call(this, args, context);
                }
                if !trap.is_function() {
                    return context.throw_type_error("proxy handler.apply is not a function");
                }
                let args_array = crate::builtins::array::Array::from_values(args, context);
                context.call(
                    &trap,
                    &self.clone().into(),
                    &[target.into(), this.clone(), args_array],
                )
            }
            CallDispatch::NotCallable => {
                context.throw_type_error("called value is not a function")
            }
        }
    }

    /// The internal `[[Construct]]` method.
    pub fn construct(
        &self,
        args: &[JsValue],
        new_target: &JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let data = {
            let object = self.borrow();
            match object.data {
                ObjectData::Function(ref function) => CallDispatch::Function(function.clone()),
                ObjectData::Proxy(ref proxy) => {
                    CallDispatch::Proxy(proxy.target().clone(), proxy.handler().clone())
                }
                _ => CallDispatch::NotCallable,
            }
        };

        match data {
            CallDispatch::Function(Function::Native {
                function,
                constructable,
            }) => {
                if !constructable {
                    return context.throw_type_error("function is not a constructor");
                }
                // Native constructors allocate their own `this`, receiving
                // the new target for prototype resolution.
                (function.0)(new_target, args, context)
            }
            CallDispatch::Function(Function::Closure {
                ref function,
                constructable,
            }) => {
                if !constructable {
                    return context.throw_type_error("function is not a constructor");
                }
                function(new_target, args, context)
            }
            CallDispatch::Function(Function::Ordinary { ref flags, .. }) => {
                if !flags.is_constructable() {
                    return context.throw_type_error("function is not a constructor");
                }
                function::construct_ordinary(self, args, new_target, context)
            }
            CallDispatch::Function(Function::Bound { ref target, args: ref bound_args, .. }) => {
                let mut all_args = bound_args.clone();
                all_args.extend_from_slice(args);
                // If new.target was the bound function itself, it is
                // replaced with the wrapped target.
                let new_target = match new_target.as_object() {
                    Some(object) if Self::ptr_eq(object, self) => target.clone().into(),
                    _ => new_target.clone(),
                };
                target.construct(&all_args, &new_target, context)
            }
            CallDispatch::Function(Function::Class(_)) => {
                crate::exec::class::construct_class(self, args, new_target, context)
            }
            CallDispatch::Proxy(target, handler) => {
                let trap = JsValue::from(handler).get_field("construct", context)?;
                if trap.is_null_or_undefined() {
                    return target.construct(args, new_target, context);
                }
                if !trap.is_function() {
                    return context.throw_type_error("proxy handler.construct is not a function");
                }
                let args_array = crate::builtins::array::Array::from_values(args, context);
                let result = context.call(
                    &trap,
                    &self.clone().into(),
                    &[target.into(), args_array, new_target.clone()],
                )?;
                if !result.is_object() {
                    return context
                        .throw_type_error("proxy construct trap must return an object");
                }
                Ok(result)
            }
            CallDispatch::NotCallable => {
                context.throw_type_error("constructed value is not a constructor")
            }
        }
    }

    /// `OrdinaryHasInstance`: walks the prototype chain of `value` looking
    /// for this constructor's `prototype` object.
    pub fn ordinary_has_instance(
        &self,
        value: &JsValue,
        context: &mut Context,
    ) -> JsResult<bool> {
        if !self.is_callable() {
            return context.throw_type_error("right-hand side of 'instanceof' is not callable");
        }

        // Bound functions defer to their wrapped target.
        let bound_target = match self.borrow().data {
            ObjectData::Function(Function::Bound { ref target, .. }) => Some(target.clone()),
            _ => None,
        };
        if let Some(target) = bound_target {
            return target.ordinary_has_instance(value, context);
        }

        let mut object = match value.as_object() {
            Some(object) => object.clone(),
            None => return Ok(false),
        };

        let prototype = self.construction_prototype(context)?;
        let prototype = match prototype.as_object() {
            Some(prototype) => prototype.clone(),
            None => {
                return context
                    .throw_type_error("constructor prototype must be an object")
            }
        };

        loop {
            let parent = object.get_prototype_of(context)?;
            match parent.as_object() {
                Some(parent) => {
                    if Self::ptr_eq(parent, &prototype) {
                        return Ok(true);
                    }
                    object = parent.clone();
                }
                None => return Ok(false),
            }
        }
    }

    /// Convenience: reads an own property without invoking proxy traps or
    /// accessors.
    pub(crate) fn get_direct(&self, key: &PropertyKey) -> Option<JsValue> {
        self.borrow()
            .properties()
            .get(key)
            .map(|descriptor| descriptor.value_or_undefined())
    }
}

enum CallDispatch {
    Function(Function),
    Proxy(JsObject, JsObject),
    NotCallable,
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}
