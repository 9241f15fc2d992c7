//! The `Reflect` namespace: the fundamental object operations as ordinary
//! functions.

use crate::{
    builtins::function::make_builtin_fn,
    object::{JsObject, Object},
    property::{Attribute, PropertyDescriptor},
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Reflect;

impl Reflect {
    fn target(args: &[JsValue], context: &mut Context) -> JsResult<JsObject> {
        match args.first().and_then(JsValue::as_object) {
            Some(object) => Ok(object.clone()),
            None => context.throw_type_error("Reflect target must be an object"),
        }
    }

    /// `Reflect.get(target, key[, receiver])`.
    fn get(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let receiver = args
            .get(2)
            .cloned()
            .unwrap_or_else(|| target.clone().into());
        target.get(&key, receiver, context)
    }

    /// `Reflect.set(target, key, value[, receiver])`.
    fn set(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let value = args.get(2).cloned().unwrap_or_default();
        let receiver = args
            .get(3)
            .cloned()
            .unwrap_or_else(|| target.clone().into());
        Ok(JsValue::boolean(target.set(key, value, receiver, context)?))
    }

    /// `Reflect.has(target, key)`.
    fn has(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        Ok(JsValue::boolean(target.has_property(&key, context)?))
    }

    /// `Reflect.deleteProperty(target, key)`.
    fn delete_property(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        Ok(JsValue::boolean(target.delete(&key, context)?))
    }

    /// `Reflect.ownKeys(target)`.
    fn own_keys(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let keys: Vec<JsValue> = target
            .own_property_keys(context)?
            .iter()
            .map(JsValue::from)
            .collect();
        Ok(crate::builtins::array::Array::from_values(&keys, context))
    }

    /// `Reflect.getPrototypeOf(target)`.
    fn get_prototype_of(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        target.get_prototype_of(context)
    }

    /// `Reflect.setPrototypeOf(target, proto)`.
    fn set_prototype_of(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let proto = args.get(1).cloned().unwrap_or_default();
        Ok(JsValue::boolean(target.set_prototype_of(proto, context)?))
    }

    /// `Reflect.defineProperty(target, key, descriptor)`.
    fn define_property(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let descriptor = PropertyDescriptor::from_value(
            &args.get(2).cloned().unwrap_or_default(),
            context,
        )?;
        Ok(JsValue::boolean(
            target.define_own_property(key, descriptor, context)?,
        ))
    }

    /// `Reflect.getOwnPropertyDescriptor(target, key)`.
    fn get_own_property_descriptor(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        match target.get_own_property(&key, context)? {
            Some(descriptor) => Ok(descriptor.to_value(context)),
            None => Ok(JsValue::undefined()),
        }
    }

    /// `Reflect.preventExtensions(target)`.
    fn prevent_extensions(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        Ok(JsValue::boolean(target.prevent_extensions(context)?))
    }

    /// `Reflect.isExtensible(target)`.
    fn is_extensible(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        Ok(JsValue::boolean(target.is_extensible(context)?))
    }

    /// `Reflect.apply(target, thisArg, argsList)`.
    fn apply(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        if !target.is_callable() {
            return context.throw_type_error("Reflect.apply target must be callable");
        }
        let this_arg = args.get(1).cloned().unwrap_or_default();
        let arg_list = args.get(2).cloned().unwrap_or_default();
        let length = arg_list.get_field("length", context)?.to_length(context)?;
        let mut arguments = Vec::with_capacity(length);
        for index in 0..length {
            arguments.push(arg_list.get_field(index, context)?);
        }
        target.call(&this_arg, &arguments, context)
    }

    /// `Reflect.construct(target, argsList[, newTarget])`.
    fn construct(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = Self::target(args, context)?;
        if !target.is_constructor() {
            return context.throw_type_error("Reflect.construct target must be a constructor");
        }
        let arg_list = args.get(1).cloned().unwrap_or_default();
        let length = arg_list.get_field("length", context)?.to_length(context)?;
        let mut arguments = Vec::with_capacity(length);
        for index in 0..length {
            arguments.push(arg_list.get_field(index, context)?);
        }
        let new_target = args
            .get(2)
            .cloned()
            .unwrap_or_else(|| target.clone().into());
        target.construct(&arguments, &new_target, context)
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("reflect", "init");

        let reflect = JsObject::new(Object::create(
            context
                .standard_objects()
                .object_object()
                .prototype()
                .into(),
        ));
        make_builtin_fn(Self::get, "get", &reflect, 2, context);
        make_builtin_fn(Self::set, "set", &reflect, 3, context);
        make_builtin_fn(Self::has, "has", &reflect, 2, context);
        make_builtin_fn(Self::delete_property, "deleteProperty", &reflect, 2, context);
        make_builtin_fn(Self::own_keys, "ownKeys", &reflect, 1, context);
        make_builtin_fn(Self::get_prototype_of, "getPrototypeOf", &reflect, 1, context);
        make_builtin_fn(Self::set_prototype_of, "setPrototypeOf", &reflect, 2, context);
        make_builtin_fn(Self::define_property, "defineProperty", &reflect, 3, context);
        make_builtin_fn(
            Self::get_own_property_descriptor,
            "getOwnPropertyDescriptor",
            &reflect,
            2,
            context,
        );
        make_builtin_fn(
            Self::prevent_extensions,
            "preventExtensions",
            &reflect,
            1,
            context,
        );
        make_builtin_fn(Self::is_extensible, "isExtensible", &reflect, 1, context);
        make_builtin_fn(Self::apply, "apply", &reflect, 3, context);
        make_builtin_fn(Self::construct, "construct", &reflect, 2, context);

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Reflect",
            reflect,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
