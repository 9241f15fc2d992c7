//! The `Object` builtin: the constructor, the reflection statics programs
//! lean on constantly, and the base prototype methods.

use crate::{
    builtins::function::make_builtin_fn,
    object::{JsObject, Object as ObjectInternal},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Object;

impl Object {
    pub(crate) fn constructor(
        _new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match args.first() {
            None | Some(JsValue::Undefined) | Some(JsValue::Null) => {
                Ok(JsValue::new_object(context))
            }
            Some(value) => Ok(value.to_object(context)?.into()),
        }
    }

    fn first_as_object(
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsObject> {
        match args.first().and_then(JsValue::as_object) {
            Some(object) => Ok(object.clone()),
            None => context.throw_type_error("argument is not an object"),
        }
    }

    /// `Object.keys(target)`: own enumerable string keys.
    fn keys(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = match args.first() {
            Some(value) => value.to_object(context)?,
            None => return context.throw_type_error("cannot convert undefined to object"),
        };
        let mut keys = Vec::new();
        for key in object.own_property_keys(context)? {
            if matches!(key, PropertyKey::Symbol(_)) {
                continue;
            }
            let enumerable = object
                .get_own_property(&key, context)?
                .map(|descriptor| descriptor.enumerable())
                .unwrap_or(false);
            if enumerable {
                keys.push(JsValue::string(
                    key.as_js_string().expect("non-symbol key"),
                ));
            }
        }
        Ok(crate::builtins::array::Array::from_values(&keys, context))
    }

    /// `Object.getOwnPropertyNames(target)`.
    fn get_own_property_names(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = match args.first() {
            Some(value) => value.to_object(context)?,
            None => return context.throw_type_error("cannot convert undefined to object"),
        };
        let mut keys = Vec::new();
        for key in object.own_property_keys(context)? {
            if let Some(name) = key.as_js_string() {
                keys.push(JsValue::string(name));
            }
        }
        Ok(crate::builtins::array::Array::from_values(&keys, context))
    }

    /// `Object.defineProperty(target, key, descriptor)`.
    fn define_property(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = Self::first_as_object(args, context)?;
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let descriptor = PropertyDescriptor::from_value(
            &args.get(2).cloned().unwrap_or_default(),
            context,
        )?;
        object.define_property_or_throw(key, descriptor, context)?;
        Ok(args.first().cloned().unwrap_or_default())
    }

    /// `Object.getOwnPropertyDescriptor(target, key)`.
    fn get_own_property_descriptor(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = match args.first() {
            Some(value) => value.to_object(context)?,
            None => return context.throw_type_error("cannot convert undefined to object"),
        };
        let key = args
            .get(1)
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        match object.get_own_property(&key, context)? {
            Some(descriptor) => Ok(descriptor.to_value(context)),
            None => Ok(JsValue::undefined()),
        }
    }

    /// `Object.getPrototypeOf(target)`.
    fn get_prototype_of(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = match args.first() {
            Some(value) => value.to_object(context)?,
            None => return context.throw_type_error("cannot convert undefined to object"),
        };
        object.get_prototype_of(context)
    }

    /// `Object.setPrototypeOf(target, proto)`.
    fn set_prototype_of(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let object = Self::first_as_object(args, context)?;
        let proto = args.get(1).cloned().unwrap_or_default();
        if !object.set_prototype_of(proto, context)? {
            return context.throw_type_error("could not set prototype");
        }
        Ok(args.first().cloned().unwrap_or_default())
    }

    /// `Object.create(proto[, properties])`.
    fn create(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let proto = args.first().cloned().unwrap_or_default();
        if !proto.is_object() && !proto.is_null() {
            return context
                .throw_type_error("Object prototype may only be an object or null");
        }
        let object = JsValue::object(ObjectInternal::create(proto));
        if let Some(properties) = args.get(1) {
            if !properties.is_undefined() {
                let target = object.as_object().expect("just created").clone();
                let source = properties.to_object(context)?;
                for key in source.own_property_keys(context)? {
                    let descriptor_value = properties.get_field(key.clone(), context)?;
                    let descriptor =
                        PropertyDescriptor::from_value(&descriptor_value, context)?;
                    target.define_property_or_throw(key, descriptor, context)?;
                }
            }
        }
        Ok(object)
    }

    /// `Object.assign(target, ...sources)`.
    fn assign(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = match args.first() {
            Some(value) => value.to_object(context)?,
            None => return context.throw_type_error("cannot convert undefined to object"),
        };
        for source in args.get(1..).unwrap_or_default() {
            if source.is_null_or_undefined() {
                continue;
            }
            let from = source.to_object(context)?;
            for key in from.own_property_keys(context)? {
                let enumerable = from
                    .get_own_property(&key, context)?
                    .map(|descriptor| descriptor.enumerable())
                    .unwrap_or(false);
                if !enumerable {
                    continue;
                }
                let value = source.get_field(key.clone(), context)?;
                target.set(key, value, target.clone().into(), context)?;
            }
        }
        Ok(target.into())
    }

    /// `Object.freeze(target)`: non-extensible plus every own property
    /// non-configurable and (for data) non-writable.
    fn freeze(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = match args.first().and_then(JsValue::as_object) {
            Some(object) => object.clone(),
            None => return Ok(args.first().cloned().unwrap_or_default()),
        };
        object.prevent_extensions(context)?;
        let keys = object.own_property_keys(context)?;
        for key in keys {
            let updated = {
                let object_ref = object.borrow();
                object_ref.properties().get(&key).cloned()
            };
            if let Some(descriptor) = updated {
                let frozen: PropertyDescriptor = match descriptor {
                    PropertyDescriptor::Data(ref data) => {
                        let mut attributes = data.attributes();
                        attributes.set_writable(false);
                        attributes.set_configurable(false);
                        crate::property::DataDescriptor::new(data.value(), attributes).into()
                    }
                    PropertyDescriptor::Accessor(ref accessor) => {
                        let mut attributes = accessor.attributes();
                        attributes.set_configurable(false);
                        crate::property::AccessorDescriptor::new(
                            accessor.getter().cloned(),
                            accessor.setter().cloned(),
                            attributes,
                        )
                        .into()
                    }
                };
                object.borrow_mut().insert(key, frozen);
            }
        }
        Ok(args.first().cloned().unwrap_or_default())
    }

    /// `Object.preventExtensions(target)`.
    fn prevent_extensions(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if let Some(object) = args.first().and_then(JsValue::as_object) {
            object.clone().prevent_extensions(context)?;
        }
        Ok(args.first().cloned().unwrap_or_default())
    }

    /// `Object.isExtensible(target)`.
    fn is_extensible(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match args.first().and_then(JsValue::as_object) {
            Some(object) => Ok(JsValue::boolean(object.clone().is_extensible(context)?)),
            None => Ok(JsValue::boolean(false)),
        }
    }

    /// `Object.prototype.hasOwnProperty(key)`.
    fn has_own_property(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = args
            .first()
            .cloned()
            .unwrap_or_default()
            .to_property_key(context)?;
        let object = this.to_object(context)?;
        Ok(JsValue::boolean(
            object.get_own_property(&key, context)?.is_some(),
        ))
    }

    /// `Object.prototype.toString()`.
    fn to_string(this: &JsValue, _args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        let tag = match this {
            JsValue::Undefined => "Undefined",
            JsValue::Null => "Null",
            JsValue::Object(object) => {
                if object.is_array() {
                    "Array"
                } else if object.is_callable() {
                    "Function"
                } else {
                    match object.borrow().data {
                        crate::object::ObjectData::Error(_) => "Error",
                        crate::object::ObjectData::Boolean(_) => "Boolean",
                        crate::object::ObjectData::Number(_) => "Number",
                        crate::object::ObjectData::String(_) => "String",
                        crate::object::ObjectData::Arguments(_) => "Arguments",
                        _ => "Object",
                    }
                }
            }
            _ => "Object",
        };
        Ok(JsValue::string(format!("[object {}]", tag)))
    }

    /// `Object.prototype.valueOf()`.
    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this.to_object(context)?.into())
    }

    /// `Object.prototype.isPrototypeOf(value)`.
    fn is_prototype_of(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let target = this.to_object(context)?;
        let mut current = match args.first().and_then(JsValue::as_object) {
            Some(object) => object.clone(),
            None => return Ok(JsValue::boolean(false)),
        };
        loop {
            let parent = current.get_prototype_of(context)?;
            match parent.as_object() {
                Some(parent) => {
                    if JsObject::ptr_eq(parent, &target) {
                        return Ok(JsValue::boolean(true));
                    }
                    current = parent.clone();
                }
                None => return Ok(JsValue::boolean(false)),
            }
        }
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("object", "init");

        let constructor = context.standard_objects().object_object().constructor();
        make_builtin_fn(Self::keys, "keys", &constructor, 1, context);
        make_builtin_fn(
            Self::get_own_property_names,
            "getOwnPropertyNames",
            &constructor,
            1,
            context,
        );
        make_builtin_fn(Self::define_property, "defineProperty", &constructor, 3, context);
        make_builtin_fn(
            Self::get_own_property_descriptor,
            "getOwnPropertyDescriptor",
            &constructor,
            2,
            context,
        );
        make_builtin_fn(Self::get_prototype_of, "getPrototypeOf", &constructor, 1, context);
        make_builtin_fn(Self::set_prototype_of, "setPrototypeOf", &constructor, 2, context);
        make_builtin_fn(Self::create, "create", &constructor, 2, context);
        make_builtin_fn(Self::assign, "assign", &constructor, 2, context);
        make_builtin_fn(Self::freeze, "freeze", &constructor, 1, context);
        make_builtin_fn(
            Self::prevent_extensions,
            "preventExtensions",
            &constructor,
            1,
            context,
        );
        make_builtin_fn(Self::is_extensible, "isExtensible", &constructor, 1, context);

        let prototype = context.standard_objects().object_object().prototype();
        make_builtin_fn(Self::has_own_property, "hasOwnProperty", &prototype, 1, context);
        make_builtin_fn(Self::to_string, "toString", &prototype, 0, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);
        make_builtin_fn(Self::is_prototype_of, "isPrototypeOf", &prototype, 1, context);

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Object",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
