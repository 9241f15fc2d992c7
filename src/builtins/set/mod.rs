//! The `Set` builtin.

pub mod set_iterator;

use self::set_iterator::SetIterator;
use crate::{
    builtins::{function::make_builtin_fn, map::ordered_map::OrderedMap},
    object::{JsObject, Object, ObjectData},
    property::{AccessorDescriptor, Attribute, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Set;

impl Set {
    fn this_set(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
        match this.as_object() {
            Some(object) if object.borrow().as_set_ref().is_some() => Ok(object.clone()),
            _ => context.throw_type_error("`this` is not a Set"),
        }
    }

    /// The `Set` constructor, with an optional iterable of values.
    pub(crate) fn constructor(
        _new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut object = Object::create(
            context.standard_objects().set_object().prototype().into(),
        );
        object.data = ObjectData::Set(OrderedMap::new());
        let set = JsValue::object(object);

        if let Some(iterable) = args.first() {
            if !iterable.is_null_or_undefined() {
                let iterator = crate::builtins::iterable::get_iterator(iterable, context)?;
                loop {
                    let next = iterator.next(None, context)?;
                    if next.done {
                        break;
                    }
                    if let Some(object) = set.as_object() {
                        if let Some(entries) = object.borrow_mut().as_set_mut() {
                            entries.insert(next.value, ());
                        }
                    }
                }
            }
        }
        Ok(set)
    }

    /// `Set.prototype.add(value)`.
    fn add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        let value = args.first().cloned().unwrap_or_default();
        let value = match value.as_number() {
            Some(number) if number == 0.0 => JsValue::integer(0),
            _ => value,
        };
        if let Some(entries) = set.borrow_mut().as_set_mut() {
            entries.insert(value, ());
        }
        Ok(this.clone())
    }

    /// `Set.prototype.has(value)`.
    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        let value = args.first().cloned().unwrap_or_default();
        let result = set
            .borrow()
            .as_set_ref()
            .map(|entries| entries.contains_key(&value))
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    /// `Set.prototype.delete(value)`.
    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        let value = args.first().cloned().unwrap_or_default();
        let removed = set
            .borrow_mut()
            .as_set_mut()
            .map(|entries| entries.remove(&value).is_some())
            .unwrap_or(false);
        Ok(JsValue::boolean(removed))
    }

    /// `Set.prototype.clear()`.
    fn clear(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        if let Some(entries) = set.borrow_mut().as_set_mut() {
            entries.clear();
        }
        Ok(JsValue::undefined())
    }

    fn values(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::this_set(this, context)?;
        Ok(SetIterator::create(this.clone(), context))
    }

    /// `Set.prototype.forEach(callback[, thisArg])`.
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        let callback = args.first().cloned().unwrap_or_default();
        if !callback.is_function() {
            return context.throw_type_error("Set.prototype.forEach callback must be callable");
        }
        let this_arg = args.get(1).cloned().unwrap_or_default();

        let mut index = 0;
        loop {
            let entry = set
                .borrow()
                .as_set_ref()
                .and_then(|entries| entries.get_index(index))
                .map(|(k, _)| k.clone());
            let value = match entry {
                Some(value) => value,
                None => break,
            };
            context.call(&callback, &this_arg, &[value.clone(), value, this.clone()])?;
            index += 1;
        }
        Ok(JsValue::undefined())
    }

    fn size(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = Self::this_set(this, context)?;
        let size = set
            .borrow()
            .as_set_ref()
            .map(OrderedMap::len)
            .unwrap_or(0);
        Ok(JsValue::from(size))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("set", "init");

        let prototype = context.standard_objects().set_object().prototype();
        make_builtin_fn(Self::add, "add", &prototype, 1, context);
        make_builtin_fn(Self::has, "has", &prototype, 1, context);
        make_builtin_fn(Self::delete, "delete", &prototype, 1, context);
        make_builtin_fn(Self::clear, "clear", &prototype, 0, context);
        make_builtin_fn(Self::for_each, "forEach", &prototype, 1, context);
        make_builtin_fn(Self::values, "values", &prototype, 0, context);
        make_builtin_fn(Self::values, "keys", &prototype, 0, context);

        let size_getter = crate::builtins::promise::native_closure(
            |this: &JsValue, args: &[JsValue], context: &mut Context| {
                Self::size(this, args, context)
            },
            context,
        );
        prototype.borrow_mut().insert(
            "size",
            AccessorDescriptor::new(Some(size_getter), None, Attribute::CONFIGURABLE),
        );
        let values_fn = prototype
            .get_direct(&PropertyKey::from("values"))
            .expect("values was just defined");
        let iterator_symbol = context.well_known_symbols().iterator_symbol();
        prototype.borrow_mut().insert(
            iterator_symbol,
            crate::property::DataDescriptor::new(
                values_fn,
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            ),
        );

        let constructor = context.standard_objects().set_object().constructor();
        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Set",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
