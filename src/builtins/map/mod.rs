//! The `Map` builtin, over insertion ordered storage.

pub mod map_iterator;
pub mod ordered_map;

use self::map_iterator::{MapIterationKind, MapIterator};
use self::ordered_map::OrderedMap;
use crate::{
    builtins::function::make_builtin_fn,
    object::{JsObject, Object, ObjectData},
    property::{AccessorDescriptor, Attribute, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Map;

impl Map {
    fn this_map(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
        match this.as_object() {
            Some(object) if object.borrow().as_map_ref().is_some() => Ok(object.clone()),
            _ => context.throw_type_error("`this` is not a Map"),
        }
    }

    /// The `Map` constructor, with an optional iterable of entries.
    pub(crate) fn constructor(
        _new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut object = Object::create(
            context.standard_objects().map_object().prototype().into(),
        );
        object.data = ObjectData::Map(OrderedMap::new());
        let map = JsValue::object(object);

        if let Some(iterable) = args.first() {
            if !iterable.is_null_or_undefined() {
                let iterator = crate::builtins::iterable::get_iterator(iterable, context)?;
                loop {
                    let next = iterator.next(None, context)?;
                    if next.done {
                        break;
                    }
                    let key = next.value.get_field(0, context)?;
                    let value = next.value.get_field(1, context)?;
                    if let Some(object) = map.as_object() {
                        if let Some(entries) = object.borrow_mut().as_map_mut() {
                            entries.insert(key, value);
                        }
                    }
                }
            }
        }
        Ok(map)
    }

    /// `Map.prototype.get(key)`.
    fn get(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let key = args.first().cloned().unwrap_or_default();
        let value = map
            .borrow()
            .as_map_ref()
            .and_then(|entries| entries.get(&key).cloned());
        Ok(value.unwrap_or_default())
    }

    /// `Map.prototype.set(key, value)`.
    fn set(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let key = args.first().cloned().unwrap_or_default();
        let value = args.get(1).cloned().unwrap_or_default();
        // The spec normalizes the -0 key to +0.
        let key = match key.as_number() {
            Some(number) if number == 0.0 => JsValue::integer(0),
            _ => key,
        };
        if let Some(entries) = map.borrow_mut().as_map_mut() {
            entries.insert(key, value);
        }
        Ok(this.clone())
    }

    /// `Map.prototype.has(key)`.
    fn has(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let key = args.first().cloned().unwrap_or_default();
        let result = map
            .borrow()
            .as_map_ref()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    /// `Map.prototype.delete(key)`.
    fn delete(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let key = args.first().cloned().unwrap_or_default();
        let removed = map
            .borrow_mut()
            .as_map_mut()
            .map(|entries| entries.remove(&key).is_some())
            .unwrap_or(false);
        Ok(JsValue::boolean(removed))
    }

    /// `Map.prototype.clear()`.
    fn clear(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        if let Some(entries) = map.borrow_mut().as_map_mut() {
            entries.clear();
        }
        Ok(JsValue::undefined())
    }

    /// `Map.prototype.forEach(callback[, thisArg])`.
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let callback = args.first().cloned().unwrap_or_default();
        if !callback.is_function() {
            return context.throw_type_error("Map.prototype.forEach callback must be callable");
        }
        let this_arg = args.get(1).cloned().unwrap_or_default();

        let mut index = 0;
        loop {
            let entry = map
                .borrow()
                .as_map_ref()
                .and_then(|entries| entries.get_index(index))
                .map(|(k, v)| (k.clone(), v.clone()));
            let (key, value) = match entry {
                Some(entry) => entry,
                None => break,
            };
            context.call(&callback, &this_arg, &[value, key, this.clone()])?;
            index += 1;
        }
        Ok(JsValue::undefined())
    }

    fn entries(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::this_map(this, context)?;
        Ok(MapIterator::create(
            this.clone(),
            MapIterationKind::KeyAndValue,
            context,
        ))
    }

    fn keys(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::this_map(this, context)?;
        Ok(MapIterator::create(this.clone(), MapIterationKind::Key, context))
    }

    fn values(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::this_map(this, context)?;
        Ok(MapIterator::create(
            this.clone(),
            MapIterationKind::Value,
            context,
        ))
    }

    /// The `size` getter.
    fn size(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let map = Self::this_map(this, context)?;
        let size = map
            .borrow()
            .as_map_ref()
            .map(OrderedMap::len)
            .unwrap_or(0);
        Ok(JsValue::from(size))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("map", "init");

        let prototype = context.standard_objects().map_object().prototype();
        make_builtin_fn(Self::get, "get", &prototype, 1, context);
        make_builtin_fn(Self::set, "set", &prototype, 2, context);
        make_builtin_fn(Self::has, "has", &prototype, 1, context);
        make_builtin_fn(Self::delete, "delete", &prototype, 1, context);
        make_builtin_fn(Self::clear, "clear", &prototype, 0, context);
        make_builtin_fn(Self::for_each, "forEach", &prototype, 1, context);
        make_builtin_fn(Self::entries, "entries", &prototype, 0, context);
        make_builtin_fn(Self::keys, "keys", &prototype, 0, context);
        make_builtin_fn(Self::values, "values", &prototype, 0, context);

        // `size` is an accessor, `Symbol.iterator` aliases `entries`.
        let size_getter = crate::builtins::promise::native_closure(Self::size_closure(), context);
        prototype.borrow_mut().insert(
            "size",
            AccessorDescriptor::new(Some(size_getter), None, Attribute::CONFIGURABLE),
        );
        let entries_fn = prototype
            .get_direct(&PropertyKey::from("entries"))
            .expect("entries was just defined");
        let iterator_symbol = context.well_known_symbols().iterator_symbol();
        prototype.borrow_mut().insert(
            iterator_symbol,
            crate::property::DataDescriptor::new(
                entries_fn,
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            ),
        );

        let constructor = context.standard_objects().map_object().constructor();
        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Map",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }

    fn size_closure(
    ) -> impl Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue> + Clone + 'static {
        |this: &JsValue, args: &[JsValue], context: &mut Context| Self::size(this, args, context)
    }
}
