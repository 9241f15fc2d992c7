//! The `Array` builtin: the exotic `length` behavior lives in the object
//! internal methods; here are the constructor, the core prototype methods
//! and the iterator wiring.

pub mod array_iterator;

use self::array_iterator::{ArrayIterationKind, ArrayIterator};
use crate::{
    builtins::function::make_builtin_fn,
    object::{JsObject, Object, ObjectData},
    property::{Attribute, DataDescriptor, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Array;

impl Array {
    /// Creates a new empty array object with the given initial length.
    pub(crate) fn new_array(context: &Context, length: usize) -> JsValue {
        let mut object = Object::create(
            context
                .standard_objects()
                .array_object()
                .prototype()
                .into(),
        );
        object.data = ObjectData::Array;
        object.insert_property("length", length, Attribute::WRITABLE);
        JsValue::object(object)
    }

    /// Creates a dense array from a slice of values.
    pub(crate) fn from_values(values: &[JsValue], context: &Context) -> JsValue {
        let array = Self::new_array(context, values.len());
        if let Some(object) = array.as_object() {
            let mut object = object.borrow_mut();
            for (index, value) in values.iter().enumerate() {
                object.insert_property(index, value.clone(), Attribute::default());
            }
        }
        array
    }

    /// The shared `Array.prototype.values` function object, also installed
    /// on `arguments` objects.
    pub(crate) fn values_intrinsic(context: &Context) -> JsValue {
        context
            .standard_objects()
            .array_values_intrinsic()
            .clone()
            .into()
    }

    /// The `Array` constructor: a single numeric argument sets the length,
    /// anything else populates elements.
    pub(crate) fn constructor(
        _new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match args {
            [JsValue::Integer(length)] if *length >= 0 => {
                Ok(Self::new_array(context, *length as usize))
            }
            [JsValue::Integer(_)] => context.throw_range_error("invalid array length"),
            [JsValue::Rational(length)] => {
                let int_len = *length as u32;
                #[allow(clippy::float_cmp)]
                if f64::from(int_len) != *length {
                    return context.throw_range_error("invalid array length");
                }
                Ok(Self::new_array(context, int_len as usize))
            }
            _ => Ok(Self::from_values(args, context)),
        }
    }

    /// `Array.isArray(value)`, piercing proxies.
    fn is_array(_this: &JsValue, args: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        let result = args
            .first()
            .and_then(JsValue::as_object)
            .map(JsObject::is_array)
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    /// `Array.of(...items)`.
    fn of(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(Self::from_values(args, context))
    }

    /// `Array.prototype.push(...items)`.
    fn push(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut length = this.get_field("length", context)?.to_length(context)?;
        for value in args {
            this.set_field(length, value.clone(), false, context)?;
            length += 1;
        }
        this.set_field("length", length, false, context)?;
        Ok(JsValue::from(length))
    }

    /// `Array.prototype.pop()`.
    fn pop(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let length = this.get_field("length", context)?.to_length(context)?;
        if length == 0 {
            this.set_field("length", 0, false, context)?;
            return Ok(JsValue::undefined());
        }
        let value = this.get_field(length - 1, context)?;
        if let Some(object) = this.as_object() {
            object.delete(&PropertyKey::from(length - 1), context)?;
        }
        this.set_field("length", length - 1, false, context)?;
        Ok(value)
    }

    /// `Array.prototype.join(separator)`.
    fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let separator = match args.first() {
            Some(separator) if !separator.is_undefined() => {
                separator.to_string(context)?.to_string()
            }
            _ => ",".to_string(),
        };
        let length = this.get_field("length", context)?.to_length(context)?;
        let mut result = String::new();
        for index in 0..length {
            if index != 0 {
                result.push_str(&separator);
            }
            let element = this.get_field(index, context)?;
            if !element.is_null_or_undefined() {
                result.push_str(&element.to_string(context)?);
            }
        }
        Ok(JsValue::string(result))
    }

    /// `Array.prototype.indexOf(search)`.
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let search = args.first().cloned().unwrap_or_default();
        let length = this.get_field("length", context)?.to_length(context)?;
        for index in 0..length {
            let element = this.get_field(index, context)?;
            if element.strict_equals(&search) {
                return Ok(JsValue::from(index));
            }
        }
        Ok(JsValue::integer(-1))
    }

    /// `Array.prototype.slice(start, end)`.
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let length = this.get_field("length", context)?.to_length(context)? as i64;
        let resolve = |value: Option<&JsValue>, default: i64, context: &mut Context| {
            let relative = match value {
                Some(value) if !value.is_undefined() => {
                    Some(value.clone())
                }
                _ => None,
            };
            match relative {
                None => Ok(default),
                Some(value) => {
                    let relative = value.to_integer(context)? as i64;
                    Ok(if relative < 0 {
                        (length + relative).max(0)
                    } else {
                        relative.min(length)
                    })
                }
            }
        };
        let start = resolve(args.first(), 0, context)?;
        let end = resolve(args.get(1), length, context)?;

        let mut values = Vec::new();
        for index in start..end {
            values.push(this.get_field(index as usize, context)?);
        }
        Ok(Self::from_values(&values, context))
    }

    fn values(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(ArrayIterator::create(
            this.clone(),
            ArrayIterationKind::Value,
            context,
        ))
    }

    fn keys(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(ArrayIterator::create(
            this.clone(),
            ArrayIterationKind::Key,
            context,
        ))
    }

    fn entries(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(ArrayIterator::create(
            this.clone(),
            ArrayIterationKind::KeyAndValue,
            context,
        ))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("array", "init");

        let constructor = context.standard_objects().array_object().constructor();
        make_builtin_fn(Self::is_array, "isArray", &constructor, 1, context);
        make_builtin_fn(Self::of, "of", &constructor, 0, context);

        let prototype = context.standard_objects().array_object().prototype();
        make_builtin_fn(Self::push, "push", &prototype, 1, context);
        make_builtin_fn(Self::pop, "pop", &prototype, 0, context);
        make_builtin_fn(Self::join, "join", &prototype, 1, context);
        make_builtin_fn(Self::index_of, "indexOf", &prototype, 1, context);
        make_builtin_fn(Self::slice, "slice", &prototype, 2, context);
        make_builtin_fn(Self::values, "values", &prototype, 0, context);
        make_builtin_fn(Self::keys, "keys", &prototype, 0, context);
        make_builtin_fn(Self::entries, "entries", &prototype, 0, context);

        let values_fn = prototype
            .get_direct(&PropertyKey::from("values"))
            .expect("values was just defined");
        context
            .standard_objects_mut()
            .set_array_values_intrinsic(values_fn.as_object().cloned().expect("function object"));
        let iterator_symbol = context.well_known_symbols().iterator_symbol();
        prototype.borrow_mut().insert(
            iterator_symbol,
            DataDescriptor::new(values_fn, Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Array",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
