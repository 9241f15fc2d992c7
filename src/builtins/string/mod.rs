//! The `String` builtin: the wrapper constructor plus the prototype
//! methods auto-boxed primitive receivers reach for. The full text library
//! (normalization, regular expression hooks, locale-aware casing) is host
//! territory.

use crate::{
    builtins::function::make_builtin_fn,
    object::{Object, ObjectData},
    property::Attribute,
    string::JsString,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct String;

impl String {
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = match args.first() {
            Some(value) => value.to_string(context)?,
            None => JsString::default(),
        };
        if new_target.is_function() {
            let mut object = Object::create(
                context
                    .standard_objects()
                    .string_object()
                    .prototype()
                    .into(),
            );
            object.data = ObjectData::String(value);
            return Ok(JsValue::object(object));
        }
        Ok(JsValue::String(value))
    }

    fn this_string_value(this: &JsValue, context: &mut Context) -> JsResult<JsString> {
        if let Some(string) = this.as_string() {
            return Ok(string.clone());
        }
        if let Some(object) = this.as_object() {
            if let Some(string) = object.borrow().as_string() {
                return Ok(string);
            }
        }
        context.throw_type_error("'this' is not a string")
    }

    fn to_string(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::String(Self::this_string_value(this, context)?))
    }

    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::String(Self::this_string_value(this, context)?))
    }

    fn to_upper_case(
        this: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        Ok(JsValue::string(string.to_uppercase()))
    }

    fn to_lower_case(
        this: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        Ok(JsValue::string(string.to_lowercase()))
    }

    fn char_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        let position = args
            .first()
            .cloned()
            .unwrap_or_default()
            .to_integer(context)?;
        if position < 0.0 {
            return Ok(JsValue::string(""));
        }
        Ok(string
            .chars()
            .nth(position as usize)
            .map(|c| JsValue::string(c.to_string()))
            .unwrap_or_else(|| JsValue::string("")))
    }

    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        let search = args
            .first()
            .cloned()
            .unwrap_or_default()
            .to_string(context)?;
        let index = string
            .find(search.as_str())
            .map(|byte_index| string[..byte_index].chars().count() as i32)
            .unwrap_or(-1);
        Ok(JsValue::integer(index))
    }

    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        let search = args
            .first()
            .cloned()
            .unwrap_or_default()
            .to_string(context)?;
        Ok(JsValue::boolean(string.contains(search.as_str())))
    }

    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = Self::this_string_value(this, context)?;
        let chars: Vec<char> = string.chars().collect();
        let length = chars.len() as i64;
        let resolve = |value: Option<&JsValue>, default: i64, context: &mut Context| {
            match value {
                Some(value) if !value.is_undefined() => {
                    let relative = value.clone().to_integer(context)? as i64;
                    Ok(if relative < 0 {
                        (length + relative).max(0)
                    } else {
                        relative.min(length)
                    })
                }
                _ => Ok(default),
            }
        };
        let start = resolve(args.first(), 0, context)?;
        let end = resolve(args.get(1), length, context)?;
        if start >= end {
            return Ok(JsValue::string(""));
        }
        let result: std::string::String =
            chars[start as usize..end as usize].iter().collect();
        Ok(JsValue::string(result))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("string", "init");

        let prototype = context.standard_objects().string_object().prototype();
        make_builtin_fn(Self::to_string, "toString", &prototype, 0, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);
        make_builtin_fn(Self::to_upper_case, "toUpperCase", &prototype, 0, context);
        make_builtin_fn(Self::to_lower_case, "toLowerCase", &prototype, 0, context);
        make_builtin_fn(Self::char_at, "charAt", &prototype, 1, context);
        make_builtin_fn(Self::index_of, "indexOf", &prototype, 1, context);
        make_builtin_fn(Self::includes, "includes", &prototype, 1, context);
        make_builtin_fn(Self::slice, "slice", &prototype, 2, context);

        let constructor = context.standard_objects().string_object().constructor();
        let global = context.global_object();
        global.borrow_mut().insert_property(
            "String",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
