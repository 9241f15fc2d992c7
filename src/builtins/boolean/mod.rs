//! The `Boolean` builtin.

use crate::{
    builtins::function::make_builtin_fn,
    object::{Object, ObjectData},
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Boolean;

impl Boolean {
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = args.first().map(JsValue::to_boolean).unwrap_or(false);
        if new_target.is_function() {
            let mut object = Object::create(
                context
                    .standard_objects()
                    .boolean_object()
                    .prototype()
                    .into(),
            );
            object.data = ObjectData::Boolean(value);
            return Ok(JsValue::object(object));
        }
        Ok(JsValue::boolean(value))
    }

    fn this_boolean_value(this: &JsValue, context: &mut Context) -> JsResult<bool> {
        if let Some(boolean) = this.as_boolean() {
            return Ok(boolean);
        }
        if let Some(object) = this.as_object() {
            if let Some(boolean) = object.borrow().as_boolean() {
                return Ok(boolean);
            }
        }
        context.throw_type_error("'this' is not a boolean")
    }

    fn to_string(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = Self::this_boolean_value(this, context)?;
        Ok(JsValue::string(value.to_string()))
    }

    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::boolean(Self::this_boolean_value(this, context)?))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("boolean", "init");

        let prototype = context.standard_objects().boolean_object().prototype();
        make_builtin_fn(Self::to_string, "toString", &prototype, 0, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);

        let constructor = context.standard_objects().boolean_object().constructor();
        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Boolean",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
