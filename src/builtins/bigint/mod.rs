//! The `BigInt` builtin.

use crate::{
    builtins::function::make_builtin_fn,
    bigint::JsBigInt,
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct BigInt;

impl BigInt {
    /// The `BigInt` function. Not a constructor: `new BigInt()` throws.
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if new_target.is_function() {
            return context.throw_type_error("BigInt is not a constructor");
        }
        let value = args.first().cloned().unwrap_or_default();
        // Numbers must be integral; everything else goes through the usual
        // conversion.
        if let Some(number) = value.as_number() {
            return match JsBigInt::try_from_f64(number) {
                Some(result) => Ok(JsValue::bigint(result)),
                None => context.throw_range_error(
                    "the number cannot be converted to a BigInt because it is not an integer",
                ),
            };
        }
        Ok(JsValue::bigint(value.to_bigint(context)?))
    }

    fn this_bigint_value(this: &JsValue, context: &mut Context) -> JsResult<JsBigInt> {
        if let Some(bigint) = this.as_bigint() {
            return Ok(bigint.clone());
        }
        if let Some(object) = this.as_object() {
            if let Some(bigint) = object.borrow().as_bigint() {
                return Ok(bigint);
            }
        }
        context.throw_type_error("'this' is not a BigInt")
    }

    /// `BigInt.prototype.toString(radix)`.
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = Self::this_bigint_value(this, context)?;
        let radix = match args.first() {
            Some(radix) if !radix.is_undefined() => radix.to_integer(context)? as u32,
            _ => 10,
        };
        if !(2..=36).contains(&radix) {
            return context.throw_range_error("radix must be an integer between 2 and 36");
        }
        Ok(JsValue::string(value.to_string_radix(radix)))
    }

    /// `BigInt.prototype.valueOf()`.
    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::bigint(Self::this_bigint_value(this, context)?))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("bigint", "init");

        let prototype = context.standard_objects().bigint_object().prototype();
        make_builtin_fn(Self::to_string, "toString", &prototype, 1, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);

        let constructor = context.standard_objects().bigint_object().constructor();
        let global = context.global_object();
        global.borrow_mut().insert_property(
            "BigInt",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
