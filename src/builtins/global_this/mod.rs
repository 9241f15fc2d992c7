//! The `globalThis` binding, the global conversion functions and the host
//! message bridge.

use crate::{
    builtins::{
        function::make_builtin_fn,
        number::{global_is_finite, global_is_nan, parse_float, parse_int},
    },
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct GlobalThis;

impl GlobalThis {
    /// `sendMessage(tag, payload)`: forwarded to the host handler; without
    /// one installed the call fails.
    fn send_message(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let tag = args.first().cloned().unwrap_or_default();
        let payload = args.get(1).cloned().unwrap_or_default();
        context.dispatch_host_message(tag, payload)
    }

    /// `sendMessageAsync(tag, payload)`: like `sendMessage` but the result
    /// travels through a promise.
    fn send_message_async(
        _this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let tag = args.first().cloned().unwrap_or_default();
        let payload = args.get(1).cloned().unwrap_or_default();
        match context.dispatch_host_message(tag, payload) {
            Ok(value) => crate::builtins::promise::promise_resolved_with(value, context),
            Err(crate::exec::Flow::Throw(error)) => {
                crate::builtins::promise::promise_rejected_with(error, context)
            }
            Err(flow) => Err(flow),
        }
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("globalThis", "init");

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "globalThis",
            global.clone(),
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
        global
            .borrow_mut()
            .insert_property("undefined", JsValue::undefined(), Attribute::none());
        global
            .borrow_mut()
            .insert_property("NaN", f64::NAN, Attribute::none());
        global
            .borrow_mut()
            .insert_property("Infinity", f64::INFINITY, Attribute::none());

        make_builtin_fn(parse_int, "parseInt", &global, 2, context);
        make_builtin_fn(parse_float, "parseFloat", &global, 1, context);
        make_builtin_fn(global_is_nan, "isNaN", &global, 1, context);
        make_builtin_fn(global_is_finite, "isFinite", &global, 1, context);
        make_builtin_fn(Self::send_message, "sendMessage", &global, 2, context);
        make_builtin_fn(
            Self::send_message_async,
            "sendMessageAsync",
            &global,
            2,
            context,
        );
    }
}
