//! The `Error` constructor family. These are the one set of builtins the
//! core cannot treat as host-provided: the engine itself manufactures
//! error objects for its native failures.

use crate::{
    builtins::function::make_builtin_fn,
    error::NativeErrorKind,
    object::{JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// Creates an error object of the given kind with an optional message.
pub(crate) fn create_error(
    kind: NativeErrorKind,
    message: Option<JsValue>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let prototype = context.error_prototype(kind);
    let mut object = Object::create(prototype.into());
    object.data = ObjectData::Error(kind);
    if let Some(message) = message {
        if !message.is_undefined() {
            let message = message.to_string(context)?;
            object.insert_property(
                "message",
                message,
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            );
        }
    }
    Ok(JsValue::object(object))
}

macro_rules! error_constructor {
    ($fn_name:ident, $kind:expr) => {
        pub(crate) fn $fn_name(
            _new_target: &JsValue,
            args: &[JsValue],
            context: &mut Context,
        ) -> JsResult<JsValue> {
            create_error($kind, args.first().cloned(), context)
        }
    };
}

error_constructor!(error_constructor, NativeErrorKind::Error);
error_constructor!(type_error_constructor, NativeErrorKind::Type);
error_constructor!(range_error_constructor, NativeErrorKind::Range);
error_constructor!(reference_error_constructor, NativeErrorKind::Reference);
error_constructor!(syntax_error_constructor, NativeErrorKind::Syntax);
error_constructor!(eval_error_constructor, NativeErrorKind::Eval);
error_constructor!(uri_error_constructor, NativeErrorKind::Uri);

/// `AggregateError(errors, message)` also records its errors array.
pub(crate) fn aggregate_error_constructor(
    _new_target: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let error = create_error(NativeErrorKind::Aggregate, args.get(1).cloned(), context)?;
    let errors_value = args.first().cloned().unwrap_or_default();
    let mut errors = Vec::new();
    if !errors_value.is_null_or_undefined() {
        let iterator = crate::builtins::iterable::get_iterator(&errors_value, context)?;
        loop {
            let next = iterator.next(None, context)?;
            if next.done {
                break;
            }
            errors.push(next.value);
        }
    }
    let errors_array = crate::builtins::array::Array::from_values(&errors, context);
    error.set_property(
        "errors",
        errors_array,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
    Ok(error)
}

/// `Error.prototype.toString`.
fn to_string(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if !this.is_object() {
        return context.throw_type_error("Error.prototype.toString called on non-object");
    }
    let name = this.get_field("name", context)?;
    let name = if name.is_undefined() {
        "Error".into()
    } else {
        name.to_string(context)?
    };
    let message = this.get_field("message", context)?;
    let message = if message.is_undefined() {
        "".into()
    } else {
        message.to_string(context)?
    };

    if message.is_empty() {
        return Ok(JsValue::String(name));
    }
    if name.is_empty() {
        return Ok(JsValue::String(message));
    }
    Ok(JsValue::string(format!("{}: {}", name, message)))
}

/// Wires the error constructor hierarchy into the realm: every subtype
/// prototype inherits from `Error.prototype`.
pub(crate) fn init(context: &mut Context) {
    let _timer = Profiler::global().start_event("error", "init");

    let kinds = [
        NativeErrorKind::Error,
        NativeErrorKind::Type,
        NativeErrorKind::Range,
        NativeErrorKind::Reference,
        NativeErrorKind::Syntax,
        NativeErrorKind::Eval,
        NativeErrorKind::Uri,
        NativeErrorKind::Aggregate,
    ];

    let base_prototype = context.error_prototype(NativeErrorKind::Error);
    make_builtin_fn(to_string, "toString", &base_prototype, 0, context);

    for kind in kinds.iter().copied() {
        let prototype = context.error_prototype(kind);
        if kind != NativeErrorKind::Error {
            prototype
                .borrow_mut()
                .set_prototype(base_prototype.clone().into());
        }
        prototype.borrow_mut().insert_property(
            "name",
            kind.constructor_name(),
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
        prototype.borrow_mut().insert_property(
            "message",
            "",
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );

        let constructor = context.error_constructor_object(kind);
        let global = context.global_object();
        global.borrow_mut().insert_property(
            kind.constructor_name(),
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}

/// Turns an engine-internal native failure into the matching JS error
/// object.
pub(crate) fn construct_error_object(
    kind: NativeErrorKind,
    message: String,
    context: &mut Context,
) -> JsValue {
    let prototype = context.error_prototype(kind);
    let mut object = Object::create(prototype.into());
    object.data = ObjectData::Error(kind);
    object.insert_property(
        "message",
        message,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
    JsValue::object(object)
}

/// Compares a constructor object against the realm error constructors.
pub(crate) fn kind_of_constructor(
    constructor: &JsObject,
    context: &Context,
) -> Option<NativeErrorKind> {
    let kinds = [
        NativeErrorKind::Error,
        NativeErrorKind::Type,
        NativeErrorKind::Range,
        NativeErrorKind::Reference,
        NativeErrorKind::Syntax,
        NativeErrorKind::Eval,
        NativeErrorKind::Uri,
        NativeErrorKind::Aggregate,
    ];
    kinds.iter().copied().find(|kind| {
        JsObject::ptr_eq(&context.error_constructor_object_ref(*kind), constructor)
    })
}
