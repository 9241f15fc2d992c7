//! The `Proxy` builtin. Trap dispatch itself lives in the object internal
//! methods; here are the data record and the constructor.

use crate::{
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// The `{target, handler}` pair of a proxy object.
#[derive(Debug, Trace, Finalize)]
pub struct Proxy {
    target: JsObject,
    handler: JsObject,
}

impl Proxy {
    pub(crate) fn target(&self) -> &JsObject {
        &self.target
    }

    pub(crate) fn handler(&self) -> &JsObject {
        &self.handler
    }

    /// The `Proxy` constructor. `Proxy.prototype` is undefined: proxies
    /// are not subclassable, and a proxy's identity comes entirely from
    /// its target.
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if !new_target.is_function() {
            return context.throw_type_error("Proxy constructor requires 'new'");
        }
        let target = match args.first().and_then(JsValue::as_object) {
            Some(object) => object.clone(),
            None => return context.throw_type_error("proxy target must be an object"),
        };
        let handler = match args.get(1).and_then(JsValue::as_object) {
            Some(object) => object.clone(),
            None => return context.throw_type_error("proxy handler must be an object"),
        };

        let mut object = Object::default();
        object.data = ObjectData::Proxy(Self { target, handler });
        // Proxies forward even prototype queries, so the slot stays null.
        Ok(JsValue::object(object))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("proxy", "init");

        let constructor = JsObject::new(Object::function(
            crate::builtins::function::Function::Native {
                function: (Self::constructor
                    as crate::builtins::function::NativeFunction)
                    .into(),
                constructable: true,
            },
            context
                .standard_objects()
                .function_object()
                .prototype()
                .into(),
        ));
        let attribute = Attribute::CONFIGURABLE;
        constructor
            .borrow_mut()
            .insert_property("length", 2, attribute);
        constructor
            .borrow_mut()
            .insert_property("name", "Proxy", attribute);

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Proxy",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
