//! The `arguments` exotic object.
//!
//! Sloppy-mode functions with only simple parameters get the mapped
//! variant, whose indexed slots alias the parameter bindings in both
//! directions; everything else gets the unmapped variant. Both poison
//! `callee` and `caller`.

use super::{type_error_thrower, Function};
use crate::{
    ast::node::{DeclarationBinding, FormalParameter},
    environment::Environment,
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    property::{AccessorDescriptor, Attribute, DataDescriptor},
    string::JsString,
    value::JsValue,
    Context,
};

/// The mapping state of an `arguments` object.
#[derive(Debug, Trace, Finalize)]
pub enum Arguments {
    Unmapped,
    Mapped {
        /// The parameter environment the indexed slots alias.
        environment: Environment,
        /// Index to parameter name; `None` once an index was deleted or
        /// never had a named parameter.
        bindings: Vec<Option<JsString>>,
    },
}

/// Creates the `arguments` object for a call.
pub(crate) fn create_arguments_object(
    args: &[JsValue],
    parameters: &[FormalParameter],
    environment: &Environment,
    mapped: bool,
    context: &mut Context,
) -> JsValue {
    let data = if mapped {
        let mut bindings = Vec::with_capacity(args.len());
        for index in 0..args.len() {
            let name = parameters.get(index).and_then(|parameter| {
                match parameter.declaration().binding() {
                    DeclarationBinding::Identifier(name) => {
                        Some(JsString::from(name.as_ref()))
                    }
                    DeclarationBinding::Pattern(_) => None,
                }
            });
            bindings.push(name);
        }
        Arguments::Mapped {
            environment: environment.clone(),
            bindings,
        }
    } else {
        Arguments::Unmapped
    };

    let mut object = Object::create(
        context
            .standard_objects()
            .object_object()
            .prototype()
            .into(),
    );
    object.data = ObjectData::Arguments(data);

    object.insert_property(
        "length",
        args.len(),
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
    for (index, value) in args.iter().enumerate() {
        object.insert_property(index, value.clone(), Attribute::default());
    }

    // `callee` and `caller` always throw here, on both variants.
    let thrower = JsObject::new(Object::function(
        Function::Native {
            function: (type_error_thrower as super::NativeFunction).into(),
            constructable: false,
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    ));
    let poisoned = AccessorDescriptor::new(
        Some(thrower.clone()),
        Some(thrower),
        Attribute::none(),
    );
    object.insert("callee", poisoned.clone());
    object.insert("caller", poisoned);

    // Spreading `arguments` works: it iterates like an array.
    let iterator_symbol = context.well_known_symbols().iterator_symbol();
    let values_fn = crate::builtins::array::Array::values_intrinsic(context);
    object.insert(
        iterator_symbol,
        DataDescriptor::new(values_fn, Attribute::WRITABLE | Attribute::CONFIGURABLE),
    );

    JsValue::object(object)
}
