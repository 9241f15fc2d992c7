//! Expression evaluation: identifier references, literals, member access
//! (including private fields and `super`), optional chains, calls and
//! `new`.

use super::{environment_error, Executable};
use crate::{
    ast::node::{
        ArrayDecl, Call, GetConstField, GetField, GetPrivateField, GetSuperField, Identifier,
        MethodDefinitionKind, New, Node, Object as ObjectLiteral, Optional, OptionalOperation,
        OptionalOperationKind, PropertyDefinition, TemplateElement, TemplateLit,
    },
    builtins::{
        array::Array,
        function::{create_function, FunctionKind},
        iterable::get_iterator,
    },
    environment::{self, BindingKind},
    property::{AccessorDescriptor, Attribute, DataDescriptor, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};

pub(super) fn this(context: &mut Context) -> JsResult<JsValue> {
    super::resolve_this(context)
}

pub(super) fn identifier(identifier: &Identifier, context: &mut Context) -> JsResult<JsValue> {
    let name = identifier.as_ref();
    match environment::lookup(&context.lexical_environment(), name) {
        Some(environment) => {
            let result = environment.borrow().get_binding_value(name);
            result.map_err(|err| environment_error(err, context))
        }
        None => context.throw_reference_error(format!("{} is not defined", name)),
    }
}

/// Assignment to an identifier through the scope chain. Creates a global
/// binding in sloppy mode, errors in strict mode.
pub(crate) fn assign_identifier(
    name: &str,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    match environment::lookup(&context.lexical_environment(), name) {
        Some(environment) => {
            let result = environment.borrow_mut().set_binding_value(name, value);
            result.map_err(|err| environment_error(err, context))
        }
        None if context.strict() => {
            context.throw_reference_error(format!("{} is not defined", name))
        }
        None => {
            let global = context.global_environment();
            let result = global.borrow_mut().create_binding(
                name.into(),
                BindingKind::Var,
                Some(value),
            );
            result.map_err(|err| environment_error(err, context))
        }
    }
}

pub(super) fn array_literal(array: &ArrayDecl, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("ArrayDecl", "exec");
    let result = Array::new_array(context, 0);
    let result_object = result.as_object().expect("new arrays are objects").clone();
    let mut index: u32 = 0;

    for element in array.as_ref() {
        match element {
            // An elision leaves a hole: the index advances, the slot stays
            // absent.
            Node::Empty => index += 1,
            Node::Spread(spread) => {
                let iterable = spread.val().run(context)?;
                let iterator = get_iterator(&iterable, context)?;
                loop {
                    let next = iterator.next(None, context)?;
                    if next.done {
                        break;
                    }
                    result_object.create_data_property(index, next.value, context)?;
                    index += 1;
                }
            }
            element => {
                let value = element.run(context)?;
                result_object.create_data_property(index, value, context)?;
                index += 1;
            }
        }
    }

    // Trailing holes still count towards the length.
    result.set_field("length", index, false, context)?;
    Ok(result)
}

pub(super) fn object_literal(
    literal: &ObjectLiteral,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Object", "exec");
    let object = JsValue::new_object(context);
    let object_handle = object.as_object().expect("literal is an object").clone();

    for property in literal.properties() {
        match property {
            PropertyDefinition::IdentifierReference(ident) => {
                let value = identifier(&Identifier::from(ident.as_ref()), context)?;
                object_handle.create_data_property(ident.as_ref(), value, context)?;
            }
            PropertyDefinition::Property(name, node) => {
                let key = super::declaration::resolve_property_name(name, context)?;
                let value = node.run(context)?;
                object_handle.create_data_property(key, value, context)?;
            }
            PropertyDefinition::SpreadObject(node) => {
                let source = node.run(context)?;
                if source.is_null_or_undefined() {
                    continue;
                }
                let source_object = source.to_object(context)?;
                for key in source_object.own_property_keys(context)? {
                    let enumerable = source_object
                        .get_own_property(&key, context)?
                        .map(|descriptor| descriptor.enumerable())
                        .unwrap_or(false);
                    if !enumerable {
                        continue;
                    }
                    let value = source.get_field(key.clone(), context)?;
                    object_handle.create_data_property(key, value, context)?;
                }
            }
            PropertyDefinition::MethodDefinition(kind, name, function_expr) => {
                let key = super::declaration::resolve_property_name(name, context)?;
                let function_kind = match kind {
                    MethodDefinitionKind::Generator => FunctionKind::Generator,
                    MethodDefinitionKind::Async => FunctionKind::Async,
                    MethodDefinitionKind::AsyncGenerator => FunctionKind::AsyncGenerator,
                    _ => FunctionKind::Method,
                };
                let method = create_function(
                    function_kind,
                    key_name(&key).as_deref(),
                    function_expr.parameters(),
                    function_expr.body(),
                    context,
                )?;
                let method_object = method.as_object().expect("functions are objects").clone();
                crate::builtins::function::set_home_object(
                    &method_object,
                    object_handle.clone(),
                );
                match kind {
                    MethodDefinitionKind::Get | MethodDefinitionKind::Set => {
                        // Getter/setter pairs merge into one accessor slot.
                        let existing = object_handle
                            .get_own_property(&key, context)?
                            .and_then(|descriptor| match descriptor {
                                crate::property::PropertyDescriptor::Accessor(ref accessor) => {
                                    Some(accessor.clone())
                                }
                                crate::property::PropertyDescriptor::Data(_) => None,
                            });
                        let (mut get, mut set) = match existing {
                            Some(accessor) => {
                                (accessor.getter().cloned(), accessor.setter().cloned())
                            }
                            None => (None, None),
                        };
                        if *kind == MethodDefinitionKind::Get {
                            get = Some(method_object);
                        } else {
                            set = Some(method_object);
                        }
                        object_handle.define_own_property(
                            key,
                            AccessorDescriptor::new(
                                get,
                                set,
                                Attribute::ENUMERABLE | Attribute::CONFIGURABLE,
                            )
                            .into(),
                            context,
                        )?;
                    }
                    _ => {
                        object_handle.define_own_property(
                            key,
                            DataDescriptor::new(method, Attribute::default()).into(),
                            context,
                        )?;
                    }
                }
            }
        }
    }

    Ok(object)
}

fn key_name(key: &PropertyKey) -> Option<String> {
    key.as_js_string().map(|name| name.to_string())
}

pub(super) fn template_literal(
    template: &TemplateLit,
    context: &mut Context,
) -> JsResult<JsValue> {
    let mut result = String::new();
    for element in template.elements() {
        match element {
            TemplateElement::String(string) => result.push_str(string),
            TemplateElement::Expr(node) => {
                let value = node.run(context)?;
                result.push_str(&value.to_string(context)?);
            }
        }
    }
    Ok(JsValue::string(result))
}

pub(super) fn get_const_field(
    get_const_field: &GetConstField,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("GetConstField", "exec");
    let object = get_const_field.obj().run(context)?;
    object.get_field(get_const_field.field(), context)
}

pub(super) fn get_field(get_field: &GetField, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("GetField", "exec");
    let object = get_field.obj().run(context)?;
    let field = get_field.field().run(context)?;
    let key = field.to_property_key(context)?;
    object.get_field(key, context)
}

/// The internal namespaced key private fields are stored under.
pub(crate) fn private_field_key(name: &str) -> PropertyKey {
    PropertyKey::String(format!("_private_{}", name).into())
}

pub(super) fn get_private_field(
    get_private_field: &GetPrivateField,
    context: &mut Context,
) -> JsResult<JsValue> {
    if !context.in_class_context() {
        return context.throw_syntax_error(format!(
            "private field '#{}' must be used inside a class body",
            get_private_field.field()
        ));
    }
    let object = get_private_field.obj().run(context)?;
    if !object.is_object() {
        return context.throw_type_error("cannot read private member from a non-object");
    }
    object.get_field(private_field_key(get_private_field.field()), context)
}

pub(super) fn get_super_field(
    get_super_field: &GetSuperField,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (home, this) = super_reference(context)?;
    let key = match get_super_field {
        GetSuperField::Const(field) => PropertyKey::from(field.as_ref()),
        GetSuperField::Expr(node) => {
            let value = node.run(context)?;
            value.to_property_key(context)?
        }
    };
    let parent = home.get_prototype_of(context)?;
    match parent.as_object() {
        // Lookup starts at the parent prototype but `this` stays put.
        Some(parent) => parent.clone().get(&key, this, context),
        None => Ok(JsValue::undefined()),
    }
}

/// The `(home object, this)` pair `super` references operate on.
pub(crate) fn super_reference(
    context: &mut Context,
) -> JsResult<(crate::object::JsObject, JsValue)> {
    let this = super::resolve_this(context)?;
    match environment::home_object(&context.lexical_environment()) {
        Some(home) => Ok((home, this)),
        None => context.throw_syntax_error("'super' keyword is only valid inside methods"),
    }
}

pub(super) fn optional_chain(optional: &Optional, context: &mut Context) -> JsResult<JsValue> {
    let mut current = optional.target().run(context)?;
    // The receiver a chained call uses as `this`: the base the callee was
    // read from.
    let mut receiver = JsValue::undefined();

    for operation in optional.chain() {
        if operation.shorts() && current.is_null_or_undefined() {
            return Ok(JsValue::undefined());
        }
        let (next_receiver, next) =
            run_optional_operation(operation, current, receiver, context)?;
        receiver = next_receiver;
        current = next;
    }
    Ok(current)
}

fn run_optional_operation(
    operation: &OptionalOperation,
    current: JsValue,
    receiver: JsValue,
    context: &mut Context,
) -> JsResult<(JsValue, JsValue)> {
    match operation.kind() {
        OptionalOperationKind::SimplePropertyAccess { field } => {
            let value = current.get_field(field.as_ref(), context)?;
            Ok((current, value))
        }
        OptionalOperationKind::ComputedPropertyAccess(node) => {
            let key = node.run(context)?.to_property_key(context)?;
            let value = current.get_field(key, context)?;
            Ok((current, value))
        }
        OptionalOperationKind::Call { args } => {
            let arguments = evaluate_args(args, context)?;
            let result = context.call(&current, &receiver, &arguments)?;
            Ok((JsValue::undefined(), result))
        }
    }
}

/// Evaluates an argument list, flattening spread elements through the
/// iterator protocol.
pub(crate) fn evaluate_args(args: &[Node], context: &mut Context) -> JsResult<Vec<JsValue>> {
    let mut arguments = Vec::with_capacity(args.len());
    for arg in args {
        if let Node::Spread(ref spread) = arg {
            let iterable = spread.val().run(context)?;
            let iterator = get_iterator(&iterable, context)?;
            loop {
                let next = iterator.next(None, context)?;
                if next.done {
                    break;
                }
                arguments.push(next.value);
            }
        } else {
            arguments.push(arg.run(context)?);
        }
    }
    Ok(arguments)
}

pub(super) fn call(call: &Call, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Call", "exec");

    let (this, function) = match call.expr() {
        Node::GetConstField(ref access) => {
            let object = access.obj().run(context)?;
            let function = object.get_field(access.field(), context)?;
            (object, function)
        }
        Node::GetField(ref access) => {
            let object = access.obj().run(context)?;
            let field = access.field().run(context)?;
            let key = field.to_property_key(context)?;
            let function = object.get_field(key, context)?;
            (object, function)
        }
        Node::GetPrivateField(ref access) => {
            let function = get_private_field(access, context)?;
            let object = access.obj().run(context)?;
            (object, function)
        }
        Node::GetSuperField(ref access) => {
            // `super.m(...)` invokes with the current `this`.
            let this = super::resolve_this(context)?;
            let function = get_super_field(access, context)?;
            (this, function)
        }
        expr => (JsValue::undefined(), expr.run(context)?),
    };

    let arguments = evaluate_args(call.args(), context)?;
    context.call(&function, &this, &arguments)
}

pub(super) fn new(new: &New, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("New", "exec");

    // Async replays must observe the same object identity for a `new`
    // reached again on the way back to the suspension point. The cache is
    // keyed on (node identity, occurrence index within this replay pass).
    let cache_key = context.async_new_cache_key(new as *const _ as usize);
    if let Some(cached) = cache_key
        .as_ref()
        .and_then(|key| context.async_cached_new(key))
    {
        return Ok(cached);
    }

    let function = new.expr().run(context)?;
    let arguments = evaluate_args(new.args(), context)?;

    let result = match function.as_object() {
        Some(object) if object.is_constructor() => {
            let object = object.clone();
            object.construct(&arguments, &function, context)?
        }
        _ => return context.throw_type_error("not a constructor"),
    };

    if let Some(key) = cache_key {
        context.async_cache_new(key, result.clone());
    }
    Ok(result)
}

/// Deletes a binding or property; the implementation of the `delete`
/// operator lives here so the operator module stays readable.
pub(super) fn delete(target: &Node, context: &mut Context) -> JsResult<JsValue> {
    match target {
        Node::GetConstField(ref access) => {
            let object = access.obj().run(context)?;
            delete_property(&object, PropertyKey::from(access.field()), context)
        }
        Node::GetField(ref access) => {
            let object = access.obj().run(context)?;
            let key = access.field().run(context)?.to_property_key(context)?;
            delete_property(&object, key, context)
        }
        Node::Identifier(ref identifier) => {
            if context.strict() {
                return context
                    .throw_syntax_error("cannot delete a variable in strict mode");
            }
            let name = identifier.as_ref();
            match environment::lookup(&context.lexical_environment(), name) {
                Some(environment) => {
                    let deleted = environment.borrow_mut().delete_binding(name);
                    Ok(JsValue::boolean(deleted))
                }
                None => Ok(JsValue::boolean(true)),
            }
        }
        // `delete` on any other expression evaluates it and succeeds.
        node => {
            node.run(context)?;
            Ok(JsValue::boolean(true))
        }
    }
}

fn delete_property(
    object: &JsValue,
    key: PropertyKey,
    context: &mut Context,
) -> JsResult<JsValue> {
    match object.as_object() {
        Some(object) => {
            let deleted = object.clone().delete(&key, context)?;
            if !deleted && context.strict() {
                return context.throw_type_error(format!(
                    "cannot delete non-configurable property '{}'",
                    key
                ));
            }
            Ok(JsValue::boolean(deleted))
        }
        None => Ok(JsValue::boolean(true)),
    }
}
