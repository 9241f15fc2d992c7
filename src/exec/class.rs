//! The class and prototype system: class definition evaluation, the
//! construction algorithm with base-first field initialization, `super`
//! calls with duplicate detection, derived-constructor `this` tracking and
//! private member scoping.

use super::{declaration, expression, Executable, Flow};
use crate::{
    ast::node::{
        Class, ClassElement, ClassElementName, FormalParameter, MethodDefinitionKind,
        RcStatementList, StatementList, SuperCall,
    },
    builtins::function::{
        self, create_function, Function, FunctionFlags, FunctionKind, OrdinaryFunction,
    },
    environment::{
        new_declarative_environment, new_function_environment, Environment, ThisBinding,
    },
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData, PROTOTYPE},
    property::{AccessorDescriptor, Attribute, DataDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// The runtime representation of a class constructor.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct ClassFunction {
    pub(crate) name: JsString,
    /// The designated constructor, if the class declared one.
    pub(crate) constructor: Option<ClassConstructorParts>,
    /// The parent constructor object: another class or a native
    /// constructor function.
    pub(crate) parent: Option<JsObject>,
    /// `extends null`: the derived chain terminates and `this` stays
    /// uninitialized for the whole constructor body.
    pub(crate) extends_null: bool,
    /// Instance field declarations in definition order.
    #[unsafe_ignore_trace]
    pub(crate) instance_fields: Vec<ClassElement>,
    /// The scope the class body closes over, including the class name
    /// binding and the class scope marker for private member access.
    pub(crate) environment: Environment,
    /// The `prototype` object of the class.
    pub(crate) prototype: JsObject,
}

/// The constructor body, shared so AST node identities stay stable.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct ClassConstructorParts {
    #[unsafe_ignore_trace]
    pub(crate) parameters: Box<[FormalParameter]>,
    pub(crate) body: RcStatementList,
}

/// A constructor invocation frame: the current `this` (replaceable by a
/// parent constructor returning an object) and the once-only `super` flag.
#[derive(Debug, Clone)]
pub(crate) struct ConstructorFrame {
    pub(crate) this: JsValue,
    pub(crate) super_called: bool,
    pub(crate) class: JsObject,
}

pub(crate) fn class_function_data(object: &JsObject) -> Option<ClassFunction> {
    match object.borrow().data {
        ObjectData::Function(Function::Class(ref class)) => Some((**class).clone()),
        _ => None,
    }
}

pub(super) fn class_decl(class: &Class, context: &mut Context) -> JsResult<JsValue> {
    let value = eval_class(class, context)?;
    if let Some(name) = class.name() {
        declaration::declare(
            name,
            crate::environment::BindingKind::Let,
            value.clone(),
            &context.lexical_environment(),
            context,
        )?;
    }
    Ok(value)
}

pub(super) fn class_expr(class: &Class, context: &mut Context) -> JsResult<JsValue> {
    eval_class(class, context)
}

/// `ClassDefinitionEvaluation`.
fn eval_class(class: &Class, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Class", "exec");

    // The heritage clause decides the prototype chains of both the class
    // object and its `prototype` object.
    let (parent, extends_null) = match class.heritage() {
        None => (None, false),
        Some(node) => match node.run(context)? {
            JsValue::Null => (None, true),
            JsValue::Object(ref object) if object.is_constructor() => {
                (Some(object.clone()), false)
            }
            other => {
                return context.throw_type_error(format!(
                    "class heritage must be a constructor or null, got {}",
                    other.type_of()
                ))
            }
        },
    };

    let proto_parent = if extends_null {
        JsValue::null()
    } else if let Some(ref parent) = parent {
        let parent_proto = JsValue::from(parent.clone()).get_field(PROTOTYPE, context)?;
        if !parent_proto.is_object() && !parent_proto.is_null() {
            return context
                .throw_type_error("class heritage prototype must be an object or null");
        }
        parent_proto
    } else {
        context
            .standard_objects()
            .object_object()
            .prototype()
            .into()
    };

    let prototype = JsObject::new(Object::create(proto_parent));

    // The class body scope: it carries the class name binding and marks
    // the region where `#private` member access is legal.
    let class_scope = new_declarative_environment(Some(context.lexical_environment()));

    let class_function = ClassFunction {
        name: class.name().unwrap_or("").into(),
        constructor: class.constructor().map(|constructor| ClassConstructorParts {
            parameters: constructor.parameters().to_vec().into_boxed_slice(),
            body: RcStatementList::from(constructor.body().clone()),
        }),
        parent: parent.clone(),
        extends_null,
        instance_fields: class
            .elements()
            .iter()
            .filter(|element| {
                matches!(
                    element,
                    ClassElement::Field {
                        is_static: false,
                        ..
                    }
                )
            })
            .cloned()
            .collect(),
        environment: class_scope.clone(),
        prototype: prototype.clone(),
    };

    // The class object's own prototype gives static inheritance.
    let class_proto: JsValue = match (&parent, extends_null) {
        (Some(parent), _) => parent.clone().into(),
        (None, _) => context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    };
    let class_object = JsObject::new(Object::function(
        Function::Class(Box::new(class_function)),
        class_proto,
    ));

    let attribute = Attribute::CONFIGURABLE;
    let length = class
        .constructor()
        .map(|constructor| {
            constructor
                .parameters()
                .iter()
                .take_while(|parameter| parameter.is_simple())
                .count()
        })
        .unwrap_or(0);
    class_object
        .borrow_mut()
        .insert_property("length", length, attribute);
    class_object
        .borrow_mut()
        .insert_property("name", class.name().unwrap_or(""), attribute);
    class_object
        .borrow_mut()
        .insert_property(PROTOTYPE, prototype.clone(), Attribute::none());
    prototype.borrow_mut().insert_property(
        "constructor",
        class_object.clone(),
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );

    {
        let mut scope = class_scope.borrow_mut();
        scope.set_class_object(class_object.clone());
        if let Some(name) = class.name() {
            let _ = scope.create_binding(
                name.into(),
                crate::environment::BindingKind::Const,
                Some(class_object.clone().into()),
            );
        }
    }

    // Class bodies are strict; methods and static members evaluate inside
    // the class scope.
    let outer = context.lexical_environment();
    let outer_strict = context.strict();
    context.set_strict(true);
    context.set_lexical_environment(class_scope);
    let result = eval_class_elements(class, &class_object, &prototype, context);
    context.set_lexical_environment(outer);
    context.set_strict(outer_strict);
    result?;

    Ok(class_object.into())
}

fn eval_class_elements(
    class: &Class,
    class_object: &JsObject,
    prototype: &JsObject,
    context: &mut Context,
) -> JsResult<()> {
    for element in class.elements() {
        match element {
            ClassElement::Method {
                name,
                kind,
                parameters,
                body,
                is_static,
            } => {
                let target = if *is_static {
                    class_object.clone()
                } else {
                    prototype.clone()
                };
                define_method(name, *kind, parameters, body, &target, context)?;
            }
            ClassElement::Field {
                name,
                init,
                is_static: true,
            } => {
                // Static fields evaluate once, with `this` bound to the
                // class object.
                let value = run_in_class_this_scope(
                    init.as_ref(),
                    class_object.clone().into(),
                    context,
                )?;
                let key = class_element_key(name, context)?;
                class_object.define_own_property(
                    key,
                    DataDescriptor::new(value, Attribute::default()).into(),
                    context,
                )?;
            }
            ClassElement::Field {
                is_static: false, ..
            } => {
                // Instance fields run during construction.
            }
            ClassElement::StaticBlock(body) => {
                run_static_block(body, class_object.clone().into(), context)?;
            }
        }
    }
    Ok(())
}

fn define_method(
    name: &ClassElementName,
    kind: MethodDefinitionKind,
    parameters: &[FormalParameter],
    body: &StatementList,
    target: &JsObject,
    context: &mut Context,
) -> JsResult<()> {
    let function_kind = match kind {
        MethodDefinitionKind::Generator => FunctionKind::Generator,
        MethodDefinitionKind::Async => FunctionKind::Async,
        MethodDefinitionKind::AsyncGenerator => FunctionKind::AsyncGenerator,
        _ => FunctionKind::Method,
    };
    let key = class_element_key(name, context)?;
    let method_name = key.as_js_string().map(|name| name.to_string());
    let method = create_function(
        function_kind,
        method_name.as_deref(),
        parameters,
        body,
        context,
    )?;
    let method_object = method.as_object().expect("functions are objects").clone();
    function::set_home_object(&method_object, target.clone());

    match kind {
        MethodDefinitionKind::Get | MethodDefinitionKind::Set => {
            let existing = target
                .get_own_property(&key, context)?
                .and_then(|descriptor| match descriptor {
                    crate::property::PropertyDescriptor::Accessor(ref accessor) => Some(accessor.clone()),
                    crate::property::PropertyDescriptor::Data(_) => None,
                });
            let (mut get, mut set) = match existing {
                Some(accessor) => (accessor.getter().cloned(), accessor.setter().cloned()),
                None => (None, None),
            };
            if kind == MethodDefinitionKind::Get {
                get = Some(method_object);
            } else {
                set = Some(method_object);
            }
            target.define_own_property(
                key,
                AccessorDescriptor::new(get, set, Attribute::CONFIGURABLE).into(),
                context,
            )?;
        }
        _ => {
            target.define_own_property(
                key,
                DataDescriptor::new(method, Attribute::WRITABLE | Attribute::CONFIGURABLE)
                    .into(),
                context,
            )?;
        }
    }
    Ok(())
}

fn class_element_key(
    name: &ClassElementName,
    context: &mut Context,
) -> JsResult<PropertyKey> {
    match name {
        ClassElementName::Property(property_name) => {
            declaration::resolve_property_name(property_name, context)
        }
        ClassElementName::Private(name) => Ok(expression::private_field_key(name)),
    }
}

/// Runs a field initializer (or yields `undefined`) with `this` bound.
fn run_in_class_this_scope(
    init: Option<&crate::ast::Node>,
    this: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let init = match init {
        Some(init) => init,
        None => return Ok(JsValue::undefined()),
    };
    let scope = new_function_environment(
        ThisBinding::Value(this),
        None,
        None,
        Some(context.lexical_environment()),
    );
    let outer = context.lexical_environment();
    context.set_lexical_environment(scope);
    let result = init.run(context);
    context.set_lexical_environment(outer);
    result
}

fn run_static_block(
    body: &StatementList,
    this: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    let scope = new_function_environment(
        ThisBinding::Value(this),
        None,
        None,
        Some(context.lexical_environment()),
    );
    context.push_execution_context(scope.clone(), scope, true);
    let result = body.run(context);
    context.pop_execution_context();
    result?;
    Ok(())
}

/// The internal `[[Construct]]` of class constructors.
pub(crate) fn construct_class(
    class_object: &JsObject,
    args: &[JsValue],
    new_target: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("construct_class", "exec");
    let class_function = class_function_data(class_object)
        .expect("construct_class requires a class function");

    let target_object = new_target
        .as_object()
        .cloned()
        .unwrap_or_else(|| class_object.clone());
    let prototype = target_object.construction_prototype(context)?;

    // Allocate the instance, matching the variant of a native superclass
    // at the root of the heritage chain.
    let instance = allocate_instance(&class_function, prototype, context);

    // Field initializers run base-first over the class hierarchy.
    let chain = class_chain(class_object);
    for level in chain.iter().rev() {
        run_instance_fields(level, &instance, context)?;
    }

    let derived = class_function.parent.is_some() || class_function.extends_null;
    context.push_constructor_frame(ConstructorFrame {
        this: instance.clone().into(),
        super_called: !derived,
        class: class_object.clone(),
    });

    let completion =
        run_constructor_level(&class_function, args, new_target, derived, context);
    let frame = context.pop_constructor_frame();

    let explicit = completion?;
    let frame = frame.expect("constructor frame pushed above");

    match explicit {
        Some(value) if value.is_object() => Ok(value),
        Some(value) if value.is_undefined() => {
            if derived && !frame.super_called {
                return context.throw_reference_error(
                    "must call super constructor before returning from a derived constructor",
                );
            }
            Ok(frame.this)
        }
        Some(_) if derived => context
            .throw_type_error("derived constructors may only return an object or undefined"),
        Some(_) => Ok(frame.this),
        None => {
            if derived && !frame.super_called {
                return context.throw_reference_error(
                    "must call super constructor before returning from a derived constructor",
                );
            }
            Ok(frame.this)
        }
    }
}

/// The class hierarchy, this class first.
fn class_chain(class_object: &JsObject) -> Vec<ClassFunction> {
    let mut chain = Vec::new();
    let mut current = class_function_data(class_object);
    while let Some(class_function) = current {
        let parent = class_function.parent.clone();
        chain.push(class_function);
        current = parent.as_ref().and_then(class_function_data);
    }
    chain
}

fn allocate_instance(
    class_function: &ClassFunction,
    prototype: JsValue,
    context: &mut Context,
) -> JsObject {
    // Find the first non-class ancestor, if any.
    let mut parent = class_function.parent.clone();
    while let Some(object) = parent.clone() {
        match class_function_data(&object) {
            Some(parent_function) => parent = parent_function.parent.clone(),
            None => break,
        }
    }

    let mut object = Object::create(prototype);
    if let Some(native) = parent {
        let standard = context.standard_objects();
        if JsObject::ptr_eq(&native, &standard.array_object().constructor()) {
            object.data = ObjectData::Array;
            object.insert_property("length", 0, Attribute::WRITABLE);
        } else if JsObject::ptr_eq(&native, &standard.map_object().constructor()) {
            object.data = ObjectData::Map(Default::default());
        } else if JsObject::ptr_eq(&native, &standard.set_object().constructor()) {
            object.data = ObjectData::Set(Default::default());
        } else if let Some(kind) = context.error_kind_of_constructor(&native) {
            object.data = ObjectData::Error(kind);
        }
    }
    JsObject::new(object)
}

fn run_instance_fields(
    class_function: &ClassFunction,
    instance: &JsObject,
    context: &mut Context,
) -> JsResult<()> {
    if class_function.instance_fields.is_empty() {
        return Ok(());
    }
    let outer = context.lexical_environment();
    let outer_strict = context.strict();
    context.set_strict(true);
    context.set_lexical_environment(class_function.environment.clone());
    let result = (|| {
        for element in &class_function.instance_fields {
            if let ClassElement::Field {
                name,
                init,
                is_static: false,
            } = element
            {
                let value = run_in_class_this_scope(
                    init.as_ref(),
                    instance.clone().into(),
                    context,
                )?;
                let key = class_element_key(name, context)?;
                instance.define_own_property(
                    key,
                    DataDescriptor::new(value, Attribute::default()).into(),
                    context,
                )?;
            }
        }
        Ok(())
    })();
    context.set_lexical_environment(outer);
    context.set_strict(outer_strict);
    result
}

/// Runs one class level's constructor body (or the implicit default),
/// returning an explicit `return` value if there was one.
fn run_constructor_level(
    class_function: &ClassFunction,
    args: &[JsValue],
    new_target: &JsValue,
    derived: bool,
    context: &mut Context,
) -> JsResult<Option<JsValue>> {
    let constructor = match class_function.constructor {
        Some(ref constructor) => constructor.clone(),
        None => {
            // The default derived constructor forwards its arguments to
            // the parent; the default base constructor does nothing.
            if derived && !class_function.extends_null {
                perform_super(args.to_vec(), context)?;
            }
            return Ok(None);
        }
    };

    let this_binding = if derived {
        ThisBinding::Uninitialized
    } else {
        let frame = context
            .current_constructor_frame()
            .expect("constructor frame pushed by caller");
        ThisBinding::Value(frame.this.clone())
    };

    let function = OrdinaryFunction {
        kind: FunctionKind::Method,
        flags: FunctionFlags::STRICT,
        body: constructor.body.clone(),
        parameters: constructor.parameters.clone(),
        environment: class_function.environment.clone(),
        home_object: Some(class_function.prototype.clone()),
    };

    let base = new_function_environment(
        this_binding,
        Some(new_target.clone()),
        Some(class_function.prototype.clone()),
        Some(class_function.environment.clone()),
    );
    let body_env = function::bind_parameters_for_call(&function, base, args, context)?;

    context.push_execution_context(body_env.clone(), body_env.clone(), true);
    let result = (|| {
        super::hoisting::hoist_declarations(function.body.items(), &body_env, context)?;
        super::hoisting::hoist_lexical_declarations(function.body.items(), &body_env, context)?;
        function.body.run(context)
    })();
    context.pop_execution_context();

    match result {
        Ok(_) => Ok(None),
        Err(Flow::Return(value)) => Ok(Some(value)),
        Err(flow) => Err(flow),
    }
}

pub(super) fn super_call(super_call: &SuperCall, context: &mut Context) -> JsResult<JsValue> {
    let args = expression::evaluate_args(super_call.args(), context)?;
    perform_super(args, context)?;
    Ok(JsValue::undefined())
}

/// The semantics shared by explicit `super(...)` and the implicit default
/// derived constructor. Argument evaluation happens before the duplicate
/// call check, so argument side effects are observable even when the call
/// errors.
pub(crate) fn perform_super(args: Vec<JsValue>, context: &mut Context) -> JsResult<()> {
    let frame = match context.current_constructor_frame() {
        Some(frame) => frame.clone(),
        None => {
            return context
                .throw_syntax_error("'super' keyword unexpected outside a constructor")
        }
    };

    if frame.super_called {
        return context.throw_reference_error("super constructor may only be called once");
    }

    let class_function = class_function_data(&frame.class)
        .expect("constructor frames always hold class objects");

    let parent = match class_function.parent.clone() {
        Some(parent) => parent,
        None => {
            return context.throw_syntax_error(
                "'super' keyword is only valid in a derived class constructor",
            )
        }
    };

    let replacement = match class_function_data(&parent) {
        Some(parent_function) => {
            // A class parent: run its constructor level against the same
            // instance.
            let parent_derived =
                parent_function.parent.is_some() || parent_function.extends_null;
            context.push_constructor_frame(ConstructorFrame {
                this: frame.this.clone(),
                super_called: !parent_derived,
                class: parent.clone(),
            });
            let completion = run_constructor_level(
                &parent_function,
                &args,
                &parent.clone().into(),
                parent_derived,
                context,
            );
            let parent_frame = context.pop_constructor_frame();
            let explicit = completion?;
            let parent_frame = parent_frame.expect("frame pushed above");
            if parent_derived && !parent_frame.super_called {
                return context.throw_reference_error(
                    "must call super constructor before returning from a derived constructor",
                );
            }
            match explicit {
                Some(value) if value.is_object() => value,
                _ => parent_frame.this,
            }
        }
        None => {
            // A native parent constructor initializes (or replaces) the
            // instance.
            let result = parent.call(&frame.this, &args, context)?;
            match result {
                JsValue::Object(ref object)
                    if frame
                        .this
                        .as_object()
                        .map(|this| !JsObject::ptr_eq(object, this))
                        .unwrap_or(true) =>
                {
                    // Keep the subclass prototype chain on the replacement.
                    if let Some(this) = frame.this.as_object() {
                        let proto = this.prototype_instance();
                        object.borrow_mut().set_prototype(proto);
                    }
                    result
                }
                _ => frame.this.clone(),
            }
        }
    };

    // The parent may have substituted the instance under construction.
    context.replace_constructor_this(replacement.clone());
    context.mark_super_called();

    // Initialize the `this` binding of the constructor frame.
    if let Some(environment) =
        crate::environment::this_binding_environment(&context.lexical_environment())
    {
        environment
            .borrow_mut()
            .bind_this(ThisBinding::Value(replacement));
    }
    Ok(())
}
