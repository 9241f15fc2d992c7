//! Function objects and the calling convention: parameter binding with
//! defaults, rest and destructuring, the separate parameter scope for
//! functions with parameter expressions, `arguments` objects, bound
//! functions and arrow `this` capture.

pub mod arguments;

use crate::{
    ast::node::{FormalParameter, RcStatementList, StatementList},
    environment::{
        new_declarative_environment, new_function_environment, new_parameter_environment,
        BindingKind, Environment, EnvironmentFlavor, EnvironmentRecord, ThisBinding,
    },
    exec::{class::ClassFunction, hoisting, Executable, Flow},
    gc::{empty_trace, Cell, Finalize, Gc, Trace},
    object::{JsObject, Object, ObjectData, PROTOTYPE},
    property::{Attribute, PropertyKey},
    value::JsValue,
    Context, JsResult, Profiler,
};
use bitflags::bitflags;
use dyn_clone::DynClone;
use std::fmt::{self, Debug};

#[cfg(test)]
mod tests;

/// Type representing a native built-in function a.k.a. function pointer.
///
/// Native functions need to have this signature in order to be callable
/// from JavaScript. On `[[Construct]]` the first argument is the new
/// target instead of `this`.
pub type NativeFunction = fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>;

/// Trait representing a native built-in closure, for host functions that
/// capture state.
pub trait ClosureFunction:
    Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue> + DynClone + 'static
{
}

impl<T> ClosureFunction for T where
    T: Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue> + Clone + 'static
{
}

// Allows cloning Box<dyn ClosureFunction>.
dyn_clone::clone_trait_object!(ClosureFunction);

#[derive(Clone, Copy, Finalize)]
pub struct BuiltInFunction(pub(crate) NativeFunction);

// Safety: function pointers carry no GC references.
unsafe impl Trace for BuiltInFunction {
    empty_trace!();
}

impl From<NativeFunction> for BuiltInFunction {
    fn from(function: NativeFunction) -> Self {
        Self(function)
    }
}

impl Debug for BuiltInFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[native]")
    }
}

bitflags! {
    #[derive(Finalize, Default)]
    pub struct FunctionFlags: u8 {
        const CONSTRUCTABLE = 0b0000_0001;
        const LEXICAL_THIS_MODE = 0b0000_0010;
        const STRICT = 0b0000_0100;
    }
}

impl FunctionFlags {
    #[inline]
    pub(crate) fn is_constructable(&self) -> bool {
        self.contains(Self::CONSTRUCTABLE)
    }

    #[inline]
    pub(crate) fn is_lexical_this_mode(&self) -> bool {
        self.contains(Self::LEXICAL_THIS_MODE)
    }

    #[inline]
    pub(crate) fn is_strict(&self) -> bool {
        self.contains(Self::STRICT)
    }
}

// Safety: plain bits.
unsafe impl Trace for FunctionFlags {
    empty_trace!();
}

/// The kind of an ordinary (AST-backed) function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum FunctionKind {
    Ordinary,
    Method,
    Arrow,
    Generator,
    Async,
    AsyncGenerator,
}

// Safety: plain enum.
unsafe impl Trace for FunctionKind {
    empty_trace!();
}

/// The function representation: one enum, many calling conventions.
#[derive(Clone, Trace, Finalize)]
pub enum Function {
    /// A native function pointer.
    Native {
        function: BuiltInFunction,
        constructable: bool,
    },
    /// A native closure.
    Closure {
        #[unsafe_ignore_trace]
        function: Box<dyn ClosureFunction>,
        constructable: bool,
    },
    /// A function backed by an AST body and a captured environment.
    Ordinary {
        kind: FunctionKind,
        flags: FunctionFlags,
        body: RcStatementList,
        #[unsafe_ignore_trace]
        parameters: Box<[FormalParameter]>,
        environment: Environment,
        home_object: Option<JsObject>,
    },
    /// The result of `Function.prototype.bind`.
    Bound {
        target: JsObject,
        this: JsValue,
        args: Vec<JsValue>,
    },
    /// A class acting as constructor.
    Class(Box<ClassFunction>),
}

impl Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function {{ ... }}")
    }
}

impl Function {
    /// Everything here has `[[Call]]`; class constructors reject the call
    /// at invocation time instead.
    pub fn is_callable(&self) -> bool {
        true
    }

    pub fn is_constructable(&self) -> bool {
        match self {
            Self::Native { constructable, .. } | Self::Closure { constructable, .. } => {
                *constructable
            }
            Self::Ordinary { flags, .. } => flags.is_constructable(),
            Self::Bound { target, .. } => target.is_constructor(),
            Self::Class(_) => true,
        }
    }
}

/// Creates an ordinary function object from its definition site.
///
/// Strict mode is sticky: the definition context or a `"use strict"`
/// directive in the body makes the function strict. Async bodies are
/// structurally validated to not contain `super` at creation time.
pub(crate) fn create_function(
    kind: FunctionKind,
    name: Option<&str>,
    parameters: &[FormalParameter],
    body: &StatementList,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("create_function", "function");

    if matches!(kind, FunctionKind::Async | FunctionKind::AsyncGenerator)
        && hoisting::contains_super(body.items())
    {
        return context
            .throw_syntax_error("'super' keyword is not allowed in async functions");
    }

    let strict = context.strict() || hoisting::has_strict_directive(body.items());

    if strict {
        let mut names: Vec<Box<str>> = Vec::new();
        for parameter in parameters {
            for name in parameter.names() {
                if names.contains(&name) {
                    return context.throw_syntax_error(format!(
                        "duplicate parameter name '{}' not allowed in strict mode",
                        name
                    ));
                }
                names.push(name);
            }
        }
    }

    let mut flags = FunctionFlags::empty();
    if kind == FunctionKind::Ordinary {
        flags |= FunctionFlags::CONSTRUCTABLE;
    }
    if kind == FunctionKind::Arrow {
        flags |= FunctionFlags::LEXICAL_THIS_MODE;
    }
    if strict {
        flags |= FunctionFlags::STRICT;
    }

    let function = Function::Ordinary {
        kind,
        flags,
        body: RcStatementList::from(body.clone()),
        parameters: parameters.to_vec().into_boxed_slice(),
        environment: context.lexical_environment(),
        home_object: None,
    };

    let prototype = context
        .standard_objects()
        .function_object()
        .prototype();
    let function_object = JsObject::new(Object::function(function, prototype.into()));

    let length = parameters
        .iter()
        .take_while(|parameter| parameter.is_simple())
        .count();
    let attribute = Attribute::CONFIGURABLE;
    function_object
        .borrow_mut()
        .insert_property("length", length, attribute);
    function_object
        .borrow_mut()
        .insert_property("name", name.unwrap_or(""), attribute);

    match kind {
        FunctionKind::Ordinary => {
            // Constructable functions get a fresh `prototype` object with a
            // back-pointing `constructor`.
            let proto = JsValue::new_object(context);
            proto.set_property(
                "constructor",
                function_object.clone().into(),
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            );
            function_object.borrow_mut().insert_property(
                PROTOTYPE,
                proto,
                Attribute::WRITABLE,
            );
        }
        FunctionKind::Generator | FunctionKind::AsyncGenerator => {
            // Generator instances inherit from %Generator.prototype%
            // through the function's `prototype` object.
            let generator_proto = context.standard_objects().iterator_prototypes().generator();
            let mut proto = Object::default();
            proto.set_prototype(generator_proto.into());
            function_object.borrow_mut().insert_property(
                PROTOTYPE,
                JsObject::new(proto),
                Attribute::WRITABLE,
            );
        }
        _ => {}
    }

    Ok(function_object.into())
}

/// Installs the `[[HomeObject]]` of a method, enabling `super` references
/// in its body.
pub(crate) fn set_home_object(function_object: &JsObject, home: JsObject) {
    if let ObjectData::Function(Function::Ordinary {
        ref mut home_object,
        ..
    }) = function_object.borrow_mut().data
    {
        *home_object = Some(home);
    }
}

/// The data cloned out of an ordinary function object before a call.
pub(crate) struct OrdinaryFunction {
    pub kind: FunctionKind,
    pub flags: FunctionFlags,
    pub body: RcStatementList,
    pub parameters: Box<[FormalParameter]>,
    pub environment: Environment,
    pub home_object: Option<JsObject>,
}

pub(crate) fn ordinary_function_data(function_object: &JsObject) -> Option<OrdinaryFunction> {
    match function_object.borrow().data {
        ObjectData::Function(Function::Ordinary {
            kind,
            flags,
            ref body,
            ref parameters,
            ref environment,
            ref home_object,
        }) => Some(OrdinaryFunction {
            kind,
            flags,
            body: body.clone(),
            parameters: parameters.clone(),
            environment: environment.clone(),
            home_object: home_object.clone(),
        }),
        _ => None,
    }
}

/// The internal `[[Call]]` of ordinary functions.
pub(crate) fn call_ordinary(
    function_object: &JsObject,
    this: &JsValue,
    args: &[JsValue],
    new_target: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let function = ordinary_function_data(function_object)
        .expect("call_ordinary requires an ordinary function");

    match function.kind {
        FunctionKind::Generator | FunctionKind::AsyncGenerator => {
            crate::builtins::generator::create_generator(
                function_object,
                &function,
                this,
                args,
                context,
            )
        }
        FunctionKind::Async => crate::job::call_async_function(
            function_object,
            &function,
            this,
            args,
            context,
        ),
        _ => {
            let environment =
                prepare_call_environment(&function, this, args, new_target, context)?;
            run_function_body(&function, environment, context)
        }
    }
}

/// Builds the environment chain for a call and binds the parameters;
/// shared by plain calls, constructors and the suspendable kinds.
pub(crate) fn prepare_call_environment(
    function: &OrdinaryFunction,
    this: &JsValue,
    args: &[JsValue],
    new_target: &JsValue,
    context: &mut Context,
) -> JsResult<Environment> {
    let strict = function.flags.is_strict();

    // Arrow functions have no own `this`, `arguments` or `new.target`:
    // their frame leaves the slots empty so lookups walk outward.
    let base = if function.flags.is_lexical_this_mode() {
        Gc::new(Cell::new(EnvironmentRecord::new(
            EnvironmentFlavor::Function,
            Some(function.environment.clone()),
        )))
    } else {
        let this_binding = if strict {
            ThisBinding::Value(this.clone())
        } else if this.is_null_or_undefined() {
            ThisBinding::Value(context.global_object().into())
        } else if this.is_object() {
            ThisBinding::Value(this.clone())
        } else {
            // Sloppy primitive receivers are boxed.
            ThisBinding::Value(this.to_object(context)?.into())
        };
        new_function_environment(
            this_binding,
            Some(new_target.clone()),
            function.home_object.clone(),
            Some(function.environment.clone()),
        )
    };

    bind_parameters_for_call(function, base, args, context)
}

/// Parameter binding per call, returning the environment the body runs
/// in.
pub(crate) fn bind_parameters_for_call(
    function: &OrdinaryFunction,
    base: Environment,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<Environment> {
    let strict = function.flags.is_strict();
    let has_expressions = function
        .parameters
        .iter()
        .any(|parameter| !parameter.is_simple());

    // With parameter expressions the parameters live in their own scope,
    // so closures in defaults cannot see the body's `var`s.
    let param_env = if has_expressions {
        new_parameter_environment(Some(base.clone()))
    } else {
        base.clone()
    };

    let outer = context.lexical_environment();
    context.set_lexical_environment(param_env.clone());

    let result = (|| {
        // Pre-pass: defaulted parameters start in their dead zone so a
        // default expression cannot read a later parameter.
        for parameter in function.parameters.iter() {
            if parameter.declaration().init().is_some() {
                for name in parameter.names() {
                    param_env.borrow_mut().create_binding_replay(
                        name.as_ref().into(),
                        BindingKind::Parameter,
                        None,
                    );
                }
            }
        }

        for (index, parameter) in function.parameters.iter().enumerate() {
            if parameter.is_rest_param() {
                let rest = crate::builtins::array::Array::from_values(
                    args.get(index..).unwrap_or_default(),
                    context,
                );
                bind_parameter_value(parameter, rest, &param_env, context)?;
                break;
            }

            let mut value = args.get(index).cloned().unwrap_or_default();
            if value.is_undefined() {
                if let Some(default) = parameter.declaration().init() {
                    // Defaults evaluate in the parameter scope and can read
                    // previously bound parameters.
                    value = default.run(context)?;
                }
            }
            bind_parameter_value(parameter, value, &param_env, context)?;
        }

        // The `arguments` object, unless a parameter shadows the name.
        if function.kind != FunctionKind::Arrow {
            let shadowed = param_env.borrow().has_binding("arguments");
            if !shadowed {
                let mapped = !strict
                    && function
                        .parameters
                        .iter()
                        .all(FormalParameter::is_simple);
                let arguments_object = arguments::create_arguments_object(
                    args,
                    &function.parameters,
                    &param_env,
                    mapped,
                    context,
                );
                param_env.borrow_mut().create_binding_replay(
                    "arguments".into(),
                    BindingKind::Var,
                    Some(arguments_object),
                );
            }
        }

        // The body scope; `var`s of the body land here, never in the
        // parameter scope.
        let body_env = if has_expressions {
            let body_env = Gc::new(Cell::new(EnvironmentRecord::new(
                EnvironmentFlavor::Function,
                Some(param_env.clone()),
            )));
            body_env
        } else {
            base.clone()
        };
        Ok(body_env)
    })();

    context.set_lexical_environment(outer);
    result
}

fn bind_parameter_value(
    parameter: &FormalParameter,
    value: JsValue,
    environment: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    use crate::ast::node::DeclarationBinding;
    match parameter.declaration().binding() {
        DeclarationBinding::Identifier(name) => {
            environment.borrow_mut().create_binding_replay(
                name.as_ref().into(),
                BindingKind::Parameter,
                Some(value),
            );
            Ok(())
        }
        DeclarationBinding::Pattern(pattern) => crate::exec::declaration::bind_pattern(
            pattern,
            value,
            BindingKind::Parameter,
            environment,
            context,
        ),
    }
}

/// Runs a function body in the prepared environment, consuming the
/// `return` signal.
pub(crate) fn run_function_body(
    function: &OrdinaryFunction,
    body_env: Environment,
    context: &mut Context,
) -> JsResult<JsValue> {
    let strict = function.flags.is_strict();

    context.push_execution_context(body_env.clone(), body_env.clone(), strict);

    let result = (|| {
        hoisting::hoist_declarations(function.body.items(), &body_env, context)?;
        hoisting::hoist_lexical_declarations(function.body.items(), &body_env, context)?;
        function.body.run(context)
    })();

    context.pop_execution_context();

    match result {
        Ok(_) => Ok(JsValue::undefined()),
        Err(Flow::Return(value)) => Ok(value),
        Err(flow) => Err(flow),
    }
}

/// The internal `[[Construct]]` of ordinary functions.
pub(crate) fn construct_ordinary(
    function_object: &JsObject,
    args: &[JsValue],
    new_target: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let function = ordinary_function_data(function_object)
        .expect("construct_ordinary requires an ordinary function");

    let target_object = new_target
        .as_object()
        .cloned()
        .unwrap_or_else(|| function_object.clone());
    let prototype = target_object.construction_prototype(context)?;

    let this = JsValue::object(Object::create(prototype));

    let environment = prepare_call_environment(&function, &this, args, new_target, context)?;
    let result = run_function_body(&function, environment, context)?;

    // An explicit object return replaces the allocated instance.
    if result.is_object() {
        Ok(result)
    } else {
        Ok(this)
    }
}

/// Creates a new member function of an object with the usual `length` and
/// `name` conventions (non-enumerable, configurable).
pub fn make_builtin_fn<N>(
    function: NativeFunction,
    name: N,
    parent: &JsObject,
    length: usize,
    context: &Context,
) where
    N: Into<String>,
{
    let name = name.into();
    let _timer =
        Profiler::global().start_event(&format!("make_builtin_fn: {}", &name), "init");

    let mut function_object = Object::function(
        Function::Native {
            function: function.into(),
            constructable: false,
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    );
    let attribute = Attribute::CONFIGURABLE;
    function_object.insert_property("length", length, attribute);
    function_object.insert_property("name", name.as_str(), attribute);

    parent.borrow_mut().insert_property(
        name,
        JsObject::new(function_object),
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
}

/// Creates a constructor function object wired to its prototype object.
pub fn make_constructor_fn<N>(
    name: N,
    length: usize,
    function: NativeFunction,
    prototype: &JsObject,
    context: &Context,
) -> JsObject
where
    N: Into<String>,
{
    let name = name.into();

    let constructor = JsObject::new(Object::function(
        Function::Native {
            function: function.into(),
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
        .insert_property("length", length, attribute);
    constructor
        .borrow_mut()
        .insert_property("name", name, attribute);
    constructor.borrow_mut().insert_property(
        PROTOTYPE,
        prototype.clone(),
        Attribute::none(),
    );
    prototype.borrow_mut().insert_property(
        "constructor",
        constructor.clone(),
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );

    constructor
}

/// A native function that throws a `TypeError`; backs the poisoned
/// `callee`/`caller` accessors of `arguments` objects.
pub(crate) fn type_error_thrower(
    _this: &JsValue,
    _args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    context.throw_type_error(
        "'caller' and 'callee' cannot be accessed on arguments objects",
    )
}

/// `Function.prototype.call`.
pub(crate) fn function_prototype_call(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    if !this.is_function() {
        return context.throw_type_error("Function.prototype.call called on non-function");
    }
    let this_arg = args.first().cloned().unwrap_or_default();
    let rest = args.get(1..).unwrap_or_default();
    context.call(this, &this_arg, rest)
}

/// `Function.prototype.apply`.
pub(crate) fn function_prototype_apply(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    if !this.is_function() {
        return context.throw_type_error("Function.prototype.apply called on non-function");
    }
    let this_arg = args.first().cloned().unwrap_or_default();
    let arg_array = args.get(1).cloned().unwrap_or_default();
    if arg_array.is_null_or_undefined() {
        return context.call(this, &this_arg, &[]);
    }
    let length = arg_array.get_field("length", context)?.to_length(context)?;
    let mut arguments = Vec::with_capacity(length);
    for index in 0..length {
        arguments.push(arg_array.get_field(index, context)?);
    }
    context.call(this, &this_arg, &arguments)
}

/// `Function.prototype.bind`.
pub(crate) fn function_prototype_bind(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let target = match this.as_object() {
        Some(object) if object.is_callable() => object.clone(),
        _ => {
            return context
                .throw_type_error("Function.prototype.bind called on non-function")
        }
    };

    let bound_this = args.first().cloned().unwrap_or_default();
    let bound_args = args.get(1..).unwrap_or_default().to_vec();

    let bound = JsObject::new(Object::function(
        Function::Bound {
            target: target.clone(),
            this: bound_this,
            args: bound_args.clone(),
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    ));

    let target_length = target
        .get_direct(&PropertyKey::from("length"))
        .and_then(|value| value.as_number())
        .unwrap_or(0.0);
    let length = (target_length - bound_args.len() as f64).max(0.0);
    let target_name = target
        .get_direct(&PropertyKey::from("name"))
        .and_then(|value| value.as_string().cloned())
        .unwrap_or_default();

    let attribute = Attribute::CONFIGURABLE;
    bound
        .borrow_mut()
        .insert_property("length", length, attribute);
    bound.borrow_mut().insert_property(
        "name",
        format!("bound {}", target_name),
        attribute,
    );

    Ok(bound.into())
}

/// Initializes the `Function` constructor and prototype on the realm.
pub(crate) fn init(context: &mut Context) {
    let _timer = Profiler::global().start_event("function", "init");

    let function_prototype = context.standard_objects().function_object().prototype();
    make_builtin_fn(
        function_prototype_call,
        "call",
        &function_prototype,
        1,
        context,
    );
    make_builtin_fn(
        function_prototype_apply,
        "apply",
        &function_prototype,
        2,
        context,
    );
    make_builtin_fn(
        function_prototype_bind,
        "bind",
        &function_prototype,
        1,
        context,
    );

    let constructor = context.standard_objects().function_object().constructor();
    let global = context.global_object();
    global.borrow_mut().insert_property(
        "Function",
        constructor,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
}

/// The `Function` constructor itself: creating functions from source text
/// requires the parser, which is a host collaborator, so the bare
/// constructor only produces an empty function.
pub(crate) fn function_constructor(
    _new_target: &JsValue,
    _args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let noop: NativeFunction = |_, _, _| Ok(JsValue::undefined());
    let function = JsObject::new(Object::function(
        Function::Native {
            function: noop.into(),
            constructable: false,
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    ));
    Ok(function.into())
}

/// Creates a declarative environment for direct-eval bodies.
pub(crate) fn new_eval_environment(parent: Environment) -> Environment {
    new_declarative_environment(Some(parent))
}
