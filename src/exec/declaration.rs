//! Declaration execution: variable declaration lists, destructuring
//! binding and the creation of the whole function family.

use super::{environment_error, Executable};
use crate::{
    ast::node::{
        ArrowFunctionDecl, AsyncFunctionDecl, AsyncFunctionExpr, AsyncGeneratorDecl,
        AsyncGeneratorExpr, BindingPatternTypeArray, BindingPatternTypeObject, ConstDeclList,
        Declaration, DeclarationBinding, DeclarationPattern, FunctionDecl, FunctionExpr,
        GeneratorDecl, GeneratorExpr, LetDeclList, Node, PropertyName, VarDeclList,
    },
    builtins::{
        array::Array,
        function::{create_function, FunctionKind},
        iterable::get_iterator,
    },
    environment::{self, BindingKind, Environment},
    property::PropertyKey,
    value::JsValue,
    Context, JsResult, Profiler,
};

pub(super) fn var_decl_list(list: &VarDeclList, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("VarDeclList", "exec");
    let scope = environment::var_scope(&context.lexical_environment());

    for declaration in list.as_ref() {
        match declaration.binding() {
            DeclarationBinding::Identifier(name) => {
                let value = match declaration.init() {
                    Some(init) => Some(init.run(context)?),
                    None => None,
                };
                // Hoisting already produced the binding; a declaration
                // without initializer must not clobber its current value.
                let exists = scope.borrow().has_binding(name);
                if exists {
                    if let Some(value) = value {
                        scope
                            .borrow_mut()
                            .set_binding_value(name, value)
                            .map_err(|err| environment_error(err, context))?;
                    }
                } else {
                    let initial = Some(value.unwrap_or_default());
                    let result = scope.borrow_mut().create_binding(
                        name.as_ref().into(),
                        BindingKind::Var,
                        initial,
                    );
                    result.map_err(|err| environment_error(err, context))?;
                }
            }
            DeclarationBinding::Pattern(pattern) => {
                let value = match declaration.init() {
                    Some(init) => init.run(context)?,
                    None => {
                        return context
                            .throw_syntax_error("missing initializer in destructuring declaration")
                    }
                };
                bind_pattern(pattern, value, BindingKind::Var, &scope, context)?;
            }
        }
    }
    Ok(JsValue::undefined())
}

fn lexical_decl_list(
    declarations: &[Declaration],
    kind: BindingKind,
    context: &mut Context,
) -> JsResult<JsValue> {
    let scope = context.lexical_environment();
    for declaration in declarations {
        let value = match declaration.init() {
            Some(init) => init.run(context)?,
            None if kind == BindingKind::Const => {
                return context.throw_syntax_error("missing initializer in const declaration")
            }
            None => JsValue::undefined(),
        };
        bind_declaration_in(declaration, value, kind, &scope, context)?;
    }
    Ok(JsValue::undefined())
}

pub(super) fn let_decl_list(list: &LetDeclList, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("LetDeclList", "exec");
    lexical_decl_list(list.as_ref(), BindingKind::Let, context)
}

pub(super) fn const_decl_list(list: &ConstDeclList, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("ConstDeclList", "exec");
    lexical_decl_list(list.as_ref(), BindingKind::Const, context)
}

/// Binds a declarator to a value in `scope`. Used for catch parameters and
/// declaration lists.
pub(crate) fn bind_declaration(
    declaration: &Declaration,
    value: JsValue,
    kind: BindingKind,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    bind_declaration_in(declaration, value, kind, scope, context)
}

fn bind_declaration_in(
    declaration: &Declaration,
    value: JsValue,
    kind: BindingKind,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    match declaration.binding() {
        DeclarationBinding::Identifier(name) => declare(name, kind, value, scope, context),
        DeclarationBinding::Pattern(pattern) => {
            bind_pattern(pattern, value, kind, scope, context)
        }
    }
}

/// Creates (or, when the binding was hoisted into its dead zone,
/// initializes) a single binding.
pub(crate) fn declare(
    name: &str,
    kind: BindingKind,
    value: JsValue,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    if context.in_replay() {
        scope
            .borrow_mut()
            .create_binding_replay(name.into(), kind, Some(value));
        return Ok(());
    }
    let hoisted = scope.borrow().binding_kind(name) == Some(kind);
    if hoisted {
        scope.borrow_mut().initialize_binding(name, value);
        Ok(())
    } else {
        let result = scope
            .borrow_mut()
            .create_binding(name.into(), kind, Some(value));
        result.map_err(|err| environment_error(err, context))
    }
}

/// Destructures `value` through a binding pattern, creating bindings of
/// `kind` in `scope`.
pub(crate) fn bind_pattern(
    pattern: &DeclarationPattern,
    value: JsValue,
    kind: BindingKind,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    run_pattern(pattern, value, context, &mut |name, value, context| {
        declare(name, kind, value, scope, context)
    })
}

/// Destructures `value` through a pattern as an assignment expression:
/// names are assigned through the scope chain instead of declared.
pub(crate) fn assign_pattern(
    pattern: &DeclarationPattern,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    run_pattern(pattern, value, context, &mut |name, value, context| {
        super::expression::assign_identifier(name, value, context)
    })
}

/// The shared destructuring walk; `sink` receives every `(name, value)`
/// pair the pattern produces.
fn run_pattern(
    pattern: &DeclarationPattern,
    value: JsValue,
    context: &mut Context,
    sink: &mut dyn FnMut(&str, JsValue, &mut Context) -> JsResult<()>,
) -> JsResult<()> {
    match pattern {
        DeclarationPattern::Object(object_pattern) => {
            value.require_object_coercible(context)?;
            let mut seen_keys: Vec<PropertyKey> = Vec::new();
            for binding in object_pattern.bindings() {
                match binding {
                    BindingPatternTypeObject::SingleName {
                        ident,
                        property_name,
                        default_init,
                    } => {
                        let key = resolve_property_name(property_name, context)?;
                        seen_keys.push(key.clone());
                        let mut bound = value.get_field(key, context)?;
                        if bound.is_undefined() {
                            if let Some(default) = default_init {
                                bound = default.run(context)?;
                            }
                        }
                        sink(ident, bound, context)?;
                    }
                    BindingPatternTypeObject::RestProperty {
                        ident,
                        excluded_keys,
                    } => {
                        let rest = JsValue::new_object(context);
                        let source = value.to_object(context)?;
                        for key in source.own_property_keys(context)? {
                            if seen_keys.contains(&key) {
                                continue;
                            }
                            if excluded_keys
                                .iter()
                                .any(|excluded| key == excluded.as_ref())
                            {
                                continue;
                            }
                            let enumerable = source
                                .get_own_property(&key, context)?
                                .map(|descriptor| descriptor.enumerable())
                                .unwrap_or(false);
                            if !enumerable {
                                continue;
                            }
                            let item = value.get_field(key.clone(), context)?;
                            rest.set_field(key, item, false, context)?;
                        }
                        sink(ident, rest, context)?;
                    }
                    BindingPatternTypeObject::BindingPattern {
                        property_name,
                        pattern,
                        default_init,
                    } => {
                        let key = resolve_property_name(property_name, context)?;
                        seen_keys.push(key.clone());
                        let mut bound = value.get_field(key, context)?;
                        if bound.is_undefined() {
                            if let Some(default) = default_init {
                                bound = default.run(context)?;
                            }
                        }
                        run_pattern(pattern, bound, context, sink)?;
                    }
                }
            }
            Ok(())
        }
        DeclarationPattern::Array(array_pattern) => {
            let iterator = get_iterator(&value, context)?;
            let mut exhausted = false;
            for binding in array_pattern.bindings() {
                match binding {
                    BindingPatternTypeArray::Elision => {
                        if !exhausted {
                            exhausted = iterator.next(None, context)?.done;
                        }
                    }
                    BindingPatternTypeArray::SingleName {
                        ident,
                        default_init,
                    } => {
                        let mut bound = if exhausted {
                            JsValue::undefined()
                        } else {
                            let next = iterator.next(None, context)?;
                            exhausted = next.done;
                            if next.done {
                                JsValue::undefined()
                            } else {
                                next.value
                            }
                        };
                        if bound.is_undefined() {
                            if let Some(default) = default_init {
                                bound = default.run(context)?;
                            }
                        }
                        sink(ident, bound, context)?;
                    }
                    BindingPatternTypeArray::BindingPattern {
                        pattern,
                        default_init,
                    } => {
                        let mut bound = if exhausted {
                            JsValue::undefined()
                        } else {
                            let next = iterator.next(None, context)?;
                            exhausted = next.done;
                            if next.done {
                                JsValue::undefined()
                            } else {
                                next.value
                            }
                        };
                        if bound.is_undefined() {
                            if let Some(default) = default_init {
                                bound = default.run(context)?;
                            }
                        }
                        run_pattern(pattern, bound, context, sink)?;
                    }
                    BindingPatternTypeArray::SingleNameRest { ident } => {
                        let rest = collect_rest(&iterator, &mut exhausted, context)?;
                        sink(ident, rest, context)?;
                    }
                    BindingPatternTypeArray::BindingPatternRest { pattern } => {
                        let rest = collect_rest(&iterator, &mut exhausted, context)?;
                        run_pattern(pattern, rest, context, sink)?;
                    }
                }
            }
            Ok(())
        }
    }
}

fn collect_rest(
    iterator: &crate::builtins::iterable::IteratorRecord,
    exhausted: &mut bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    let mut elements = Vec::new();
    while !*exhausted {
        let next = iterator.next(None, context)?;
        if next.done {
            *exhausted = true;
            break;
        }
        elements.push(next.value);
    }
    Ok(Array::from_values(&elements, context))
}

pub(crate) fn resolve_property_name(
    name: &PropertyName,
    context: &mut Context,
) -> JsResult<PropertyKey> {
    match name {
        PropertyName::Literal(literal) => Ok(PropertyKey::from(literal.as_ref())),
        PropertyName::Computed(node) => {
            let value = node.run(context)?;
            value.to_property_key(context)
        }
    }
}

/// Binds the head variable of a `for-in`/`for-of` iteration to the
/// current value.
pub(crate) fn bind_for_loop_variable(
    variable: &Node,
    value: JsValue,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    match variable {
        Node::Identifier(name) => {
            super::expression::assign_identifier(name.as_ref(), value, context)
        }
        Node::VarDeclList(list) => match list.as_ref() {
            [declaration] => {
                if declaration.init().is_some() {
                    return context.throw_syntax_error(
                        "a declaration in the head of an iteration loop can't have an initializer",
                    );
                }
                let var_target = environment::var_scope(scope);
                bind_head_declaration(declaration, value, BindingKind::Var, &var_target, context)
            }
            _ => context.throw_syntax_error(
                "only one variable can be declared in the head of an iteration loop",
            ),
        },
        Node::LetDeclList(list) => match list.as_ref() {
            [declaration] => {
                bind_head_declaration(declaration, value, BindingKind::Let, scope, context)
            }
            _ => context.throw_syntax_error(
                "only one variable can be declared in the head of an iteration loop",
            ),
        },
        Node::ConstDeclList(list) => match list.as_ref() {
            [declaration] => {
                bind_head_declaration(declaration, value, BindingKind::Const, scope, context)
            }
            _ => context.throw_syntax_error(
                "only one variable can be declared in the head of an iteration loop",
            ),
        },
        _ => context.throw_syntax_error("unknown left hand side in head of iteration loop"),
    }
}

fn bind_head_declaration(
    declaration: &Declaration,
    value: JsValue,
    kind: BindingKind,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    if declaration.init().is_some() {
        return context.throw_syntax_error(
            "a declaration in the head of an iteration loop can't have an initializer",
        );
    }
    match declaration.binding() {
        DeclarationBinding::Identifier(name) => {
            if kind == BindingKind::Var {
                // `var` heads rebind the hoisted binding each iteration.
                let exists = scope.borrow().has_binding(name);
                if exists {
                    let result = scope.borrow_mut().set_binding_value(name, value);
                    return result.map_err(|err| environment_error(err, context));
                }
            }
            declare_fresh(name, kind, value, scope, context)
        }
        DeclarationBinding::Pattern(pattern) => {
            bind_pattern(pattern, value, kind, scope, context)
        }
    }
}

/// Creates a fresh binding in `scope`, replay tolerant.
fn declare_fresh(
    name: &str,
    kind: BindingKind,
    value: JsValue,
    scope: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    if context.in_replay() {
        scope
            .borrow_mut()
            .create_binding_replay(name.into(), kind, Some(value));
        return Ok(());
    }
    let result = scope
        .borrow_mut()
        .create_binding(name.into(), kind, Some(value));
    result.map_err(|err| environment_error(err, context))
}

// Function creation.

pub(crate) fn function_decl(decl: &FunctionDecl, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("FunctionDecl", "exec");
    let function = create_function(
        FunctionKind::Ordinary,
        decl.name(),
        decl.parameters(),
        decl.body(),
        context,
    )?;
    let name = decl.name().expect("function declarations have a name");
    let scope = environment::var_scope(&context.lexical_environment());
    if context.in_replay() {
        scope.borrow_mut().create_binding_replay(
            name.into(),
            BindingKind::Function,
            Some(function.clone()),
        );
    } else {
        let result = scope.borrow_mut().create_binding(
            name.into(),
            BindingKind::Function,
            Some(function.clone()),
        );
        result.map_err(|err| environment_error(err, context))?;
    }
    Ok(function)
}

pub(super) fn function_expr(expr: &FunctionExpr, context: &mut Context) -> JsResult<JsValue> {
    create_function(
        FunctionKind::Ordinary,
        expr.name(),
        expr.parameters(),
        expr.body(),
        context,
    )
}

pub(super) fn arrow_function(
    decl: &ArrowFunctionDecl,
    context: &mut Context,
) -> JsResult<JsValue> {
    create_function(
        FunctionKind::Arrow,
        None,
        decl.parameters(),
        decl.body(),
        context,
    )
}

macro_rules! named_function_decl {
    ($fn_name:ident, $node:ty, $kind:expr) => {
        pub(super) fn $fn_name(decl: &$node, context: &mut Context) -> JsResult<JsValue> {
            let function =
                create_function($kind, decl.name(), decl.parameters(), decl.body(), context)?;
            if let Some(name) = decl.name() {
                let scope = environment::var_scope(&context.lexical_environment());
                if context.in_replay() {
                    scope.borrow_mut().create_binding_replay(
                        name.into(),
                        BindingKind::Function,
                        Some(function.clone()),
                    );
                } else {
                    let result = scope.borrow_mut().create_binding(
                        name.into(),
                        BindingKind::Function,
                        Some(function.clone()),
                    );
                    result.map_err(|err| environment_error(err, context))?;
                }
            }
            Ok(function)
        }
    };
}

macro_rules! function_expr_node {
    ($fn_name:ident, $node:ty, $kind:expr) => {
        pub(super) fn $fn_name(expr: &$node, context: &mut Context) -> JsResult<JsValue> {
            create_function($kind, expr.name(), expr.parameters(), expr.body(), context)
        }
    };
}

named_function_decl!(generator_decl, GeneratorDecl, FunctionKind::Generator);
function_expr_node!(generator_expr, GeneratorExpr, FunctionKind::Generator);
named_function_decl!(async_function_decl, AsyncFunctionDecl, FunctionKind::Async);
function_expr_node!(async_function_expr, AsyncFunctionExpr, FunctionKind::Async);
named_function_decl!(
    async_generator_decl,
    AsyncGeneratorDecl,
    FunctionKind::AsyncGenerator
);
function_expr_node!(
    async_generator_expr,
    AsyncGeneratorExpr,
    FunctionKind::AsyncGenerator
);
