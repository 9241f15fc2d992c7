//! Declaration pre-scanning: `var`/function hoisting, lexical (TDZ)
//! pre-declaration, `"use strict"` directive detection and the structural
//! checks that run at function creation time.

use super::{declaration, environment_error};
use crate::{
    ast::{
        node::{ModuleItem, Node},
        Const,
    },
    environment::{BindingKind, Environment},
    value::JsValue,
    Context, JsResult,
};

/// Does the directive prologue of this body enable strict mode?
pub(crate) fn has_strict_directive(items: &[Node]) -> bool {
    for item in items {
        match item {
            Node::Const(Const::String(_)) => {
                if item.is_strict_directive() {
                    return true;
                }
            }
            _ => break,
        }
    }
    false
}

/// Collects the names of every `var`-declared binding in the body,
/// without descending into nested functions or classes.
pub(crate) fn var_declared_names(items: &[Node]) -> Vec<Box<str>> {
    let mut names = Vec::new();
    for item in items {
        collect_var_names(item, &mut names);
    }
    names
}

fn collect_var_names(node: &Node, out: &mut Vec<Box<str>>) {
    match node {
        Node::VarDeclList(list) => {
            for declaration in list.as_ref() {
                out.extend(declaration.bound_names());
            }
        }
        _ => visit_nested_statements(node, &mut |nested| collect_var_names(nested, out)),
    }
}

/// Hoists `var` declarations (as initialized-to-undefined bindings of the
/// variable environment) and top level function declarations (defined
/// eagerly) before a body runs.
pub(crate) fn hoist_declarations(
    items: &[Node],
    variable_environment: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    for name in var_declared_names(items) {
        let already = variable_environment.borrow().has_binding(&name);
        if !already {
            variable_environment
                .borrow_mut()
                .create_binding(
                    name.as_ref().into(),
                    BindingKind::Var,
                    Some(JsValue::undefined()),
                )
                .map_err(|err| environment_error(err, context))?;
        }
    }

    // Function declarations are reachable before their statement runs.
    for item in items {
        if let Node::FunctionDecl(decl) = item {
            declaration::function_decl(decl, context)?;
        }
    }
    Ok(())
}

/// Pre-declares the lexical bindings of a block scope: `let`, `const` and
/// class names go in uninitialized (their temporal dead zone), nested
/// function declarations are defined eagerly.
pub(crate) fn hoist_lexical_declarations(
    items: &[Node],
    environment: &Environment,
    context: &mut Context,
) -> JsResult<()> {
    for item in items {
        let (names, kind) = match item {
            Node::LetDeclList(list) => {
                let mut names = Vec::new();
                for declaration in list.as_ref() {
                    names.extend(declaration.bound_names());
                }
                (names, BindingKind::Let)
            }
            Node::ConstDeclList(list) => {
                let mut names = Vec::new();
                for declaration in list.as_ref() {
                    names.extend(declaration.bound_names());
                }
                (names, BindingKind::Const)
            }
            Node::ClassDecl(class) => match class.name() {
                Some(name) => (vec![name.into()], BindingKind::Let),
                None => continue,
            },
            _ => continue,
        };
        for name in names {
            if context.in_replay() {
                environment
                    .borrow_mut()
                    .create_binding_replay(name.as_ref().into(), kind, None);
            } else {
                let result =
                    environment
                        .borrow_mut()
                        .create_binding(name.as_ref().into(), kind, None);
                result.map_err(|err| environment_error(err, context))?;
            }
        }
    }
    Ok(())
}

/// Structural check used at function creation: does the body contain a
/// `super` reference outside any nested non-arrow function? Such a body
/// cannot be an async function.
pub(crate) fn contains_super(items: &[Node]) -> bool {
    items.iter().any(node_contains_super)
}

fn node_contains_super(node: &Node) -> bool {
    match node {
        Node::SuperCall(_) | Node::GetSuperField(_) => true,
        // Non-arrow nested functions rebind `super`; arrows look through.
        Node::FunctionDecl(_)
        | Node::FunctionExpr(_)
        | Node::GeneratorDecl(_)
        | Node::GeneratorExpr(_)
        | Node::AsyncFunctionDecl(_)
        | Node::AsyncFunctionExpr(_)
        | Node::AsyncGeneratorDecl(_)
        | Node::AsyncGeneratorExpr(_)
        | Node::ClassDecl(_)
        | Node::ClassExpr(_) => false,
        Node::ArrowFunctionDecl(arrow) => contains_super(arrow.body().items()),
        _ => {
            let mut found = false;
            visit_nested_statements(node, &mut |nested| {
                if node_contains_super(nested) {
                    found = true;
                }
            });
            found
        }
    }
}

/// Does a module body contain a top level `await`?
pub(crate) fn module_has_top_level_await(items: &[ModuleItem]) -> bool {
    items.iter().any(|item| match item {
        ModuleItem::Statement(node) => node_contains_await(node),
        ModuleItem::Export(export) => match export {
            crate::ast::node::ExportDecl::Declaration(node)
            | crate::ast::node::ExportDecl::Default(node) => node_contains_await(node),
            _ => false,
        },
        ModuleItem::Import(_) => false,
    })
}

fn node_contains_await(node: &Node) -> bool {
    match node {
        Node::AwaitExpr(_) => true,
        // `await` inside any nested function belongs to that function.
        Node::FunctionDecl(_)
        | Node::FunctionExpr(_)
        | Node::GeneratorDecl(_)
        | Node::GeneratorExpr(_)
        | Node::AsyncFunctionDecl(_)
        | Node::AsyncFunctionExpr(_)
        | Node::AsyncGeneratorDecl(_)
        | Node::AsyncGeneratorExpr(_)
        | Node::ArrowFunctionDecl(_) => false,
        // Expression positions that can hide an `await`.
        Node::BinOp(op) => node_contains_await(op.lhs()) || node_contains_await(op.rhs()),
        Node::UnaryOp(op) => node_contains_await(op.target()),
        Node::Assign(assign) => node_contains_await(assign.rhs()),
        Node::ConditionalOp(op) => {
            node_contains_await(op.cond())
                || node_contains_await(op.if_true())
                || node_contains_await(op.if_false())
        }
        Node::Call(call) => {
            node_contains_await(call.expr()) || call.args().iter().any(node_contains_await)
        }
        Node::New(new) => {
            node_contains_await(new.expr()) || new.args().iter().any(node_contains_await)
        }
        Node::GetConstField(access) => node_contains_await(access.obj()),
        Node::GetField(access) => {
            node_contains_await(access.obj()) || node_contains_await(access.field())
        }
        Node::Spread(spread) => node_contains_await(spread.val()),
        Node::ArrayDecl(array) => array.as_ref().iter().any(node_contains_await),
        Node::TemplateLit(template) => template.elements().iter().any(|element| match element {
            crate::ast::node::TemplateElement::Expr(node) => node_contains_await(node),
            crate::ast::node::TemplateElement::String(_) => false,
        }),
        Node::Object(object) => object.properties().iter().any(|property| match property {
            crate::ast::node::PropertyDefinition::Property(_, value) => {
                node_contains_await(value)
            }
            crate::ast::node::PropertyDefinition::SpreadObject(value) => {
                node_contains_await(value)
            }
            _ => false,
        }),
        Node::Return(ret) => ret.expr().map(node_contains_await).unwrap_or(false),
        Node::Throw(throw) => node_contains_await(throw.expr()),
        Node::If(if_smt) => {
            node_contains_await(if_smt.cond())
                || node_contains_await(if_smt.body())
                || if_smt.else_node().map(node_contains_await).unwrap_or(false)
        }
        Node::WhileLoop(while_loop) => {
            node_contains_await(while_loop.cond()) || node_contains_await(while_loop.body())
        }
        Node::DoWhileLoop(do_while) => {
            node_contains_await(do_while.cond()) || node_contains_await(do_while.body())
        }
        Node::ForLoop(for_loop) => {
            for_loop.init().map(node_contains_await).unwrap_or(false)
                || for_loop.condition().map(node_contains_await).unwrap_or(false)
                || for_loop.final_expr().map(node_contains_await).unwrap_or(false)
                || node_contains_await(for_loop.body())
        }
        Node::ForInLoop(for_in) => {
            node_contains_await(for_in.expr()) || node_contains_await(for_in.body())
        }
        Node::ForOfLoop(for_of) => {
            node_contains_await(for_of.iterable()) || node_contains_await(for_of.body())
        }
        Node::VarDeclList(list) => declaration_list_contains_await(list.as_ref()),
        Node::LetDeclList(list) => declaration_list_contains_await(list.as_ref()),
        Node::ConstDeclList(list) => declaration_list_contains_await(list.as_ref()),
        _ => {
            let mut found = false;
            visit_nested_statements(node, &mut |nested| {
                if node_contains_await(nested) {
                    found = true;
                }
            });
            found
        }
    }
}

fn declaration_list_contains_await(declarations: &[crate::ast::node::Declaration]) -> bool {
    declarations
        .iter()
        .any(|declaration| declaration.init().map(node_contains_await).unwrap_or(false))
}

/// Visits the directly nested statements and expressions of a node,
/// without entering function or class bodies. This is the traversal shared
/// by the hoisting scans.
fn visit_nested_statements<F>(node: &Node, visit: &mut F)
where
    F: FnMut(&Node),
{
    match node {
        Node::Block(block) => {
            for item in block.items() {
                visit(item);
            }
        }
        Node::If(if_smt) => {
            visit(if_smt.body());
            if let Some(else_node) = if_smt.else_node() {
                visit(else_node);
            }
        }
        Node::WhileLoop(while_loop) => visit(while_loop.body()),
        Node::DoWhileLoop(do_while) => visit(do_while.body()),
        Node::ForLoop(for_loop) => {
            if let Some(init) = for_loop.init() {
                visit(init);
            }
            visit(for_loop.body());
        }
        Node::ForInLoop(for_in) => {
            visit(for_in.variable());
            visit(for_in.body());
        }
        Node::ForOfLoop(for_of) => {
            visit(for_of.variable());
            visit(for_of.body());
        }
        Node::Switch(switch) => {
            for case in switch.cases() {
                for item in case.body().items() {
                    visit(item);
                }
            }
            if let Some(default) = switch.default() {
                for item in default.items() {
                    visit(item);
                }
            }
        }
        Node::Try(try_node) => {
            for item in try_node.block().items() {
                visit(item);
            }
            if let Some(catch) = try_node.catch() {
                for item in catch.block().items() {
                    visit(item);
                }
            }
            if let Some(finally) = try_node.finally() {
                for item in finally.block().items() {
                    visit(item);
                }
            }
        }
        Node::Labelled(labelled) => visit(labelled.stmt()),
        Node::With(with) => visit(with.stmt()),
        _ => {}
    }
}
