//! Statement execution: blocks, conditionals, switch, try/catch/finally,
//! labels and `with`.

use super::{declaration, hoisting, iteration, Executable, Flow};
use crate::{
    ast::node::{Block, If, Labelled, Node, Switch, Try, With},
    environment::{new_declarative_environment, new_object_environment},
    value::JsValue,
    Context, JsResult, Profiler,
};

pub(super) fn block(block: &Block, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Block", "exec");

    let outer = context.lexical_environment();
    let scope = new_declarative_environment(Some(outer.clone()));
    context.set_lexical_environment(scope.clone());

    let result = (|| {
        hoisting::hoist_lexical_declarations(block.items(), &scope, context)?;
        block.statements().run(context)
    })();

    context.set_lexical_environment(outer);
    result
}

pub(super) fn if_statement(if_smt: &If, context: &mut Context) -> JsResult<JsValue> {
    Ok(if if_smt.cond().run(context)?.to_boolean() {
        if_smt.body().run(context)?
    } else if let Some(else_node) = if_smt.else_node() {
        else_node.run(context)?
    } else {
        JsValue::undefined()
    })
}

pub(super) fn switch(switch: &Switch, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Switch", "exec");
    let value = switch.val().run(context)?;

    let outer = context.lexical_environment();
    let scope = new_declarative_environment(Some(outer.clone()));
    context.set_lexical_environment(scope);

    let result = (|| {
        let mut result = JsValue::undefined();
        let mut fell_through = false;

        for case in switch.cases() {
            if !fell_through {
                let condition = case.condition().run(context)?;
                if !value.strict_equals(&condition) {
                    continue;
                }
                fell_through = true;
            }
            match case.body().run(context) {
                Ok(value) => result = value,
                Err(Flow::Break(None)) => return Ok(result),
                Err(flow) => return Err(flow),
            }
        }

        if let Some(default) = switch.default() {
            match default.run(context) {
                Ok(value) => result = value,
                Err(Flow::Break(None)) => return Ok(result),
                Err(flow) => return Err(flow),
            }
        }
        Ok(result)
    })();

    context.set_lexical_environment(outer);
    result
}

pub(super) fn labelled(labelled: &Labelled, context: &mut Context) -> JsResult<JsValue> {
    let label = labelled.label();
    let result = match labelled.stmt() {
        // Loops consume their own label so that `continue label` works.
        Node::WhileLoop(while_loop) => iteration::while_loop(while_loop, Some(label), context),
        Node::DoWhileLoop(do_while) => iteration::do_while_loop(do_while, Some(label), context),
        Node::ForLoop(for_loop) => iteration::for_loop(for_loop, Some(label), context),
        Node::ForInLoop(for_in) => iteration::for_in_loop(for_in, Some(label), context),
        Node::ForOfLoop(for_of) => iteration::for_of_loop(for_of, Some(label), context),
        stmt => stmt.run(context),
    };

    match result {
        Err(Flow::Break(Some(ref break_label))) if break_label == label => {
            Ok(JsValue::undefined())
        }
        other => other,
    }
}

pub(super) fn try_statement(try_node: &Try, context: &mut Context) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("Try", "exec");

    let result = block(try_node.block(), context);

    let result = match result {
        Err(Flow::Throw(error)) => {
            if let Some(catch) = try_node.catch() {
                let outer = context.lexical_environment();
                let scope = new_declarative_environment(Some(outer.clone()));
                context.set_lexical_environment(scope.clone());

                let catch_result = (|| {
                    if let Some(parameter) = catch.parameter() {
                        declaration::bind_declaration(
                            parameter,
                            error,
                            crate::environment::BindingKind::Let,
                            &scope,
                            context,
                        )?;
                    }
                    catch.block().statements().run(context)
                })();

                context.set_lexical_environment(outer);
                catch_result
            } else {
                Err(Flow::Throw(error))
            }
        }
        other => other,
    };

    // `finally` runs for every completion kind, including suspensions and
    // flow signals passing through; its own abrupt completion wins.
    if let Some(finally) = try_node.finally() {
        block(finally.block(), context)?;
    }

    result
}

pub(super) fn with_statement(with: &With, context: &mut Context) -> JsResult<JsValue> {
    if context.strict() {
        return context.throw_syntax_error("'with' statements are not allowed in strict mode");
    }

    let expr = with.expr().run(context)?;
    let object = expr.to_object(context)?;

    let outer = context.lexical_environment();
    let scope = new_object_environment(object, Some(outer.clone()));
    context.set_lexical_environment(scope);

    let result = with.stmt().run(context);

    context.set_lexical_environment(outer);
    result
}
