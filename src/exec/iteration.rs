//! Loop execution.
//!
//! Inside a suspended generator, loops do not replay completed iterations:
//! each loop registers a continuation (its scope, plus the live iterator
//! for `for-of`/`for-in`) keyed by the loop node's identity, and a
//! resuming pass re-enters the interrupted iteration directly.

use super::{declaration, Executable, Flow};
use crate::{
    ast::node::{DoWhileLoop, ForInLoop, ForLoop, ForOfLoop, WhileLoop},
    builtins::iterable::get_iterator,
    environment::{new_declarative_environment, Environment},
    exec::generator::LoopContinuation,
    string::JsString,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// What the loop should do after a body completion.
enum BodyDisposition {
    Normal(JsValue),
    Break,
    Continue,
}

/// Routes a body completion: consumes break/continue signals that target
/// this loop, propagates everything else.
fn handle_body_result(
    result: JsResult<JsValue>,
    label: Option<&str>,
) -> JsResult<BodyDisposition> {
    match result {
        Ok(value) => Ok(BodyDisposition::Normal(value)),
        Err(Flow::Break(ref break_label))
            if Flow::matches_loop_label(break_label.as_deref(), label) =>
        {
            Ok(BodyDisposition::Break)
        }
        Err(Flow::Continue(ref continue_label))
            if Flow::matches_loop_label(continue_label.as_deref(), label) =>
        {
            Ok(BodyDisposition::Continue)
        }
        Err(flow) => Err(flow),
    }
}

/// Fetches the loop continuation saved for `key` when the evaluator is
/// replaying towards a suspension point inside this loop.
fn saved_continuation(key: usize, context: &mut Context) -> Option<LoopContinuation> {
    if !context.in_replay() {
        return None;
    }
    let generator = context.generator()?;
    let continuation = generator.borrow().loop_continuation(key);
    continuation
}

fn register_continuation(key: usize, continuation: LoopContinuation, context: &mut Context) {
    if let Some(generator) = context.generator() {
        generator.borrow_mut().set_loop_continuation(key, continuation);
    }
}

fn clear_continuation(key: usize, context: &mut Context) {
    if let Some(generator) = context.generator() {
        generator.borrow_mut().clear_loop_continuation(key);
    }
}

pub(super) fn for_loop(
    for_loop: &ForLoop,
    label: Option<&str>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("ForLoop", "exec");
    let key = for_loop as *const _ as usize;

    let outer = context.lexical_environment();
    let resumed = saved_continuation(key, context);
    let mut skip_condition_once = resumed.is_some();

    let scope = match resumed {
        // Re-enter the scope of the interrupted iteration; the init
        // already ran in the original pass.
        Some(continuation) => continuation.environment.clone(),
        None => {
            let scope = new_declarative_environment(Some(outer.clone()));
            context.set_lexical_environment(scope.clone());
            if let Some(init) = for_loop.init() {
                if let Err(flow) = init.run(context) {
                    context.set_lexical_environment(outer);
                    return Err(flow);
                }
            }
            scope
        }
    };
    context.set_lexical_environment(scope.clone());

    let result = (|| {
        loop {
            if !skip_condition_once {
                let keep_going = match for_loop.condition() {
                    Some(condition) => condition.run(context)?.to_boolean(),
                    None => true,
                };
                if !keep_going {
                    break;
                }
            }
            skip_condition_once = false;

            register_continuation(
                key,
                LoopContinuation::new(scope.clone(), None, None),
                context,
            );

            match handle_body_result(for_loop.body().run(context), label)? {
                BodyDisposition::Break => break,
                BodyDisposition::Normal(_) | BodyDisposition::Continue => {}
            }

            if let Some(final_expr) = for_loop.final_expr() {
                final_expr.run(context)?;
            }
        }
        Ok(JsValue::undefined())
    })();

    if !matches!(result, Err(Flow::Yield(_))) {
        clear_continuation(key, context);
    }
    context.set_lexical_environment(outer);
    result
}

pub(super) fn while_loop(
    while_loop: &WhileLoop,
    label: Option<&str>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let key = while_loop as *const _ as usize;
    let mut skip_condition_once = saved_continuation(key, context).is_some();

    let result = (|| {
        let mut result = JsValue::undefined();
        loop {
            if !skip_condition_once && !while_loop.cond().run(context)?.to_boolean() {
                break;
            }
            skip_condition_once = false;

            register_continuation(
                key,
                LoopContinuation::new(context.lexical_environment(), None, None),
                context,
            );

            match handle_body_result(while_loop.body().run(context), label)? {
                BodyDisposition::Break => break,
                BodyDisposition::Normal(value) => result = value,
                BodyDisposition::Continue => {}
            }
        }
        Ok(result)
    })();

    if !matches!(result, Err(Flow::Yield(_))) {
        clear_continuation(key, context);
    }
    result
}

pub(super) fn do_while_loop(
    do_while: &DoWhileLoop,
    label: Option<&str>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let key = do_while as *const _ as usize;
    // A do-while resumes exactly like a while: straight into the body.
    let _resumed = saved_continuation(key, context).is_some();

    let result = (|| {
        let mut result = JsValue::undefined();
        loop {
            register_continuation(
                key,
                LoopContinuation::new(context.lexical_environment(), None, None),
                context,
            );

            match handle_body_result(do_while.body().run(context), label)? {
                BodyDisposition::Break => break,
                BodyDisposition::Normal(value) => result = value,
                BodyDisposition::Continue => {}
            }

            if !do_while.cond().run(context)?.to_boolean() {
                break;
            }
        }
        Ok(result)
    })();

    if !matches!(result, Err(Flow::Yield(_))) {
        clear_continuation(key, context);
    }
    result
}

pub(super) fn for_of_loop(
    for_of: &ForOfLoop,
    label: Option<&str>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("ForOf", "exec");
    let key = for_of as *const _ as usize;
    let outer = context.lexical_environment();

    let resumed = saved_continuation(key, context);
    let mut replay_iteration = None;
    let iterator = match resumed {
        Some(continuation) => {
            replay_iteration = Some(continuation.environment.clone());
            continuation
                .iterator.clone()
                .expect("for-of continuation always saves its iterator")
        }
        None => {
            let iterable = for_of.iterable().run(context)?;
            get_iterator(&iterable, context)?
        }
    };

    let result = (|| {
        let mut result = JsValue::undefined();
        loop {
            let scope: Environment;
            if let Some(saved_scope) = replay_iteration.take() {
                // Replay the interrupted iteration body in its own scope;
                // the loop variable is already bound there.
                scope = saved_scope;
                context.set_lexical_environment(scope.clone());
            } else {
                let next = iterator.next(None, context)?;
                if next.done {
                    break;
                }
                scope = new_declarative_environment(Some(outer.clone()));
                context.set_lexical_environment(scope.clone());
                declaration::bind_for_loop_variable(
                    for_of.variable(),
                    next.value,
                    &scope,
                    context,
                )?;
            }

            register_continuation(
                key,
                LoopContinuation::new(scope.clone(), Some(iterator.clone()), None),
                context,
            );

            match handle_body_result(for_of.body().run(context), label)? {
                BodyDisposition::Break => break,
                BodyDisposition::Normal(value) => result = value,
                BodyDisposition::Continue => {}
            }
            context.set_lexical_environment(outer.clone());
        }
        Ok(result)
    })();

    if !matches!(result, Err(Flow::Yield(_))) {
        clear_continuation(key, context);
    }
    context.set_lexical_environment(outer);
    result
}

pub(super) fn for_in_loop(
    for_in: &ForInLoop,
    label: Option<&str>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("ForIn", "exec");
    let key = for_in as *const _ as usize;
    let outer = context.lexical_environment();

    let resumed = saved_continuation(key, context);
    let mut replay_iteration = None;
    let (keys, mut position) = match resumed {
        Some(continuation) => {
            replay_iteration = Some(continuation.environment.clone());
            continuation
                .keys.clone()
                .expect("for-in continuation always saves its key list")
        }
        None => {
            let target = for_in.expr().run(context)?;
            if target.is_null_or_undefined() {
                // Enumerating nothing is a no-op, not an error.
                return Ok(JsValue::undefined());
            }
            (enumerate_keys(&target, context)?, 0)
        }
    };

    let result = (|| {
        let mut result = JsValue::undefined();
        loop {
            let scope: Environment;
            if let Some(saved_scope) = replay_iteration.take() {
                scope = saved_scope;
                context.set_lexical_environment(scope.clone());
            } else {
                let key_value = match keys.get(position) {
                    Some(key) => JsValue::string(key.clone()),
                    None => break,
                };
                position += 1;
                scope = new_declarative_environment(Some(outer.clone()));
                context.set_lexical_environment(scope.clone());
                declaration::bind_for_loop_variable(
                    for_in.variable(),
                    key_value,
                    &scope,
                    context,
                )?;
            }

            register_continuation(
                key,
                LoopContinuation::new(scope.clone(), None, Some((keys.clone(), position))),
                context,
            );

            match handle_body_result(for_in.body().run(context), label)? {
                BodyDisposition::Break => break,
                BodyDisposition::Normal(value) => result = value,
                BodyDisposition::Continue => {}
            }
            context.set_lexical_environment(outer.clone());
        }
        Ok(result)
    })();

    if !matches!(result, Err(Flow::Yield(_))) {
        clear_continuation(key, context);
    }
    context.set_lexical_environment(outer);
    result
}

/// Collects the `for-in` key sequence: enumerable string keys of the
/// object and its prototype chain, shadowed names visited once, integer
/// keys ascending before string keys in insertion order per level.
fn enumerate_keys(target: &JsValue, context: &mut Context) -> JsResult<Vec<JsString>> {
    use crate::property::PropertyKey;
    use rustc_hash::FxHashSet;

    let mut keys = Vec::new();
    let mut visited: FxHashSet<JsString> = FxHashSet::default();
    let mut current = target.to_object(context)?;

    loop {
        for key in current.clone().own_property_keys(context)? {
            let name = match key {
                PropertyKey::Symbol(_) => continue,
                ref other => other
                    .as_js_string()
                    .expect("non-symbol keys have a string form"),
            };
            if visited.contains(&name) {
                continue;
            }
            visited.insert(name.clone());
            let enumerable = current
                .get_own_property(&key, context)?
                .map(|descriptor| descriptor.enumerable())
                .unwrap_or(false);
            if enumerable {
                keys.push(name);
            }
        }
        let parent = current.get_prototype_of(context)?;
        match parent.as_object() {
            Some(parent) => current = parent.clone(),
            None => break,
        }
    }
    Ok(keys)
}
