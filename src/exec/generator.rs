//! Evaluation of `yield` and `yield*`, and the loop continuation record
//! the iteration module saves for suspended loops.

use super::Flow;
use crate::{
    ast::node::Yield,
    builtins::{
        generator::ResumeKind,
        iterable::{get_iterator, IteratorRecord},
    },
    environment::Environment,
    exec::Executable,
    gc::{Finalize, Trace},
    string::JsString,
    value::JsValue,
    Context, JsResult,
};

/// The state a loop saves so a generator resumption can re-enter the
/// interrupted iteration instead of replaying completed ones.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct LoopContinuation {
    /// The scope of the interrupted iteration.
    pub(crate) environment: Environment,
    /// The live iterator of a suspended `for-of`.
    pub(crate) iterator: Option<IteratorRecord>,
    /// The key list and cursor of a suspended `for-in`.
    pub(crate) keys: Option<(Vec<JsString>, usize)>,
}

impl LoopContinuation {
    pub(crate) fn new(
        environment: Environment,
        iterator: Option<IteratorRecord>,
        keys: Option<(Vec<JsString>, usize)>,
    ) -> Self {
        Self {
            environment,
            iterator,
            keys,
        }
    }
}

pub(super) fn yield_expression(node: &Yield, context: &mut Context) -> JsResult<JsValue> {
    let handle = match context.generator() {
        Some(handle) => handle,
        None => {
            return context.throw_syntax_error("yield is only valid inside a generator body")
        }
    };
    let key = node as *const Yield as usize;

    if node.delegate() {
        return yield_delegate(node, key, handle, context);
    }

    // Replay: completed yields answer from the cache, the recorded
    // suspension point consumes the resume input and switches execution
    // live again.
    let replay = {
        let generator = handle.borrow();
        if generator.replaying {
            if generator.last_yield == Some(key) {
                Some(ReplayAction::Resume)
            } else {
                generator
                    .yield_results
                    .get(&key)
                    .cloned()
                    .map(ReplayAction::Cached)
            }
        } else {
            None
        }
    };

    match replay {
        Some(ReplayAction::Cached(value)) => Ok(value),
        Some(ReplayAction::Resume) => {
            let (kind, value) = {
                let mut generator = handle.borrow_mut();
                generator.replaying = false;
                let value = generator.resume_value.take().unwrap_or_default();
                let kind = generator.resume_kind;
                if kind == ResumeKind::Next {
                    generator.yield_results.insert(key, value.clone());
                }
                (kind, value)
            };
            match kind {
                ResumeKind::Next => Ok(value),
                ResumeKind::Throw => Err(Flow::Throw(value)),
                ResumeKind::Return => Err(Flow::Return(value)),
            }
        }
        None => {
            // A fresh yield: evaluate the operand, record the suspension
            // point, unwind.
            let value = match node.expr() {
                Some(expr) => expr.run(context)?,
                None => JsValue::undefined(),
            };
            handle.borrow_mut().last_yield = Some(key);
            Err(Flow::Yield(value))
        }
    }
}

enum ReplayAction {
    Cached(JsValue),
    Resume,
}

/// `yield*`: delegate every step to the inner iterator; the outer
/// generator suspends once per delegated value and resumes the delegate
/// with the input it was resumed with.
fn yield_delegate(
    node: &Yield,
    key: usize,
    handle: crate::gc::Gc<crate::gc::Cell<crate::builtins::generator::GeneratorContext>>,
    context: &mut Context,
) -> JsResult<JsValue> {
    // A completed delegation replays from the cache like a plain yield.
    let (resuming, cached) = {
        let generator = handle.borrow();
        let resuming = generator.replaying && generator.last_yield == Some(key);
        let cached = if generator.replaying && !resuming {
            generator.yield_results.get(&key).cloned()
        } else {
            None
        };
        (resuming, cached)
    };
    if let Some(value) = cached {
        return Ok(value);
    }

    let iterator = {
        let existing = handle.borrow().delegates.get(&key).cloned();
        match existing {
            Some(iterator) => iterator,
            None => {
                let iterable = match node.expr() {
                    Some(expr) => expr.run(context)?,
                    None => JsValue::undefined(),
                };
                let iterator = get_iterator(&iterable, context)?;
                handle
                    .borrow_mut()
                    .delegates
                    .insert(key, iterator.clone());
                iterator
            }
        }
    };

    let input = if resuming {
        let mut generator = handle.borrow_mut();
        generator.replaying = false;
        let value = generator.resume_value.take().unwrap_or_default();
        let kind = generator.resume_kind;
        drop(generator);
        match kind {
            ResumeKind::Next => Some(value),
            // Resuming the delegation abruptly forwards the completion to
            // the outer generator after dropping the delegate.
            ResumeKind::Throw => {
                handle.borrow_mut().delegates.remove(&key);
                return Err(Flow::Throw(value));
            }
            ResumeKind::Return => {
                handle.borrow_mut().delegates.remove(&key);
                return Err(Flow::Return(value));
            }
        }
    } else {
        None
    };

    let next = iterator.next(input, context)?;
    if next.done {
        let mut generator = handle.borrow_mut();
        generator.delegates.remove(&key);
        generator.yield_results.insert(key, next.value.clone());
        return Ok(next.value);
    }

    handle.borrow_mut().last_yield = Some(key);
    Err(Flow::Yield(next.value))
}
