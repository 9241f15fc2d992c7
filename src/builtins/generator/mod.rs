//! Generator objects and their resumption engine.
//!
//! A generator call binds its parameters eagerly (so dead-zone errors
//! surface at call time) but does not run the body. Resumption re-executes
//! the body from the top: completed `yield`s answer from a cache keyed by
//! the yield node's identity, loops continue from their saved
//! continuation, and execution becomes live again at the recorded
//! suspension point.

use crate::{
    ast::node::RcStatementList,
    builtins::{
        function::{make_builtin_fn, OrdinaryFunction},
        iterable::{create_iter_result_object, IteratorRecord},
    },
    environment::Environment,
    exec::{generator::LoopContinuation, Executable, Flow},
    gc::{Cell, Finalize, Gc, Trace},
    object::{JsObject, Object, ObjectData, PROTOTYPE},
    value::JsValue,
    Context, JsResult, Profiler,
};
use rustc_hash::FxHashMap;

/// The lifecycle of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum GeneratorState {
    SuspendedStart,
    SuspendedYield,
    Running,
    Completed,
}

// Safety: plain enum.
unsafe impl Trace for GeneratorState {
    crate::gc::empty_trace!();
}

/// How a suspended generator is being resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeKind {
    Next,
    Throw,
    Return,
}

/// The saved execution state of a generator between resumptions.
#[derive(Debug, Trace, Finalize)]
pub struct GeneratorContext {
    pub(crate) body: RcStatementList,
    /// The body environment with parameters already bound; retained across
    /// suspensions together with everything it closes over.
    pub(crate) environment: Environment,
    pub(crate) strict: bool,
    pub(crate) state: GeneratorState,
    pub(crate) is_async: bool,

    // Replay machinery.
    pub(crate) replaying: bool,
    /// The yield node identity the generator is suspended on.
    pub(crate) last_yield: Option<usize>,
    /// Resume input for the pending resumption.
    pub(crate) resume_value: Option<JsValue>,
    #[unsafe_ignore_trace]
    pub(crate) resume_kind: ResumeKind,
    /// Completed yields: node identity to the value the yield expression
    /// produced. Replays answer from here without re-evaluating operands.
    pub(crate) yield_results: FxHashMap<usize, JsValue>,
    /// Loops suspended mid-iteration, keyed by loop node identity.
    pub(crate) loop_continuations: FxHashMap<usize, LoopContinuation>,
    /// Active `yield*` delegates, keyed by the yield node identity.
    pub(crate) delegates: FxHashMap<usize, IteratorRecord>,
}

impl GeneratorContext {
    pub(crate) fn loop_continuation(&self, key: usize) -> Option<LoopContinuation> {
        self.loop_continuations.get(&key).cloned()
    }

    pub(crate) fn set_loop_continuation(&mut self, key: usize, continuation: LoopContinuation) {
        self.loop_continuations.insert(key, continuation);
    }

    pub(crate) fn clear_loop_continuation(&mut self, key: usize) {
        self.loop_continuations.remove(&key);
    }
}

/// Creates the generator object for a generator function call.
pub(crate) fn create_generator(
    function_object: &JsObject,
    function: &OrdinaryFunction,
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("create_generator", "generator");

    // Parameter binding is eager: dead zone and destructuring errors
    // surface here, not at the first `next`.
    let environment = crate::builtins::function::prepare_call_environment(
        function,
        this,
        args,
        &JsValue::undefined(),
        context,
    )?;

    let generator_context = GeneratorContext {
        body: function.body.clone(),
        environment,
        strict: function.flags.is_strict(),
        state: GeneratorState::SuspendedStart,
        is_async: function.kind == crate::builtins::function::FunctionKind::AsyncGenerator,
        replaying: false,
        last_yield: None,
        resume_value: None,
        resume_kind: ResumeKind::Next,
        yield_results: FxHashMap::default(),
        loop_continuations: FxHashMap::default(),
        delegates: FxHashMap::default(),
    };

    let prototype = JsValue::from(function_object.clone())
        .get_field(PROTOTYPE, context)?;
    let prototype = if prototype.is_object() {
        prototype
    } else {
        context
            .standard_objects()
            .iterator_prototypes()
            .generator()
            .into()
    };

    let mut object = Object::create(prototype);
    object.data = ObjectData::Generator(Gc::new(Cell::new(generator_context)));
    Ok(JsValue::object(object))
}

fn generator_handle(
    this: &JsValue,
    context: &mut Context,
) -> JsResult<Gc<Cell<GeneratorContext>>> {
    match this.as_object() {
        Some(object) => {
            let handle = match object.borrow().data {
                ObjectData::Generator(ref generator) => Some(generator.clone()),
                _ => None,
            };
            match handle {
                Some(handle) => Ok(handle),
                None => context.throw_type_error("not a generator"),
            }
        }
        None => context.throw_type_error("not a generator"),
    }
}

/// Resumes a generator; the heart of `next`, `return` and `throw`.
pub(crate) fn resume(
    handle: &Gc<Cell<GeneratorContext>>,
    kind: ResumeKind,
    value: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let (state, environment, body, strict) = {
        let generator = handle.borrow();
        (
            generator.state,
            generator.environment.clone(),
            generator.body.clone(),
            generator.strict,
        )
    };

    match state {
        GeneratorState::Running => {
            return context.throw_type_error("generator is already running")
        }
        GeneratorState::Completed => {
            return match kind {
                ResumeKind::Throw => Err(Flow::Throw(value)),
                ResumeKind::Return => Ok(create_iter_result_object(value, true, context)),
                ResumeKind::Next => {
                    Ok(create_iter_result_object(JsValue::undefined(), true, context))
                }
            }
        }
        GeneratorState::SuspendedStart => match kind {
            ResumeKind::Return => {
                handle.borrow_mut().state = GeneratorState::Completed;
                return Ok(create_iter_result_object(value, true, context));
            }
            ResumeKind::Throw => {
                handle.borrow_mut().state = GeneratorState::Completed;
                return Err(Flow::Throw(value));
            }
            ResumeKind::Next => {
                let mut generator = handle.borrow_mut();
                generator.state = GeneratorState::Running;
                generator.replaying = false;
                generator.resume_value = None;
                generator.resume_kind = ResumeKind::Next;
            }
        },
        GeneratorState::SuspendedYield => {
            let mut generator = handle.borrow_mut();
            generator.state = GeneratorState::Running;
            generator.replaying = true;
            generator.resume_value = Some(value);
            generator.resume_kind = kind;
        }
    }

    context.push_execution_context(environment.clone(), environment.clone(), strict);
    context.set_frame_generator(handle.clone());
    let result = (|| {
        crate::exec::hoisting::hoist_declarations(body.items(), &environment, context)?;
        crate::exec::hoisting::hoist_lexical_declarations(body.items(), &environment, context)?;
        body.run(context)
    })();
    context.pop_execution_context();

    match result {
        Ok(_) => {
            handle.borrow_mut().state = GeneratorState::Completed;
            Ok(create_iter_result_object(JsValue::undefined(), true, context))
        }
        Err(Flow::Return(value)) => {
            handle.borrow_mut().state = GeneratorState::Completed;
            Ok(create_iter_result_object(value, true, context))
        }
        Err(Flow::Yield(value)) => {
            handle.borrow_mut().state = GeneratorState::SuspendedYield;
            Ok(create_iter_result_object(value, false, context))
        }
        Err(Flow::Throw(error)) => {
            handle.borrow_mut().state = GeneratorState::Completed;
            Err(Flow::Throw(error))
        }
        Err(flow) => {
            // Break/continue/await escaping a generator body is an engine
            // bug.
            handle.borrow_mut().state = GeneratorState::Completed;
            Err(flow)
        }
    }
}

/// `Generator.prototype.next(value)`.
fn next(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = generator_handle(this, context)?;
    let value = args.first().cloned().unwrap_or_default();
    let is_async = handle.borrow().is_async;
    let result = resume(&handle, ResumeKind::Next, value, context);
    wrap_async_result(result, is_async, context)
}

/// `Generator.prototype.return(value)`.
fn r#return(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = generator_handle(this, context)?;
    let value = args.first().cloned().unwrap_or_default();
    let is_async = handle.borrow().is_async;
    let result = resume(&handle, ResumeKind::Return, value, context);
    wrap_async_result(result, is_async, context)
}

/// `Generator.prototype.throw(error)`.
fn throw(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let handle = generator_handle(this, context)?;
    let value = args.first().cloned().unwrap_or_default();
    let is_async = handle.borrow().is_async;
    let result = resume(&handle, ResumeKind::Throw, value, context);
    wrap_async_result(result, is_async, context)
}

/// Async generators hand their step results to the consumer as promises.
fn wrap_async_result(
    result: JsResult<JsValue>,
    is_async: bool,
    context: &mut Context,
) -> JsResult<JsValue> {
    if !is_async {
        return result;
    }
    match result {
        Ok(value) => crate::builtins::promise::promise_resolved_with(value, context),
        Err(Flow::Throw(error)) => crate::builtins::promise::promise_rejected_with(error, context),
        Err(flow) => Err(flow),
    }
}

/// Builds `%Generator.prototype%` on top of `%IteratorPrototype%`.
pub(crate) fn create_generator_prototype(
    iterator_prototype: &JsObject,
    context: &mut Context,
) -> JsObject {
    let prototype = JsObject::new(Object::create(iterator_prototype.clone().into()));
    make_builtin_fn(next, "next", &prototype, 1, context);
    make_builtin_fn(r#return, "return", &prototype, 1, context);
    make_builtin_fn(throw, "throw", &prototype, 1, context);
    prototype
}
