//! The single-threaded cooperative scheduler: promise reaction microjobs,
//! suspendable async tasks and the `await` expression.
//!
//! An async function call creates a promise and parks a task carrying its
//! continuation: the body, the environment with bound parameters, the
//! resolve/reject handles and the ordered list of settled await results.
//! Each resumption re-executes the body from the top; awaits whose results
//! are already in the list complete instantly (without re-evaluating their
//! operand), and execution goes live again at the frontier.

use crate::{
    ast::node::{AwaitExpr, RcStatementList},
    builtins::{
        function::{self, OrdinaryFunction},
        promise::{self, PromiseState},
    },
    environment::Environment,
    exec::{Executable, Flow},
    gc::{Cell, Finalize, Gc, Trace},
    object::{JsObject, ObjectData},
    value::JsValue,
    Context, JsResult, Profiler,
};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A queued microjob: promise reactions and thenable resolution steps.
pub struct NativeJob(Box<dyn FnOnce(&mut Context) -> JsResult<()>>);

impl NativeJob {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Context) -> JsResult<()> + 'static,
    {
        Self(Box::new(f))
    }

    pub(crate) fn call(self, context: &mut Context) -> JsResult<()> {
        (self.0)(context)
    }
}

impl std::fmt::Debug for NativeJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NativeJob")
    }
}

/// A handle to a suspendable async task.
pub type TaskHandle = Gc<Cell<AsyncTask>>;

/// The saved continuation of an async function (or a module with top
/// level await).
#[derive(Debug, Trace, Finalize)]
pub struct AsyncTask {
    pub(crate) body: RcStatementList,
    /// The environment with parameters bound, retained across
    /// suspensions.
    pub(crate) environment: Environment,
    pub(crate) strict: bool,
    pub(crate) resolve: JsObject,
    pub(crate) reject: JsObject,
    pub(crate) promise: JsObject,

    /// Settled await results in completion order. `Ok` fulfills the
    /// awaiting expression, `Err` rethrows at it.
    pub(crate) results: Vec<AwaitResult>,
    /// How many results the current execution pass has consumed. While
    /// `cursor < results.len()` the pass is a replay.
    #[unsafe_ignore_trace]
    pub(crate) cursor: usize,
    /// Objects already produced by `new` expressions, keyed by
    /// (node identity, occurrence index within one pass) so replays reuse
    /// them instead of constructing twice.
    pub(crate) news: FxHashMap<(usize, u32), JsValue>,
    #[unsafe_ignore_trace]
    pub(crate) new_counts: FxHashMap<usize, u32>,
    #[unsafe_ignore_trace]
    pub(crate) done: bool,
}

/// One settled await.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum AwaitResult {
    Fulfilled(JsValue),
    Rejected(JsValue),
}

impl AsyncTask {
    /// Whether the current pass is still replaying towards the frontier.
    pub(crate) fn is_replaying(&self) -> bool {
        self.cursor < self.results.len()
    }
}

/// The job and task queues of a context.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    pub(crate) jobs: VecDeque<NativeJob>,
    pub(crate) ready_tasks: VecDeque<TaskHandle>,
}

/// `[[Call]]` of an async function: park a task, hand back its promise.
pub(crate) fn call_async_function(
    _function_object: &JsObject,
    function: &OrdinaryFunction,
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let _timer = Profiler::global().start_event("call_async_function", "job");

    // Parameter binding failures reject the promise rather than throwing
    // synchronously.
    let environment = match function::prepare_call_environment(
        function,
        this,
        args,
        &JsValue::undefined(),
        context,
    ) {
        Ok(environment) => environment,
        Err(Flow::Throw(error)) => {
            return promise::promise_rejected_with(error, context);
        }
        Err(flow) => return Err(flow),
    };

    let capability = promise::new_promise_capability(context)?;
    let task = Gc::new(Cell::new(AsyncTask {
        body: function.body.clone(),
        environment,
        strict: function.flags.is_strict(),
        resolve: capability.resolve.clone(),
        reject: capability.reject.clone(),
        promise: capability.promise.clone(),
        results: Vec::new(),
        cursor: 0,
        news: FxHashMap::default(),
        new_counts: FxHashMap::default(),
        done: false,
    }));

    context.scheduler_mut().ready_tasks.push_back(task);
    Ok(capability.promise.clone().into())
}

/// Spawns a task for a module body with top level await, returning the
/// promise that settles when evaluation finishes.
pub(crate) fn spawn_module_task(
    body: RcStatementList,
    environment: Environment,
    context: &mut Context,
) -> JsResult<JsObject> {
    let capability = promise::new_promise_capability(context)?;
    let task = Gc::new(Cell::new(AsyncTask {
        body,
        environment,
        strict: true,
        resolve: capability.resolve.clone(),
        reject: capability.reject.clone(),
        promise: capability.promise.clone(),
        results: Vec::new(),
        cursor: 0,
        news: FxHashMap::default(),
        new_counts: FxHashMap::default(),
        done: false,
    }));
    context.scheduler_mut().ready_tasks.push_back(task);
    Ok(capability.promise.clone())
}

/// Drains the microjob queue and resumes ready tasks until both queues are
/// empty. Resumed tasks run in the order their promises settled.
pub(crate) fn run_pending_tasks(context: &mut Context) -> JsResult<()> {
    loop {
        // Microjobs first: promise reactions fire before task turns.
        while let Some(job) = context.scheduler_mut().jobs.pop_front() {
            // A reaction job settles capabilities internally; a throw here
            // is an engine bug, not a user-visible error.
            job.call(context)?;
        }

        let task = match context.scheduler_mut().ready_tasks.pop_front() {
            Some(task) => task,
            None => break,
        };
        resume_task(&task, context)?;
    }
    Ok(())
}

/// Re-executes a task body from the top.
fn resume_task(task: &TaskHandle, context: &mut Context) -> JsResult<()> {
    let (body, environment, strict) = {
        let mut t = task.borrow_mut();
        if t.done {
            return Ok(());
        }
        t.cursor = 0;
        t.new_counts.clear();
        (t.body.clone(), t.environment.clone(), t.strict)
    };

    context.push_execution_context(environment.clone(), environment.clone(), strict);
    context.set_frame_async_task(task.clone());
    let result = (|| {
        crate::exec::hoisting::hoist_declarations(body.items(), &environment, context)?;
        crate::exec::hoisting::hoist_lexical_declarations(body.items(), &environment, context)?;
        body.run(context)
    })();
    context.pop_execution_context();

    match result {
        Err(Flow::Await) => {
            // Parked against its promise; settlement re-queues the task.
            Ok(())
        }
        Ok(_) => {
            settle_task(task, AwaitResult::Fulfilled(JsValue::undefined()), context)
        }
        Err(Flow::Return(value)) => {
            settle_task(task, AwaitResult::Fulfilled(value), context)
        }
        Err(Flow::Throw(error)) => {
            settle_task(task, AwaitResult::Rejected(error), context)
        }
        Err(flow) => Err(flow),
    }
}

fn settle_task(
    task: &TaskHandle,
    result: AwaitResult,
    context: &mut Context,
) -> JsResult<()> {
    let (resolve, reject) = {
        let mut t = task.borrow_mut();
        t.done = true;
        (t.resolve.clone(), t.reject.clone())
    };
    match result {
        AwaitResult::Fulfilled(ref value) => {
            resolve.call(&JsValue::undefined(), &[value.clone()], context)?;
        }
        AwaitResult::Rejected(ref error) => {
            reject.call(&JsValue::undefined(), &[error.clone()], context)?;
        }
    }
    Ok(())
}

/// Evaluates an `await` expression.
pub(crate) fn await_expression(node: &AwaitExpr, context: &mut Context) -> JsResult<JsValue> {
    let task = match context.async_task() {
        Some(task) => task,
        None => {
            return context
                .throw_syntax_error("await is only valid in async functions and modules")
        }
    };

    // A queued result means this await already completed in an earlier
    // pass: answer without re-evaluating the operand.
    let queued = {
        let mut t = task.borrow_mut();
        if t.cursor < t.results.len() {
            let result = t.results[t.cursor].clone();
            t.cursor += 1;
            Some(result)
        } else {
            None
        }
    };
    if let Some(result) = queued {
        return match result {
            AwaitResult::Fulfilled(ref value) => Ok(value.clone()),
            AwaitResult::Rejected(ref error) => Err(Flow::Throw(error.clone())),
        };
    }

    // The frontier: evaluate the operand for real.
    let value = node.expr().run(context)?;

    // Settled promises complete the await synchronously.
    if let Some(object) = value.as_object() {
        let state = match object.borrow().data {
            ObjectData::Promise(ref promise) => Some(promise.state().clone()),
            _ => None,
        };
        match state {
            Some(PromiseState::Fulfilled(ref fulfilled)) => {
                let mut t = task.borrow_mut();
                t.results.push(AwaitResult::Fulfilled(fulfilled.clone()));
                t.cursor += 1;
                return Ok(fulfilled.clone());
            }
            Some(PromiseState::Rejected(ref rejected)) => {
                let mut t = task.borrow_mut();
                t.results.push(AwaitResult::Rejected(rejected.clone()));
                t.cursor += 1;
                return Err(Flow::Throw(rejected.clone()));
            }
            Some(PromiseState::Pending) => {
                promise::add_task_waiter(object, &task, context);
                return Err(Flow::Await);
            }
            None => {}
        }
    }

    // Thenables are adopted through a fresh promise; everything else
    // behaves like an already fulfilled await.
    if promise::is_thenable(&value, context)? {
        let adopted = promise::promise_resolve_value(value, context)?;
        promise::add_task_waiter(&adopted, &task, context);
        return Err(Flow::Await);
    }

    let mut t = task.borrow_mut();
    t.results.push(AwaitResult::Fulfilled(value.clone()));
    t.cursor += 1;
    Ok(value)
}

/// Pushes a settled await result and marks the task ready to resume.
/// Called by promise settlement.
pub(crate) fn resume_task_with(task: &TaskHandle, result: AwaitResult, context: &mut Context) {
    task.borrow_mut().results.push(result);
    context.scheduler_mut().ready_tasks.push_back(task.clone());
}
