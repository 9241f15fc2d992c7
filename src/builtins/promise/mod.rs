//! The `Promise` builtin: state, reaction records in registration order,
//! thenable adoption and the integration points the async scheduler and
//! the module system rely on.

use crate::{
    builtins::function::{make_builtin_fn, ClosureFunction, Function},
    exec::Flow,
    gc::{Finalize, Trace},
    job::{AwaitResult, NativeJob, TaskHandle},
    object::{JsObject, Object, ObjectData},
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

/// The state of a promise.
#[derive(Debug, Clone, Trace, Finalize)]
pub enum PromiseState {
    Pending,
    Fulfilled(JsValue),
    Rejected(JsValue),
}

/// Which settlement a reaction listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub(crate) enum ReactionType {
    Fulfill,
    Reject,
}

// Safety: plain enum.
unsafe impl Trace for ReactionType {
    crate::gc::empty_trace!();
}

/// A parked reaction. Reactions fire in registration order.
#[derive(Debug, Clone, Trace, Finalize)]
pub(crate) enum Reaction {
    /// A `then` registration: optional handler plus the capability of the
    /// derived promise.
    Then {
        handler: Option<JsObject>,
        capability: PromiseCapability,
        kind: ReactionType,
    },
    /// A suspended async task awaiting this promise.
    TaskResume { task: TaskHandle },
}

/// The internal state of a promise object.
#[derive(Debug, Trace, Finalize)]
pub struct Promise {
    state: PromiseState,
    fulfill_reactions: Vec<Reaction>,
    reject_reactions: Vec<Reaction>,
}

impl Promise {
    pub(crate) fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> &PromiseState {
        &self.state
    }
}

/// A promise plus its resolving functions.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct PromiseCapability {
    pub promise: JsObject,
    pub resolve: JsObject,
    pub reject: JsObject,
}

/// Creates a pending promise object with the realm's prototype.
pub(crate) fn create_promise_object(context: &Context) -> JsObject {
    let mut object = Object::create(
        context
            .standard_objects()
            .promise_object()
            .prototype()
            .into(),
    );
    object.data = ObjectData::Promise(Promise::new());
    JsObject::new(object)
}

/// Wraps a Rust closure as a callable (non-constructable) function
/// object.
pub(crate) fn native_closure<F>(closure: F, context: &Context) -> JsObject
where
    F: ClosureFunction,
{
    JsObject::new(Object::function(
        Function::Closure {
            function: Box::new(closure),
            constructable: false,
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    ))
}

/// `NewPromiseCapability` against the realm promise constructor.
pub(crate) fn new_promise_capability(context: &mut Context) -> JsResult<PromiseCapability> {
    let promise = create_promise_object(context);
    let (resolve, reject) = make_resolving_functions(&promise, context);
    Ok(PromiseCapability {
        promise,
        resolve,
        reject,
    })
}

/// The pair of resolving functions for a promise. Settlement is once-only;
/// later calls are ignored.
pub(crate) fn make_resolving_functions(
    promise: &JsObject,
    context: &Context,
) -> (JsObject, JsObject) {
    let resolve = {
        let promise = promise.clone();
        native_closure(
            move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                let value = args.first().cloned().unwrap_or_default();
                resolve_promise(&promise, value, context)?;
                Ok(JsValue::undefined())
            },
            context,
        )
    };
    let reject = {
        let promise = promise.clone();
        native_closure(
            move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                let reason = args.first().cloned().unwrap_or_default();
                reject_promise(&promise, reason, context);
                Ok(JsValue::undefined())
            },
            context,
        )
    };
    (resolve, reject)
}

fn promise_data_state(promise: &JsObject) -> Option<PromiseState> {
    match promise.borrow().data {
        ObjectData::Promise(ref data) => Some(data.state().clone()),
        _ => None,
    }
}

/// Does the value carry a callable `then`?
pub(crate) fn is_thenable(value: &JsValue, context: &mut Context) -> JsResult<bool> {
    if !value.is_object() {
        return Ok(false);
    }
    let then = value.get_field("then", context)?;
    Ok(then.is_function())
}

/// `ResolvePromise`: fulfills directly, or adopts a thenable through a
/// queued job.
pub(crate) fn resolve_promise(
    promise: &JsObject,
    value: JsValue,
    context: &mut Context,
) -> JsResult<()> {
    if !matches!(promise_data_state(promise), Some(PromiseState::Pending)) {
        return Ok(());
    }

    if let Some(object) = value.as_object() {
        if JsObject::ptr_eq(object, promise) {
            let error = context.construct_type_error("chaining cycle detected for promise");
            reject_promise(promise, error, context);
            return Ok(());
        }
    }

    let then = if value.is_object() {
        let then = value.get_field("then", context)?;
        if then.is_function() {
            Some(then)
        } else {
            None
        }
    } else {
        None
    };

    match then {
        Some(then) => {
            // Thenable adoption runs as its own job so the thenable's
            // `then` observes a consistent world.
            let promise = promise.clone();
            context.scheduler_mut().jobs.push_back(NativeJob::new(
                move |context: &mut Context| {
                    let (resolve, reject) = make_resolving_functions(&promise, context);
                    let result = context.call(
                        &then,
                        &value,
                        &[resolve.into(), reject.clone().into()],
                    );
                    if let Err(Flow::Throw(error)) = result {
                        reject.call(&JsValue::undefined(), &[error], context)?;
                    }
                    Ok(())
                },
            ));
            Ok(())
        }
        None => {
            fulfill_promise(promise, value, context);
            Ok(())
        }
    }
}

/// `FulfillPromise`.
pub(crate) fn fulfill_promise(promise: &JsObject, value: JsValue, context: &mut Context) {
    let reactions = {
        let mut object = promise.borrow_mut();
        match object.data {
            ObjectData::Promise(ref mut data) => {
                if !matches!(data.state, PromiseState::Pending) {
                    return;
                }
                data.state = PromiseState::Fulfilled(value.clone());
                data.reject_reactions.clear();
                std::mem::take(&mut data.fulfill_reactions)
            }
            _ => return,
        }
    };
    for reaction in reactions {
        fire_reaction(reaction, AwaitResult::Fulfilled(value.clone()), context);
    }
}

/// `RejectPromise`.
pub(crate) fn reject_promise(promise: &JsObject, reason: JsValue, context: &mut Context) {
    let reactions = {
        let mut object = promise.borrow_mut();
        match object.data {
            ObjectData::Promise(ref mut data) => {
                if !matches!(data.state, PromiseState::Pending) {
                    return;
                }
                data.state = PromiseState::Rejected(reason.clone());
                data.fulfill_reactions.clear();
                std::mem::take(&mut data.reject_reactions)
            }
            _ => return,
        }
    };
    for reaction in reactions {
        fire_reaction(reaction, AwaitResult::Rejected(reason.clone()), context);
    }
}

fn fire_reaction(reaction: Reaction, outcome: AwaitResult, context: &mut Context) {
    match reaction {
        Reaction::TaskResume { ref task } => {
            // Tasks resume in settlement order; the ready queue preserves
            // it.
            crate::job::resume_task_with(&task, outcome, context);
        }
        Reaction::Then {
            ref handler,
            ref capability,
            kind,
        } => {
            let handler = handler.clone();
            let capability = capability.clone();
            context.scheduler_mut().jobs.push_back(NativeJob::new(
                move |context: &mut Context| {
                    let argument = match &outcome {
                        AwaitResult::Fulfilled(value) => value.clone(),
                        AwaitResult::Rejected(reason) => reason.clone(),
                    };
                    let handler_result = match handler {
                        Some(handler) => {
                            handler.call(&JsValue::undefined(), &[argument], context)
                        }
                        None => match kind {
                            ReactionType::Fulfill => Ok(argument),
                            ReactionType::Reject => Err(Flow::Throw(argument)),
                        },
                    };
                    match handler_result {
                        Ok(value) => {
                            capability
                                .resolve
                                .call(&JsValue::undefined(), &[value], context)?;
                        }
                        Err(Flow::Throw(error)) => {
                            capability
                                .reject
                                .call(&JsValue::undefined(), &[error], context)?;
                        }
                        Err(flow) => return Err(flow),
                    }
                    Ok(())
                },
            ));
        }
    }
}

/// `PerformPromiseThen`.
pub(crate) fn perform_then(
    promise: &JsObject,
    on_fulfilled: Option<JsObject>,
    on_rejected: Option<JsObject>,
    capability: PromiseCapability,
    context: &mut Context,
) {
    let state = match promise_data_state(promise) {
        Some(state) => state,
        None => return,
    };
    match state {
        PromiseState::Pending => {
            let mut object = promise.borrow_mut();
            if let ObjectData::Promise(ref mut data) = object.data {
                data.fulfill_reactions.push(Reaction::Then {
                    handler: on_fulfilled,
                    capability: capability.clone(),
                    kind: ReactionType::Fulfill,
                });
                data.reject_reactions.push(Reaction::Then {
                    handler: on_rejected,
                    capability,
                    kind: ReactionType::Reject,
                });
            }
        }
        PromiseState::Fulfilled(ref value) => {
            fire_reaction(
                Reaction::Then {
                    handler: on_fulfilled,
                    capability,
                    kind: ReactionType::Fulfill,
                },
                AwaitResult::Fulfilled(value.clone()),
                context,
            );
        }
        PromiseState::Rejected(ref reason) => {
            fire_reaction(
                Reaction::Then {
                    handler: on_rejected,
                    capability,
                    kind: ReactionType::Reject,
                },
                AwaitResult::Rejected(reason.clone()),
                context,
            );
        }
    }
}

/// Parks a suspended async task against this promise.
pub(crate) fn add_task_waiter(promise: &JsObject, task: &TaskHandle, context: &mut Context) {
    let state = match promise_data_state(promise) {
        Some(state) => state,
        None => return,
    };
    match state {
        PromiseState::Pending => {
            let mut object = promise.borrow_mut();
            if let ObjectData::Promise(ref mut data) = object.data {
                data.fulfill_reactions.push(Reaction::TaskResume {
                    task: task.clone(),
                });
                data.reject_reactions.push(Reaction::TaskResume {
                    task: task.clone(),
                });
            }
        }
        PromiseState::Fulfilled(ref value) => {
            crate::job::resume_task_with(task, AwaitResult::Fulfilled(value.clone()), context);
        }
        PromiseState::Rejected(ref reason) => {
            crate::job::resume_task_with(task, AwaitResult::Rejected(reason.clone()), context);
        }
    }
}

/// `PromiseResolve`: passes promises through, wraps everything else.
pub(crate) fn promise_resolve_value(
    value: JsValue,
    context: &mut Context,
) -> JsResult<JsObject> {
    if let Some(object) = value.as_object() {
        if matches!(object.borrow().data, ObjectData::Promise(_)) {
            return Ok(object.clone());
        }
    }
    let capability = new_promise_capability(context)?;
    capability
        .resolve
        .call(&JsValue::undefined(), &[value], context)?;
    Ok(capability.promise.clone())
}

/// A promise already fulfilled with `value`.
pub(crate) fn promise_resolved_with(
    value: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    Ok(promise_resolve_value(value, context)?.into())
}

/// A promise already rejected with `reason`.
pub(crate) fn promise_rejected_with(
    reason: JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let capability = new_promise_capability(context)?;
    capability
        .reject
        .call(&JsValue::undefined(), &[reason], context)?;
    Ok(capability.promise.clone().into())
}

/// Host signal that an externally tracked promise settled: fires any
/// reactions that are still parked.
pub(crate) fn notify_resolved(promise: &JsObject, context: &mut Context) {
    let state = match promise_data_state(promise) {
        Some(state) => state,
        None => return,
    };
    match state {
        PromiseState::Pending => {}
        PromiseState::Fulfilled(ref value) => fulfill_promise(promise, value.clone(), context),
        PromiseState::Rejected(ref reason) => reject_promise(promise, reason.clone(), context),
    }
}

// JavaScript-visible surface.

fn this_promise(this: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    match this.as_object() {
        Some(object) if matches!(object.borrow().data, ObjectData::Promise(_)) => {
            Ok(object.clone())
        }
        _ => context.throw_type_error("receiver is not a promise"),
    }
}

/// The `Promise` constructor: runs the executor with the resolving
/// functions.
pub(crate) fn constructor(
    _new_target: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let executor = match args.first() {
        Some(executor) if executor.is_function() => executor.clone(),
        _ => return context.throw_type_error("promise executor is not a function"),
    };

    let promise = create_promise_object(context);
    let (resolve, reject) = make_resolving_functions(&promise, context);
    let result = context.call(
        &executor,
        &JsValue::undefined(),
        &[resolve.into(), reject.clone().into()],
    );
    if let Err(Flow::Throw(error)) = result {
        reject.call(&JsValue::undefined(), &[error], context)?;
    }
    Ok(promise.into())
}

/// `Promise.resolve(value)`.
fn resolve(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let value = args.first().cloned().unwrap_or_default();
    promise_resolved_with(value, context)
}

/// `Promise.reject(reason)`.
fn reject(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let reason = args.first().cloned().unwrap_or_default();
    promise_rejected_with(reason, context)
}

/// `Promise.all(iterable)`.
fn all(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    use std::cell::RefCell;
    use std::rc::Rc;

    let iterable = args.first().cloned().unwrap_or_default();
    let iterator = crate::builtins::iterable::get_iterator(&iterable, context)?;
    let capability = new_promise_capability(context)?;

    struct AllState {
        results: Vec<JsValue>,
        remaining: usize,
        done_collecting: bool,
    }
    let state = Rc::new(RefCell::new(AllState {
        results: Vec::new(),
        remaining: 0,
        done_collecting: false,
    }));

    let mut index = 0usize;
    loop {
        let next = iterator.next(None, context)?;
        if next.done {
            break;
        }
        {
            let mut state = state.borrow_mut();
            state.results.push(JsValue::undefined());
            state.remaining += 1;
        }
        let element_promise = promise_resolve_value(next.value, context)?;
        let on_fulfilled = {
            let state = Rc::clone(&state);
            let resolve = capability.resolve.clone();
            native_closure(
                move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                    let value = args.first().cloned().unwrap_or_default();
                    let finished = {
                        let mut state = state.borrow_mut();
                        state.results[index] = value;
                        state.remaining -= 1;
                        state.done_collecting && state.remaining == 0
                    };
                    if finished {
                        let elements = state.borrow().results.clone();
                        let array =
                            crate::builtins::array::Array::from_values(&elements, context);
                        resolve.call(&JsValue::undefined(), &[array], context)?;
                    }
                    Ok(JsValue::undefined())
                },
                context,
            )
        };
        let on_rejected = {
            let reject = capability.reject.clone();
            native_closure(
                move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                    let reason = args.first().cloned().unwrap_or_default();
                    reject.call(&JsValue::undefined(), &[reason], context)?;
                    Ok(JsValue::undefined())
                },
                context,
            )
        };
        let derived = new_promise_capability(context)?;
        perform_then(
            &element_promise,
            Some(on_fulfilled),
            Some(on_rejected),
            derived,
            context,
        );
        index += 1;
    }

    let finished = {
        let mut state = state.borrow_mut();
        state.done_collecting = true;
        state.remaining == 0
    };
    if finished {
        let elements = state.borrow().results.clone();
        let array = crate::builtins::array::Array::from_values(&elements, context);
        capability
            .resolve
            .call(&JsValue::undefined(), &[array], context)?;
    }
    Ok(capability.promise.clone().into())
}

/// `Promise.prototype.then`.
fn then(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let promise = this_promise(this, context)?;
    let on_fulfilled = args
        .first()
        .filter(|value| value.is_function())
        .and_then(JsValue::as_object)
        .cloned();
    let on_rejected = args
        .get(1)
        .filter(|value| value.is_function())
        .and_then(JsValue::as_object)
        .cloned();
    let capability = new_promise_capability(context)?;
    perform_then(
        &promise,
        on_fulfilled,
        on_rejected,
        capability.clone(),
        context,
    );
    Ok(capability.promise.clone().into())
}

/// `Promise.prototype.catch`.
fn catch(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let promise = this_promise(this, context)?;
    let on_rejected = args
        .first()
        .filter(|value| value.is_function())
        .and_then(JsValue::as_object)
        .cloned();
    let capability = new_promise_capability(context)?;
    perform_then(&promise, None, on_rejected, capability.clone(), context);
    Ok(capability.promise.clone().into())
}

/// `Promise.prototype.finally`.
fn finally(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let promise = this_promise(this, context)?;
    let on_finally = args
        .first()
        .filter(|value| value.is_function())
        .cloned();
    let capability = new_promise_capability(context)?;

    let (on_fulfilled, on_rejected) = match on_finally {
        None => (None, None),
        Some(handler) => {
            let pass = {
                let handler = handler.clone();
                native_closure(
                    move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                        let value = args.first().cloned().unwrap_or_default();
                        context.call(&handler, &JsValue::undefined(), &[])?;
                        Ok(value)
                    },
                    context,
                )
            };
            let rethrow = native_closure(
                move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                    let reason = args.first().cloned().unwrap_or_default();
                    context.call(&handler, &JsValue::undefined(), &[])?;
                    Err(Flow::Throw(reason))
                },
                context,
            );
            (Some(pass), Some(rethrow))
        }
    };

    perform_then(
        &promise,
        on_fulfilled,
        on_rejected,
        capability.clone(),
        context,
    );
    Ok(capability.promise.clone().into())
}

/// Wires `Promise` into the realm.
pub(crate) fn init(context: &mut Context) {
    let _timer = Profiler::global().start_event("promise", "init");

    let constructor_object = context.standard_objects().promise_object().constructor();
    let prototype = context.standard_objects().promise_object().prototype();

    make_builtin_fn(resolve, "resolve", &constructor_object, 1, context);
    make_builtin_fn(reject, "reject", &constructor_object, 1, context);
    make_builtin_fn(all, "all", &constructor_object, 1, context);
    make_builtin_fn(then, "then", &prototype, 2, context);
    make_builtin_fn(catch, "catch", &prototype, 1, context);
    make_builtin_fn(finally, "finally", &prototype, 1, context);

    let global = context.global_object();
    global.borrow_mut().insert_property(
        "Promise",
        constructor_object,
        Attribute::WRITABLE | Attribute::CONFIGURABLE,
    );
}
