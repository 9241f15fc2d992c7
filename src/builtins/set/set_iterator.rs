//! The `%SetIteratorPrototype%` machinery.

use crate::{
    builtins::iterable::create_iter_result_object,
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    value::JsValue,
    Context, JsResult,
};

/// The state of a live set iterator.
#[derive(Debug, Trace, Finalize)]
pub struct SetIterator {
    set: JsValue,
    next_index: usize,
}

impl SetIterator {
    pub(crate) fn create(set: JsValue, context: &mut Context) -> JsValue {
        let mut object = Object::create(
            context
                .standard_objects()
                .iterator_prototypes()
                .set_iterator()
                .into(),
        );
        object.data = ObjectData::SetIterator(Self { set, next_index: 0 });
        JsValue::object(object)
    }

    /// `%SetIteratorPrototype%.next`.
    pub(crate) fn next(
        this: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let iterator = match this.as_object() {
            Some(object) => object.clone(),
            None => return context.throw_type_error("`this` is not a set iterator"),
        };

        let entry = {
            let mut object = iterator.borrow_mut();
            match object.data {
                ObjectData::SetIterator(ref mut state) => {
                    let entry = state.set.as_object().and_then(|set| {
                        set.borrow().as_set_ref().and_then(|entries| {
                            entries.get_index(state.next_index).map(|(k, _)| k.clone())
                        })
                    });
                    if entry.is_some() {
                        state.next_index += 1;
                    }
                    entry
                }
                _ => return context.throw_type_error("`this` is not a set iterator"),
            }
        };

        match entry {
            None => Ok(create_iter_result_object(JsValue::undefined(), true, context)),
            Some(value) => Ok(create_iter_result_object(value, false, context)),
        }
    }

    /// Builds `%SetIteratorPrototype%`.
    pub(crate) fn create_prototype(
        iterator_prototype: &JsObject,
        context: &mut Context,
    ) -> JsObject {
        let prototype = JsObject::new(Object::create(iterator_prototype.clone().into()));
        crate::builtins::function::make_builtin_fn(Self::next, "next", &prototype, 0, context);
        prototype
    }
}
