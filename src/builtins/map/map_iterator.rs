//! The `%MapIteratorPrototype%` machinery.

use crate::{
    builtins::iterable::create_iter_result_object,
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    value::JsValue,
    Context, JsResult,
};

/// Which face of the entries an iterator yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum MapIterationKind {
    Key,
    Value,
    KeyAndValue,
}

// Safety: plain enum.
unsafe impl Trace for MapIterationKind {
    crate::gc::empty_trace!();
}

/// The state of a live map iterator.
#[derive(Debug, Trace, Finalize)]
pub struct MapIterator {
    map: JsValue,
    next_index: usize,
    #[unsafe_ignore_trace]
    kind: MapIterationKind,
}

impl MapIterator {
    /// Creates a map iterator object over `map`.
    pub(crate) fn create(
        map: JsValue,
        kind: MapIterationKind,
        context: &mut Context,
    ) -> JsValue {
        let mut object = Object::create(
            context
                .standard_objects()
                .iterator_prototypes()
                .map_iterator()
                .into(),
        );
        object.data = ObjectData::MapIterator(Self {
            map,
            next_index: 0,
            kind,
        });
        JsValue::object(object)
    }

    /// `%MapIteratorPrototype%.next`.
    pub(crate) fn next(
        this: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let iterator = match this.as_object() {
            Some(object) => object.clone(),
            None => return context.throw_type_error("`this` is not a map iterator"),
        };

        let step = {
            let mut object = iterator.borrow_mut();
            match object.data {
                ObjectData::MapIterator(ref mut state) => {
                    let entry = state
                        .map
                        .as_object()
                        .and_then(|map| {
                            map.borrow().as_map_ref().and_then(|entries| {
                                entries
                                    .get_index(state.next_index)
                                    .map(|(k, v)| (k.clone(), v.clone()))
                            })
                        });
                    if entry.is_some() {
                        state.next_index += 1;
                    }
                    Some((entry, state.kind))
                }
                _ => None,
            }
        };

        let (entry, kind) = match step {
            Some(step) => step,
            None => return context.throw_type_error("`this` is not a map iterator"),
        };

        match entry {
            None => Ok(create_iter_result_object(JsValue::undefined(), true, context)),
            Some((key, value)) => {
                let result = match kind {
                    MapIterationKind::Key => key,
                    MapIterationKind::Value => value,
                    MapIterationKind::KeyAndValue => {
                        crate::builtins::array::Array::from_values(&[key, value], context)
                    }
                };
                Ok(create_iter_result_object(result, false, context))
            }
        }
    }

    /// Builds `%MapIteratorPrototype%`.
    pub(crate) fn create_prototype(
        iterator_prototype: &JsObject,
        context: &mut Context,
    ) -> JsObject {
        let prototype = JsObject::new(Object::create(iterator_prototype.clone().into()));
        crate::builtins::function::make_builtin_fn(Self::next, "next", &prototype, 0, context);
        prototype
    }
}
