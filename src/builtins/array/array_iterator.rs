//! The `%ArrayIteratorPrototype%` machinery, also used to iterate
//! `arguments` objects.

use crate::{
    builtins::iterable::create_iter_result_object,
    gc::{Finalize, Trace},
    object::{JsObject, Object, ObjectData},
    value::JsValue,
    Context, JsResult,
};

/// Which face of the entries an iterator yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Finalize)]
pub enum ArrayIterationKind {
    Key,
    Value,
    KeyAndValue,
}

// Safety: plain enum.
unsafe impl Trace for ArrayIterationKind {
    crate::gc::empty_trace!();
}

/// The state of a live array iterator.
#[derive(Debug, Trace, Finalize)]
pub struct ArrayIterator {
    array: JsValue,
    next_index: usize,
    #[unsafe_ignore_trace]
    kind: ArrayIterationKind,
    done: bool,
}

impl ArrayIterator {
    pub(crate) fn create(
        array: JsValue,
        kind: ArrayIterationKind,
        context: &mut Context,
    ) -> JsValue {
        let mut object = Object::create(
            context
                .standard_objects()
                .iterator_prototypes()
                .array_iterator()
                .into(),
        );
        object.data = ObjectData::ArrayIterator(Self {
            array,
            next_index: 0,
            kind,
            done: false,
        });
        JsValue::object(object)
    }

    /// `%ArrayIteratorPrototype%.next`.
    pub(crate) fn next(
        this: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let iterator = match this.as_object() {
            Some(object) => object.clone(),
            None => return context.throw_type_error("`this` is not an array iterator"),
        };

        let step = {
            let mut object = iterator.borrow_mut();
            match object.data {
                ObjectData::ArrayIterator(ref mut state) => {
                    if state.done {
                        None
                    } else {
                        let index = state.next_index;
                        state.next_index += 1;
                        Some((state.array.clone(), index, state.kind))
                    }
                }
                _ => {
                    return context.throw_type_error("`this` is not an array iterator")
                }
            }
        };

        let (array, index, kind) = match step {
            Some(step) => step,
            None => {
                return Ok(create_iter_result_object(JsValue::undefined(), true, context))
            }
        };

        let length = array.get_field("length", context)?.to_length(context)?;
        if index >= length {
            if let ObjectData::ArrayIterator(ref mut state) =
                iterator.borrow_mut().data
            {
                state.done = true;
            }
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        }

        let result = match kind {
            ArrayIterationKind::Key => JsValue::from(index),
            ArrayIterationKind::Value => array.get_field(index, context)?,
            ArrayIterationKind::KeyAndValue => {
                let value = array.get_field(index, context)?;
                crate::builtins::array::Array::from_values(
                    &[JsValue::from(index), value],
                    context,
                )
            }
        };
        Ok(create_iter_result_object(result, false, context))
    }

    /// Builds `%ArrayIteratorPrototype%`.
    pub(crate) fn create_prototype(
        iterator_prototype: &JsObject,
        context: &mut Context,
    ) -> JsObject {
        let prototype = JsObject::new(Object::create(iterator_prototype.clone().into()));
        crate::builtins::function::make_builtin_fn(Self::next, "next", &prototype, 0, context);
        prototype
    }
}
