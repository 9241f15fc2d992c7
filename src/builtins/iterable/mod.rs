//! The iterator protocol: obtaining iterators through `Symbol.iterator`
//! and stepping them, shared by `for-of`, spread, destructuring and
//! `yield*`.

use crate::{
    gc::{Finalize, Trace},
    object::{JsObject, Object},
    property::{Attribute, PropertyKey},
    value::JsValue,
    Context, JsResult,
};

/// An iterator record: the iterator object plus its cached `next` method.
#[derive(Debug, Clone, Trace, Finalize)]
pub struct IteratorRecord {
    iterator_object: JsValue,
    next_function: JsValue,
}

/// One step result.
#[derive(Debug, Clone)]
pub struct IteratorResult {
    pub value: JsValue,
    pub done: bool,
}

impl IteratorRecord {
    pub fn new(iterator_object: JsValue, next_function: JsValue) -> Self {
        Self {
            iterator_object,
            next_function,
        }
    }

    #[inline]
    pub fn iterator_object(&self) -> &JsValue {
        &self.iterator_object
    }

    /// Calls `next` with an optional argument and unpacks the result
    /// object.
    pub fn next(
        &self,
        argument: Option<JsValue>,
        context: &mut Context,
    ) -> JsResult<IteratorResult> {
        let args = match argument {
            Some(argument) => vec![argument],
            None => Vec::new(),
        };
        let result = context.call(&self.next_function, &self.iterator_object, &args)?;
        if !result.is_object() {
            return context.throw_type_error("iterator next must return an object");
        }
        let done = result.get_field("done", context)?.to_boolean();
        let value = result.get_field("value", context)?;
        Ok(IteratorResult { value, done })
    }

    /// Looks up a method on the iterator (`return`/`throw`), if present.
    pub fn method(
        &self,
        name: &str,
        context: &mut Context,
    ) -> JsResult<Option<JsValue>> {
        let method = self.iterator_object.get_field(name, context)?;
        if method.is_null_or_undefined() {
            Ok(None)
        } else {
            Ok(Some(method))
        }
    }
}

/// `GetIterator`: consults `Symbol.iterator` and validates the protocol.
pub fn get_iterator(value: &JsValue, context: &mut Context) -> JsResult<IteratorRecord> {
    let iterator_symbol = context.well_known_symbols().iterator_symbol();
    let iterator_function = value.get_field(iterator_symbol, context)?;
    if !iterator_function.is_function() {
        return context.throw_type_error(format!("{} is not iterable", value.display()));
    }
    let iterator_object = context.call(&iterator_function, value, &[])?;
    if !iterator_object.is_object() {
        return context.throw_type_error("Symbol.iterator must return an object");
    }
    let next_function = iterator_object.get_field("next", context)?;
    Ok(IteratorRecord::new(iterator_object, next_function))
}

/// `CreateIterResultObject`.
pub fn create_iter_result_object(value: JsValue, done: bool, context: &mut Context) -> JsValue {
    let result = JsValue::new_object(context);
    result.set_property("value", value, Attribute::default());
    result.set_property("done", JsValue::boolean(done), Attribute::default());
    result
}

/// Creates the `%IteratorPrototype%` object: the root every concrete
/// iterator prototype inherits from, whose `Symbol.iterator` returns the
/// receiver.
pub(crate) fn create_iterator_prototype(context: &mut Context) -> JsObject {
    let prototype = JsObject::new(Object::create(
        context
            .standard_objects()
            .object_object()
            .prototype()
            .into(),
    ));

    let self_fn: crate::builtins::function::NativeFunction =
        |this, _args, _context| Ok(this.clone());
    let function = JsObject::new(Object::function(
        crate::builtins::function::Function::Native {
            function: self_fn.into(),
            constructable: false,
        },
        context
            .standard_objects()
            .function_object()
            .prototype()
            .into(),
    ));
    let iterator_symbol = context.well_known_symbols().iterator_symbol();
    prototype.borrow_mut().insert(
        PropertyKey::from(iterator_symbol),
        crate::property::DataDescriptor::new(
            function,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        ),
    );
    prototype
}
