//! The builtins the core cannot run without. The wider standard library
//! (Math, JSON, Date, RegExp, Intl, typed arrays, weak collections) is
//! host-provided through the embedder API and the `NativeObject`
//! extension point.

pub mod array;
pub mod bigint;
pub mod boolean;
pub mod error;
pub mod function;
pub mod generator;
pub mod global_this;
pub mod iterable;
pub mod map;
pub mod number;
pub mod object;
pub mod promise;
pub mod proxy;
pub mod reflect;
pub mod set;
pub mod string;
pub mod symbol;

use crate::Context;

/// Initializes the intrinsics of a fresh realm, in dependency order.
pub(crate) fn init(context: &mut Context) {
    let _timer = crate::Profiler::global().start_event("builtins::init", "init");

    function::init(context);
    object::Object::init(context);
    error::init(context);
    symbol::Symbol::init(context);

    // The iterator prototype chain everything iterable hangs off.
    let iterator_prototype = iterable::create_iterator_prototype(context);
    let generator = generator::create_generator_prototype(&iterator_prototype, context);
    let array_iterator =
        array::array_iterator::ArrayIterator::create_prototype(&iterator_prototype, context);
    let map_iterator =
        map::map_iterator::MapIterator::create_prototype(&iterator_prototype, context);
    let set_iterator =
        set::set_iterator::SetIterator::create_prototype(&iterator_prototype, context);
    context
        .standard_objects_mut()
        .set_iterator_prototypes(crate::context::IteratorPrototypes::new(
            iterator_prototype,
            generator,
            array_iterator,
            map_iterator,
            set_iterator,
        ));

    array::Array::init(context);
    boolean::Boolean::init(context);
    number::Number::init(context);
    string::String::init(context);
    bigint::BigInt::init(context);
    map::Map::init(context);
    set::Set::init(context);
    promise::init(context);
    proxy::Proxy::init(context);
    reflect::Reflect::init(context);
    global_this::GlobalThis::init(context);
}
