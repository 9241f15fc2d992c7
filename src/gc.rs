//! Garbage collector integration.
//!
//! The whole runtime object graph (objects, environments, closures, module
//! records) is managed by the `gc` crate, so reference cycles between
//! environments and the closures they capture are collected without any
//! bookkeeping on our side.

pub use gc::{
    custom_trace, force_collect, unsafe_empty_trace as empty_trace, Finalize, Gc, GcCell as Cell,
    GcCellRef as Ref, GcCellRefMut as RefMut, Trace,
};
