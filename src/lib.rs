//! Coluber is an embeddable tree-walking JavaScript interpreter.
//!
//! The crate consumes a parsed ECMAScript AST (see the [`ast`] module) and
//! executes it: expressions produce [`JsValue`]s, statements produce
//! completions, and abrupt completions (`return`, `break`, `continue`,
//! `throw`, generator `yield` and async suspension) unwind through the
//! [`Flow`] signal type. The parser and the bulk of the standard library
//! (Math, JSON, Date, RegExp, Intl, typed arrays) are host collaborators:
//! they are installed through the embedder API on [`Context`].

#![deny(
    unused_qualifications,
    clippy::all,
    unused_import_braces,
    unused_lifetimes,
    trivial_numeric_casts,
    meta_variable_misuse,
    non_ascii_idents,
    rust_2018_compatibility,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style
)]
#![warn(clippy::perf, clippy::single_match_else, clippy::dbg_macro)]
#![allow(
    clippy::missing_inline_in_public_items,
    clippy::cognitive_complexity,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::as_conversions,
    clippy::large_enum_variant,
    clippy::upper_case_acronyms
)]

pub mod ast;
pub mod bigint;
pub mod builtins;
pub mod context;
pub mod environment;
pub mod error;
pub mod exec;
pub mod gc;
pub mod job;
pub mod module;
pub mod object;
pub mod profiler;
pub mod property;
pub mod realm;
pub mod string;
pub mod symbol;
pub mod value;

pub use crate::{
    bigint::JsBigInt,
    context::Context,
    error::{JsError, NativeErrorKind},
    exec::{Executable, Flow},
    object::JsObject,
    profiler::Profiler,
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};

/// The result of a fallible evaluator operation.
///
/// The error side is a [`Flow`] unwind signal; plain JavaScript throws
/// travel as [`Flow::Throw`] and the remaining variants are consumed by the
/// construct they belong to (loops, functions, generators, the async
/// scheduler) before they ever reach an embedder.
pub type JsResult<T> = Result<T, Flow>;
