//! The `Symbol` primitive and the per-realm well known symbols.
//!
//! Every symbol value is unique; identity is an incrementing hash handed out
//! by the owning [`Context`](crate::Context), so symbol identities are stable
//! across all code evaluated by a single evaluator instance but two realms
//! never share them.

use crate::{
    gc::{empty_trace, Finalize, Trace},
    string::JsString,
};
use std::{
    fmt::{self, Display},
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Inner {
    hash: u64,
    description: Option<JsString>,
}

/// A JavaScript symbol primitive.
#[derive(Debug, Finalize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsSymbol(Rc<Inner>);

// Safety: `JsSymbol` contains no garbage collected references.
unsafe impl Trace for JsSymbol {
    empty_trace!();
}

impl JsSymbol {
    /// Creates a new symbol. The hash must come from the owning context so
    /// that identities stay unique within the realm.
    pub(crate) fn new(hash: u64, description: Option<JsString>) -> Self {
        Self(Rc::new(Inner { hash, description }))
    }

    /// Returns the symbol description.
    #[inline]
    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    /// Returns the symbol identity hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.0.hash
    }
}

impl Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

/// The well known symbols of a realm.
///
/// These are created once per evaluator instance; the identities are shared
/// by every piece of code that instance runs.
#[derive(Debug, Clone)]
pub struct WellKnownSymbols {
    async_iterator: JsSymbol,
    has_instance: JsSymbol,
    is_concat_spreadable: JsSymbol,
    iterator: JsSymbol,
    match_: JsSymbol,
    match_all: JsSymbol,
    replace: JsSymbol,
    search: JsSymbol,
    species: JsSymbol,
    split: JsSymbol,
    to_primitive: JsSymbol,
    to_string_tag: JsSymbol,
    unscopables: JsSymbol,
}

impl WellKnownSymbols {
    /// Creates the table, returning it together with the number of symbol
    /// hashes consumed.
    pub(crate) fn new() -> (Self, u64) {
        let mut count = 0;
        let mut next = |description: &str| {
            let symbol = JsSymbol::new(count, Some(description.into()));
            count += 1;
            symbol
        };

        let async_iterator = next("Symbol.asyncIterator");
        let has_instance = next("Symbol.hasInstance");
        let is_concat_spreadable = next("Symbol.isConcatSpreadable");
        let iterator = next("Symbol.iterator");
        let match_ = next("Symbol.match");
        let match_all = next("Symbol.matchAll");
        let replace = next("Symbol.replace");
        let search = next("Symbol.search");
        let species = next("Symbol.species");
        let split = next("Symbol.split");
        let to_primitive = next("Symbol.toPrimitive");
        let to_string_tag = next("Symbol.toStringTag");
        let unscopables = next("Symbol.unscopables");

        (
            Self {
                async_iterator,
                has_instance,
                is_concat_spreadable,
                iterator,
                match_,
                match_all,
                replace,
                search,
                species,
                split,
                to_primitive,
                to_string_tag,
                unscopables,
            },
            count,
        )
    }

    /// The `Symbol.asyncIterator` well known symbol.
    #[inline]
    pub fn async_iterator_symbol(&self) -> JsSymbol {
        self.async_iterator.clone()
    }

    /// The `Symbol.hasInstance` well known symbol, consulted by the
    /// semantics of the `instanceof` operator.
    #[inline]
    pub fn has_instance_symbol(&self) -> JsSymbol {
        self.has_instance.clone()
    }

    /// The `Symbol.isConcatSpreadable` well known symbol.
    #[inline]
    pub fn is_concat_spreadable_symbol(&self) -> JsSymbol {
        self.is_concat_spreadable.clone()
    }

    /// The `Symbol.iterator` well known symbol, consulted by the semantics
    /// of the `for-of` statement, spread and destructuring.
    #[inline]
    pub fn iterator_symbol(&self) -> JsSymbol {
        self.iterator.clone()
    }

    /// The `Symbol.match` well known symbol.
    #[inline]
    pub fn match_symbol(&self) -> JsSymbol {
        self.match_.clone()
    }

    /// The `Symbol.matchAll` well known symbol.
    #[inline]
    pub fn match_all_symbol(&self) -> JsSymbol {
        self.match_all.clone()
    }

    /// The `Symbol.replace` well known symbol.
    #[inline]
    pub fn replace_symbol(&self) -> JsSymbol {
        self.replace.clone()
    }

    /// The `Symbol.search` well known symbol.
    #[inline]
    pub fn search_symbol(&self) -> JsSymbol {
        self.search.clone()
    }

    /// The `Symbol.species` well known symbol.
    #[inline]
    pub fn species_symbol(&self) -> JsSymbol {
        self.species.clone()
    }

    /// The `Symbol.split` well known symbol.
    #[inline]
    pub fn split_symbol(&self) -> JsSymbol {
        self.split.clone()
    }

    /// The `Symbol.toPrimitive` well known symbol, consulted first by the
    /// `ToPrimitive` abstract operation.
    #[inline]
    pub fn to_primitive_symbol(&self) -> JsSymbol {
        self.to_primitive.clone()
    }

    /// The `Symbol.toStringTag` well known symbol.
    #[inline]
    pub fn to_string_tag_symbol(&self) -> JsSymbol {
        self.to_string_tag.clone()
    }

    /// The `Symbol.unscopables` well known symbol.
    #[inline]
    pub fn unscopables_symbol(&self) -> JsSymbol {
        self.unscopables.clone()
    }
}
