//! Statement list node.

use crate::ast::Node;
use crate::gc::{empty_trace, Finalize, Trace};
use std::{ops::Deref, rc::Rc};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// A list of statements, the body of programs, functions and blocks.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementList {
    items: Box<[Node]>,
}

impl StatementList {
    /// Gets the list of items.
    #[inline]
    pub fn items(&self) -> &[Node] {
        &self.items
    }
}

impl From<Vec<Node>> for StatementList {
    fn from(stm: Vec<Node>) -> Self {
        Self {
            items: stm.into_boxed_slice(),
        }
    }
}

impl From<Box<[Node]>> for StatementList {
    fn from(items: Box<[Node]>) -> Self {
        Self { items }
    }
}

impl Deref for StatementList {
    type Target = [Node];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// A cheaply clonable, shared statement list.
///
/// Function objects hold their body through this handle; the heap
/// allocation is stable, which is what makes AST node addresses usable as
/// yield-point identities for generator and async replays.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Debug, Finalize, PartialEq)]
pub struct RcStatementList(Rc<StatementList>);

impl Clone for RcStatementList {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

// Safety: the AST holds no garbage collected references.
unsafe impl Trace for RcStatementList {
    empty_trace!();
}

impl Deref for RcStatementList {
    type Target = StatementList;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<StatementList> for RcStatementList {
    #[inline]
    fn from(statementlist: StatementList) -> Self {
        Self(Rc::from(statementlist))
    }
}
