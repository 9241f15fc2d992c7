//! Statement nodes.

use crate::ast::{
    node::{Declaration, StatementList},
    Node,
};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// A block statement, which opens its own lexical scope.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    statements: StatementList,
}

impl Block {
    pub fn statements(&self) -> &StatementList {
        &self.statements
    }

    pub fn items(&self) -> &[Node] {
        self.statements.items()
    }
}

impl<T> From<T> for Block
where
    T: Into<StatementList>,
{
    fn from(list: T) -> Self {
        Self {
            statements: list.into(),
        }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}

/// An `if` statement.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct If {
    cond: Box<Node>,
    body: Box<Node>,
    else_node: Option<Box<Node>>,
}

impl If {
    pub fn new<C, B, E, OE>(cond: C, body: B, else_node: OE) -> Self
    where
        C: Into<Node>,
        B: Into<Node>,
        E: Into<Node>,
        OE: Into<Option<E>>,
    {
        Self {
            cond: Box::new(cond.into()),
            body: Box::new(body.into()),
            else_node: else_node.into().map(E::into).map(Box::new),
        }
    }

    pub fn cond(&self) -> &Node {
        &self.cond
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    pub fn else_node(&self) -> Option<&Node> {
        self.else_node.as_ref().map(Box::as_ref)
    }
}

impl From<If> for Node {
    fn from(if_stm: If) -> Self {
        Self::If(if_stm)
    }
}

/// A `switch` case: condition plus body.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    condition: Node,
    body: StatementList,
}

impl Case {
    pub fn new<C, B>(condition: C, body: B) -> Self
    where
        C: Into<Node>,
        B: Into<StatementList>,
    {
        Self {
            condition: condition.into(),
            body: body.into(),
        }
    }

    pub fn condition(&self) -> &Node {
        &self.condition
    }

    pub fn body(&self) -> &StatementList {
        &self.body
    }
}

/// A `switch` statement. Cases fall through until a `break`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    val: Box<Node>,
    cases: Box<[Case]>,
    default: Option<StatementList>,
}

impl Switch {
    pub fn new<V, C, D>(val: V, cases: C, default: D) -> Self
    where
        V: Into<Node>,
        C: Into<Box<[Case]>>,
        D: Into<Option<StatementList>>,
    {
        Self {
            val: Box::new(val.into()),
            cases: cases.into(),
            default: default.into(),
        }
    }

    pub fn val(&self) -> &Node {
        &self.val
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn default(&self) -> Option<&StatementList> {
        self.default.as_ref()
    }
}

impl From<Switch> for Node {
    fn from(switch: Switch) -> Self {
        Self::Switch(switch)
    }
}

/// A `while` loop.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WhileLoop {
    cond: Box<Node>,
    body: Box<Node>,
}

impl WhileLoop {
    pub fn new<C, B>(condition: C, body: B) -> Self
    where
        C: Into<Node>,
        B: Into<Node>,
    {
        Self {
            cond: Box::new(condition.into()),
            body: Box::new(body.into()),
        }
    }

    pub fn cond(&self) -> &Node {
        &self.cond
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

impl From<WhileLoop> for Node {
    fn from(while_loop: WhileLoop) -> Self {
        Self::WhileLoop(while_loop)
    }
}

/// A `do...while` loop.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DoWhileLoop {
    body: Box<Node>,
    cond: Box<Node>,
}

impl DoWhileLoop {
    pub fn new<B, C>(body: B, condition: C) -> Self
    where
        B: Into<Node>,
        C: Into<Node>,
    {
        Self {
            body: Box::new(body.into()),
            cond: Box::new(condition.into()),
        }
    }

    pub fn body(&self) -> &Node {
        &self.body
    }

    pub fn cond(&self) -> &Node {
        &self.cond
    }
}

impl From<DoWhileLoop> for Node {
    fn from(do_while: DoWhileLoop) -> Self {
        Self::DoWhileLoop(do_while)
    }
}

/// A `for` loop.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ForLoop {
    init: Option<Box<Node>>,
    condition: Option<Box<Node>>,
    final_expr: Option<Box<Node>>,
    body: Box<Node>,
}

impl ForLoop {
    pub fn new<I, C, E, B>(init: I, condition: C, final_expr: E, body: B) -> Self
    where
        I: Into<Option<Node>>,
        C: Into<Option<Node>>,
        E: Into<Option<Node>>,
        B: Into<Node>,
    {
        Self {
            init: init.into().map(Box::new),
            condition: condition.into().map(Box::new),
            final_expr: final_expr.into().map(Box::new),
            body: Box::new(body.into()),
        }
    }

    pub fn init(&self) -> Option<&Node> {
        self.init.as_ref().map(Box::as_ref)
    }

    pub fn condition(&self) -> Option<&Node> {
        self.condition.as_ref().map(Box::as_ref)
    }

    pub fn final_expr(&self) -> Option<&Node> {
        self.final_expr.as_ref().map(Box::as_ref)
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

impl From<ForLoop> for Node {
    fn from(for_loop: ForLoop) -> Self {
        Self::ForLoop(for_loop)
    }
}

/// A `for...in` loop, enumerating string keys.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ForInLoop {
    variable: Box<Node>,
    expr: Box<Node>,
    body: Box<Node>,
}

impl ForInLoop {
    pub fn new<V, E, B>(variable: V, expr: E, body: B) -> Self
    where
        V: Into<Node>,
        E: Into<Node>,
        B: Into<Node>,
    {
        Self {
            variable: Box::new(variable.into()),
            expr: Box::new(expr.into()),
            body: Box::new(body.into()),
        }
    }

    pub fn variable(&self) -> &Node {
        &self.variable
    }

    pub fn expr(&self) -> &Node {
        &self.expr
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

impl From<ForInLoop> for Node {
    fn from(for_in: ForInLoop) -> Self {
        Self::ForInLoop(for_in)
    }
}

/// A `for...of` loop, driving the iterator protocol.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ForOfLoop {
    variable: Box<Node>,
    iterable: Box<Node>,
    body: Box<Node>,
}

impl ForOfLoop {
    pub fn new<V, I, B>(variable: V, iterable: I, body: B) -> Self
    where
        V: Into<Node>,
        I: Into<Node>,
        B: Into<Node>,
    {
        Self {
            variable: Box::new(variable.into()),
            iterable: Box::new(iterable.into()),
            body: Box::new(body.into()),
        }
    }

    pub fn variable(&self) -> &Node {
        &self.variable
    }

    pub fn iterable(&self) -> &Node {
        &self.iterable
    }

    pub fn body(&self) -> &Node {
        &self.body
    }
}

impl From<ForOfLoop> for Node {
    fn from(for_of: ForOfLoop) -> Self {
        Self::ForOfLoop(for_of)
    }
}

/// The `continue` statement, with optional label.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Continue {
    label: Option<Box<str>>,
}

impl Continue {
    pub fn new<L, OL>(label: OL) -> Self
    where
        L: Into<Box<str>>,
        OL: Into<Option<L>>,
    {
        Self {
            label: label.into().map(L::into),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl From<Continue> for Node {
    fn from(cont: Continue) -> Self {
        Self::Continue(cont)
    }
}

/// The `break` statement, with optional label.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Break {
    label: Option<Box<str>>,
}

impl Break {
    pub fn new<L, OL>(label: OL) -> Self
    where
        L: Into<Box<str>>,
        OL: Into<Option<L>>,
    {
        Self {
            label: label.into().map(L::into),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl From<Break> for Node {
    fn from(break_smt: Break) -> Self {
        Self::Break(break_smt)
    }
}

/// The `return` statement.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Return {
    expr: Option<Box<Node>>,
}

impl Return {
    pub fn new<E, OE>(expr: OE) -> Self
    where
        E: Into<Node>,
        OE: Into<Option<E>>,
    {
        Self {
            expr: expr.into().map(E::into).map(Box::new),
        }
    }

    pub fn expr(&self) -> Option<&Node> {
        self.expr.as_ref().map(Box::as_ref)
    }
}

impl From<Return> for Node {
    fn from(return_smt: Return) -> Self {
        Self::Return(return_smt)
    }
}

/// The `throw` statement.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Throw {
    expr: Box<Node>,
}

impl Throw {
    pub fn new<V>(val: V) -> Self
    where
        V: Into<Node>,
    {
        Self {
            expr: Box::new(val.into()),
        }
    }

    pub fn expr(&self) -> &Node {
        &self.expr
    }
}

impl From<Throw> for Node {
    fn from(throw: Throw) -> Self {
        Self::Throw(throw)
    }
}

/// A `try...catch...finally` statement.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Try {
    block: Block,
    catch: Option<Catch>,
    finally: Option<Finally>,
}

impl Try {
    pub fn new<B>(block: B, catch: Option<Catch>, finally: Option<Finally>) -> Self
    where
        B: Into<Block>,
    {
        assert!(
            catch.is_some() || finally.is_some(),
            "a try statement must have a catch or finally block"
        );
        Self {
            block: block.into(),
            catch,
            finally,
        }
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn catch(&self) -> Option<&Catch> {
        self.catch.as_ref()
    }

    pub fn finally(&self) -> Option<&Finally> {
        self.finally.as_ref()
    }
}

impl From<Try> for Node {
    fn from(try_catch: Try) -> Self {
        Self::Try(Box::new(try_catch))
    }
}

/// The `catch` clause, with optional binding (identifier or pattern).
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Catch {
    parameter: Option<Box<Declaration>>,
    block: Block,
}

impl Catch {
    pub fn new<P, B>(parameter: P, block: B) -> Self
    where
        P: Into<Option<Declaration>>,
        B: Into<Block>,
    {
        Self {
            parameter: parameter.into().map(Box::new),
            block: block.into(),
        }
    }

    pub fn parameter(&self) -> Option<&Declaration> {
        self.parameter.as_ref().map(Box::as_ref)
    }

    pub fn block(&self) -> &Block {
        &self.block
    }
}

/// The `finally` clause.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Finally {
    block: Block,
}

impl Finally {
    pub fn block(&self) -> &Block {
        &self.block
    }
}

impl<T> From<T> for Finally
where
    T: Into<Block>,
{
    fn from(block: T) -> Self {
        Self {
            block: block.into(),
        }
    }
}

/// A labelled statement.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Labelled {
    label: Box<str>,
    stmt: Box<Node>,
}

impl Labelled {
    pub fn new<L, S>(label: L, stmt: S) -> Self
    where
        L: Into<Box<str>>,
        S: Into<Node>,
    {
        Self {
            label: label.into(),
            stmt: Box::new(stmt.into()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stmt(&self) -> &Node {
        &self.stmt
    }
}

impl From<Labelled> for Node {
    fn from(labelled: Labelled) -> Self {
        Self::Labelled(labelled)
    }
}

/// The legacy `with` statement: scopes identifier lookups through an
/// object. A `SyntaxError` in strict mode.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct With {
    expr: Box<Node>,
    stmt: Box<Node>,
}

impl With {
    pub fn new<E, S>(expr: E, stmt: S) -> Self
    where
        E: Into<Node>,
        S: Into<Node>,
    {
        Self {
            expr: Box::new(expr.into()),
            stmt: Box::new(stmt.into()),
        }
    }

    pub fn expr(&self) -> &Node {
        &self.expr
    }

    pub fn stmt(&self) -> &Node {
        &self.stmt
    }
}

impl From<With> for Node {
    fn from(with: With) -> Self {
        Self::With(with)
    }
}
