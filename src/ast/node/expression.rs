//! Expression nodes.

use crate::ast::{
    node::{DeclarationPattern, FunctionExpr, PropertyName},
    op, Node,
};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// An identifier reference.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier(Box<str>);

impl Identifier {
    pub fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<T> From<T> for Identifier
where
    T: Into<Box<str>>,
{
    fn from(name: T) -> Self {
        Self(name.into())
    }
}

impl From<Identifier> for Node {
    fn from(local: Identifier) -> Self {
        Self::Identifier(local)
    }
}

/// A function call.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    expr: Box<Node>,
    args: Box<[Node]>,
}

impl Call {
    /// Creates a new `Call` AST node.
    pub fn new<E, A>(expr: E, args: A) -> Self
    where
        E: Into<Node>,
        A: Into<Box<[Node]>>,
    {
        Self {
            expr: Box::new(expr.into()),
            args: args.into(),
        }
    }

    /// Gets the target of the function call.
    pub fn expr(&self) -> &Node {
        &self.expr
    }

    /// Retrieves the arguments of the function call.
    pub fn args(&self) -> &[Node] {
        &self.args
    }
}

impl From<Call> for Node {
    fn from(call: Call) -> Self {
        Self::Call(call)
    }
}

/// The `new` operator: instance construction.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct New {
    call: Call,
}

impl New {
    /// Gets the constructor expression.
    pub fn expr(&self) -> &Node {
        self.call.expr()
    }

    /// Retrieves the arguments passed to the constructor.
    pub fn args(&self) -> &[Node] {
        self.call.args()
    }
}

impl From<Call> for New {
    fn from(call: Call) -> Self {
        Self { call }
    }
}

impl From<New> for Node {
    fn from(new: New) -> Self {
        Self::New(new)
    }
}

/// Named member access, `obj.field`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GetConstField {
    obj: Box<Node>,
    field: Box<str>,
}

impl GetConstField {
    /// Creates a `GetConstField` AST node.
    pub fn new<V, L>(value: V, label: L) -> Self
    where
        V: Into<Node>,
        L: Into<Box<str>>,
    {
        Self {
            obj: Box::new(value.into()),
            field: label.into(),
        }
    }

    pub fn obj(&self) -> &Node {
        &self.obj
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl From<GetConstField> for Node {
    fn from(get_const_field: GetConstField) -> Self {
        Self::GetConstField(get_const_field)
    }
}

/// Computed member access, `obj[key]`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GetField {
    obj: Box<Node>,
    field: Box<Node>,
}

impl GetField {
    /// Creates a `GetField` AST node.
    pub fn new<V, F>(value: V, field: F) -> Self
    where
        V: Into<Node>,
        F: Into<Node>,
    {
        Self {
            obj: Box::new(value.into()),
            field: Box::new(field.into()),
        }
    }

    pub fn obj(&self) -> &Node {
        &self.obj
    }

    pub fn field(&self) -> &Node {
        &self.field
    }
}

impl From<GetField> for Node {
    fn from(get_field: GetField) -> Self {
        Self::GetField(get_field)
    }
}

/// Private member access, `obj.#field`. Only legal inside the class body
/// that declares the field.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GetPrivateField {
    obj: Box<Node>,
    field: Box<str>,
}

impl GetPrivateField {
    /// Creates a `GetPrivateField` AST node; `field` is the name after `#`.
    pub fn new<V, L>(value: V, field: L) -> Self
    where
        V: Into<Node>,
        L: Into<Box<str>>,
    {
        Self {
            obj: Box::new(value.into()),
            field: field.into(),
        }
    }

    pub fn obj(&self) -> &Node {
        &self.obj
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl From<GetPrivateField> for Node {
    fn from(get_private_field: GetPrivateField) -> Self {
        Self::GetPrivateField(get_private_field)
    }
}

/// An optional chain, `a?.b.c()`. The whole chain short-circuits to
/// `undefined` as soon as a `?.`-guarded base is nullish.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Optional {
    target: Box<Node>,
    chain: Box<[OptionalOperation]>,
}

impl Optional {
    pub fn new<T, C>(target: T, chain: C) -> Self
    where
        T: Into<Node>,
        C: Into<Box<[OptionalOperation]>>,
    {
        Self {
            target: Box::new(target.into()),
            chain: chain.into(),
        }
    }

    pub fn target(&self) -> &Node {
        &self.target
    }

    pub fn chain(&self) -> &[OptionalOperation] {
        &self.chain
    }
}

impl From<Optional> for Node {
    fn from(optional: Optional) -> Self {
        Self::Optional(optional)
    }
}

/// One link of an optional chain.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OptionalOperation {
    kind: OptionalOperationKind,
    /// Whether this link was written with `?.` and therefore guards the
    /// chain against a nullish base.
    shorts: bool,
}

impl OptionalOperation {
    pub fn new(kind: OptionalOperationKind, shorts: bool) -> Self {
        Self { kind, shorts }
    }

    pub fn kind(&self) -> &OptionalOperationKind {
        &self.kind
    }

    pub fn shorts(&self) -> bool {
        self.shorts
    }
}

#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum OptionalOperationKind {
    /// `?.field`
    SimplePropertyAccess { field: Box<str> },
    /// `?.[key]`
    ComputedPropertyAccess(Box<Node>),
    /// `?.(args)`
    Call { args: Box<[Node]> },
}

/// The spread operator, `...x`, in calls and literals.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Spread {
    val: Box<Node>,
}

impl Spread {
    pub fn new<V>(val: V) -> Self
    where
        V: Into<Node>,
    {
        Self {
            val: Box::new(val.into()),
        }
    }

    pub fn val(&self) -> &Node {
        &self.val
    }
}

impl From<Spread> for Node {
    fn from(spread: Spread) -> Self {
        Self::Spread(spread)
    }
}

/// An array literal.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayDecl {
    arr: Box<[Node]>,
}

impl ArrayDecl {
    /// Elisions are represented with [`Node::Empty`].
    pub fn new<A>(array: A) -> Self
    where
        A: Into<Box<[Node]>>,
    {
        Self { arr: array.into() }
    }

    pub fn as_ref(&self) -> &[Node] {
        &self.arr
    }
}

impl From<Vec<Node>> for ArrayDecl {
    fn from(array: Vec<Node>) -> Self {
        Self::new(array)
    }
}

impl From<ArrayDecl> for Node {
    fn from(array: ArrayDecl) -> Self {
        Self::ArrayDecl(array)
    }
}

/// An object literal.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    properties: Box<[PropertyDefinition]>,
}

impl Object {
    pub fn new<P>(properties: P) -> Self
    where
        P: Into<Box<[PropertyDefinition]>>,
    {
        Self {
            properties: properties.into(),
        }
    }

    pub fn properties(&self) -> &[PropertyDefinition] {
        &self.properties
    }
}

impl From<Vec<PropertyDefinition>> for Object {
    fn from(properties: Vec<PropertyDefinition>) -> Self {
        Self::new(properties)
    }
}

impl From<Object> for Node {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

/// A member of an object literal.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyDefinition {
    /// Shorthand `{ a }`.
    IdentifierReference(Box<str>),
    /// `{ name: value }`.
    Property(PropertyName, Node),
    /// `{ name() {} }`, getters, setters and generator/async methods.
    MethodDefinition(MethodDefinitionKind, PropertyName, FunctionExpr),
    /// `{ ...obj }`.
    SpreadObject(Node),
}

impl PropertyDefinition {
    /// Creates a `Property` definition.
    pub fn property<N, V>(name: N, value: V) -> Self
    where
        N: Into<PropertyName>,
        V: Into<Node>,
    {
        Self::Property(name.into(), value.into())
    }

    /// Creates a `MethodDefinition`.
    pub fn method_definition<N>(kind: MethodDefinitionKind, name: N, body: FunctionExpr) -> Self
    where
        N: Into<PropertyName>,
    {
        Self::MethodDefinition(kind, name.into(), body)
    }

    /// Creates a `SpreadObject`.
    pub fn spread_object<V>(value: V) -> Self
    where
        V: Into<Node>,
    {
        Self::SpreadObject(value.into())
    }
}

/// The flavor of a method definition.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodDefinitionKind {
    Get,
    Set,
    Ordinary,
    Generator,
    Async,
    AsyncGenerator,
}

/// A template literal. Tagged templates are a host concern.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateLit {
    elements: Box<[TemplateElement]>,
}

impl TemplateLit {
    pub fn new<E>(elements: E) -> Self
    where
        E: Into<Box<[TemplateElement]>>,
    {
        Self {
            elements: elements.into(),
        }
    }

    pub fn elements(&self) -> &[TemplateElement] {
        &self.elements
    }
}

impl From<TemplateLit> for Node {
    fn from(template: TemplateLit) -> Self {
        Self::TemplateLit(template)
    }
}

#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateElement {
    String(Box<str>),
    Expr(Node),
}

/// The ternary conditional operator.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalOp {
    condition: Box<Node>,
    if_true: Box<Node>,
    if_false: Box<Node>,
}

impl ConditionalOp {
    pub fn new<C, T, F>(condition: C, if_true: T, if_false: F) -> Self
    where
        C: Into<Node>,
        T: Into<Node>,
        F: Into<Node>,
    {
        Self {
            condition: Box::new(condition.into()),
            if_true: Box::new(if_true.into()),
            if_false: Box::new(if_false.into()),
        }
    }

    pub fn cond(&self) -> &Node {
        &self.condition
    }

    pub fn if_true(&self) -> &Node {
        &self.if_true
    }

    pub fn if_false(&self) -> &Node {
        &self.if_false
    }
}

impl From<ConditionalOp> for Node {
    fn from(cond_op: ConditionalOp) -> Self {
        Self::ConditionalOp(cond_op)
    }
}

/// A binary operation.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BinOp {
    op: op::BinOp,
    lhs: Box<Node>,
    rhs: Box<Node>,
}

impl BinOp {
    /// Creates a `BinOp` AST node.
    pub fn new<O, L, R>(op: O, lhs: L, rhs: R) -> Self
    where
        O: Into<op::BinOp>,
        L: Into<Node>,
        R: Into<Node>,
    {
        Self {
            op: op.into(),
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn op(&self) -> op::BinOp {
        self.op
    }

    pub fn lhs(&self) -> &Node {
        &self.lhs
    }

    pub fn rhs(&self) -> &Node {
        &self.rhs
    }
}

impl From<BinOp> for Node {
    fn from(op: BinOp) -> Self {
        Self::BinOp(op)
    }
}

/// A unary operation.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct UnaryOp {
    op: op::UnaryOp,
    target: Box<Node>,
}

impl UnaryOp {
    /// Creates a new `UnaryOp` AST node.
    pub fn new<V>(op: op::UnaryOp, target: V) -> Self
    where
        V: Into<Node>,
    {
        Self {
            op,
            target: Box::new(target.into()),
        }
    }

    pub fn op(&self) -> op::UnaryOp {
        self.op
    }

    pub fn target(&self) -> &Node {
        &self.target
    }
}

impl From<UnaryOp> for Node {
    fn from(op: UnaryOp) -> Self {
        Self::UnaryOp(op)
    }
}

/// The target of an assignment.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum AssignTarget {
    Identifier(Box<str>),
    Field(GetConstField),
    IndexedField(GetField),
    PrivateField(GetPrivateField),
    SuperField(GetSuperField),
    /// Destructuring assignment, `[a, b] = c`.
    Pattern(DeclarationPattern),
}

/// An assignment, `lhs = rhs`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    lhs: AssignTarget,
    rhs: Box<Node>,
}

impl Assign {
    /// Creates an `Assign` AST node.
    pub fn new<R>(lhs: AssignTarget, rhs: R) -> Self
    where
        R: Into<Node>,
    {
        Self {
            lhs,
            rhs: Box::new(rhs.into()),
        }
    }

    pub fn lhs(&self) -> &AssignTarget {
        &self.lhs
    }

    pub fn rhs(&self) -> &Node {
        &self.rhs
    }
}

impl From<Assign> for Node {
    fn from(op: Assign) -> Self {
        Self::Assign(op)
    }
}

/// The `yield` expression, which suspends a generator.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Yield {
    expr: Option<Box<Node>>,
    delegate: bool,
}

impl Yield {
    /// Creates a `Yield` AST node; `delegate` is `yield*`.
    pub fn new<E, OE>(expr: OE, delegate: bool) -> Self
    where
        E: Into<Node>,
        OE: Into<Option<E>>,
    {
        Self {
            expr: expr.into().map(E::into).map(Box::new),
            delegate,
        }
    }

    pub fn expr(&self) -> Option<&Node> {
        self.expr.as_ref().map(Box::as_ref)
    }

    pub fn delegate(&self) -> bool {
        self.delegate
    }
}

impl From<Yield> for Node {
    fn from(r#yield: Yield) -> Self {
        Self::Yield(r#yield)
    }
}

/// An `await` expression.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AwaitExpr {
    expr: Box<Node>,
}

impl AwaitExpr {
    pub fn new<E>(expr: E) -> Self
    where
        E: Into<Node>,
    {
        Self {
            expr: Box::new(expr.into()),
        }
    }

    pub fn expr(&self) -> &Node {
        &self.expr
    }
}

impl From<AwaitExpr> for Node {
    fn from(awaitexpr: AwaitExpr) -> Self {
        Self::AwaitExpr(awaitexpr)
    }
}

/// A `super(...)` call, only valid in derived class constructors.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SuperCall {
    args: Box<[Node]>,
}

impl SuperCall {
    pub fn new<A>(args: A) -> Self
    where
        A: Into<Box<[Node]>>,
    {
        Self { args: args.into() }
    }

    pub fn args(&self) -> &[Node] {
        &self.args
    }
}

impl From<SuperCall> for Node {
    fn from(super_call: SuperCall) -> Self {
        Self::SuperCall(super_call)
    }
}

/// `super.field` / `super[key]`: lookup starts at the parent prototype but
/// the receiver stays the current `this`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum GetSuperField {
    Const(Box<str>),
    Expr(Box<Node>),
}

impl From<GetSuperField> for Node {
    fn from(get_super_field: GetSuperField) -> Self {
        Self::GetSuperField(get_super_field)
    }
}

/// A dynamic `import(specifier)` expression, producing a promise of the
/// module namespace.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ImportCall {
    specifier: Box<Node>,
}

impl ImportCall {
    pub fn new<S>(specifier: S) -> Self
    where
        S: Into<Node>,
    {
        Self {
            specifier: Box::new(specifier.into()),
        }
    }

    pub fn specifier(&self) -> &Node {
        &self.specifier
    }
}

impl From<ImportCall> for Node {
    fn from(import_call: ImportCall) -> Self {
        Self::ImportCall(import_call)
    }
}
