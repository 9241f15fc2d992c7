//! Declaration nodes: variable declaration lists, binding patterns,
//! formal parameters and the function family.

use crate::ast::{node::StatementList, Node};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// A property name in an object literal, class element or binding pattern:
/// either a literal string or a computed expression.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyName {
    Literal(Box<str>),
    Computed(Box<Node>),
}

impl PropertyName {
    /// The literal name, when there is one.
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Computed(_) => None,
        }
    }
}

impl From<&str> for PropertyName {
    fn from(name: &str) -> Self {
        Self::Literal(name.into())
    }
}

impl From<Node> for PropertyName {
    fn from(node: Node) -> Self {
        Self::Computed(Box::new(node))
    }
}

/// The target of a single declarator: a plain identifier or a
/// destructuring pattern.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationBinding {
    Identifier(Box<str>),
    Pattern(DeclarationPattern),
}

/// A single declarator: binding target plus optional initializer.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    binding: DeclarationBinding,
    init: Option<Node>,
}

impl Declaration {
    /// Creates a declarator binding a plain identifier.
    pub fn new<N, I>(name: N, init: I) -> Self
    where
        N: Into<Box<str>>,
        I: Into<Option<Node>>,
    {
        Self {
            binding: DeclarationBinding::Identifier(name.into()),
            init: init.into(),
        }
    }

    /// Creates a declarator binding a destructuring pattern.
    pub fn new_with_pattern<I>(pattern: DeclarationPattern, init: I) -> Self
    where
        I: Into<Option<Node>>,
    {
        Self {
            binding: DeclarationBinding::Pattern(pattern),
            init: init.into(),
        }
    }

    pub fn binding(&self) -> &DeclarationBinding {
        &self.binding
    }

    pub fn init(&self) -> Option<&Node> {
        self.init.as_ref()
    }

    /// The bound identifier, for the common non-pattern case.
    pub fn name(&self) -> Option<&str> {
        match self.binding {
            DeclarationBinding::Identifier(ref name) => Some(name),
            DeclarationBinding::Pattern(_) => None,
        }
    }

    /// Every identifier this declarator introduces.
    pub fn bound_names(&self) -> Vec<Box<str>> {
        match &self.binding {
            DeclarationBinding::Identifier(name) => vec![name.clone()],
            DeclarationBinding::Pattern(pattern) => pattern.bound_names(),
        }
    }
}

/// A destructuring binding pattern.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationPattern {
    Object(DeclarationPatternObject),
    Array(DeclarationPatternArray),
}

impl DeclarationPattern {
    pub fn bound_names(&self) -> Vec<Box<str>> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names(&self, out: &mut Vec<Box<str>>) {
        match self {
            Self::Object(object) => {
                for binding in object.bindings() {
                    match binding {
                        BindingPatternTypeObject::SingleName { ident, .. }
                        | BindingPatternTypeObject::RestProperty { ident, .. } => {
                            out.push(ident.clone());
                        }
                        BindingPatternTypeObject::BindingPattern { pattern, .. } => {
                            pattern.collect_bound_names(out);
                        }
                    }
                }
            }
            Self::Array(array) => {
                for binding in array.bindings() {
                    match binding {
                        BindingPatternTypeArray::Elision => {}
                        BindingPatternTypeArray::SingleName { ident, .. }
                        | BindingPatternTypeArray::SingleNameRest { ident } => {
                            out.push(ident.clone());
                        }
                        BindingPatternTypeArray::BindingPattern { pattern, .. }
                        | BindingPatternTypeArray::BindingPatternRest { pattern } => {
                            pattern.collect_bound_names(out);
                        }
                    }
                }
            }
        }
    }
}

/// An object destructuring pattern, `{ a, b: c = 1, ...rest }`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DeclarationPatternObject {
    bindings: Vec<BindingPatternTypeObject>,
}

impl DeclarationPatternObject {
    pub fn new(bindings: Vec<BindingPatternTypeObject>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[BindingPatternTypeObject] {
        &self.bindings
    }
}

/// An array destructuring pattern, `[a, , b = 1, [c], ...rest]`.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DeclarationPatternArray {
    bindings: Vec<BindingPatternTypeArray>,
}

impl DeclarationPatternArray {
    pub fn new(bindings: Vec<BindingPatternTypeArray>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[BindingPatternTypeArray] {
        &self.bindings
    }
}

/// One element of an object binding pattern.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum BindingPatternTypeObject {
    /// `{ property_name: ident = default_init }`
    SingleName {
        ident: Box<str>,
        property_name: PropertyName,
        default_init: Option<Node>,
    },
    /// `{ ...ident }`, excluding the keys already destructured.
    RestProperty {
        ident: Box<str>,
        excluded_keys: Vec<Box<str>>,
    },
    /// `{ property_name: <pattern> = default_init }`
    BindingPattern {
        property_name: PropertyName,
        pattern: DeclarationPattern,
        default_init: Option<Node>,
    },
}

/// One element of an array binding pattern.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum BindingPatternTypeArray {
    /// A hole, `[a, , b]`.
    Elision,
    /// `[ ident = default_init ]`
    SingleName {
        ident: Box<str>,
        default_init: Option<Node>,
    },
    /// `[ <pattern> = default_init ]`
    BindingPattern {
        pattern: DeclarationPattern,
        default_init: Option<Node>,
    },
    /// `[ ...ident ]`
    SingleNameRest { ident: Box<str> },
    /// `[ ...<pattern> ]`
    BindingPatternRest { pattern: DeclarationPattern },
}

macro_rules! decl_list {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            list: Box<[Declaration]>,
        }

        impl $name {
            pub fn new<L>(list: L) -> Self
            where
                L: Into<Box<[Declaration]>>,
            {
                Self { list: list.into() }
            }

            pub fn as_ref(&self) -> &[Declaration] {
                &self.list
            }
        }

        impl From<Vec<Declaration>> for $name {
            fn from(list: Vec<Declaration>) -> Self {
                Self::new(list)
            }
        }

        impl From<$name> for Node {
            fn from(list: $name) -> Self {
                Self::$name(list)
            }
        }
    };
}

decl_list!(VarDeclList, "A `var` declaration list.");
decl_list!(LetDeclList, "A `let` declaration list.");
decl_list!(ConstDeclList, "A `const` declaration list.");

/// A formal parameter: declarator (identifier or pattern, with optional
/// default) plus the rest marker.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FormalParameter {
    declaration: Declaration,
    is_rest_param: bool,
}

impl FormalParameter {
    pub fn new(declaration: Declaration, is_rest_param: bool) -> Self {
        Self {
            declaration,
            is_rest_param,
        }
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn is_rest_param(&self) -> bool {
        self.is_rest_param
    }

    /// A parameter is "simple" when it is a plain identifier with no
    /// default. A function whose parameters are all simple shares one
    /// environment between parameters and body and may get a mapped
    /// `arguments` object.
    pub fn is_simple(&self) -> bool {
        !self.is_rest_param
            && self.declaration.init().is_none()
            && matches!(self.declaration.binding(), DeclarationBinding::Identifier(_))
    }

    pub fn names(&self) -> Vec<Box<str>> {
        self.declaration.bound_names()
    }
}

macro_rules! function_node {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            name: Option<Box<str>>,
            parameters: Box<[FormalParameter]>,
            body: StatementList,
        }

        impl $name {
            pub fn new<N, P, B>(name: N, parameters: P, body: B) -> Self
            where
                N: Into<Option<Box<str>>>,
                P: Into<Box<[FormalParameter]>>,
                B: Into<StatementList>,
            {
                Self {
                    name: name.into(),
                    parameters: parameters.into(),
                    body: body.into(),
                }
            }

            pub fn name(&self) -> Option<&str> {
                self.name.as_deref()
            }

            pub fn parameters(&self) -> &[FormalParameter] {
                &self.parameters
            }

            pub fn body(&self) -> &StatementList {
                &self.body
            }
        }

        impl From<$name> for Node {
            fn from(decl: $name) -> Self {
                Self::$name(decl)
            }
        }
    };
}

function_node!(FunctionDecl, "A function declaration.");
function_node!(FunctionExpr, "A function expression.");
function_node!(GeneratorDecl, "A generator function declaration.");
function_node!(GeneratorExpr, "A generator function expression.");
function_node!(AsyncFunctionDecl, "An async function declaration.");
function_node!(AsyncFunctionExpr, "An async function expression.");
function_node!(AsyncGeneratorDecl, "An async generator function declaration.");
function_node!(AsyncGeneratorExpr, "An async generator function expression.");

/// An arrow function. Expression bodies are represented as a single
/// `return` statement by the producing parser.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowFunctionDecl {
    parameters: Box<[FormalParameter]>,
    body: StatementList,
}

impl ArrowFunctionDecl {
    pub fn new<P, B>(parameters: P, body: B) -> Self
    where
        P: Into<Box<[FormalParameter]>>,
        B: Into<StatementList>,
    {
        Self {
            parameters: parameters.into(),
            body: body.into(),
        }
    }

    pub fn parameters(&self) -> &[FormalParameter] {
        &self.parameters
    }

    pub fn body(&self) -> &StatementList {
        &self.body
    }
}

impl From<ArrowFunctionDecl> for Node {
    fn from(decl: ArrowFunctionDecl) -> Self {
        Self::ArrowFunctionDecl(decl)
    }
}
