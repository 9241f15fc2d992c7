//! Class declaration and expression nodes.

use crate::ast::{
    node::{FormalParameter, MethodDefinitionKind, PropertyName, StatementList},
    Node,
};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// A class definition: heritage clause, optional constructor and the
/// member elements in source order.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    name: Option<Box<str>>,
    /// The `extends` expression. `extends null` is `Const::Null` here.
    heritage: Option<Box<Node>>,
    constructor: Option<ClassConstructor>,
    elements: Box<[ClassElement]>,
}

impl Class {
    pub fn new<N, H, E>(
        name: N,
        heritage: H,
        constructor: Option<ClassConstructor>,
        elements: E,
    ) -> Self
    where
        N: Into<Option<Box<str>>>,
        H: Into<Option<Node>>,
        E: Into<Box<[ClassElement]>>,
    {
        Self {
            name: name.into(),
            heritage: heritage.into().map(Box::new),
            constructor,
            elements: elements.into(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn heritage(&self) -> Option<&Node> {
        self.heritage.as_ref().map(Box::as_ref)
    }

    pub fn constructor(&self) -> Option<&ClassConstructor> {
        self.constructor.as_ref()
    }

    pub fn elements(&self) -> &[ClassElement] {
        &self.elements
    }

    /// The instance field declarations, in definition order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &ClassElement> {
        self.elements.iter().filter(|element| {
            matches!(
                element,
                ClassElement::Field {
                    is_static: false,
                    ..
                }
            )
        })
    }
}

impl From<Class> for Node {
    fn from(class: Class) -> Self {
        Self::ClassExpr(class)
    }
}

/// The designated constructor of a class.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ClassConstructor {
    parameters: Box<[FormalParameter]>,
    body: StatementList,
}

impl ClassConstructor {
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

/// The name of a class element: a public property name or a `#private`
/// name.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ClassElementName {
    Property(PropertyName),
    Private(Box<str>),
}

impl From<&str> for ClassElementName {
    fn from(name: &str) -> Self {
        Self::Property(name.into())
    }
}

/// A member of a class body.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ClassElement {
    /// A prototype or static method, including getters and setters.
    Method {
        name: ClassElementName,
        kind: MethodDefinitionKind,
        parameters: Box<[FormalParameter]>,
        body: StatementList,
        is_static: bool,
    },
    /// An instance or static field with optional initializer.
    Field {
        name: ClassElementName,
        init: Option<Node>,
        is_static: bool,
    },
    /// A `static {}` initialization block.
    StaticBlock(StatementList),
}
