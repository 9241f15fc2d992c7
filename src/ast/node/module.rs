//! Module item nodes: imports, exports and the module body.

use crate::ast::Node;
use crate::gc::{empty_trace, Finalize, Trace};
use std::{ops::Deref, rc::Rc};

#[cfg(feature = "deser")]
use serde::{Deserialize, Serialize};

/// The body of a module: statements interleaved with import and export
/// declarations.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModuleItemList {
    items: Box<[ModuleItem]>,
}

impl ModuleItemList {
    pub fn items(&self) -> &[ModuleItem] {
        &self.items
    }

    /// The specifiers of every static import/re-export, in source order.
    pub fn requested_modules(&self) -> Vec<Box<str>> {
        let mut requested = Vec::new();
        for item in self.items() {
            match item {
                ModuleItem::Import(import) => requested.push(import.specifier().into()),
                ModuleItem::Export(ExportDecl::Named {
                    from: Some(from), ..
                }) => requested.push(from.clone()),
                ModuleItem::Export(ExportDecl::All { from, .. }) => requested.push(from.clone()),
                _ => {}
            }
        }
        requested
    }
}

impl From<Vec<ModuleItem>> for ModuleItemList {
    fn from(items: Vec<ModuleItem>) -> Self {
        Self {
            items: items.into_boxed_slice(),
        }
    }
}

impl Deref for ModuleItemList {
    type Target = [ModuleItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

/// A shared handle to a module body.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Debug, Finalize, PartialEq)]
pub struct RcModuleItemList(Rc<ModuleItemList>);

impl Clone for RcModuleItemList {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

// Safety: the AST holds no garbage collected references.
unsafe impl Trace for RcModuleItemList {
    empty_trace!();
}

impl Deref for RcModuleItemList {
    type Target = ModuleItemList;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ModuleItemList> for RcModuleItemList {
    fn from(list: ModuleItemList) -> Self {
        Self(Rc::from(list))
    }
}

/// One item of a module body.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ModuleItem {
    Statement(Node),
    Import(ImportDecl),
    Export(ExportDecl),
}

impl From<Node> for ModuleItem {
    fn from(node: Node) -> Self {
        Self::Statement(node)
    }
}

/// An `import` declaration.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ImportDecl {
    specifier: Box<str>,
    /// `import name from "..."`.
    default_binding: Option<Box<str>>,
    /// `import * as ns from "..."`.
    namespace_binding: Option<Box<str>>,
    /// `import { a, b as c } from "..."`.
    named: Box<[ImportSpecifier]>,
}

impl ImportDecl {
    pub fn new<S, D, N, L>(specifier: S, default_binding: D, namespace_binding: N, named: L) -> Self
    where
        S: Into<Box<str>>,
        D: Into<Option<Box<str>>>,
        N: Into<Option<Box<str>>>,
        L: Into<Box<[ImportSpecifier]>>,
    {
        Self {
            specifier: specifier.into(),
            default_binding: default_binding.into(),
            namespace_binding: namespace_binding.into(),
            named: named.into(),
        }
    }

    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn default_binding(&self) -> Option<&str> {
        self.default_binding.as_deref()
    }

    pub fn namespace_binding(&self) -> Option<&str> {
        self.namespace_binding.as_deref()
    }

    pub fn named(&self) -> &[ImportSpecifier] {
        &self.named
    }
}

impl From<ImportDecl> for ModuleItem {
    fn from(import: ImportDecl) -> Self {
        Self::Import(import)
    }
}

/// A single named import binding.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ImportSpecifier {
    import_name: Box<str>,
    local_name: Box<str>,
}

impl ImportSpecifier {
    pub fn new<I, L>(import_name: I, local_name: L) -> Self
    where
        I: Into<Box<str>>,
        L: Into<Box<str>>,
    {
        Self {
            import_name: import_name.into(),
            local_name: local_name.into(),
        }
    }

    pub fn import_name(&self) -> &str {
        &self.import_name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

/// An `export` declaration.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ExportDecl {
    /// `export { a, b as c }` optionally re-exporting `from` a module.
    Named {
        specifiers: Box<[ExportSpecifier]>,
        from: Option<Box<str>>,
    },
    /// `export <var/let/const/function/class declaration>`.
    Declaration(Node),
    /// `export default <expression>`.
    Default(Node),
    /// `export * from "..."`, optionally `as ns`.
    All {
        from: Box<str>,
        alias: Option<Box<str>>,
    },
}

impl From<ExportDecl> for ModuleItem {
    fn from(export: ExportDecl) -> Self {
        Self::Export(export)
    }
}

/// A single named export binding.
#[cfg_attr(feature = "deser", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSpecifier {
    local_name: Box<str>,
    export_name: Box<str>,
}

impl ExportSpecifier {
    pub fn new<L, E>(local_name: L, export_name: E) -> Self
    where
        L: Into<Box<str>>,
        E: Into<Box<str>>,
    {
        Self {
            local_name: local_name.into(),
            export_name: export_name.into(),
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn export_name(&self) -> &str {
        &self.export_name
    }
}
