//! The ES module system: loader and resolver callbacks, the module
//! registry, cycle tolerant linking with live bindings, synchronous and
//! top-level-await evaluation, dynamic `import()` and `import.meta`.

#[cfg(test)]
mod tests;

use crate::{
    ast::node::{
        Declaration, ExportDecl, ImportCall, LetDeclList, ModuleItem, ModuleItemList, Node,
        RcModuleItemList, StatementList,
    },
    environment::{new_module_environment, Environment},
    exec::{hoisting, Executable, Flow},
    gc::{Cell, Finalize, Gc, Trace},
    object::{JsObject, Object, ObjectData},
    string::JsString,
    value::JsValue,
    Context, JsResult, Profiler,
};
use rustc_hash::FxHashMap;

/// The loader callback: module id to parsed module body. The embedder owns
/// the parser, so the callback yields an AST, not source text.
pub type ModuleLoader = Box<dyn Fn(&str, &mut Context) -> JsResult<ModuleItemList>>;

/// The resolver callback: `(specifier, importer)` to module id.
pub type ModuleResolver = Box<dyn Fn(&str, &str) -> String>;

/// The lifecycle of a module record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    Unlinked,
    Linking,
    Linked,
    Evaluating,
    EvaluatingAsync,
    Evaluated,
    Error,
}

/// How an export name resolves.
#[derive(Debug, Clone, Trace, Finalize)]
pub(crate) enum ExportEntry {
    /// A binding of this module's own environment.
    Local(JsString),
    /// Re-export from another module.
    Indirect {
        module_id: JsString,
        import_name: JsString,
    },
    /// `export * as ns from "..."`.
    Namespace { module_id: JsString },
}

/// An ES module record.
#[derive(Debug, Trace, Finalize)]
pub struct ModuleRecord {
    id: JsString,
    #[unsafe_ignore_trace]
    status: ModuleStatus,
    environment: Environment,
    namespace: Option<JsObject>,
    exports: FxHashMap<JsString, ExportEntry>,
    /// Module ids of `export * from` sources, searched as a fallback.
    star_exports: Vec<JsString>,
    ast: RcModuleItemList,
    requested: Vec<JsString>,
    dependencies: Vec<Gc<Cell<ModuleRecord>>>,
    #[unsafe_ignore_trace]
    has_top_level_await: bool,
    evaluation_promise: Option<JsObject>,
    #[unsafe_ignore_trace]
    dfs_index: Option<u32>,
    #[unsafe_ignore_trace]
    dfs_ancestor_index: Option<u32>,
    error: Option<JsValue>,
}

impl ModuleRecord {
    pub fn id(&self) -> &JsString {
        &self.id
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    pub(crate) fn environment(&self) -> Environment {
        self.environment.clone()
    }

    pub fn evaluation_promise(&self) -> Option<JsObject> {
        self.evaluation_promise.clone()
    }

    /// Resolves an export name of this module to the environment and
    /// binding that backs it.
    fn export_entry(&self, name: &str) -> Option<ExportEntry> {
        self.exports.get(name).cloned()
    }
}

pub type ModuleRef = Gc<Cell<ModuleRecord>>;

/// Loads (and registers) a module and its dependency graph. A module
/// already in the registry is returned as-is, even while it is still
/// loading; that is what makes cycles work.
pub(crate) fn load_module(
    specifier: &str,
    importer: &str,
    context: &mut Context,
) -> JsResult<ModuleRef> {
    let _timer = Profiler::global().start_event("load_module", "module");
    let id = context.resolve_module_specifier(specifier, importer);

    if let Some(existing) = context.realm().module(&id) {
        return Ok(existing);
    }

    let ast = context.load_module_source(&id)?;
    let has_top_level_await = hoisting::module_has_top_level_await(ast.items());
    let requested = ast.requested_modules();
    let environment = new_module_environment(Some(context.global_environment()));

    let record = Gc::new(Cell::new(ModuleRecord {
        id: id.clone(),
        status: ModuleStatus::Unlinked,
        environment,
        namespace: None,
        exports: FxHashMap::default(),
        star_exports: Vec::new(),
        ast: RcModuleItemList::from(ast),
        requested: requested.iter().map(|r| JsString::from(r.as_ref())).collect(),
        dependencies: Vec::new(),
        has_top_level_await,
        evaluation_promise: None,
        dfs_index: None,
        dfs_ancestor_index: None,
        error: None,
    }));

    // Registered before dependencies load, so a dependency cycle finds
    // this record instead of recursing forever.
    context.realm_mut().register_module(id.clone(), record.clone());

    record.borrow_mut().status = ModuleStatus::Linking;

    // The export table depends only on this module's AST, and members of
    // a dependency cycle link their imports against it before this module
    // finishes loading.
    collect_exports(&record, &id, context);

    let requested = record.borrow().requested.clone();
    for request in &requested {
        let dependency = load_module(request, &id, context)?;
        record.borrow_mut().dependencies.push(dependency);
    }

    link_imports(&record, &id, context)?;

    record.borrow_mut().status = ModuleStatus::Linked;
    Ok(record)
}

/// Builds the export table from the module AST.
fn collect_exports(record: &ModuleRef, id: &JsString, context: &mut Context) {
    let ast = record.borrow().ast.clone();
    let mut exports = FxHashMap::default();
    let mut star_exports = Vec::new();

    for item in ast.items() {
        let export = match item {
            ModuleItem::Export(export) => export,
            _ => continue,
        };
        match export {
            ExportDecl::Named { specifiers, from } => {
                for specifier in specifiers.iter() {
                    let entry = match from {
                        None => ExportEntry::Local(specifier.local_name().into()),
                        Some(source) => ExportEntry::Indirect {
                            module_id: context
                                .resolve_module_specifier(source, id)
                                .clone(),
                            import_name: specifier.local_name().into(),
                        },
                    };
                    exports.insert(JsString::from(specifier.export_name()), entry);
                }
            }
            ExportDecl::Declaration(node) => {
                for name in declared_names(node) {
                    exports.insert(name.clone(), ExportEntry::Local(name));
                }
            }
            ExportDecl::Default(_) => {
                exports.insert(
                    "default".into(),
                    ExportEntry::Local(DEFAULT_EXPORT_BINDING.into()),
                );
            }
            ExportDecl::All { from, alias } => {
                let module_id = context.resolve_module_specifier(from, id);
                match alias {
                    Some(alias) => {
                        exports.insert(
                            JsString::from(alias.as_ref()),
                            ExportEntry::Namespace { module_id },
                        );
                    }
                    None => star_exports.push(module_id),
                }
            }
        }
    }

    let mut record = record.borrow_mut();
    record.exports = exports;
    record.star_exports = star_exports;
}

const DEFAULT_EXPORT_BINDING: &str = "*default*";

fn declared_names(node: &Node) -> Vec<JsString> {
    let mut names = Vec::new();
    match node {
        Node::VarDeclList(list) => collect_declaration_names(list.as_ref(), &mut names),
        Node::LetDeclList(list) => collect_declaration_names(list.as_ref(), &mut names),
        Node::ConstDeclList(list) => collect_declaration_names(list.as_ref(), &mut names),
        Node::FunctionDecl(decl) => {
            if let Some(name) = decl.name() {
                names.push(name.into());
            }
        }
        Node::ClassDecl(class) => {
            if let Some(name) = class.name() {
                names.push(name.into());
            }
        }
        _ => {}
    }
    names
}

fn collect_declaration_names(declarations: &[Declaration], out: &mut Vec<JsString>) {
    for declaration in declarations {
        for name in declaration.bound_names() {
            out.push(JsString::from(name.as_ref()));
        }
    }
}

/// Creates the import bindings of a module: read-only views into the
/// exporting modules' environments. Reads resolve lazily, which is what
/// gives cyclic imports their live-binding behavior.
fn link_imports(record: &ModuleRef, id: &JsString, context: &mut Context) -> JsResult<()> {
    let ast = record.borrow().ast.clone();
    for item in ast.items() {
        let import = match item {
            ModuleItem::Import(import) => import,
            _ => continue,
        };
        let dependency_id = context.resolve_module_specifier(import.specifier(), id);
        let dependency = match context.realm().module(&dependency_id) {
            Some(dependency) => dependency,
            None => {
                return context
                    .throw_reference_error(format!("module '{}' was not loaded", dependency_id))
            }
        };

        let environment = record.borrow().environment();
        if let Some(default_binding) = import.default_binding() {
            bind_import(
                &environment,
                default_binding,
                &dependency,
                "default",
                context,
            )?;
        }
        if let Some(namespace_binding) = import.namespace_binding() {
            let namespace = get_namespace(&dependency, context);
            environment.borrow_mut().create_binding_replay(
                namespace_binding.into(),
                crate::environment::BindingKind::Const,
                Some(namespace.into()),
            );
        }
        for specifier in import.named() {
            bind_import(
                &environment,
                specifier.local_name(),
                &dependency,
                specifier.import_name(),
                context,
            )?;
        }
    }
    Ok(())
}

fn bind_import(
    environment: &Environment,
    local_name: &str,
    dependency: &ModuleRef,
    import_name: &str,
    context: &mut Context,
) -> JsResult<()> {
    match resolve_export(dependency, import_name, context) {
        Some(ResolvedExport::Binding(source_env, source_name)) => {
            environment.borrow_mut().create_import_binding(
                local_name.into(),
                source_env,
                source_name,
            );
            Ok(())
        }
        Some(ResolvedExport::Namespace(namespace)) => {
            environment.borrow_mut().create_binding_replay(
                local_name.into(),
                crate::environment::BindingKind::Const,
                Some(namespace.into()),
            );
            Ok(())
        }
        None => context.throw_syntax_error(format!(
            "the requested module does not provide an export named '{}'",
            import_name
        )),
    }
}

enum ResolvedExport {
    Binding(Environment, JsString),
    Namespace(JsObject),
}

fn resolve_export(
    record: &ModuleRef,
    name: &str,
    context: &mut Context,
) -> Option<ResolvedExport> {
    let entry = record.borrow().export_entry(name);
    match entry {
        Some(ExportEntry::Local(ref local)) => {
            Some(ResolvedExport::Binding(record.borrow().environment(), local.clone()))
        }
        Some(ExportEntry::Indirect {
            ref module_id,
            ref import_name,
        }) => {
            let dependency = context.realm().module(&module_id)?;
            resolve_export(&dependency, &import_name, context)
        }
        Some(ExportEntry::Namespace { ref module_id }) => {
            let dependency = context.realm().module(&module_id)?;
            Some(ResolvedExport::Namespace(get_namespace(&dependency, context)))
        }
        None => {
            // `export * from` fallbacks, first match wins.
            let star_exports = record.borrow().star_exports.clone();
            for module_id in star_exports {
                if let Some(dependency) = context.realm().module(&module_id) {
                    if let Some(resolved) = resolve_export(&dependency, name, context) {
                        return Some(resolved);
                    }
                }
            }
            None
        }
    }
}

/// The module namespace exotic object, created lazily.
pub(crate) fn get_namespace(record: &ModuleRef, context: &mut Context) -> JsObject {
    if let Some(namespace) = record.borrow().namespace.clone() {
        return namespace;
    }
    let mut object = Object::default();
    object.data = ObjectData::ModuleNamespace(record.clone());
    object.prevent_extensions();
    let namespace = JsObject::new(object);
    let _ = context;
    record.borrow_mut().namespace = Some(namespace.clone());
    namespace
}

/// Reads an exported binding through a namespace object.
pub(crate) fn namespace_get(
    record: &ModuleRef,
    name: &str,
    context: &mut Context,
) -> JsResult<Option<JsValue>> {
    match resolve_export(record, name, context) {
        Some(ResolvedExport::Binding(environment, binding_name)) => {
            let value = environment.borrow().get_binding_value(&binding_name);
            match value {
                Ok(value) => Ok(Some(value)),
                Err(err) => Err(crate::exec::environment_error(err, context)),
            }
        }
        Some(ResolvedExport::Namespace(namespace)) => Ok(Some(namespace.into())),
        None => Ok(None),
    }
}

/// Every export name of a module, for namespace enumeration.
pub(crate) fn namespace_keys(record: &ModuleRef) -> Vec<JsString> {
    let mut keys: Vec<JsString> = record.borrow().exports.keys().cloned().collect();
    keys.sort();
    keys
}

/// Evaluates a module graph. Cyclic members evaluate exactly once; cycle
/// bookkeeping uses the DFS index / ancestor index pair.
pub(crate) fn evaluate_module(record: &ModuleRef, context: &mut Context) -> JsResult<()> {
    let mut index = 0;
    inner_evaluate(record, &mut index, context)
}

fn inner_evaluate(record: &ModuleRef, index: &mut u32, context: &mut Context) -> JsResult<()> {
    match record.borrow().status {
        ModuleStatus::Evaluated | ModuleStatus::EvaluatingAsync => return Ok(()),
        ModuleStatus::Error => {
            let error = record.borrow().error.clone().unwrap_or_default();
            return Err(Flow::Throw(error));
        }
        // A module already on the DFS stack: the cycle closes here and the
        // importer observes the live bindings as they fill in.
        ModuleStatus::Evaluating => return Ok(()),
        ModuleStatus::Unlinked | ModuleStatus::Linking => {
            return context.throw_syntax_error("module was not linked before evaluation")
        }
        ModuleStatus::Linked => {}
    }

    {
        let mut r = record.borrow_mut();
        r.status = ModuleStatus::Evaluating;
        r.dfs_index = Some(*index);
        r.dfs_ancestor_index = Some(*index);
    }
    *index += 1;

    let dependencies = record.borrow().dependencies.clone();
    for dependency in &dependencies {
        inner_evaluate(dependency, index, context)?;
        // Propagate the ancestor index through cycles.
        let dep_ancestor = dependency.borrow().dfs_ancestor_index;
        if dependency.borrow().status == ModuleStatus::Evaluating {
            let mut r = record.borrow_mut();
            let ancestor = r.dfs_ancestor_index.unwrap_or(u32::MAX);
            r.dfs_ancestor_index =
                Some(ancestor.min(dep_ancestor.unwrap_or(u32::MAX)));
        }
    }

    // Top level await propagates upwards: a parent of asynchronously
    // evaluating dependencies defers its own body until they settle.
    let pending: Vec<JsObject> = dependencies
        .iter()
        .filter_map(|dependency| {
            let dependency = dependency.borrow();
            if dependency.status == ModuleStatus::EvaluatingAsync {
                dependency.evaluation_promise.clone()
            } else {
                None
            }
        })
        .collect();

    if pending.is_empty() {
        execute_module_body(record, context)
    } else {
        defer_until_dependencies_settle(record, pending, context)
    }
}

/// Parks a module behind the evaluation promises of its async
/// dependencies; its body runs when the last one fulfills.
fn defer_until_dependencies_settle(
    record: &ModuleRef,
    pending: Vec<JsObject>,
    context: &mut Context,
) -> JsResult<()> {
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    record.borrow_mut().status = ModuleStatus::EvaluatingAsync;
    let capability = crate::builtins::promise::new_promise_capability(context)?;
    record.borrow_mut().evaluation_promise = Some(capability.promise.clone());

    let remaining = Rc::new(StdCell::new(pending.len()));
    for dependency_promise in pending {
        let on_fulfilled = {
            let record = record.clone();
            let remaining = Rc::clone(&remaining);
            let capability = capability.clone();
            crate::builtins::promise::native_closure(
                move |_this: &JsValue, _args: &[JsValue], context: &mut Context| {
                    remaining.set(remaining.get() - 1);
                    if remaining.get() != 0 {
                        return Ok(JsValue::undefined());
                    }
                    match execute_module_body(&record, context) {
                        Ok(()) => {
                            let own_promise = record.borrow().evaluation_promise.clone();
                            match record.borrow().status {
                                // The body itself had top level await:
                                // chain the settlement.
                                ModuleStatus::EvaluatingAsync => {
                                    if let Some(own_promise) = own_promise {
                                        let derived = crate::builtins::promise::new_promise_capability(context)?;
                                        crate::builtins::promise::perform_then(
                                            &own_promise,
                                            Some(capability.resolve.clone()),
                                            Some(capability.reject.clone()),
                                            derived,
                                            context,
                                        );
                                    }
                                }
                                _ => {
                                    record.borrow_mut().status = ModuleStatus::Evaluated;
                                    capability.resolve.call(
                                        &JsValue::undefined(),
                                        &[JsValue::undefined()],
                                        context,
                                    )?;
                                }
                            }
                            Ok(JsValue::undefined())
                        }
                        Err(Flow::Throw(error)) => {
                            {
                                let mut r = record.borrow_mut();
                                r.status = ModuleStatus::Error;
                                r.error = Some(error.clone());
                            }
                            capability.reject.call(
                                &JsValue::undefined(),
                                &[error],
                                context,
                            )?;
                            Ok(JsValue::undefined())
                        }
                        Err(flow) => Err(flow),
                    }
                },
                context,
            )
        };
        let on_rejected = {
            let record = record.clone();
            let capability = capability.clone();
            crate::builtins::promise::native_closure(
                move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                    let reason = args.first().cloned().unwrap_or_default();
                    {
                        let mut r = record.borrow_mut();
                        r.status = ModuleStatus::Error;
                        r.error = Some(reason.clone());
                    }
                    capability
                        .reject
                        .call(&JsValue::undefined(), &[reason], context)?;
                    Ok(JsValue::undefined())
                },
                context,
            )
        };
        let derived = crate::builtins::promise::new_promise_capability(context)?;
        crate::builtins::promise::perform_then(
            &dependency_promise,
            Some(on_fulfilled),
            Some(on_rejected),
            derived,
            context,
        );
    }
    Ok(())
}

/// Builds the executable statement list of a module body: statements and
/// exported declarations in source order, with `export default` lowered
/// onto its reserved binding.
fn module_body_statements(ast: &RcModuleItemList) -> StatementList {
    let mut statements = Vec::new();
    for item in ast.items() {
        match item {
            ModuleItem::Statement(node) => statements.push(node.clone()),
            ModuleItem::Export(ExportDecl::Declaration(node)) => statements.push(node.clone()),
            ModuleItem::Export(ExportDecl::Default(node)) => {
                statements.push(
                    LetDeclList::new(vec![Declaration::new(
                        DEFAULT_EXPORT_BINDING,
                        Some(node.clone()),
                    )])
                    .into(),
                );
            }
            ModuleItem::Import(_) | ModuleItem::Export(_) => {}
        }
    }
    StatementList::from(statements)
}

fn execute_module_body(record: &ModuleRef, context: &mut Context) -> JsResult<()> {
    let (ast, environment, has_tla) = {
        let r = record.borrow();
        (r.ast.clone(), r.environment(), r.has_top_level_await)
    };
    let body = crate::ast::node::RcStatementList::from(module_body_statements(&ast));

    if !has_tla {
        context.push_execution_context(environment.clone(), environment.clone(), true);
        context.push_current_module(record.clone());
        let result = (|| {
            hoisting::hoist_declarations(body.items(), &environment, context)?;
            hoisting::hoist_lexical_declarations(body.items(), &environment, context)?;
            body.run(context)
        })();
        context.pop_current_module();
        context.pop_execution_context();

        match result {
            Ok(_) => {
                record.borrow_mut().status = ModuleStatus::Evaluated;
                Ok(())
            }
            Err(Flow::Throw(error)) => {
                let mut r = record.borrow_mut();
                r.status = ModuleStatus::Error;
                r.error = Some(error.clone());
                Err(Flow::Throw(error))
            }
            Err(flow) => Err(flow),
        }
    } else {
        // The body becomes an implicit async task; the evaluation promise
        // is what parents and dynamic import await.
        record.borrow_mut().status = ModuleStatus::EvaluatingAsync;
        context.push_current_module(record.clone());
        let promise = crate::job::spawn_module_task(body, environment, context);
        context.pop_current_module();
        let promise = promise?;

        record.borrow_mut().evaluation_promise = Some(promise.clone());

        let on_fulfilled = {
            let record = record.clone();
            crate::builtins::promise::native_closure(
                move |_this: &JsValue, _args: &[JsValue], _context: &mut Context| {
                    record.borrow_mut().status = ModuleStatus::Evaluated;
                    Ok(JsValue::undefined())
                },
                context,
            )
        };
        let on_rejected = {
            let record = record.clone();
            crate::builtins::promise::native_closure(
                move |_this: &JsValue, args: &[JsValue], _context: &mut Context| {
                    let mut r = record.borrow_mut();
                    r.status = ModuleStatus::Error;
                    r.error = Some(args.first().cloned().unwrap_or_default());
                    Ok(JsValue::undefined())
                },
                context,
            )
        };
        let capability = crate::builtins::promise::new_promise_capability(context)?;
        crate::builtins::promise::perform_then(
            &promise,
            Some(on_fulfilled),
            Some(on_rejected),
            capability,
            context,
        );
        Ok(())
    }
}

/// Dynamic `import(specifier)`: a promise of the module namespace.
pub(crate) fn dynamic_import(
    import_call: &ImportCall,
    context: &mut Context,
) -> JsResult<JsValue> {
    let specifier = import_call.specifier().run(context)?;
    let specifier = specifier.to_string(context)?;
    let importer = context
        .current_module()
        .map(|module| module.borrow().id().to_string())
        .unwrap_or_default();

    let capability = crate::builtins::promise::new_promise_capability(context)?;

    let loaded = load_module(&specifier, &importer, context)
        .and_then(|record| evaluate_module(&record, context).map(|_| record));

    match loaded {
        Err(Flow::Throw(error)) => {
            capability
                .reject
                .call(&JsValue::undefined(), &[error], context)?;
        }
        Err(flow) => return Err(flow),
        Ok(record) => {
            let namespace = get_namespace(&record, context);
            let evaluation_promise = record.borrow().evaluation_promise();
            match evaluation_promise {
                // Top level await: settle after evaluation finishes.
                Some(promise) => {
                    let on_fulfilled = {
                        let resolve = capability.resolve.clone();
                        let namespace = namespace.clone();
                        crate::builtins::promise::native_closure(
                            move |_this: &JsValue, _args: &[JsValue], context: &mut Context| {
                                resolve.call(
                                    &JsValue::undefined(),
                                    &[namespace.clone().into()],
                                    context,
                                )?;
                                Ok(JsValue::undefined())
                            },
                            context,
                        )
                    };
                    let on_rejected = {
                        let reject = capability.reject.clone();
                        crate::builtins::promise::native_closure(
                            move |_this: &JsValue, args: &[JsValue], context: &mut Context| {
                                let reason = args.first().cloned().unwrap_or_default();
                                reject.call(&JsValue::undefined(), &[reason], context)?;
                                Ok(JsValue::undefined())
                            },
                            context,
                        )
                    };
                    let derived =
                        crate::builtins::promise::new_promise_capability(context)?;
                    crate::builtins::promise::perform_then(
                        &promise,
                        Some(on_fulfilled),
                        Some(on_rejected),
                        derived,
                        context,
                    );
                }
                None => {
                    capability.resolve.call(
                        &JsValue::undefined(),
                        &[namespace.into()],
                        context,
                    )?;
                }
            }
        }
    }
    Ok(capability.promise.clone().into())
}

/// `import.meta`: an object carrying the resolved id of the evaluating
/// module.
pub(crate) fn import_meta(context: &mut Context) -> JsResult<JsValue> {
    let module = match context.current_module() {
        Some(module) => module,
        None => {
            return context
                .throw_syntax_error("import.meta is only valid inside a module")
        }
    };
    let meta = JsValue::new_object(context);
    let url = module.borrow().id().clone();
    meta.set_property("url", JsValue::String(url), crate::property::Attribute::default());
    Ok(meta)
}
