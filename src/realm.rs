//! A realm: one isolated interpreter universe with its own global object,
//! global environment, module registry and symbol registry. Nothing here
//! is process-global, so multiple realms coexist in one process.

use crate::{
    environment::{new_global_environment, Environment},
    module::ModuleRef,
    object::{JsObject, Object, ObjectData},
    string::JsString,
    symbol::JsSymbol,
    Profiler,
};
use rustc_hash::FxHashMap;

/// The representation of a JavaScript realm.
#[derive(Debug)]
pub struct Realm {
    global_object: JsObject,
    global_environment: Environment,
    modules: FxHashMap<JsString, ModuleRef>,
    symbol_registry: FxHashMap<JsString, JsSymbol>,
    instance_id: Option<JsString>,
}

impl Realm {
    /// Creates a realm with an empty global object. The intrinsics are
    /// wired by the owning context.
    pub fn create() -> Self {
        let _timer = Profiler::global().start_event("Realm::create", "realm");

        let mut global = Object::default();
        global.data = ObjectData::Global;
        let global_object = JsObject::new(global);

        let global_environment =
            new_global_environment(global_object.clone(), global_object.clone().into());

        Self {
            global_object,
            global_environment,
            modules: FxHashMap::default(),
            symbol_registry: FxHashMap::default(),
            instance_id: None,
        }
    }

    #[inline]
    pub fn global_object(&self) -> &JsObject {
        &self.global_object
    }

    #[inline]
    pub fn global_environment(&self) -> Environment {
        self.global_environment.clone()
    }

    /// The optional stable instance id for cross-realm bridges.
    pub fn instance_id(&self) -> Option<&JsString> {
        self.instance_id.as_ref()
    }

    pub(crate) fn set_instance_id(&mut self, id: JsString) {
        self.instance_id = Some(id);
    }

    /// Looks up a registered module, loaded or still loading.
    pub(crate) fn module(&self, id: &str) -> Option<ModuleRef> {
        self.modules.get(id).cloned()
    }

    pub(crate) fn register_module(&mut self, id: JsString, module: ModuleRef) {
        self.modules.insert(id, module);
    }

    pub(crate) fn symbol_registry(&self) -> &FxHashMap<JsString, JsSymbol> {
        &self.symbol_registry
    }

    pub(crate) fn symbol_registry_mut(&mut self) -> &mut FxHashMap<JsString, JsSymbol> {
        &mut self.symbol_registry
    }
}
