//! The JavaScript context: the execution context stack, the intrinsic
//! registry and the embedder API.

use crate::{
    ast::node::{ModuleItemList, StatementList},
    builtins::{
        self,
        error::{construct_error_object, kind_of_constructor},
        function::{Function, NativeFunction},
        generator::GeneratorContext,
        promise,
    },
    environment::{self, BindingKind, Environment},
    error::{JsError, NativeErrorKind},
    exec::{class::ConstructorFrame, hoisting, Executable, Flow},
    gc::{Cell, Gc},
    job::{Scheduler, TaskHandle},
    module::{ModuleLoader, ModuleRef, ModuleResolver},
    object::{JsObject, Object, PROTOTYPE},
    property::{Attribute, PropertyKey},
    realm::Realm,
    string::JsString,
    symbol::{JsSymbol, WellKnownSymbols},
    value::JsValue,
    JsResult, Profiler,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// A constructor / prototype pair of a standard builtin.
#[derive(Debug, Clone)]
pub struct StandardConstructor {
    constructor: JsObject,
    prototype: JsObject,
}

impl StandardConstructor {
    fn new(constructor: JsObject, prototype: JsObject) -> Self {
        Self {
            constructor,
            prototype,
        }
    }

    /// Return the prototype of the constructor object.
    ///
    /// This is the same as `Object.prototype`, `Array.prototype`, etc.
    #[inline]
    pub fn prototype(&self) -> JsObject {
        self.prototype.clone()
    }

    /// Return the constructor object.
    ///
    /// This is the same as `Object`, `Array`, etc.
    #[inline]
    pub fn constructor(&self) -> JsObject {
        self.constructor.clone()
    }
}

/// The iterator prototype objects of a realm.
#[derive(Debug, Clone)]
pub struct IteratorPrototypes {
    iterator: JsObject,
    generator: JsObject,
    array_iterator: JsObject,
    map_iterator: JsObject,
    set_iterator: JsObject,
}

impl IteratorPrototypes {
    pub(crate) fn new(
        iterator: JsObject,
        generator: JsObject,
        array_iterator: JsObject,
        map_iterator: JsObject,
        set_iterator: JsObject,
    ) -> Self {
        Self {
            iterator,
            generator,
            array_iterator,
            map_iterator,
            set_iterator,
        }
    }

    fn uninit() -> Self {
        let blank = || JsObject::new(Object::default());
        Self {
            iterator: blank(),
            generator: blank(),
            array_iterator: blank(),
            map_iterator: blank(),
            set_iterator: blank(),
        }
    }

    #[inline]
    pub fn iterator(&self) -> JsObject {
        self.iterator.clone()
    }

    #[inline]
    pub fn generator(&self) -> JsObject {
        self.generator.clone()
    }

    #[inline]
    pub fn array_iterator(&self) -> JsObject {
        self.array_iterator.clone()
    }

    #[inline]
    pub fn map_iterator(&self) -> JsObject {
        self.map_iterator.clone()
    }

    #[inline]
    pub fn set_iterator(&self) -> JsObject {
        self.set_iterator.clone()
    }
}

/// All the intrinsic objects of a realm, created blank up front and wired
/// with their methods by `builtins::init`. Everything lives here: no
/// intrinsic is ever process-global.
#[derive(Debug)]
pub struct StandardObjects {
    object: StandardConstructor,
    function: StandardConstructor,
    array: StandardConstructor,
    boolean: StandardConstructor,
    number: StandardConstructor,
    string: StandardConstructor,
    bigint: StandardConstructor,
    symbol: StandardConstructor,
    map: StandardConstructor,
    set: StandardConstructor,
    promise: StandardConstructor,
    errors: FxHashMap<NativeErrorKind, StandardConstructor>,
    iterator_prototypes: IteratorPrototypes,
    array_values_intrinsic: Option<JsObject>,
}

impl StandardObjects {
    fn new() -> Self {
        // The two roots of the intrinsic graph.
        let object_prototype = JsObject::new(Object::default());
        let noop: NativeFunction = |_, _, _| Ok(JsValue::undefined());
        let function_prototype = JsObject::new(Object::function(
            Function::Native {
                function: noop.into(),
                constructable: false,
            },
            object_prototype.clone().into(),
        ));

        let make = |name: &str,
                    length: usize,
                    function: NativeFunction|
         -> StandardConstructor {
            let prototype =
                JsObject::new(Object::create(object_prototype.clone().into()));
            let constructor = JsObject::new(Object::function(
                Function::Native {
                    function: function.into(),
                    constructable: true,
                },
                function_prototype.clone().into(),
            ));
            let attribute = Attribute::CONFIGURABLE;
            constructor
                .borrow_mut()
                .insert_property("length", length, attribute);
            constructor
                .borrow_mut()
                .insert_property("name", name, attribute);
            constructor.borrow_mut().insert_property(
                PROTOTYPE,
                prototype.clone(),
                Attribute::none(),
            );
            prototype.borrow_mut().insert_property(
                "constructor",
                constructor.clone(),
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            );
            StandardConstructor::new(constructor, prototype)
        };

        let object = {
            let constructor = JsObject::new(Object::function(
                Function::Native {
                    function: (builtins::object::Object::constructor as NativeFunction).into(),
                    constructable: true,
                },
                function_prototype.clone().into(),
            ));
            let attribute = Attribute::CONFIGURABLE;
            constructor
                .borrow_mut()
                .insert_property("length", 1, attribute);
            constructor
                .borrow_mut()
                .insert_property("name", "Object", attribute);
            constructor.borrow_mut().insert_property(
                PROTOTYPE,
                object_prototype.clone(),
                Attribute::none(),
            );
            object_prototype.borrow_mut().insert_property(
                "constructor",
                constructor.clone(),
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            );
            StandardConstructor::new(constructor, object_prototype.clone())
        };

        let function = {
            let constructor = JsObject::new(Object::function(
                Function::Native {
                    function: (builtins::function::function_constructor as NativeFunction)
                        .into(),
                    constructable: true,
                },
                function_prototype.clone().into(),
            ));
            let attribute = Attribute::CONFIGURABLE;
            constructor
                .borrow_mut()
                .insert_property("length", 1, attribute);
            constructor
                .borrow_mut()
                .insert_property("name", "Function", attribute);
            constructor.borrow_mut().insert_property(
                PROTOTYPE,
                function_prototype.clone(),
                Attribute::none(),
            );
            function_prototype.borrow_mut().insert_property(
                "constructor",
                constructor.clone(),
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            );
            StandardConstructor::new(constructor, function_prototype.clone())
        };

        let mut errors = FxHashMap::default();
        for kind in [
            NativeErrorKind::Error,
            NativeErrorKind::Type,
            NativeErrorKind::Range,
            NativeErrorKind::Reference,
            NativeErrorKind::Syntax,
            NativeErrorKind::Eval,
            NativeErrorKind::Uri,
            NativeErrorKind::Aggregate,
        ]
        .iter()
        .copied()
        {
            let function: NativeFunction = match kind {
                NativeErrorKind::Error => builtins::error::error_constructor,
                NativeErrorKind::Type => builtins::error::type_error_constructor,
                NativeErrorKind::Range => builtins::error::range_error_constructor,
                NativeErrorKind::Reference => builtins::error::reference_error_constructor,
                NativeErrorKind::Syntax => builtins::error::syntax_error_constructor,
                NativeErrorKind::Eval => builtins::error::eval_error_constructor,
                NativeErrorKind::Uri => builtins::error::uri_error_constructor,
                NativeErrorKind::Aggregate => builtins::error::aggregate_error_constructor,
            };
            errors.insert(kind, make(kind.constructor_name(), 1, function));
        }

        Self {
            object,
            function,
            array: make("Array", 1, builtins::array::Array::constructor),
            boolean: make("Boolean", 1, builtins::boolean::Boolean::constructor),
            number: make("Number", 1, builtins::number::Number::constructor),
            string: make("String", 1, builtins::string::String::constructor),
            bigint: make("BigInt", 1, builtins::bigint::BigInt::constructor),
            symbol: make("Symbol", 0, builtins::symbol::Symbol::constructor),
            map: make("Map", 0, builtins::map::Map::constructor),
            set: make("Set", 0, builtins::set::Set::constructor),
            promise: make("Promise", 1, promise::constructor),
            errors,
            iterator_prototypes: IteratorPrototypes::uninit(),
            array_values_intrinsic: None,
        }
    }

    #[inline]
    pub fn object_object(&self) -> &StandardConstructor {
        &self.object
    }

    #[inline]
    pub fn function_object(&self) -> &StandardConstructor {
        &self.function
    }

    #[inline]
    pub fn array_object(&self) -> &StandardConstructor {
        &self.array
    }

    #[inline]
    pub fn boolean_object(&self) -> &StandardConstructor {
        &self.boolean
    }

    #[inline]
    pub fn number_object(&self) -> &StandardConstructor {
        &self.number
    }

    #[inline]
    pub fn string_object(&self) -> &StandardConstructor {
        &self.string
    }

    #[inline]
    pub fn bigint_object(&self) -> &StandardConstructor {
        &self.bigint
    }

    #[inline]
    pub fn symbol_object(&self) -> &StandardConstructor {
        &self.symbol
    }

    #[inline]
    pub fn map_object(&self) -> &StandardConstructor {
        &self.map
    }

    #[inline]
    pub fn set_object(&self) -> &StandardConstructor {
        &self.set
    }

    #[inline]
    pub fn promise_object(&self) -> &StandardConstructor {
        &self.promise
    }

    #[inline]
    pub fn error_object(&self, kind: NativeErrorKind) -> &StandardConstructor {
        self.errors
            .get(&kind)
            .expect("every error kind is registered")
    }

    #[inline]
    pub fn iterator_prototypes(&self) -> &IteratorPrototypes {
        &self.iterator_prototypes
    }

    pub(crate) fn set_iterator_prototypes(&mut self, prototypes: IteratorPrototypes) {
        self.iterator_prototypes = prototypes;
    }

    pub(crate) fn array_values_intrinsic(&self) -> &JsObject {
        self.array_values_intrinsic
            .as_ref()
            .expect("array init installs the values intrinsic")
    }

    pub(crate) fn set_array_values_intrinsic(&mut self, function: JsObject) {
        self.array_values_intrinsic = Some(function);
    }
}

/// One frame of the execution context stack. The `this`, `new.target`,
/// home object and class-scope markers live in the environment chain, so a
/// frame is environments plus flags plus the suspension hooks.
#[derive(Debug)]
pub(crate) struct ExecutionContext {
    lexical_environment: Environment,
    variable_environment: Environment,
    strict: bool,
    generator: Option<Gc<Cell<GeneratorContext>>>,
    async_task: Option<TaskHandle>,
}

/// The signature of the host message bridge handler.
pub type MessageHandler = Box<dyn Fn(JsValue, JsValue, &mut Context) -> JsResult<JsValue>>;

/// Javascript context. It is the primary way to interact with the runtime.
///
/// For each `Context` instance a new instance of the runtime is created, so
/// two contexts never share prototypes, symbols or modules.
pub struct Context {
    realm: Realm,
    standard_objects: StandardObjects,
    execution_contexts: Vec<ExecutionContext>,
    well_known_symbols: WellKnownSymbols,
    symbol_count: u64,
    scheduler: Scheduler,
    constructor_frames: Vec<ConstructorFrame>,
    active_accessors: FxHashSet<(usize, PropertyKey)>,
    module_loader: Option<ModuleLoader>,
    module_resolver: Option<ModuleResolver>,
    message_handler: Option<MessageHandler>,
    current_modules: Vec<ModuleRef>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("realm", &"Realm")
            .field("execution_contexts", &self.execution_contexts.len())
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        let realm = Realm::create();
        let standard_objects = StandardObjects::new();
        let (well_known_symbols, symbol_count) = WellKnownSymbols::new();

        // The global object inherits from %Object.prototype%.
        realm
            .global_object()
            .borrow_mut()
            .set_prototype(standard_objects.object_object().prototype().into());

        let global_environment = realm.global_environment();
        let mut context = Self {
            realm,
            standard_objects,
            execution_contexts: vec![ExecutionContext {
                lexical_environment: global_environment.clone(),
                variable_environment: global_environment,
                strict: false,
                generator: None,
                async_task: None,
            }],
            well_known_symbols,
            symbol_count,
            scheduler: Scheduler::default(),
            constructor_frames: Vec::new(),
            active_accessors: FxHashSet::default(),
            module_loader: None,
            module_resolver: None,
            message_handler: None,
            current_modules: Vec::new(),
        };

        builtins::init(&mut context);
        context
    }
}

impl Context {
    /// Create a new `Context`.
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a new `Context` carrying a stable instance id, for embedders
    /// bridging several realms.
    pub fn with_instance_id<S>(id: S) -> Self
    where
        S: Into<JsString>,
    {
        let mut context = Self::new();
        context.realm.set_instance_id(id.into());
        context
    }

    #[inline]
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    #[inline]
    pub fn realm_mut(&mut self) -> &mut Realm {
        &mut self.realm
    }

    #[inline]
    pub fn standard_objects(&self) -> &StandardObjects {
        &self.standard_objects
    }

    #[inline]
    pub(crate) fn standard_objects_mut(&mut self) -> &mut StandardObjects {
        &mut self.standard_objects
    }

    /// Return the global object.
    #[inline]
    pub fn global_object(&self) -> JsObject {
        self.realm.global_object().clone()
    }

    #[inline]
    pub(crate) fn global_environment(&self) -> Environment {
        self.realm.global_environment()
    }

    // Execution context stack.

    fn frame(&self) -> &ExecutionContext {
        self.execution_contexts
            .last()
            .expect("the global execution context is always present")
    }

    fn frame_mut(&mut self) -> &mut ExecutionContext {
        self.execution_contexts
            .last_mut()
            .expect("the global execution context is always present")
    }

    #[inline]
    pub(crate) fn lexical_environment(&self) -> Environment {
        self.frame().lexical_environment.clone()
    }

    #[inline]
    pub(crate) fn variable_environment(&self) -> Environment {
        self.frame().variable_environment.clone()
    }

    pub(crate) fn set_lexical_environment(&mut self, environment: Environment) {
        self.frame_mut().lexical_environment = environment;
    }

    pub(crate) fn push_execution_context(
        &mut self,
        lexical_environment: Environment,
        variable_environment: Environment,
        strict: bool,
    ) {
        self.execution_contexts.push(ExecutionContext {
            lexical_environment,
            variable_environment,
            strict,
            generator: None,
            async_task: None,
        });
    }

    pub(crate) fn pop_execution_context(&mut self) {
        debug_assert!(
            self.execution_contexts.len() > 1,
            "the global execution context must not be popped"
        );
        self.execution_contexts.pop();
    }

    /// Whether the running code is in strict mode.
    #[inline]
    pub fn strict(&self) -> bool {
        self.frame().strict
    }

    pub(crate) fn set_strict(&mut self, strict: bool) {
        self.frame_mut().strict = strict;
    }

    pub(crate) fn generator(&self) -> Option<Gc<Cell<GeneratorContext>>> {
        self.frame().generator.clone()
    }

    pub(crate) fn set_frame_generator(&mut self, generator: Gc<Cell<GeneratorContext>>) {
        self.frame_mut().generator = Some(generator);
    }

    pub(crate) fn async_task(&self) -> Option<TaskHandle> {
        self.frame().async_task.clone()
    }

    pub(crate) fn set_frame_async_task(&mut self, task: TaskHandle) {
        self.frame_mut().async_task = Some(task);
    }

    /// Is the current frame re-executing towards a suspension point?
    pub(crate) fn in_replay(&self) -> bool {
        if let Some(generator) = self.frame().generator.as_ref() {
            if generator.borrow().replaying {
                return true;
            }
        }
        if let Some(task) = self.frame().async_task.as_ref() {
            if task.borrow().is_replaying() {
                return true;
            }
        }
        false
    }

    /// Is the running code lexically inside a class body?
    pub(crate) fn in_class_context(&self) -> bool {
        environment::enclosing_class(&self.lexical_environment()).is_some()
    }

    // The async `new`-expression replay cache.

    pub(crate) fn async_new_cache_key(&mut self, node: usize) -> Option<(usize, u32)> {
        let task = self.frame().async_task.clone()?;
        let mut task = task.borrow_mut();
        let counter = task.new_counts.entry(node).or_insert(0);
        let occurrence = *counter;
        *counter += 1;
        Some((node, occurrence))
    }

    pub(crate) fn async_cached_new(&self, key: &(usize, u32)) -> Option<JsValue> {
        let task = self.frame().async_task.clone()?;
        let cached = task.borrow().news.get(key).cloned();
        cached
    }

    pub(crate) fn async_cache_new(&mut self, key: (usize, u32), value: JsValue) {
        if let Some(task) = self.frame().async_task.clone() {
            task.borrow_mut().news.insert(key, value);
        }
    }

    // Constructor frames for `super` and derived `this` tracking.

    pub(crate) fn push_constructor_frame(&mut self, frame: ConstructorFrame) {
        self.constructor_frames.push(frame);
    }

    pub(crate) fn pop_constructor_frame(&mut self) -> Option<ConstructorFrame> {
        self.constructor_frames.pop()
    }

    pub(crate) fn current_constructor_frame(&self) -> Option<&ConstructorFrame> {
        self.constructor_frames.last()
    }

    pub(crate) fn replace_constructor_this(&mut self, this: JsValue) {
        if let Some(frame) = self.constructor_frames.last_mut() {
            frame.this = this;
        }
    }

    pub(crate) fn mark_super_called(&mut self) {
        if let Some(frame) = self.constructor_frames.last_mut() {
            frame.super_called = true;
        }
    }

    // The accessor cycle guard.

    pub(crate) fn enter_accessor(&mut self, key: (usize, PropertyKey)) -> bool {
        self.active_accessors.insert(key)
    }

    pub(crate) fn leave_accessor(&mut self, key: &(usize, PropertyKey)) {
        self.active_accessors.remove(key);
    }

    // Symbols.

    /// Generates a new `Symbol` internal hash.
    #[inline]
    fn generate_hash(&mut self) -> u64 {
        let hash = self.symbol_count;
        self.symbol_count += 1;
        hash
    }

    /// Construct a new `Symbol` with an optional description.
    #[inline]
    pub fn construct_symbol(&mut self, description: Option<JsString>) -> JsSymbol {
        let hash = self.generate_hash();
        JsSymbol::new(hash, description)
    }

    #[inline]
    pub fn well_known_symbols(&self) -> &WellKnownSymbols {
        &self.well_known_symbols
    }

    pub(crate) fn symbol_registry_get_or_create(&mut self, key: JsString) -> JsSymbol {
        if let Some(symbol) = self.realm.symbol_registry().get(&key) {
            return symbol.clone();
        }
        let symbol = self.construct_symbol(Some(key.clone()));
        self.realm.symbol_registry_mut().insert(key, symbol.clone());
        symbol
    }

    pub(crate) fn symbol_registry_key_for(&self, symbol: &JsSymbol) -> Option<JsString> {
        self.realm
            .symbol_registry()
            .iter()
            .find(|(_, registered)| *registered == symbol)
            .map(|(key, _)| key.clone())
    }

    // Error construction and throwing.

    pub(crate) fn construct_error(
        &mut self,
        kind: NativeErrorKind,
        message: String,
    ) -> JsValue {
        construct_error_object(kind, message, self)
    }

    /// Constructs a `TypeError` object.
    pub fn construct_type_error<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        self.construct_error(NativeErrorKind::Type, message.into())
    }

    /// Throws a `TypeError`.
    pub fn throw_type_error<M, T>(&mut self, message: M) -> JsResult<T>
    where
        M: Into<String>,
    {
        Err(Flow::Throw(self.construct_type_error(message)))
    }

    /// Constructs a `RangeError` object.
    pub fn construct_range_error<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        self.construct_error(NativeErrorKind::Range, message.into())
    }

    /// Throws a `RangeError`.
    pub fn throw_range_error<M, T>(&mut self, message: M) -> JsResult<T>
    where
        M: Into<String>,
    {
        Err(Flow::Throw(self.construct_range_error(message)))
    }

    /// Constructs a `ReferenceError` object.
    pub fn construct_reference_error<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        self.construct_error(NativeErrorKind::Reference, message.into())
    }

    /// Throws a `ReferenceError`.
    pub fn throw_reference_error<M, T>(&mut self, message: M) -> JsResult<T>
    where
        M: Into<String>,
    {
        Err(Flow::Throw(self.construct_reference_error(message)))
    }

    /// Constructs a `SyntaxError` object.
    pub fn construct_syntax_error<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        self.construct_error(NativeErrorKind::Syntax, message.into())
    }

    /// Throws a `SyntaxError`.
    pub fn throw_syntax_error<M, T>(&mut self, message: M) -> JsResult<T>
    where
        M: Into<String>,
    {
        Err(Flow::Throw(self.construct_syntax_error(message)))
    }

    /// Constructs a plain `Error` object.
    pub fn construct_error_plain<M>(&mut self, message: M) -> JsValue
    where
        M: Into<String>,
    {
        self.construct_error(NativeErrorKind::Error, message.into())
    }

    /// Throws a plain `Error`.
    pub fn throw_error<M, T>(&mut self, message: M) -> JsResult<T>
    where
        M: Into<String>,
    {
        Err(Flow::Throw(self.construct_error_plain(message)))
    }

    pub(crate) fn error_prototype(&self, kind: NativeErrorKind) -> JsObject {
        self.standard_objects.error_object(kind).prototype()
    }

    pub(crate) fn error_constructor_object(&self, kind: NativeErrorKind) -> JsObject {
        self.standard_objects.error_object(kind).constructor()
    }

    pub(crate) fn error_constructor_object_ref(&self, kind: NativeErrorKind) -> JsObject {
        self.error_constructor_object(kind)
    }

    pub(crate) fn error_kind_of_constructor(
        &self,
        constructor: &JsObject,
    ) -> Option<NativeErrorKind> {
        kind_of_constructor(constructor, self)
    }

    // Calling.

    /// `Call(F, V, argumentsList)`.
    pub fn call(
        &mut self,
        function: &JsValue,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        match function {
            JsValue::Object(ref object) if object.is_callable() => {
                object.call(this, args, self)
            }
            _ => self.throw_type_error(format!("{} is not a function", function.display())),
        }
    }

    // Scheduler access.

    pub(crate) fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    // Module plumbing.

    /// Installs the module loader callback (id to parsed module body).
    pub fn set_module_loader(&mut self, loader: ModuleLoader) {
        self.module_loader = Some(loader);
    }

    /// Installs the module resolver callback (specifier, importer to id).
    pub fn set_module_resolver(&mut self, resolver: ModuleResolver) {
        self.module_resolver = Some(resolver);
    }

    pub(crate) fn resolve_module_specifier(
        &self,
        specifier: &str,
        importer: &str,
    ) -> JsString {
        match self.module_resolver {
            Some(ref resolver) => resolver(specifier, importer).into(),
            None => specifier.into(),
        }
    }

    pub(crate) fn load_module_source(&mut self, id: &str) -> JsResult<ModuleItemList> {
        let loader = match self.module_loader.take() {
            Some(loader) => loader,
            None => return self.throw_error("no module loader installed"),
        };
        let result = loader(id, self);
        self.module_loader = Some(loader);
        result
    }

    pub(crate) fn push_current_module(&mut self, module: ModuleRef) {
        self.current_modules.push(module);
    }

    pub(crate) fn pop_current_module(&mut self) {
        self.current_modules.pop();
    }

    pub(crate) fn current_module(&self) -> Option<ModuleRef> {
        self.current_modules.last().cloned()
    }

    // Host message bridge.

    /// Installs the `sendMessage`/`sendMessageAsync` handler.
    pub fn set_message_handler(&mut self, handler: MessageHandler) {
        self.message_handler = Some(handler);
    }

    pub(crate) fn dispatch_host_message(
        &mut self,
        tag: JsValue,
        payload: JsValue,
    ) -> JsResult<JsValue> {
        let handler = match self.message_handler.take() {
            Some(handler) => handler,
            None => return self.throw_error("no host message handler installed"),
        };
        let result = handler(tag, payload, self);
        self.message_handler = Some(handler);
        result
    }

    // Embedder API.

    /// Evaluates a program AST in the global scope, returning its
    /// completion value.
    ///
    /// # Panics
    ///
    /// Panics when an internal flow-control signal escapes the evaluator;
    /// that can only be an engine bug.
    pub fn evaluate(&mut self, program: &StatementList) -> Result<JsValue, JsError> {
        let _timer = Profiler::global().start_event("evaluate", "exec");

        let strict = hoisting::has_strict_directive(program.items());
        let previous_strict = self.strict();
        if strict {
            self.set_strict(true);
        }

        let result = (|| {
            let variable_environment = self.variable_environment();
            hoisting::hoist_declarations(program.items(), &variable_environment, self)?;
            let lexical_environment = self.lexical_environment();
            hoisting::hoist_lexical_declarations(
                program.items(),
                &lexical_environment,
                self,
            )?;
            program.run(self)
        })();

        self.set_strict(previous_strict);
        self.finish_completion(result)
    }

    /// Evaluates a direct `eval` body in the current context, honoring the
    /// var/let conflict checks and strict-mode restrictions.
    pub fn evaluate_direct_eval(
        &mut self,
        program: &StatementList,
    ) -> Result<JsValue, JsError> {
        let strict = self.strict() || hoisting::has_strict_directive(program.items());

        let result = (|| {
            // A `var` in eval must not shadow a lexical binding of the
            // calling scope.
            for name in hoisting::var_declared_names(program.items()) {
                let mut current = Some(self.lexical_environment());
                while let Some(environment) = current {
                    if let Some(kind) = environment.borrow().binding_kind(&name) {
                        if matches!(kind, BindingKind::Let | BindingKind::Const) {
                            return self.throw_syntax_error(format!(
                                "identifier '{}' has already been declared",
                                name
                            ));
                        }
                    }
                    let flavor = environment.borrow().flavor();
                    if matches!(
                        flavor,
                        environment::EnvironmentFlavor::Function
                            | environment::EnvironmentFlavor::Global
                            | environment::EnvironmentFlavor::Module
                    ) {
                        break;
                    }
                    current = environment.borrow().parent();
                }
            }

            // Strict eval keeps its declarations to itself; sloppy eval
            // writes `var`s through to the caller's variable scope.
            let eval_scope = builtins::function::new_eval_environment(
                self.lexical_environment(),
            );
            let variable_environment = if strict {
                eval_scope.clone()
            } else {
                self.variable_environment()
            };
            self.push_execution_context(eval_scope.clone(), variable_environment.clone(), strict);
            let result = (|| {
                hoisting::hoist_declarations(program.items(), &variable_environment, self)?;
                hoisting::hoist_lexical_declarations(program.items(), &eval_scope, self)?;
                program.run(self)
            })();
            self.pop_execution_context();
            result
        })();

        self.finish_completion(result)
    }

    /// Calls a JavaScript function value from the host.
    pub fn call_function(
        &mut self,
        function: &JsValue,
        args: &[JsValue],
        this: Option<&JsValue>,
    ) -> Result<JsValue, JsError> {
        let this = this.cloned().unwrap_or_default();
        let result = self.call(function, &this, args);
        self.finish_completion(result)
    }

    /// Defines (or overwrites) a global variable, for host bridging.
    pub fn set_global_variable<N>(&mut self, name: N, value: JsValue)
    where
        N: Into<JsString>,
    {
        let name = name.into();
        let global = self.global_environment();
        let exists = global.borrow().has_binding(&name);
        if exists {
            let _ = global.borrow_mut().set_binding_value(&name, value);
        } else {
            let _ = global
                .borrow_mut()
                .create_binding(name, BindingKind::Var, Some(value));
        }
    }

    /// Reads a global variable; `undefined` when absent.
    pub fn get_global_variable(&mut self, name: &str) -> JsValue {
        let global = self.global_environment();
        let value = global.borrow().get_binding_value(name);
        value.unwrap_or_default()
    }

    /// Checks for a global variable.
    pub fn has_global_variable(&mut self, name: &str) -> bool {
        self.global_environment().borrow().has_binding(name)
    }

    /// Steps the async queue: drains promise reaction jobs and resumes
    /// ready tasks until both queues are empty.
    pub fn run_pending_async_tasks(&mut self) -> Result<(), JsError> {
        match crate::job::run_pending_tasks(self) {
            Ok(()) => Ok(()),
            Err(Flow::Throw(value)) => Err(JsError::from_thrown(value, self)),
            Err(flow) => unreachable!("flow-control signal escaped the scheduler: {:?}", flow),
        }
    }

    /// Host signal that an externally tracked promise has settled.
    pub fn notify_promise_resolved(&mut self, promise: &JsValue) {
        if let Some(object) = promise.as_object() {
            promise::notify_resolved(&object.clone(), self);
        }
    }

    /// Loads and evaluates a module graph, returning the namespace object
    /// of the root module.
    pub fn evaluate_module(&mut self, specifier: &str) -> Result<JsValue, JsError> {
        let result = (|| {
            let record = crate::module::load_module(specifier, "", self)?;
            crate::module::evaluate_module(&record, self)?;
            Ok(crate::module::get_namespace(&record, self).into())
        })();
        self.finish_completion(result)
    }

    fn finish_completion(&mut self, result: JsResult<JsValue>) -> Result<JsValue, JsError> {
        match result {
            Ok(value) => Ok(value),
            Err(Flow::Throw(value)) => Err(JsError::from_thrown(value, self)),
            // Any other signal leaking to the boundary is an engine bug.
            Err(flow) => unreachable!("flow-control signal escaped the evaluator: {:?}", flow),
        }
    }
}
