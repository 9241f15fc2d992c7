//! The essential internal methods of objects.
//!
//! Ordinary behavior lives here together with the exotic overrides: array
//! `length` handling, string wrapper index properties, mapped `arguments`
//! aliasing and proxy trap dispatch. Everything takes the context, since
//! accessors, traps and conversions can run arbitrary code.

use super::{JsObject, ObjectData};
use crate::{
    builtins::function::arguments::Arguments,
    environment::Environment,
    property::{
        AccessorDescriptor, Attribute, DataDescriptor, PropertyDescriptor, PropertyKey,
    },
    string::JsString,
    value::{same_value, JsValue},
    Context, JsResult,
};

impl JsObject {
    fn proxy_data(&self) -> Option<(JsObject, JsObject)> {
        match self.borrow().data {
            ObjectData::Proxy(ref proxy) => Some((proxy.target().clone(), proxy.handler().clone())),
            _ => None,
        }
    }

    /// Looks up a proxy trap on the handler. `None` means the operation
    /// forwards to the target.
    fn proxy_trap(
        &self,
        name: &str,
        context: &mut Context,
    ) -> JsResult<Option<(JsObject, JsValue)>> {
        let (target, handler) = match self.proxy_data() {
            Some(pair) => pair,
            None => return Ok(None),
        };
        let trap = JsValue::from(handler).get_field(name, context)?;
        if trap.is_null_or_undefined() {
            // Absent trap: the caller forwards to the target.
            return Ok(Some((target, JsValue::undefined())));
        }
        if !trap.is_function() {
            return context.throw_type_error(format!("proxy handler.{} is not a function", name));
        }
        Ok(Some((target, trap)))
    }

    /// `[[GetOwnProperty]]`.
    pub fn get_own_property(
        &self,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some((target, trap)) = self.proxy_trap("getOwnPropertyDescriptor", context)? {
            if trap.is_undefined() {
                return target.get_own_property(key, context);
            }
            let result = context.call(
                &trap,
                &JsValue::undefined(),
                &[target.into(), key.into()],
            )?;
            if result.is_undefined() {
                return Ok(None);
            }
            return Ok(Some(PropertyDescriptor::from_value(&result, context)?));
        }

        enum Exotic {
            None,
            Synthesized(PropertyDescriptor),
            MappedArgument(Environment, JsString, PropertyDescriptor),
            Namespace(crate::module::ModuleRef),
        }

        let (stored, exotic) = {
            let object = self.borrow();
            let stored = object.properties().get(key).cloned();
            let exotic = match object.data {
                ObjectData::String(ref string) => match (&stored, key) {
                    (None, PropertyKey::Index(index)) => string
                        .chars()
                        .nth(*index as usize)
                        .map(|c| {
                            Exotic::Synthesized(
                                DataDescriptor::new(
                                    JsValue::string(c.to_string()),
                                    Attribute::ENUMERABLE,
                                )
                                .into(),
                            )
                        })
                        .unwrap_or(Exotic::None),
                    (None, PropertyKey::String(name)) if name == "length" => Exotic::Synthesized(
                        DataDescriptor::new(
                            JsValue::number(string.chars().count() as f64),
                            Attribute::none(),
                        )
                        .into(),
                    ),
                    _ => Exotic::None,
                },
                ObjectData::Arguments(Arguments::Mapped {
                    ref environment,
                    ref bindings,
                }) => match (&stored, key) {
                    (Some(descriptor), PropertyKey::Index(index)) => {
                        match bindings.get(*index as usize).cloned().flatten() {
                            Some(name) => Exotic::MappedArgument(
                                environment.clone(),
                                name,
                                descriptor.clone(),
                            ),
                            None => Exotic::None,
                        }
                    }
                    _ => Exotic::None,
                },
                ObjectData::ModuleNamespace(ref module) => match key {
                    PropertyKey::String(_) => Exotic::Namespace(module.clone()),
                    _ => Exotic::None,
                },
                _ => Exotic::None,
            };
            (stored, exotic)
        };

        match exotic {
            Exotic::Synthesized(descriptor) => Ok(Some(descriptor)),
            Exotic::Namespace(module) => {
                let name = match key {
                    PropertyKey::String(name) => name.clone(),
                    _ => unreachable!("namespace exotics are string keyed"),
                };
                match crate::module::namespace_get(&module, &name, context)? {
                    Some(value) => Ok(Some(
                        DataDescriptor::new(value, Attribute::ENUMERABLE).into(),
                    )),
                    None => Ok(stored),
                }
            }
            Exotic::MappedArgument(environment, name, descriptor) => {
                // The indexed slot aliases the named parameter binding.
                let value = environment
                    .borrow()
                    .get_binding_value(&name)
                    .unwrap_or_default();
                Ok(Some(
                    DataDescriptor::new(value, descriptor.attributes()).into(),
                ))
            }
            Exotic::None => Ok(stored),
        }
    }

    /// `[[DefineOwnProperty]]`.
    pub fn define_own_property(
        &self,
        key: PropertyKey,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("defineProperty", context)? {
            if trap.is_undefined() {
                return target.define_own_property(key, desc, context);
            }
            let descriptor_value = desc.to_value(context);
            let result = context.call(
                &trap,
                &JsValue::undefined(),
                &[target.into(), (&key).into(), descriptor_value],
            )?;
            return Ok(result.to_boolean());
        }

        let is_array = matches!(self.borrow().data, ObjectData::Array);
        if is_array {
            if let PropertyKey::String(ref name) = key {
                if name == "length" {
                    return self.array_set_length(desc, context);
                }
            }
            if let PropertyKey::Index(index) = key {
                return self.array_define_index(index, desc, context);
            }
        }

        // Mapped arguments keep the parameter binding in sync.
        self.arguments_write_through(&key, &desc);

        self.ordinary_define_own_property(key, desc, context)
    }

    /// `OrdinaryDefineOwnProperty` with the descriptor validation rules.
    pub(crate) fn ordinary_define_own_property(
        &self,
        key: PropertyKey,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        let current = self.get_own_property(&key, context)?;
        let extensible = self.borrow().is_extensible();

        let current = match current {
            Some(current) => current,
            None => {
                if !extensible {
                    return Ok(false);
                }
                self.borrow_mut().insert(key, desc);
                return Ok(true);
            }
        };

        if !current.configurable() {
            if desc.configurable() {
                return Ok(false);
            }
            if desc.enumerable() != current.enumerable() {
                return Ok(false);
            }
            match (&current, &desc) {
                (PropertyDescriptor::Data(current), PropertyDescriptor::Data(desc)) => {
                    // writable may only transition true -> false.
                    if desc.writable() && !current.writable() {
                        return Ok(false);
                    }
                    if !current.writable() && !same_value(&desc.value(), &current.value()) {
                        return Ok(false);
                    }
                }
                (PropertyDescriptor::Accessor(current), PropertyDescriptor::Accessor(desc)) => {
                    let same_getter = match (current.getter(), desc.getter()) {
                        (Some(a), Some(b)) => Self::ptr_eq(a, b),
                        (None, None) => true,
                        _ => false,
                    };
                    let same_setter = match (current.setter(), desc.setter()) {
                        (Some(a), Some(b)) => Self::ptr_eq(a, b),
                        (None, None) => true,
                        _ => false,
                    };
                    if !same_getter || !same_setter {
                        return Ok(false);
                    }
                }
                // Kind change requires a configurable property.
                _ => return Ok(false),
            }
        }

        self.borrow_mut().insert(key, desc);
        Ok(true)
    }

    /// Assignment to an array's `length`: truncates the indexed storage.
    fn array_set_length(
        &self,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        let new_len_value = match desc {
            PropertyDescriptor::Data(ref data) => data.value(),
            PropertyDescriptor::Accessor(_) => {
                return context.throw_type_error("cannot redefine array length as an accessor")
            }
        };
        let new_len = new_len_value.to_u32(context)?;
        let number_len = new_len_value.to_number(context)?;
        #[allow(clippy::float_cmp)]
        if f64::from(new_len) != number_len {
            return context.throw_range_error("invalid array length");
        }

        let old_len = self.array_length();
        let writable = self
            .borrow()
            .properties()
            .get(&PropertyKey::from("length"))
            .map(PropertyDescriptor::writable)
            .unwrap_or(true);

        if new_len < old_len && !writable {
            return Ok(false);
        }

        if new_len < old_len {
            let doomed: Vec<u32> = {
                let object = self.borrow();
                object
                    .properties()
                    .index_property_keys()
                    .into_iter()
                    .filter(|index| *index >= new_len)
                    .collect()
            };
            let mut object = self.borrow_mut();
            for index in doomed {
                object.remove_property(&PropertyKey::Index(index));
            }
        }

        self.borrow_mut().insert(
            PropertyKey::from("length"),
            DataDescriptor::new(JsValue::from(new_len), Attribute::WRITABLE),
        );
        Ok(true)
    }

    /// Definition of an indexed array property, growing `length` as needed.
    fn array_define_index(
        &self,
        index: u32,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        if index == u32::MAX {
            return context.throw_range_error("invalid array index");
        }
        let old_len = self.array_length();
        if index >= old_len {
            let length_writable = self
                .borrow()
                .properties()
                .get(&PropertyKey::from("length"))
                .map(PropertyDescriptor::writable)
                .unwrap_or(true);
            if !length_writable {
                return Ok(false);
            }
        }
        if !self.ordinary_define_own_property(PropertyKey::Index(index), desc, context)? {
            return Ok(false);
        }
        if index >= old_len {
            self.borrow_mut().insert(
                PropertyKey::from("length"),
                DataDescriptor::new(JsValue::from(index + 1), Attribute::WRITABLE),
            );
        }
        Ok(true)
    }

    /// The current `length` of an array object.
    pub(crate) fn array_length(&self) -> u32 {
        self.get_direct(&PropertyKey::from("length"))
            .and_then(|value| value.as_number())
            .map(|number| number as u32)
            .unwrap_or(0)
    }

    /// Mapped `arguments` objects alias indexed slots with parameter
    /// bindings in both directions.
    fn arguments_write_through(&self, key: &PropertyKey, desc: &PropertyDescriptor) {
        let index = match key.as_index() {
            Some(index) => index,
            None => return,
        };
        let write = {
            let object = self.borrow();
            match object.data {
                ObjectData::Arguments(Arguments::Mapped {
                    ref environment,
                    ref bindings,
                }) => bindings
                    .get(index as usize)
                    .cloned()
                    .flatten()
                    .map(|name| (environment.clone(), name)),
                _ => None,
            }
        };
        if let (Some((environment, name)), PropertyDescriptor::Data(data)) = (write, desc) {
            environment
                .borrow_mut()
                .set_binding_value_unchecked(&name, data.value());
        }
    }

    /// `[[Get]]` with an explicit receiver for accessor invocation.
    pub fn get(
        &self,
        key: &PropertyKey,
        receiver: JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if let Some((target, trap)) = self.proxy_trap("get", context)? {
            if trap.is_undefined() {
                return target.get(key, receiver, context);
            }
            return context.call(
                &trap,
                &JsValue::undefined(),
                &[target.into(), key.into(), receiver],
            );
        }

        match self.get_own_property(key, context)? {
            None => {
                let parent = self.prototype_instance();
                match parent.as_object() {
                    Some(parent) => parent.clone().get(key, receiver, context),
                    None => Ok(JsValue::undefined()),
                }
            }
            Some(PropertyDescriptor::Data(ref data)) => Ok(data.value()),
            Some(PropertyDescriptor::Accessor(ref accessor)) => match accessor.getter() {
                None => Ok(JsValue::undefined()),
                Some(getter) => {
                    // Re-entrant accessor chains are detected and broken
                    // per (object identity, property name).
                    let guard = (self.as_raw_ptr() as usize, key.clone());
                    if !context.enter_accessor(guard.clone()) {
                        return Ok(JsValue::undefined());
                    }
                    let result = getter.call(&receiver, &[], context);
                    context.leave_accessor(&guard);
                    result
                }
            },
        }
    }

    /// `[[Set]]` with an explicit receiver.
    pub fn set(
        &self,
        key: PropertyKey,
        value: JsValue,
        receiver: JsValue,
        context: &mut Context,
    ) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("set", context)? {
            if trap.is_undefined() {
                return target.set(key, value, receiver, context);
            }
            let result = context.call(
                &trap,
                &JsValue::undefined(),
                &[target.into(), (&key).into(), value, receiver],
            )?;
            return Ok(result.to_boolean());
        }

        let own_desc = match self.get_own_property(&key, context)? {
            Some(desc) => desc,
            None => {
                let parent = self.prototype_instance();
                if let Some(parent) = parent.as_object() {
                    return parent.clone().set(key, value, receiver, context);
                }
                DataDescriptor::new(JsValue::undefined(), Attribute::default()).into()
            }
        };

        match own_desc {
            PropertyDescriptor::Data(ref data) => {
                if !data.writable() {
                    return Ok(false);
                }
                let receiver = match receiver.as_object() {
                    Some(receiver) => receiver.clone(),
                    None => return Ok(false),
                };
                match receiver.get_own_property(&key, context)? {
                    Some(PropertyDescriptor::Accessor(_)) => Ok(false),
                    Some(PropertyDescriptor::Data(ref existing)) => {
                        if !existing.writable() {
                            return Ok(false);
                        }
                        receiver.define_own_property(
                            key,
                            DataDescriptor::new(value, existing.attributes()).into(),
                            context,
                        )
                    }
                    None => receiver.define_own_property(
                        key,
                        DataDescriptor::new(value, Attribute::default()).into(),
                        context,
                    ),
                }
            }
            PropertyDescriptor::Accessor(ref accessor) => match accessor.setter() {
                None => Ok(false),
                Some(setter) => {
                    let guard = (self.as_raw_ptr() as usize, key.clone());
                    if !context.enter_accessor(guard.clone()) {
                        return Ok(true);
                    }
                    let result = setter.call(&receiver, &[value], context);
                    context.leave_accessor(&guard);
                    result?;
                    Ok(true)
                }
            },
        }
    }

    /// `[[Delete]]`.
    pub fn delete(&self, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("deleteProperty", context)? {
            if trap.is_undefined() {
                return target.delete(key, context);
            }
            let result =
                context.call(&trap, &JsValue::undefined(), &[target.into(), key.into()])?;
            return Ok(result.to_boolean());
        }

        match self.get_own_property(key, context)? {
            None => Ok(true),
            Some(desc) if desc.configurable() => {
                // Deleting a mapped arguments index also severs the alias.
                if let Some(index) = key.as_index() {
                    let mut object = self.borrow_mut();
                    if let ObjectData::Arguments(Arguments::Mapped {
                        ref mut bindings, ..
                    }) = object.data
                    {
                        if let Some(slot) = bindings.get_mut(index as usize) {
                            *slot = None;
                        }
                    }
                }
                self.borrow_mut().remove_property(key);
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// `[[HasProperty]]`.
    pub fn has_property(&self, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("has", context)? {
            if trap.is_undefined() {
                return target.has_property(key, context);
            }
            let result =
                context.call(&trap, &JsValue::undefined(), &[target.into(), key.into()])?;
            return Ok(result.to_boolean());
        }

        if self.get_own_property(key, context)?.is_some() {
            return Ok(true);
        }
        let parent = self.prototype_instance();
        match parent.as_object() {
            Some(parent) => parent.clone().has_property(key, context),
            None => Ok(false),
        }
    }

    /// `[[OwnPropertyKeys]]`: integer keys ascending, then strings in
    /// insertion order, then symbols.
    pub fn own_property_keys(&self, context: &mut Context) -> JsResult<Vec<PropertyKey>> {
        if let Some((target, trap)) = self.proxy_trap("ownKeys", context)? {
            if trap.is_undefined() {
                return target.own_property_keys(context);
            }
            let result = context.call(&trap, &JsValue::undefined(), &[target.into()])?;
            let length = result.get_field("length", context)?.to_length(context)?;
            let mut keys = Vec::with_capacity(length);
            for index in 0..length {
                let element = result.get_field(index, context)?;
                keys.push(element.to_property_key(context)?);
            }
            return Ok(keys);
        }

        let mut keys = Vec::new();
        {
            let object = self.borrow();
            // String wrappers expose their character indices first.
            if let ObjectData::String(ref string) = object.data {
                for index in 0..string.chars().count() {
                    keys.push(PropertyKey::Index(index as u32));
                }
            }
            // Module namespaces expose their export names.
            if let ObjectData::ModuleNamespace(ref module) = object.data {
                for name in crate::module::namespace_keys(module) {
                    keys.push(PropertyKey::String(name));
                }
            }
            keys.extend(object.properties().keys());
        }
        Ok(keys)
    }

    /// `[[GetPrototypeOf]]`.
    pub fn get_prototype_of(&self, context: &mut Context) -> JsResult<JsValue> {
        if let Some((target, trap)) = self.proxy_trap("getPrototypeOf", context)? {
            if trap.is_undefined() {
                return target.get_prototype_of(context);
            }
            let result = context.call(&trap, &JsValue::undefined(), &[target.into()])?;
            if !result.is_object() && !result.is_null() {
                return context
                    .throw_type_error("proxy getPrototypeOf trap must return an object or null");
            }
            return Ok(result);
        }
        Ok(self.prototype_instance())
    }

    /// `[[SetPrototypeOf]]`, enforcing the acyclic prototype chain
    /// invariant.
    pub fn set_prototype_of(&self, proto: JsValue, context: &mut Context) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("setPrototypeOf", context)? {
            if trap.is_undefined() {
                return target.set_prototype_of(proto, context);
            }
            let result = context.call(
                &trap,
                &JsValue::undefined(),
                &[target.into(), proto],
            )?;
            return Ok(result.to_boolean());
        }

        if !proto.is_object() && !proto.is_null() {
            return context.throw_type_error("prototype must be an object or null");
        }
        let current = self.prototype_instance();
        if same_value(&current, &proto) {
            return Ok(true);
        }
        if !self.borrow().is_extensible() {
            return Ok(false);
        }
        // Walk the candidate chain to reject cycles. The walk stops at a
        // proxy, whose prototype is trap-controlled.
        let mut p = proto.clone();
        while let Some(p_object) = p.as_object().cloned() {
            if Self::ptr_eq(&p_object, self) {
                return Ok(false);
            }
            if p_object.borrow().is_proxy() {
                break;
            }
            p = p_object.prototype_instance();
        }
        self.borrow_mut().set_prototype(proto);
        Ok(true)
    }

    /// `[[IsExtensible]]`.
    pub fn is_extensible(&self, context: &mut Context) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("isExtensible", context)? {
            if trap.is_undefined() {
                return target.is_extensible(context);
            }
            let result = context.call(&trap, &JsValue::undefined(), &[target.into()])?;
            return Ok(result.to_boolean());
        }
        Ok(self.borrow().is_extensible())
    }

    /// `[[PreventExtensions]]`.
    pub fn prevent_extensions(&self, context: &mut Context) -> JsResult<bool> {
        if let Some((target, trap)) = self.proxy_trap("preventExtensions", context)? {
            if trap.is_undefined() {
                return target.prevent_extensions(context);
            }
            let result = context.call(&trap, &JsValue::undefined(), &[target.into()])?;
            return Ok(result.to_boolean());
        }
        self.borrow_mut().prevent_extensions();
        Ok(true)
    }

    /// `CreateDataProperty` with default attributes.
    pub fn create_data_property<K, V>(
        &self,
        key: K,
        value: V,
        context: &mut Context,
    ) -> JsResult<bool>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.define_own_property(
            key.into(),
            DataDescriptor::new(value.into(), Attribute::default()).into(),
            context,
        )
    }

    /// `DefinePropertyOrThrow`.
    pub fn define_property_or_throw(
        &self,
        key: PropertyKey,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<()> {
        if !self.define_own_property(key.clone(), desc, context)? {
            return context.throw_type_error(format!("cannot define property '{}'", key));
        }
        Ok(())
    }

    /// `GetMethod`: a callable property, `None` for undefined/null.
    pub fn get_method(
        &self,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<Option<JsObject>> {
        let method = self.get(key, self.clone().into(), context)?;
        if method.is_null_or_undefined() {
            return Ok(None);
        }
        match method.as_object() {
            Some(object) if object.is_callable() => Ok(Some(object.clone())),
            _ => context.throw_type_error(format!("property '{}' is not a function", key)),
        }
    }
}

impl PropertyDescriptor {
    /// `ToPropertyDescriptor`: reads a descriptor from a plain object, as
    /// consumed by `Object.defineProperty` and the proxy traps.
    pub fn from_value(value: &JsValue, context: &mut Context) -> JsResult<Self> {
        if !value.is_object() {
            return context.throw_type_error("property descriptor must be an object");
        }

        let get = value.get_field("get", context)?;
        let set = value.get_field("set", context)?;
        let has_accessor = !get.is_undefined() || !set.is_undefined();

        let mut attributes = Attribute::none();
        attributes.set_enumerable(value.get_field("enumerable", context)?.to_boolean());
        attributes.set_configurable(value.get_field("configurable", context)?.to_boolean());

        if has_accessor {
            let getter = match get {
                JsValue::Undefined => None,
                ref v if v.is_function() => v.as_object().cloned(),
                _ => return context.throw_type_error("getter must be a function"),
            };
            let setter = match set {
                JsValue::Undefined => None,
                ref v if v.is_function() => v.as_object().cloned(),
                _ => return context.throw_type_error("setter must be a function"),
            };
            Ok(AccessorDescriptor::new(getter, setter, attributes).into())
        } else {
            attributes.set_writable(value.get_field("writable", context)?.to_boolean());
            let value = value.get_field("value", context)?;
            Ok(DataDescriptor::new(value, attributes).into())
        }
    }

    /// `FromPropertyDescriptor`: reifies the descriptor as a plain object.
    pub fn to_value(&self, context: &mut Context) -> JsValue {
        let descriptor = JsValue::new_object(context);
        match self {
            Self::Data(data) => {
                descriptor.set_property("value", data.value(), Attribute::default());
                descriptor.set_property(
                    "writable",
                    data.writable().into(),
                    Attribute::default(),
                );
            }
            Self::Accessor(accessor) => {
                let getter = accessor
                    .getter()
                    .map(|g| g.clone().into())
                    .unwrap_or_default();
                let setter = accessor
                    .setter()
                    .map(|s| s.clone().into())
                    .unwrap_or_default();
                descriptor.set_property("get", getter, Attribute::default());
                descriptor.set_property("set", setter, Attribute::default());
            }
        }
        descriptor.set_property(
            "enumerable",
            self.enumerable().into(),
            Attribute::default(),
        );
        descriptor.set_property(
            "configurable",
            self.configurable().into(),
            Attribute::default(),
        );
        descriptor
    }
}
