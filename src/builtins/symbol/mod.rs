//! The `Symbol` builtin: unique symbol creation, the realm-wide registry
//! behind `Symbol.for`, and the well known symbol statics.

use crate::{
    builtins::function::make_builtin_fn,
    property::{Attribute, DataDescriptor, PropertyKey},
    symbol::JsSymbol,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol;

impl Symbol {
    /// The `Symbol` function; `new Symbol()` throws.
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if new_target.is_function() {
            return context.throw_type_error("Symbol is not a constructor");
        }
        let description = match args.first() {
            Some(value) if !value.is_undefined() => Some(value.to_string(context)?),
            _ => None,
        };
        Ok(JsValue::symbol(context.construct_symbol(description)))
    }

    /// `Symbol.for(key)`: the realm global symbol registry.
    fn symbol_for(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = args
            .first()
            .cloned()
            .unwrap_or_default()
            .to_string(context)?;
        Ok(JsValue::symbol(context.symbol_registry_get_or_create(key)))
    }

    /// `Symbol.keyFor(symbol)`.
    fn key_for(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let symbol = match args.first().and_then(JsValue::as_symbol) {
            Some(symbol) => symbol.clone(),
            None => return context.throw_type_error("Symbol.keyFor requires a symbol"),
        };
        Ok(context
            .symbol_registry_key_for(&symbol)
            .map(JsValue::String)
            .unwrap_or_default())
    }

    fn this_symbol_value(this: &JsValue, context: &mut Context) -> JsResult<JsSymbol> {
        if let Some(symbol) = this.as_symbol() {
            return Ok(symbol.clone());
        }
        if let Some(object) = this.as_object() {
            if let Some(symbol) = object.borrow().as_symbol() {
                return Ok(symbol);
            }
        }
        context.throw_type_error("'this' is not a symbol")
    }

    /// `Symbol.prototype.toString()`.
    fn to_string(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let symbol = Self::this_symbol_value(this, context)?;
        Ok(JsValue::string(symbol.to_string()))
    }

    /// `Symbol.prototype.valueOf()`.
    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::symbol(Self::this_symbol_value(this, context)?))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("symbol", "init");

        let constructor = context.standard_objects().symbol_object().constructor();
        make_builtin_fn(Self::symbol_for, "for", &constructor, 1, context);
        make_builtin_fn(Self::key_for, "keyFor", &constructor, 1, context);

        // The well known symbol statics.
        let well_known = context.well_known_symbols().clone();
        let statics: [(&str, JsSymbol); 13] = [
            ("asyncIterator", well_known.async_iterator_symbol()),
            ("hasInstance", well_known.has_instance_symbol()),
            ("isConcatSpreadable", well_known.is_concat_spreadable_symbol()),
            ("iterator", well_known.iterator_symbol()),
            ("match", well_known.match_symbol()),
            ("matchAll", well_known.match_all_symbol()),
            ("replace", well_known.replace_symbol()),
            ("search", well_known.search_symbol()),
            ("species", well_known.species_symbol()),
            ("split", well_known.split_symbol()),
            ("toPrimitive", well_known.to_primitive_symbol()),
            ("toStringTag", well_known.to_string_tag_symbol()),
            ("unscopables", well_known.unscopables_symbol()),
        ];
        for (name, symbol) in statics.iter() {
            constructor.borrow_mut().insert(
                PropertyKey::from(*name),
                DataDescriptor::new(JsValue::symbol(symbol.clone()), Attribute::none()),
            );
        }

        let prototype = context.standard_objects().symbol_object().prototype();
        make_builtin_fn(Self::to_string, "toString", &prototype, 0, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Symbol",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}
