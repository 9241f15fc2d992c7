use super::*;
use crate::{property::Attribute, Context};

#[test]
fn to_boolean_matrix() {
    assert!(!JsValue::undefined().to_boolean());
    assert!(!JsValue::null().to_boolean());
    assert!(!JsValue::integer(0).to_boolean());
    assert!(!JsValue::rational(f64::NAN).to_boolean());
    assert!(!JsValue::string("").to_boolean());
    assert!(JsValue::string("false").to_boolean());
    assert!(JsValue::rational(-1.5).to_boolean());
    assert!(JsValue::bigint(JsBigInt::from(1)).to_boolean());
    assert!(!JsValue::bigint(JsBigInt::zero()).to_boolean());
}

#[test]
fn to_number_on_primitives() {
    let mut context = Context::new();
    assert_eq!(JsValue::null().to_number(&mut context).unwrap(), 0.0);
    assert!(JsValue::undefined()
        .to_number(&mut context)
        .unwrap()
        .is_nan());
    assert_eq!(
        JsValue::string("  12.5 ").to_number(&mut context).unwrap(),
        12.5
    );
    assert_eq!(JsValue::boolean(true).to_number(&mut context).unwrap(), 1.0);
    assert!(JsValue::symbol(context.construct_symbol(None))
        .to_number(&mut context)
        .is_err());
}

#[test]
fn number_string_round_trips() {
    let mut context = Context::new();
    for value in [f64::MIN_POSITIVE, f64::MAX, f64::INFINITY] {
        let text = JsValue::rational(value).to_string(&mut context).unwrap();
        let back = JsValue::String(text).to_number(&mut context).unwrap();
        assert_eq!(back, value);
    }
    let nan_text = JsValue::nan().to_string(&mut context).unwrap();
    assert_eq!(nan_text.as_str(), "NaN");
    assert!(JsValue::String(nan_text).to_number(&mut context).unwrap().is_nan());
}

#[test]
fn strict_equality_across_number_storage() {
    assert!(JsValue::integer(3).strict_equals(&JsValue::rational(3.0)));
    assert!(!JsValue::integer(3).strict_equals(&JsValue::string("3")));
    assert!(!JsValue::nan().strict_equals(&JsValue::nan()));
}

#[test]
fn loose_equality_coerces() {
    let mut context = Context::new();
    assert!(JsValue::null()
        .equals(&JsValue::undefined(), &mut context)
        .unwrap());
    assert!(JsValue::integer(3)
        .equals(&JsValue::string("3"), &mut context)
        .unwrap());
    assert!(JsValue::boolean(true)
        .equals(&JsValue::integer(1), &mut context)
        .unwrap());
    assert!(JsValue::bigint(JsBigInt::from(3))
        .equals(&JsValue::integer(3), &mut context)
        .unwrap());
    assert!(!JsValue::null()
        .equals(&JsValue::integer(0), &mut context)
        .unwrap());
}

#[test]
fn same_value_distinguishes_zeros_and_unifies_nans() {
    assert!(!same_value(
        &JsValue::rational(0.0),
        &JsValue::rational(-0.0)
    ));
    assert!(same_value(&JsValue::nan(), &JsValue::nan()));
    assert!(same_value_zero(
        &JsValue::rational(0.0),
        &JsValue::rational(-0.0)
    ));
}

#[test]
fn to_primitive_prefers_symbol_to_primitive() {
    let mut context = Context::new();
    let object = JsValue::new_object(&context);
    let handler = crate::builtins::promise::native_closure(
        |_this: &JsValue, _args: &[JsValue], _context: &mut Context| {
            Ok(JsValue::integer(7))
        },
        &context,
    );
    let to_primitive = context.well_known_symbols().to_primitive_symbol();
    object.set_property(to_primitive, handler.into(), Attribute::default());

    let result = object
        .to_primitive(&mut context, PreferredType::Number)
        .unwrap();
    assert_eq!(result.as_number(), Some(7.0));
}

#[test]
fn to_object_boxes_primitives() {
    let mut context = Context::new();
    let boxed = JsValue::integer(4).to_object(&mut context).unwrap();
    assert_eq!(boxed.borrow().as_number(), Some(4.0));
    assert!(JsValue::null().to_object(&mut context).is_err());
}

#[test]
fn primitive_member_access_auto_boxes() {
    let mut context = Context::new();
    let length = JsValue::string("hello")
        .get_field("length", &mut context)
        .unwrap();
    assert_eq!(length.as_number(), Some(5.0));

    let ch = JsValue::string("hello").get_field(1, &mut context).unwrap();
    assert_eq!(ch.as_string().map(|s| s.as_str()), Some("e"));

    let upper_fn = JsValue::string("abc")
        .get_field("toUpperCase", &mut context)
        .unwrap();
    assert!(upper_fn.is_function());
}

#[test]
fn json_round_trip_is_structural() {
    let mut context = Context::new();
    let source = serde_json::json!({
        "a": 1,
        "b": [true, null, "x"],
        "c": { "nested": 2.5 }
    });
    let value = JsValue::from_json(source.clone(), &mut context);
    let back = value.to_json(&mut context).unwrap();
    assert_eq!(source, back);
}

#[test]
fn typeof_reports_function_for_callable_objects() {
    let context = Context::new();
    let function: JsValue = context
        .standard_objects()
        .object_object()
        .constructor()
        .into();
    assert_eq!(function.type_of().as_str(), "function");
    assert_eq!(JsValue::null().type_of().as_str(), "object");
    assert_eq!(
        JsValue::bigint(JsBigInt::from(1)).type_of().as_str(),
        "bigint"
    );
}
