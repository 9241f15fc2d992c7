//! The `Number` builtin and the numeric conversion helpers the value
//! model is built on: `ToInt32`/`ToUint32` masking, the canonical
//! Number-to-String algorithm (via `ryu-js`) and String-to-Number parsing
//! (via `fast-float`).

use crate::{
    builtins::function::make_builtin_fn,
    object::{Object, ObjectData},
    property::Attribute,
    value::JsValue,
    Context, JsResult, Profiler,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct Number;

impl Number {
    /// The largest integer `n` such that `n` and `n + 1` are both exactly
    /// representable.
    pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991_f64;

    pub(crate) const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991_f64;

    /// The canonical JavaScript string form of a number.
    pub(crate) fn to_native_string(value: f64) -> String {
        let mut buffer = ryu_js::Buffer::new();
        buffer.format(value).to_string()
    }

    /// Number-to-String with an explicit radix; radix 10 falls back to the
    /// shortest round-trip form.
    pub(crate) fn to_native_string_radix(mut value: f64, radix: u32) -> String {
        if radix == 10 {
            return Self::to_native_string(value);
        }
        if value.is_nan() {
            return "NaN".into();
        }
        if value.is_infinite() {
            return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
        }

        let negative = value < 0.0;
        if negative {
            value = -value;
        }

        let digits = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut integral = value.trunc();
        let mut fraction = value.fract();

        let mut int_digits = Vec::new();
        if integral == 0.0 {
            int_digits.push(b'0');
        }
        while integral >= 1.0 {
            let digit = (integral % f64::from(radix)) as usize;
            int_digits.push(digits[digit]);
            integral = (integral / f64::from(radix)).trunc();
        }
        int_digits.reverse();

        let mut result = String::from_utf8(int_digits).expect("radix digits are ascii");
        if fraction > 0.0 {
            result.push('.');
            // Enough fractional digits to distinguish doubles.
            let mut budget = 52;
            while fraction > 0.0 && budget > 0 {
                fraction *= f64::from(radix);
                let digit = fraction.trunc() as usize;
                result.push(digits[digit] as char);
                fraction -= fraction.trunc();
                budget -= 1;
            }
        }

        if negative {
            format!("-{}", result)
        } else {
            result
        }
    }

    /// `ToNumber` applied to a string.
    pub(crate) fn string_to_number(string: &str) -> f64 {
        let string = string.trim_matches(is_trimmable_whitespace);
        if string.is_empty() {
            return 0.0;
        }

        match string {
            "Infinity" | "+Infinity" => return f64::INFINITY,
            "-Infinity" => return f64::NEG_INFINITY,
            _ => {}
        }

        if let Some(digits) = string
            .strip_prefix("0x")
            .or_else(|| string.strip_prefix("0X"))
        {
            return parse_radix_digits(digits, 16);
        }
        if let Some(digits) = string
            .strip_prefix("0o")
            .or_else(|| string.strip_prefix("0O"))
        {
            return parse_radix_digits(digits, 8);
        }
        if let Some(digits) = string
            .strip_prefix("0b")
            .or_else(|| string.strip_prefix("0B"))
        {
            return parse_radix_digits(digits, 2);
        }

        // `fast-float` accepts a superset of the StrDecimalLiteral
        // grammar ("inf", "nan", hex floats), so validate the shape first.
        if !is_decimal_literal(string) {
            return f64::NAN;
        }
        fast_float::parse(string).unwrap_or(f64::NAN)
    }

    /// The `Number` function: plain calls convert, `new` boxes.
    pub(crate) fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = match args.first() {
            Some(value) => value.to_numeric_number(context)?,
            None => 0.0,
        };
        // Under `new` the first argument is the new target (a constructor
        // function); plain calls convert instead.
        if new_target.is_function() {
            let mut object = Object::create(
                context
                    .standard_objects()
                    .number_object()
                    .prototype()
                    .into(),
            );
            object.data = ObjectData::Number(value);
            return Ok(JsValue::object(object));
        }
        Ok(JsValue::rational(value))
    }

    fn this_number_value(this: &JsValue, context: &mut Context) -> JsResult<f64> {
        if let Some(number) = this.as_number() {
            return Ok(number);
        }
        if let Some(object) = this.as_object() {
            if let Some(number) = object.borrow().as_number() {
                return Ok(number);
            }
        }
        context.throw_type_error("'this' is not a number")
    }

    /// `Number.prototype.toString(radix)`.
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = Self::this_number_value(this, context)?;
        let radix = match args.first() {
            Some(radix) if !radix.is_undefined() => radix.to_integer(context)? as u32,
            _ => 10,
        };
        if !(2..=36).contains(&radix) {
            return context.throw_range_error("radix must be an integer between 2 and 36");
        }
        Ok(JsValue::string(Self::to_native_string_radix(value, radix)))
    }

    /// `Number.prototype.valueOf()`.
    fn value_of(this: &JsValue, _args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::rational(Self::this_number_value(this, context)?))
    }

    /// `Number.isInteger(value)`.
    fn is_integer(
        _this: &JsValue,
        args: &[JsValue],
        _context: &mut Context,
    ) -> JsResult<JsValue> {
        let result = args
            .first()
            .and_then(JsValue::as_number)
            .map(|number| number.is_finite() && number.fract() == 0.0)
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    /// `Number.isNaN(value)`.
    fn number_is_nan(
        _this: &JsValue,
        args: &[JsValue],
        _context: &mut Context,
    ) -> JsResult<JsValue> {
        let result = args
            .first()
            .and_then(JsValue::as_number)
            .map(f64::is_nan)
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    /// `Number.isFinite(value)`.
    fn number_is_finite(
        _this: &JsValue,
        args: &[JsValue],
        _context: &mut Context,
    ) -> JsResult<JsValue> {
        let result = args
            .first()
            .and_then(JsValue::as_number)
            .map(f64::is_finite)
            .unwrap_or(false);
        Ok(JsValue::boolean(result))
    }

    pub(crate) fn init(context: &mut Context) {
        let _timer = Profiler::global().start_event("number", "init");

        let constructor = context.standard_objects().number_object().constructor();
        let attribute = Attribute::none();
        let mut ctor = constructor.borrow_mut();
        ctor.insert_property("MAX_SAFE_INTEGER", Self::MAX_SAFE_INTEGER, attribute);
        ctor.insert_property("MIN_SAFE_INTEGER", Self::MIN_SAFE_INTEGER, attribute);
        ctor.insert_property("MAX_VALUE", f64::MAX, attribute);
        ctor.insert_property("MIN_VALUE", f64::MIN_POSITIVE, attribute);
        ctor.insert_property("EPSILON", f64::EPSILON, attribute);
        ctor.insert_property("NaN", f64::NAN, attribute);
        ctor.insert_property("POSITIVE_INFINITY", f64::INFINITY, attribute);
        ctor.insert_property("NEGATIVE_INFINITY", f64::NEG_INFINITY, attribute);
        drop(ctor);
        make_builtin_fn(Self::is_integer, "isInteger", &constructor, 1, context);
        make_builtin_fn(Self::number_is_nan, "isNaN", &constructor, 1, context);
        make_builtin_fn(Self::number_is_finite, "isFinite", &constructor, 1, context);

        let prototype = context.standard_objects().number_object().prototype();
        make_builtin_fn(Self::to_string, "toString", &prototype, 1, context);
        make_builtin_fn(Self::value_of, "valueOf", &prototype, 0, context);

        let global = context.global_object();
        global.borrow_mut().insert_property(
            "Number",
            constructor,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
    }
}

fn is_trimmable_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut result = 0.0f64;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(digit) => result = result * f64::from(radix) + f64::from(digit),
            None => return f64::NAN,
        }
    }
    result
}

fn is_decimal_literal(string: &str) -> bool {
    let mut chars = string.chars().peekable();
    if matches!(chars.peek(), Some('+') | Some('-')) {
        chars.next();
    }
    let mut saw_digit = false;
    let mut saw_dot = false;
    let mut saw_exponent = false;
    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => {
                saw_digit = true;
                chars.next();
            }
            '.' if !saw_dot && !saw_exponent => {
                saw_dot = true;
                chars.next();
            }
            'e' | 'E' if saw_digit && !saw_exponent => {
                saw_exponent = true;
                chars.next();
                if matches!(chars.peek(), Some('+') | Some('-')) {
                    chars.next();
                }
                if !matches!(chars.peek(), Some('0'..='9')) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    saw_digit
}

/// The `ToInt32` abstract operation: IEEE double to wrapped 32 bit signed
/// integer.
pub(crate) fn f64_to_int32(number: f64) -> i32 {
    if number.is_nan() || number.is_infinite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    const TWO_32: f64 = 4_294_967_296.0;
    const TWO_31: f64 = 2_147_483_648.0;
    let modulo = number.rem_euclid(TWO_32);
    if modulo >= TWO_31 {
        (modulo - TWO_32) as i32
    } else {
        modulo as i32
    }
}

/// The `ToUint32` abstract operation.
pub(crate) fn f64_to_uint32(number: f64) -> u32 {
    if number.is_nan() || number.is_infinite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    const TWO_32: f64 = 4_294_967_296.0;
    number.rem_euclid(TWO_32) as u32
}

/// The global `parseInt(string, radix)`.
pub(crate) fn parse_int(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let input = args.first().cloned().unwrap_or_default();
    let input = input.to_string(context)?;
    let mut string = input.trim_matches(is_trimmable_whitespace);

    let mut sign = 1.0;
    if let Some(rest) = string.strip_prefix('-') {
        sign = -1.0;
        string = rest;
    } else if let Some(rest) = string.strip_prefix('+') {
        string = rest;
    }

    let mut radix = match args.get(1) {
        Some(radix) if !radix.is_undefined() => f64_to_int32(radix.to_number(context)?),
        _ => 0,
    };

    if radix != 0 && !(2..=36).contains(&radix) {
        return Ok(JsValue::nan());
    }

    let mut strip_prefix = true;
    if radix == 0 {
        radix = 10;
    } else if radix != 16 {
        strip_prefix = false;
    }
    if strip_prefix && (radix == 16 || radix == 10) {
        if let Some(rest) = string
            .strip_prefix("0x")
            .or_else(|| string.strip_prefix("0X"))
        {
            string = rest;
            radix = 16;
        }
    }

    // Parse the longest valid digit prefix.
    let mut end = 0;
    for c in string.chars() {
        if c.to_digit(radix as u32).is_none() {
            break;
        }
        end += c.len_utf8();
    }
    if end == 0 {
        return Ok(JsValue::nan());
    }

    let mut result = 0.0f64;
    for c in string[..end].chars() {
        let digit = c.to_digit(radix as u32).expect("validated above");
        result = result * f64::from(radix) + f64::from(digit);
    }
    Ok(JsValue::rational(sign * result))
}

/// The global `parseFloat(string)`.
pub(crate) fn parse_float(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let input = args.first().cloned().unwrap_or_default();
    let input = input.to_string(context)?;
    let string = input.trim_start_matches(is_trimmable_whitespace);
    // `fast-float` already parses the longest valid prefix.
    match fast_float::parse_partial::<f64, _>(string) {
        Ok((value, consumed)) if consumed > 0 => {
            // Reject forms JavaScript does not accept ("inf", "nan").
            let accepted = &string[..consumed];
            if accepted
                .chars()
                .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
            {
                if accepted.contains("Infinity") {
                    Ok(JsValue::rational(value))
                } else {
                    Ok(JsValue::nan())
                }
            } else {
                Ok(JsValue::rational(value))
            }
        }
        _ => Ok(JsValue::nan()),
    }
}

/// The global `isNaN(value)`.
pub(crate) fn global_is_nan(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = args.first().cloned().unwrap_or_default();
    Ok(JsValue::boolean(value.to_number(context)?.is_nan()))
}

/// The global `isFinite(value)`.
pub(crate) fn global_is_finite(
    _this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = args.first().cloned().unwrap_or_default();
    Ok(JsValue::boolean(value.to_number(context)?.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_masking() {
        assert_eq!(f64_to_int32(0.0), 0);
        assert_eq!(f64_to_int32(-0.0), 0);
        assert_eq!(f64_to_int32(f64::NAN), 0);
        assert_eq!(f64_to_int32(f64::INFINITY), 0);
        assert_eq!(f64_to_int32(4_294_967_296.0), 0);
        assert_eq!(f64_to_int32(4_294_967_297.0), 1);
        assert_eq!(f64_to_int32(2_147_483_648.0), -2_147_483_648);
        assert_eq!(f64_to_uint32(-1.0), 4_294_967_295);
    }

    #[test]
    fn string_to_number_grammar() {
        assert_eq!(Number::string_to_number(""), 0.0);
        assert_eq!(Number::string_to_number("  42  "), 42.0);
        assert_eq!(Number::string_to_number("0x10"), 16.0);
        assert_eq!(Number::string_to_number("0b101"), 5.0);
        assert_eq!(Number::string_to_number("1e3"), 1000.0);
        assert_eq!(Number::string_to_number("Infinity"), f64::INFINITY);
        assert!(Number::string_to_number("inf").is_nan());
        assert!(Number::string_to_number("nan").is_nan());
        assert!(Number::string_to_number("12abc").is_nan());
    }

    #[test]
    fn radix_formatting() {
        assert_eq!(Number::to_native_string_radix(255.0, 16), "ff");
        assert_eq!(Number::to_native_string_radix(-8.0, 2), "-1000");
        assert_eq!(Number::to_native_string_radix(0.0, 8), "0");
    }
}
