//! JSON Canonicalization Scheme (spec.md §4.8.1, RFC 8785) for literals
//! typed `rdf:JSON`, and the ES6 `Number.prototype.toString` lexical rule
//! used for every `xsd:decimal` literal lowered from a JSON number
//! (spec.md §4.8 step 4).

use rdf_core::{ErrorCode, ParseError};
use serde_json::Value;

const FORMAT: &str = "jsonld";

/// Serializes `value` to its RFC 8785 canonical UTF-8 byte sequence:
/// object keys sorted by UTF-16 code-unit order, numbers formatted per the
/// ES6 rule, strings re-escaped with the seven short escapes plus
/// `\u00XX` for other control characters.
pub fn canonicalize(value: &Value) -> Result<String, ParseError> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<(), ParseError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)?),
        Value::String(s) => write_canonical_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| utf16_units(a).cmp(&utf16_units(b)));
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_string(key, out);
                out.push(':');
                write_canonical(&map[key], out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn utf16_units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn write_canonical_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Formats a JSON number per the ES6 `Number::toString` rule RFC 8785
/// mandates: integers that fit exactly are emitted without a decimal
/// point; other values use Rust's shortest-round-trip digit sequence
/// (the same digit sequence ECMA-262's algorithm produces, since both are
/// the unique shortest decimal that round-trips the `f64`) re-punctuated
/// into fixed or exponential notation at the ECMA-262 thresholds.
pub fn format_number(n: &serde_json::Number) -> Result<String, ParseError> {
    if let Some(i) = n.as_i64() {
        return Ok(i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.to_string());
    }
    let f = n
        .as_f64()
        .ok_or_else(|| ParseError::new(ErrorCode::InvalidLiteral, FORMAT, "number is not representable"))?;
    format_f64(f)
}

pub fn format_f64(f: f64) -> Result<String, ParseError> {
    if f.is_nan() || f.is_infinite() {
        return Err(ParseError::new(
            ErrorCode::InvalidLiteral,
            FORMAT,
            "NaN and Infinity have no JSON number representation",
        ));
    }
    if f == 0.0 {
        return Ok("0".to_string());
    }
    let negative = f.is_sign_negative();
    let abs = f.abs();
    let (digits, exponent) = shortest_digits_and_exponent(abs);
    let k = digits.len() as i64;
    let n_exp = exponent + 1; // ECMA-262 `n`: value == digits * 10^(n-k)

    let mut body = if k <= n_exp && n_exp <= 21 {
        let mut s = digits.clone();
        s.push_str(&"0".repeat((n_exp - k) as usize));
        s
    } else if 0 < n_exp && n_exp <= 21 {
        let point = n_exp as usize;
        format!("{}.{}", &digits[..point], &digits[point..])
    } else if -6 < n_exp && n_exp <= 0 {
        format!("0.{}{}", "0".repeat((-n_exp) as usize), digits)
    } else {
        let mantissa = if k > 1 {
            format!("{}.{}", &digits[..1], &digits[1..])
        } else {
            digits.clone()
        };
        let e = n_exp - 1;
        format!("{mantissa}e{}{}", if e >= 0 { "+" } else { "-" }, e.abs())
    };
    if negative {
        body.insert(0, '-');
    }
    Ok(body)
}

/// Extracts the shortest round-trip decimal digit string and the base-10
/// exponent of its leading digit from Rust's own shortest-round-trip
/// exponential formatter, e.g. `42.0 -> ("42", 1)`, `0.1 -> ("1", -1)`.
fn shortest_digits_and_exponent(abs: f64) -> (String, i64) {
    let formatted = format!("{abs:e}");
    let (mantissa, exponent) = formatted.split_once('e').expect("exponential form always has 'e'");
    let exponent: i64 = exponent.parse().expect("exponent is a valid integer");
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    (digits.to_string(), exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalizes_object_keys_in_utf16_order() {
        let v = json!({"b": 1, "a": 2});
        assert_eq!(canonicalize(&v).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn canonical_string_escapes_short_forms() {
        let v = json!("line\nbreak\t\"quote\"");
        assert_eq!(canonicalize(&v).unwrap(), r#""line\nbreak\t\"quote\"""#);
    }

    #[test]
    fn canonical_string_escapes_other_controls() {
        let v = Value::String("\u{1}".to_string());
        assert_eq!(canonicalize(&v).unwrap(), r#""\u0001""#);
    }

    #[test]
    fn does_not_escape_forward_slash() {
        let v = json!("a/b");
        assert_eq!(canonicalize(&v).unwrap(), r#""a/b""#);
    }

    #[test]
    fn zero_canonicalizes_to_bare_zero() {
        assert_eq!(format_f64(0.0).unwrap(), "0");
        assert_eq!(format_f64(-0.0).unwrap(), "0");
    }

    #[test]
    fn trailing_fraction_zero_is_stripped() {
        assert_eq!(format_f64(42.0).unwrap(), "42");
    }

    #[test]
    fn large_exponent_uses_es6_scientific_form() {
        assert_eq!(format_f64(1e25).unwrap(), "1e+25");
    }

    #[test]
    fn small_values_use_fixed_notation_in_range() {
        assert_eq!(format_f64(1e-6).unwrap(), "0.000001");
    }

    #[test]
    fn rejects_nan_and_infinity() {
        format_f64(f64::NAN).unwrap_err();
        format_f64(f64::INFINITY).unwrap_err();
    }

    #[test]
    fn idempotent_on_canonical_input() {
        let v = json!({"x": [1, 2.5, "s", null, true]});
        let once = canonicalize(&v).unwrap();
        let reparsed: Value = serde_json::from_str(&once).unwrap();
        let twice = canonicalize(&reparsed).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn integer_numbers_format_exactly() {
        assert_eq!(format_number(&serde_json::Number::from(42)).unwrap(), "42");
    }
}
