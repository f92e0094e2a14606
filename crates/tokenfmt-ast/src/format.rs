//! Value rendering and format-specifier application.
//!
//! Format specifiers come from `{path:spec}` tokens. Only the
//! fixed-decimal form `.Nf` carries semantics; unrecognized specifiers
//! fall through to plain rendering so a schema typo degrades to
//! readable output instead of failing a render.

use crate::foundation::{AttributeType, ExpressionType};
use crate::value::Value;

/// Renders a value with an optional format specifier and optional type
/// metadata.
///
/// `Value::Null` always renders empty. Objects render as their type
/// name; callers that can await should prefer the object's own display
/// string instead.
pub fn format_value(value: &Value, format: Option<&str>, ty: Option<&ExpressionType>) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n, format),
        Value::String(s) => {
            // Hosts sometimes store declared-numeric attributes as text;
            // the declared type decides whether a specifier applies.
            if matches!(ty, Some(ExpressionType::Attribute(AttributeType::Number))) {
                if let Ok(n) = s.parse::<f64>() {
                    return format_number(n, format);
                }
            }
            s.clone()
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| format_value(item, None, None))
                .collect();
            rendered.join(", ")
        }
        Value::Map(members) => {
            let rendered: Vec<String> = members
                .iter()
                .map(|(k, v)| format!("{k}: {}", format_value(v, None, None)))
                .collect();
            rendered.join(", ")
        }
        Value::Object(object) => object.type_name().to_string(),
    }
}

/// Renders a number, honoring a `.Nf` fixed-decimal specifier.
///
/// Integral values print without a trailing `.0`.
fn format_number(n: f64, format: Option<&str>) -> String {
    if let Some(decimals) = format.and_then(parse_fixed_decimals) {
        return format!("{n:.decimals$}");
    }
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parses a `.Nf` specifier into its decimal count.
fn parse_fixed_decimals(spec: &str) -> Option<usize> {
    let digits = spec.strip_prefix('.')?.strip_suffix('f')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_decimals() {
        assert_eq!(format_value(&Value::Number(3.14159), Some(".2f"), None), "3.14");
        assert_eq!(format_value(&Value::Number(2.0), Some(".3f"), None), "2.000");
    }

    #[test]
    fn test_unknown_specifier_falls_through() {
        assert_eq!(format_value(&Value::Number(7.0), Some("0n"), None), "7");
        assert_eq!(format_value(&Value::String("x".into()), Some(".2f"), None), "x");
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(format_value(&Value::Null, None, None), "");
        assert_eq!(format_value(&Value::Null, Some(".2f"), None), "");
    }

    #[test]
    fn test_integral_number_has_no_decimal_point() {
        assert_eq!(format_value(&Value::Number(42.0), None, None), "42");
        assert_eq!(format_value(&Value::Number(1.5), None, None), "1.5");
    }

    #[test]
    fn test_declared_numeric_text_accepts_specifier() {
        let ty = ExpressionType::Attribute(AttributeType::Number);
        assert_eq!(
            format_value(&Value::String("3.14159".into()), Some(".2f"), Some(&ty)),
            "3.14"
        );
    }

    #[test]
    fn test_array_and_map_rendering() {
        let array = Value::Array(vec![Value::Number(1.0), Value::String("a".into())]);
        assert_eq!(format_value(&array, None, None), "1, a");
    }
}
