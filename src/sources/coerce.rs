//! Cell-level typed parsing for snapshot records.
//!
//! Snapshot cells arrive as loosely typed JSON. Anything that is not a
//! usable value for its column becomes `None`; nothing here fails.

use serde_json::Value;

/// Finite decimal from a JSON number or numeric string
pub fn decimal(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Non-negative integral count. `5.0` is accepted, `2.5` and `-1` are not.
pub fn count(value: Option<&Value>) -> Option<u64> {
    if let Some(Value::Number(n)) = value {
        if let Some(v) = n.as_u64() {
            return Some(v);
        }
    }
    let v = decimal(value)?;
    if v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}

/// Non-blank text; numbers are rendered as text
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        assert_eq!(decimal(Some(&json!(12.5))), Some(12.5));
        assert_eq!(decimal(Some(&json!(" 1000 "))), Some(1000.0));
        assert_eq!(decimal(Some(&json!("1e3"))), Some(1000.0));
    }

    #[test]
    fn decimal_nulls_everything_else() {
        assert_eq!(decimal(None), None);
        assert_eq!(decimal(Some(&json!(null))), None);
        assert_eq!(decimal(Some(&json!("n/a"))), None);
        assert_eq!(decimal(Some(&json!("1,000"))), None);
        assert_eq!(decimal(Some(&json!("NaN"))), None);
        assert_eq!(decimal(Some(&json!("inf"))), None);
        assert_eq!(decimal(Some(&json!(true))), None);
        assert_eq!(decimal(Some(&json!([1]))), None);
    }

    #[test]
    fn count_requires_non_negative_integers() {
        assert_eq!(count(Some(&json!(5))), Some(5));
        assert_eq!(count(Some(&json!(5.0))), Some(5));
        assert_eq!(count(Some(&json!("7"))), Some(7));
        assert_eq!(count(Some(&json!(2.5))), None);
        assert_eq!(count(Some(&json!(-1))), None);
        assert_eq!(count(Some(&json!("lots"))), None);
        assert_eq!(count(None), None);
    }

    #[test]
    fn text_skips_blank_and_non_scalar_values() {
        assert_eq!(text(Some(&json!("WETH / USDT"))), Some("WETH / USDT".to_string()));
        assert_eq!(text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text(Some(&json!("  "))), None);
        assert_eq!(text(Some(&json!(null))), None);
        assert_eq!(text(Some(&json!({"a": 1}))), None);
    }
}
