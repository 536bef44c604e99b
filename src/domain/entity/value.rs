use serde::{Serialize, Serializer};
use std::fmt;

/// 表示用に取り出したセルの値
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    // 日付・時刻はArrowの表示形式の文字列で保持する
    Timestamp(String),
    Null,
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            // JSONはNaN/Infinityを表現できないので文字列にする
            Value::Float(f) if !f.is_finite() => serializer.serialize_str(&f.to_string()),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) | Value::Timestamp(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Timestamp(dt) => write!(f, "{}", dt),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::Integer(val)
    }
}
impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::Float(val)
    }
}
impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::Text(val)
    }
}
impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::Text(val.to_string())
    }
}
impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Boolean(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_plain_json() {
        let values = vec![
            Value::from(3i64),
            Value::from(1.5),
            Value::from("x"),
            Value::from(true),
            Value::Timestamp("2024-01-01".to_string()),
            Value::Null,
        ];
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!([3, 1.5, "x", true, "2024-01-01", null])
        );
    }

    #[test]
    fn non_finite_floats_become_strings() {
        assert_eq!(serde_json::to_value(Value::Float(f64::NAN)).unwrap(), json!("NaN"));
    }
}
