//! YAML output: convert document values to YAML text.
//!
//! Mapping:
//!   - Value::Null    -> YAML null
//!   - Value::Bool    -> YAML bool
//!   - Value::Number  -> YAML integer, or float (including .nan, .inf, -.inf)
//!   - Value::String  -> YAML string
//!   - Value::List    -> YAML sequence
//!   - Value::Map     -> YAML mapping, keys in document order and of any kind

use anyhow::{Context, Result};
use libyamler::{Number, Value};
use num_traits::ToPrimitive;

/// Encode a value as a YAML string.
pub fn encode(value: &Value) -> Result<String> {
    serde_yaml::to_string(&value_to_yaml(value)).context("YAML encode error")
}

fn number_to_yaml(n: &Number) -> serde_yaml::Number {
    match n {
        Number::Float(f) => serde_yaml::Number::from(*f),
        _ => match n.to_i64() {
            Some(i) => serde_yaml::Number::from(i),
            None => serde_yaml::Number::from(n.to_f64().unwrap_or(f64::NAN)),
        },
    }
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(n) => serde_yaml::Value::Number(number_to_yaml(n)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::List(items) => serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect()),
        Value::Map(map) => {
            let mut mapping = serde_yaml::Mapping::new();
            for (k, v) in map.iter() {
                mapping.insert(value_to_yaml(k), value_to_yaml(v));
            }
            serde_yaml::Value::Mapping(mapping)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libyamler::parse_value;

    #[test]
    fn encodes_block_yaml() {
        let value = parse_value("{name: yamler, tags: [a, b], size: 1.5}").unwrap();
        assert_eq!(
            encode(&value).unwrap(),
            "name: yamler\ntags:\n- a\n- b\nsize: 1.5\n"
        );
    }

    #[test]
    fn keeps_non_string_keys() {
        let value = parse_value("{1: one, true: two}").unwrap();
        let text = encode(&value).unwrap();
        assert!(text.contains("1: one"));
        assert!(text.contains("true: two"));
    }

    #[test]
    fn encodes_special_floats() {
        let value = parse_value("[.inf, -.inf]").unwrap();
        assert_eq!(encode(&value).unwrap(), "- .inf\n- -.inf\n");
    }
}
