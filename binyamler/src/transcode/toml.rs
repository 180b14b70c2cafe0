//! TOML output: convert document values to TOML text.
//!
//! Mapping:
//!   - Value::Bool    -> TOML boolean
//!   - Value::Number  -> TOML integer, or float
//!   - Value::String  -> TOML string
//!   - Value::List    -> TOML array (maps inside become inline tables)
//!   - Value::Map     -> TOML table
//!
//! Lossy edges:
//!   - TOML has no null type; null values cause an error.
//!   - TOML keys are strings; other keys are written as their compact JSON.
//!   - TOML requires the top-level value to be a table; anything else errors.

use anyhow::{bail, Result};
use libyamler::{Map, Number, Value};
use num_traits::ToPrimitive;
use toml_edit::{DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a map value as a TOML document.
pub fn encode(value: &Value) -> Result<String> {
    let Value::Map(map) = value else {
        bail!("TOML requires the top-level value to be a table/object");
    };
    let mut doc = DocumentMut::new();
    for (key, item) in table(map)?.iter() {
        doc[key] = item.clone();
    }
    Ok(doc.to_string())
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn table(map: &Map) -> Result<Table> {
    let mut table = Table::new();
    for (k, v) in map.iter() {
        let item = match v {
            Value::Map(inner) => Item::Table(self::table(inner)?),
            other => Item::Value(value(other)?),
        };
        table.insert(&key_text(k), item);
    }
    Ok(table)
}

fn number(n: &Number) -> toml_edit::Value {
    match n {
        Number::Float(f) => toml_edit::Value::Float(Formatted::new(*f)),
        _ => match n.to_i64() {
            Some(i) => toml_edit::Value::Integer(Formatted::new(i)),
            None => toml_edit::Value::Float(Formatted::new(n.to_f64().unwrap_or(f64::NAN))),
        },
    }
}

fn value(value: &Value) -> Result<toml_edit::Value> {
    Ok(match value {
        Value::Null => bail!("TOML has no null type"),
        Value::Bool(b) => toml_edit::Value::Boolean(Formatted::new(*b)),
        Value::Number(n) => number(n),
        Value::String(s) => toml_edit::Value::String(Formatted::new(s.clone())),
        Value::List(items) => {
            let mut array = toml_edit::Array::new();
            for item in items.iter() {
                array.push(self::value(item)?);
            }
            toml_edit::Value::Array(array)
        }
        Value::Map(map) => {
            let mut inline = InlineTable::new();
            for (k, v) in map.iter() {
                inline.insert(&key_text(k), self::value(v)?);
            }
            toml_edit::Value::InlineTable(inline)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use libyamler::parse_value;

    #[test]
    fn encodes_tables() {
        let value = parse_value("title: demo\nserver:\n  port: 8080\n  hosts: [a, b]\n").unwrap();
        let text = encode(&value).unwrap();
        assert!(text.starts_with("title = \"demo\"\n"));
        assert!(text.contains("[server]\nport = 8080\nhosts = [\"a\", \"b\"]\n"));
    }

    #[test]
    fn maps_in_lists_become_inline_tables() {
        let value = parse_value("items: [{a: 1}]").unwrap();
        assert_eq!(encode(&value).unwrap(), "items = [{ a = 1 }]\n");
    }

    #[test]
    fn rejects_null() {
        let value = parse_value("a: null").unwrap();
        assert!(encode(&value).unwrap_err().to_string().contains("null"));
    }

    #[test]
    fn rejects_non_table() {
        let value = parse_value("[1, 2]").unwrap();
        assert!(encode(&value).is_err());
    }
}
