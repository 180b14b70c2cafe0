//! Document value representation.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use num_traits::ToPrimitive;

use crate::encode;

/// A numeric scalar.
///
/// Integers keep the narrowest width they were read with. Comparison is
/// numeric, so `Int(1)`, `Long(1)` and `Float(1.0)` are all equal, and NaN
/// equals itself so numbers can be used as map keys.
#[derive(Clone, Copy)]
pub enum Number {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer that does not fit in 32 bits.
    Long(i64),
    /// 64-bit floating-point number.
    Float(f64),
}

impl Number {
    /// The value as an exact integer, if it has one.
    fn integral(&self) -> Option<i64> {
        match *self {
            Number::Int(n) => Some(n as i64),
            Number::Long(n) => Some(n),
            Number::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
                {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Returns `true` for `Float`.
    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => match (self.integral(), other.integral()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match (self.integral(), self) {
            (Some(n), _) => n.hash(state),
            (None, Number::Float(f)) if f.is_nan() => f64::NAN.to_bits().hash(state),
            (None, Number::Float(f)) => f.to_bits().hash(state),
            (None, _) => {}
        }
    }
}

impl ToPrimitive for Number {
    fn to_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(n) => Some(n as i64),
            Number::Long(n) => Some(n),
            Number::Float(f) => f.to_i64(),
        }
    }

    fn to_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(n) => n.to_u64(),
            Number::Long(n) => n.to_u64(),
            Number::Float(f) => f.to_u64(),
        }
    }

    fn to_f64(&self) -> Option<f64> {
        match *self {
            Number::Int(n) => Some(n as f64),
            Number::Long(n) => Some(n as f64),
            Number::Float(f) => Some(f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Long(n) => write!(f, "{}", n),
            Number::Float(n) => f.write_str(&encode::format_float(*n)),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Long(n) => write!(f, "{}L", n),
            Number::Float(n) => write!(f, "{}", encode::format_float(*n)),
        }
    }
}

/// An insertion-ordered map whose keys may be any [`Value`].
///
/// Re-inserting an existing key replaces its value in place. Equality
/// ignores entry order.
#[derive(Clone, Default)]
pub struct Map {
    entries: IndexMap<Value, Value>,
}

impl Map {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a string key.
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.entries.get(&Value::from(key))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Value, Value> {
        self.entries.values()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |ov| v == ov))
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent so that it agrees with `eq`.
        let mut combined = 0u64;
        for (k, v) in self.iter() {
            let mut hasher = DefaultHasher::new();
            k.hash(&mut hasher);
            v.hash(&mut hasher);
            combined ^= hasher.finish();
        }
        self.len().hash(state);
        combined.hash(state);
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Value, Value)> for Map {
    fn extend<I: IntoIterator<Item = (Value, Value)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A document value.
///
/// Lists and maps are reference counted: a value bound to an anchor is
/// shared, not copied, by every alias that refers to it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer or floating-point number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Arc<Vec<Value>>),
    /// Insertion-ordered map.
    Map(Arc<Map>),
}

impl Value {
    /// Build a list value from anything convertible to values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }

    /// Build a map value from key/value pairs, preserving their order.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Map(Arc::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Returns `true` if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as an `i64` if it has an exact integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) if !n.is_float() => n.to_i64(),
            Value::Number(n) => n.integral(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().and_then(|n| n.to_f64())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a string key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get_str(key))
    }

    /// Short name of the value's kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Float(_)) => "float",
            Value::Number(_) => "int",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}

/// Scalars display as their plain text; lists and maps as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Map(_) => f.write_str(&encode::to_json_string(self, -1)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(match i32::try_from(n) {
            Ok(small) => Number::Int(small),
            Err(_) => Number::Long(n),
        })
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Arc::new(items))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// The documents read from one input, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Documents(Vec<Value>);

impl Documents {
    pub fn new(documents: Vec<Value>) -> Self {
        Documents(documents)
    }

    /// The first document, if any.
    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    /// The first document if it is a map.
    pub fn first_map(&self) -> Option<&Map> {
        self.first().and_then(Value::as_map)
    }

    /// The single document, or a list of all documents when there are
    /// several. An empty sequence yields null.
    pub fn value(&self) -> Value {
        match self.0.as_slice() {
            [] => Value::Null,
            [only] => only.clone(),
            many => Value::list(many.iter().cloned()),
        }
    }

    /// Consuming form of [`Documents::value`].
    pub fn into_value(self) -> Value {
        let mut docs = self.0;
        match docs.len() {
            0 => Value::Null,
            1 => docs.swap_remove(0),
            _ => Value::from(docs),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl IntoIterator for Documents {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Documents {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn numbers_compare_across_widths() {
        assert_eq!(Number::Int(1), Number::Long(1));
        assert_eq!(Number::Int(1), Number::Float(1.0));
        assert_ne!(Number::Int(1), Number::Float(1.5));
        assert_eq!(Number::Float(f64::NAN), Number::Float(f64::NAN));
        assert_eq!(Number::Float(0.0), Number::Float(-0.0));
    }

    #[test]
    fn equal_numbers_hash_alike() {
        let mut set = HashSet::new();
        set.insert(Value::from(3));
        assert!(set.contains(&Value::from(3i64)));
        assert!(set.contains(&Value::from(3.0)));
        assert!(!set.contains(&Value::from("3")));
    }

    #[test]
    fn map_keeps_insertion_order_and_position() {
        let mut map = Map::new();
        map.insert("b".into(), 1.into());
        map.insert("a".into(), 2.into());
        map.insert("b".into(), 3.into());
        let keys: Vec<_> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(map.get_str("b"), Some(&Value::from(3)));
    }

    #[test]
    fn map_equality_ignores_order() {
        let a = Value::map([("x", 1), ("y", 2)]);
        let b = Value::map([("y", 2), ("x", 1)]);
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn non_string_keys() {
        let map = Value::map([(Value::list([1, 2]), Value::from("pair"))]);
        assert_eq!(
            map.as_map().and_then(|m| m.get(&Value::list([1, 2]))),
            Some(&Value::from("pair"))
        );
    }

    #[test]
    fn documents_value() {
        assert_eq!(Documents::default().value(), Value::Null);
        assert_eq!(Documents::new(vec![1.into()]).into_value(), Value::from(1));
        let docs = Documents::new(vec![1.into(), "two".into()]);
        assert_eq!(docs.first(), Some(&Value::from(1)));
        assert_eq!(docs.value(), Value::list([Value::from(1), Value::from("two")]));
    }

    #[test]
    fn display_and_accessors() {
        let v = Value::map([("a", Value::list([1, 2])), ("b", Value::from(true))]);
        assert_eq!(v.to_string(), r#"{"a":[1,2],"b":true}"#);
        assert_eq!(v.get("b").and_then(Value::as_bool), Some(true));
        assert_eq!(Value::from(2.0).as_i64(), Some(2));
        assert_eq!(Value::from(2.5).as_i64(), None);
        assert_eq!(Value::from(f64::INFINITY).to_string(), ".inf");
    }
}
