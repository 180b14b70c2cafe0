//! JSON generation.
//!
//! Renders document values as JSON text. Map keys go through the same
//! renderer as values, so non-string keys come out unquoted. Strings use
//! the same escapes the scalar reader understands, which makes the output
//! readable by [`crate::parse`] again.

use std::any::Any;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write};
use std::hash::BuildHasher;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::GenerateError;
use crate::value::{Documents, Map, Number, Value};

/// Render a float. Infinities and NaN use the YAML spellings.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    let text = format!("{:?}", f);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Render `value` as JSON. A negative `indent` gives compact output;
/// otherwise maps are spread over lines, `indent` spaces per level.
pub fn to_json_string<T: AsDocument + ?Sized>(value: &T, indent: i32) -> String {
    Generator::new(indent).render(value)
}

/// Conversion of Rust values into the document model.
pub trait AsDocument {
    fn as_document(&self) -> Cow<'_, Value>;
}

impl AsDocument for Value {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Borrowed(self)
    }
}

impl AsDocument for Documents {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(self.value())
    }
}

impl<T: AsDocument + ?Sized> AsDocument for &T {
    fn as_document(&self) -> Cow<'_, Value> {
        (**self).as_document()
    }
}

impl<T: AsDocument> AsDocument for Option<T> {
    fn as_document(&self) -> Cow<'_, Value> {
        match self {
            Some(inner) => inner.as_document(),
            None => Cow::Owned(Value::Null),
        }
    }
}

/// A failed result renders as null.
impl<T: AsDocument, E> AsDocument for Result<T, E> {
    fn as_document(&self) -> Cow<'_, Value> {
        match self {
            Ok(inner) => inner.as_document(),
            Err(_) => Cow::Owned(Value::Null),
        }
    }
}

impl AsDocument for str {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::from(self))
    }
}

impl AsDocument for String {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::from(self.as_str()))
    }
}

impl AsDocument for bool {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::Bool(*self))
    }
}

macro_rules! int_document {
    ($($ty:ty),*) => {
        $(
            impl AsDocument for $ty {
                fn as_document(&self) -> Cow<'_, Value> {
                    let number = match i32::try_from(*self) {
                        Ok(n) => Number::Int(n),
                        Err(_) => match i64::try_from(*self) {
                            Ok(n) => Number::Long(n),
                            Err(_) => Number::Float(*self as f64),
                        },
                    };
                    Cow::Owned(Value::Number(number))
                }
            }
        )*
    };
}

int_document!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl AsDocument for f32 {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::Number(Number::Float(f64::from(*self))))
    }
}

impl AsDocument for f64 {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::Number(Number::Float(*self)))
    }
}

impl AsDocument for Number {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::Number(*self))
    }
}

impl<T: AsDocument> AsDocument for [T] {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::from(
            self.iter()
                .map(|item| item.as_document().into_owned())
                .collect::<Vec<_>>(),
        ))
    }
}

impl<T: AsDocument> AsDocument for Vec<T> {
    fn as_document(&self) -> Cow<'_, Value> {
        self.as_slice().as_document()
    }
}

impl AsDocument for Map {
    fn as_document(&self) -> Cow<'_, Value> {
        Cow::Owned(Value::from(self.clone()))
    }
}

fn entries_document<'a, K, V, I>(entries: I) -> Cow<'static, Value>
where
    K: AsDocument + 'a,
    V: AsDocument + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    Cow::Owned(Value::from(
        entries
            .into_iter()
            .map(|(k, v)| (k.as_document().into_owned(), v.as_document().into_owned()))
            .collect::<Map>(),
    ))
}

impl<K: AsDocument, V: AsDocument, S> AsDocument for IndexMap<K, V, S> {
    fn as_document(&self) -> Cow<'_, Value> {
        entries_document(self.iter())
    }
}

impl<K: AsDocument, V: AsDocument, S: BuildHasher> AsDocument for HashMap<K, V, S> {
    fn as_document(&self) -> Cow<'_, Value> {
        entries_document(self.iter())
    }
}

impl<K: AsDocument, V: AsDocument> AsDocument for BTreeMap<K, V> {
    fn as_document(&self) -> Cow<'_, Value> {
        entries_document(self.iter())
    }
}

/// Hook that turns otherwise unknown values into documents.
pub type Converter = Arc<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;

/// JSON renderer with an indent width and an optional conversion hook.
#[derive(Clone)]
pub struct Generator {
    indent: i32,
    converter: Option<Converter>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(-1)
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("indent", &self.indent)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

impl Generator {
    pub fn new(indent: i32) -> Self {
        Self {
            indent,
            converter: None,
        }
    }

    /// Use `convert` for values [`Generator::render_any`] does not know.
    pub fn with_converter<F>(mut self, convert: F) -> Self
    where
        F: Fn(&dyn Any) -> Option<Value> + Send + Sync + 'static,
    {
        self.converter = Some(Arc::new(convert));
        self
    }

    pub fn indent(&self) -> i32 {
        self.indent
    }

    pub fn render<T: AsDocument + ?Sized>(&self, value: &T) -> String {
        let mut writer = JsonWriter {
            out: String::new(),
            width: usize::try_from(self.indent).ok(),
        };
        writer.value(&value.as_document(), 0);
        writer.out
    }

    /// Render a value known only at runtime. Known document types are
    /// rendered directly, anything else goes through the converter.
    pub fn render_any(&self, value: &dyn Any) -> Result<String, GenerateError> {
        macro_rules! known {
            ($($ty:ty),*) => {
                $(
                    if let Some(v) = value.downcast_ref::<$ty>() {
                        return Ok(self.render(v));
                    }
                )*
            };
        }
        known!(
            Value, Documents, Map, Number, String, &'static str, bool, i8, i16, i32, i64, isize,
            u8, u16, u32, u64, usize, f32, f64, Vec<Value>, Option<Value>
        );
        if value.is::<()>() {
            return Ok("null".to_string());
        }
        match self.converter.as_ref().and_then(|convert| convert(value)) {
            Some(converted) => Ok(self.render(&converted)),
            None => Err(GenerateError::Serialization(format!("{:?}", value.type_id()))),
        }
    }
}

struct JsonWriter {
    out: String,
    width: Option<usize>,
}

impl JsonWriter {
    fn value(&mut self, value: &Value, level: usize) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(Number::Int(n)) => self.push_display(n),
            Value::Number(Number::Long(n)) => self.push_display(n),
            Value::Number(Number::Float(f)) => self.out.push_str(&format_float(*f)),
            Value::String(s) => write_string(&mut self.out, s),
            Value::List(items) => self.list(items, level),
            Value::Map(map) => self.map(map, level),
        }
    }

    fn push_display(&mut self, value: impl fmt::Display) {
        let _ = write!(self.out, "{}", value);
    }

    fn list(&mut self, items: &[Value], level: usize) {
        if items.is_empty() {
            self.out.push_str("[]");
            return;
        }
        let space = if self.width.is_some() { " " } else { "" };
        self.out.push('[');
        self.out.push_str(space);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
                self.out.push_str(space);
            }
            self.value(item, level);
        }
        self.out.push_str(space);
        self.out.push(']');
    }

    fn map(&mut self, map: &Map, level: usize) {
        if map.is_empty() {
            self.out.push_str("{}");
            return;
        }
        let Some(width) = self.width else {
            self.out.push('{');
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    self.out.push(',');
                }
                self.value(key, level);
                self.out.push(':');
                self.value(value, level);
            }
            self.out.push('}');
            return;
        };

        let pad = " ".repeat(width * (level + 1));
        self.out.push_str("{\n");
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.out.push_str(",\n");
            }
            self.out.push_str(&pad);
            self.value(key, level + 1);
            self.out.push_str(": ");
            self.value(value, level + 1);
        }
        self.out.push('\n');
        self.out.push_str(&" ".repeat(width * level));
        self.out.push('}');
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        let escaped = match c {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{8}' => "\\b",
            '\u{C}' => "\\f",
            '\0' => "\\0",
            '\u{7}' => "\\a",
            '\u{B}' => "\\v",
            '\u{1B}' => "\\e",
            '\u{85}' => "\\N",
            '\u{A0}' => "\\_",
            '\u{2028}' => "\\L",
            '\u{2029}' => "\\P",
            _ => "",
        };
        if !escaped.is_empty() {
            out.push_str(escaped);
            continue;
        }
        let code = c as u32;
        if code > 0xFFFF {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{:04X}", unit);
            }
        } else if code > 0xFF {
            let _ = write!(out, "\\u{:04X}", code);
        } else if code >= 0x7F {
            let _ = write!(out, "\\x{:02X}", code);
        } else {
            out.push(c);
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        Value::map([("a", 1), ("b", 2)])
    }

    #[test]
    fn compact_and_pretty_maps() {
        assert_eq!(to_json_string(&sample(), -1), r#"{"a":1,"b":2}"#);
        assert_eq!(to_json_string(&sample(), 2), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn nested_pretty_output() {
        let value = Value::map([
            ("list", Value::list([1, 2])),
            ("inner", Value::map([("x", Value::Null)])),
        ]);
        assert_eq!(
            to_json_string(&value, 2),
            "{\n  \"list\": [ 1, 2 ],\n  \"inner\": {\n    \"x\": null\n  }\n}"
        );
        assert_eq!(to_json_string(&value, -1), r#"{"list":[1,2],"inner":{"x":null}}"#);
    }

    #[test]
    fn empty_collections() {
        assert_eq!(to_json_string(&Value::list(Vec::<Value>::new()), 2), "[]");
        assert_eq!(to_json_string(&Value::from(Map::new()), 2), "{}");
    }

    #[test]
    fn non_string_keys() {
        let mut map = Map::new();
        map.insert(Value::from(1), Value::from("one"));
        map.insert(Value::Null, Value::Bool(false));
        assert_eq!(to_json_string(&Value::from(map), -1), r#"{1:"one",null:false}"#);
    }

    #[test]
    fn string_escapes() {
        let text = "q\"b\\n\nr\rt\tb\u{8}f\u{C}z\0a\u{7}v\u{B}e\u{1B}\u{85}\u{A0}\u{2028}\u{2029}";
        assert_eq!(
            to_json_string(text, -1),
            r#""q\"b\\n\nr\rt\tb\bf\fz\0a\av\ve\e\N\_\L\P""#
        );
        assert_eq!(to_json_string("\u{7F}\u{E9}\u{CAFE}", -1), r#""\x7F\xE9\uCAFE""#);
        assert_eq!(to_json_string("\u{1F600}", -1), r#""\uD83D\uDE00""#);
    }

    #[test]
    fn floats() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(1e300), "1e+300");
        assert_eq!(format_float(1e-10), "1e-10");
        assert_eq!(format_float(f64::INFINITY), ".inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-.inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn rust_values() {
        assert_eq!(to_json_string(&Some(3u8), -1), "3");
        assert_eq!(to_json_string(&None::<i32>, -1), "null");
        assert_eq!(to_json_string(&Err::<i32, &str>("bad"), -1), "null");
        assert_eq!(to_json_string(&vec!["a", "b"], -1), r#"["a","b"]"#);
        assert_eq!(to_json_string(&u64::MAX, -1), "1.8446744073709552e+19");

        let mut tree = BTreeMap::new();
        tree.insert("k", vec![true]);
        assert_eq!(to_json_string(&tree, -1), r#"{"k":[true]}"#);
    }

    #[test]
    fn render_any_uses_converter() {
        struct Point(i32, i32);

        let generator = Generator::new(-1);
        assert_eq!(generator.render_any(&sample()).unwrap(), r#"{"a":1,"b":2}"#);
        assert_eq!(generator.render_any(&"text").unwrap(), r#""text""#);
        assert!(matches!(
            generator.render_any(&Point(1, 2)),
            Err(GenerateError::Serialization(_))
        ));

        let generator = generator.with_converter(|any| {
            any.downcast_ref::<Point>()
                .map(|p| Value::list([p.0, p.1]))
        });
        assert_eq!(generator.render_any(&Point(1, 2)).unwrap(), "[1,2]");
    }

    #[test]
    fn rendering_is_repeatable() {
        let generator = Generator::new(4);
        let value = Value::map([("k", Value::list(["x", "y"]))]);
        assert_eq!(generator.render(&value), generator.render(&value));
    }
}
