//! Parser configuration and explicit tag handlers.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{ParseError, Result};
use crate::value::{Map, Number, Value};

/// What a tag handler returns. Errors that are not [`ParseError`]s are
/// reported as [`ParseError::Conversion`] at the tag's position.
pub type TagResult = std::result::Result<Value, Box<dyn StdError + Send + Sync>>;

/// Handler invoked for an explicit `!!name` tag.
pub type TagHandler = Arc<dyn Fn(&mut dyn TagContext) -> TagResult + Send + Sync>;

/// Creates the list that a sequence is collected into.
pub type ListFactory = fn() -> Vec<Value>;

/// Creates the map that a mapping is collected into.
pub type MapFactory = fn() -> Map;

/// Callback that resolves a variable name.
pub type VariableGetter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// What a tag handler may do with the input that follows its tag.
pub trait TagContext {
    /// Parse the next object. With `follow_colon`, a `:` after a scalar
    /// makes that scalar the first key of a block map.
    fn next_object(&mut self, follow_colon: bool) -> Result<Value>;

    /// Read `len` raw bytes. Only zero-length reads are supported.
    fn next_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Build an error located at the current position.
    fn error(&self, message: &str) -> ParseError;
}

/// Where `${name}` style variables get their values.
#[derive(Clone)]
pub enum VariableSource {
    /// Fixed values; unknown names resolve to `?`.
    Map(HashMap<String, String>),
    /// Computed values.
    Getter(VariableGetter),
}

impl VariableSource {
    fn resolve(&self, name: &str) -> String {
        match self {
            VariableSource::Map(vars) => vars.get(name).cloned().unwrap_or_else(|| "?".into()),
            VariableSource::Getter(get) => get(name),
        }
    }
}

impl fmt::Debug for VariableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableSource::Map(vars) => f.debug_tuple("Map").field(vars).finish(),
            VariableSource::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

pub const DEFAULT_VARIABLE_SYNTAX: &str = "${var}";

pub const DEFAULT_MAX_DEPTH: usize = 512;

static DEFAULT_VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    variable_pattern(DEFAULT_VARIABLE_SYNTAX).expect("default variable syntax is valid")
});

/// Compile a variable syntax such as `${var}` into a pattern matching an
/// optional escaping backslash, the text around `var`, and the name.
fn variable_pattern(syntax: &str) -> std::result::Result<Regex, regex::Error> {
    let (prefix, suffix) = syntax.split_once("var").unwrap_or((syntax, ""));
    Regex::new(&format!(
        r"\\?{}([\w._]+){}",
        regex::escape(prefix),
        regex::escape(suffix)
    ))
}

/// Parser configuration. Cheap to clone; shared by reference with a
/// parse session.
#[derive(Clone)]
pub struct Config {
    list_factory: ListFactory,
    map_factory: MapFactory,
    tag_handlers: HashMap<String, TagHandler>,
    disallow_colons_in_unquoted_keys: bool,
    variable_syntax: String,
    variable_pattern: Regex,
    variables: Option<VariableSource>,
    skip_remarks: bool,
    max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_factory: Vec::new,
            map_factory: Map::new,
            tag_handlers: HashMap::new(),
            disallow_colons_in_unquoted_keys: false,
            variable_syntax: DEFAULT_VARIABLE_SYNTAX.to_string(),
            variable_pattern: DEFAULT_VARIABLE_PATTERN.clone(),
            variables: None,
            skip_remarks: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.tag_handlers.keys().collect();
        tags.sort();
        f.debug_struct("Config")
            .field("tag_handlers", &tags)
            .field(
                "disallow_colons_in_unquoted_keys",
                &self.disallow_colons_in_unquoted_keys,
            )
            .field("variable_syntax", &self.variable_syntax)
            .field("variables", &self.variables)
            .field("skip_remarks", &self.skip_remarks)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_factory(mut self, factory: ListFactory) -> Self {
        self.list_factory = factory;
        self
    }

    pub fn with_map_factory(mut self, factory: MapFactory) -> Self {
        self.map_factory = factory;
        self
    }

    /// Register a handler for `!!name`. It takes precedence over a
    /// built-in handler of the same name.
    pub fn with_tag_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut dyn TagContext) -> TagResult + Send + Sync + 'static,
    {
        self.tag_handlers.insert(name.into(), Arc::new(handler));
        self
    }

    /// When set, a colon always ends an unquoted map key.
    pub fn disallow_colons_in_unquoted_keys(mut self, disallow: bool) -> Self {
        self.disallow_colons_in_unquoted_keys = disallow;
        self
    }

    /// Use another variable syntax. The template must contain the word
    /// `var` where the name goes, like `${var}` or `%var%`.
    pub fn with_variable_syntax(
        mut self,
        syntax: impl Into<String>,
    ) -> std::result::Result<Self, regex::Error> {
        let syntax = syntax.into();
        self.variable_pattern = variable_pattern(&syntax)?;
        self.variable_syntax = syntax;
        Ok(self)
    }

    /// Substitute variables from a fixed table.
    pub fn with_variables<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables = Some(VariableSource::Map(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Substitute variables through a callback.
    pub fn with_variable_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.variables = Some(VariableSource::Getter(Arc::new(getter)));
        self
    }

    /// Keep `/* */` and `#` remarks as tokens instead of skipping them.
    pub fn skip_remarks(mut self, skip: bool) -> Self {
        self.skip_remarks = skip;
        self
    }

    /// Deepest collection nesting accepted before parsing fails.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn new_list(&self) -> Vec<Value> {
        (self.list_factory)()
    }

    pub fn new_map(&self) -> Map {
        (self.map_factory)()
    }

    pub fn disallows_colons_in_unquoted_keys(&self) -> bool {
        self.disallow_colons_in_unquoted_keys
    }

    pub fn variable_syntax(&self) -> &str {
        &self.variable_syntax
    }

    pub fn skips_remarks(&self) -> bool {
        self.skip_remarks
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Replace variables in `text` when a source is configured. An escaped
    /// occurrence keeps its text without the backslash.
    pub fn substitute_variables(&self, text: &str) -> Option<String> {
        let source = self.variables.as_ref()?;
        if !self.variable_pattern.is_match(text) {
            return None;
        }
        let replaced = self
            .variable_pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let whole = &caps[0];
                match whole.strip_prefix('\\') {
                    Some(literal) => literal.to_string(),
                    None => source.resolve(&caps[1]),
                }
            });
        Some(replaced.into_owned())
    }

    /// The handler for `name`: user handlers first, then built-ins.
    pub fn tag_handler(&self, name: &str) -> Option<TagHandler> {
        self.tag_handlers
            .get(name)
            .cloned()
            .or_else(|| builtin_handler(name))
    }
}

fn builtin_handler(name: &str) -> Option<TagHandler> {
    let handler: TagHandler = match name {
        "null" => Arc::new(tag_null),
        "str" => Arc::new(tag_str),
        "seq" => Arc::new(tag_seq),
        "map" => Arc::new(tag_map),
        "int" => Arc::new(tag_int),
        "float" => Arc::new(tag_float),
        _ => return None,
    };
    Some(handler)
}

fn tag_null(ctx: &mut dyn TagContext) -> TagResult {
    ctx.next_object(false)?;
    Ok(Value::Null)
}

fn tag_str(ctx: &mut dyn TagContext) -> TagResult {
    Ok(match ctx.next_object(false)? {
        Value::Null => Value::from(""),
        s @ Value::String(_) => s,
        other => Value::String(other.to_string()),
    })
}

fn tag_seq(ctx: &mut dyn TagContext) -> TagResult {
    Ok(to_list(ctx.next_object(true)?))
}

fn tag_map(ctx: &mut dyn TagContext) -> TagResult {
    Ok(to_map(ctx.next_object(true)?))
}

fn tag_int(ctx: &mut dyn TagContext) -> TagResult {
    Ok(Value::from(to_int(ctx.next_object(false)?)?))
}

fn tag_float(ctx: &mut dyn TagContext) -> TagResult {
    Ok(Value::from(to_float(ctx.next_object(false)?)?))
}

/// Copy `value` into fresh collections all the way down.
fn deep_copy(value: &Value) -> Value {
    match value {
        Value::List(items) => Value::list(items.iter().map(deep_copy)),
        Value::Map(map) => Value::map(map.iter().map(|(k, v)| (deep_copy(k), deep_copy(v)))),
        scalar => scalar.clone(),
    }
}

/// `!!seq`: null is empty, a list is copied, anything else is wrapped.
fn to_list(value: Value) -> Value {
    match value {
        Value::Null => Value::list(Vec::<Value>::new()),
        list @ Value::List(_) => deep_copy(&list),
        other => Value::list([deep_copy(&other)]),
    }
}

/// `!!map`: null is empty, a map is copied, and anything else maps to
/// itself. In a list, each element becomes one entry: a nested list gives
/// its first two items, anything else maps to itself.
fn to_map(value: Value) -> Value {
    match value {
        Value::Null => Value::from(Map::new()),
        map @ Value::Map(_) => deep_copy(&map),
        Value::List(items) => Value::map(items.iter().map(map_entry)),
        scalar => Value::map([(scalar.clone(), scalar)]),
    }
}

fn map_entry(item: &Value) -> (Value, Value) {
    match item {
        Value::List(pair) => (
            pair.first().map(deep_copy).unwrap_or_default(),
            pair.get(1).map(deep_copy).unwrap_or_default(),
        ),
        other => (deep_copy(other), deep_copy(other)),
    }
}

/// `!!int`: truncates floats and wraps 64-bit integers like a cast.
fn to_int(value: Value) -> std::result::Result<i32, Box<dyn StdError + Send + Sync>> {
    match value {
        Value::Null => Ok(0),
        Value::Number(Number::Int(n)) => Ok(n),
        Value::Number(Number::Long(n)) => Ok(n as i32),
        Value::Number(Number::Float(f)) => Ok(f as i32),
        Value::String(s) => Ok(s.trim().parse::<i32>()?),
        other => Err(format!("Unable to convert to int: {}", other).into()),
    }
}

fn to_float(value: Value) -> std::result::Result<f64, Box<dyn StdError + Send + Sync>> {
    match value {
        Value::Null => Ok(0.0),
        Value::Number(Number::Int(n)) => Ok(n as f64),
        Value::Number(Number::Long(n)) => Ok(n as f64),
        Value::Number(Number::Float(f)) => Ok(f),
        Value::String(s) => Ok(s.trim().parse::<f64>()?),
        other => Err(format!("Unable to convert to float: {}", other).into()),
    }
}
