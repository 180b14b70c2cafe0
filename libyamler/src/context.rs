//! Anchors defined in the current document.

use std::collections::HashMap;

use crate::value::Value;

/// Handle to an anchored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorId(usize);

/// Anchor table for one document.
///
/// Values live in an arena and names map to handles, so redefining a name
/// leaves earlier aliases untouched. Aggregates are shared through their
/// `Arc`, so looking one up does not copy it.
#[derive(Debug, Default)]
pub struct ReferenceContext {
    values: Vec<Value>,
    names: HashMap<String, AnchorId>,
}

impl ReferenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`, replacing any earlier binding.
    pub fn store(&mut self, name: &str, value: Value) -> AnchorId {
        let id = AnchorId(self.values.len());
        self.values.push(value);
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name).and_then(|id| self.values.get(id.0))
    }

    /// Forget every anchor. Called at each document boundary.
    pub fn reset(&mut self) {
        self.values.clear();
        self.names.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn store_get_and_redefine() {
        let mut ctx = ReferenceContext::new();
        ctx.store("a", Value::from(1));
        assert_eq!(ctx.get("a"), Some(&Value::from(1)));
        ctx.store("a", Value::from(2));
        assert_eq!(ctx.get("a"), Some(&Value::from(2)));
        assert!(ctx.get("b").is_none());
    }

    #[test]
    fn aggregates_are_shared() {
        let mut ctx = ReferenceContext::new();
        let list = Value::list([1, 2, 3]);
        ctx.store("l", list.clone());
        match (ctx.get("l"), &list) {
            (Some(Value::List(stored)), Value::List(original)) => {
                assert!(Arc::ptr_eq(stored, original))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reset_forgets_everything() {
        let mut ctx = ReferenceContext::new();
        ctx.store("a", Value::Null);
        ctx.reset();
        assert!(ctx.get("a").is_none());
    }
}
