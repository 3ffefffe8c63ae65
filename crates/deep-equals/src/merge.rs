//! Configuration merging with last-write-wins leaves.
//!
//! Keyed structures merge key by key; primitives, sequences, nulls and
//! callables in the overlay replace whatever the base holds. With
//! `deep == false` nested keyed structures are replaced instead of merged.
//! Inputs are never mutated.

use serde_json::Value as Json;

use crate::config::{Configuration, Params, TypeOverrides};

/// Layering of one configuration fragment over another.
pub trait Merge: Sized {
    /// Returns `overlay` layered over `self`.
    fn merge(&self, overlay: &Self, deep: bool) -> Self;
}

/// Merges `overlay` into a copy of `base`.
pub fn merge_options<T: Merge>(base: &T, overlay: &T, deep: bool) -> T {
    base.merge(overlay, deep)
}

impl Merge for () {
    fn merge(&self, _overlay: &Self, _deep: bool) -> Self {}
}

impl<T: Merge + Clone> Merge for Option<T> {
    fn merge(&self, overlay: &Self, deep: bool) -> Self {
        match (self, overlay) {
            (Some(base), Some(over)) if deep => Some(base.merge(over, deep)),
            (base, None) => base.clone(),
            (_, over) => over.clone(),
        }
    }
}

/// Sequences are atomic.
impl<T: Clone> Merge for Vec<T> {
    fn merge(&self, overlay: &Self, _deep: bool) -> Self {
        overlay.clone()
    }
}

impl Merge for Params {
    fn merge(&self, overlay: &Self, _deep: bool) -> Self {
        Params {
            depth: overlay.depth.or(self.depth),
            strict: overlay.strict.or(self.strict),
            undefined: overlay.undefined.or(self.undefined),
        }
    }
}

impl<O> Merge for TypeOverrides<O> {
    fn merge(&self, overlay: &Self, _deep: bool) -> Self {
        let mut merged = self.clone();
        for (key, compare) in overlay.iter() {
            merged.insert(*key, compare.clone());
        }
        merged
    }
}

impl<O: Merge + Clone> Merge for Configuration<O> {
    fn merge(&self, overlay: &Self, deep: bool) -> Self {
        Configuration {
            options: self.options.merge(&overlay.options, deep),
            types: self.types.merge(&overlay.types, deep),
            classes: self.classes.merge(&overlay.classes, deep),
            params: self.params.merge(&overlay.params, deep),
        }
    }
}

/// Free-form options bag. A top-level `null` on either side counts as an
/// empty object; nested `null`s replace like any other leaf.
impl Merge for Json {
    fn merge(&self, overlay: &Self, deep: bool) -> Self {
        if overlay.is_null() {
            return self.clone();
        }
        merge_json(self, overlay, deep)
    }
}

fn merge_json(base: &Json, overlay: &Json, deep: bool) -> Json {
    let (Json::Object(base), Json::Object(over)) = (base, overlay) else {
        return overlay.clone();
    };
    let mut merged = base.clone();
    for (key, value) in over {
        let next = match merged.get(key) {
            Some(existing) if deep => merge_json(existing, value, deep),
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    Json::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn option_rule() {
        let some = Some(Params::new().with_depth(2));
        let other = Some(Params::new().with_strict(true));
        assert_eq!(some.merge(&None, true), some);
        assert_eq!(Option::<Params>::None.merge(&other, true), other);
        assert_eq!(
            some.merge(&other, true),
            Some(Params::new().with_depth(2).with_strict(true))
        );
        assert_eq!(some.merge(&other, false), other);
    }

    #[test]
    fn vectors_are_atomic() {
        assert_eq!(vec![1, 2, 3].merge(&vec![4], true), vec![4]);
    }

    #[test]
    fn json_shallow_replaces_nested_objects() {
        let base = json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = json!({"a": {"b": 5}});
        assert_eq!(base.merge(&over, true), json!({"a": {"b": 5, "c": 2}, "d": 3}));
        assert_eq!(base.merge(&over, false), json!({"a": {"b": 5}, "d": 3}));
    }
}
