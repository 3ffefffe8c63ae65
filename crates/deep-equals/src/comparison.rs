//! Fluent comparison builder.

use crate::compare::compare;
use crate::config::{ClassOverride, Compare, Configuration, Params, TypeKey, TypeOverrides, MAX_DEPTH};
use crate::merge::Merge;
use crate::value::Value;

/// Accumulates a [`Configuration`] and runs comparisons with it.
///
/// Each step merges into what is already there, so repeated `options` or
/// `parameters` calls override leaf by leaf. Built-in defaults are layered
/// under the accumulated configuration at compare time.
///
/// ```
/// use deep_equals::{comparison, Value};
/// use serde_json::json;
///
/// let cmp = comparison()
///     .type_override(deep_equals::TypeKey::String, |l, r, _| {
///         l.as_str().map(str::to_lowercase) == r.as_str().map(str::to_lowercase)
///     });
/// assert!(cmp.compare(&Value::from(json!(["AbC"])), &Value::from(json!(["abc"]))));
/// ```
pub struct Comparison<O = serde_json::Value> {
    config: Configuration<O>,
}

impl<O: Merge + Clone + Default + 'static> Comparison<O> {
    pub fn new() -> Self {
        Comparison {
            config: Configuration::new(),
        }
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: Configuration<O>) -> Self {
        Comparison { config }
    }

    pub fn options(mut self, options: O) -> Self {
        self.config.options = self.config.options.merge(&Some(options), true);
        self
    }

    pub fn types(mut self, types: TypeOverrides<O>) -> Self {
        self.config.types = self.config.types.merge(&Some(types), true);
        self
    }

    pub fn type_override<F>(mut self, key: TypeKey, f: F) -> Self
    where
        F: Fn(&Value, &Value, &O) -> bool + Send + Sync + 'static,
    {
        self.config = self.config.with_type(key, Compare::new(f));
        self
    }

    /// Compares instances of `class` with `f`; other values fall through.
    pub fn class<F>(mut self, class: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value, &Value, &O) -> bool + Send + Sync + 'static,
    {
        self.config = self
            .config
            .with_class(ClassOverride::for_class(class, Compare::new(f)));
        self
    }

    pub fn class_override(mut self, class: ClassOverride<O>) -> Self {
        self.config = self.config.with_class(class);
        self
    }

    pub fn parameters(mut self, params: Params) -> Self {
        self.config.params = self.config.params.merge(&Some(params), true);
        self
    }

    pub fn config(&self) -> &Configuration<O> {
        &self.config
    }

    pub fn into_config(self) -> Configuration<O> {
        self.config
    }

    pub fn compare(&self, lhs: &Value, rhs: &Value) -> bool {
        run(lhs, rhs, &self.config)
    }

    /// Like [`Comparison::compare`] with `extra` merged over the options.
    pub fn compare_with(&self, lhs: &Value, rhs: &Value, extra: &O) -> bool {
        let mut config = self.config.clone();
        config.options = config.options.merge(&Some(extra.clone()), true);
        run(lhs, rhs, &config)
    }
}

fn run<O: Merge + Clone + Default>(lhs: &Value, rhs: &Value, config: &Configuration<O>) -> bool {
    compare(lhs, rhs, &crate::process_options(config), MAX_DEPTH)
}

impl<O: Merge + Clone + Default + 'static> Default for Comparison<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Clone> Clone for Comparison<O> {
    fn clone(&self) -> Self {
        Comparison {
            config: self.config.clone(),
        }
    }
}

/// Starts an empty [`Comparison`] over the free-form options bag.
pub fn comparison() -> Comparison {
    Comparison::new()
}
