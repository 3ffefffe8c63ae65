//! deep-equals - Configurable structural equality for dynamic values.
//!
//! Compares two [`Value`]s recursively. Comparison can be tuned with a
//! [`Configuration`]: type overrides keyed by [`TypeKey`], ordered tri-state
//! [`ClassOverride`]s, a caller-defined options context handed to every
//! override, and [`Params`] bounding depth and controlling how `undefined`
//! fields count.
//!
//! The walk is total: a depth budget and a cycle guard make every call
//! terminate, including on self-referential structures.
//!
//! ```
//! use deep_equals::{deep_equals, equals, Value};
//! use serde_json::json;
//!
//! let a = Value::from(json!({"x": {"y": 1}}));
//! let b = Value::from(json!({"x": {"y": 1}}));
//! assert!(deep_equals(&a, &b));
//! assert!(!equals(&a, &b));
//! ```

pub mod compare;
pub mod comparison;
pub mod config;
pub mod defaults;
pub mod error;
pub mod merge;
pub mod value;

pub use compare::compare;
pub use comparison::{comparison, Comparison};
pub use config::{
    number_comparator, primitive_comparator, ClassOverride, Compare, Configuration, Params,
    TypeKey, TypeOverrides, Verdict, MAX_DEPTH,
};
pub use defaults::Defaults;
pub use error::ConfigError;
pub use merge::{merge_options, Merge};
pub use value::{Array, Fields, Object, TypeTag, Value};

/// Layers `config` over the built-in defaults.
pub fn process_options<O: Merge + Clone>(config: &Configuration<O>) -> Configuration<O> {
    Configuration::builtin().merge(config, true)
}

/// Unbounded structural comparison with the built-in defaults.
pub fn deep_equals(lhs: &Value, rhs: &Value) -> bool {
    deep_equals_with(lhs, rhs, &Configuration::<serde_json::Value>::new())
}

/// Unbounded structural comparison with `config` over the built-in defaults.
pub fn deep_equals_with<O>(lhs: &Value, rhs: &Value, config: &Configuration<O>) -> bool
where
    O: Merge + Clone + Default,
{
    compare(lhs, rhs, &process_options(config), MAX_DEPTH)
}

/// One-level comparison: immediate children are compared by identity.
pub fn equals(lhs: &Value, rhs: &Value) -> bool {
    equals_with(lhs, rhs, &Configuration::<serde_json::Value>::new())
}

/// One-level comparison with `config` over the built-in defaults.
pub fn equals_with<O>(lhs: &Value, rhs: &Value, config: &Configuration<O>) -> bool
where
    O: Merge + Clone + Default,
{
    compare(lhs, rhs, &process_options(config), 1)
}
