//! deep-equals-nearly - Tolerance-based assertions over [`deep_equals`].
//!
//! Numbers compare with a relative tolerance; any other type can be given a
//! comparator for the duration of one assertion or installed as a default
//! through [`Nearly::initialise`].
//!
//! ```
//! use deep_equals::Value;
//! use deep_equals_nearly::Nearly;
//! use serde_json::json;
//!
//! let nearly = Nearly::new();
//! let lhs = Value::from(json!({"a": 1.0, "b": [2.0, 3.0]}));
//! let rhs = Value::from(json!({"a": 1.0 + 1e-9, "b": [2.0, 3.0 - 1e-9]}));
//! nearly.expect(&lhs).nearly().deep().equal(&rhs).unwrap();
//! nearly.expect(&lhs).not().eql(&rhs).unwrap();
//! ```

use deep_equals::{Compare, Configuration, Merge, TypeKey, Value};
use serde::{Deserialize, Serialize};

pub mod assertion;
pub mod error;

pub use assertion::{Assertion, Nearly};
pub use error::AssertionError;

/// Default relative tolerance.
pub const TOLERANCE: f64 = 1e-6;

/// `|lhs - rhs| <= |tolerance * min(lhs, rhs)|`.
#[inline]
pub fn nearly_equal(lhs: f64, rhs: f64, tolerance: f64) -> bool {
    (lhs - rhs).abs() <= (tolerance * lhs.min(rhs)).abs()
}

/// Options context handed to comparators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NearlyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl NearlyOptions {
    pub fn within(tolerance: f64) -> Self {
        NearlyOptions {
            tolerance: Some(tolerance),
        }
    }

    /// The configured tolerance, or [`TOLERANCE`].
    pub fn tolerance(&self) -> f64 {
        self.tolerance.unwrap_or(TOLERANCE)
    }
}

impl Merge for NearlyOptions {
    fn merge(&self, overlay: &Self, _deep: bool) -> Self {
        NearlyOptions {
            tolerance: overlay.tolerance.or(self.tolerance),
        }
    }
}

/// Number comparator using [`nearly_equal`] with the context tolerance.
pub fn number_comparator() -> Compare<NearlyOptions> {
    Compare::new(|lhs: &Value, rhs: &Value, options: &NearlyOptions| {
        match (lhs.as_number(), rhs.as_number()) {
            (Some(l), Some(r)) => nearly_equal(l, r, options.tolerance()),
            _ => false,
        }
    })
}

/// Base of every [`Nearly`]: [`TOLERANCE`] with the tolerant number
/// comparator.
pub fn default_configuration() -> Configuration<NearlyOptions> {
    Configuration::new()
        .with_options(NearlyOptions::within(TOLERANCE))
        .with_type(TypeKey::Number, number_comparator())
}
