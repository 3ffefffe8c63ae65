//! Injectable default configuration.

use tracing::debug;

use crate::compare::compare;
use crate::config::{Configuration, MAX_DEPTH};
use crate::merge::Merge;
use crate::value::Value;

/// Default configuration shared by a group of comparisons, such as every
/// assertion in a test suite.
///
/// Holds a fixed base and the current defaults derived from it.
/// [`Defaults::initialise`] is the only way to change the current defaults.
pub struct Defaults<O = serde_json::Value> {
    base: Configuration<O>,
    current: Configuration<O>,
}

impl<O: Merge + Clone + Default> Defaults<O> {
    /// Defaults built on [`Configuration::builtin`].
    pub fn new() -> Self {
        Self::with_base(Configuration::builtin())
    }

    pub fn with_base(base: Configuration<O>) -> Self {
        Defaults {
            current: base.clone(),
            base,
        }
    }

    pub fn configuration(&self) -> &Configuration<O> {
        &self.current
    }

    pub fn base(&self) -> &Configuration<O> {
        &self.base
    }

    /// Resets the current defaults to the base, layering `config` over it
    /// when given.
    pub fn initialise(&mut self, config: Option<Configuration<O>>) {
        self.current = match config {
            Some(config) => {
                debug!(
                    types = ?config.types.as_ref().map(|t| t.keys().collect::<Vec<_>>()),
                    classes = config.classes.as_ref().map_or(0, Vec::len),
                    params = ?config.params,
                    "reinitialising comparison defaults"
                );
                self.base.merge(&config, true)
            }
            None => {
                debug!("restoring base comparison defaults");
                self.base.clone()
            }
        };
    }

    /// `config` layered over the current defaults.
    pub fn resolve(&self, config: &Configuration<O>) -> Configuration<O> {
        self.current.merge(config, true)
    }

    pub fn deep_equals(&self, lhs: &Value, rhs: &Value, config: &Configuration<O>) -> bool {
        compare(lhs, rhs, &self.resolve(config), MAX_DEPTH)
    }

    pub fn equals(&self, lhs: &Value, rhs: &Value, config: &Configuration<O>) -> bool {
        compare(lhs, rhs, &self.resolve(config), 1)
    }
}

impl<O: Merge + Clone + Default> Default for Defaults<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Clone> Clone for Defaults<O> {
    fn clone(&self) -> Self {
        Defaults {
            base: self.base.clone(),
            current: self.current.clone(),
        }
    }
}
