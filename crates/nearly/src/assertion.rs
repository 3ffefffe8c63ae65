//! Assertion chain with tolerance-aware `equal` and `eql`.

use deep_equals::{
    compare, merge_options, Compare, Configuration, Defaults, TypeKey, Value, MAX_DEPTH,
};
use tracing::debug;

use crate::error::AssertionError;
use crate::{default_configuration, NearlyOptions};

/// Adapter state: the defaults every `nearly` chain starts from.
///
/// ```
/// use deep_equals_nearly::Nearly;
/// use deep_equals::Value;
///
/// let nearly = Nearly::new();
/// assert!(nearly.expect(&Value::from(4.0)).nearly().equal(&Value::from(4.0 + 1e-9)).is_ok());
/// assert!(nearly.expect(&Value::from(4.0)).equal(&Value::from(4.0 + 1e-9)).is_err());
/// ```
#[derive(Clone)]
pub struct Nearly {
    defaults: Defaults<NearlyOptions>,
}

impl Nearly {
    pub fn new() -> Self {
        Nearly {
            defaults: Defaults::with_base(default_configuration()),
        }
    }

    /// Layers `config` over [`default_configuration`], or restores it when
    /// `None`.
    pub fn initialise(&mut self, config: Option<Configuration<NearlyOptions>>) {
        self.defaults.initialise(config);
    }

    pub fn defaults(&self) -> &Defaults<NearlyOptions> {
        &self.defaults
    }

    pub fn expect<'a>(&'a self, actual: &'a Value) -> Assertion<'a> {
        Assertion {
            actual,
            defaults: &self.defaults,
            config: None,
            negate: false,
            deep: false,
        }
    }
}

impl Default for Nearly {
    fn default() -> Self {
        Self::new()
    }
}

/// One pending assertion on `actual`.
///
/// Without a `nearly*` step the terminals use plain equality: strict
/// identity for [`Assertion::equal`], default structural equality for
/// [`Assertion::eql`].
pub struct Assertion<'a> {
    actual: &'a Value,
    defaults: &'a Defaults<NearlyOptions>,
    config: Option<Configuration<NearlyOptions>>,
    negate: bool,
    deep: bool,
}

#[derive(Clone, Copy)]
enum Check {
    Equal,
    DeepEqual,
}

impl<'a> Assertion<'a> {
    pub fn not(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Makes [`Assertion::equal`] behave as [`Assertion::eql`].
    pub fn deep(mut self) -> Self {
        self.deep = true;
        self
    }

    /// Uses the current defaults as they are.
    pub fn nearly(mut self) -> Self {
        self.config = Some(self.defaults.configuration().clone());
        self
    }

    /// Replaces the tolerance.
    pub fn nearly_within(self, tolerance: f64) -> Self {
        self.nearly_with(Configuration::new().with_options(NearlyOptions::within(tolerance)))
    }

    /// Installs `f` as the `any` comparator, replacing the type overrides.
    pub fn nearly_by<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &Value, &NearlyOptions) -> bool + Send + Sync + 'static,
    {
        self.nearly_with(Configuration::new().with_type(TypeKey::Any, Compare::new(f)))
    }

    /// Shallow-merges `config` over the current defaults: every facet it
    /// sets replaces the default facet whole.
    pub fn nearly_with(mut self, config: Configuration<NearlyOptions>) -> Self {
        self.config = Some(merge_options(self.defaults.configuration(), &config, false));
        self
    }

    pub fn equal(self, expected: &Value) -> Result<(), AssertionError> {
        if self.deep {
            return self.eql(expected);
        }
        let tag = self.actual.type_tag();
        match self.config.as_ref() {
            Some(config) if config.overrides(tag) => {
                let outcome = compare(self.actual, expected, config, 1);
                self.check(outcome, Check::Equal, true, expected)
            }
            _ => {
                debug!(%tag, "no override for value, using strict equality");
                let outcome = self.actual.strict_equals(expected);
                self.check(outcome, Check::Equal, false, expected)
            }
        }
    }

    pub fn eql(self, expected: &Value) -> Result<(), AssertionError> {
        let tag = self.actual.type_tag();
        match self.config.as_ref() {
            Some(config) if config.overrides(tag) || tag.is_structured() => {
                let outcome = compare(self.actual, expected, config, MAX_DEPTH);
                self.check(outcome, Check::DeepEqual, true, expected)
            }
            _ => {
                debug!(%tag, "no override for value, using default deep equality");
                let outcome = deep_equals::deep_equals(self.actual, expected);
                self.check(outcome, Check::DeepEqual, false, expected)
            }
        }
    }

    fn check(
        &self,
        outcome: bool,
        check: Check,
        nearly: bool,
        expected: &Value,
    ) -> Result<(), AssertionError> {
        if outcome != self.negate {
            return Ok(());
        }
        let actual = self.actual.to_string();
        let expected = expected.to_string();
        Err(match (check, nearly, self.negate) {
            (Check::Equal, true, false) => AssertionError::NotNearlyEqual { actual, expected },
            (Check::Equal, true, true) => AssertionError::NearlyEqual { actual, expected },
            (Check::DeepEqual, true, false) => {
                AssertionError::NotNearlyDeepEqual { actual, expected }
            }
            (Check::DeepEqual, true, true) => AssertionError::NearlyDeepEqual { actual, expected },
            (Check::Equal, false, false) => AssertionError::NotEqual { actual, expected },
            (Check::Equal, false, true) => AssertionError::Equal { actual, expected },
            (Check::DeepEqual, false, false) => AssertionError::NotDeepEqual { actual, expected },
            (Check::DeepEqual, false, true) => AssertionError::DeepEqual { actual, expected },
        })
    }
}
