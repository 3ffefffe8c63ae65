//! Comparison configuration: options context, type overrides, class
//! overrides and tunable parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::value::{TypeTag, Value};

/// Depth budget of an unbounded comparison.
pub const MAX_DEPTH: usize = usize::MAX;

type CompareFn<O> = dyn Fn(&Value, &Value, &O) -> bool + Send + Sync;
type ClassFn<O> = dyn Fn(&Value, &Value, &O) -> Verdict + Send + Sync;

/// Override comparator: `(left, right, options) -> equal`.
///
/// Callables are opaque to merging; a later override replaces an earlier one
/// as a whole.
pub struct Compare<O>(Arc<CompareFn<O>>);

impl<O> Compare<O> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value, &O) -> bool + Send + Sync + 'static,
    {
        Compare(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, lhs: &Value, rhs: &Value, options: &O) -> bool {
        (self.0)(lhs, rhs, options)
    }

    pub fn ptr_eq(&self, other: &Compare<O>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<O> Clone for Compare<O> {
    fn clone(&self) -> Self {
        Compare(Arc::clone(&self.0))
    }
}

impl<O> PartialEq for Compare<O> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<O> fmt::Debug for Compare<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compare({:p})", Arc::as_ptr(&self.0))
    }
}

/// Outcome of a class override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Equal,
    NotEqual,
    /// The override does not apply; defer to the next rule.
    Skip,
}

impl Verdict {
    pub fn decided(self) -> Option<bool> {
        match self {
            Verdict::Equal => Some(true),
            Verdict::NotEqual => Some(false),
            Verdict::Skip => None,
        }
    }
}

impl From<bool> for Verdict {
    fn from(equal: bool) -> Self {
        if equal {
            Verdict::Equal
        } else {
            Verdict::NotEqual
        }
    }
}

/// Tri-state override consulted for structured values before any generic
/// type dispatch.
pub struct ClassOverride<O>(Arc<ClassFn<O>>);

impl<O> ClassOverride<O> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value, &O) -> Verdict + Send + Sync + 'static,
    {
        ClassOverride(Arc::new(f))
    }

    /// Applies `compare` when the left value is an instance of `class`,
    /// skipping otherwise.
    pub fn for_class(class: impl Into<String>, compare: Compare<O>) -> Self
    where
        O: 'static,
    {
        let class = class.into();
        ClassOverride::new(move |lhs, rhs, options| match lhs {
            Value::Object(obj) if obj.is_instance_of(&class) => {
                Verdict::from(compare.call(lhs, rhs, options))
            }
            _ => Verdict::Skip,
        })
    }

    #[inline]
    pub fn check(&self, lhs: &Value, rhs: &Value, options: &O) -> Verdict {
        (self.0)(lhs, rhs, options)
    }

    pub fn ptr_eq(&self, other: &ClassOverride<O>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<O> Clone for ClassOverride<O> {
    fn clone(&self) -> Self {
        ClassOverride(Arc::clone(&self.0))
    }
}

impl<O> PartialEq for ClassOverride<O> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<O> fmt::Debug for ClassOverride<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassOverride({:p})", Arc::as_ptr(&self.0))
    }
}

/// Key of a type override: a value's type tag, or `any` for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Any,
}

impl TypeKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKey::Any => "any",
            TypeKey::Undefined => TypeTag::Undefined.as_str(),
            TypeKey::Null => TypeTag::Null.as_str(),
            TypeKey::Boolean => TypeTag::Boolean.as_str(),
            TypeKey::Number => TypeTag::Number.as_str(),
            TypeKey::String => TypeTag::String.as_str(),
            TypeKey::Array => TypeTag::Array.as_str(),
            TypeKey::Object => TypeTag::Object.as_str(),
        }
    }
}

impl From<TypeTag> for TypeKey {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Undefined => TypeKey::Undefined,
            TypeTag::Null => TypeKey::Null,
            TypeTag::Boolean => TypeKey::Boolean,
            TypeTag::Number => TypeKey::Number,
            TypeTag::String => TypeKey::String,
            TypeTag::Array => TypeKey::Array,
            TypeTag::Object => TypeKey::Object,
        }
    }
}

impl FromStr for TypeKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undefined" => Ok(TypeKey::Undefined),
            "null" => Ok(TypeKey::Null),
            "boolean" => Ok(TypeKey::Boolean),
            "number" => Ok(TypeKey::Number),
            "string" => Ok(TypeKey::String),
            "array" => Ok(TypeKey::Array),
            "object" => Ok(TypeKey::Object),
            "any" => Ok(TypeKey::Any),
            other => Err(ConfigError::UnknownTypeKey(other.to_string())),
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-keyed override comparators.
pub struct TypeOverrides<O>(BTreeMap<TypeKey, Compare<O>>);

impl<O> TypeOverrides<O> {
    pub fn new() -> Self {
        TypeOverrides(BTreeMap::new())
    }

    pub fn with(mut self, key: TypeKey, compare: Compare<O>) -> Self {
        self.insert(key, compare);
        self
    }

    pub fn insert(&mut self, key: TypeKey, compare: Compare<O>) -> Option<Compare<O>> {
        self.0.insert(key, compare)
    }

    pub fn get(&self, key: TypeKey) -> Option<&Compare<O>> {
        self.0.get(&key)
    }

    pub fn any(&self) -> Option<&Compare<O>> {
        self.get(TypeKey::Any)
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&TypeKey, &Compare<O>)> {
        self.0.iter()
    }
}

impl<O> Default for TypeOverrides<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for TypeOverrides<O> {
    fn clone(&self) -> Self {
        TypeOverrides(self.0.clone())
    }
}

impl<O> PartialEq for TypeOverrides<O> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<O> fmt::Debug for TypeOverrides<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Tunable parameters. Unset fields resolve to: depth of the entry point,
/// not strict, undefined-valued keys excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Maximum number of nested levels compared structurally. `0` counts as
    /// unset, like `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Compare structures by identity once the depth budget is spent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// Count keys holding `undefined` when comparing key sets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undefined: Option<bool>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    pub fn with_undefined(mut self, undefined: bool) -> Self {
        self.undefined = Some(undefined);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict.unwrap_or(false)
    }

    pub fn includes_undefined(&self) -> bool {
        self.undefined.unwrap_or(false)
    }
}

/// Configuration of a comparison.
///
/// Every facet is optional; an absent facet is left alone by merging and
/// resolves to its empty form during comparison.
pub struct Configuration<O = serde_json::Value> {
    /// Context handed to every override callback.
    pub options: Option<O>,
    pub types: Option<TypeOverrides<O>>,
    /// Ordered class overrides; the first decided verdict wins.
    pub classes: Option<Vec<ClassOverride<O>>>,
    pub params: Option<Params>,
}

impl<O> Configuration<O> {
    pub fn new() -> Self {
        Configuration {
            options: None,
            types: None,
            classes: None,
            params: None,
        }
    }

    /// Built-in defaults: the NaN-aware number comparator.
    pub fn builtin() -> Self {
        Configuration::new().with_type(TypeKey::Number, number_comparator())
    }

    pub fn with_options(mut self, options: O) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_types(mut self, types: TypeOverrides<O>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_type(mut self, key: TypeKey, compare: Compare<O>) -> Self {
        self.types.get_or_insert_with(TypeOverrides::new).insert(key, compare);
        self
    }

    pub fn with_class(mut self, class: ClassOverride<O>) -> Self {
        self.classes.get_or_insert_with(Vec::new).push(class);
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn params_or_default(&self) -> Params {
        self.params.unwrap_or_default()
    }

    /// Whether a type override applies to `tag`, directly or through `any`.
    pub fn overrides(&self, tag: TypeTag) -> bool {
        self.types
            .as_ref()
            .is_some_and(|t| t.contains(tag.into()) || t.contains(TypeKey::Any))
    }
}

impl<O: DeserializeOwned> Configuration<O> {
    /// Loads the serializable facets (`options`, `params`) from JSON.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConfigError> {
        let map = json.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut config = Configuration::new();
        for (facet, value) in map {
            match facet.as_str() {
                "options" => {
                    let options = O::deserialize(value).map_err(ConfigError::InvalidOptions)?;
                    config.options = Some(options);
                }
                "params" => {
                    let params = Params::deserialize(value).map_err(ConfigError::InvalidParams)?;
                    config.params = Some(params);
                }
                "types" | "classes" => return Err(ConfigError::NotLoadable(facet.clone())),
                other => return Err(ConfigError::UnknownFacet(other.to_string())),
            }
        }
        Ok(config)
    }
}

impl<O> Default for Configuration<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Clone> Clone for Configuration<O> {
    fn clone(&self) -> Self {
        Configuration {
            options: self.options.clone(),
            types: self.types.clone(),
            classes: self.classes.clone(),
            params: self.params,
        }
    }
}

impl<O: PartialEq> PartialEq for Configuration<O> {
    fn eq(&self, other: &Self) -> bool {
        self.options == other.options
            && self.types == other.types
            && self.classes == other.classes
            && self.params == other.params
    }
}

impl<O: fmt::Debug> fmt::Debug for Configuration<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("options", &self.options)
            .field("types", &self.types)
            .field("classes", &self.classes)
            .field("params", &self.params)
            .finish()
    }
}

/// Strict identity: same type tag and `===`.
pub fn primitive_comparator<O>() -> Compare<O> {
    Compare::new(|lhs, rhs, _| lhs.strict_equals(rhs))
}

/// Number comparator where `NaN` equals `NaN` and nothing else.
pub fn number_comparator<O>() -> Compare<O> {
    Compare::new(|lhs, rhs, _| match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) if a.is_nan() => b.is_nan(),
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_key_round_trips_names() {
        for key in [TypeKey::Number, TypeKey::String, TypeKey::Object, TypeKey::Any] {
            assert_eq!(key.as_str().parse::<TypeKey>().unwrap(), key);
        }
        assert!(matches!(
            "Animal".parse::<TypeKey>(),
            Err(ConfigError::UnknownTypeKey(name)) if name == "Animal"
        ));
    }

    #[test]
    fn number_comparator_pairs_nan() {
        let cmp = number_comparator::<()>();
        assert!(cmp.call(&f64::NAN.into(), &f64::NAN.into(), &()));
        assert!(!cmp.call(&f64::NAN.into(), &1.into(), &()));
        assert!(!cmp.call(&1.into(), &f64::NAN.into(), &()));
        assert!(!cmp.call(&1.into(), &"1".into(), &()));
        assert!(cmp.call(&0.0.into(), &(-0.0).into(), &()));
    }

    #[test]
    fn class_override_skips_other_classes() {
        let always = ClassOverride::for_class("Animal", Compare::new(|_, _, _: &()| true));
        let dog = Value::from(crate::value::Object::with_lineage(["Dog", "Animal"]));
        let car = Value::from(crate::value::Object::instance("Car"));
        assert_eq!(always.check(&dog, &car, &()), Verdict::Equal);
        assert_eq!(always.check(&car, &dog, &()), Verdict::Skip);
        assert_eq!(always.check(&Value::array([1]), &dog, &()), Verdict::Skip);
    }

    #[test]
    fn loads_serializable_facets() {
        let config = Configuration::<serde_json::Value>::from_json(&json!({
            "options": {"tolerance": 0.5},
            "params": {"depth": 3, "strict": true}
        }))
        .unwrap();
        assert_eq!(config.options, Some(json!({"tolerance": 0.5})));
        assert_eq!(config.params, Some(Params::new().with_depth(3).with_strict(true)));
        assert!(config.types.is_none());
    }

    #[test]
    fn rejects_unloadable_facets() {
        let err = Configuration::<serde_json::Value>::from_json(&json!({"types": {}})).unwrap_err();
        assert!(matches!(err, ConfigError::NotLoadable(ref f) if f == "types"));

        let err = Configuration::<serde_json::Value>::from_json(&json!({"colour": 1})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFacet(ref f) if f == "colour"));

        let err = Configuration::<serde_json::Value>::from_json(&json!([])).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject));

        let err = Configuration::<serde_json::Value>::from_json(&json!({"params": {"depth": -1}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParams(_)));

        let err = Configuration::<serde_json::Value>::from_json(&json!({"params": {"deep": true}}))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParams(_)));
    }
}
