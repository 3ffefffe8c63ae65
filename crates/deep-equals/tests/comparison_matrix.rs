//! Comparison builder, injectable defaults and equality properties.

use deep_equals::{
    comparison, deep_equals, ClassOverride, Compare, Comparison, Configuration, Defaults, Object,
    Params, TypeKey, TypeOverrides, Value, Verdict,
};
use proptest::prelude::*;
use serde_json::json;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn within(l: &Value, r: &Value, o: &serde_json::Value) -> bool {
    let tolerance = o["tolerance"].as_f64().unwrap_or(0.0);
    match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) => (a - b).abs() <= tolerance,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[test]
fn create_comparison_with_options() {
    let cmp = comparison().options(json!({"tolerance": 1.5}));
    assert_eq!(cmp.config().options.as_ref().unwrap()["tolerance"], json!(1.5));
}

#[test]
fn options_merge_last_wins() {
    let cmp = comparison()
        .options(json!({"tolerance": 1e-6, "label": "x"}))
        .options(json!({"tolerance": 1e-3}));
    let options = cmp.config().options.as_ref().unwrap();
    assert_eq!(options["tolerance"], json!(1e-3));
    assert_eq!(options["label"], json!("x"));
}

#[test]
fn type_override_uses_accumulated_options() {
    let cmp = comparison()
        .type_override(TypeKey::Number, within)
        .options(json!({"tolerance": 0.5}));
    assert!(cmp.compare(&v(json!([1.0, 2.0])), &v(json!([1.4, 2.4]))));
    assert!(!cmp.compare(&v(json!([1.0])), &v(json!([1.6]))));
}

#[test]
fn compare_with_extra_options() {
    let cmp = comparison()
        .types(TypeOverrides::new().with(TypeKey::Number, Compare::new(within)))
        .options(json!({"tolerance": 0.1}));
    let (lhs, rhs) = (v(json!({"x": 1.0})), v(json!({"x": 1.3})));
    assert!(!cmp.compare(&lhs, &rhs));
    assert!(cmp.compare_with(&lhs, &rhs, &json!({"tolerance": 0.5})));
    // Extra options do not stick to the builder.
    assert!(!cmp.compare(&lhs, &rhs));
}

#[test]
fn builtin_nan_rule_still_applies() {
    let cmp = comparison().options(json!({}));
    assert!(cmp.compare(&f64::NAN.into(), &f64::NAN.into()));
}

#[test]
fn class_override_through_builder() {
    let cmp = comparison().class("Animal", |l, r, _| {
        let legs = |v: &Value| v.as_object().and_then(|o| o.get("legs")).and_then(|l| l.as_number());
        legs(l) == legs(r)
    });
    let cat = Value::from(Object::instance("Animal").with("legs", 4).with("tail", true));
    let manx = Value::from(Object::instance("Animal").with("legs", 4).with("tail", false));
    let bird = Value::from(Object::instance("Animal").with("legs", 2).with("tail", true));
    assert!(cmp.compare(&cat, &manx));
    assert!(!cmp.compare(&cat, &bird));
    assert!(!deep_equals(&cat, &manx));
}

#[test]
fn class_overrides_accumulate_in_order() {
    let cmp = comparison()
        .class_override(ClassOverride::new(|l, _, _| match l {
            Value::Object(o) if o.is_instance_of("Frozen") => Verdict::NotEqual,
            _ => Verdict::Skip,
        }))
        .class("Frozen", |_, _, _| true);
    let frozen = Value::from(Object::instance("Frozen"));
    assert!(!cmp.compare(&frozen, &frozen));
    assert_eq!(cmp.config().classes.as_ref().map(Vec::len), Some(2));
}

#[test]
fn parameters_merge_and_bound_depth() {
    let cmp = comparison()
        .parameters(Params::new().with_depth(1))
        .parameters(Params::new().with_undefined(true));
    assert_eq!(
        cmp.config().params,
        Some(Params::new().with_depth(1).with_undefined(true))
    );
    assert!(!cmp.compare(&v(json!({"x": {}})), &v(json!({"x": {}}))));
    assert!(cmp.compare(&v(json!({"x": 1})), &v(json!({"x": 1}))));
}

#[test]
fn from_config_keeps_configuration() {
    let skip = ClassOverride::new(|_, _, _: &serde_json::Value| Verdict::Skip);
    let config = Configuration::new()
        .with_options(json!({"tolerance": 2.0}))
        .with_type(TypeKey::Number, Compare::new(within))
        .with_class(skip.clone())
        .with_params(Params::new().with_undefined(true));
    let cmp = Comparison::from_config(config);
    assert!(cmp.compare(&1.into(), &2.5.into()));
    let config = cmp.into_config();
    assert!(config.types.unwrap().contains(TypeKey::Number));
    assert_eq!(config.classes, Some(vec![skip]));
    assert_eq!(config.params, Some(Params::new().with_undefined(true)));
    assert_eq!(config.options, Some(json!({"tolerance": 2.0})));
}

#[test]
fn typed_options_context() {
    #[derive(Debug, Clone, Default, PartialEq)]
    struct CaseFold {
        enabled: bool,
    }
    impl deep_equals::Merge for CaseFold {
        fn merge(&self, overlay: &Self, _deep: bool) -> Self {
            overlay.clone()
        }
    }

    let cmp = Comparison::<CaseFold>::new()
        .type_override(TypeKey::String, |l, r, o: &CaseFold| match (l.as_str(), r.as_str()) {
            (Some(a), Some(b)) if o.enabled => a.eq_ignore_ascii_case(b),
            (Some(a), Some(b)) => a == b,
            _ => false,
        });
    let (lhs, rhs) = (v(json!(["AbCdEf"])), v(json!(["aBcDeF"])));
    assert!(!cmp.compare(&lhs, &rhs));
    assert!(cmp.compare_with(&lhs, &rhs, &CaseFold { enabled: true }));
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn defaults_start_from_builtins() {
    let defaults = Defaults::<serde_json::Value>::new();
    assert!(defaults.deep_equals(&f64::NAN.into(), &f64::NAN.into(), &Configuration::new()));
    assert_eq!(defaults.configuration(), defaults.base());
}

#[test]
fn initialise_layers_and_resets() {
    let mut defaults = Defaults::<serde_json::Value>::new();
    let lhs = v(json!({"a": 1, "b": null}));
    let rhs = v(json!({"a": 1.05, "b": null}));
    assert!(!defaults.deep_equals(&lhs, &rhs, &Configuration::new()));

    defaults.initialise(Some(
        Configuration::new()
            .with_options(json!({"tolerance": 0.1}))
            .with_type(TypeKey::Number, Compare::new(within)),
    ));
    assert!(defaults.deep_equals(&lhs, &rhs, &Configuration::new()));
    // Per-call configuration still layers over the defaults.
    assert!(!defaults.deep_equals(
        &lhs,
        &rhs,
        &Configuration::new().with_options(json!({"tolerance": 0.01}))
    ));

    defaults.initialise(None);
    assert!(!defaults.deep_equals(&lhs, &rhs, &Configuration::new()));
    assert_eq!(defaults.configuration(), defaults.base());
}

#[test]
fn initialise_params_change_equals() {
    let mut defaults = Defaults::<serde_json::Value>::new();
    let (lhs, rhs) = (v(json!({})), v(json!({})));
    assert!(defaults.equals(&lhs, &rhs, &Configuration::new()));
    defaults.initialise(Some(Configuration::new().with_params(Params::new().with_strict(true))));
    assert!(!defaults.equals(&lhs, &rhs, &Configuration::new()));
    assert!(defaults.deep_equals(&lhs, &rhs, &Configuration::new()));
}

#[test]
fn custom_base_survives_reset() {
    let base = Configuration::<serde_json::Value>::builtin().with_params(Params::new().with_undefined(true));
    let mut defaults = Defaults::with_base(base);
    defaults.initialise(Some(Configuration::new().with_params(Params::new().with_undefined(false))));
    defaults.initialise(None);
    let lhs = Value::object([("a", Value::Undefined)]);
    assert!(!defaults.deep_equals(&lhs, &v(json!({})), &Configuration::new()));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        (-50i64..50).prop_map(serde_json::Value::from),
        (-1.0e6f64..1.0e6).prop_map(serde_json::Value::from),
        "[a-c]{0,3}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn reflexive_on_copies(json in arb_json()) {
        let (lhs, rhs) = (Value::from(json.clone()), Value::from(json));
        prop_assert!(deep_equals(&lhs, &lhs));
        prop_assert!(deep_equals(&lhs, &rhs));
    }

    #[test]
    fn symmetric_under_defaults(a in arb_json(), b in arb_json()) {
        let (a, b) = (Value::from(a), Value::from(b));
        prop_assert_eq!(deep_equals(&a, &b), deep_equals(&b, &a));
    }
}
