use thiserror::Error;

/// Failed assertion. Both sides are rendered with [`deep_equals::Value`]'s
/// cycle-safe `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionError {
    #[error("expected {actual} to be nearly equal to {expected}")]
    NotNearlyEqual { actual: String, expected: String },
    #[error("expected {actual} to be not nearly equal to {expected}")]
    NearlyEqual { actual: String, expected: String },
    #[error("expected {actual} to be nearly deeply equal to {expected}")]
    NotNearlyDeepEqual { actual: String, expected: String },
    #[error("expected {actual} to be not nearly deeply equal to {expected}")]
    NearlyDeepEqual { actual: String, expected: String },
    #[error("expected {actual} to equal {expected}")]
    NotEqual { actual: String, expected: String },
    #[error("expected {actual} to not equal {expected}")]
    Equal { actual: String, expected: String },
    #[error("expected {actual} to deeply equal {expected}")]
    NotDeepEqual { actual: String, expected: String },
    #[error("expected {actual} to not deeply equal {expected}")]
    DeepEqual { actual: String, expected: String },
}
