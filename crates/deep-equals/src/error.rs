use thiserror::Error;

/// Errors raised while loading or parsing configuration.
///
/// Comparison itself never fails; these only surface from the JSON loaders.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown type key `{0}`")]
    UnknownTypeKey(String),
    #[error("configuration must be a JSON object")]
    NotAnObject,
    #[error("unknown configuration facet `{0}`")]
    UnknownFacet(String),
    #[error("`{0}` holds comparator callbacks and cannot be loaded from JSON")]
    NotLoadable(String),
    #[error("invalid options: {0}")]
    InvalidOptions(#[source] serde_json::Error),
    #[error("invalid params: {0}")]
    InvalidParams(#[source] serde_json::Error),
}
