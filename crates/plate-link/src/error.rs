use manos_plate_core::ApplyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse link config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("decorator id must not be empty")]
    EmptyDecoratorId,
    #[error("decorator id `{0}` must start with a lowercase letter")]
    InvalidDecoratorId(String),
    #[error("decorator id `{0}` is reserved")]
    ReservedDecoratorId(String),
    #[error("duplicate decorator id `{0}`")]
    DuplicateDecorator(String),
    #[error("invalid url pattern for decorator `{id}`")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Apply(#[from] ApplyError),
}
