use thiserror::Error;

use crate::ops::Path;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PathError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("range {range:?} out of bounds for block {path:?} of length {len}")]
    RangeOutOfBounds {
        path: Path,
        range: std::ops::Range<usize>,
        len: usize,
    },
    #[error("normalization did not converge")]
    NormalizeDidNotConverge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate node spec kind: {0}")]
    DuplicateNodeKind(String),
    #[error("duplicate attribute key: {0}")]
    DuplicateAttribute(String),
}
