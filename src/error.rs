use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Empty token sequence, or another caller-correctable input problem.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested tag has no entry in the model's probability tables.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("unknown tag: {0:?}")]
    UnknownTag(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Two count tables with different tag/vocabulary dimensions were merged.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn missing_tag<T: std::fmt::Display>(tag: T) -> Self {
        Self::MissingParameter(format!("tag {tag} is not part of the model's tag set"))
    }
}
