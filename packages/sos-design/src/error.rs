use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DesignError {
    #[error("Invalid design parameter: {0}")]
    InvalidDesignParameter(String),

    #[error("Degenerate section {index}: {reason}")]
    DegenerateSection { index: usize, reason: String },

    #[error("Failed to render table: {0}")]
    RenderFailed(String),
}

impl DesignError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DesignError::InvalidDesignParameter(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DesignError>;
