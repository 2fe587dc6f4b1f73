use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Untyped failure kind raised by the license registration lookup.
    /// Same underlying condition as `NotFound` but historically a
    /// separate kind; kept distinguishable (see DESIGN.md).
    #[error("{0}")]
    Other(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}
