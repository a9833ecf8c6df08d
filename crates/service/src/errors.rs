use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    /// Upstream failure whose HTTP status is worth passing on to the caller.
    #[error("upstream responded with {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Upstream(format!("{context}: {err}"))
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Upstream(format!("request to data service timed out: {err}"))
        } else {
            Self::Upstream(err.to_string())
        }
    }
}
