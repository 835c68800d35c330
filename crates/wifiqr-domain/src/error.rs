use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// Body is not valid JSON, or the top-level JSON value is not an
    /// object. Retrying will never fix this.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Body is the JSON literal `null`.
    #[error("payload deserialized to null")]
    EmptyPayload,

    #[error("notification step '{step}' failed: {source}")]
    NotificationFailed {
        step: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

pub type HandlerResult<T> = Result<T, HandlerError>;
