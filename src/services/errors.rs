use thiserror::Error;

/// Failure talking to a collaborator service.
///
/// Collaborator-reported failures (`error` fields, `success: false`) are not
/// errors at this level; they arrive as ordinary responses.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("{operation}: could not reach service: {message}")]
    Transport { operation: &'static str, message: String },

    #[error("{operation}: service responded with HTTP {status}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation}: unreadable response: {message}")]
    Decode { operation: &'static str, message: String },
}

impl ServiceError {
    pub(crate) fn from_reqwest(operation: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode {
                operation,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ServiceError::Status {
                operation,
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            ServiceError::Transport {
                operation,
                message: err.to_string(),
            }
        }
    }
}
