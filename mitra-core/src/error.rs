use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session handshake rejected: status={status}")]
    Rejected { status: u16 },
    #[error("session handshake failed: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: status={status} {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("backend does not handle {0} artifacts")]
    Unsupported(&'static str),
    #[error("voice exchange requires an established session")]
    MissingSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: usize, limit: usize },
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("required field is empty: {0}")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("capability not available: {0}")]
    UnsupportedCapability(String),
    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Everything a capture surface can fail with. None of these are fatal to the app.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("busy")]
    Busy,
}

/// Short text for a transient toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

impl FlowError {
    pub fn user_message(&self) -> Notification {
        match self {
            FlowError::Validation(ValidationError::FileTooLarge { .. }) => Notification::new(
                "File too large",
                "Please select an image smaller than 5MB",
            ),
            FlowError::Validation(ValidationError::UnsupportedMediaType(_)) => {
                Notification::new("Unsupported file", "Please select an image file")
            }
            FlowError::Validation(ValidationError::EmptyField("crop")) => {
                Notification::new("Missing Information", "Please enter a crop name")
            }
            FlowError::Validation(ValidationError::EmptyField(_)) => {
                Notification::new("Missing Information", "Please fill in the required field")
            }
            FlowError::Capture(CaptureError::PermissionDenied(_)) => Notification::new(
                "Microphone access denied",
                "Please allow microphone access to use voice features",
            ),
            FlowError::Capture(CaptureError::UnsupportedCapability(_)) => Notification::new(
                "Voice not supported",
                "Speech recognition is not available on this device",
            ),
            FlowError::Capture(CaptureError::Recognition(_)) => {
                Notification::new("Could not hear you", "Please try speaking again")
            }
            FlowError::Session(_) => Notification::new(
                "Connection failed",
                "Could not start a conversation. Please try again",
            ),
            FlowError::Exchange(ExchangeError::MalformedResponse(_)) => Notification::new(
                "Unexpected response",
                "The assistant replied in an unexpected format",
            ),
            FlowError::Exchange(ExchangeError::Unsupported(_) | ExchangeError::MissingSession) => {
                Notification::new("Not available", "This feature is not configured")
            }
            FlowError::Exchange(_) => Notification::new(
                "Analysis Failed",
                "Please check your connection and try again",
            ),
            FlowError::Busy => Notification::new("Please wait", "Still working on your last request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_limit_message_is_user_facing() {
        let e: FlowError = ValidationError::FileTooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        }
        .into();
        let n = e.user_message();
        assert_eq!(n.title, "File too large");
        assert!(n.description.contains("5MB"));
    }

    #[test]
    fn server_and_network_share_retry_message() {
        let a: FlowError = ExchangeError::Network("timeout".into()).into();
        let b: FlowError = ExchangeError::Server {
            status: 500,
            message: String::new(),
        }
        .into();
        assert_eq!(a.user_message(), b.user_message());
    }
}
