//! The single failure kind surfaced by an inference backend.
//!
//! Whatever goes wrong inside a backend (spawn errors, timeouts, a crashed
//! process, unreadable output) is folded into [`InferenceFailure`] before it
//! reaches the widget controller. The controller never distinguishes causes;
//! it only needs a human-readable message to display.

/// Message shown when a failure carries no description of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unknown error";

/// A failed call to an inference backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("{}", describe_message(.message.as_deref()))]
pub struct InferenceFailure {
    /// Optional human-readable description of what went wrong.
    pub message: Option<String>,
}

impl InferenceFailure {
    /// Create a failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Create a failure that carries no message.
    pub fn unknown() -> Self {
        Self { message: None }
    }

    /// Text to show the user for this failure.
    ///
    /// Falls back to [`GENERIC_FAILURE_MESSAGE`] when the message is missing
    /// or blank.
    pub fn describe(&self) -> String {
        describe_message(self.message.as_deref()).to_string()
    }
}

fn describe_message(message: Option<&str>) -> &str {
    match message.map(str::trim) {
        Some(message) if !message.is_empty() => message,
        _ => GENERIC_FAILURE_MESSAGE,
    }
}

impl From<std::io::Error> for InferenceFailure {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_uses_message() {
        let failure = InferenceFailure::new("timeout");
        assert_eq!(failure.describe(), "timeout");
        assert_eq!(failure.to_string(), "timeout");
    }

    #[test]
    fn test_describe_falls_back_when_missing() {
        assert_eq!(InferenceFailure::unknown().describe(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(InferenceFailure::new("   ").describe(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(InferenceFailure::unknown().to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(InferenceFailure::new(" offline "));
        assert_eq!(err.to_string(), "offline");
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary");
        let failure = InferenceFailure::from(err);
        assert_eq!(failure.describe(), "no such binary");
    }
}
