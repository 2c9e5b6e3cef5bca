//! Error types for timestamp parsing and node identity.

use thiserror::Error;

/// Result type for clock operations.
pub type ClockResult<T> = Result<T, ClockError>;

/// Errors that can occur when parsing timestamps or node identities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    /// A serialized timestamp did not have the expected shape.
    #[error("invalid timestamp format: {0}")]
    InvalidFormat(String),

    /// A timestamp component could not be parsed as hex.
    #[error("invalid {component} component in timestamp: {value}")]
    InvalidComponent {
        /// Which component failed to parse.
        component: &'static str,
        /// The offending text.
        value: String,
    },

    /// A node identity was empty or contained the separator.
    #[error("invalid node id: {0}")]
    InvalidNodeId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ClockError::InvalidComponent {
            component: "counter",
            value: "zzzz".into(),
        };
        assert!(err.to_string().contains("counter"));
        assert!(err.to_string().contains("zzzz"));
    }
}
