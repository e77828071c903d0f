use thiserror::Error;

/// Result type for outline operations
pub type Result<T> = std::result::Result<T, OutlineError>;

/// Errors that can occur while building a script outline
#[derive(Error, Debug)]
pub enum OutlineError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred while reading a script stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An extractor was handed a node it cannot describe
    #[error("Unexpected node: {0}")]
    UnexpectedNode(String),
}

impl OutlineError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an unexpected node error
    pub fn unexpected_node(msg: impl Into<String>) -> Self {
        Self::UnexpectedNode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = OutlineError::invalid_config("base_class must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: base_class must not be empty"
        );

        let io = std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        );
        assert!(matches!(OutlineError::from(io), OutlineError::Io(_)));
    }
}
