//! Error types for chirp operations.

use thiserror::Error;

/// Result type alias for chirp operations.
pub type Result<T> = std::result::Result<T, ChirpError>;

/// Main error type for chirp operations.
///
/// Every failure crossing the engine boundary is one of these variants;
/// the core never panics across that boundary and never partially applies
/// a failed mutation.
#[derive(Error, Debug)]
pub enum ChirpError {
    /// A referenced user or post does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation requires an active session and none exists.
    #[error("authentication required")]
    Unauthorized,

    /// Registration collided with an existing username.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Login secret did not match the stored credential.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Input validation errors (empty required fields and the like).
    #[error("validation error: {0}")]
    Validation(String),

    /// The persisted snapshot exists but cannot be decoded.
    ///
    /// Recovered automatically by reseeding; callers treat this as an
    /// informational event rather than a blocking failure.
    #[error("stored snapshot is corrupt: {0}")]
    StorageCorrupt(String),

    /// Key-value store errors.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChirpError {
    /// Creates a new not-found error.
    pub fn not_found<T: ToString>(what: T) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Creates a new corrupt-snapshot error.
    pub fn storage_corrupt<T: ToString>(msg: T) -> Self {
        Self::StorageCorrupt(msg.to_string())
    }

    /// Creates a new storage error.
    pub fn storage<T: ToString>(msg: T) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChirpError::not_found("post 'p1'");
        assert_eq!(err.to_string(), "not found: post 'p1'");

        let err = ChirpError::DuplicateUsername("amy".to_string());
        assert_eq!(err.to_string(), "username 'amy' is already taken");

        let err = ChirpError::validation("post content cannot be empty");
        assert_eq!(
            err.to_string(),
            "validation error: post content cannot be empty"
        );
    }
}
