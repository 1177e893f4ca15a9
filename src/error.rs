//! Domain errors for the tracker.

use thiserror::Error;

/// Failures with a meaning of their own, as opposed to plain I/O plumbing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    /// Pushover credentials are missing and this is not a dry run.
    #[error(
        "--pushover-user-token and --pushover-api-token are required when not doing a dry run"
    )]
    MissingCredentials,

    /// The requested author has no row in the author list.
    #[error("Author {0} not found in author list")]
    AuthorNotFound(String),

    /// Amazon answered with its automated-access rejection page.
    #[error("Request blocked by Amazon's automated access check")]
    Blocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert!(TrackerError::MissingCredentials.to_string().contains("--pushover-api-token"));
        assert_eq!(
            TrackerError::AuthorNotFound("Jane Doe".to_string()).to_string(),
            "Author Jane Doe not found in author list"
        );
        assert!(TrackerError::Blocked.to_string().contains("blocked"));
    }
}
