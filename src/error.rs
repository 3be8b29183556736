//! Crate error types and result alias.

use thiserror::Error;

/// Main error type for bumplog operations.
///
/// Variants fall into two camps: metadata inconsistencies
/// ([`MixedRequirementSources`](BumplogError::MixedRequirementSources),
/// [`UnexpectedProvider`](BumplogError::UnexpectedProvider)) which always
/// propagate, and provider fault signals which the finder absorbs into empty
/// results at the documented boundaries.
#[derive(Error, Debug)]
pub enum BumplogError {
    // Dependency metadata errors
    #[error(
        "Dependency '{dependency}' mixes requirement source types: {kinds:?}"
    )]
    MixedRequirementSources {
        dependency: String,
        kinds: Vec<String>,
    },

    // Source errors
    #[error("Unexpected source provider '{0}'")]
    UnexpectedProvider(String),

    #[error("Invalid source URL: {0}")]
    InvalidSourceUrl(String),

    // Provider fault signals
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Repository unreachable: {0}")]
    Unreachable(String),

    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    // Parsing errors - automatic conversions via #[from]
    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using BumplogError
pub type Result<T> = std::result::Result<T, BumplogError>;

impl BumplogError {
    /// Create a mixed-requirement-sources error for a dependency
    pub fn mixed_sources(
        dependency: impl Into<String>,
        kinds: Vec<String>,
    ) -> Self {
        Self::MixedRequirementSources {
            dependency: dependency.into(),
            kinds,
        }
    }

    /// Create an unexpected-provider error
    pub fn unexpected_provider(provider: impl Into<String>) -> Self {
        Self::UnexpectedProvider(provider.into())
    }

    /// Create an invalid source url error
    pub fn invalid_source_url(msg: impl Into<String>) -> Self {
        Self::InvalidSourceUrl(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a repository-unreachable error
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }
}

// Implement From for reqwest errors, classifying by status where one exists
impl From<reqwest::Error> for BumplogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return Self::NetworkError(err.to_string());
        }

        match err.status() {
            Some(status) if status.as_u16() == 404 => {
                Self::NotFound(err.to_string())
            }
            Some(status) if status.as_u16() == 401 => {
                Self::Unauthorized(err.to_string())
            }
            Some(status) if status.as_u16() == 403 => {
                Self::Forbidden(err.to_string())
            }
            Some(status) if status.as_u16() == 429 => Self::RateLimitExceeded,
            _ => Self::NetworkError(err.to_string()),
        }
    }
}

// Implement From for reqwest header errors (needs custom message)
impl From<reqwest::header::InvalidHeaderValue> for BumplogError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Unauthorized(format!("Invalid header value: {}", err))
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for BumplogError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            octocrab::Error::GitHub { source, .. } => {
                match source.status_code.as_u16() {
                    404 => Self::NotFound(source.message.clone()),
                    401 => Self::Unauthorized(source.message.clone()),
                    403 => Self::Forbidden(source.message.clone()),
                    _ => Self::NetworkError(format!(
                        "GitHub API error: {}",
                        err
                    )),
                }
            }
            _ => Self::NetworkError(format!("GitHub API error: {}", err)),
        }
    }
}

// Implement From for gitlab api errors
impl From<gitlab::api::ApiError<gitlab::RestError>> for BumplogError {
    fn from(err: gitlab::api::ApiError<gitlab::RestError>) -> Self {
        match &err {
            gitlab::api::ApiError::GitlabWithStatus { status, .. } => {
                match status.as_u16() {
                    404 => Self::NotFound(err.to_string()),
                    401 => Self::Unauthorized(err.to_string()),
                    403 => Self::Forbidden(err.to_string()),
                    429 => Self::RateLimitExceeded,
                    _ => Self::NetworkError(format!(
                        "GitLab API error: {}",
                        err
                    )),
                }
            }
            _ => Self::NetworkError(format!("GitLab API error: {}", err)),
        }
    }
}

impl From<gitlab::GitlabError> for BumplogError {
    fn from(err: gitlab::GitlabError) -> Self {
        Self::NetworkError(format!("GitLab error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formats() {
        let err = BumplogError::unexpected_provider("sourceforge");
        assert_eq!(
            err.to_string(),
            "Unexpected source provider 'sourceforge'"
        );

        let err = BumplogError::mixed_sources(
            "left-pad",
            vec!["git".into(), "registry".into()],
        );
        assert_eq!(
            err.to_string(),
            "Dependency 'left-pad' mixes requirement source types: \
             [\"git\", \"registry\"]"
        );

        let err = BumplogError::unreachable("ls-remote failed");
        assert_eq!(
            err.to_string(),
            "Repository unreachable: ls-remote failed"
        );
    }

    #[test]
    fn test_error_helpers() {
        assert!(matches!(
            BumplogError::not_found("tag"),
            BumplogError::NotFound(_)
        ));
        assert!(matches!(
            BumplogError::unauthorized("token"),
            BumplogError::Unauthorized(_)
        ));
        assert!(matches!(
            BumplogError::forbidden("repo"),
            BumplogError::Forbidden(_)
        ));
        assert!(matches!(
            BumplogError::network("timeout"),
            BumplogError::NetworkError(_)
        ));
    }

    #[test]
    fn test_from_conversions() {
        let url_err = url::Url::parse("::not a url::");
        assert!(url_err.is_err());
        let err: BumplogError = url_err.unwrap_err().into();
        assert!(matches!(err, BumplogError::UrlError(_)));
    }
}
