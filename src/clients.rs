//! Provider commit API clients (GitHub, GitLab, Bitbucket).
//!
//! Each client exposes only the narrow surface the finder needs: a commit
//! comparison between two points, plus path-filtered history listing for
//! GitHub.

/// Bitbucket Cloud API client implementation.
pub mod bitbucket;

/// Factory for creating clients from a source and credentials.
pub mod factory;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// GitLab API client implementation for GitLab.com and self-hosted instances.
pub mod gitlab;

/// Common traits for provider commit API abstraction.
pub mod traits;

/// Response types returned by the provider commit APIs.
pub mod types;
