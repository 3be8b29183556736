//! Traits for the provider commit APIs.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    clients::types::{
        BitbucketCommit, GithubCommit, GithubComparison, GitlabComparison,
    },
    error::Result,
};

/// GitHub-style commit API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Commit comparison between `base` and `head`. Fails with
    /// `NotFound` on missing refs or repo.
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<GithubComparison>;

    /// History listing anchored at `sha`, filtered to `path`, newest first.
    async fn list_commits(
        &self,
        repo: &str,
        sha: &str,
        path: &str,
    ) -> Result<Vec<GithubCommit>>;
}

/// GitLab-style commit API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GitlabApi: Send + Sync {
    /// Commit comparison between `base` and `head`. Fails with
    /// `NotFound` on missing refs or project.
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<GitlabComparison>;
}

/// Bitbucket-style commit API.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BitbucketApi: Send + Sync {
    /// Commits reachable from `head` and not from `base`. Fails with
    /// `NotFound`/`Unauthorized`/`Forbidden` per the provider's responses.
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<BitbucketCommit>>;
}
