//! Response types returned by the provider commit APIs.
//!
//! Field shapes mirror each provider's wire format; missing optional fields
//! deserialize to empty strings rather than failing the whole response.
use serde::Deserialize;

/// One commit from the GitHub compare/list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubCommit {
    pub sha: String,
    pub commit: GithubCommitDetail,
    #[serde(default)]
    pub html_url: String,
}

/// Nested commit detail from GitHub responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubCommitDetail {
    #[serde(default)]
    pub message: String,
}

/// The commits portion of a GitHub compare response.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubComparison {
    #[serde(default)]
    pub commits: Vec<GithubCommit>,
}

/// One commit from the GitLab compare response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabCommit {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

/// GitLab compare response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabComparison {
    #[serde(default)]
    pub commits: Vec<GitlabCommit>,
}

/// One commit from the Bitbucket commits listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketCommit {
    pub hash: String,
    #[serde(default)]
    pub summary: BitbucketSummary,
    #[serde(default)]
    pub links: BitbucketLinks,
}

/// Rendered commit message container.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitbucketSummary {
    #[serde(default)]
    pub raw: String,
}

/// Link container on Bitbucket resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitbucketLinks {
    #[serde(default)]
    pub html: BitbucketLink,
}

/// A single href link.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitbucketLink {
    #[serde(default)]
    pub href: String,
}

/// Envelope for paginated Bitbucket list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BitbucketPage {
    #[serde(default)]
    pub values: Vec<BitbucketCommit>,
}
