//! GitHub commit API client.
use async_trait::async_trait;
use log::*;
use octocrab::Octocrab;
use secrecy::SecretString;
use serde::Serialize;

use crate::{
    clients::{
        traits::GithubApi,
        types::{GithubCommit, GithubComparison},
    },
    error::Result,
};

const GITHUB_DOT_COM_HOST: &str = "github.com";
const GITHUB_DOT_COM_API: &str = "https://api.github.com";
const PAGE_SIZE: u8 = 100;

#[derive(Debug, Serialize)]
struct ListCommitsParams<'a> {
    sha: &'a str,
    path: &'a str,
    per_page: u8,
}

/// GitHub client backed by octocrab, calling the compare and commit-listing
/// endpoints as explicit REST routes.
pub struct Github {
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and
    /// API base URL configuration. Construction spawns octocrab's client
    /// workers and needs the runtime.
    pub async fn new(host: &str, token: Option<&SecretString>) -> Result<Self> {
        let base_uri = api_base_for_host(host);

        debug!("github api base: {}", base_uri);

        let mut builder = Octocrab::builder().base_uri(base_uri)?;

        if let Some(token) = token {
            builder = builder.personal_token(token.clone());
        }

        let instance = builder.build()?;

        Ok(Self { instance })
    }
}

fn api_base_for_host(host: &str) -> String {
    if host == GITHUB_DOT_COM_HOST {
        GITHUB_DOT_COM_API.to_string()
    } else {
        // enterprise instances serve the API under the host itself
        format!("https://{}/api/v3", host)
    }
}

#[async_trait]
impl GithubApi for Github {
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<GithubComparison> {
        let route = format!("/repos/{}/compare/{}...{}", repo, base, head);

        debug!("fetching github comparison: {}", route);

        let comparison: GithubComparison =
            self.instance.get(route, None::<&()>).await?;

        Ok(comparison)
    }

    async fn list_commits(
        &self,
        repo: &str,
        sha: &str,
        path: &str,
    ) -> Result<Vec<GithubCommit>> {
        let route = format!("/repos/{}/commits", repo);
        let params = ListCommitsParams {
            sha,
            path,
            per_page: PAGE_SIZE,
        };

        debug!("listing github commits for {} at {}:{}", repo, sha, path);

        let commits: Vec<GithubCommit> =
            self.instance.get(route, Some(&params)).await?;

        Ok(commits)
    }
}
