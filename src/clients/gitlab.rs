//! GitLab commit API client.
use std::borrow::Cow;

use async_trait::async_trait;
use derive_builder::Builder;
use gitlab::{
    AsyncGitlab, GitlabBuilder,
    api::{AsyncQuery, Endpoint, QueryParams, common::NameOrId},
};
use log::*;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};

use crate::{
    clients::{traits::GitlabApi, types::GitlabComparison},
    error::{BumplogError, Result},
};

/// Repository compare call, which the gitlab crate does not ship a
/// builder for.
#[derive(Debug, Builder)]
#[builder(setter(strip_option))]
struct CompareBranches<'a> {
    #[builder(setter(into))]
    project: NameOrId<'a>,

    #[builder(setter(into))]
    from: Cow<'a, str>,

    #[builder(setter(into))]
    to: Cow<'a, str>,
}

impl<'a> CompareBranches<'a> {
    fn builder() -> CompareBranchesBuilder<'a> {
        CompareBranchesBuilder::default()
    }
}

impl Endpoint for CompareBranches<'_> {
    fn method(&self) -> Method {
        Method::GET
    }

    fn endpoint(&self) -> Cow<'static, str> {
        format!("projects/{}/repository/compare", self.project).into()
    }

    fn parameters(&self) -> QueryParams<'_> {
        let mut params = QueryParams::default();
        params.push("from", &self.from).push("to", &self.to);
        params
    }
}

/// GitLab client wrapping the gitlab crate's async client.
pub struct Gitlab {
    client: AsyncGitlab,
}

impl Gitlab {
    /// Create GitLab client for the given host, authenticated when a
    /// token is available.
    pub async fn new(host: &str, token: Option<&SecretString>) -> Result<Self> {
        debug!("creating gitlab client for host: {}", host);

        let client = match token {
            Some(token) => {
                GitlabBuilder::new(host, token.expose_secret())
                    .build_async()
                    .await?
            }
            None => {
                GitlabBuilder::new_unauthenticated(host)
                    .build_async()
                    .await?
            }
        };

        Ok(Self { client })
    }
}

#[async_trait]
impl GitlabApi for Gitlab {
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<GitlabComparison> {
        let endpoint = CompareBranches::builder()
            .project(repo)
            .from(base)
            .to(head)
            .build()
            .map_err(|err| BumplogError::Other(err.into()))?;

        debug!("fetching gitlab comparison for {}: {}...{}", repo, base, head);

        let comparison: GitlabComparison =
            endpoint.query_async(&self.client).await?;

        Ok(comparison)
    }
}
