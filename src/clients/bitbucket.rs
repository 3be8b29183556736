//! Bitbucket Cloud API client.
use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_STANDARD};
use log::*;
use reqwest::{
    Client, StatusCode, Url,
    header::{HeaderMap, HeaderValue},
};
use secrecy::ExposeSecret;

use crate::{
    clients::{
        traits::BitbucketApi,
        types::{BitbucketCommit, BitbucketPage},
    },
    credentials::Credential,
    error::{BumplogError, Result},
};

const BITBUCKET_API_BASE: &str = "https://api.bitbucket.org/2.0/repositories/";

/// Bitbucket client using reqwest against the Cloud REST API.
pub struct Bitbucket {
    base_url: Url,
    client: Client,
}

impl Bitbucket {
    /// Create a Bitbucket client, attaching basic auth when the credential
    /// carries a username and app password.
    pub fn new(credential: Option<&Credential>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(cred) = credential {
            if let (Some(username), Some(password)) =
                (cred.username.as_ref(), cred.password.as_ref())
            {
                let raw =
                    format!("{}:{}", username, password.expose_secret());
                let encoded = BASE64_STANDARD.encode(raw.as_bytes());
                let value =
                    HeaderValue::from_str(&format!("Basic {}", encoded))?;
                headers.append("Authorization", value);
            }
        }

        let client = Client::builder().default_headers(headers).build()?;
        let base_url = Url::parse(BITBUCKET_API_BASE)?;

        Ok(Self { base_url, client })
    }

    fn commits_url(&self, repo: &str, base: &str, head: &str) -> Result<Url> {
        let mut url = self.base_url.join(&format!("{}/commits/", repo))?;

        url.query_pairs_mut()
            .append_pair("include", head)
            .append_pair("exclude", base);

        Ok(url)
    }
}

#[async_trait]
impl BitbucketApi for Bitbucket {
    async fn compare(
        &self,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<BitbucketCommit>> {
        let url = self.commits_url(repo, base, head)?;

        debug!("fetching bitbucket commit range: {}", url);

        let request = self.client.get(url).build()?;
        let response = self.client.execute(request).await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(BumplogError::not_found(format!(
                    "bitbucket commit range for {}",
                    repo
                )));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(BumplogError::unauthorized(format!(
                    "bitbucket commit range for {}",
                    repo
                )));
            }
            StatusCode::FORBIDDEN => {
                return Err(BumplogError::forbidden(format!(
                    "bitbucket commit range for {}",
                    repo
                )));
            }
            _ => {}
        }

        let result = response.error_for_status()?;
        let bytes = result.bytes().await?;
        let page = serde_json::from_slice::<BitbucketPage>(&bytes)?;

        Ok(page.values)
    }
}
