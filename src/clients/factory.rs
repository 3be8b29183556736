//! Factory for creating provider clients from a parsed source.
use secrecy::SecretString;

use crate::{
    clients::{
        bitbucket::Bitbucket,
        github::Github,
        gitlab::Gitlab,
        traits::{BitbucketApi, GithubApi, GitlabApi},
    },
    credentials::Credential,
    error::Result,
    source::Source,
};

/// Factory for creating provider clients.
pub struct ClientFactory;

impl ClientFactory {
    /// Create a GitHub client for the source host.
    pub async fn github(
        source: &Source,
        credentials: &[Credential],
    ) -> Result<Box<dyn GithubApi>> {
        let host = source.host()?;
        let token = Self::token_for(credentials, &host);

        Ok(Box::new(Github::new(&host, token.as_ref()).await?))
    }

    /// Create a GitLab client for the source host.
    pub async fn gitlab(
        source: &Source,
        credentials: &[Credential],
    ) -> Result<Box<dyn GitlabApi>> {
        let host = source.host()?;
        let token = Self::token_for(credentials, &host);

        Ok(Box::new(Gitlab::new(&host, token.as_ref()).await?))
    }

    /// Create a Bitbucket client for the source host.
    pub fn bitbucket(
        source: &Source,
        credentials: &[Credential],
    ) -> Result<Box<dyn BitbucketApi>> {
        let host = source.host()?;
        let credential = Credential::find_for_host(credentials, &host);

        Ok(Box::new(Bitbucket::new(credential)?))
    }

    fn token_for(
        credentials: &[Credential],
        host: &str,
    ) -> Option<SecretString> {
        Credential::find_for_host(credentials, host)
            .and_then(|cred| cred.token.clone())
    }
}
