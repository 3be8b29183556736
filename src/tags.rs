//! Repository tag listing over git transport.
//!
//! Tags come from a plain ls-remote rather than the provider APIs so the
//! same path works for every provider, self-hosted instances included. Any
//! failure here means "repository unreachable" to the caller; private and
//! vanished repositories are an expected condition, not an error worth
//! propagating.
use async_trait::async_trait;
use git2::RemoteCallbacks;
use log::*;
#[cfg(test)]
use mockall::automock;
use secrecy::ExposeSecret;

use crate::{
    credentials::Credential,
    error::{BumplogError, Result},
};

/// A single repository tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTag {
    pub name: String,
}

/// Lists the tags of a remote repository.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TagLister: Send + Sync {
    /// List tag names for the repository at `url`. Fails with
    /// [`BumplogError::Unreachable`] when the repository cannot be reached.
    async fn list_tags(&self, url: &str) -> Result<Vec<GitTag>>;
}

/// Tag lister backed by git2's remote listing.
pub struct GitTagLister {
    credentials: Vec<Credential>,
}

impl GitTagLister {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    /// Username/secret pair for the repository host, when one is configured.
    fn credential_pair(&self, url: &str) -> Option<(String, String)> {
        let host = url::Url::parse(url).ok()?.host_str()?.to_string();
        let cred = Credential::find_for_host(&self.credentials, &host)?;
        let secret = cred.password.as_ref().or(cred.token.as_ref())?;
        let user = cred
            .username
            .clone()
            .unwrap_or_else(|| "x-access-token".to_string());
        Some((user, secret.expose_secret().to_string()))
    }
}

#[async_trait]
impl TagLister for GitTagLister {
    async fn list_tags(&self, url: &str) -> Result<Vec<GitTag>> {
        debug!("listing remote tags for {}", url);

        let auth = self.credential_pair(url);
        let url = url.to_string();

        let tags =
            tokio::task::spawn_blocking(move || ls_remote_tags(&url, auth))
                .await
                .map_err(|err| {
                    BumplogError::Other(color_eyre::eyre::eyre!(
                        "tag listing task failed: {}",
                        err
                    ))
                })??;

        debug!("found {} tags", tags.len());

        Ok(tags)
    }
}

/// Create Git authentication callbacks for username/token authentication.
fn auth_callbacks<'r>(user: String, token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(&user, &token)
    });
    callbacks
}

fn ls_remote_tags(
    url: &str,
    auth: Option<(String, String)>,
) -> Result<Vec<GitTag>> {
    let mut remote = git2::Remote::create_detached(url).map_err(|err| {
        BumplogError::unreachable(format!("{}: {}", url, err.message()))
    })?;

    let callbacks = auth.map(|(user, token)| auth_callbacks(user, token));

    let connection = remote
        .connect_auth(git2::Direction::Fetch, callbacks, None)
        .map_err(|err| {
            BumplogError::unreachable(format!("{}: {}", url, err.message()))
        })?;

    let tags = connection
        .list()
        .map_err(|err| {
            BumplogError::unreachable(format!("{}: {}", url, err.message()))
        })?
        .iter()
        // annotated tags list twice, once peeled as "<name>^{}"
        .filter_map(|head| head.name().strip_prefix("refs/tags/"))
        .filter(|name| !name.ends_with("^{}"))
        .map(|name| GitTag {
            name: name.to_string(),
        })
        .collect();

    Ok(tags)
}
