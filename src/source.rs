//! Source descriptors locating a dependency's repository.
use git_url_parse::GitUrl;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{BumplogError, Result};

/// Hosting providers a source repository can live on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Github,
    Gitlab,
    Bitbucket,
    Azure,
    Other,
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Github => f.write_str("github"),
            Provider::Gitlab => f.write_str("gitlab"),
            Provider::Bitbucket => f.write_str("bitbucket"),
            Provider::Azure => f.write_str("azure"),
            Provider::Other => f.write_str("other"),
        }
    }
}

/// Location of a dependency's source repository. Immutable, supplied by the
/// caller (or inferred with [`Source::from_url`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Hosting provider.
    pub provider: Provider,
    /// Base repository URL, e.g. "https://github.com/rust-lang/cargo".
    pub url: String,
    /// Provider-native repo identifier, e.g. "rust-lang/cargo".
    pub repo: String,
    /// Subdirectory the dependency lives in, for monorepos.
    pub directory: Option<String>,
}

impl Source {
    /// Infer a source from a repository URL. Returns `None` when the URL does
    /// not parse or the host is not one of the recognized providers;
    /// self-hosted instances must be constructed explicitly since their
    /// hostnames carry no provider signal.
    pub fn from_url(url: &str) -> Option<Source> {
        let parsed = GitUrl::parse(url).ok()?;
        let host = parsed.host.clone()?;

        let provider = match host.as_str() {
            "github.com" | "www.github.com" => Provider::Github,
            "gitlab.com" => Provider::Gitlab,
            "bitbucket.org" => Provider::Bitbucket,
            "dev.azure.com" => Provider::Azure,
            h if h.ends_with(".visualstudio.com") => Provider::Azure,
            _ => return None,
        };

        let repo = parsed
            .path
            .strip_prefix('/')
            .unwrap_or(&parsed.path)
            .trim_end_matches(".git")
            .to_string();

        if repo.is_empty() {
            return None;
        }

        Some(Source {
            provider,
            url: format!("https://{}/{}", host, repo),
            repo,
            directory: None,
        })
    }

    /// Host portion of the source URL, used for credential matching and API
    /// base construction.
    pub fn host(&self) -> Result<String> {
        let parsed = url::Url::parse(&self.url)?;
        parsed
            .host_str()
            .map(str::to_string)
            .ok_or_else(|| BumplogError::invalid_source_url(self.url.clone()))
    }
}
