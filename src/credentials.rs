//! Credential types for authenticating provider calls.
use secrecy::SecretString;

/// A single host-scoped credential supplied by the caller.
///
/// Which fields matter depends on the provider: token auth for GitHub and
/// GitLab API calls, username/password (app password) for Bitbucket, and
/// username/password for authenticated git ls-remote.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Host the credential applies to (e.g., "github.com").
    pub host: String,
    /// Username for basic-auth style access.
    pub username: Option<String>,
    /// Password or app password.
    pub password: Option<SecretString>,
    /// Access token for token-auth providers.
    pub token: Option<SecretString>,
}

impl Default for Credential {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            username: None,
            password: None,
            token: None,
        }
    }
}

impl Credential {
    /// Find the first credential whose host matches `host`.
    pub fn find_for_host<'a>(
        credentials: &'a [Credential],
        host: &str,
    ) -> Option<&'a Credential> {
        credentials.iter().find(|cred| cred.host == host)
    }
}
