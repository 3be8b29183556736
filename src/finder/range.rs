//! Provider-specific compare URLs and normalized commit ranges.
//!
//! The three providers disagree on URL layout, response shape, and what a
//! "range" request even looks like, so each gets its own fetch path that
//! normalizes into [`CommitSummary`]. GitHub monorepos get a two-query
//! diff because its compare endpoint cannot filter by directory.
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::OnceCell;

use crate::{
    clients::{
        factory::ClientFactory,
        traits::{BitbucketApi, GithubApi, GitlabApi},
        types::GithubCommit,
    },
    credentials::Credential,
    dependency::Dependency,
    error::{BumplogError, Result},
    source::{Provider, Source},
};

/// Package managers whose metadata reports a dependency's directory
/// reliably enough to trust for monorepo path filtering.
const RELIABLE_DIRECTORY_PACKAGE_MANAGERS: [&str; 6] = [
    "bundler",
    "cargo",
    "composer",
    "go_modules",
    "npm_and_yarn",
    "pip",
];

/// Normalized commit in a resolved range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    /// Full commit message.
    pub message: String,
    /// Commit sha as the provider reports it.
    pub sha: String,
    /// Provider web page for the commit, empty when the provider response
    /// carries none.
    pub html_url: String,
}

/// Builds compare URLs and normalized commit lists for a resolved range.
///
/// Provider clients are created lazily on first use and cached for the
/// describer's lifetime; only the client matching the source provider is
/// ever built.
pub struct RangeDescriber {
    credentials: Vec<Credential>,
    github: OnceCell<Box<dyn GithubApi>>,
    gitlab: OnceCell<Box<dyn GitlabApi>>,
    bitbucket: OnceCell<Box<dyn BitbucketApi>>,
}

impl RangeDescriber {
    /// Describer backed by the default provider clients.
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            github: OnceCell::new(),
            gitlab: OnceCell::new(),
            bitbucket: OnceCell::new(),
        }
    }

    /// Describer over caller-supplied clients. Slots left `None` fall back
    /// to default construction on first use.
    pub fn with_clients(
        github: Option<Box<dyn GithubApi>>,
        gitlab: Option<Box<dyn GitlabApi>>,
        bitbucket: Option<Box<dyn BitbucketApi>>,
    ) -> Self {
        Self {
            credentials: vec![],
            github: OnceCell::new_with(github),
            gitlab: OnceCell::new_with(gitlab),
            bitbucket: OnceCell::new_with(bitbucket),
        }
    }

    /// Human-facing compare URL for the range, relative paths joined onto
    /// the source URL. Azure has no supported URL scheme here and yields
    /// nothing.
    pub fn compare_url(
        &self,
        source: &Source,
        new_tag: Option<&str>,
        previous_tag: Option<&str>,
        dependency: &Dependency,
    ) -> Result<Option<String>> {
        let path = match source.provider {
            Provider::Github => Some(github_compare_path(
                source,
                dependency,
                new_tag,
                previous_tag,
            )),
            Provider::Bitbucket => {
                Some(bitbucket_compare_path(new_tag, previous_tag))
            }
            Provider::Gitlab => {
                Some(gitlab_compare_path(new_tag, previous_tag))
            }
            Provider::Azure => None,
            Provider::Other => {
                return Err(BumplogError::unexpected_provider(
                    source.provider.to_string(),
                ));
            }
        };

        Ok(path.map(|path| {
            format!("{}/{}", source.url.trim_end_matches('/'), path)
        }))
    }

    /// Commits spanning the range, normalized per provider. Ranges the
    /// provider cannot serve (missing refs, auth walls) come back empty.
    pub async fn commits(
        &self,
        source: &Source,
        new_tag: &str,
        previous_tag: &str,
        dependency: &Dependency,
    ) -> Result<Vec<CommitSummary>> {
        match source.provider {
            Provider::Github => {
                self.github_commits(source, new_tag, previous_tag, dependency)
                    .await
            }
            Provider::Bitbucket => {
                self.bitbucket_commits(source, new_tag, previous_tag).await
            }
            Provider::Gitlab => {
                self.gitlab_commits(source, new_tag, previous_tag).await
            }
            // commit fetching is unimplemented for azure
            Provider::Azure => Ok(vec![]),
            Provider::Other => Err(BumplogError::unexpected_provider(
                source.provider.to_string(),
            )),
        }
    }

    async fn github_commits(
        &self,
        source: &Source,
        new_tag: &str,
        previous_tag: &str,
        dependency: &Dependency,
    ) -> Result<Vec<CommitSummary>> {
        let client = self.github(source).await?;

        let fetched = if part_of_monorepo(source, dependency) {
            github_monorepo_commits(client, source, new_tag, previous_tag)
                .await
        } else {
            client
                .compare(&source.repo, previous_tag, new_tag)
                .await
                .map(|comparison| comparison.commits)
        };

        match fetched {
            Ok(commits) => Ok(commits
                .into_iter()
                .map(|commit| CommitSummary {
                    message: commit.commit.message,
                    sha: commit.sha,
                    html_url: commit.html_url,
                })
                .collect()),
            Err(BumplogError::NotFound(message)) => {
                debug!("github commit range not found: {}", message);
                Ok(vec![])
            }
            Err(err) => Err(err),
        }
    }

    async fn bitbucket_commits(
        &self,
        source: &Source,
        new_tag: &str,
        previous_tag: &str,
    ) -> Result<Vec<CommitSummary>> {
        let client = self.bitbucket(source).await?;

        match client.compare(&source.repo, previous_tag, new_tag).await {
            Ok(commits) => Ok(commits
                .into_iter()
                .map(|commit| CommitSummary {
                    message: commit.summary.raw,
                    sha: commit.hash,
                    html_url: commit.links.html.href,
                })
                .collect()),
            Err(
                err @ (BumplogError::NotFound(_)
                | BumplogError::Unauthorized(_)
                | BumplogError::Forbidden(_)),
            ) => {
                debug!("bitbucket commit range unavailable: {}", err);
                Ok(vec![])
            }
            Err(err) => Err(err),
        }
    }

    async fn gitlab_commits(
        &self,
        source: &Source,
        new_tag: &str,
        previous_tag: &str,
    ) -> Result<Vec<CommitSummary>> {
        let client = self.gitlab(source).await?;

        match client.compare(&source.repo, previous_tag, new_tag).await {
            Ok(comparison) => Ok(comparison
                .commits
                .into_iter()
                .map(|commit| CommitSummary {
                    // the compare response has no commit link, so build one
                    html_url: format!(
                        "{}/commit/{}",
                        source.url, commit.id
                    ),
                    message: commit.message,
                    sha: commit.id,
                })
                .collect()),
            Err(BumplogError::NotFound(message)) => {
                debug!("gitlab commit range not found: {}", message);
                Ok(vec![])
            }
            Err(err) => Err(err),
        }
    }

    async fn github(&self, source: &Source) -> Result<&dyn GithubApi> {
        let client = self
            .github
            .get_or_try_init(|| async {
                ClientFactory::github(source, &self.credentials).await
            })
            .await?;
        Ok(client.as_ref())
    }

    async fn gitlab(&self, source: &Source) -> Result<&dyn GitlabApi> {
        let client = self
            .gitlab
            .get_or_try_init(|| async {
                ClientFactory::gitlab(source, &self.credentials).await
            })
            .await?;
        Ok(client.as_ref())
    }

    async fn bitbucket(&self, source: &Source) -> Result<&dyn BitbucketApi> {
        let client = self
            .bitbucket
            .get_or_try_init(|| async {
                ClientFactory::bitbucket(source, &self.credentials)
            })
            .await?;
        Ok(client.as_ref())
    }
}

/// GitHub cannot filter a compare by directory, so monorepo ranges are the
/// difference of two path-filtered history listings: commits reachable
/// from the new tag minus those reachable from the previous tag, reversed
/// into oldest-first order.
async fn github_monorepo_commits(
    client: &dyn GithubApi,
    source: &Source,
    new_tag: &str,
    previous_tag: &str,
) -> Result<Vec<GithubCommit>> {
    let directory = source.directory.as_deref().unwrap_or_default();

    let previous = client
        .list_commits(&source.repo, previous_tag, directory)
        .await?;
    let previous_shas: HashSet<String> =
        previous.into_iter().map(|commit| commit.sha).collect();

    let mut commits: Vec<GithubCommit> = client
        .list_commits(&source.repo, new_tag, directory)
        .await?
        .into_iter()
        .filter(|commit| !previous_shas.contains(&commit.sha))
        .collect();
    commits.reverse();

    Ok(commits)
}

fn github_compare_path(
    source: &Source,
    dependency: &Dependency,
    new_tag: Option<&str>,
    previous_tag: Option<&str>,
) -> String {
    if part_of_monorepo(source, dependency) {
        // a directory-filtered history link beats a compare page covering
        // the whole repository
        let directory = source.directory.as_deref().unwrap_or_default();
        return clean_path(&format!(
            "commits/{}/{}",
            new_tag.unwrap_or("HEAD"),
            directory
        ));
    }

    match (new_tag, previous_tag) {
        (Some(new_tag), Some(previous_tag)) => {
            format!("compare/{}...{}", previous_tag, new_tag)
        }
        (Some(new_tag), None) => format!("commits/{}", new_tag),
        _ => "commits".to_string(),
    }
}

fn bitbucket_compare_path(
    new_tag: Option<&str>,
    previous_tag: Option<&str>,
) -> String {
    match (new_tag, previous_tag) {
        (Some(new_tag), Some(previous_tag)) => {
            // bitbucket's branch compare page puts the newer point first
            format!("branches/compare/{}..{}", new_tag, previous_tag)
        }
        (Some(new_tag), None) => format!("commits/tag/{}", new_tag),
        _ => "commits".to_string(),
    }
}

fn gitlab_compare_path(
    new_tag: Option<&str>,
    previous_tag: Option<&str>,
) -> String {
    match (new_tag, previous_tag) {
        (Some(new_tag), Some(previous_tag)) => {
            format!("compare/{}...{}", previous_tag, new_tag)
        }
        (Some(new_tag), None) => format!("commits/{}", new_tag),
        _ => "commits/master".to_string(),
    }
}

fn part_of_monorepo(source: &Source, dependency: &Dependency) -> bool {
    let Some(directory) = source.directory.as_deref() else {
        return false;
    };

    reliable_directory(dependency)
        && !matches!(directory, "" | "." | "/" | "./")
}

fn reliable_directory(dependency: &Dependency) -> bool {
    RELIABLE_DIRECTORY_PACKAGE_MANAGERS
        .contains(&dependency.package_manager.as_str())
}

/// Logical path cleanup: drop empty and `.` segments and resolve `..`
/// against prior segments.
fn clean_path(path: &str) -> String {
    let mut cleaned: Vec<&str> = vec![];
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match cleaned.last() {
                Some(&"..") | None => cleaned.push(".."),
                Some(_) => {
                    cleaned.pop();
                }
            },
            segment => cleaned.push(segment),
        }
    }
    cleaned.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clients::{
            traits::{MockBitbucketApi, MockGithubApi, MockGitlabApi},
            types::{
                BitbucketCommit, BitbucketLink, BitbucketLinks,
                BitbucketSummary, GithubCommitDetail, GithubComparison,
                GitlabCommit, GitlabComparison,
            },
        },
        test_helpers::{create_test_dependency, create_test_source},
    };

    fn github_commit(sha: &str, message: &str) -> GithubCommit {
        GithubCommit {
            sha: sha.to_string(),
            commit: GithubCommitDetail {
                message: message.to_string(),
            },
            html_url: format!(
                "https://github.com/gocardless/business/commit/{}",
                sha
            ),
        }
    }

    fn describer_with_github(github: MockGithubApi) -> RangeDescriber {
        RangeDescriber::with_clients(Some(Box::new(github)), None, None)
    }

    #[test]
    fn github_compare_url_with_both_tags() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("github", "gocardless/business");
        let dependency = create_test_dependency("business", None, None);

        let url = describer
            .compare_url(&source, Some("v1.5.0"), Some("v1.4.0"), &dependency)
            .unwrap();

        assert_eq!(
            url.as_deref(),
            Some(
                "https://github.com/gocardless/business/compare/v1.4.0...v1.5.0"
            )
        );
    }

    #[test]
    fn github_compare_url_with_only_new_tag() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("github", "gocardless/business");
        let dependency = create_test_dependency("business", None, None);

        let url = describer
            .compare_url(&source, Some("v1.5.0"), None, &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/gocardless/business/commits/v1.5.0")
        );

        let url =
            describer.compare_url(&source, None, None, &dependency).unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/gocardless/business/commits")
        );
    }

    #[test]
    fn github_monorepo_compare_url_links_directory_history() {
        let describer = RangeDescriber::new(vec![]);
        let mut source = create_test_source("github", "aws/aws-sdk-js-v3");
        source.directory = Some("/clients/client-s3".to_string());
        let mut dependency = create_test_dependency(
            "@aws-sdk/client-s3",
            Some("3.100.0"),
            None,
        );
        dependency.package_manager = "npm_and_yarn".to_string();

        let url = describer
            .compare_url(&source, Some("v3.100.0"), None, &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some(
                "https://github.com/aws/aws-sdk-js-v3/commits/v3.100.0/clients/client-s3"
            )
        );

        // missing new tag falls back to HEAD
        let url = describer
            .compare_url(&source, None, Some("v3.99.0"), &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some(
                "https://github.com/aws/aws-sdk-js-v3/commits/HEAD/clients/client-s3"
            )
        );
    }

    #[test]
    fn monorepo_requires_reliable_package_manager() {
        let mut source = create_test_source("github", "big/monorepo");
        source.directory = Some("/packages/a".to_string());

        let mut dependency = create_test_dependency("a", None, None);
        dependency.package_manager = "gradle".to_string();
        assert!(!part_of_monorepo(&source, &dependency));

        dependency.package_manager = "cargo".to_string();
        assert!(part_of_monorepo(&source, &dependency));

        source.directory = Some(".".to_string());
        assert!(!part_of_monorepo(&source, &dependency));
        source.directory = Some("/".to_string());
        assert!(!part_of_monorepo(&source, &dependency));
    }

    #[test]
    fn bitbucket_compare_url_orders_new_before_previous() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("bitbucket", "team/repo");
        let dependency = create_test_dependency("business", None, None);

        // that provider's compare page expects the newer point first,
        // opposite to the github/gitlab ordering
        let url = describer
            .compare_url(&source, Some("v2.0.0"), Some("v1.0.0"), &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some(
                "https://bitbucket.org/team/repo/branches/compare/v2.0.0..v1.0.0"
            )
        );
    }

    #[test]
    fn bitbucket_compare_url_with_only_new_tag() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("bitbucket", "team/repo");
        let dependency = create_test_dependency("business", None, None);

        let url = describer
            .compare_url(&source, Some("v2.0.0"), None, &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://bitbucket.org/team/repo/commits/tag/v2.0.0")
        );
    }

    #[test]
    fn gitlab_compare_url_formats() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("gitlab", "group/project");
        let dependency = create_test_dependency("business", None, None);

        let url = describer
            .compare_url(&source, Some("v2.0.0"), Some("v1.0.0"), &dependency)
            .unwrap();
        assert_eq!(
            url.as_deref(),
            Some(
                "https://gitlab.com/group/project/compare/v1.0.0...v2.0.0"
            )
        );

        let url =
            describer.compare_url(&source, None, None, &dependency).unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://gitlab.com/group/project/commits/master")
        );
    }

    #[test]
    fn azure_compare_url_is_absent() {
        let describer = RangeDescriber::new(vec![]);
        let source = create_test_source("azure", "org/project/_git/repo");
        let dependency = create_test_dependency("business", None, None);

        let url = describer
            .compare_url(&source, Some("v2.0.0"), Some("v1.0.0"), &dependency)
            .unwrap();
        assert!(url.is_none());
    }

    #[test]
    fn unknown_provider_is_a_contract_violation() {
        let describer = RangeDescriber::new(vec![]);
        let mut source = create_test_source("github", "o/r");
        source.provider = Provider::Other;
        let dependency = create_test_dependency("business", None, None);

        let err = describer
            .compare_url(&source, None, None, &dependency)
            .unwrap_err();
        assert!(matches!(err, BumplogError::UnexpectedProvider(_)));
    }

    #[test]
    fn clean_path_collapses_segments() {
        assert_eq!(
            clean_path("commits/v1.0.0//packages/foo"),
            "commits/v1.0.0/packages/foo"
        );
        assert_eq!(clean_path("commits/v1.0.0/./foo"), "commits/v1.0.0/foo");
        assert_eq!(clean_path("commits/v1.0.0/a/../foo"), "commits/v1.0.0/foo");
        assert_eq!(clean_path("../weird"), "../weird");
    }

    #[tokio::test]
    async fn github_commits_use_compare_endpoint() {
        let mut github = MockGithubApi::new();
        github
            .expect_compare()
            .withf(|repo, base, head| {
                repo == "gocardless/business"
                    && base == "v1.4.0"
                    && head == "v1.5.0"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(GithubComparison {
                    commits: vec![
                        github_commit("abc111", "feat: add thing"),
                        github_commit("abc222", "fix: correct thing"),
                    ],
                })
            });

        let describer = describer_with_github(github);
        let source = create_test_source("github", "gocardless/business");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v1.5.0", "v1.4.0", &dependency)
            .await
            .unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, "abc111");
        assert_eq!(commits[0].message, "feat: add thing");
        assert!(commits[0].html_url.contains("/commit/abc111"));
    }

    #[tokio::test]
    async fn github_monorepo_commits_are_exclusion_filtered_and_reversed() {
        let mut github = MockGithubApi::new();
        github
            .expect_list_commits()
            .withf(|_, sha, path| sha == "v1.0.0" && path == "/packages/a")
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![
                    github_commit("bbb", "second"),
                    github_commit("aaa", "first"),
                ])
            });
        github
            .expect_list_commits()
            .withf(|_, sha, path| sha == "v2.0.0" && path == "/packages/a")
            .times(1)
            .returning(|_, _, _| {
                // newest first, as the api reports history
                Ok(vec![
                    github_commit("ddd", "fourth"),
                    github_commit("ccc", "third"),
                    github_commit("bbb", "second"),
                    github_commit("aaa", "first"),
                ])
            });

        let describer = describer_with_github(github);
        let mut source = create_test_source("github", "big/monorepo");
        source.directory = Some("/packages/a".to_string());
        let mut dependency = create_test_dependency("a", None, None);
        dependency.package_manager = "npm_and_yarn".to_string();

        let commits = describer
            .commits(&source, "v2.0.0", "v1.0.0", &dependency)
            .await
            .unwrap();

        let shas: Vec<&str> =
            commits.iter().map(|commit| commit.sha.as_str()).collect();
        assert_eq!(shas, vec!["ccc", "ddd"]);
    }

    #[tokio::test]
    async fn github_not_found_yields_empty_range() {
        let mut github = MockGithubApi::new();
        github.expect_compare().returning(|_, _, _| {
            Err(BumplogError::not_found("no common ancestor"))
        });

        let describer = describer_with_github(github);
        let source = create_test_source("github", "gocardless/business");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v1.5.0", "v1.4.0", &dependency)
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn gitlab_commits_synthesize_commit_urls() {
        let mut gitlab = MockGitlabApi::new();
        gitlab
            .expect_compare()
            .withf(|repo, base, head| {
                repo == "group/project"
                    && base == "v1.0.0"
                    && head == "v2.0.0"
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(GitlabComparison {
                    commits: vec![GitlabCommit {
                        id: "fff000".to_string(),
                        message: "chore: release".to_string(),
                    }],
                })
            });

        let describer =
            RangeDescriber::with_clients(None, Some(Box::new(gitlab)), None);
        let source = create_test_source("gitlab", "group/project");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v2.0.0", "v1.0.0", &dependency)
            .await
            .unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0].html_url,
            "https://gitlab.com/group/project/commit/fff000"
        );
    }

    #[tokio::test]
    async fn bitbucket_commits_normalize_nested_fields() {
        let mut bitbucket = MockBitbucketApi::new();
        bitbucket.expect_compare().times(1).returning(|_, _, _| {
            Ok(vec![BitbucketCommit {
                hash: "deadbeef".to_string(),
                summary: BitbucketSummary {
                    raw: "initial commit".to_string(),
                },
                links: BitbucketLinks {
                    html: BitbucketLink {
                        href: "https://bitbucket.org/t/r/commits/deadbeef"
                            .to_string(),
                    },
                },
            }])
        });

        let describer =
            RangeDescriber::with_clients(None, None, Some(Box::new(bitbucket)));
        let source = create_test_source("bitbucket", "team/repo");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v2.0.0", "v1.0.0", &dependency)
            .await
            .unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "initial commit");
        assert_eq!(commits[0].sha, "deadbeef");
    }

    #[tokio::test]
    async fn bitbucket_auth_failures_yield_empty_range() {
        let mut bitbucket = MockBitbucketApi::new();
        bitbucket.expect_compare().returning(|_, _, _| {
            Err(BumplogError::unauthorized("private repository"))
        });

        let describer =
            RangeDescriber::with_clients(None, None, Some(Box::new(bitbucket)));
        let source = create_test_source("bitbucket", "team/repo");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v2.0.0", "v1.0.0", &dependency)
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn azure_commits_are_empty() {
        let describer = RangeDescriber::with_clients(None, None, None);
        let source = create_test_source("azure", "org/project/_git/repo");
        let dependency = create_test_dependency("business", None, None);

        let commits = describer
            .commits(&source, "v2.0.0", "v1.0.0", &dependency)
            .await
            .unwrap();
        assert!(commits.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_errors_propagate() {
        let mut github = MockGithubApi::new();
        github
            .expect_compare()
            .returning(|_, _, _| Err(BumplogError::RateLimitExceeded));

        let describer = describer_with_github(github);
        let source = create_test_source("github", "gocardless/business");
        let dependency = create_test_dependency("business", None, None);

        let err = describer
            .commits(&source, "v1.5.0", "v1.4.0", &dependency)
            .await
            .unwrap_err();
        assert!(matches!(err, BumplogError::RateLimitExceeded));
    }
}
