//! Commit-range resolution for a single dependency upgrade.
//!
//! [`CommitsFinder`] glues the two halves together: [`resolver::TagResolver`]
//! maps the upgrade's version strings onto tag names, and
//! [`range::RangeDescriber`] turns the resolved pair into a compare URL and
//! a normalized commit list for the source's hosting provider.
use tokio::sync::OnceCell;

use crate::{
    clients::traits::{BitbucketApi, GithubApi, GitlabApi},
    credentials::Credential,
    dependency::Dependency,
    error::Result,
    finder::{range::RangeDescriber, resolver::TagResolver},
    source::{Provider, Source},
    tags::{GitTagLister, TagLister},
};

pub mod range;
pub mod resolver;

pub use range::CommitSummary;

/// Resolves the tag pair bracketing one dependency upgrade and describes
/// the commit range between them.
///
/// A finder is built per (dependency, source, credentials) triple and
/// discarded after use; its tag-list cache and provider client handles
/// live exactly as long as the instance.
pub struct CommitsFinder {
    dependency: Dependency,
    source: Option<Source>,
    resolver: TagResolver,
    describer: RangeDescriber,
    new_tag: OnceCell<Option<String>>,
    previous_tag: OnceCell<Option<String>>,
}

impl CommitsFinder {
    /// Finder over the default collaborators: a git ls-remote tag lister
    /// and provider clients constructed lazily from `credentials` on first
    /// use.
    pub fn new(
        dependency: Dependency,
        source: Option<Source>,
        credentials: Vec<Credential>,
    ) -> Self {
        let lister = Box::new(GitTagLister::new(credentials.clone()));
        Self::assemble(
            dependency,
            source,
            lister,
            RangeDescriber::new(credentials),
        )
    }

    /// Finder over caller-supplied collaborators. Client slots left `None`
    /// fall back to default construction on first use.
    pub fn with_clients(
        dependency: Dependency,
        source: Option<Source>,
        tag_lister: Box<dyn TagLister>,
        github: Option<Box<dyn GithubApi>>,
        gitlab: Option<Box<dyn GitlabApi>>,
        bitbucket: Option<Box<dyn BitbucketApi>>,
    ) -> Self {
        Self::assemble(
            dependency,
            source,
            tag_lister,
            RangeDescriber::with_clients(github, gitlab, bitbucket),
        )
    }

    fn assemble(
        dependency: Dependency,
        source: Option<Source>,
        lister: Box<dyn TagLister>,
        describer: RangeDescriber,
    ) -> Self {
        let resolver =
            TagResolver::new(dependency.clone(), source.clone(), lister);

        Self {
            dependency,
            source,
            resolver,
            describer,
            new_tag: OnceCell::new(),
            previous_tag: OnceCell::new(),
        }
    }

    /// Human-facing compare URL for the resolved range. Absent when the
    /// source is unknown or the provider is azure.
    pub async fn commits_url(&self) -> Result<Option<String>> {
        let source = match self.source.as_ref() {
            Some(source) => source,
            None => return Ok(None),
        };
        if source.provider == Provider::Azure {
            return Ok(None);
        }

        let new_tag = self.new_tag().await?;
        let previous_tag = self.previous_tag().await?;

        self.describer.compare_url(
            source,
            new_tag.as_deref(),
            previous_tag.as_deref(),
            &self.dependency,
        )
    }

    /// Normalized commits spanning the resolved range. Empty when the
    /// source is unknown or either tag cannot be resolved.
    pub async fn commits(&self) -> Result<Vec<CommitSummary>> {
        let source = match self.source.as_ref() {
            Some(source) => source,
            None => return Ok(vec![]),
        };
        if source.provider == Provider::Azure {
            return Ok(vec![]);
        }

        let new_tag = self.new_tag().await?;
        let previous_tag = self.previous_tag().await?;

        let (Some(new_tag), Some(previous_tag)) = (new_tag, previous_tag)
        else {
            return Ok(vec![]);
        };

        self.describer
            .commits(source, &new_tag, &previous_tag, &self.dependency)
            .await
    }

    /// Tag resolved for the upgraded state, memoized per instance. Public
    /// so callers can display what the range is anchored on.
    pub async fn new_tag(&self) -> Result<Option<String>> {
        let tag = self
            .new_tag
            .get_or_try_init(|| async { self.resolver.new_tag().await })
            .await?;

        Ok(tag.clone())
    }

    async fn previous_tag(&self) -> Result<Option<String>> {
        let tag = self
            .previous_tag
            .get_or_try_init(|| async { self.resolver.previous_tag().await })
            .await?;

        Ok(tag.clone())
    }
}
