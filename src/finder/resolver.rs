//! Tag resolution: mapping an upgrade's version strings onto the most
//! plausible tag names in the source repository.
//!
//! Registry versions rarely equal tag names verbatim. Repositories prefix
//! tags ("v1.2.3"), monorepos prefix them with package names
//! ("mylib-v1.2.3"), and git-sourced dependencies skip tags entirely in
//! favor of refs. The resolver works from the repository's full tag list,
//! fetched once per instance.
use log::*;
use regex::Regex;
use semver::Version;
use tokio::sync::OnceCell;

use crate::{
    dependency::{Dependency, Requirement},
    error::{BumplogError, Result},
    source::Source,
    tags::TagLister,
    version::VersionScheme,
};

const GIT_SOURCE_TYPE: &str = "git";
const COMPOSER_PACKAGE_MANAGER: &str = "composer";

/// Selects the tag names bracketing a dependency upgrade.
pub struct TagResolver {
    dependency: Dependency,
    source: Option<Source>,
    lister: Box<dyn TagLister>,
    tags: OnceCell<Vec<String>>,
}

impl TagResolver {
    pub fn new(
        dependency: Dependency,
        source: Option<Source>,
        lister: Box<dyn TagLister>,
    ) -> Self {
        Self {
            dependency,
            source,
            lister,
            tags: OnceCell::new(),
        }
    }

    /// Tag representing the upgraded state.
    ///
    /// Git-sourced dependencies use the version string directly, since for
    /// them it already names a ref or sha. Composer is the exception: that
    /// ecosystem resolves its own tags, so its versions always go through
    /// tag matching. Everything else is matched against the repository's
    /// tag list.
    pub async fn new_tag(&self) -> Result<Option<String>> {
        let git_sourced = self.git_sourced(&self.dependency.requirements)?;

        let version = match non_blank(self.dependency.version.as_deref()) {
            Some(version) => version,
            None => return Ok(None),
        };

        if git_sourced
            && self.dependency.package_manager != COMPOSER_PACKAGE_MANAGER
        {
            return Ok(Some(version.to_string()));
        }

        self.tag_matching(version).await
    }

    /// Tag representing the state before the upgrade.
    ///
    /// Priority order: a git-sourced previous version verbatim, then the
    /// declared git ref, then tag matching on the previous version, and
    /// finally the lowest tag satisfying the previous constraints when no
    /// previous version is known at all.
    pub async fn previous_tag(&self) -> Result<Option<String>> {
        let git_sourced =
            self.git_sourced(&self.dependency.previous_requirements)?;
        let previous_version =
            non_blank(self.dependency.previous_version.as_deref());

        match (git_sourced, previous_version) {
            (true, Some(version)) => Ok(Some(version.to_string())),
            (true, None) => Ok(self.previous_ref()),
            (false, Some(version)) => self.tag_matching(version).await,
            (false, None) => self.lowest_tag_satisfying_previous().await,
        }
    }

    /// Whether every requirement that declares a source declares the git
    /// type. Requirements without a source record are ignored; a set mixing
    /// distinct source types is malformed metadata and propagates as a
    /// fatal error rather than being guessed around.
    fn git_sourced(&self, requirements: &[Requirement]) -> Result<bool> {
        let mut kinds: Vec<String> = requirements
            .iter()
            .filter_map(|req| req.source.as_ref())
            .map(|source| source.kind.clone())
            .collect();
        kinds.sort();
        kinds.dedup();

        match kinds.len() {
            0 => Ok(false),
            1 => Ok(kinds[0] == GIT_SOURCE_TYPE),
            _ => Err(BumplogError::mixed_sources(
                &self.dependency.name,
                kinds,
            )),
        }
    }

    /// First non-empty ref declared by the previous requirements' sources.
    fn previous_ref(&self) -> Option<String> {
        self.dependency
            .previous_requirements
            .iter()
            .filter_map(|req| req.source.as_ref())
            .filter_map(|source| source.reference.as_deref())
            .find(|reference| !reference.is_empty())
            .map(str::to_string)
    }

    /// Match `version` against the tag list and pick the best candidate:
    /// shortest first, with tags containing the dependency name winning
    /// over plain prefixes.
    async fn tag_matching(&self, version: &str) -> Result<Option<String>> {
        let matcher = version_anchor(version)?;
        let tags = self.tags().await?;

        let mut candidates: Vec<String> = tags
            .iter()
            .filter(|tag| matcher.is_match(tag))
            .cloned()
            .collect();
        candidates.sort_by_key(String::len);

        let selected =
            prefer_name_match(&candidates, &self.dependency.name);
        debug!("tag matching {} selected {:?}", version, selected);

        Ok(selected)
    }

    /// Fallback when no previous version is known: the lowest tag whose
    /// parsed version satisfies every previous constraint.
    async fn lowest_tag_satisfying_previous(
        &self,
    ) -> Result<Option<String>> {
        let scheme = VersionScheme::for_package_manager(
            &self.dependency.package_manager,
        );
        let tags = self.tags().await?;

        let mut candidates: Vec<(Version, &String)> = tags
            .iter()
            .filter_map(|tag| {
                scheme.version_from_tag(tag).map(|version| (version, tag))
            })
            .filter(|(version, _)| self.previous_satisfied(scheme, version))
            .collect();
        candidates.sort_by(
            |(left_version, left_tag), (right_version, right_tag)| {
                left_version
                    .cmp(right_version)
                    .then_with(|| left_tag.len().cmp(&right_tag.len()))
            },
        );

        let ordered: Vec<String> = candidates
            .into_iter()
            .map(|(_, tag)| tag.clone())
            .collect();

        Ok(prefer_name_match(&ordered, &self.dependency.name))
    }

    fn previous_satisfied(
        &self,
        scheme: VersionScheme,
        version: &Version,
    ) -> bool {
        self.dependency.previous_requirements.iter().all(|req| {
            match req.constraint.as_deref() {
                Some(constraint) => scheme.satisfies(constraint, version),
                None => true,
            }
        })
    }

    /// Repository tag names, fetched once per resolver and shared by both
    /// resolutions. An unreachable repository degrades to an empty list;
    /// private and deleted repos are routine, not exceptional.
    async fn tags(&self) -> Result<&Vec<String>> {
        self.tags
            .get_or_try_init(|| async {
                let source = match self.source.as_ref() {
                    Some(source) => source,
                    None => return Ok(vec![]),
                };

                match self.lister.list_tags(&source.url).await {
                    Ok(tags) => Ok(tags
                        .into_iter()
                        .map(|tag| tag.name)
                        .collect::<Vec<String>>()),
                    Err(BumplogError::Unreachable(message)) => {
                        warn!(
                            "listing tags for {} failed, treating as \
                             untagged: {}",
                            source.url, message
                        );
                        Ok(vec![])
                    }
                    Err(err) => Err(err),
                }
            })
            .await
    }
}

/// Version strings that are empty or whitespace-only count as absent;
/// an anchor pattern built from one would match nearly any tag.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Pattern anchoring `version` at the end of a tag name. The preceding
/// character must not be a digit or dot, so version "1.10" matches tag
/// "v1.10" but not tag "2.1.10".
fn version_anchor(version: &str) -> Result<Regex> {
    let pattern = format!(r"(?:[^0-9.]|\A){}\z", regex::escape(version));
    Ok(Regex::new(&pattern)?)
}

/// First candidate containing the dependency name, else the first
/// candidate. Callers sort candidates into preference order beforehand.
fn prefer_name_match(candidates: &[String], name: &str) -> Option<String> {
    candidates
        .iter()
        .find(|tag| tag.contains(name))
        .or_else(|| candidates.first())
        .cloned()
}
