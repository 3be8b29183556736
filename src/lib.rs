//! Resolve the tag pair and commit range behind a dependency upgrade.
//!
//! Given a dependency's previous and new versions plus its source
//! repository, [`CommitsFinder`] selects the tags bracketing the upgrade
//! and returns the commits between them, normalized across GitHub, GitLab,
//! and Bitbucket, along with a human-facing compare URL.

pub mod clients;
pub mod credentials;
pub mod dependency;
pub mod error;
pub mod finder;
pub mod source;
pub mod tags;
pub mod version;

pub use credentials::Credential;
pub use dependency::{
    Dependency, DependencyBuilder, Requirement, RequirementSource,
};
pub use error::{BumplogError, Result};
pub use finder::{CommitSummary, CommitsFinder};
pub use source::{Provider, Source};

#[cfg(test)]
pub mod test_helpers;
