//! Dependency metadata types describing a version upgrade.
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Origin declared by a requirement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSource {
    /// Source type, e.g. "git" or "registry".
    #[serde(rename = "type")]
    pub kind: String,
    /// Git ref (branch or tag) the requirement pins, when git-sourced.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// One requirement record constraining the dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Constraint expression, e.g. ">= 1.0, < 2.0". Absent means
    /// unconstrained.
    pub constraint: Option<String>,
    /// Manifest file the requirement came from.
    pub file: Option<String>,
    /// Source sub-record when the requirement declares a concrete origin.
    pub source: Option<RequirementSource>,
}

/// A dependency being upgraded from one state to another.
///
/// `requirements`/`version` describe the new state,
/// `previous_requirements`/`previous_version` the state before the upgrade.
/// Either version string may be absent: git-sourced dependencies often carry
/// only refs, and freshly added dependencies have no previous state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Builder)]
#[serde(default)]
#[builder(setter(into, strip_option), default)]
pub struct Dependency {
    /// Package name as the ecosystem spells it.
    pub name: String,
    /// Version after the upgrade, when known.
    pub version: Option<String>,
    /// Version before the upgrade, when known.
    pub previous_version: Option<String>,
    /// Requirement records for the new state.
    pub requirements: Vec<Requirement>,
    /// Requirement records for the previous state.
    pub previous_requirements: Vec<Requirement>,
    /// Ecosystem key selecting the version dialect (e.g. "cargo",
    /// "npm_and_yarn").
    pub package_manager: String,
}
