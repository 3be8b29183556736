//! Lenient version parsing and requirement evaluation across ecosystems.
//!
//! Registry version strings are only loosely semver: short forms like "1.2"
//! are everywhere, and constraint spellings differ per ecosystem ("~> 1.4"
//! in rubygems, "==1.0" in pip). This module normalizes those dialects onto
//! the `semver` crate rather than reimplementing each ecosystem's grammar.
use regex::Regex;
use semver::{Version, VersionReq};
use std::sync::LazyLock;

static LEADING_NON_DIGITS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\D*").unwrap());

/// Constraint dialect selected by package-manager key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionScheme {
    /// Rubygems-style constraints ("~> 1.2").
    Rubygems,
    /// PEP 440 style constraints ("==1.0", "~=1.4").
    Pep440,
    /// Semver-style constraints, the default.
    Semver,
}

impl VersionScheme {
    /// Select the dialect for an ecosystem key. Unknown keys get the semver
    /// dialect, which covers the cargo/npm/go family.
    pub fn for_package_manager(key: &str) -> Self {
        match key {
            "bundler" => Self::Rubygems,
            "pip" | "uv" => Self::Pep440,
            _ => Self::Semver,
        }
    }

    /// Lenient version parse: strict semver first, then a zero-padding retry
    /// for short numeric forms ("1.2" -> "1.2.0"). Anything else is a parse
    /// failure, not an error.
    pub fn parse_version(&self, raw: &str) -> Option<Version> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(version) = Version::parse(trimmed) {
            return Some(version);
        }
        pad_numeric_components(trimmed)
    }

    /// Parse a version out of a tag name by stripping the leading non-digit
    /// run ("release-v1.2.3" -> "1.2.3") and lenient-parsing the remainder.
    pub fn version_from_tag(&self, tag: &str) -> Option<Version> {
        let stripped = LEADING_NON_DIGITS_REGEX.replace(tag, "");
        self.parse_version(&stripped)
    }

    /// Whether `version` satisfies the constraint expression. Blank
    /// constraints are vacuously satisfied. Union alternatives (`||` or the
    /// composer-style single `|`) are any-of. Constraints that do not parse
    /// satisfy nothing.
    pub fn satisfies(&self, constraint: &str, version: &Version) -> bool {
        let trimmed = constraint.trim();
        if trimmed.is_empty() {
            return true;
        }

        trimmed
            .split('|')
            .filter(|alt| !alt.trim().is_empty())
            .any(|alt| match self.parse_requirement(alt) {
                Some(req) => req.matches(version),
                None => false,
            })
    }

    fn parse_requirement(&self, raw: &str) -> Option<VersionReq> {
        let normalized = raw
            .split(',')
            .map(|part| self.normalize_comparator(part.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        VersionReq::parse(&normalized).ok()
    }

    fn normalize_comparator(&self, part: &str) -> String {
        match self {
            Self::Rubygems => match part.strip_prefix("~>") {
                Some(rest) => pessimistic_to_semver(rest),
                None => part.to_string(),
            },
            Self::Pep440 => {
                if let Some(rest) = part.strip_prefix("~=") {
                    pessimistic_to_semver(rest)
                } else if let Some(rest) = part.strip_prefix("==") {
                    format!("={}", rest)
                } else {
                    part.to_string()
                }
            }
            Self::Semver => part.to_string(),
        }
    }
}

// A pessimistic constraint varies the last given component: "~> 1.4" allows
// up to (but not) 2.0 while "~> 1.4.2" allows up to 1.5. Semver's tilde only
// expresses the three-component form; the shorter forms map to caret.
fn pessimistic_to_semver(rest: &str) -> String {
    let rest = rest.trim();
    if rest.split('.').count() >= 3 {
        format!("~{}", rest)
    } else {
        format!("^{}", rest)
    }
}

fn pad_numeric_components(raw: &str) -> Option<Version> {
    let parts: Vec<&str> = raw.split('.').collect();
    let numeric = parts
        .iter()
        .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    if !numeric {
        return None;
    }

    let padded = match parts.len() {
        1 => format!("{}.0.0", raw),
        2 => format!("{}.0", raw),
        _ => return None,
    };

    Version::parse(&padded).ok()
}
