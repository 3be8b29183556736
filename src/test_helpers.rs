//! Common test helper functions shared across test modules.
//!
//! These build the fixture values most tests need: a dependency upgrading
//! between two versions, a source on a given provider, and requirement
//! records with concrete source types.
use crate::{
    dependency::{Dependency, Requirement, RequirementSource},
    source::{Provider, Source},
};

/// Creates a test Dependency upgrading between the given versions.
///
/// # Example
/// ```ignore
/// let dep = create_test_dependency("business", Some("1.5.0"), Some("1.4.0"));
/// ```
pub fn create_test_dependency(
    name: &str,
    version: Option<&str>,
    previous_version: Option<&str>,
) -> Dependency {
    Dependency {
        name: name.to_string(),
        version: version.map(str::to_string),
        previous_version: previous_version.map(str::to_string),
        requirements: vec![],
        previous_requirements: vec![],
        package_manager: "bundler".to_string(),
    }
}

/// Creates a test Source for a provider key and repo slug.
///
/// # Example
/// ```ignore
/// let source = create_test_source("github", "gocardless/business");
/// ```
pub fn create_test_source(provider: &str, repo: &str) -> Source {
    let (provider, host) = match provider {
        "github" => (Provider::Github, "github.com"),
        "gitlab" => (Provider::Gitlab, "gitlab.com"),
        "bitbucket" => (Provider::Bitbucket, "bitbucket.org"),
        "azure" => (Provider::Azure, "dev.azure.com"),
        _ => (Provider::Other, "git.example.com"),
    };

    Source {
        provider,
        url: format!("https://{}/{}", host, repo),
        repo: repo.to_string(),
        directory: None,
    }
}

/// Creates a git-sourced requirement, optionally pinning a ref.
pub fn git_requirement(reference: Option<&str>) -> Requirement {
    Requirement {
        constraint: None,
        file: Some("Gemfile".to_string()),
        source: Some(RequirementSource {
            kind: "git".to_string(),
            reference: reference.map(str::to_string),
        }),
    }
}

/// Creates a registry-sourced requirement.
pub fn registry_requirement() -> Requirement {
    Requirement {
        constraint: Some(">= 0".to_string()),
        file: Some("Gemfile".to_string()),
        source: Some(RequirementSource {
            kind: "registry".to_string(),
            reference: None,
        }),
    }
}
