//! Artifact naming compatibility
//!
//! A remote build publishes files such as `app-0.4.0.jar`. When a build
//! publishes our artifact under a different distribution, the patch chain
//! cannot continue: the launcher itself has to be upgraded.

use deltaboot_core::types::ArtifactConfig;

/// Result of checking one build's produced files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingCheck {
    /// Whether every artifact-like name matches our distribution
    pub compatible: bool,

    /// Names that belong to another distribution
    pub incompatible_names: Vec<String>,
}

/// Checks produced-artifact names against this launcher's distribution
#[derive(Debug, Clone)]
pub struct NamingChecker {
    prefix: String,
    distribution: String,
}

impl NamingChecker {
    pub fn new(artifact: &ArtifactConfig) -> Self {
        Self {
            prefix: format!("{}-", artifact.name),
            distribution: artifact.distribution.clone(),
        }
    }

    /// Check every produced name of a build
    ///
    /// Files that do not look like our artifact (logs, reports, the patch
    /// itself) are ignored.
    pub fn check<S: AsRef<str>>(&self, names: &[S]) -> NamingCheck {
        let incompatible_names: Vec<String> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| self.is_foreign(name))
            .map(|name| name.to_string())
            .collect();

        NamingCheck {
            compatible: incompatible_names.is_empty(),
            incompatible_names,
        }
    }

    fn is_foreign(&self, name: &str) -> bool {
        let file_name = name.rsplit('/').next().unwrap_or(name);
        let Some(rest) = file_name.strip_prefix(&self.prefix) else {
            return false;
        };

        match rest.strip_prefix(&self.distribution) {
            Some(tail) => !(tail.is_empty() || tail.starts_with('.') || tail.starts_with('-')),
            None => true,
        }
    }
}
