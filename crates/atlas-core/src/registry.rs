//! Ordered collection of declared releases

use serde::{Deserialize, Serialize};

use crate::config::ReleaseSpec;
use crate::error::{CoreError, Result};

/// Releases in declaration order
///
/// Lookups hand out copies: overriding fields on a looked-up release never
/// changes what the registry holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseRegistry {
    releases: Vec<ReleaseSpec>,
}

impl ReleaseRegistry {
    pub fn new(releases: Vec<ReleaseSpec>) -> Self {
        Self { releases }
    }

    /// Get a copy of the release with the given name
    pub fn release_by_name(&self, name: &str) -> Result<ReleaseSpec> {
        self.releases
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| CoreError::ReleaseNotFound {
                name: name.to_string(),
            })
    }

    /// All releases, in declaration order
    pub fn all_releases(&self) -> &[ReleaseSpec] {
        &self.releases
    }

    /// Copies of the named releases, in the order requested
    ///
    /// Fails on the first name that is not declared.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ReleaseSpec>> {
        names
            .iter()
            .map(|name| self.release_by_name(name.as_ref()))
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.releases.iter().any(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
