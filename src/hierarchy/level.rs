//! The fixed containment hierarchy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidatorError;

/// One node type in the 7-level containment tree.
///
/// The derived `Ord` follows the canonical top-down order, so sorted
/// collections keyed by level iterate root-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Group,
    Project,
    Subject,
    Session,
    Acquisition,
    Analysis,
    File,
}

impl HierarchyLevel {
    /// Canonical top-down order. Fixed, never reordered.
    pub const ORDER: [HierarchyLevel; 7] = [
        HierarchyLevel::Group,
        HierarchyLevel::Project,
        HierarchyLevel::Subject,
        HierarchyLevel::Session,
        HierarchyLevel::Acquisition,
        HierarchyLevel::Analysis,
        HierarchyLevel::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyLevel::Group => "group",
            HierarchyLevel::Project => "project",
            HierarchyLevel::Subject => "subject",
            HierarchyLevel::Session => "session",
            HierarchyLevel::Acquisition => "acquisition",
            HierarchyLevel::Analysis => "analysis",
            HierarchyLevel::File => "file",
        }
    }

    pub fn is_file(self) -> bool {
        self == HierarchyLevel::File
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HierarchyLevel {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HierarchyLevel::ORDER
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ValidatorError::InvalidHierarchyLocation(s.to_string()))
    }
}
