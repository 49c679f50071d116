//! The remote-container capability consumed by the resolver.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::level::HierarchyLevel;

/// A container (or file) object fetched from the platform.
///
/// Files carry their id in `file_id` and their display text in `name`;
/// every other level uses `id` and `label`. Fields the validator does not
/// model are preserved in `extra` so hierarchy-metadata validation sees the
/// full object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parents: BTreeMap<HierarchyLevel, Option<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Container {
    /// The stable id for this container at the given level.
    pub fn container_id(&self, level: HierarchyLevel) -> Option<&str> {
        if level.is_file() {
            self.file_id.as_deref()
        } else {
            self.id.as_deref()
        }
    }

    /// The segment this container contributes to a lookup path.
    pub fn display_label(&self, level: HierarchyLevel) -> &str {
        let label = if level.is_file() {
            self.name.as_deref()
        } else {
            self.label.as_deref()
        };
        label.unwrap_or_default()
    }

    /// Ancestor ids in canonical order, with null entries dropped.
    pub fn present_parents(&self) -> Vec<(HierarchyLevel, String)> {
        self.parents
            .iter()
            .filter_map(|(level, id)| id.as_ref().map(|id| (*level, id.clone())))
            .collect()
    }
}

/// Capability to fetch one container by level and id.
///
/// `Ok(None)` means the container is not (yet) visible and may be retried;
/// `Err` is an explicit failure and is never retried.
pub trait ContainerClient {
    fn fetch(&self, level: HierarchyLevel, id: &str) -> Result<Option<Container>>;

    fn fetch_file(&self, id: &str) -> Result<Option<Container>>;
}
