//! Ancestor-chain resolution with bounded retry.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::client::{Container, ContainerClient};
use super::level::HierarchyLevel;
use crate::errors::ValidatorError;
use crate::reference::Reference;

/// How many times a single-level fetch is attempted, and the pause between
/// attempts. A freshly created container may not be visible to readers yet;
/// the retry only covers that window, with no backoff growth.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// The resolved ancestor containers of a reference, keyed by level.
///
/// Keys are always a subsequence of the canonical order; absent levels are
/// omitted, never stored as empty containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyChain {
    containers: BTreeMap<HierarchyLevel, Container>,
}

impl HierarchyChain {
    pub fn insert(&mut self, level: HierarchyLevel, container: Container) {
        self.containers.insert(level, container);
    }

    pub fn get(&self, level: HierarchyLevel) -> Option<&Container> {
        self.containers.get(&level)
    }

    pub fn contains(&self, level: HierarchyLevel) -> bool {
        self.containers.contains_key(&level)
    }

    pub fn levels(&self) -> impl Iterator<Item = HierarchyLevel> + '_ {
        self.containers.keys().copied()
    }

    /// The deepest ancestor strictly above the given level.
    pub fn parent_of(&self, level: HierarchyLevel) -> Option<(HierarchyLevel, &Container)> {
        self.containers
            .range(..level)
            .next_back()
            .map(|(lvl, container)| (*lvl, container))
    }

    /// Builds the `fw://` display path, walking the canonical order and
    /// stopping once `stop` is reached (or at the end of the chain). The
    /// file level contributes its name instead of a label.
    pub fn lookup_path(&self, stop: Option<HierarchyLevel>) -> String {
        let mut parts = Vec::new();
        for level in HierarchyLevel::ORDER {
            if let Some(container) = self.get(level) {
                parts.push(container.display_label(level).to_string());
            }
            if Some(level) == stop {
                break;
            }
        }
        format!("fw://{}", parts.join("/"))
    }

    /// The chain as a JSON object keyed by level name, which is what
    /// hierarchy-metadata validation runs the schema against.
    pub fn to_document(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (level, container) in &self.containers {
            let json = serde_json::to_value(container).unwrap_or(Value::Null);
            object.insert(level.as_str().to_string(), json);
        }
        Value::Object(object)
    }
}

/// Resolves the ancestor chain for a reference, tolerating short-lived
/// read-after-write inconsistency in the backing store.
pub struct HierarchyResolver<'a, C: ContainerClient> {
    client: &'a C,
    retry: RetryPolicy,
}

impl<'a, C: ContainerClient> HierarchyResolver<'a, C> {
    pub fn new(client: &'a C, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetches the leaf object, then each present ancestor, leaf-to-root
    /// ids but one explicit fetch per level. Null parent entries are
    /// dropped before any fetch happens.
    pub fn resolve(&self, reference: &Reference) -> Result<HierarchyChain, ValidatorError> {
        debug!(
            id = reference.id(),
            level = %reference.level(),
            "resolving hierarchy chain"
        );
        let leaf = self.fetch_with_retry(reference.level(), reference.id())?;

        let mut chain = HierarchyChain::default();
        for (level, id) in leaf.present_parents() {
            if level == reference.level() {
                continue;
            }
            let ancestor = self.fetch_with_retry(level, &id)?;
            chain.insert(level, ancestor);
        }
        chain.insert(reference.level(), leaf);
        Ok(chain)
    }

    /// One bounded-retry fetch. Empty results are retried with a fixed
    /// delay; explicit client errors propagate immediately.
    fn fetch_with_retry(
        &self,
        level: HierarchyLevel,
        id: &str,
    ) -> Result<Container, ValidatorError> {
        let attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=attempts {
            let fetched = if level.is_file() {
                self.client.fetch_file(id)
            } else {
                self.client.fetch(level, id)
            };
            match fetched {
                Ok(Some(container)) => return Ok(container),
                Ok(None) => {
                    debug!(
                        %level,
                        id,
                        attempt,
                        max_attempts = attempts,
                        "container not visible yet"
                    );
                    if attempt < attempts {
                        thread::sleep(self.retry.delay);
                    }
                }
                Err(cause) => {
                    return Err(ValidatorError::Client {
                        level,
                        id: id.to_string(),
                        cause,
                    });
                }
            }
        }
        Err(ValidatorError::Resolution {
            level,
            id: id.to_string(),
            attempts,
        })
    }
}
