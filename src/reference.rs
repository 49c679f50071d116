//! The validation target: what is being validated, and in which mode.

use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::errors::ValidatorError;
use crate::filetype::{self, FileEncoding};
use crate::hierarchy::{Container, ContainerClient, HierarchyChain, HierarchyLevel, HierarchyResolver};

/// What a reference points the validator at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Validate the contents of a local file.
    FileContent,
    /// Validate the resolved hierarchy objects themselves.
    HierarchyMetadata,
}

/// Identifies one validation target for one run.
///
/// Construction validates the mode invariants up front, so an invalid
/// half-built reference never circulates. The hierarchy chain is resolved
/// at most once and cached for the lifetime of the reference.
#[derive(Debug)]
pub struct Reference {
    id: String,
    level: HierarchyLevel,
    mode: ContentMode,
    file_name: Option<String>,
    file_path: Option<PathBuf>,
    content_type: Option<String>,
    chain: OnceCell<HierarchyChain>,
}

impl Reference {
    /// A reference to a local file whose contents will be validated.
    pub fn file_content(
        id: impl Into<String>,
        file_path: impl Into<PathBuf>,
        content_type: Option<String>,
    ) -> Result<Self, ValidatorError> {
        let file_path: PathBuf = file_path.into();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let reference = Self {
            id: id.into(),
            level: HierarchyLevel::File,
            mode: ContentMode::FileContent,
            file_name,
            file_path: Some(file_path),
            content_type,
            chain: OnceCell::new(),
        };
        reference.check_invariants()?;
        Ok(reference)
    }

    /// A reference to a container whose hierarchy metadata will be validated.
    pub fn hierarchy_metadata(
        id: impl Into<String>,
        level: HierarchyLevel,
    ) -> Result<Self, ValidatorError> {
        let reference = Self {
            id: id.into(),
            level,
            mode: ContentMode::HierarchyMetadata,
            file_name: None,
            file_path: None,
            content_type: None,
            chain: OnceCell::new(),
        };
        reference.check_invariants()?;
        Ok(reference)
    }

    fn check_invariants(&self) -> Result<(), ValidatorError> {
        if self.id.is_empty() {
            return Err(ValidatorError::InvalidReference(
                "reference id must not be empty".to_string(),
            ));
        }
        if self.mode == ContentMode::FileContent {
            let Some(path) = self.file_path.as_deref() else {
                return Err(ValidatorError::InvalidReference(
                    "file-content mode requires a file path".to_string(),
                ));
            };
            if !path.exists() {
                return Err(ValidatorError::InvalidReference(format!(
                    "file {} does not exist",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> HierarchyLevel {
        self.level
    }

    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The dotted extension of the file name, if any.
    pub fn file_extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(filetype::file_extension)
    }

    /// The content encoding for this reference's file.
    pub fn encoding(&self) -> Result<FileEncoding, ValidatorError> {
        let extension = self.file_extension();
        filetype::resolve_encoding(extension.as_deref(), self.content_type())
    }

    /// The resolved ancestor chain, computed on first access and cached for
    /// every later one. There is no invalidation path other than dropping
    /// the reference.
    pub fn hierarchy<C: ContainerClient>(
        &self,
        resolver: &HierarchyResolver<'_, C>,
    ) -> Result<&HierarchyChain, ValidatorError> {
        self.chain.get_or_try_init(|| resolver.resolve(self))
    }

    /// The level of this reference's direct parent: the deepest resolved
    /// ancestor above it. `None` until the chain has been resolved, or when
    /// the reference sits at the top of its chain.
    pub fn parent_level(&self) -> Option<HierarchyLevel> {
        self.resolved_parent().map(|(level, _)| level)
    }

    /// The id of the direct parent container. `None` under the same
    /// conditions as [`Self::parent_level`].
    pub fn parent_id(&self) -> Option<&str> {
        self.resolved_parent()
            .and_then(|(level, container)| container.container_id(level))
    }

    fn resolved_parent(&self) -> Option<(HierarchyLevel, &Container)> {
        self.chain
            .get()
            .and_then(|chain| chain.parent_of(self.level))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::hierarchy::RetryPolicy;

    #[test]
    fn test_file_content_requires_existing_path() {
        let err = Reference::file_content("f1", "does/not/exist.json", None).unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidReference(_)));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, "{}").unwrap();
        let reference = Reference::file_content("f1", &path, None).unwrap();
        assert_eq!(reference.mode(), ContentMode::FileContent);
        assert_eq!(reference.level(), HierarchyLevel::File);
        assert_eq!(reference.file_name(), Some("input.json"));
    }

    #[test]
    fn test_hierarchy_metadata_requires_id() {
        assert!(Reference::hierarchy_metadata("", HierarchyLevel::Session).is_err());
        for level in HierarchyLevel::ORDER {
            assert!(Reference::hierarchy_metadata("some_id", level).is_ok());
        }
    }

    #[test]
    fn test_encoding_from_extension_and_content_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "a,b\n").unwrap();
        let reference = Reference::file_content("f1", &path, None).unwrap();
        assert_eq!(reference.file_extension().as_deref(), Some(".csv"));
        assert_eq!(reference.encoding().unwrap(), FileEncoding::Csv);

        let bare = dir.path().join("payload");
        fs::write(&bare, "{}").unwrap();
        let reference =
            Reference::file_content("f2", &bare, Some("application/json".into())).unwrap();
        assert_eq!(reference.encoding().unwrap(), FileEncoding::Json);
    }

    #[test]
    fn test_parent_accessors_follow_the_resolved_chain() {
        use std::collections::HashMap;

        struct MapClient {
            containers: HashMap<(HierarchyLevel, String), Container>,
        }
        impl ContainerClient for MapClient {
            fn fetch(
                &self,
                level: HierarchyLevel,
                id: &str,
            ) -> anyhow::Result<Option<Container>> {
                Ok(self.containers.get(&(level, id.to_string())).cloned())
            }
            fn fetch_file(&self, id: &str) -> anyhow::Result<Option<Container>> {
                self.fetch(HierarchyLevel::File, id)
            }
        }

        let plain = |id: &str| Container {
            id: Some(id.to_string()),
            ..Container::default()
        };
        let mut session = plain("s1");
        session
            .parents
            .insert(HierarchyLevel::Group, Some("g1".into()));
        session
            .parents
            .insert(HierarchyLevel::Project, Some("p1".into()));

        let mut containers = HashMap::new();
        containers.insert((HierarchyLevel::Group, "g1".to_string()), plain("g1"));
        containers.insert((HierarchyLevel::Project, "p1".to_string()), plain("p1"));
        containers.insert((HierarchyLevel::Session, "s1".to_string()), session);
        let client = MapClient { containers };

        let reference = Reference::hierarchy_metadata("s1", HierarchyLevel::Session).unwrap();
        // Nothing to report until the chain has been resolved.
        assert_eq!(reference.parent_level(), None);
        assert_eq!(reference.parent_id(), None);

        let resolver =
            HierarchyResolver::new(&client, RetryPolicy::new(2, Duration::from_millis(1)));
        reference.hierarchy(&resolver).unwrap();

        // No subject in the chain, so the project is the direct parent.
        assert_eq!(reference.parent_level(), Some(HierarchyLevel::Project));
        assert_eq!(reference.parent_id(), Some("p1"));
    }

    #[test]
    fn test_hierarchy_is_resolved_once() {
        use std::cell::Cell;

        struct CountingClient {
            fetches: Cell<u32>,
        }
        impl ContainerClient for CountingClient {
            fn fetch(
                &self,
                _: HierarchyLevel,
                id: &str,
            ) -> anyhow::Result<Option<Container>> {
                self.fetches.set(self.fetches.get() + 1);
                Ok(Some(Container {
                    id: Some(id.to_string()),
                    label: Some("the_subject".to_string()),
                    ..Container::default()
                }))
            }
            fn fetch_file(&self, _: &str) -> anyhow::Result<Option<Container>> {
                unreachable!("no file fetches for a container reference")
            }
        }

        let client = CountingClient {
            fetches: Cell::new(0),
        };
        let resolver =
            HierarchyResolver::new(&client, RetryPolicy::new(2, Duration::from_millis(1)));
        let reference = Reference::hierarchy_metadata("sub1", HierarchyLevel::Subject).unwrap();

        let first = reference.hierarchy(&resolver).unwrap().clone();
        let second = reference.hierarchy(&resolver).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(client.fetches.get(), 1);
    }
}
