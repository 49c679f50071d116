//! Maps file extensions and declared content types to a supported encoding.

use std::path::Path;

use crate::errors::ValidatorError;

/// A content encoding the validation engine knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEncoding {
    Json,
    Csv,
}

impl FileEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            FileEncoding::Json => "json",
            FileEncoding::Csv => "csv",
        }
    }
}

const SUPPORTED_EXTENSIONS: &[(&str, FileEncoding)] =
    &[(".json", FileEncoding::Json), (".csv", FileEncoding::Csv)];

const SUPPORTED_CONTENT_TYPES: &[(&str, FileEncoding)] = &[
    ("application/json", FileEncoding::Json),
    ("text/csv", FileEncoding::Csv),
];

/// Extracts the dotted extension from a file name, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// Resolves an extension and/or declared content type to an encoding.
///
/// The extension takes precedence: content-type metadata from the platform
/// is sometimes stale or generic, while the extension is authoritative for
/// local files. The content type is only consulted when no extension is
/// present at all.
pub fn resolve_encoding(
    extension: Option<&str>,
    content_type: Option<&str>,
) -> Result<FileEncoding, ValidatorError> {
    let encoding = if let Some(ext) = extension {
        SUPPORTED_EXTENSIONS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, enc)| *enc)
    } else if let Some(declared) = content_type {
        SUPPORTED_CONTENT_TYPES
            .iter()
            .find(|(known, _)| *known == declared)
            .map(|(_, enc)| *enc)
    } else {
        None
    };

    encoding.ok_or_else(|| ValidatorError::UnsupportedFileType {
        extension: extension.unwrap_or_default().to_string(),
        content_type: content_type.unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_extension() {
        assert_eq!(
            resolve_encoding(Some(".json"), None).unwrap(),
            FileEncoding::Json
        );
        assert_eq!(
            resolve_encoding(Some(".csv"), None).unwrap(),
            FileEncoding::Csv
        );
    }

    #[test]
    fn test_resolve_by_content_type() {
        assert_eq!(
            resolve_encoding(None, Some("application/json")).unwrap(),
            FileEncoding::Json
        );
        assert_eq!(
            resolve_encoding(None, Some("text/csv")).unwrap(),
            FileEncoding::Csv
        );
    }

    #[test]
    fn test_extension_wins_over_content_type() {
        // A stale mimetype must not override a recognized extension.
        assert_eq!(
            resolve_encoding(Some(".csv"), Some("application/json")).unwrap(),
            FileEncoding::Csv
        );
    }

    #[test]
    fn test_unknown_extension_is_not_rescued_by_content_type() {
        // Extension precedence is strict: an unmapped extension fails even
        // when the declared content type would have matched.
        let err = resolve_encoding(Some(".yaml"), Some("application/json")).unwrap_err();
        assert!(matches!(err, ValidatorError::UnsupportedFileType { .. }));
    }

    #[test]
    fn test_nothing_supported() {
        let err = resolve_encoding(None, Some("image/png")).unwrap_err();
        assert!(err.to_string().contains("not supported"));
        assert!(resolve_encoding(None, None).is_err());
    }

    #[test]
    fn test_file_extension_helper() {
        assert_eq!(file_extension("data.json").as_deref(), Some(".json"));
        assert_eq!(file_extension("archive.tar.csv").as_deref(), Some(".csv"));
        assert_eq!(file_extension("no_extension"), None);
    }
}
