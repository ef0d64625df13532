#![deny(missing_docs)]

//! # Document Loading
//!
//! The minimal "load document by locator" contract the resolver depends on
//! for external references, plus the default filesystem implementation and
//! document-text parsing helpers.
//!
//! The default loader is local-only: any locator carrying a scheme, host, or
//! query is rejected. Callers with custom fetch policies substitute their own
//! `DocumentLoader` via `Resolver::with_loader`.

use crate::error::{ResolveError, ResolveResult};
use crate::models::Document;
use std::fs;
use std::path::Path;
use url::Url;

/// The document part of a reference string, pre-split from the fragment.
///
/// Scheme-carrying locators parse into an absolute [`Url`]; scheme-less
/// locators are plain filesystem paths.
#[derive(Debug, Clone)]
pub struct DocumentLocation {
    url: Option<Url>,
    raw: String,
}

impl DocumentLocation {
    /// Parses a locator string. `reference` is the full reference it was
    /// split from, used only for error reporting.
    pub fn parse(raw: &str, reference: &str) -> ResolveResult<Self> {
        match Url::parse(raw) {
            Ok(url) => Ok(DocumentLocation {
                url: Some(url),
                raw: raw.to_string(),
            }),
            // No scheme: treat as a plain (relative) path.
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(DocumentLocation {
                url: None,
                raw: raw.to_string(),
            }),
            Err(err) => Err(ResolveError::MalformedRefUri {
                reference: reference.to_string(),
                detail: err.to_string(),
            }),
        }
    }

    /// Builds a location from a bare filesystem path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        DocumentLocation {
            url: None,
            raw: path.as_ref().to_string_lossy().into_owned(),
        }
    }

    /// The parsed URL form, when the locator carries a scheme.
    pub fn as_url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// The raw locator text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this location is a bare path with no scheme, host, or query.
    pub fn is_plain_path(&self) -> bool {
        self.url.is_none()
    }
}

/// The loader contract consumed by the resolver when it follows an external
/// reference. Implementations fetch and deserialize one document per call.
pub trait DocumentLoader {
    /// Loads and deserializes the document at `location`.
    fn load(&self, location: &DocumentLocation) -> ResolveResult<Document>;
}

/// The default, local-only document loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl DocumentLoader for FsLoader {
    fn load(&self, location: &DocumentLocation) -> ResolveResult<Document> {
        if !location.is_plain_path() {
            return Err(ResolveError::UnsupportedLocation(
                location.as_str().to_string(),
            ));
        }
        let data = fs::read_to_string(location.as_str())?;
        parse_document(&data)
    }
}

/// Deserializes document text into a [`Document`].
///
/// Accepts YAML or JSON (JSON is a YAML subset).
pub fn parse_document(data: &str) -> ResolveResult<Document> {
    let document: Document = serde_yaml::from_str(data)?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_location_parse_relative_path() {
        let loc = DocumentLocation::parse("other.json", "other.json#/components/schemas/X")
            .unwrap();
        assert!(loc.is_plain_path());
        assert_eq!(loc.as_str(), "other.json");
    }

    #[test]
    fn test_location_parse_absolute_url() {
        let loc = DocumentLocation::parse(
            "https://example.com/doc.yaml",
            "https://example.com/doc.yaml#/components/schemas/X",
        )
        .unwrap();
        assert!(!loc.is_plain_path());
        assert_eq!(loc.as_url().unwrap().scheme(), "https");
    }

    #[test]
    fn test_location_parse_malformed() {
        let err = DocumentLocation::parse("http://[bad", "http://[bad#/x").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedRefUri { .. }));
    }

    #[test]
    fn test_fs_loader_rejects_remote_location() {
        let loc = DocumentLocation::parse("https://example.com/doc.yaml", "").unwrap();
        let err = FsLoader.load(&loc).unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedLocation(_)));
    }

    #[test]
    fn test_fs_loader_missing_file() {
        let loc = DocumentLocation::from_path("/nonexistent/doc.yaml");
        let err = FsLoader.load(&loc).unwrap_err();
        assert!(matches!(err, ResolveError::Io(_)));
    }

    #[test]
    fn test_fs_loader_reads_and_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "openapi: 3.0.0\ncomponents:\n  schemas:\n    X:\n      type: string\n"
        )
        .unwrap();
        let loc = DocumentLocation::from_path(file.path());
        let doc = FsLoader.load(&loc).unwrap();
        assert!(doc.components.schemas.contains_key("X"));
    }

    #[test]
    fn test_parse_document_accepts_json() {
        let doc = parse_document(r#"{"openapi": "3.0.0", "paths": {}}"#).unwrap();
        assert_eq!(doc.openapi, "3.0.0");
    }

    #[test]
    fn test_parse_document_malformed() {
        let err = parse_document(": not yaml: [").unwrap_err();
        assert!(matches!(err, ResolveError::Deserialize(_)));
    }
}
