//! # Error Handling
//!
//! Provides the unified `ResolveError` enum used across the crate.
//!
//! Every resolution failure names the offending reference string so that a
//! broken `$ref` can be pinpointed in the source document.

use derive_more::{Display, From};

/// The resolution error taxonomy.
///
/// We use `derive_more` for boilerplate. `Io` and `Deserialize` are the two
/// legs of a document-loader failure; everything else originates in the
/// locator or the per-kind resolvers.
#[derive(Debug, Display, From)]
pub enum ResolveError {
    /// A reference targets another document while external references are disabled.
    #[from(ignore)]
    #[display("Encountered disallowed external reference: '{_0}'")]
    DisallowedExternalRef(String),

    /// The document part of an external reference is not parseable as a URI.
    #[from(ignore)]
    #[display("Cannot parse reference as URI: '{reference}': {detail}")]
    MalformedRefUri {
        /// The full offending reference string.
        reference: String,
        /// Parser diagnostic for the locator part.
        detail: String,
    },

    /// The fragment does not start with the expected component-table prefix.
    #[from(ignore)]
    #[display("Failed to resolve fragment in reference: '{_0}'")]
    UnresolvableFragment(String),

    /// The identifier is missing from the target table or carries extra path segments.
    #[from(ignore)]
    #[display("Failed to resolve '{part}' in fragment in reference: '{reference}'")]
    UnresolvableFragmentPart {
        /// The full offending reference string.
        reference: String,
        /// The identifier (or table name) that failed to resolve.
        part: String,
    },

    /// The default loader was handed a location it does not support.
    #[from(ignore)]
    #[display("Unsupported document location: '{_0}'")]
    UnsupportedLocation(String),

    /// Wrapper for standard IO errors raised while reading a document.
    #[display("Failed to read document: {_0}")]
    Io(std::io::Error),

    /// The document text could not be deserialized.
    #[display("Failed to deserialize document: {_0}")]
    Deserialize(serde_yaml::Error),

    /// A loader failure encountered while following an external reference.
    #[from(ignore)]
    #[display("Error while resolving reference '{reference}': {source}")]
    Loader {
        /// The external reference whose document failed to load.
        reference: String,
        /// The underlying loader failure, propagated unchanged.
        source: Box<ResolveError>,
    },
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for ResolveError {}

/// Helper type alias for Result using ResolveError.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ResolveError = io_err.into();
        assert!(matches!(err, ResolveError::Io(_)));
    }

    #[test]
    fn test_display_names_reference() {
        let err = ResolveError::UnresolvableFragmentPart {
            reference: "#/components/schemas/a/b".to_string(),
            part: "a/b".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Failed to resolve 'a/b' in fragment in reference: '#/components/schemas/a/b'"
        );
    }

    #[test]
    fn test_loader_wrapper_display() {
        let inner = ResolveError::UnsupportedLocation("http://example.com/doc.yaml".to_string());
        let err = ResolveError::Loader {
            reference: "http://example.com/doc.yaml#/components/schemas/X".to_string(),
            source: Box::new(inner),
        };
        let rendered = format!("{}", err);
        assert!(rendered.contains("Error while resolving reference"));
        assert!(rendered.contains("Unsupported document location"));
    }
}
