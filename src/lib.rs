#![deny(missing_docs)]

//! # OAS Resolver
//!
//! Reference-resolution engine for OpenAPI documents.
//!
//! A deserialized document arrives with `$ref` indirections; one call to
//! [`Resolver::resolve`] flattens every reference chain in place, so that
//! afterwards every reachable [`Ref`] slot carries a concrete value — even
//! through ref→ref chains, shared targets, and cyclic schemas.
//!
//! ```no_run
//! use oas_resolver::Resolver;
//!
//! # fn main() -> oas_resolver::ResolveResult<()> {
//! let resolver = Resolver::new();
//! let doc = resolver.load_from_file("openapi.yaml")?;
//! let pet = doc.components.schemas.get("Pet").unwrap();
//! assert!(pet.is_resolved());
//! # Ok(())
//! # }
//! ```

/// Shared error types.
pub mod error;

/// Document loading contract and default filesystem loader.
pub mod loader;

/// OpenAPI document model.
pub mod models;

/// Reference slot type and node identity.
pub mod refs;

/// The resolution engine.
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use loader::{parse_document, DocumentLoader, DocumentLocation, FsLoader};
pub use models::{
    Components, Document, Example, ExampleRef, Header, HeaderRef, Info, MediaType, Operation,
    Parameter, ParameterRef, PathItem, RequestBody, RequestBodyRef, Response, ResponseRef, Schema,
    SchemaRef, SecurityScheme, SecuritySchemeRef,
};
pub use refs::{NodeId, Ref};
pub use resolver::{Resolver, VisitState};
