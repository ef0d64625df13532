#![deny(missing_docs)]

//! # Reference Resolution
//!
//! The resolution engine. A single top-level pass walks a document's
//! component tables and every operation's parameters, request body, and
//! responses, flattening `$ref` chains in place until every reachable slot
//! carries a concrete value.
//!
//! All seven component kinds share one structural algorithm
//! (guard → locate → lookup → recurse-into-target → recurse-into-value),
//! implemented once and parameterized by the [`ComponentKind`] trait.

use crate::error::{ResolveError, ResolveResult};
use crate::loader::{parse_document, DocumentLoader, DocumentLocation, FsLoader};
use crate::models::{
    Components, Document, Example, Header, Parameter, RequestBody, Response, Schema,
    SecurityScheme,
};
use crate::refs::{NodeId, Ref};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

/// Per-pass visit state.
///
/// Tracks which `Ref` nodes have already been visited during one top-level
/// resolution pass. A node is marked before its reference chain is followed,
/// which both terminates cycles and ensures a shared target reached via
/// multiple paths is processed exactly once.
#[derive(Debug, Default)]
pub struct VisitState {
    visited: HashSet<NodeId>,
}

impl VisitState {
    /// Creates a fresh visit state for one resolution pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as visited. Returns `true` on the first visit.
    fn first_visit(&mut self, id: NodeId) -> bool {
        self.visited.insert(id)
    }
}

/// A component kind the engine knows how to resolve: a fixed fragment prefix,
/// a table accessor on [`Components`], and an enumerator over the kind's
/// nested reference sites.
pub(crate) trait ComponentKind: Sized {
    /// Fragment prefix for this kind, e.g. `#/components/schemas/`.
    const PREFIX: &'static str;

    /// Returns this kind's table within a components aggregate.
    fn table(components: &Components) -> &IndexMap<String, Ref<Self>>;

    /// Resolves the nested reference sites of a concrete value.
    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()>;
}

impl ComponentKind for Header {
    const PREFIX: &'static str = "#/components/headers/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.headers
    }

    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        if let Some(schema) = &value.schema {
            resolver.resolve_ref(doc, schema, ctx)?;
        }
        Ok(())
    }
}

impl ComponentKind for Parameter {
    const PREFIX: &'static str = "#/components/parameters/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.parameters
    }

    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        if let Some(schema) = &value.schema {
            resolver.resolve_ref(doc, schema, ctx)?;
        }
        Ok(())
    }
}

impl ComponentKind for RequestBody {
    const PREFIX: &'static str = "#/components/requestBodies/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.request_bodies
    }

    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        for media in value.content.values() {
            if let Some(schema) = &media.schema {
                resolver.resolve_ref(doc, schema, ctx)?;
            }
        }
        Ok(())
    }
}

impl ComponentKind for Response {
    const PREFIX: &'static str = "#/components/responses/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.responses
    }

    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        for media in value.content.values() {
            if let Some(schema) = &media.schema {
                resolver.resolve_ref(doc, schema, ctx)?;
            }
        }
        Ok(())
    }
}

impl ComponentKind for Schema {
    const PREFIX: &'static str = "#/components/schemas/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.schemas
    }

    fn resolve_nested(
        resolver: &Resolver,
        doc: &Document,
        value: &Self,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        if let Some(items) = &value.items {
            resolver.resolve_ref(doc, items, ctx)?;
        }
        for property in value.properties.values() {
            resolver.resolve_ref(doc, property, ctx)?;
        }
        if let Some(additional) = &value.additional_properties {
            resolver.resolve_ref(doc, additional, ctx)?;
        }
        Ok(())
    }
}

impl ComponentKind for SecurityScheme {
    const PREFIX: &'static str = "#/components/securitySchemes/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.security_schemes
    }

    fn resolve_nested(
        _resolver: &Resolver,
        _doc: &Document,
        _value: &Self,
        _ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        // Flattening only; security schemes have no nested reference sites.
        Ok(())
    }
}

impl ComponentKind for Example {
    const PREFIX: &'static str = "#/components/examples/";

    fn table(components: &Components) -> &IndexMap<String, Ref<Self>> {
        &components.examples
    }

    fn resolve_nested(
        _resolver: &Resolver,
        _doc: &Document,
        _value: &Self,
        _ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        // Flattening only; examples have no nested reference sites.
        Ok(())
    }
}

/// Where a located component table lives: the current document, or an
/// external document fetched by the loader. The loaded document is owned so
/// the target slot can be cloned out of it before it drops.
#[derive(Debug)]
enum ComponentSource<'doc> {
    Local(&'doc Components),
    Loaded(Document),
}

impl ComponentSource<'_> {
    fn components(&self) -> &Components {
        match self {
            ComponentSource::Local(components) => components,
            ComponentSource::Loaded(document) => &document.components,
        }
    }
}

/// The resolution engine.
///
/// External references are disabled by default; enabling them makes the
/// locator hand document locators to the configured [`DocumentLoader`]
/// (filesystem-only unless substituted).
pub struct Resolver {
    external_refs_allowed: bool,
    loader: Box<dyn DocumentLoader>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a resolver with external references disabled and the
    /// filesystem loader.
    pub fn new() -> Self {
        Resolver {
            external_refs_allowed: false,
            loader: Box::new(FsLoader),
        }
    }

    /// Enables or disables following references into other documents.
    pub fn allow_external_refs(mut self, allowed: bool) -> Self {
        self.external_refs_allowed = allowed;
        self
    }

    /// Substitutes a custom document loader.
    pub fn with_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Reads, deserializes, and resolves the document at `path`.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> ResolveResult<Document> {
        let document = self.loader.load(&DocumentLocation::from_path(path))?;
        self.resolve(&document)?;
        Ok(document)
    }

    /// Deserializes and resolves a document from YAML or JSON text.
    pub fn load_from_str(&self, data: &str) -> ResolveResult<Document> {
        let document = parse_document(data)?;
        self.resolve(&document)?;
        Ok(document)
    }

    /// Resolves every reference reachable from `doc`, in place.
    ///
    /// Walks the seven component tables, then every operation's parameters,
    /// request body, and responses. Aborts on the first error; no partial
    /// continuation. Each call runs with a fresh [`VisitState`], so repeated
    /// calls on the same resolver are safe and idempotent.
    pub fn resolve(&self, doc: &Document) -> ResolveResult<()> {
        let mut ctx = VisitState::new();

        for component in doc.components.headers.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.parameters.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.request_bodies.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.responses.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.schemas.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.security_schemes.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }
        for component in doc.components.examples.values() {
            self.resolve_ref(doc, component, &mut ctx)?;
        }

        for path_item in doc.paths.values() {
            let Some(path_item) = path_item else {
                continue;
            };
            for (_method, operation) in path_item.operations() {
                for parameter in &operation.parameters {
                    self.resolve_ref(doc, parameter, &mut ctx)?;
                }
                if let Some(request_body) = &operation.request_body {
                    self.resolve_ref(doc, request_body, &mut ctx)?;
                }
                for response in operation.responses.values() {
                    self.resolve_ref(doc, response, &mut ctx)?;
                }
            }
        }

        Ok(())
    }

    /// Resolves one slot of kind `T`: flattens its reference chain, then
    /// descends into the nested reference sites of the concrete value.
    pub(crate) fn resolve_ref<T: ComponentKind>(
        &self,
        doc: &Document,
        component: &Ref<T>,
        ctx: &mut VisitState,
    ) -> ResolveResult<()> {
        // Prevent infinite recursion: a node already seen in this pass is
        // either complete or currently being flattened higher up the stack.
        if !ctx.first_visit(component.node_id()) {
            return Ok(());
        }

        if let Some(reference) = component.reference() {
            let (source, id) = self.locate_component(doc, &reference, T::PREFIX)?;
            let target = T::table(source.components()).get(&id).cloned().ok_or_else(|| {
                ResolveError::UnresolvableFragmentPart {
                    reference: reference.clone(),
                    part: id.clone(),
                }
            })?;
            // `target` is a handle; the node outlives a loaded external
            // document, so `source` can drop here. The target's own
            // references resolve against the originating document.
            drop(source);
            self.resolve_ref(doc, &target, ctx)?;
            component.set_value(target.value());
        }

        if let Some(value) = component.value() {
            T::resolve_nested(self, doc, &value, ctx)?;
        }
        Ok(())
    }

    /// Parses `reference` against `prefix`, loading the target document first
    /// when the reference is external. Returns the components aggregate to
    /// look in and the bare identifier after the prefix.
    fn locate_component<'doc>(
        &self,
        doc: &'doc Document,
        reference: &str,
        prefix: &str,
    ) -> ResolveResult<(ComponentSource<'doc>, String)> {
        let (source, fragment) = if reference.starts_with('#') {
            (ComponentSource::Local(&doc.components), reference)
        } else {
            if !self.external_refs_allowed {
                return Err(ResolveError::DisallowedExternalRef(reference.to_string()));
            }
            let (locator, fragment) = match reference.find('#') {
                Some(pos) => (&reference[..pos], &reference[pos..]),
                None => (reference, ""),
            };
            let location = DocumentLocation::parse(locator, reference)?;
            let loaded =
                self.loader
                    .load(&location)
                    .map_err(|source| ResolveError::Loader {
                        reference: reference.to_string(),
                        source: Box::new(source),
                    })?;
            (ComponentSource::Loaded(loaded), fragment)
        };

        let Some(id) = fragment.strip_prefix(prefix) else {
            return Err(ResolveError::UnresolvableFragment(reference.to_string()));
        };
        if id.contains('/') {
            return Err(ResolveError::UnresolvableFragmentPart {
                reference: reference.to_string(),
                part: id.to_string(),
            });
        }
        Ok((source, id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchemaRef;

    fn document_with_schema(yaml: &str) -> Document {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_locate_component_local() {
        let doc = document_with_schema(
            "components:\n  schemas:\n    User:\n      type: object\n",
        );
        let resolver = Resolver::new();
        let (source, id) = resolver
            .locate_component(&doc, "#/components/schemas/User", Schema::PREFIX)
            .unwrap();
        assert_eq!(id, "User");
        assert!(source.components().schemas.contains_key("User"));
    }

    #[test]
    fn test_locate_component_wrong_prefix() {
        let doc = Document::default();
        let resolver = Resolver::new();
        let err = resolver
            .locate_component(&doc, "#/components/schemas/User", Parameter::PREFIX)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvableFragment(_)));
    }

    #[test]
    fn test_locate_component_rejects_nested_pointer() {
        let doc = Document::default();
        let resolver = Resolver::new();
        let err = resolver
            .locate_component(&doc, "#/components/schemas/a/b", Schema::PREFIX)
            .unwrap_err();
        match err {
            ResolveError::UnresolvableFragmentPart { part, .. } => assert_eq!(part, "a/b"),
            other => panic!("expected UnresolvableFragmentPart, got {}", other),
        }
    }

    #[test]
    fn test_locate_component_external_disallowed() {
        let doc = Document::default();
        let resolver = Resolver::new();
        let err = resolver
            .locate_component(&doc, "other.json#/components/schemas/X", Schema::PREFIX)
            .unwrap_err();
        assert!(matches!(err, ResolveError::DisallowedExternalRef(_)));
    }

    #[test]
    fn test_resolve_ref_missing_id() {
        let doc = Document::default();
        let resolver = Resolver::new();
        let slot: SchemaRef = Ref::from_reference("#/components/schemas/Missing");
        let mut ctx = VisitState::new();
        let err = resolver.resolve_ref(&doc, &slot, &mut ctx).unwrap_err();
        match err {
            ResolveError::UnresolvableFragmentPart { part, .. } => assert_eq!(part, "Missing"),
            other => panic!("expected UnresolvableFragmentPart, got {}", other),
        }
    }

    #[test]
    fn test_visit_state_marks_once() {
        let slot: SchemaRef = Ref::from_value(Schema::default());
        let mut ctx = VisitState::new();
        assert!(ctx.first_visit(slot.node_id()));
        assert!(!ctx.first_visit(slot.node_id()));
    }
}
