#![deny(missing_docs)]

//! # Document Model
//!
//! Definition of the OpenAPI document structures the resolver operates on:
//! the root `Document`, its `Components` tables, path items and operations,
//! and the seven component value types.
//!
//! Only the fields that participate in (or deserialize alongside) reference
//! resolution are modelled; schema/data validation is out of scope.

use crate::refs::Ref;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A slot for a reusable header definition.
pub type HeaderRef = Ref<Header>;
/// A slot for a reusable parameter definition.
pub type ParameterRef = Ref<Parameter>;
/// A slot for a reusable request body definition.
pub type RequestBodyRef = Ref<RequestBody>;
/// A slot for a reusable response definition.
pub type ResponseRef = Ref<Response>;
/// A slot for a reusable schema definition.
pub type SchemaRef = Ref<Schema>;
/// A slot for a reusable security scheme definition.
pub type SecuritySchemeRef = Ref<SecurityScheme>;
/// A slot for a reusable example definition.
pub type ExampleRef = Ref<Example>;

/// The root of an OpenAPI document.
#[derive(Debug, Default, Deserialize)]
pub struct Document {
    /// OpenAPI version string (e.g. "3.0.0"). Not interpreted by the resolver.
    #[serde(default)]
    pub openapi: String,
    /// Document metadata. Not interpreted by the resolver.
    #[serde(default)]
    pub info: Option<Info>,
    /// Reusable component tables.
    #[serde(default)]
    pub components: Components,
    /// Path string to path item. Null entries are representable and skipped
    /// by the resolution walk.
    #[serde(default)]
    pub paths: IndexMap<String, Option<PathItem>>,
}

/// Top-level document metadata.
#[derive(Debug, Default, Deserialize)]
pub struct Info {
    /// Title of the API.
    #[serde(default)]
    pub title: String,
    /// Version of the API document.
    #[serde(default)]
    pub version: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
}

/// The seven reusable component tables.
///
/// An absent table deserializes as an empty one; lookups against it simply
/// miss.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    /// Reusable header definitions.
    #[serde(default)]
    pub headers: IndexMap<String, HeaderRef>,
    /// Reusable parameter definitions.
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterRef>,
    /// Reusable request body definitions.
    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, RequestBodyRef>,
    /// Reusable response definitions.
    #[serde(default)]
    pub responses: IndexMap<String, ResponseRef>,
    /// Reusable schema definitions.
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaRef>,
    /// Reusable security scheme definitions.
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: IndexMap<String, SecuritySchemeRef>,
    /// Reusable example definitions.
    #[serde(default)]
    pub examples: IndexMap<String, ExampleRef>,
}

/// A single path entry, exposing zero or more operations keyed by HTTP method.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default)]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default)]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default)]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default)]
    pub delete: Option<Operation>,
    /// OPTIONS operation.
    #[serde(default)]
    pub options: Option<Operation>,
    /// HEAD operation.
    #[serde(default)]
    pub head: Option<Operation>,
    /// PATCH operation.
    #[serde(default)]
    pub patch: Option<Operation>,
    /// TRACE operation.
    #[serde(default)]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Enumerates the operations present on this path item, with their
    /// HTTP method names.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("GET", &self.get),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("DELETE", &self.delete),
            ("OPTIONS", &self.options),
            ("HEAD", &self.head),
            ("PATCH", &self.patch),
            ("TRACE", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// A single API operation on a path.
#[derive(Debug, Default, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId", default)]
    pub operation_id: Option<String>,
    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Operation parameters (path, query, header, cookie).
    #[serde(default)]
    pub parameters: Vec<ParameterRef>,
    /// Request body, if any.
    #[serde(rename = "requestBody", default)]
    pub request_body: Option<RequestBodyRef>,
    /// Responses keyed by status code (or "default").
    #[serde(default)]
    pub responses: IndexMap<String, ResponseRef>,
}

/// A response header definition.
#[derive(Debug, Default, Deserialize)]
pub struct Header {
    /// Description of the header.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the header is required.
    #[serde(default)]
    pub required: bool,
    /// Schema of the header value.
    #[serde(default)]
    pub schema: Option<SchemaRef>,
}

/// An operation parameter definition.
#[derive(Debug, Default, Deserialize)]
pub struct Parameter {
    /// Name of the parameter.
    #[serde(default)]
    pub name: String,
    /// Location of the parameter (query, path, header, cookie).
    #[serde(rename = "in", default)]
    pub location: String,
    /// Description of the parameter.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Schema of the parameter value.
    #[serde(default)]
    pub schema: Option<SchemaRef>,
}

/// A request body definition.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    /// Description of the body.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
    /// Content descriptors keyed by content type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
    /// Description of the response.
    #[serde(default)]
    pub description: Option<String>,
    /// Content descriptors keyed by content type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A single content-type entry of a request body or response.
#[derive(Debug, Default, Deserialize)]
pub struct MediaType {
    /// Schema of the payload.
    #[serde(default)]
    pub schema: Option<SchemaRef>,
    /// Free-form example payload.
    #[serde(default)]
    pub example: Option<JsonValue>,
}

/// A schema definition.
///
/// Nested references occur at three structurally distinct sites: `items`
/// (list element type), `properties` (named fields), and
/// `additionalProperties` (catch-all field type). All three are resolved with
/// the same rules as top-level schema refs.
#[derive(Debug, Default, Deserialize)]
pub struct Schema {
    /// JSON type (object, array, string, ...).
    #[serde(rename = "type", default)]
    pub schema_type: Option<String>,
    /// Format modifier (int64, date-time, ...).
    #[serde(default)]
    pub format: Option<String>,
    /// Title of the schema.
    #[serde(default)]
    pub title: Option<String>,
    /// Description of the schema.
    #[serde(default)]
    pub description: Option<String>,
    /// Names of required properties.
    #[serde(default)]
    pub required: Vec<String>,
    /// Enumerated allowed values.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<JsonValue>,
    /// Element schema for list types.
    #[serde(default)]
    pub items: Option<SchemaRef>,
    /// Named property schemas.
    #[serde(default)]
    pub properties: IndexMap<String, SchemaRef>,
    /// Catch-all schema for properties not named in `properties`.
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: Option<SchemaRef>,
}

/// A security scheme definition. Flattening only; no nested reference sites.
#[derive(Debug, Default, Deserialize)]
pub struct SecurityScheme {
    /// Scheme type (apiKey, http, oauth2, openIdConnect).
    #[serde(rename = "type", default)]
    pub scheme_type: Option<String>,
    /// Description of the scheme.
    #[serde(default)]
    pub description: Option<String>,
    /// Name of the header/query/cookie parameter (apiKey type).
    #[serde(default)]
    pub name: Option<String>,
    /// Location of the API key (apiKey type).
    #[serde(rename = "in", default)]
    pub location: Option<String>,
    /// HTTP authorization scheme (http type).
    #[serde(default)]
    pub scheme: Option<String>,
    /// Bearer token format hint (http type).
    #[serde(rename = "bearerFormat", default)]
    pub bearer_format: Option<String>,
}

/// An example definition. Flattening only; no nested reference sites.
#[derive(Debug, Default, Deserialize)]
pub struct Example {
    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Embedded example value.
    #[serde(default)]
    pub value: Option<JsonValue>,
    /// URI of an external example value.
    #[serde(rename = "externalValue", default)]
    pub external_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_minimal_document() {
        let yaml = r#"
openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths: {}
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.openapi, "3.0.0");
        assert_eq!(doc.info.as_ref().unwrap().title, "Test API");
        assert!(doc.components.schemas.is_empty());
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_deserialize_components_tables() {
        let yaml = r#"
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
  requestBodies:
    PetBody:
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
  securitySchemes:
    api_key:
      type: apiKey
      name: X-API-Key
      in: header
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        let pet = doc.components.schemas.get("Pet").unwrap();
        assert!(pet.is_resolved());
        assert!(pet.value().unwrap().properties.contains_key("name"));

        let body = doc.components.request_bodies.get("PetBody").unwrap();
        let media = &body.value().unwrap().content["application/json"];
        assert_eq!(
            media.schema.as_ref().unwrap().reference().as_deref(),
            Some("#/components/schemas/Pet")
        );

        let scheme = doc.components.security_schemes.get("api_key").unwrap();
        assert_eq!(
            scheme.value().unwrap().scheme_type.as_deref(),
            Some("apiKey")
        );
    }

    #[test]
    fn test_path_item_operations_enumeration() {
        let yaml = r#"
get:
  operationId: listPets
post:
  operationId: createPet
"#;
        let item: PathItem = serde_yaml::from_str(yaml).unwrap();
        let ops: Vec<_> = item.operations().collect();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].0, "GET");
        assert_eq!(ops[0].1.operation_id.as_deref(), Some("listPets"));
        assert_eq!(ops[1].0, "POST");
    }

    #[test]
    fn test_null_path_item_deserializes() {
        let yaml = r#"
paths:
  /health: ~
"#;
        let doc: Document = serde_yaml::from_str(yaml).unwrap();
        assert!(doc.paths.get("/health").unwrap().is_none());
    }

    #[test]
    fn test_schema_nested_reference_sites() {
        let yaml = r#"
type: object
items:
  $ref: '#/components/schemas/Item'
properties:
  owner:
    $ref: '#/components/schemas/Person'
additionalProperties:
  type: string
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            schema.items.as_ref().unwrap().reference().as_deref(),
            Some("#/components/schemas/Item")
        );
        assert_eq!(
            schema.properties["owner"].reference().as_deref(),
            Some("#/components/schemas/Person")
        );
        assert!(schema.additional_properties.as_ref().unwrap().is_resolved());
    }
}
