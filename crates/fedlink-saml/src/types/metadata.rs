//! SAML 2.0 metadata types.
//!
//! Key descriptors embed XML-DSig `KeyInfo` content and are carried
//! opaquely; role descriptors other than the IdP and SP SSO descriptors
//! are preserved as raw subtrees.

use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

/// A protocol endpoint advertised in metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Binding URI.
    pub binding: String,

    /// Endpoint location URL.
    pub location: String,

    /// Separate response location, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_location: Option<String>,
}

/// An endpoint carrying an index, used for assertion consumer services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedEndpoint {
    /// The endpoint itself.
    pub endpoint: Endpoint,

    /// Index within the service list.
    pub index: u16,

    /// Whether this is the default endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

/// An identity provider SSO descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdpSsoDescriptor {
    /// Supported protocol namespace URIs, space separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_support_enumeration: Option<String>,

    /// Whether authentication requests must be signed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub want_authn_requests_signed: Option<bool>,

    /// Key descriptors, carried opaquely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_descriptors: Vec<DomElement>,

    /// Single sign-on endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_sign_on_services: Vec<Endpoint>,

    /// Single logout endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_logout_services: Vec<Endpoint>,

    /// Supported name identifier formats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_id_formats: Vec<String>,
}

/// A service provider SSO descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpSsoDescriptor {
    /// Supported protocol namespace URIs, space separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_support_enumeration: Option<String>,

    /// Whether this SP signs its authentication requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authn_requests_signed: Option<bool>,

    /// Whether this SP requires signed assertions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub want_assertions_signed: Option<bool>,

    /// Key descriptors, carried opaquely.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_descriptors: Vec<DomElement>,

    /// Single logout endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub single_logout_services: Vec<Endpoint>,

    /// Assertion consumer endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_consumer_services: Vec<IndexedEndpoint>,

    /// Supported name identifier formats.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name_id_formats: Vec<String>,
}

/// One role within an entity descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoleDescriptor {
    /// An identity provider role.
    Idp(IdpSsoDescriptor),
    /// A service provider role.
    Sp(SpSsoDescriptor),
    /// Any other role, preserved as a raw subtree.
    Other(DomElement),
}

/// Metadata for a single federation entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// The entity's unique identifier URI.
    pub entity_id: String,

    /// Document ID, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Roles this entity plays.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleDescriptor>,
}

/// One entry in an entities descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataItem {
    /// A single entity.
    Entity(EntityDescriptor),
    /// A nested group of entities.
    Entities(EntitiesDescriptor),
}

/// A named group of entity descriptors; groups may nest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitiesDescriptor {
    /// Group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Document ID, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Member descriptors in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MetadataItem>,
}
