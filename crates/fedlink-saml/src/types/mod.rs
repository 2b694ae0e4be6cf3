//! Typed SAML protocol objects.
//!
//! Response-family types embed [`StatusResponse`](common::StatusResponse)
//! by value and request-family types embed [`RequestBase`](common::RequestBase);
//! the concrete kind is selected by the [`SamlObject`] enum at the dispatch
//! layer rather than through a type hierarchy.

pub mod assertion;
pub mod common;
pub mod constants;
pub mod metadata;
pub mod request;
pub mod response;
pub mod saml11;

pub use assertion::{
    Assertion, Attribute, AttributeStatement, AudienceRestriction, AuthnContext, AuthnStatement,
    Conditions, ProxyRestriction, Statement, Subject, SubjectConfirmation, SubjectConfirmationData,
    SubjectLocality,
};
pub use common::{NameId, RequestBase, Status, StatusCode, StatusResponse};
pub use metadata::{
    EntitiesDescriptor, EntityDescriptor, Endpoint, IdpSsoDescriptor, IndexedEndpoint,
    MetadataItem, RoleDescriptor, SpSsoDescriptor,
};
pub use request::{
    ArtifactResolve, AttributeQuery, AuthnRequest, LogoutRequest, NameIdPolicy,
    RequestedAuthnContext, XacmlAuthzQuery,
};
pub use response::{ArtifactContent, ArtifactResponse, LogoutResponse, Response, ResponseItem};
pub use saml11::{
    Saml11Assertion, Saml11Attribute, Saml11AttributeStatement, Saml11AuthenticationStatement,
    Saml11Conditions, Saml11NameIdentifier, Saml11Query, Saml11Request, Saml11Response,
    Saml11Statement, Saml11Status, Saml11Subject,
};

use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

/// A parsed top-level SAML document, tagged with its concrete kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SamlObject {
    /// A SAML 2.0 assertion.
    Assertion(Assertion),
    /// An encrypted assertion, carried opaquely.
    EncryptedAssertion(DomElement),
    /// A SAML 2.0 authentication request.
    AuthnRequest(AuthnRequest),
    /// A SAML 2.0 logout request.
    LogoutRequest(LogoutRequest),
    /// A SAML 2.0 logout response.
    LogoutResponse(LogoutResponse),
    /// A SAML 2.0 response.
    Response(Response),
    /// A XACML authorization decision query.
    XacmlAuthzQuery(XacmlAuthzQuery),
    /// A SAML 2.0 artifact resolve request.
    ArtifactResolve(ArtifactResolve),
    /// A SAML 2.0 artifact response.
    ArtifactResponse(ArtifactResponse),
    /// A SAML 2.0 attribute query.
    AttributeQuery(AttributeQuery),
    /// A metadata entity descriptor.
    EntityDescriptor(EntityDescriptor),
    /// A metadata entities descriptor.
    EntitiesDescriptor(EntitiesDescriptor),
    /// A SAML 1.1 assertion.
    Saml11Assertion(Saml11Assertion),
    /// A SAML 1.1 response.
    Saml11Response(Saml11Response),
    /// A SAML 1.1 request.
    Saml11Request(Saml11Request),
}
