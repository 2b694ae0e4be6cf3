//! SAML 2.0 protocol request types.

use chrono::{DateTime, Utc};
use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

use super::{Attribute, Conditions, NameId, RequestBase, Subject};

/// An authentication request sent by a service provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// Common request fields.
    pub base: RequestBase,

    /// Whether the IdP must re-authenticate the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_authn: Option<bool>,

    /// Whether the IdP must not visibly interact with the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_passive: Option<bool>,

    /// Binding URI the response should use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_binding: Option<String>,

    /// Where the response should be delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_url: Option<String>,

    /// Index into the SP's metadata endpoint list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_index: Option<u16>,

    /// Index of the attribute consuming service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_consuming_service_index: Option<u16>,

    /// Human-readable requester name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Constraints on the returned name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_policy: Option<NameIdPolicy>,

    /// Requested subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Conditions the SP wants on the resulting assertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Requested authentication context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_authn_context: Option<RequestedAuthnContext>,
}

impl AuthnRequest {
    /// Creates a request with a fresh ID issued now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: RequestBase::new(),
            force_authn: None,
            is_passive: None,
            protocol_binding: None,
            assertion_consumer_service_url: None,
            assertion_consumer_service_index: None,
            attribute_consuming_service_index: None,
            provider_name: None,
            name_id_policy: None,
            subject: None,
            conditions: None,
            requested_authn_context: None,
        }
    }

    /// Creates a request with a caller-supplied ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            base: RequestBase::with_id(id),
            ..Self::new()
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.base.issuer = Some(NameId::new(issuer));
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.base.destination = Some(destination.into());
        self
    }
}

impl Default for AuthnRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Constraints on the name identifier the IdP should return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameIdPolicy {
    /// Requested identifier format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// SP name qualifier for the returned identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,

    /// Whether the IdP may create a new identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_create: Option<bool>,
}

/// The authentication context requested by the SP.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestedAuthnContext {
    /// Acceptable context class reference URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class_refs: Vec<String>,

    /// Comparison rule (`exact`, `minimum`, `maximum`, `better`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
}

/// A single logout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Common request fields.
    pub base: RequestBase,

    /// Time after which the request is stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Reason URI for the logout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Principal being logged out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// Sessions to terminate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_indexes: Vec<String>,
}

impl LogoutRequest {
    /// Creates a logout request with a fresh ID issued now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: RequestBase::new(),
            not_on_or_after: None,
            reason: None,
            name_id: None,
            session_indexes: Vec::new(),
        }
    }
}

impl Default for LogoutRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A request to resolve an artifact into the message it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactResolve {
    /// Common request fields.
    pub base: RequestBase,

    /// The artifact value to resolve.
    pub artifact: String,
}

/// A query for attributes of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeQuery {
    /// Common request fields.
    pub base: RequestBase,

    /// Subject being queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Specific attributes requested; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

/// A XACML authorization decision query carried over SAML.
///
/// The XACML request itself is a foreign schema and is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XacmlAuthzQuery {
    /// Common request fields.
    pub base: RequestBase,

    /// Whether the PDP may only use the supplied context.
    #[serde(default)]
    pub input_context_only: bool,

    /// Whether the response should echo the request context.
    #[serde(default)]
    pub return_context: bool,

    /// The embedded `xacml-context:Request`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xacml_request: Option<DomElement>,
}
