//! SAML 1.1 types.
//!
//! SAML 1.1 differs structurally from 2.0: the assertion issuer is an
//! attribute rather than a child element, IDs are `AssertionID` /
//! `ResponseID` / `RequestID` attributes, and versioning is split into
//! `MajorVersion` / `MinorVersion` attributes that must read `1` / `1`.

use chrono::{DateTime, Utc};
use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A SAML 1.1 assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11Assertion {
    /// `AssertionID` attribute, preserved verbatim.
    pub id: String,

    /// Issuer attribute value.
    pub issuer: String,

    /// When the assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// Validity conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Saml11Conditions>,

    /// Statements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Saml11Statement>,

    /// An embedded signature, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,
}

impl Saml11Assertion {
    /// Creates an assertion with a fresh ID issued now.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            issuer: issuer.into(),
            issue_instant: Utc::now(),
            conditions: None,
            statements: Vec::new(),
            signature: None,
        }
    }
}

/// SAML 1.1 assertion validity conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Saml11Conditions {
    /// Time before which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Time at or after which the assertion is not valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Audience restriction conditions, each carrying its audiences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<Vec<String>>,
}

/// One statement within a SAML 1.1 assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Saml11Statement {
    /// An authentication statement.
    Authentication(Saml11AuthenticationStatement),
    /// An attribute statement.
    Attribute(Saml11AttributeStatement),
}

/// A SAML 1.1 authentication statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11AuthenticationStatement {
    /// Authentication method URI.
    pub authentication_method: String,

    /// When the authentication took place.
    pub authentication_instant: DateTime<Utc>,

    /// The authenticated subject.
    pub subject: Saml11Subject,
}

/// A SAML 1.1 attribute statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Saml11AttributeStatement {
    /// The subject the attributes are about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Saml11Subject>,

    /// The attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Saml11Attribute>,
}

/// A SAML 1.1 attribute. Name and namespace are separate attributes in
/// this protocol version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11Attribute {
    /// `AttributeName` value.
    pub name: String,

    /// `AttributeNamespace` value.
    pub namespace: String,

    /// Attribute values as text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// A SAML 1.1 subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Saml11Subject {
    /// The subject's name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_identifier: Option<Saml11NameIdentifier>,

    /// Confirmation method URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confirmation_methods: Vec<String>,
}

/// A SAML 1.1 name identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11NameIdentifier {
    /// The identifier value.
    pub value: String,

    /// Format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Qualifying domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,
}

/// SAML 1.1 response status. The code value is a QName in the protocol
/// namespace (for example `samlp:Success`) and is preserved as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11Status {
    /// `StatusCode/@Value` as written in the document.
    pub code: String,

    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A SAML 1.1 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11Response {
    /// `ResponseID` attribute.
    pub id: String,

    /// ID of the request this responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// When the response was issued.
    pub issue_instant: DateTime<Utc>,

    /// Intended recipient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Processing status.
    pub status: Saml11Status,

    /// Assertions in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Saml11Assertion>,

    /// An embedded signature, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,
}

/// The query carried in a SAML 1.1 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Saml11Query {
    /// A query for authentication statements about a subject.
    Authentication(Saml11Subject),
    /// A query for attributes of a subject, optionally scoped to a resource.
    Attribute {
        /// Resource the attributes relate to.
        resource: Option<String>,
        /// The subject being queried.
        subject: Saml11Subject,
    },
    /// A request to dereference an assertion artifact.
    AssertionArtifact(String),
    /// A request for an assertion by its ID.
    AssertionIdReference(String),
}

/// A SAML 1.1 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saml11Request {
    /// `RequestID` attribute.
    pub id: String,

    /// When the request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The query, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Saml11Query>,

    /// An embedded signature, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,
}
