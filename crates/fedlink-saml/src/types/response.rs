//! SAML 2.0 protocol response types.

use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

use super::{Assertion, AuthnRequest, LogoutRequest, Status, StatusResponse};

/// A response carrying zero or more assertions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Common status-response fields.
    pub base: StatusResponse,

    /// Assertions in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<ResponseItem>,
}

impl Response {
    /// Creates a response with a fresh ID and the given status.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            base: StatusResponse::new(status),
            assertions: Vec::new(),
        }
    }

    /// Appends an assertion.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(ResponseItem::Assertion(assertion));
        self
    }
}

/// An assertion slot within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseItem {
    /// A plain assertion.
    Assertion(Assertion),
    /// An encrypted assertion, carried opaquely.
    Encrypted(DomElement),
}

/// A logout response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Common status-response fields.
    pub base: StatusResponse,
}

impl LogoutResponse {
    /// Creates a logout response with a fresh ID and the given status.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            base: StatusResponse::new(status),
        }
    }
}

/// The message wrapped inside an artifact response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArtifactContent {
    /// A wrapped authentication request.
    AuthnRequest(Box<AuthnRequest>),
    /// A wrapped logout request.
    LogoutRequest(Box<LogoutRequest>),
    /// A wrapped response.
    Response(Box<Response>),
}

/// The response to an artifact resolve request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactResponse {
    /// Common status-response fields.
    pub base: StatusResponse,

    /// The resolved message, when the artifact was known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any: Option<ArtifactContent>,
}

impl ArtifactResponse {
    /// Creates an artifact response with a fresh ID and the given status.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            base: StatusResponse::new(status),
            any: None,
        }
    }
}
