//! Types shared across the request and response families.

use chrono::{DateTime, Utc};
use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A SAML name identifier (`NameID` element or an `Issuer`, which shares
/// the same schema type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameId {
    /// The identifier value.
    pub value: String,

    /// Format URI of the identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Security or administrative domain that qualifies the identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,

    /// Name qualifier asserted by the service provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,

    /// Identifier established by the service provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_provided_id: Option<String>,
}

impl NameId {
    /// Creates a name identifier with just a value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
            name_qualifier: None,
            sp_name_qualifier: None,
            sp_provided_id: None,
        }
    }

    /// Sets the format URI.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// A status code, possibly nested one level per the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCode {
    /// The status code URI.
    pub value: String,

    /// Optional second-level status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_code: Option<Box<StatusCode>>,
}

impl StatusCode {
    /// Creates a status code with no sub-code.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            sub_code: None,
        }
    }
}

/// The `Status` of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// The status code (required by the schema).
    pub code: StatusCode,

    /// Human-readable status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Additional status detail, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DomElement>,
}

impl Status {
    /// Creates a status from a top-level code URI.
    #[must_use]
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: StatusCode::new(code),
            message: None,
            detail: None,
        }
    }

    /// A success status.
    #[must_use]
    pub fn success() -> Self {
        Self::from_code(super::constants::status_codes::SUCCESS)
    }
}

/// Fields common to every protocol request, embedded by value in each
/// concrete request type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBase {
    /// Unique request ID, preserved verbatim across round trips because
    /// signatures reference it.
    pub id: String,

    /// When the request was issued.
    pub issue_instant: DateTime<Utc>,

    /// Intended endpoint for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Consent URI obtained from the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,

    /// Issuer of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<NameId>,

    /// An embedded signature, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,
}

impl RequestBase {
    /// Creates a request base with a fresh ID and the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_id(),
            issue_instant: Utc::now(),
            destination: None,
            consent: None,
            issuer: None,
            signature: None,
        }
    }

    /// Creates a request base with a caller-supplied ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::new()
        }
    }
}

impl Default for RequestBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Fields common to every status-bearing response, embedded by value in
/// [`Response`](super::Response), [`ArtifactResponse`](super::ArtifactResponse),
/// and [`LogoutResponse`](super::LogoutResponse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Unique response ID.
    pub id: String,

    /// ID of the request this responds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// When the response was issued.
    pub issue_instant: DateTime<Utc>,

    /// Intended endpoint for this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Consent URI obtained from the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,

    /// Issuer of the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<NameId>,

    /// An embedded signature, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DomElement>,

    /// Processing status of the corresponding request.
    pub status: Status,
}

impl StatusResponse {
    /// Creates a response base with a fresh ID and the given status.
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            id: generate_id(),
            in_response_to: None,
            issue_instant: Utc::now(),
            destination: None,
            consent: None,
            issuer: None,
            signature: None,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_nesting() {
        let mut status = Status::from_code(super::super::constants::status_codes::RESPONDER);
        status.code.sub_code = Some(Box::new(StatusCode::new(
            super::super::constants::status_codes::AUTHN_FAILED,
        )));
        assert!(status.code.value.ends_with("Responder"));
        assert!(status.code.sub_code.unwrap().value.ends_with("AuthnFailed"));
    }

    #[test]
    fn request_base_ids_are_fresh() {
        assert_ne!(RequestBase::new().id, RequestBase::new().id);
        assert_eq!(RequestBase::with_id("ID_abc").id, "ID_abc");
    }
}
