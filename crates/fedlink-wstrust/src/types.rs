//! WS-Trust protocol objects.
//!
//! Security tokens travelling inside a request or response (the issued
//! token, renew/cancel/validate targets, proof material) belong to foreign
//! schemas and are carried as opaque [`DomElement`] subtrees.

use chrono::{DateTime, Utc};
use fedlink_xml::DomElement;
use serde::{Deserialize, Serialize};

/// A WS-Addressing endpoint reference, reduced to its address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointReference {
    /// The `wsa:Address` value.
    pub address: String,
}

impl EndpointReference {
    /// Creates a reference to the given address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Token validity window (`wsu:Created` / `wsu:Expires`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    /// When the token was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    /// When the token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Lifetime {
    /// Creates a lifetime starting now and lasting the given number of
    /// seconds.
    #[must_use]
    pub fn seconds(duration: i64) -> Self {
        let now = Utc::now();
        Self {
            created: Some(now),
            expires: Some(now + chrono::Duration::seconds(duration)),
        }
    }
}

/// A `wst:BinarySecret`: key material carried base64 encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinarySecret {
    /// The secret's type URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,

    /// Decoded secret bytes.
    pub value: Vec<u8>,
}

/// Entropy contributed to key agreement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entropy {
    /// The contained binary secret, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_secret: Option<BinarySecret>,
}

/// A request for a security token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSecurityToken {
    /// `Context` attribute correlating request and response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Requested token type URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Request type URI (issue, validate, renew, cancel).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,

    /// Requested validity window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,

    /// Service the token will be presented to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<EndpointReference>,

    /// The issuer the requester wants the token from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<EndpointReference>,

    /// Requested proof key type URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    /// Requested key size in bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u64>,

    /// Client entropy for key agreement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<Entropy>,

    /// Requested computed-key algorithm URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_key_algorithm: Option<String>,

    /// Token describing the party the request is made on behalf of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<DomElement>,

    /// Token to validate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_target: Option<DomElement>,

    /// Token to renew.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renew_target: Option<DomElement>,

    /// Token to cancel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_target: Option<DomElement>,

    /// Key material the requester wants bound into the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_key: Option<DomElement>,
}

impl RequestSecurityToken {
    /// Creates an issue request for the given token type.
    #[must_use]
    pub fn issue(token_type: impl Into<String>) -> Self {
        Self {
            token_type: Some(token_type.into()),
            request_type: Some(super::constants::request_types::ISSUE.to_string()),
            ..Self::default()
        }
    }

    /// Creates a validate request carrying the target token.
    #[must_use]
    pub fn validate(target: DomElement) -> Self {
        Self {
            request_type: Some(super::constants::request_types::VALIDATE.to_string()),
            validate_target: Some(target),
            ..Self::default()
        }
    }
}

/// A batch of token requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSecurityTokenCollection {
    /// The requests in document order.
    pub requests: Vec<RequestSecurityToken>,
}

/// Validation status returned for a validate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// Status code URI.
    pub code: String,

    /// Human-readable reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Status {
    /// A valid-token status.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            code: super::constants::status_codes::VALID.to_string(),
            reason: None,
        }
    }

    /// An invalid-token status with a reason.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: super::constants::status_codes::INVALID.to_string(),
            reason: Some(reason.into()),
        }
    }
}

/// The response to a token request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSecurityTokenResponse {
    /// `Context` attribute echoed from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Issued token type URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Validity window of the issued token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,

    /// Proof key type URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,

    /// Key size in bits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u64>,

    /// Server entropy for key agreement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<Entropy>,

    /// The issued token, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_security_token: Option<DomElement>,

    /// Reference for use when the token is in the same message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_attached_reference: Option<DomElement>,

    /// Reference for use when the token travels separately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_unattached_reference: Option<DomElement>,

    /// Proof-of-possession token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_proof_token: Option<DomElement>,

    /// Validation status, for validate requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// A batch of token responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSecurityTokenResponseCollection {
    /// The responses in document order.
    pub responses: Vec<RequestSecurityTokenResponse>,
}

/// Any top-level WS-Trust message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WsTrustObject {
    /// A single token request.
    Request(RequestSecurityToken),
    /// A batch of token requests.
    RequestCollection(RequestSecurityTokenCollection),
    /// A single token response.
    Response(RequestSecurityTokenResponse),
    /// A batch of token responses.
    ResponseCollection(RequestSecurityTokenResponseCollection),
}
