//! WS-Trust and related WS-* namespace URIs and wire-contract constants.

/// WS-Trust 1.3 base namespace URI.
pub const WST_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";

/// WS-Addressing namespace URI.
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

/// WS-Policy namespace URI.
pub const WSP_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/policy";

/// WS-Security security extension namespace URI.
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// WS-Security utility namespace URI.
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

/// Conventional prefix for the WS-Trust namespace.
pub const WST_PREFIX: &str = "wst";

/// Conventional prefix for the WS-Addressing namespace.
pub const WSA_PREFIX: &str = "wsa";

/// Conventional prefix for the WS-Policy namespace.
pub const WSP_PREFIX: &str = "wsp";

/// Conventional prefix for the WS-Security utility namespace.
pub const WSU_PREFIX: &str = "wsu";

/// Request type URIs carried in `wst:RequestType`.
pub mod request_types {
    /// Issue a new token.
    pub const ISSUE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue";

    /// Validate an existing token.
    pub const VALIDATE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate";

    /// Renew an existing token.
    pub const RENEW: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Renew";

    /// Cancel an existing token.
    pub const CANCEL: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Cancel";
}

/// Key type URIs carried in `wst:KeyType`.
pub mod key_types {
    /// Bearer token, no proof key.
    pub const BEARER: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer";

    /// Symmetric proof key.
    pub const SYMMETRIC: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/SymmetricKey";

    /// Public (asymmetric) proof key.
    pub const PUBLIC: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/PublicKey";
}

/// Status code URIs returned from a validate request.
pub mod status_codes {
    /// The token is valid.
    pub const VALID: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/valid";

    /// The token is not valid.
    pub const INVALID: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/invalid";
}

/// `wst:BinarySecret/@Type` URIs.
pub mod binary_secret_types {
    /// A nonce contributed to key agreement.
    pub const NONCE: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Nonce";

    /// A symmetric key delivered directly.
    pub const SYMMETRIC: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/SymmetricKey";
}

/// Computed-key algorithm URIs.
pub mod computed_key {
    /// P-SHA1 key derivation from both parties' entropy.
    pub const PSHA1: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/CK/PSHA1";
}
