//! SAML namespace URIs and wire-contract constants.
//!
//! Dispatch and validation compare these strings exactly; they are part of
//! the wire contract with external identity providers.

/// SAML 2.0 assertion namespace URI.
pub const ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SAML 2.0 metadata namespace URI.
pub const METADATA_NS: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// SAML 1.1 assertion namespace URI.
pub const SAML11_ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:1.0:assertion";

/// SAML 1.1 protocol namespace URI.
pub const SAML11_PROTOCOL_NS: &str = "urn:oasis:names:tc:SAML:1.0:protocol";

/// XML Digital Signature namespace URI.
pub const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace URI.
pub const XMLENC_NS: &str = "http://www.w3.org/2001/04/xmlenc#";

/// XACML 2.0 context namespace URI.
pub const XACML_CONTEXT_NS: &str = "urn:oasis:names:tc:xacml:2.0:context:schema:os";

/// SAML profile of XACML 2.0, protocol schema namespace URI.
pub const SAML_XACML_NS: &str = "urn:oasis:xacml:2.0:saml:protocol:schema:os";

/// Conventional prefix for the assertion namespace.
pub const ASSERTION_PREFIX: &str = "saml";

/// Conventional prefix for the protocol namespace.
pub const PROTOCOL_PREFIX: &str = "samlp";

/// Conventional prefix for the metadata namespace.
pub const METADATA_PREFIX: &str = "md";

/// The `xsi:type` local value identifying a XACML authorization decision
/// query carried in a `RequestAbstract` element.
pub const XACML_AUTHZ_DECISION_QUERY_TYPE: &str = "XACMLAuthzDecisionQueryType";

/// Top-level SAML 2.0 status codes.
pub mod status_codes {
    /// Request succeeded.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

    /// The requester did something wrong.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

    /// The responder failed to process the request.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

    /// Protocol version mismatch.
    pub const VERSION_MISMATCH: &str = "urn:oasis:names:tc:SAML:2.0:status:VersionMismatch";

    /// Authentication failed (second-level code).
    pub const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";

    /// Request denied (second-level code).
    pub const REQUEST_DENIED: &str = "urn:oasis:names:tc:SAML:2.0:status:RequestDenied";
}

/// Subject confirmation method URIs.
pub mod confirmation_methods {
    /// Bearer confirmation.
    pub const BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

    /// Holder-of-key confirmation.
    pub const HOLDER_OF_KEY: &str = "urn:oasis:names:tc:SAML:2.0:cm:holder-of-key";

    /// Sender-vouches confirmation.
    pub const SENDER_VOUCHES: &str = "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches";
}

/// SAML 2.0 binding URIs used in metadata endpoints.
pub mod bindings {
    /// HTTP POST binding.
    pub const HTTP_POST: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";

    /// HTTP Redirect binding.
    pub const HTTP_REDIRECT: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect";

    /// HTTP Artifact binding.
    pub const HTTP_ARTIFACT: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact";

    /// SOAP binding.
    pub const SOAP: &str = "urn:oasis:names:tc:SAML:2.0:bindings:SOAP";
}
