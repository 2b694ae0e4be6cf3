//! Signature and canonicalization algorithm identifiers.

use fedlink_crypto::uris;

/// XML-DSig namespace URI.
pub const DSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Conventional prefix for emitted signature elements.
pub const DSIG_PREFIX: &str = "dsig";

/// The enveloped-signature transform URI.
pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// RSA PKCS#1 v1.5 signature algorithms, keyed by XML-DSig URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// `rsa-sha1`.
    RsaSha1,
    /// `rsa-sha256`.
    RsaSha256,
    /// `rsa-sha384`.
    RsaSha384,
    /// `rsa-sha512`.
    RsaSha512,
}

impl SignatureAlgorithm {
    /// The algorithm URI carried in `SignatureMethod/@Algorithm`.
    #[must_use]
    pub fn uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => uris::RSA_SHA1,
            Self::RsaSha256 => uris::RSA_SHA256,
            Self::RsaSha384 => uris::RSA_SHA384,
            Self::RsaSha512 => uris::RSA_SHA512,
        }
    }

    /// The digest URI carried in `DigestMethod/@Algorithm`, matched to
    /// the signature's hash.
    #[must_use]
    pub fn digest_uri(self) -> &'static str {
        match self {
            Self::RsaSha1 => uris::DIGEST_SHA1,
            Self::RsaSha256 => uris::DIGEST_SHA256,
            Self::RsaSha384 => uris::DIGEST_SHA384,
            Self::RsaSha512 => uris::DIGEST_SHA512,
        }
    }

    /// Resolves a `SignatureMethod/@Algorithm` URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            uris::RSA_SHA1 => Some(Self::RsaSha1),
            uris::RSA_SHA256 => Some(Self::RsaSha256),
            uris::RSA_SHA384 => Some(Self::RsaSha384),
            uris::RSA_SHA512 => Some(Self::RsaSha512),
            _ => None,
        }
    }
}

/// Canonical XML 1.0 algorithm URIs.
pub mod c14n_uris {
    /// Inclusive C14N 1.0.
    pub const INCLUSIVE: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";

    /// Inclusive C14N 1.0 preserving comments.
    pub const INCLUSIVE_WITH_COMMENTS: &str =
        "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments";

    /// Exclusive C14N 1.0.
    pub const EXCLUSIVE: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

    /// Exclusive C14N 1.0 preserving comments.
    pub const EXCLUSIVE_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";
}

/// A canonicalization method, inclusive or exclusive, with or without
/// comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalizationAlgorithm {
    /// Inclusive C14N 1.0.
    Inclusive,
    /// Inclusive C14N 1.0 preserving comments.
    InclusiveWithComments,
    /// Exclusive C14N 1.0.
    Exclusive,
    /// Exclusive C14N 1.0 preserving comments.
    ExclusiveWithComments,
}

impl CanonicalizationAlgorithm {
    /// The algorithm URI.
    #[must_use]
    pub fn uri(self) -> &'static str {
        match self {
            Self::Inclusive => c14n_uris::INCLUSIVE,
            Self::InclusiveWithComments => c14n_uris::INCLUSIVE_WITH_COMMENTS,
            Self::Exclusive => c14n_uris::EXCLUSIVE,
            Self::ExclusiveWithComments => c14n_uris::EXCLUSIVE_WITH_COMMENTS,
        }
    }

    /// Resolves a `CanonicalizationMethod/@Algorithm` URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            c14n_uris::INCLUSIVE => Some(Self::Inclusive),
            c14n_uris::INCLUSIVE_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            c14n_uris::EXCLUSIVE => Some(Self::Exclusive),
            c14n_uris::EXCLUSIVE_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    /// Whether comments survive canonicalization.
    #[must_use]
    pub fn with_comments(self) -> bool {
        matches!(self, Self::InclusiveWithComments | Self::ExclusiveWithComments)
    }

    /// Whether only visibly utilized namespace prefixes are rendered.
    #[must_use]
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Exclusive | Self::ExclusiveWithComments)
    }
}
