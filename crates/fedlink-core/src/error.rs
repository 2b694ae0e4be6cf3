//! Error types for federation protocol processing.
//!
//! Parsing failures are always fatal to the current parse call and are never
//! retried internally; the whole document either parses or it does not.
//! Signature verification mismatch is deliberately NOT an error; it is a
//! `false` return from the validation entry points, so only structurally
//! broken signatures surface here.

use thiserror::Error;

/// Result type for parsing operations.
pub type ParsingResult<T> = std::result::Result<T, ParsingError>;

/// Result type for processing (writing, canonicalization, signing) operations.
pub type ProcessingResult<T> = std::result::Result<T, ProcessingError>;

/// Malformed input, unexpected elements, or cursor misuse.
///
/// Carries the byte offset into the source stream where the failure was
/// detected, when the cursor can supply one.
#[derive(Debug, Error)]
pub enum ParsingError {
    /// A well-formed but schema-unknown child element was encountered.
    ///
    /// Parsers fail closed on unrecognized content rather than dropping it.
    #[error("unknown start element: {name} at offset {offset}")]
    UnknownStartElement {
        /// Qualified name of the offending element.
        name: String,
        /// Byte offset into the input.
        offset: u64,
    },

    /// An end element other than the expected close tag was encountered.
    #[error("unknown end element: {name}")]
    UnknownEndElement {
        /// Local name of the offending end tag.
        name: String,
    },

    /// A different element was expected at this position.
    #[error("expected element {expected}, found {found} at offset {offset}")]
    ExpectedTag {
        /// The local name the caller required.
        expected: String,
        /// The local name actually present.
        found: String,
        /// Byte offset into the input.
        offset: u64,
    },

    /// A start element was required but the stream produced something else.
    #[error("expected a start element at offset {offset}")]
    ExpectedStartTag {
        /// Byte offset into the input.
        offset: u64,
    },

    /// An end element was required but the stream produced something else.
    #[error("expected an end element at offset {offset}")]
    ExpectedEndTag {
        /// Byte offset into the input.
        offset: u64,
    },

    /// Element text content was required but absent.
    #[error("expected text value for {0}")]
    ExpectedText(String),

    /// A required attribute is missing.
    #[error("missing required attribute {attribute} on {element}")]
    MissingAttribute {
        /// Element carrying the requirement.
        element: String,
        /// Missing attribute local name.
        attribute: String,
    },

    /// A required child element is missing.
    #[error("missing required child {child} in {element}")]
    MissingChild {
        /// Parent element local name.
        element: String,
        /// Missing child local name.
        child: String,
    },

    /// An `xsi:type` value that no registered parser understands.
    #[error("unknown xsi:type: {0}")]
    UnknownXsiType(String),

    /// The protocol version attribute does not match the parser family.
    #[error("unsupported version: expected {expected}, got {actual}")]
    UnsupportedVersion {
        /// Version required by this parser.
        expected: String,
        /// Version found in the document.
        actual: String,
    },

    /// An attribute or text value could not be interpreted.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// Field being parsed.
        field: String,
        /// Offending text.
        value: String,
    },

    /// The stream was exhausted without matching any dispatch rule.
    #[error("failed parsing: no parser matched the document")]
    FailedParsing,

    /// The underlying XML stream is not well formed.
    #[error("XML stream error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for ParsingError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

/// Failures during transformation, canonicalization, or signing.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// A DOM-level parse of a document failed.
    #[error("XML document error: {0}")]
    XmlDocument(String),

    /// A required element is absent from the document.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// A required attribute is absent.
    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    /// The element a signature `Reference URI` points at does not exist.
    #[error("signature reference target not found: {0}")]
    MissingReference(String),

    /// Two elements in the document carry the same ID value.
    #[error("ambiguous ID attribute: {0}")]
    AmbiguousId(String),

    /// An algorithm URI this engine does not implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A cryptographic primitive failed.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Base64 content could not be decoded.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Writing to the output sink failed.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    /// A protocol object could not be serialized.
    #[error("marshalling error: {0}")]
    Marshalling(String),
}

impl From<roxmltree::Error> for ProcessingError {
    fn from(err: roxmltree::Error) -> Self {
        Self::XmlDocument(err.to_string())
    }
}

/// Missing or invalid configuration needed to construct a parser, writer,
/// or signer.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A provider key named in configuration has no registered factory.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// A required configuration property is absent.
    #[error("missing property: {0}")]
    MissingProperty(String),

    /// Supplied key material could not be loaded.
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_element_names_the_offender() {
        let err = ParsingError::UnknownStartElement {
            name: "samlp:Bogus".to_string(),
            offset: 42,
        };
        assert_eq!(err.to_string(), "unknown start element: samlp:Bogus at offset 42");
    }

    #[test]
    fn failed_parsing_is_generic() {
        let err = ParsingError::FailedParsing;
        assert_eq!(err.to_string(), "failed parsing: no parser matched the document");
    }

    #[test]
    fn quick_xml_errors_convert() {
        let err: ParsingError = quick_xml::Error::Io(std::sync::Arc::new(
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated"),
        ))
        .into();
        assert!(matches!(err, ParsingError::Xml(_)));
    }
}
