//! Streaming parsers and the top-level dispatch.

pub mod assertion;
pub mod metadata;
pub mod request;
pub mod response;
pub mod saml11;
pub(crate) mod util;

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{XmlCursor, XmlToken};
use tracing::debug;

use crate::types::constants::{
    PROTOCOL_NS, SAML11_ASSERTION_NS, SAML11_PROTOCOL_NS, XACML_AUTHZ_DECISION_QUERY_TYPE,
};
use crate::types::SamlObject;

/// Entry point for all top-level SAML documents.
///
/// The dispatch rules are ordered: namespace-qualified matches take
/// priority over the local-name-only fallbacks so SAML 1.1 and SAML 2.0
/// elements that share a local name never collide. The `Assertion` match
/// is case-insensitive while `EncryptedAssertion` is exact; this
/// asymmetry is load-bearing for interoperability and must not be
/// normalized.
pub struct SamlParser;

impl SamlParser {
    /// Parses an in-memory document.
    pub fn parse_str(input: &str) -> ParsingResult<SamlObject> {
        let mut cursor = XmlCursor::new(input);
        Self::parse(&mut cursor)
    }

    /// Parses the next top-level SAML element from the cursor.
    pub fn parse(cursor: &mut XmlCursor<'_>) -> ParsingResult<SamlObject> {
        loop {
            let tag = match cursor.peek()? {
                XmlToken::Start(tag) => tag.clone(),
                XmlToken::Eof => return Err(ParsingError::FailedParsing),
                // Stray character data or a dangling end tag between
                // documents is consumed and ignored.
                _ => {
                    cursor.next_token()?;
                    continue;
                }
            };

            let ns = tag.name.namespace_uri.as_str();
            let local = tag.name.local_name.as_str();
            debug!(namespace = ns, element = local, "dispatching top-level element");

            if local.eq_ignore_ascii_case("Assertion") || local == "EncryptedAssertion" {
                if ns == SAML11_ASSERTION_NS {
                    return Ok(SamlObject::Saml11Assertion(saml11::parse_assertion(cursor)?));
                }
                if local == "EncryptedAssertion" {
                    return Ok(SamlObject::EncryptedAssertion(cursor.dom_element()?));
                }
                return Ok(SamlObject::Assertion(assertion::parse_assertion(cursor)?));
            }
            if ns == PROTOCOL_NS && local == "AuthnRequest" {
                return Ok(SamlObject::AuthnRequest(request::parse_authn_request(cursor)?));
            }
            if ns == PROTOCOL_NS && local == "LogoutRequest" {
                return Ok(SamlObject::LogoutRequest(request::parse_logout_request(cursor)?));
            }
            if ns == PROTOCOL_NS && local == "LogoutResponse" {
                return Ok(SamlObject::LogoutResponse(response::parse_logout_response(
                    cursor,
                )?));
            }
            if ns == PROTOCOL_NS && local == "Response" {
                return Ok(SamlObject::Response(response::parse_response(cursor)?));
            }
            if ns == PROTOCOL_NS && local == "RequestAbstract" {
                let xsi_type = tag
                    .xsi_type()
                    .map(str::to_string)
                    .ok_or_else(|| ParsingError::UnknownXsiType(String::new()))?;
                if xsi_type.contains(XACML_AUTHZ_DECISION_QUERY_TYPE) {
                    return Ok(SamlObject::XacmlAuthzQuery(request::parse_xacml_query(cursor)?));
                }
                return Err(ParsingError::UnknownXsiType(xsi_type));
            }
            if ns == PROTOCOL_NS && local == "ArtifactResolve" {
                return Ok(SamlObject::ArtifactResolve(request::parse_artifact_resolve(
                    cursor,
                )?));
            }
            if ns == PROTOCOL_NS && local == "ArtifactResponse" {
                return Ok(SamlObject::ArtifactResponse(response::parse_artifact_response(
                    cursor,
                )?));
            }
            if ns == PROTOCOL_NS && local == "AttributeQuery" {
                return Ok(SamlObject::AttributeQuery(request::parse_attribute_query(
                    cursor,
                )?));
            }
            if local == "XACMLAuthzDecisionQuery" {
                return Ok(SamlObject::XacmlAuthzQuery(request::parse_xacml_query(cursor)?));
            }
            if local == "EntityDescriptor" {
                return Ok(SamlObject::EntityDescriptor(metadata::parse_entity_descriptor(
                    cursor,
                )?));
            }
            if local == "EntitiesDescriptor" {
                return Ok(SamlObject::EntitiesDescriptor(
                    metadata::parse_entities_descriptor(cursor)?,
                ));
            }
            if ns == SAML11_PROTOCOL_NS && local == "Response" {
                return Ok(SamlObject::Saml11Response(saml11::parse_response(cursor)?));
            }
            if ns == SAML11_PROTOCOL_NS && local == "Request" {
                return Ok(SamlObject::Saml11Request(saml11::parse_request(cursor)?));
            }

            return Err(util::unknown_element(&tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_top_level_fails() {
        let err = SamlParser::parse_str(r#"<Bogus xmlns="urn:example"/>"#).unwrap_err();
        assert!(matches!(err, ParsingError::UnknownStartElement { .. }));
    }

    #[test]
    fn empty_stream_is_failed_parsing() {
        let err = SamlParser::parse_str("").unwrap_err();
        assert!(matches!(err, ParsingError::FailedParsing));
    }

    #[test]
    fn assertion_local_name_is_case_insensitive() {
        // Wrong case still routes to the assertion parser, which then
        // rejects the tag name itself; the point is that dispatch does
        // not fall through to the unknown-element failure.
        let doc = r#"<saml:ASSERTION xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="ID_1" Version="2.0" IssueInstant="2024-01-01T00:00:00Z">
            <saml:Issuer>http://idp</saml:Issuer>
        </saml:ASSERTION>"#;
        let err = SamlParser::parse_str(doc).unwrap_err();
        assert!(matches!(err, ParsingError::ExpectedTag { .. }));
    }

    #[test]
    fn request_abstract_requires_known_xsi_type() {
        let doc = r#"<samlp:RequestAbstract
            xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
            xsi:type="xacml-samlp:SomeOtherType" ID="ID_1" Version="2.0"
            IssueInstant="2024-01-01T00:00:00Z"/>"#;
        let err = SamlParser::parse_str(doc).unwrap_err();
        assert!(matches!(err, ParsingError::UnknownXsiType(_)));
    }
}
