//! Streaming parsers and the top-level WS-Trust dispatch.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{StartTag, XmlCursor, XmlToken};
use tracing::debug;

use crate::constants::WST_NS;
use crate::types::{
    BinarySecret, EndpointReference, Entropy, Lifetime, RequestSecurityToken,
    RequestSecurityTokenCollection, RequestSecurityTokenResponse,
    RequestSecurityTokenResponseCollection, Status, WsTrustObject,
};

/// Entry point for all top-level WS-Trust documents.
pub struct WsTrustParser;

impl WsTrustParser {
    /// Parses an in-memory document.
    pub fn parse_str(input: &str) -> ParsingResult<WsTrustObject> {
        let mut cursor = XmlCursor::new(input);
        Self::parse(&mut cursor)
    }

    /// Parses the next top-level WS-Trust element from the cursor.
    pub fn parse(cursor: &mut XmlCursor<'_>) -> ParsingResult<WsTrustObject> {
        loop {
            let tag = match cursor.peek()? {
                XmlToken::Start(tag) => tag.clone(),
                XmlToken::Eof => return Err(ParsingError::FailedParsing),
                _ => {
                    cursor.next_token()?;
                    continue;
                }
            };

            if tag.name.namespace_uri != WST_NS {
                return Err(unknown_element(&tag));
            }
            debug!(element = %tag.name.local_name, "dispatching WS-Trust element");

            return match tag.name.local_name.as_str() {
                "RequestSecurityToken" => {
                    Ok(WsTrustObject::Request(parse_request_security_token(cursor)?))
                }
                "RequestSecurityTokenCollection" => {
                    Ok(WsTrustObject::RequestCollection(parse_request_collection(cursor)?))
                }
                "RequestSecurityTokenResponse" => {
                    Ok(WsTrustObject::Response(parse_response(cursor)?))
                }
                "RequestSecurityTokenResponseCollection" => {
                    Ok(WsTrustObject::ResponseCollection(parse_response_collection(cursor)?))
                }
                _ => Err(unknown_element(&tag)),
            };
        }
    }
}

fn unknown_element(tag: &StartTag) -> ParsingError {
    ParsingError::UnknownStartElement {
        name: tag.qualified_name(),
        offset: tag.offset,
    }
}

fn parse_timestamp(field: &str, value: &str) -> ParsingResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParsingError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Reads the text of a simple element whose start tag was already
/// consumed, returning through its end tag.
fn element_text(cursor: &mut XmlCursor<'_>) -> ParsingResult<String> {
    cursor.element_text()
}

/// Parses a `wst:RequestSecurityToken`.
pub fn parse_request_security_token(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<RequestSecurityToken> {
    let root = cursor.next_start_element()?;
    root.expect_name("RequestSecurityToken")?;

    let mut request = RequestSecurityToken {
        context: root.attribute("Context").map(str::to_string),
        ..RequestSecurityToken::default()
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("RequestSecurityToken")?;
            break;
        };
        match child.name.local_name.as_str() {
            "TokenType" => {
                cursor.next_start_element()?;
                request.token_type = Some(element_text(cursor)?);
            }
            "RequestType" => {
                cursor.next_start_element()?;
                request.request_type = Some(element_text(cursor)?);
            }
            "Lifetime" => request.lifetime = Some(parse_lifetime(cursor)?),
            "AppliesTo" => request.applies_to = Some(parse_applies_to(cursor)?),
            "Issuer" => request.issuer = Some(parse_issuer(cursor)?),
            "KeyType" => {
                cursor.next_start_element()?;
                request.key_type = Some(element_text(cursor)?);
            }
            "KeySize" => {
                cursor.next_start_element()?;
                let text = element_text(cursor)?;
                request.key_size =
                    Some(text.parse().map_err(|_| ParsingError::InvalidValue {
                        field: "KeySize".to_string(),
                        value: text.clone(),
                    })?);
            }
            "Entropy" => request.entropy = Some(parse_entropy(cursor)?),
            "ComputedKeyAlgorithm" => {
                cursor.next_start_element()?;
                request.computed_key_algorithm = Some(element_text(cursor)?);
            }
            "OnBehalfOf" => request.on_behalf_of = Some(parse_wrapped_token(cursor, "OnBehalfOf")?),
            "ValidateTarget" => {
                request.validate_target = Some(parse_wrapped_token(cursor, "ValidateTarget")?);
            }
            "RenewTarget" => {
                request.renew_target = Some(parse_wrapped_token(cursor, "RenewTarget")?);
            }
            "CancelTarget" => {
                request.cancel_target = Some(parse_wrapped_token(cursor, "CancelTarget")?);
            }
            "UseKey" => request.use_key = Some(parse_wrapped_token(cursor, "UseKey")?),
            _ => return Err(unknown_element(&child)),
        }
    }
    Ok(request)
}

fn parse_request_collection(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<RequestSecurityTokenCollection> {
    let root = cursor.next_start_element()?;
    root.expect_name("RequestSecurityTokenCollection")?;

    let mut collection = RequestSecurityTokenCollection::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor
                .next_end_element()?
                .expect_name("RequestSecurityTokenCollection")?;
            break;
        };
        if child.name.local_name == "RequestSecurityToken" {
            collection.requests.push(parse_request_security_token(cursor)?);
        } else {
            return Err(unknown_element(&child));
        }
    }
    Ok(collection)
}

/// Parses a `wst:RequestSecurityTokenResponse`.
pub fn parse_response(cursor: &mut XmlCursor<'_>) -> ParsingResult<RequestSecurityTokenResponse> {
    let root = cursor.next_start_element()?;
    root.expect_name("RequestSecurityTokenResponse")?;

    let mut response = RequestSecurityTokenResponse {
        context: root.attribute("Context").map(str::to_string),
        ..RequestSecurityTokenResponse::default()
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor
                .next_end_element()?
                .expect_name("RequestSecurityTokenResponse")?;
            break;
        };
        match child.name.local_name.as_str() {
            "TokenType" => {
                cursor.next_start_element()?;
                response.token_type = Some(element_text(cursor)?);
            }
            "Lifetime" => response.lifetime = Some(parse_lifetime(cursor)?),
            "KeyType" => {
                cursor.next_start_element()?;
                response.key_type = Some(element_text(cursor)?);
            }
            "KeySize" => {
                cursor.next_start_element()?;
                let text = element_text(cursor)?;
                response.key_size =
                    Some(text.parse().map_err(|_| ParsingError::InvalidValue {
                        field: "KeySize".to_string(),
                        value: text.clone(),
                    })?);
            }
            "Entropy" => response.entropy = Some(parse_entropy(cursor)?),
            "RequestedSecurityToken" => {
                response.requested_security_token =
                    Some(parse_wrapped_token(cursor, "RequestedSecurityToken")?);
            }
            "RequestedAttachedReference" => {
                response.requested_attached_reference =
                    Some(parse_wrapped_token(cursor, "RequestedAttachedReference")?);
            }
            "RequestedUnattachedReference" => {
                response.requested_unattached_reference =
                    Some(parse_wrapped_token(cursor, "RequestedUnattachedReference")?);
            }
            "RequestedProofToken" => {
                response.requested_proof_token =
                    Some(parse_wrapped_token(cursor, "RequestedProofToken")?);
            }
            "Status" => response.status = Some(parse_status(cursor)?),
            _ => return Err(unknown_element(&child)),
        }
    }
    Ok(response)
}

fn parse_response_collection(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<RequestSecurityTokenResponseCollection> {
    let root = cursor.next_start_element()?;
    root.expect_name("RequestSecurityTokenResponseCollection")?;

    let mut collection = RequestSecurityTokenResponseCollection::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor
                .next_end_element()?
                .expect_name("RequestSecurityTokenResponseCollection")?;
            break;
        };
        if child.name.local_name == "RequestSecurityTokenResponse" {
            collection.responses.push(parse_response(cursor)?);
        } else {
            return Err(unknown_element(&child));
        }
    }
    Ok(collection)
}

/// Consumes a wrapper element and captures its single child as opaque DOM.
fn parse_wrapped_token(
    cursor: &mut XmlCursor<'_>,
    wrapper: &str,
) -> ParsingResult<fedlink_xml::DomElement> {
    let tag = cursor.next_start_element()?;
    tag.expect_name(wrapper)?;
    let inner = cursor.dom_element()?;
    cursor.next_end_element()?.expect_name(wrapper)?;
    Ok(inner)
}

fn parse_lifetime(cursor: &mut XmlCursor<'_>) -> ParsingResult<Lifetime> {
    let root = cursor.next_start_element()?;
    root.expect_name("Lifetime")?;

    let mut lifetime = Lifetime::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Lifetime")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Created" => {
                cursor.next_start_element()?;
                lifetime.created = Some(parse_timestamp("Created", &element_text(cursor)?)?);
            }
            "Expires" => {
                cursor.next_start_element()?;
                lifetime.expires = Some(parse_timestamp("Expires", &element_text(cursor)?)?);
            }
            _ => return Err(unknown_element(&child)),
        }
    }
    Ok(lifetime)
}

fn parse_entropy(cursor: &mut XmlCursor<'_>) -> ParsingResult<Entropy> {
    let root = cursor.next_start_element()?;
    root.expect_name("Entropy")?;

    let mut entropy = Entropy::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Entropy")?;
            break;
        };
        if child.name.local_name == "BinarySecret" {
            let tag = cursor.next_start_element()?;
            let secret_type = tag.attribute("Type").map(str::to_string);
            let text = element_text(cursor)?;
            let value = BASE64
                .decode(text.trim())
                .map_err(|_| ParsingError::InvalidValue {
                    field: "BinarySecret".to_string(),
                    value: text.clone(),
                })?;
            entropy.binary_secret = Some(BinarySecret { secret_type, value });
        } else {
            return Err(unknown_element(&child));
        }
    }
    Ok(entropy)
}

/// Parses `wst:Issuer`, which wraps a bare `wsa:Address`.
fn parse_issuer(cursor: &mut XmlCursor<'_>) -> ParsingResult<EndpointReference> {
    let root = cursor.next_start_element()?;
    root.expect_name("Issuer")?;
    let address_tag = cursor.next_start_element()?;
    address_tag.expect_name("Address")?;
    let address = element_text(cursor)?;
    cursor.next_end_element()?.expect_name("Issuer")?;
    Ok(EndpointReference::new(address))
}

/// Parses `wsp:AppliesTo`, which wraps a `wsa:EndpointReference`.
fn parse_applies_to(cursor: &mut XmlCursor<'_>) -> ParsingResult<EndpointReference> {
    let root = cursor.next_start_element()?;
    root.expect_name("AppliesTo")?;
    let epr_tag = cursor.next_start_element()?;
    epr_tag.expect_name("EndpointReference")?;
    let address_tag = cursor.next_start_element()?;
    address_tag.expect_name("Address")?;
    let address = element_text(cursor)?;
    cursor.next_end_element()?.expect_name("EndpointReference")?;
    cursor.next_end_element()?.expect_name("AppliesTo")?;
    Ok(EndpointReference::new(address))
}

fn parse_status(cursor: &mut XmlCursor<'_>) -> ParsingResult<Status> {
    let root = cursor.next_start_element()?;
    root.expect_name("Status")?;

    let mut code = None;
    let mut reason = None;
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Status")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Code" => {
                cursor.next_start_element()?;
                code = Some(element_text(cursor)?);
            }
            "Reason" => {
                cursor.next_start_element()?;
                reason = Some(element_text(cursor)?);
            }
            _ => return Err(unknown_element(&child)),
        }
    }

    Ok(Status {
        code: code.ok_or_else(|| ParsingError::MissingChild {
            element: "Status".to_string(),
            child: "Code".to_string(),
        })?,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{key_types, request_types, status_codes};

    #[test]
    fn issue_request_parses() {
        let doc = r#"<wst:RequestSecurityToken Context="ctx-1"
            xmlns:wst="http://docs.oasis-open.org/ws-sx/ws-trust/200512"
            xmlns:wsp="http://schemas.xmlsoap.org/ws/2004/09/policy"
            xmlns:wsa="http://www.w3.org/2005/08/addressing">
            <wst:TokenType>urn:oasis:names:tc:SAML:2.0:assertion</wst:TokenType>
            <wst:RequestType>http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue</wst:RequestType>
            <wsp:AppliesTo>
                <wsa:EndpointReference>
                    <wsa:Address>http://service</wsa:Address>
                </wsa:EndpointReference>
            </wsp:AppliesTo>
            <wst:KeyType>http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer</wst:KeyType>
            <wst:KeySize>256</wst:KeySize>
        </wst:RequestSecurityToken>"#;
        let WsTrustObject::Request(request) = WsTrustParser::parse_str(doc).unwrap() else {
            panic!("expected a request");
        };
        assert_eq!(request.context.as_deref(), Some("ctx-1"));
        assert_eq!(request.request_type.as_deref(), Some(request_types::ISSUE));
        assert_eq!(request.applies_to.unwrap().address, "http://service");
        assert_eq!(request.key_type.as_deref(), Some(key_types::BEARER));
        assert_eq!(request.key_size, Some(256));
    }

    #[test]
    fn validate_target_is_captured_opaquely() {
        let doc = r#"<wst:RequestSecurityToken
            xmlns:wst="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
            <wst:RequestType>http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate</wst:RequestType>
            <wst:ValidateTarget>
                <saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="ID_t">
                    <saml:Issuer>http://idp</saml:Issuer>
                </saml:Assertion>
            </wst:ValidateTarget>
        </wst:RequestSecurityToken>"#;
        let WsTrustObject::Request(request) = WsTrustParser::parse_str(doc).unwrap() else {
            panic!("expected a request");
        };
        let target = request.validate_target.unwrap();
        assert_eq!(target.name.local_name, "Assertion");
        assert_eq!(target.attribute("ID"), Some("ID_t"));
    }

    #[test]
    fn response_collection_parses() {
        let doc = r#"<wst:RequestSecurityTokenResponseCollection
            xmlns:wst="http://docs.oasis-open.org/ws-sx/ws-trust/200512"
            xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
            <wst:RequestSecurityTokenResponse Context="ctx-1">
                <wst:TokenType>urn:oasis:names:tc:SAML:2.0:assertion</wst:TokenType>
                <wst:Lifetime>
                    <wsu:Created>2024-01-01T00:00:00.000Z</wsu:Created>
                    <wsu:Expires>2024-01-01T01:00:00.000Z</wsu:Expires>
                </wst:Lifetime>
                <wst:RequestedSecurityToken>
                    <saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion" ID="ID_i">
                        <saml:Issuer>http://sts</saml:Issuer>
                    </saml:Assertion>
                </wst:RequestedSecurityToken>
                <wst:Status>
                    <wst:Code>http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/valid</wst:Code>
                </wst:Status>
            </wst:RequestSecurityTokenResponse>
        </wst:RequestSecurityTokenResponseCollection>"#;
        let WsTrustObject::ResponseCollection(collection) =
            WsTrustParser::parse_str(doc).unwrap()
        else {
            panic!("expected a response collection");
        };
        let response = &collection.responses[0];
        assert_eq!(response.context.as_deref(), Some("ctx-1"));
        assert!(response.lifetime.as_ref().unwrap().expires.is_some());
        assert_eq!(
            response
                .requested_security_token
                .as_ref()
                .unwrap()
                .name
                .local_name,
            "Assertion"
        );
        assert_eq!(response.status.as_ref().unwrap().code, status_codes::VALID);
    }

    #[test]
    fn entropy_binary_secret_is_decoded() {
        let doc = r#"<wst:RequestSecurityToken
            xmlns:wst="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
            <wst:Entropy>
                <wst:BinarySecret Type="http://docs.oasis-open.org/ws-sx/ws-trust/200512/Nonce">aGVsbG8=</wst:BinarySecret>
            </wst:Entropy>
        </wst:RequestSecurityToken>"#;
        let WsTrustObject::Request(request) = WsTrustParser::parse_str(doc).unwrap() else {
            panic!("expected a request");
        };
        let secret = request.entropy.unwrap().binary_secret.unwrap();
        assert_eq!(secret.value, b"hello");
        assert_eq!(
            secret.secret_type.as_deref(),
            Some(crate::constants::binary_secret_types::NONCE)
        );
    }

    #[test]
    fn unknown_top_level_fails() {
        let err = WsTrustParser::parse_str(r#"<Bogus xmlns="urn:example"/>"#).unwrap_err();
        assert!(matches!(err, ParsingError::UnknownStartElement { .. }));
    }
}
