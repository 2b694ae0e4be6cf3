//! Writers mirroring the WS-Trust parsers.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use fedlink_core::ProcessingResult;
use fedlink_xml::{DomElement, XmlWriter};

use crate::constants::{
    WSA_NS, WSA_PREFIX, WSP_NS, WSP_PREFIX, WST_NS, WST_PREFIX, WSU_NS, WSU_PREFIX,
};
use crate::types::{
    Entropy, Lifetime, RequestSecurityToken, RequestSecurityTokenCollection,
    RequestSecurityTokenResponse, RequestSecurityTokenResponseCollection, Status, WsTrustObject,
};

/// Serializes any top-level WS-Trust message to a document fragment.
pub fn to_xml_string(object: &WsTrustObject) -> ProcessingResult<String> {
    let mut writer = XmlWriter::new(Vec::new());
    match object {
        WsTrustObject::Request(inner) => write_request(&mut writer, inner, true)?,
        WsTrustObject::RequestCollection(inner) => write_request_collection(&mut writer, inner)?,
        WsTrustObject::Response(inner) => write_response(&mut writer, inner, true)?,
        WsTrustObject::ResponseCollection(inner) => write_response_collection(&mut writer, inner)?,
    }
    writer.into_string()
}

fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn declare_namespaces<W: Write>(writer: &mut XmlWriter<W>) -> ProcessingResult<()> {
    writer.ns_decl(WST_PREFIX, WST_NS)?;
    writer.ns_decl(WSP_PREFIX, WSP_NS)?;
    writer.ns_decl(WSA_PREFIX, WSA_NS)?;
    writer.ns_decl(WSU_PREFIX, WSU_NS)
}

/// Writes a `wst:RequestSecurityToken`.
pub fn write_request<W: Write>(
    writer: &mut XmlWriter<W>,
    request: &RequestSecurityToken,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "RequestSecurityToken")?;
    if declare_ns {
        declare_namespaces(writer)?;
    }
    if let Some(context) = &request.context {
        writer.attribute("Context", context)?;
    }
    if let Some(token_type) = &request.token_type {
        text_element(writer, "TokenType", token_type)?;
    }
    if let Some(request_type) = &request.request_type {
        text_element(writer, "RequestType", request_type)?;
    }
    if let Some(lifetime) = &request.lifetime {
        write_lifetime(writer, lifetime)?;
    }
    if let Some(applies_to) = &request.applies_to {
        writer.start_element(Some(WSP_PREFIX), "AppliesTo")?;
        writer.start_element(Some(WSA_PREFIX), "EndpointReference")?;
        writer.start_element(Some(WSA_PREFIX), "Address")?;
        writer.text(&applies_to.address)?;
        writer.end_element()?;
        writer.end_element()?;
        writer.end_element()?;
    }
    if let Some(issuer) = &request.issuer {
        writer.start_element(Some(WST_PREFIX), "Issuer")?;
        writer.start_element(Some(WSA_PREFIX), "Address")?;
        writer.text(&issuer.address)?;
        writer.end_element()?;
        writer.end_element()?;
    }
    if let Some(key_type) = &request.key_type {
        text_element(writer, "KeyType", key_type)?;
    }
    if let Some(key_size) = request.key_size {
        text_element(writer, "KeySize", &key_size.to_string())?;
    }
    if let Some(entropy) = &request.entropy {
        write_entropy(writer, entropy)?;
    }
    if let Some(algorithm) = &request.computed_key_algorithm {
        text_element(writer, "ComputedKeyAlgorithm", algorithm)?;
    }
    if let Some(token) = &request.on_behalf_of {
        wrapped_token(writer, "OnBehalfOf", token)?;
    }
    if let Some(token) = &request.validate_target {
        wrapped_token(writer, "ValidateTarget", token)?;
    }
    if let Some(token) = &request.renew_target {
        wrapped_token(writer, "RenewTarget", token)?;
    }
    if let Some(token) = &request.cancel_target {
        wrapped_token(writer, "CancelTarget", token)?;
    }
    if let Some(token) = &request.use_key {
        wrapped_token(writer, "UseKey", token)?;
    }
    writer.end_element()
}

fn write_request_collection<W: Write>(
    writer: &mut XmlWriter<W>,
    collection: &RequestSecurityTokenCollection,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "RequestSecurityTokenCollection")?;
    declare_namespaces(writer)?;
    for request in &collection.requests {
        write_request(writer, request, false)?;
    }
    writer.end_element()
}

/// Writes a `wst:RequestSecurityTokenResponse`.
pub fn write_response<W: Write>(
    writer: &mut XmlWriter<W>,
    response: &RequestSecurityTokenResponse,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "RequestSecurityTokenResponse")?;
    if declare_ns {
        declare_namespaces(writer)?;
    }
    if let Some(context) = &response.context {
        writer.attribute("Context", context)?;
    }
    if let Some(token_type) = &response.token_type {
        text_element(writer, "TokenType", token_type)?;
    }
    if let Some(lifetime) = &response.lifetime {
        write_lifetime(writer, lifetime)?;
    }
    if let Some(key_type) = &response.key_type {
        text_element(writer, "KeyType", key_type)?;
    }
    if let Some(key_size) = response.key_size {
        text_element(writer, "KeySize", &key_size.to_string())?;
    }
    if let Some(entropy) = &response.entropy {
        write_entropy(writer, entropy)?;
    }
    if let Some(token) = &response.requested_security_token {
        wrapped_token(writer, "RequestedSecurityToken", token)?;
    }
    if let Some(token) = &response.requested_attached_reference {
        wrapped_token(writer, "RequestedAttachedReference", token)?;
    }
    if let Some(token) = &response.requested_unattached_reference {
        wrapped_token(writer, "RequestedUnattachedReference", token)?;
    }
    if let Some(token) = &response.requested_proof_token {
        wrapped_token(writer, "RequestedProofToken", token)?;
    }
    if let Some(status) = &response.status {
        write_status(writer, status)?;
    }
    writer.end_element()
}

fn write_response_collection<W: Write>(
    writer: &mut XmlWriter<W>,
    collection: &RequestSecurityTokenResponseCollection,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "RequestSecurityTokenResponseCollection")?;
    declare_namespaces(writer)?;
    for response in &collection.responses {
        write_response(writer, response, false)?;
    }
    writer.end_element()
}

fn text_element<W: Write>(
    writer: &mut XmlWriter<W>,
    local: &str,
    text: &str,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), local)?;
    writer.text(text)?;
    writer.end_element()
}

fn wrapped_token<W: Write>(
    writer: &mut XmlWriter<W>,
    wrapper: &str,
    token: &DomElement,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), wrapper)?;
    writer.write_dom(token)?;
    writer.end_element()
}

fn write_lifetime<W: Write>(
    writer: &mut XmlWriter<W>,
    lifetime: &Lifetime,
) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "Lifetime")?;
    if let Some(created) = &lifetime.created {
        writer.start_element(Some(WSU_PREFIX), "Created")?;
        writer.text(&format_timestamp(created))?;
        writer.end_element()?;
    }
    if let Some(expires) = &lifetime.expires {
        writer.start_element(Some(WSU_PREFIX), "Expires")?;
        writer.text(&format_timestamp(expires))?;
        writer.end_element()?;
    }
    writer.end_element()
}

fn write_entropy<W: Write>(writer: &mut XmlWriter<W>, entropy: &Entropy) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "Entropy")?;
    if let Some(secret) = &entropy.binary_secret {
        writer.start_element(Some(WST_PREFIX), "BinarySecret")?;
        if let Some(secret_type) = &secret.secret_type {
            writer.attribute("Type", secret_type)?;
        }
        writer.text(&BASE64.encode(&secret.value))?;
        writer.end_element()?;
    }
    writer.end_element()
}

fn write_status<W: Write>(writer: &mut XmlWriter<W>, status: &Status) -> ProcessingResult<()> {
    writer.start_element(Some(WST_PREFIX), "Status")?;
    text_element(writer, "Code", &status.code)?;
    if let Some(reason) = &status.reason {
        text_element(writer, "Reason", reason)?;
    }
    writer.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{binary_secret_types, key_types, request_types};
    use crate::parse::WsTrustParser;
    use crate::types::{BinarySecret, EndpointReference};

    fn fixed_instant() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:30:45.000Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn issue_request_round_trips() {
        let request = RequestSecurityToken {
            context: Some("ctx-1".to_string()),
            token_type: Some("urn:oasis:names:tc:SAML:2.0:assertion".to_string()),
            request_type: Some(request_types::ISSUE.to_string()),
            lifetime: Some(Lifetime {
                created: Some(fixed_instant()),
                expires: Some(fixed_instant() + chrono::Duration::hours(1)),
            }),
            applies_to: Some(EndpointReference::new("http://service")),
            key_type: Some(key_types::BEARER.to_string()),
            entropy: Some(Entropy {
                binary_secret: Some(BinarySecret {
                    secret_type: Some(binary_secret_types::NONCE.to_string()),
                    value: b"hello".to_vec(),
                }),
            }),
            ..RequestSecurityToken::default()
        };
        let xml = to_xml_string(&WsTrustObject::Request(request.clone())).unwrap();
        let parsed = WsTrustParser::parse_str(&xml).unwrap();
        assert_eq!(parsed, WsTrustObject::Request(request));
    }

    #[test]
    fn response_collection_round_trips() {
        let response = RequestSecurityTokenResponse {
            context: Some("ctx-1".to_string()),
            token_type: Some("urn:oasis:names:tc:SAML:2.0:assertion".to_string()),
            lifetime: Some(Lifetime {
                created: Some(fixed_instant()),
                expires: Some(fixed_instant() + chrono::Duration::hours(1)),
            }),
            status: Some(Status::valid()),
            ..RequestSecurityTokenResponse::default()
        };
        let collection = RequestSecurityTokenResponseCollection {
            responses: vec![response],
        };
        let xml =
            to_xml_string(&WsTrustObject::ResponseCollection(collection.clone())).unwrap();
        let parsed = WsTrustParser::parse_str(&xml).unwrap();
        assert_eq!(parsed, WsTrustObject::ResponseCollection(collection));
    }

    #[test]
    fn status_reason_is_written() {
        let response = RequestSecurityTokenResponse {
            status: Some(Status::invalid("token expired")),
            ..RequestSecurityTokenResponse::default()
        };
        let xml = to_xml_string(&WsTrustObject::Response(response)).unwrap();
        assert!(xml.contains("<wst:Reason>token expired</wst:Reason>"));
    }
}
