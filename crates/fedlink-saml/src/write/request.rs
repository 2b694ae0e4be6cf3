//! Writers for the SAML 2.0 protocol request family.

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use super::{assertion, bool_str, timestamp_attr, write_name_id};
use crate::types::constants::{
    ASSERTION_NS, ASSERTION_PREFIX, PROTOCOL_NS, PROTOCOL_PREFIX, SAML_XACML_NS,
};
use crate::types::{
    ArtifactResolve, AttributeQuery, AuthnRequest, LogoutRequest, RequestBase, XacmlAuthzQuery,
};

/// Opens a protocol root element, declaring the conventional prefixes and
/// writing the common request attributes.
fn open_request_root<W: Write>(
    writer: &mut XmlWriter<W>,
    local: &str,
    base: &RequestBase,
) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), local)?;
    writer.ns_decl(PROTOCOL_PREFIX, PROTOCOL_NS)?;
    writer.ns_decl(ASSERTION_PREFIX, ASSERTION_NS)?;
    write_base_attributes(writer, base)
}

fn write_base_attributes<W: Write>(
    writer: &mut XmlWriter<W>,
    base: &RequestBase,
) -> ProcessingResult<()> {
    writer.attribute("ID", &base.id)?;
    writer.attribute("Version", "2.0")?;
    timestamp_attr(writer, "IssueInstant", &base.issue_instant)?;
    if let Some(destination) = &base.destination {
        writer.attribute("Destination", destination)?;
    }
    if let Some(consent) = &base.consent {
        writer.attribute("Consent", consent)?;
    }
    Ok(())
}

fn write_common_children<W: Write>(
    writer: &mut XmlWriter<W>,
    base: &RequestBase,
) -> ProcessingResult<()> {
    if let Some(issuer) = &base.issuer {
        write_name_id(writer, ASSERTION_PREFIX, "Issuer", issuer)?;
    }
    if let Some(signature) = &base.signature {
        writer.write_dom(signature)?;
    }
    Ok(())
}

/// Writes a `samlp:AuthnRequest`.
pub fn write_authn_request<W: Write>(
    writer: &mut XmlWriter<W>,
    request: &AuthnRequest,
) -> ProcessingResult<()> {
    open_request_root(writer, "AuthnRequest", &request.base)?;
    if let Some(value) = request.force_authn {
        writer.attribute("ForceAuthn", bool_str(value))?;
    }
    if let Some(value) = request.is_passive {
        writer.attribute("IsPassive", bool_str(value))?;
    }
    if let Some(value) = &request.protocol_binding {
        writer.attribute("ProtocolBinding", value)?;
    }
    if let Some(value) = &request.assertion_consumer_service_url {
        writer.attribute("AssertionConsumerServiceURL", value)?;
    }
    if let Some(value) = request.assertion_consumer_service_index {
        writer.attribute("AssertionConsumerServiceIndex", &value.to_string())?;
    }
    if let Some(value) = request.attribute_consuming_service_index {
        writer.attribute("AttributeConsumingServiceIndex", &value.to_string())?;
    }
    if let Some(value) = &request.provider_name {
        writer.attribute("ProviderName", value)?;
    }

    write_common_children(writer, &request.base)?;
    if let Some(subject) = &request.subject {
        assertion::write_subject(writer, subject)?;
    }
    if let Some(policy) = &request.name_id_policy {
        writer.start_element(Some(PROTOCOL_PREFIX), "NameIDPolicy")?;
        if let Some(format) = &policy.format {
            writer.attribute("Format", format)?;
        }
        if let Some(qualifier) = &policy.sp_name_qualifier {
            writer.attribute("SPNameQualifier", qualifier)?;
        }
        if let Some(allow) = policy.allow_create {
            writer.attribute("AllowCreate", bool_str(allow))?;
        }
        writer.end_element()?;
    }
    if let Some(conditions) = &request.conditions {
        assertion::write_conditions(writer, conditions)?;
    }
    if let Some(context) = &request.requested_authn_context {
        writer.start_element(Some(PROTOCOL_PREFIX), "RequestedAuthnContext")?;
        if let Some(comparison) = &context.comparison {
            writer.attribute("Comparison", comparison)?;
        }
        for class_ref in &context.class_refs {
            writer.start_element(Some(ASSERTION_PREFIX), "AuthnContextClassRef")?;
            writer.text(class_ref)?;
            writer.end_element()?;
        }
        writer.end_element()?;
    }
    writer.end_element()
}

/// Writes a `samlp:LogoutRequest`.
pub fn write_logout_request<W: Write>(
    writer: &mut XmlWriter<W>,
    request: &LogoutRequest,
) -> ProcessingResult<()> {
    open_request_root(writer, "LogoutRequest", &request.base)?;
    if let Some(instant) = &request.not_on_or_after {
        timestamp_attr(writer, "NotOnOrAfter", instant)?;
    }
    if let Some(reason) = &request.reason {
        writer.attribute("Reason", reason)?;
    }

    write_common_children(writer, &request.base)?;
    if let Some(name_id) = &request.name_id {
        write_name_id(writer, ASSERTION_PREFIX, "NameID", name_id)?;
    }
    for index in &request.session_indexes {
        writer.start_element(Some(PROTOCOL_PREFIX), "SessionIndex")?;
        writer.text(index)?;
        writer.end_element()?;
    }
    writer.end_element()
}

/// Writes a `samlp:ArtifactResolve`.
pub fn write_artifact_resolve<W: Write>(
    writer: &mut XmlWriter<W>,
    request: &ArtifactResolve,
) -> ProcessingResult<()> {
    open_request_root(writer, "ArtifactResolve", &request.base)?;
    write_common_children(writer, &request.base)?;
    writer.start_element(Some(PROTOCOL_PREFIX), "Artifact")?;
    writer.text(&request.artifact)?;
    writer.end_element()?;
    writer.end_element()
}

/// Writes a `samlp:AttributeQuery`.
pub fn write_attribute_query<W: Write>(
    writer: &mut XmlWriter<W>,
    query: &AttributeQuery,
) -> ProcessingResult<()> {
    open_request_root(writer, "AttributeQuery", &query.base)?;
    write_common_children(writer, &query.base)?;
    if let Some(subject) = &query.subject {
        assertion::write_subject(writer, subject)?;
    }
    for attribute in &query.attributes {
        assertion::write_attribute(writer, attribute)?;
    }
    writer.end_element()
}

/// Writes a XACML authorization decision query using its dedicated
/// element form.
pub fn write_xacml_query<W: Write>(
    writer: &mut XmlWriter<W>,
    query: &XacmlAuthzQuery,
) -> ProcessingResult<()> {
    writer.start_element(Some("xacml-samlp"), "XACMLAuthzDecisionQuery")?;
    writer.ns_decl("xacml-samlp", SAML_XACML_NS)?;
    writer.ns_decl(ASSERTION_PREFIX, ASSERTION_NS)?;
    write_base_attributes(writer, &query.base)?;
    writer.attribute("InputContextOnly", bool_str(query.input_context_only))?;
    writer.attribute("ReturnContext", bool_str(query.return_context))?;

    write_common_children(writer, &query.base)?;
    if let Some(request) = &query.xacml_request {
        writer.write_dom(request)?;
    }
    writer.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::time::parse_timestamp;
    use crate::types::{NameId, NameIdPolicy, RequestedAuthnContext};
    use fedlink_xml::XmlCursor;

    fn fixed_instant() -> chrono::DateTime<chrono::Utc> {
        parse_timestamp("IssueInstant", "2024-03-01T12:30:45.000Z").unwrap()
    }

    #[test]
    fn authn_request_round_trips() {
        let mut request = AuthnRequest::with_id("ID_abc")
            .with_issuer("http://sp")
            .with_destination("http://idp/sso");
        request.base.issue_instant = fixed_instant();
        request.force_authn = Some(false);
        request.assertion_consumer_service_url = Some("http://sp/acs".to_string());
        request.name_id_policy = Some(NameIdPolicy {
            format: Some("urn:oasis:names:tc:SAML:2.0:nameid-format:persistent".to_string()),
            sp_name_qualifier: None,
            allow_create: Some(true),
        });
        request.requested_authn_context = Some(RequestedAuthnContext {
            class_refs: vec!["urn:oasis:names:tc:SAML:2.0:ac:classes:Password".to_string()],
            comparison: Some("exact".to_string()),
        });

        let xml = super::super::render(|w| write_authn_request(w, &request)).unwrap();
        let parsed = parse::request::parse_authn_request(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn logout_request_round_trips() {
        let mut request = LogoutRequest::new();
        request.base.id = "ID_lo".to_string();
        request.base.issue_instant = fixed_instant();
        request.base.issuer = Some(NameId::new("http://sp"));
        request.name_id = Some(NameId::new("alice"));
        request.session_indexes = vec!["s1".to_string(), "s2".to_string()];

        let xml = super::super::render(|w| write_logout_request(w, &request)).unwrap();
        let parsed = parse::request::parse_logout_request(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn artifact_resolve_carries_artifact_text() {
        let request = ArtifactResolve {
            base: RequestBase {
                issue_instant: fixed_instant(),
                ..RequestBase::with_id("ID_ar")
            },
            artifact: "AAQAA...artifact".to_string(),
        };
        let xml = super::super::render(|w| write_artifact_resolve(w, &request)).unwrap();
        assert!(xml.contains("<samlp:Artifact>AAQAA...artifact</samlp:Artifact>"));
        let parsed = parse::request::parse_artifact_resolve(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, request);
    }
}
