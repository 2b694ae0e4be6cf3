//! Writers for the SAML 2.0 protocol response family.

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use super::{assertion, request, timestamp_attr, write_name_id};
use crate::types::constants::{ASSERTION_NS, ASSERTION_PREFIX, PROTOCOL_NS, PROTOCOL_PREFIX};
use crate::types::{
    ArtifactContent, ArtifactResponse, LogoutResponse, Response, ResponseItem, Status, StatusCode,
    StatusResponse,
};

/// Opens a protocol root element, declaring the conventional prefixes and
/// writing the common response attributes.
fn open_response_root<W: Write>(
    writer: &mut XmlWriter<W>,
    local: &str,
    base: &StatusResponse,
) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), local)?;
    writer.ns_decl(PROTOCOL_PREFIX, PROTOCOL_NS)?;
    writer.ns_decl(ASSERTION_PREFIX, ASSERTION_NS)?;
    writer.attribute("ID", &base.id)?;
    if let Some(value) = &base.in_response_to {
        writer.attribute("InResponseTo", value)?;
    }
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

/// Writes the common children in canonical order: issuer, signature,
/// status.
fn write_common_children<W: Write>(
    writer: &mut XmlWriter<W>,
    base: &StatusResponse,
) -> ProcessingResult<()> {
    if let Some(issuer) = &base.issuer {
        write_name_id(writer, ASSERTION_PREFIX, "Issuer", issuer)?;
    }
    if let Some(signature) = &base.signature {
        writer.write_dom(signature)?;
    }
    write_status(writer, &base.status)
}

/// Writes a `samlp:Status` with its possibly nested code.
pub fn write_status<W: Write>(writer: &mut XmlWriter<W>, status: &Status) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), "Status")?;
    write_status_code(writer, &status.code)?;
    if let Some(message) = &status.message {
        writer.start_element(Some(PROTOCOL_PREFIX), "StatusMessage")?;
        writer.text(message)?;
        writer.end_element()?;
    }
    if let Some(detail) = &status.detail {
        writer.write_dom(detail)?;
    }
    writer.end_element()
}

fn write_status_code<W: Write>(
    writer: &mut XmlWriter<W>,
    code: &StatusCode,
) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), "StatusCode")?;
    writer.attribute("Value", &code.value)?;
    if let Some(sub_code) = &code.sub_code {
        write_status_code(writer, sub_code)?;
    }
    writer.end_element()
}

/// Writes a `samlp:Response`.
pub fn write_response<W: Write>(
    writer: &mut XmlWriter<W>,
    response: &Response,
) -> ProcessingResult<()> {
    open_response_root(writer, "Response", &response.base)?;
    write_common_children(writer, &response.base)?;
    for item in &response.assertions {
        match item {
            ResponseItem::Assertion(inner) => assertion::write_assertion(writer, inner, false)?,
            ResponseItem::Encrypted(dom) => writer.write_dom(dom)?,
        }
    }
    writer.end_element()
}

/// Writes a `samlp:LogoutResponse`.
pub fn write_logout_response<W: Write>(
    writer: &mut XmlWriter<W>,
    response: &LogoutResponse,
) -> ProcessingResult<()> {
    open_response_root(writer, "LogoutResponse", &response.base)?;
    write_common_children(writer, &response.base)?;
    writer.end_element()
}

/// Writes a `samlp:ArtifactResponse` with its wrapped message.
pub fn write_artifact_response<W: Write>(
    writer: &mut XmlWriter<W>,
    response: &ArtifactResponse,
) -> ProcessingResult<()> {
    open_response_root(writer, "ArtifactResponse", &response.base)?;
    write_common_children(writer, &response.base)?;
    if let Some(content) = &response.any {
        match content {
            ArtifactContent::AuthnRequest(inner) => request::write_authn_request(writer, inner)?,
            ArtifactContent::LogoutRequest(inner) => request::write_logout_request(writer, inner)?,
            ArtifactContent::Response(inner) => write_response(writer, inner)?,
        }
    }
    writer.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::time::parse_timestamp;
    use crate::types::{Assertion, NameId};
    use fedlink_xml::XmlCursor;

    fn fixed_instant() -> chrono::DateTime<chrono::Utc> {
        parse_timestamp("IssueInstant", "2024-03-01T12:30:45.000Z").unwrap()
    }

    #[test]
    fn response_with_assertion_round_trips() {
        let mut inner = Assertion::new("http://idp");
        inner.issue_instant = fixed_instant();
        let mut response = Response::new(Status::success()).with_assertion(inner);
        response.base.id = "ID_r".to_string();
        response.base.in_response_to = Some("ID_abc".to_string());
        response.base.issue_instant = fixed_instant();
        response.base.issuer = Some(NameId::new("http://idp"));

        let xml = super::super::render(|w| write_response(w, &response)).unwrap();
        let parsed = parse::response::parse_response(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn nested_status_code_round_trips() {
        let mut status = Status::from_code(crate::types::constants::status_codes::RESPONDER);
        status.code.sub_code = Some(Box::new(StatusCode::new(
            crate::types::constants::status_codes::AUTHN_FAILED,
        )));
        status.message = Some("credentials rejected".to_string());
        let mut response = LogoutResponse::new(status);
        response.base.issue_instant = fixed_instant();

        let xml = super::super::render(|w| write_logout_response(w, &response)).unwrap();
        let parsed = parse::response::parse_logout_response(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn artifact_response_wraps_logout_request() {
        let mut wrapped = crate::types::LogoutRequest::new();
        wrapped.base.issue_instant = fixed_instant();
        wrapped.name_id = Some(NameId::new("alice"));
        let mut response = ArtifactResponse::new(Status::success());
        response.base.issue_instant = fixed_instant();
        response.any = Some(ArtifactContent::LogoutRequest(Box::new(wrapped)));

        let xml = super::super::render(|w| write_artifact_response(w, &response)).unwrap();
        let parsed = parse::response::parse_artifact_response(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, response);
    }
}
