//! Parsers for the SAML 2.0 protocol response family.

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{StartTag, XmlCursor};

use super::{assertion, request, util};
use crate::types::constants::DSIG_NS;
use crate::types::{
    ArtifactContent, ArtifactResponse, LogoutResponse, Response, ResponseItem, Status, StatusCode,
    StatusResponse,
};

/// Reads the attributes every status response carries.
fn parse_base_attributes(tag: &StartTag) -> ParsingResult<StatusResponse> {
    util::require_version(tag, "2.0")?;
    Ok(StatusResponse {
        id: tag.required_attribute("ID")?,
        in_response_to: tag.attribute("InResponseTo").map(str::to_string),
        issue_instant: util::required_timestamp(tag, "IssueInstant")?,
        destination: tag.attribute("Destination").map(str::to_string),
        consent: tag.attribute("Consent").map(str::to_string),
        issuer: None,
        signature: None,
        status: Status::success(),
    })
}

/// Handles the children common to every status response; returns false
/// when the child belongs to the concrete response type. The `Status`
/// placeholder from `parse_base_attributes` is overwritten here.
fn parse_common_child(
    cursor: &mut XmlCursor<'_>,
    child: &StartTag,
    base: &mut StatusResponse,
    saw_status: &mut bool,
) -> ParsingResult<bool> {
    match child.name.local_name.as_str() {
        "Issuer" => {
            base.issuer = Some(util::parse_name_id(cursor, "Issuer")?);
            Ok(true)
        }
        "Signature" if child.name.namespace_uri == DSIG_NS => {
            base.signature = Some(cursor.dom_element()?);
            Ok(true)
        }
        "Status" => {
            base.status = parse_status(cursor)?;
            *saw_status = true;
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn missing_status(element: &str) -> ParsingError {
    ParsingError::MissingChild {
        element: element.to_string(),
        child: "Status".to_string(),
    }
}

/// Parses a `samlp:Status` with its possibly nested code.
pub fn parse_status(cursor: &mut XmlCursor<'_>) -> ParsingResult<Status> {
    let root = cursor.next_start_element()?;
    root.expect_name("Status")?;

    let mut code = None;
    let mut message = None;
    let mut detail = None;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Status")?;
            break;
        };
        match child.name.local_name.as_str() {
            "StatusCode" => code = Some(parse_status_code(cursor)?),
            "StatusMessage" => {
                cursor.next_start_element()?;
                message = Some(util::element_text_or_empty(cursor)?);
            }
            "StatusDetail" => detail = Some(cursor.dom_element()?),
            _ => return Err(util::unknown_element(&child)),
        }
    }

    Ok(Status {
        code: code.ok_or_else(|| ParsingError::MissingChild {
            element: "Status".to_string(),
            child: "StatusCode".to_string(),
        })?,
        message,
        detail,
    })
}

fn parse_status_code(cursor: &mut XmlCursor<'_>) -> ParsingResult<StatusCode> {
    let root = cursor.next_start_element()?;
    root.expect_name("StatusCode")?;
    let mut code = StatusCode::new(root.required_attribute("Value")?);
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("StatusCode")?;
            break;
        };
        if child.name.local_name == "StatusCode" {
            code.sub_code = Some(Box::new(parse_status_code(cursor)?));
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(code)
}

/// Parses a `samlp:Response`.
pub fn parse_response(cursor: &mut XmlCursor<'_>) -> ParsingResult<Response> {
    let root = cursor.next_start_element()?;
    root.expect_name("Response")?;

    let mut response = Response {
        base: parse_base_attributes(&root)?,
        assertions: Vec::new(),
    };
    let mut saw_status = false;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Response")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut response.base, &mut saw_status)? {
            continue;
        }
        match child.name.local_name.as_str() {
            "Assertion" => response
                .assertions
                .push(ResponseItem::Assertion(assertion::parse_assertion(cursor)?)),
            "EncryptedAssertion" => response
                .assertions
                .push(ResponseItem::Encrypted(cursor.dom_element()?)),
            _ => return Err(util::unknown_element(&child)),
        }
    }

    if !saw_status {
        return Err(missing_status("Response"));
    }
    Ok(response)
}

/// Parses a `samlp:LogoutResponse`.
pub fn parse_logout_response(cursor: &mut XmlCursor<'_>) -> ParsingResult<LogoutResponse> {
    let root = cursor.next_start_element()?;
    root.expect_name("LogoutResponse")?;

    let mut base = parse_base_attributes(&root)?;
    let mut saw_status = false;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("LogoutResponse")?;
            break;
        };
        if !parse_common_child(cursor, &child, &mut base, &mut saw_status)? {
            return Err(util::unknown_element(&child));
        }
    }

    if !saw_status {
        return Err(missing_status("LogoutResponse"));
    }
    Ok(LogoutResponse { base })
}

/// Parses a `samlp:ArtifactResponse`. The wrapped message, when present,
/// is parsed into the matching protocol type.
pub fn parse_artifact_response(cursor: &mut XmlCursor<'_>) -> ParsingResult<ArtifactResponse> {
    let root = cursor.next_start_element()?;
    root.expect_name("ArtifactResponse")?;

    let mut response = ArtifactResponse {
        base: parse_base_attributes(&root)?,
        any: None,
    };
    let mut saw_status = false;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("ArtifactResponse")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut response.base, &mut saw_status)? {
            continue;
        }
        match child.name.local_name.as_str() {
            "AuthnRequest" => {
                response.any = Some(ArtifactContent::AuthnRequest(Box::new(
                    request::parse_authn_request(cursor)?,
                )));
            }
            "LogoutRequest" => {
                response.any = Some(ArtifactContent::LogoutRequest(Box::new(
                    request::parse_logout_request(cursor)?,
                )));
            }
            "Response" => {
                response.any = Some(ArtifactContent::Response(Box::new(parse_response(cursor)?)));
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }

    if !saw_status {
        return Err(missing_status("ArtifactResponse"));
    }
    Ok(response)
}
