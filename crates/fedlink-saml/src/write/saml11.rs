//! Writers for SAML 1.1 assertions, responses, and requests.

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use super::timestamp_attr;
use crate::types::constants::{
    ASSERTION_PREFIX, PROTOCOL_PREFIX, SAML11_ASSERTION_NS, SAML11_PROTOCOL_NS,
};
use crate::types::{
    Saml11Assertion, Saml11Attribute, Saml11AttributeStatement, Saml11AuthenticationStatement,
    Saml11Query, Saml11Request, Saml11Response, Saml11Statement, Saml11Subject,
};

/// Writes a SAML 1.1 `Assertion`.
pub fn write_assertion<W: Write>(
    writer: &mut XmlWriter<W>,
    assertion: &Saml11Assertion,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Assertion")?;
    if declare_ns {
        writer.ns_decl(ASSERTION_PREFIX, SAML11_ASSERTION_NS)?;
    }
    writer.attribute("AssertionID", &assertion.id)?;
    writer.attribute("Issuer", &assertion.issuer)?;
    writer.attribute("MajorVersion", "1")?;
    writer.attribute("MinorVersion", "1")?;
    timestamp_attr(writer, "IssueInstant", &assertion.issue_instant)?;

    if let Some(conditions) = &assertion.conditions {
        writer.start_element(Some(ASSERTION_PREFIX), "Conditions")?;
        if let Some(instant) = &conditions.not_before {
            timestamp_attr(writer, "NotBefore", instant)?;
        }
        if let Some(instant) = &conditions.not_on_or_after {
            timestamp_attr(writer, "NotOnOrAfter", instant)?;
        }
        for audiences in &conditions.audience_restrictions {
            writer.start_element(Some(ASSERTION_PREFIX), "AudienceRestrictionCondition")?;
            for audience in audiences {
                writer.start_element(Some(ASSERTION_PREFIX), "Audience")?;
                writer.text(audience)?;
                writer.end_element()?;
            }
            writer.end_element()?;
        }
        writer.end_element()?;
    }
    for statement in &assertion.statements {
        match statement {
            Saml11Statement::Authentication(inner) => {
                write_authentication_statement(writer, inner)?;
            }
            Saml11Statement::Attribute(inner) => write_attribute_statement(writer, inner)?,
        }
    }
    if let Some(signature) = &assertion.signature {
        writer.write_dom(signature)?;
    }
    writer.end_element()
}

fn write_authentication_statement<W: Write>(
    writer: &mut XmlWriter<W>,
    statement: &Saml11AuthenticationStatement,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "AuthenticationStatement")?;
    writer.attribute("AuthenticationMethod", &statement.authentication_method)?;
    timestamp_attr(writer, "AuthenticationInstant", &statement.authentication_instant)?;
    write_subject(writer, &statement.subject)?;
    writer.end_element()
}

fn write_attribute_statement<W: Write>(
    writer: &mut XmlWriter<W>,
    statement: &Saml11AttributeStatement,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "AttributeStatement")?;
    if let Some(subject) = &statement.subject {
        write_subject(writer, subject)?;
    }
    for attribute in &statement.attributes {
        write_attribute(writer, attribute)?;
    }
    writer.end_element()
}

fn write_attribute<W: Write>(
    writer: &mut XmlWriter<W>,
    attribute: &Saml11Attribute,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Attribute")?;
    writer.attribute("AttributeName", &attribute.name)?;
    writer.attribute("AttributeNamespace", &attribute.namespace)?;
    for value in &attribute.values {
        writer.start_element(Some(ASSERTION_PREFIX), "AttributeValue")?;
        writer.text(value)?;
        writer.end_element()?;
    }
    writer.end_element()
}

fn write_subject<W: Write>(
    writer: &mut XmlWriter<W>,
    subject: &Saml11Subject,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Subject")?;
    if let Some(identifier) = &subject.name_identifier {
        writer.start_element(Some(ASSERTION_PREFIX), "NameIdentifier")?;
        if let Some(format) = &identifier.format {
            writer.attribute("Format", format)?;
        }
        if let Some(qualifier) = &identifier.name_qualifier {
            writer.attribute("NameQualifier", qualifier)?;
        }
        writer.text(&identifier.value)?;
        writer.end_element()?;
    }
    if !subject.confirmation_methods.is_empty() {
        writer.start_element(Some(ASSERTION_PREFIX), "SubjectConfirmation")?;
        for method in &subject.confirmation_methods {
            writer.start_element(Some(ASSERTION_PREFIX), "ConfirmationMethod")?;
            writer.text(method)?;
            writer.end_element()?;
        }
        writer.end_element()?;
    }
    writer.end_element()
}

/// Writes a SAML 1.1 `Response`.
pub fn write_response<W: Write>(
    writer: &mut XmlWriter<W>,
    response: &Saml11Response,
) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), "Response")?;
    writer.ns_decl(PROTOCOL_PREFIX, SAML11_PROTOCOL_NS)?;
    writer.ns_decl(ASSERTION_PREFIX, SAML11_ASSERTION_NS)?;
    writer.attribute("ResponseID", &response.id)?;
    if let Some(value) = &response.in_response_to {
        writer.attribute("InResponseTo", value)?;
    }
    writer.attribute("MajorVersion", "1")?;
    writer.attribute("MinorVersion", "1")?;
    timestamp_attr(writer, "IssueInstant", &response.issue_instant)?;
    if let Some(recipient) = &response.recipient {
        writer.attribute("Recipient", recipient)?;
    }

    if let Some(signature) = &response.signature {
        writer.write_dom(signature)?;
    }
    writer.start_element(Some(PROTOCOL_PREFIX), "Status")?;
    writer.start_element(Some(PROTOCOL_PREFIX), "StatusCode")?;
    writer.attribute("Value", &response.status.code)?;
    writer.end_element()?;
    if let Some(message) = &response.status.message {
        writer.start_element(Some(PROTOCOL_PREFIX), "StatusMessage")?;
        writer.text(message)?;
        writer.end_element()?;
    }
    writer.end_element()?;
    for assertion in &response.assertions {
        write_assertion(writer, assertion, false)?;
    }
    writer.end_element()
}

/// Writes a SAML 1.1 `Request`.
pub fn write_request<W: Write>(
    writer: &mut XmlWriter<W>,
    request: &Saml11Request,
) -> ProcessingResult<()> {
    writer.start_element(Some(PROTOCOL_PREFIX), "Request")?;
    writer.ns_decl(PROTOCOL_PREFIX, SAML11_PROTOCOL_NS)?;
    writer.ns_decl(ASSERTION_PREFIX, SAML11_ASSERTION_NS)?;
    writer.attribute("RequestID", &request.id)?;
    writer.attribute("MajorVersion", "1")?;
    writer.attribute("MinorVersion", "1")?;
    timestamp_attr(writer, "IssueInstant", &request.issue_instant)?;

    if let Some(signature) = &request.signature {
        writer.write_dom(signature)?;
    }
    match &request.query {
        Some(Saml11Query::Authentication(subject)) => {
            writer.start_element(Some(PROTOCOL_PREFIX), "AuthenticationQuery")?;
            write_subject(writer, subject)?;
            writer.end_element()?;
        }
        Some(Saml11Query::Attribute { resource, subject }) => {
            writer.start_element(Some(PROTOCOL_PREFIX), "AttributeQuery")?;
            if let Some(resource) = resource {
                writer.attribute("Resource", resource)?;
            }
            write_subject(writer, subject)?;
            writer.end_element()?;
        }
        Some(Saml11Query::AssertionArtifact(artifact)) => {
            writer.start_element(Some(PROTOCOL_PREFIX), "AssertionArtifact")?;
            writer.text(artifact)?;
            writer.end_element()?;
        }
        Some(Saml11Query::AssertionIdReference(reference)) => {
            writer.start_element(Some(PROTOCOL_PREFIX), "AssertionIDReference")?;
            writer.text(reference)?;
            writer.end_element()?;
        }
        None => {}
    }
    writer.end_element()
}
