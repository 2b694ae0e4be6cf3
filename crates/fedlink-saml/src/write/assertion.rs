//! Writers for the SAML 2.0 assertion family.

use std::io::Write;

use fedlink_core::ProcessingResult;
use fedlink_xml::XmlWriter;

use super::{timestamp_attr, write_name_id};
use crate::types::constants::{ASSERTION_NS, ASSERTION_PREFIX};
use crate::types::{
    Assertion, Attribute, AttributeStatement, AuthnStatement, Conditions, Statement, Subject,
    SubjectConfirmation,
};

/// Writes a `saml:Assertion`. The assertion namespace is declared on the
/// element when it stands alone; nested inside a response the declaration
/// already sits on the root.
pub fn write_assertion<W: Write>(
    writer: &mut XmlWriter<W>,
    assertion: &Assertion,
    declare_ns: bool,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Assertion")?;
    if declare_ns {
        writer.ns_decl(ASSERTION_PREFIX, ASSERTION_NS)?;
    }
    writer.attribute("ID", &assertion.id)?;
    writer.attribute("Version", "2.0")?;
    timestamp_attr(writer, "IssueInstant", &assertion.issue_instant)?;

    write_name_id(writer, ASSERTION_PREFIX, "Issuer", &assertion.issuer)?;
    if let Some(signature) = &assertion.signature {
        writer.write_dom(signature)?;
    }
    if let Some(subject) = &assertion.subject {
        write_subject(writer, subject)?;
    }
    if let Some(conditions) = &assertion.conditions {
        write_conditions(writer, conditions)?;
    }
    for statement in &assertion.statements {
        match statement {
            Statement::Authn(inner) => write_authn_statement(writer, inner)?,
            Statement::Attribute(inner) => write_attribute_statement(writer, inner)?,
            Statement::XacmlAuthzDecision(dom) => writer.write_dom(dom)?,
        }
    }
    writer.end_element()
}

pub(crate) fn write_subject<W: Write>(
    writer: &mut XmlWriter<W>,
    subject: &Subject,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Subject")?;
    if let Some(name_id) = &subject.name_id {
        write_name_id(writer, ASSERTION_PREFIX, "NameID", name_id)?;
    }
    if let Some(encrypted) = &subject.encrypted_id {
        writer.write_dom(encrypted)?;
    }
    for confirmation in &subject.confirmations {
        write_subject_confirmation(writer, confirmation)?;
    }
    writer.end_element()
}

fn write_subject_confirmation<W: Write>(
    writer: &mut XmlWriter<W>,
    confirmation: &SubjectConfirmation,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "SubjectConfirmation")?;
    if let Some(method) = &confirmation.method {
        writer.attribute("Method", method)?;
    }
    if let Some(name_id) = &confirmation.name_id {
        write_name_id(writer, ASSERTION_PREFIX, "NameID", name_id)?;
    }
    if let Some(encrypted) = &confirmation.encrypted_id {
        writer.write_dom(encrypted)?;
    }
    if let Some(data) = &confirmation.data {
        writer.start_element(Some(ASSERTION_PREFIX), "SubjectConfirmationData")?;
        if let Some(value) = &data.in_response_to {
            writer.attribute("InResponseTo", value)?;
        }
        if let Some(instant) = &data.not_before {
            timestamp_attr(writer, "NotBefore", instant)?;
        }
        if let Some(instant) = &data.not_on_or_after {
            timestamp_attr(writer, "NotOnOrAfter", instant)?;
        }
        if let Some(value) = &data.recipient {
            writer.attribute("Recipient", value)?;
        }
        if let Some(value) = &data.address {
            writer.attribute("Address", value)?;
        }
        if let Some(content) = &data.content {
            writer.write_dom(content)?;
        }
        writer.end_element()?;
    }
    writer.end_element()
}

pub(crate) fn write_conditions<W: Write>(
    writer: &mut XmlWriter<W>,
    conditions: &Conditions,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Conditions")?;
    if let Some(instant) = &conditions.not_before {
        timestamp_attr(writer, "NotBefore", instant)?;
    }
    if let Some(instant) = &conditions.not_on_or_after {
        timestamp_attr(writer, "NotOnOrAfter", instant)?;
    }
    for restriction in &conditions.audience_restrictions {
        writer.start_element(Some(ASSERTION_PREFIX), "AudienceRestriction")?;
        for audience in &restriction.audiences {
            writer.start_element(Some(ASSERTION_PREFIX), "Audience")?;
            writer.text(audience)?;
            writer.end_element()?;
        }
        writer.end_element()?;
    }
    if conditions.one_time_use {
        writer.start_element(Some(ASSERTION_PREFIX), "OneTimeUse")?;
        writer.end_element()?;
    }
    if let Some(proxy) = &conditions.proxy_restriction {
        writer.start_element(Some(ASSERTION_PREFIX), "ProxyRestriction")?;
        if let Some(count) = proxy.count {
            writer.attribute("Count", &count.to_string())?;
        }
        for audience in &proxy.audiences {
            writer.start_element(Some(ASSERTION_PREFIX), "Audience")?;
            writer.text(audience)?;
            writer.end_element()?;
        }
        writer.end_element()?;
    }
    writer.end_element()
}

fn write_authn_statement<W: Write>(
    writer: &mut XmlWriter<W>,
    statement: &AuthnStatement,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "AuthnStatement")?;
    timestamp_attr(writer, "AuthnInstant", &statement.authn_instant)?;
    if let Some(index) = &statement.session_index {
        writer.attribute("SessionIndex", index)?;
    }
    if let Some(instant) = &statement.session_not_on_or_after {
        timestamp_attr(writer, "SessionNotOnOrAfter", instant)?;
    }
    if let Some(locality) = &statement.subject_locality {
        writer.start_element(Some(ASSERTION_PREFIX), "SubjectLocality")?;
        if let Some(address) = &locality.address {
            writer.attribute("Address", address)?;
        }
        if let Some(dns) = &locality.dns_name {
            writer.attribute("DNSName", dns)?;
        }
        writer.end_element()?;
    }
    writer.start_element(Some(ASSERTION_PREFIX), "AuthnContext")?;
    if let Some(class_ref) = &statement.authn_context.class_ref {
        writer.start_element(Some(ASSERTION_PREFIX), "AuthnContextClassRef")?;
        writer.text(class_ref)?;
        writer.end_element()?;
    }
    if let Some(decl_ref) = &statement.authn_context.decl_ref {
        writer.start_element(Some(ASSERTION_PREFIX), "AuthnContextDeclRef")?;
        writer.text(decl_ref)?;
        writer.end_element()?;
    }
    for authority in &statement.authn_context.authenticating_authorities {
        writer.start_element(Some(ASSERTION_PREFIX), "AuthenticatingAuthority")?;
        writer.text(authority)?;
        writer.end_element()?;
    }
    writer.end_element()?;
    writer.end_element()
}

fn write_attribute_statement<W: Write>(
    writer: &mut XmlWriter<W>,
    statement: &AttributeStatement,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "AttributeStatement")?;
    for attribute in &statement.attributes {
        write_attribute(writer, attribute)?;
    }
    writer.end_element()
}

pub(crate) fn write_attribute<W: Write>(
    writer: &mut XmlWriter<W>,
    attribute: &Attribute,
) -> ProcessingResult<()> {
    writer.start_element(Some(ASSERTION_PREFIX), "Attribute")?;
    writer.attribute("Name", &attribute.name)?;
    if let Some(format) = &attribute.name_format {
        writer.attribute("NameFormat", format)?;
    }
    if let Some(friendly) = &attribute.friendly_name {
        writer.attribute("FriendlyName", friendly)?;
    }
    for value in &attribute.values {
        writer.start_element(Some(ASSERTION_PREFIX), "AttributeValue")?;
        writer.text(value)?;
        writer.end_element()?;
    }
    writer.end_element()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::time::parse_timestamp;
    use crate::types::{NameId, Statement};
    use fedlink_xml::XmlCursor;

    #[test]
    fn assertion_round_trips() {
        let instant = parse_timestamp("IssueInstant", "2024-03-01T12:30:45.000Z").unwrap();
        let mut assertion = Assertion::new("http://idp")
            .with_subject(
                Subject::new(NameId::new("alice").with_format(
                    "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
                ))
                .with_confirmation(SubjectConfirmation::bearer()),
            )
            .with_conditions(Conditions {
                not_before: Some(instant),
                not_on_or_after: Some(instant + chrono::Duration::minutes(5)),
                one_time_use: true,
                ..Conditions::default()
            })
            .with_statement(Statement::Attribute(AttributeStatement {
                attributes: vec![Attribute::single("mail", "alice@example.com")],
            }));
        assertion.issue_instant = instant;
        let mut authn = AuthnStatement::new("urn:oasis:names:tc:SAML:2.0:ac:classes:Password");
        authn.authn_instant = instant;
        authn.session_index = Some("s1".to_string());
        assertion.statements.insert(0, Statement::Authn(authn));

        let xml = super::super::render(|w| write_assertion(w, &assertion, true)).unwrap();
        let parsed = parse::assertion::parse_assertion(&mut XmlCursor::new(&xml)).unwrap();
        assert_eq!(parsed, assertion);
    }
}
