//! Parsers for the SAML 2.0 assertion family.

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::XmlCursor;

use super::util;
use crate::types::constants::DSIG_NS;
use crate::types::{
    Assertion, AttributeStatement, AudienceRestriction, AuthnContext, AuthnStatement, Conditions,
    ProxyRestriction, Statement, Subject, SubjectConfirmation, SubjectConfirmationData,
    SubjectLocality,
};

/// Parses a `saml:Assertion`, consuming exactly through its end tag.
pub fn parse_assertion(cursor: &mut XmlCursor<'_>) -> ParsingResult<Assertion> {
    let root = cursor.next_start_element()?;
    root.expect_name("Assertion")?;
    util::require_version(&root, "2.0")?;
    let id = root.required_attribute("ID")?;
    let issue_instant = util::required_timestamp(&root, "IssueInstant")?;

    let mut issuer = None;
    let mut signature = None;
    let mut subject = None;
    let mut conditions = None;
    let mut statements = Vec::new();

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Assertion")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Issuer" => issuer = Some(util::parse_name_id(cursor, "Issuer")?),
            "Signature" if child.name.namespace_uri == DSIG_NS => {
                signature = Some(cursor.dom_element()?);
            }
            "Subject" => subject = Some(parse_subject(cursor)?),
            "Conditions" => conditions = Some(parse_conditions(cursor)?),
            "AuthnStatement" => statements.push(Statement::Authn(parse_authn_statement(cursor)?)),
            "AttributeStatement" => {
                statements.push(Statement::Attribute(parse_attribute_statement(cursor)?));
            }
            "XACMLAuthzDecisionStatement" => {
                statements.push(Statement::XacmlAuthzDecision(cursor.dom_element()?));
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }

    let issuer = issuer.ok_or_else(|| ParsingError::MissingChild {
        element: "Assertion".to_string(),
        child: "Issuer".to_string(),
    })?;

    Ok(Assertion {
        id,
        issue_instant,
        issuer,
        signature,
        subject,
        conditions,
        statements,
    })
}

/// Parses a `saml:Subject`.
pub fn parse_subject(cursor: &mut XmlCursor<'_>) -> ParsingResult<Subject> {
    let root = cursor.next_start_element()?;
    root.expect_name("Subject")?;

    let mut subject = Subject::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Subject")?;
            break;
        };
        match child.name.local_name.as_str() {
            "NameID" => subject.name_id = Some(util::parse_name_id(cursor, "NameID")?),
            "EncryptedID" => subject.encrypted_id = Some(cursor.dom_element()?),
            "SubjectConfirmation" => {
                subject.confirmations.push(parse_subject_confirmation(cursor)?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(subject)
}

fn parse_subject_confirmation(cursor: &mut XmlCursor<'_>) -> ParsingResult<SubjectConfirmation> {
    let root = cursor.next_start_element()?;
    root.expect_name("SubjectConfirmation")?;

    let mut confirmation = SubjectConfirmation {
        method: root.attribute("Method").map(str::to_string),
        ..SubjectConfirmation::default()
    };
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("SubjectConfirmation")?;
            break;
        };
        match child.name.local_name.as_str() {
            "NameID" => confirmation.name_id = Some(util::parse_name_id(cursor, "NameID")?),
            "EncryptedID" => confirmation.encrypted_id = Some(cursor.dom_element()?),
            "SubjectConfirmationData" => {
                confirmation.data = Some(parse_subject_confirmation_data(cursor)?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(confirmation)
}

fn parse_subject_confirmation_data(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<SubjectConfirmationData> {
    let root = cursor.next_start_element()?;
    root.expect_name("SubjectConfirmationData")?;

    let mut data = SubjectConfirmationData {
        in_response_to: root.attribute("InResponseTo").map(str::to_string),
        not_before: util::optional_timestamp(&root, "NotBefore")?,
        not_on_or_after: util::optional_timestamp(&root, "NotOnOrAfter")?,
        recipient: root.attribute("Recipient").map(str::to_string),
        address: root.attribute("Address").map(str::to_string),
        content: None,
    };
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor
                .next_end_element()?
                .expect_name("SubjectConfirmationData")?;
            break;
        };
        match child.name.local_name.as_str() {
            // Key material for holder-of-key confirmation; structure is
            // owned by the XML-DSig / XML-Enc toolchain.
            "KeyInfo" | "EncryptedKey" => data.content = Some(cursor.dom_element()?),
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(data)
}

/// Parses a `saml:Conditions`.
pub fn parse_conditions(cursor: &mut XmlCursor<'_>) -> ParsingResult<Conditions> {
    let root = cursor.next_start_element()?;
    root.expect_name("Conditions")?;

    let mut conditions = Conditions {
        not_before: util::optional_timestamp(&root, "NotBefore")?,
        not_on_or_after: util::optional_timestamp(&root, "NotOnOrAfter")?,
        ..Conditions::default()
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Conditions")?;
            break;
        };
        match child.name.local_name.as_str() {
            "AudienceRestriction" => {
                cursor.next_start_element()?;
                let mut restriction = AudienceRestriction::default();
                loop {
                    let Some(inner) = cursor.peek_start_element()? else {
                        cursor.next_end_element()?.expect_name("AudienceRestriction")?;
                        break;
                    };
                    inner.expect_name("Audience")?;
                    cursor.next_start_element()?;
                    restriction.audiences.push(cursor.element_text()?);
                }
                conditions.audience_restrictions.push(restriction);
            }
            "OneTimeUse" => {
                cursor.next_start_element()?;
                cursor.next_end_element()?.expect_name("OneTimeUse")?;
                conditions.one_time_use = true;
            }
            "ProxyRestriction" => {
                let tag = cursor.next_start_element()?;
                let mut restriction = ProxyRestriction {
                    count: tag
                        .attribute("Count")
                        .map(|v| util::parse_u32("Count", v))
                        .transpose()?,
                    audiences: Vec::new(),
                };
                loop {
                    let Some(inner) = cursor.peek_start_element()? else {
                        cursor.next_end_element()?.expect_name("ProxyRestriction")?;
                        break;
                    };
                    inner.expect_name("Audience")?;
                    cursor.next_start_element()?;
                    restriction.audiences.push(cursor.element_text()?);
                }
                conditions.proxy_restriction = Some(restriction);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(conditions)
}

/// Parses a `saml:AuthnStatement`.
pub fn parse_authn_statement(cursor: &mut XmlCursor<'_>) -> ParsingResult<AuthnStatement> {
    let root = cursor.next_start_element()?;
    root.expect_name("AuthnStatement")?;

    let authn_instant = util::required_timestamp(&root, "AuthnInstant")?;
    let session_index = root.attribute("SessionIndex").map(str::to_string);
    let session_not_on_or_after = util::optional_timestamp(&root, "SessionNotOnOrAfter")?;

    let mut subject_locality = None;
    let mut authn_context = None;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AuthnStatement")?;
            break;
        };
        match child.name.local_name.as_str() {
            "SubjectLocality" => {
                let tag = cursor.next_start_element()?;
                subject_locality = Some(SubjectLocality {
                    address: tag.attribute("Address").map(str::to_string),
                    dns_name: tag.attribute("DNSName").map(str::to_string),
                });
                cursor.next_end_element()?.expect_name("SubjectLocality")?;
            }
            "AuthnContext" => authn_context = Some(parse_authn_context(cursor)?),
            _ => return Err(util::unknown_element(&child)),
        }
    }

    Ok(AuthnStatement {
        authn_instant,
        session_index,
        session_not_on_or_after,
        subject_locality,
        authn_context: authn_context.ok_or_else(|| ParsingError::MissingChild {
            element: "AuthnStatement".to_string(),
            child: "AuthnContext".to_string(),
        })?,
    })
}

fn parse_authn_context(cursor: &mut XmlCursor<'_>) -> ParsingResult<AuthnContext> {
    let root = cursor.next_start_element()?;
    root.expect_name("AuthnContext")?;

    let mut context = AuthnContext::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AuthnContext")?;
            break;
        };
        match child.name.local_name.as_str() {
            "AuthnContextClassRef" => {
                cursor.next_start_element()?;
                context.class_ref = Some(cursor.element_text()?);
            }
            "AuthnContextDeclRef" => {
                cursor.next_start_element()?;
                context.decl_ref = Some(cursor.element_text()?);
            }
            "AuthenticatingAuthority" => {
                cursor.next_start_element()?;
                context.authenticating_authorities.push(cursor.element_text()?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(context)
}

/// Parses a `saml:AttributeStatement`.
pub fn parse_attribute_statement(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<AttributeStatement> {
    let root = cursor.next_start_element()?;
    root.expect_name("AttributeStatement")?;

    let mut statement = AttributeStatement::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AttributeStatement")?;
            break;
        };
        if child.name.local_name == "Attribute" {
            statement.attributes.push(util::parse_attribute(cursor)?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(statement)
}
