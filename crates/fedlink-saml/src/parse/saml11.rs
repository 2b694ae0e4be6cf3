//! Parsers for SAML 1.1 assertions, responses, and requests.

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{StartTag, XmlCursor};

use super::util;
use crate::types::constants::DSIG_NS;
use crate::types::{
    Saml11Assertion, Saml11Attribute, Saml11AttributeStatement, Saml11AuthenticationStatement,
    Saml11Conditions, Saml11NameIdentifier, Saml11Query, Saml11Request, Saml11Response,
    Saml11Statement, Saml11Status, Saml11Subject,
};

/// Checks the split `MajorVersion`/`MinorVersion` attributes; both must
/// read `1` in this protocol family.
fn require_version_11(tag: &StartTag) -> ParsingResult<()> {
    for attribute in ["MajorVersion", "MinorVersion"] {
        let actual = tag.required_attribute(attribute)?;
        if actual != "1" {
            return Err(ParsingError::UnsupportedVersion {
                expected: "1".to_string(),
                actual,
            });
        }
    }
    Ok(())
}

/// Parses a SAML 1.1 `Assertion`.
pub fn parse_assertion(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Assertion> {
    let root = cursor.next_start_element()?;
    root.expect_name("Assertion")?;
    require_version_11(&root)?;

    let mut assertion = Saml11Assertion {
        id: root.required_attribute("AssertionID")?,
        issuer: root.required_attribute("Issuer")?,
        issue_instant: util::required_timestamp(&root, "IssueInstant")?,
        conditions: None,
        statements: Vec::new(),
        signature: None,
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Assertion")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Conditions" => assertion.conditions = Some(parse_conditions(cursor)?),
            "AuthenticationStatement" => {
                assertion
                    .statements
                    .push(Saml11Statement::Authentication(parse_authentication_statement(
                        cursor,
                    )?));
            }
            "AttributeStatement" => {
                assertion
                    .statements
                    .push(Saml11Statement::Attribute(parse_attribute_statement(cursor)?));
            }
            "Signature" if child.name.namespace_uri == DSIG_NS => {
                assertion.signature = Some(cursor.dom_element()?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(assertion)
}

fn parse_conditions(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Conditions> {
    let root = cursor.next_start_element()?;
    root.expect_name("Conditions")?;

    let mut conditions = Saml11Conditions {
        not_before: util::optional_timestamp(&root, "NotBefore")?,
        not_on_or_after: util::optional_timestamp(&root, "NotOnOrAfter")?,
        audience_restrictions: Vec::new(),
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Conditions")?;
            break;
        };
        if child.name.local_name == "AudienceRestrictionCondition" {
            cursor.next_start_element()?;
            let mut audiences = Vec::new();
            loop {
                let Some(inner) = cursor.peek_start_element()? else {
                    cursor
                        .next_end_element()?
                        .expect_name("AudienceRestrictionCondition")?;
                    break;
                };
                if inner.name.local_name == "Audience" {
                    cursor.next_start_element()?;
                    audiences.push(cursor.element_text()?);
                } else {
                    return Err(util::unknown_element(&inner));
                }
            }
            conditions.audience_restrictions.push(audiences);
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(conditions)
}

fn parse_authentication_statement(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<Saml11AuthenticationStatement> {
    let root = cursor.next_start_element()?;
    root.expect_name("AuthenticationStatement")?;

    let method = root.required_attribute("AuthenticationMethod")?;
    let instant = util::required_timestamp(&root, "AuthenticationInstant")?;
    let mut subject = None;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AuthenticationStatement")?;
            break;
        };
        if child.name.local_name == "Subject" {
            subject = Some(parse_subject(cursor)?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }

    Ok(Saml11AuthenticationStatement {
        authentication_method: method,
        authentication_instant: instant,
        subject: subject.ok_or_else(|| ParsingError::MissingChild {
            element: "AuthenticationStatement".to_string(),
            child: "Subject".to_string(),
        })?,
    })
}

fn parse_attribute_statement(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<Saml11AttributeStatement> {
    let root = cursor.next_start_element()?;
    root.expect_name("AttributeStatement")?;

    let mut statement = Saml11AttributeStatement::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AttributeStatement")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Subject" => statement.subject = Some(parse_subject(cursor)?),
            "Attribute" => statement.attributes.push(parse_attribute(cursor)?),
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(statement)
}

fn parse_attribute(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Attribute> {
    let root = cursor.next_start_element()?;
    root.expect_name("Attribute")?;

    let mut attribute = Saml11Attribute {
        name: root.required_attribute("AttributeName")?,
        namespace: root.required_attribute("AttributeNamespace")?,
        values: Vec::new(),
    };
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Attribute")?;
            break;
        };
        if child.name.local_name == "AttributeValue" {
            cursor.next_start_element()?;
            attribute.values.push(util::element_text_or_empty(cursor)?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(attribute)
}

fn parse_subject(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Subject> {
    let root = cursor.next_start_element()?;
    root.expect_name("Subject")?;

    let mut subject = Saml11Subject::default();
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Subject")?;
            break;
        };
        match child.name.local_name.as_str() {
            "NameIdentifier" => {
                let tag = cursor.next_start_element()?;
                let format = tag.attribute("Format").map(str::to_string);
                let name_qualifier = tag.attribute("NameQualifier").map(str::to_string);
                subject.name_identifier = Some(Saml11NameIdentifier {
                    value: cursor.element_text()?,
                    format,
                    name_qualifier,
                });
            }
            "SubjectConfirmation" => {
                cursor.next_start_element()?;
                loop {
                    let Some(inner) = cursor.peek_start_element()? else {
                        cursor.next_end_element()?.expect_name("SubjectConfirmation")?;
                        break;
                    };
                    if inner.name.local_name == "ConfirmationMethod" {
                        cursor.next_start_element()?;
                        subject.confirmation_methods.push(cursor.element_text()?);
                    } else {
                        return Err(util::unknown_element(&inner));
                    }
                }
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(subject)
}

fn parse_status(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Status> {
    let root = cursor.next_start_element()?;
    root.expect_name("Status")?;

    let mut code = None;
    let mut message = None;
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Status")?;
            break;
        };
        match child.name.local_name.as_str() {
            "StatusCode" => {
                let tag = cursor.next_start_element()?;
                code = Some(tag.required_attribute("Value")?);
                cursor.next_end_element()?.expect_name("StatusCode")?;
            }
            "StatusMessage" => {
                cursor.next_start_element()?;
                message = Some(util::element_text_or_empty(cursor)?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }

    Ok(Saml11Status {
        code: code.ok_or_else(|| ParsingError::MissingChild {
            element: "Status".to_string(),
            child: "StatusCode".to_string(),
        })?,
        message,
    })
}

/// Parses a SAML 1.1 `Response`.
pub fn parse_response(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Response> {
    let root = cursor.next_start_element()?;
    root.expect_name("Response")?;
    require_version_11(&root)?;

    let id = root.required_attribute("ResponseID")?;
    let in_response_to = root.attribute("InResponseTo").map(str::to_string);
    let issue_instant = util::required_timestamp(&root, "IssueInstant")?;
    let recipient = root.attribute("Recipient").map(str::to_string);

    let mut status = None;
    let mut assertions = Vec::new();
    let mut signature = None;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Response")?;
            break;
        };
        match child.name.local_name.as_str() {
            "Status" => status = Some(parse_status(cursor)?),
            "Assertion" => assertions.push(parse_assertion(cursor)?),
            "Signature" if child.name.namespace_uri == DSIG_NS => {
                signature = Some(cursor.dom_element()?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }

    Ok(Saml11Response {
        id,
        in_response_to,
        issue_instant,
        recipient,
        status: status.ok_or_else(|| ParsingError::MissingChild {
            element: "Response".to_string(),
            child: "Status".to_string(),
        })?,
        assertions,
        signature,
    })
}

/// Parses a SAML 1.1 `Request`.
pub fn parse_request(cursor: &mut XmlCursor<'_>) -> ParsingResult<Saml11Request> {
    let root = cursor.next_start_element()?;
    root.expect_name("Request")?;
    require_version_11(&root)?;

    let mut request = Saml11Request {
        id: root.required_attribute("RequestID")?,
        issue_instant: util::required_timestamp(&root, "IssueInstant")?,
        query: None,
        signature: None,
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("Request")?;
            break;
        };
        match child.name.local_name.as_str() {
            "AuthenticationQuery" => {
                cursor.next_start_element()?;
                let subject = parse_subject(cursor)?;
                cursor.next_end_element()?.expect_name("AuthenticationQuery")?;
                request.query = Some(Saml11Query::Authentication(subject));
            }
            "AttributeQuery" => {
                let tag = cursor.next_start_element()?;
                let resource = tag.attribute("Resource").map(str::to_string);
                let subject = parse_subject(cursor)?;
                cursor.next_end_element()?.expect_name("AttributeQuery")?;
                request.query = Some(Saml11Query::Attribute { resource, subject });
            }
            "AssertionArtifact" => {
                cursor.next_start_element()?;
                request.query = Some(Saml11Query::AssertionArtifact(cursor.element_text()?));
            }
            "AssertionIDReference" => {
                cursor.next_start_element()?;
                request.query = Some(Saml11Query::AssertionIdReference(cursor.element_text()?));
            }
            "Signature" if child.name.namespace_uri == DSIG_NS => {
                request.signature = Some(cursor.dom_element()?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAML11_ASSERTION: &str = r#"<saml:Assertion
        xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion"
        AssertionID="ID_a11" Issuer="http://idp" MajorVersion="1" MinorVersion="1"
        IssueInstant="2024-01-01T00:00:00Z">
        <saml:Conditions NotBefore="2024-01-01T00:00:00Z" NotOnOrAfter="2024-01-01T00:05:00Z">
            <saml:AudienceRestrictionCondition>
                <saml:Audience>http://sp</saml:Audience>
            </saml:AudienceRestrictionCondition>
        </saml:Conditions>
        <saml:AuthenticationStatement
            AuthenticationMethod="urn:oasis:names:tc:SAML:1.0:am:password"
            AuthenticationInstant="2024-01-01T00:00:00Z">
            <saml:Subject>
                <saml:NameIdentifier Format="urn:mace:shibboleth:1.0:nameIdentifier">alice</saml:NameIdentifier>
                <saml:SubjectConfirmation>
                    <saml:ConfirmationMethod>urn:oasis:names:tc:SAML:1.0:cm:bearer</saml:ConfirmationMethod>
                </saml:SubjectConfirmation>
            </saml:Subject>
        </saml:AuthenticationStatement>
    </saml:Assertion>"#;

    #[test]
    fn assertion_parses() {
        let assertion = parse_assertion(&mut XmlCursor::new(SAML11_ASSERTION)).unwrap();
        assert_eq!(assertion.id, "ID_a11");
        assert_eq!(assertion.issuer, "http://idp");
        assert_eq!(
            assertion.conditions.as_ref().unwrap().audience_restrictions[0][0],
            "http://sp"
        );
        let Saml11Statement::Authentication(statement) = &assertion.statements[0] else {
            panic!("expected an authentication statement");
        };
        assert_eq!(
            statement.subject.name_identifier.as_ref().unwrap().value,
            "alice"
        );
        assert_eq!(
            statement.subject.confirmation_methods[0],
            "urn:oasis:names:tc:SAML:1.0:cm:bearer"
        );
    }

    #[test]
    fn wrong_minor_version_is_rejected() {
        let doc = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion"
            AssertionID="ID_a" Issuer="http://idp" MajorVersion="1" MinorVersion="0"
            IssueInstant="2024-01-01T00:00:00Z"/>"#;
        let err = parse_assertion(&mut XmlCursor::new(doc)).unwrap_err();
        assert!(matches!(err, ParsingError::UnsupportedVersion { .. }));
    }

    #[test]
    fn response_carries_qname_status_code() {
        let doc = format!(
            r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:1.0:protocol"
                ResponseID="ID_r11" InResponseTo="ID_q" MajorVersion="1" MinorVersion="1"
                IssueInstant="2024-01-01T00:00:00Z" Recipient="http://sp/acs">
                <samlp:Status>
                    <samlp:StatusCode Value="samlp:Success"/>
                </samlp:Status>
                {SAML11_ASSERTION}
            </samlp:Response>"#
        );
        let response = parse_response(&mut XmlCursor::new(&doc)).unwrap();
        assert_eq!(response.status.code, "samlp:Success");
        assert_eq!(response.recipient.as_deref(), Some("http://sp/acs"));
        assert_eq!(response.assertions.len(), 1);
    }

    #[test]
    fn request_with_artifact_query() {
        let doc = r#"<samlp:Request xmlns:samlp="urn:oasis:names:tc:SAML:1.0:protocol"
            RequestID="ID_q" MajorVersion="1" MinorVersion="1"
            IssueInstant="2024-01-01T00:00:00Z">
            <samlp:AssertionArtifact>AAQAA...artifact</samlp:AssertionArtifact>
        </samlp:Request>"#;
        let request = parse_request(&mut XmlCursor::new(doc)).unwrap();
        assert_eq!(
            request.query,
            Some(Saml11Query::AssertionArtifact("AAQAA...artifact".to_string()))
        );
    }

    #[test]
    fn request_with_attribute_query() {
        let doc = r#"<samlp:Request xmlns:samlp="urn:oasis:names:tc:SAML:1.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion"
            RequestID="ID_q" MajorVersion="1" MinorVersion="1"
            IssueInstant="2024-01-01T00:00:00Z">
            <samlp:AttributeQuery Resource="http://sp/resource">
                <saml:Subject>
                    <saml:NameIdentifier>alice</saml:NameIdentifier>
                </saml:Subject>
            </samlp:AttributeQuery>
        </samlp:Request>"#;
        let request = parse_request(&mut XmlCursor::new(doc)).unwrap();
        let Some(Saml11Query::Attribute { resource, subject }) = request.query else {
            panic!("expected an attribute query");
        };
        assert_eq!(resource.as_deref(), Some("http://sp/resource"));
        assert_eq!(subject.name_identifier.unwrap().value, "alice");
    }
}
