//! Parsers for the SAML 2.0 protocol request family.

use fedlink_core::{ParsingError, ParsingResult};
use fedlink_xml::{StartTag, XmlCursor};

use super::{assertion, util};
use crate::types::constants::DSIG_NS;
use crate::types::{
    ArtifactResolve, AttributeQuery, AuthnRequest, LogoutRequest, NameIdPolicy, RequestBase,
    RequestedAuthnContext, XacmlAuthzQuery,
};

/// Reads the attributes every request carries: `ID`, `Version`,
/// `IssueInstant`, and the optional `Destination`/`Consent`.
fn parse_base_attributes(tag: &StartTag) -> ParsingResult<RequestBase> {
    util::require_version(tag, "2.0")?;
    Ok(RequestBase {
        id: tag.required_attribute("ID")?,
        issue_instant: util::required_timestamp(tag, "IssueInstant")?,
        destination: tag.attribute("Destination").map(str::to_string),
        consent: tag.attribute("Consent").map(str::to_string),
        issuer: None,
        signature: None,
    })
}

/// Handles the two children common to every request; returns false when
/// the child belongs to the concrete request type.
fn parse_common_child(
    cursor: &mut XmlCursor<'_>,
    child: &StartTag,
    base: &mut RequestBase,
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
        _ => Ok(false),
    }
}

/// Parses a `samlp:AuthnRequest`.
pub fn parse_authn_request(cursor: &mut XmlCursor<'_>) -> ParsingResult<AuthnRequest> {
    let root = cursor.next_start_element()?;
    root.expect_name("AuthnRequest")?;

    let mut request = AuthnRequest {
        base: parse_base_attributes(&root)?,
        force_authn: root
            .attribute("ForceAuthn")
            .map(|v| util::parse_bool("ForceAuthn", v))
            .transpose()?,
        is_passive: root
            .attribute("IsPassive")
            .map(|v| util::parse_bool("IsPassive", v))
            .transpose()?,
        protocol_binding: root.attribute("ProtocolBinding").map(str::to_string),
        assertion_consumer_service_url: root
            .attribute("AssertionConsumerServiceURL")
            .map(str::to_string),
        assertion_consumer_service_index: root
            .attribute("AssertionConsumerServiceIndex")
            .map(|v| util::parse_u16("AssertionConsumerServiceIndex", v))
            .transpose()?,
        attribute_consuming_service_index: root
            .attribute("AttributeConsumingServiceIndex")
            .map(|v| util::parse_u16("AttributeConsumingServiceIndex", v))
            .transpose()?,
        provider_name: root.attribute("ProviderName").map(str::to_string),
        name_id_policy: None,
        subject: None,
        conditions: None,
        requested_authn_context: None,
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AuthnRequest")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut request.base)? {
            continue;
        }
        match child.name.local_name.as_str() {
            "NameIDPolicy" => {
                let tag = cursor.next_start_element()?;
                request.name_id_policy = Some(NameIdPolicy {
                    format: tag.attribute("Format").map(str::to_string),
                    sp_name_qualifier: tag.attribute("SPNameQualifier").map(str::to_string),
                    allow_create: tag
                        .attribute("AllowCreate")
                        .map(|v| util::parse_bool("AllowCreate", v))
                        .transpose()?,
                });
                cursor.next_end_element()?.expect_name("NameIDPolicy")?;
            }
            "Subject" => request.subject = Some(assertion::parse_subject(cursor)?),
            "Conditions" => request.conditions = Some(assertion::parse_conditions(cursor)?),
            "RequestedAuthnContext" => {
                request.requested_authn_context = Some(parse_requested_authn_context(cursor)?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(request)
}

fn parse_requested_authn_context(
    cursor: &mut XmlCursor<'_>,
) -> ParsingResult<RequestedAuthnContext> {
    let root = cursor.next_start_element()?;
    root.expect_name("RequestedAuthnContext")?;

    let mut context = RequestedAuthnContext {
        comparison: root.attribute("Comparison").map(str::to_string),
        class_refs: Vec::new(),
    };
    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("RequestedAuthnContext")?;
            break;
        };
        if child.name.local_name == "AuthnContextClassRef" {
            cursor.next_start_element()?;
            context.class_refs.push(cursor.element_text()?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(context)
}

/// Parses a `samlp:LogoutRequest`.
pub fn parse_logout_request(cursor: &mut XmlCursor<'_>) -> ParsingResult<LogoutRequest> {
    let root = cursor.next_start_element()?;
    root.expect_name("LogoutRequest")?;

    let mut request = LogoutRequest {
        base: parse_base_attributes(&root)?,
        not_on_or_after: util::optional_timestamp(&root, "NotOnOrAfter")?,
        reason: root.attribute("Reason").map(str::to_string),
        name_id: None,
        session_indexes: Vec::new(),
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("LogoutRequest")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut request.base)? {
            continue;
        }
        match child.name.local_name.as_str() {
            "NameID" => request.name_id = Some(util::parse_name_id(cursor, "NameID")?),
            "SessionIndex" => {
                cursor.next_start_element()?;
                request.session_indexes.push(cursor.element_text()?);
            }
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(request)
}

/// Parses a `samlp:ArtifactResolve`.
pub fn parse_artifact_resolve(cursor: &mut XmlCursor<'_>) -> ParsingResult<ArtifactResolve> {
    let root = cursor.next_start_element()?;
    root.expect_name("ArtifactResolve")?;

    let mut base = parse_base_attributes(&root)?;
    let mut artifact = None;

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("ArtifactResolve")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut base)? {
            continue;
        }
        if child.name.local_name == "Artifact" {
            cursor.next_start_element()?;
            artifact = Some(cursor.element_text()?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }

    Ok(ArtifactResolve {
        base,
        artifact: artifact.ok_or_else(|| ParsingError::MissingChild {
            element: "ArtifactResolve".to_string(),
            child: "Artifact".to_string(),
        })?,
    })
}

/// Parses a `samlp:AttributeQuery`.
pub fn parse_attribute_query(cursor: &mut XmlCursor<'_>) -> ParsingResult<AttributeQuery> {
    let root = cursor.next_start_element()?;
    root.expect_name("AttributeQuery")?;

    let mut query = AttributeQuery {
        base: parse_base_attributes(&root)?,
        subject: None,
        attributes: Vec::new(),
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name("AttributeQuery")?;
            break;
        };
        if parse_common_child(cursor, &child, &mut query.base)? {
            continue;
        }
        match child.name.local_name.as_str() {
            "Subject" => query.subject = Some(assertion::parse_subject(cursor)?),
            "Attribute" => query.attributes.push(util::parse_attribute(cursor)?),
            _ => return Err(util::unknown_element(&child)),
        }
    }
    Ok(query)
}

/// Parses a XACML authorization decision query, whether spelled as a
/// `RequestAbstract` with an `xsi:type` or as a `XACMLAuthzDecisionQuery`
/// element. The XACML request payload is captured opaquely.
pub fn parse_xacml_query(cursor: &mut XmlCursor<'_>) -> ParsingResult<XacmlAuthzQuery> {
    let root = cursor.next_start_element()?;
    let root_name = root.name.local_name.clone();
    if root_name != "RequestAbstract" && root_name != "XACMLAuthzDecisionQuery" {
        return Err(ParsingError::ExpectedTag {
            expected: "XACMLAuthzDecisionQuery".to_string(),
            found: root_name,
            offset: root.offset,
        });
    }

    let mut query = XacmlAuthzQuery {
        base: parse_base_attributes(&root)?,
        input_context_only: root
            .attribute("InputContextOnly")
            .map(|v| util::parse_bool("InputContextOnly", v))
            .transpose()?
            .unwrap_or(false),
        return_context: root
            .attribute("ReturnContext")
            .map(|v| util::parse_bool("ReturnContext", v))
            .transpose()?
            .unwrap_or(false),
        xacml_request: None,
    };

    loop {
        let Some(child) = cursor.peek_start_element()? else {
            cursor.next_end_element()?.expect_name(&root_name)?;
            break;
        };
        if parse_common_child(cursor, &child, &mut query.base)? {
            continue;
        }
        if child.name.local_name == "Request" {
            query.xacml_request = Some(cursor.dom_element()?);
        } else {
            return Err(util::unknown_element(&child));
        }
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authn_request_parses() {
        let doc = r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="ID_abc" Version="2.0" IssueInstant="2024-01-01T00:00:00.000Z"
            Destination="http://idp" ForceAuthn="true"
            AssertionConsumerServiceURL="http://sp/acs"
            ProtocolBinding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST">
            <saml:Issuer>http://sp</saml:Issuer>
            <samlp:NameIDPolicy Format="urn:oasis:names:tc:SAML:2.0:nameid-format:persistent" AllowCreate="true"/>
            <samlp:RequestedAuthnContext Comparison="exact">
                <saml:AuthnContextClassRef>urn:oasis:names:tc:SAML:2.0:ac:classes:Password</saml:AuthnContextClassRef>
            </samlp:RequestedAuthnContext>
        </samlp:AuthnRequest>"#;
        let request = parse_authn_request(&mut XmlCursor::new(doc)).unwrap();
        assert_eq!(request.base.id, "ID_abc");
        assert_eq!(request.base.destination.as_deref(), Some("http://idp"));
        assert_eq!(request.base.issuer.as_ref().unwrap().value, "http://sp");
        assert_eq!(request.force_authn, Some(true));
        assert_eq!(
            request.name_id_policy.as_ref().unwrap().allow_create,
            Some(true)
        );
        assert_eq!(
            request.requested_authn_context.unwrap().class_refs[0],
            "urn:oasis:names:tc:SAML:2.0:ac:classes:Password"
        );
    }

    #[test]
    fn logout_request_collects_session_indexes() {
        let doc = r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="ID_lo" Version="2.0" IssueInstant="2024-01-01T00:00:00Z" Reason="urn:user">
            <saml:Issuer>http://sp</saml:Issuer>
            <saml:NameID>alice</saml:NameID>
            <samlp:SessionIndex>s1</samlp:SessionIndex>
            <samlp:SessionIndex>s2</samlp:SessionIndex>
        </samlp:LogoutRequest>"#;
        let request = parse_logout_request(&mut XmlCursor::new(doc)).unwrap();
        assert_eq!(request.name_id.unwrap().value, "alice");
        assert_eq!(request.session_indexes, vec!["s1", "s2"]);
    }

    #[test]
    fn artifact_resolve_requires_artifact() {
        let doc = r#"<samlp:ArtifactResolve xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
            ID="ID_a" Version="2.0" IssueInstant="2024-01-01T00:00:00Z">
        </samlp:ArtifactResolve>"#;
        let err = parse_artifact_resolve(&mut XmlCursor::new(doc)).unwrap_err();
        assert!(matches!(err, ParsingError::MissingChild { .. }));
    }

    #[test]
    fn xacml_query_captures_request_dom() {
        let doc = r#"<xacml-samlp:XACMLAuthzDecisionQuery
            xmlns:xacml-samlp="urn:oasis:xacml:2.0:saml:protocol:schema:os"
            xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
            ID="ID_x" Version="2.0" IssueInstant="2024-01-01T00:00:00Z"
            InputContextOnly="true" ReturnContext="false">
            <saml:Issuer>http://pep</saml:Issuer>
            <xacml-context:Request xmlns:xacml-context="urn:oasis:names:tc:xacml:2.0:context:schema:os">
                <xacml-context:Subject/>
            </xacml-context:Request>
        </xacml-samlp:XACMLAuthzDecisionQuery>"#;
        let query = parse_xacml_query(&mut XmlCursor::new(doc)).unwrap();
        assert!(query.input_context_only);
        assert!(!query.return_context);
        let request = query.xacml_request.unwrap();
        assert_eq!(request.name.local_name, "Request");
        assert_eq!(
            request.name.namespace_uri,
            "urn:oasis:names:tc:xacml:2.0:context:schema:os"
        );
    }
}
