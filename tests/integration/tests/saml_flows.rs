//! SAML 2.0 write-then-parse flows over the top-level dispatch.

use fedlink_core::ParsingError;
use fedlink_saml::types::{
    ArtifactContent, ArtifactResponse, AuthnRequest, LogoutRequest, NameId, NameIdPolicy, Status,
};
use fedlink_saml::{write, SamlObject, SamlParser};

use crate::common::{fixed_instant, sample_response};

#[test]
fn authn_request_round_trips_through_the_dispatch() {
    let mut request = AuthnRequest::with_id("ID_abc")
        .with_issuer("http://sp.example.org")
        .with_destination("http://idp.example.org/sso");
    request.base.issue_instant = fixed_instant();
    request.name_id_policy = Some(NameIdPolicy {
        format: Some("urn:oasis:names:tc:SAML:2.0:nameid-format:persistent".to_owned()),
        sp_name_qualifier: None,
        allow_create: Some(true),
    });

    let xml = write::to_xml_string(&SamlObject::AuthnRequest(request.clone())).unwrap();
    assert!(xml.contains(r#"ID="ID_abc""#));
    assert!(xml.contains(r#"Destination="http://idp.example.org/sso""#));

    let parsed = SamlParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, SamlObject::AuthnRequest(request));
}

#[test]
fn response_with_assertion_round_trips() {
    let response = sample_response("ID_resp", "ID_assert");
    let xml = write::to_xml_string(&SamlObject::Response(response.clone())).unwrap();
    let parsed = SamlParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, SamlObject::Response(response));
}

#[test]
fn artifact_response_carries_an_embedded_authn_request() {
    let mut inner = AuthnRequest::with_id("ID_inner").with_issuer("http://sp.example.org");
    inner.base.issue_instant = fixed_instant();

    let mut artifact = ArtifactResponse::new(Status::success());
    artifact.base.id = "ID_art".to_owned();
    artifact.base.issue_instant = fixed_instant();
    artifact.any = Some(ArtifactContent::AuthnRequest(Box::new(inner)));

    let xml = write::to_xml_string(&SamlObject::ArtifactResponse(artifact.clone())).unwrap();
    let parsed = SamlParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, SamlObject::ArtifactResponse(artifact));
}

#[test]
fn artifact_response_carries_an_embedded_response() {
    let mut artifact = ArtifactResponse::new(Status::success());
    artifact.base.id = "ID_art2".to_owned();
    artifact.base.issue_instant = fixed_instant();
    artifact.any = Some(ArtifactContent::Response(Box::new(sample_response(
        "ID_resp", "ID_assert",
    ))));

    let xml = write::to_xml_string(&SamlObject::ArtifactResponse(artifact.clone())).unwrap();
    match SamlParser::parse_str(&xml).unwrap() {
        SamlObject::ArtifactResponse(parsed) => {
            assert_eq!(parsed, artifact);
            assert!(matches!(parsed.any, Some(ArtifactContent::Response(_))));
        }
        other => panic!("expected an artifact response, got {other:?}"),
    }
}

#[test]
fn logout_request_round_trips() {
    let mut request = LogoutRequest::new();
    request.base.id = "ID_logout".to_owned();
    request.base.issue_instant = fixed_instant();
    request.base.issuer = Some(NameId::new("http://sp.example.org"));
    request.name_id = Some(NameId::new("alice"));
    request.session_indexes = vec!["s-1".to_owned(), "s-2".to_owned()];

    let xml = write::to_xml_string(&SamlObject::LogoutRequest(request.clone())).unwrap();
    let parsed = SamlParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, SamlObject::LogoutRequest(request));
}

#[test]
fn idp_metadata_document_parses() {
    let xml = r#"<md:EntityDescriptor
        xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata"
        entityID="http://idp.example.org">
        <md:IDPSSODescriptor WantAuthnRequestsSigned="true"
            protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
            <md:NameIDFormat>urn:oasis:names:tc:SAML:2.0:nameid-format:persistent</md:NameIDFormat>
            <md:SingleSignOnService
                Binding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect"
                Location="http://idp.example.org/sso"/>
        </md:IDPSSODescriptor>
    </md:EntityDescriptor>"#;

    match SamlParser::parse_str(xml).unwrap() {
        SamlObject::EntityDescriptor(entity) => {
            assert_eq!(entity.entity_id, "http://idp.example.org");
        }
        other => panic!("expected an entity descriptor, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_element_is_rejected() {
    let err = SamlParser::parse_str(r#"<Unknown xmlns="urn:example:nothing"/>"#).unwrap_err();
    assert!(matches!(err, ParsingError::UnknownStartElement { .. }));
}
