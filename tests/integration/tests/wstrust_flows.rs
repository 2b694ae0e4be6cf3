//! WS-Trust issue and validate flows, with SAML assertions travelling
//! as opaque issued tokens.

use chrono::Duration;
use fedlink_saml::{write as saml_write, SamlObject};
use fedlink_wstrust::constants::{key_types, request_types, status_codes};
use fedlink_wstrust::types::{
    Lifetime, RequestSecurityToken, RequestSecurityTokenResponse, Status,
};
use fedlink_wstrust::{WsTrustObject, WsTrustParser};
use fedlink_xml::XmlCursor;

use crate::common::{fixed_instant, sample_assertion};

const SAML2_TOKEN_TYPE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

#[test]
fn issue_request_round_trips() {
    let mut request = RequestSecurityToken::issue(SAML2_TOKEN_TYPE);
    request.context = Some("ctx-7".to_owned());
    request.applies_to = Some(fedlink_wstrust::types::EndpointReference::new(
        "http://service.example.org",
    ));
    request.key_type = Some(key_types::BEARER.to_owned());

    let xml = fedlink_wstrust::write::to_xml_string(&WsTrustObject::Request(request.clone()))
        .unwrap();
    assert!(xml.contains(request_types::ISSUE));
    let parsed = WsTrustParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, WsTrustObject::Request(request));
}

#[test]
fn issued_saml_assertion_travels_opaquely() {
    // The "issued token" is a real SAML assertion, captured as DOM.
    let assertion_xml =
        saml_write::to_xml_string(&SamlObject::Assertion(sample_assertion("ID_tok"))).unwrap();
    let token = XmlCursor::new(&assertion_xml).dom_element().unwrap();

    let mut response = RequestSecurityTokenResponse::default();
    response.context = Some("ctx-7".to_owned());
    response.token_type = Some(SAML2_TOKEN_TYPE.to_owned());
    response.lifetime = Some(Lifetime {
        created: Some(fixed_instant()),
        expires: Some(fixed_instant() + Duration::hours(2)),
    });
    response.requested_security_token = Some(token);

    let xml = fedlink_wstrust::write::to_xml_string(&WsTrustObject::Response(response.clone()))
        .unwrap();
    let parsed = WsTrustParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, WsTrustObject::Response(response.clone()));

    // The embedded assertion is still a parseable SAML document.
    let reparsed = match parsed {
        WsTrustObject::Response(inner) => inner.requested_security_token.unwrap(),
        other => panic!("expected a response, got {other:?}"),
    };
    let embedded = fedlink_saml::SamlParser::parse_str(&reparsed.to_xml().unwrap()).unwrap();
    assert_eq!(embedded, SamlObject::Assertion(sample_assertion("ID_tok")));
}

#[test]
fn validate_flow_reports_status() {
    let assertion_xml =
        saml_write::to_xml_string(&SamlObject::Assertion(sample_assertion("ID_tok"))).unwrap();
    let target = XmlCursor::new(&assertion_xml).dom_element().unwrap();

    let request = RequestSecurityToken::validate(target);
    let xml = fedlink_wstrust::write::to_xml_string(&WsTrustObject::Request(request.clone()))
        .unwrap();
    let parsed = WsTrustParser::parse_str(&xml).unwrap();
    assert_eq!(parsed, WsTrustObject::Request(request));

    let mut response = RequestSecurityTokenResponse::default();
    response.status = Some(Status::invalid("token expired"));
    let xml = fedlink_wstrust::write::to_xml_string(&WsTrustObject::Response(response)).unwrap();
    match WsTrustParser::parse_str(&xml).unwrap() {
        WsTrustObject::Response(inner) => {
            let status = inner.status.unwrap();
            assert_eq!(status.code, status_codes::INVALID);
            assert_eq!(status.reason.as_deref(), Some("token expired"));
        }
        other => panic!("expected a response, got {other:?}"),
    }
}

#[test]
fn on_behalf_of_token_survives_a_round_trip() {
    let xml = r#"<wst:RequestSecurityToken
        xmlns:wst="http://docs.oasis-open.org/ws-sx/ws-trust/200512"
        xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd">
        <wst:RequestType>http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue</wst:RequestType>
        <wst:OnBehalfOf>
            <wsse:UsernameToken><wsse:Username>alice</wsse:Username></wsse:UsernameToken>
        </wst:OnBehalfOf>
    </wst:RequestSecurityToken>"#;

    let parsed = WsTrustParser::parse_str(xml).unwrap();
    let request = match &parsed {
        WsTrustObject::Request(inner) => inner.clone(),
        other => panic!("expected a request, got {other:?}"),
    };
    let token = request.on_behalf_of.as_ref().expect("on-behalf-of token");
    assert_eq!(token.name.local_name, "UsernameToken");

    let rewritten =
        fedlink_wstrust::write::to_xml_string(&WsTrustObject::Request(request)).unwrap();
    assert_eq!(WsTrustParser::parse_str(&rewritten).unwrap(), parsed);
}
