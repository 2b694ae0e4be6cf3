//! End-to-end signing flows: protocol objects serialized, signed,
//! validated, tampered with, and parsed back.

use fedlink_crypto::SigningKeyPair;
use fedlink_dsig::keyinfo::extract_key_value;
use fedlink_dsig::{sign_document, validate_document, SignatureConfig};
use fedlink_saml::{write, SamlObject, SamlParser};

use crate::common::sample_response;

fn key() -> SigningKeyPair {
    SigningKeyPair::generate(2048).unwrap()
}

#[test]
fn signed_response_validates_and_survives_parsing() {
    let response = sample_response("ID_resp", "ID_assert");
    let xml = write::to_xml_string(&SamlObject::Response(response)).unwrap();

    let pair = key();
    let signed = sign_document(&xml, &pair, &SignatureConfig::default()).unwrap();
    assert!(validate_document(&signed, pair.public_key()).unwrap());

    // The signature sits inside the Response, right after its Issuer.
    let issuer_end = signed.find("</saml:Issuer>").unwrap() + "</saml:Issuer>".len();
    assert!(signed[issuer_end..].starts_with("<dsig:Signature"));

    match SamlParser::parse_str(&signed).unwrap() {
        SamlObject::Response(parsed) => {
            assert!(parsed.base.signature.is_some());
            assert_eq!(parsed.assertions.len(), 1);
        }
        other => panic!("expected a response, got {other:?}"),
    }
}

#[test]
fn tampering_breaks_validation() {
    let xml = write::to_xml_string(&SamlObject::Response(sample_response(
        "ID_resp", "ID_assert",
    )))
    .unwrap();
    let pair = key();
    let signed = sign_document(&xml, &pair, &SignatureConfig::default()).unwrap();

    let tampered = signed.replace("admin", "superadmin");
    assert_ne!(signed, tampered);
    assert!(!validate_document(&tampered, pair.public_key()).unwrap());
}

#[test]
fn signing_without_key_info_still_validates() {
    let xml = write::to_xml_string(&SamlObject::Response(sample_response(
        "ID_resp", "ID_assert",
    )))
    .unwrap();
    let pair = key();
    let config = SignatureConfig {
        include_key_value: false,
        ..SignatureConfig::default()
    };
    let signed = sign_document(&xml, &pair, &config).unwrap();

    assert!(!signed.contains("KeyInfo"));
    assert!(extract_key_value(&signed).unwrap().is_none());
    assert!(validate_document(&signed, pair.public_key()).unwrap());
}

#[test]
fn embedded_key_value_verifies_the_document() {
    let xml = write::to_xml_string(&SamlObject::Response(sample_response(
        "ID_resp", "ID_assert",
    )))
    .unwrap();
    let pair = key();
    let signed = sign_document(&xml, &pair, &SignatureConfig::default()).unwrap();

    let embedded = extract_key_value(&signed).unwrap().expect("embedded key");
    assert_eq!(&embedded, pair.public_key());
    assert!(validate_document(&signed, &embedded).unwrap());
}

#[test]
fn an_inner_assertion_can_be_the_reference_target() {
    let xml = write::to_xml_string(&SamlObject::Response(sample_response(
        "ID_resp", "ID_assert",
    )))
    .unwrap();
    let pair = key();
    let config = SignatureConfig {
        reference_id: Some("ID_assert".to_owned()),
        ..SignatureConfig::default()
    };
    let signed = sign_document(&xml, &pair, &config).unwrap();
    assert!(signed.contains(r##"URI="#ID_assert""##));
    assert!(validate_document(&signed, pair.public_key()).unwrap());

    match SamlParser::parse_str(&signed).unwrap() {
        SamlObject::Response(parsed) => match &parsed.assertions[0] {
            fedlink_saml::types::ResponseItem::Assertion(assertion) => {
                assert!(assertion.signature.is_some());
            }
            other => panic!("expected a plain assertion, got {other:?}"),
        },
        other => panic!("expected a response, got {other:?}"),
    }
}
