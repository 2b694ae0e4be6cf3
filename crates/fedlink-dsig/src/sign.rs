//! Enveloped XML signature creation.
//!
//! Signing never mutates the caller's document: the input is parsed,
//! digested, and a new document string with the `dsig:Signature` spliced
//! in is returned.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fedlink_core::{ProcessingError, ProcessingResult};
use fedlink_crypto::SigningKeyPair;
use fedlink_xml::XmlWriter;
use rsa::traits::PublicKeyParts;

use crate::algorithms::{
    CanonicalizationAlgorithm, SignatureAlgorithm, DSIG_NS, DSIG_PREFIX, ENVELOPED_SIGNATURE,
};
use crate::c14n::canonicalize_subtree;
use crate::ids;

/// Per-call signing parameters.
#[derive(Debug, Clone)]
pub struct SignatureConfig {
    /// Signature algorithm, also fixing the reference digest.
    pub algorithm: SignatureAlgorithm,

    /// Canonicalization method for both the reference and `SignedInfo`.
    pub canonicalization: CanonicalizationAlgorithm,

    /// ID of the element to sign. Defaults to the document element's ID
    /// attribute.
    pub reference_id: Option<String>,

    /// Embed the public key as `KeyInfo/KeyValue/RSAKeyValue`.
    pub include_key_value: bool,

    /// Embed the key pair's certificate as `KeyInfo/X509Data`, when the
    /// pair carries one.
    pub include_certificate: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::RsaSha256,
            canonicalization: CanonicalizationAlgorithm::Exclusive,
            reference_id: None,
            include_key_value: true,
            include_certificate: false,
        }
    }
}

/// Signs the element addressed by the configured reference ID and
/// returns a new document string with the signature placed inside it,
/// immediately after an `Issuer` child when one exists.
pub fn sign_document(
    xml: &str,
    key_pair: &SigningKeyPair,
    config: &SignatureConfig,
) -> ProcessingResult<String> {
    let doc = roxmltree::Document::parse(xml)?;
    let id_map = ids::build_id_map(&doc)?;

    let reference_id = match &config.reference_id {
        Some(id) => id.clone(),
        None => ids::element_id(doc.root_element())
            .ok_or_else(|| ProcessingError::MissingAttribute("ID".to_owned()))?
            .to_owned(),
    };
    let target = id_map
        .get(&reference_id)
        .and_then(|node_id| doc.get_node(*node_id))
        .ok_or_else(|| ProcessingError::MissingReference(reference_id.clone()))?;

    let digest_input = canonicalize_subtree(target, None, config.canonicalization);
    let digest = fedlink_crypto::digest::digest(config.algorithm.digest_uri(), &digest_input)?;

    let fragment = signature_fragment(&reference_id, &BASE64.encode(digest), key_pair, config)?;
    let position = insertion_point(xml, target)?;
    let mut signed = String::with_capacity(xml.len() + fragment.len());
    signed.push_str(&xml[..position]);
    signed.push_str(&fragment);
    signed.push_str(&xml[position..]);

    // Re-parse so SignedInfo is canonicalized exactly as a verifier
    // will see it, namespace context included.
    let signed_doc = roxmltree::Document::parse(&signed)?;
    let signed_info_offset = position
        + fragment
            .find("<dsig:SignedInfo>")
            .ok_or_else(|| ProcessingError::Marshalling("signature fragment".to_owned()))?;
    let signed_info = signed_doc
        .descendants()
        .find(|n| n.is_element() && n.range().start == signed_info_offset)
        .ok_or_else(|| ProcessingError::MissingElement("SignedInfo".to_owned()))?;

    let signed_info_bytes = canonicalize_subtree(signed_info, None, config.canonicalization);
    let signature = fedlink_crypto::sign::sign(
        config.algorithm.uri(),
        key_pair.private_key(),
        &signed_info_bytes,
    )?;
    tracing::debug!(
        reference = %reference_id,
        algorithm = config.algorithm.uri(),
        "signed document"
    );

    let value_open = "<dsig:SignatureValue>";
    let splice = position
        + fragment
            .find(value_open)
            .ok_or_else(|| ProcessingError::Marshalling("signature fragment".to_owned()))?
        + value_open.len();
    let mut out = signed;
    out.insert_str(splice, &BASE64.encode(signature));
    Ok(out)
}

/// Builds the `dsig:Signature` element with an empty `SignatureValue`.
fn signature_fragment(
    reference_id: &str,
    digest_b64: &str,
    key_pair: &SigningKeyPair,
    config: &SignatureConfig,
) -> ProcessingResult<String> {
    let mut w = XmlWriter::new(Vec::new());
    w.start_element(Some(DSIG_PREFIX), "Signature")?;
    w.ns_decl(DSIG_PREFIX, DSIG_NS)?;

    w.start_element(Some(DSIG_PREFIX), "SignedInfo")?;
    w.start_element(Some(DSIG_PREFIX), "CanonicalizationMethod")?;
    w.attribute("Algorithm", config.canonicalization.uri())?;
    w.end_element()?;
    w.start_element(Some(DSIG_PREFIX), "SignatureMethod")?;
    w.attribute("Algorithm", config.algorithm.uri())?;
    w.end_element()?;

    w.start_element(Some(DSIG_PREFIX), "Reference")?;
    w.attribute("URI", &format!("#{reference_id}"))?;
    w.start_element(Some(DSIG_PREFIX), "Transforms")?;
    w.start_element(Some(DSIG_PREFIX), "Transform")?;
    w.attribute("Algorithm", ENVELOPED_SIGNATURE)?;
    w.end_element()?;
    w.start_element(Some(DSIG_PREFIX), "Transform")?;
    w.attribute("Algorithm", config.canonicalization.uri())?;
    w.end_element()?;
    w.end_element()?;
    w.start_element(Some(DSIG_PREFIX), "DigestMethod")?;
    w.attribute("Algorithm", config.algorithm.digest_uri())?;
    w.end_element()?;
    w.start_element(Some(DSIG_PREFIX), "DigestValue")?;
    w.text(digest_b64)?;
    w.end_element()?;
    w.end_element()?;
    w.end_element()?;

    w.start_element(Some(DSIG_PREFIX), "SignatureValue")?;
    w.end_element()?;

    let embed_certificate = config.include_certificate && key_pair.certificate().is_some();
    if config.include_key_value || embed_certificate {
        w.start_element(Some(DSIG_PREFIX), "KeyInfo")?;
        if config.include_key_value {
            let public = key_pair.public_key();
            w.start_element(Some(DSIG_PREFIX), "KeyValue")?;
            w.start_element(Some(DSIG_PREFIX), "RSAKeyValue")?;
            w.start_element(Some(DSIG_PREFIX), "Modulus")?;
            w.text(&BASE64.encode(public.n().to_bytes_be()))?;
            w.end_element()?;
            w.start_element(Some(DSIG_PREFIX), "Exponent")?;
            w.text(&BASE64.encode(public.e().to_bytes_be()))?;
            w.end_element()?;
            w.end_element()?;
            w.end_element()?;
        }
        if embed_certificate {
            if let Some(der) = key_pair.certificate() {
                w.start_element(Some(DSIG_PREFIX), "X509Data")?;
                w.start_element(Some(DSIG_PREFIX), "X509Certificate")?;
                w.text(&BASE64.encode(der))?;
                w.end_element()?;
                w.end_element()?;
            }
        }
        w.end_element()?;
    }

    w.end_element()?;
    w.into_string()
}

/// Byte offset where the signature is spliced into the target element:
/// after the `Issuer` close tag, or as first child when there is none.
fn insertion_point(xml: &str, target: roxmltree::Node<'_, '_>) -> ProcessingResult<usize> {
    if let Some(issuer) = target
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "Issuer")
    {
        return Ok(issuer.range().end);
    }
    if let Some(first_child) = target.first_child() {
        return Ok(first_child.range().start);
    }
    let raw = &xml[target.range()];
    if raw.ends_with("/>") {
        return Err(ProcessingError::Marshalling(
            "cannot place a signature inside an empty element".to_owned(),
        ));
    }
    let qname = match crate::c14n::tag_prefix(target) {
        Some(prefix) => format!("{prefix}:{}", target.tag_name().name()),
        None => target.tag_name().name().to_owned(),
    };
    Ok(target.range().end - (qname.len() + 3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SigningKeyPair {
        SigningKeyPair::generate(2048).unwrap()
    }

    #[test]
    fn signature_lands_after_issuer() {
        let xml = r#"<a:Root xmlns:a="http://a" ID="ID_1"><a:Issuer>me</a:Issuer><a:Body>x</a:Body></a:Root>"#;
        let signed = sign_document(xml, &key(), &SignatureConfig::default()).unwrap();
        let issuer_end = signed.find("</a:Issuer>").unwrap() + "</a:Issuer>".len();
        assert!(signed[issuer_end..].starts_with("<dsig:Signature"));
        assert!(signed.contains(r##"URI="#ID_1""##));
    }

    #[test]
    fn signature_is_first_child_without_issuer() {
        let xml = r#"<Root ID="ID_2"><Body>x</Body></Root>"#;
        let signed = sign_document(xml, &key(), &SignatureConfig::default()).unwrap();
        assert!(signed.starts_with(r#"<Root ID="ID_2"><dsig:Signature"#));
    }

    #[test]
    fn key_value_is_omitted_on_request() {
        let xml = r#"<Root ID="ID_3"><Body>x</Body></Root>"#;
        let config = SignatureConfig {
            include_key_value: false,
            ..SignatureConfig::default()
        };
        let signed = sign_document(xml, &key(), &config).unwrap();
        assert!(!signed.contains("KeyInfo"));
    }

    #[test]
    fn missing_reference_target_fails() {
        let xml = r#"<Root ID="ID_4"/>"#;
        let config = SignatureConfig {
            reference_id: Some("nope".to_owned()),
            ..SignatureConfig::default()
        };
        let err = sign_document(xml, &key(), &config).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingReference(id) if id == "nope"));
    }

    #[test]
    fn unidentified_root_fails() {
        let err = sign_document("<Root/>", &key(), &SignatureConfig::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingAttribute(_)));
    }

    #[test]
    fn duplicate_ids_fail() {
        let xml = r#"<Root ID="dup"><Child ID="dup"/></Root>"#;
        let err = sign_document(xml, &key(), &SignatureConfig::default()).unwrap_err();
        assert!(matches!(err, ProcessingError::AmbiguousId(_)));
    }
}
