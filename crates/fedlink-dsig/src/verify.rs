//! Enveloped XML signature validation.
//!
//! A structurally sound signature that simply does not match returns
//! `Ok(false)`. Broken structure, unresolvable references, and unknown
//! algorithms are errors, never a silent `false`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fedlink_core::{ProcessingError, ProcessingResult};
use rsa::RsaPublicKey;

use crate::algorithms::{CanonicalizationAlgorithm, DSIG_NS, ENVELOPED_SIGNATURE};
use crate::c14n::canonicalize_subtree;
use crate::ids;

/// Validates the first enveloped signature in the document against the
/// given public key.
pub fn validate_document(xml: &str, public_key: &RsaPublicKey) -> ProcessingResult<bool> {
    let doc = roxmltree::Document::parse(xml)?;
    let signature = find_descendant(doc.root(), "Signature")
        .ok_or_else(|| ProcessingError::MissingElement("Signature".to_owned()))?;
    let signed_info = find_child(signature, "SignedInfo")
        .ok_or_else(|| ProcessingError::MissingElement("SignedInfo".to_owned()))?;

    let c14n_uri = algorithm_attr(signed_info, "CanonicalizationMethod")?;
    let signed_info_c14n = CanonicalizationAlgorithm::from_uri(&c14n_uri)
        .ok_or_else(|| ProcessingError::UnsupportedAlgorithm(c14n_uri.clone()))?;
    let signature_uri = algorithm_attr(signed_info, "SignatureMethod")?;

    let reference = find_child(signed_info, "Reference")
        .ok_or_else(|| ProcessingError::MissingElement("Reference".to_owned()))?;
    if !check_reference_digest(&doc, signature, reference)? {
        tracing::debug!("reference digest mismatch");
        return Ok(false);
    }

    let signed_info_bytes = canonicalize_subtree(signed_info, None, signed_info_c14n);
    let signature_value = element_b64(signature, "SignatureValue")?;
    let valid = fedlink_crypto::sign::verify(
        &signature_uri,
        public_key,
        &signed_info_bytes,
        &signature_value,
    )?;
    tracing::debug!(algorithm = %signature_uri, valid, "validated document signature");
    Ok(valid)
}

/// Recomputes the reference digest and compares it to `DigestValue`.
fn check_reference_digest(
    doc: &roxmltree::Document<'_>,
    signature: roxmltree::Node<'_, '_>,
    reference: roxmltree::Node<'_, '_>,
) -> ProcessingResult<bool> {
    let uri = reference
        .attribute("URI")
        .ok_or_else(|| ProcessingError::MissingAttribute("URI".to_owned()))?;
    let target = if uri.is_empty() {
        doc.root_element()
    } else {
        let id = uri
            .strip_prefix('#')
            .ok_or_else(|| ProcessingError::MissingReference(uri.to_owned()))?;
        let id_map = ids::build_id_map(doc)?;
        id_map
            .get(id)
            .and_then(|node_id| doc.get_node(*node_id))
            .ok_or_else(|| ProcessingError::MissingReference(id.to_owned()))?
    };

    // The declared transforms decide whether the signature subtree is
    // excluded and which canonicalization digests the target.
    let mut exclude = None;
    let mut c14n = CanonicalizationAlgorithm::Inclusive;
    if let Some(transforms) = find_child(reference, "Transforms") {
        for transform in transforms
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "Transform")
        {
            let algorithm = transform
                .attribute("Algorithm")
                .ok_or_else(|| ProcessingError::MissingAttribute("Algorithm".to_owned()))?;
            if algorithm == ENVELOPED_SIGNATURE {
                exclude = Some(signature.id());
            } else if let Some(mode) = CanonicalizationAlgorithm::from_uri(algorithm) {
                c14n = mode;
            } else {
                return Err(ProcessingError::UnsupportedAlgorithm(algorithm.to_owned()));
            }
        }
    }

    let digest_uri = algorithm_attr(reference, "DigestMethod")?;
    let expected = element_b64(reference, "DigestValue")?;
    let canonical = canonicalize_subtree(target, exclude, c14n);
    let computed = fedlink_crypto::digest::digest(&digest_uri, &canonical)?;
    Ok(computed == expected)
}

fn find_descendant<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.descendants().find(|n| {
        n.is_element() && n.tag_name().name() == local && n.tag_name().namespace() == Some(DSIG_NS)
    })
}

fn find_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|n| {
        n.is_element() && n.tag_name().name() == local && n.tag_name().namespace() == Some(DSIG_NS)
    })
}

fn algorithm_attr(parent: roxmltree::Node<'_, '_>, local: &str) -> ProcessingResult<String> {
    let node = find_child(parent, local)
        .ok_or_else(|| ProcessingError::MissingElement(local.to_owned()))?;
    node.attribute("Algorithm")
        .map(str::to_owned)
        .ok_or_else(|| ProcessingError::MissingAttribute("Algorithm".to_owned()))
}

fn element_b64(parent: roxmltree::Node<'_, '_>, local: &str) -> ProcessingResult<Vec<u8>> {
    let node = find_child(parent, local)
        .ok_or_else(|| ProcessingError::MissingElement(local.to_owned()))?;
    let text: String = node
        .text()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Ok(BASE64.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::{sign_document, SignatureConfig};
    use fedlink_crypto::SigningKeyPair;

    fn key() -> SigningKeyPair {
        SigningKeyPair::generate(2048).unwrap()
    }

    const DOC: &str =
        r#"<a:Root xmlns:a="http://a" ID="ID_1"><a:Issuer>me</a:Issuer><a:Body>x</a:Body></a:Root>"#;

    #[test]
    fn signed_document_validates() {
        let pair = key();
        let signed = sign_document(DOC, &pair, &SignatureConfig::default()).unwrap();
        assert!(validate_document(&signed, pair.public_key()).unwrap());
    }

    #[test]
    fn tampered_content_fails_validation() {
        let pair = key();
        let signed = sign_document(DOC, &pair, &SignatureConfig::default()).unwrap();
        let tampered = signed.replace("<a:Body>x</a:Body>", "<a:Body>y</a:Body>");
        assert!(!validate_document(&tampered, pair.public_key()).unwrap());
    }

    #[test]
    fn wrong_key_fails_validation() {
        let pair = key();
        let other = key();
        let signed = sign_document(DOC, &pair, &SignatureConfig::default()).unwrap();
        assert!(!validate_document(&signed, other.public_key()).unwrap());
    }

    #[test]
    fn unsigned_document_is_an_error() {
        let err = validate_document(DOC, key().public_key()).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingElement(name) if name == "Signature"));
    }

    #[test]
    fn dangling_reference_is_an_error() {
        let pair = key();
        let signed = sign_document(DOC, &pair, &SignatureConfig::default()).unwrap();
        let broken = signed.replace(r##"URI="#ID_1""##, r##"URI="#gone""##);
        let err = validate_document(&broken, pair.public_key()).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingReference(id) if id == "gone"));
    }

    #[test]
    fn unknown_transform_is_an_error() {
        let pair = key();
        let signed = sign_document(DOC, &pair, &SignatureConfig::default()).unwrap();
        let broken = signed.replace(
            "http://www.w3.org/2001/10/xml-exc-c14n#\"></dsig:Transform>",
            "urn:bogus-transform\"></dsig:Transform>",
        );
        let err = validate_document(&broken, pair.public_key()).unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn inclusive_canonicalization_round_trips() {
        let pair = key();
        let config = SignatureConfig {
            canonicalization: CanonicalizationAlgorithm::Inclusive,
            ..SignatureConfig::default()
        };
        let signed = sign_document(DOC, &pair, &config).unwrap();
        assert!(validate_document(&signed, pair.public_key()).unwrap());
    }
}
