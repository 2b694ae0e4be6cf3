//! Extraction of verification keys embedded in `KeyInfo`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use fedlink_core::{ProcessingError, ProcessingResult};
use rsa::{BigUint, RsaPublicKey};

use crate::algorithms::DSIG_NS;

/// Extracts an RSA public key from the first
/// `KeyInfo/KeyValue/RSAKeyValue` in the document.
///
/// Returns `Ok(None)` when the document embeds no key value, so callers
/// can fall back to externally configured trust material.
pub fn extract_key_value(xml: &str) -> ProcessingResult<Option<RsaPublicKey>> {
    let doc = roxmltree::Document::parse(xml)?;
    let Some(rsa_value) = doc.descendants().find(|n| {
        n.is_element()
            && n.tag_name().name() == "RSAKeyValue"
            && n.tag_name().namespace() == Some(DSIG_NS)
    }) else {
        return Ok(None);
    };

    let modulus = child_b64(rsa_value, "Modulus")?;
    let exponent = child_b64(rsa_value, "Exponent")?;
    let key = RsaPublicKey::new(
        BigUint::from_bytes_be(&modulus),
        BigUint::from_bytes_be(&exponent),
    )
    .map_err(|e| ProcessingError::Crypto(format!("invalid RSA key value: {e}")))?;
    Ok(Some(key))
}

fn child_b64(parent: roxmltree::Node<'_, '_>, local: &str) -> ProcessingResult<Vec<u8>> {
    let node = parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
        .ok_or_else(|| ProcessingError::MissingElement(local.to_owned()))?;
    let text: String = node
        .text()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    Ok(BASE64.decode(text)?)
}
