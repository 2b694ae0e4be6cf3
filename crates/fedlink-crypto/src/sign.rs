//! RSA PKCS#1 v1.5 signing and verification keyed by algorithm URI.
//!
//! Verification distinguishes two outcomes the way callers need them
//! separated: a structurally valid signature that does not match returns
//! `Ok(false)`, while malformed signature bytes or an unknown algorithm
//! return an error.

use fedlink_core::{ProcessingError, ProcessingResult};
use rsa::pkcs1v15;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::uris;

/// Signs `data` with the given private key under the algorithm named by
/// `uri`.
pub fn sign(uri: &str, key: &RsaPrivateKey, data: &[u8]) -> ProcessingResult<Vec<u8>> {
    macro_rules! do_sign {
        ($hasher:ty) => {{
            let sk = pkcs1v15::SigningKey::<$hasher>::new(key.clone());
            Ok(sk.sign(data).to_vec())
        }};
    }
    match uri {
        uris::RSA_SHA1 => do_sign!(sha1::Sha1),
        uris::RSA_SHA256 => do_sign!(sha2::Sha256),
        uris::RSA_SHA384 => do_sign!(sha2::Sha384),
        uris::RSA_SHA512 => do_sign!(sha2::Sha512),
        other => Err(ProcessingError::UnsupportedAlgorithm(other.to_string())),
    }
}

/// Verifies `signature` over `data` with the given public key.
pub fn verify(
    uri: &str,
    key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> ProcessingResult<bool> {
    let sig = pkcs1v15::Signature::try_from(signature)
        .map_err(|e| ProcessingError::Crypto(format!("invalid RSA signature encoding: {e}")))?;
    macro_rules! do_verify {
        ($hasher:ty) => {{
            let vk = pkcs1v15::VerifyingKey::<$hasher>::new(key.clone());
            Ok(vk.verify(data, &sig).is_ok())
        }};
    }
    match uri {
        uris::RSA_SHA1 => do_verify!(sha1::Sha1),
        uris::RSA_SHA256 => do_verify!(sha2::Sha256),
        uris::RSA_SHA384 => do_verify!(sha2::Sha384),
        uris::RSA_SHA512 => do_verify!(sha2::Sha512),
        other => Err(ProcessingError::UnsupportedAlgorithm(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SigningKeyPair;

    #[test]
    fn sign_then_verify() {
        let pair = SigningKeyPair::generate(2048).unwrap();
        let sig = sign(uris::RSA_SHA256, pair.private_key(), b"payload").unwrap();
        assert!(verify(uris::RSA_SHA256, pair.public_key(), b"payload", &sig).unwrap());
    }

    #[test]
    fn tampered_data_verifies_false() {
        let pair = SigningKeyPair::generate(2048).unwrap();
        let sig = sign(uris::RSA_SHA256, pair.private_key(), b"payload").unwrap();
        assert!(!verify(uris::RSA_SHA256, pair.public_key(), b"tampered", &sig).unwrap());
    }

    #[test]
    fn wrong_key_verifies_false() {
        let signer = SigningKeyPair::generate(2048).unwrap();
        let other = SigningKeyPair::generate(2048).unwrap();
        let sig = sign(uris::RSA_SHA1, signer.private_key(), b"payload").unwrap();
        assert!(!verify(uris::RSA_SHA1, other.public_key(), b"payload", &sig).unwrap());
    }

    #[test]
    fn unknown_algorithm_errors() {
        let pair = SigningKeyPair::generate(2048).unwrap();
        let err = sign("urn:bogus", pair.private_key(), b"x").unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedAlgorithm(_)));
    }
}
