//! One-shot digests keyed by XML-DSig algorithm URI.

use fedlink_core::{ProcessingError, ProcessingResult};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::uris;

/// Computes the digest of `data` under the algorithm named by `uri`.
pub fn digest(uri: &str, data: &[u8]) -> ProcessingResult<Vec<u8>> {
    match uri {
        uris::DIGEST_SHA1 => Ok(Sha1::digest(data).to_vec()),
        uris::DIGEST_SHA256 => Ok(Sha256::digest(data).to_vec()),
        uris::DIGEST_SHA384 => Ok(Sha384::digest(data).to_vec()),
        uris::DIGEST_SHA512 => Ok(Sha512::digest(data).to_vec()),
        other => Err(ProcessingError::UnsupportedAlgorithm(other.to_string())),
    }
}
