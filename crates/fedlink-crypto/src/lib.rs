//! # fedlink-crypto
//!
//! Cryptographic primitives backing the XML signature engine: RSA key
//! material, PKCS#1 v1.5 signing and verification keyed by XML-DSig
//! algorithm URI, and one-shot digests.
//!
//! Everything here operates on raw byte slices; canonicalization and
//! signature document structure live in `fedlink-dsig`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod digest;
pub mod key;
pub mod sign;
pub mod uris;

pub use key::SigningKeyPair;
