//! # fedlink-dsig
//!
//! Enveloped XML signature creation and validation.
//!
//! [`sign_document`] is a builder: it takes a document string, digests
//! the referenced element under the configured canonicalization, and
//! returns a new string with the `dsig:Signature` spliced in after the
//! element's `Issuer` child. [`validate_document`] recomputes the
//! reference digest under the declared transforms and verifies
//! `SignedInfo` against a caller-supplied RSA key; a key embedded in
//! `KeyInfo` can be recovered with [`keyinfo::extract_key_value`].

#![forbid(unsafe_code)]

pub mod algorithms;
pub mod c14n;
mod ids;
pub mod keyinfo;
pub mod sign;
pub mod verify;

pub use algorithms::{CanonicalizationAlgorithm, SignatureAlgorithm};
pub use sign::{sign_document, SignatureConfig};
pub use verify::validate_document;
