//! # fedlink-core
//!
//! Shared error taxonomy for the fedlink federation toolkit.
//!
//! Every other crate in the workspace reports failures through one of the
//! three error families defined here:
//!
//! - [`ParsingError`]: malformed or unexpected protocol XML
//! - [`ProcessingError`]: transformation, canonicalization, and signing
//!   failures
//! - [`ConfigurationError`]: invalid or missing configuration needed to
//!   construct a parser, writer, or signer

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;

pub use error::{
    ConfigurationError, ParsingError, ParsingResult, ProcessingError, ProcessingResult,
};
