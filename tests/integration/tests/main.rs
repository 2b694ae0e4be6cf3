//! Cross-crate scenario tests.
//!
//! These exercise complete flows over the public APIs: protocol objects
//! written to XML, signed, validated, and parsed back.

mod common;
mod saml_flows;
mod signed_documents;
mod wstrust_flows;
