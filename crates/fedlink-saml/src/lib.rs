//! # fedlink-saml
//!
//! SAML 2.0 and SAML 1.1 protocol object models with streaming parsers and
//! writers.
//!
//! The parse side is a recursive-descent walk over an
//! [`XmlCursor`](fedlink_xml::XmlCursor): [`SamlParser`](parse::SamlParser)
//! peeks the top-level element's qualified name and routes to the matching
//! element parser, each of which consumes exactly its own subtree. Parsers
//! are strict: an unrecognized child element inside a known parent fails the
//! parse rather than being dropped, because silently discarded protocol
//! content can carry security-relevant restrictions.
//!
//! The write side mirrors the parsers, emitting children in the canonical
//! schema order with the `samlp`/`saml`/`md` prefixes declared once at the
//! outermost element of each subtree. Embedded `dsig:Signature` blocks and
//! other foreign content are carried as opaque [`DomElement`](fedlink_xml::DomElement)
//! subtrees and written through verbatim so signatures survive a round trip.

#![forbid(unsafe_code)]

pub mod id;
pub mod parse;
pub mod time;
pub mod types;
pub mod write;

pub use parse::SamlParser;
pub use types::SamlObject;
