//! # fedlink-xml
//!
//! Streaming XML primitives shared by every fedlink parser and writer:
//!
//! - [`XmlCursor`]: a peekable token cursor over a namespace-resolving
//!   XML event stream
//! - [`QName`]: a (namespace URI, local name) pair used as dispatch key
//! - [`DomElement`]: an owned element tree used to pass subtrees through
//!   as opaque content (signatures, XACML payloads, encrypted assertions)
//! - [`XmlWriter`]: an incremental stream writer with explicit namespace
//!   prefix control
//!
//! Cursor operations consume the shared stream position; peeking is
//! idempotent. A cursor is owned and destroyed within a single parse
//! invocation, with no cross-request sharing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cursor;
pub mod dom;
pub mod qname;
pub mod writer;

pub use cursor::{EndTag, StartTag, XmlAttribute, XmlCursor, XmlToken};
pub use dom::{DomElement, DomNode, NamespaceDecl};
pub use qname::QName;
pub use writer::XmlWriter;

/// The `http://www.w3.org/2001/XMLSchema-instance` namespace.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
