//! # fedlink-wstrust
//!
//! WS-Trust 1.3 protocol object models with a streaming parser and
//! mirrored writers.
//!
//! [`WsTrustParser`] dispatches on the WS-Trust namespace plus local name
//! and routes to the matching element parser. Issued and targeted
//! security tokens are foreign schemas (typically SAML assertions) and
//! are carried as opaque DOM subtrees; everything else is parsed into
//! typed structures. Writers emit the `wst`/`wsp`/`wsa`/`wsu` prefixes
//! declared once at the message root.

#![forbid(unsafe_code)]

pub mod constants;
pub mod parse;
pub mod types;
pub mod write;

pub use parse::WsTrustParser;
pub use types::WsTrustObject;
