//! Qualified names.

use std::fmt;

/// A (namespace URI, local name) pair.
///
/// Used as the dispatch key throughout the parser registry. Equality is
/// exact string comparison on both parts; no normalization is applied.
/// Elements outside any namespace carry an empty namespace URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI, empty for unqualified names.
    pub namespace_uri: String,
    /// Local part of the name.
    pub local_name: String,
}

impl QName {
    /// Creates a namespace-qualified name.
    pub fn new(namespace_uri: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
        }
    }

    /// Creates an unqualified name.
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace_uri: String::new(),
            local_name: local_name.into(),
        }
    }

    /// Returns true if both namespace URI and local name match exactly.
    #[must_use]
    pub fn matches(&self, namespace_uri: &str, local_name: &str) -> bool {
        self.namespace_uri == namespace_uri && self.local_name == local_name
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_uri.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{{{}}}{}", self.namespace_uri, self.local_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_exact() {
        let a = QName::new("urn:a", "Assertion");
        let b = QName::new("urn:a", "Assertion");
        let c = QName::new("urn:a", "assertion");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_includes_namespace() {
        let q = QName::new("urn:oasis:names:tc:SAML:2.0:protocol", "Response");
        assert_eq!(q.to_string(), "{urn:oasis:names:tc:SAML:2.0:protocol}Response");
        assert_eq!(QName::local("ID").to_string(), "ID");
    }
}
