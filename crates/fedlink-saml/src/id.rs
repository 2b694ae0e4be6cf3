//! Message and assertion ID generation.

use uuid::Uuid;

/// Generates a unique protocol message ID.
///
/// SAML IDs are of XML type `xs:ID` and must not start with a digit, so a
/// fixed prefix is applied to the random part.
#[must_use]
pub fn generate_id() -> String {
    format!("ID_{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_prefixed() {
        let a = generate_id();
        let b = generate_id();
        assert!(a.starts_with("ID_"));
        assert_ne!(a, b);
    }
}
