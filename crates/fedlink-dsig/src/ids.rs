//! ID attribute indexing for signature reference resolution.

use std::collections::HashMap;

use fedlink_core::{ProcessingError, ProcessingResult};

const ID_ATTRIBUTES: [&str; 3] = ["ID", "Id", "id"];

/// Builds a map from ID attribute value to element.
///
/// Two elements carrying the same ID value make the document unsignable
/// and unverifiable: a reference could silently bind to the wrong
/// subtree, so this fails instead.
pub(crate) fn build_id_map<'a>(
    doc: &'a roxmltree::Document<'a>,
) -> ProcessingResult<HashMap<String, roxmltree::NodeId>> {
    let mut map = HashMap::new();
    for node in doc.descendants().filter(roxmltree::Node::is_element) {
        for attr_name in ID_ATTRIBUTES {
            if let Some(value) = node.attribute(attr_name) {
                if let Some(previous) = map.insert(value.to_owned(), node.id()) {
                    if previous != node.id() {
                        return Err(ProcessingError::AmbiguousId(value.to_owned()));
                    }
                }
            }
        }
    }
    Ok(map)
}

/// The element's own ID attribute value, checking the registered names
/// in order.
pub(crate) fn element_id<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    ID_ATTRIBUTES.iter().find_map(|name| node.attribute(*name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_indexed_across_attribute_spellings() {
        let doc = roxmltree::Document::parse(r#"<a ID="one"><b Id="two"><c id="three"/></b></a>"#)
            .unwrap();
        let map = build_id_map(&doc).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.contains_key("one"));
        assert!(map.contains_key("three"));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let doc = roxmltree::Document::parse(r#"<a ID="dup"><b ID="dup"/></a>"#).unwrap();
        let err = build_id_map(&doc).unwrap_err();
        assert!(matches!(err, ProcessingError::AmbiguousId(value) if value == "dup"));
    }
}
