//! Owned element trees for opaque subtree pass-through.
//!
//! Protocol messages embed content the streaming parsers deliberately do
//! not interpret: `dsig:Signature` blocks, XACML request payloads,
//! encrypted assertions, metadata extensions. Those subtrees are captured
//! into this owned DOM by [`XmlCursor::dom_element`](crate::XmlCursor::dom_element)
//! and written back out with structure, prefixes, and namespace
//! declarations intact. Whitespace-only text between elements is not
//! preserved, so the rewrite is structurally faithful rather than
//! byte-identical; signature validation always runs on the original
//! document string, never on a rewritten subtree.

use fedlink_core::ProcessingResult;

use crate::cursor::XmlAttribute;
use crate::qname::QName;
use crate::writer::XmlWriter;

/// A namespace declaration (`xmlns` or `xmlns:prefix`) on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// `None` for the default namespace declaration.
    pub prefix: Option<String>,
    /// The declared namespace URI.
    pub uri: String,
}

/// A node in an owned subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    /// A child element.
    Element(DomElement),
    /// Character data.
    Text(String),
}

/// An owned element with its full subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Resolved element name.
    pub name: QName,
    /// Prefix as written in the source document.
    pub prefix: Option<String>,
    /// Ordinary attributes in document order.
    pub attributes: Vec<XmlAttribute>,
    /// Namespace declarations carried on this element.
    pub namespaces: Vec<NamespaceDecl>,
    /// Child nodes in document order.
    pub children: Vec<DomNode>,
}

impl DomElement {
    /// Returns the element name as written, prefix included.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.name.local_name),
            None => self.name.local_name.clone(),
        }
    }

    /// Returns the value of an unqualified attribute.
    #[must_use]
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace_uri.is_empty() && a.name.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// Depth-first search for the first descendant element with the given
    /// resolved name. Does not match `self`.
    #[must_use]
    pub fn find(&self, namespace_uri: &str, local_name: &str) -> Option<&DomElement> {
        for child in &self.children {
            if let DomNode::Element(el) = child {
                if el.name.matches(namespace_uri, local_name) {
                    return Some(el);
                }
                if let Some(found) = el.find(namespace_uri, local_name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated direct text content of this element, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let DomNode::Text(t) = child {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }

    /// Serializes the subtree back to XML.
    pub fn to_xml(&self) -> ProcessingResult<String> {
        let mut writer = XmlWriter::new(Vec::new());
        writer.write_dom(self)?;
        writer.into_string()
    }
}

// Captured subtrees serialize as their XML text so protocol objects that
// carry opaque content stay serde-friendly.
impl serde::Serialize for DomElement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let xml = self.to_xml().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&xml)
    }
}

impl<'de> serde::Deserialize<'de> for DomElement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let xml = <String as serde::Deserialize>::deserialize(deserializer)?;
        crate::XmlCursor::new(&xml)
            .dom_element()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XmlCursor;

    const SIG: &str = r##"<dsig:Signature xmlns:dsig="http://www.w3.org/2000/09/xmldsig#">
        <dsig:SignedInfo>
            <dsig:Reference URI="#ID_1"/>
        </dsig:SignedInfo>
        <dsig:SignatureValue>AbCd==</dsig:SignatureValue>
    </dsig:Signature>"##;

    fn capture(xml: &str) -> DomElement {
        XmlCursor::new(xml).dom_element().unwrap()
    }

    #[test]
    fn find_descends() {
        let dom = capture(SIG);
        let reference = dom
            .find("http://www.w3.org/2000/09/xmldsig#", "Reference")
            .unwrap();
        assert_eq!(reference.attribute("URI"), Some("#ID_1"));
        assert!(dom.find("http://www.w3.org/2000/09/xmldsig#", "KeyInfo").is_none());
    }

    #[test]
    fn text_trims() {
        let dom = capture(SIG);
        let value = dom
            .find("http://www.w3.org/2000/09/xmldsig#", "SignatureValue")
            .unwrap();
        assert_eq!(value.text(), "AbCd==");
    }

    #[test]
    fn serialization_keeps_prefixes() {
        let dom = capture(SIG);
        let xml = dom.to_xml().unwrap();
        assert!(xml.starts_with("<dsig:Signature"));
        assert!(xml.contains(r#"xmlns:dsig="http://www.w3.org/2000/09/xmldsig#""#));
        assert!(xml.contains(r##"<dsig:Reference URI="#ID_1">"##));
    }
}
