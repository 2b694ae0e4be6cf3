//! Incremental XML stream writer.
//!
//! Thin layer over a `quick_xml` writer adding a pending-start buffer so
//! attributes and namespace declarations can be added after the element is
//! opened, plus verbatim write-back of captured [`DomElement`] subtrees.
//! End tags are always written in full; self-closing forms are never
//! emitted so signed output is byte-stable across a parse round trip.

use std::io::Write;

use fedlink_core::{ProcessingError, ProcessingResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::dom::{DomElement, DomNode};

/// A streaming XML writer.
pub struct XmlWriter<W: Write> {
    inner: Writer<W>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl<W: Write> XmlWriter<W> {
    /// Creates a writer over the given sink. No XML declaration is emitted;
    /// protocol messages travel as document fragments.
    #[must_use]
    pub fn new(sink: W) -> Self {
        Self {
            inner: Writer::new(sink),
            pending: None,
            open: Vec::new(),
        }
    }

    /// Opens an element. Attributes and namespace declarations may be added
    /// until the next content call commits the tag.
    pub fn start_element(&mut self, prefix: Option<&str>, local_name: &str) -> ProcessingResult<()> {
        self.commit_pending()?;
        let qualified = match prefix {
            Some(p) => format!("{p}:{local_name}"),
            None => local_name.to_string(),
        };
        self.pending = Some(BytesStart::new(qualified.clone()));
        self.open.push(qualified);
        Ok(())
    }

    /// Declares a prefixed namespace on the currently open start tag.
    pub fn ns_decl(&mut self, prefix: &str, uri: &str) -> ProcessingResult<()> {
        self.raw_attribute(&format!("xmlns:{prefix}"), uri)
    }

    /// Declares the default namespace on the currently open start tag.
    pub fn default_ns(&mut self, uri: &str) -> ProcessingResult<()> {
        self.raw_attribute("xmlns", uri)
    }

    /// Adds an attribute to the currently open start tag. The value is
    /// escaped on write.
    pub fn attribute(&mut self, name: &str, value: &str) -> ProcessingResult<()> {
        self.raw_attribute(name, value)
    }

    /// Writes escaped character data.
    pub fn text(&mut self, text: &str) -> ProcessingResult<()> {
        self.commit_pending()?;
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// Closes the most recently opened element.
    pub fn end_element(&mut self) -> ProcessingResult<()> {
        self.commit_pending()?;
        let qualified = self
            .open
            .pop()
            .ok_or_else(|| ProcessingError::Marshalling("end without open element".to_string()))?;
        self.inner.write_event(Event::End(BytesEnd::new(qualified)))?;
        Ok(())
    }

    /// Writes a captured subtree back out, reproducing its prefixes,
    /// namespace declarations, and attribute order.
    pub fn write_dom(&mut self, element: &DomElement) -> ProcessingResult<()> {
        self.start_element(element.prefix.as_deref(), &element.name.local_name)?;
        for ns in &element.namespaces {
            match &ns.prefix {
                Some(p) => self.ns_decl(p, &ns.uri)?,
                None => self.default_ns(&ns.uri)?,
            }
        }
        for attr in &element.attributes {
            let name = match &attr.prefix {
                Some(p) => format!("{p}:{}", attr.name.local_name),
                None => attr.name.local_name.clone(),
            };
            self.attribute(&name, &attr.value)?;
        }
        for child in &element.children {
            match child {
                DomNode::Element(el) => self.write_dom(el)?,
                DomNode::Text(t) => self.text(t)?,
            }
        }
        self.end_element()
    }

    /// Commits any pending start tag and flushes the sink.
    pub fn flush(&mut self) -> ProcessingResult<()> {
        self.commit_pending()?;
        self.inner.get_mut().flush()?;
        Ok(())
    }

    /// Commits any pending start tag and returns the sink.
    pub fn into_inner(mut self) -> ProcessingResult<W> {
        self.commit_pending()?;
        Ok(self.inner.into_inner())
    }

    fn raw_attribute(&mut self, name: &str, value: &str) -> ProcessingResult<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(ProcessingError::Marshalling(format!(
                "attribute {name} written outside a start tag"
            ))),
        }
    }

    fn commit_pending(&mut self) -> ProcessingResult<()> {
        if let Some(start) = self.pending.take() {
            self.inner.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl XmlWriter<Vec<u8>> {
    /// Finishes writing and returns the document as a string.
    pub fn into_string(self) -> ProcessingResult<String> {
        let bytes = self.into_inner()?;
        String::from_utf8(bytes)
            .map_err(|e| ProcessingError::Marshalling(format!("non-UTF8 output: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_elements_with_namespaces() {
        let mut w = XmlWriter::new(Vec::new());
        w.start_element(Some("samlp"), "AuthnRequest").unwrap();
        w.ns_decl("samlp", "urn:oasis:names:tc:SAML:2.0:protocol")
            .unwrap();
        w.attribute("ID", "ID_1").unwrap();
        w.start_element(Some("saml"), "Issuer").unwrap();
        w.ns_decl("saml", "urn:oasis:names:tc:SAML:2.0:assertion")
            .unwrap();
        w.text("http://sp").unwrap();
        w.end_element().unwrap();
        w.end_element().unwrap();
        let out = w.into_string().unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<samlp:AuthnRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="ID_1">"#,
                r#"<saml:Issuer xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion">http://sp</saml:Issuer>"#,
                "</samlp:AuthnRequest>",
            )
        );
    }

    #[test]
    fn empty_element_gets_explicit_end_tag() {
        let mut w = XmlWriter::new(Vec::new());
        w.start_element(Some("samlp"), "StatusCode").unwrap();
        w.attribute("Value", "urn:ok").unwrap();
        w.end_element().unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<samlp:StatusCode Value="urn:ok"></samlp:StatusCode>"#
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut w = XmlWriter::new(Vec::new());
        w.start_element(None, "a").unwrap();
        w.attribute("v", "x\"<>&y").unwrap();
        w.end_element().unwrap();
        let out = w.into_string().unwrap();
        assert!(out.contains("&quot;"));
        assert!(out.contains("&lt;"));
        assert!(!out.contains("\"<"));
    }

    #[test]
    fn attribute_outside_start_tag_fails() {
        let mut w = XmlWriter::new(Vec::new());
        w.start_element(None, "a").unwrap();
        w.text("body").unwrap();
        assert!(w.attribute("late", "1").is_err());
    }

    #[test]
    fn unbalanced_end_fails() {
        let mut w = XmlWriter::new(Vec::new());
        assert!(w.end_element().is_err());
    }
}
