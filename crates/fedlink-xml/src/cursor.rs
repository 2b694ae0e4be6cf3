//! Peekable token cursor over a namespace-resolving XML event stream.
//!
//! The cursor exposes the handful of primitives the protocol parsers are
//! written against: peek the next start element without consuming it,
//! consume start/end elements with validation, read text-only content, and
//! capture a whole subtree as an opaque [`DomElement`]. Malformed or
//! prematurely-terminated streams fail the whole parse; callers never retry.

use fedlink_core::{ParsingError, ParsingResult};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;
use tracing::trace;

use crate::dom::{DomElement, DomNode, NamespaceDecl};
use crate::qname::QName;
use crate::XSI_NS;

/// A consumed or peeked start tag.
#[derive(Debug, Clone)]
pub struct StartTag {
    /// Resolved element name.
    pub name: QName,
    /// Prefix as written in the document, if any.
    pub prefix: Option<String>,
    /// Non-namespace attributes, namespace-resolved.
    pub attributes: Vec<XmlAttribute>,
    /// Namespace declarations appearing on this tag.
    pub namespaces: Vec<NamespaceDecl>,
    /// Byte offset of the tag in the input.
    pub offset: u64,
}

/// An attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Resolved attribute name (empty namespace for unqualified attributes).
    pub name: QName,
    /// Prefix as written, if any.
    pub prefix: Option<String>,
    /// Unescaped attribute value.
    pub value: String,
}

impl StartTag {
    /// Returns the value of an unqualified attribute, trimmed.
    #[must_use]
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace_uri.is_empty() && a.name.local_name == local_name)
            .map(|a| a.value.trim())
    }

    /// Returns the value of a namespace-qualified attribute, trimmed.
    #[must_use]
    pub fn qualified_attribute(&self, namespace_uri: &str, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.matches(namespace_uri, local_name))
            .map(|a| a.value.trim())
    }

    /// Returns a required unqualified attribute or fails the parse.
    pub fn required_attribute(&self, local_name: &str) -> ParsingResult<String> {
        self.attribute(local_name)
            .map(str::to_string)
            .ok_or_else(|| ParsingError::MissingAttribute {
                element: self.name.local_name.clone(),
                attribute: local_name.to_string(),
            })
    }

    /// Returns the `xsi:type` attribute value, if present.
    #[must_use]
    pub fn xsi_type(&self) -> Option<&str> {
        self.qualified_attribute(XSI_NS, "type")
    }

    /// Validates that this tag carries the expected local name.
    pub fn expect_name(&self, expected: &str) -> ParsingResult<()> {
        if self.name.local_name == expected {
            Ok(())
        } else {
            Err(ParsingError::ExpectedTag {
                expected: expected.to_string(),
                found: self.name.local_name.clone(),
                offset: self.offset,
            })
        }
    }

    /// Returns the name as written in the document, prefix included.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{p}:{}", self.name.local_name),
            None => self.name.local_name.clone(),
        }
    }
}

/// A consumed end tag.
#[derive(Debug, Clone)]
pub struct EndTag {
    /// Resolved element name.
    pub name: QName,
    /// Byte offset of the tag in the input.
    pub offset: u64,
}

impl EndTag {
    /// Validates that this end tag carries the expected local name.
    pub fn expect_name(&self, expected: &str) -> ParsingResult<()> {
        if self.name.local_name == expected {
            Ok(())
        } else {
            Err(ParsingError::ExpectedTag {
                expected: expected.to_string(),
                found: self.name.local_name.clone(),
                offset: self.offset,
            })
        }
    }
}

/// One token from the stream.
#[derive(Debug, Clone)]
pub enum XmlToken {
    /// An element start tag (self-closing tags are expanded to start + end).
    Start(StartTag),
    /// An element end tag.
    End(EndTag),
    /// Character data; whitespace-only runs are dropped by the reader.
    Text(String),
    /// End of the stream.
    Eof,
}

/// Streaming cursor with one-token lookahead.
pub struct XmlCursor<'a> {
    reader: NsReader<&'a [u8]>,
    peeked: Option<XmlToken>,
}

impl<'a> XmlCursor<'a> {
    /// Creates a cursor over an in-memory document.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut reader = NsReader::from_str(input);
        let config = reader.config_mut();
        config.trim_text(true);
        config.expand_empty_elements = true;
        Self {
            reader,
            peeked: None,
        }
    }

    /// Current byte offset into the input.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.reader.buffer_position()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> ParsingResult<&XmlToken> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token()?);
        }
        // The option was just filled.
        Ok(self.peeked.as_ref().unwrap())
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> ParsingResult<XmlToken> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.read_token(),
        }
    }

    /// Peeks ahead to the next start element, consuming any intervening
    /// character data. Returns `None` at an end tag or end of stream
    /// without consuming it.
    pub fn peek_start_element(&mut self) -> ParsingResult<Option<StartTag>> {
        loop {
            match self.peek()? {
                XmlToken::Start(tag) => return Ok(Some(tag.clone())),
                XmlToken::End(_) | XmlToken::Eof => return Ok(None),
                XmlToken::Text(_) => {
                    self.next_token()?;
                }
            }
        }
    }

    /// Consumes tokens up to and including the next start element.
    pub fn next_start_element(&mut self) -> ParsingResult<StartTag> {
        loop {
            match self.next_token()? {
                XmlToken::Start(tag) => return Ok(tag),
                XmlToken::Text(_) => {}
                XmlToken::End(tag) => {
                    return Err(ParsingError::ExpectedStartTag { offset: tag.offset })
                }
                XmlToken::Eof => {
                    return Err(ParsingError::ExpectedStartTag {
                        offset: self.offset(),
                    })
                }
            }
        }
    }

    /// Consumes tokens up to and including the next end element.
    pub fn next_end_element(&mut self) -> ParsingResult<EndTag> {
        loop {
            match self.next_token()? {
                XmlToken::End(tag) => return Ok(tag),
                XmlToken::Text(_) => {}
                XmlToken::Start(tag) => {
                    return Err(ParsingError::ExpectedEndTag { offset: tag.offset })
                }
                XmlToken::Eof => {
                    return Err(ParsingError::ExpectedEndTag {
                        offset: self.offset(),
                    })
                }
            }
        }
    }

    /// Returns true if character data is the next meaningful token.
    pub fn has_text_ahead(&mut self) -> ParsingResult<bool> {
        Ok(matches!(self.peek()?, XmlToken::Text(_)))
    }

    /// Reads the text content of the current element, consuming up to and
    /// including its end tag. Fails if a child element is encountered.
    pub fn element_text(&mut self) -> ParsingResult<String> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                XmlToken::Text(t) => text.push_str(&t),
                XmlToken::End(_) => return Ok(text.trim().to_string()),
                XmlToken::Start(tag) => {
                    return Err(ParsingError::ExpectedText(tag.name.to_string()))
                }
                XmlToken::Eof => {
                    return Err(ParsingError::Xml(
                        "stream ended inside element text".to_string(),
                    ))
                }
            }
        }
    }

    /// Captures the next element and its entire subtree as an owned DOM.
    ///
    /// Used where the protocol explicitly allows foreign content: XML
    /// signatures, XACML payloads, encrypted assertions, vendor extensions.
    pub fn dom_element(&mut self) -> ParsingResult<DomElement> {
        let root = self.next_start_element()?;
        trace!(element = %root.name.local_name, offset = root.offset, "capturing opaque subtree");
        self.read_dom_children(root)
    }

    /// Skips forward past the end tag of the named element, honoring
    /// nesting of same-named elements.
    pub fn bypass_element_block(&mut self, local_name: &str) -> ParsingResult<()> {
        let mut depth = 0u32;
        loop {
            match self.next_token()? {
                XmlToken::Start(tag) if tag.name.local_name == local_name => depth += 1,
                XmlToken::End(tag) if tag.name.local_name == local_name => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                XmlToken::Eof => return Ok(()),
                _ => {}
            }
        }
    }

    fn read_dom_children(&mut self, tag: StartTag) -> ParsingResult<DomElement> {
        let mut element = DomElement {
            name: tag.name,
            prefix: tag.prefix,
            attributes: tag.attributes,
            namespaces: tag.namespaces,
            children: Vec::new(),
        };
        loop {
            match self.next_token()? {
                XmlToken::Start(child) => {
                    let child = self.read_dom_children(child)?;
                    element.children.push(DomNode::Element(child));
                }
                XmlToken::Text(t) => element.children.push(DomNode::Text(t)),
                XmlToken::End(_) => return Ok(element),
                XmlToken::Eof => {
                    return Err(ParsingError::Xml(
                        "stream ended inside element subtree".to_string(),
                    ))
                }
            }
        }
    }

    fn read_token(&mut self) -> ParsingResult<XmlToken> {
        loop {
            let offset = self.reader.buffer_position();
            let (resolve, event) = self
                .reader
                .read_resolved_event()
                .map_err(|e| ParsingError::Xml(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let ns = match resolve {
                        ResolveResult::Bound(ns) => {
                            String::from_utf8_lossy(ns.as_ref()).into_owned()
                        }
                        _ => String::new(),
                    };
                    return Ok(XmlToken::Start(self.convert_start(&start, ns, offset)?))
                }
                Event::End(end) => {
                    let ns = match resolve {
                        ResolveResult::Bound(ns) => {
                            String::from_utf8_lossy(ns.as_ref()).into_owned()
                        }
                        _ => String::new(),
                    };
                    let local =
                        String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                    return Ok(XmlToken::End(EndTag {
                        name: QName::new(ns, local),
                        offset,
                    }));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ParsingError::Xml(e.to_string()))?;
                    if !text.trim().is_empty() {
                        return Ok(XmlToken::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(data.as_ref()).into_owned();
                    if !text.is_empty() {
                        return Ok(XmlToken::Text(text));
                    }
                }
                Event::Eof => return Ok(XmlToken::Eof),
                // Declarations, comments, processing instructions, and
                // doctypes are not meaningful to the protocol parsers.
                _ => {}
            }
        }
    }

    fn convert_start(
        &self,
        start: &BytesStart<'_>,
        ns: String,
        offset: u64,
    ) -> ParsingResult<StartTag> {
        let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let prefix = start
            .name()
            .prefix()
            .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());

        let mut attributes = Vec::new();
        let mut namespaces = Vec::new();
        for attr in start.attributes() {
            let attr: Attribute<'_> =
                attr.map_err(|e| ParsingError::Xml(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| ParsingError::Xml(e.to_string()))?
                .into_owned();
            match attr.key.as_namespace_binding() {
                Some(PrefixDeclaration::Default) => {
                    namespaces.push(NamespaceDecl {
                        prefix: None,
                        uri: value,
                    });
                }
                Some(PrefixDeclaration::Named(p)) => {
                    namespaces.push(NamespaceDecl {
                        prefix: Some(String::from_utf8_lossy(p).into_owned()),
                        uri: value,
                    });
                }
                None => {
                    let (attr_resolve, attr_local) = self.reader.resolve_attribute(attr.key);
                    let attr_ns = match attr_resolve {
                        ResolveResult::Bound(ns) => {
                            String::from_utf8_lossy(ns.as_ref()).into_owned()
                        }
                        _ => String::new(),
                    };
                    let attr_prefix = attr
                        .key
                        .prefix()
                        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned());
                    attributes.push(XmlAttribute {
                        name: QName::new(
                            attr_ns,
                            String::from_utf8_lossy(attr_local.as_ref()).into_owned(),
                        ),
                        prefix: attr_prefix,
                        value,
                    });
                }
            }
        }

        Ok(StartTag {
            name: QName::new(ns, local),
            prefix,
            attributes,
            namespaces,
            offset,
        })
    }
}
