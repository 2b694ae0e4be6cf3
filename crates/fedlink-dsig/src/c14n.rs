//! Canonical XML 1.0, inclusive and exclusive, over `roxmltree` trees.
//!
//! Canonicalization operates on a subtree: the apex element plus its
//! descendants, optionally minus one excluded subtree (how the
//! enveloped-signature transform removes the `Signature` element from
//! the digested node set). The apex inherits namespace context from its
//! ancestors, so a fragment canonicalized out of a larger document
//! carries the declarations it needs to stand alone.

use std::collections::BTreeMap;

use crate::algorithms::CanonicalizationAlgorithm;

/// Canonicalizes the subtree rooted at `scope`.
///
/// `exclude` removes one element and its whole subtree from the output.
#[must_use]
pub fn canonicalize_subtree(
    scope: roxmltree::Node<'_, '_>,
    exclude: Option<roxmltree::NodeId>,
    algorithm: CanonicalizationAlgorithm,
) -> Vec<u8> {
    let ctx = Canonicalizer {
        exclude,
        with_comments: algorithm.with_comments(),
        exclusive: algorithm.is_exclusive(),
    };
    let mut output = Vec::new();
    ctx.node(scope, &mut output, &BTreeMap::new());
    output
}

struct Canonicalizer {
    exclude: Option<roxmltree::NodeId>,
    with_comments: bool,
    exclusive: bool,
}

/// Namespace bindings rendered so far, keyed by prefix. The default
/// namespace uses the empty-string prefix.
type NsBindings = BTreeMap<String, String>;

impl Canonicalizer {
    fn node(&self, node: roxmltree::Node<'_, '_>, output: &mut Vec<u8>, rendered: &NsBindings) {
        if Some(node.id()) == self.exclude {
            return;
        }
        match node.node_type() {
            roxmltree::NodeType::Element => self.element(node, output, rendered),
            roxmltree::NodeType::Text => {
                escape_text(node.text().unwrap_or(""), output);
            }
            roxmltree::NodeType::Comment => {
                if self.with_comments {
                    output.extend_from_slice(b"<!--");
                    output.extend_from_slice(node.text().unwrap_or("").as_bytes());
                    output.extend_from_slice(b"-->");
                }
            }
            roxmltree::NodeType::PI => {
                output.extend_from_slice(b"<?");
                output.extend_from_slice(node.tag_name().name().as_bytes());
                if let Some(value) = node.text() {
                    if !value.is_empty() {
                        output.push(b' ');
                        output.extend_from_slice(value.as_bytes());
                    }
                }
                output.extend_from_slice(b"?>");
            }
            roxmltree::NodeType::Root => {
                for child in node.children() {
                    self.node(child, output, rendered);
                }
            }
        }
    }

    fn element(&self, node: roxmltree::Node<'_, '_>, output: &mut Vec<u8>, rendered: &NsBindings) {
        let in_scope = in_scope_namespaces(node);

        let mut decls: Vec<(String, String)> = Vec::new();
        if self.exclusive {
            for prefix in utilized_prefixes(node) {
                let Some(uri) = in_scope.get(&prefix) else {
                    continue;
                };
                if rendered.get(&prefix) != Some(uri) {
                    decls.push((prefix, uri.clone()));
                }
            }
            // An unprefixed element outside any namespace must undeclare
            // an inherited default namespace.
            if tag_prefix(node).is_none()
                && node.tag_name().namespace().is_none()
                && rendered.get("").is_some_and(|uri| !uri.is_empty())
            {
                decls.push((String::new(), String::new()));
            }
        } else {
            for (prefix, uri) in &in_scope {
                if prefix == "xml" {
                    continue;
                }
                if rendered.get(prefix) != Some(uri) {
                    decls.push((prefix.clone(), uri.clone()));
                }
            }
            if rendered.get("").is_some_and(|uri| !uri.is_empty()) && !in_scope.contains_key("") {
                decls.push((String::new(), String::new()));
            }
        }
        decls.sort();

        let mut attrs: Vec<(String, String, String, String)> = Vec::new();
        for attr in node.attributes() {
            let ns_uri = attr.namespace().unwrap_or("").to_owned();
            let qname = match attr_prefix(node, &attr) {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_owned(),
            };
            attrs.push((ns_uri, attr.name().to_owned(), qname, attr.value().to_owned()));
        }
        attrs.sort();

        let name = qualified_name(node);
        output.push(b'<');
        output.extend_from_slice(name.as_bytes());
        for (prefix, uri) in &decls {
            if prefix.is_empty() {
                output.extend_from_slice(b" xmlns=\"");
            } else {
                output.extend_from_slice(b" xmlns:");
                output.extend_from_slice(prefix.as_bytes());
                output.extend_from_slice(b"=\"");
            }
            escape_attr(uri, output);
            output.push(b'"');
        }
        for (_, _, qname, value) in &attrs {
            output.push(b' ');
            output.extend_from_slice(qname.as_bytes());
            output.extend_from_slice(b"=\"");
            escape_attr(value, output);
            output.push(b'"');
        }
        output.push(b'>');

        let mut child_rendered = rendered.clone();
        if self.exclusive {
            for (prefix, uri) in decls {
                child_rendered.insert(prefix, uri);
            }
        } else {
            for (prefix, uri) in &in_scope {
                if prefix != "xml" {
                    child_rendered.insert(prefix.clone(), uri.clone());
                }
            }
        }
        for child in node.children() {
            self.node(child, output, &child_rendered);
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(name.as_bytes());
        output.push(b'>');
    }
}

/// Collects namespace bindings in scope for an element, nearest
/// declaration winning.
fn in_scope_namespaces(node: roxmltree::Node<'_, '_>) -> NsBindings {
    let mut levels: Vec<NsBindings> = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        if n.is_element() {
            let mut level = NsBindings::new();
            for ns in n.namespaces() {
                level.insert(ns.name().unwrap_or("").to_owned(), ns.uri().to_owned());
            }
            levels.push(level);
        }
        current = n.parent();
    }

    let mut result = NsBindings::new();
    for level in levels.into_iter().rev() {
        for (prefix, uri) in level {
            if uri.is_empty() {
                result.remove(&prefix);
            } else {
                result.insert(prefix, uri);
            }
        }
    }
    result
}

/// Prefixes visibly utilized by an element: its own prefix plus each
/// prefixed attribute's.
fn utilized_prefixes(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    let mut prefixes: Vec<String> = Vec::new();
    match tag_prefix(node) {
        Some(prefix) => prefixes.push(prefix.to_owned()),
        None => {
            if node.tag_name().namespace().is_some() {
                prefixes.push(String::new());
            }
        }
    }
    for attr in node.attributes() {
        if let Some(prefix) = attr_prefix(node, &attr) {
            if prefix != "xml" && !prefixes.iter().any(|p| p == &prefix) {
                prefixes.push(prefix);
            }
        }
    }
    prefixes.sort();
    prefixes
}

fn qualified_name(node: roxmltree::Node<'_, '_>) -> String {
    match tag_prefix(node) {
        Some(prefix) => format!("{prefix}:{}", node.tag_name().name()),
        None => node.tag_name().name().to_owned(),
    }
}

/// Prefix of the element's tag name as written in the document.
pub(crate) fn tag_prefix<'input>(node: roxmltree::Node<'_, 'input>) -> Option<&'input str> {
    let text = node.document().input_text();
    let rest = &text[node.range().start + 1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    rest[..end].split_once(':').map(|(prefix, _)| prefix)
}

fn attr_prefix(
    node: roxmltree::Node<'_, '_>,
    attr: &roxmltree::Attribute<'_, '_>,
) -> Option<String> {
    if attr.namespace() == Some("http://www.w3.org/XML/1998/namespace") {
        return Some("xml".to_owned());
    }
    let qname = &node.document().input_text()[attr.range_qname()];
    qname.split_once(':').map(|(prefix, _)| prefix.to_owned())
}

fn escape_text(text: &str, output: &mut Vec<u8>) {
    for b in text.bytes() {
        match b {
            b'&' => output.extend_from_slice(b"&amp;"),
            b'<' => output.extend_from_slice(b"&lt;"),
            b'>' => output.extend_from_slice(b"&gt;"),
            b'\r' => output.extend_from_slice(b"&#xD;"),
            other => output.push(other),
        }
    }
}

fn escape_attr(value: &str, output: &mut Vec<u8>) {
    for b in value.bytes() {
        match b {
            b'&' => output.extend_from_slice(b"&amp;"),
            b'<' => output.extend_from_slice(b"&lt;"),
            b'"' => output.extend_from_slice(b"&quot;"),
            b'\t' => output.extend_from_slice(b"&#x9;"),
            b'\n' => output.extend_from_slice(b"&#xA;"),
            b'\r' => output.extend_from_slice(b"&#xD;"),
            other => output.push(other),
        }
    }
}
