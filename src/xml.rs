//! Minimal owned XML tree and path evaluation for e-file returns.
//!
//! Element names are reduced to their local part while parsing, so path
//! expressions never need the namespace prefixes that vary across filing
//! years. Path evaluation returns a typed outcome per expression —
//! matched, unmatched, or invalid expression — instead of swallowing
//! evaluation errors.

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML syntax error: {0}")]
    Syntax(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("unbalanced element nesting")]
    Unbalanced,

    #[error("content after document root")]
    TrailingContent,
}

/// One element: local name, direct text content, children in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn named(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }
}

/// Result of evaluating one path expression against a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOutcome {
    /// The first structurally matching node's text content.
    Match(String),
    /// Well-formed expression, no node at that location.
    NoMatch,
    /// Expression itself is malformed (empty, or empty segments).
    Invalid,
}

/// Parse a whole document into an owned tree, stripping namespace prefixes.
pub fn parse(xml: &str) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(XmlNode::named(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                attach(&mut stack, &mut root, XmlNode::named(name))?;
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| XmlError::Syntax(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or(XmlError::Unbalanced)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, comments, processing instructions
            Err(e) => return Err(XmlError::Syntax(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Unbalanced);
    }
    root.ok_or(XmlError::NoRoot)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(XmlError::TrailingContent)
    }
}

/// Evaluate one slash-separated path against the tree. `/Return/.../EIN`
/// anchors at the root element; a leading `//` means "first match
/// anywhere" in document order.
pub fn evaluate(root: &XmlNode, expr: &str) -> PathOutcome {
    let expr = expr.trim();
    if expr.is_empty() {
        return PathOutcome::Invalid;
    }
    let anywhere = expr.starts_with("//");
    let body = expr.trim_start_matches('/');
    if body.is_empty() {
        return PathOutcome::Invalid;
    }
    let segments: Vec<&str> = body.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return PathOutcome::Invalid;
    }

    let hit = if anywhere {
        find_anywhere(root, &segments)
    } else {
        match_from(root, &segments)
    };

    match hit {
        Some(node) => PathOutcome::Match(node.text.trim().to_string()),
        None => PathOutcome::NoMatch,
    }
}

/// Match the segment list with `node` as the first segment; descend through
/// children in document order, first full match wins.
fn match_from<'a>(node: &'a XmlNode, segments: &[&str]) -> Option<&'a XmlNode> {
    if node.name != segments[0] {
        return None;
    }
    if segments.len() == 1 {
        return Some(node);
    }
    node.children
        .iter()
        .find_map(|child| match_from(child, &segments[1..]))
}

fn find_anywhere<'a>(node: &'a XmlNode, segments: &[&str]) -> Option<&'a XmlNode> {
    if let Some(hit) = match_from(node, segments) {
        return Some(hit);
    }
    node.children
        .iter()
        .find_map(|child| find_anywhere(child, segments))
}
