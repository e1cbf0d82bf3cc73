//! Node tree.
//!
//! Every node kind implements [`Markup`], which gives uniform access to the
//! tag name, attributes, text and children. [`Node`] is the owned sum of all
//! kinds and is what trees are built from.

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::registry::{self, NodeType};
use crate::serialize::{self, Tags};
use crate::term::Term;
use crate::terms::TermTable;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Tag name of anonymous text nodes.
pub const TEXT_NODE_NAME: &str = "text-node";

/// Boxed iterator over the children of a node.
pub type Children<'a> = Box<dyn Iterator<Item = &'a dyn Markup> + 'a>;

/// Capabilities shared by every node kind.
pub trait Markup: fmt::Debug {
    fn nodename(&self) -> &str;

    /// The registered type, or `None` for generic elements and anonymous text.
    fn node_type(&self) -> Option<&'static NodeType>;

    fn attributes(&self) -> &Attributes;

    fn attributes_mut(&mut self) -> &mut Attributes;

    fn children(&self) -> Children<'_>;

    /// Text content, for text-bearing nodes.
    fn text(&self) -> Option<&str> {
        None
    }

    /// True for character data that renders without tags inside its parent.
    fn is_raw_text(&self) -> bool {
        false
    }

    fn is_textnode(&self) -> bool {
        self.text().is_some()
    }

    fn has_children(&self) -> bool {
        self.children().next().is_some()
    }

    fn has_attributes(&self) -> bool {
        !self.attributes().is_empty()
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes().get(name).is_some()
    }

    /// Depth-first walk over all nodes below this one.
    fn descendants(&self) -> Descendants<'_>
    where
        Self: Sized,
    {
        Descendants::new(self)
    }

    /// Lazy markup fragments for this node.
    fn tags(&self) -> Tags<'_>
    where
        Self: Sized,
    {
        Tags::new(self)
    }

    fn to_xml(&self) -> String
    where
        Self: Sized,
    {
        serialize::to_xml(self)
    }

    fn pretty_print(&self) -> String
    where
        Self: Sized,
    {
        serialize::pretty_print(self)
    }
}

/// Structural comparison of two nodes.
///
/// Nodes order by name first. Nodes with the same name but different
/// attributes, or where one holds text and the other children, are
/// incomparable. Otherwise text compares as strings and children compare
/// pairwise, a shorter prefix ordering first.
pub fn compare(a: &dyn Markup, b: &dyn Markup) -> Option<Ordering> {
    match a.nodename().cmp(b.nodename()) {
        Ordering::Equal => {}
        ordering => return Some(ordering),
    }

    if a.attributes() != b.attributes() {
        return None;
    }

    match (a.text(), b.text()) {
        (Some(a), Some(b)) => Some(a.cmp(b)),
        (None, None) => compare_children(a.children(), b.children()),
        _ => None,
    }
}

fn compare_children(mut a: Children<'_>, mut b: Children<'_>) -> Option<Ordering> {
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => match compare(x, y)? {
                Ordering::Equal => continue,
                ordering => return Some(ordering),
            },
            (Some(_), None) => return Some(Ordering::Greater),
            (None, Some(_)) => return Some(Ordering::Less),
            (None, None) => return Some(Ordering::Equal),
        }
    }
}

/// Implements the comparison and attribute iteration every node kind shares.
macro_rules! impl_node_traits {
    ($($ty:ty),* $(,)?) => {$(
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::node::compare(self, other) == Some(::std::cmp::Ordering::Equal)
            }
        }

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
                $crate::node::compare(self, other)
            }
        }

        impl<'a> IntoIterator for &'a $ty {
            type Item = (&'a str, Option<&'a str>);
            type IntoIter = $crate::attributes::Iter<'a>;

            fn into_iter(self) -> Self::IntoIter {
                $crate::node::Markup::attributes(self).iter()
            }
        }
    )*};
}

pub(crate) use impl_node_traits;

/// A branch node: a tag with attributes and ordered children.
///
/// Unregistered tags are represented by elements without a node type and an
/// open attribute record.
#[derive(Debug, Clone)]
pub struct Element {
    node_type: Option<&'static NodeType>,
    nodename: String,
    attributes: Attributes,
    children: Vec<Node>,
}

impl Element {
    /// A generic element with no attributes.
    pub fn new(nodename: impl Into<String>) -> Self {
        Self::with_attributes(nodename, Attributes::open())
    }

    /// A generic element keeping `attributes` as given.
    pub fn with_attributes(nodename: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            node_type: None,
            nodename: nodename.into(),
            attributes,
            children: Vec::new(),
        }
    }

    pub(crate) fn typed(node_type: &'static NodeType, supplied: Attributes) -> Self {
        Self {
            node_type: Some(node_type),
            nodename: node_type.name().into_owned(),
            attributes: registry::create_attributes(Some(node_type), supplied),
            children: Vec::new(),
        }
    }

    /// Replaces the tag name.
    pub fn rename(&mut self, nodename: impl Into<String>) {
        self.nodename = nodename.into();
    }

    /// Adds a child after the existing ones.
    pub fn append(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Detaches the child at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// The first child named `name`.
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.nodename() == name)
    }

    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children
            .iter()
            .filter(move |child| child.nodename() == name)
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            if last.is_raw_text() {
                last.push_str(text);
                return;
            }
        }
        self.children.push(Node::Text(TextNode::new(text)));
    }
}

impl Markup for Element {
    fn nodename(&self) -> &str {
        &self.nodename
    }

    fn node_type(&self) -> Option<&'static NodeType> {
        self.node_type
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn children(&self) -> Children<'_> {
        Box::new(self.children.iter().map(|child| child as &dyn Markup))
    }
}

/// A leaf node holding literal text.
///
/// Registered leaf types such as `single` render as a tag around their text.
/// Anonymous text nodes hold character data found between tags and render
/// as bare text inside their parent.
#[derive(Debug, Clone)]
pub struct TextNode {
    node_type: Option<&'static NodeType>,
    nodename: Cow<'static, str>,
    attributes: Attributes,
    text: String,
}

impl TextNode {
    /// Anonymous character data.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            node_type: None,
            nodename: Cow::Borrowed(TEXT_NODE_NAME),
            attributes: Attributes::open(),
            text: text.into(),
        }
    }

    pub(crate) fn typed(node_type: &'static NodeType, supplied: Attributes, text: String) -> Self {
        Self {
            node_type: Some(node_type),
            nodename: node_type.name(),
            attributes: registry::create_attributes(Some(node_type), supplied),
            text,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

impl Markup for TextNode {
    fn nodename(&self) -> &str {
        &self.nodename
    }

    fn node_type(&self) -> Option<&'static NodeType> {
        self.node_type
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn children(&self) -> Children<'_> {
        Box::new(std::iter::empty())
    }

    fn text(&self) -> Option<&str> {
        Some(&self.text)
    }

    fn is_raw_text(&self) -> bool {
        self.node_type.is_none()
    }
}

impl fmt::Display for TextNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// An owned node of any kind.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(TextNode),
    Term(Term),
    Terms(TermTable),
}

impl Node {
    fn as_markup(&self) -> &dyn Markup {
        match self {
            Node::Element(element) => element,
            Node::Text(text) => text,
            Node::Term(term) => term,
            Node::Terms(terms) => terms,
        }
    }

    fn as_markup_mut(&mut self) -> &mut dyn Markup {
        match self {
            Node::Element(element) => element,
            Node::Text(text) => text,
            Node::Term(term) => term,
            Node::Terms(terms) => terms,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Node::Term(term) => Some(term),
            _ => None,
        }
    }

    pub fn as_terms(&self) -> Option<&TermTable> {
        match self {
            Node::Terms(terms) => Some(terms),
            _ => None,
        }
    }

    /// Attaches `child` as the last child.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChild`] when this kind of node cannot hold
    /// `child`: term tables hold terms only, terms hold their `single` and
    /// `multiple` forms or text, and text nodes hold nothing.
    pub fn append(&mut self, child: Node) -> Result<()> {
        match self {
            Node::Element(element) => {
                element.append(child);
                Ok(())
            }
            Node::Terms(terms) => match child {
                Node::Term(term) => {
                    terms.push(term);
                    Ok(())
                }
                other => Err(invalid_child("terms", &other)),
            },
            Node::Term(term) => match child {
                Node::Text(text) => term.attach(text),
                other => Err(invalid_child("term", &other)),
            },
            Node::Text(text) => Err(invalid_child(text.nodename(), &child)),
        }
    }

    /// Appends character data.
    ///
    /// Text nodes and flat terms extend their text; elements gain an
    /// anonymous text child.
    ///
    /// # Errors
    ///
    /// Term tables, and terms that already hold forms, reject anything but
    /// whitespace with [`Error::InvalidChild`].
    pub fn push_text(&mut self, text: &str) -> Result<()> {
        match self {
            Node::Element(element) => {
                element.push_text(text);
                Ok(())
            }
            Node::Text(node) => {
                node.push_str(text);
                Ok(())
            }
            Node::Term(term) => term.push_text(text),
            Node::Terms(_) if text.trim().is_empty() => Ok(()),
            Node::Terms(_) => Err(Error::InvalidChild {
                parent: "terms".to_string(),
                child: "text".to_string(),
            }),
        }
    }

    /// Whether text pushed into this node becomes its own text content.
    pub(crate) fn holds_text(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Term(term) => !term.has_forms(),
            _ => false,
        }
    }
}

fn invalid_child(parent: &str, child: &Node) -> Error {
    Error::InvalidChild {
        parent: parent.to_string(),
        child: format!("<{}>", child.nodename()),
    }
}

impl Markup for Node {
    fn nodename(&self) -> &str {
        self.as_markup().nodename()
    }

    fn node_type(&self) -> Option<&'static NodeType> {
        self.as_markup().node_type()
    }

    fn attributes(&self) -> &Attributes {
        self.as_markup().attributes()
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        self.as_markup_mut().attributes_mut()
    }

    fn children(&self) -> Children<'_> {
        self.as_markup().children()
    }

    fn text(&self) -> Option<&str> {
        self.as_markup().text()
    }

    fn is_raw_text(&self) -> bool {
        self.as_markup().is_raw_text()
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

impl From<Term> for Node {
    fn from(term: Term) -> Self {
        Node::Term(term)
    }
}

impl From<TermTable> for Node {
    fn from(terms: TermTable) -> Self {
        Node::Terms(terms)
    }
}

impl FromStr for Node {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parser::parse(s)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

impl_node_traits!(Node, Element, TextNode);

/// Depth-first, pre-order iterator over the nodes below a root.
pub struct Descendants<'a> {
    stack: Vec<Children<'a>>,
}

impl<'a> Descendants<'a> {
    pub fn new(root: &'a dyn Markup) -> Self {
        Self {
            stack: vec![root.children()],
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a dyn Markup;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(node) => {
                    self.stack.push(node.children());
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl fmt::Debug for Descendants<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descendants")
            .field("depth", &self.stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::create;

    fn element(name: &str, pairs: &[(&str, &str)]) -> Element {
        Element::with_attributes(name, Attributes::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_iteration_yields_attributes() {
        let node = element("foo", &[("bar", "x"), ("baz", "y")]);
        let pairs: Vec<_> = (&node).into_iter().collect();

        assert_eq!(pairs, vec![("bar", Some("x")), ("baz", Some("y"))]);
    }

    #[test]
    fn test_predicates() {
        let mut node = element("foo", &[]);
        assert!(!node.has_children());
        assert!(!node.has_attributes());

        node.attributes_mut().set("bar", "x");
        node.append(Element::new("child"));

        assert!(node.has_children());
        assert!(node.has_attributes());
        assert!(node.has_attribute("bar"));
        assert!(!node.has_attribute("baz"));
        assert!(!node.is_textnode());
    }

    #[test]
    fn test_compare_by_name() {
        let a = element("a", &[]);
        let b = element("b", &[("x", "1")]);

        assert!(a < b);
        assert_eq!(compare(&b, &a), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_different_attributes_is_incomparable() {
        let a = element("foo", &[("x", "1")]);
        let b = element("foo", &[("x", "2")]);

        assert_eq!(a.partial_cmp(&b), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_compare_children() {
        let mut a = element("foo", &[]);
        a.append(Element::new("bar"));
        let mut b = a.clone();

        assert_eq!(a, b);

        b.append(Element::new("baz"));
        assert!(a < b);

        let mut c = element("foo", &[]);
        c.append(Element::new("baz"));
        assert!(c > a);
    }

    #[test]
    fn test_compare_text_with_children_is_incomparable() {
        let mut text = Node::Text(TextNode::new("foo"));
        let element = Node::Element(Element::new(TEXT_NODE_NAME));

        assert_eq!(text.partial_cmp(&element), None);

        text.push_text("bar").unwrap();
        assert_eq!(text.text(), Some("foobar"));
    }

    #[test]
    fn test_append_rules() {
        let mut terms = create("terms", Attributes::open());
        let term = create("term", Attributes::from_pairs([("name", "page")]));

        assert!(terms.append(term).is_ok());
        assert_eq!(
            terms.append(Node::Element(Element::new("foo"))),
            Err(Error::InvalidChild {
                parent: "terms".to_string(),
                child: "<foo>".to_string(),
            })
        );

        let mut text = Node::Text(TextNode::new("foo"));
        assert!(text.append(Node::Text(TextNode::new("bar"))).is_err());
    }

    #[test]
    fn test_term_accepts_forms() {
        let mut term = create("term", Attributes::open());
        term.append(create("single", Attributes::open())).unwrap();

        assert!(term.has_children());
        assert!(term.append(create("locale", Attributes::open())).is_err());
    }

    #[test]
    fn test_push_text_merges_adjacent_text() {
        let mut node = Node::Element(Element::new("foo"));
        node.push_text("a").unwrap();
        node.push_text("b").unwrap();

        let children: Vec<_> = node.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].text(), Some("ab"));
        assert!(children[0].is_raw_text());
    }

    #[test]
    fn test_push_text_into_terms() {
        let mut terms = create("terms", Attributes::open());

        assert!(terms.push_text("\n  ").is_ok());
        assert!(terms.push_text("foo").is_err());
    }

    #[test]
    fn test_descendants() {
        let mut inner = Element::new("b");
        inner.append(Element::new("c"));
        let mut root = Element::new("a");
        root.append(inner).append(TextNode::new("d"));

        let names: Vec<_> = root.descendants().map(|n| n.nodename()).collect();
        assert_eq!(names, vec!["b", "c", TEXT_NODE_NAME]);
    }

    #[test]
    fn test_find_and_remove_children() {
        let mut root = Element::new("a");
        root.append(Element::new("b"))
            .append(Element::new("c"))
            .append(Element::new("b"));

        assert_eq!(root.find_children("b").count(), 2);
        assert!(root.find_child("c").is_some());
        assert!(root.remove(5).is_none());

        let removed = root.remove(1).unwrap();
        assert_eq!(removed.nodename(), "c");
        assert!(root.find_child("c").is_none());
    }

    #[test]
    fn test_rename() {
        let mut node = Element::new("foo");
        node.rename("bar");

        assert_eq!(node.nodename(), "bar");
    }
}
