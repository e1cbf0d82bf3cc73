//! Registry of known node types and the node factory.
//!
//! Every concrete node kind is described by a static [`NodeType`]. The
//! global registry is built once, on first use, from the locale vocabulary
//! below and is read-only afterwards. Tags without a registered type become
//! generic [`Element`]s that keep their original name and attributes, so
//! vocabularies newer than this crate still round-trip.

use crate::attributes::{AttributeSpec, Attributes, Schema};
use crate::node::{Element, Node, TextNode};
use crate::term::{TERM_SCHEMA, Term};
use crate::terms::TermTable;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;

/// A grouping of node types, e.g. everything that may appear in a locale.
///
/// Every registered type belongs to [`Category::Node`]; types also belong to
/// the categories they declare in [`NodeType::nesting`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Node,
    Locale,
    Term,
}

/// How instances of a node type are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Element with child nodes.
    Branch,
    /// Element holding text only.
    Leaf,
    /// A locale term.
    Term,
    /// A table of locale terms.
    TermTable,
}

/// Static description of a node kind.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeType {
    /// Identifier the tag name is derived from when `tag` is not given.
    pub ident: &'static str,
    /// Explicit tag name.
    pub tag: Option<&'static str>,
    pub schema: Schema,
    pub variant: Variant,
    /// Categories enclosing this type, besides [`Category::Node`].
    pub nesting: &'static [Category],
}

impl NodeType {
    /// The tag name instances of this type use.
    pub fn name(&self) -> Cow<'static, str> {
        match self.tag {
            Some(tag) => Cow::Borrowed(tag),
            None => Cow::Owned(canonical_name(self.ident)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.variant == Variant::Leaf
    }
}

pub static LOCALE: NodeType = NodeType {
    ident: "Locale",
    tag: Some("locale"),
    schema: &[
        AttributeSpec::new("xmlns"),
        AttributeSpec::new("version"),
        AttributeSpec::new("xml:lang"),
    ],
    variant: Variant::Branch,
    nesting: &[],
};

pub static STYLE_OPTIONS: NodeType = NodeType {
    ident: "StyleOptions",
    tag: None,
    schema: &[
        AttributeSpec::new("limit-day-ordinals-to-day-1"),
        AttributeSpec::new("punctuation-in-quote"),
    ],
    variant: Variant::Branch,
    nesting: &[Category::Locale],
};

pub static TERMS: NodeType = NodeType {
    ident: "Terms",
    tag: Some("terms"),
    schema: &[],
    variant: Variant::TermTable,
    nesting: &[Category::Locale],
};

pub static TERM: NodeType = NodeType {
    ident: "Term",
    tag: Some("term"),
    schema: TERM_SCHEMA,
    variant: Variant::Term,
    nesting: &[Category::Locale],
};

pub static SINGLE: NodeType = NodeType {
    ident: "Single",
    tag: None,
    schema: &[],
    variant: Variant::Leaf,
    nesting: &[Category::Locale, Category::Term],
};

pub static MULTIPLE: NodeType = NodeType {
    ident: "Multiple",
    tag: None,
    schema: &[],
    variant: Variant::Leaf,
    nesting: &[Category::Locale, Category::Term],
};

static BUILTIN_TYPES: [&NodeType; 6] = [&LOCALE, &STYLE_OPTIONS, &TERMS, &TERM, &SINGLE, &MULTIPLE];

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::with_builtin_types);

static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").expect("valid word boundary pattern"));

/// Derives a tag name from a type identifier.
///
/// A hyphen goes between each lowercase letter and a following uppercase
/// letter, then the result is lowercased: `OrdinalTerm` becomes
/// `ordinal-term`.
pub fn canonical_name(ident: &str) -> String {
    WORD_BOUNDARY.replace_all(ident, "$1-$2").to_lowercase()
}

/// Maps tag names to node types.
#[derive(Debug, Default)]
pub struct Registry {
    types: Vec<&'static NodeType>,
    by_name: HashMap<String, &'static NodeType>,
    categories: HashMap<Category, Vec<&'static NodeType>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the locale vocabulary.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for node_type in BUILTIN_TYPES {
            registry.register(node_type);
        }
        registry
    }

    /// The process-wide registry.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Adds a type, making it discoverable under [`Category::Node`] and under
    /// each category it is nested in.
    ///
    /// When two types share a tag name, the first registered wins.
    pub fn register(&mut self, node_type: &'static NodeType) -> &mut Self {
        if self.types.iter().any(|t| std::ptr::eq(*t, node_type)) {
            return self;
        }

        self.types.push(node_type);
        self.by_name
            .entry(node_type.name().into_owned())
            .or_insert(node_type);

        for category in std::iter::once(&Category::Node).chain(node_type.nesting) {
            self.categories.entry(*category).or_default().push(node_type);
        }

        self
    }

    /// The type whose tag name is `name`.
    pub fn lookup_type(&self, name: &str) -> Option<&'static NodeType> {
        self.by_name.get(name).copied()
    }

    /// The type whose tag name is `name`, searching `category` only.
    pub fn lookup_in(&self, category: Category, name: &str) -> Option<&'static NodeType> {
        self.types(category)
            .iter()
            .find(|t| t.name() == name)
            .copied()
    }

    /// All types registered under `category`, in registration order.
    pub fn types(&self, category: Category) -> &[&'static NodeType] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Builds a node for the tag `name`.
    ///
    /// Never fails: unregistered names produce a generic [`Element`] with an
    /// open attribute record.
    pub fn create(&self, name: &str, attributes: Attributes) -> Node {
        instantiate(self.lookup_type(name), name, attributes)
    }

    /// Like [`Registry::create`], resolving `name` within `category` only.
    pub fn create_in(&self, category: Category, name: &str, attributes: Attributes) -> Node {
        instantiate(self.lookup_in(category, name), name, attributes)
    }
}

/// Builds a node for the tag `name` using the global registry.
pub fn create(name: &str, attributes: Attributes) -> Node {
    Registry::global().create(name, attributes)
}

/// Looks up `name` in the global registry.
pub fn lookup_type(name: &str) -> Option<&'static NodeType> {
    Registry::global().lookup_type(name)
}

/// Builds the attribute record for an instance of `node_type`.
///
/// With a type, the schema defaults are merged with the supplied values and
/// keys outside the schema are dropped. Without one, `supplied` is returned
/// as is.
pub fn create_attributes(node_type: Option<&NodeType>, supplied: Attributes) -> Attributes {
    match node_type {
        Some(node_type) => {
            let mut attributes = Attributes::defaults(node_type.schema);
            attributes.merge(&supplied);
            attributes
        }
        None => supplied,
    }
}

fn instantiate(node_type: Option<&'static NodeType>, name: &str, supplied: Attributes) -> Node {
    let Some(node_type) = node_type else {
        tracing::debug!(tag = name, "unregistered tag, using generic element");
        return Node::Element(Element::with_attributes(name, supplied));
    };

    match node_type.variant {
        Variant::Branch => Node::Element(Element::typed(node_type, supplied)),
        Variant::Leaf => Node::Text(TextNode::typed(node_type, supplied, String::new())),
        Variant::Term => Node::Term(Term::new(supplied)),
        Variant::TermTable => Node::Terms(TermTable::new()),
    }
}
