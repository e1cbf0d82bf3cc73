//! CSL node tree and locale term resolution for Quarto.
//!
//! This crate provides the document model that CSL styles and locales are
//! read into, and the term lookup a citation renderer needs to produce
//! localized text.
//!
//! # Overview
//!
//! The main types are:
//! - [`Node`]: An owned node of any kind
//! - [`Element`]: A generic branch node; unknown tags keep their name and attributes
//! - [`TextNode`]: A leaf holding literal text
//! - [`Term`]: A localized vocabulary entry with form, gender and number forms
//! - [`TermTable`]: The `<terms>` element, with [`TermTable::lookup`] and
//!   [`TermTable::ordinalize`]
//! - [`Registry`]: The tag name to node type mapping used when building trees
//!
//! # Example
//!
//! ```rust
//! use quarto_csl_tree::{LookupOptions, TermForm, TermTable};
//!
//! let terms = TermTable::parse(
//!     r#"<terms>
//!   <term name="page"><single>page</single><multiple>pages</multiple></term>
//!   <term name="page" form="short"><single>p.</single><multiple>pp.</multiple></term>
//!   <term name="ordinal">th</term>
//!   <term name="ordinal-01">st</term>
//! </terms>"#,
//! )
//! .unwrap();
//!
//! let options = LookupOptions::default().with_form(TermForm::Short).with_number(2);
//! assert_eq!(terms.render("page", &options), Some("pp."));
//! assert_eq!(terms.ordinalize(21).unwrap().to_string(), "st");
//! ```
//!
//! # Serialization
//!
//! Trees serialize back to markup, and reading that markup yields an equal
//! tree:
//!
//! ```rust
//! use quarto_csl_tree::{Markup, Node};
//!
//! let xml = r#"<term name="edition" gender="feminine">édition</term>"#;
//! let node: Node = xml.parse().unwrap();
//! assert_eq!(node.to_xml(), xml);
//! assert_eq!(node.to_xml().parse::<Node>().unwrap(), node);
//! ```

pub mod attributes;
pub mod error;
pub mod node;
pub mod parser;
pub mod registry;
pub mod serialize;
pub mod term;
pub mod terms;

// Re-export main types
pub use attributes::{AttributeSpec, Attributes, Schema, Selector};
pub use error::{Error, Result};
pub use node::{Descendants, Element, Markup, Node, TextNode, compare};
pub use parser::{parse, parse_with_registry};
pub use registry::{Category, NodeType, Registry, Variant, canonical_name, create, create_attributes};
pub use serialize::{Tag, Tags};
pub use term::{
    Gender, GrammaticalNumber, NameMatcher, Number, OrdinalClass, OrdinalMatch, Term, TermForm,
    TermQuery, TermRenderOptions,
};
pub use terms::{LookupOptions, TermTable};
