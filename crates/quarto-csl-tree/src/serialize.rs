//! Markup serialization.
//!
//! Trees serialize to XML as a lazy stream of [`Tag`] fragments. Attribute
//! values that equal their schema default are left out, since reading the
//! markup back restores them.

use crate::node::{Children, Markup};
use quick_xml::escape::escape;
use std::collections::VecDeque;
use std::fmt;

/// One markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<'a> {
    Start {
        name: &'a str,
        attributes: Vec<(&'a str, &'a str)>,
    },
    Empty {
        name: &'a str,
        attributes: Vec<(&'a str, &'a str)>,
    },
    End {
        name: &'a str,
    },
    Text(&'a str),
}

impl fmt::Display for Tag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Start { name, attributes } => {
                write!(f, "<{name}")?;
                write_attributes(f, attributes)?;
                f.write_str(">")
            }
            Tag::Empty { name, attributes } => {
                write!(f, "<{name}")?;
                write_attributes(f, attributes)?;
                f.write_str("/>")
            }
            Tag::End { name } => write!(f, "</{name}>"),
            Tag::Text(text) => f.write_str(&escape(*text)),
        }
    }
}

fn write_attributes(f: &mut fmt::Formatter<'_>, attributes: &[(&str, &str)]) -> fmt::Result {
    for (key, value) in attributes {
        write!(f, " {}=\"{}\"", key, escape(*value))?;
    }
    Ok(())
}

/// The attribute assignments written for `node`, in key order.
pub fn assignments(node: &dyn Markup) -> Vec<(&str, &str)> {
    let attributes = node.attributes();
    attributes
        .assigned()
        .filter(|(key, _)| !attributes.is_default(key))
        .collect()
}

/// Iterator over the markup fragments of a tree.
pub struct Tags<'a> {
    pending: VecDeque<Tag<'a>>,
    open: Vec<(&'a str, Children<'a>)>,
}

impl<'a> Tags<'a> {
    pub fn new(root: &'a dyn Markup) -> Self {
        let mut tags = Self {
            pending: VecDeque::new(),
            open: Vec::new(),
        };
        tags.enter(root);
        tags
    }

    fn enter(&mut self, node: &'a dyn Markup) {
        let name = node.nodename();

        if let Some(text) = node.text() {
            self.pending.push_back(Tag::Start {
                name,
                attributes: assignments(node),
            });
            self.pending.push_back(Tag::Text(text));
            self.pending.push_back(Tag::End { name });
        } else if node.has_children() {
            self.pending.push_back(Tag::Start {
                name,
                attributes: assignments(node),
            });
            self.open.push((name, node.children()));
        } else {
            self.pending.push_back(Tag::Empty {
                name,
                attributes: assignments(node),
            });
        }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tag) = self.pending.pop_front() {
                return Some(tag);
            }

            let (name, children) = self.open.last_mut()?;
            match children.next() {
                Some(child) if child.is_raw_text() => {
                    return Some(Tag::Text(child.text().unwrap_or_default()));
                }
                Some(child) => self.enter(child),
                None => {
                    let name = *name;
                    self.open.pop();
                    return Some(Tag::End { name });
                }
            }
        }
    }
}

impl fmt::Debug for Tags<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tags")
            .field("pending", &self.pending)
            .field("depth", &self.open.len())
            .finish()
    }
}

/// Compact XML for `node`.
pub fn to_xml(node: &dyn Markup) -> String {
    Tags::new(node).map(|tag| tag.to_string()).collect()
}

/// Indented XML for `node`, two spaces per level.
///
/// Nodes holding text, directly or as mixed content, stay on one line so that
/// no whitespace is added to their text.
pub fn pretty_print(node: &dyn Markup) -> String {
    let mut out = String::new();
    write_pretty(node, 0, &mut out);
    out.truncate(out.trim_end_matches('\n').len());
    out
}

fn write_pretty(node: &dyn Markup, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let inline = !node.has_children()
        || node.is_textnode()
        || node.children().any(|child| child.is_raw_text());

    out.push_str(&indent);

    if inline {
        out.push_str(&to_xml(node));
        out.push('\n');
        return;
    }

    let name = node.nodename();
    let start = Tag::Start {
        name,
        attributes: assignments(node),
    };
    out.push_str(&start.to_string());
    out.push('\n');

    for child in node.children() {
        write_pretty(child, depth + 1, out);
    }

    out.push_str(&indent);
    out.push_str(&Tag::End { name }.to_string());
    out.push('\n');
}
