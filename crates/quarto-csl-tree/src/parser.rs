//! Builds node trees from CSL markup.
//!
//! Every start or empty tag goes through the registry factory, so unknown
//! tags become generic elements and registered ones get their concrete type.
//! Whitespace-only text between elements is dropped; text inside
//! text-bearing nodes is kept verbatim.

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::node::{Markup, Node};
use crate::registry::Registry;
use quick_xml::Reader;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

/// Parses `content` using the global registry.
///
/// # Example
///
/// ```rust
/// use quarto_csl_tree::{Markup, parse};
///
/// let node = parse(r#"<term name="page">page</term>"#).unwrap();
/// assert_eq!(node.nodename(), "term");
/// assert_eq!(node.text(), Some("page"));
/// ```
///
/// # Errors
///
/// Returns an error if the markup is malformed, has no root or several
/// roots, or places a node where its parent cannot hold it.
pub fn parse(content: &str) -> Result<Node> {
    parse_with_registry(content, Registry::global())
}

/// Parses `content`, resolving tags through `registry`.
pub fn parse_with_registry(content: &str, registry: &Registry) -> Result<Node> {
    TreeBuilder::new(content, registry).parse()
}

struct TreeBuilder<'a> {
    reader: Reader<&'a [u8]>,
    registry: &'a Registry,
    /// Open elements, innermost last.
    stack: Vec<BuildNode>,
}

/// An open element and the text read since its last child.
struct BuildNode {
    node: Node,
    text: String,
}

impl BuildNode {
    /// Hands pending text to the node before a child element is attached.
    fn flush_text(&mut self) -> Result<()> {
        let text = std::mem::take(&mut self.text);

        // Whitespace between elements is insignificant
        if text.trim().is_empty() {
            return Ok(());
        }
        self.node.push_text(&text)
    }

    fn finish(mut self) -> Result<Node> {
        if self.node.holds_text() {
            // Even empty text marks the node as text-bearing
            self.node.push_text(&self.text)?;
        } else {
            self.flush_text()?;
        }
        Ok(self.node)
    }
}

impl<'a> TreeBuilder<'a> {
    fn new(content: &'a str, registry: &'a Registry) -> Self {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            registry,
            stack: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Node> {
        let mut root: Option<Node> = None;

        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let node = self.create(&e)?;
                    if let Some(parent) = self.stack.last_mut() {
                        parent.flush_text()?;
                    }
                    self.stack.push(BuildNode {
                        node,
                        text: String::new(),
                    });
                }
                Ok(Event::End(e)) => {
                    let node = self.handle_end(e)?;
                    self.attach(node, &mut root)?;
                }
                Ok(Event::Empty(e)) => {
                    let node = self.create(&e)?;
                    self.attach(node, &mut root)?;
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(e)?;
                }
                Ok(Event::CData(e)) => {
                    self.handle_cdata(e);
                }
                Ok(Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", open.node.nodename()),
            });
        }

        root.ok_or(Error::EmptyDocument)
    }

    fn create(&self, e: &BytesStart<'_>) -> Result<Node> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attributes = Attributes::open();

        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|err| Error::Xml {
                message: format!("Invalid attribute value: {}", err),
                position: Some(self.reader.buffer_position()),
            })?;
            attributes.set(&key, value.into_owned());
        }

        Ok(self.registry.create(&name, attributes))
    }

    fn handle_end(&mut self, e: BytesEnd<'_>) -> Result<Node> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        let open = self.stack.pop().ok_or_else(|| Error::UnexpectedEndTag {
            found: end_name.clone(),
        })?;

        if open.node.nodename() != end_name {
            return Err(Error::MismatchedEndTag {
                expected: open.node.nodename().to_string(),
                found: end_name,
            });
        }

        open.finish()
    }

    fn handle_text(&mut self, e: BytesText<'_>) -> Result<()> {
        let text = e.unescape().map_err(|err| Error::Xml {
            message: format!("Invalid text content: {}", err),
            position: Some(self.reader.buffer_position()),
        })?;

        if let Some(open) = self.stack.last_mut() {
            open.text.push_str(&text);
        }
        Ok(())
    }

    fn handle_cdata(&mut self, e: BytesCData<'_>) {
        if let Some(open) = self.stack.last_mut() {
            open.text.push_str(&String::from_utf8_lossy(e.as_ref()));
        }
    }

    fn attach(&mut self, node: Node, root: &mut Option<Node>) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.flush_text()?;
                parent.node.append(node)
            }
            None if root.is_some() => Err(Error::MultipleRoots),
            None => {
                *root = Some(node);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unknown_tags() {
        let node = parse(r#"<style class="in-text"><info><title>APA</title></info></style>"#)
            .unwrap();

        assert_eq!(node.nodename(), "style");
        assert_eq!(node.attributes().get("class"), Some("in-text"));

        let info = node.as_element().unwrap().find_child("info").unwrap();
        let title = info.as_element().unwrap().find_child("title").unwrap();
        let text: Vec<_> = title.children().filter_map(|c| c.text()).collect();
        assert_eq!(text, vec!["APA"]);
    }

    #[test]
    fn test_whitespace_between_elements_is_dropped() {
        let node = parse("<terms>\n  <term name=\"a\"/>\n  <term name=\"b\"/>\n</terms>").unwrap();

        assert_eq!(node.as_terms().unwrap().len(), 2);
    }

    #[test]
    fn test_term_text_is_verbatim() {
        let node = parse("<term name=\"and\"> and </term>").unwrap();

        assert_eq!(node.text(), Some(" and "));
    }

    #[test]
    fn test_empty_term_element_is_text_bearing() {
        let open_close = parse(r#"<term name="x"></term>"#).unwrap();
        let self_closing = parse(r#"<term name="x"/>"#).unwrap();

        assert_eq!(open_close.text(), Some(""));
        assert_eq!(self_closing.text(), None);
    }

    #[test]
    fn test_term_forms() {
        let node = parse(
            "<term name=\"page\">\n  <single>page</single>\n  <multiple>pages</multiple>\n</term>",
        )
        .unwrap();
        let term = node.as_term().unwrap();

        assert!(!term.is_textnode());
        assert_eq!(term.single(), Some("page"));
        assert_eq!(term.multiple(), Some("pages"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let node = parse("<term name=\"x\">a &amp; <![CDATA[<b>]]></term>").unwrap();

        assert_eq!(node.text(), Some("a & <b>"));
    }

    #[test]
    fn test_comments_and_declarations_are_skipped() {
        let node = parse("<?xml version=\"1.0\"?>\n<!-- c --><terms><!-- c --></terms>").unwrap();

        assert!(matches!(node, Node::Terms(_)));
    }

    #[test]
    fn test_mixed_content_keeps_text() {
        let node = parse("<p>a <b>bold</b> c</p>").unwrap();
        let texts: Vec<_> = node
            .children()
            .filter(|c| c.is_raw_text())
            .filter_map(|c| c.text())
            .collect();

        assert_eq!(texts, vec!["a ", " c"]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(Error::EmptyDocument));
        assert_eq!(parse("<a/><b/>"), Err(Error::MultipleRoots));
        assert!(matches!(
            parse("<a>"),
            Err(Error::UnexpectedEof { .. } | Error::Xml { .. })
        ));
        assert!(matches!(parse("<a></b>"), Err(Error::Xml { .. } | Error::MismatchedEndTag { .. })));
        assert!(matches!(
            parse("<terms><foo/></terms>"),
            Err(Error::InvalidChild { .. })
        ));
        assert!(matches!(
            parse("<terms>text</terms>"),
            Err(Error::InvalidChild { .. })
        ));
    }
}
