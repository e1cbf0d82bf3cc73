//! Error types for the CSL node tree.

use thiserror::Error;

/// Result type alias for quarto-csl-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reading a node tree.
///
/// Lookups, attribute reads and comparisons never fail; they degrade to
/// `None`. Only the operations below report errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An attribute merge was given something that is not a key/value map.
    #[error("failed to merge {found} into attributes")]
    MergeType {
        /// The JSON type of the offending argument.
        found: &'static str,
    },

    /// A node does not accept the given child.
    #[error("<{parent}> cannot contain {child}")]
    InvalidChild { parent: String, child: String },

    /// An enumerated attribute value is not recognized.
    #[error("Invalid value '{value}' for attribute '{attribute}': expected {expected}")]
    InvalidAttributeValue {
        attribute: &'static str,
        value: String,
        expected: &'static str,
    },

    /// XML syntax error from quick-xml.
    #[error("XML syntax error: {message}")]
    Xml {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// A closing tag with no open element.
    #[error("Unexpected closing tag </{found}>")]
    UnexpectedEndTag { found: String },

    /// Mismatched end tag.
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// The document has no root element.
    #[error("Empty XML document: no root element found")]
    EmptyDocument,

    /// The document has more than one root element.
    #[error("Invalid XML: multiple root elements")]
    MultipleRoots,

    /// The root element is not the one the caller asked for.
    #[error("Expected <{expected}> root element, found <{found}>")]
    InvalidRootElement {
        expected: &'static str,
        found: String,
    },
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml {
            message: format!("Attribute error: {}", err),
            position: None,
        }
    }
}
