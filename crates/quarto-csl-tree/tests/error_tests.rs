//! Tests for quarto-csl-tree error types.
//!
//! These tests verify that every error variant has a readable Display
//! implementation and that the public entry points report the right variant.

use quarto_csl_tree::{Attributes, Error, Markup, Term, TermForm, TermTable, parse};
use serde_json::json;

// ============================================================================
// Display implementation tests
// ============================================================================

#[test]
fn test_merge_type_display() {
    let err = Error::MergeType { found: "array" };
    assert_eq!(err.to_string(), "failed to merge array into attributes");
}

#[test]
fn test_invalid_child_display() {
    let err = Error::InvalidChild {
        parent: "terms".to_string(),
        child: "<date>".to_string(),
    };
    assert_eq!(err.to_string(), "<terms> cannot contain <date>");
}

#[test]
fn test_invalid_attribute_value_display() {
    let err = Error::InvalidAttributeValue {
        attribute: "form",
        value: "medium".to_string(),
        expected: "long, short, verb, verb-short or symbol",
    };
    let display = err.to_string();
    assert!(
        display.contains("Invalid value 'medium' for attribute 'form'"),
        "Got: {}",
        display
    );
}

#[test]
fn test_xml_display() {
    let err = Error::Xml {
        message: "unexpected token".to_string(),
        position: Some(4),
    };
    assert_eq!(err.to_string(), "XML syntax error: unexpected token");
}

#[test]
fn test_structure_display() {
    let eof = Error::UnexpectedEof {
        expected: "closing tag </terms>".to_string(),
    };
    assert!(eof.to_string().contains("closing tag </terms>"));

    let end = Error::UnexpectedEndTag {
        found: "terms".to_string(),
    };
    assert_eq!(end.to_string(), "Unexpected closing tag </terms>");

    let mismatched = Error::MismatchedEndTag {
        expected: "term".to_string(),
        found: "terms".to_string(),
    };
    assert_eq!(
        mismatched.to_string(),
        "Mismatched end tag: expected </term>, found </terms>"
    );

    assert!(Error::EmptyDocument.to_string().contains("no root element"));
    assert!(Error::MultipleRoots.to_string().contains("multiple root elements"));

    let root = Error::InvalidRootElement {
        expected: "terms",
        found: "locale".to_string(),
    };
    assert_eq!(root.to_string(), "Expected <terms> root element, found <locale>");
}

// ============================================================================
// Reported errors
// ============================================================================

#[test]
fn test_merge_rejects_non_objects() {
    let mut attributes = Attributes::open();

    assert_eq!(
        attributes.merge_value(&json!(42)).unwrap_err(),
        Error::MergeType { found: "number" }
    );
    assert!(attributes.merge_value(&json!({ "a": "b" })).is_ok());
    assert_eq!(attributes.get("a"), Some("b"));
}

#[test]
fn test_invalid_form_value() {
    let err = "medium".parse::<TermForm>().unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidAttributeValue {
            attribute: "form",
            ..
        }
    ));
}

#[test]
fn test_wrong_root_element() {
    assert_eq!(
        TermTable::parse(r#"<term name="page"/>"#).unwrap_err(),
        Error::InvalidRootElement {
            expected: "terms",
            found: "term".to_string(),
        }
    );
    assert_eq!(
        Term::parse("<terms/>").unwrap_err(),
        Error::InvalidRootElement {
            expected: "term",
            found: "terms".to_string(),
        }
    );
}

#[test]
fn test_malformed_markup() {
    assert!(matches!(parse("<terms"), Err(Error::Xml { .. } | Error::UnexpectedEof { .. })));
    assert!(matches!(
        parse(r#"<term name="a>x</term>"#),
        Err(Error::Xml { .. } | Error::UnexpectedEof { .. })
    ));
    assert_eq!(parse("   "), Err(Error::EmptyDocument));
}

#[test]
fn test_text_beside_forms_is_rejected() {
    let err = parse("<term><single>a</single>b</term>").unwrap_err();

    assert_eq!(
        err,
        Error::InvalidChild {
            parent: "term".to_string(),
            child: "text".to_string(),
        }
    );
}

#[test]
fn test_text_before_forms_is_rejected() {
    let err = parse(r#"<term name="x">foo<single>a</single></term>"#).unwrap_err();

    assert_eq!(
        err,
        Error::InvalidChild {
            parent: "term".to_string(),
            child: "<single>".to_string(),
        }
    );

    // Indentation before a form is not content
    let term = Term::parse("<term>\n  <multiple>b</multiple>\n</term>").unwrap();
    assert_eq!(term.multiple(), Some("b"));
    assert_eq!(term.text(), None);
}
