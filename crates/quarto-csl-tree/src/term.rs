//! Locale terms.
//!
//! A term is one localized vocabulary entry, e.g. the English "page" or
//! "ordinal-01". Its content is either a flat string or a `single`/`multiple`
//! pair for number agreement.

use crate::attributes::{AttributeSpec, Attributes, Schema};
use crate::error::{Error, Result};
use crate::node::{Children, Markup, Node, TextNode};
use crate::registry::{self, MULTIPLE, NodeType, SINGLE, TERM};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Attributes of `<term>`.
pub const TERM_SCHEMA: Schema = &[
    AttributeSpec::new("name"),
    AttributeSpec::with_default("form", "long"),
    AttributeSpec::new("gender"),
    AttributeSpec::new("gender-form"),
    AttributeSpec::new("match"),
];

static ORDINAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(long-)?ordinal(?:-(\d{2}))?$").expect("valid ordinal pattern"));

/// Term form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermForm {
    #[default]
    Long,
    Short,
    Verb,
    VerbShort,
    Symbol,
}

impl TermForm {
    pub fn as_str(self) -> &'static str {
        match self {
            TermForm::Long => "long",
            TermForm::Short => "short",
            TermForm::Verb => "verb",
            TermForm::VerbShort => "verb-short",
            TermForm::Symbol => "symbol",
        }
    }

    /// Forms to try, in order, when this form is requested.
    pub fn fallbacks(self) -> &'static [TermForm] {
        match self {
            TermForm::Long => &[TermForm::Long],
            TermForm::Short => &[TermForm::Short, TermForm::Long],
            TermForm::Verb => &[TermForm::Verb, TermForm::Long],
            TermForm::VerbShort => &[TermForm::VerbShort, TermForm::Verb, TermForm::Long],
            TermForm::Symbol => &[TermForm::Symbol, TermForm::Short, TermForm::Long],
        }
    }
}

impl FromStr for TermForm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "long" => Ok(TermForm::Long),
            "short" => Ok(TermForm::Short),
            "verb" => Ok(TermForm::Verb),
            "verb-short" => Ok(TermForm::VerbShort),
            "symbol" => Ok(TermForm::Symbol),
            _ => Err(Error::InvalidAttributeValue {
                attribute: "form",
                value: s.to_string(),
                expected: "long, short, verb, verb-short or symbol",
            }),
        }
    }
}

impl fmt::Display for TermForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    #[default]
    #[serde(alias = "none")]
    Neutral,
    Masculine,
    Feminine,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Neutral => "neutral",
            Gender::Masculine => "masculine",
            Gender::Feminine => "feminine",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neutral" | "none" => Ok(Gender::Neutral),
            "masculine" => Ok(Gender::Masculine),
            "feminine" => Ok(Gender::Feminine),
            _ => Err(Error::InvalidAttributeValue {
                attribute: "gender",
                value: s.to_string(),
                expected: "masculine or feminine",
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which digits of a number an `ordinal-NN` term applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrdinalMatch {
    LastDigit,
    LastTwoDigits,
    WholeNumber,
}

impl FromStr for OrdinalMatch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last-digit" => Ok(OrdinalMatch::LastDigit),
            "last-two-digits" => Ok(OrdinalMatch::LastTwoDigits),
            "whole-number" => Ok(OrdinalMatch::WholeNumber),
            _ => Err(Error::InvalidAttributeValue {
                attribute: "match",
                value: s.to_string(),
                expected: "last-digit, last-two-digits or whole-number",
            }),
        }
    }
}

/// Ordinal class derived from a term name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalClass {
    /// `ordinal`
    Generic,
    /// `ordinal-NN`
    Short(u8),
    /// `long-ordinal-NN`
    Long(u8),
}

impl OrdinalClass {
    pub fn from_name(name: &str) -> Option<Self> {
        let captures = ORDINAL_NAME.captures(name)?;
        let number = captures
            .get(2)
            .and_then(|digits| digits.as_str().parse::<u8>().ok());

        match (captures.get(1).is_some(), number) {
            (false, None) => Some(OrdinalClass::Generic),
            (false, Some(number)) => Some(OrdinalClass::Short(number)),
            (true, Some(number)) => Some(OrdinalClass::Long(number)),
            (true, None) => None,
        }
    }
}

/// Singular or plural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammaticalNumber {
    Singular,
    Plural,
}

/// Number agreement requested when rendering a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// A count; anything but 1 is plural.
    Count(i64),
    Grammatical(GrammaticalNumber),
}

impl Number {
    pub fn is_plural(self) -> bool {
        match self {
            Number::Count(count) => count != 1,
            Number::Grammatical(number) => number == GrammaticalNumber::Plural,
        }
    }
}

impl From<i64> for Number {
    fn from(count: i64) -> Self {
        Number::Count(count)
    }
}

impl From<i32> for Number {
    fn from(count: i32) -> Self {
        Number::Count(count.into())
    }
}

impl From<GrammaticalNumber> for Number {
    fn from(number: GrammaticalNumber) -> Self {
        Number::Grammatical(number)
    }
}

/// Options for [`Term::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TermRenderOptions {
    pub number: Option<Number>,
    pub plural: bool,
}

impl TermRenderOptions {
    pub fn plural() -> Self {
        Self {
            plural: true,
            ..Self::default()
        }
    }

    pub fn with_number(number: impl Into<Number>) -> Self {
        Self {
            number: Some(number.into()),
            ..Self::default()
        }
    }

    pub fn is_plural(&self) -> bool {
        self.plural || self.number.is_some_and(Number::is_plural)
    }
}

/// Matches a term name exactly or by pattern.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Exact(String),
    Pattern(Regex),
}

impl NameMatcher {
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(exact) => exact == name,
            NameMatcher::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

impl From<&str> for NameMatcher {
    fn from(name: &str) -> Self {
        NameMatcher::Exact(name.to_string())
    }
}

impl From<String> for NameMatcher {
    fn from(name: String) -> Self {
        NameMatcher::Exact(name)
    }
}

impl From<Regex> for NameMatcher {
    fn from(pattern: Regex) -> Self {
        NameMatcher::Pattern(pattern)
    }
}

/// Criteria for [`Term::matches`]. Unset criteria match anything.
#[derive(Debug, Clone, Default)]
pub struct TermQuery {
    pub name: Option<NameMatcher>,
    pub form: Option<TermForm>,
    pub gender: Option<Gender>,
}

impl TermQuery {
    pub fn named(name: impl Into<NameMatcher>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_form(mut self, form: TermForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

/// A localized vocabulary entry.
///
/// Content is flat text, a `single`/`multiple` pair, or nothing. Setting one
/// kind of content clears the other.
#[derive(Debug, Clone)]
pub struct Term {
    attributes: Attributes,
    text: Option<String>,
    single: Option<TextNode>,
    multiple: Option<TextNode>,
}

impl Default for Term {
    fn default() -> Self {
        Self::new(Attributes::open())
    }
}

impl Term {
    /// A term with `supplied` merged over the term defaults.
    pub fn new(supplied: Attributes) -> Self {
        Self {
            attributes: registry::create_attributes(Some(&TERM), supplied),
            text: None,
            single: None,
            multiple: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Attributes::from_pairs([("name", name)]))
    }

    /// Parses a standalone `<term>` element.
    pub fn parse(content: &str) -> Result<Self> {
        match crate::parser::parse(content)? {
            Node::Term(term) => Ok(term),
            other => Err(Error::InvalidRootElement {
                expected: "term",
                found: other.nodename().to_string(),
            }),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_forms(mut self, single: impl Into<String>, multiple: impl Into<String>) -> Self {
        self.set_single(single);
        self.set_multiple(multiple);
        self
    }

    pub fn with_form(mut self, form: TermForm) -> Self {
        self.set_form(form);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.set_gender(gender);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name")
    }

    /// The declared form; `None` if the attribute holds an unknown value.
    pub fn form(&self) -> Option<TermForm> {
        match self.attributes.get("form") {
            Some(form) => form.parse().ok(),
            None => Some(TermForm::Long),
        }
    }

    pub fn set_form(&mut self, form: TermForm) {
        self.attributes.set("form", form.as_str());
    }

    pub fn is_long(&self) -> bool {
        self.form() == Some(TermForm::Long)
    }

    pub fn is_short(&self) -> bool {
        self.form() == Some(TermForm::Short)
    }

    pub fn is_verb(&self) -> bool {
        self.form() == Some(TermForm::Verb)
    }

    pub fn is_verb_short(&self) -> bool {
        self.form() == Some(TermForm::VerbShort)
    }

    pub fn is_symbol(&self) -> bool {
        self.form() == Some(TermForm::Symbol)
    }

    /// Declared gender; unset means neutral.
    pub fn gender(&self) -> Gender {
        self.attributes
            .get("gender")
            .and_then(|gender| gender.parse().ok())
            .unwrap_or_default()
    }

    pub fn set_gender(&mut self, gender: Gender) {
        match gender {
            Gender::Neutral => {
                self.attributes.clear("gender");
            }
            gender => {
                self.attributes.set("gender", gender.as_str());
            }
        }
    }

    pub fn set_masculine(&mut self) {
        self.set_gender(Gender::Masculine);
    }

    pub fn set_feminine(&mut self) {
        self.set_gender(Gender::Feminine);
    }

    pub fn is_gendered(&self) -> bool {
        self.gender() != Gender::Neutral
    }

    pub fn is_neutral(&self) -> bool {
        !self.is_gendered()
    }

    pub fn is_masculine(&self) -> bool {
        self.gender() == Gender::Masculine
    }

    pub fn is_feminine(&self) -> bool {
        self.gender() == Gender::Feminine
    }

    /// Gender of the noun an ordinal suffix agrees with.
    pub fn gender_form(&self) -> Option<Gender> {
        self.attributes
            .get("gender-form")
            .and_then(|gender| gender.parse().ok())
    }

    pub fn ordinal_match(&self) -> Option<OrdinalMatch> {
        self.attributes
            .get("match")
            .and_then(|value| value.parse().ok())
    }

    pub fn ordinal_class(&self) -> Option<OrdinalClass> {
        self.name().and_then(OrdinalClass::from_name)
    }

    pub fn is_ordinal(&self) -> bool {
        self.ordinal_class().is_some()
    }

    pub fn is_short_ordinal(&self) -> bool {
        matches!(
            self.ordinal_class(),
            Some(OrdinalClass::Generic | OrdinalClass::Short(_))
        )
    }

    pub fn is_long_ordinal(&self) -> bool {
        matches!(self.ordinal_class(), Some(OrdinalClass::Long(_)))
    }

    /// Replaces the content with flat text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
        self.single = None;
        self.multiple = None;
    }

    pub fn set_single(&mut self, text: impl Into<String>) {
        self.text = None;
        self.single = Some(form_node(&SINGLE, text.into()));
    }

    pub fn set_multiple(&mut self, text: impl Into<String>) {
        self.text = None;
        self.multiple = Some(form_node(&MULTIPLE, text.into()));
    }

    pub fn single(&self) -> Option<&str> {
        self.single.as_ref().map(TextNode::as_str)
    }

    pub fn multiple(&self) -> Option<&str> {
        self.multiple.as_ref().map(TextNode::as_str)
    }

    pub fn has_forms(&self) -> bool {
        self.single.is_some() || self.multiple.is_some()
    }

    /// Singular text: the flat text or the `single` form.
    pub fn singularize(&self) -> &str {
        self.text
            .as_deref()
            .or_else(|| self.single())
            .unwrap_or_default()
    }

    /// Plural text: the flat text or the `multiple` form.
    pub fn pluralize(&self) -> &str {
        self.text
            .as_deref()
            .or_else(|| self.multiple())
            .unwrap_or_default()
    }

    /// Text agreeing with the requested number.
    pub fn render(&self, options: &TermRenderOptions) -> &str {
        if options.is_plural() {
            self.pluralize()
        } else {
            self.singularize()
        }
    }

    /// True if every criterion set in `query` holds.
    pub fn matches(&self, query: &TermQuery) -> bool {
        let name = match (&query.name, self.name()) {
            (None, _) => true,
            (Some(matcher), Some(name)) => matcher.is_match(name),
            (Some(_), None) => false,
        };

        name && query.form.is_none_or(|form| self.form() == Some(form))
            && query.gender.is_none_or(|gender| self.gender() == gender)
    }

    /// Like [`Term::matches`], but the query must name a gender.
    pub fn exact_match(&self, query: &TermQuery) -> bool {
        query.gender.is_some() && self.matches(query)
    }

    pub(crate) fn push_text(&mut self, text: &str) -> Result<()> {
        if let Some(existing) = &mut self.text {
            existing.push_str(text);
            return Ok(());
        }

        if self.has_forms() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(Error::InvalidChild {
                parent: "term".to_string(),
                child: "text".to_string(),
            });
        }

        self.text = Some(text.to_string());
        Ok(())
    }

    pub(crate) fn attach(&mut self, node: TextNode) -> Result<()> {
        if node.is_raw_text() {
            return self.push_text(node.as_str());
        }

        match node.node_type() {
            Some(node_type) if std::ptr::eq(node_type, &SINGLE) => {
                self.clear_text_for(&node)?;
                self.single = Some(node);
                Ok(())
            }
            Some(node_type) if std::ptr::eq(node_type, &MULTIPLE) => {
                self.clear_text_for(&node)?;
                self.multiple = Some(node);
                Ok(())
            }
            _ => Err(Error::InvalidChild {
                parent: "term".to_string(),
                child: format!("<{}>", node.nodename()),
            }),
        }
    }

    /// Flat text cannot sit beside `<single>` or `<multiple>`; only
    /// whitespace is dropped.
    fn clear_text_for(&mut self, form: &TextNode) -> Result<()> {
        if self.text.as_deref().is_some_and(|text| !text.trim().is_empty()) {
            return Err(Error::InvalidChild {
                parent: "term".to_string(),
                child: format!("<{}>", form.nodename()),
            });
        }
        self.text = None;
        Ok(())
    }
}

fn form_node(node_type: &'static NodeType, text: String) -> TextNode {
    TextNode::typed(node_type, Attributes::open(), text)
}

impl Markup for Term {
    fn nodename(&self) -> &str {
        "term"
    }

    fn node_type(&self) -> Option<&'static NodeType> {
        Some(&TERM)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn children(&self) -> Children<'_> {
        Box::new(
            self.single
                .iter()
                .chain(self.multiple.iter())
                .map(|form| form as &dyn Markup),
        )
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singularize())
    }
}

crate::node::impl_node_traits!(Term);

#[cfg(test)]
mod tests {
    use super::*;

    fn shoe() -> Term {
        Term::named("shoe").with_forms("shoe", "shoes")
    }

    #[test]
    fn test_default_term() {
        let term = Term::default();

        assert!(!term.is_textnode());
        assert!(!term.has_children());
        assert!(!term.is_ordinal());
        assert!(!term.is_short_ordinal());
        assert!(!term.is_long_ordinal());
        assert!(term.is_long());
        assert_eq!(term.to_string(), "");
    }

    #[test]
    fn test_flat_text_renders_regardless_of_number() {
        let term = Term::default().with_text("foo");

        assert!(term.is_textnode());
        assert_eq!(term.render(&TermRenderOptions::default()), "foo");
        assert_eq!(term.render(&TermRenderOptions::plural()), "foo");
        assert_eq!(term.render(&TermRenderOptions::with_number(2)), "foo");
    }

    #[test]
    fn test_number_agreement() {
        let term = shoe();

        assert_eq!(term.render(&TermRenderOptions::default()), "shoe");
        assert_eq!(term.to_string(), "shoe");
        assert_eq!(
            term.render(&TermRenderOptions::with_number(GrammaticalNumber::Plural)),
            "shoes"
        );
        assert_eq!(
            term.render(&TermRenderOptions::with_number(GrammaticalNumber::Singular)),
            "shoe"
        );
        assert_eq!(term.render(&TermRenderOptions::with_number(2)), "shoes");
        assert_eq!(term.render(&TermRenderOptions::with_number(1)), "shoe");
        assert_eq!(term.render(&TermRenderOptions::with_number(0)), "shoes");
        assert_eq!(term.render(&TermRenderOptions::plural()), "shoes");
    }

    #[test]
    fn test_missing_form_renders_empty() {
        let mut term = Term::named("foo");
        term.set_multiple("foos");

        assert_eq!(term.singularize(), "");
        assert_eq!(term.pluralize(), "foos");
    }

    #[test]
    fn test_content_kinds_are_exclusive() {
        let mut term = shoe();
        term.set_text("boot");

        assert!(!term.has_forms());
        assert_eq!(term.pluralize(), "boot");

        term.set_single("sock");
        assert!(!term.is_textnode());
        assert_eq!(term.singularize(), "sock");
    }

    #[test]
    fn test_gender() {
        let mut term = Term::default();
        assert!(!term.is_gendered());
        assert!(term.is_neutral());

        term.set_masculine();
        assert!(term.is_gendered());
        assert!(term.is_masculine());
        assert!(!term.is_feminine());

        term.set_feminine();
        assert!(term.is_feminine());
        assert!(!term.is_neutral());

        term.set_gender(Gender::Neutral);
        assert_eq!(term.attributes().get("gender"), None);
    }

    #[test]
    fn test_matches() {
        let term = Term::named("edition").with_gender(Gender::Feminine);

        assert!(term.matches(&TermQuery::named("edition")));
        assert!(!term.matches(&TermQuery::named("edition").with_gender(Gender::Masculine)));
        assert!(term.matches(&TermQuery::named("edition").with_gender(Gender::Feminine)));
        assert!(!term.exact_match(&TermQuery::named("edition")));
        assert!(term.exact_match(&TermQuery::named("edition").with_gender(Gender::Feminine)));
        assert!(term.matches(&TermQuery::named(Regex::new("^ed").unwrap())));
        assert!(!term.matches(&TermQuery::default().with_form(TermForm::Short)));
    }

    #[test]
    fn test_neutral_query_matches_unset_gender() {
        let term = Term::named("page");

        assert!(term.matches(&TermQuery::named("page").with_gender(Gender::Neutral)));
        assert!(term.exact_match(&TermQuery::named("page").with_gender(Gender::Neutral)));
    }

    #[test]
    fn test_ordinal_classes() {
        assert_eq!(OrdinalClass::from_name("ordinal"), Some(OrdinalClass::Generic));
        assert_eq!(OrdinalClass::from_name("ordinal-04"), Some(OrdinalClass::Short(4)));
        assert_eq!(
            OrdinalClass::from_name("long-ordinal-10"),
            Some(OrdinalClass::Long(10))
        );
        assert_eq!(OrdinalClass::from_name("ordinal-4"), None);
        assert_eq!(OrdinalClass::from_name("long-ordinal"), None);
        assert_eq!(OrdinalClass::from_name("page"), None);

        assert!(Term::named("ordinal-01").is_short_ordinal());
        assert!(Term::named("long-ordinal-01").is_long_ordinal());
    }

    #[test]
    fn test_form_parsing() {
        assert_eq!("verb-short".parse::<TermForm>(), Ok(TermForm::VerbShort));
        assert!("medium".parse::<TermForm>().is_err());
        assert_eq!(
            TermForm::Symbol.fallbacks(),
            &[TermForm::Symbol, TermForm::Short, TermForm::Long]
        );

        let mut term = Term::named("page");
        term.attributes_mut().set("form", "medium");
        assert_eq!(term.form(), None);
    }

    #[test]
    fn test_options_deserialize() {
        let options: TermRenderOptions = serde_json::from_str(r#"{"number": 3}"#).unwrap();
        assert!(options.is_plural());

        let options: TermRenderOptions =
            serde_json::from_str(r#"{"number": "singular"}"#).unwrap();
        assert!(!options.is_plural());

        let gender: Gender = serde_json::from_str(r#""none""#).unwrap();
        assert_eq!(gender, Gender::Neutral);
    }

    #[test]
    fn test_attach_rejects_foreign_leaf() {
        let mut term = Term::named("page");
        let other = TextNode::typed(&crate::registry::LOCALE, Attributes::open(), String::new());

        assert!(term.attach(other).is_err());
        assert!(term.attach(TextNode::new("pp.")).is_ok());
        assert_eq!(term.text(), Some("pp."));
    }
}
