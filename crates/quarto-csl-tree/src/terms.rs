//! Term tables and term resolution.

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::node::{Children, Markup, Node};
use crate::registry::{NodeType, TERMS};
use crate::term::{
    Gender, Number, OrdinalMatch, Term, TermForm, TermQuery, TermRenderOptions,
};
use serde::Deserialize;
use std::fmt;

/// Options for [`TermTable::lookup`].
///
/// `plural` and `number` do not affect which term is found; they are carried
/// along for [`TermTable::render`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LookupOptions {
    pub form: Option<TermForm>,
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub plural: bool,
}

impl LookupOptions {
    pub fn with_form(mut self, form: TermForm) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_number(mut self, number: impl Into<Number>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn with_plural(mut self, plural: bool) -> Self {
        self.plural = plural;
        self
    }
}

impl From<&LookupOptions> for TermRenderOptions {
    fn from(options: &LookupOptions) -> Self {
        TermRenderOptions {
            number: options.number,
            plural: options.plural,
        }
    }
}

/// The `<terms>` element: an ordered table of terms.
#[derive(Debug, Clone)]
pub struct TermTable {
    attributes: Attributes,
    terms: Vec<Term>,
}

impl Default for TermTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TermTable {
    pub fn new() -> Self {
        Self {
            attributes: Attributes::with_schema(TERMS.schema),
            terms: Vec::new(),
        }
    }

    /// Parses a standalone `<terms>` element.
    pub fn parse(content: &str) -> Result<Self> {
        match crate::parser::parse(content)? {
            Node::Terms(terms) => Ok(terms),
            other => Err(Error::InvalidRootElement {
                expected: "terms",
                found: other.nodename().to_string(),
            }),
        }
    }

    pub fn push(&mut self, term: Term) -> &mut Self {
        self.terms.push(term);
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn terms_mut(&mut self) -> &mut [Term] {
        &mut self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Finds the term called `name` that best fits `options`.
    ///
    /// Terms of another gender are skipped, then the forms in the requested
    /// form's fallback chain are tried in order; the first matching term in
    /// table order wins. If no form matches, the first term called `name` is
    /// returned. `None` means no term has that name.
    pub fn lookup(&self, name: &str, options: &LookupOptions) -> Option<&Term> {
        let candidates: Vec<&Term> = self
            .terms
            .iter()
            .filter(|term| term.name() == Some(name))
            .collect();
        let first = *candidates.first()?;

        let requested = options.form.unwrap_or_default();
        for &form in requested.fallbacks() {
            let query = TermQuery {
                name: None,
                form: Some(form),
                gender: options.gender,
            };

            if let Some(term) = candidates.iter().find(|term| term.matches(&query)) {
                tracing::trace!(name, %requested, resolved = %form, "resolved term");
                return Some(*term);
            }
            tracing::trace!(name, %form, "no term in this form");
        }

        tracing::debug!(name, %requested, "no term form matched, using first entry");
        Some(first)
    }

    /// Looks up a term and renders it for `options`.
    pub fn render(&self, name: &str, options: &LookupOptions) -> Option<&str> {
        self.lookup(name, options)
            .map(|term| term.render(&TermRenderOptions::from(options)))
    }

    /// The ordinal suffix term for `number`.
    ///
    /// Tries `ordinal-NN` for the last two digits, then for the last digit,
    /// then the generic `ordinal` term. `match` attributes narrow which
    /// numbers an `ordinal-NN` term applies to.
    pub fn ordinalize(&self, number: i64) -> Option<&Term> {
        self.ordinalize_for(number, None)
    }

    /// Like [`TermTable::ordinalize`], preferring terms whose `gender-form`
    /// is `gender`.
    pub fn ordinalize_for(&self, number: i64, gender: Option<Gender>) -> Option<&Term> {
        let number = number.unsigned_abs();
        let last_two = number % 100;
        let last = number % 10;

        self.find_ordinal(&format!("ordinal-{last_two:02}"), gender, |rule| {
            match rule {
                Some(OrdinalMatch::WholeNumber) => number == last_two,
                _ => true,
            }
        })
        .or_else(|| {
            self.find_ordinal(&format!("ordinal-{last:02}"), gender, |rule| match rule {
                Some(OrdinalMatch::WholeNumber) => number == last,
                Some(OrdinalMatch::LastTwoDigits) => false,
                Some(OrdinalMatch::LastDigit) | None => true,
            })
        })
        .or_else(|| self.find_ordinal("ordinal", gender, |_| true))
    }

    /// The `long-ordinal-NN` term for `number`, or its ordinal suffix when
    /// there is none.
    pub fn long_ordinalize(&self, number: i64) -> Option<&Term> {
        let whole = number.unsigned_abs();
        let last_two = whole % 100;

        self.find_ordinal(&format!("long-ordinal-{last_two:02}"), None, |rule| {
            match rule {
                Some(OrdinalMatch::WholeNumber) => whole == last_two,
                _ => true,
            }
        })
        .or_else(|| self.ordinalize(number))
    }

    fn find_ordinal<F>(&self, name: &str, gender: Option<Gender>, applies: F) -> Option<&Term>
    where
        F: Fn(Option<OrdinalMatch>) -> bool,
    {
        let candidates: Vec<&Term> = self
            .terms
            .iter()
            .filter(|term| term.name() == Some(name) && applies(term.ordinal_match()))
            .collect();

        let term = candidates
            .iter()
            .find(|term| term.gender_form() == gender)
            .or_else(|| candidates.iter().find(|term| term.gender_form().is_none()))
            .or_else(|| candidates.first())
            .copied();

        if term.is_some() {
            tracing::trace!(name, "resolved ordinal");
        }
        term
    }
}

impl Markup for TermTable {
    fn nodename(&self) -> &str {
        "terms"
    }

    fn node_type(&self) -> Option<&'static NodeType> {
        Some(&TERMS)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn children(&self) -> Children<'_> {
        Box::new(self.terms.iter().map(|term| term as &dyn Markup))
    }
}

impl FromIterator<Term> for TermTable {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        let mut table = Self::new();
        table.terms.extend(iter);
        table
    }
}

impl fmt::Display for TermTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}

crate::node::impl_node_traits!(TermTable);
