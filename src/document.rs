use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

/// Heading text the evaluator renders once a page has been evaluated.
pub const EVALUATED_HEADING: &str = "Página Avaliada";

/// Markup of an accepted evaluation, together with the url that was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDocument {
    pub target: String,
    markup: String,
}

impl ResultDocument {
    pub fn new(target: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            markup: markup.into(),
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn parse(&self) -> Document {
        Document::parse(&self.markup)
    }
}

/// Outcome of submitting one target to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Accepted(ResultDocument),
    /// Already recorded in the failure queue.
    Failed { target: String },
}

impl Evaluation {
    pub fn target(&self) -> &str {
        match self {
            Evaluation::Accepted(doc) => &doc.target,
            Evaluation::Failed { target } => target,
        }
    }

    pub fn document(&self) -> Option<&ResultDocument> {
        match self {
            Evaluation::Accepted(doc) => Some(doc),
            Evaluation::Failed { .. } => None,
        }
    }
}

/// Parsed result page with the handful of queries the extractors need.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn select_all<'a>(&'a self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }

    pub fn select_first<'a>(&'a self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.html.select(selector).next()
    }

    /// True if any element matching `selector` contains `needle` in its text.
    pub fn any_text_contains(&self, selector: &Selector, needle: &str) -> bool {
        self.html
            .select(selector)
            .any(|el| el.text().collect::<String>().contains(needle))
    }

    /// The evaluator's success check, see [`EVALUATED_HEADING`].
    pub fn is_evaluated(&self) -> bool {
        match create_selector("h2") {
            Ok(h2) => self.any_text_contains(&h2, EVALUATED_HEADING),
            Err(_) => false,
        }
    }
}

/// Parses `markup` just long enough to run the success check.
pub fn is_evaluated(markup: &str) -> bool {
    Document::parse(markup).is_evaluated()
}

#[inline]
pub fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::MissingSelector(sel_str.into()))
}

/// Concatenated text of an element.
pub fn text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn text_trimmed(el: &ElementRef<'_>) -> String {
    text(el).trim().to_string()
}

/// Trimmed text of the node right after `el`, whether that is a text node or an element.
pub fn next_sibling_text(el: &ElementRef<'_>) -> Option<String> {
    let next = el.next_sibling()?;
    if let Some(t) = next.value().as_text() {
        return Some(t.trim().to_string());
    }
    ElementRef::wrap(next).map(|el| text_trimmed(&el))
}
