//! Parsing of search-result "session row" fragments.
//!
//! Each row is a `div.sessionRow` whose `id` is `session_<id>`, holding an
//! abbreviation (`"SEC301 - "`), a title, a type label and, when the user has
//! flagged the session, an `a.interested` marker. Titles may carry `<i>`
//! audio-availability annotations; every italic subtree is ignored.

use ego_tree::{NodeId, NodeRef};
use html_scraper::node::Node;
use html_scraper::{ElementRef, Html, Selector};
use std::ops::Deref;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use super::errors::CardError;

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.sessionRow").unwrap());
static ABBREVIATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".abbreviation").unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".title").unwrap());
static TYPE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".type").unwrap());
static INTERESTED_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".interested").unwrap());

/// Fields scraped from one session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCard {
    /// Opaque key for the schedule endpoint.
    pub id: String,
    /// Display code, e.g. `SEC301`.
    pub number: String,
    pub title: String,
    /// Category label, kept verbatim.
    pub session_type: String,
    pub interested: bool,
}

impl SessionCard {
    /// Parse a standalone row fragment (the outer HTML of one `div.sessionRow`).
    pub fn parse(fragment: &str) -> Result<Self, CardError> {
        let html = Html::parse_fragment(fragment);
        let row = html
            .select(&ROW_SEL)
            .next()
            .ok_or(CardError::MissingField { field: "sessionRow" })?;
        Self::from_row(row)
    }

    pub fn from_row(row: ElementRef<'_>) -> Result<Self, CardError> {
        let id = row
            .attr("id")
            .map(session_id)
            .ok_or(CardError::MissingField { field: "id" })?
            .to_string();

        let number = required_text(row, &ABBREVIATION_SEL, "abbreviation")?.replace(" - ", "");

        let title = required_text(row, &TITLE_SEL, "title")?
            .nfc()
            .collect::<String>()
            .trim_end_matches(|c: char| c.is_ascii_whitespace())
            .to_string();

        let session_type = required_text(row, &TYPE_SEL, "type")?;

        let interested = first_visible(row, &INTERESTED_SEL).is_some();

        Ok(Self {
            id,
            number,
            title,
            session_type,
            interested,
        })
    }
}

/// The lookup key is everything after the first underscore of the row id
/// (`"session_1234"` → `"1234"`); an id without one is used whole.
pub fn session_id(attr: &str) -> &str {
    attr.split_once('_').map_or(attr, |(_, rest)| rest)
}

/// Outer HTML of every session row on a results page, in document order.
pub fn session_rows(document: &Html) -> Vec<String> {
    document.select(&ROW_SEL).map(|row| row.html()).collect()
}

fn required_text(
    row: ElementRef<'_>,
    selector: &Selector,
    field: &'static str,
) -> Result<String, CardError> {
    first_visible(row, selector)
        .map(visible_text)
        .ok_or(CardError::MissingField { field })
}

fn first_visible<'a>(row: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    let root = row.id();
    row.select(selector).find(|element| {
        element.value().name() != "i" && !under_italics(Deref::deref(element), root)
    })
}

/// Text content of `element`, skipping anything nested in `<i>`.
fn visible_text(element: ElementRef<'_>) -> String {
    let root = element.id();
    element
        .descendants()
        .filter(|node| !under_italics(node, root))
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect()
}

/// True when an `<i>` sits between `node` and the row root.
fn under_italics(node: &NodeRef<'_, Node>, root: NodeId) -> bool {
    node.ancestors()
        .take_while(|ancestor| ancestor.id() != root)
        .any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| element.name() == "i")
        })
}
