//! Pure transforms from rendered listing HTML to bid records.
//!
//! Nothing here touches the browser or the store: the engine snapshots the
//! page DOM once per cycle and every decision (records, first-id fingerprint,
//! next-control presence) is derived from that snapshot.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::record::BidRecord;

static CARD_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.card").unwrap());
static BID_LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.bid_no_hover").unwrap());
static STRONG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").unwrap());
static DEPT_ROW_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.col-md-5 .row").unwrap());
static START_DATE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".start_date").unwrap());
static END_DATE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".end_date").unwrap());
static NEXT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("#light-pagination .next").unwrap());

/// Bid numbers always carry the "/B/" segment; anything else under the
/// bid-link class is navigation chrome.
const BID_NO_MARKER: &str = "/B/";
/// Generic anchor caption that carries no item information.
const ITEMS_PLACEHOLDER: &str = "view";

fn inner_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

fn strip_label(text: &str, label: &str) -> String {
    text.replacen(label, "", 1).trim().to_string()
}

/// Collapse a multi-line block into a single " | "-separated line.
fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The labelled anchor next to a `<strong>Items:</strong>` marker, if any.
fn sibling_anchor<'a>(strong: ElementRef<'a>) -> Option<ElementRef<'a>> {
    strong
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
}

fn labelled_strong<'a>(card: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    card.select(&STRONG_SEL)
        .find(|s| inner_text(*s).contains(label))
}

/// Items fallback chain: preview attribute, then anchor text, then the raw
/// block text with the label stripped. All three failing yields an empty
/// string and a data-quality warning; the record is still kept.
fn extract_items(card: ElementRef, bid_no: &str) -> String {
    if let Some(strong) = labelled_strong(card, "Items:") {
        if let Some(anchor) = sibling_anchor(strong) {
            if let Some(preview) = anchor.value().attr("data-content") {
                let preview = preview.trim();
                if !preview.is_empty() {
                    return preview.to_string();
                }
            }
            let text = inner_text(anchor).trim().to_string();
            if !text.is_empty() && !text.eq_ignore_ascii_case(ITEMS_PLACEHOLDER) {
                return text;
            }
        }
        if let Some(block) = strong.parent().and_then(ElementRef::wrap) {
            let raw = strip_label(&inner_text(block), "Items:");
            if !raw.is_empty() && !raw.eq_ignore_ascii_case(ITEMS_PLACEHOLDER) {
                return raw;
            }
        }
    }
    warn!(bid_no, "items field empty after all fallbacks");
    String::new()
}

fn extract_quantity(card: ElementRef) -> String {
    labelled_strong(card, "Quantity:")
        .and_then(|s| s.parent())
        .and_then(ElementRef::wrap)
        .map(|block| strip_label(&inner_text(block), "Quantity:"))
        .unwrap_or_default()
}

fn extract_department(card: ElementRef) -> String {
    card.select(&DEPT_ROW_SEL)
        .nth(1)
        .map(|block| normalize_lines(&inner_text(block)))
        .unwrap_or_default()
}

fn first_text(card: ElementRef, sel: &Selector) -> String {
    card.select(sel)
        .next()
        .map(|el| inner_text(el).trim().to_string())
        .unwrap_or_default()
}

/// A card without a bid-number anchor is not a record; skip it silently.
/// Every other missing element degrades to an empty field.
fn extract_card(card: ElementRef) -> Option<BidRecord> {
    let bid_no = card
        .select(&BID_LINK_SEL)
        .map(|a| inner_text(a).trim().to_string())
        .find(|t| t.contains(BID_NO_MARKER))?;

    let items = extract_items(card, &bid_no);
    Some(BidRecord {
        items,
        quantity: extract_quantity(card),
        department: extract_department(card),
        start_date: first_text(card, &START_DATE_SEL),
        end_date: first_text(card, &END_DATE_SEL),
        bid_no,
    })
}

/// All records visible on the rendered page, in document order.
/// Zero cards is a valid empty result, not an error.
pub fn extract_page(html: &str) -> Vec<BidRecord> {
    let doc = Html::parse_document(html);
    doc.select(&CARD_SEL).filter_map(extract_card).collect()
}

/// Number of card containers currently rendered.
pub fn card_count(html: &str) -> usize {
    Html::parse_document(html).select(&CARD_SEL).count()
}

/// Fingerprint of the page: the first visible bid number. Used to verify
/// that a triggered pagination action actually changed content.
pub fn first_bid_id(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&BID_LINK_SEL)
        .map(|a| inner_text(a).trim().to_string())
        .find(|t| t.contains(BID_NO_MARKER))
}

/// True iff a live "next" control is present (rendered and not marked as the
/// current/disabled page).
pub fn has_next_control(html: &str) -> bool {
    let doc = Html::parse_document(html);
    doc.select(&NEXT_SEL).any(|el| {
        !el.value()
            .classes()
            .any(|c| c.eq_ignore_ascii_case("current"))
    })
}
