use crate::models::{Card, PageResult};
use crate::scrapers::types::CompiledSelectors;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Extract every card on a page plus the link to the next page.
///
/// Missing sub-elements produce empty fields instead of failing, so a page
/// with N card containers always yields N cards. `page_url` is only used to
/// resolve a relative next link.
pub fn extract_page(html: &str, page_url: &Url, selectors: &CompiledSelectors) -> PageResult {
    let document = Html::parse_document(html);

    let cards: Vec<Card> = document
        .select(&selectors.card)
        .enumerate()
        .map(|(idx, node)| {
            let card = extract_card(node, selectors);
            if card.name.is_empty() {
                debug!("Card {} on {} has no name", idx, page_url);
            }
            card
        })
        .collect();

    let next_url = find_next_page(&document, &selectors.next, page_url);

    PageResult { cards, next_url }
}

fn extract_card(node: ElementRef<'_>, selectors: &CompiledSelectors) -> Card {
    let name = select_text(node, &selectors.name);
    let price_text = select_text(node, &selectors.price);
    let image_url = select_image(node, &selectors.image);

    Card {
        name,
        price: parse_price(&price_text),
        image_url,
    }
}

/// Text of the first match, trimmed with inner whitespace runs collapsed.
fn select_text(node: ElementRef<'_>, selector: &Selector) -> String {
    match node.select(selector).next() {
        Some(el) => {
            let raw = el.text().collect::<String>();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        None => String::new(),
    }
}

/// `src` of the first match, falling back to `data-src` for lazy-loaded images.
fn select_image(node: ElementRef<'_>, selector: &Selector) -> String {
    let Some(el) = node.select(selector).next() else {
        return String::new();
    };
    ["src", "data-src"]
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn find_next_page(document: &Html, selector: &Selector, page_url: &Url) -> Option<Url> {
    let link = document.select(selector).next()?;
    let href = link.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    match page_url.join(href) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Ignoring unresolvable next link {:?}: {}", href, e);
            None
        }
    }
}

/// Parse a displayed price such as `"12,50 €"` or `"1 234.00"`.
///
/// Only the first number in the text counts. A number is a run of digits
/// that may contain `,`, `.` or spaces between digits. Within that run the
/// last `,` or `.` is the decimal separator and everything else is a
/// thousands separator. A `-` directly before the run makes it negative
/// unless it is glued to a word (`Réf-7`). Returns `None` when no digit is
/// present.
pub fn parse_price(raw: &str) -> Option<f64> {
    let chars: Vec<char> = raw.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let mut end = start;
    while end < chars.len() {
        let c = chars[end];
        let joins_digits = is_price_separator(c)
            && chars.get(end + 1).is_some_and(|next| next.is_ascii_digit());
        if c.is_ascii_digit() || joins_digits {
            end += 1;
        } else {
            break;
        }
    }
    let run = &chars[start..end];

    let negative = start >= 1
        && chars[start - 1] == '-'
        && (start < 2 || !chars[start - 2].is_alphanumeric());
    let decimal_at = run.iter().rposition(|c| *c == ',' || *c == '.');

    let mut normalized = String::with_capacity(run.len() + 1);
    if negative {
        normalized.push('-');
    }
    for (i, c) in run.iter().enumerate() {
        if c.is_ascii_digit() {
            normalized.push(*c);
        } else if Some(i) == decimal_at {
            normalized.push('.');
        }
    }

    normalized.parse::<f64>().ok().filter(|p| p.is_finite())
}

fn is_price_separator(c: char) -> bool {
    matches!(c, ',' | '.' | ' ' | '\u{a0}' | '\u{202f}')
}
