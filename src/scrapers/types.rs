use crate::error::ScrapeError;
use scraper::Selector;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Scrapink card scraper (github.com)";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en;q=0.8";

/// CSS selectors locating card data on a collection page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Container for a single card
    pub card: String,
    pub name: String,
    pub price: String,
    pub image: String,
    /// Pagination link to the following page
    pub next: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            card: "div.card".to_string(),
            name: ".card__title".to_string(),
            price: ".card__price".to_string(),
            image: "img.card__image".to_string(),
            next: "a[rel='next']".to_string(),
        }
    }
}

impl Selectors {
    /// Parse every selector up front so a typo fails before the first request.
    pub fn compile(&self) -> Result<CompiledSelectors, ScrapeError> {
        Ok(CompiledSelectors {
            card: parse_selector("card", &self.card)?,
            name: parse_selector("name", &self.name)?,
            price: parse_selector("price", &self.price)?,
            image: parse_selector("image", &self.image)?,
            next: parse_selector("next", &self.next)?,
        })
    }
}

fn parse_selector(field: &'static str, raw: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(raw).map_err(|e| ScrapeError::Selector {
        field,
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parsed form of [`Selectors`]
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub card: Selector,
    pub name: Selector,
    pub price: Selector,
    pub image: Selector,
    pub next: Selector,
}

/// Knobs for one scraping run
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Pause between two successive page fetches
    pub delay: Duration,
    /// Stop after this many pages; `None` follows next links until they run out
    pub max_pages: Option<u32>,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_pages: None,
            timeout: Duration::from_secs(20),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
