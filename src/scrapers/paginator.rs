use crate::error::ScrapeError;
use crate::models::{Card, PageResult};
use crate::scrapers::extract::extract_page;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{CompiledSelectors, ScrapeOptions};
use tracing::{debug, info};
use url::Url;

/// Walks a paginated collection one page at a time.
///
/// Pages are produced lazily by [`Paginator::next_page`]; the walk ends when a
/// page has no next link, when the next link points back at the page just
/// fetched, or when `max_pages` pages have been fetched.
pub struct Paginator<'a, F: PageFetcher> {
    fetcher: &'a F,
    selectors: CompiledSelectors,
    options: ScrapeOptions,
    current_url: Option<Url>,
    pages_fetched: u32,
}

impl<'a, F: PageFetcher> Paginator<'a, F> {
    pub fn new(
        fetcher: &'a F,
        start_url: Url,
        selectors: CompiledSelectors,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            options,
            current_url: Some(start_url),
            pages_fetched: 0,
        }
    }

    fn limit_reached(&self) -> bool {
        self.options
            .max_pages
            .is_some_and(|max| self.pages_fetched >= max)
    }

    /// Fetch and extract the next page, or `Ok(None)` once the walk is over.
    /// Any fetch error ends the walk.
    pub async fn next_page(&mut self) -> Result<Option<PageResult>, ScrapeError> {
        if self.limit_reached() {
            if self.current_url.take().is_some() {
                info!("Reached page limit of {} pages", self.pages_fetched);
            }
            return Ok(None);
        }
        let Some(url) = self.current_url.take() else {
            return Ok(None);
        };

        if self.pages_fetched > 0 && !self.options.delay.is_zero() {
            debug!("Sleeping {:?} before next page", self.options.delay);
            tokio::time::sleep(self.options.delay).await;
        }

        let fetched = self.fetcher.fetch(&url).await?;
        let page = extract_page(&fetched.html, &fetched.url, &self.selectors);
        self.pages_fetched += 1;

        info!(
            "Page {} ({}): {} cards",
            self.pages_fetched,
            url,
            page.cards.len()
        );

        self.current_url = match &page.next_url {
            Some(next) if *next == url || *next == fetched.url => {
                info!("Next link on {} points back at itself, stopping", url);
                None
            }
            Some(next) => Some(next.clone()),
            None => {
                debug!("No next link on {}", url);
                None
            }
        };

        Ok(Some(page))
    }

    /// Drain every page, keeping cards in page order then document order.
    pub async fn collect_all(mut self) -> Result<Vec<Card>, ScrapeError> {
        let mut cards = Vec::new();
        while let Some(page) = self.next_page().await? {
            cards.extend(page.cards);
        }
        Ok(cards)
    }
}
