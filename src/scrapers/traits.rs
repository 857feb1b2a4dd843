use crate::error::ScrapeError;
use async_trait::async_trait;
use url::Url;

/// HTML body of a fetched page together with the URL it was served from
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,
    pub html: String,
}

/// Source of raw page HTML.
/// The paginator only talks to this trait, so tests can serve canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError>;
}
