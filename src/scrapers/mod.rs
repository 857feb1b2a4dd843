pub mod extract;
pub mod fetcher;
pub mod paginator;
pub mod traits;
pub mod types;

pub use fetcher::HttpFetcher;
pub use paginator::Paginator;
pub use types::{ScrapeOptions, Selectors};
