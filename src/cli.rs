use crate::error::ScrapeError;
use crate::scrapers::types::DEFAULT_USER_AGENT;
use crate::scrapers::{ScrapeOptions, Selectors};
use crate::sinks::SheetTarget;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Scrape trading cards (name, price, illustration) into CSV or Google Sheets.
#[derive(Parser, Debug, Clone)]
#[command(name = "cardex-scout", version, about)]
pub struct Args {
    /// Collection page URL to start from
    #[arg(long)]
    pub url: String,

    /// Path of the CSV file to write
    #[arg(long)]
    pub output_csv: PathBuf,

    /// Google Sheets spreadsheet ID
    #[arg(long, requires_all = ["worksheet", "service_account"])]
    pub google_sheet_id: Option<String>,

    /// Worksheet title to overwrite in the spreadsheet
    #[arg(long, requires = "google_sheet_id")]
    pub worksheet: Option<String>,

    /// Path to the service-account JSON key
    #[arg(long, requires = "google_sheet_id")]
    pub service_account: Option<PathBuf>,

    /// Seconds to wait between pages
    #[arg(long, default_value = "1", value_parser = parse_seconds)]
    pub delay: Duration,

    /// Maximum number of pages to scrape (default: all)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_pages: Option<u32>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, default_value = "20", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// CSS selector for individual card containers
    #[arg(long, default_value = "div.card")]
    pub card_selector: String,

    /// CSS selector for the card title element
    #[arg(long, default_value = ".card__title")]
    pub name_selector: String,

    /// CSS selector for the card price element
    #[arg(long, default_value = ".card__price")]
    pub price_selector: String,

    /// CSS selector for the card image element
    #[arg(long, default_value = "img.card__image")]
    pub image_selector: String,

    /// CSS selector for the link to the next page
    #[arg(long, default_value = "a[rel='next']")]
    pub next_selector: String,
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("{raw:?} must be a non-negative number of seconds within range"))
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let timeout = parse_seconds(raw)?;
    if timeout.is_zero() {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(timeout)
}

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub start_url: Url,
    pub output_csv: PathBuf,
    pub selectors: Selectors,
    pub options: ScrapeOptions,
    pub sheet: Option<SheetTarget>,
}

impl Args {
    pub fn into_config(self) -> Result<RunConfig, ScrapeError> {
        let start_url = Url::parse(&self.url).map_err(|source| ScrapeError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        let sheet = match (self.google_sheet_id, self.worksheet, self.service_account) {
            (Some(spreadsheet_id), Some(worksheet), Some(credential_path)) => Some(SheetTarget {
                spreadsheet_id,
                worksheet,
                credential_path,
            }),
            _ => None,
        };

        Ok(RunConfig {
            start_url,
            output_csv: self.output_csv,
            selectors: Selectors {
                card: self.card_selector,
                name: self.name_selector,
                price: self.price_selector,
                image: self.image_selector,
                next: self.next_selector,
            },
            options: ScrapeOptions {
                delay: self.delay,
                max_pages: self.max_pages,
                timeout: self.timeout,
                user_agent: self.user_agent,
            },
            sheet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: [&str; 5] = [
        "cardex-scout",
        "--url",
        "https://www.pokecardex.com/collection/show",
        "--output-csv",
        "cards.csv",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(BASE.iter().chain(extra.iter()).copied())
    }

    #[test]
    fn defaults_match_the_catalog_markup() {
        let config = parse(&[]).unwrap().into_config().unwrap();

        assert_eq!(config.selectors, Selectors::default());
        assert_eq!(config.options.delay, Duration::from_secs(1));
        assert_eq!(config.options.timeout, Duration::from_secs(20));
        assert_eq!(config.options.max_pages, None);
        assert_eq!(config.options.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.output_csv, PathBuf::from("cards.csv"));
        assert!(config.sheet.is_none());
    }

    #[test]
    fn url_and_output_are_required() {
        assert!(Args::try_parse_from(["cardex-scout", "--output-csv", "cards.csv"]).is_err());
        assert!(Args::try_parse_from(["cardex-scout", "--url", "https://a.example"]).is_err());
    }

    #[test]
    fn sheet_flags_go_together() {
        assert!(parse(&["--google-sheet-id", "abc"]).is_err());
        assert!(parse(&["--worksheet", "Cartes"]).is_err());
        assert!(parse(&["--google-sheet-id", "abc", "--worksheet", "Cartes"]).is_err());

        let config = parse(&[
            "--google-sheet-id",
            "abc",
            "--worksheet",
            "Cartes",
            "--service-account",
            "key.json",
        ])
        .unwrap()
        .into_config()
        .unwrap();

        assert_eq!(
            config.sheet,
            Some(SheetTarget {
                spreadsheet_id: "abc".to_string(),
                worksheet: "Cartes".to_string(),
                credential_path: PathBuf::from("key.json"),
            })
        );
    }

    #[test]
    fn delay_and_page_limit() {
        let config = parse(&["--delay", "0.5", "--max-pages", "3"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.options.delay, Duration::from_millis(500));
        assert_eq!(config.options.max_pages, Some(3));

        assert!(parse(&["--delay", "-1"]).is_err());
        assert!(parse(&["--max-pages", "0"]).is_err());
    }

    #[test]
    fn out_of_range_seconds_are_rejected() {
        assert!(parse(&["--delay", "1e20"]).is_err());
        assert!(parse(&["--delay", "NaN"]).is_err());
        assert!(parse(&["--timeout", "inf"]).is_err());

        let config = parse(&["--delay", "0"]).unwrap().into_config().unwrap();
        assert!(config.options.delay.is_zero());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(parse(&["--timeout", "0"]).is_err());
        assert!(parse(&["--timeout", "0.0"]).is_err());

        let config = parse(&["--timeout", "2.5"]).unwrap().into_config().unwrap();
        assert_eq!(config.options.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn invalid_start_url_is_rejected() {
        let args = Args::try_parse_from([
            "cardex-scout",
            "--url",
            "not a url",
            "--output-csv",
            "cards.csv",
        ])
        .unwrap();
        assert!(matches!(
            args.into_config(),
            Err(ScrapeError::InvalidUrl { .. })
        ));
    }
}
