use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Column order shared by every sink.
pub const HEADER: [&str; 3] = ["name", "price", "image_url"];

/// One catalog entry as scraped from a collection page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    /// `None` when the price text held no parsable number
    pub price: Option<f64>,
    pub image_url: String,
}

impl Card {
    /// Row in spreadsheet cell form. Absent prices become empty strings.
    pub fn to_sheet_row(&self) -> Vec<Value> {
        let price = match self.price {
            Some(p) => Value::from(p),
            None => Value::String(String::new()),
        };
        vec![
            Value::String(self.name.clone()),
            price,
            Value::String(self.image_url.clone()),
        ]
    }
}

/// What a single fetched page yields
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub cards: Vec<Card>,
    /// Absolute URL of the following page, if the page links to one
    pub next_url: Option<Url>,
}
