use crate::error::SinkError;
use crate::models::{Card, HEADER};
use std::path::Path;
use tracing::info;

/// Write cards to `path`, replacing any existing file.
///
/// The header row is always written, even for an empty run. Absent prices
/// are written as empty fields.
pub fn write_csv(path: &Path, cards: &[Card]) -> Result<(), SinkError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(HEADER)?;
    for card in cards {
        writer.serialize(card)?;
    }
    writer.flush()?;

    info!("💾 Wrote {} cards to {}", cards.len(), path.display());
    Ok(())
}
