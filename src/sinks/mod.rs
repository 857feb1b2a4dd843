pub mod auth;
pub mod csv;
pub mod sheets;

pub use self::csv::write_csv;
pub use sheets::SheetTarget;
