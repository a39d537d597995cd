//! Loading side of meritmerge: advancement export parsing and JSON file I/O.

mod error;
pub mod export;
pub mod files;

pub use error::IngestError;
pub use export::parse_export;
pub use files::{load_canonical, load_catalog, load_csv_extraction, load_scraped, write_json};
