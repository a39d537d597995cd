use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading advancement export: {0}")]
    Csv(#[from] csv::Error),

    #[error("advancement export is empty")]
    EmptyExport,

    #[error("advancement export has no {0:?} column")]
    MissingColumn(&'static str),
}
