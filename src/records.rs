// src/records.rs

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{de::DeserializeOwned, Deserialize};
use std::{fs::File, path::Path};

/// Status value Carto uses for finished tickets.
pub const CLOSED: &str = "Closed";

/// The columns of a 311 ticket the report reads. Other columns are ignored
/// here but carried through by the stages that rewrite the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceRequestRecord {
    pub service_request_id: String,
    pub status: String,
}

impl ServiceRequestRecord {
    pub fn is_open(&self) -> bool {
        self.status != CLOSED
    }
}

/// One row of the joined file; only the originating request matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JoinedRecord {
    pub service_request_id: String,
}

/// Deserialize every row of a headed CSV file.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    rdr.deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .with_context(|| format!("parsing {}", path.display()))
}
