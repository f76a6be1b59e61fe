use crate::ScraperError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Records collected across pages, in encounter order.
#[derive(Debug)]
pub struct Aggregator<R> {
    records: Vec<R>,
}

impl<R> Default for Aggregator<R> {
    fn default() -> Self {
        Aggregator { records: vec![] }
    }
}

impl<R: Serialize> Aggregator<R> {
    pub fn new() -> Aggregator<R> {
        Aggregator::default()
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        self.records.as_slice()
    }

    /// Pretty JSON array, non-ASCII kept as is. Written to a sibling `.tmp`
    /// file, then renamed into place.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ScraperError> {
        let path = path.as_ref();
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &self.records)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;

        debug!("Wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}
