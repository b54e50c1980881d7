//! Record batch processing: clean, slice, persist.

use serde::{Deserialize, Serialize};

use crate::cleaning::clean_batch;
use crate::error::{AnnealError, Result};
use crate::loader::store::{RelationalStore, SchemaCatalog};
use crate::loader::SchemaLoader;
use crate::record::Record;

/// Summary of one processing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Records that survived cleaning.
    pub records: usize,
    /// Slices persisted.
    pub slices: usize,
    /// Total rows affected across all batch upserts.
    pub rows_affected: usize,
}

/// Orchestrates the transform-and-load phases for one batch of records.
pub struct BatchProcessor;

impl BatchProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean a batch, partition it into fixed-size slices, and persist each
    /// slice independently through the loader.
    ///
    /// A persistence failure on one slice aborts the run with the slice
    /// index and cause; slices already persisted stay committed, and re-runs
    /// are idempotent through the upsert's duplicate-key semantics.
    pub fn process_and_persist<S>(
        &self,
        records: &[Record],
        batch_size: usize,
        table: &str,
        loader: &mut SchemaLoader<S>,
    ) -> Result<LoadReport>
    where
        S: RelationalStore + SchemaCatalog,
    {
        if batch_size == 0 {
            return Err(AnnealError::InvalidBatchSize);
        }

        let cleaned = clean_batch(records)?;

        let mut report = LoadReport {
            records: cleaned.len(),
            ..LoadReport::default()
        };

        for (index, slice) in cleaned.chunks(batch_size).enumerate() {
            let affected =
                loader
                    .load(table, slice)
                    .map_err(|err| AnnealError::SlicePersistence {
                        slice: index,
                        source: Box::new(err),
                    })?;
            report.slices += 1;
            report.rows_affected += affected;
        }

        Ok(report)
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new()
    }
}
