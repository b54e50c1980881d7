//! Anneal: typed attribute cleaning with schema-adaptive relational loading.
//!
//! Anneal turns loosely-typed extracted column values into validated,
//! statistically cleaned, typed values, and persists them into a relational
//! table whose schema is discovered and evolved at runtime from the data
//! itself rather than declared in advance.
//!
//! # Pipeline
//!
//! Raw records (id + attribute map) flow through four stages, slice by
//! slice, in order:
//!
//! 1. **Coercion**: declared-type strings become typed values; malformed
//!    input degrades to "missing" instead of aborting.
//! 2. **Cleaning**: per-column statistics, from Tukey-fence outlier
//!    rejection through mean/mode imputation to normalization and encoding.
//! 3. **Schema reconciliation**: the destination table is created or
//!    evolved to fit the data, under the engine's row-width budget.
//! 4. **Persistence**: one parameterized batch upsert per slice, keyed on
//!    the record id, so re-runs are idempotent.
//!
//! # Example
//!
//! ```no_run
//! use anneal::{coerce, BatchProcessor, Record, SchemaLoader, TypeTag, TypedAttribute};
//! # use anneal::store::{RelationalStore, SchemaCatalog};
//! # fn run(store: impl RelationalStore + SchemaCatalog) -> anneal::Result<()> {
//! let mut record = Record::new("user-1");
//! let mut age = TypedAttribute::new("age", TypeTag::Integer);
//! if let Some(value) = coerce("42", TypeTag::Integer, None) {
//!     age.set_value(value)?;
//! }
//! record.insert(age);
//!
//! let mut loader = SchemaLoader::new(store);
//! let report = BatchProcessor::new().process_and_persist(&[record], 100, "users", &mut loader)?;
//! println!("persisted {} records in {} slices", report.records, report.slices);
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod cleaning;
pub mod error;
pub mod loader;

mod coerce;
mod processor;
mod record;

pub use attribute::{AttributeValue, CompiledRule, TypeTag, TypedAttribute};
pub use cleaning::clean_batch;
pub use coerce::coerce;
pub use error::{AnnealError, Result};
pub use loader::store;
pub use loader::{LoaderConfig, SchemaLoader};
pub use processor::{BatchProcessor, LoadReport};
pub use record::Record;

#[cfg(feature = "mysql")]
pub use loader::mysql::{MysqlStore, MysqlStoreConfig};
