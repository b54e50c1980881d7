//! Schema-adaptive relational loading.
//!
//! The loader persists records with a dynamic attribute set into a named
//! table with no pre-declared schema: it discovers the destination schema
//! from the data, evolves an existing table under the storage engine's
//! row-width budget, and writes each slice with one parameterized batch
//! upsert keyed on the record id.

pub mod schema;
pub mod store;

mod upsert;

#[cfg(feature = "mysql")]
pub mod mysql;

use tracing::warn;

use crate::error::{AnnealError, Result};
use crate::record::Record;

use schema::{
    create_table_sql, declared_row_width, heuristic_sql_type, missing_columns,
    sanitize_table_name, ColumnPlan, ROW_WIDTH_BUDGET,
};
use store::{ColumnDescriptor, RelationalStore, SchemaCatalog};
use upsert::build_upsert;

/// Loader behavior knobs.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Run the name-substring type-adjustment pass over existing columns.
    /// Off by default: it can narrow a column and truncate data.
    pub adjust_existing_types: bool,
    /// Maximum declared byte width per row.
    pub row_width_budget: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            adjust_existing_types: false,
            row_width_budget: ROW_WIDTH_BUDGET,
        }
    }
}

/// Loads record slices into a table whose schema is reconciled at runtime.
pub struct SchemaLoader<S> {
    store: S,
    config: LoaderConfig,
}

impl<S> SchemaLoader<S>
where
    S: RelationalStore + SchemaCatalog,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, LoaderConfig::default())
    }

    pub fn with_config(store: S, config: LoaderConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load one slice: reconcile the destination schema, then execute one
    /// parameterized batch upsert. Returns the number of affected rows.
    pub fn load(&mut self, table: &str, slice: &[Record]) -> Result<usize> {
        let table = sanitize_table_name(table);
        let plan = ColumnPlan::from_slice(slice);

        self.reconcile(&table, &plan)?;

        let (sql, rows) = build_upsert(&table, &plan, slice);
        self.store
            .execute_batch(&sql, &rows)
            .map_err(|err| AnnealError::UpsertExecution {
                statement: sql,
                message: err.to_string(),
            })
    }

    /// Bring the table's schema in line with the planned column set.
    fn reconcile(&mut self, table: &str, plan: &ColumnPlan) -> Result<()> {
        let mut existing = self.columns_of(table)?;

        if existing.is_empty() {
            let ddl = create_table_sql(table, plan);
            self.execute_ddl(&ddl)?;
            return Ok(());
        }

        let mut missing = missing_columns(plan, &existing);
        if missing.is_empty() {
            // Schema already complete: issue no DDL at all.
            return Ok(());
        }

        // New variable-length columns can overflow a fixed-format row, so
        // widen the layout before any addition.
        self.execute_ddl(&format!("ALTER TABLE {table} ROW_FORMAT=DYNAMIC"))?;

        if self.config.adjust_existing_types {
            self.adjust_existing(table, &existing);
            existing = self.columns_of(table)?;
            missing = missing_columns(plan, &existing);
        }

        loop {
            let mut width_used = declared_row_width(&existing);
            for col in &missing {
                let width = col.char_width();
                let sql_type = if width_used + width > self.config.row_width_budget {
                    warn!(
                        column = col.name,
                        budget = self.config.row_width_budget,
                        "row width budget exceeded, downgrading column to TEXT"
                    );
                    "TEXT".to_string()
                } else {
                    width_used += width;
                    col.sql_type.clone()
                };

                let ddl = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col.name, sql_type);
                self.execute_ddl(&ddl)?;
            }

            existing = self.columns_of(table)?;
            let still_missing = missing_columns(plan, &existing);
            if still_missing.is_empty() {
                break;
            }
            if still_missing.len() >= missing.len() {
                warn!(
                    table,
                    missing = still_missing.len(),
                    "column addition made no progress, giving up"
                );
                break;
            }
            missing = still_missing;
        }

        Ok(())
    }

    /// Best-effort pass rewriting existing column types from name-substring
    /// heuristics. Failures are logged and skipped, never fatal.
    fn adjust_existing(&mut self, table: &str, existing: &[ColumnDescriptor]) {
        for col in existing {
            let target = heuristic_sql_type(&col.name);
            let ddl = format!("ALTER TABLE {} MODIFY {} {}", table, col.name, target);
            if let Err(err) = self.store.execute(&ddl) {
                warn!(statement = ddl, error = %err, "type adjustment failed, skipping");
            }
        }
    }

    fn columns_of(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.store
            .columns_of(table)
            .map_err(|err| AnnealError::SchemaIntrospection {
                statement: format!("columns of {table}"),
                message: err.to_string(),
            })
    }

    fn execute_ddl(&mut self, ddl: &str) -> Result<()> {
        self.store
            .execute(ddl)
            .map(|_| ())
            .map_err(|err| AnnealError::SchemaMutation {
                statement: ddl.to_string(),
                message: err.to_string(),
            })
    }
}
