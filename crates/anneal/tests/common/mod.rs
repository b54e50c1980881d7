//! In-memory storage collaborator used by the integration tests.
//!
//! Records every statement it is handed, keeps a catalog of created
//! tables, and applies batch upserts keyed on the first bind (the record
//! id) so idempotence can be asserted.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::collections::HashMap;

use indexmap::IndexMap;

use anneal::store::{ColumnDescriptor, RelationalStore, SchemaCatalog, SqlValue};
use anneal::{AnnealError, Result};

#[derive(Default)]
pub struct MockStore {
    /// Every single-statement execution, in order.
    pub executed: Vec<String>,
    /// Every batch execution: statement plus bind rows.
    pub batches: Vec<(String, Vec<Vec<SqlValue>>)>,
    /// Table catalog, by table name.
    pub tables: HashMap<String, Vec<ColumnDescriptor>>,
    /// Upserted rows: table -> id -> column -> value.
    pub rows: HashMap<String, IndexMap<String, HashMap<String, SqlValue>>>,
    /// Fail the nth batch execution (0-based) when set.
    pub fail_batch_at: Option<usize>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements executed so far (single statements only, not batches).
    pub fn ddl_count(&self) -> usize {
        self.executed.len()
    }

    pub fn row(&self, table: &str, id: &str) -> Option<&HashMap<String, SqlValue>> {
        self.rows.get(table)?.get(id)
    }

    fn apply_create_table(&mut self, sql: &str) {
        // CREATE TABLE <name> (<col def>, <col def>, ...)
        let rest = sql.strip_prefix("CREATE TABLE ").unwrap();
        let open = rest.find('(').unwrap();
        let table = rest[..open].trim().to_string();
        let defs = &rest[open + 1..rest.rfind(')').unwrap()];

        let columns = defs
            .split(", ")
            .map(|def| {
                let def = def.trim().trim_end_matches(" PRIMARY KEY");
                let (name, sql_type) = def.split_once(' ').unwrap();
                ColumnDescriptor::new(name, sql_type)
            })
            .collect();
        self.tables.insert(table, columns);
    }

    fn apply_alter(&mut self, sql: &str) {
        let rest = sql.strip_prefix("ALTER TABLE ").unwrap();
        if rest.contains("ROW_FORMAT=DYNAMIC") {
            return;
        }
        if let Some((table, def)) = rest.split_once(" ADD COLUMN ") {
            let (name, sql_type) = def.split_once(' ').unwrap();
            self.tables
                .get_mut(table)
                .expect("ALTER on unknown table")
                .push(ColumnDescriptor::new(name, sql_type));
        } else if let Some((table, def)) = rest.split_once(" MODIFY ") {
            let (name, sql_type) = def.split_once(' ').unwrap();
            let columns = self.tables.get_mut(table).expect("MODIFY on unknown table");
            if let Some(col) = columns.iter_mut().find(|c| c.name == name) {
                *col = ColumnDescriptor::new(name, sql_type);
            }
        }
    }
}

impl RelationalStore for MockStore {
    fn execute(&mut self, sql: &str) -> Result<usize> {
        self.executed.push(sql.to_string());
        if sql.starts_with("CREATE TABLE ") {
            self.apply_create_table(sql);
        } else if sql.starts_with("ALTER TABLE ") {
            self.apply_alter(sql);
        }
        Ok(0)
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<usize> {
        if self.fail_batch_at == Some(self.batches.len()) {
            return Err(AnnealError::Storage("injected batch failure".to_string()));
        }
        self.batches.push((sql.to_string(), rows.to_vec()));

        // INSERT INTO <table> (<cols>) VALUES ...
        let rest = sql.strip_prefix("INSERT INTO ").unwrap();
        let open = rest.find('(').unwrap();
        let table = rest[..open].trim().to_string();
        let close = rest.find(')').unwrap();
        let columns: Vec<String> = rest[open + 1..close]
            .split(", ")
            .map(str::to_string)
            .collect();

        let stored = self.rows.entry(table).or_default();
        for row in rows {
            let id = match &row[0] {
                SqlValue::Text(id) => id.clone(),
                other => panic!("first bind should be the record id, got {other:?}"),
            };
            let entry = stored.entry(id).or_default();
            for (column, value) in columns.iter().zip(row) {
                entry.insert(column.clone(), value.clone());
            }
        }
        Ok(rows.len())
    }
}

impl SchemaCatalog for MockStore {
    fn columns_of(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}
