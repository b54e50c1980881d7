//! Diesel-backed MySQL store with r2d2 connection pooling.

use std::time::Duration;

use diesel::mysql::{Mysql, MysqlConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Double, Nullable, Text, Timestamp};

use crate::error::{AnnealError, Result};

use super::store::{ColumnDescriptor, RelationalStore, SchemaCatalog, SqlValue};

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct MysqlStoreConfig {
    pub max_connections: u32,
    pub min_idle: u32,
    pub connection_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl Default for MysqlStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: 15,
            min_idle: 5,
            connection_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

/// A pooled MySQL store implementing both storage collaborator traits.
pub struct MysqlStore {
    pool: Pool<ConnectionManager<MysqlConnection>>,
}

impl MysqlStore {
    /// Connect with default pool settings.
    pub fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_config(database_url, MysqlStoreConfig::default())
    }

    /// Connect with custom pool settings.
    pub fn connect_with_config(database_url: &str, config: MysqlStoreConfig) -> Result<Self> {
        let manager = ConnectionManager::<MysqlConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_idle))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .max_lifetime(Some(Duration::from_secs(config.max_lifetime_secs)))
            .build(manager)
            .map_err(|err| AnnealError::Storage(err.to_string()))?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<MysqlConnection>>> {
        self.pool
            .get()
            .map_err(|err| AnnealError::Storage(err.to_string()))
    }
}

impl RelationalStore for MysqlStore {
    fn execute(&mut self, sql: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        sql_query(sql)
            .execute(&mut conn)
            .map_err(|err| AnnealError::Storage(err.to_string()))
    }

    fn execute_batch(&mut self, sql: &str, rows: &[Vec<SqlValue>]) -> Result<usize> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let mut total = 0;
            for row in rows {
                let mut query = sql_query(sql).into_boxed::<Mysql>();
                for value in row {
                    query = match value {
                        SqlValue::Null => query.bind::<Nullable<Text>, _>(None::<String>),
                        SqlValue::Int(v) => query.bind::<Nullable<BigInt>, _>(Some(*v)),
                        SqlValue::Double(v) => query.bind::<Nullable<Double>, _>(Some(*v)),
                        SqlValue::Bool(v) => query.bind::<Nullable<Bool>, _>(Some(*v)),
                        SqlValue::Text(s) => query.bind::<Nullable<Text>, _>(Some(s.clone())),
                        SqlValue::Timestamp(t) => query.bind::<Nullable<Timestamp>, _>(Some(*t)),
                    };
                }
                total += query.execute(conn)?;
            }
            Ok(total)
        })
        .map_err(|err: diesel::result::Error| AnnealError::Storage(err.to_string()))
    }
}

#[derive(QueryableByName)]
struct CatalogRow {
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    column_type: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    character_maximum_length: Option<i64>,
}

impl SchemaCatalog for MysqlStore {
    fn columns_of(&mut self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let statement = "SELECT column_name, column_type, character_maximum_length \
                         FROM information_schema.columns \
                         WHERE table_schema = DATABASE() AND table_name = ? \
                         ORDER BY ordinal_position";
        let mut conn = self.conn()?;
        let rows: Vec<CatalogRow> = sql_query(statement)
            .bind::<Text, _>(table)
            .load(&mut conn)
            .map_err(|err| AnnealError::SchemaIntrospection {
                statement: statement.to_string(),
                message: err.to_string(),
            })?;

        Ok(rows
            .into_iter()
            .map(|row| ColumnDescriptor {
                name: row.column_name,
                sql_type: row.column_type,
                char_width: row
                    .character_maximum_length
                    .and_then(|v| u64::try_from(v).ok()),
            })
            .collect())
    }
}
