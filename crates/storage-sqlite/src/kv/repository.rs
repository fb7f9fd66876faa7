use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use log::debug;
use std::sync::Arc;

use super::model::KvEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::kv_store;
use quotebook_core::errors::Result;
use quotebook_core::storage::KeyValueStore;

/// SQLite-backed [`KeyValueStore`].
///
/// Reads use a pooled connection; writes go through the single writer so
/// `set_many` lands in one transaction.
pub struct SqliteKeyValueStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteKeyValueStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SqliteKeyValueStore { pool, writer }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key_param: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        kv_store::table
            .find(key_param)
            .select(kv_store::value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }

    async fn set(&self, key_param: &str, value_param: &str) -> Result<()> {
        let entry = KvEntryDB::new(key_param, value_param, &Utc::now().to_rfc3339());
        self.writer
            .exec(move |conn| {
                diesel::replace_into(kv_store::table)
                    .values(&entry)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let rows: Vec<KvEntryDB> = entries
            .iter()
            .map(|(k, v)| KvEntryDB::new(k.as_str(), v.as_str(), &now))
            .collect();
        debug!("Writing {} keys in one transaction", rows.len());

        self.writer
            .exec(move |conn| {
                for row in &rows {
                    diesel::replace_into(kv_store::table)
                        .values(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    async fn remove(&self, key_param: &str) -> Result<()> {
        let key_owned = key_param.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(kv_store::table.find(key_owned))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
