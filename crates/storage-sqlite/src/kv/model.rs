//! Database model for key-value entries.

use diesel::prelude::*;

/// One row of the `kv_store` table
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::kv_store)]
pub struct KvEntryDB {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

impl KvEntryDB {
    pub fn new(key: impl Into<String>, value: impl Into<String>, updated_at: &str) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: updated_at.to_string(),
        }
    }
}
