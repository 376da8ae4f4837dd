//! RedisJSON-backed document store.
//!
//! Documents live at `prefix:collection:id` as JSON values. Scanning uses
//! cursor-based `SCAN` so the keyspace is never blocked; updates go through
//! `JSON.SET` / `JSON.DEL` on the staged paths only, which is what makes a
//! write a partial merge rather than a full-document overwrite.

use log::warn;
use redis::aio::ConnectionManager;
use serde_json::Value;

use crate::document::{Document, FieldUpdate, UpdateSet};
use crate::errors::MigrateError;
use crate::paths::FieldPath;
use crate::store::DocumentStore;

const SCAN_COUNT: usize = 100;

pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Open a client and wrap the connection in a reconnecting manager.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, MigrateError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn, prefix))
    }

    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    fn document_key(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, id)
    }

    fn json_path(path: &FieldPath) -> String {
        format!("$.{path}")
    }
}

fn id_from_key(key: &str) -> String {
    key.rsplit(':').next().unwrap_or(key).to_string()
}

impl DocumentStore for RedisStore {
    async fn scan_documents(&mut self, collection: &str) -> Result<Vec<Document>, MigrateError> {
        let pattern = format!("{}:{}:*", self.prefix, collection);
        let mut documents = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut self.conn)
                .await?;

            for key in keys {
                let payload: Option<String> = redis::cmd("JSON.GET")
                    .arg(&key)
                    .arg("$")
                    .query_async(&mut self.conn)
                    .await?;

                // key expired or was deleted between SCAN and GET
                let Some(json) = payload else { continue };

                // JSON.GET with a $ path wraps the document in a one-element array
                let parsed = serde_json::from_str::<Vec<Value>>(&json)
                    .map(|values| values.into_iter().next());
                match parsed {
                    Ok(Some(Value::Object(fields))) => {
                        documents.push(Document::new(id_from_key(&key), fields));
                    }
                    _ => warn!("skipping '{key}': not a JSON document"),
                }
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(documents)
    }

    async fn apply_updates(
        &mut self,
        collection: &str,
        id: &str,
        updates: &UpdateSet,
    ) -> Result<(), MigrateError> {
        let key = self.document_key(collection, id);

        for (path, update) in updates {
            match update {
                FieldUpdate::Set(value) => {
                    let json = serde_json::to_string(value).map_err(|err| MigrateError::Other {
                        message: format!("failed to serialize value for '{path}': {err}").into(),
                    })?;
                    let _: () = redis::cmd("JSON.SET")
                        .arg(&key)
                        .arg(Self::json_path(path))
                        .arg(json)
                        .query_async(&mut self.conn)
                        .await?;
                }
                FieldUpdate::Delete => {
                    let _: i64 = redis::cmd("JSON.DEL")
                        .arg(&key)
                        .arg(Self::json_path(path))
                        .query_async(&mut self.conn)
                        .await?;
                }
            }
        }

        Ok(())
    }
}
