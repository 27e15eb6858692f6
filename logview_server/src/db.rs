use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use futures::TryStreamExt;
use mongodb::{
    error::ErrorKind,
    options::{ClientOptions, FindOptions},
    Client, Collection,
};

use crate::config::Config;
use crate::error::{LogViewError, LogViewResult};
use crate::models::LogRecord;
use crate::query::{self, Filter, PageParams, Window};
use crate::render;

/// Only deadline on store access: establishing the connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of log records. Every request gets its own connection.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn connect(&self) -> LogViewResult<Box<dyn LogConnection>>;
}

/// A single open connection to the record collection.
#[async_trait]
pub trait LogConnection: Send + Sync {
    async fn count(&self, filter: &Filter) -> LogViewResult<u64>;

    /// Sorted by `timestamp` descending, ties in insertion order.
    async fn find(&self, filter: &Filter, window: Window) -> LogViewResult<Vec<LogRecord>>;

    async fn close(self: Box<Self>);
}

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn LogStore>,
    pub host_name: String,
}

/// MongoDB backed store, no pooling across requests.
pub struct MongoStore {
    uri: String,
    database: String,
    collection: String,
}

impl MongoStore {
    pub fn new(config: &Config) -> Self {
        MongoStore {
            uri: config.mongo_uri.clone(),
            database: config.database.clone(),
            collection: config.collection.clone(),
        }
    }
}

#[async_trait]
impl LogStore for MongoStore {
    async fn connect(&self) -> LogViewResult<Box<dyn LogConnection>> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| LogViewError::store("connect", e))?;
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options).map_err(|e| LogViewError::store("connect", e))?;
        let collection = client
            .database(&self.database)
            .collection::<LogRecord>(&self.collection);

        tracing::debug!("[db] connection to mongodb opened");
        Ok(Box::new(MongoConnection { client, collection }))
    }
}

struct MongoConnection {
    client: Client,
    collection: Collection<LogRecord>,
}

#[async_trait]
impl LogConnection for MongoConnection {
    async fn count(&self, filter: &Filter) -> LogViewResult<u64> {
        self.collection
            .count_documents(filter.to_document(), None)
            .await
            .map_err(|e| LogViewError::store("count", e))
    }

    async fn find(&self, filter: &Filter, window: Window) -> LogViewResult<Vec<LogRecord>> {
        let options = FindOptions::builder()
            .sort(query::sort_document())
            .skip(window.skip)
            .limit(window.limit)
            .build();

        let cursor = self
            .collection
            .find(filter.to_document(), options)
            .await
            .map_err(|e| LogViewError::store("find", e))?;

        cursor.try_collect().await.map_err(|e| {
            if let ErrorKind::BsonDeserialization(de) = e.kind.as_ref() {
                return LogViewError::DecodeFailure(de.to_string());
            }
            LogViewError::store("find", e)
        })
    }

    async fn close(self: Box<Self>) {
        self.client.shutdown().await;
        tracing::debug!("[db] connection to mongodb closed");
    }
}

/// Counts, clamps the window, reads the page and localizes timestamps.
pub async fn find_logs(
    store: &dyn LogStore,
    tz: Tz,
    filter: &Filter,
    params: PageParams,
) -> LogViewResult<Vec<LogRecord>> {
    let conn = store.connect().await?;
    let result = read_page(conn.as_ref(), filter, params).await;
    conn.close().await;

    let mut records = result?;
    for record in &mut records {
        render::localize_record(record, tz);
    }
    tracing::debug!(rows = records.len(), "[db] data retrieved");
    Ok(records)
}

async fn read_page(
    conn: &dyn LogConnection,
    filter: &Filter,
    params: PageParams,
) -> LogViewResult<Vec<LogRecord>> {
    let total = conn.count(filter).await?;
    let window = params.window(total);
    tracing::debug!(
        total,
        limit = ?window.limit,
        skip = window.skip,
        "[db] dataset window"
    );
    conn.find(filter, window).await
}
