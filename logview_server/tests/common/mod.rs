use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use regex::RegexBuilder;
use std::sync::Arc;
use tower::ServiceExt;

use logview_server::query::{Filter, Window};
use logview_server::{app, AppState, Config, LogConnection, LogRecord, LogStore, LogViewError};

/// In-memory collection mirroring the Mongo semantics the service relies on.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Vec<LogRecord>,
    fail_on: Option<&'static str>,
}

impl MemoryStore {
    pub fn new(records: Vec<LogRecord>) -> Self {
        MemoryStore {
            records,
            fail_on: None,
        }
    }

    /// Every call to `operation` ("connect", "count" or "find") fails.
    pub fn failing(operation: &'static str) -> Self {
        MemoryStore {
            records: Vec::new(),
            fail_on: Some(operation),
        }
    }

    fn check(fail_on: Option<&'static str>, operation: &'static str) -> Result<(), LogViewError> {
        if fail_on == Some(operation) {
            return Err(LogViewError::store(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn LogConnection>, LogViewError> {
        Self::check(self.fail_on, "connect")?;
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl LogConnection for MemoryStore {
    async fn count(&self, filter: &Filter) -> Result<u64, LogViewError> {
        Self::check(self.fail_on, "count")?;
        Ok(self.matching(filter)?.len() as u64)
    }

    async fn find(&self, filter: &Filter, window: Window) -> Result<Vec<LogRecord>, LogViewError> {
        Self::check(self.fail_on, "find")?;
        let mut found = self.matching(filter)?;
        // stable sort: ties keep insertion order, like the `_id` tiebreak in Mongo
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let limit = window.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(found
            .into_iter()
            .skip(window.skip as usize)
            .take(limit)
            .collect())
    }

    async fn close(self: Box<Self>) {}
}

impl MemoryStore {
    fn matching(&self, filter: &Filter) -> Result<Vec<LogRecord>, LogViewError> {
        let pattern = match filter {
            Filter::Matches { pattern, .. } => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| LogViewError::store("find", e))?,
            ),
            _ => None,
        };

        Ok(self
            .records
            .iter()
            .filter(|r| match (filter, &pattern) {
                (Filter::All, _) => true,
                (Filter::Since(ts), _) => r.timestamp.as_str() >= ts.as_str(),
                (Filter::Matches { field, .. }, Some(re)) => re.is_match(field_value(r, field)),
                (Filter::Matches { .. }, None) => false,
            })
            .cloned()
            .collect())
    }
}

fn field_value<'a>(record: &'a LogRecord, field: &str) -> &'a str {
    match field {
        "room" => &record.room,
        "course" => &record.course,
        "class" => &record.class_id,
        "email" => &record.email,
        _ => "",
    }
}

pub fn record(course: &str, email: &str, timestamp: &str) -> LogRecord {
    LogRecord {
        room: format!("room-{}", course),
        course: course.to_string(),
        class_id: "turma-a".to_string(),
        student: "Ana".to_string(),
        participant_id: format!("{}/meet", email),
        email: email.to_string(),
        timestamp: timestamp.to_string(),
        action: "join".to_string(),
    }
}

pub fn test_app(store: MemoryStore) -> Router {
    let config = Config::from_lookup(|_| None).expect("default config");
    app(Arc::new(AppState {
        config,
        store: Arc::new(store),
        host_name: "test-host".to_string(),
    }))
}

pub struct TestResponse {
    pub status: u16,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).expect("utf8 body"),
    }
}
