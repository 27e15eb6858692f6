use serde::{Deserialize, Serialize};

/// One presence event as written by the ingestion service.
///
/// `timestamp` is stored as an RFC3339 string and is rewritten into the
/// configured timezone before leaving this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub room: String,
    pub course: String,
    #[serde(rename = "class")]
    pub class_id: String,
    pub student: String,
    #[serde(rename = "participantId")]
    pub participant_id: String,
    pub email: String,
    pub timestamp: String,
    pub action: String, // join, leave, ...
}

impl LogRecord {
    /// Column values in export order, see [`crate::render::CSV_HEADER`].
    pub fn csv_row(&self) -> [&str; 8] {
        [
            &self.room,
            &self.course,
            &self.class_id,
            &self.student,
            &self.participant_id,
            &self.email,
            &self.timestamp,
            &self.action,
        ]
    }
}

/// `size` / `skip` as they arrive on the list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub size: Option<String>,
    pub skip: Option<String>,
}

/// Course, class and room searches (`?id=...`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub id: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Student search (`?email=...`).
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// CSV export (`?ts=...`).
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub ts: Option<String>,
}
