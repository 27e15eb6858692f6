//! Turns request parameters into a store filter and a result window.

use mongodb::bson::{doc, Document};

use crate::error::{LogViewError, LogViewResult};
use crate::models::PageQuery;

/// Page length used when the caller asks for a negative (or no) size.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// What a request searches on. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    Latest,
    Course(String),
    Class(String),
    Room(String),
    Student(String),
    /// Records with `timestamp >= value`, used by the export.
    Since(String),
}

/// Store-level predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Case-insensitive regular expression on a single field.
    Matches { field: &'static str, pattern: String },
    Since(String),
}

impl Dimension {
    pub fn filter(&self) -> Filter {
        let matches = |field, pattern: &String| Filter::Matches {
            field,
            pattern: pattern.clone(),
        };
        match self {
            Dimension::Latest => Filter::All,
            Dimension::Course(p) => matches("course", p),
            Dimension::Class(p) => matches("class", p),
            Dimension::Room(p) => matches("room", p),
            Dimension::Student(p) => matches("email", p),
            Dimension::Since(ts) => Filter::Since(ts.clone()),
        }
    }
}

impl Filter {
    pub fn to_document(&self) -> Document {
        match self {
            Filter::All => Document::new(),
            Filter::Matches { field, pattern } => doc! {
                *field: { "$regex": pattern.as_str(), "$options": "i" }
            },
            Filter::Since(ts) => doc! { "timestamp": { "$gte": ts.as_str() } },
        }
    }
}

/// Newest first. `_id` breaks timestamp ties in insertion order, so pages
/// never overlap.
pub fn sort_document() -> Document {
    doc! { "timestamp": -1, "_id": 1 }
}

/// Raw pagination request, validated but not yet clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub size: i64,
    pub skip: i64,
}

impl PageParams {
    /// Export reads everything that matches.
    pub const UNBOUNDED: PageParams = PageParams { size: 0, skip: 0 };

    pub fn parse(size: Option<&str>, skip: Option<&str>) -> LogViewResult<Self> {
        Ok(PageParams {
            size: parse_param("size", size, -1)?,
            skip: parse_param("skip", skip, 0)?,
        })
    }

    pub fn from_query(query: &PageQuery) -> LogViewResult<Self> {
        Self::parse(query.size.as_deref(), query.skip.as_deref())
    }

    /// Clamps against the number of matching records.
    pub fn window(&self, total: u64) -> Window {
        let skip = if self.skip < 0 {
            0
        } else {
            (self.skip as u64).min(total)
        };
        let limit = match self.size {
            s if s < 0 => Some(DEFAULT_PAGE_SIZE),
            0 => None,
            s => Some(s),
        };
        Window { limit, skip }
    }
}

fn parse_param(name: &'static str, raw: Option<&str>, default: i64) -> LogViewResult<i64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .map_err(|source| LogViewError::InvalidParameter {
                name,
                value: value.to_string(),
                source,
            }),
    }
}

/// Slice of the sorted result set handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// `None` reads to the end.
    pub limit: Option<i64>,
    pub skip: u64,
}

/// Requires the dimension value to be present.
pub fn required(name: &'static str, value: Option<String>) -> LogViewResult<String> {
    value.ok_or(LogViewError::MissingParameter(name))
}
