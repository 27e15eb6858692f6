use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::{
    db::{self, AppState},
    error::{LogViewError, LogViewResult},
    models::{EmailQuery, ExportQuery, LogRecord, PageQuery, SearchQuery},
    query::{self, Dimension, PageParams},
    render,
};

pub const SERVICE_NAME: &str = "presence-log-view";

/// JSON body of the list endpoints. `null` means the retrieval failed.
type LogList = Json<Option<Vec<LogRecord>>>;

/// A query string axum could not decode (e.g. a repeated key) degrades
/// like any other bad parameter instead of answering 400.
type QueryParams<T> = Result<Query<T>, QueryRejection>;

fn accept<T>(params: QueryParams<T>) -> LogViewResult<T> {
    params
        .map(|Query(q)| q)
        .map_err(|e| LogViewError::MalformedQuery(e.body_text()))
}

pub async fn service_name() -> &'static str {
    SERVICE_NAME
}

pub async fn health_checker(State(state): State<Arc<AppState>>) -> String {
    format!("Awake and alive from {}", state.host_name)
}

pub async fn latest_logs(
    State(state): State<Arc<AppState>>,
    params: QueryParams<PageQuery>,
) -> LogList {
    let request =
        accept(params).and_then(|page| Ok((Dimension::Latest, PageParams::from_query(&page)?)));
    list(&state, "latest", request).await
}

pub async fn search_course(
    State(state): State<Arc<AppState>>,
    params: QueryParams<SearchQuery>,
) -> LogList {
    let request = accept(params).and_then(|q| {
        let dimension = Dimension::Course(query::required("id", q.id)?);
        Ok((dimension, PageParams::from_query(&q.page)?))
    });
    list(&state, "course", request).await
}

pub async fn search_class(
    State(state): State<Arc<AppState>>,
    params: QueryParams<SearchQuery>,
) -> LogList {
    let request = accept(params).and_then(|q| {
        let dimension = Dimension::Class(query::required("id", q.id)?);
        Ok((dimension, PageParams::from_query(&q.page)?))
    });
    list(&state, "class", request).await
}

pub async fn search_room(
    State(state): State<Arc<AppState>>,
    params: QueryParams<SearchQuery>,
) -> LogList {
    let request = accept(params).and_then(|q| {
        let dimension = Dimension::Room(query::required("id", q.id)?);
        Ok((dimension, PageParams::from_query(&q.page)?))
    });
    list(&state, "room", request).await
}

pub async fn search_student(
    State(state): State<Arc<AppState>>,
    params: QueryParams<EmailQuery>,
) -> LogList {
    let request = accept(params).and_then(|q| {
        let dimension = Dimension::Student(query::required("email", q.email)?);
        Ok((dimension, PageParams::from_query(&q.page)?))
    });
    list(&state, "student", request).await
}

/// GET /v1/csv?ts=...
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    params: QueryParams<ExportQuery>,
) -> impl IntoResponse {
    let tz = state.config.timezone;
    let filename = render::csv_filename(chrono::Utc::now().with_timezone(&tz));

    let since = accept(params).and_then(|q| query::required("ts", q.ts));
    let result = match since {
        Ok(ts) => {
            let filter = Dimension::Since(ts).filter();
            db::find_logs(state.store.as_ref(), tz, &filter, PageParams::UNBOUNDED).await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        tracing::info!(operation = "export", error = %e, "[server] failed to get logs");
    }

    match render::render_csv(&result) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", filename),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "[server] failed to write csv");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn list(
    state: &AppState,
    operation: &'static str,
    request: LogViewResult<(Dimension, PageParams)>,
) -> LogList {
    let result = match request {
        Ok((dimension, params)) => {
            db::find_logs(
                state.store.as_ref(),
                state.config.timezone,
                &dimension.filter(),
                params,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(records) => Json(Some(records)),
        Err(e) => {
            tracing::info!(operation, error = %e, "[server] failed to get logs");
            Json(None)
        }
    }
}
