//! Timestamp localization and CSV export.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::{LogViewError, LogViewResult};
use crate::models::LogRecord;

/// Replaces timestamps that are not valid RFC3339.
pub const TIMESTAMP_ERROR_MARKER: &str = "Falha no parser";

pub const CSV_HEADER: [&str; 8] = [
    "sala", "curso", "turma", "aluno", "jid", "email", "timestamp", "action",
];

pub const CSV_ERROR_PREFIX: &str = "Ocorreu um erro ao realizar a requisição";

pub const CSV_FILENAME_PREFIX: &str = "presence-log";

/// e.g. `2021-05-01 10:00:00 -0300 -03`
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z %Z";

pub fn localize(timestamp: &str, tz: Tz) -> LogViewResult<String> {
    let parsed =
        DateTime::parse_from_rfc3339(timestamp).map_err(|source| LogViewError::TimestampParse {
            value: timestamp.to_string(),
            source,
        })?;
    Ok(parsed.with_timezone(&tz).format(DISPLAY_FORMAT).to_string())
}

/// Rewrites the record timestamp in place, falling back to the marker.
pub fn localize_record(record: &mut LogRecord, tz: Tz) {
    record.timestamp = match localize(&record.timestamp, tz) {
        Ok(local) => local,
        Err(e) => {
            tracing::info!(error = %e, "failed to parse record timestamp");
            TIMESTAMP_ERROR_MARKER.to_string()
        }
    };
}

/// Semicolon separated export. A failed retrieval becomes a single error row.
pub fn render_csv(result: &LogViewResult<Vec<LogRecord>>) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_writer(Vec::new());

    match result {
        Ok(records) => {
            writer.write_record(CSV_HEADER)?;
            for record in records {
                writer.write_record(record.csv_row())?;
            }
        }
        Err(e) => {
            let message = e.to_string();
            writer.write_record([CSV_ERROR_PREFIX, message.as_str()])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

pub fn csv_filename(now: DateTime<Tz>) -> String {
    format!(
        "{}.{}.csv",
        CSV_FILENAME_PREFIX,
        now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}
