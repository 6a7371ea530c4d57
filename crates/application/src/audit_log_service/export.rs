use fieldtrack_core::{AppError, AppResult};
use fieldtrack_domain::AuditLogEntry;

/// CSV header row of an audit export.
pub const AUDIT_EXPORT_HEADER: [&str; 7] = [
    "Timestamp",
    "User",
    "Action",
    "Target",
    "Details",
    "Latitude",
    "Longitude",
];

const ANONYMOUS_ACTOR: &str = "System/Client";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Rendered audit log export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditExport {
    /// Suggested download file name.
    pub filename: String,
    /// CSV document.
    pub content: String,
}

pub(super) fn render_csv(project_name: &str, entries: &[AuditLogEntry]) -> AppResult<AuditExport> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(AUDIT_EXPORT_HEADER)
        .map_err(|error| AppError::Internal(format!("failed to write audit header: {error}")))?;

    for entry in entries {
        let (latitude, longitude) = entry
            .gps
            .map(|gps| {
                (
                    format!("{:.6}", gps.latitude()),
                    format!("{:.6}", gps.longitude()),
                )
            })
            .unwrap_or_default();

        writer
            .write_record([
                entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
                entry
                    .actor
                    .as_ref()
                    .map_or_else(|| ANONYMOUS_ACTOR.to_owned(), |actor| actor.username.clone()),
                entry.action.to_string(),
                entry.target.clone(),
                entry.details.clone(),
                latitude,
                longitude,
            ])
            .map_err(|error| AppError::Internal(format!("failed to write audit row: {error}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| AppError::Internal(format!("failed to flush audit export: {error}")))?;
    let content = String::from_utf8(bytes)
        .map_err(|error| AppError::Internal(format!("audit export is not utf-8: {error}")))?;

    Ok(AuditExport {
        filename: format!("{}_logs.csv", project_name.replace(' ', "_")),
        content,
    })
}
