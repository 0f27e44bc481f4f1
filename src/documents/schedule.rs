use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{DocumentContext, Orientation, TableDocument};
use crate::alerts::AlertSink;
use crate::client::ExamApi;
use crate::error::AppError;
use crate::models::{ExamRow, MonitoringPlanningItem};

pub const SCHEDULE_TITLE: &str = "Exam Schedule";
pub const SCHEDULE_FILE_NAME: &str = "exam-schedule.pdf";
pub const MONITORING_FILE_NAME: &str = "monitoring-planning.pdf";

pub const SCHEDULE_HEADERS: [&str; 10] = [
    "Level",
    "Specialty",
    "Semester",
    "Section",
    "Date",
    "Time",
    "Exam Room",
    "Module Name",
    "Module Abbr.",
    "Nbr SE",
];

pub const MONITORING_HEADERS: [&str; 8] = [
    "Teacher", "Module", "Room", "Date", "Time", "Level", "Specialty", "Role",
];

fn schedule_cells(row: &ExamRow) -> Vec<String> {
    vec![
        row.level.clone(),
        row.specialty.clone(),
        row.semester.clone(),
        row.section.clone(),
        row.date.clone(),
        row.time.clone(),
        row.exam_room.clone(),
        row.module_name.clone(),
        row.module_abbreviation.clone(),
        row.nbr_se.clone(),
    ]
}

/// Every exam, landscape, ten columns.
pub fn schedule_document(rows: &[ExamRow], ctx: &DocumentContext) -> TableDocument {
    let mut doc = TableDocument::new(
        Orientation::Landscape,
        ctx,
        SCHEDULE_TITLE,
        &SCHEDULE_HEADERS,
        "This is an official document. Please keep it for your records.",
    );
    doc.rows = rows.iter().map(schedule_cells).collect();
    doc
}

/// Exams of one level with the level column dropped; `None` when no row
/// matches. Levels compare case-insensitively.
pub fn level_schedule_document(
    rows: &[ExamRow],
    level: &str,
    ctx: &DocumentContext,
) -> Option<TableDocument> {
    let wanted = level.trim().to_lowercase();
    let matching: Vec<Vec<String>> = rows
        .iter()
        .filter(|r| r.level.trim().to_lowercase() == wanted)
        .map(|r| schedule_cells(r).into_iter().skip(1).collect())
        .collect();
    if matching.is_empty() {
        return None;
    }

    let mut doc = TableDocument::new(
        Orientation::Landscape,
        ctx,
        format!("{} - {}", SCHEDULE_TITLE, level.trim()),
        &SCHEDULE_HEADERS[1..],
        format!("{} Exam Schedule - Official Document", level.trim()),
    );
    doc.rows = matching;
    Some(doc)
}

/// Sorted distinct non-empty levels.
pub fn unique_levels(rows: &[ExamRow]) -> Vec<String> {
    rows.iter()
        .map(|r| r.level.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// `exam-schedule-master-1.pdf` for level "Master 1".
pub fn level_file_name(level: &str) -> String {
    let slug = level
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("exam-schedule-{}.pdf", slug)
}

pub fn generate_schedule(
    rows: &[ExamRow],
    ctx: &DocumentContext,
    out_dir: &Path,
) -> Result<PathBuf, AppError> {
    let path = out_dir.join(SCHEDULE_FILE_NAME);
    schedule_document(rows, ctx).save(&path)?;
    Ok(path)
}

/// Writes the per-level schedule. With no matching exam nothing is written,
/// the user is alerted and `Ok(None)` is returned.
pub fn generate_level_schedule(
    rows: &[ExamRow],
    level: &str,
    ctx: &DocumentContext,
    out_dir: &Path,
    alerts: &dyn AlertSink,
) -> Result<Option<PathBuf>, AppError> {
    let Some(doc) = level_schedule_document(rows, level, ctx) else {
        warn!("No exams for level {}", level);
        alerts.alert(&format!("No exams found for level: {}", level));
        return Ok(None);
    };
    let path = out_dir.join(level_file_name(level));
    doc.save(&path)?;
    Ok(Some(path))
}

pub fn monitoring_document(items: &[MonitoringPlanningItem], ctx: &DocumentContext) -> TableDocument {
    let mut doc = TableDocument::new(
        Orientation::Portrait,
        ctx,
        "Monitoring Planning",
        &MONITORING_HEADERS,
        "Monitoring Planning - Official Document",
    );
    doc.rows = if items.is_empty() {
        let mut placeholder = vec!["No monitoring data available".to_string()];
        placeholder.resize(MONITORING_HEADERS.len(), "-".to_string());
        vec![placeholder]
    } else {
        items
            .iter()
            .map(|item| {
                vec![
                    item.teacher_name.clone(),
                    item.module.clone(),
                    item.room.clone(),
                    item.date.clone(),
                    item.time.clone(),
                    item.level.clone(),
                    item.specialty.clone(),
                    item.role.as_str().to_string(),
                ]
            })
            .collect()
    };
    doc
}

/// Minimal document written when the monitoring data cannot be fetched.
pub fn monitoring_fallback_document(ctx: &DocumentContext) -> TableDocument {
    let mut doc = TableDocument::new(
        Orientation::Portrait,
        ctx,
        "Monitoring Planning",
        &[],
        "Monitoring Planning - Official Document",
    );
    doc.details = vec![
        "Error generating monitoring planning".to_string(),
        "Please check your connection and try again".to_string(),
    ];
    doc
}

/// Fetches the monitoring plan and writes it. When the fetch fails a fallback
/// document is still written and `Ok(false)` is returned.
pub async fn generate_monitoring(
    exams: &dyn ExamApi,
    ctx: &DocumentContext,
    out_dir: &Path,
    alerts: &dyn AlertSink,
) -> Result<bool, AppError> {
    let path = out_dir.join(MONITORING_FILE_NAME);
    match exams.monitoring_planning().await {
        Ok(items) => {
            info!("Writing monitoring planning with {} duties", items.len());
            monitoring_document(&items, ctx).save(&path)?;
            Ok(true)
        }
        Err(e) => {
            warn!("Monitoring data unavailable: {}", e);
            monitoring_fallback_document(ctx).save(&path)?;
            alerts.alert(&format!("Error generating monitoring planning: {}", e));
            Ok(false)
        }
    }
}
