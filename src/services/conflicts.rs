use tracing::{info, warn};

use crate::client::ExamApi;
use crate::error::AppError;
use crate::models::{ConflictReport, WorkloadResponse};

/// Outcome of each check; one failing check does not stop the others.
#[derive(Debug)]
pub struct CheckAllReport {
    pub exam_dates: Result<ConflictReport, AppError>,
    pub teacher_schedules: Result<ConflictReport, AppError>,
    pub workload: Result<WorkloadResponse, AppError>,
}

impl CheckAllReport {
    pub fn has_failures(&self) -> bool {
        self.exam_dates.is_err() || self.teacher_schedules.is_err() || self.workload.is_err()
    }

    pub fn conflict_count(&self) -> usize {
        [&self.exam_dates, &self.teacher_schedules]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.conflicts.len())
            .sum()
    }
}

/// Runs the date check, the teacher schedule check and the workload check
/// one after another.
pub async fn check_all(exams: &dyn ExamApi, target_surveillances: Option<u32>) -> CheckAllReport {
    info!("Running all planning checks");

    let exam_dates = exams.check_exam_date().await;
    log_outcome("exam date", &exam_dates);

    let teacher_schedules = exams.check_teacher_schedule_conflict().await;
    log_outcome("teacher schedule", &teacher_schedules);

    let workload = exams.check_surveillance_workload(target_surveillances).await;
    if let Err(e) = &workload {
        warn!("Workload check failed: {}", e);
    }

    CheckAllReport {
        exam_dates,
        teacher_schedules,
        workload,
    }
}

fn log_outcome(name: &str, outcome: &Result<ConflictReport, AppError>) {
    match outcome {
        Ok(report) if report.is_clear() => info!("No {} conflicts", name),
        Ok(report) => warn!("{} {} conflicts found", report.conflicts.len(), name),
        Err(e) => warn!("{} check failed: {}", name, e),
    }
}
