use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTeacherInfo {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadStatistics {
    #[serde(default)]
    pub surveillance_count: u32,
    #[serde(default)]
    pub courses_count: u32,
    #[serde(default)]
    pub average_surveillances: f64,
    #[serde(default)]
    pub target_surveillances: Option<f64>,
    #[serde(default)]
    pub deviation: f64,
    #[serde(default)]
    pub deviation_percentage: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub severity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadTeacherAnalysis {
    pub teacher_info: WorkloadTeacherInfo,
    pub statistics: WorkloadStatistics,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalMetrics {
    #[serde(default)]
    pub total_charges_enseignement: u32,
    #[serde(default)]
    pub total_plannings: u32,
    #[serde(default)]
    pub total_surveillances: Option<u32>,
    /// Either a number or the string "N/A".
    #[serde(default)]
    pub global_nbrss: Value,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub target_surveillances: Option<f64>,
    #[serde(default)]
    pub surveillance_gap: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherDistribution {
    #[serde(default)]
    pub total_teachers: u32,
    #[serde(default)]
    pub total_surveillances: u32,
    #[serde(default)]
    pub average_per_teacher: f64,
    pub below_target: Option<u32>,
    pub on_target: Option<u32>,
    pub above_target: Option<u32>,
    pub no_surveillance: Option<u32>,
    pub overloaded: Option<u32>,
    pub underutilized: Option<u32>,
    pub normal: Option<u32>,
}

/// Result of `check_surveillance_workload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadResponse {
    pub global_metrics: GlobalMetrics,
    pub teacher_distribution: TeacherDistribution,
    #[serde(default)]
    pub teacher_analysis: Vec<WorkloadTeacherAnalysis>,
    #[serde(default)]
    pub message: String,
}

/// Result of the date and teacher-schedule conflict checks.
///
/// The backend answers `{"conflicts": [...]}` when something is found and
/// `{"message": "..."}` otherwise; conflict entries are displayed as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    #[serde(default)]
    pub conflicts: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.conflicts.is_empty()
    }
}
