pub mod course;
pub mod creneau;
pub mod planning;
pub mod teacher;
pub mod teaching;
pub mod wire;
pub mod workload;

pub use course::Formation;
pub use creneau::Creneau;
pub use planning::{
    CreatePlanningRequest, ExamRow, MonitoringPlanningItem, MonitoringRole, PlanningWithDetails,
    Surveillant, SurveillantWithDetails, UpdatePlanningRequest,
};
pub use teacher::{Teacher, TeacherStatus};
pub use teaching::TeachingAssignment;
pub use workload::{ConflictReport, WorkloadResponse};
