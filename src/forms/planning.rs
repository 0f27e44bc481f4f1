use std::collections::HashSet;

use serde_json::Value;
use tracing::info;

use super::{Completion, FormStatus, REQUIRED_FIELDS_MESSAGE};
use crate::client::ExamApi;
use crate::error::AppError;
use crate::models::{
    CreatePlanningRequest, PlanningWithDetails, Surveillant, SurveillantWithDetails, Teacher,
    UpdatePlanningRequest,
};

pub const SELECT_ALL_SUPERVISORS_MESSAGE: &str = "Please select all supervisors";
pub const DISTINCT_SUPERVISORS_MESSAGE: &str = "Each supervisor must be different";

/// Planning with its supervisor roster. The number of supervisor slots
/// always equals `number_of_supervisors`; slot 0 is the lead.
pub struct PlanningForm {
    editing: Option<i64>,
    pub formation_id: Option<i64>,
    pub section: String,
    pub session: String,
    pub creneau_id: Option<i64>,
    supervisors: Vec<String>,
    status: FormStatus,
}

impl Default for PlanningForm {
    fn default() -> Self {
        Self {
            editing: None,
            formation_id: None,
            section: String::new(),
            session: String::new(),
            creneau_id: None,
            supervisors: vec![String::new()],
            status: FormStatus::default(),
        }
    }
}

impl PlanningForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the form from an existing planning and its current roster, lead
    /// first.
    pub fn edit(planning: &PlanningWithDetails, roster: &[SurveillantWithDetails]) -> Self {
        let mut ordered: Vec<&SurveillantWithDetails> = roster.iter().collect();
        ordered.sort_by_key(|s| !s.is_lead());

        let mut supervisors: Vec<String> =
            ordered.iter().map(|s| s.code_enseignant.clone()).collect();
        let wanted = planning
            .nombre_surveillant
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(supervisors.len())
            .max(1);
        supervisors.resize(wanted, String::new());

        Self {
            editing: Some(planning.id_planning),
            formation_id: planning.formation.id,
            section: planning.section.clone(),
            session: planning.session.clone(),
            creneau_id: planning.creneau.id_creneau,
            supervisors,
            status: FormStatus::default(),
        }
    }

    pub fn on_complete(mut self, on_complete: Completion) -> Self {
        self.status.set_on_complete(on_complete);
        self
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn number_of_supervisors(&self) -> usize {
        self.supervisors.len()
    }

    /// Grows with empty slots or truncates from the end.
    pub fn set_number_of_supervisors(&mut self, count: usize) {
        self.supervisors.resize(count.max(1), String::new());
    }

    pub fn supervisors(&self) -> &[String] {
        &self.supervisors
    }

    pub fn set_supervisor(&mut self, slot: usize, teacher_code: &str) -> Result<(), AppError> {
        let count = self.supervisors.len();
        let entry = self.supervisors.get_mut(slot).ok_or_else(|| {
            AppError::validation(format!(
                "Supervisor slot {} does not exist ({} slots)",
                slot + 1,
                count
            ))
        })?;
        *entry = teacher_code.trim().to_string();
        Ok(())
    }

    /// Teachers selectable in `slot`: everyone not already picked elsewhere.
    pub fn available_for<'a>(&self, slot: usize, teachers: &'a [Teacher]) -> Vec<&'a Teacher> {
        teachers
            .iter()
            .filter(|t| {
                !self
                    .supervisors
                    .iter()
                    .enumerate()
                    .any(|(i, code)| i != slot && *code == t.code)
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.formation_id.is_none() || self.section.trim().is_empty() || self.creneau_id.is_none()
        {
            return Err(AppError::validation(REQUIRED_FIELDS_MESSAGE));
        }
        if self.supervisors.iter().any(|code| code.is_empty()) {
            return Err(AppError::validation(SELECT_ALL_SUPERVISORS_MESSAGE));
        }
        let distinct: HashSet<&str> = self.supervisors.iter().map(String::as_str).collect();
        if distinct.len() != self.supervisors.len() {
            return Err(AppError::validation(DISTINCT_SUPERVISORS_MESSAGE));
        }
        Ok(())
    }

    fn roster(&self) -> Vec<Surveillant> {
        self.supervisors
            .iter()
            .enumerate()
            .map(|(i, code)| {
                if i == 0 {
                    Surveillant::lead(code.clone())
                } else {
                    Surveillant {
                        code_enseignant: code.clone(),
                        est_charge_cours: Some(0),
                    }
                }
            })
            .collect()
    }

    fn supervisor_count(&self) -> u32 {
        u32::try_from(self.supervisors.len()).unwrap_or(u32::MAX)
    }

    pub fn to_create_request(&self) -> Result<CreatePlanningRequest, AppError> {
        self.validate()?;
        let (Some(formation_id), Some(id_creneau)) = (self.formation_id, self.creneau_id) else {
            return Err(AppError::validation(REQUIRED_FIELDS_MESSAGE));
        };
        Ok(CreatePlanningRequest {
            formation_id,
            section: self.section.trim().to_string(),
            nombre_surveillant: self.supervisor_count(),
            session: self.session.clone(),
            id_creneau,
            surveillants: self.roster(),
        })
    }

    /// Full planning and roster of the edited record.
    pub fn to_update_request(&self) -> Result<UpdatePlanningRequest, AppError> {
        let id_planning = self
            .editing
            .ok_or_else(|| AppError::validation("Cannot update planning: missing id_planning"))?;
        self.validate()?;
        Ok(UpdatePlanningRequest {
            id_planning,
            formation_id: self.formation_id,
            section: Some(self.section.trim().to_string()),
            nombre_surveillant: Some(self.supervisor_count()),
            session: Some(self.session.clone()),
            id_creneau: self.creneau_id,
            surveillants: self.roster(),
        })
    }

    pub async fn submit(&mut self, exams: &dyn ExamApi) -> Option<Value> {
        let result = self.send(exams).await;
        self.status.settle(result)
    }

    async fn send(&self, exams: &dyn ExamApi) -> Result<Value, AppError> {
        if self.is_edit() {
            let request = self.to_update_request()?;
            info!("Saving planning {}", request.id_planning);
            exams.update_planning(request).await
        } else {
            let request = self.to_create_request()?;
            info!(
                "Scheduling {} section {} with {} supervisors",
                request.formation_id,
                request.section,
                request.nombre_surveillant
            );
            exams.create_planning(request).await
        }
    }
}
