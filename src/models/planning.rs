use serde::{Deserialize, Serialize};

use super::course::Formation;
use super::creneau::Creneau;
use super::teacher::Teacher;
use super::wire::{lenient_i64, lenient_string};

/// A scheduled exam sitting joined with its time slot and formation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningWithDetails {
    pub id_planning: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub session: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub nombre_surveillant: Option<i64>,
    #[serde(default)]
    pub creneau: Creneau,
    #[serde(default)]
    pub formation: Formation,
}

/// Supervisor slot as sent when creating or updating a planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surveillant {
    pub code_enseignant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub est_charge_cours: Option<u8>,
}

impl Surveillant {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code_enseignant: code.into(),
            est_charge_cours: None,
        }
    }

    pub fn lead(code: impl Into<String>) -> Self {
        Self {
            code_enseignant: code.into(),
            est_charge_cours: Some(1),
        }
    }
}

/// Supervisor assignment as returned by `get_surveillants_by_planning`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveillantWithDetails {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id_surveillance: Option<i64>,
    #[serde(default)]
    pub est_charge_cours: u8,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code_enseignant: String,
    #[serde(default)]
    pub enseignant: Option<Teacher>,
}

impl SurveillantWithDetails {
    pub fn is_lead(&self) -> bool {
        self.est_charge_cours == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlanningRequest {
    pub formation_id: i64,
    pub section: String,
    pub nombre_surveillant: u32,
    #[serde(default)]
    pub session: String,
    pub id_creneau: i64,
    pub surveillants: Vec<Surveillant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlanningRequest {
    pub id_planning: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_surveillant: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_creneau: Option<i64>,
    pub surveillants: Vec<Surveillant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitoringRole {
    Main,
    Assistant,
}

impl MonitoringRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitoringRole::Main => "Main",
            MonitoringRole::Assistant => "Assistant",
        }
    }
}

/// One supervisor duty in the monitoring plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringPlanningItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub teacher_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub teacher_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub module: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub room: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialty: String,
    pub role: MonitoringRole,
}

/// Flattened row of the exam table, one per planning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamRow {
    pub planning_id: i64,
    pub level: String,
    pub specialty: String,
    pub semester: String,
    pub section: String,
    pub date: String,
    pub time: String,
    pub exam_room: String,
    pub module_name: String,
    pub module_abbreviation: String,
    pub nbr_se: String,
}

impl ExamRow {
    pub fn from_planning(planning: &PlanningWithDetails) -> Self {
        let formation = &planning.formation;
        let modules = formation.module_list();
        Self {
            planning_id: planning.id_planning,
            level: formation.niveau_cycle.clone(),
            specialty: formation.filiere.clone(),
            semester: formation.semestre.clone(),
            section: planning.section.clone(),
            date: planning.creneau.date_creneau.clone(),
            time: planning.creneau.heure_creneau.clone(),
            exam_room: planning.creneau.salle.clone(),
            module_name: formation.modules.clone(),
            module_abbreviation: modules.first().cloned().unwrap_or_default(),
            nbr_se: planning
                .nombre_surveillant
                .map(|n| n.to_string())
                .unwrap_or_default(),
        }
    }
}
