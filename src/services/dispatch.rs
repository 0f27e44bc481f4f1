//! Convocation and PV payloads built from plannings and their rosters.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::client::ExamApi;
use crate::client::dto::SendResult;
use crate::error::AppError;
use crate::models::{PlanningWithDetails, SurveillantWithDetails};

/// A PV lists at least this many supervisor lines; blanks fill the rest.
pub const PV_MIN_ROWS: usize = 15;

/// `2024/2025` from September onwards, `2023/2024` before.
pub fn academic_year(today: NaiveDate) -> String {
    let year = today.year();
    if today.month() >= 9 {
        format!("{}/{}", year, year + 1)
    } else {
        format!("{}/{}", year - 1, year)
    }
}

/// ISO dates become `dd/mm/yyyy`; anything else is returned untouched.
pub fn format_exam_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn supervisor_name(surveillant: &SurveillantWithDetails) -> String {
    let base = match &surveillant.enseignant {
        Some(t) => format!("{} {}", t.prenom, t.nom).trim().to_string(),
        None => surveillant.code_enseignant.clone(),
    };
    if surveillant.is_lead() {
        format!("{} (Responsable)", base)
    } else {
        base
    }
}

fn surveillants_rows_html(rows: &[String]) -> String {
    rows.iter()
        .map(|name| {
            let cell = if name.is_empty() { "&nbsp;" } else { name.as_str() };
            format!(
                "<tr><td style=\"text-align: left; padding-left: 10px;\">{}</td>\
                 <td style=\"border: 1px solid #000;\">&nbsp;</td>\
                 <td style=\"border: 1px solid #000;\">&nbsp;</td></tr>",
                cell
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvSupervisor {
    pub nom: String,
}

/// Context of one exam-session report, as posted to `send_pv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvData {
    pub id_planning: i64,
    pub date_document: String,
    pub nom_enseignant: String,
    pub semestre: String,
    pub session: String,
    pub annee_universitaire: String,
    pub module: String,
    pub module_nom: String,
    pub niveau: String,
    pub section: String,
    pub date_exam: String,
    pub heure_exam: String,
    pub locaux: String,
    pub surveillants: Vec<PvSupervisor>,
    pub surveillants_rows: String,
}

impl PvData {
    /// Supervisor names padded with blanks up to [`PV_MIN_ROWS`].
    pub fn padded_rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = self.surveillants.iter().map(|s| s.nom.clone()).collect();
        if rows.len() < PV_MIN_ROWS {
            rows.resize(PV_MIN_ROWS, String::new());
        }
        rows
    }
}

pub fn build_pv(
    planning: &PlanningWithDetails,
    surveillants: &[SurveillantWithDetails],
    today: NaiveDate,
) -> PvData {
    let formation = &planning.formation;
    let lead = surveillants
        .iter()
        .find(|s| s.is_lead())
        .or_else(|| surveillants.first());
    let nom_enseignant = lead
        .and_then(|s| s.enseignant.as_ref())
        .map(|t| format!("{} {}", t.prenom, t.nom).trim().to_string())
        .unwrap_or_default();
    let mut pv = PvData {
        id_planning: planning.id_planning,
        date_document: today.format("%d/%m/%Y").to_string(),
        nom_enseignant,
        semestre: formation.semestre.clone(),
        session: if planning.session.is_empty() {
            "Session Normale".to_string()
        } else {
            planning.session.clone()
        },
        annee_universitaire: academic_year(today),
        module: formation.modules.clone(),
        module_nom: formation.module_list().first().cloned().unwrap_or_default(),
        niveau: formation.niveau_cycle.clone(),
        section: planning.section.clone(),
        date_exam: format_exam_date(&planning.creneau.date_creneau),
        heure_exam: planning.creneau.heure_creneau.clone(),
        locaux: planning.creneau.salle.clone(),
        surveillants: surveillants
            .iter()
            .map(|s| PvSupervisor {
                nom: supervisor_name(s),
            })
            .collect(),
        surveillants_rows: String::new(),
    };
    pv.surveillants_rows = surveillants_rows_html(&pv.padded_rows());
    pv
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvocationExam {
    pub date: String,
    pub horaire: String,
    pub module: String,
    pub local: String,
}

/// Every exam one supervisor is summoned to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Convocation {
    pub nom_enseignant: String,
    pub email: String,
    pub examens: Vec<ConvocationExam>,
}

/// Groups roster entries by teacher email, in first-seen order. Supervisors
/// without an address are skipped.
pub fn build_convocations(
    rosters: &[(PlanningWithDetails, Vec<SurveillantWithDetails>)],
) -> Vec<Convocation> {
    let mut convocations: Vec<Convocation> = Vec::new();

    for (planning, surveillants) in rosters {
        let exam = ConvocationExam {
            date: format_exam_date(&planning.creneau.date_creneau),
            horaire: planning.creneau.heure_creneau.clone(),
            module: planning.formation.modules.clone(),
            local: planning.creneau.salle.clone(),
        };

        for surveillant in surveillants {
            let Some(teacher) = &surveillant.enseignant else {
                continue;
            };
            let Some(email) = teacher.emails().first().map(|e| e.to_string()) else {
                continue;
            };

            match convocations.iter_mut().find(|c| c.email == email) {
                Some(existing) => existing.examens.push(exam.clone()),
                None => {
                    let name = format!("{} {}", teacher.prenom, teacher.nom).trim().to_string();
                    convocations.push(Convocation {
                        nom_enseignant: if name.is_empty() {
                            teacher.code.clone()
                        } else {
                            name
                        },
                        email,
                        examens: vec![exam.clone()],
                    });
                }
            }
        }
    }

    convocations
}

async fn fetch_rosters(
    exams: &dyn ExamApi,
    plannings: Vec<PlanningWithDetails>,
) -> Result<Vec<(PlanningWithDetails, Vec<SurveillantWithDetails>)>, AppError> {
    let mut rosters = Vec::with_capacity(plannings.len());
    for planning in plannings {
        let surveillants = exams.surveillants_by_planning(planning.id_planning).await?;
        rosters.push((planning, surveillants));
    }
    Ok(rosters)
}

/// Builds and sends the PV of one planning.
pub async fn send_pv_for(
    exams: &dyn ExamApi,
    planning: &PlanningWithDetails,
) -> Result<SendResult, AppError> {
    let surveillants = exams.surveillants_by_planning(planning.id_planning).await?;
    let pv = build_pv(planning, &surveillants, Local::now().date_naive());
    info!(
        "Sending PV for planning {} ({} supervisors)",
        planning.id_planning,
        surveillants.len()
    );
    exams.send_pv(serde_json::to_value(&pv)?).await
}

/// Sends the convocation of one supervisor across the given plannings.
pub async fn send_convocation_for(
    exams: &dyn ExamApi,
    plannings: Vec<PlanningWithDetails>,
    teacher_code: &str,
) -> Result<SendResult, AppError> {
    let rosters: Vec<_> = fetch_rosters(exams, plannings)
        .await?
        .into_iter()
        .map(|(planning, surveillants)| {
            let mine = surveillants
                .into_iter()
                .filter(|s| s.code_enseignant == teacher_code)
                .collect::<Vec<_>>();
            (planning, mine)
        })
        .filter(|(_, mine)| !mine.is_empty())
        .collect();

    let convocation = build_convocations(&rosters).into_iter().next().ok_or_else(|| {
        AppError::validation(format!(
            "No exam with a reachable email found for teacher {}",
            teacher_code
        ))
    })?;
    exams.send_convocation(serde_json::to_value(&convocation)?).await
}

/// Builds convocations for every supervisor of `plannings` and sends them in
/// one bulk call.
pub async fn send_all_convocations(
    exams: &dyn ExamApi,
    plannings: Vec<PlanningWithDetails>,
) -> Result<SendResult, AppError> {
    let rosters = fetch_rosters(exams, plannings).await?;
    let convocations = build_convocations(&rosters);
    info!("Sending {} convocations", convocations.len());
    let payload: Value = serde_json::to_value(&convocations)?;
    exams.send_bulk_convocations(Some(payload)).await
}
