use std::path::{Path, PathBuf};

use super::{DocumentContext, Orientation, TableDocument};
use crate::error::AppError;
use crate::services::dispatch::PvData;

pub const PV_HEADERS: [&str; 3] = ["Supervisor", "Signature", "Observations"];

/// Exam-session report of one planning. The supervisor table always has at
/// least fifteen lines so late additions can be written in by hand.
pub fn pv_document(pv: &PvData, ctx: &DocumentContext) -> TableDocument {
    let mut doc = TableDocument::new(
        Orientation::Portrait,
        ctx,
        "Exam Report (PV)",
        &PV_HEADERS,
        "Exam Report - Official Document",
    );
    doc.details = vec![
        format!("Academic year: {}  |  {}  |  {}", pv.annee_universitaire, pv.semestre, pv.session),
        format!("Module: {} ({})", pv.module, pv.module_nom),
        format!("Level: {}  |  Section: {}", pv.niveau, pv.section),
        format!("Date: {}  {}  |  Room: {}", pv.date_exam, pv.heure_exam, pv.locaux),
        format!("Responsible teacher: {}", pv.nom_enseignant),
    ];
    doc.rows = pv
        .padded_rows()
        .into_iter()
        .map(|name| vec![name, String::new(), String::new()])
        .collect();
    doc
}

pub fn pv_file_name(id_planning: i64) -> String {
    format!("pv-planning-{}.pdf", id_planning)
}

pub fn generate_pv(pv: &PvData, ctx: &DocumentContext, out_dir: &Path) -> Result<PathBuf, AppError> {
    let path = out_dir.join(pv_file_name(pv.id_planning));
    pv_document(pv, ctx).save(&path)?;
    Ok(path)
}
