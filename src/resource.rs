//! Per-resource schema: backend model name, primary key field and the text
//! fields the local filter looks at.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{Creneau, Formation, Teacher, TeachingAssignment};

pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Model name understood by the generic model endpoints.
    const MODEL: &'static str;
    /// Primary key column used by `edit_model` and `delete_model`.
    const KEY_FIELD: &'static str;
    /// Bulk import endpoint for spreadsheet uploads.
    const UPLOAD_ENDPOINT: &'static str;

    /// Primary key of this record, `None` when it is missing or blank.
    fn key(&self) -> Option<Value>;

    /// String fields matched by the local search filter.
    fn search_fields(&self) -> Vec<&str>;

    fn require_key(&self) -> Result<Value, AppError> {
        self.key().ok_or_else(|| {
            AppError::validation(format!(
                "Cannot modify {}: missing primary key value ({})",
                Self::MODEL,
                Self::KEY_FIELD
            ))
        })
    }
}

/// Rejects null, empty and whitespace-only key values.
pub fn ensure_key(model: &str, value: &Value) -> Result<(), AppError> {
    let missing = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if missing {
        return Err(AppError::validation(format!(
            "Cannot update {}: missing primary key value",
            model
        )));
    }
    Ok(())
}

fn text_key(value: &str) -> Option<Value> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
}

impl Resource for Teacher {
    const MODEL: &'static str = "Enseignants";
    const KEY_FIELD: &'static str = "Code_Enseignant";
    const UPLOAD_ENDPOINT: &'static str = "upload_enseignants_xlsx/";

    fn key(&self) -> Option<Value> {
        text_key(&self.code)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.code,
            &self.nom,
            &self.prenom,
            &self.departement,
            &self.grade,
            &self.email1,
        ]
    }
}

impl Resource for Formation {
    const MODEL: &'static str = "Formations";
    const KEY_FIELD: &'static str = "id";
    const UPLOAD_ENDPOINT: &'static str = "upload_formations_xlsx/";

    fn key(&self) -> Option<Value> {
        self.id.map(Value::from)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.domaine,
            &self.filiere,
            &self.niveau_cycle,
            &self.specialites,
            &self.semestre,
            &self.modules,
        ]
    }
}

impl Resource for TeachingAssignment {
    const MODEL: &'static str = "ChargesEnseignement";
    const KEY_FIELD: &'static str = "id_charge";
    const UPLOAD_ENDPOINT: &'static str = "upload_charges_xlsx/";

    fn key(&self) -> Option<Value> {
        self.id_charge.map(Value::from)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.palier,
            &self.specialite,
            &self.section,
            &self.intitule_module,
            &self.abv_module,
            &self.teacher_code,
        ]
    }
}

impl Resource for Creneau {
    const MODEL: &'static str = "Creneau";
    const KEY_FIELD: &'static str = "id_creneau";
    const UPLOAD_ENDPOINT: &'static str = "upload_creneau_xlsx/";

    fn key(&self) -> Option<Value> {
        self.id_creneau.map(Value::from)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.date_creneau, &self.heure_creneau, &self.salle]
    }
}

/// Maps a user-supplied model name (as accepted by the import command) to
/// its upload endpoint.
pub fn upload_endpoint(model: &str) -> Result<&'static str, AppError> {
    match model.to_lowercase().as_str() {
        "chargesenseignement" | "charges" | "teaching" => Ok(TeachingAssignment::UPLOAD_ENDPOINT),
        "enseignants" | "teachers" => Ok(Teacher::UPLOAD_ENDPOINT),
        "formations" | "courses" => Ok(Formation::UPLOAD_ENDPOINT),
        "creneau" | "creneaux" | "timeslots" => Ok(Creneau::UPLOAD_ENDPOINT),
        _ => Err(AppError::validation(format!(
            "Excel upload not supported for model: {}",
            model
        ))),
    }
}
