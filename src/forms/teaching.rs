use serde_json::Value;
use tracing::info;

use super::{Completion, FormStatus, changed_fields, require_all, text};
use crate::client::dto::Fields;
use crate::client::{ModelApi, create_record, update_record};
use crate::error::AppError;
use crate::models::TeachingAssignment;

pub const NO_CHANGES_MESSAGE: &str = "No changes were made";

#[derive(Default)]
pub struct TeachingForm {
    original: Option<TeachingAssignment>,
    pub palier: String,
    pub specialite: String,
    pub semestre: String,
    pub section: String,
    pub groupe: String,
    pub kind: String,
    pub intitule_module: String,
    pub abv_module: String,
    pub teacher_code: String,
    pub annee_universitaire: String,
    status: FormStatus,
}

impl TeachingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(assignment: &TeachingAssignment) -> Self {
        Self {
            original: Some(assignment.clone()),
            palier: assignment.palier.clone(),
            specialite: assignment.specialite.clone(),
            semestre: assignment.semestre.clone(),
            section: assignment.section.clone(),
            groupe: assignment.groupe.clone(),
            kind: assignment.kind.clone(),
            intitule_module: assignment.intitule_module.clone(),
            abv_module: assignment.abv_module.clone(),
            teacher_code: assignment.teacher_code.clone(),
            annee_universitaire: assignment.annee_universitaire.clone(),
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

    /// Payload of the add request.
    pub fn to_create_fields(&self) -> Result<Fields, AppError> {
        require_all(&[&self.palier, &self.intitule_module, &self.teacher_code])?;

        let mut fields = self.common_fields();
        fields.insert("Code_Enseignant_id".into(), text(&self.teacher_code));
        fields.insert("annee_universitaire".into(), text(&self.annee_universitaire));
        Ok(fields)
    }

    /// Only the fields that differ from the record being edited.
    pub fn to_update_fields(&self) -> Result<Fields, AppError> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| AppError::validation("Cannot edit teaching assignment: missing id"))?;

        let before = Self::edit(original).edit_fields();
        let updates = changed_fields(&before, &self.edit_fields());
        if updates.is_empty() {
            return Err(AppError::validation(NO_CHANGES_MESSAGE));
        }
        Ok(updates)
    }

    pub async fn submit(&mut self, api: &dyn ModelApi) -> Option<Value> {
        let result = self.send(api).await;
        self.status.settle(result)
    }

    async fn send(&self, api: &dyn ModelApi) -> Result<Value, AppError> {
        match &self.original {
            Some(original) => {
                let key = original.id_charge.map(Value::from).ok_or_else(|| {
                    AppError::validation("Cannot edit teaching assignment: missing id")
                })?;
                let updates = self.to_update_fields()?;
                info!(
                    "Updating teaching assignment {} ({} changed fields)",
                    key,
                    updates.len()
                );
                update_record::<TeachingAssignment>(api, &key, &updates).await
            }
            None => {
                let fields = self.to_create_fields()?;
                info!("Adding teaching assignment for {}", self.teacher_code.trim());
                create_record::<TeachingAssignment>(api, &fields).await
            }
        }
    }

    fn common_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("palier".into(), text(&self.palier));
        fields.insert("specialite".into(), text(&self.specialite));
        fields.insert("semestre".into(), text(&self.semestre));
        fields.insert("section".into(), text(&self.section));
        fields.insert("groupe".into(), text(&self.groupe));
        fields.insert("type".into(), text(&self.kind));
        fields.insert("intitulé_module".into(), text(&self.intitule_module));
        fields.insert("abv_module".into(), text(&self.abv_module));
        fields
    }

    fn edit_fields(&self) -> Fields {
        let mut fields = self.common_fields();
        fields.insert("code_enseignant".into(), text(&self.teacher_code));
        fields.insert("annee_universitaire".into(), text(&self.annee_universitaire));
        fields
    }
}
