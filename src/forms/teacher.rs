use serde_json::Value;
use tracing::info;

use super::{Completion, FormStatus, require_all, text};
use crate::client::dto::Fields;
use crate::client::{ModelApi, create_record, update_record};
use crate::error::AppError;
use crate::models::Teacher;

#[derive(Default)]
pub struct TeacherForm {
    /// Code of the record being edited; stays fixed even if `code` changes.
    original_code: Option<String>,
    pub code: String,
    pub nom: String,
    pub prenom: String,
    pub nom_jeune_fille: String,
    pub genre: String,
    pub etat: String,
    pub faculte: String,
    pub departement: String,
    pub grade: String,
    pub diplome: String,
    pub kind: String,
    pub email1: String,
    pub email2: String,
    pub tel1: String,
    pub tel2: String,
    status: FormStatus,
}

impl TeacherForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(teacher: &Teacher) -> Self {
        Self {
            original_code: Some(teacher.code.clone()),
            code: teacher.code.clone(),
            nom: teacher.nom.clone(),
            prenom: teacher.prenom.clone(),
            nom_jeune_fille: teacher.nom_jeune_fille.clone(),
            genre: teacher.genre.clone(),
            etat: teacher.etat.to_string(),
            faculte: teacher.faculte.clone(),
            departement: teacher.departement.clone(),
            grade: teacher.grade.clone(),
            diplome: teacher.diplome.clone(),
            kind: teacher.kind.clone(),
            email1: teacher.email1.clone(),
            email2: teacher.email2.clone(),
            tel1: teacher.tel1.clone(),
            tel2: teacher.tel2.clone(),
            status: FormStatus::default(),
        }
    }

    pub fn on_complete(mut self, on_complete: Completion) -> Self {
        self.status.set_on_complete(on_complete);
        self
    }

    pub fn is_edit(&self) -> bool {
        self.original_code.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require_all(&[&self.code, &self.nom, &self.prenom])
    }

    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("Code_Enseignant".into(), text(&self.code));
        fields.insert("nom".into(), text(&self.nom));
        fields.insert("prenom".into(), text(&self.prenom));
        fields.insert("nom_jeune_fille".into(), text(&self.nom_jeune_fille));
        fields.insert("genre".into(), text(&self.genre));
        fields.insert("etat".into(), text(&self.etat));
        fields.insert("faculté".into(), text(&self.faculte));
        fields.insert("département".into(), text(&self.departement));
        fields.insert("grade".into(), text(&self.grade));
        fields.insert("diplôme".into(), text(&self.diplome));
        fields.insert("type".into(), text(&self.kind));
        fields.insert("email1".into(), text(&self.email1));
        fields.insert("email2".into(), text(&self.email2));
        fields.insert("tel1".into(), text(&self.tel1));
        fields.insert("tel2".into(), text(&self.tel2));
        fields
    }

    /// Creates or updates the teacher. Edits send the full field map.
    pub async fn submit(&mut self, api: &dyn ModelApi) -> Option<Value> {
        let result = self.send(api).await;
        self.status.settle(result)
    }

    async fn send(&self, api: &dyn ModelApi) -> Result<Value, AppError> {
        self.validate()?;
        let fields = self.to_fields();
        match &self.original_code {
            Some(original) => {
                info!("Updating teacher {}", original);
                update_record::<Teacher>(api, &text(original), &fields).await
            }
            None => {
                info!("Adding teacher {}", self.code.trim());
                create_record::<Teacher>(api, &fields).await
            }
        }
    }
}
