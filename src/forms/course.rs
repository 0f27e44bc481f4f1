use serde_json::Value;
use tracing::info;

use super::{Completion, FormStatus, integer, require_all, text};
use crate::client::dto::Fields;
use crate::client::{ModelApi, create_record, update_record};
use crate::error::AppError;
use crate::models::Formation;

#[derive(Default)]
pub struct CourseForm {
    original_id: Option<i64>,
    pub domaine: String,
    pub filiere: String,
    pub niveau_cycle: String,
    pub specialites: String,
    pub nbr_sections: String,
    pub nbr_groupes: String,
    pub semestre: String,
    pub modules: String,
    status: FormStatus,
}

impl CourseForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(formation: &Formation) -> Self {
        let count = |n: Option<i64>| n.map(|v| v.to_string()).unwrap_or_default();
        Self {
            original_id: formation.id,
            domaine: formation.domaine.clone(),
            filiere: formation.filiere.clone(),
            niveau_cycle: formation.niveau_cycle.clone(),
            specialites: formation.specialites.clone(),
            nbr_sections: count(formation.nbr_sections),
            nbr_groupes: count(formation.nbr_groupes),
            semestre: formation.semestre.clone(),
            modules: formation.modules.clone(),
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

    pub fn to_fields(&self) -> Result<Fields, AppError> {
        require_all(&[&self.domaine, &self.filiere, &self.niveau_cycle])?;

        let mut fields = Fields::new();
        fields.insert("domaine".into(), text(&self.domaine));
        fields.insert("filière".into(), text(&self.filiere));
        fields.insert("niveau_cycle".into(), text(&self.niveau_cycle));
        fields.insert("specialités".into(), text(&self.specialites));
        fields.insert("nbr_sections".into(), integer("Number of sections", &self.nbr_sections)?);
        fields.insert("nbr_groupes".into(), integer("Number of groups", &self.nbr_groupes)?);
        fields.insert("semestre".into(), text(&self.semestre));
        fields.insert("modules".into(), text(&self.modules));
        Ok(fields)
    }

    /// Creates or updates the formation. Edits send the full field map.
    pub async fn submit(&mut self, api: &dyn ModelApi) -> Option<Value> {
        let result = self.send(api).await;
        self.status.settle(result)
    }

    async fn send(&self, api: &dyn ModelApi) -> Result<Value, AppError> {
        let fields = self.to_fields()?;
        match self.original_id {
            Some(id) => {
                info!("Updating formation {}", id);
                update_record::<Formation>(api, &Value::from(id), &fields).await
            }
            None => {
                info!("Adding formation {}", self.filiere.trim());
                create_record::<Formation>(api, &fields).await
            }
        }
    }
}
