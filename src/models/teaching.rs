use serde::{Deserialize, Serialize};

use super::wire::{lenient_i64, lenient_string};

/// A row of the `ChargesEnseignement` model: one teacher assigned to one
/// module/section/group for an academic year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeachingAssignment {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id_charge: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub palier: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialite: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub semestre: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub groupe: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(rename = "intitulé_module", default, deserialize_with = "lenient_string")]
    pub intitule_module: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub abv_module: String,
    #[serde(
        rename = "Code_Enseignant_id",
        alias = "code_enseignant",
        default,
        deserialize_with = "lenient_string"
    )]
    pub teacher_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub annee_universitaire: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub formation: Option<i64>,
}
