use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::wire::lenient_string;

/// Administrative state of a teacher (`etat` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TeacherStatus {
    Actif,
    Retired,
    Mutated,
    Med,
    Admin,
    #[default]
    Unknown,
    Other(String),
}

impl TeacherStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TeacherStatus::Actif => "ACTIF",
            TeacherStatus::Retired => "RETIRED",
            TeacherStatus::Mutated => "MUTATED",
            TeacherStatus::Med => "MED",
            TeacherStatus::Admin => "ADMIN",
            TeacherStatus::Unknown => "",
            TeacherStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TeacherStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" => TeacherStatus::Unknown,
            "ACTIF" => TeacherStatus::Actif,
            "RETIRED" => TeacherStatus::Retired,
            "MUTATED" => TeacherStatus::Mutated,
            "MED" => TeacherStatus::Med,
            "ADMIN" => TeacherStatus::Admin,
            _ => TeacherStatus::Other(raw),
        }
    }
}

impl From<TeacherStatus> for String {
    fn from(status: TeacherStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TeacherStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `Enseignants` model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(rename = "Code_Enseignant", default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nom: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prenom: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub nom_jeune_fille: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genre: String,
    #[serde(default, alias = "status", deserialize_with = "lenient_status")]
    pub etat: TeacherStatus,
    #[serde(rename = "faculté", default, deserialize_with = "lenient_string")]
    pub faculte: String,
    #[serde(
        rename = "département",
        alias = "departement",
        default,
        deserialize_with = "lenient_string"
    )]
    pub departement: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: String,
    #[serde(rename = "diplôme", default, deserialize_with = "lenient_string")]
    pub diplome: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email2: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tel1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tel2: String,
}

impl Teacher {
    /// "NOM PRENOM", trimmed when either half is missing.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom).trim().to_string()
    }

    /// Non-empty contact addresses in preference order.
    pub fn emails(&self) -> Vec<&str> {
        [self.email1.as_str(), self.email2.as_str()]
            .into_iter()
            .filter(|e| !e.trim().is_empty())
            .collect()
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<TeacherStatus, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(TeacherStatus::from)
}
