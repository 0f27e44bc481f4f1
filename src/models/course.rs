use serde::{Deserialize, Serialize};

use super::wire::{lenient_i64, lenient_string};

/// A row of the `Formations` model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub domaine: String,
    #[serde(rename = "filière", default, deserialize_with = "lenient_string")]
    pub filiere: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub niveau_cycle: String,
    #[serde(rename = "specialités", default, deserialize_with = "lenient_string")]
    pub specialites: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub nbr_sections: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub nbr_groupes: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub semestre: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modules: String,
}

impl Formation {
    /// Splits the comma-joined `modules` column.
    pub fn module_list(&self) -> Vec<String> {
        self.modules
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }
}
