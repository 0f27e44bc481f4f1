use serde::{Deserialize, Serialize};

use super::wire::{lenient_i64, lenient_string};

/// An exam time slot: date, start time and room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Creneau {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id_creneau: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_creneau: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub heure_creneau: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salle: String,
}
