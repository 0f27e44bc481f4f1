//! Import templates: a fixed header row plus sample rows per import type.

use std::path::{Path, PathBuf};

use csv::{Terminator, WriterBuilder};
use tracing::info;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TemplateKind {
    Formations,
    Creneau,
    Teachers,
}

const FORMATIONS_HEADERS: [&str; 8] = [
    "Domaine",
    "Filière",
    "Niveau/Cycle",
    "Specialités",
    "Nbr Sections",
    "Nbr groupes",
    "Semestre",
    "Modules",
];

const FORMATIONS_SAMPLES: [[&str; 8]; 2] = [
    [
        "MI",
        "Informatique",
        "L1",
        "Tronc commun",
        "2",
        "8",
        "S1",
        "Algorithmique, Analyse 1, Algèbre 1",
    ],
    [
        "MI",
        "Informatique",
        "M1",
        "SII",
        "1",
        "3",
        "S1",
        "Compilation, Réseaux",
    ],
];

const CRENEAU_HEADERS: [&str; 3] = ["Date", "Heure", "Salle"];

const CRENEAU_SAMPLES: [[&str; 3]; 2] = [
    ["2025-01-12", "08:30", "Amphi A"],
    ["2025-01-12", "10:30", "Salle 12"],
];

const TEACHER_HEADERS: [&str; 15] = [
    "Code Enseignant",
    "NOM",
    "PRENOM",
    "Nom Jeune Fille",
    "Genre",
    "Etat",
    "Faculté",
    "Département",
    "GRADE",
    "Diplôme",
    "Type",
    "EMAIL1",
    "EMAIL2",
    "TEL1",
    "TEL2",
];

const TEACHER_SAMPLES: [[&str; 15]; 1] = [[
    "ENS001",
    "Benali",
    "Amina",
    "",
    "F",
    "ACTIF",
    "Faculté d'Informatique",
    "Informatique",
    "MCA",
    "Doctorat",
    "Permanent",
    "a.benali@univ.dz",
    "",
    "0555000000",
    "",
]];

impl TemplateKind {
    pub fn headers(self) -> Vec<&'static str> {
        match self {
            TemplateKind::Formations => FORMATIONS_HEADERS.to_vec(),
            TemplateKind::Creneau => CRENEAU_HEADERS.to_vec(),
            TemplateKind::Teachers => TEACHER_HEADERS.to_vec(),
        }
    }

    pub fn samples(self) -> Vec<Vec<&'static str>> {
        match self {
            TemplateKind::Formations => FORMATIONS_SAMPLES.iter().map(|r| r.to_vec()).collect(),
            TemplateKind::Creneau => CRENEAU_SAMPLES.iter().map(|r| r.to_vec()).collect(),
            TemplateKind::Teachers => TEACHER_SAMPLES.iter().map(|r| r.to_vec()).collect(),
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TemplateKind::Formations => "formations_template.csv",
            TemplateKind::Creneau => "creneau_template.csv",
            TemplateKind::Teachers => "teachers_template.csv",
        }
    }
}

/// Writes rows with RFC 4180 quoting: cells holding a comma, quote or line
/// break are quoted and inner quotes doubled.
pub fn to_csv<S: AsRef<[u8]>>(headers: &[S], rows: &[Vec<S>]) -> Result<String, AppError> {
    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buffer);

        writer.write_record(headers)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }

    String::from_utf8(buffer).map_err(|e| AppError::Decode(e.to_string()))
}

pub fn render_template(kind: TemplateKind) -> Result<String, AppError> {
    to_csv(&kind.headers(), &kind.samples())
}

/// Writes the template into `dir` and returns its path.
pub fn write_template(kind: TemplateKind, dir: &Path) -> Result<PathBuf, AppError> {
    let path = dir.join(kind.file_name());
    std::fs::write(&path, render_template(kind)?)?;
    info!("Template written to {}", path.display());
    Ok(path)
}
