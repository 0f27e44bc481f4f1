//! Text rendering of a page of rows, the delete confirmation gate and the
//! pagination strip.

use std::io::{self, BufRead, Write};

use crate::models::{Creneau, Formation, Teacher, TeachingAssignment};
use crate::resource::Resource;

pub trait TableRow: Resource {
    const DELETE_PROMPT: &'static str;

    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Fixed-width plain text, one line per row.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(&self.headers)];
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.extend(self.rows.iter().map(|r| line(r)));
        out.join("\n")
    }
}

pub fn render<R: TableRow>(rows: &[R]) -> RenderedTable {
    RenderedTable {
        headers: R::headers().into_iter().map(str::to_string).collect(),
        rows: rows.iter().map(TableRow::cells).collect(),
    }
}

/// Asks the user before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt the same way (`--yes` on the command line, tests).
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Interactive y/N prompt on stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Per-row actions. `on_delete` only runs after the gate says yes.
pub struct RowActions<'a, R> {
    pub on_edit: Box<dyn FnMut(&R) + 'a>,
    pub on_delete: Box<dyn FnMut(&R) + 'a>,
}

impl<'a, R: TableRow> RowActions<'a, R> {
    pub fn edit(&mut self, row: &R) {
        (self.on_edit)(row);
    }

    /// Returns whether the delete callback ran.
    pub fn delete(&mut self, row: &R, confirm: &dyn Confirm) -> bool {
        if !confirm.confirm(R::DELETE_PROMPT) {
            return false;
        }
        (self.on_delete)(row);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

pub fn total_pages(total_rows: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_rows.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// First page, last page and the neighbours of `current`, with an ellipsis
/// wherever numbers are skipped.
pub fn pagination(current: u32, total: u32) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    let mut items = Vec::new();
    let mut last_shown = 0;
    for page in 1..=total {
        let visible = page == 1 || page == total || page.abs_diff(current) <= 1;
        if !visible {
            continue;
        }
        if page > last_shown + 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(page));
        last_shown = page;
    }
    items
}

impl TableRow for Teacher {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this teacher?";

    fn headers() -> Vec<&'static str> {
        vec!["Code", "Name", "Department", "Grade", "Status", "Email", "Phone"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.full_name(),
            self.departement.clone(),
            self.grade.clone(),
            self.etat.to_string(),
            self.email1.clone(),
            self.tel1.clone(),
        ]
    }
}

impl TableRow for Formation {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this course?";

    fn headers() -> Vec<&'static str> {
        vec![
            "Domain",
            "Field",
            "Level",
            "Specialties",
            "Sections",
            "Groups",
            "Semester",
            "Modules",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let count = |n: Option<i64>| n.map(|v| v.to_string()).unwrap_or_default();
        vec![
            self.domaine.clone(),
            self.filiere.clone(),
            self.niveau_cycle.clone(),
            self.specialites.clone(),
            count(self.nbr_sections),
            count(self.nbr_groupes),
            self.semestre.clone(),
            self.modules.clone(),
        ]
    }
}

impl TableRow for TeachingAssignment {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this teaching assignment?";

    fn headers() -> Vec<&'static str> {
        vec![
            "Level",
            "Specialty",
            "Semester",
            "Section",
            "Group",
            "Type",
            "Module",
            "Abbr.",
            "Teacher",
            "Year",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.palier.clone(),
            self.specialite.clone(),
            self.semestre.clone(),
            self.section.clone(),
            self.groupe.clone(),
            self.kind.clone(),
            self.intitule_module.clone(),
            self.abv_module.clone(),
            self.teacher_code.clone(),
            self.annee_universitaire.clone(),
        ]
    }
}

impl TableRow for Creneau {
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this time slot?";

    fn headers() -> Vec<&'static str> {
        vec!["Id", "Date", "Time", "Room"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id_creneau.map(|id| id.to_string()).unwrap_or_default(),
            self.date_creneau.clone(),
            self.heure_creneau.clone(),
            self.salle.clone(),
        ]
    }
}
