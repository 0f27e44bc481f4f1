//! Add/edit forms. Each form keeps one slot per input, validates before any
//! request is sent and keeps the last error for inline display.

pub mod course;
pub mod planning;
pub mod teacher;
pub mod teaching;

use serde_json::Value;

use crate::client::dto::Fields;
use crate::error::AppError;

pub use course::CourseForm;
pub use planning::PlanningForm;
pub use teacher::TeacherForm;
pub use teaching::TeachingForm;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill all required fields";

/// Invoked after a successful save: close the form and refetch the page.
pub type Completion = Box<dyn FnMut() + Send + Sync>;

#[derive(Default)]
pub struct FormStatus {
    error: Option<String>,
    on_complete: Option<Completion>,
}

impl FormStatus {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_on_complete(&mut self, on_complete: Completion) {
        self.on_complete = Some(on_complete);
    }

    /// Stores the error of a failed submission, or clears it and fires the
    /// completion callback.
    pub fn settle<T>(&mut self, result: Result<T, AppError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.error = None;
                if let Some(on_complete) = self.on_complete.as_mut() {
                    on_complete();
                }
                Some(value)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

pub fn require_all(values: &[&str]) -> Result<(), AppError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(AppError::validation(REQUIRED_FIELDS_MESSAGE));
    }
    Ok(())
}

pub fn text(value: &str) -> Value {
    Value::String(value.trim().to_string())
}

/// Optional integer input: blank is null, anything else must parse.
pub fn integer(label: &str, value: &str) -> Result<Value, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    trimmed
        .parse::<i64>()
        .map(Value::from)
        .map_err(|_| AppError::validation(format!("{} must be a number", label)))
}

/// Keeps only the entries of `current` whose value differs from `original`.
pub fn changed_fields(original: &Fields, current: &Fields) -> Fields {
    current
        .iter()
        .filter(|(key, value)| original.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
