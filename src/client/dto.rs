use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat field map sent as `fields` / `updates`, keyed by backend column name.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListParams {
    pub page: u32,
    #[serde(rename = "itemsPerPage")]
    pub items_per_page: u32,
    pub search: String,
}

impl ListParams {
    pub fn new(page: u32, items_per_page: u32, search: impl Into<String>) -> Self {
        Self {
            page,
            items_per_page,
            search: search.into(),
        }
    }

    pub fn to_query(&self, model: &str) -> Vec<(&'static str, String)> {
        vec![
            ("model", model.to_string()),
            ("page", self.page.to_string()),
            ("itemsPerPage", self.items_per_page.to_string()),
            ("search", self.search.clone()),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct AddRowRequest<'a> {
    pub model: &'a str,
    pub fields: &'a Fields,
}

#[derive(Debug, Serialize)]
pub struct EditModelRequest<'a> {
    pub model: &'a str,
    pub field: &'a str,
    pub value: &'a Value,
    pub updates: &'a Fields,
}

#[derive(Debug, Serialize)]
pub struct DeleteModelRequest<'a> {
    pub model: &'a str,
    pub field: &'a str,
    pub value: &'a Value,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub model: &'a str,
    pub query: &'a str,
    pub limit: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub count: usize,
}

/// `get_model_data` answers either a bare array or a wrapped page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PageResponse {
    Rows(Vec<Value>),
    Wrapped {
        #[serde(default, alias = "results")]
        data: Vec<Value>,
        #[serde(default)]
        total_count: Option<u64>,
    },
}

impl PageResponse {
    pub fn into_parts(self) -> (Vec<Value>, u64) {
        match self {
            PageResponse::Rows(rows) => {
                let total = rows.len() as u64;
                (rows, total)
            }
            PageResponse::Wrapped { data, total_count } => {
                let total = total_count.unwrap_or(data.len() as u64);
                (data, total)
            }
        }
    }
}

/// A decoded page of records plus the backend's total count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletePlanningRequest {
    pub id_planning: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkloadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_surveillances: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

/// Outcome of an email dispatch call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub successful: Option<u32>,
    #[serde(default)]
    pub failed: Option<u32>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
            && match &self.success {
                Some(Value::Bool(ok)) => *ok,
                Some(Value::Null) => false,
                Some(_) => true,
                None => self.message.is_some(),
            }
    }

    pub fn summary(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        match (&self.success, &self.message) {
            (Some(Value::String(s)), _) => s.clone(),
            (_, Some(m)) => m.clone(),
            _ => "Done".to_string(),
        }
    }
}
