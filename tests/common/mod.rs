#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use examtrack::ClientConfig;
use examtrack::client::dto::{Fields, ListParams, Page, SendResult};
use examtrack::client::http::HttpTransport;
use examtrack::client::{AuthTokens, ExamApi, ModelApi, TokenPair};
use examtrack::error::AppError;
use examtrack::models::{
    ConflictReport, CreatePlanningRequest, MonitoringPlanningItem, PlanningWithDetails,
    SurveillantWithDetails, UpdatePlanningRequest, WorkloadResponse,
};

// ---------------------------------------------------------------------------
// In-process HTTP backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: String,
}

#[derive(Clone)]
enum Canned {
    Json(u16, Value),
    Text(u16, String),
}

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, Canned>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: MockState,
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let raw = String::from_utf8_lossy(&body).to_string();
    let parsed = serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null);

    state.calls.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query,
        headers,
        body: parsed,
        raw,
    });

    let delay = state.delays.lock().unwrap().get(&path).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let canned = state.responses.lock().unwrap().get(&path).cloned();
    match canned {
        Some(Canned::Json(status, body)) => {
            (StatusCode::from_u16(status).unwrap(), axum::Json(body)).into_response()
        }
        Some(Canned::Text(status, text)) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "text/html")],
            text,
        )
            .into_response(),
        None if path.ends_with("/get_model_data/") => {
            axum::Json(json!({"data": [], "total_count": 0})).into_response()
        }
        None => axum::Json(json!({"success": true, "message": "ok"})).into_response(),
    }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    fn api_path(endpoint: &str) -> String {
        format!("/api/{}", endpoint)
    }

    pub fn respond(&self, endpoint: &str, status: u16, body: Value) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(Self::api_path(endpoint), Canned::Json(status, body));
    }

    pub fn respond_text(&self, endpoint: &str, status: u16, text: &str) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(Self::api_path(endpoint), Canned::Text(status, text.to_string()));
    }

    pub fn delay(&self, endpoint: &str, delay: Duration) {
        self.state
            .delays
            .lock()
            .unwrap()
            .insert(Self::api_path(endpoint), delay);
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Recorded> {
        let path = Self::api_path(endpoint);
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            ..ClientConfig::default()
        }
    }

    pub fn transport(&self, tokens: AuthTokens) -> HttpTransport {
        HttpTransport::new(self.config(), tokens).expect("Failed to build transport")
    }

    pub fn transport_with(&self, config: ClientConfig, tokens: AuthTokens) -> HttpTransport {
        HttpTransport::new(config, tokens).expect("Failed to build transport")
    }
}

pub fn logged_in_tokens() -> AuthTokens {
    AuthTokens::new(TokenPair {
        access: Some("access-token".to_string()),
        refresh: Some("refresh-token".to_string()),
    })
}

// ---------------------------------------------------------------------------
// In-memory API fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ModelCall {
    List {
        model: String,
        params: ListParams,
    },
    Create {
        model: String,
        fields: Fields,
    },
    Update {
        model: String,
        key_field: String,
        key_value: Value,
        updates: Fields,
    },
    Delete {
        model: String,
        key_field: String,
        key_value: Value,
    },
    Search {
        model: String,
        query: String,
        limit: usize,
    },
    Upload {
        model: String,
        path: String,
    },
}

/// Serves rows from memory and records every call.
#[derive(Default)]
pub struct FakeModelApi {
    calls: Mutex<Vec<ModelCall>>,
    rows: Mutex<HashMap<String, Vec<Value>>>,
    list_error: Mutex<Option<String>>,
    search_error: Mutex<Option<String>>,
}

impl FakeModelApi {
    pub fn with_rows(model: &str, rows: Vec<Value>) -> Self {
        let api = Self::default();
        api.rows.lock().unwrap().insert(model.to_string(), rows);
        api
    }

    pub fn fail_lists(&self, message: Option<&str>) {
        *self.list_error.lock().unwrap() = message.map(str::to_string);
    }

    pub fn fail_searches(&self, message: &str) {
        *self.search_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<ListParams> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ModelCall::List { params, .. } => Some(params),
                _ => None,
            })
            .collect()
    }

    fn matching(&self, model: &str, search: &str) -> Vec<Value> {
        let needle = search.to_lowercase();
        self.rows
            .lock()
            .unwrap()
            .get(model)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|row| {
                needle.is_empty()
                    || row
                        .as_object()
                        .map(|o| {
                            o.values()
                                .filter_map(Value::as_str)
                                .any(|s| s.to_lowercase().contains(&needle))
                        })
                        .unwrap_or(false)
            })
            .collect()
    }
}

#[async_trait]
impl ModelApi for FakeModelApi {
    async fn list(&self, model: &str, params: &ListParams) -> Result<Page<Value>, AppError> {
        self.calls.lock().unwrap().push(ModelCall::List {
            model: model.to_string(),
            params: params.clone(),
        });
        if let Some(message) = self.list_error.lock().unwrap().clone() {
            return Err(AppError::Api {
                status: 500,
                message,
            });
        }
        let all = self.matching(model, &params.search);
        let size = params.items_per_page as usize;
        let start = (params.page.saturating_sub(1) as usize) * size;
        let rows = all.iter().skip(start).take(size).cloned().collect();
        Ok(Page {
            rows,
            total: all.len() as u64,
        })
    }

    async fn create(&self, model: &str, fields: &Fields) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(ModelCall::Create {
            model: model.to_string(),
            fields: fields.clone(),
        });
        Ok(json!({"success": true}))
    }

    async fn update(
        &self,
        model: &str,
        key_field: &str,
        key_value: &Value,
        updates: &Fields,
    ) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(ModelCall::Update {
            model: model.to_string(),
            key_field: key_field.to_string(),
            key_value: key_value.clone(),
            updates: updates.clone(),
        });
        Ok(json!({"success": true}))
    }

    async fn delete(
        &self,
        model: &str,
        key_field: &str,
        key_value: &Value,
    ) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(ModelCall::Delete {
            model: model.to_string(),
            key_field: key_field.to_string(),
            key_value: key_value.clone(),
        });
        Ok(json!({"success": true}))
    }

    async fn search(&self, model: &str, query: &str, limit: usize) -> Result<Vec<Value>, AppError> {
        self.calls.lock().unwrap().push(ModelCall::Search {
            model: model.to_string(),
            query: query.to_string(),
            limit,
        });
        if let Some(message) = self.search_error.lock().unwrap().clone() {
            return Err(AppError::Api {
                status: 500,
                message,
            });
        }
        Ok(self.matching(model, query))
    }

    async fn upload(&self, model: &str, path: &Path) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(ModelCall::Upload {
            model: model.to_string(),
            path: path.display().to_string(),
        });
        Ok(json!({"message": "uploaded"}))
    }
}

/// Exam endpoints from memory; records call names in order.
#[derive(Default)]
pub struct FakeExamApi {
    pub calls: Mutex<Vec<String>>,
    pub plannings: Mutex<Vec<PlanningWithDetails>>,
    pub rosters: Mutex<HashMap<i64, Vec<SurveillantWithDetails>>>,
    pub monitoring: Mutex<Option<Vec<MonitoringPlanningItem>>>,
    pub created: Mutex<Vec<CreatePlanningRequest>>,
    pub updated: Mutex<Vec<UpdatePlanningRequest>>,
    pub sent: Mutex<Vec<Value>>,
    pub fail_schedule_check: Mutex<bool>,
}

impl FakeExamApi {
    pub fn call_names(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ExamApi for FakeExamApi {
    async fn plannings_with_details(&self) -> Result<Vec<PlanningWithDetails>, AppError> {
        self.log("plannings_with_details");
        Ok(self.plannings.lock().unwrap().clone())
    }

    async fn surveillants_by_planning(
        &self,
        id_planning: i64,
    ) -> Result<Vec<SurveillantWithDetails>, AppError> {
        self.log("surveillants_by_planning");
        Ok(self
            .rosters
            .lock()
            .unwrap()
            .get(&id_planning)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_planning(&self, request: CreatePlanningRequest) -> Result<Value, AppError> {
        self.log("create_planning");
        self.created.lock().unwrap().push(request);
        Ok(json!({"success": true}))
    }

    async fn update_planning(&self, request: UpdatePlanningRequest) -> Result<Value, AppError> {
        self.log("update_planning");
        self.updated.lock().unwrap().push(request);
        Ok(json!({"success": true}))
    }

    async fn delete_planning(&self, _id_planning: i64) -> Result<Value, AppError> {
        self.log("delete_planning");
        Ok(json!({"success": true}))
    }

    async fn check_exam_date(&self) -> Result<ConflictReport, AppError> {
        self.log("check_exam_date");
        Ok(ConflictReport {
            conflicts: vec![json!({"date": "2025-01-12"})],
            message: None,
        })
    }

    async fn check_teacher_schedule_conflict(&self) -> Result<ConflictReport, AppError> {
        self.log("check_teacher_schedule_conflict");
        if *self.fail_schedule_check.lock().unwrap() {
            return Err(AppError::Api {
                status: 500,
                message: "Server error. Please check the server logs.".to_string(),
            });
        }
        Ok(ConflictReport {
            conflicts: Vec::new(),
            message: Some("No conflicts".to_string()),
        })
    }

    async fn check_surveillance_workload(
        &self,
        _target_surveillances: Option<u32>,
    ) -> Result<WorkloadResponse, AppError> {
        self.log("check_surveillance_workload");
        Ok(WorkloadResponse::default())
    }

    async fn monitoring_planning(&self) -> Result<Vec<MonitoringPlanningItem>, AppError> {
        self.log("monitoring_planning");
        self.monitoring
            .lock()
            .unwrap()
            .clone()
            .ok_or(AppError::Timeout {
                after: Duration::from_secs(8),
            })
    }

    async fn send_bulk_pv(&self) -> Result<SendResult, AppError> {
        self.log("send_bulk_pv");
        Ok(SendResult::default())
    }

    async fn send_bulk_convocations(
        &self,
        convocations: Option<Value>,
    ) -> Result<SendResult, AppError> {
        self.log("send_bulk_convocations");
        self.sent
            .lock()
            .unwrap()
            .push(convocations.unwrap_or(Value::Null));
        Ok(SendResult::default())
    }

    async fn send_pv(&self, pv: Value) -> Result<SendResult, AppError> {
        self.log("send_pv");
        self.sent.lock().unwrap().push(pv);
        Ok(SendResult::default())
    }

    async fn send_convocation(&self, convocation: Value) -> Result<SendResult, AppError> {
        self.log("send_convocation");
        self.sent.lock().unwrap().push(convocation);
        Ok(SendResult::default())
    }
}

pub fn teacher_row(code: &str, nom: &str, prenom: &str) -> Value {
    json!({
        "Code_Enseignant": code,
        "nom": nom,
        "prenom": prenom,
        "département": "Informatique",
        "grade": "MCA",
        "etat": "ACTIF",
        "email1": format!("{}@univ.dz", code.to_lowercase()),
    })
}

pub fn planning_json(id: i64, level: &str) -> Value {
    json!({
        "id_planning": id,
        "section": "A",
        "session": "Normale",
        "nombre_surveillant": 2,
        "creneau": {"id_creneau": 10 + id, "date_creneau": "2025-01-12", "heure_creneau": "08:30", "salle": "Amphi A"},
        "formation": {
            "id": 100 + id,
            "domaine": "MI",
            "filière": "Informatique",
            "niveau_cycle": level,
            "specialités": "ISIL",
            "semestre": "S1",
            "modules": "Algorithmique, Analyse 1"
        }
    })
}

pub fn planning(id: i64, level: &str) -> PlanningWithDetails {
    serde_json::from_value(planning_json(id, level)).expect("valid planning json")
}
