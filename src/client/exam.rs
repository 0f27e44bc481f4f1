use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::dto::{DeletePlanningRequest, SendResult, WorkloadRequest};
use super::http::HttpTransport;
use crate::error::AppError;
use crate::models::{
    ConflictReport, CreatePlanningRequest, MonitoringPlanningItem, PlanningWithDetails,
    Surveillant, SurveillantWithDetails, UpdatePlanningRequest, WorkloadResponse,
};

/// Planning, conflict-check and email-dispatch endpoints.
#[async_trait]
pub trait ExamApi: Send + Sync {
    async fn plannings_with_details(&self) -> Result<Vec<PlanningWithDetails>, AppError>;
    async fn surveillants_by_planning(
        &self,
        id_planning: i64,
    ) -> Result<Vec<SurveillantWithDetails>, AppError>;
    async fn create_planning(&self, request: CreatePlanningRequest) -> Result<Value, AppError>;
    async fn update_planning(&self, request: UpdatePlanningRequest) -> Result<Value, AppError>;
    async fn delete_planning(&self, id_planning: i64) -> Result<Value, AppError>;
    async fn check_exam_date(&self) -> Result<ConflictReport, AppError>;
    async fn check_teacher_schedule_conflict(&self) -> Result<ConflictReport, AppError>;
    async fn check_surveillance_workload(
        &self,
        target_surveillances: Option<u32>,
    ) -> Result<WorkloadResponse, AppError>;
    async fn monitoring_planning(&self) -> Result<Vec<MonitoringPlanningItem>, AppError>;
    async fn send_bulk_pv(&self) -> Result<SendResult, AppError>;
    async fn send_bulk_convocations(&self, convocations: Option<Value>)
    -> Result<SendResult, AppError>;
    async fn send_pv(&self, pv: Value) -> Result<SendResult, AppError>;
    async fn send_convocation(&self, convocation: Value) -> Result<SendResult, AppError>;
}

/// First supervisor without an explicit flag becomes the lead, the others
/// plain supervisors.
pub fn fill_lead_flags(surveillants: Vec<Surveillant>) -> Vec<Surveillant> {
    surveillants
        .into_iter()
        .enumerate()
        .map(|(index, mut s)| {
            if s.est_charge_cours.is_none() {
                s.est_charge_cours = Some(if index == 0 { 1 } else { 0 });
            }
            s
        })
        .collect()
}

pub fn validate_create(request: &CreatePlanningRequest) -> Result<(), AppError> {
    if request.formation_id <= 0
        || request.section.trim().is_empty()
        || request.id_creneau <= 0
        || request.surveillants.is_empty()
    {
        return Err(AppError::validation(
            "Missing required fields: formation_id, section, id_creneau, and surveillants are required",
        ));
    }
    Ok(())
}

pub fn validate_update(request: &UpdatePlanningRequest) -> Result<(), AppError> {
    if request.id_planning <= 0 || request.surveillants.is_empty() {
        return Err(AppError::validation(
            "Missing required fields: id_planning and surveillants are required",
        ));
    }
    Ok(())
}

/// A workload answer is only usable when both summary blocks are present.
pub fn parse_workload(body: Value) -> Result<WorkloadResponse, AppError> {
    for key in ["global_metrics", "teacher_distribution"] {
        if body.get(key).is_none_or(Value::is_null) {
            return Err(AppError::Decode(format!(
                "Invalid workload response: missing {}",
                key
            )));
        }
    }
    Ok(serde_json::from_value(body)?)
}

pub struct HttpExamClient {
    transport: HttpTransport,
}

impl HttpExamClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    async fn exam_call<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let timeout = self.transport.config().exam_timeout;
        self.transport.send_json(builder, timeout).await
    }

    async fn email_call(&self, builder: reqwest::RequestBuilder) -> Result<SendResult, AppError> {
        let timeout = self.transport.config().email_timeout;
        let result: SendResult = self.transport.send_json(builder, timeout).await?;
        if result.is_success() {
            info!("Email dispatch finished: {}", result.summary());
        } else {
            warn!("Email dispatch reported a problem: {}", result.summary());
        }
        Ok(result)
    }
}

#[async_trait]
impl ExamApi for HttpExamClient {
    async fn plannings_with_details(&self) -> Result<Vec<PlanningWithDetails>, AppError> {
        let builder = self
            .transport
            .request(Method::GET, "get_planning_with_creneau_and_formation/");
        let plannings: Vec<PlanningWithDetails> = self.exam_call(builder).await?;
        info!("Fetched {} plannings", plannings.len());
        Ok(plannings)
    }

    async fn surveillants_by_planning(
        &self,
        id_planning: i64,
    ) -> Result<Vec<SurveillantWithDetails>, AppError> {
        let builder = self
            .transport
            .request(Method::GET, "get_surveillants_by_planning/")
            .query(&[("id_planning", id_planning)]);
        self.exam_call(builder).await
    }

    async fn create_planning(&self, mut request: CreatePlanningRequest) -> Result<Value, AppError> {
        validate_create(&request)?;
        request.surveillants = fill_lead_flags(request.surveillants);

        let builder = self
            .transport
            .request(Method::POST, "create_planning_with_surveillants/")
            .json(&request);
        let created = self.exam_call(builder).await?;
        info!(
            "Created planning for formation {} section {} with {} supervisors",
            request.formation_id,
            request.section,
            request.surveillants.len()
        );
        Ok(created)
    }

    async fn update_planning(&self, mut request: UpdatePlanningRequest) -> Result<Value, AppError> {
        validate_update(&request)?;
        request.surveillants = fill_lead_flags(request.surveillants);

        let builder = self
            .transport
            .request(Method::PUT, "update_planning_with_surveillants/")
            .json(&request);
        let updated = self.exam_call(builder).await?;
        info!("Updated planning {}", request.id_planning);
        Ok(updated)
    }

    async fn delete_planning(&self, id_planning: i64) -> Result<Value, AppError> {
        if id_planning <= 0 {
            return Err(AppError::validation("Cannot delete planning: missing id_planning"));
        }
        let builder = self
            .transport
            .request(Method::DELETE, "delete_planning_only/")
            .json(&DeletePlanningRequest { id_planning });
        let deleted = self.exam_call(builder).await?;
        info!("Deleted planning {}", id_planning);
        Ok(deleted)
    }

    async fn check_exam_date(&self) -> Result<ConflictReport, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "check_exam_date/")
            .json(&json!({}));
        self.exam_call(builder).await
    }

    async fn check_teacher_schedule_conflict(&self) -> Result<ConflictReport, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "check_enseignant_schedule_conflict/")
            .json(&json!({}));
        self.exam_call(builder).await
    }

    async fn check_surveillance_workload(
        &self,
        target_surveillances: Option<u32>,
    ) -> Result<WorkloadResponse, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "check_surveillance_workload/")
            .json(&WorkloadRequest {
                target_surveillances,
            });
        let body: Value = self.exam_call(builder).await?;
        parse_workload(body)
    }

    async fn monitoring_planning(&self) -> Result<Vec<MonitoringPlanningItem>, AppError> {
        let builder = self
            .transport
            .request(Method::GET, "get_monitoring_planning/");
        self.exam_call(builder).await
    }

    async fn send_bulk_pv(&self) -> Result<SendResult, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "send_bulk_pv/")
            .json(&json!({}));
        self.email_call(builder).await
    }

    async fn send_bulk_convocations(
        &self,
        convocations: Option<Value>,
    ) -> Result<SendResult, AppError> {
        let body = match convocations {
            Some(list) => json!({ "convocations": list }),
            None => json!({}),
        };
        let builder = self
            .transport
            .request(Method::POST, "send_bulk_convocations/")
            .json(&body);
        self.email_call(builder).await
    }

    async fn send_pv(&self, pv: Value) -> Result<SendResult, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "send_pv/")
            .json(&pv);
        self.email_call(builder).await
    }

    async fn send_convocation(&self, convocation: Value) -> Result<SendResult, AppError> {
        let builder = self
            .transport
            .request(Method::POST, "send_convocation/")
            .json(&convocation);
        self.email_call(builder).await
    }
}
