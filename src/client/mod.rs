pub mod auth;
pub mod dto;
pub mod exam;
pub mod http;

use std::path::Path;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::resource::{self, Resource, ensure_key};

use self::dto::{
    AddRowRequest, DeleteModelRequest, EditModelRequest, Fields, ListParams, Page, PageResponse,
    SearchRequest, SearchResponse,
};
use self::http::HttpTransport;

pub use self::auth::AuthClient;
pub use self::exam::{ExamApi, HttpExamClient};
pub use self::http::{AuthTokens, TokenPair};

pub const SEARCH_LIMIT: usize = 50;
const UPLOAD_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Generic CRUD over the model endpoint family.
///
/// Rows travel as raw JSON; the typed helpers below decode them through a
/// [`Resource`] schema.
#[async_trait]
pub trait ModelApi: Send + Sync {
    async fn list(&self, model: &str, params: &ListParams) -> Result<Page<Value>, AppError>;
    async fn create(&self, model: &str, fields: &Fields) -> Result<Value, AppError>;
    async fn update(
        &self,
        model: &str,
        key_field: &str,
        key_value: &Value,
        updates: &Fields,
    ) -> Result<Value, AppError>;
    async fn delete(&self, model: &str, key_field: &str, key_value: &Value)
    -> Result<Value, AppError>;
    async fn search(&self, model: &str, query: &str, limit: usize) -> Result<Vec<Value>, AppError>;
    async fn upload(&self, model: &str, path: &Path) -> Result<Value, AppError>;
}

pub struct HttpModelClient {
    transport: HttpTransport,
}

impl HttpModelClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ModelApi for HttpModelClient {
    async fn list(&self, model: &str, params: &ListParams) -> Result<Page<Value>, AppError> {
        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::GET, "get_model_data/")
            .query(&params.to_query(model));

        let response: PageResponse = self.transport.send_json(builder, config.timeout).await?;
        let (rows, total) = response.into_parts();
        info!(
            "Fetched {} {} rows (page {}, total {})",
            rows.len(),
            model,
            params.page,
            total
        );
        Ok(Page { rows, total })
    }

    async fn create(&self, model: &str, fields: &Fields) -> Result<Value, AppError> {
        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::POST, "add_model_row/")
            .json(&AddRowRequest { model, fields });

        let created = self.transport.send_json(builder, config.timeout).await?;
        info!("Created {} row", model);
        Ok(created)
    }

    async fn update(
        &self,
        model: &str,
        key_field: &str,
        key_value: &Value,
        updates: &Fields,
    ) -> Result<Value, AppError> {
        ensure_key(model, key_value)?;
        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::POST, "edit_model/")
            .json(&EditModelRequest {
                model,
                field: key_field,
                value: key_value,
                updates,
            });

        let updated = self.transport.send_json(builder, config.timeout).await?;
        info!("Updated {} {}={}", model, key_field, key_value);
        Ok(updated)
    }

    async fn delete(
        &self,
        model: &str,
        key_field: &str,
        key_value: &Value,
    ) -> Result<Value, AppError> {
        ensure_key(model, key_value)?;
        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::POST, "delete_model/")
            .json(&DeleteModelRequest {
                model,
                field: key_field,
                value: key_value,
            });

        let deleted = self.transport.send_json(builder, config.timeout).await?;
        info!("Deleted {} {}={}", model, key_field, key_value);
        Ok(deleted)
    }

    async fn search(&self, model: &str, query: &str, limit: usize) -> Result<Vec<Value>, AppError> {
        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::POST, "search_model/")
            .json(&SearchRequest {
                model,
                query,
                limit,
            });

        let response: SearchResponse = self.transport.send_json(builder, config.timeout).await?;
        info!("Search {} for {:?}: {} hits", model, query, response.count);
        Ok(response.results)
    }

    async fn upload(&self, model: &str, path: &Path) -> Result<Value, AppError> {
        let endpoint = resource::upload_endpoint(model)?;
        let file_name = check_upload_file(path)?;

        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();
        let form = Form::new().part("excel_file", Part::bytes(bytes).file_name(file_name.clone()));

        let config = self.transport.config();
        let builder = self
            .transport
            .request(Method::POST, endpoint)
            .multipart(form);

        let result = self
            .transport
            .send_json(builder, config.upload_timeout)
            .await?;
        info!("Uploaded {} ({} bytes) to {}", file_name, size, endpoint);
        Ok(result)
    }
}

fn check_upload_file(path: &Path) -> Result<String, AppError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::validation(
            "Please select a valid Excel file (.xlsx, .xls) or CSV file",
        ));
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation("Upload path has no file name"))
}

fn decode_rows<R: Resource>(rows: Vec<Value>) -> Result<Vec<R>, AppError> {
    rows.into_iter()
        .map(|row| serde_json::from_value::<R>(row).map_err(AppError::from))
        .collect()
}

/// Fetches one page of `R` rows.
pub async fn list_records<R: Resource>(
    api: &dyn ModelApi,
    params: &ListParams,
) -> Result<Page<R>, AppError> {
    let page = api.list(R::MODEL, params).await?;
    Ok(Page {
        rows: decode_rows(page.rows)?,
        total: page.total,
    })
}

pub async fn create_record<R: Resource>(api: &dyn ModelApi, fields: &Fields) -> Result<Value, AppError> {
    api.create(R::MODEL, fields).await
}

/// Updates the record whose primary key is `key`.
pub async fn update_record<R: Resource>(
    api: &dyn ModelApi,
    key: &Value,
    updates: &Fields,
) -> Result<Value, AppError> {
    ensure_key(R::MODEL, key)?;
    api.update(R::MODEL, R::KEY_FIELD, key, updates).await
}

/// Deletes `record`, reading its key through the resource schema. A record
/// without a key is rejected before anything is sent.
pub async fn delete_record<R: Resource>(api: &dyn ModelApi, record: &R) -> Result<Value, AppError> {
    let key = record.require_key()?;
    api.delete(R::MODEL, R::KEY_FIELD, &key).await
}

/// Remote search; rows that fail to decode are skipped.
pub async fn search_records<R: Resource>(
    api: &dyn ModelApi,
    query: &str,
    limit: usize,
) -> Result<Vec<R>, AppError> {
    let hits = api.search(R::MODEL, query, limit).await?;
    Ok(hits
        .into_iter()
        .filter_map(|hit| match serde_json::from_value::<R>(hit) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable {} search hit: {}", R::MODEL, e);
                None
            }
        })
        .collect())
}
