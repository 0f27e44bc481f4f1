use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_INSTITUTION: &str = "Faculté d'Informatique";

const MIN_DEBOUNCE_MS: u64 = 300;
const MAX_DEBOUNCE_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub exam_timeout: Duration,
    pub email_timeout: Duration,
    pub upload_timeout: Duration,
    pub page_size: u32,
    pub debounce: Duration,
    pub database_url: String,
    pub institution: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            exam_timeout: Duration::from_secs(8),
            email_timeout: Duration::from_secs(300),
            upload_timeout: Duration::from_secs(60),
            page_size: 10,
            debounce: Duration::from_millis(400),
            database_url: "sqlite://examtrack.db?mode=rwc".to_string(),
            institution: DEFAULT_INSTITUTION.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let base_url = env::var("EXAMTRACK_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let timeout = secs_var("EXAMTRACK_TIMEOUT_SECS")?.unwrap_or(defaults.timeout);
        let exam_timeout = secs_var("EXAMTRACK_EXAM_TIMEOUT_SECS")?.unwrap_or(defaults.exam_timeout);
        let email_timeout =
            secs_var("EXAMTRACK_EMAIL_TIMEOUT_SECS")?.unwrap_or(defaults.email_timeout);
        let upload_timeout =
            secs_var("EXAMTRACK_UPLOAD_TIMEOUT_SECS")?.unwrap_or(defaults.upload_timeout);

        let page_size = parse_var::<u32>("EXAMTRACK_PAGE_SIZE")?.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(AppError::Config("EXAMTRACK_PAGE_SIZE must be positive".to_string()));
        }

        let debounce = parse_var::<u64>("EXAMTRACK_DEBOUNCE_MS")?
            .map(|ms| Duration::from_millis(ms.clamp(MIN_DEBOUNCE_MS, MAX_DEBOUNCE_MS)))
            .unwrap_or(defaults.debounce);

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let institution = env::var("EXAMTRACK_INSTITUTION").unwrap_or(defaults.institution);

        Ok(Self {
            base_url,
            timeout,
            exam_timeout,
            email_timeout,
            upload_timeout,
            page_size,
            debounce,
            database_url,
            institution,
        })
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} is not a valid number: {}", key, raw))),
        Err(_) => Ok(None),
    }
}

fn secs_var(key: &str) -> Result<Option<Duration>, AppError> {
    Ok(parse_var::<u64>(key)?.map(Duration::from_secs))
}
