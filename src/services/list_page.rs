use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::client::dto::{ListParams, Page};
use crate::client::{ModelApi, delete_record, list_records};
use crate::error::AppError;
use crate::services::search::{Debouncer, Settled, next_settled};
use crate::table::{self, Confirm, PageItem, RenderedTable, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Paginated, searchable list of one resource.
///
/// The page number survives unrelated refetches; a settled search term always
/// goes back to page 1.
pub struct ListPage<R: TableRow> {
    api: Arc<dyn ModelApi>,
    page: u32,
    page_size: u32,
    search: String,
    state: LoadState,
    rows: Vec<R>,
    total: u64,
    last_params: Option<ListParams>,
    debouncer: Debouncer<String>,
    search_rx: Settled<String>,
}

impl<R: TableRow> ListPage<R> {
    pub fn new(api: Arc<dyn ModelApi>, page_size: u32, debounce: Duration) -> Self {
        let (debouncer, search_rx) = Debouncer::new(debounce);
        Self {
            api,
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            state: LoadState::Idle,
            rows: Vec::new(),
            total: 0,
            last_params: None,
            debouncer,
            search_rx,
        }
    }

    pub async fn mount(&mut self) {
        self.page = 1;
        self.search.clear();
        self.fetch_current().await;
    }

    pub async fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
        self.fetch_current().await;
    }

    /// Records a keystroke; the fetch happens once the term settles.
    pub fn set_search(&mut self, term: &str) {
        self.debouncer.push(term.to_string());
    }

    /// Applies the settled search term, if one is pending. Returns whether a
    /// fetch was issued.
    pub async fn settle_search(&mut self) -> bool {
        let Some(term) = next_settled(&self.debouncer, &mut self.search_rx).await else {
            return false;
        };
        self.search = term;
        self.page = 1;
        self.fetch_current().await;
        true
    }

    /// Refetches the current page, e.g. after a form saved.
    pub async fn refresh(&mut self) {
        self.fetch_current().await;
    }

    /// Repeats the last fetch with exactly the same parameters.
    pub async fn retry(&mut self) {
        match self.last_params.clone() {
            Some(params) => self.fetch(params).await,
            None => self.fetch_current().await,
        }
    }

    /// Deletes `record` after confirmation and refetches the current page.
    /// Returns `Ok(false)` when the user declined.
    pub async fn delete(&mut self, record: &R, confirm: &dyn Confirm) -> Result<bool, AppError> {
        if !confirm.confirm(R::DELETE_PROMPT) {
            info!("Delete of {} row cancelled", R::MODEL);
            return Ok(false);
        }
        delete_record(self.api.as_ref(), record).await?;
        self.fetch_current().await;
        Ok(true)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn total_pages(&self) -> u32 {
        table::total_pages(self.total, self.page_size)
    }

    pub fn pagination(&self) -> Vec<PageItem> {
        table::pagination(self.page, self.total_pages())
    }

    pub fn table(&self) -> RenderedTable {
        table::render(&self.rows)
    }

    async fn fetch_current(&mut self) {
        let params = ListParams::new(self.page, self.page_size, self.search.clone());
        self.fetch(params).await;
    }

    async fn fetch(&mut self, params: ListParams) {
        self.state = LoadState::Loading;
        self.last_params = Some(params.clone());

        match list_records::<R>(self.api.as_ref(), &params).await {
            Ok(Page { rows, total }) => {
                self.rows = rows;
                self.total = total;
                self.state = LoadState::Success;
            }
            Err(e) => {
                warn!("Loading {} page {} failed: {}", R::MODEL, params.page, e);
                self.rows.clear();
                self.total = 0;
                self.state = LoadState::Error(e.to_string());
            }
        }
    }
}
