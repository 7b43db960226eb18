//! Seams between the screen logic and the HTTP client.

use crate::error::Result;
use crate::filters::FilterSet;
use crate::models::{Collection, FetchedPage, Item, ItemId, PageToken};
use async_trait::async_trait;
use serde_json::Value;
use strum_macros::Display;
use utils::multipart::MultipartForm;

/// Source of paginated listings.
#[async_trait]
pub trait ListBackend: Send + Sync {
    /// Fetch one page for `filters`, starting after `token` when given,
    /// together with the total count for the same filters.
    async fn fetch_page(&self, filters: &FilterSet, token: Option<&PageToken>) -> Result<FetchedPage>;

    /// Persist the position of one record (`PATCH <collection>/order/:id`).
    async fn save_order(&self, collection: Collection, id: &ItemId, order: i64) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum FormMethod {
    Post,
    Put,
}

/// Everything the screens need beyond listings.
#[async_trait]
pub trait AdminBackend: ListBackend {
    async fn get_record(&self, collection: Collection, id: &ItemId) -> Result<Item>;

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value>;

    async fn patch(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value>;

    async fn put(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value>;

    /// Send a `multipart/form-data` body to `path` (relative to the API base).
    async fn send_form(
        &self,
        collection: Collection,
        method: FormMethod,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value>;

    /// Plain GET of an arbitrary endpoint, used by the dashboard.
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value>;
}
