pub mod routes;

use crate::backend::{AdminBackend, FormMethod, ListBackend};
use crate::cache::{CacheConfig, CacheKey, CacheStats, ResponseCache, SharedResponseCache};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::filters::FilterSet;
use crate::language::LocalizedMessage;
use crate::models::{Collection, CountResponse, FetchedPage, Item, ItemId, PageResponse, PageToken};
use async_trait::async_trait;
use routes::{count_route, list_route, order_path, record_path, Route};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use surf::http::{Method, Mime};
use surf::{Body, Client, RequestBuilder};
use utils::endpoint::{Endpoint, Url};
use utils::multipart::MultipartForm;
use utils::surf_logging::SurfLogging;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

const NO_PARAMS: [(&str, &str); 0] = [];

/// Body of a non-2xx answer.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<LocalizedMessage>,
}

/// Client for the admin REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    endpoint: Endpoint,
    page_size: u32,
    cache: Option<SharedResponseCache>,
}

impl ApiClient {
    /// Create a client without a response cache.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::new().with(SurfLogging),
            endpoint: Endpoint::parse(base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            cache: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Self::new(config.base_url())?.with_page_size(*config.page_size());
        if *config.cache().enabled() {
            Ok(client.with_cache(config.cache().to_cache_config()))
        } else {
            Ok(client)
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Cache record and count responses until a mutation of their
    /// collection or until the TTL runs out.
    pub fn with_cache(mut self, cache_config: CacheConfig) -> Self {
        self.cache = Some(Arc::new(ResponseCache::new(cache_config)));
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Get cache statistics if caching is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    pub fn evict_expired_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.evict_expired();
        }
    }

    fn invalidate(&self, collection: Collection) {
        if let Some(cache) = &self.cache {
            cache.invalidate(collection);
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value> {
        let mut response = request.await?;
        let status = response.status();
        let body = response.body_bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.message);
            return Err(Error::Api {
                status: status as u16,
                message,
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get(&self, url: &Url) -> Result<Value> {
        self.execute(self.http.get(url.as_str())).await
    }

    async fn get_cached(&self, key: CacheKey, collection: Collection, url: &Url) -> Result<Value> {
        if let Some(cache) = &self.cache {
            if let Some(value) = cache.get(&key) {
                return Ok(value);
            }
        }

        let epoch = self.cache.as_ref().map(|cache| cache.epoch(collection));
        let value = self.get(url).await?;

        if let (Some(cache), Some(epoch)) = (&self.cache, epoch) {
            cache.put_since(key, collection, epoch, value.clone());
        }
        Ok(value)
    }

    async fn send_json(
        &self,
        method: Method,
        collection: Collection,
        path: &str,
        payload: &Value,
    ) -> Result<Value> {
        let url = self.endpoint.url(path, &NO_PARAMS)?;
        let request = self.http.request(method, url.as_str()).body_json(payload)?;
        let result = self.execute(request).await;
        self.invalidate(collection);
        result
    }

    /// Read a `{ count }` endpoint; the answer is cached per URL.
    pub async fn count(
        &self,
        collection: Collection,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<u64> {
        let url = self.endpoint.url(path, params)?;
        let value = self
            .get_cached(CacheKey::count(url.as_str()), collection, &url)
            .await?;
        read_count(value)
    }

    /// Uncached count, so a listing never reports a stale total.
    async fn fetch_count(&self, route: &Route) -> Result<u64> {
        let url = self.route_url(route)?;
        read_count(self.get(&url).await?)
    }

    fn route_url(&self, route: &Route) -> Result<Url> {
        Ok(self.endpoint.url(&route.path, &route.params)?)
    }

    async fn list(&self, url: &Url) -> Result<PageResponse> {
        let value = self.get(url).await?;
        if value.is_null() {
            return Ok(PageResponse::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// One page of `filters` and the total count, requested together.
    pub async fn list_page(
        &self,
        filters: &FilterSet,
        token: Option<&PageToken>,
    ) -> Result<FetchedPage> {
        let list_url = self.route_url(&list_route(filters, self.page_size, token))?;
        let count = count_route(filters);
        let (page, total) = futures::try_join!(self.list(&list_url), self.fetch_count(&count))?;

        let items = page.data.unwrap_or_default();
        log::debug!(
            "Fetched {} {} records (total {}, next {:?})",
            items.len(),
            filters.collection(),
            total,
            page.next_page_token
        );
        Ok(FetchedPage::new(items, page.next_page_token, total))
    }

    /// `PATCH <collection>/order/:id { order }`
    pub async fn patch_order(&self, collection: Collection, id: &ItemId, order: i64) -> Result<()> {
        self.send_json(
            Method::Patch,
            collection,
            &order_path(collection, id),
            &json!({ "order": order }),
        )
        .await
        .map(|_| ())
    }

    async fn multipart(
        &self,
        method: Method,
        collection: Collection,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value> {
        let url = self.endpoint.url(path, &NO_PARAMS)?;
        let mime: Mime = form
            .content_type()
            .parse()
            .map_err(|err: surf::Error| Error::Transport(err.to_string()))?;
        log::debug!("Sending {:?} to {}", form.field_names(), url);
        let mut body = Body::from_bytes(form.into_body());
        body.set_mime(mime);
        let request = self.http.request(method, url.as_str()).body(body);
        let result = self.execute(request).await;
        self.invalidate(collection);
        result
    }

    pub async fn post_multipart(
        &self,
        collection: Collection,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value> {
        self.multipart(Method::Post, collection, path, form).await
    }

    pub async fn put_multipart(
        &self,
        collection: Collection,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value> {
        self.multipart(Method::Put, collection, path, form).await
    }
}

fn read_count(value: Value) -> Result<u64> {
    if value.is_null() {
        return Ok(0);
    }
    Ok(serde_json::from_value::<CountResponse>(value)?.count)
}

#[async_trait]
impl ListBackend for ApiClient {
    async fn fetch_page(&self, filters: &FilterSet, token: Option<&PageToken>) -> Result<FetchedPage> {
        self.list_page(filters, token).await
    }

    async fn save_order(&self, collection: Collection, id: &ItemId, order: i64) -> Result<()> {
        self.patch_order(collection, id, order).await
    }
}

#[async_trait]
impl AdminBackend for ApiClient {
    async fn get_record(&self, collection: Collection, id: &ItemId) -> Result<Item> {
        let url = self.endpoint.url(&record_path(collection, id), &NO_PARAMS)?;
        let value = self
            .get_cached(CacheKey::record(url.as_str()), collection, &url)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value> {
        self.send_json(Method::Post, collection, collection.path(), &payload)
            .await
    }

    async fn patch(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value> {
        self.send_json(Method::Patch, collection, &record_path(collection, id), &payload)
            .await
    }

    async fn put(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value> {
        self.send_json(Method::Put, collection, &record_path(collection, id), &payload)
            .await
    }

    async fn send_form(
        &self,
        collection: Collection,
        method: FormMethod,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value> {
        match method {
            FormMethod::Post => self.post_multipart(collection, path, form).await,
            FormMethod::Put => self.put_multipart(collection, path, form).await,
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = self.endpoint.url(path, params)?;
        self.get(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::models::lesson::{Grade, LessonType};
    use crate::language::Language;
    use crate::stub::StubServer;

    #[test]
    fn test_client_from_config() {
        let config = ClientConfig::default()
            .with_base_url("http://localhost:3000/api/")
            .with_page_size(0);
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.page_size(), 1);
        assert_eq!(client.endpoint().base().as_str(), "http://localhost:3000/api/");
        assert_eq!(client.cache_stats().map(|stats| stats.total_entries), Some(0));
    }

    #[test]
    fn test_client_without_cache() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        assert!(client.cache_stats().is_none());
        client.clear_cache();
        client.evict_expired_cache();
        assert_eq!(client.page_size(), DEFAULT_PAGE_SIZE);
    }

    fn cached_client(server: &StubServer) -> ApiClient {
        ApiClient::new(&server.base_url())
            .unwrap()
            .with_cache(CacheConfig::default())
    }

    #[tokio::test]
    async fn test_error_body_is_decoded() {
        let server = StubServer::start().await;
        server.route(
            "GET",
            "/lesson/9",
            404,
            r#"{"message":{"vi":"Không tìm thấy bài học","en":"Lesson not found"}}"#,
        );
        let client = cached_client(&server);

        let err = client
            .get_record(Collection::Lesson, &ItemId::from("9"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, message: Some(_) }));
        assert_eq!(err.localized(Language::En), "Lesson not found");
        assert_eq!(err.localized(Language::Vi), "Không tìm thấy bài học");
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = StubServer::start().await;
        server.route("PUT", "/user/u1", 200, "");
        server.route("GET", "/pupil/countAll", 200, "  ");
        let client = cached_client(&server);

        let answer = client
            .put(Collection::User, &ItemId::from("u1"), json!({ "mode": "dark" }))
            .await
            .unwrap();
        assert_eq!(answer, Value::Null);
        assert_eq!(client.count(Collection::Pupil, "pupil/countAll", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_served_from_cache() {
        let server = StubServer::start().await;
        server.route("GET", "/pupil/countAll", 200, r#"{"count":"42"}"#);
        let client = cached_client(&server);

        for _ in 0..2 {
            let count = client.count(Collection::Pupil, "pupil/countAll", &[]).await.unwrap();
            assert_eq!(count, 42);
        }
        assert_eq!(server.hits("GET", "/pupil/countAll"), 1);
        assert_eq!(client.cache_stats().unwrap().total_entries, 1);
    }

    #[tokio::test]
    async fn test_mutation_refetches_cached_record() {
        let server = StubServer::start().await;
        server.route("GET", "/lesson/5", 200, r#"{"id":"5","name":"Addition"}"#);
        server.route("PATCH", "/lesson/5", 200, r#"{"id":"5"}"#);
        let client = cached_client(&server);
        let id = ItemId::from("5");

        client.get_record(Collection::Lesson, &id).await.unwrap();
        client.get_record(Collection::Lesson, &id).await.unwrap();
        assert_eq!(server.hits("GET", "/lesson/5"), 1);

        client
            .patch(Collection::Lesson, &id, json!({ "name": "Sums" }))
            .await
            .unwrap();
        server.route("GET", "/lesson/5", 200, r#"{"id":"5","name":"Sums"}"#);

        let lesson = client.get_record(Collection::Lesson, &id).await.unwrap();
        assert_eq!(lesson.attribute("name"), Some(&json!("Sums")));
        assert_eq!(server.hits("GET", "/lesson/5"), 2);
        assert_eq!(server.hits("PATCH", "/lesson/5"), 1);
    }

    #[tokio::test]
    async fn test_list_page_always_refetches_total() {
        let server = StubServer::start().await;
        let filters = FilterSet::lessons(Grade::default(), LessonType::Addition);
        let list = list_route(&filters, DEFAULT_PAGE_SIZE, None);
        let count = count_route(&filters);
        server.route(
            "GET",
            &format!("/{}", list.path),
            200,
            r#"{"data":[{"id":"1","order":1}],"nextPageToken":"1"}"#,
        );
        server.route("GET", &format!("/{}", count.path), 200, r#"{"count":20}"#);
        let client = cached_client(&server);

        let first = client.list_page(&filters, None).await.unwrap();
        assert_eq!(first.total, 20);
        assert_eq!(first.next_token, Some(PageToken::new("1")));

        server.route("GET", &format!("/{}", count.path), 200, r#"{"count":21}"#);
        let second = client.list_page(&filters, None).await.unwrap();
        assert_eq!(second.total, 21);
        assert_eq!(server.hits("GET", &format!("/{}", count.path)), 2);
        assert!(server
            .requests()
            .iter()
            .any(|request| request.contains("pageSize=20")));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::new("not a url").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Request);
    }
}
