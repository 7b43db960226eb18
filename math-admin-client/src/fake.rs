//! In-memory backend for controller and screen tests.

use crate::backend::{AdminBackend, FormMethod, ListBackend};
use crate::error::{Error, Result};
use crate::filters::FilterSet;
use crate::models::{Collection, FetchedPage, Item, ItemId, PageToken};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use utils::multipart::MultipartForm;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Collection, Value),
    Patch(Collection, ItemId, Value),
    Put(Collection, ItemId, Value),
    Form {
        collection: Collection,
        method: FormMethod,
        path: String,
        fields: Vec<String>,
    },
    GetJson(String, Vec<(String, String)>),
}

#[derive(Default)]
pub struct FakeBackend {
    pages: Mutex<HashMap<(FilterSet, Option<PageToken>), FetchedPage>>,
    fetches: Mutex<Vec<(FilterSet, Option<PageToken>)>>,
    fail_fetches: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    saved_orders: Mutex<Vec<(Collection, ItemId, i64)>>,
    failing_orders: Mutex<HashSet<ItemId>>,
    records: Mutex<HashMap<(Collection, ItemId), Item>>,
    json: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<Call>>,
    fail_mutations: AtomicBool,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, filters: &FilterSet, token: Option<&str>, page: FetchedPage) {
        self.pages
            .lock()
            .unwrap()
            .insert((filters.clone(), token.map(PageToken::new)), page);
    }

    pub fn record(&self, collection: Collection, item: Item) {
        self.records
            .lock()
            .unwrap()
            .insert((collection, item.id().clone()), item);
    }

    pub fn json(&self, path: &str, value: Value) {
        self.json.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_order_of(&self, id: impl Into<ItemId>) {
        self.failing_orders.lock().unwrap().insert(id.into());
    }

    /// The next fetch waits until the returned handle is notified.
    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fetches(&self) -> Vec<(FilterSet, Option<PageToken>)> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn saved_orders(&self) -> Vec<(Collection, ItemId, i64)> {
        self.saved_orders.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn mutation(&self, call: Call) -> Result<Value> {
        self.calls.lock().unwrap().push(call);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(json!({ "ok": true }))
    }
}

fn server_error() -> Error {
    Error::Api {
        status: 500,
        message: Some(
            [("vi", "Lỗi máy chủ"), ("en", "Server error")]
                .into_iter()
                .collect(),
        ),
    }
}

/// A lesson row as the listing endpoints return it.
pub fn lesson(id: u64, name: &str, order: i64) -> Item {
    Item::new(id)
        .with("name", json!({ "vi": name, "en": name }))
        .with("grade", 1)
        .with("type", "addition")
        .with("order", order)
        .with("isDisabled", false)
}

/// `count` lessons with ids and orders starting at `first`.
pub fn lessons(first: u64, count: u64) -> Vec<Item> {
    (first..first + count)
        .map(|id| lesson(id, &format!("Lesson {}", id), id as i64))
        .collect()
}

#[async_trait]
impl ListBackend for FakeBackend {
    async fn fetch_page(&self, filters: &FilterSet, token: Option<&PageToken>) -> Result<FetchedPage> {
        self.fetches
            .lock()
            .unwrap()
            .push((filters.clone(), token.cloned()));

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&(filters.clone(), token.cloned()))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_order(&self, collection: Collection, id: &ItemId, order: i64) -> Result<()> {
        self.saved_orders
            .lock()
            .unwrap()
            .push((collection, id.clone(), order));
        if self.failing_orders.lock().unwrap().contains(id) {
            return Err(Error::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for FakeBackend {
    async fn get_record(&self, collection: Collection, id: &ItemId) -> Result<Item> {
        self.records
            .lock()
            .unwrap()
            .get(&(collection, id.clone()))
            .cloned()
            .ok_or(Error::Api {
                status: 404,
                message: None,
            })
    }

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value> {
        self.mutation(Call::Create(collection, payload))
    }

    async fn patch(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value> {
        self.mutation(Call::Patch(collection, id.clone(), payload))
    }

    async fn put(&self, collection: Collection, id: &ItemId, payload: Value) -> Result<Value> {
        self.mutation(Call::Put(collection, id.clone(), payload))
    }

    async fn send_form(
        &self,
        collection: Collection,
        method: FormMethod,
        path: &str,
        form: MultipartForm,
    ) -> Result<Value> {
        let fields = form.field_names().into_iter().map(str::to_string).collect();
        self.mutation(Call::Form {
            collection,
            method,
            path: path.to_string(),
            fields,
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.calls.lock().unwrap().push(Call::GetJson(
            path.to_string(),
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ));
        self.json
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or(Error::Api {
                status: 404,
                message: None,
            })
    }
}
