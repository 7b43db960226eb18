use super::{refresh, reject_invalid, report};
use crate::backend::{AdminBackend, FormMethod};
use crate::client::routes::record_path;
use crate::error::{Error, Result};
use crate::filters::{FilterSet, StatusFilter};
use crate::language::{Language, MessageKey};
use crate::list::{ListController, ListSnapshot, LoadOutcome, Reorder};
use crate::models::lesson_detail::{FullLessonDraft, LessonDetailDraft};
use crate::models::{Collection, Item, ItemId};
use crate::notify::{Notification, Notifier};
use crate::validation::{validate_full_lesson, validate_lesson_detail};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Details (sections) of one lesson.
pub struct LessonDetailScreen<B: AdminBackend + ?Sized> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    lesson_id: ItemId,
    lesson: RwLock<Option<Item>>,
    list: ListController<B>,
}

impl<B: AdminBackend + ?Sized> LessonDetailScreen<B> {
    pub fn new(
        backend: Arc<B>,
        notifier: Arc<dyn Notifier>,
        lesson_id: ItemId,
        language: Language,
    ) -> Self {
        Self {
            list: ListController::new(backend.clone(), notifier.clone(), language),
            backend,
            notifier,
            lesson_id,
            lesson: RwLock::new(None),
        }
    }

    pub fn lesson_id(&self) -> &ItemId {
        &self.lesson_id
    }

    pub fn list(&self) -> &ListController<B> {
        &self.list
    }

    /// The parent lesson, once [`open`](Self::open) fetched it.
    pub async fn lesson(&self) -> Option<Item> {
        self.lesson.read().await.clone()
    }

    /// Fetch the parent lesson and page one of its details.
    ///
    /// A failure to fetch the parent is reported but does not keep the
    /// details from loading.
    pub async fn open(&self) -> Result<LoadOutcome> {
        let language = self.list.language().await;
        match self.backend.get_record(Collection::Lesson, &self.lesson_id).await {
            Ok(lesson) => *self.lesson.write().await = Some(lesson),
            Err(err) => {
                log::warn!("Loading lesson {} failed: {}", self.lesson_id, err);
                self.notifier
                    .notify(Notification::error(err.localized(language)));
            }
        }

        let filters = self
            .list
            .filters()
            .await
            .unwrap_or_else(|| FilterSet::lesson_details(self.lesson_id.clone()));
        self.list.select(filters).await
    }

    pub async fn set_status(&self, status: StatusFilter) -> Result<LoadOutcome> {
        let filters = FilterSet::lesson_details(self.lesson_id.clone()).with_status(status);
        self.list.select(filters).await
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        self.list.set_query(query).await;
    }

    pub async fn set_language(&self, language: Language) {
        self.list.set_language(language).await;
    }

    pub async fn load_more(&self) -> Result<LoadOutcome> {
        self.list.load_more().await
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.list.snapshot().await
    }

    /// Order proposed by the "add" form: one past the highest loaded order.
    pub async fn next_order(&self) -> i64 {
        self.list.max_order().await.max(0) + 1
    }

    /// Blank "add" form for this lesson.
    pub async fn new_draft(&self) -> LessonDetailDraft {
        LessonDetailDraft::blank(self.lesson_id.clone(), self.next_order().await)
    }

    /// `PUT lessondetail/:id` for an existing detail, `POST lessondetail`
    /// otherwise; page one is reloaded afterwards.
    pub async fn save(&self, draft: &LessonDetailDraft) -> Result<Value> {
        let language = self.list.language().await;
        reject_invalid(self.notifier.as_ref(), validate_lesson_detail(draft), language)?;

        let collection = Collection::LessonDetail;
        let (method, path, success) = match &draft.id {
            Some(id) => (
                FormMethod::Put,
                record_path(collection, id),
                MessageKey::UpdateSuccess,
            ),
            None => (
                FormMethod::Post,
                collection.path().to_string(),
                MessageKey::AddSuccess,
            ),
        };
        let result = self
            .backend
            .send_form(collection, method, &path, draft.to_form())
            .await;
        let saved = report(self.notifier.as_ref(), result, success, language)?;

        refresh(&self.list).await;
        Ok(saved)
    }

    /// Create the define, example and remember sections in one request.
    pub async fn save_full(&self, draft: &FullLessonDraft) -> Result<Value> {
        let language = self.list.language().await;
        reject_invalid(self.notifier.as_ref(), validate_full_lesson(draft), language)?;

        let result = self
            .backend
            .send_form(
                Collection::LessonDetail,
                FormMethod::Post,
                "lessondetail/full",
                draft.to_form(),
            )
            .await;
        let saved = report(
            self.notifier.as_ref(),
            result,
            MessageKey::AddFullLessonSuccess,
            language,
        )?;

        refresh(&self.list).await;
        Ok(saved)
    }

    pub async fn toggle_available(&self, id: &ItemId) -> Result<()> {
        let language = self.list.language().await;
        let disabled = match self.list.find(id).await {
            Some(item) => !item.is_disabled(),
            None => return Err(Error::UnknownItem(id.clone())),
        };

        let result = self
            .backend
            .put(Collection::LessonDetail, id, json!({ "isDisabled": disabled }))
            .await;
        report(self.notifier.as_ref(), result, MessageKey::UpdateSuccess, language)?;

        self.list
            .update_item(id, |item| item.set_disabled(disabled))
            .await;
        Ok(())
    }

    pub async fn reorder(&self, change: Reorder) -> Result<()> {
        self.list.reorder(change).await
    }
}
