use super::{refresh, reject_invalid, report};
use crate::backend::AdminBackend;
use crate::error::{Error, Result};
use crate::filters::{FilterSet, StatusFilter};
use crate::language::{Language, MessageKey};
use crate::list::{ListController, ListSnapshot, LoadOutcome, Reorder};
use crate::models::lesson::{Grade, LessonDraft, LessonType};
use crate::models::{Collection, Item, ItemId};
use crate::notify::Notifier;
use crate::validation::validate_lesson;
use serde_json::Value;
use std::sync::Arc;

/// Lessons of one grade and type, optionally narrowed by availability.
pub struct LessonScreen<B: AdminBackend + ?Sized> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    list: ListController<B>,
}

impl<B: AdminBackend + ?Sized> LessonScreen<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>, language: Language) -> Self {
        Self {
            list: ListController::new(backend.clone(), notifier.clone(), language),
            backend,
            notifier,
        }
    }

    pub fn list(&self) -> &ListController<B> {
        &self.list
    }

    /// Show grade 1 addition lessons, or whatever is already selected.
    pub async fn open(&self) -> Result<LoadOutcome> {
        let filters = self.current_filters().await;
        self.list.select(filters).await
    }

    async fn current_filters(&self) -> FilterSet {
        self.list
            .filters()
            .await
            .unwrap_or_else(|| FilterSet::lessons(Grade::default(), LessonType::default()))
    }

    pub async fn set_grade(&self, grade: Grade) -> Result<LoadOutcome> {
        let filters = self.current_filters().await.with_grade(grade);
        self.list.select(filters).await
    }

    pub async fn set_lesson_type(&self, lesson_type: LessonType) -> Result<LoadOutcome> {
        let filters = self.current_filters().await.with_lesson_type(lesson_type);
        self.list.select(filters).await
    }

    pub async fn set_status(&self, status: StatusFilter) -> Result<LoadOutcome> {
        let filters = self.current_filters().await.with_status(status);
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

    /// Create the lesson, or update it when the draft carries an id, then
    /// reload page one of the current filters.
    ///
    /// A new lesson, or one moved to another grade or type, is placed after
    /// the last lesson on the first page of its target group. Otherwise it
    /// keeps its position.
    pub async fn save(&self, draft: &LessonDraft) -> Result<Value> {
        let language = self.list.language().await;
        reject_invalid(self.notifier.as_ref(), validate_lesson(draft), language)?;

        let success = match draft.id {
            Some(_) => MessageKey::UpdateSuccess,
            None => MessageKey::AddSuccess,
        };
        let result = self.persist(draft).await;
        let saved = report(self.notifier.as_ref(), result, success, language)?;

        refresh(&self.list).await;
        Ok(saved)
    }

    async fn persist(&self, draft: &LessonDraft) -> Result<Value> {
        let (Some(grade), Some(lesson_type)) = (draft.parsed_grade(), draft.lesson_type) else {
            return Err(Error::Validation(validate_lesson(draft)));
        };

        let kept_order = match &draft.id {
            Some(id) => match self.list.find(id).await {
                Some(original) if stays_in_group(&original, grade, lesson_type) => {
                    original.order().or(draft.order)
                }
                Some(_) => None,
                None => draft.order,
            },
            None => None,
        };
        let order = match kept_order {
            Some(order) => order,
            None => self.next_order(grade, lesson_type).await?,
        };

        let payload = draft.payload(grade, lesson_type, order);
        match &draft.id {
            Some(id) => self.backend.patch(Collection::Lesson, id, payload).await,
            None => self.backend.create(Collection::Lesson, payload).await,
        }
    }

    /// `max(order) + 1` over the first page of lessons of `grade`/`lesson_type`.
    async fn next_order(&self, grade: Grade, lesson_type: LessonType) -> Result<i64> {
        let target = FilterSet::lessons(grade, lesson_type);
        let page = self.backend.fetch_page(&target, None).await?;
        let max = page.items.iter().filter_map(Item::order).max().unwrap_or(0);
        Ok(max.max(0) + 1)
    }

    /// Flip `isDisabled`, sending the whole record back as the server expects.
    pub async fn toggle_available(&self, id: &ItemId) -> Result<()> {
        let language = self.list.language().await;
        let mut item = self
            .list
            .find(id)
            .await
            .ok_or_else(|| Error::UnknownItem(id.clone()))?;
        let disabled = !item.is_disabled();
        item.set_disabled(disabled);

        let payload = serde_json::to_value(&item)?;
        let result = self.backend.patch(Collection::Lesson, id, payload).await;
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

fn stays_in_group(original: &Item, grade: Grade, lesson_type: LessonType) -> bool {
    original.grade() == Some(grade.value()) && original.lesson_type() == Some(lesson_type.as_param())
}
