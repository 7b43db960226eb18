use super::{Attachment, Item, ItemId};
use crate::language::LocalizedText;
use serde_json::json;
use utils::multipart::MultipartForm;

/// Single lesson detail form. Title and content are rich-text HTML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonDetailDraft {
    pub id: Option<ItemId>,
    pub lesson_id: ItemId,
    pub order: i64,
    pub title: LocalizedText,
    pub content: LocalizedText,
    pub image: Option<Attachment>,
}

impl LessonDetailDraft {
    pub fn blank(lesson_id: ItemId, order: i64) -> Self {
        Self {
            id: None,
            lesson_id,
            order,
            title: LocalizedText::default(),
            content: LocalizedText::default(),
            image: None,
        }
    }

    pub fn from_item(item: &Item, lesson_id: ItemId) -> Self {
        let localized = |field: &str| -> LocalizedText {
            item.attribute(field)
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok())
                .unwrap_or_default()
        };
        Self {
            id: Some(item.id().clone()),
            lesson_id,
            order: item.order().unwrap_or(1),
            title: localized("title"),
            content: localized("content"),
            image: None,
        }
    }

    /// The title editor writes the same text into both languages.
    pub fn set_title(&mut self, value: &str) {
        self.title = LocalizedText::new(value, value);
    }

    pub fn to_form(&self) -> MultipartForm {
        let form = MultipartForm::new()
            .text("lessonId", self.lesson_id.as_str())
            .text("order", self.order.to_string())
            .text("title", json!(self.title).to_string())
            .text("content", json!(self.content).to_string());
        match &self.image {
            Some(image) => form.file(
                "image",
                image.filename.clone(),
                image.content_type(),
                image.bytes.clone(),
            ),
            None => form,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonSection {
    pub content: LocalizedText,
    pub image: Option<Attachment>,
}

/// "Full lesson" form creating the define/example/remember details at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullLessonDraft {
    pub lesson_id: ItemId,
    pub define: LessonSection,
    pub example: LessonSection,
    pub remember: LessonSection,
}

impl FullLessonDraft {
    pub fn blank(lesson_id: ItemId) -> Self {
        Self {
            lesson_id,
            ..Self::default()
        }
    }

    pub fn sections(&self) -> [(&'static str, &LessonSection); 3] {
        [
            ("define", &self.define),
            ("example", &self.example),
            ("remember", &self.remember),
        ]
    }

    pub fn to_form(&self) -> MultipartForm {
        let contents = json!({
            "define": self.define.content,
            "example": self.example.content,
            "remember": self.remember.content,
        });
        let mut form = MultipartForm::new()
            .text("lessonId", self.lesson_id.as_str())
            .text("contents", contents.to_string());
        for (name, section) in self.sections() {
            if let Some(image) = &section.image {
                form = form.file(
                    name,
                    image.filename.clone(),
                    image.content_type(),
                    image.bytes.clone(),
                );
            }
        }
        form
    }
}
