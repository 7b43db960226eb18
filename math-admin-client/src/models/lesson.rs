use super::{Item, ItemId};
use crate::language::{Language, LocalizedText};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LessonType {
    #[default]
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl LessonType {
    pub fn as_param(self) -> &'static str {
        self.into()
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (LessonType::Addition, Language::Vi) => "Phép cộng",
            (LessonType::Addition, Language::En) => "Addition",
            (LessonType::Subtraction, Language::Vi) => "Phép trừ",
            (LessonType::Subtraction, Language::En) => "Subtraction",
            (LessonType::Multiplication, Language::Vi) => "Phép nhân",
            (LessonType::Multiplication, Language::En) => "Multiplication",
            (LessonType::Division, Language::Vi) => "Phép chia",
            (LessonType::Division, Language::En) => "Division",
        }
    }
}

/// School grade a lesson belongs to; only grades 1 to 3 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Grade(u8);

impl Grade {
    pub const ALL: [Grade; 3] = [Grade(1), Grade(2), Grade(3)];

    pub fn new(value: u8) -> Option<Self> {
        (1..=3).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Grade::new(value).ok_or_else(|| format!("grade {} is not between 1 and 3", value))
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

/// Lesson form contents. `grade` keeps the raw form input so validation can
/// tell "missing" from "not a grade".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonDraft {
    pub id: Option<ItemId>,
    pub name: LocalizedText,
    pub grade: String,
    pub lesson_type: Option<LessonType>,
    pub order: Option<i64>,
}

impl LessonDraft {
    /// Empty form for the "add" dialog.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Prefilled form for the "update" dialog.
    pub fn from_item(item: &Item) -> Self {
        let name = item
            .attribute("name")
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        Self {
            id: Some(item.id().clone()),
            name,
            grade: item.grade().map(|g| g.to_string()).unwrap_or_default(),
            lesson_type: item.lesson_type().and_then(|t| t.parse().ok()),
            order: item.order(),
        }
    }

    pub fn parsed_grade(&self) -> Option<Grade> {
        self.grade.trim().parse::<u8>().ok().and_then(Grade::new)
    }

    /// Request body for create/update once `order` has been decided.
    pub fn payload(&self, grade: Grade, lesson_type: LessonType, order: i64) -> Value {
        json!({
            "name": {
                "vi": self.name.vi,
                "en": self.name.en,
            },
            "grade": grade.value(),
            "type": lesson_type,
            "order": order,
        })
    }
}
