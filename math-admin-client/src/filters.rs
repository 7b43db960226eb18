use crate::models::lesson::{Grade, LessonType};
use crate::models::{Collection, ItemId};
use getset::Getters;
use strum_macros::{Display, EnumString};

/// Availability filter. Values mirror the `isDisabled` query parameter:
/// `Disabled` lists disabled records, `Enabled` lists available ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
pub enum StatusFilter {
    #[default]
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "true")]
    Disabled,
    #[strum(serialize = "false")]
    Enabled,
}

impl StatusFilter {
    pub fn is_disabled_param(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Disabled => Some(true),
            StatusFilter::Enabled => Some(false),
        }
    }
}

/// Which listing a filter set scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Lessons {
        grade: Grade,
        lesson_type: LessonType,
    },
    LessonDetails {
        lesson_id: ItemId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters)]
#[get = "pub"]
pub struct FilterSet {
    scope: Scope,
    status: StatusFilter,
}

impl FilterSet {
    pub fn lessons(grade: Grade, lesson_type: LessonType) -> Self {
        Self {
            scope: Scope::Lessons { grade, lesson_type },
            status: StatusFilter::All,
        }
    }

    pub fn lesson_details(lesson_id: ItemId) -> Self {
        Self {
            scope: Scope::LessonDetails { lesson_id },
            status: StatusFilter::All,
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Changes the grade of a lesson filter; detail filters are returned as is.
    pub fn with_grade(mut self, grade: Grade) -> Self {
        if let Scope::Lessons { grade: current, .. } = &mut self.scope {
            *current = grade;
        }
        self
    }

    pub fn with_lesson_type(mut self, lesson_type: LessonType) -> Self {
        if let Scope::Lessons {
            lesson_type: current,
            ..
        } = &mut self.scope
        {
            *current = lesson_type;
        }
        self
    }

    pub fn collection(&self) -> Collection {
        match self.scope {
            Scope::Lessons { .. } => Collection::Lesson,
            Scope::LessonDetails { .. } => Collection::LessonDetail,
        }
    }

    /// Localized fields the free-text query is matched against.
    pub fn search_fields(&self) -> &'static [&'static str] {
        match self.scope {
            Scope::Lessons { .. } => &["name"],
            Scope::LessonDetails { .. } => &["title", "content"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetDecision {
    /// Same filter set; keep accumulated pages.
    Keep,
    /// A filter dimension changed; discard everything and start from page one.
    Reset,
}

/// Whether moving from `current` to `requested` invalidates the accumulated list.
pub fn reset_decision(current: Option<&FilterSet>, requested: &FilterSet) -> ResetDecision {
    match current {
        Some(current) if current == requested => ResetDecision::Keep,
        _ => ResetDecision::Reset,
    }
}
