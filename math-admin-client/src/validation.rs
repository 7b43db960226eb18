//! Client-side form validation. Failures never reach the server; they are
//! reported per field so the form can show them inline.

use crate::error::{Error, Result};
use crate::language::Language;
use crate::models::lesson::LessonDraft;
use crate::models::lesson_detail::{FullLessonDraft, LessonDetailDraft};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::Display;

lazy_static! {
    // Wrapper the rich-text editor puts around otherwise empty content.
    static ref EDITOR_WRAPPER: Regex =
        Regex::new(r#"<div style="font-size: 18px; line-height: 1\.5;">|</div>"#).unwrap();
}

const MIN_NAME_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    NameVi,
    NameEn,
    Grade,
    Type,
    Order,
    Title,
    ContentVi,
    ContentEn,
    DefineVi,
    DefineEn,
    ExampleVi,
    ExampleEn,
    RememberVi,
    RememberEn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "camelCase")]
pub enum Rule {
    NameViRequired,
    NameViMinLength,
    NameEnRequired,
    NameEnMinLength,
    GradeRequired,
    GradeInvalid,
    TypeRequired,
    OrderRequired,
    TitleRequired,
    ContentViRequired,
    ContentEnRequired,
}

impl Rule {
    pub fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (Rule::NameViRequired, Language::Vi) => "Vui lòng nhập tên tiếng Việt",
            (Rule::NameViRequired, Language::En) => "Vietnamese name is required",
            (Rule::NameViMinLength, Language::Vi) => "Tên tiếng Việt phải có ít nhất 3 ký tự",
            (Rule::NameViMinLength, Language::En) => "Vietnamese name must be at least 3 characters",
            (Rule::NameEnRequired, Language::Vi) => "Vui lòng nhập tên tiếng Anh",
            (Rule::NameEnRequired, Language::En) => "English name is required",
            (Rule::NameEnMinLength, Language::Vi) => "Tên tiếng Anh phải có ít nhất 3 ký tự",
            (Rule::NameEnMinLength, Language::En) => "English name must be at least 3 characters",
            (Rule::GradeRequired, Language::Vi) => "Vui lòng chọn lớp",
            (Rule::GradeRequired, Language::En) => "Grade is required",
            (Rule::GradeInvalid, Language::Vi) => "Lớp phải là 1, 2 hoặc 3",
            (Rule::GradeInvalid, Language::En) => "Grade must be 1, 2 or 3",
            (Rule::TypeRequired, Language::Vi) => "Vui lòng chọn loại bài học",
            (Rule::TypeRequired, Language::En) => "Lesson type is required",
            (Rule::OrderRequired, Language::Vi) => "Thứ tự phải là số lớn hơn 0",
            (Rule::OrderRequired, Language::En) => "Order must be a number greater than 0",
            (Rule::TitleRequired, Language::Vi) => "Vui lòng nhập tiêu đề",
            (Rule::TitleRequired, Language::En) => "Title is required",
            (Rule::ContentViRequired, Language::Vi) => "Vui lòng nhập nội dung tiếng Việt",
            (Rule::ContentViRequired, Language::En) => "Vietnamese content is required",
            (Rule::ContentEnRequired, Language::Vi) => "Vui lòng nhập nội dung tiếng Anh",
            (Rule::ContentEnRequired, Language::En) => "English content is required",
        }
    }
}

/// Field → violated rule. At most one rule is reported per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<Field, Rule>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<Rule> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, Rule)> + '_ {
        self.0.iter().map(|(field, rule)| (*field, *rule))
    }

    fn add(&mut self, field: Field, rule: Rule) {
        self.0.entry(field).or_insert(rule);
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .iter()
            .map(|(field, rule)| format!("{}: {}", field, rule))
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Strip the editor wrapper and surrounding whitespace from rich-text content.
pub fn strip_editor_wrapper(html: &str) -> String {
    EDITOR_WRAPPER.replace_all(html, "").trim().to_string()
}

fn check_name(errors: &mut ValidationErrors, value: &str, field: Field, required: Rule, min: Rule) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, required);
    } else if trimmed.chars().count() < MIN_NAME_LENGTH {
        errors.add(field, min);
    }
}

fn check_content(errors: &mut ValidationErrors, html: &str, field: Field, rule: Rule) {
    if strip_editor_wrapper(html).is_empty() {
        errors.add(field, rule);
    }
}

pub fn validate_lesson(draft: &LessonDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    check_name(
        &mut errors,
        &draft.name.vi,
        Field::NameVi,
        Rule::NameViRequired,
        Rule::NameViMinLength,
    );
    check_name(
        &mut errors,
        &draft.name.en,
        Field::NameEn,
        Rule::NameEnRequired,
        Rule::NameEnMinLength,
    );
    if draft.grade.trim().is_empty() {
        errors.add(Field::Grade, Rule::GradeRequired);
    } else if draft.parsed_grade().is_none() {
        errors.add(Field::Grade, Rule::GradeInvalid);
    }
    if draft.lesson_type.is_none() {
        errors.add(Field::Type, Rule::TypeRequired);
    }
    errors
}

pub fn validate_lesson_detail(draft: &LessonDetailDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    if draft.order < 1 {
        errors.add(Field::Order, Rule::OrderRequired);
    }
    if draft.title.vi.trim().is_empty() {
        errors.add(Field::Title, Rule::TitleRequired);
    }
    check_content(&mut errors, &draft.content.vi, Field::ContentVi, Rule::ContentViRequired);
    check_content(&mut errors, &draft.content.en, Field::ContentEn, Rule::ContentEnRequired);
    errors
}

pub fn validate_full_lesson(draft: &FullLessonDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    let fields = [
        (Field::DefineVi, Field::DefineEn),
        (Field::ExampleVi, Field::ExampleEn),
        (Field::RememberVi, Field::RememberEn),
    ];
    for ((_, section), (vi, en)) in draft.sections().into_iter().zip(fields) {
        check_content(&mut errors, &section.content.vi, vi, Rule::ContentViRequired);
        check_content(&mut errors, &section.content.en, en, Rule::ContentEnRequired);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LocalizedText;
    use crate::models::lesson::LessonType;
    use crate::models::ItemId;

    fn lesson(vi: &str, en: &str, grade: &str) -> LessonDraft {
        LessonDraft {
            name: LocalizedText::new(vi, en),
            grade: grade.to_string(),
            lesson_type: Some(LessonType::Addition),
            ..LessonDraft::blank()
        }
    }

    #[test]
    fn test_valid_lesson() {
        assert!(validate_lesson(&lesson("Cộng số", "Adding", "2")).is_empty());
    }

    #[test]
    fn test_lesson_name_rules() {
        let errors = validate_lesson(&lesson("  ", "ab", "1"));
        assert_eq!(errors.get(Field::NameVi), Some(Rule::NameViRequired));
        assert_eq!(errors.get(Field::NameEn), Some(Rule::NameEnMinLength));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_lesson_grade_and_type_rules() {
        let mut draft = lesson("Cộng số", "Adding", "");
        draft.lesson_type = None;
        let errors = validate_lesson(&draft);
        assert_eq!(errors.get(Field::Grade), Some(Rule::GradeRequired));
        assert_eq!(errors.get(Field::Type), Some(Rule::TypeRequired));

        let errors = validate_lesson(&lesson("Cộng số", "Adding", "4"));
        assert_eq!(errors.get(Field::Grade), Some(Rule::GradeInvalid));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_editor_wrapper_counts_as_empty() {
        let wrapped = r#"<div style="font-size: 18px; line-height: 1.5;"> </div>"#;
        assert_eq!(strip_editor_wrapper(wrapped), "");

        let mut draft = LessonDetailDraft::blank(ItemId::from("l1"), 0);
        draft.title = LocalizedText::new("Định nghĩa", "Definition");
        draft.content = LocalizedText::new(wrapped, "<p>ok</p>");
        let errors = validate_lesson_detail(&draft);
        assert_eq!(errors.get(Field::Order), Some(Rule::OrderRequired));
        assert_eq!(errors.get(Field::ContentVi), Some(Rule::ContentViRequired));
        assert_eq!(errors.get(Field::ContentEn), None);
    }

    #[test]
    fn test_full_lesson_requires_every_section() {
        let mut draft = FullLessonDraft::blank(ItemId::from("l1"));
        draft.define.content = LocalizedText::new("a", "b");
        draft.example.content = LocalizedText::new("c", "");
        let errors = validate_full_lesson(&draft);
        assert_eq!(errors.get(Field::DefineVi), None);
        assert_eq!(errors.get(Field::ExampleEn), Some(Rule::ContentEnRequired));
        assert_eq!(errors.get(Field::RememberVi), Some(Rule::ContentViRequired));
        assert_eq!(errors.len(), 3);
    }
}
