//! Paths and query strings of the admin API. Parameter names and order
//! follow the server's query contract exactly.

use crate::filters::{FilterSet, Scope};
use crate::models::{Collection, ItemId, PageToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub params: Vec<(&'static str, String)>,
}

impl Route {
    fn new(path: String) -> Self {
        Self {
            path,
            params: vec![],
        }
    }

    fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    fn param_opt(self, name: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }
}

fn segment(id: &ItemId) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

/// One page of the listing selected by `filters`.
pub fn list_route(filters: &FilterSet, page_size: u32, token: Option<&PageToken>) -> Route {
    let disabled = filters.status().is_disabled_param();
    let route = match (filters.scope(), disabled) {
        (Scope::Lessons { grade, lesson_type }, None) => Route::new("lesson/getAll".to_string())
            .param("pageSize", page_size)
            .param("type", lesson_type.as_param())
            .param("grade", grade),
        (Scope::Lessons { grade, lesson_type }, Some(is_disabled)) => {
            Route::new("lesson/filterByDisabled".to_string())
                .param("pageSize", page_size)
                .param("type", lesson_type.as_param())
                .param("grade", grade)
                .param("isDisabled", is_disabled)
        }
        (Scope::LessonDetails { lesson_id }, None) => {
            Route::new(format!("lessondetail/getByLesson/{}", segment(lesson_id)))
                .param("pageSize", page_size)
        }
        (Scope::LessonDetails { lesson_id }, Some(is_disabled)) => {
            Route::new(format!("lessondetail/filtergetByLesson/{}", segment(lesson_id)))
                .param("pageSize", page_size)
                .param("isDisabled", is_disabled)
        }
    };
    route.param_opt("startAfterId", token)
}

/// Total number of records matching `filters`.
pub fn count_route(filters: &FilterSet) -> Route {
    let disabled = filters.status().is_disabled_param();
    match (filters.scope(), disabled) {
        (Scope::Lessons { grade, lesson_type }, None) => Route::new("lesson/countAll".to_string())
            .param("type", lesson_type.as_param())
            .param("grade", grade),
        (Scope::Lessons { grade, lesson_type }, Some(is_disabled)) => {
            Route::new("lesson/countByDisabledStatus".to_string())
                .param("type", lesson_type.as_param())
                .param("grade", grade)
                .param("isDisabled", is_disabled)
        }
        (Scope::LessonDetails { lesson_id }, None) => {
            Route::new(format!("lessondetail/countByLesson/{}", segment(lesson_id)))
        }
        (Scope::LessonDetails { lesson_id }, Some(is_disabled)) => Route::new(format!(
            "lessondetail/countByLessonAndDisabledState/{}",
            segment(lesson_id)
        ))
        .param("isDisabled", is_disabled),
    }
}

pub fn record_path(collection: Collection, id: &ItemId) -> String {
    format!("{}/{}", collection.path(), segment(id))
}

pub fn order_path(collection: Collection, id: &ItemId) -> String {
    format!("{}/order/{}", collection.path(), segment(id))
}
