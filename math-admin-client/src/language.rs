use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Languages the dashboard is translated into.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        self.into()
    }
}

/// Text stored in every supported language, `{ "vi": .., "en": .. }` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub vi: String,
    #[serde(default)]
    pub en: String,
}

impl LocalizedText {
    pub fn new(vi: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            vi: vi.into(),
            en: en.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Vi => &self.vi,
            Language::En => &self.en,
        }
    }
}

/// Message map carried by error responses. The server may omit languages,
/// so lookups are fallible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedMessage(BTreeMap<String, String>);

impl LocalizedMessage {
    pub fn get(&self, language: Language) -> Option<&str> {
        self.0
            .get(language.code())
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedMessage {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Notification strings emitted by the screen controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "camelCase")]
pub enum MessageKey {
    AddSuccess,
    UpdateSuccess,
    AddFullLessonSuccess,
    UpdateOrderSuccess,
    UpdateOrderFailed,
    ValidationFailed,
    FetchFailed,
    UpdateFailed,
    RestoreSuccess,
    RequestFailed,
}

impl MessageKey {
    pub fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (MessageKey::AddSuccess, Language::Vi) => "Thêm thành công",
            (MessageKey::AddSuccess, Language::En) => "Added successfully",
            (MessageKey::UpdateSuccess, Language::Vi) => "Cập nhật thành công",
            (MessageKey::UpdateSuccess, Language::En) => "Updated successfully",
            (MessageKey::AddFullLessonSuccess, Language::Vi) => "Thêm bài học đầy đủ thành công",
            (MessageKey::AddFullLessonSuccess, Language::En) => "Full lesson added successfully",
            (MessageKey::UpdateOrderSuccess, Language::Vi) => "Cập nhật thứ tự thành công",
            (MessageKey::UpdateOrderSuccess, Language::En) => "Order updated successfully",
            (MessageKey::UpdateOrderFailed, Language::Vi) => "Cập nhật thứ tự thất bại",
            (MessageKey::UpdateOrderFailed, Language::En) => "Failed to update order",
            (MessageKey::ValidationFailed, Language::Vi) => "Vui lòng kiểm tra lại thông tin",
            (MessageKey::ValidationFailed, Language::En) => "Please check the form fields",
            (MessageKey::FetchFailed, Language::Vi) => "Tải dữ liệu thất bại",
            (MessageKey::FetchFailed, Language::En) => "Failed to load data",
            (MessageKey::UpdateFailed, Language::Vi) => "Cập nhật thất bại",
            (MessageKey::UpdateFailed, Language::En) => "Update failed",
            (MessageKey::RestoreSuccess, Language::Vi) => "Đã khôi phục cài đặt mặc định",
            (MessageKey::RestoreSuccess, Language::En) => "Defaults restored",
            (MessageKey::RequestFailed, Language::Vi) => "Đã xảy ra lỗi, vui lòng thử lại",
            (MessageKey::RequestFailed, Language::En) => "Something went wrong, please try again",
        }
    }
}
