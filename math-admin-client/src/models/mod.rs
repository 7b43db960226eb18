pub mod collection;
pub mod lesson;
pub mod lesson_detail;
pub mod user;

use crate::language::Language;
use getset::Getters;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub use collection::Collection;

/// Identifier of a record. The API hands out string ids, but numeric ids
/// are accepted and normalized to their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    fn into_string(self) -> String {
        match self {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TextOrNumber::deserialize(deserializer).map(|raw| ItemId(raw.into_string()))
    }
}

/// Opaque continuation cursor issued by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `nextPageToken` may be absent, null, empty, a string or a number. Only a
/// non-empty value means another page exists.
fn optional_token<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PageToken>, D::Error> {
    let raw = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(raw
        .map(TextOrNumber::into_string)
        .filter(|token| !token.is_empty())
        .map(PageToken))
}

pub(crate) fn count_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(match raw {
        Some(TextOrNumber::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        Some(TextOrNumber::Text(text)) => text.trim().parse().unwrap_or(0),
        None => 0,
    })
}

/// A record as returned by the API: an id plus whatever attributes the
/// collection carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Item {
    #[get = "pub"]
    id: ItemId,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// `field[language]` for localized maps; plain string fields are
    /// returned as they are.
    pub fn localized(&self, field: &str, language: Language) -> Option<&str> {
        match self.attributes.get(field)? {
            Value::Object(map) => map.get(language.code()).and_then(Value::as_str),
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn order(&self) -> Option<i64> {
        match self.attributes.get("order")? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn set_order(&mut self, order: i64) {
        self.set_attribute("order", order);
    }

    pub fn is_disabled(&self) -> bool {
        self.attributes
            .get("isDisabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.set_attribute("isDisabled", disabled);
    }

    pub fn grade(&self) -> Option<u8> {
        match self.attributes.get("grade")? {
            Value::Number(number) => number.as_u64().and_then(|g| u8::try_from(g).ok()),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn lesson_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(Value::as_str)
    }
}

/// Wire shape of every listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub data: Option<Vec<Item>>,
    #[serde(default, rename = "nextPageToken", deserialize_with = "optional_token")]
    pub next_page_token: Option<PageToken>,
}

/// Wire shape of every count endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CountResponse {
    #[serde(default, deserialize_with = "count_value")]
    pub count: u64,
}

/// One page of a listing together with the total for the same filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub items: Vec<Item>,
    pub next_token: Option<PageToken>,
    pub total: u64,
}

impl FetchedPage {
    pub fn new(items: Vec<Item>, next_token: Option<PageToken>, total: u64) -> Self {
        Self {
            items,
            next_token,
            total,
        }
    }
}

/// A file sent along with a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}
