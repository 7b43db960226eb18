use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// REST collections exposed by the admin API.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum Collection {
    Lesson,
    LessonDetail,
    Pupil,
    Reward,
    User,
    Exercise,
}

impl Collection {
    /// First path segment of every route of the collection.
    pub fn path(self) -> &'static str {
        self.into()
    }
}
