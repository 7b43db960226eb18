//! Typed client and paginated list cache for the math-learning admin API.

pub mod backend;
pub mod cache;
mod client;
pub mod config;
pub mod dashboard;
mod error;
pub mod filters;
pub mod language;
pub mod list;
pub mod models;
pub mod notify;
pub mod screens;
pub mod validation;

#[cfg(test)]
mod fake;
#[cfg(test)]
mod stub;

pub use backend::{AdminBackend, FormMethod, ListBackend};
pub use client::routes::{count_route, list_route, Route};
pub use client::{ApiClient, DEFAULT_PAGE_SIZE};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use filters::{reset_decision, FilterSet, ResetDecision, Scope, StatusFilter};
pub use language::{Language, LocalizedText, MessageKey};
pub use list::{ListController, ListSnapshot, LoadOutcome, LoadState, Reorder};
pub use models::{Collection, FetchedPage, Item, ItemId, PageToken};
pub use notify::{LogNotifier, Notification, NotificationLog, Notifier};

// Re-export cache types
pub use cache::{CacheConfig, CacheStats};
