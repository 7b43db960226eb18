use crate::backend::AdminBackend;
use crate::client::routes::record_path;
use crate::error::Result;
use crate::language::{Language, MessageKey};
use crate::models::user::DisplayMode;
use crate::models::{Collection, ItemId};
use crate::notify::{Level, Notification, Notifier};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub mode: DisplayMode,
    pub language: Language,
}

/// Display preferences of the signed-in admin. Local choices always apply
/// immediately; the server copy of `mode` is best effort.
pub struct SettingsScreen<B: AdminBackend + ?Sized> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    user_id: ItemId,
    preferences: Mutex<Preferences>,
}

impl<B: AdminBackend + ?Sized> SettingsScreen<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>, user_id: ItemId) -> Self {
        Self {
            backend,
            notifier,
            user_id,
            preferences: Mutex::new(Preferences::default()),
        }
    }

    pub async fn preferences(&self) -> Preferences {
        *self.preferences.lock().await
    }

    pub async fn set_language(&self, language: Language) {
        self.preferences.lock().await.language = language;
    }

    /// Read `mode` from `user/:id`. The body need not carry the id.
    pub async fn load(&self) -> Result<DisplayMode> {
        let language = self.preferences().await.language;
        let path = record_path(Collection::User, &self.user_id);
        let user = match self.backend.get_json(&path, &[]).await {
            Ok(user) => user,
            Err(err) => {
                log::warn!("Loading user {} failed: {}", self.user_id, err);
                self.notify(Level::Error, MessageKey::FetchFailed, language);
                return Err(err);
            }
        };

        let mode = match user.get("mode").and_then(Value::as_str) {
            Some("dark") => DisplayMode::Dark,
            _ => DisplayMode::Light,
        };
        self.preferences.lock().await.mode = mode;
        Ok(mode)
    }

    /// Switch light/dark locally, then store the choice on the server.
    pub async fn toggle_dark_mode(&self) -> Result<DisplayMode> {
        let (mode, language) = {
            let mut preferences = self.preferences.lock().await;
            preferences.mode = preferences.mode.toggled();
            (preferences.mode, preferences.language)
        };

        if let Err(err) = self.store_mode(mode).await {
            self.notify(Level::Error, MessageKey::UpdateFailed, language);
            return Err(err);
        }
        Ok(mode)
    }

    /// Light mode and Vietnamese.
    pub async fn restore_defaults(&self) -> Result<Preferences> {
        let defaults = Preferences::default();
        *self.preferences.lock().await = defaults;

        match self.store_mode(defaults.mode).await {
            Ok(()) => {
                self.notify(Level::Success, MessageKey::RestoreSuccess, defaults.language);
                Ok(defaults)
            }
            Err(err) => {
                self.notify(Level::Error, MessageKey::UpdateFailed, defaults.language);
                Err(err)
            }
        }
    }

    async fn store_mode(&self, mode: DisplayMode) -> Result<()> {
        self.backend
            .put(Collection::User, &self.user_id, json!({ "mode": mode }))
            .await
            .map(|_| ())
            .map_err(|err| {
                log::warn!("Saving display mode {} failed: {}", mode, err);
                err
            })
    }

    fn notify(&self, level: Level, key: MessageKey, language: Language) {
        self.notifier
            .notify(Notification::from_key(level, key, language));
    }
}
