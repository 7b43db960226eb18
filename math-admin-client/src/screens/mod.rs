//! Controllers behind the admin screens. Each one owns the list state of its
//! screen and talks to the API only through [`AdminBackend`](crate::backend::AdminBackend).

pub mod lesson;
pub mod lesson_detail;
pub mod settings;

pub use lesson::LessonScreen;
pub use lesson_detail::LessonDetailScreen;
pub use settings::SettingsScreen;

use crate::backend::ListBackend;
use crate::error::{Error, Result};
use crate::list::ListController;
use crate::language::{Language, MessageKey};
use crate::notify::{Level, Notification, Notifier};
use crate::validation::ValidationErrors;

/// Notify about invalid form input and turn it into an error.
pub(crate) fn reject_invalid(
    notifier: &dyn Notifier,
    errors: ValidationErrors,
    language: Language,
) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    log::debug!("Form rejected: {}", errors);
    notifier.notify(Notification::from_key(
        Level::Error,
        MessageKey::ValidationFailed,
        language,
    ));
    Err(Error::Validation(errors))
}

/// Pass `result` through, notifying with the server's message when it failed.
pub(crate) fn report<T>(
    notifier: &dyn Notifier,
    result: Result<T>,
    success: MessageKey,
    language: Language,
) -> Result<T> {
    match result {
        Ok(value) => {
            notifier.notify(Notification::from_key(Level::Success, success, language));
            Ok(value)
        }
        Err(err) => {
            log::warn!("Request failed: {}", err);
            notifier.notify(Notification::error(err.localized(language)));
            Err(err)
        }
    }
}

/// Reload page one after a successful save. A failure is already reported by
/// the controller and must not turn the save itself into an error.
pub(crate) async fn refresh<B: ListBackend + ?Sized>(list: &ListController<B>) {
    if let Err(err) = list.reload().await {
        log::warn!("Reloading after save failed: {}", err);
    }
}
