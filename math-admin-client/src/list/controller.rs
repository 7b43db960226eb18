use super::reorder::Reorder;
use super::state::{Applied, ListState, LoadMore, LoadState, Ticket};
use crate::backend::ListBackend;
use crate::error::{Error, Result};
use crate::filters::FilterSet;
use crate::language::{Language, MessageKey};
use crate::models::{Item, ItemId};
use crate::notify::{Level, Notification, Notifier};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { added: usize },
    /// The requested filters are already shown.
    Unchanged,
    /// No cursor held; no request was made.
    NoMorePages,
    /// A load is already running; no request was made.
    InFlight,
    /// The answer arrived after the filters changed and was dropped.
    Stale,
}

/// What a screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub visible: Vec<Item>,
    pub accumulated: usize,
    pub total: u64,
    pub has_more: bool,
    pub load_state: LoadState,
    pub query: String,
    pub language: Language,
}

/// Drives a [`ListState`] against a [`ListBackend`]. The state lock is never
/// held while a request is in flight.
///
/// Failed requests are reported to the notifier before the error is
/// returned, so callers only need the `Err` to decide about their own UI.
pub struct ListController<B: ListBackend + ?Sized> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState>,
}

impl<B: ListBackend + ?Sized> ListController<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>, language: Language) -> Self {
        Self {
            backend,
            notifier,
            state: Mutex::new(ListState::new(language)),
        }
    }

    /// Show `filters`, resetting and fetching page one if they differ from
    /// the current ones.
    pub async fn select(&self, filters: FilterSet) -> Result<LoadOutcome> {
        let ticket = self.state.lock().await.select(filters);
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => Ok(LoadOutcome::Unchanged),
        }
    }

    /// Reset and fetch page one of the current filters again.
    pub async fn reload(&self) -> Result<LoadOutcome> {
        let ticket = {
            let mut state = self.state.lock().await;
            let filters = state.filters().cloned().ok_or(Error::NoFilters)?;
            state.reset(filters)
        };
        self.run(ticket).await
    }

    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let next = self.state.lock().await.begin_load_more();
        match next {
            LoadMore::NoToken => Ok(LoadOutcome::NoMorePages),
            LoadMore::InFlight => {
                log::debug!("Load more ignored, a page is already loading");
                Ok(LoadOutcome::InFlight)
            }
            LoadMore::Start(ticket) => self.run(ticket).await,
        }
    }

    async fn run(&self, ticket: Ticket) -> Result<LoadOutcome> {
        let result = self
            .backend
            .fetch_page(ticket.filters(), ticket.token())
            .await;

        let mut state = self.state.lock().await;
        match result {
            Ok(page) => Ok(match state.apply(&ticket, page) {
                Applied::Merged { added } => LoadOutcome::Loaded { added },
                Applied::Stale => LoadOutcome::Stale,
            }),
            Err(err) if state.is_current(&ticket) => {
                state.fail(&ticket);
                log::warn!("Loading {:?} failed: {}", ticket.filters(), err);
                self.notifier
                    .notify(Notification::error(err.localized(state.language())));
                Err(err)
            }
            Err(err) => {
                log::debug!("Ignoring failure of a stale request: {}", err);
                Ok(LoadOutcome::Stale)
            }
        }
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        self.state.lock().await.set_query(query);
    }

    pub async fn set_language(&self, language: Language) {
        self.state.lock().await.set_language(language);
    }

    pub async fn language(&self) -> Language {
        self.state.lock().await.language()
    }

    pub async fn filters(&self) -> Option<FilterSet> {
        self.state.lock().await.filters().cloned()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.lock().await;
        ListSnapshot {
            visible: state.visible().into_iter().cloned().collect(),
            accumulated: state.accumulated().len(),
            total: state.total(),
            has_more: state.has_more(),
            load_state: state.load_state(),
            query: state.query().to_string(),
            language: state.language(),
        }
    }

    pub async fn find(&self, id: &ItemId) -> Option<Item> {
        self.state.lock().await.get(id).cloned()
    }

    /// Highest `order` among the loaded records, 0 when none has one.
    pub async fn max_order(&self) -> i64 {
        self.state.lock().await.max_order()
    }

    pub async fn update_item<F: Fn(&mut Item) + Send>(&self, id: &ItemId, f: F) -> bool {
        self.state.lock().await.update_item(id, f)
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Show `change` at once, persist every new position, then commit, or
    /// roll the view back if any save fails.
    pub async fn reorder(&self, change: Reorder) -> Result<()> {
        let (pending, collection, language) = {
            let mut state = self.state.lock().await;
            let collection = state
                .filters()
                .map(FilterSet::collection)
                .ok_or(Error::NoFilters)?;
            (state.stage_reorder(&change)?, collection, state.language())
        };

        let saves = pending
            .updates()
            .iter()
            .map(|(id, order)| self.backend.save_order(collection, id, *order));
        let result = try_join_all(saves).await;

        let mut state = self.state.lock().await;
        match result {
            Ok(_) => {
                state.commit_reorder(&pending);
                self.notify(Notification::from_key(
                    Level::Success,
                    MessageKey::UpdateOrderSuccess,
                    language,
                ));
                Ok(())
            }
            Err(err) => {
                state.rollback_reorder(&pending);
                log::warn!("Saving new {} order failed: {}", collection, err);
                self.notify(Notification::from_key(
                    Level::Error,
                    MessageKey::UpdateOrderFailed,
                    language,
                ));
                Err(err)
            }
        }
    }
}
