use super::keyed::{merge_page, KeyedList};
use super::reorder::Reorder;
use crate::error::{Error, Result};
use crate::filters::{reset_decision, FilterSet, ResetDecision};
use crate::language::Language;
use crate::models::{FetchedPage, Item, ItemId, PageToken};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Populated,
    LoadingMore,
}

/// A fetch in flight. It remembers the generation and filters it was issued
/// for, so an answer arriving after a reset can be recognised and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    generation: u64,
    filters: FilterSet,
    token: Option<PageToken>,
    previous: LoadState,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn token(&self) -> Option<&PageToken> {
        self.token.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadMore {
    /// No cursor held: nothing to fetch.
    NoToken,
    /// A page load for the current filters has not finished yet.
    InFlight,
    Start(Ticket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Merged { added: usize },
    Stale,
}

/// An optimistic reorder awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReorder {
    generation: u64,
    updates: Vec<(ItemId, i64)>,
}

impl PendingReorder {
    /// `(id, new order)` for every row, in the new sequence.
    pub fn updates(&self) -> &[(ItemId, i64)] {
        &self.updates
    }
}

/// Client-side state of one paginated listing. Pure: it never performs I/O,
/// callers exchange [`Ticket`]s for fetched pages.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    filters: Option<FilterSet>,
    generation: u64,
    items: KeyedList,
    pending: Option<KeyedList>,
    next_token: Option<PageToken>,
    total: u64,
    load_state: LoadState,
    query: String,
    language: Language,
}

impl ListState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn filters(&self) -> Option<&FilterSet> {
        self.filters.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn next_token(&self) -> Option<&PageToken> {
        self.next_token.as_ref()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Committed records, in fetch order.
    pub fn accumulated(&self) -> &[Item] {
        self.items.as_slice()
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn is_reorder_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether "load more" should be offered.
    pub fn has_more(&self) -> bool {
        self.next_token.is_some() && (self.items.len() as u64) < self.total
    }

    pub fn max_order(&self) -> i64 {
        self.items.max_order().unwrap_or(0)
    }

    /// Switch to `filters`. Returns the first-page ticket when the switch
    /// resets the list, `None` when nothing changed.
    pub fn select(&mut self, filters: FilterSet) -> Option<Ticket> {
        match reset_decision(self.filters.as_ref(), &filters) {
            ResetDecision::Keep => None,
            ResetDecision::Reset => Some(self.reset(filters)),
        }
    }

    /// Discard everything and prepare the first page request for `filters`.
    pub fn reset(&mut self, filters: FilterSet) -> Ticket {
        self.generation += 1;
        self.items.clear();
        self.pending = None;
        self.next_token = None;
        self.total = 0;
        self.filters = Some(filters.clone());
        self.load_state = LoadState::Loading;
        log::debug!("List reset to generation {} for {:?}", self.generation, filters);

        Ticket {
            generation: self.generation,
            filters,
            token: None,
            previous: LoadState::Empty,
        }
    }

    pub fn begin_load_more(&mut self) -> LoadMore {
        let (Some(token), Some(filters)) = (self.next_token.clone(), self.filters.clone()) else {
            return LoadMore::NoToken;
        };
        if matches!(self.load_state, LoadState::Loading | LoadState::LoadingMore) {
            return LoadMore::InFlight;
        }
        let previous = self.load_state;
        self.load_state = LoadState::LoadingMore;
        LoadMore::Start(Ticket {
            generation: self.generation,
            filters,
            token: Some(token),
            previous,
        })
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && self.filters.as_ref() == Some(&ticket.filters)
    }

    /// Merge a fetched page if `ticket` still describes the current listing.
    pub fn apply(&mut self, ticket: &Ticket, page: FetchedPage) -> Applied {
        if !self.is_current(ticket) {
            log::warn!(
                "Discarding page from generation {} (current is {})",
                ticket.generation,
                self.generation
            );
            return Applied::Stale;
        }
        if let Some(pending) = &mut self.pending {
            merge_page(pending, page.items.iter().cloned());
        }
        let added = merge_page(&mut self.items, page.items);
        self.next_token = page.next_token;
        self.total = page.total;
        self.load_state = LoadState::Populated;
        log::debug!(
            "Merged {} new items ({} accumulated of {})",
            added,
            self.items.len(),
            self.total
        );
        Applied::Merged { added }
    }

    /// Roll the load state back after a failed fetch. Accumulated records
    /// are left untouched.
    pub fn fail(&mut self, ticket: &Ticket) {
        if self.is_current(ticket) {
            self.load_state = ticket.previous;
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Apply `f` to a loaded record, in both the committed and pending views.
    pub fn update_item<F: Fn(&mut Item)>(&mut self, id: &ItemId, f: F) -> bool {
        if let Some(pending) = &mut self.pending {
            pending.update(id, &f);
        }
        self.items.update(id, &f)
    }

    /// Records to render: the pending reorder if there is one, otherwise the
    /// committed list, filtered by the current query.
    pub fn visible(&self) -> Vec<&Item> {
        let source = self.pending.as_ref().unwrap_or(&self.items);
        let fields = self
            .filters
            .as_ref()
            .map(FilterSet::search_fields)
            .unwrap_or(&["name"]);
        apply_filter(source.as_slice(), &self.query, self.language, fields)
    }

    /// Apply `change` to the committed list and show it as pending.
    pub fn stage_reorder(&mut self, change: &Reorder) -> Result<PendingReorder> {
        if self.pending.is_some() {
            return Err(Error::ReorderPending);
        }
        if !self.query.trim().is_empty() {
            return Err(Error::ReorderWhileFiltered);
        }
        let reordered = change.apply(self.items.as_slice())?;
        let updates = reordered
            .iter()
            .map(|item| (item.id().clone(), item.order().unwrap_or_default()))
            .collect();
        self.pending = Some(reordered.into_iter().collect());
        Ok(PendingReorder {
            generation: self.generation,
            updates,
        })
    }

    /// Make the pending order authoritative. Returns false if the list was
    /// reset in the meantime.
    pub fn commit_reorder(&mut self, reorder: &PendingReorder) -> bool {
        if reorder.generation != self.generation {
            return false;
        }
        match self.pending.take() {
            Some(pending) => {
                self.items = pending;
                true
            }
            None => false,
        }
    }

    /// Drop the pending view; the committed list is shown again.
    pub fn rollback_reorder(&mut self, reorder: &PendingReorder) {
        if reorder.generation == self.generation {
            self.pending = None;
        }
    }
}

/// Records whose `fields` (in `language`) contain `query`, ignoring case.
/// A blank query keeps every record.
pub fn apply_filter<'a>(
    list: &'a [Item],
    query: &str,
    language: Language,
    fields: &[&str],
) -> Vec<&'a Item> {
    if query.trim().is_empty() {
        return list.iter().collect();
    }
    let needle = query.to_lowercase();
    list.iter()
        .filter(|item| {
            fields.iter().any(|field| {
                item.localized(field, language)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::StatusFilter;
    use crate::models::lesson::{Grade, LessonType};
    use proptest::prelude::*;
    use serde_json::json;

    fn lessons() -> FilterSet {
        FilterSet::lessons(Grade::default(), LessonType::Addition)
    }

    fn page(range: std::ops::Range<u64>, token: Option<&str>, total: u64) -> FetchedPage {
        FetchedPage::new(
            range.map(|id| Item::new(id).with("order", id as i64)).collect(),
            token.map(PageToken::new),
            total,
        )
    }

    fn visible_ids(state: &ListState) -> Vec<String> {
        state.visible().iter().map(|item| item.id().to_string()).collect()
    }

    #[test]
    fn test_two_page_scenario() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        assert_eq!(state.load_state(), LoadState::Loading);
        assert_eq!(state.apply(&first, page(1..21, Some("20"), 35)), Applied::Merged { added: 20 });
        assert!(state.has_more());

        let LoadMore::Start(second) = state.begin_load_more() else {
            panic!("expected a second page request");
        };
        assert_eq!(second.token(), Some(&PageToken::new("20")));
        assert_eq!(state.load_state(), LoadState::LoadingMore);
        state.apply(&second, page(21..36, None, 35));

        assert_eq!(state.accumulated().len(), 35);
        assert!(!state.has_more());
        assert_eq!(state.begin_load_more(), LoadMore::NoToken);
    }

    #[test]
    fn test_filter_change_resets_everything() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..4, Some("3"), 10));
        state.set_query("");

        assert!(state.select(lessons()).is_none());
        let ticket = state
            .select(lessons().with_status(StatusFilter::Disabled))
            .unwrap();
        assert!(state.accumulated().is_empty());
        assert!(state.visible().is_empty());
        assert!(state.next_token().is_none());
        assert_eq!(ticket.token(), None);
        assert_eq!(ticket.generation(), 2);
    }

    #[test]
    fn test_stale_page_is_discarded() {
        let mut state = ListState::new(Language::Vi);
        let old = state.select(lessons()).unwrap();
        let fresh = state
            .select(lessons().with_lesson_type(LessonType::Division))
            .unwrap();

        assert_eq!(state.apply(&old, page(1..5, Some("4"), 9)), Applied::Stale);
        assert!(state.accumulated().is_empty());
        assert_eq!(state.load_state(), LoadState::Loading);

        state.apply(&fresh, page(7..9, None, 2));
        assert_eq!(visible_ids(&state), vec!["7", "8"]);
    }

    #[test]
    fn test_failed_load_more_keeps_state() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..3, Some("2"), 5));

        let LoadMore::Start(more) = state.begin_load_more() else {
            panic!("expected a request");
        };
        assert_eq!(state.begin_load_more(), LoadMore::InFlight);
        state.fail(&more);

        assert_eq!(state.load_state(), LoadState::Populated);
        assert_eq!(state.accumulated().len(), 2);
        assert_eq!(state.next_token(), Some(&PageToken::new("2")));
    }

    #[test]
    fn test_failed_first_load_returns_to_empty() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.fail(&first);
        assert_eq!(state.load_state(), LoadState::Empty);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(
            &first,
            FetchedPage::new(
                vec![Item::new(1u64).with("name", "A"), Item::new(2u64).with("name", "B")],
                None,
                2,
            ),
        );
        state.set_query("a");
        assert_eq!(visible_ids(&state), vec!["1"]);
    }

    #[test]
    fn test_query_follows_language() {
        let items = vec![Item::new("x").with("name", json!({"vi": "Phép cộng", "en": "Addition"}))];
        assert_eq!(apply_filter(&items, "ADD", Language::En, &["name"]).len(), 1);
        assert!(apply_filter(&items, "ADD", Language::Vi, &["name"]).is_empty());
        assert_eq!(apply_filter(&items, "   ", Language::Vi, &["name"]).len(), 1);
    }

    #[test]
    fn test_details_match_title_or_content() {
        let items = vec![
            Item::new("1").with("title", json!({"en": "Define"})),
            Item::new("2").with("content", json!({"en": "<p>define carefully</p>"})),
            Item::new("3").with("title", json!({"en": "Remember"})),
        ];
        let found = apply_filter(&items, "define", Language::En, &["title", "content"]);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_reorder_pending_then_commit() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..4, None, 3));

        let pending = state.stage_reorder(&Reorder::Permute(vec![2, 0, 1])).unwrap();
        let expected = vec![
            (ItemId::from("3"), 1),
            (ItemId::from("1"), 2),
            (ItemId::from("2"), 3),
        ];
        assert_eq!(pending.updates(), expected.as_slice());
        assert_eq!(visible_ids(&state), vec!["3", "1", "2"]);
        // Committed list is untouched until the server confirms.
        assert_eq!(state.accumulated()[0].id().as_str(), "1");
        assert!(matches!(
            state.stage_reorder(&Reorder::Move { from: 0, to: 1 }),
            Err(Error::ReorderPending)
        ));

        assert!(state.commit_reorder(&pending));
        assert_eq!(state.accumulated()[0].id().as_str(), "3");
        assert_eq!(state.accumulated()[0].order(), Some(1));
    }

    #[test]
    fn test_reorder_rollback_restores_committed_view() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..4, None, 3));

        let pending = state.stage_reorder(&Reorder::Move { from: 2, to: 0 }).unwrap();
        assert_eq!(visible_ids(&state), vec!["3", "1", "2"]);
        state.rollback_reorder(&pending);
        assert_eq!(visible_ids(&state), vec!["1", "2", "3"]);
        assert_eq!(state.accumulated()[2].order(), Some(3));
    }

    #[test]
    fn test_reorder_rejected_while_searching() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..3, None, 2));
        state.set_query("x");
        assert!(matches!(
            state.stage_reorder(&Reorder::Move { from: 0, to: 1 }),
            Err(Error::ReorderWhileFiltered)
        ));
    }

    #[test]
    fn test_commit_after_reset_is_ignored() {
        let mut state = ListState::new(Language::Vi);
        let first = state.select(lessons()).unwrap();
        state.apply(&first, page(1..3, None, 2));
        let pending = state.stage_reorder(&Reorder::Move { from: 0, to: 1 }).unwrap();
        state.reset(lessons());
        assert!(!state.commit_reorder(&pending));
        assert!(state.accumulated().is_empty());
    }

    proptest! {
        #[test]
        fn prop_visible_is_matching_subsequence(
            names in prop::collection::vec("[a-cA-C]{0,4}", 0..20),
            query in "[a-cA-C]{1,2}",
        ) {
            let items: Vec<Item> = names
                .iter()
                .enumerate()
                .map(|(i, name)| Item::new(i as u64).with("name", json!({"en": name})))
                .collect();
            let visible = apply_filter(&items, &query, Language::En, &["name"]);

            let mut cursor = items.iter();
            for item in &visible {
                prop_assert!(cursor.any(|candidate| candidate.id() == item.id()));
                let name = item.localized("name", Language::En).unwrap_or_default();
                prop_assert!(name.to_lowercase().contains(&query.to_lowercase()));
            }
        }
    }
}
