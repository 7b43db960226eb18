//! Paginated list cache: accumulates server pages into a deduplicated list,
//! filters it client-side and stages optimistic reorders.

mod controller;
mod keyed;
mod reorder;
mod state;

pub use controller::{ListController, ListSnapshot, LoadOutcome};
pub use keyed::{merge_page, KeyedList};
pub use reorder::{move_item, permute, Reorder};
pub use state::{apply_filter, Applied, ListState, LoadMore, LoadState, PendingReorder, Ticket};
