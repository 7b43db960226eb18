use crate::models::{Item, ItemId};
use std::collections::HashMap;

/// Records in arrival order, unique by id. The side index maps each id to
/// its position so membership checks do not scan the list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyedList {
    items: Vec<Item>,
    positions: HashMap<ItemId, usize>,
}

impl KeyedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.positions.get(id).map(|&position| &self.items[position])
    }

    /// Append `item` unless its id is already present. Returns whether it was added.
    pub fn insert_new(&mut self, item: Item) -> bool {
        if self.positions.contains_key(item.id()) {
            return false;
        }
        self.positions.insert(item.id().clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// Apply `f` to the record with `id` in place. Returns whether it exists.
    pub fn update<F: FnOnce(&mut Item)>(&mut self, id: &ItemId, f: F) -> bool {
        match self.positions.get(id) {
            Some(&position) => {
                f(&mut self.items[position]);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    pub fn max_order(&self) -> Option<i64> {
        self.items.iter().filter_map(Item::order).max()
    }

    pub fn into_vec(self) -> Vec<Item> {
        self.items
    }
}

impl FromIterator<Item> for KeyedList {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        let mut list = KeyedList::new();
        merge_page(&mut list, iter);
        list
    }
}

/// Append the incoming records whose id is not yet known, in arrival order.
/// Returns how many were added.
pub fn merge_page<I: IntoIterator<Item = Item>>(existing: &mut KeyedList, incoming: I) -> usize {
    incoming
        .into_iter()
        .map(|item| existing.insert_new(item))
        .filter(|added| *added)
        .count()
}
