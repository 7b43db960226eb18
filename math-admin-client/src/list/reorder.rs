use crate::error::{Error, Result};
use crate::models::Item;

/// A change of row order requested by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reorder {
    /// Drag the row at `from` and drop it at `to`.
    Move { from: usize, to: usize },
    /// New sequence is `[list[p0], list[p1], ...]`.
    Permute(Vec<usize>),
}

impl Reorder {
    pub fn apply(&self, list: &[Item]) -> Result<Vec<Item>> {
        match self {
            Reorder::Move { from, to } => move_item(list, *from, *to),
            Reorder::Permute(positions) => permute(list, positions),
        }
    }
}

pub fn move_item(list: &[Item], from: usize, to: usize) -> Result<Vec<Item>> {
    let len = list.len();
    for index in [from, to] {
        if index >= len {
            return Err(Error::OutOfBounds { index, len });
        }
    }
    let mut reordered = list.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    renumber(&mut reordered);
    Ok(reordered)
}

pub fn permute(list: &[Item], positions: &[usize]) -> Result<Vec<Item>> {
    let len = list.len();
    if positions.len() != len {
        return Err(Error::InvalidPermutation { len });
    }
    let mut used = vec![false; len];
    for &position in positions {
        if position >= len || used[position] {
            return Err(Error::InvalidPermutation { len });
        }
        used[position] = true;
    }
    let mut reordered: Vec<Item> = positions.iter().map(|&p| list[p].clone()).collect();
    renumber(&mut reordered);
    Ok(reordered)
}

/// Orders are 1-based and follow the sequence.
fn renumber(items: &mut [Item]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index as i64 + 1);
    }
}
