use std::cmp::Ordering;

use tracing::warn;

use crate::domain::Month;
use crate::ordering::{compare_check_names, month_ordinal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Existing,
    /// `index` is an unused cell (blank, or past the last scanned entry).
    Vacant,
    Insert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub index: usize,
    pub slot: Slot,
}

impl Location {
    fn new(index: usize, slot: Slot) -> Self {
        Self { index, slot }
    }

    pub fn must_insert(&self) -> bool {
        self.slot == Slot::Insert
    }

    pub fn needs_key(&self) -> bool {
        self.slot != Slot::Existing
    }
}

pub fn locate_row<S: AsRef<str>>(check: &str, rows: &[Vec<S>]) -> Location {
    for (index, row) in rows.iter().enumerate() {
        let key = row.first().map(|cell| cell.as_ref().trim()).unwrap_or("");
        if key.is_empty() {
            return Location::new(index, Slot::Vacant);
        }
        match compare_check_names(check, key) {
            Ordering::Equal => return Location::new(index, Slot::Existing),
            Ordering::Less => return Location::new(index, Slot::Insert),
            Ordering::Greater => {}
        }
    }
    Location::new(rows.len(), Slot::Vacant)
}

pub fn locate_column<S: AsRef<str>>(month: Month, header: &[S]) -> Location {
    let target = month.ordinal();
    for (index, cell) in header.iter().enumerate() {
        let label = cell.as_ref().trim();
        if label.is_empty() {
            return Location::new(index, Slot::Vacant);
        }
        let ordinal = match month_ordinal(label) {
            Ok(ordinal) => ordinal,
            Err(err) => {
                warn!(%err, column = index, "skipping header cell");
                continue;
            }
        };
        match ordinal.cmp(&target) {
            Ordering::Equal => return Location::new(index, Slot::Existing),
            Ordering::Greater => return Location::new(index, Slot::Insert),
            Ordering::Less => {}
        }
    }
    Location::new(header.len(), Slot::Vacant)
}
