//! Single-row selection.

use crate::value::RowKey;
use std::sync::Arc;

/// Extracts the stable key of a row. Selection compares keys, never row contents.
pub type RowKeyGetter<R> = Arc<dyn Fn(&R) -> RowKey + Send + Sync>;

/// Zero or one selected row.
#[derive(Clone, Debug, PartialEq)]
pub enum RowSelection<R> {
    Unselected,
    Selected { key: RowKey, row: R },
}

impl<R> Default for RowSelection<R> {
    fn default() -> Self {
        RowSelection::Unselected
    }
}

impl<R: Clone> RowSelection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the state from an initial row without counting as a transition.
    pub fn with_initial(row: Option<R>, key_of: &dyn Fn(&R) -> RowKey) -> Self {
        match row {
            Some(row) => RowSelection::Selected {
                key: key_of(&row),
                row,
            },
            None => RowSelection::Unselected,
        }
    }

    pub fn selected_key(&self) -> Option<&RowKey> {
        match self {
            RowSelection::Selected { key, .. } => Some(key),
            RowSelection::Unselected => None,
        }
    }

    pub fn selected_row(&self) -> Option<&R> {
        match self {
            RowSelection::Selected { row, .. } => Some(row),
            RowSelection::Unselected => None,
        }
    }

    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selected_key() == Some(key)
    }

    /// Selecting the selected row again unselects it; any other row replaces the selection.
    ///
    /// Returns the newly selected row, or `None` when the selection was cleared.
    pub fn toggle(&mut self, row: &R, key: RowKey) -> Option<R> {
        if self.is_selected(&key) {
            log::debug!("row {key} unselected");
            *self = RowSelection::Unselected;
            None
        } else {
            log::debug!("row {key} selected");
            *self = RowSelection::Selected {
                key,
                row: row.clone(),
            };
            Some(row.clone())
        }
    }

    /// Clears the selection. Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        let was_selected = matches!(self, RowSelection::Selected { .. });
        *self = RowSelection::Unselected;
        was_selected
    }

    /// Re-checks the selection against a new row list.
    ///
    /// When the selected key is gone the selection resets and `true` is returned. When it is
    /// still present the stored row is refreshed to the new version.
    pub fn retain_present<'a, I>(&mut self, rows: I, key_of: &dyn Fn(&R) -> RowKey) -> bool
    where
        I: IntoIterator<Item = &'a R>,
        R: 'a,
    {
        let RowSelection::Selected { key, row } = self else {
            return false;
        };
        match rows.into_iter().find(|r| key_of(r) == *key) {
            Some(fresh) => {
                *row = fresh.clone();
                false
            }
            None => {
                log::debug!("selected row {key} disappeared, clearing selection");
                *self = RowSelection::Unselected;
                true
            }
        }
    }
}
