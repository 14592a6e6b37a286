//! Per-column substring filtering.

use crate::column::ROW_NUMBER_COLUMN_KEY;
use crate::value::GridRow;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Filter inputs shown in the grid header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Whether the filter inputs are visible.
    pub show_filters: bool,
    /// Column key to substring. Empty strings do not constrain anything.
    pub filters: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new(show_filters: bool) -> Self {
        Self {
            show_filters,
            filters: BTreeMap::new(),
        }
    }

    pub fn toggle_visibility(&mut self) {
        self.show_filters = !self.show_filters;
    }

    pub fn set_filter(&mut self, column_key: impl Into<String>, value: impl Into<String>) {
        self.filters.insert(column_key.into(), value.into());
    }

    pub fn filter(&self, column_key: &str) -> &str {
        self.filters.get(column_key).map(String::as_str).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Whether any filter would exclude rows.
    pub fn is_active(&self) -> bool {
        self.filters
            .iter()
            .any(|(k, v)| !v.is_empty() && k.as_str() != ROW_NUMBER_COLUMN_KEY)
    }
}

/// Returns the rows matching every non-empty filter.
///
/// A value matches when its display text contains the filter text, ignoring case. Missing fields
/// read as empty text. The row number column never filters. With nothing to filter on the input
/// is returned borrowed.
pub fn filter_rows<'a, R: GridRow>(
    rows: &'a [R],
    filters: &BTreeMap<String, String>,
) -> Cow<'a, [R]> {
    let needles: Vec<(&str, String)> = filters
        .iter()
        .filter(|(key, value)| !value.is_empty() && key.as_str() != ROW_NUMBER_COLUMN_KEY)
        .map(|(key, value)| (key.as_str(), value.to_lowercase()))
        .collect();
    if needles.is_empty() {
        return Cow::Borrowed(rows);
    }

    let out: Vec<R> = rows
        .iter()
        .filter(|row| row_matches(*row, &needles))
        .cloned()
        .collect();
    log::trace!("filter kept {} of {} rows", out.len(), rows.len());
    Cow::Owned(out)
}

fn row_matches<R: GridRow>(row: &R, needles: &[(&str, String)]) -> bool {
    needles.iter().all(|(key, needle)| {
        row.value(key)
            .display_text()
            .to_lowercase()
            .contains(needle.as_str())
    })
}
