//! Cell values and the row abstraction the grid operates on.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

/// Field name the row helpers treat as the row's identifier.
pub const ID_FIELD: &str = "id";

/// A single cell value.
///
/// A field that a row does not have reads as [`CellValue::Null`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match *self {
            CellValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match *self {
            CellValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text used for display, filtering and editing. `Null` is empty.
    pub fn display_text(&self) -> String {
        self.to_string()
    }

    /// Text used by the string sort strategy, where `Null` spells itself out.
    pub(crate) fn sort_text(&self) -> String {
        match self {
            CellValue::Null => "null".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// A row the grid can display, sort, filter and edit.
///
/// The grid only reads the field named by a column key, plus the optional identifier. Rows are
/// never mutated in place: edits happen on clones that are handed back to the caller.
pub trait GridRow: Clone {
    /// Value of the field behind `key`. Missing fields return [`CellValue::Null`].
    fn value(&self, key: &str) -> CellValue;

    /// Writes `value` into the field behind `key`. Returns `false` if the row cannot hold it.
    fn set_value(&mut self, _key: &str, _value: CellValue) -> bool {
        false
    }

    /// The row's identifier, if the row type has an identifier field at all.
    ///
    /// `Some(CellValue::Null)` means "has an id field, currently empty"; this still makes freshly
    /// inserted rows receive a generated id.
    fn id(&self) -> Option<CellValue> {
        None
    }

    fn set_id(&mut self, _id: CellValue) {}
}

/// Stable identity of a row, produced by a caller-supplied key getter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKey {
    Number(i64),
    Text(String),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Number(n) => write!(f, "{n}"),
            RowKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(n: i64) -> Self {
        RowKey::Number(n)
    }
}

impl From<&str> for RowKey {
    fn from(s: &str) -> Self {
        RowKey::Text(s.to_string())
    }
}

impl From<String> for RowKey {
    fn from(s: String) -> Self {
        RowKey::Text(s)
    }
}

/// A string-keyed record, handy when rows come from loosely typed sources.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<CellValue> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl GridRow for Record {
    fn value(&self, key: &str) -> CellValue {
        self.fields.get(key).cloned().unwrap_or_default()
    }

    fn set_value(&mut self, key: &str, value: CellValue) -> bool {
        self.fields.insert(key.to_string(), value);
        true
    }

    fn id(&self) -> Option<CellValue> {
        self.fields.get(ID_FIELD).cloned()
    }

    fn set_id(&mut self, id: CellValue) {
        self.fields.insert(ID_FIELD.to_string(), id);
    }
}
