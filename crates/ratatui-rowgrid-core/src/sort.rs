//! Single-key row sorting.
//!
//! The comparison strategy is picked from the first row's value in the sort column, not from a
//! declared column type: a column whose first row is `Null` sorts numerically even if later rows
//! hold text.

use crate::error::GridError;
use crate::value::CellValue;
use crate::value::GridRow;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Header marker for this direction.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(GridError::UnknownSortDirection(s.to_string()))
        }
    }
}

/// The active sort column and its direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub column_key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column_key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_key: column_key.into(),
            direction,
        }
    }

    pub fn asc(column_key: impl Into<String>) -> Self {
        Self::new(column_key, SortDirection::Asc)
    }

    pub fn desc(column_key: impl Into<String>) -> Self {
        Self::new(column_key, SortDirection::Desc)
    }
}

/// Next state when the user asks to sort by `column_key`: none, ascending, descending, none.
pub fn cycle_sort(current: Option<&SortSpec>, column_key: &str) -> Option<SortSpec> {
    match current {
        Some(s) if s.column_key == column_key => match s.direction {
            SortDirection::Asc => Some(SortSpec::desc(column_key)),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec::asc(column_key)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SortStrategy {
    Text,
    Numeric,
    Timestamp,
    /// No comparator applies; input order is kept.
    Unordered,
}

impl SortStrategy {
    fn sniff(sample: &CellValue) -> Self {
        match sample {
            CellValue::Text(_) => SortStrategy::Text,
            CellValue::Number(_) | CellValue::Null => SortStrategy::Numeric,
            CellValue::Date(_) => SortStrategy::Timestamp,
            CellValue::Bool(_) => SortStrategy::Unordered,
        }
    }
}

enum SortKey {
    Text(String),
    Number(f64),
    Millis(i64),
}

impl SortKey {
    fn extract(strategy: SortStrategy, value: CellValue) -> Self {
        match strategy {
            SortStrategy::Text => SortKey::Text(value.sort_text()),
            SortStrategy::Numeric | SortStrategy::Unordered => {
                // NaN counts as a non-number.
                SortKey::Number(value.as_number().filter(|n| !n.is_nan()).unwrap_or(0.0))
            }
            SortStrategy::Timestamp => SortKey::Millis(
                value
                    .as_date()
                    .map(|d| d.and_utc().timestamp_millis())
                    .unwrap_or(0),
            ),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => locale_compare(a, b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Millis(a), SortKey::Millis(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Returns `rows` ordered by `spec`.
///
/// With no spec, or no rows, the input is returned as-is (borrowed). Otherwise a new sequence is
/// built with a stable ascending sort; `Desc` reverses that result, which also reverses the
/// relative order of equal keys.
pub fn sort_rows<'a, R: GridRow>(rows: &'a [R], spec: Option<&SortSpec>) -> Cow<'a, [R]> {
    let Some(spec) = spec else {
        return Cow::Borrowed(rows);
    };
    let Some(first) = rows.first() else {
        return Cow::Borrowed(rows);
    };

    let strategy = SortStrategy::sniff(&first.value(&spec.column_key));
    log::trace!(
        "sorting {} rows by `{}` {} using {:?}",
        rows.len(),
        spec.column_key,
        spec.direction,
        strategy
    );

    let mut keyed: Vec<(SortKey, &R)> = rows
        .iter()
        .map(|row| {
            (
                SortKey::extract(strategy, row.value(&spec.column_key)),
                row,
            )
        })
        .collect();
    if strategy != SortStrategy::Unordered {
        keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    }

    let mut out: Vec<R> = keyed.into_iter().map(|(_, row)| row.clone()).collect();
    if spec.direction == SortDirection::Desc {
        out.reverse();
    }
    Cow::Owned(out)
}

/// Human-friendly string ordering: case-insensitive first, lowercase before uppercase on ties.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| case_tiebreak(a, b))
        .then_with(|| a.cmp(b))
}

fn case_tiebreak(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        if x.is_lowercase() && y.is_uppercase() {
            return Ordering::Less;
        }
        if x.is_uppercase() && y.is_lowercase() {
            return Ordering::Greater;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;
    use chrono::NaiveDate;

    fn prices(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .map(|p| Record::new().with("price", *p))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn column(rows: &[Record], key: &str) -> Vec<CellValue> {
        rows.iter().map(|r| r.value(key)).collect()
    }

    #[test]
    fn desc_orders_numbers_high_to_low() {
        let rows = prices(&[1.0, 3.0, 2.0]);
        let sorted = sort_rows(&rows, Some(&SortSpec::desc("price")));
        assert_eq!(sorted.as_ref(), prices(&[3.0, 2.0, 1.0]).as_slice());
    }

    #[test]
    fn no_spec_or_no_rows_borrows_input() {
        let rows = prices(&[2.0, 1.0]);
        assert!(matches!(sort_rows(&rows, None), Cow::Borrowed(_)));
        let empty: Vec<Record> = Vec::new();
        assert!(matches!(
            sort_rows(&empty, Some(&SortSpec::asc("price"))),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn input_is_left_untouched() {
        let rows = prices(&[3.0, 1.0, 2.0]);
        let _ = sort_rows(&rows, Some(&SortSpec::asc("price")));
        assert_eq!(rows, prices(&[3.0, 1.0, 2.0]));
    }

    #[test]
    fn text_sort_is_case_insensitive() {
        let rows: Vec<Record> = ["banana", "Apple", "cherry"]
            .iter()
            .map(|n| Record::new().with("name", *n))
            .collect();
        let sorted = sort_rows(&rows, Some(&SortSpec::asc("name")));
        assert_eq!(
            column(&sorted, "name"),
            vec![text("Apple"), text("banana"), text("cherry")]
        );
    }

    #[test]
    fn null_first_row_sorts_numerically_even_with_text_later() {
        let rows = vec![
            Record::new(),
            Record::new().with("v", "b"),
            Record::new().with("v", -1.0),
        ];
        let sorted = sort_rows(&rows, Some(&SortSpec::asc("v")));
        // Text and null both count as 0; -1 moves first, the rest keep their order.
        assert_eq!(
            column(&sorted, "v"),
            vec![num(-1.0), CellValue::Null, text("b")]
        );
    }

    #[test]
    fn text_strategy_stringifies_other_values() {
        let rows = vec![
            Record::new().with("v", "m"),
            Record::new(),
            Record::new().with("v", 5),
        ];
        let sorted = sort_rows(&rows, Some(&SortSpec::asc("v")));
        // "5" < "m" < "null"
        assert_eq!(
            column(&sorted, "v"),
            vec![num(5.0), text("m"), CellValue::Null]
        );
    }

    #[test]
    fn dates_sort_by_timestamp() {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(CellValue::Date)
                .unwrap_or_default()
        };
        let rows: Vec<Record> = [3, 1, 2]
            .into_iter()
            .map(|d| Record::new().with("at", day(d)))
            .collect();
        let sorted = sort_rows(&rows, Some(&SortSpec::asc("at")));
        assert_eq!(column(&sorted, "at"), vec![day(1), day(2), day(3)]);
    }

    #[test]
    fn bool_column_keeps_order_and_desc_only_reverses() {
        let rows: Vec<Record> = [true, false, true]
            .into_iter()
            .enumerate()
            .map(|(i, b)| Record::new().with("id", i as i64).with("ok", b))
            .collect();
        let asc = sort_rows(&rows, Some(&SortSpec::asc("ok")));
        assert_eq!(asc.as_ref(), rows.as_slice());
        let desc = sort_rows(&rows, Some(&SortSpec::desc("ok")));
        let ids: Vec<CellValue> = column(&desc, "id");
        assert_eq!(ids, vec![num(2.0), num(1.0), num(0.0)]);
    }

    #[test]
    fn desc_reverses_ties() {
        let rows = vec![
            Record::new().with("id", 1).with("k", 1),
            Record::new().with("id", 2).with("k", 1),
            Record::new().with("id", 3).with("k", 0),
        ];
        let sorted = sort_rows(&rows, Some(&SortSpec::desc("k")));
        assert_eq!(column(&sorted, "id"), vec![num(2.0), num(1.0), num(3.0)]);
    }

    #[test]
    fn sorting_twice_gives_same_keys() {
        let rows = prices(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        for spec in [SortSpec::asc("price"), SortSpec::desc("price")] {
            let once = sort_rows(&rows, Some(&spec)).into_owned();
            let twice = sort_rows(&once, Some(&spec)).into_owned();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn nan_sorts_as_zero() {
        let values: Vec<f64> = (0..50)
            .map(|i| if i % 3 == 0 { f64::NAN } else { (50 - i) as f64 })
            .collect();
        let rows = prices(&values);
        let sorted = sort_rows(&rows, Some(&SortSpec::asc("price")));
        let keys: Vec<f64> = sorted
            .iter()
            .map(|r| r.value("price").as_number().unwrap_or(0.0))
            .map(|n| if n.is_nan() { 0.0 } else { n })
            .collect();
        assert_eq!(keys.len(), 50);
        assert!(keys.windows(2).all(|w| w[0] <= w[1]), "{keys:?}");
        assert!(sorted[..17].iter().all(|r| r.value("price").as_number().is_some_and(f64::is_nan)));
    }

    #[test]
    fn cycle_goes_asc_desc_none() {
        let s1 = cycle_sort(None, "a");
        assert_eq!(s1, Some(SortSpec::asc("a")));
        let s2 = cycle_sort(s1.as_ref(), "a");
        assert_eq!(s2, Some(SortSpec::desc("a")));
        assert_eq!(cycle_sort(s2.as_ref(), "a"), None);
        assert_eq!(cycle_sort(s2.as_ref(), "b"), Some(SortSpec::asc("b")));
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("desc".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!(
            "up".parse::<SortDirection>(),
            Err(GridError::UnknownSortDirection("up".to_string()))
        );
    }

    #[test]
    fn locale_compare_puts_lowercase_first_on_ties() {
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("B", "a"), Ordering::Greater);
        assert_eq!(locale_compare("abc", "abc"), Ordering::Equal);
    }
}
