//! Copy-on-write row edits used by the context menu.
//!
//! Every function takes the current rows by reference and returns a fresh `Vec`. Out-of-range
//! indices are not errors: the rows come back unchanged.

use crate::value::CellValue;
use crate::value::GridRow;

/// Next identifier for an inserted row: one past the largest numeric id, or `1`.
pub fn generate_new_id<R: GridRow>(rows: &[R]) -> f64 {
    rows.iter()
        .filter_map(|r| r.id().and_then(|id| id.as_number()))
        .fold(None, |max: Option<f64>, id| {
            Some(max.map_or(id, |m| m.max(id)))
        })
        .map_or(1.0, |max| max + 1.0)
}

pub fn copy_row<R: GridRow>(rows: &[R], idx: usize) -> Option<R> {
    rows.get(idx).cloned()
}

/// Overwrites the row at `idx` with `copied`, keeping the target's id when it has one.
pub fn paste_row<R: GridRow>(rows: &[R], idx: usize, copied: &R) -> Vec<R> {
    let mut out = rows.to_vec();
    let Some(target) = out.get_mut(idx) else {
        log::debug!("paste target {idx} out of range ({} rows)", rows.len());
        return out;
    };
    let mut pasted = copied.clone();
    if let Some(id) = target.id() {
        pasted.set_id(id);
    }
    *target = pasted;
    out
}

pub fn delete_row<R: GridRow>(rows: &[R], idx: usize) -> Vec<R> {
    let mut out = rows.to_vec();
    if idx < out.len() {
        out.remove(idx);
    } else {
        log::debug!("delete target {idx} out of range ({} rows)", rows.len());
    }
    out
}

/// Inserts a new row from `create` right after `idx`.
pub fn add_row_below<R, F>(rows: &[R], idx: usize, create: F) -> Vec<R>
where
    R: GridRow,
    F: FnOnce() -> R,
{
    let mut out = rows.to_vec();
    if idx >= out.len() {
        log::debug!("insert anchor {idx} out of range ({} rows)", rows.len());
        return out;
    }
    out.insert(idx + 1, new_row(rows, create));
    out
}

/// Appends a new row from `create`.
pub fn add_row_to_bottom<R, F>(rows: &[R], create: F) -> Vec<R>
where
    R: GridRow,
    F: FnOnce() -> R,
{
    let mut out = rows.to_vec();
    out.push(new_row(rows, create));
    out
}

fn new_row<R: GridRow, F: FnOnce() -> R>(rows: &[R], create: F) -> R {
    let mut row = create();
    if row.id().is_some() {
        row.set_id(CellValue::Number(generate_new_id(rows)));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    fn ids(ids: &[i64]) -> Vec<Record> {
        ids.iter().map(|i| Record::new().with("id", *i)).collect()
    }

    fn names(rows: &[Record]) -> Vec<String> {
        rows.iter().map(|r| r.value("name").display_text()).collect()
    }

    fn abc() -> Vec<Record> {
        ["a", "b", "c"]
            .iter()
            .map(|n| Record::new().with("name", *n))
            .collect()
    }

    #[test]
    fn new_id_is_max_plus_one() {
        assert_eq!(generate_new_id(&ids(&[1, 3])), 4.0);
        assert_eq!(generate_new_id(&ids(&[7, 2])), 8.0);
    }

    #[test]
    fn new_id_defaults_to_one() {
        assert_eq!(generate_new_id::<Record>(&[]), 1.0);
        assert_eq!(generate_new_id(&abc()), 1.0);
        let text_ids = vec![Record::new().with("id", "x")];
        assert_eq!(generate_new_id(&text_ids), 1.0);
    }

    #[test]
    fn delete_removes_in_range_only() {
        assert_eq!(names(&delete_row(&abc(), 1)), ["a", "c"]);
        assert_eq!(names(&delete_row(&abc(), 5)), ["a", "b", "c"]);
    }

    #[test]
    fn paste_keeps_target_id() {
        let rows = vec![
            Record::new().with("id", 1).with("name", "a"),
            Record::new().with("id", 2).with("name", "b"),
        ];
        let copied = copy_row(&rows, 0).unwrap();
        let out = paste_row(&rows, 1, &copied);
        assert_eq!(out[1].value("name").display_text(), "a");
        assert_eq!(out[1].value("id"), CellValue::Number(2.0));
        assert_eq!(rows[1].value("name").display_text(), "b");
    }

    #[test]
    fn paste_without_id_copies_everything() {
        let rows = abc();
        let copied = Record::new().with("name", "z").with("id", 9);
        let out = paste_row(&rows, 0, &copied);
        assert_eq!(out[0], copied);
    }

    #[test]
    fn paste_out_of_range_is_unchanged() {
        let rows = abc();
        let copied = rows[0].clone();
        assert_eq!(paste_row(&rows, 3, &copied), rows);
        assert_eq!(copy_row(&rows, 3), None);
    }

    #[test]
    fn append_assigns_generated_id() {
        let out = add_row_to_bottom(&ids(&[1, 3]), || Record::new().with("id", 0));
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].value("id"), CellValue::Number(4.0));
    }

    #[test]
    fn insert_below_places_row_after_anchor() {
        let out = add_row_below(&abc(), 0, || Record::new().with("name", "new"));
        assert_eq!(names(&out), ["a", "new", "b", "c"]);
        assert_eq!(out[1].id(), None);
        let unchanged = add_row_below(&abc(), 3, || Record::new().with("name", "new"));
        assert_eq!(names(&unchanged), ["a", "b", "c"]);
    }
}
