//! Column descriptors and the processing step that turns them into render-ready columns.

use crate::error::GridError;
use crate::error::Result;
use crate::sort::SortDirection;
use crate::value::GridRow;
use ratatui::text::Line;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

/// Key of the synthetic row number column. Filters on it are ignored.
pub const ROW_NUMBER_COLUMN_KEY: &str = "__row_number__";

const AUTO_WIDTH_SAMPLE: usize = 200;
const AUTO_WIDTH_MAX: u16 = 32;
const DEFAULT_MIN_WIDTH: u16 = 3;

/// What a custom cell renderer gets to see.
pub struct CellProps<'a, R> {
    pub row: &'a R,
    /// Position in the displayed (sorted and filtered) rows.
    pub display_idx: usize,
    pub column_key: &'a str,
    pub is_selected: bool,
}

pub struct HeaderProps<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub sort_direction: Option<SortDirection>,
}

pub type CellRenderer<R> = Arc<dyn Fn(&CellProps<'_, R>) -> Line<'static> + Send + Sync>;
pub type HeaderRenderer = Arc<dyn Fn(&HeaderProps<'_>) -> Line<'static> + Send + Sync>;

/// Inline editor attached to a column.
#[derive(Clone, Debug, PartialEq)]
pub enum CellEditor {
    Text,
    /// Numeric input; an empty field commits `0`.
    Number,
    /// Pick one of the given options.
    Select(Vec<String>),
}

/// A user-supplied column.
pub struct Column<R> {
    pub key: String,
    pub name: String,
    /// Fixed width in cells. `None` sizes the column from its header and values.
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    /// `None` inherits the grid's `resizable` option.
    pub resizable: Option<bool>,
    pub sortable: bool,
    pub editor: Option<CellEditor>,
    pub render_cell: Option<CellRenderer<R>>,
    pub render_header_cell: Option<HeaderRenderer>,
}

impl<R> Column<R> {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            width: None,
            min_width: None,
            resizable: None,
            sortable: false,
            editor: None,
            render_cell: None,
            render_header_cell: None,
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, min_width: u16) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = Some(resizable);
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn editor(mut self, editor: CellEditor) -> Self {
        self.editor = Some(editor);
        self
    }

    pub fn render_cell<F>(mut self, f: F) -> Self
    where
        F: Fn(&CellProps<'_, R>) -> Line<'static> + Send + Sync + 'static,
    {
        self.render_cell = Some(Arc::new(f));
        self
    }

    pub fn render_header_cell<F>(mut self, f: F) -> Self
    where
        F: Fn(&HeaderProps<'_>) -> Line<'static> + Send + Sync + 'static,
    {
        self.render_header_cell = Some(Arc::new(f));
        self
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            name: self.name.clone(),
            width: self.width,
            min_width: self.min_width,
            resizable: self.resizable,
            sortable: self.sortable,
            editor: self.editor.clone(),
            render_cell: self.render_cell.clone(),
            render_header_cell: self.render_header_cell.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("min_width", &self.min_width)
            .field("resizable", &self.resizable)
            .field("sortable", &self.sortable)
            .field("editor", &self.editor)
            .field("render_cell", &self.render_cell.is_some())
            .field("render_header_cell", &self.render_header_cell.is_some())
            .finish()
    }
}

/// Columns with unique keys.
#[derive(Clone, Debug)]
pub struct ColumnSet<R> {
    columns: Vec<Column<R>>,
}

impl<R> Default for ColumnSet<R> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
        }
    }
}

impl<R> ColumnSet<R> {
    pub fn new(columns: Vec<Column<R>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for c in &columns {
            if c.key == ROW_NUMBER_COLUMN_KEY {
                return Err(GridError::ReservedColumnKey(c.key.clone()));
            }
            if !seen.insert(c.key.as_str()) {
                return Err(GridError::DuplicateColumnKey(c.key.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column<R>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// How a processed column produces its cell text.
pub enum CellRendering<R> {
    RowNumber,
    Custom(CellRenderer<R>),
    /// The row's value as text.
    Value,
}

impl<R> Clone for CellRendering<R> {
    fn clone(&self) -> Self {
        match self {
            CellRendering::RowNumber => CellRendering::RowNumber,
            CellRendering::Custom(f) => CellRendering::Custom(f.clone()),
            CellRendering::Value => CellRendering::Value,
        }
    }
}

/// A column ready for display.
pub struct ProcessedColumn<R> {
    pub key: String,
    pub name: String,
    pub width: u16,
    pub resizable: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub editor: Option<CellEditor>,
    pub rendering: CellRendering<R>,
    pub render_header_cell: Option<HeaderRenderer>,
    /// Paint the selected row's cell with the selection style.
    pub highlight_selection: bool,
}

impl<R> Clone for ProcessedColumn<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            name: self.name.clone(),
            width: self.width,
            resizable: self.resizable,
            sortable: self.sortable,
            filterable: self.filterable,
            editor: self.editor.clone(),
            rendering: self.rendering.clone(),
            render_header_cell: self.render_header_cell.clone(),
            highlight_selection: self.highlight_selection,
        }
    }
}

impl<R: GridRow> ProcessedColumn<R> {
    pub fn is_row_number(&self) -> bool {
        matches!(self.rendering, CellRendering::RowNumber)
    }

    pub fn header_line(&self, sort_direction: Option<SortDirection>) -> Line<'static> {
        if let Some(render) = &self.render_header_cell {
            return render(&HeaderProps {
                key: &self.key,
                name: &self.name,
                sort_direction,
            });
        }
        match sort_direction {
            Some(dir) => Line::raw(format!("{} {}", self.name, dir.arrow())),
            None => Line::raw(self.name.clone()),
        }
    }

    pub fn cell_line(&self, props: &CellProps<'_, R>) -> Line<'static> {
        match &self.rendering {
            CellRendering::RowNumber => Line::raw((props.display_idx + 1).to_string()),
            CellRendering::Custom(render) => render(props),
            CellRendering::Value => Line::raw(props.row.value(&self.key).display_text()),
        }
    }
}

/// Grid-level inputs to [`process_columns`].
#[derive(Clone, Copy, Debug)]
pub struct ColumnContext<'a> {
    pub resizable: bool,
    pub row_selectable: bool,
    pub show_row_number: bool,
    /// Number of displayed rows, used to size the row number column.
    pub row_count: usize,
    /// Widths set interactively, by column key.
    pub width_overrides: &'a HashMap<String, u16>,
}

/// Builds the displayed columns: optional row number column first, resolved widths and
/// resizability, and selection highlighting for columns without a custom renderer.
///
/// `sample` feeds auto-sizing of columns without a fixed width; only its first rows are read.
pub fn process_columns<R: GridRow>(
    columns: &ColumnSet<R>,
    sample: &[R],
    ctx: &ColumnContext<'_>,
) -> Vec<ProcessedColumn<R>> {
    let mut out = Vec::with_capacity(columns.len() + 1);
    if ctx.show_row_number {
        out.push(row_number_column(ctx));
    }
    out.extend(columns.iter().map(|c| {
        let min = c.min_width.unwrap_or(DEFAULT_MIN_WIDTH).max(1);
        let width = ctx
            .width_overrides
            .get(&c.key)
            .copied()
            .or(c.width)
            .unwrap_or_else(|| auto_width(c, sample))
            .max(min);
        let custom = c.render_cell.clone();
        ProcessedColumn {
            key: c.key.clone(),
            name: c.name.clone(),
            width,
            resizable: c.resizable.unwrap_or(ctx.resizable),
            sortable: c.sortable,
            filterable: true,
            editor: c.editor.clone(),
            highlight_selection: ctx.row_selectable && custom.is_none(),
            rendering: custom.map_or(CellRendering::Value, CellRendering::Custom),
            render_header_cell: c.render_header_cell.clone(),
        }
    }));
    out
}

fn row_number_column<R>(ctx: &ColumnContext<'_>) -> ProcessedColumn<R> {
    let digits = ctx.row_count.max(1).to_string().len() as u16;
    ProcessedColumn {
        key: ROW_NUMBER_COLUMN_KEY.to_string(),
        name: String::new(),
        width: (digits + 1).max(DEFAULT_MIN_WIDTH),
        resizable: false,
        sortable: false,
        filterable: false,
        editor: None,
        rendering: CellRendering::RowNumber,
        render_header_cell: None,
        highlight_selection: ctx.row_selectable,
    }
}

fn auto_width<R: GridRow>(column: &Column<R>, sample: &[R]) -> u16 {
    // Room for " ▲" next to the name.
    let header = column.name.width() + 2;
    let values = sample
        .iter()
        .take(AUTO_WIDTH_SAMPLE)
        .map(|r| r.value(&column.key).display_text().width())
        .max()
        .unwrap_or(0);
    header.max(values).min(AUTO_WIDTH_MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    fn ctx(overrides: &HashMap<String, u16>) -> ColumnContext<'_> {
        ColumnContext {
            resizable: true,
            row_selectable: true,
            show_row_number: false,
            row_count: 3,
            width_overrides: overrides,
        }
    }

    #[test]
    fn duplicate_and_reserved_keys_are_rejected() {
        let dup = ColumnSet::<Record>::new(vec![Column::new("a", "A"), Column::new("a", "A2")]);
        assert_eq!(dup.err(), Some(GridError::DuplicateColumnKey("a".into())));
        let reserved = ColumnSet::<Record>::new(vec![Column::new(ROW_NUMBER_COLUMN_KEY, "#")]);
        assert_eq!(
            reserved.err(),
            Some(GridError::ReservedColumnKey(ROW_NUMBER_COLUMN_KEY.into()))
        );
    }

    #[test]
    fn row_number_column_comes_first() {
        let cols = ColumnSet::<Record>::new(vec![Column::new("name", "Name")]).unwrap();
        let overrides = HashMap::new();
        let mut c = ctx(&overrides);
        c.show_row_number = true;
        let processed = process_columns(&cols, &[], &c);
        assert_eq!(processed.len(), 2);
        assert!(processed[0].is_row_number());
        assert_eq!(processed[0].key, ROW_NUMBER_COLUMN_KEY);
        assert!(!processed[0].sortable && !processed[0].resizable && !processed[0].filterable);
        let row = Record::new();
        let line = processed[0].cell_line(&CellProps {
            row: &row,
            display_idx: 4,
            column_key: ROW_NUMBER_COLUMN_KEY,
            is_selected: false,
        });
        assert_eq!(line.to_string(), "5");
    }

    #[test]
    fn huge_values_cap_auto_width() {
        let cols = ColumnSet::<Record>::new(vec![Column::new("name", "Name")]).unwrap();
        let rows = vec![Record::new().with("name", "x".repeat(65_540))];
        let overrides = HashMap::new();
        let processed = process_columns(&cols, &rows, &ctx(&overrides));
        assert_eq!(processed[0].width, AUTO_WIDTH_MAX);
    }

    #[test]
    fn widths_resolve_override_then_fixed_then_auto() {
        let cols = ColumnSet::<Record>::new(vec![
            Column::new("a", "A").width(10),
            Column::new("b", "B").width(10),
            Column::new("name", "Name"),
            Column::new("tiny", "T").width(1).min_width(4),
        ])
        .unwrap();
        let rows = vec![Record::new().with("name", "A rather long product name")];
        let mut overrides = HashMap::new();
        overrides.insert("b".to_string(), 6);
        let processed = process_columns(&cols, &rows, &ctx(&overrides));
        let widths: Vec<u16> = processed.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![10, 6, 26, 4]);
    }

    #[test]
    fn custom_renderer_opts_out_of_selection_highlight() {
        let cols = ColumnSet::<Record>::new(vec![
            Column::new("a", "A"),
            Column::<Record>::new("b", "B")
                .resizable(false)
                .render_cell(|p| Line::raw(format!("<{}>", p.row.value("b")))),
        ])
        .unwrap();
        let overrides = HashMap::new();
        let processed = process_columns(&cols, &[], &ctx(&overrides));
        assert!(processed[0].highlight_selection);
        assert!(processed[0].resizable);
        assert!(!processed[1].highlight_selection);
        assert!(!processed[1].resizable);
        let row = Record::new().with("b", "x");
        let line = processed[1].cell_line(&CellProps {
            row: &row,
            display_idx: 0,
            column_key: "b",
            is_selected: false,
        });
        assert_eq!(line.to_string(), "<x>");
    }

    #[test]
    fn header_shows_sort_arrow() {
        let cols = ColumnSet::<Record>::new(vec![Column::new("price", "Price").sortable(true)])
            .unwrap();
        let overrides = HashMap::new();
        let processed = process_columns(&cols, &[], &ctx(&overrides));
        assert_eq!(processed[0].header_line(None).to_string(), "Price");
        assert_eq!(
            processed[0]
                .header_line(Some(SortDirection::Desc))
                .to_string(),
            "Price ▼"
        );
    }
}
