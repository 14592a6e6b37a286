//! The row grid widget: engine state behind a virtualized terminal view.
//!
//! `RowGrid` owns no event loop. Feed it [`InputEvent`]s through [`RowGrid::handle_event`] and
//! apply the [`GridAction`]s it returns. Row edits and sort changes are requests: the grid
//! hands back new values and the caller decides whether to apply them with
//! [`RowGrid::set_rows`] and [`RowGrid::set_sort_columns`].

use crate::column::CellEditor;
use crate::column::CellProps;
use crate::column::Column;
use crate::column::ColumnContext;
use crate::column::ColumnSet;
use crate::column::ProcessedColumn;
use crate::column::process_columns;
use crate::context_menu::ContextMenu;
use crate::context_menu::ContextMenuOptions;
use crate::context_menu::MenuEntry;
use crate::context_menu::MenuItem;
use crate::context_menu::menu_rect;
use crate::error::Result;
use crate::filter::FilterState;
use crate::filter::filter_rows;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap::GridBindings;
use crate::line_input::LineInput;
use crate::line_input::LineInputAction;
use crate::render;
use crate::rows::add_row_below;
use crate::rows::add_row_to_bottom;
use crate::rows::copy_row;
use crate::rows::delete_row;
use crate::rows::paste_row;
use crate::selection::RowKeyGetter;
use crate::selection::RowSelection;
use crate::sort::SortSpec;
use crate::sort::cycle_sort;
use crate::sort::sort_rows;
use crate::theme::Theme;
use crate::value::CellValue;
use crate::value::GridRow;
use crate::value::RowKey;
use crate::view::Cell;
use crate::view::GridStyles;
use crate::view::GridView;
use crate::view::GridViewOptions;
use crate::view::HitTarget;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

const WHEEL_STEP: i32 = 3;

/// Builds the empty row used by the insert menu items.
pub type RowFactory<R> = Arc<dyn Fn() -> R + Send + Sync>;

/// Something the caller should act on.
#[derive(Clone, Debug, PartialEq)]
pub enum GridAction<R> {
    Redraw,
    /// A row edit produced a new row list. Apply it with [`RowGrid::set_rows`].
    RowsChanged(Vec<R>),
    /// The user asked for a new sort. Apply it with [`RowGrid::set_sort_columns`].
    SortColumnsChanged(Vec<SortSpec>),
    RowSelected(Option<R>),
    /// Move the column `source` to where `target` is.
    ColumnsReordered { source: String, target: String },
    ColumnResized { key: String, width: u16 },
    RowClicked(R),
}

#[derive(Clone, Debug)]
pub struct RowGridOptions {
    /// Sort rows inside the grid. When off, the sort state only drives the header arrows and
    /// the caller is expected to pass rows already in order.
    pub use_internal_sort: bool,
    pub filterable: bool,
    pub show_row_number: bool,
    pub row_selectable: bool,
    pub clear_selection_on_sort: bool,
    /// Default for columns that don't set `resizable` themselves.
    pub resizable: bool,
    pub initial_filters_visible: bool,
    /// Allow row edits (context menu and cell editors). Without it the grid never emits
    /// [`GridAction::RowsChanged`].
    pub editable_rows: bool,
    pub context_menu: ContextMenuOptions,
}

impl Default for RowGridOptions {
    fn default() -> Self {
        Self {
            use_internal_sort: false,
            filterable: true,
            show_row_number: false,
            row_selectable: false,
            clear_selection_on_sort: true,
            resizable: true,
            initial_filters_visible: false,
            editable_rows: false,
            context_menu: ContextMenuOptions::default(),
        }
    }
}

/// A row paired with its position in the caller's list, so the displayed order can be mapped
/// back to source rows.
struct Indexed<'a, R> {
    idx: usize,
    row: &'a R,
}

impl<R> Clone for Indexed<'_, R> {
    fn clone(&self) -> Self {
        Self {
            idx: self.idx,
            row: self.row,
        }
    }
}

impl<R: GridRow> GridRow for Indexed<'_, R> {
    fn value(&self, key: &str) -> CellValue {
        self.row.value(key)
    }

    fn id(&self) -> Option<CellValue> {
        self.row.id()
    }
}

enum CellEditKind {
    Text(LineInput),
    Number(LineInput),
    Select { options: Vec<String>, choice: usize },
}

struct CellEdit {
    source_idx: usize,
    display_row: usize,
    column_key: String,
    kind: CellEditKind,
}

impl CellEdit {
    fn line(&self, cursor: Style) -> Line<'static> {
        match &self.kind {
            CellEditKind::Text(input) | CellEditKind::Number(input) => input_line(input, cursor),
            CellEditKind::Select { options, choice } => {
                let current = options.get(*choice).map(String::as_str).unwrap_or("");
                Line::raw(format!("◂ {current} ▸"))
            }
        }
    }
}

enum EditState {
    Idle,
    Cell(CellEdit),
    Filter {
        column_key: String,
        input: LineInput,
        previous: String,
    },
}

enum EditOutcome {
    Keep,
    Commit,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Select,
    Activate,
    CycleSort,
    ToggleFilters,
    EditFilter,
    OpenMenu,
    Resize(i32),
    MoveColumn(i32),
}

enum MenuHit {
    Outside,
    Frame,
    Entry(MenuEntry),
}

pub struct RowGrid<R> {
    rows: Vec<R>,
    columns: ColumnSet<R>,
    sort_columns: Vec<SortSpec>,
    key_of: RowKeyGetter<R>,
    row_factory: Option<RowFactory<R>>,
    options: RowGridOptions,
    bindings: GridBindings,
    filter: FilterState,
    selection: RowSelection<R>,
    menu: ContextMenu<R>,
    /// Source indices of the displayed rows, in display order.
    display: Vec<usize>,
    processed: Vec<ProcessedColumn<R>>,
    width_overrides: HashMap<String, u16>,
    view: GridView,
    edit: EditState,
    pending: Vec<GridAction<R>>,
    area: Rect,
}

impl<R: GridRow> RowGrid<R> {
    /// Creates an empty grid. `key_of` gives each row its stable selection key.
    pub fn new<F>(key_of: F) -> Self
    where
        F: Fn(&R) -> RowKey + Send + Sync + 'static,
    {
        let options = RowGridOptions::default();
        let mut grid = Self {
            rows: Vec::new(),
            columns: ColumnSet::default(),
            sort_columns: Vec::new(),
            key_of: Arc::new(key_of),
            row_factory: None,
            filter: FilterState::new(options.initial_filters_visible),
            options,
            bindings: GridBindings::default(),
            selection: RowSelection::new(),
            menu: ContextMenu::new(),
            display: Vec::new(),
            processed: Vec::new(),
            width_overrides: HashMap::new(),
            view: GridView::new(),
            edit: EditState::Idle,
            pending: Vec::new(),
            area: Rect::default(),
        };
        grid.refresh();
        grid
    }

    /// Sets the options and shows the filter inputs if `initial_filters_visible` asks for it.
    pub fn with_options(mut self, options: RowGridOptions) -> Self {
        self.filter.show_filters = options.initial_filters_visible;
        self.set_options(options);
        self
    }

    pub fn with_view_options(mut self, options: GridViewOptions) -> Self {
        self.view.set_options(options);
        self
    }

    pub fn with_bindings(mut self, bindings: GridBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Seeds the selection without emitting [`GridAction::RowSelected`].
    pub fn with_initial_selected_row(mut self, row: Option<R>) -> Self {
        self.selection = RowSelection::with_initial(row, &*self.key_of);
        self
    }

    pub fn options(&self) -> &RowGridOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RowGridOptions) {
        self.options = options;
        if !self.menu_enabled() {
            self.menu.close();
        }
        self.refresh();
    }

    pub fn set_view_options(&mut self, options: GridViewOptions) {
        self.view.set_options(options);
    }

    pub fn bindings(&self) -> &GridBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: GridBindings) {
        self.bindings = bindings;
    }

    /// Replaces the rows. Closes the context menu, drops an open cell editor and resets the
    /// selection if its row is gone.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.menu.close();
        if matches!(self.edit, EditState::Cell(_)) {
            self.edit = EditState::Idle;
        }
        if self.selection.retain_present(&self.rows, &*self.key_of) {
            self.emit(GridAction::RowSelected(None));
        }
        self.refresh();
    }

    pub fn set_columns(&mut self, columns: Vec<Column<R>>) -> Result<()> {
        self.columns = ColumnSet::new(columns)?;
        self.menu.close();
        if matches!(self.edit, EditState::Cell(_)) {
            self.edit = EditState::Idle;
        }
        self.refresh();
        Ok(())
    }

    /// Stores the sort list. Only the first entry is used.
    pub fn set_sort_columns(&mut self, sort_columns: Vec<SortSpec>) {
        if sort_columns.len() > 1 {
            log::debug!(
                "{} sort columns given, only `{}` is applied",
                sort_columns.len(),
                sort_columns[0].column_key
            );
        }
        self.sort_columns = sort_columns;
        self.refresh();
    }

    pub fn set_row_factory<F>(&mut self, factory: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.row_factory = Some(Arc::new(factory));
    }

    pub fn clear_row_factory(&mut self) {
        self.row_factory = None;
    }

    pub fn set_filter(&mut self, column_key: impl Into<String>, value: impl Into<String>) {
        self.filter.set_filter(column_key, value);
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.filter.clear();
        self.refresh();
    }

    /// Shows or hides the filter inputs. Hidden filters still apply.
    pub fn toggle_filters(&mut self) {
        if !self.options.filterable {
            log::debug!("filter toggle ignored: grid is not filterable");
            return;
        }
        self.filter.toggle_visibility();
        if !self.filter.show_filters && matches!(self.edit, EditState::Filter { .. }) {
            self.edit = EditState::Idle;
        }
        self.view.set_header_height(self.header_height());
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn sort_columns(&self) -> &[SortSpec] {
        &self.sort_columns
    }

    /// Rows as displayed: sorted, then filtered.
    pub fn display_rows(&self) -> impl Iterator<Item = &R> + '_ {
        self.display.iter().filter_map(|idx| self.rows.get(*idx))
    }

    pub fn display_len(&self) -> usize {
        self.display.len()
    }

    pub fn display_row(&self, display_idx: usize) -> Option<&R> {
        self.source_index(display_idx)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Position in [`rows`](Self::rows) of the row shown at `display_idx`.
    pub fn source_index(&self, display_idx: usize) -> Option<usize> {
        self.display.get(display_idx).copied()
    }

    pub fn processed_columns(&self) -> &[ProcessedColumn<R>] {
        &self.processed
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.selection.selected_row()
    }

    pub fn selection(&self) -> &RowSelection<R> {
        &self.selection
    }

    pub fn context_menu(&self) -> &ContextMenu<R> {
        &self.menu
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn cursor(&self) -> Option<Cell> {
        self.view.cursor()
    }

    pub fn set_cursor(&mut self, cursor: Option<Cell>) {
        self.view.set_cursor(cursor);
    }

    pub fn is_editing(&self) -> bool {
        !matches!(self.edit, EditState::Idle)
    }

    /// Actions queued outside of [`handle_event`](Self::handle_event), such as a selection reset
    /// caused by [`set_rows`](Self::set_rows).
    pub fn take_actions(&mut self) -> Vec<GridAction<R>> {
        std::mem::take(&mut self.pending)
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Vec<GridAction<R>> {
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => {
                if self.is_editing() {
                    self.handle_edit_event(InputEvent::Paste(text));
                }
            }
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
        }
        self.take_actions()
    }

    /// Runs a context menu item against the open menu's row, then closes the menu.
    ///
    /// Without an open menu, or when the item can't apply (editing disabled, empty clipboard,
    /// no row factory, stale row), this only closes the menu.
    pub fn invoke_menu_item(&mut self, item: MenuItem) {
        let Some(state) = self.menu.state() else {
            log::debug!("{} ignored: no context menu open", item.label());
            return;
        };
        self.menu.close();
        self.emit(GridAction::Redraw);
        if !self.options.editable_rows {
            log::debug!("{} ignored: row edits are disabled", item.label());
            return;
        }

        if item == MenuItem::AddRowToBottom {
            let Some(factory) = self.row_factory.clone() else {
                log::debug!("add row ignored: no row factory");
                return;
            };
            let rows = add_row_to_bottom(&self.rows, || factory());
            self.emit(GridAction::RowsChanged(rows));
            return;
        }

        let Some(idx) = self.source_index(state.row_idx) else {
            log::debug!(
                "{} ignored: display row {} no longer exists",
                item.label(),
                state.row_idx
            );
            return;
        };
        let rows = match item {
            MenuItem::CopyRow => {
                log::debug!("row {idx} copied");
                self.menu.set_clipboard(copy_row(&self.rows, idx));
                return;
            }
            MenuItem::PasteRow => {
                let Some(copied) = self.menu.clipboard().cloned() else {
                    log::debug!("paste ignored: clipboard is empty");
                    return;
                };
                paste_row(&self.rows, idx, &copied)
            }
            MenuItem::DeleteRow => delete_row(&self.rows, idx),
            MenuItem::AddRowBelow | MenuItem::AddRowToBottom => {
                let Some(factory) = self.row_factory.clone() else {
                    log::debug!("insert ignored: no row factory");
                    return;
                };
                add_row_below(&self.rows, idx, || factory())
            }
        };
        self.emit(GridAction::RowsChanged(rows));
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.area = area;

        let view_options = self.view.options();
        let styles = GridStyles {
            base: if view_options.style == Style::default() {
                theme.text_primary
            } else {
                view_options.style
            },
            grid_line: if view_options.grid_line_style == Style::default() {
                theme.text_muted
            } else {
                view_options.grid_line_style
            },
            scrollbar: view_options.scrollbar_style,
        };

        let sort = self.sort_columns.first();
        let show_filter_line = self.filter_line_visible();
        let processed = &self.processed;
        let display = &self.display;
        let rows = &self.rows;
        let filter = &self.filter;
        let edit = &self.edit;
        let selection = &self.selection;
        let key_of = &self.key_of;

        self.view.render(
            area,
            buf,
            styles,
            |col, rect, clip_left, buf| {
                let Some(pc) = processed.get(col) else {
                    return;
                };
                buf.set_style(rect, theme.header);
                let direction = sort
                    .filter(|s| s.column_key == pc.key)
                    .map(|s| s.direction);
                render::render_line_clipped(
                    rect.x,
                    rect.y,
                    clip_left,
                    rect.width,
                    buf,
                    &pc.header_line(direction),
                    theme.header,
                );

                if !show_filter_line || rect.height < 2 || !pc.filterable {
                    return;
                }
                let line_rect = Rect::new(rect.x, rect.y + 1, rect.width, 1);
                let line = match edit {
                    EditState::Filter {
                        column_key, input, ..
                    } if *column_key == pc.key => input_line(input, theme.cursor),
                    _ => Line::raw(filter.filter(&pc.key).to_string()),
                };
                buf.set_style(line_rect, theme.filter_input);
                render::render_line_clipped(
                    line_rect.x,
                    line_rect.y,
                    clip_left,
                    line_rect.width,
                    buf,
                    &line,
                    theme.filter_input,
                );
            },
            |rect, ctx, buf| {
                let Some(pc) = processed.get(ctx.cell.col) else {
                    return;
                };
                let Some(row) = display.get(ctx.cell.row).and_then(|idx| rows.get(*idx)) else {
                    return;
                };
                let is_selected = selection.is_selected(&key_of(row));

                let mut style = styles.base;
                if is_selected && pc.highlight_selection {
                    style = style.patch(theme.selected_row);
                }
                if ctx.is_cursor {
                    style = style.patch(theme.cursor);
                }
                let line = match edit {
                    EditState::Cell(e)
                        if e.display_row == ctx.cell.row && e.column_key == pc.key =>
                    {
                        style = theme.editor;
                        e.line(theme.cursor)
                    }
                    _ => pc.cell_line(&CellProps {
                        row,
                        display_idx: ctx.cell.row,
                        column_key: &pc.key,
                        is_selected,
                    }),
                };
                buf.set_style(rect, style);
                render::render_line_clipped(
                    rect.x,
                    rect.y,
                    ctx.clip_left,
                    rect.width,
                    buf,
                    &line,
                    style,
                );
            },
        );

        self.render_menu(area, buf, theme);
    }

    fn render_menu(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let Some(state) = self.menu.state() else {
            return;
        };
        let entries = self.menu_entries();
        if entries.is_empty() {
            return;
        }
        let rect = menu_rect(state, &entries, area);
        Clear.render(rect, buf);
        let block = Block::bordered().style(theme.menu);
        let inner = block.inner(rect);
        block.render(rect, buf);

        for (i, entry) in entries.iter().enumerate().take(inner.height as usize) {
            let style = if !entry.enabled {
                theme.menu_disabled
            } else if i == self.menu.highlighted() {
                theme.menu_highlight
            } else {
                theme.menu
            };
            let line_rect = Rect::new(inner.x, inner.y + i as u16, inner.width, 1);
            buf.set_style(line_rect, style);
            buf.set_stringn(
                inner.x + 1,
                line_rect.y,
                entry.item.label(),
                inner.width.saturating_sub(1) as usize,
                style,
            );
        }
    }

    fn emit(&mut self, action: GridAction<R>) {
        if matches!(action, GridAction::Redraw)
            && self
                .pending
                .iter()
                .any(|a| matches!(a, GridAction::Redraw))
        {
            return;
        }
        self.pending.push(action);
    }

    fn refresh(&mut self) {
        let display: Vec<usize> = {
            let indexed: Vec<Indexed<'_, R>> = self
                .rows
                .iter()
                .enumerate()
                .map(|(idx, row)| Indexed { idx, row })
                .collect();
            let spec = if self.options.use_internal_sort {
                self.sort_columns.first()
            } else {
                None
            };
            let sorted = sort_rows(&indexed, spec);
            let filtered = if self.options.filterable {
                filter_rows(&sorted, &self.filter.filters)
            } else {
                Cow::Borrowed(&*sorted)
            };
            filtered.iter().map(|r| r.idx).collect()
        };
        // The menu points at a display index, which a new display order invalidates.
        if self.menu.is_open() && display != self.display {
            log::debug!("displayed rows changed: closing context menu");
            self.menu.close();
            self.emit(GridAction::Redraw);
        }
        self.display = display;

        let ctx = ColumnContext {
            resizable: self.options.resizable,
            row_selectable: self.options.row_selectable,
            show_row_number: self.options.show_row_number,
            row_count: self.display.len(),
            width_overrides: &self.width_overrides,
        };
        self.processed = process_columns(&self.columns, &self.rows, &ctx);

        self.view.set_header_height(self.header_height());
        self.view
            .set_column_widths(self.processed.iter().map(|c| c.width).collect());
        self.view.set_row_count(self.display.len());
        if self.view.cursor().is_none() && !self.display.is_empty() && !self.processed.is_empty()
        {
            self.view.set_cursor(Some(Cell { row: 0, col: 0 }));
        }
    }

    fn header_height(&self) -> u16 {
        if self.filter_line_visible() { 2 } else { 1 }
    }

    fn filter_line_visible(&self) -> bool {
        self.options.filterable && self.filter.show_filters
    }

    fn menu_enabled(&self) -> bool {
        self.options.editable_rows
            && self
                .options
                .context_menu
                .any_available(self.row_factory.is_some())
    }

    fn menu_entries(&self) -> Vec<MenuEntry> {
        self.menu
            .entries(&self.options.context_menu, self.row_factory.is_some())
    }

    fn command_for(&self, key: &KeyEvent) -> Option<Command> {
        let b = &self.bindings;
        let command = if b.select.matches(key) {
            Command::Select
        } else if b.activate.matches(key) {
            Command::Activate
        } else if b.cycle_sort.matches(key) {
            Command::CycleSort
        } else if b.toggle_filters.matches(key) {
            Command::ToggleFilters
        } else if b.edit_filter.matches(key) {
            Command::EditFilter
        } else if b.open_menu.matches(key) {
            Command::OpenMenu
        } else if b.shrink_column.matches(key) {
            Command::Resize(-1)
        } else if b.grow_column.matches(key) {
            Command::Resize(1)
        } else if b.move_column_left.matches(key) {
            Command::MoveColumn(-1)
        } else if b.move_column_right.matches(key) {
            Command::MoveColumn(1)
        } else {
            return None;
        };
        Some(command)
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.is_editing() {
            self.handle_edit_event(InputEvent::Key(key));
            return;
        }
        if self.menu.is_open() {
            self.handle_menu_key(key);
            return;
        }

        if let Some(command) = self.command_for(&key) {
            self.run_command(command);
            return;
        }
        if self.view.handle_nav_key(&key) {
            self.emit(GridAction::Redraw);
        }
    }

    fn run_command(&mut self, command: Command) {
        let cursor = self.view.cursor();
        match command {
            Command::Select => match cursor {
                Some(c) => self.toggle_selection(c.row),
                None => log::debug!("select ignored: no cursor"),
            },
            Command::Activate => {
                let Some(c) = cursor else {
                    return;
                };
                if self.open_cell_editor(c) {
                    self.emit(GridAction::Redraw);
                } else {
                    self.click_row(c.row);
                }
            }
            Command::CycleSort => {
                if let Some(c) = cursor {
                    self.cycle_sort_at(c.col);
                }
            }
            Command::ToggleFilters => {
                self.toggle_filters();
                self.emit(GridAction::Redraw);
            }
            Command::EditFilter => {
                if let Some(c) = cursor {
                    self.begin_filter_edit(c.col);
                }
            }
            Command::OpenMenu => {
                let Some(c) = cursor else {
                    log::debug!("context menu ignored: no cursor");
                    return;
                };
                let (x, y) = self
                    .view
                    .cell_rect(c)
                    .map(|r| (r.x, r.y))
                    .unwrap_or((self.area.x, self.area.y));
                self.open_menu_at(c.row, x, y);
            }
            Command::Resize(delta) => {
                if let Some(c) = cursor {
                    self.resize_column(c.col, delta);
                }
            }
            Command::MoveColumn(delta) => {
                if let Some(c) = cursor {
                    self.move_column(c.col, delta);
                }
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let entries = self.menu_entries();
        if self.bindings.cancel.matches(&key) || self.bindings.open_menu.matches(&key) {
            self.menu.close();
            self.emit(GridAction::Redraw);
            return;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu.move_highlight(-1, &entries);
                self.emit(GridAction::Redraw);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.menu.move_highlight(1, &entries);
                self.emit(GridAction::Redraw);
            }
            KeyCode::Enter => match self.menu.highlighted_entry(&entries) {
                Some(entry) => self.invoke_menu_item(entry.item),
                None => {
                    self.menu.close();
                    self.emit(GridAction::Redraw);
                }
            },
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.view.scroll_y_by(WHEEL_STEP);
                self.emit(GridAction::Redraw);
            }
            MouseEventKind::ScrollUp => {
                self.view.scroll_y_by(-WHEEL_STEP);
                self.emit(GridAction::Redraw);
            }
            MouseEventKind::Down(MouseButton::Left) => self.left_click(mouse.x, mouse.y),
            MouseEventKind::Down(MouseButton::Right) => self.right_click(mouse.x, mouse.y),
            _ => {}
        }
    }

    fn left_click(&mut self, x: u16, y: u16) {
        if self.menu.is_open() {
            match self.menu_hit(x, y) {
                MenuHit::Entry(entry) => {
                    self.invoke_menu_item(entry.item);
                    return;
                }
                MenuHit::Frame => return,
                MenuHit::Outside => {
                    self.menu.close();
                    self.emit(GridAction::Redraw);
                }
            }
        }
        if self.is_editing() {
            self.edit = EditState::Idle;
            self.emit(GridAction::Redraw);
        }

        match self.view.hit_test(x, y) {
            HitTarget::Header { col } => self.cycle_sort_at(col),
            HitTarget::Filter { col } => self.begin_filter_edit(col),
            HitTarget::Body(cell) => {
                self.view.set_cursor(Some(cell));
                self.click_row(cell.row);
            }
            HitTarget::Empty | HitTarget::Outside => {}
        }
    }

    fn right_click(&mut self, x: u16, y: u16) {
        if self.menu.is_open() {
            if !matches!(self.menu_hit(x, y), MenuHit::Outside) {
                return;
            }
            self.menu.close();
            self.emit(GridAction::Redraw);
        }
        if self.is_editing() {
            self.edit = EditState::Idle;
            self.emit(GridAction::Redraw);
        }
        if let HitTarget::Body(cell) = self.view.hit_test(x, y) {
            self.view.set_cursor(Some(cell));
            self.open_menu_at(cell.row, x, y);
        }
    }

    fn menu_hit(&self, x: u16, y: u16) -> MenuHit {
        let Some(state) = self.menu.state() else {
            return MenuHit::Outside;
        };
        let entries = self.menu_entries();
        let rect = menu_rect(state, &entries, self.area);
        let inside = x >= rect.x
            && y >= rect.y
            && x < rect.x.saturating_add(rect.width)
            && y < rect.y.saturating_add(rect.height);
        if !inside {
            return MenuHit::Outside;
        }
        let Some(line) = y.checked_sub(rect.y + 1) else {
            return MenuHit::Frame;
        };
        let on_border = x == rect.x || x + 1 == rect.x.saturating_add(rect.width);
        match entries.get(line as usize) {
            Some(entry) if !on_border => MenuHit::Entry(*entry),
            _ => MenuHit::Frame,
        }
    }

    fn open_menu_at(&mut self, display_row: usize, x: u16, y: u16) {
        if !self.menu_enabled() {
            log::debug!("context menu ignored: no row edits or no items available");
            return;
        }
        if display_row >= self.display.len() {
            return;
        }
        self.menu.open(display_row, x, y);
        let entries = self.menu_entries();
        self.menu.reset_highlight(&entries);
        self.emit(GridAction::Redraw);
    }

    fn toggle_selection(&mut self, display_row: usize) {
        if !self.options.row_selectable {
            log::debug!("select ignored: rows are not selectable");
            return;
        }
        let Some(row) = self.display_row(display_row).cloned() else {
            return;
        };
        let key = (self.key_of)(&row);
        let selected = self.selection.toggle(&row, key);
        self.emit(GridAction::RowSelected(selected));
        self.emit(GridAction::Redraw);
    }

    fn click_row(&mut self, display_row: usize) {
        let Some(row) = self.display_row(display_row).cloned() else {
            return;
        };
        if self.options.row_selectable {
            self.toggle_selection(display_row);
        }
        self.emit(GridAction::RowClicked(row));
        self.emit(GridAction::Redraw);
    }

    fn cycle_sort_at(&mut self, col: usize) {
        let Some(pc) = self.processed.get(col) else {
            return;
        };
        if !pc.sortable {
            log::debug!("sort ignored: column `{}` is not sortable", pc.key);
            return;
        }
        let next: Vec<SortSpec> = cycle_sort(self.sort_columns.first(), &pc.key)
            .into_iter()
            .collect();
        log::debug!("sort requested: {next:?}");
        self.emit(GridAction::SortColumnsChanged(next));
        if self.options.clear_selection_on_sort
            && self.options.row_selectable
            && self.selection.clear()
        {
            log::debug!("selection cleared by sort change");
            self.emit(GridAction::RowSelected(None));
        }
        self.emit(GridAction::Redraw);
    }

    fn begin_filter_edit(&mut self, col: usize) {
        if !self.options.filterable {
            log::debug!("filter edit ignored: grid is not filterable");
            return;
        }
        let Some(column_key) = self
            .processed
            .get(col)
            .filter(|pc| pc.filterable)
            .map(|pc| pc.key.clone())
        else {
            return;
        };
        if !self.filter.show_filters {
            self.toggle_filters();
        }
        let previous = self.filter.filter(&column_key).to_string();
        self.edit = EditState::Filter {
            column_key,
            input: LineInput::new(previous.clone()),
            previous,
        };
        self.emit(GridAction::Redraw);
    }

    fn open_cell_editor(&mut self, cell: Cell) -> bool {
        if !self.options.editable_rows {
            return false;
        }
        let Some(pc) = self.processed.get(cell.col) else {
            return false;
        };
        let Some(editor) = pc.editor.clone() else {
            return false;
        };
        let Some(source_idx) = self.source_index(cell.row) else {
            return false;
        };
        let Some(row) = self.rows.get(source_idx) else {
            return false;
        };
        let current = row.value(&pc.key).display_text();
        let kind = match editor {
            CellEditor::Text => CellEditKind::Text(LineInput::new(current)),
            CellEditor::Number => CellEditKind::Number(LineInput::new(current)),
            CellEditor::Select(options) => {
                if options.is_empty() {
                    log::debug!("select editor on `{}` has no options", pc.key);
                    return false;
                }
                let choice = options.iter().position(|o| *o == current).unwrap_or(0);
                CellEditKind::Select { options, choice }
            }
        };
        log::trace!("editing `{}` of row {source_idx}", pc.key);
        self.edit = EditState::Cell(CellEdit {
            source_idx,
            display_row: cell.row,
            column_key: pc.key.clone(),
            kind,
        });
        true
    }

    fn handle_edit_event(&mut self, event: InputEvent) {
        match std::mem::replace(&mut self.edit, EditState::Idle) {
            EditState::Idle => {}
            EditState::Filter {
                column_key,
                mut input,
                previous,
            } => match input.input(event) {
                LineInputAction::Changed => {
                    self.filter.set_filter(column_key.clone(), input.text());
                    self.edit = EditState::Filter {
                        column_key,
                        input,
                        previous,
                    };
                    self.refresh();
                    self.emit(GridAction::Redraw);
                }
                LineInputAction::None => {
                    self.edit = EditState::Filter {
                        column_key,
                        input,
                        previous,
                    };
                    self.emit(GridAction::Redraw);
                }
                LineInputAction::Submitted(_) => self.emit(GridAction::Redraw),
                LineInputAction::Cancelled => {
                    self.filter.set_filter(column_key, previous);
                    self.refresh();
                    self.emit(GridAction::Redraw);
                }
            },
            EditState::Cell(mut edit) => {
                let outcome = match &mut edit.kind {
                    CellEditKind::Select { options, choice } => match event {
                        InputEvent::Key(k) => match k.code {
                            KeyCode::Up => {
                                *choice = (*choice + options.len() - 1) % options.len();
                                EditOutcome::Keep
                            }
                            KeyCode::Down => {
                                *choice = (*choice + 1) % options.len();
                                EditOutcome::Keep
                            }
                            KeyCode::Enter => EditOutcome::Commit,
                            KeyCode::Esc => EditOutcome::Cancel,
                            _ => EditOutcome::Keep,
                        },
                        _ => EditOutcome::Keep,
                    },
                    CellEditKind::Text(input) | CellEditKind::Number(input) => {
                        match input.input(event) {
                            LineInputAction::Submitted(_) => EditOutcome::Commit,
                            LineInputAction::Cancelled => EditOutcome::Cancel,
                            LineInputAction::Changed | LineInputAction::None => EditOutcome::Keep,
                        }
                    }
                };
                match outcome {
                    EditOutcome::Keep => self.edit = EditState::Cell(edit),
                    EditOutcome::Commit => self.commit_cell_edit(edit),
                    EditOutcome::Cancel => log::trace!("cell edit cancelled"),
                }
                self.emit(GridAction::Redraw);
            }
        }
    }

    fn commit_cell_edit(&mut self, edit: CellEdit) {
        let value = match edit.kind {
            CellEditKind::Text(input) => CellValue::Text(input.text().to_string()),
            CellEditKind::Number(input) => {
                let text = input.text().trim();
                if text.is_empty() {
                    CellValue::Number(0.0)
                } else {
                    match text.parse::<f64>() {
                        Ok(n) if n.is_finite() => CellValue::Number(n),
                        _ => {
                            log::debug!("`{text}` is not a number, edit dropped");
                            return;
                        }
                    }
                }
            }
            CellEditKind::Select { options, choice } => match options.into_iter().nth(choice) {
                Some(option) => CellValue::Text(option),
                None => return,
            },
        };

        let mut rows = self.rows.clone();
        let Some(row) = rows.get_mut(edit.source_idx) else {
            log::debug!("edited row {} no longer exists", edit.source_idx);
            return;
        };
        if !row.set_value(&edit.column_key, value) {
            log::debug!("row rejected a value for `{}`", edit.column_key);
            return;
        }
        self.emit(GridAction::RowsChanged(rows));
    }

    fn resize_column(&mut self, col: usize, delta: i32) {
        let Some(pc) = self.processed.get(col) else {
            return;
        };
        if !pc.resizable {
            log::debug!("resize ignored: column `{}` is not resizable", pc.key);
            return;
        }
        let key = pc.key.clone();
        let before = pc.width;
        let next = (before as i32 + delta).clamp(1, u16::MAX as i32) as u16;
        self.width_overrides.insert(key.clone(), next);
        self.refresh();

        let width = self.processed.get(col).map_or(before, |c| c.width);
        if width == before {
            self.width_overrides.insert(key, before);
            return;
        }
        log::debug!("column `{key}` resized to {width}");
        self.emit(GridAction::ColumnResized { key, width });
        self.emit(GridAction::Redraw);
    }

    fn move_column(&mut self, col: usize, delta: i32) {
        let target = col as i64 + delta as i64;
        if target < 0 {
            return;
        }
        let (Some(source), Some(target)) =
            (self.processed.get(col), self.processed.get(target as usize))
        else {
            return;
        };
        if source.is_row_number() || target.is_row_number() {
            log::debug!("reorder ignored: the row number column is fixed");
            return;
        }
        let action = GridAction::ColumnsReordered {
            source: source.key.clone(),
            target: target.key.clone(),
        };
        self.emit(action);
    }
}

/// `input`'s text with the cursor cell drawn in `cursor` style.
fn input_line(input: &LineInput, cursor: Style) -> Line<'static> {
    let text = input.text();
    let at = text
        .char_indices()
        .nth(input.cursor())
        .map_or(text.len(), |(i, _)| i);
    let (before, rest) = text.split_at(at);
    let mut rest_chars = rest.chars();
    let under = rest_chars.next().map_or(" ".to_string(), String::from);
    Line::from(vec![
        Span::raw(before.to_string()),
        Span::styled(under, cursor),
        Span::raw(rest_chars.as_str().to_string()),
    ])
}
