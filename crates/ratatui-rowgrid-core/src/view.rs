//! Virtualized two-axis layout for the grid: scrolling, cursor movement, hit testing and the
//! header/body render loop.
//!
//! The view knows nothing about rows or columns beyond counts and widths. What goes into each
//! cell is decided by the caller's render callbacks.

use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use std::sync::Arc;
use virtualizer::Align;
use virtualizer::Virtualizer;
use virtualizer::VirtualizerOptions;

/// A cell address in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug)]
pub struct GridViewOptions {
    pub show_scrollbar_y: bool,
    pub overscan_rows: usize,
    pub overscan_cols: usize,
    pub col_gap: u32,
    /// Body style. `Style::default()` falls back to the theme.
    pub style: Style,
    /// Column separator style. `Style::default()` falls back to the theme.
    pub grid_line_style: Style,
    pub scrollbar_style: Style,
}

impl Default for GridViewOptions {
    fn default() -> Self {
        Self {
            show_scrollbar_y: true,
            overscan_rows: 2,
            overscan_cols: 2,
            col_gap: 1,
            style: Style::default(),
            grid_line_style: Style::default(),
            scrollbar_style: Style::default(),
        }
    }
}

/// Scroll offsets and the sizes they are clamped against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollState {
    pub x: u32,
    pub y: u32,
    pub viewport_w: u16,
    pub viewport_h: u16,
    pub content_w: u32,
    pub content_h: u32,
}

impl ScrollState {
    pub fn set_viewport(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
        self.clamp();
    }

    pub fn set_content(&mut self, w: u32, h: u32) {
        self.content_w = w;
        self.content_h = h;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.y = self.y.min(self.max_y());
        self.x = self.x.min(self.max_x());
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        let next = self.y as i64 + delta as i64;
        self.y = next.clamp(0, self.max_y() as i64) as u32;
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        let next = self.x as i64 + delta as i64;
        self.x = next.clamp(0, self.max_x() as i64) as u32;
    }

    pub fn percent_y(&self) -> Option<u8> {
        if self.viewport_h == 0 || self.content_h <= self.viewport_h as u32 {
            return None;
        }
        let bottom = self.y.saturating_add(self.viewport_h as u32) as f64;
        Some((bottom / self.content_h as f64 * 100.0).round().clamp(0.0, 100.0) as u8)
    }

    fn max_y(&self) -> u32 {
        self.content_h.saturating_sub(self.viewport_h as u32)
    }

    fn max_x(&self) -> u32 {
        self.content_w.saturating_sub(self.viewport_w as u32)
    }
}

/// What lies under a screen position, as of the last render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Header { col: usize },
    /// The filter line below the header title.
    Filter { col: usize },
    Body(Cell),
    /// Inside the grid but past the last row or column.
    Empty,
    Outside,
}

/// Per-cell data handed to the body render callback.
#[derive(Clone, Copy, Debug)]
pub struct CellContext {
    pub cell: Cell,
    /// Display columns of the cell scrolled out on the left.
    pub clip_left: u32,
    pub is_cursor: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct Layout {
    header: Rect,
    body: Rect,
    outer: Rect,
}

pub struct GridView {
    pub state: ScrollState,
    options: GridViewOptions,
    widths: Vec<u16>,
    col_starts: Arc<Vec<u64>>,
    rows: usize,
    header_h: u16,
    cursor: Option<Cell>,
    row_v: Virtualizer,
    col_v: Virtualizer,
    row_items: Vec<virtualizer::VirtualItem>,
    col_items: Vec<virtualizer::VirtualItem>,
    layout: Layout,
}

impl Default for GridView {
    fn default() -> Self {
        let options = GridViewOptions::default();

        let mut row_opts = VirtualizerOptions::new(0, |_| 1);
        row_opts.overscan = options.overscan_rows;
        let row_v = Virtualizer::new(row_opts);

        let mut col_opts = VirtualizerOptions::new(0, |_| 1);
        col_opts.gap = options.col_gap;
        col_opts.overscan = options.overscan_cols;
        let col_v = Virtualizer::new(col_opts);

        Self {
            state: ScrollState::default(),
            options,
            widths: Vec::new(),
            col_starts: Arc::new(Vec::new()),
            rows: 0,
            header_h: 1,
            cursor: None,
            row_v,
            col_v,
            row_items: Vec::new(),
            col_items: Vec::new(),
            layout: Layout::default(),
        }
    }
}

struct ColSeparatorContext<'a> {
    area: Rect,
    scroll_x: u64,
    col_count: usize,
    buf: &'a mut Buffer,
    style: Style,
}

impl GridView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GridViewOptions) -> Self {
        let mut v = Self::default();
        v.set_options(options);
        v
    }

    pub fn options(&self) -> &GridViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GridViewOptions) {
        self.options = options;
        self.rebuild_row_virtualizer();
        self.rebuild_col_virtualizer();
        self.state.clamp();
    }

    pub fn set_row_count(&mut self, rows: usize) {
        self.rows = rows;
        self.rebuild_row_virtualizer();
        self.cursor = clamp_cursor(self.cursor, self.rows, self.widths.len());
        self.state.clamp();
    }

    pub fn set_column_widths(&mut self, widths: Vec<u16>) {
        if widths == self.widths {
            return;
        }
        self.widths = widths;
        self.rebuild_col_virtualizer();
        self.cursor = clamp_cursor(self.cursor, self.rows, self.widths.len());
        self.state.clamp();
    }

    /// Header height in terminal rows: 1 for titles, 2 with the filter line.
    pub fn set_header_height(&mut self, h: u16) {
        self.header_h = h;
    }

    pub fn header_height(&self) -> u16 {
        self.header_h
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.widths.len()
    }

    pub fn cursor(&self) -> Option<Cell> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<Cell>) {
        self.cursor = clamp_cursor(cursor, self.rows, self.widths.len());
        self.ensure_cursor_visible();
    }

    /// Handles cursor movement and paging keys. Returns `true` if the key was consumed.
    pub fn handle_nav_key(&mut self, key: &KeyEvent) -> bool {
        if self.rows == 0 || self.widths.is_empty() {
            self.cursor = None;
            self.state.y = 0;
            self.state.x = 0;
            return false;
        }
        self.sync_virtualizers_from_state();

        let page = self.state.viewport_h.saturating_sub(1) as i32;
        if key.modifiers.ctrl && !key.modifiers.alt {
            return match key.code {
                KeyCode::Char('d') => {
                    self.page_by(page);
                    true
                }
                KeyCode::Char('u') => {
                    self.page_by(-page);
                    true
                }
                _ => false,
            };
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor_by(1, 0);
                true
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor_by(-1, 0);
                true
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_cursor_by(0, 1);
                true
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_cursor_by(0, -1);
                true
            }
            KeyCode::PageDown => {
                self.page_by(page);
                true
            }
            KeyCode::PageUp => {
                self.page_by(-page);
                true
            }
            KeyCode::Home => {
                self.set_cursor(Some(Cell { row: 0, col: 0 }));
                true
            }
            KeyCode::End => {
                self.set_cursor(Some(Cell {
                    row: self.rows.saturating_sub(1),
                    col: self.widths.len().saturating_sub(1),
                }));
                true
            }
            KeyCode::Char('g') => {
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.set_cursor(Some(Cell { row: 0, col }));
                true
            }
            KeyCode::Char('G') => {
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.set_cursor(Some(Cell {
                    row: self.rows.saturating_sub(1),
                    col,
                }));
                true
            }
            _ => false,
        }
    }

    /// Moves the cursor, clamped to the grid. Returns `true` if it moved.
    pub fn move_cursor_by(&mut self, drow: i32, dcol: i32) -> bool {
        if self.rows == 0 || self.widths.is_empty() {
            return false;
        }
        let cur = self.cursor.unwrap_or(Cell { row: 0, col: 0 });
        let next = Cell {
            row: (cur.row as i64 + drow as i64).clamp(0, self.rows as i64 - 1) as usize,
            col: (cur.col as i64 + dcol as i64).clamp(0, self.widths.len() as i64 - 1) as usize,
        };
        if Some(next) == self.cursor {
            return false;
        }
        self.cursor = Some(next);
        self.ensure_cursor_visible();
        true
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.sync_virtualizers_from_state();
        self.state.scroll_y_by(delta);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    pub fn ensure_cursor_visible(&mut self) {
        self.sync_virtualizers_from_state();
        let Some(c) = self.cursor else {
            return;
        };
        self.row_v.scroll_to_index(c.row, Align::Auto);
        self.col_v.scroll_to_index(c.col, Align::Auto);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.clamp();
    }

    /// Resolves a screen position against the last rendered layout.
    pub fn hit_test(&self, x: u16, y: u16) -> HitTarget {
        let Layout {
            header,
            body,
            outer,
        } = self.layout;
        if !contains(outer, x, y) {
            return HitTarget::Outside;
        }
        let in_columns = contains(header, x, y) || contains(body, x, y);
        let col = if in_columns {
            self.col_at(self.state.x as u64 + (x - body.x) as u64)
        } else {
            None
        };
        let Some(col) = col else {
            return HitTarget::Empty;
        };
        if contains(header, x, y) {
            return if y == header.y {
                HitTarget::Header { col }
            } else {
                HitTarget::Filter { col }
            };
        }
        if contains(body, x, y) {
            let row = self.state.y as usize + (y - body.y) as usize;
            if row < self.rows {
                return HitTarget::Body(Cell { row, col });
            }
        }
        HitTarget::Empty
    }

    /// Visible screen rectangle of a body cell, as of the last render.
    pub fn cell_rect(&self, cell: Cell) -> Option<Rect> {
        let body = self.layout.body;
        let row_rel = cell.row as i64 - self.state.y as i64;
        if row_rel < 0 || row_rel >= body.height as i64 {
            return None;
        }
        let start = *self.col_starts.get(cell.col)?;
        let size = *self.widths.get(cell.col)? as u32;
        let row_rect = Rect::new(body.x, body.y + row_rel as u16, body.width, 1);
        let (rect, _) = clipped_rect_x(row_rect, self.state.x as u64, start, size);
        (rect.width > 0).then_some(rect)
    }

    /// Renders header and body. `render_header` receives the column index, its header rectangle
    /// (the full header height) and the number of columns clipped on the left.
    pub fn render<H, C>(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        styles: GridStyles,
        mut render_header: H,
        mut render_cell: C,
    ) where
        H: FnMut(usize, Rect, u32, &mut Buffer),
        C: FnMut(Rect, CellContext, &mut Buffer),
    {
        self.layout = Layout {
            outer: area,
            ..Layout::default()
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (content_area, scrollbar_x) = if self.options.show_scrollbar_y && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };

        let header_h = self.header_h.min(content_area.height);
        let header_area = Rect::new(content_area.x, content_area.y, content_area.width, header_h);
        let body_area = Rect::new(
            content_area.x,
            content_area.y + header_h,
            content_area.width,
            content_area.height.saturating_sub(header_h),
        );
        self.layout.header = header_area;
        self.layout.body = body_area;

        buf.set_style(content_area, styles.base);

        self.sync_virtualizers(body_area);
        self.row_v.collect_virtual_items(&mut self.row_items);
        self.col_v.collect_virtual_items(&mut self.col_items);

        let scroll_x = self.col_v.scroll_offset();
        let scroll_y = self.row_v.scroll_offset();

        if header_area.height > 0 {
            for col_item in self.col_items.iter().copied() {
                let (rect, clip_left) =
                    clipped_rect_x(header_area, scroll_x, col_item.start, col_item.size);
                if rect.width == 0 {
                    continue;
                }
                render_header(col_item.index, rect, clip_left, buf);
                if self.options.col_gap > 0 {
                    let mut ctx = ColSeparatorContext {
                        area: header_area,
                        scroll_x,
                        col_count: self.widths.len(),
                        buf,
                        style: styles.grid_line,
                    };
                    maybe_draw_col_separator(&mut ctx, col_item.index, col_item.start, col_item.size);
                }
            }
        }

        if body_area.height > 0 && self.rows > 0 {
            for row_item in self.row_items.iter().copied() {
                let rel = row_item.start as i64 - scroll_y as i64;
                if rel < 0 || rel >= body_area.height as i64 {
                    continue;
                }
                let row_rect = Rect::new(body_area.x, body_area.y + rel as u16, body_area.width, 1);
                for col_item in self.col_items.iter().copied() {
                    let (cell_rect, clip_left) =
                        clipped_rect_x(row_rect, scroll_x, col_item.start, col_item.size);
                    if cell_rect.width == 0 {
                        continue;
                    }
                    let cell = Cell {
                        row: row_item.index,
                        col: col_item.index,
                    };
                    let ctx = CellContext {
                        cell,
                        clip_left,
                        is_cursor: self.cursor == Some(cell),
                    };
                    render_cell(cell_rect, ctx, buf);
                    if self.options.col_gap > 0 {
                        let mut sep = ColSeparatorContext {
                            area: row_rect,
                            scroll_x,
                            col_count: self.widths.len(),
                            buf,
                            style: styles.grid_line,
                        };
                        maybe_draw_col_separator(
                            &mut sep,
                            col_item.index,
                            col_item.start,
                            col_item.size,
                        );
                    }
                }
            }
        }

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, body_area.y, 1, body_area.height),
                buf,
                self.state.y,
                body_area.height,
                self.state.content_h,
                styles.scrollbar,
            );
        }
    }

    fn page_by(&mut self, delta: i32) {
        self.scroll_y_by(delta);
        let row = self
            .row_v
            .index_at_offset(self.row_v.scroll_offset())
            .unwrap_or(0);
        let col = self.cursor.map(|c| c.col).unwrap_or(0);
        self.cursor = clamp_cursor(Some(Cell { row, col }), self.rows, self.widths.len());
    }

    fn col_at(&self, offset: u64) -> Option<usize> {
        let idx = self.col_starts.partition_point(|start| *start <= offset);
        let col = idx.checked_sub(1)?;
        let end = self.col_starts[col] + self.widths[col] as u64;
        (offset < end).then_some(col)
    }

    fn sync_virtualizers(&mut self, body_area: Rect) {
        self.state.set_viewport(body_area.width, body_area.height);
        self.sync_virtualizers_from_state();
    }

    fn sync_virtualizers_from_state(&mut self) {
        self.row_v.set_count(self.rows);
        self.col_v.set_count(self.widths.len());

        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);

        self.row_v.set_scroll_offset(self.state.y as u64);
        self.col_v.set_scroll_offset(self.state.x as u64);

        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;

        self.state.set_content(
            self.col_v.total_size().min(u32::MAX as u64) as u32,
            self.row_v.total_size().min(u32::MAX as u64) as u32,
        );

        self.row_v.set_overscan(self.options.overscan_rows);
        self.col_v.set_overscan(self.options.overscan_cols);
    }

    fn rebuild_row_virtualizer(&mut self) {
        let mut opts = VirtualizerOptions::new(self.rows, |_| 1);
        opts.overscan = self.options.overscan_rows;
        self.row_v = Virtualizer::new(opts);
        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    fn rebuild_col_virtualizer(&mut self) {
        let gap = self.options.col_gap as u64;
        let mut starts = Vec::with_capacity(self.widths.len());
        let mut at = 0u64;
        for w in &self.widths {
            starts.push(at);
            at += *w as u64 + gap;
        }
        self.col_starts = Arc::new(starts);

        let widths: Arc<Vec<u32>> = Arc::new(self.widths.iter().map(|w| *w as u32).collect());
        let mut opts = VirtualizerOptions::new(self.widths.len(), move |i| {
            widths.get(i).copied().unwrap_or(1).max(1)
        });
        opts.gap = self.options.col_gap;
        opts.overscan = self.options.overscan_cols;
        self.col_v = Virtualizer::new(opts);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;
    }
}

/// Resolved styles for one render pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridStyles {
    pub base: Style,
    pub grid_line: Style,
    pub scrollbar: Style,
}

fn contains(r: Rect, x: u16, y: u16) -> bool {
    x >= r.x && y >= r.y && x < r.x.saturating_add(r.width) && y < r.y.saturating_add(r.height)
}

fn clamp_cursor(cursor: Option<Cell>, rows: usize, cols: usize) -> Option<Cell> {
    if rows == 0 || cols == 0 {
        return None;
    }
    cursor.map(|c| Cell {
        row: c.row.min(rows - 1),
        col: c.col.min(cols - 1),
    })
}

fn clipped_rect_x(area: Rect, scroll_x: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_x as i64;
    let clip_left = (-rel).max(0) as u32;
    let x = rel.clamp(0, area.width as i64) as u16;
    let max_w = area.width.saturating_sub(x);
    let visible_w = size.saturating_sub(clip_left).min(max_w as u32) as u16;
    (
        Rect::new(area.x + x, area.y, visible_w, area.height),
        clip_left,
    )
}

fn maybe_draw_col_separator(
    ctx: &mut ColSeparatorContext<'_>,
    col_index: usize,
    col_start: u64,
    col_size: u32,
) {
    if col_index + 1 >= ctx.col_count {
        return;
    }
    let sep_x_rel = (col_start + col_size as u64) as i64 - ctx.scroll_x as i64;
    if sep_x_rel < 0 || sep_x_rel >= ctx.area.width as i64 {
        return;
    }
    let sep_x = sep_x_rel as u16;
    for dy in 0..ctx.area.height {
        ctx.buf.set_span(
            ctx.area.x + sep_x,
            ctx.area.y + dy,
            &Span::styled("│", ctx.style),
            1,
        );
    }
}
