//! Row context menu state and its single-slot row clipboard.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

/// An open menu: the display index of the clicked row and the pointer position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextMenuState {
    pub row_idx: usize,
    pub x: u16,
    pub y: u16,
}

/// Which menu items the grid offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextMenuOptions {
    pub copy_row: bool,
    pub paste_row: bool,
    pub delete_row: bool,
    pub add_row_below: bool,
    pub add_row_to_bottom: bool,
}

impl Default for ContextMenuOptions {
    fn default() -> Self {
        Self {
            copy_row: true,
            paste_row: true,
            delete_row: true,
            add_row_below: true,
            add_row_to_bottom: true,
        }
    }
}

impl ContextMenuOptions {
    /// Whether at least one item can ever show. Insert items need a row factory.
    pub fn any_available(&self, has_row_factory: bool) -> bool {
        self.copy_row
            || self.paste_row
            || self.delete_row
            || (has_row_factory && (self.add_row_below || self.add_row_to_bottom))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    CopyRow,
    PasteRow,
    DeleteRow,
    AddRowBelow,
    AddRowToBottom,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::CopyRow => "Copy row",
            MenuItem::PasteRow => "Paste row",
            MenuItem::DeleteRow => "Delete row",
            MenuItem::AddRowBelow => "Insert row below",
            MenuItem::AddRowToBottom => "Add row to bottom",
        }
    }
}

/// A visible menu line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub item: MenuItem,
    pub enabled: bool,
}

/// `Closed` or `Open(row_idx, x, y)`, plus the copied row.
///
/// The clipboard outlives the menu: a row copied from one menu can be pasted from the next.
#[derive(Clone, Debug)]
pub struct ContextMenu<R> {
    state: Option<ContextMenuState>,
    clipboard: Option<R>,
    highlighted: usize,
}

impl<R> Default for ContextMenu<R> {
    fn default() -> Self {
        Self {
            state: None,
            clipboard: None,
            highlighted: 0,
        }
    }
}

impl<R> ContextMenu<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, row_idx: usize, x: u16, y: u16) {
        log::debug!("context menu opened on display row {row_idx} at ({x}, {y})");
        self.state = Some(ContextMenuState { row_idx, x, y });
        self.highlighted = 0;
    }

    /// Closes the menu. Returns `true` if it was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.state.take().is_some();
        if was_open {
            log::trace!("context menu closed");
        }
        was_open
    }

    pub fn state(&self) -> Option<ContextMenuState> {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn clipboard(&self) -> Option<&R> {
        self.clipboard.as_ref()
    }

    pub fn set_clipboard(&mut self, row: Option<R>) {
        self.clipboard = row;
    }

    /// Items to show, in menu order. Paste is greyed out while the clipboard is empty.
    pub fn entries(&self, options: &ContextMenuOptions, has_row_factory: bool) -> Vec<MenuEntry> {
        let mut out = Vec::with_capacity(5);
        if options.copy_row {
            out.push(MenuEntry {
                item: MenuItem::CopyRow,
                enabled: true,
            });
        }
        if options.paste_row {
            out.push(MenuEntry {
                item: MenuItem::PasteRow,
                enabled: self.clipboard.is_some(),
            });
        }
        if options.delete_row {
            out.push(MenuEntry {
                item: MenuItem::DeleteRow,
                enabled: true,
            });
        }
        if options.add_row_below && has_row_factory {
            out.push(MenuEntry {
                item: MenuItem::AddRowBelow,
                enabled: true,
            });
        }
        if options.add_row_to_bottom && has_row_factory {
            out.push(MenuEntry {
                item: MenuItem::AddRowToBottom,
                enabled: true,
            });
        }
        out
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Moves the keyboard highlight to the next enabled entry in `delta`'s direction, wrapping.
    pub fn move_highlight(&mut self, delta: i32, entries: &[MenuEntry]) {
        if entries.is_empty() || !entries.iter().any(|e| e.enabled) {
            return;
        }
        let len = entries.len() as i64;
        let step = if delta < 0 { -1 } else { 1 };
        let mut idx = self.highlighted.min(entries.len() - 1) as i64;
        for _ in 0..entries.len() {
            idx = (idx + step).rem_euclid(len);
            if entries[idx as usize].enabled {
                break;
            }
        }
        self.highlighted = idx as usize;
    }

    /// Puts the highlight on the first enabled entry.
    pub fn reset_highlight(&mut self, entries: &[MenuEntry]) {
        self.highlighted = entries.iter().position(|e| e.enabled).unwrap_or(0);
    }

    pub fn highlighted_entry(&self, entries: &[MenuEntry]) -> Option<MenuEntry> {
        entries.get(self.highlighted).copied()
    }
}

/// Popup rectangle for `entries`, anchored at the pointer and pushed back inside `bounds`.
pub fn menu_rect(state: ContextMenuState, entries: &[MenuEntry], bounds: Rect) -> Rect {
    let label_w = entries
        .iter()
        .map(|e| e.item.label().width())
        .max()
        .unwrap_or(0) as u16;
    let w = (label_w + 4).min(bounds.width);
    let h = (entries.len() as u16 + 2).min(bounds.height);

    let right = bounds.x.saturating_add(bounds.width);
    let bottom = bounds.y.saturating_add(bounds.height);
    let mut x = state.x.saturating_add(1);
    let mut y = state.y.saturating_add(1);
    if x.saturating_add(w) > right {
        x = right.saturating_sub(w);
    }
    if y.saturating_add(h) > bottom {
        y = bottom.saturating_sub(h);
    }
    Rect::new(x.max(bounds.x), y.max(bounds.y), w, h)
}
