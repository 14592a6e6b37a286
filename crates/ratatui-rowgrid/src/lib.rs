//! Spreadsheet-like row grid for `ratatui`.
//!
//! This is the facade over `ratatui-rowgrid-core`. Enable the `crossterm` feature to convert
//! crossterm events with [`crossterm_input`].
//!
//! ```no_run
//! use ratatui_rowgrid::prelude::*;
//!
//! let mut grid = RowGrid::<Record>::new(|r: &Record| RowKey::Text(r.value("id").display_text()))
//!     .with_options(RowGridOptions {
//!         use_internal_sort: true,
//!         filterable: true,
//!         row_selectable: true,
//!         ..Default::default()
//!     });
//! grid.set_columns(vec![Column::new("name", "Name").sortable(true)])?;
//! grid.set_rows(vec![Record::new().with("id", 1).with("name", "Laptop")]);
//! # Ok::<(), GridError>(())
//! ```

pub use ratatui_rowgrid_core::column;
pub use ratatui_rowgrid_core::context_menu;
pub use ratatui_rowgrid_core::error;
pub use ratatui_rowgrid_core::filter;
pub use ratatui_rowgrid_core::grid;
pub use ratatui_rowgrid_core::input;
pub use ratatui_rowgrid_core::keymap;
pub use ratatui_rowgrid_core::line_input;
pub use ratatui_rowgrid_core::render;
pub use ratatui_rowgrid_core::rows;
pub use ratatui_rowgrid_core::selection;
pub use ratatui_rowgrid_core::sort;
pub use ratatui_rowgrid_core::theme;
pub use ratatui_rowgrid_core::value;
pub use ratatui_rowgrid_core::view;

#[cfg(feature = "crossterm")]
pub use ratatui_rowgrid_core::crossterm_input;

pub mod prelude {
    pub use crate::column::CellEditor;
    pub use crate::column::Column;
    pub use crate::context_menu::ContextMenuOptions;
    pub use crate::context_menu::MenuItem;
    pub use crate::error::GridError;
    pub use crate::grid::GridAction;
    pub use crate::grid::RowGrid;
    pub use crate::grid::RowGridOptions;
    pub use crate::input::InputEvent;
    pub use crate::sort::SortDirection;
    pub use crate::sort::SortSpec;
    pub use crate::theme::Theme;
    pub use crate::value::CellValue;
    pub use crate::value::GridRow;
    pub use crate::value::Record;
    pub use crate::value::RowKey;
    pub use crate::view::GridViewOptions;
}
