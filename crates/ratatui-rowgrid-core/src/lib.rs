//! `ratatui-rowgrid-core` provides a spreadsheet-like row grid for terminal UIs.
//!
//! The crate has two layers:
//!
//! - a pure engine: [`sort`], [`filter`], [`column`], [`rows`], [`selection`] and
//!   [`context_menu`]. None of it touches a terminal, and every function that changes rows
//!   returns a new `Vec` instead of mutating its input.
//! - [`grid::RowGrid`], a widget that puts the engine behind a virtualized [`view::GridView`].
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input + rendering from your app.
//! - Rows belong to the caller. The grid reports edits as [`grid::GridAction::RowsChanged`] and
//!   the caller decides whether to apply them.
//! - Any row type works once it implements [`value::GridRow`]. [`value::Record`] covers loosely
//!   typed data.
//!
//! ## Getting started
//!
//! Most users should depend on the facade crate `ratatui-rowgrid`. Use this crate directly if
//! you only need the engine.
//!
//! Useful entry points:
//! - [`grid::RowGrid`]: the widget.
//! - [`sort::sort_rows`] and [`filter::filter_rows`]: the display pipeline on its own.
//! - [`rows`]: copy-on-write row edits with id generation.
pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod error;
pub mod render;
pub mod value;

pub mod column;
pub mod context_menu;
pub mod filter;
pub mod rows;
pub mod selection;
pub mod sort;

pub mod grid;
pub mod input;
pub mod keymap;
pub mod line_input;
pub mod view;
