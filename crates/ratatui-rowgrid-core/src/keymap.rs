use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

/// A named set of keys, with a short label for help lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<KeyEvent>,
    pub help_key: String,
    pub help_desc: String,
}

impl Binding {
    pub fn new(
        help_key: impl Into<String>,
        help_desc: impl Into<String>,
        keys: Vec<KeyEvent>,
    ) -> Self {
        Self {
            keys,
            help_key: help_key.into(),
            help_desc: help_desc.into(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| key_event_matches(k, event))
    }
}

/// Matches a key pattern against an event.
///
/// Shift is ignored for character keys, since terminals report `G` both with and without the
/// shift flag.
pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    if pattern.code != event.code {
        return false;
    }
    let shift_matters = !matches!(pattern.code, KeyCode::Char(_));
    pattern.modifiers.ctrl == event.modifiers.ctrl
        && pattern.modifiers.alt == event.modifiers.alt
        && (!shift_matters || pattern.modifiers.shift == event.modifiers.shift)
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers::ctrl())
}

/// Key bindings understood by [`RowGrid`](crate::grid::RowGrid).
///
/// Cursor movement inside the grid body (arrows, `hjkl`, paging, `g`/`G`) is fixed; the bindings
/// here cover the grid-level commands.
#[derive(Clone, Debug)]
pub struct GridBindings {
    pub select: Binding,
    pub activate: Binding,
    pub cycle_sort: Binding,
    pub toggle_filters: Binding,
    pub edit_filter: Binding,
    pub open_menu: Binding,
    pub shrink_column: Binding,
    pub grow_column: Binding,
    pub move_column_left: Binding,
    pub move_column_right: Binding,
    pub cancel: Binding,
}

impl Default for GridBindings {
    fn default() -> Self {
        Self {
            select: Binding::new("space", "select", vec![key_char(' ')]),
            activate: Binding::new("enter", "edit", vec![key(KeyCode::Enter)]),
            cycle_sort: Binding::new("s", "sort", vec![key_char('s')]),
            toggle_filters: Binding::new("f", "filters", vec![key_char('f')]),
            edit_filter: Binding::new("/", "filter column", vec![key_char('/')]),
            open_menu: Binding::new("m", "row menu", vec![key_char('m'), key(KeyCode::Menu)]),
            shrink_column: Binding::new("<", "narrower", vec![key_char('<')]),
            grow_column: Binding::new(">", "wider", vec![key_char('>')]),
            move_column_left: Binding::new("H", "move left", vec![key_char('H')]),
            move_column_right: Binding::new("L", "move right", vec![key_char('L')]),
            cancel: Binding::new("esc", "cancel", vec![key(KeyCode::Esc)]),
        }
    }
}

impl GridBindings {
    /// Bindings in display order, for building a help line.
    pub fn help(&self) -> Vec<&Binding> {
        vec![
            &self.select,
            &self.activate,
            &self.cycle_sort,
            &self.toggle_filters,
            &self.edit_filter,
            &self.open_menu,
            &self.shrink_column,
            &self.grow_column,
            &self.move_column_left,
            &self.move_column_right,
        ]
    }
}
