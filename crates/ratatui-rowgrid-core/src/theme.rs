use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Colors used by the grid.
///
/// Option structs may override some of these per grid (see
/// [`GridViewOptions`](crate::view::GridViewOptions)); the theme supplies the defaults.
#[derive(Clone, Debug)]
pub struct Theme {
    pub text_primary: Style,
    pub text_muted: Style,
    pub accent: Style,
    pub header: Style,
    pub filter_input: Style,
    pub selected_row: Style,
    pub cursor: Style,
    pub editor: Style,
    pub menu: Style,
    pub menu_highlight: Style,
    pub menu_disabled: Style,
}

impl Default for Theme {
    fn default() -> Self {
        use ratatui::style::Stylize;

        Self {
            text_primary: Style::default(),
            text_muted: Style::default().dark_gray(),
            accent: Style::default().cyan(),
            header: Style::default()
                .fg(Color::Black)
                .bg(Color::Rgb(0xf2, 0xf2, 0xbb))
                .add_modifier(Modifier::BOLD),
            filter_input: Style::default().fg(Color::Black).bg(Color::Gray),
            selected_row: Style::default().fg(Color::Black).bg(Color::Rgb(0xe3, 0xf2, 0xfd)),
            cursor: Style::default().add_modifier(Modifier::REVERSED),
            editor: Style::default().fg(Color::Black).bg(Color::White),
            menu: Style::default().fg(Color::White).bg(Color::DarkGray),
            menu_highlight: Style::default().fg(Color::Black).bg(Color::Cyan),
            menu_disabled: Style::default().fg(Color::Gray).bg(Color::DarkGray),
        }
    }
}
