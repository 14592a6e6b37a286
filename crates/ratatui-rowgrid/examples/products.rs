use chrono::NaiveDate;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_rowgrid::crossterm_input::input_event_from_crossterm;
use ratatui_rowgrid::prelude::*;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;
use std::fs::File;
use std::io;
use std::time::Duration;

const CATEGORIES: [&str; 4] = ["computer", "peripheral", "display", "cable"];
const NAMES: [&str; 8] = [
    "Laptop", "Mouse", "Keyboard", "Monitor", "USB cable", "Dock", "Webcam", "HDMI cable",
];

fn main() -> io::Result<()> {
    // The terminal is in raw mode, so logs go to a file.
    let log_file = File::create("products.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file).map_err(io::Error::other)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let mut app = App::new().map_err(io::Error::other)?;

    let res = run(&mut terminal, &theme, &mut app);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

struct App {
    grid: RowGrid<Record>,
    columns: Vec<Column<Record>>,
    status: String,
}

impl App {
    fn new() -> Result<Self, GridError> {
        let columns = columns();
        let mut grid = RowGrid::<Record>::new(|r: &Record| match r.value("id").as_number() {
            Some(n) => RowKey::Number(n as i64),
            None => RowKey::Text(r.value("id").display_text()),
        })
        .with_options(RowGridOptions {
            use_internal_sort: true,
            filterable: true,
            show_row_number: true,
            row_selectable: true,
            resizable: true,
            editable_rows: true,
            ..Default::default()
        });
        grid.set_columns(columns.clone())?;
        grid.set_rows(sample_rows(500));
        grid.set_row_factory(|| {
            Record::new()
                .with("id", CellValue::Null)
                .with("name", "New product")
                .with("category", CATEGORIES[0])
                .with("price", 0)
        });
        Ok(Self {
            grid,
            columns,
            status: String::new(),
        })
    }

    fn apply(&mut self, action: GridAction<Record>) -> Result<(), GridError> {
        match action {
            GridAction::Redraw => {}
            GridAction::RowsChanged(rows) => {
                self.status = format!("{} rows", rows.len());
                self.grid.set_rows(rows);
            }
            GridAction::SortColumnsChanged(sort) => {
                self.status = match sort.first() {
                    Some(s) => format!("sorted by {} {}", s.column_key, s.direction),
                    None => "unsorted".to_string(),
                };
                self.grid.set_sort_columns(sort);
            }
            GridAction::RowSelected(row) => {
                self.status = match row {
                    Some(r) => format!("selected {}", r.value("name")),
                    None => "selection cleared".to_string(),
                };
            }
            GridAction::ColumnsReordered { source, target } => {
                let from = self.columns.iter().position(|c| c.key == source);
                let to = self.columns.iter().position(|c| c.key == target);
                if let (Some(from), Some(to)) = (from, to) {
                    let column = self.columns.remove(from);
                    self.columns.insert(to, column);
                    self.grid.set_columns(self.columns.clone())?;
                }
            }
            GridAction::ColumnResized { key, width } => {
                self.status = format!("{key} is now {width} wide");
            }
            GridAction::RowClicked(row) => log::info!("clicked {}", row.value("name")),
        }
        // Anything queued by the setters above, e.g. a selection reset after a delete.
        for follow_up in self.grid.take_actions() {
            if let GridAction::RowSelected(None) = follow_up {
                self.status = "selection cleared".to_string();
            }
        }
        Ok(())
    }
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("Products (s sort, f filters, / filter, space select, enter edit, m menu, q)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let grid_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(1),
            );
            let status_area = Rect::new(inner.x, inner.y + grid_area.height, inner.width, 1);

            app.grid.render(grid_area, buf, theme);
            render_status(status_area, buf, theme, app);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let ev = crossterm::event::read()?;
        if let Event::Key(key) = &ev
            && key.kind == KeyEventKind::Press
            && key.code == KeyCode::Char('q')
            && !app.grid.is_editing()
            && !app.grid.context_menu().is_open()
        {
            return Ok(());
        }

        if let Some(input) = input_event_from_crossterm(ev) {
            for action in app.grid.handle_event(input) {
                app.apply(action).map_err(io::Error::other)?;
            }
        }
    }
}

fn render_status(area: Rect, buf: &mut ratatui::buffer::Buffer, theme: &Theme, app: &App) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let shown = app.grid.display_len();
    let total = app.grid.rows().len();
    let pct = app.grid.cursor().map_or(0, |c| (c.row + 1) * 100 / shown.max(1));
    let line = Line::from(vec![
        Span::styled(format!("{shown}/{total} rows  {pct}%  "), theme.text_muted),
        Span::styled(app.status.clone(), theme.accent),
    ]);
    buf.set_line(area.x, area.y, &line, area.width);
}

fn columns() -> Vec<Column<Record>> {
    vec![
        Column::new("id", "ID").width(5).sortable(true).resizable(false),
        Column::new("name", "Name")
            .min_width(8)
            .sortable(true)
            .editor(CellEditor::Text),
        Column::new("category", "Category")
            .sortable(true)
            .editor(CellEditor::Select(
                CATEGORIES.iter().map(|c| c.to_string()).collect(),
            )),
        Column::<Record>::new("price", "Price")
            .width(10)
            .sortable(true)
            .editor(CellEditor::Number)
            .render_cell(|p| {
                let price = p.row.value("price").as_number().unwrap_or(0.0);
                Line::raw(format!("{price:>9.2}"))
            }),
        Column::new("added", "Added").sortable(true),
    ]
}

fn sample_rows(n: usize) -> Vec<Record> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default();
    (0..n)
        .map(|i| {
            Record::new()
                .with("id", i as i64 + 1)
                .with("name", format!("{} {}", NAMES[i % NAMES.len()], i / NAMES.len() + 1))
                .with("category", CATEGORIES[i % CATEGORIES.len()])
                .with("price", ((i * 7919) % 200_000) as f64 / 100.0)
                .with("added", base + chrono::Duration::hours(i as i64 * 17))
        })
        .collect()
}
