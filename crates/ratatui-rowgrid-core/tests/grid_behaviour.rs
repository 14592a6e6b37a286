use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_rowgrid_core::column::CellEditor;
use ratatui_rowgrid_core::column::Column;
use ratatui_rowgrid_core::filter::filter_rows;
use ratatui_rowgrid_core::grid::GridAction;
use ratatui_rowgrid_core::grid::RowGrid;
use ratatui_rowgrid_core::grid::RowGridOptions;
use ratatui_rowgrid_core::input::InputEvent;
use ratatui_rowgrid_core::input::KeyCode;
use ratatui_rowgrid_core::input::MouseButton;
use ratatui_rowgrid_core::input::MouseEvent;
use ratatui_rowgrid_core::input::MouseEventKind;
use ratatui_rowgrid_core::keymap::key;
use ratatui_rowgrid_core::keymap::key_char;
use ratatui_rowgrid_core::rows::add_row_to_bottom;
use ratatui_rowgrid_core::rows::delete_row;
use ratatui_rowgrid_core::sort::SortSpec;
use ratatui_rowgrid_core::sort::sort_rows;
use ratatui_rowgrid_core::theme::Theme;
use ratatui_rowgrid_core::value::CellValue;
use ratatui_rowgrid_core::value::GridRow;
use ratatui_rowgrid_core::value::Record;
use ratatui_rowgrid_core::value::RowKey;
use std::collections::BTreeMap;

fn product(id: i64, name: &str, price: i64) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("price", price)
}

fn products() -> Vec<Record> {
    vec![
        product(1, "Laptop", 1200),
        product(2, "Mouse", 25),
        product(3, "Keyboard", 75),
        product(4, "Monitor", 300),
        product(5, "USB cable", 25),
    ]
}

fn key_of(r: &Record) -> RowKey {
    match r.value("id").as_number() {
        Some(n) => RowKey::Number(n as i64),
        None => RowKey::Text(r.value("id").display_text()),
    }
}

fn grid(options: RowGridOptions) -> RowGrid<Record> {
    let mut g = RowGrid::<Record>::new(key_of).with_options(options);
    g.set_columns(vec![
        Column::new("name", "Name").sortable(true).editor(CellEditor::Text),
        Column::new("price", "Price")
            .sortable(true)
            .editor(CellEditor::Number),
    ])
    .unwrap();
    g.set_rows(products());
    g.take_actions();
    g
}

fn draw(g: &mut RowGrid<Record>) -> Buffer {
    let area = Rect::new(0, 0, 40, 12);
    let mut buf = Buffer::empty(area);
    g.render(area, &mut buf, &Theme::default());
    buf
}

fn line_text(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width)
        .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
        .collect()
}

fn click(g: &mut RowGrid<Record>, button: MouseButton, x: u16, y: u16) -> Vec<GridAction<Record>> {
    g.handle_event(MouseEvent::new(MouseEventKind::Down(button), x, y).into())
}

fn names<'a>(rows: impl IntoIterator<Item = &'a Record>) -> Vec<String> {
    rows.into_iter()
        .map(|r| r.value("name").display_text())
        .collect()
}

fn rows_changed(actions: &[GridAction<Record>]) -> Option<&Vec<Record>> {
    actions.iter().find_map(|a| match a {
        GridAction::RowsChanged(rows) => Some(rows),
        _ => None,
    })
}

#[test]
fn sorting_twice_changes_nothing() {
    let rows = products();
    for spec in [
        SortSpec::asc("name"),
        SortSpec::desc("name"),
        SortSpec::asc("price"),
        SortSpec::desc("price"),
        SortSpec::asc("missing"),
    ] {
        let once = sort_rows(&rows, Some(&spec)).into_owned();
        let twice = sort_rows(&once, Some(&spec)).into_owned();
        let keys = |rows: &[Record]| -> Vec<String> {
            rows.iter()
                .map(|r| r.value(&spec.column_key).display_text())
                .collect()
        };
        assert_eq!(keys(&once), keys(&twice), "{spec:?}");
    }
}

#[test]
fn empty_filters_are_identity() {
    let rows = products();
    assert_eq!(&*filter_rows(&rows, &BTreeMap::new()), rows.as_slice());
}

#[test]
fn filter_is_sound_and_complete() {
    let rows = products();
    let mut filters = BTreeMap::new();
    filters.insert("name".to_string(), "o".to_string());
    filters.insert("price".to_string(), "2".to_string());

    let matches = |r: &Record| {
        filters.iter().all(|(k, v)| {
            r.value(k)
                .display_text()
                .to_lowercase()
                .contains(&v.to_lowercase())
        })
    };
    let kept = filter_rows(&rows, &filters);
    assert!(kept.iter().all(|r| matches(r)));
    for r in &rows {
        assert_eq!(kept.contains(r), matches(r), "{r:?}");
    }
    assert_eq!(names(kept.iter()), vec!["Laptop", "Mouse"]);
}

#[test]
fn price_desc_example() {
    let rows = vec![
        Record::new().with("price", 1),
        Record::new().with("price", 3),
        Record::new().with("price", 2),
    ];
    let sorted = sort_rows(&rows, Some(&SortSpec::desc("price")));
    let prices: Vec<CellValue> = sorted.iter().map(|r| r.value("price")).collect();
    assert_eq!(
        prices,
        vec![
            CellValue::Number(3.0),
            CellValue::Number(2.0),
            CellValue::Number(1.0)
        ]
    );
}

#[test]
fn name_filter_example() {
    let rows = vec![
        Record::new().with("name", "Laptop"),
        Record::new().with("name", "Mouse"),
    ];
    let mut filters = BTreeMap::new();
    filters.insert("name".to_string(), "lap".to_string());
    assert_eq!(names(filter_rows(&rows, &filters).iter()), vec!["Laptop"]);
}

#[test]
fn delete_examples() {
    let rows: Vec<Record> = ["a", "b", "c"]
        .into_iter()
        .map(|n| Record::new().with("name", n))
        .collect();
    assert_eq!(names(&delete_row(&rows, 1)), vec!["a", "c"]);
    assert_eq!(delete_row(&rows, 5), rows);
}

#[test]
fn append_assigns_next_id() {
    let rows = vec![Record::new().with("id", 1), Record::new().with("id", 3)];
    let out = add_row_to_bottom(&rows, || Record::new().with("id", CellValue::Null));
    assert_eq!(out[2].value("id"), CellValue::Number(4.0));
}

#[test]
fn selecting_same_row_twice_unselects() {
    let mut g = grid(RowGridOptions {
        row_selectable: true,
        ..Default::default()
    });
    draw(&mut g);
    let first = click(&mut g, MouseButton::Left, 1, 2);
    assert!(first.contains(&GridAction::RowSelected(Some(product(2, "Mouse", 25)))));
    assert!(first.contains(&GridAction::RowClicked(product(2, "Mouse", 25))));

    let second = click(&mut g, MouseButton::Left, 1, 2);
    assert!(second.contains(&GridAction::RowSelected(None)));
    assert_eq!(g.selected_row(), None);
}

#[test]
fn sort_change_clears_selection() {
    let mut g = grid(RowGridOptions {
        row_selectable: true,
        ..Default::default()
    });
    g.handle_event(key_char(' ').into());
    assert!(g.selected_row().is_some());

    let actions = g.handle_event(key_char('s').into());
    assert!(actions.contains(&GridAction::SortColumnsChanged(vec![SortSpec::asc("name")])));
    assert!(actions.contains(&GridAction::RowSelected(None)));
    assert_eq!(g.selected_row(), None);
}

#[test]
fn sort_change_keeps_selection_when_asked() {
    let mut g = grid(RowGridOptions {
        row_selectable: true,
        clear_selection_on_sort: false,
        ..Default::default()
    });
    g.handle_event(key_char(' ').into());
    let actions = g.handle_event(key_char('s').into());
    assert!(!actions.contains(&GridAction::RowSelected(None)));
    assert!(g.selected_row().is_some());
}

#[test]
fn removing_selected_row_resets_selection() {
    let mut g = grid(RowGridOptions {
        row_selectable: true,
        ..Default::default()
    });
    g.handle_event(key_char(' ').into());

    // Same key, new contents: the selection follows the row.
    let mut rows = products();
    rows[0].insert("name", "Laptop Pro");
    g.set_rows(rows.clone());
    assert!(g.take_actions().is_empty());
    assert_eq!(
        g.selected_row().map(|r| r.value("name").display_text()),
        Some("Laptop Pro".to_string())
    );

    rows.remove(0);
    g.set_rows(rows);
    assert_eq!(g.take_actions(), vec![GridAction::RowSelected(None)]);
}

#[test]
fn initial_selection_is_silent() {
    let mut g = RowGrid::<Record>::new(key_of)
        .with_options(RowGridOptions {
            row_selectable: true,
            ..Default::default()
        })
        .with_initial_selected_row(Some(product(3, "Keyboard", 75)));
    g.set_rows(products());
    assert!(g.take_actions().is_empty());
    assert_eq!(g.selected_row(), Some(&product(3, "Keyboard", 75)));
}

#[test]
fn menu_action_on_sorted_view_hits_clicked_row() {
    let mut g = grid(RowGridOptions {
        use_internal_sort: true,
        editable_rows: true,
        ..Default::default()
    });
    g.set_sort_columns(vec![SortSpec::asc("name")]);
    assert_eq!(
        names(g.display_rows()),
        vec!["Keyboard", "Laptop", "Monitor", "Mouse", "USB cable"]
    );
    draw(&mut g);

    // Display row 1 is "Laptop", source row 0.
    click(&mut g, MouseButton::Right, 2, 2);
    let state = g.context_menu().state().unwrap();
    assert_eq!(state.row_idx, 1);

    let buf = draw(&mut g);
    assert!(line_text(&buf, 6).contains("Delete row"));

    let actions = click(&mut g, MouseButton::Left, 5, 6);
    let rows = rows_changed(&actions).unwrap();
    assert_eq!(
        names(rows),
        vec!["Mouse", "Keyboard", "Monitor", "USB cable"]
    );
    assert!(!g.context_menu().is_open());
}

#[test]
fn copy_then_paste_keeps_target_id() {
    let mut g = grid(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    // Copy row 0.
    g.handle_event(key_char('m').into());
    g.handle_event(key(KeyCode::Enter).into());
    assert!(g.context_menu().clipboard().is_some());

    // Paste onto row 2: highlight starts on Copy, paste is next.
    g.handle_event(key(KeyCode::Down).into());
    g.handle_event(key(KeyCode::Down).into());
    g.handle_event(key_char('m').into());
    g.handle_event(key(KeyCode::Down).into());
    let actions = g.handle_event(key(KeyCode::Enter).into());
    let rows = rows_changed(&actions).unwrap();
    assert_eq!(rows[2].value("name").display_text(), "Laptop");
    assert_eq!(rows[2].value("id"), CellValue::Number(3.0));
}

#[test]
fn insert_items_use_the_row_factory() {
    let mut g = grid(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    g.set_row_factory(|| Record::new().with("id", CellValue::Null).with("name", "New"));
    g.handle_event(key_char('m').into());
    // Copy, Paste (disabled), Delete, Insert below, Add to bottom.
    g.handle_event(key(KeyCode::Down).into());
    g.handle_event(key(KeyCode::Down).into());
    let actions = g.handle_event(key(KeyCode::Enter).into());
    let rows = rows_changed(&actions).unwrap();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[1].value("name").display_text(), "New");
    assert_eq!(rows[1].value("id"), CellValue::Number(6.0));
}

#[test]
fn menu_closes_on_outside_click_and_on_new_rows() {
    let mut g = grid(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    draw(&mut g);
    click(&mut g, MouseButton::Right, 2, 2);
    assert!(g.context_menu().is_open());
    click(&mut g, MouseButton::Left, 38, 11);
    assert!(!g.context_menu().is_open());

    click(&mut g, MouseButton::Right, 2, 2);
    g.set_rows(products());
    assert!(!g.context_menu().is_open());
}

#[test]
fn right_click_ends_filter_edit_and_filter_change_closes_menu() {
    let mut g = grid(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    g.handle_event(key_char('/').into());
    assert!(g.is_editing());
    // Filter line visible: body starts at y = 2, display row 4 is "USB cable".
    draw(&mut g);
    click(&mut g, MouseButton::Right, 2, 6);
    assert!(!g.is_editing());
    assert_eq!(g.context_menu().state().map(|s| s.row_idx), Some(4));

    g.set_filter("name", "u");
    assert_eq!(names(g.display_rows()), vec!["Mouse", "USB cable"]);
    assert!(!g.context_menu().is_open());

    // Delete would be the third entry; with the menu gone nothing edits rows.
    g.handle_event(key(KeyCode::Down).into());
    g.handle_event(key(KeyCode::Down).into());
    let actions = g.handle_event(key(KeyCode::Enter).into());
    assert!(rows_changed(&actions).is_none());
}

#[test]
fn sort_change_closes_open_menu() {
    let mut g = grid(RowGridOptions {
        use_internal_sort: true,
        editable_rows: true,
        ..Default::default()
    });
    draw(&mut g);
    click(&mut g, MouseButton::Right, 2, 2);
    assert!(g.context_menu().is_open());
    g.set_sort_columns(vec![SortSpec::asc("name")]);
    assert!(!g.context_menu().is_open());
}

#[test]
fn nan_prices_sort_without_panicking() {
    let rows: Vec<Record> = (0..50)
        .map(|i| {
            let price = if i % 3 == 0 { f64::NAN } else { i as f64 };
            Record::new().with("id", i as i64).with("price", price)
        })
        .collect();
    for spec in [SortSpec::asc("price"), SortSpec::desc("price")] {
        let sorted = sort_rows(&rows, Some(&spec));
        assert_eq!(sorted.len(), 50);
    }
    let asc = sort_rows(&rows, Some(&SortSpec::asc("price")));
    assert!(asc[0].value("price").as_number().is_some_and(f64::is_nan));
    assert_eq!(asc[49].value("price"), CellValue::Number(49.0));
}

#[test]
fn menu_stays_closed_without_editable_rows() {
    let mut g = grid(RowGridOptions::default());
    draw(&mut g);
    click(&mut g, MouseButton::Right, 2, 2);
    assert!(!g.context_menu().is_open());
}

#[test]
fn number_editor_writes_zero_for_empty_input() {
    let mut g = grid(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    g.handle_event(key(KeyCode::Right).into());
    g.handle_event(key(KeyCode::Enter).into());
    for _ in 0..4 {
        g.handle_event(key(KeyCode::Backspace).into());
    }
    let actions = g.handle_event(key(KeyCode::Enter).into());
    let rows = rows_changed(&actions).unwrap();
    assert_eq!(rows[0].value("price"), CellValue::Number(0.0));
}

#[test]
fn select_editor_cycles_options() {
    let mut g = RowGrid::<Record>::new(key_of).with_options(RowGridOptions {
        editable_rows: true,
        ..Default::default()
    });
    g.set_columns(vec![Column::new("status", "Status").editor(CellEditor::Select(vec![
        "todo".into(),
        "doing".into(),
        "done".into(),
    ]))])
    .unwrap();
    g.set_rows(vec![Record::new().with("id", 1).with("status", "doing")]);

    g.handle_event(key(KeyCode::Enter).into());
    g.handle_event(key(KeyCode::Down).into());
    let actions = g.handle_event(key(KeyCode::Enter).into());
    let rows = rows_changed(&actions).unwrap();
    assert_eq!(rows[0].value("status"), CellValue::from("done"));
}

#[test]
fn header_shows_sort_arrow_and_row_numbers() {
    let mut g = grid(RowGridOptions {
        show_row_number: true,
        ..Default::default()
    });
    g.set_sort_columns(vec![SortSpec::desc("price")]);
    let buf = draw(&mut g);
    assert!(line_text(&buf, 0).contains("Price ▼"));
    assert!(line_text(&buf, 1).trim_start().starts_with('1'));
    assert!(line_text(&buf, 5).contains("USB cable"));
}

#[test]
fn filter_line_renders_under_header() {
    let mut g = grid(RowGridOptions {
        filterable: true,
        initial_filters_visible: true,
        ..Default::default()
    });
    g.set_filter("name", "lap");
    let buf = draw(&mut g);
    assert!(line_text(&buf, 1).starts_with("lap"));
    assert!(line_text(&buf, 2).contains("Laptop"));
    assert_eq!(g.display_len(), 1);
}

#[test]
fn clicking_filter_line_edits_that_column() {
    let mut g = grid(RowGridOptions {
        filterable: true,
        initial_filters_visible: true,
        ..Default::default()
    });
    draw(&mut g);
    click(&mut g, MouseButton::Left, 1, 1);
    g.handle_event(InputEvent::Paste("mo".into()));
    g.handle_event(key(KeyCode::Enter).into());
    assert_eq!(g.filter_state().filter("name"), "mo");
    assert_eq!(names(g.display_rows()), vec!["Mouse", "Monitor"]);
}

#[test]
fn wheel_scrolls_long_lists() {
    let mut g = grid(RowGridOptions::default());
    let rows: Vec<Record> = (0..100).map(|i| product(i, &format!("item {i}"), i)).collect();
    g.set_rows(rows);
    draw(&mut g);
    let actions = g.handle_event(MouseEvent::new(MouseEventKind::ScrollDown, 5, 5).into());
    assert_eq!(actions, vec![GridAction::Redraw]);
    let buf = draw(&mut g);
    assert!(line_text(&buf, 1).contains("item 3"));
}
