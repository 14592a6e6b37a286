use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use unicode_width::UnicodeWidthChar;

/// Draws a vertical scrollbar for a scroll range of `content` rows seen through `viewport` rows.
pub fn render_scrollbar(
    area: Rect,
    buf: &mut Buffer,
    offset: u32,
    viewport: u16,
    content: u32,
    style: Style,
) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if content <= viewport as u32 || content == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((viewport as f64 / content as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;
    let max_offset = content.saturating_sub(viewport as u32).max(1) as f64;
    let thumb_top = ((offset as f64 / max_offset) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Draws `line` starting `clip_left` display columns in, limited to `max_cols` columns.
///
/// Span styles are patched over `base`. A wide character cut by either edge becomes a space, and
/// tabs and other control characters render as a single space.
pub fn render_line_clipped(
    x: u16,
    y: u16,
    clip_left: u32,
    max_cols: u16,
    buf: &mut Buffer,
    line: &Line<'_>,
    base: Style,
) {
    if max_cols == 0 {
        return;
    }
    let clip_left = clip_left as usize;
    let max_cols = max_cols as usize;
    let mut col = 0usize;
    let mut out = 0usize;
    let line_style = base.patch(line.style);
    let mut tmp = [0u8; 4];

    for span in &line.spans {
        let style = line_style.patch(span.style);
        for ch in span.content.chars() {
            let (ch, w) = match ch.width() {
                Some(w) if !ch.is_control() => (ch, w),
                _ => (' ', 1),
            };
            if w == 0 {
                continue;
            }
            if col + w <= clip_left {
                col += w;
                continue;
            }
            // Partially scrolled out on the left.
            let visible = if col < clip_left { col + w - clip_left } else { w };
            if out + visible > max_cols {
                let remaining = max_cols - out;
                fill_blank(buf, x + out as u16, y, remaining, style);
                return;
            }
            if visible < w {
                fill_blank(buf, x + out as u16, y, visible, style);
            } else if let Some(cell) = buf.cell_mut((x + out as u16, y)) {
                cell.set_symbol(ch.encode_utf8(&mut tmp));
                cell.set_style(style);
            }
            col += w;
            out += visible;
        }
    }
}

fn fill_blank(buf: &mut Buffer, x: u16, y: u16, cols: usize, style: Style) {
    for dx in 0..cols {
        if let Some(cell) = buf.cell_mut((x + dx as u16, y)) {
            cell.set_symbol(" ");
            cell.set_style(style);
        }
    }
}
