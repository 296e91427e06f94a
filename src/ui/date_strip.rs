// Schedule date strip rendering.
// Measures a sample cell, sizes the viewport and draws only the visible days.

use std::time::Instant;

use chrono::NaiveDate;
use ratatui::{prelude::*, widgets::*};

use crate::state::{DateStrip, StripViewport, day_label};

fn cell_text(date: NaiveDate) -> String {
    format!(" {} ", day_label(date))
}

/// Width of a rendered day cell, including its divider.
fn measure_cell(sample: NaiveDate) -> u16 {
    let width = Line::from(cell_text(sample)).width() + 1;
    u16::try_from(width).unwrap_or(u16::MAX)
}

/// Draw the strip and feed layout measurements back into its state.
pub fn draw_date_strip(
    frame: &mut Frame,
    strip: &mut DateStrip,
    viewport: &mut StripViewport,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL).title(" Schedule ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if strip.item_width().is_none() {
        strip.on_sample_measured(measure_cell(strip.index().anchor()), Instant::now());
    }
    let Some(cell_width) = strip.item_width() else {
        return;
    };
    viewport.set_visible((inner.width / cell_width.max(1)) as usize);

    let today = strip.index().anchor();
    let selected = strip.selected();
    let mut spans = Vec::with_capacity(viewport.visible * 2);
    for index in viewport.visible_range() {
        let Some(date) = strip.index().date_for_index(index) else {
            continue;
        };

        let mut style = Style::default().fg(Color::White);
        if date == today {
            style = style.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED);
        }
        if date == selected {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(cell_text(date), style));
        spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Day cells
            Constraint::Length(1), // Spacer
            Constraint::Min(1),    // Selection details
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let offset = strip
        .index()
        .offset_from_date(selected)
        .unwrap_or_default();
    let relative = match offset {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        n if n > 0 => format!("in {} days", n),
        n => format!("{} days ago", -n),
    };
    let details = Paragraph::new(Line::from(vec![
        Span::styled(
            selected.format("%A, %B %-d %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({})", relative), Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(details, chunks[2]);
}
