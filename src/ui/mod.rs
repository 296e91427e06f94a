// UI module for rendering the TUI.
// Contains the tab bar, cached widget views and the schedule strip.

mod date_strip;
mod list;
mod tabs;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    tabs::draw_tabs(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

/// Draw the main content area based on active tab.
fn draw_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        Tab::Pinned => list::render_pinned(frame, app.pinned.view(), &mut app.pinned_list, area),
        Tab::Media => list::render_media(frame, app.media.view(), &mut app.media_list, area),
        Tab::Stats => list::render_stats(frame, app.stats.view(), area),
        Tab::Schedule => {
            let strip_area = Rect {
                height: area.height.min(7),
                ..area
            };
            date_strip::draw_date_strip(frame, &mut app.schedule, &mut app.viewport, strip_area);
        }
    }
}

/// Draw the status bar at the bottom.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = if app.active_tab == Tab::Schedule {
        vec![
            Span::raw(" ←→ "),
            Span::styled("Day", Style::default().fg(Color::DarkGray)),
            Span::raw("  PgUp/Dn "),
            Span::styled("Week", Style::default().fg(Color::DarkGray)),
            Span::raw("  t "),
            Span::styled("Today", Style::default().fg(Color::DarkGray)),
        ]
    } else {
        vec![
            Span::raw(" ↑↓ "),
            Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
            Span::raw("  r "),
            Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        ]
    };
    hints.extend([
        Span::raw("  Tab "),
        Span::styled("Switch", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ]);

    if let Some(status) = &app.status {
        hints.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}
