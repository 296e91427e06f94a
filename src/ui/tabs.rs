// Tab bar rendering.
// Marks the active tab and shows a spinner mark on widgets still loading.

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, Tab};

fn is_loading(app: &App, tab: Tab) -> bool {
    match tab {
        Tab::Pinned => app.pinned.is_loading(),
        Tab::Media => app.media.is_loading(),
        Tab::Stats => app.stats.is_loading(),
        Tab::Schedule => false,
    }
}

/// Draw the tab bar at the top of the screen.
pub fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tab_titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let title = if is_loading(app, *tab) && app.conversation_id.is_some() {
                format!("{} …", tab.title())
            } else {
                tab.title().to_string()
            };

            let style = if *tab == app.active_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(Span::styled(title, style))
        })
        .collect();

    let selected_index = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let title = match &app.conversation_id {
        Some(id) => format!(" huddle · {} ", id),
        None => " huddle ".to_string(),
    };

    let tabs_widget = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title)
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(selected_index)
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw(" │ "));

    frame.render_widget(tabs_widget, area);
}
