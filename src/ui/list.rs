// Rendering for the cached conversation widgets.
// Shows loading, empty and populated states for pinned messages, media and stats.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::backend::{ConversationStats, MediaItem, MediaType, PinnedMessage};
use crate::cache::WidgetKind;
use crate::state::WidgetView;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Handle the states shared by every widget. Returns true if something was drawn.
fn render_placeholder<T>(
    frame: &mut Frame,
    area: Rect,
    kind: WidgetKind,
    view: &WidgetView<T>,
    is_empty: bool,
) -> bool {
    if view.resource_id.is_none() {
        render_empty(frame, area, "No conversation selected");
    } else if view.loading {
        render_loading(frame, area, &format!("Loading {}", kind.title().to_lowercase()));
    } else if is_empty {
        render_empty(frame, area, kind.empty_message());
    } else {
        return false;
    }
    true
}

fn highlighted<'a>(list: List<'a>) -> List<'a> {
    list.highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ")
}

/// Render pinned messages.
pub fn render_pinned(
    frame: &mut Frame,
    view: &WidgetView<Vec<PinnedMessage>>,
    state: &mut ListState,
    area: Rect,
) {
    if render_placeholder(frame, area, WidgetKind::Pinned, view, view.data.is_empty()) {
        return;
    }

    let items: Vec<ListItem> = view
        .data
        .iter()
        .map(|message| {
            let sender = message.sender_name.as_deref().unwrap_or("Unknown");
            ListItem::new(Line::from(vec![
                Span::styled(format!("📌 {}: ", sender), Style::default().fg(Color::Cyan)),
                Span::raw(message.content.clone()),
                Span::styled(
                    format!("  {}", format_relative_time(&message.pinned_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = highlighted(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Pinned ")),
    );
    frame.render_stateful_widget(list, area, state);
}

fn media_icon(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Image => "🖼",
        MediaType::Video => "🎞",
        MediaType::File | MediaType::Unknown => "📄",
    }
}

/// Render shared media.
pub fn render_media(
    frame: &mut Frame,
    view: &WidgetView<Vec<MediaItem>>,
    state: &mut ListState,
    area: Rect,
) {
    if render_placeholder(frame, area, WidgetKind::Media, view, view.data.is_empty()) {
        return;
    }

    let items: Vec<ListItem> = view
        .data
        .iter()
        .map(|item| {
            let name = item.file_name.as_deref().unwrap_or(&item.url);
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {}", media_icon(item.media_type), name)),
                Span::styled(
                    format!("  {}", format_relative_time(&item.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = highlighted(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Media ")),
    );
    frame.render_stateful_widget(list, area, state);
}

fn stats_is_empty(stats: &ConversationStats) -> bool {
    stats.message_count == 0 && stats.media_count == 0 && stats.last_activity.is_none()
}

/// Render conversation statistics.
pub fn render_stats(frame: &mut Frame, view: &WidgetView<ConversationStats>, area: Rect) {
    if render_placeholder(frame, area, WidgetKind::Stats, view, stats_is_empty(&view.data)) {
        return;
    }

    let stats = &view.data;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<15}", label), Style::default().fg(Color::Cyan)),
            Span::raw(value),
        ])
    };
    let last_activity = stats
        .last_activity
        .as_ref()
        .map(format_relative_time)
        .unwrap_or_else(|| "never".to_string());

    let text = vec![
        Line::from(""),
        row("Messages", stats.message_count.to_string()),
        row("Members", stats.member_count.to_string()),
        row("Shared media", stats.media_count.to_string()),
        row("Last activity", last_activity),
    ];

    let paragraph =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Stats "));
    frame.render_widget(paragraph, area);
}
