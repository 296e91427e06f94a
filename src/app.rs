// App state and main event loop.
// Owns the conversation widgets, applies background refreshes and handles keys.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::backend::{BackendClient, ConversationStats, MediaItem, PinnedMessage};
use crate::cache::{KeyValueStore, WidgetKind};
use crate::config::Config;
use crate::state::{
    CachedWidget, DateIndex, DateStrip, Refresh, RefreshResult, ResourceSource, ScrollEvent,
    StripViewport, WidgetData,
};
use crate::ui;

/// Active tab in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Pinned,
    Media,
    Stats,
    Schedule,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Pinned, Tab::Media, Tab::Stats, Tab::Schedule];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Pinned => WidgetKind::Pinned.title(),
            Tab::Media => WidgetKind::Media.title(),
            Tab::Stats => WidgetKind::Stats.title(),
            Tab::Schedule => "Schedule",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Pinned => Tab::Media,
            Tab::Media => Tab::Stats,
            Tab::Stats => Tab::Schedule,
            Tab::Schedule => Tab::Pinned,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Tab::Pinned => Tab::Schedule,
            Tab::Media => Tab::Pinned,
            Tab::Stats => Tab::Media,
            Tab::Schedule => Tab::Stats,
        }
    }
}

/// A finished refresh on its way back to the event loop.
#[derive(Debug)]
pub enum WidgetUpdate {
    Pinned(RefreshResult<Vec<PinnedMessage>>),
    Media(RefreshResult<Vec<MediaItem>>),
    Stats(RefreshResult<ConversationStats>),
}

/// Main application state.
pub struct App {
    /// Currently active tab.
    pub active_tab: Tab,
    /// Conversation the widgets are showing.
    pub conversation_id: Option<String>,
    pub pinned: CachedWidget<Vec<PinnedMessage>, BackendClient>,
    pub pinned_list: ListState,
    pub media: CachedWidget<Vec<MediaItem>, BackendClient>,
    pub media_list: ListState,
    pub stats: CachedWidget<ConversationStats, BackendClient>,
    pub schedule: DateStrip,
    pub viewport: StripViewport,
    /// Last status line message.
    pub status: Option<String>,
    /// Whether the app should exit.
    pub should_quit: bool,
    runtime: Handle,
    updates_tx: UnboundedSender<WidgetUpdate>,
    updates_rx: UnboundedReceiver<WidgetUpdate>,
}

impl App {
    pub fn new(
        config: &Config,
        client: Arc<BackendClient>,
        store: Arc<dyn KeyValueStore>,
        runtime: Handle,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let index = DateIndex::today();

        Self {
            active_tab: Tab::default(),
            conversation_id: config.conversation_id.clone(),
            pinned: CachedWidget::new(WidgetKind::Pinned, client.clone(), store.clone())
                .with_ttl(config.cache_ttl),
            pinned_list: ListState::default(),
            media: CachedWidget::new(WidgetKind::Media, client.clone(), store.clone())
                .with_ttl(config.cache_ttl),
            media_list: ListState::default(),
            stats: CachedWidget::new(WidgetKind::Stats, client, store).with_ttl(config.cache_ttl),
            schedule: DateStrip::new(index).with_on_select(|day| {
                tracing::info!(%day, "schedule day selected");
            }),
            viewport: StripViewport::new(index.total()),
            status: None,
            should_quit: false,
            runtime,
            updates_tx,
            updates_rx,
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        self.load_conversation();

        while !self.should_quit {
            self.drain_updates();
            if let Some(event) = self.schedule.tick(Instant::now(), &mut self.viewport) {
                self.on_scroll_event(event);
            }
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_events()?;
        }
        Ok(())
    }

    /// Point every widget at the current conversation and start refreshes.
    pub fn load_conversation(&mut self) {
        let Some(id) = self.conversation_id.clone() else {
            self.status = Some("No conversation selected".to_string());
            return;
        };

        let refresh = self.pinned.load(&id).into_refresh();
        self.spawn_refresh(refresh, WidgetUpdate::Pinned);
        let refresh = self.media.load(&id).into_refresh();
        self.spawn_refresh(refresh, WidgetUpdate::Media);
        let refresh = self.stats.load(&id).into_refresh();
        self.spawn_refresh(refresh, WidgetUpdate::Stats);

        self.reset_selection();
    }

    /// Force a refresh of the widget on the active tab.
    pub fn refresh_active(&mut self) {
        match self.active_tab {
            Tab::Pinned => {
                let refresh = self.pinned.refresh();
                self.spawn_refresh(refresh, WidgetUpdate::Pinned);
            }
            Tab::Media => {
                let refresh = self.media.refresh();
                self.spawn_refresh(refresh, WidgetUpdate::Media);
            }
            Tab::Stats => {
                let refresh = self.stats.refresh();
                self.spawn_refresh(refresh, WidgetUpdate::Stats);
            }
            Tab::Schedule => {}
        }
    }

    fn spawn_refresh<T, S>(
        &self,
        refresh: Option<Refresh<T, S>>,
        wrap: fn(RefreshResult<T>) -> WidgetUpdate,
    ) where
        T: WidgetData,
        S: ResourceSource<T>,
    {
        let Some(refresh) = refresh else {
            return;
        };
        let tx = self.updates_tx.clone();
        self.runtime.spawn(async move {
            // Receiver is gone once the app has exited
            let _ = tx.send(wrap(refresh.run().await));
        });
    }

    /// Apply every refresh that finished since the last frame.
    pub fn drain_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply_update(update);
        }
    }

    pub fn apply_update(&mut self, update: WidgetUpdate) {
        match update {
            WidgetUpdate::Pinned(result) => {
                if self.pinned.apply(result) {
                    reset_list(&mut self.pinned_list, self.pinned.data().len());
                }
            }
            WidgetUpdate::Media(result) => {
                if self.media.apply(result) {
                    reset_list(&mut self.media_list, self.media.data().len());
                }
            }
            WidgetUpdate::Stats(result) => {
                self.stats.apply(result);
            }
        }
    }

    fn reset_selection(&mut self) {
        reset_list(&mut self.pinned_list, self.pinned.data().len());
        reset_list(&mut self.media_list, self.media.data().len());
    }

    fn on_scroll_event(&mut self, event: ScrollEvent) {
        if let ScrollEvent::GaveUp(index) = event {
            self.status = Some(format!("Could not scroll schedule to item {}", index));
        }
    }

    /// Poll faster while a scroll retry is pending.
    fn poll_timeout(&self) -> Duration {
        if self.schedule.scroll().is_idle() {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(20)
        }
    }

    /// Handle keyboard and other events.
    #[allow(clippy::collapsible_if)]
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(self.poll_timeout())? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.active_tab = self.active_tab.next(),
            KeyCode::BackTab => self.active_tab = self.active_tab.prev(),
            KeyCode::Char('r') => self.refresh_active(),
            _ => match self.active_tab {
                Tab::Pinned => {
                    let len = self.pinned.data().len();
                    move_selection(&mut self.pinned_list, len, code);
                }
                Tab::Media => {
                    let len = self.media.data().len();
                    move_selection(&mut self.media_list, len, code);
                }
                Tab::Stats => {}
                Tab::Schedule => self.handle_schedule_key(code),
            },
        }
    }

    fn handle_schedule_key(&mut self, code: KeyCode) {
        let now = Instant::now();
        let result = match code {
            KeyCode::Left | KeyCode::Char('h') => self.schedule.step(-1, now),
            KeyCode::Right | KeyCode::Char('l') => self.schedule.step(1, now),
            KeyCode::PageUp => self.schedule.step(-7, now),
            KeyCode::PageDown => self.schedule.step(7, now),
            KeyCode::Char('t') => self.schedule.jump_to_today(now),
            _ => return,
        };

        self.status = Some(match result {
            Ok(day) => day.format("%A, %B %-d %Y").to_string(),
            Err(e) => e.to_string(),
        });
    }
}

fn reset_list(list: &mut ListState, len: usize) {
    list.select(if len == 0 { None } else { Some(0) });
}

fn move_selection(list: &mut ListState, len: usize, code: KeyCode) {
    if len == 0 {
        return;
    }
    let i = match (code, list.selected()) {
        (KeyCode::Down | KeyCode::Char('j'), Some(i)) => (i + 1).min(len - 1),
        (KeyCode::Up | KeyCode::Char('k'), Some(i)) => i.saturating_sub(1),
        (KeyCode::Down | KeyCode::Char('j') | KeyCode::Up | KeyCode::Char('k'), None) => 0,
        _ => return,
    };
    list.select(Some(i));
}
