//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - Poll results arrive on a second channel from the sync loop; `App` is the
//!   only writer of `PollState`.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use whatanime_proto::backend::Backend;
use whatanime_proto::gateway;
use whatanime_proto::settings::Settings;
use whatanime_proto::state::{SessionStatus, Transition};
use whatanime_proto::sync::{SyncHandle, SyncMessage};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        anime_list::AnimeList, help_overlay::HelpOverlay, now_playing::NowPlaying,
        report_overlay::ReportOverlay, settings_overlay::SettingsOverlay,
    },
    theme::C_BG,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    /// A confirm request finished; `Err` carries the reason.
    ConfirmDone(Result<(), String>),
    ReportDone(Result<(), String>),
}

pub struct App<B: Backend> {
    backend: Arc<B>,
    sync: SyncHandle,
    state: AppState,
    open_browser_on_login: bool,

    now_playing: NowPlaying,
    anime_list: AnimeList,
    settings_overlay: SettingsOverlay,
    report_overlay: ReportOverlay,
    help_overlay: HelpOverlay,
    toasts: ToastManager,

    msg_tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,
}

impl<B: Backend> App<B> {
    pub fn new(
        backend: Arc<B>,
        sync: SyncHandle,
        settings: Settings,
        open_browser_on_login: bool,
    ) -> Self {
        let login_url = backend.login_url();
        Self {
            backend,
            sync,
            state: AppState::new(settings, login_url),
            open_browser_on_login,
            now_playing: NowPlaying::new(),
            anime_list: AnimeList::new(),
            settings_overlay: SettingsOverlay::new(),
            report_overlay: ReportOverlay::new(),
            help_overlay: HelpOverlay::new(),
            toasts: ToastManager::new(),
            msg_tx: None,
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut sync_rx: mpsc::Receiver<SyncMessage>) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.msg_tx = Some(tx.clone());
        self.push_log("whatanime started".to_string());

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry and component maintenance.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut sync_open = true;
        let result: anyhow::Result<()> = loop {
            if let Err(e) = terminal.draw(|f| self.draw(f)) {
                break Err(e.into());
            }
            if self.should_quit {
                break Ok(());
            }

            tokio::select! {
                Some(msg) = rx.recv() => self.handle_message(msg),
                msg = sync_rx.recv(), if sync_open => match msg {
                    Some(msg) => self.on_sync_message(msg),
                    None => {
                        debug!("sync channel closed");
                        sync_open = false;
                    }
                },
                _ = ui_tick.tick() => {
                    self.toasts.tick();
                    let actions = self.anime_list.tick(&self.state);
                    for action in actions {
                        self.dispatch(action);
                    }
                }
            }
        };

        // ── Cleanup ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("whatanime exiting");
        result
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::ConfirmDone(Ok(())) => {
                self.toasts.success("anime confirmed");
                self.push_log("confirmed, refreshing".to_string());
            }
            AppMessage::ConfirmDone(Err(e)) => {
                self.push_log(format!("confirm failed: {}", e));
            }
            AppMessage::ReportDone(Ok(())) => {
                self.toasts.success("report sent");
                self.push_log("report sent".to_string());
            }
            AppMessage::ReportDone(Err(e)) => {
                self.push_log(format!("report failed: {}", e));
            }
        }
    }

    fn on_sync_message(&mut self, msg: SyncMessage) {
        match msg {
            SyncMessage::Update { seq, update } => {
                match self.state.poll.apply(seq, update) {
                    Transition::Unchanged => return,
                    Transition::Stale => {
                        debug!("dropped stale poll #{}", seq);
                        return;
                    }
                    Transition::Changed => {
                        if self.state.poll.session == SessionStatus::Unauthorized {
                            self.push_log("waiting for streaming API approval".to_string());
                        } else if let Some(song) = &self.state.poll.current {
                            let name = song.song_info.name.clone();
                            self.push_log(format!("now playing: {}", name));
                        }
                    }
                    Transition::LoginRequired => {
                        self.push_log("login required, polling stopped".to_string());
                        if self.open_browser_on_login {
                            self.open_login();
                        }
                    }
                }
            }
            SyncMessage::Fatal(e) => {
                self.state.poll.apply_fatal(&e);
                self.toasts.error("polling stopped");
                self.push_log(format!("fatal: {}", e));
            }
        }
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.state.reproject();
        self.anime_list.sync_rows(&self.state);
    }

    fn input_mode(&self) -> InputMode {
        if self.state.report_open() {
            InputMode::Report
        } else if self.state.poll.settings_open {
            InputMode::Settings
        } else {
            InputMode::Normal
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Text entry captures everything else.
        if self.state.report_open() {
            return self.report_overlay.handle_key(key, &self.state);
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if self.state.poll.settings_open {
            return self.settings_overlay.handle_key(key, &self.state);
        }

        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('s') => return vec![Action::ToggleSettings],
            KeyCode::Char('R') => return vec![Action::Refresh],
            KeyCode::Char('l') => return vec![Action::OpenLogin],
            _ => {}
        }

        self.anime_list.handle_key(key, &self.state)
    }

    fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.anime_list.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Depth-limited to one level.
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Backend ───────────────────────────────────────────────────────
            Action::Confirm(song_id) => {
                let track_id = self.state.view.banner.track_id.clone();
                if track_id.is_empty() {
                    self.toasts.warning("nothing playing to confirm against");
                    return;
                }
                self.push_log(format!("confirming song {}…", song_id.0));
                let backend = Arc::clone(&self.backend);
                let sync = self.sync.clone();
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result = gateway::confirm_binding(backend.as_ref(), &sync, song_id, track_id)
                        .await
                        .map_err(|e| e.to_string());
                    if let Some(tx) = tx {
                        let _ = tx.send(AppMessage::ConfirmDone(result)).await;
                    }
                });
            }
            Action::Refresh => {
                if self.sync.is_stopped() {
                    self.toasts.warning("polling has stopped");
                } else {
                    self.sync.refresh();
                    self.toasts.info("refreshing");
                }
            }
            Action::OpenLogin => self.open_login(),

            // ── Report dialog ─────────────────────────────────────────────────
            Action::OpenReport(ann_song_id) => {
                self.state.poll.open_report(ann_song_id);
            }
            Action::CloseReport => {
                self.state.poll.close_report();
            }
            Action::SubmitReport(message) => {
                let ann_song_id = self
                    .state
                    .poll
                    .report_target
                    .and_then(|t| t.ann_song_id);
                self.state.poll.close_report();
                let track_id = self.state.view.banner.track_id.clone();
                let backend = Arc::clone(&self.backend);
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let result =
                        gateway::submit_report(backend.as_ref(), &track_id, ann_song_id, message)
                            .await
                            .map_err(|e| e.to_string());
                    if let Some(tx) = tx {
                        let _ = tx.send(AppMessage::ReportDone(result)).await;
                    }
                });
            }

            // ── Settings ──────────────────────────────────────────────────────
            Action::ToggleSettings => {
                self.state.poll.toggle_settings();
            }
            Action::UpdateSettings(field) => {
                self.state.settings = self.state.settings.update(field);
                self.refresh_view();
            }

            // ── UI toggles ────────────────────────────────────────────────────
            // Visibility lives in the overlay; see `dispatch`.
            Action::ToggleHelp => {}

            // ── System ────────────────────────────────────────────────────────
            Action::Toast(msg) => self.toasts.info(msg),
            Action::Quit => self.should_quit = true,
        }
    }

    fn open_login(&mut self) {
        let url = self.state.login_url.clone();
        match open::that_detached(&url) {
            Ok(()) => self.push_log(format!("opened {}", url)),
            Err(e) => {
                warn!("failed to open browser: {}", e);
                self.push_log(format!("open {} in a browser to log in", url));
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let list_focused = self.focused() == self.anime_list.id();

        self.now_playing.draw(frame, outer[0], false, &self.state);
        self.anime_list.draw(frame, outer[1], list_focused, &self.state);
        status_bar::draw_log_bar(
            frame,
            outer[2],
            self.state.logs.last().map(String::as_str),
            &self.state.poll.session,
        );
        status_bar::draw_keys_bar(frame, outer[3], self.input_mode());

        // Overlays on top, most modal last.
        self.settings_overlay.draw(frame, area, true, &self.state);
        self.help_overlay.draw(frame, area, true, &self.state);
        self.report_overlay.draw(frame, area, true, &self.state);
        self.toasts.draw(frame, area);
    }

    fn push_log(&mut self, msg: String) {
        let stamped = format!("{} {}", chrono::Local::now().format("%H:%M:%S"), msg);
        self.state.logs.push(stamped);
        if self.state.logs.len() > 500 {
            self.state.logs.remove(0);
        }
    }

    fn focused(&self) -> ComponentId {
        if self.state.report_open() {
            ComponentId::ReportOverlay
        } else if self.help_overlay.visible {
            ComponentId::HelpOverlay
        } else if self.state.poll.settings_open {
            ComponentId::SettingsOverlay
        } else {
            ComponentId::AnimeList
        }
    }
}
