//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use whatanime_proto::projection::{self, NowPlayingView};
use whatanime_proto::settings::Settings;
use whatanime_proto::state::PollState;

pub struct AppState {
    pub poll: PollState,
    pub settings: Settings,
    /// Projection of `poll` under `settings`. Rebuilt by [`AppState::reproject`]
    /// after every change to either.
    pub view: NowPlayingView,
    /// Recent log lines for the log bar (newest last).
    pub logs: Vec<String>,
    pub login_url: String,
}

impl AppState {
    pub fn new(settings: Settings, login_url: String) -> Self {
        let poll = PollState::new();
        let view = projection::view(&poll, &settings);
        Self {
            poll,
            settings,
            view,
            logs: Vec::new(),
            login_url,
        }
    }

    pub fn reproject(&mut self) {
        self.view = projection::view(&self.poll, &self.settings);
    }

    pub fn report_open(&self) -> bool {
        self.poll.report_target.is_some()
    }
}
