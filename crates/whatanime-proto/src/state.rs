//! The client-side state container and its transitions.
//!
//! [`PollState`] is owned by the UI shell and is the only place classified
//! poll results land. Rendering reads it through [`crate::projection::view`].

use crate::anisong::SongAnnId;
use crate::protocol::{ClassifyError, PlaybackUpdate, SongUpdate};

/// Session as far as the client can tell from poll responses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Active,
    /// Logged in but not approved for the streaming service's API.
    Unauthorized,
    /// The backend has no session; the user must log in externally.
    LoginRequired,
    /// The backend sent something this client does not understand.
    /// Polling has stopped.
    Fatal(String),
}

impl SessionStatus {
    /// Whether polling has stopped for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LoginRequired | Self::Fatal(_))
    }
}

/// Song the open report dialog points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTarget {
    pub ann_song_id: Option<SongAnnId>,
}

/// What [`PollState::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No-op update; nothing visible changed.
    Unchanged,
    /// A state-changing update older than one already applied was dropped.
    Stale,
    Changed,
    /// Transitioned into [`SessionStatus::LoginRequired`]. The shell should
    /// send the user to the login page.
    LoginRequired,
}

#[derive(Debug, Clone, Default)]
pub struct PollState {
    /// Last classified song. `None` until the first `NewSong` arrives, and
    /// again after an `Unauthorized` response.
    pub current: Option<SongUpdate>,
    pub session: SessionStatus,
    pub report_target: Option<ReportTarget>,
    pub settings_open: bool,
    /// Sequence number of the last applied state-changing response.
    pub last_applied_seq: Option<u64>,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one classified poll result into the state.
    ///
    /// `NotPlaying` and `NoUpdate` leave everything untouched. Any other
    /// update carrying a `seq` at or below the last applied one is ignored,
    /// so a slow automatic poll can never overwrite a newer forced refresh.
    ///
    /// `LoginRequired` is the exception: the sync loop has already stopped
    /// when it is sent, so it applies whatever its `seq`. Once the session
    /// is terminal nothing else applies.
    pub fn apply(&mut self, seq: u64, update: PlaybackUpdate) -> Transition {
        if update.is_noop() || self.session.is_terminal() {
            return Transition::Unchanged;
        }
        if matches!(update, PlaybackUpdate::LoginRequired) {
            self.last_applied_seq = Some(self.last_applied_seq.map_or(seq, |last| last.max(seq)));
            self.session = SessionStatus::LoginRequired;
            return Transition::LoginRequired;
        }
        if self.last_applied_seq.is_some_and(|last| seq <= last) {
            return Transition::Stale;
        }
        self.last_applied_seq = Some(seq);

        match update {
            PlaybackUpdate::NewSong(song) => {
                self.current = Some(song);
                self.session = SessionStatus::Active;
                Transition::Changed
            }
            PlaybackUpdate::Unauthorized => {
                self.current = None;
                self.session = SessionStatus::Unauthorized;
                Transition::Changed
            }
            PlaybackUpdate::LoginRequired
            | PlaybackUpdate::NotPlaying
            | PlaybackUpdate::NoUpdate => Transition::Unchanged,
        }
    }

    pub fn apply_fatal(&mut self, err: &ClassifyError) {
        self.session = SessionStatus::Fatal(err.to_string());
    }

    pub fn open_report(&mut self, ann_song_id: Option<SongAnnId>) {
        self.report_target = Some(ReportTarget { ann_song_id });
    }

    pub fn close_report(&mut self) {
        self.report_target = None;
    }

    pub fn toggle_settings(&mut self) {
        self.settings_open = !self.settings_open;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{AnisongResult, Certainty, Hit, SongInfo};

    fn hit_song(certainty: i64) -> SongUpdate {
        SongUpdate {
            song_info: SongInfo {
                name: "Sparkle".to_string(),
                ..Default::default()
            },
            anisongs: AnisongResult::Hit(Hit {
                matches: vec![],
                also_by_artist: vec![],
                certainty: Certainty::new(certainty),
            }),
        }
    }

    #[test]
    fn test_not_playing_retains_previous_hit() {
        let mut state = PollState::new();
        assert_eq!(
            state.apply(1, PlaybackUpdate::NewSong(hit_song(80))),
            Transition::Changed
        );
        assert_eq!(state.apply(2, PlaybackUpdate::NotPlaying), Transition::Unchanged);
        assert_eq!(state.apply(3, PlaybackUpdate::NoUpdate), Transition::Unchanged);
        assert_eq!(state.current, Some(hit_song(80)));
        assert_eq!(state.last_applied_seq, Some(1));
    }

    #[test]
    fn test_older_response_does_not_overwrite_newer() {
        let mut state = PollState::new();
        state.apply(5, PlaybackUpdate::NewSong(hit_song(100)));
        assert_eq!(
            state.apply(4, PlaybackUpdate::NewSong(hit_song(10))),
            Transition::Stale
        );
        assert_eq!(state.current, Some(hit_song(100)));
    }

    #[test]
    fn test_unauthorized_clears_song_and_new_song_recovers() {
        let mut state = PollState::new();
        state.apply(1, PlaybackUpdate::NewSong(hit_song(50)));
        state.apply(2, PlaybackUpdate::Unauthorized);
        assert_eq!(state.session, SessionStatus::Unauthorized);
        assert!(state.current.is_none());
        state.apply(3, PlaybackUpdate::NewSong(hit_song(50)));
        assert_eq!(state.session, SessionStatus::Active);
    }

    #[test]
    fn test_login_required_is_terminal() {
        let mut state = PollState::new();
        assert_eq!(
            state.apply(1, PlaybackUpdate::LoginRequired),
            Transition::LoginRequired
        );
        assert!(state.session.is_terminal());
    }

    #[test]
    fn test_late_login_required_still_applies() {
        let mut state = PollState::new();
        state.apply(3, PlaybackUpdate::NewSong(hit_song(90)));
        assert_eq!(
            state.apply(2, PlaybackUpdate::LoginRequired),
            Transition::LoginRequired
        );
        assert_eq!(state.session, SessionStatus::LoginRequired);
        assert_eq!(state.last_applied_seq, Some(3));

        // Terminal: nothing brings the session back.
        assert_eq!(
            state.apply(4, PlaybackUpdate::NewSong(hit_song(90))),
            Transition::Unchanged
        );
        assert_eq!(state.session, SessionStatus::LoginRequired);
    }

    #[test]
    fn test_fatal_and_dialogs() {
        let mut state = PollState::new();
        state.apply_fatal(&ClassifyError::UnknownSentinel("paused".into()));
        assert!(matches!(state.session, SessionStatus::Fatal(ref m) if m.contains("paused")));

        state.open_report(Some(SongAnnId(12)));
        assert_eq!(state.report_target.and_then(|t| t.ann_song_id), Some(SongAnnId(12)));
        state.close_report();
        assert!(state.report_target.is_none());

        state.toggle_settings();
        assert!(state.settings_open);
        state.toggle_settings();
        assert!(!state.settings_open);
    }
}
