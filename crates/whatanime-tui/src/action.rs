//! Action enum — all user-initiated intents and internal events.

use whatanime_proto::anisong::{SongAnnId, SongId};
use whatanime_proto::settings::SettingsField;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    NowPlaying,
    AnimeList,
    SettingsOverlay,
    ReportOverlay,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Backend ──────────────────────────────────────────────────────────────
    /// Bind the selected entry's song to the playing track.
    Confirm(SongId),
    Refresh,
    OpenLogin,

    // ── Report dialog ────────────────────────────────────────────────────────
    OpenReport(Option<SongAnnId>),
    SubmitReport(String),
    CloseReport,

    // ── Settings ─────────────────────────────────────────────────────────────
    ToggleSettings,
    UpdateSettings(SettingsField),

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    Toast(String),
    Quit,
}
