//! Core of the whatanime client: the wire model, match classification,
//! display settings, list projection, poll-state reducer, the sync loop and
//! the confirm/report gateway.
//!
//! Nothing in here renders anything. The terminal shell in `whatanime-tui`
//! owns a [`state::PollState`] and a [`settings::Settings`], feeds
//! [`sync::SyncMessage`]s into the former and asks [`projection::view`] for a
//! render-ready [`projection::NowPlayingView`].

pub mod anisong;
pub mod backend;
pub mod config;
pub mod gateway;
pub mod platform;
pub mod projection;
pub mod protocol;
pub mod settings;
pub mod state;
pub mod sync;
