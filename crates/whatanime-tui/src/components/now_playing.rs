//! NowPlaying component — header pane with the streaming service's track.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use whatanime_proto::state::SessionStatus;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ACCENT, C_ERROR, C_MATCH, C_MUTED, C_PENDING, C_PRIMARY, C_SECONDARY, C_TAG},
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct NowPlaying;

impl NowPlaying {
    pub fn new() -> Self {
        Self
    }

    fn badge(session: &SessionStatus) -> Badge<'static> {
        match session {
            SessionStatus::Active => Badge {
                text: "LIVE",
                color: C_MATCH,
            },
            SessionStatus::Unauthorized => Badge {
                text: "APPROVAL",
                color: C_PENDING,
            },
            SessionStatus::LoginRequired => Badge {
                text: "LOGIN",
                color: C_ACCENT,
            },
            SessionStatus::Fatal(_) => Badge {
                text: "ERR",
                color: C_ERROR,
            },
        }
    }
}

impl Component for NowPlaying {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let banner = &state.view.banner;
        let block = pane_chrome("now playing", focused, Some(Self::badge(&state.view.session)));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::from(Span::styled(
                banner.title.as_str(),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                banner.artists.as_str(),
                Style::default().fg(C_SECONDARY),
            )),
        ];

        match &state.view.session {
            SessionStatus::LoginRequired => lines.push(Line::from(Span::styled(
                format!("log in at {}  (l to reopen)", state.login_url),
                Style::default().fg(C_ACCENT),
            ))),
            SessionStatus::Fatal(reason) => lines.push(Line::from(Span::styled(
                format!("polling stopped: {}", reason),
                Style::default().fg(C_ERROR),
            ))),
            _ => {
                let mut spans = vec![Span::styled(
                    format!("art {}", banner.art_url),
                    Style::default().fg(C_MUTED),
                )];
                if !banner.track_id.is_empty() {
                    spans.push(Span::styled(
                        format!("  spotify:track:{}", banner.track_id),
                        Style::default().fg(C_TAG),
                    ));
                }
                lines.push(Line::from(spans));
            }
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
}
