//! Status bar — bottom lines with session state, last log line and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use whatanime_proto::state::SessionStatus;

use crate::theme::{C_ACCENT, C_ERROR, C_MATCH, C_MUTED, C_PENDING, C_SECONDARY};

/// Which keymap is active; decides the hint text in the keys bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Settings,
    Report,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NOW PLAYING",
            Self::Settings => "SETTINGS",
            Self::Report => "REPORT",
        }
    }

    fn keys(self) -> &'static str {
        match self {
            Self::Normal => {
                " ↑↓/jk select  Enter details  c confirm  r report  s settings  R refresh  l login  ? help  q quit"
            }
            Self::Settings => " 1/2/3 openings/endings/inserts  e/j language  o romanize  Esc close",
            Self::Report => " type a reason  Enter send  Esc cancel",
        }
    }
}

fn session_span(session: &SessionStatus) -> Span<'static> {
    match session {
        SessionStatus::Active => Span::styled("●", Style::default().fg(C_MATCH)),
        SessionStatus::Unauthorized => Span::styled("◐", Style::default().fg(C_PENDING)),
        SessionStatus::LoginRequired => Span::styled("○", Style::default().fg(C_ACCENT)),
        SessionStatus::Fatal(_) => Span::styled("✗", Style::default().fg(C_ERROR)),
    }
}

/// Draw the log bar: session marker plus the last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, session: &SessionStatus) {
    let log_span = Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY));
    let line = Line::from(vec![session_span(session), Span::raw(" "), log_span]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(mode.keys(), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
