//! HelpOverlay component — centered popup with keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PRIMARY},
    widgets::popup::{centered_rect, key_row, popup_block},
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        format!(" {}", title),
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

impl Component for HelpOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::HelpOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // Consume all keys while overlay is open
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.toggle();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }
        let popup = centered_rect(64, 24, area);

        let lines = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section("anime list"),
            key_row("↑ / ↓  or  j / k", "move selection (Shift = 5 rows)"),
            key_row("pg up / pg dn", "jump 10 rows"),
            key_row("home / end  or  g / G", "jump first / last"),
            key_row("enter", "show / hide entry details"),
            key_row("c", "confirm selected anime for this track"),
            key_row("r", "report an issue with this track"),
            Line::from(""),
            section("session"),
            key_row("R", "poll the backend now"),
            key_row("l", "open the login page in a browser"),
            key_row("s", "display settings"),
            Line::from(""),
            section("app"),
            key_row("?", "toggle this help"),
            key_row("q  or  ctrl-c", "quit"),
            Line::from(""),
            Line::from(Span::styled(
                " press ? or esc to close",
                Style::default().fg(C_MUTED),
            )),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(popup_block("help")), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use whatanime_proto::settings::Settings;

    #[test]
    fn test_open_overlay_swallows_keys_and_closes_on_escape() {
        let state = AppState::new(Settings::default(), String::new());
        let mut help = HelpOverlay::new();
        help.on_action(&Action::ToggleHelp, &state);
        assert!(help.visible);

        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(help.handle_key(key(KeyCode::Char('c')), &state).is_empty());
        assert_eq!(help.handle_key(key(KeyCode::Esc), &state), vec![Action::ToggleHelp]);
    }
}
