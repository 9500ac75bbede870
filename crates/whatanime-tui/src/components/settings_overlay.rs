//! SettingsOverlay — popup with the display toggles.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use whatanime_proto::anisong::TrackCategory;
use whatanime_proto::settings::{Language, SettingsField};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_heading, C_MATCH, C_MUTED},
    widgets::popup::{centered_rect, key_row, popup_block},
};

pub struct SettingsOverlay;

impl SettingsOverlay {
    pub fn new() -> Self {
        Self
    }
}

fn check(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

impl Component for SettingsOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::SettingsOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !state.poll.settings_open {
            return vec![];
        }
        let field = match key.code {
            KeyCode::Char('1') => SettingsField::ToggleCategory(TrackCategory::Opening),
            KeyCode::Char('2') => SettingsField::ToggleCategory(TrackCategory::Ending),
            KeyCode::Char('3') => SettingsField::ToggleCategory(TrackCategory::Insert),
            KeyCode::Char('e') => SettingsField::Language(Language::English),
            KeyCode::Char('j') => SettingsField::Language(Language::Japanese),
            KeyCode::Char('o') => SettingsField::ToggleRomanize,
            KeyCode::Char('s') | KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
                return vec![Action::ToggleSettings];
            }
            _ => return vec![],
        };
        vec![Action::UpdateSettings(field)]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !state.poll.settings_open {
            return;
        }
        let s = &state.settings;
        let popup = centered_rect(50, 14, area);

        let lines = vec![
            Line::from(Span::styled(" visible tracks", style_heading())),
            key_row("1", format!("{} openings", check(s.show_openings))),
            key_row("2", format!("{} endings", check(s.show_endings))),
            key_row("3", format!("{} insert songs", check(s.show_inserts))),
            Line::from(""),
            Line::from(Span::styled(" titles", style_heading())),
            key_row("e / j", format!("anime names in {}", s.language.label())),
            key_row("o", format!("{} romanize song info", check(s.romanize))),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    " showing {} of {} entries",
                    state.view.row_count(),
                    state
                        .poll
                        .current
                        .as_ref()
                        .map_or(0, |c| c.anisongs.binding_count())
                ),
                Style::default().fg(C_MATCH),
            )),
            Line::from(""),
            Line::from(Span::styled(" press s or esc to close", Style::default().fg(C_MUTED))),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(popup_block("settings")), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use whatanime_proto::settings::Settings;

    #[test]
    fn test_keys_map_to_settings_fields() {
        let mut state = AppState::new(Settings::default(), String::new());
        state.poll.toggle_settings();
        let mut overlay = SettingsOverlay::new();
        let press = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);

        assert_eq!(
            overlay.handle_key(press('3'), &state),
            vec![Action::UpdateSettings(SettingsField::ToggleCategory(
                TrackCategory::Insert
            ))]
        );
        assert_eq!(
            overlay.handle_key(press('j'), &state),
            vec![Action::UpdateSettings(SettingsField::Language(Language::Japanese))]
        );
        assert_eq!(overlay.handle_key(press('s'), &state), vec![Action::ToggleSettings]);
    }

    #[test]
    fn test_closed_overlay_ignores_keys() {
        let state = AppState::new(Settings::default(), String::new());
        let mut overlay = SettingsOverlay::new();
        let key = KeyEvent::new(KeyCode::Char('1'), KeyModifiers::NONE);
        assert!(overlay.handle_key(key, &state).is_empty());
    }
}
