//! ReportOverlay — free-text report about the playing track or a listed entry.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use unicode_width::UnicodeWidthChar;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_input, C_MUTED, C_SECONDARY},
    widgets::popup::{centered_rect, popup_block},
};

const PLACEHOLDER: &str = "What is the reason for the report?";

pub struct ReportOverlay {
    input: Input,
}

impl ReportOverlay {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
        }
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }
}

impl Component for ReportOverlay {
    fn id(&self) -> ComponentId {
        ComponentId::ReportOverlay
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !state.report_open() {
            return vec![];
        }
        match key.code {
            KeyCode::Esc => {
                self.input.reset();
                vec![Action::CloseReport]
            }
            KeyCode::Enter => {
                // The dialog closes and forgets its text whatever the backend says.
                let message = self.input.value().to_string();
                self.input.reset();
                vec![Action::SubmitReport(message)]
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                vec![]
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let Some(target) = state.poll.report_target else {
            return;
        };
        let popup = centered_rect(60, 9, area);
        let block = popup_block("report issue");
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let subject = match target.ann_song_id {
            Some(id) => format!(" {} · anisong #{}", state.view.banner.title, id.0),
            None => format!(" {}", state.view.banner.title),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(subject, Style::default().fg(C_SECONDARY)))
                .wrap(Wrap { trim: true }),
            rows[0],
        );

        let width = rows[1].width.saturating_sub(2) as usize;
        let scroll = self.input.visual_scroll(width);
        let value = self.text();
        let shown = if value.is_empty() {
            Span::styled(format!(" {}", PLACEHOLDER), Style::default().fg(C_MUTED))
        } else {
            Span::styled(format!(" {}", &value[byte_offset(value, scroll)..]), style_input())
        };
        frame.render_widget(Paragraph::new(Line::from(shown)).style(style_input()), rows[1]);
        let cursor_x = rows[1].x + 1 + (self.input.visual_cursor() - scroll) as u16;
        frame.set_cursor_position((cursor_x.min(rows[1].right().saturating_sub(1)), rows[1].y));

        frame.render_widget(
            Paragraph::new(Span::styled(
                " enter send · esc cancel",
                Style::default().fg(C_MUTED),
            )),
            rows[3],
        );
    }
}

/// Byte index of the first character past `columns` display columns,
/// clamped to the end.
fn byte_offset(s: &str, columns: usize) -> usize {
    let mut width = 0;
    for (i, c) in s.char_indices() {
        if width >= columns {
            return i;
        }
        width += c.width().unwrap_or(0);
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use whatanime_proto::anisong::SongAnnId;
    use whatanime_proto::settings::Settings;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn open_state() -> AppState {
        let mut state = AppState::new(Settings::default(), String::new());
        state.poll.open_report(Some(SongAnnId(3)));
        state
    }

    #[test]
    fn test_submit_sends_text_and_clears() {
        let state = open_state();
        let mut overlay = ReportOverlay::new();
        for c in "wrong op".chars() {
            assert!(overlay.handle_key(press(KeyCode::Char(c)), &state).is_empty());
        }
        assert_eq!(overlay.text(), "wrong op");

        let actions = overlay.handle_key(press(KeyCode::Enter), &state);
        assert_eq!(actions, vec![Action::SubmitReport("wrong op".to_string())]);
        assert_eq!(overlay.text(), "");
    }

    #[test]
    fn test_escape_cancels_and_clears() {
        let state = open_state();
        let mut overlay = ReportOverlay::new();
        overlay.handle_key(press(KeyCode::Char('x')), &state);
        assert_eq!(overlay.handle_key(press(KeyCode::Esc), &state), vec![Action::CloseReport]);
        assert_eq!(overlay.text(), "");
    }

    #[test]
    fn test_q_is_text_not_quit() {
        let state = open_state();
        let mut overlay = ReportOverlay::new();
        overlay.handle_key(press(KeyCode::Char('q')), &state);
        assert_eq!(overlay.text(), "q");
    }

    #[test]
    fn test_byte_offset_counts_display_columns() {
        // Wide characters take two columns each.
        assert_eq!(byte_offset("あいう", 2), 3);
        assert_eq!(byte_offset("あいう", 4), 6);
        assert_eq!(byte_offset("aあb", 3), 4);
        assert_eq!(byte_offset("abc", 1), 1);
        assert_eq!(byte_offset("abc", 5), 3);
    }
}
