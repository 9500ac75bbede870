//! AnimeList component — the labelled groups of candidate anime.
//!
//! Rows come pre-filtered and pre-sorted from the projection; this component
//! only tracks selection, the expanded entry and scrolling.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use whatanime_proto::anisong::TrackCategory;
use whatanime_proto::projection::{DisplayRow, GroupLabel};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_heading, style_muted, style_selected, C_MATCH, C_MUTED, C_PENDING, C_PRIMARY,
        C_SEASON, C_SECONDARY, C_TAG,
    },
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

#[derive(Debug, Clone, PartialEq)]
struct ListRow {
    group: usize,
    row: DisplayRow,
}

impl ListRow {
    fn same_entry(&self, other: &ListRow) -> bool {
        self.row.song_ann_id == other.row.song_ann_id
            && self.row.title == other.row.title
            && self.row.track_label == other.row.track_label
    }
}

pub struct AnimeList {
    list: ScrollableList<ListRow>,
    expanded: bool,
}

impl AnimeList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            expanded: false,
        }
    }

    /// Pick up a new projection, keeping the selected entry when it survives.
    pub fn sync_rows(&mut self, state: &AppState) {
        let rows: Vec<ListRow> = state
            .view
            .groups
            .iter()
            .enumerate()
            .flat_map(|(group, g)| {
                g.rows.iter().map(move |row| ListRow {
                    group,
                    row: row.clone(),
                })
            })
            .collect();
        let previous = self.list.selected_item().cloned();
        self.list
            .set_items(rows, |r| previous.as_ref().is_some_and(|p| p.same_entry(r)));
        if self.list.is_empty() {
            self.expanded = false;
        }
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.list.selected_item().map(|r| &r.row)
    }

    fn empty_message(state: &AppState) -> &'static str {
        if state.poll.current.is_none() {
            "  waiting for something to play…"
        } else if !TrackCategory::ALL.iter().any(|c| state.settings.shows(*c)) {
            "  every track category is hidden (s to change)"
        } else {
            "  no anime found for this track"
        }
    }

    fn heading_color(label: GroupLabel) -> Color {
        match label {
            GroupLabel::Match(_) => C_MATCH,
            GroupLabel::MoreByArtists => C_TAG,
            GroupLabel::PossibleMatches => C_PENDING,
        }
    }

    fn row_line(row: &DisplayRow, selected: bool) -> Line<'static> {
        let base = if selected {
            style_selected()
        } else {
            Style::default().fg(C_PRIMARY)
        };
        let mut spans = vec![
            Span::styled(if selected { " ▸ " } else { "   " }, base),
            Span::styled(row.title.clone(), base),
            Span::styled(format!("  {}", row.track_label), Style::default().fg(C_SEASON)),
        ];
        if let Some(index) = &row.anime_index {
            spans.push(Span::styled(format!("  {}", index), style_muted()));
        }
        if !row.song_name.is_empty() {
            spans.push(Span::styled(
                format!("  ♪ {}", row.song_name),
                Style::default().fg(C_SECONDARY),
            ));
        }
        Line::from(spans)
    }

    fn detail_lines(row: &DisplayRow) -> Vec<Line<'static>> {
        row.detail_lines()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("      {:<10}", label), style_muted()),
                    Span::styled(value, Style::default().fg(C_SECONDARY)),
                ])
            })
            .collect()
    }
}

impl Component for AnimeList {
    fn id(&self) -> ComponentId {
        ComponentId::AnimeList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => {
                if !self.list.is_empty() {
                    self.expanded = !self.expanded;
                }
            }
            KeyCode::Char('c') => {
                if !state.view.confirm_offered {
                    return vec![Action::Toast("match is certain, nothing to confirm".into())];
                }
                return match self.selected_row().map(|r| r.song_id) {
                    Some(Some(song_id)) => vec![Action::Confirm(song_id)],
                    Some(None) => vec![Action::Toast("this entry has no song id".into())],
                    None => vec![],
                };
            }
            KeyCode::Char('r') => {
                if state.view.banner.track_id.is_empty() {
                    return vec![Action::Toast("nothing playing to report".into())];
                }
                return vec![Action::OpenReport(
                    self.selected_row().and_then(|r| r.song_ann_id),
                )];
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let title = format!("anime ({})", self.list.len());
        let block = pane_chrome(&title, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(Self::empty_message(state), Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        let mut selected_span = (0, 0);
        let mut current_group = None;
        for (i, entry) in self.list.items.iter().enumerate() {
            if current_group != Some(entry.group) {
                current_group = Some(entry.group);
                if let Some(group) = state.view.groups.get(entry.group) {
                    if !lines.is_empty() {
                        lines.push(Line::from(""));
                    }
                    lines.push(Line::from(Span::styled(
                        format!(" {}", group.label),
                        style_heading().fg(Self::heading_color(group.label)),
                    )));
                }
            }
            let selected = i == self.list.selected;
            let first = lines.len();
            lines.push(Self::row_line(&entry.row, selected));
            if selected && self.expanded {
                lines.extend(Self::detail_lines(&entry.row));
            }
            if selected {
                selected_span = (first, lines.len() - 1);
            }
        }

        self.list
            .ensure_visible(selected_span.0, selected_span.1, inner.height as usize);
        frame.render_widget(
            Paragraph::new(lines).scroll((self.list.scroll_offset as u16, 0)),
            inner,
        );

        if state.view.confirm_offered && focused {
            let hint = Span::styled(
                " c confirm ",
                Style::default().fg(C_MATCH).add_modifier(Modifier::BOLD),
            );
            let w = hint.width() as u16;
            if area.width > w + 2 {
                let hint_area = Rect {
                    x: area.x + area.width - w - 2,
                    y: area.y + area.height.saturating_sub(1),
                    width: w,
                    height: 1,
                };
                frame.render_widget(Paragraph::new(hint), hint_area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whatanime_proto::anisong::{
        Anime, AnimeBinding, AnisongSong, SongAnnId, SongBind, SongId, TrackId, TrackIndex,
    };
    use whatanime_proto::protocol::{
        AnisongResult, Certainty, Hit, Miss, PlaybackUpdate, SongInfo, SongUpdate,
    };
    use whatanime_proto::settings::Settings;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn binding(name: &str, song_id: i32) -> AnimeBinding {
        AnimeBinding {
            anime: Anime {
                eng_name: name.to_string(),
                ..Default::default()
            },
            song: AnisongSong {
                id: Some(SongId(song_id)),
                ..Default::default()
            },
            bind: SongBind {
                song_ann_id: Some(SongAnnId(song_id + 1000)),
                anime_ann_id: None,
                difficulty: None,
                song_index: TrackIndex {
                    category: TrackCategory::Opening,
                    index: Some(1),
                    part: None,
                },
                is_rebroadcast: false,
            },
        }
    }

    fn state_with(anisongs: AnisongResult) -> AppState {
        let mut state = AppState::new(Settings::default(), "http://x/api/login".into());
        state.poll.apply(
            1,
            PlaybackUpdate::NewSong(SongUpdate {
                song_info: SongInfo {
                    name: "Song".into(),
                    track_id: TrackId::new("trk"),
                    ..Default::default()
                },
                anisongs,
            }),
        );
        state.reproject();
        state
    }

    #[test]
    fn test_confirm_uses_selected_song_id() {
        let state = state_with(AnisongResult::Miss(Miss {
            possible: vec![binding("Beta", 2), binding("Alpha", 1)],
        }));
        let mut list = AnimeList::new();
        list.sync_rows(&state);

        // Sorted: Alpha then Beta.
        list.handle_key(key(KeyCode::Char('j')), &state);
        assert_eq!(
            list.handle_key(key(KeyCode::Char('c')), &state),
            vec![Action::Confirm(SongId(2))]
        );
        assert_eq!(
            list.handle_key(key(KeyCode::Char('r')), &state),
            vec![Action::OpenReport(Some(SongAnnId(1002)))]
        );
    }

    #[test]
    fn test_certain_hit_offers_no_confirm() {
        let state = state_with(AnisongResult::Hit(Hit {
            matches: vec![binding("Alpha", 1)],
            also_by_artist: vec![],
            certainty: Certainty::new(100),
        }));
        let mut list = AnimeList::new();
        list.sync_rows(&state);
        let actions = list.handle_key(key(KeyCode::Char('c')), &state);
        assert!(matches!(actions.as_slice(), [Action::Toast(_)]));
    }

    #[test]
    fn test_selection_survives_resync() {
        let mut state = state_with(AnisongResult::Miss(Miss {
            possible: vec![binding("Alpha", 1), binding("Gamma", 3)],
        }));
        let mut list = AnimeList::new();
        list.sync_rows(&state);
        list.handle_key(key(KeyCode::Char('j')), &state);
        assert_eq!(list.selected_row().map(|r| r.title.as_str()), Some("Gamma"));

        state.poll.apply(
            2,
            PlaybackUpdate::NewSong(SongUpdate {
                song_info: SongInfo::default(),
                anisongs: AnisongResult::Miss(Miss {
                    possible: vec![binding("Alpha", 1), binding("Beta", 2), binding("Gamma", 3)],
                }),
            }),
        );
        state.reproject();
        list.sync_rows(&state);
        assert_eq!(list.selected_row().map(|r| r.title.as_str()), Some("Gamma"));
    }
}
