//! Turns classified state plus [`Settings`] into what the shell draws.
//!
//! Everything here is a pure function: filtering by track category, title
//! selection, collation and the banner's romanization fallback. The shell
//! never filters or sorts on its own.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::anisong::{credit_line, AnimeBinding, SongAnnId, SongId, TrackId};
use crate::protocol::{AnisongResult, Certainty, SongInfo};
use crate::settings::{Language, Settings};
use crate::state::{PollState, SessionStatus};

pub const UNKNOWN_ANIME: &str = "Unknown Anime";
pub const NOT_PLAYING: &str = "Not Playing Anything";
/// Art shown when the streaming service sends none. Served by the backend.
pub const PLACEHOLDER_ART: &str = "/amq_icon_green.svg";

const APPROVAL_TITLE: &str =
    "This account still needs approval from the backend operator before playback can be read.";
const APPROVAL_HINT: &str = "Send them your Spotify e-mail and full name to get approved";

/// One render-ready list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub title: String,
    pub track_label: String,
    pub anime_index: Option<String>,
    pub release: Option<String>,
    pub source: Option<&'static str>,
    pub anime_type: String,
    pub episodes: Option<i32>,
    pub genres: Vec<String>,
    pub mean_score: Option<i32>,
    pub song_name: String,
    pub artists: String,
    pub composers: String,
    pub arrangers: String,
    pub cover_url: Option<String>,
    /// Report target.
    pub song_ann_id: Option<SongAnnId>,
    /// Confirm target.
    pub song_id: Option<SongId>,
}

impl DisplayRow {
    fn from_binding(binding: &AnimeBinding, language: Language) -> Self {
        let anime = &binding.anime;
        let song = &binding.song;
        Self {
            title: display_title(binding, language).to_string(),
            track_label: binding.bind.song_index.label(),
            anime_index: anime.anime_index.map(|i| i.label()),
            release: anime.vintage.map(|v| format!("{} {}", v.season, v.year)),
            source: anime.source.and_then(|s| s.label()),
            anime_type: anime
                .anime_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            episodes: anime.episodes,
            genres: anime.genres.clone(),
            mean_score: anime.mean_score,
            song_name: song.name.clone(),
            artists: credit_line(&song.artists),
            composers: credit_line(&song.composers),
            arrangers: credit_line(&song.arrangers),
            cover_url: anime
                .cover_image
                .large
                .clone()
                .or_else(|| anime.cover_image.medium.clone()),
            song_ann_id: binding.bind.song_ann_id,
            song_id: song.id,
        }
    }

    /// `label: value` lines for the expanded entry, skipping absent fields.
    pub fn detail_lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![("Song", self.song_name.clone())];
        for (label, value) in [
            ("Artists", &self.artists),
            ("Composers", &self.composers),
            ("Arrangers", &self.arrangers),
        ] {
            if !value.is_empty() {
                lines.push((label, value.clone()));
            }
        }
        if let Some(index) = &self.anime_index {
            lines.push(("Entry", index.clone()));
        }
        if let Some(episodes) = self.episodes {
            lines.push(("Episodes", episodes.to_string()));
        }
        if let Some(release) = &self.release {
            lines.push(("Release", release.clone()));
        }
        if let Some(source) = self.source {
            lines.push(("Source", source.to_string()));
        }
        lines.push(("Type", self.anime_type.clone()));
        if !self.genres.is_empty() {
            lines.push(("Genres", self.genres.join(", ")));
        }
        if let Some(score) = self.mean_score {
            lines.push(("Score", format!("{}%", score)));
        }
        lines
    }
}

fn display_title(binding: &AnimeBinding, language: Language) -> &str {
    let name = match language {
        Language::English => &binding.anime.eng_name,
        Language::Japanese => &binding.anime.jpn_name,
    };
    if name.is_empty() {
        UNKNOWN_ANIME
    } else {
        name
    }
}

/// Two-level sort key for a display title.
///
/// The primary level ignores case, width and diacritics (`Élan` sorts with
/// `elan`, `ガ` with `カ`). The secondary level keeps the marks so accented
/// and plain spellings still order deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: String,
    secondary: String,
}

fn collation_key(title: &str) -> CollationKey {
    CollationKey {
        primary: title
            .nfkd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_lowercase(),
        secondary: title.nfkd().collect::<String>().to_lowercase(),
    }
}

/// Filter, title and sort `bindings` for display.
///
/// Ordering is by collation key, then raw title; equal titles keep their
/// input order.
pub fn project(bindings: &[AnimeBinding], settings: &Settings) -> Vec<DisplayRow> {
    let mut keyed: Vec<(CollationKey, DisplayRow)> = bindings
        .iter()
        .filter(|b| settings.shows(b.category()))
        .map(|b| {
            let row = DisplayRow::from_binding(b, settings.language);
            (collation_key(&row.title), row)
        })
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.title.cmp(&b.title)));
    keyed.into_iter().map(|(_, row)| row).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupLabel {
    Match(Certainty),
    MoreByArtists,
    PossibleMatches,
}

impl std::fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Match(c) => write!(f, "Match {} %", c),
            Self::MoreByArtists => write!(f, "More by artists"),
            Self::PossibleMatches => write!(f, "Possible matches"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayGroup {
    pub label: GroupLabel,
    pub rows: Vec<DisplayRow>,
}

/// Project one labelled group. `None` when nothing survives filtering, in
/// which case the heading is not drawn either.
pub fn project_group(
    label: GroupLabel,
    bindings: &[AnimeBinding],
    settings: &Settings,
) -> Option<DisplayGroup> {
    let rows = project(bindings, settings);
    if rows.is_empty() {
        None
    } else {
        Some(DisplayGroup { label, rows })
    }
}

/// Header block: what the streaming service says is playing.
#[derive(Debug, Clone, PartialEq)]
pub struct SongBanner {
    pub title: String,
    pub artists: String,
    pub art_url: String,
    pub track_id: TrackId,
}

impl SongBanner {
    pub fn from_song(info: &SongInfo, romanize: bool) -> Self {
        let title = if romanize && !info.romanized_name.is_empty() {
            &info.romanized_name
        } else {
            &info.name
        };
        // Per artist: a blank romanization falls back to the canonical name.
        let artists: Vec<&str> = if romanize && !info.romanized_artists.is_empty() {
            info.romanized_artists
                .iter()
                .enumerate()
                .filter_map(|(i, r)| {
                    if r.is_empty() {
                        info.artists.get(i).map(String::as_str)
                    } else {
                        Some(r.as_str())
                    }
                })
                .collect()
        } else {
            info.artists.iter().map(String::as_str).collect()
        };
        Self {
            title: title.clone(),
            artists: artists.join(", "),
            art_url: if info.art_url.is_empty() {
                PLACEHOLDER_ART.to_string()
            } else {
                info.art_url.clone()
            },
            track_id: info.track_id.clone(),
        }
    }

    fn placeholder(title: &str, artists: &str) -> Self {
        Self {
            title: title.to_string(),
            artists: artists.to_string(),
            art_url: PLACEHOLDER_ART.to_string(),
            track_id: TrackId::default(),
        }
    }
}

/// Everything the shell needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingView {
    pub banner: SongBanner,
    pub groups: Vec<DisplayGroup>,
    pub confirm_offered: bool,
    pub session: SessionStatus,
}

impl NowPlayingView {
    /// Rows of all groups in display order.
    pub fn rows(&self) -> impl Iterator<Item = &DisplayRow> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }
}

pub fn view(state: &PollState, settings: &Settings) -> NowPlayingView {
    let session = state.session.clone();
    if session == SessionStatus::Unauthorized {
        return NowPlayingView {
            banner: SongBanner::placeholder(APPROVAL_TITLE, APPROVAL_HINT),
            groups: Vec::new(),
            confirm_offered: false,
            session,
        };
    }

    let Some(current) = &state.current else {
        return NowPlayingView {
            banner: SongBanner::placeholder(NOT_PLAYING, ""),
            groups: Vec::new(),
            confirm_offered: false,
            session,
        };
    };

    let groups: Vec<DisplayGroup> = match &current.anisongs {
        AnisongResult::Hit(hit) => [
            project_group(GroupLabel::Match(hit.certainty), &hit.matches, settings),
            project_group(GroupLabel::MoreByArtists, &hit.also_by_artist, settings),
        ]
        .into_iter()
        .flatten()
        .collect(),
        AnisongResult::Miss(miss) => {
            project_group(GroupLabel::PossibleMatches, &miss.possible, settings)
                .into_iter()
                .collect()
        }
    };

    NowPlayingView {
        banner: SongBanner::from_song(&current.song_info, settings.romanize),
        groups,
        confirm_offered: current.anisongs.confirm_offered(),
        session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anisong::{Anime, AnisongSong, SongBind, TrackCategory, TrackIndex};
    use crate::protocol::{Hit, Miss, PlaybackUpdate, SongUpdate};
    use crate::settings::SettingsField;

    fn binding(eng: &str, jpn: &str, category: TrackCategory) -> AnimeBinding {
        AnimeBinding {
            anime: Anime {
                eng_name: eng.to_string(),
                jpn_name: jpn.to_string(),
                ..Default::default()
            },
            song: AnisongSong::default(),
            bind: SongBind {
                song_ann_id: None,
                anime_ann_id: None,
                difficulty: None,
                song_index: TrackIndex {
                    category,
                    index: Some(1),
                    part: None,
                },
                is_rebroadcast: false,
            },
        }
    }

    fn titles(rows: &[DisplayRow]) -> Vec<&str> {
        rows.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_language_switch_resorts() {
        let bindings = vec![
            binding("Zeta", "あ", TrackCategory::Opening),
            binding("Alpha", "ん", TrackCategory::Ending),
        ];
        let eng = project(&bindings, &Settings::default());
        assert_eq!(titles(&eng), ["Alpha", "Zeta"]);

        let jpn_settings = Settings::default().update(SettingsField::Language(Language::Japanese));
        let jpn = project(&bindings, &jpn_settings);
        assert_eq!(titles(&jpn), ["あ", "ん"]);
    }

    #[test]
    fn test_collation_ignores_case_and_width() {
        let bindings = vec![
            binding("beta", "", TrackCategory::Opening),
            binding("Ａlpha", "", TrackCategory::Opening),
            binding("Gamma", "", TrackCategory::Opening),
        ];
        let rows = project(&bindings, &Settings::default());
        assert_eq!(titles(&rows), ["Ａlpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_accented_titles_sort_with_their_base_letters() {
        let bindings = vec![
            binding("Zeta", "", TrackCategory::Opening),
            binding("Élan", "", TrackCategory::Opening),
            binding("Pokémon", "", TrackCategory::Opening),
            binding("elan", "", TrackCategory::Opening),
            binding("Ōkami", "", TrackCategory::Opening),
            binding("Naruto", "", TrackCategory::Opening),
        ];
        let rows = project(&bindings, &Settings::default());
        assert_eq!(
            titles(&rows),
            ["elan", "Élan", "Naruto", "Ōkami", "Pokémon", "Zeta"]
        );
    }

    #[test]
    fn test_all_hidden_projects_nothing() {
        let bindings = vec![
            binding("A", "A", TrackCategory::Opening),
            binding("B", "B", TrackCategory::Ending),
            binding("C", "C", TrackCategory::Insert),
        ];
        let hidden = TrackCategory::ALL.iter().fold(Settings::default(), |s, c| {
            s.update(SettingsField::ToggleCategory(*c))
        });
        assert!(project(&bindings, &hidden).is_empty());
        assert!(project_group(GroupLabel::PossibleMatches, &bindings, &hidden).is_none());
    }

    #[test]
    fn test_category_filter_and_unknown_title() {
        let bindings = vec![
            binding("", "", TrackCategory::Insert),
            binding("Shown", "", TrackCategory::Opening),
        ];
        let rows = project(&bindings, &Settings::default());
        assert_eq!(titles(&rows), ["Shown", UNKNOWN_ANIME]);

        let no_inserts = Settings::default().update(SettingsField::ToggleCategory(TrackCategory::Insert));
        assert_eq!(titles(&project(&bindings, &no_inserts)), ["Shown"]);
    }

    #[test]
    fn test_project_is_idempotent_and_stable() {
        let bindings = vec![
            binding("Same", "", TrackCategory::Opening),
            binding("Same", "", TrackCategory::Ending),
            binding("Other", "", TrackCategory::Insert),
        ];
        let first = project(&bindings, &Settings::default());
        let second = project(&bindings, &Settings::default());
        assert_eq!(first, second);
        assert_eq!(first[1].track_label, "Opening 1");
        assert_eq!(first[2].track_label, "Ending 1");
    }

    #[test]
    fn test_banner_romanization_falls_back() {
        let info = SongInfo {
            name: "残酷な天使のテーゼ".to_string(),
            romanized_name: String::new(),
            artists: vec!["高橋洋子".to_string()],
            romanized_artists: vec!["Yoko Takahashi".to_string()],
            art_url: String::new(),
            track_id: TrackId::new("t1"),
        };
        let plain = SongBanner::from_song(&info, false);
        assert_eq!(plain.artists, "高橋洋子");
        assert_eq!(plain.art_url, PLACEHOLDER_ART);

        let romanized = SongBanner::from_song(&info, true);
        assert_eq!(romanized.title, "残酷な天使のテーゼ");
        assert_eq!(romanized.artists, "Yoko Takahashi");
    }

    #[test]
    fn test_blank_romanized_artist_falls_back_per_artist() {
        let info = SongInfo {
            name: "God knows...".to_string(),
            artists: vec!["涼宮ハルヒ".to_string(), "平野綾".to_string()],
            romanized_artists: vec!["".to_string(), "Aya Hirano".to_string()],
            ..Default::default()
        };
        let banner = SongBanner::from_song(&info, true);
        assert_eq!(banner.artists, "涼宮ハルヒ, Aya Hirano");
    }

    #[test]
    fn test_view_groups_and_confirm() {
        let mut state = PollState::new();
        let empty = view(&state, &Settings::default());
        assert_eq!(empty.banner.title, NOT_PLAYING);
        assert!(!empty.confirm_offered);

        state.apply(
            1,
            PlaybackUpdate::NewSong(SongUpdate {
                song_info: SongInfo::default(),
                anisongs: AnisongResult::Hit(Hit {
                    matches: vec![binding("Match", "", TrackCategory::Opening)],
                    also_by_artist: vec![],
                    certainty: Certainty::new(80),
                }),
            }),
        );
        let v = view(&state, &Settings::default());
        assert_eq!(v.groups.len(), 1);
        assert_eq!(v.groups[0].label.to_string(), "Match 80 %");
        assert!(v.confirm_offered);

        state.apply(
            2,
            PlaybackUpdate::NewSong(SongUpdate {
                song_info: SongInfo::default(),
                anisongs: AnisongResult::Miss(Miss {
                    possible: vec![binding("Maybe", "", TrackCategory::Ending)],
                }),
            }),
        );
        let v = view(&state, &Settings::default());
        assert_eq!(v.groups[0].label, GroupLabel::PossibleMatches);
        assert_eq!(v.row_count(), 1);

        state.apply(3, PlaybackUpdate::Unauthorized);
        let v = view(&state, &Settings::default());
        assert!(v.groups.is_empty());
        assert_eq!(v.banner.art_url, PLACEHOLDER_ART);
    }
}
