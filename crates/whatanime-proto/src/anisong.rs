//! Anime ↔ song bindings as the backend ships them.
//!
//! Field names follow the backend's JSON. Every optional piece of metadata
//! defaults when absent and unknown fields are ignored, so a backend that adds
//! columns does not break the client.

use serde::{Deserialize, Serialize};

// ── Identifiers ───────────────────────────────────────────────────────────────

/// Backend song id (the id a confirm request binds to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub i32);

/// AnisongDB song id (what a report points at).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongAnnId(pub i32);

/// AnisongDB anime id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnAnimeId(pub i32);

/// External-service (Spotify) track identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Track index ───────────────────────────────────────────────────────────────

/// Role of a song within an anime. Exactly one category governs whether a
/// binding is visible under the current settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackCategory {
    #[serde(alias = "opening")]
    Opening,
    #[serde(alias = "insert", alias = "Insert Song")]
    Insert,
    #[serde(alias = "ending")]
    Ending,
}

impl TrackCategory {
    pub const ALL: [TrackCategory; 3] = [Self::Opening, Self::Ending, Self::Insert];

    pub fn label(self) -> &'static str {
        match self {
            Self::Opening => "Opening",
            Self::Insert => "Insert Song",
            Self::Ending => "Ending",
        }
    }
}

/// Where a song sits in an anime: category, position and optional sub-part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackIndex {
    #[serde(rename = "index_type")]
    pub category: TrackCategory,
    /// Position within the category. Missing or zero means "unnumbered".
    #[serde(default, alias = "number")]
    pub index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<i16>,
}

impl TrackIndex {
    /// `Opening 2`, `Ending 1`, `Insert Song`, `Insert Song 3`.
    ///
    /// Openings and endings without a position read as number 1; inserts
    /// without one stay unnumbered.
    pub fn label(&self) -> String {
        let position = self.index.filter(|n| *n > 0);
        match (self.category, position) {
            (TrackCategory::Insert, None) => TrackCategory::Insert.label().to_string(),
            (category, Some(n)) => format!("{} {}", category.label(), n),
            (category, None) => format!("{} 1", category.label()),
        }
    }
}

// ── Anime metadata ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimeIndexType {
    Season,
    Movie,
    #[serde(rename = "ONA")]
    Ona,
    #[serde(rename = "OVA")]
    Ova,
    #[serde(rename = "TVSpecial")]
    TvSpecial,
    Special,
    MusicVideo,
    #[serde(other)]
    Unknown,
}

/// Which entry of a franchise this is (`Season 2`, `Movie 1`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeIndex {
    pub index_type: AnimeIndexType,
    #[serde(default)]
    pub number: i32,
    #[serde(default)]
    pub part: i16,
}

impl AnimeIndex {
    pub fn label(&self) -> String {
        let n = if self.number == 0 { 1 } else { self.number };
        let kind = match self.index_type {
            AnimeIndexType::Season => "Season",
            AnimeIndexType::Movie => "Movie",
            AnimeIndexType::Ona => "ONA",
            AnimeIndexType::Ova => "OVA",
            AnimeIndexType::TvSpecial => "TV Special",
            AnimeIndexType::Special => "Special",
            AnimeIndexType::MusicVideo => "Music Video",
            AnimeIndexType::Unknown => return "Unknown season".to_string(),
        };
        format!("{} {}", kind, n)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl std::fmt::Display for ReleaseSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Spring => write!(f, "Spring"),
            Self::Summer => write!(f, "Summer"),
            Self::Fall => write!(f, "Fall"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub season: ReleaseSeason,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaSource {
    Manga,
    LightNovel,
    Original,
    Game,
    #[serde(other)]
    Other,
}

impl MediaSource {
    /// Display label; `Other` carries no information and is hidden.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Manga => Some("Manga"),
            Self::LightNovel => Some("Light Novel"),
            Self::Original => Some("Original"),
            Self::Game => Some("Game"),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anime {
    pub ann_id: Option<AnnAnimeId>,
    pub eng_name: String,
    pub jpn_name: String,
    pub alt_name: Vec<String>,
    pub vintage: Option<Release>,
    pub anime_type: Option<String>,
    pub anime_index: Option<AnimeIndex>,
    pub mean_score: Option<i32>,
    pub banner_image: Option<String>,
    pub cover_image: CoverImage,
    pub genres: Vec<String>,
    pub source: Option<MediaSource>,
    pub episodes: Option<i32>,
}

// ── Song metadata ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifiedArtist {
    pub names: Vec<String>,
    pub id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnisongSong {
    pub id: Option<SongId>,
    pub name: String,
    pub artist_name: String,
    pub composer_name: String,
    pub arranger_name: String,
    pub is_dub: bool,
    pub artists: Vec<SimplifiedArtist>,
    pub composers: Vec<SimplifiedArtist>,
    pub arrangers: Vec<SimplifiedArtist>,
}

/// First listed name of every credited artist, joined with ", ".
pub fn credit_line(artists: &[SimplifiedArtist]) -> String {
    artists
        .iter()
        .filter_map(|a| a.names.first().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Binding ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongBind {
    #[serde(default)]
    pub song_ann_id: Option<SongAnnId>,
    #[serde(default)]
    pub anime_ann_id: Option<AnnAnimeId>,
    #[serde(default)]
    pub difficulty: Option<f64>,
    #[serde(alias = "song_type")]
    pub song_index: TrackIndex,
    #[serde(default)]
    pub is_rebroadcast: bool,
}

/// One song's appearance in one anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeBinding {
    pub anime: Anime,
    pub song: AnisongSong,
    pub bind: SongBind,
}

impl AnimeBinding {
    pub fn category(&self) -> TrackCategory {
        self.bind.song_index.category
    }
}
