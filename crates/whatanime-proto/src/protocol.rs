use serde::{Deserialize, Serialize};

use crate::anisong::{AnimeBinding, TrackId};

/// Sentinel strings the poll endpoint returns instead of a payload.
pub const SENTINEL_NO_UPDATES: &str = "no_updates";
pub const SENTINEL_LOGIN_REQUIRED: &str = "login_required";
pub const SENTINEL_UNAUTHORIZED: &str = "unauthorized";
pub const SENTINEL_NOT_PLAYING: &str = "not_playing";
/// How the backend's own serializer spells the unauthorized state.
const SENTINEL_UNAUTHORIZED_BACKEND: &str = "un_authorized";

/// The now-playing track as the streaming service reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    #[serde(rename = "song_name")]
    pub name: String,
    #[serde(rename = "romanized_song_name", default)]
    pub romanized_name: String,
    #[serde(rename = "song_artists", default)]
    pub artists: Vec<String>,
    #[serde(default)]
    pub romanized_artists: Vec<String>,
    #[serde(rename = "album_image", default)]
    pub art_url: String,
    #[serde(rename = "spotify_song_id", default)]
    pub track_id: TrackId,
}

/// Backend confidence that a hit is correct, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct Certainty(u8);

impl Certainty {
    pub const CERTAIN: Certainty = Certainty(100);

    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_certain(self) -> bool {
        self == Self::CERTAIN
    }
}

impl From<i64> for Certainty {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Certainty> for i64 {
    fn from(value: Certainty) -> Self {
        value.0 as i64
    }
}

impl std::fmt::Display for Certainty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "hits", default)]
    pub matches: Vec<AnimeBinding>,
    #[serde(rename = "more_by_artists", default)]
    pub also_by_artist: Vec<AnimeBinding>,
    pub certainty: Certainty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Miss {
    #[serde(default)]
    pub possible: Vec<AnimeBinding>,
}

/// Outcome of the backend's anime lookup for the current track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnisongResult {
    Hit(Hit),
    Miss(Miss),
}

impl AnisongResult {
    /// Whether the user should be offered a "confirm anime" control.
    /// A fully certain hit is already bound; everything else is up for review.
    pub fn confirm_offered(&self) -> bool {
        match self {
            Self::Hit(hit) => !hit.certainty.is_certain(),
            Self::Miss(_) => true,
        }
    }

    /// Bindings across all groups, before any filtering.
    pub fn binding_count(&self) -> usize {
        match self {
            Self::Hit(hit) => hit.matches.len() + hit.also_by_artist.len(),
            Self::Miss(miss) => miss.possible.len(),
        }
    }
}

impl Default for AnisongResult {
    fn default() -> Self {
        Self::Miss(Miss::default())
    }
}

/// Payload of a `new_song` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongUpdate {
    pub song_info: SongInfo,
    pub anisongs: AnisongResult,
}

/// Structured half of a poll response: `{ "new_song": { … } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSongEnvelope {
    pub new_song: SongUpdate,
}

/// A poll response body as decoded off the wire, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawUpdate {
    Sentinel(String),
    NewSong(NewSongEnvelope),
}

/// Classified poll result. The only shape the rest of the client sees.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackUpdate {
    /// No session; the user has to log in through the backend.
    LoginRequired,
    /// Logged in but not approved for the streaming service's API.
    Unauthorized,
    /// Nothing is playing. Prior state is kept.
    NotPlaying,
    /// Nothing changed since the last poll. Prior state is kept.
    NoUpdate,
    NewSong(SongUpdate),
}

impl PlaybackUpdate {
    /// True for the two variants that leave prior state untouched.
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NotPlaying | Self::NoUpdate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    /// The backend speaks a protocol version this client does not know.
    #[error("unrecognized poll sentinel {0:?}")]
    UnknownSentinel(String),
}

/// Map a raw poll response onto a [`PlaybackUpdate`].
///
/// Total over the known sentinels and forwards a structured payload as-is.
/// Any other sentinel is an error; callers must treat it as fatal.
pub fn classify(raw: RawUpdate) -> Result<PlaybackUpdate, ClassifyError> {
    match raw {
        RawUpdate::NewSong(envelope) => Ok(PlaybackUpdate::NewSong(envelope.new_song)),
        RawUpdate::Sentinel(s) => match s.as_str() {
            SENTINEL_NO_UPDATES => Ok(PlaybackUpdate::NoUpdate),
            SENTINEL_LOGIN_REQUIRED => Ok(PlaybackUpdate::LoginRequired),
            SENTINEL_UNAUTHORIZED | SENTINEL_UNAUTHORIZED_BACKEND => {
                Ok(PlaybackUpdate::Unauthorized)
            }
            SENTINEL_NOT_PLAYING => Ok(PlaybackUpdate::NotPlaying),
            _ => Err(ClassifyError::UnknownSentinel(s)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anisong::{Anime, AnisongSong, SongBind, TrackCategory, TrackIndex};

    fn binding(eng: &str) -> AnimeBinding {
        AnimeBinding {
            anime: Anime {
                eng_name: eng.to_string(),
                ..Default::default()
            },
            song: AnisongSong::default(),
            bind: SongBind {
                song_ann_id: None,
                anime_ann_id: None,
                difficulty: Some(41.5),
                song_index: TrackIndex {
                    category: TrackCategory::Ending,
                    index: Some(2),
                    part: None,
                },
                is_rebroadcast: false,
            },
        }
    }

    #[test]
    fn test_sentinels_classify_to_named_states() {
        let cases = [
            ("no_updates", PlaybackUpdate::NoUpdate),
            ("login_required", PlaybackUpdate::LoginRequired),
            ("unauthorized", PlaybackUpdate::Unauthorized),
            ("not_playing", PlaybackUpdate::NotPlaying),
            ("un_authorized", PlaybackUpdate::Unauthorized),
        ];
        for (sentinel, expected) in cases {
            let raw: RawUpdate = serde_json::from_str(&format!("\"{}\"", sentinel)).unwrap();
            assert_eq!(classify(raw).unwrap(), expected, "sentinel {}", sentinel);
        }
    }

    #[test]
    fn test_unknown_sentinel_is_an_error() {
        let raw = RawUpdate::Sentinel("paused".to_string());
        assert_eq!(
            classify(raw),
            Err(ClassifyError::UnknownSentinel("paused".to_string()))
        );
    }

    #[test]
    fn test_new_song_payload_is_forwarded_unchanged() {
        let update = SongUpdate {
            song_info: SongInfo {
                name: "群青".to_string(),
                romanized_name: "Gunjou".to_string(),
                artists: vec!["YOASOBI".to_string()],
                romanized_artists: vec![],
                art_url: "https://i.scdn.co/image/abc".to_string(),
                track_id: TrackId::new("3xKsf9qdS1CyvXSMEid6g8"),
            },
            anisongs: AnisongResult::Hit(Hit {
                matches: vec![binding("Blue Period")],
                also_by_artist: vec![binding("Beastars"), binding("Frieren")],
                certainty: Certainty::new(80),
            }),
        };
        let raw = RawUpdate::NewSong(NewSongEnvelope {
            new_song: update.clone(),
        });
        assert_eq!(classify(raw).unwrap(), PlaybackUpdate::NewSong(update));
    }

    #[test]
    fn test_new_song_decodes_from_backend_json() {
        let json = r#"{ "new_song": {
            "song_info": { "song_name": "Idol", "romanized_song_name": "Idol",
                           "song_artists": ["YOASOBI"], "romanized_artists": ["YOASOBI"],
                           "album_image": "", "spotify_song_id": "abc" },
            "anisongs": { "miss": { "possible": [] } } } }"#;
        let raw: RawUpdate = serde_json::from_str(json).unwrap();
        match classify(raw).unwrap() {
            PlaybackUpdate::NewSong(u) => {
                assert_eq!(u.song_info.track_id.as_str(), "abc");
                assert_eq!(u.anisongs, AnisongResult::Miss(Miss::default()));
            }
            other => panic!("expected NewSong, got {:?}", other),
        }
    }

    #[test]
    fn test_certainty_boundary_controls_confirm() {
        let hit = |c| {
            AnisongResult::Hit(Hit {
                matches: vec![],
                also_by_artist: vec![],
                certainty: Certainty::new(c),
            })
        };
        assert!(!hit(100).confirm_offered());
        assert!(hit(99).confirm_offered());
        assert!(hit(0).confirm_offered());
        assert!(AnisongResult::Miss(Miss::default()).confirm_offered());
    }

    #[test]
    fn test_certainty_is_clamped() {
        let c: Certainty = serde_json::from_str("140").unwrap();
        assert!(c.is_certain());
        let c: Certainty = serde_json::from_str("-3").unwrap();
        assert_eq!(c.value(), 0);
    }
}
