use serde::{Deserialize, Serialize};

use crate::anisong::TrackCategory;

/// Which anime title is displayed and sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "jpn")]
    Japanese,
}

impl Language {
    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Japanese => "Japanese",
        }
    }
}

/// User display preferences. Lives only as long as the process; toggles are
/// never written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub language: Language,
    pub romanize: bool,
    pub show_openings: bool,
    pub show_endings: bool,
    pub show_inserts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::English,
            romanize: false,
            show_openings: true,
            show_endings: true,
            show_inserts: true,
        }
    }
}

/// A single settings mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Language(Language),
    ToggleRomanize,
    ToggleCategory(TrackCategory),
}

impl Settings {
    /// Apply one mutation. Exactly one field changes; every combination of
    /// flags is valid, including everything hidden.
    pub fn update(self, field: SettingsField) -> Settings {
        let mut next = self;
        match field {
            SettingsField::Language(language) => next.language = language,
            SettingsField::ToggleRomanize => next.romanize = !next.romanize,
            SettingsField::ToggleCategory(category) => {
                let flag = next.flag_mut(category);
                *flag = !*flag;
            }
        }
        next
    }

    /// Whether bindings of `category` are visible.
    pub fn shows(&self, category: TrackCategory) -> bool {
        match category {
            TrackCategory::Opening => self.show_openings,
            TrackCategory::Ending => self.show_endings,
            TrackCategory::Insert => self.show_inserts,
        }
    }

    fn flag_mut(&mut self, category: TrackCategory) -> &mut bool {
        match category {
            TrackCategory::Opening => &mut self.show_openings,
            TrackCategory::Ending => &mut self.show_endings,
            TrackCategory::Insert => &mut self.show_inserts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_show_everything_in_english() {
        let s = Settings::default();
        assert_eq!(s.language, Language::English);
        assert!(!s.romanize);
        assert!(TrackCategory::ALL.iter().all(|c| s.shows(*c)));
    }

    #[test]
    fn test_every_visibility_combination_is_reachable() {
        for mask in 0u8..8 {
            let mut s = Settings::default();
            for (bit, category) in TrackCategory::ALL.iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    s = s.update(SettingsField::ToggleCategory(*category));
                }
            }
            for (bit, category) in TrackCategory::ALL.iter().enumerate() {
                assert_eq!(s.shows(*category), mask & (1 << bit) != 0, "mask {mask:03b}");
            }
            assert_eq!(s.language, Language::English);
            assert!(!s.romanize);
        }
    }

    #[test]
    fn test_update_changes_exactly_one_field() {
        let s = Settings::default();

        let t = s.update(SettingsField::ToggleRomanize);
        assert!(t.romanize);
        assert_eq!(Settings { romanize: false, ..t }, s);

        let t = s.update(SettingsField::Language(Language::Japanese));
        assert_eq!(Settings { language: Language::English, ..t }, s);

        let t = s.update(SettingsField::ToggleCategory(TrackCategory::Insert));
        assert!(!t.show_inserts);
        assert_eq!(Settings { show_inserts: true, ..t }, s);
    }

    #[test]
    fn test_language_wire_names() {
        assert_eq!(serde_json::to_string(&Language::Japanese).unwrap(), "\"jpn\"");
        let l: Language = serde_json::from_str("\"eng\"").unwrap();
        assert_eq!(l, Language::English);
    }
}
