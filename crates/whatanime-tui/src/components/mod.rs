pub mod anime_list;
pub mod help_overlay;
pub mod now_playing;
pub mod report_overlay;
pub mod settings_overlay;
