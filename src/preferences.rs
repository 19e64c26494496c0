use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::analysis::{default_word_list, DEFAULT_AGE_BINS, DEFAULT_MAX_WORDS};
use crate::dataset::Column;
use crate::theme::{AccentColor, ThemeVariant};
use crate::views::View;

pub const MAX_WORDS_RANGE: (u8, u8) = (1, 50);
pub const AGE_BINS_RANGE: (u8, u8) = (10, 80);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: ThemeVariant,
    pub accent: AccentColor,
    /// Zip archive holding the profile CSV.
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,
    /// Directory the archive is extracted into on every start.
    #[serde(default = "default_extract_dir")]
    pub extract_dir: PathBuf,
    #[serde(default)]
    pub view: View,
    #[serde(default = "default_distribution_column")]
    pub distribution_column: Column,
    #[serde(default = "default_activity_column")]
    pub activity_column: Column,
    #[serde(default = "default_word_list")]
    pub word_list: String,
    #[serde(default = "default_max_words")]
    pub max_words: u8,
    #[serde(default = "default_age_bins")]
    pub age_bins: u8,
}

fn default_archive_path() -> PathBuf { PathBuf::from("okcupid_profiles.zip") }
fn default_extract_dir() -> PathBuf { PathBuf::from("extracted_folder") }
fn default_distribution_column() -> Column { Column::Orientation }
fn default_activity_column() -> Column { Column::Orientation }
fn default_max_words() -> u8 { DEFAULT_MAX_WORDS }
fn default_age_bins() -> u8 { DEFAULT_AGE_BINS }

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Latte,
            accent: AccentColor::Blue,
            archive_path: default_archive_path(),
            extract_dir: default_extract_dir(),
            view: View::default(),
            distribution_column: default_distribution_column(),
            activity_column: default_activity_column(),
            word_list: default_word_list(),
            max_words: default_max_words(),
            age_bins: default_age_bins(),
        }
    }
}

impl Preferences {
    /// Linux → ~/.config/ProfileInsights/
    fn config_dir() -> PathBuf {
        dirs::config_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ProfileInsights")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("preferences.json")
    }

    pub fn load() -> Self {
        let path = Self::config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_json(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Parse a preferences file, falling back to defaults when it is invalid.
    pub fn from_json(contents: &str) -> Self {
        let mut prefs: Self = serde_json::from_str(contents).unwrap_or_else(|e| {
            warn!("invalid preferences file, using defaults: {e}");
            Self::default()
        });
        prefs.sanitize();
        prefs
    }

    /// Clamp numeric fields and drop selections the views do not offer.
    fn sanitize(&mut self) {
        self.max_words = self.max_words.clamp(MAX_WORDS_RANGE.0, MAX_WORDS_RANGE.1);
        self.age_bins = self.age_bins.clamp(AGE_BINS_RANGE.0, AGE_BINS_RANGE.1);
        if !Column::DISTRIBUTION.contains(&self.distribution_column) {
            self.distribution_column = default_distribution_column();
        }
        if !Column::ACTIVITY.contains(&self.activity_column) {
            self.activity_column = default_activity_column();
        }
    }

    pub fn save(&self) {
        let dir = Self::config_dir();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("failed to create config directory: {e}");
            return;
        }

        let path = Self::config_path();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, &json) {
                    warn!("failed to save preferences: {e}");
                }
            }
            Err(e) => warn!("failed to serialize preferences: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let prefs = Preferences::default();
        assert_eq!(prefs.max_words, 11);
        assert_eq!(prefs.age_bins, 40);
        assert_eq!(prefs.view, View::Distribution);
        assert_eq!(prefs.archive_path, PathBuf::from("okcupid_profiles.zip"));
        assert!(prefs.word_list.starts_with("kind, funny"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut prefs = Preferences::default();
        prefs.view = View::Activity;
        prefs.activity_column = Column::Sex;
        let json = serde_json::to_string(&prefs).unwrap();
        let loaded = Preferences::from_json(&json);
        assert_eq!(loaded.view, View::Activity);
        assert_eq!(loaded.activity_column, Column::Sex);
        assert_eq!(loaded.theme, prefs.theme);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let old_json = r#"{"theme":"Mocha","accent":"Green"}"#;
        let prefs = Preferences::from_json(old_json);
        assert_eq!(prefs.theme, ThemeVariant::Mocha);
        assert_eq!(prefs.max_words, 11);
        assert_eq!(prefs.extract_dir, PathBuf::from("extracted_folder"));
    }

    #[test]
    fn test_sanitize_clamps_and_resets() {
        let json = r#"{"theme":"Latte","accent":"Red","max_words":200,"age_bins":2,
            "distribution_column":"sex","activity_column":"drinks"}"#;
        let prefs = Preferences::from_json(json);
        assert_eq!(prefs.max_words, 50);
        assert_eq!(prefs.age_bins, 10);
        assert_eq!(prefs.distribution_column, Column::Orientation);
        assert_eq!(prefs.activity_column, Column::Orientation);
    }

    #[test]
    fn test_invalid_json_falls_back() {
        let prefs = Preferences::from_json("{not json");
        assert_eq!(prefs.max_words, 11);
    }
}
