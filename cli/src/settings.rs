use anyhow::Context;
use minefield_core as game;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Defaults read from a TOML file, every field is optional and command-line flags win.
///
/// ```toml
/// rows = 16
/// cols = 16
/// mines = 40
/// protect-flags = true
///
/// [leaderboard]
/// path = "scores.txt"
/// order = "fastest-first"
/// history = "persisted"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct Settings {
    pub rows: Option<game::Coord>,
    pub cols: Option<game::Coord>,
    pub mines: Option<game::CellCount>,
    pub protect_flags: Option<bool>,
    pub leaderboard: LeaderboardSettings,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct LeaderboardSettings {
    pub path: Option<PathBuf>,
    pub order: Option<game::RankOrder>,
    pub history: Option<game::HistorySource>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read settings from {}", path.display()))?;
        let settings = Self::parse(&text)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        log::debug!("settings: {:?}", settings);
        Ok(settings)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_every_field() {
        let settings = Settings::parse(
            r#"
            rows = 16
            cols = 30
            mines = 99
            protect-flags = true

            [leaderboard]
            path = "scores.txt"
            order = "fastest-first"
            history = "persisted"
            "#,
        )
        .unwrap();

        assert_eq!(settings.rows, Some(16));
        assert_eq!(settings.cols, Some(30));
        assert_eq!(settings.mines, Some(99));
        assert_eq!(settings.protect_flags, Some(true));
        assert_eq!(settings.leaderboard.path, Some(PathBuf::from("scores.txt")));
        assert_eq!(
            settings.leaderboard.order,
            Some(game::RankOrder::FastestFirst)
        );
        assert_eq!(
            settings.leaderboard.history,
            Some(game::HistorySource::Persisted)
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Settings::parse("difficulty = \"expert\"").is_err());
    }

    #[test]
    fn rejects_oversized_rows() {
        assert!(Settings::parse("rows = 300").is_err());
    }
}
