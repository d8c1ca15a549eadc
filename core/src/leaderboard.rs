use core::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::LeaderboardError;

pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";
pub const DEFAULT_LEADERBOARD_PATH: &str = "leaderboard.txt";
const HEADER: &str = "Leaderboard:";

/// Cleans up the typed name: control characters (line breaks included) become spaces, then the result is
/// trimmed. Blank or missing input plays as [`DEFAULT_PLAYER_NAME`].
pub fn player_name(input: Option<&str>) -> String {
    let name: String = input
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    match name.trim() {
        "" => DEFAULT_PLAYER_NAME.to_owned(),
        name => name.to_owned(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub elapsed_millis: u64,
}

impl LeaderboardEntry {
    pub fn new(player_name: impl Into<String>, elapsed_millis: u64) -> Self {
        Self {
            player_name: player_name.into(),
            elapsed_millis,
        }
    }
}

/// Ranking direction. Classic play ranks the longest game first; `FastestFirst` is the usual speedrun order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankOrder {
    #[default]
    SlowestFirst,
    FastestFirst,
}

impl RankOrder {
    /// Whether `a` stays ahead of `b` when both are on the board; ties keep insertion order.
    const fn keeps_ahead(self, a: u64, b: u64) -> bool {
        match self {
            Self::SlowestFirst => a >= b,
            Self::FastestFirst => a <= b,
        }
    }
}

/// Where a session's ranking history comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistorySource {
    /// Start every session from the three built-in seed entries, ignoring the file.
    #[default]
    Seeded,
    /// Start from whatever the leaderboard file currently holds.
    Persisted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    order: RankOrder,
}

impl Leaderboard {
    pub const DISPLAY_LIMIT: usize = 5;

    pub fn new(order: RankOrder) -> Self {
        Self {
            entries: Vec::new(),
            order,
        }
    }

    pub fn with_entries(entries: impl IntoIterator<Item = LeaderboardEntry>, order: RankOrder) -> Self {
        let mut leaderboard = Self::new(order);
        for entry in entries {
            leaderboard.insert(entry);
        }
        leaderboard
    }

    pub fn seeded(order: RankOrder) -> Self {
        Self::with_entries(
            [
                LeaderboardEntry::new("Rahul", 10000),
                LeaderboardEntry::new("Lokesh", 11000),
                LeaderboardEntry::new("Riyaz", 14500),
            ],
            order,
        )
    }

    pub fn order(&self) -> RankOrder {
        self.order
    }

    /// All entries in rank order, including those past the display limit.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self) -> &[LeaderboardEntry] {
        &self.entries[..self.entries.len().min(Self::DISPLAY_LIMIT)]
    }

    /// Adds a finished game and returns its 1-based rank.
    pub fn record(&mut self, player_name: impl Into<String>, elapsed_millis: u64) -> usize {
        let rank = self.insert(LeaderboardEntry::new(player_name, elapsed_millis)) + 1;
        log::debug!("Recorded {}ms at rank {}", elapsed_millis, rank);
        rank
    }

    fn insert(&mut self, entry: LeaderboardEntry) -> usize {
        let order = self.order;
        let index = self
            .entries
            .partition_point(|existing| order.keeps_ahead(existing.elapsed_millis, entry.elapsed_millis));
        self.entries.insert(index, entry);
        index
    }

    /// Writes the header and the top entries, one `<rank>. <name>: <millis>ms` line each.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")?;
        writer.flush()
    }

    /// Parses the text produced by [`Leaderboard::write_to`]. The header and blank lines are optional.
    pub fn parse(text: &str, order: RankOrder) -> Result<Self, LeaderboardError> {
        Self::read_from(text.as_bytes(), order)
    }

    pub fn read_from<R: BufRead>(reader: R, order: RankOrder) -> Result<Self, LeaderboardError> {
        let mut entries = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == HEADER {
                continue;
            }

            let entry = parse_entry(trimmed).ok_or_else(|| LeaderboardError::Malformed {
                line: index + 1,
                content: line.clone(),
            })?;
            entries.push(entry);
        }

        Ok(Self::with_entries(entries, order))
    }
}

impl fmt::Display for Leaderboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADER}")?;
        for (index, entry) in self.top().iter().enumerate() {
            writeln!(
                f,
                "{}. {}: {}ms",
                index + 1,
                entry.player_name,
                entry.elapsed_millis
            )?;
        }
        Ok(())
    }
}

fn parse_entry(line: &str) -> Option<LeaderboardEntry> {
    let (rank, rest) = line.split_once(". ")?;
    rank.parse::<usize>().ok()?;
    // names may contain ": ", the time is always after the last one
    let (name, time) = rest.rsplit_once(": ")?;
    let elapsed_millis = time.strip_suffix("ms")?.parse().ok()?;
    Some(LeaderboardEntry::new(name, elapsed_millis))
}

/// File-backed leaderboard, one per session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardStore {
    path: PathBuf,
    order: RankOrder,
    history: HistorySource,
}

impl Default for LeaderboardStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEADERBOARD_PATH)
    }
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            order: RankOrder::default(),
            history: HistorySource::default(),
        }
    }

    pub fn with_order(mut self, order: RankOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_history(mut self, history: HistorySource) -> Self {
        self.history = history;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn order(&self) -> RankOrder {
        self.order
    }

    pub fn load(&self) -> Result<Leaderboard, LeaderboardError> {
        match self.history {
            HistorySource::Seeded => Ok(Leaderboard::seeded(self.order)),
            HistorySource::Persisted => match File::open(&self.path) {
                Ok(file) => Leaderboard::read_from(BufReader::new(file), self.order),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    log::info!(
                        "No leaderboard at {}, starting empty",
                        self.path.display()
                    );
                    Ok(Leaderboard::new(self.order))
                }
                Err(err) => Err(err.into()),
            },
        }
    }

    /// Overwrites the file with the displayed top entries.
    pub fn persist(&self, leaderboard: &Leaderboard) -> Result<(), LeaderboardError> {
        let file = File::create(&self.path)?;
        leaderboard.write_to(BufWriter::new(file))?;
        log::debug!("Leaderboard written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "minefield-{}-{}-leaderboard.txt",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn descending_order_puts_slowest_first() {
        let mut leaderboard = Leaderboard::with_entries(
            [
                LeaderboardEntry::new("A", 10000),
                LeaderboardEntry::new("B", 11000),
                LeaderboardEntry::new("C", 14500),
            ],
            RankOrder::SlowestFirst,
        );

        let rank = leaderboard.record("D", 9000);

        assert_eq!(rank, 4);
        assert_eq!(
            leaderboard.to_string().lines().nth(1),
            Some("1. C: 14500ms")
        );
        assert_eq!(
            leaderboard.to_string(),
            "Leaderboard:\n1. C: 14500ms\n2. B: 11000ms\n3. A: 10000ms\n4. D: 9000ms\n"
        );
    }

    #[test]
    fn fastest_first_ranks_ascending() {
        let mut leaderboard = Leaderboard::seeded(RankOrder::FastestFirst);

        assert_eq!(leaderboard.record("D", 9000), 1);
        assert_eq!(leaderboard.top()[0].player_name, "D");
        assert_eq!(leaderboard.top()[3].player_name, "Riyaz");
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut leaderboard = Leaderboard::new(RankOrder::SlowestFirst);
        leaderboard.record("first", 500);
        let rank = leaderboard.record("second", 500);

        assert_eq!(rank, 2);
        assert_eq!(leaderboard.entries()[0].player_name, "first");
    }

    #[test]
    fn only_top_five_are_displayed() {
        let mut leaderboard = Leaderboard::seeded(RankOrder::SlowestFirst);
        for millis in [1, 2, 3, 4] {
            leaderboard.record("X", millis);
        }

        assert_eq!(leaderboard.entries().len(), 7);
        assert_eq!(leaderboard.top().len(), 5);
        assert_eq!(leaderboard.to_string().lines().count(), 6);
    }

    #[test]
    fn parse_reads_rendered_text() {
        let text = "Leaderboard:\n1. Riyaz: 14500ms\n2. Dr. Who: 12ms\n3. a: b: 7ms\n";

        let leaderboard = Leaderboard::parse(text, RankOrder::SlowestFirst).unwrap();

        assert_eq!(
            leaderboard.entries(),
            &[
                LeaderboardEntry::new("Riyaz", 14500),
                LeaderboardEntry::new("Dr. Who", 12),
                LeaderboardEntry::new("a: b", 7),
            ]
        );
    }

    #[test]
    fn parse_reports_malformed_line() {
        let err = Leaderboard::parse("Leaderboard:\n1. ok: 5ms\nnonsense\n", RankOrder::default())
            .unwrap_err();

        assert!(matches!(err, LeaderboardError::Malformed { line: 3, .. }));
    }

    #[test]
    fn player_name_defaults_to_anonymous() {
        assert_eq!(player_name(None), "Anonymous");
        assert_eq!(player_name(Some("   ")), "Anonymous");
        assert_eq!(player_name(Some("  Ada ")), "Ada");
    }

    #[test]
    fn player_name_cannot_span_lines() {
        assert_eq!(player_name(Some("evil\n1. name")), "evil 1. name");
        assert_eq!(player_name(Some("\r\n\t")), "Anonymous");
        assert!(!player_name(Some("a\rb\u{85}c")).contains(|c: char| c.is_control()));
    }

    #[test]
    fn seeded_store_ignores_file_contents() {
        let path = temp_path("seeded");
        std::fs::write(&path, "Leaderboard:\n1. Someone: 1ms\n").unwrap();

        let leaderboard = LeaderboardStore::new(&path).load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(leaderboard, Leaderboard::seeded(RankOrder::SlowestFirst));
    }

    #[test]
    fn persisted_store_round_trips_top_five() {
        let path = temp_path("persisted");
        let store = LeaderboardStore::new(&path)
            .with_order(RankOrder::FastestFirst)
            .with_history(HistorySource::Persisted);

        assert!(store.load().unwrap().entries().is_empty());

        let mut leaderboard = Leaderboard::seeded(RankOrder::FastestFirst);
        for (name, millis) in [("D", 9000), ("E", 20000), ("F", 30000)] {
            leaderboard.record(name, millis);
        }
        store.persist(&leaderboard).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let reloaded = store.load().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(written.starts_with("Leaderboard:\n1. D: 9000ms\n"));
        assert_eq!(reloaded.entries(), leaderboard.top());
    }
}
