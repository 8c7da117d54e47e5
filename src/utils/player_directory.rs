use crate::error::{Result, StatsError};
use crate::models::{EntryId, League, PlayerEntry, PlayerId};
use crate::utils::data::load_roster_snapshot;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

const MAX_SUGGESTIONS: usize = 10;
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone)]
struct DirectoryPlayer {
    id: PlayerId,
    first_name: String,
    last_name: String,
}

impl DirectoryPlayer {
    fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim_end()
            .to_string()
    }
}

/// Read-only table of active players.
///
/// Built once from a roster and never mutated afterwards; a refresh builds a
/// new directory and swaps it in whole.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    players: Vec<DirectoryPlayer>,
    by_name: HashMap<(String, String), PlayerId>,
}

impl PlayerDirectory {
    /// Build from roster entries, keeping active players that have a numeric id and a first name
    pub fn from_entries(entries: &[PlayerEntry]) -> Self {
        let players: Vec<DirectoryPlayer> = entries
            .iter()
            .filter(|e| e.is_active)
            .filter_map(|e| {
                let id = match &e.id {
                    EntryId::Num(n) => PlayerId::try_from(*n).ok()?,
                    EntryId::Text(s) => s.parse().ok()?,
                };
                Some(DirectoryPlayer {
                    id,
                    first_name: e.first_name.clone()?,
                    last_name: e.last_name.clone().unwrap_or_default(),
                })
            })
            .collect();

        // First entry in roster order wins on duplicate names
        let mut by_name = HashMap::new();
        for p in &players {
            by_name
                .entry((p.first_name.to_lowercase(), p.last_name.to_lowercase()))
                .or_insert(p.id);
        }

        Self { players, by_name }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Case-insensitive exact match on first and last name
    pub fn lookup(&self, first_name: &str, last_name: &str) -> Option<PlayerId> {
        self.by_name
            .get(&(first_name.to_lowercase(), last_name.to_lowercase()))
            .copied()
    }

    /// Resolve a "First Last" string to a player id
    pub fn resolve(&self, full_name: &str) -> Result<PlayerId> {
        let (first, last) = parse_player_name(full_name)?;
        self.lookup(first, last)
            .ok_or_else(|| StatsError::NotFound(format!("Player {} not found", full_name)))
    }

    /// Up to ten "First Last" names whose full, first or last name contains the query
    pub fn suggest(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let matches: BTreeSet<String> = self
            .players
            .iter()
            .filter(|p| {
                let full = p.display_name().to_lowercase();
                full.contains(&query)
                    || p.first_name.to_lowercase().contains(&query)
                    || p.last_name.to_lowercase().contains(&query)
            })
            .map(DirectoryPlayer::display_name)
            .collect();

        matches.into_iter().take(MAX_SUGGESTIONS).collect()
    }
}

/// Where the active-player list comes from when the directory is (re)built
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn active_players(&self) -> anyhow::Result<Vec<PlayerEntry>>;
}

/// Players read from a saved NBA roster snapshot
pub struct SnapshotRoster {
    pub path: PathBuf,
}

#[async_trait]
impl RosterSource for SnapshotRoster {
    async fn active_players(&self) -> anyhow::Result<Vec<PlayerEntry>> {
        let snapshot = load_roster_snapshot(&self.path)?;
        Ok(snapshot
            .players
            .into_iter()
            .filter(|p| p.league == League::Nba)
            .collect())
    }
}

/// Split "First Last" on the first space; everything after it is the last name
pub fn parse_player_name(full_name: &str) -> Result<(&str, &str)> {
    let invalid = || StatsError::Validation("Please provide both first and last name".to_string());

    let (first, last) = full_name.trim().split_once(' ').ok_or_else(invalid)?;
    let last = last.trim();
    if first.is_empty() || last.is_empty() {
        return Err(invalid());
    }
    Ok((first, last))
}
