use crate::models::{AnnotatedGame, League, RosterSnapshot};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Write any serializable value as pretty JSON, creating parent directories
pub fn save_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Failed to serialize data")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to deserialize {}", path.display()))
}

/// Save a single league's players and teams
pub fn save_roster_snapshot(snapshot: &RosterSnapshot, path: &Path) -> Result<()> {
    save_json(snapshot, path)
}

pub fn load_roster_snapshot(path: &Path) -> Result<RosterSnapshot> {
    load_json(path)
}

/// Save every league keyed by its code ("NBA", "MLB", ...)
pub fn save_all_snapshots(snapshots: &BTreeMap<League, RosterSnapshot>, path: &Path) -> Result<()> {
    let keyed: BTreeMap<&str, &RosterSnapshot> =
        snapshots.iter().map(|(league, s)| (league.code(), s)).collect();
    save_json(&keyed, path)
}

/// Save an annotated game log to CSV
pub fn save_game_log_to_csv(games: &[AnnotatedGame], covered: &[bool], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    writer.write_record([
        "Game_ID", "GAME_DATE", "MATCHUP", "WL", "MIN", "PTS", "REB", "AST", "STL", "BLK", "TOV",
        "FG3M", "PF", "DD", "TD", "COVERED",
    ])?;

    let num = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
    let yes_no = |b: bool| if b { "YES" } else { "NO" }.to_string();

    for (i, game) in games.iter().enumerate() {
        let r = &game.record;
        writer.write_record([
            r.game_id.clone().unwrap_or_default(),
            r.game_date.clone().unwrap_or_default(),
            r.matchup.clone().unwrap_or_default(),
            r.result.clone().unwrap_or_default(),
            num(r.minutes),
            num(r.points),
            num(r.rebounds),
            num(r.assists),
            num(r.steals),
            num(r.blocks),
            num(r.turnovers),
            num(r.threes_made),
            num(r.personal_fouls),
            yes_no(game.flags.is_double_double),
            yes_no(game.flags.is_triple_double),
            yes_no(covered.get(i).copied().unwrap_or(false)),
        ])?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}
