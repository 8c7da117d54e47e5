pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod utils;

pub use api::*;
pub use error::{ProviderError, StatsError};
pub use models::*;
pub use utils::*;

use anyhow::Result;
use api::nba_stats_api::NbaStatsClient;
use api::rosters_api::RostersApiClient;
use chrono::NaiveDate;
use config::Config;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use utils::player_directory::{PlayerDirectory, RosterSource, SnapshotRoster};
use utils::seasons::current_season;

/// Where the player directory is loaded from: the saved snapshot when
/// USE_CACHE is set and the file exists, otherwise the live stats API
pub fn roster_source(config: &Config, nba: Arc<NbaStatsClient>) -> Arc<dyn RosterSource> {
    match &config.players_snapshot {
        Some(path) if config.use_cache && path.exists() => {
            info!("Loading players from snapshot {}", path.display());
            Arc::new(SnapshotRoster { path: path.clone() })
        }
        _ => nba,
    }
}

/// Build the player directory from a roster source
pub async fn load_directory(roster: &dyn RosterSource) -> Result<PlayerDirectory> {
    let players = roster.active_players().await?;
    let directory = PlayerDirectory::from_entries(&players);
    info!("Player directory loaded with {} players", directory.len());
    Ok(directory)
}

/// Fetch one league's roster; a league that fails entirely comes back empty
pub async fn snapshot_league(
    league: League,
    nba: &NbaStatsClient,
    rosters: &RostersApiClient,
    today: NaiveDate,
) -> RosterSnapshot {
    let result = match league {
        League::Nba => {
            info!("Fetching NBA data...");
            nba.fetch_active_roster(&current_season(today))
                .await
                .map_err(anyhow::Error::from)
        }
        League::Mlb => rosters.fetch_mlb().await,
        League::Nhl => rosters.fetch_nhl().await,
        League::Nfl => rosters.fetch_nfl().await,
    };

    match result {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Error fetching {} data: {:#}", league, e);
            RosterSnapshot::default()
        }
    }
}

/// Fetch every league in turn and log a per-league summary
pub async fn snapshot_all_leagues(
    nba: &NbaStatsClient,
    rosters: &RostersApiClient,
    today: NaiveDate,
) -> BTreeMap<League, RosterSnapshot> {
    let mut snapshots = BTreeMap::new();
    for league in League::ALL {
        let snapshot = snapshot_league(league, nba, rosters, today).await;
        snapshots.insert(league, snapshot);
    }

    for (league, snapshot) in &snapshots {
        info!(
            "{}: {} players, {} teams",
            league,
            snapshot.players.len(),
            snapshot.teams.len()
        );
    }
    snapshots
}
