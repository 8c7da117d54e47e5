pub mod nba_stats_api;
pub mod rosters_api;
