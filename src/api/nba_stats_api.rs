use crate::error::ProviderError;
use crate::models::{
    EntryId, GameRecord, League, PlayerEntry, PlayerId, RosterSnapshot, Season, Stat, TeamEntry,
};
use crate::utils::fetcher::GameLogProvider;
use crate::utils::player_directory::RosterSource;
use crate::utils::seasons::current_season;
use async_trait::async_trait;
use chrono::Local;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const NBA_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const GAME_LOG_SET: &str = "PlayerGameLog";
const ALL_PLAYERS_SET: &str = "CommonAllPlayers";

/// Response envelope shared by the stats.nba.com endpoints
#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets")]
    result_sets: Vec<ResultSet>,
}

/// A table: column headers plus positional rows
#[derive(Debug, Deserialize)]
struct ResultSet {
    name: String,
    headers: Vec<String>,
    #[serde(rename = "rowSet")]
    row_set: Vec<Vec<Value>>,
}

impl StatsResponse {
    fn result_set(&self, name: &str) -> Result<&ResultSet, ProviderError> {
        self.result_sets
            .iter()
            .find(|set| set.name == name)
            .ok_or_else(|| ProviderError::Failed(format!("Response has no {} result set", name)))
    }
}

impl ResultSet {
    fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    fn rows(&self) -> Result<&[Vec<Value>], ProviderError> {
        if let Some(row) = self.row_set.iter().find(|r| r.len() != self.headers.len()) {
            return Err(ProviderError::Failed(format!(
                "Malformed {} row: expected {} columns, got {}",
                self.name,
                self.headers.len(),
                row.len()
            )));
        }
        Ok(&self.row_set)
    }
}

fn number(row: &[Value], idx: Option<usize>) -> Option<f64> {
    match row.get(idx?)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(row: &[Value], idx: Option<usize>) -> Option<String> {
    match row.get(idx?)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Map a `playergamelog` response into game records, keeping the provider's row order.
/// Columns outside the record's fields are dropped.
pub fn parse_game_log(body: &str) -> Result<Vec<GameRecord>, ProviderError> {
    let response: StatsResponse = serde_json::from_str(body)?;
    let set = response.result_set(GAME_LOG_SET)?;

    let stat_columns: Vec<(Stat, Option<usize>)> = Stat::ALL
        .iter()
        .map(|stat| (*stat, set.column(stat.code())))
        .collect();
    let game_id = set.column("Game_ID");
    let game_date = set.column("GAME_DATE");
    let matchup = set.column("MATCHUP");
    let result = set.column("WL");
    let minutes = set.column("MIN");

    let games = set
        .rows()?
        .iter()
        .map(|row| {
            let mut record = GameRecord {
                game_id: text(row, game_id),
                game_date: text(row, game_date),
                matchup: text(row, matchup),
                result: text(row, result),
                minutes: number(row, minutes),
                ..Default::default()
            };
            for (stat, idx) in &stat_columns {
                record.set(*stat, number(row, *idx));
            }
            record
        })
        .collect();

    Ok(games)
}

/// Map a `commonallplayers` response into active players and the teams they play for
pub fn parse_active_roster(body: &str) -> Result<RosterSnapshot, ProviderError> {
    let response: StatsResponse = serde_json::from_str(body)?;
    let set = response.result_set(ALL_PLAYERS_SET)?;

    let person_id = set.column("PERSON_ID");
    let last_comma_first = set.column("DISPLAY_LAST_COMMA_FIRST");
    let first_last = set.column("DISPLAY_FIRST_LAST");
    let roster_status = set.column("ROSTERSTATUS");
    let team_id = set.column("TEAM_ID");
    let team_city = set.column("TEAM_CITY");
    let team_name = set.column("TEAM_NAME");
    let team_abbreviation = set.column("TEAM_ABBREVIATION");

    let mut players = Vec::new();
    let mut teams: BTreeMap<u64, TeamEntry> = BTreeMap::new();

    for row in set.rows()? {
        let Some(id) = number(row, person_id) else {
            continue;
        };
        if number(row, roster_status) != Some(1.0) {
            continue;
        }

        // "James, LeBron" -> ("LeBron", "James"); single names have no comma
        let (first_name, last_name) = match text(row, last_comma_first) {
            Some(name) => match name.split_once(", ") {
                Some((last, first)) => (Some(first.to_string()), Some(last.to_string())),
                None => (Some(name), None),
            },
            None => (None, None),
        };
        let full_name = text(row, first_last).unwrap_or_else(|| {
            [first_name.as_deref(), last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        });

        let team = number(row, team_id).map(|t| t as u64).filter(|t| *t != 0);
        if let Some(team) = team {
            teams.entry(team).or_insert_with(|| {
                let city = text(row, team_city).unwrap_or_default();
                let nickname = text(row, team_name).unwrap_or_default();
                TeamEntry {
                    id: EntryId::Num(team),
                    full_name: format!("{} {}", city, nickname).trim().to_string(),
                    abbreviation: text(row, team_abbreviation).unwrap_or_default(),
                    city: Some(city),
                    nickname: Some(nickname),
                    league: League::Nba,
                }
            });
        }

        players.push(PlayerEntry {
            id: EntryId::Num(id as u64),
            full_name,
            first_name,
            last_name,
            is_active: true,
            league: League::Nba,
            team_id: team.map(EntryId::Num),
            position: None,
        });
    }

    Ok(RosterSnapshot {
        players,
        teams: teams.into_values().collect(),
    })
}

pub struct NbaStatsClient {
    client: Client,
    base_url: String,
}

impl NbaStatsClient {
    /// `timeout` bounds each request, including reading the body
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert("x-nba-stats-origin", HeaderValue::from_static("stats"));
        headers.insert("x-nba-stats-token", HeaderValue::from_static("true"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Failed(format!(
                "NBA stats API returned error: {}",
                response.status()
            )));
        }

        Ok(response.text().await?)
    }

    /// Regular-season game log for one player
    pub async fn fetch_player_game_log(
        &self,
        player_id: PlayerId,
        season: &Season,
    ) -> Result<Vec<GameRecord>, ProviderError> {
        let body = self
            .get_text(
                "playergamelog",
                &[
                    ("PlayerID", player_id.to_string()),
                    ("Season", season.to_string()),
                    ("SeasonType", "Regular Season".to_string()),
                ],
            )
            .await?;

        parse_game_log(&body)
    }

    /// Players currently on a roster, with their teams
    pub async fn fetch_active_roster(&self, season: &Season) -> Result<RosterSnapshot, ProviderError> {
        let body = self
            .get_text(
                "commonallplayers",
                &[
                    ("LeagueID", "00".to_string()),
                    ("Season", season.to_string()),
                    ("IsOnlyCurrentSeason", "1".to_string()),
                ],
            )
            .await?;

        parse_active_roster(&body)
    }
}

#[async_trait]
impl GameLogProvider for NbaStatsClient {
    async fn fetch_game_log(
        &self,
        player_id: PlayerId,
        season: &Season,
    ) -> Result<Vec<GameRecord>, ProviderError> {
        self.fetch_player_game_log(player_id, season).await
    }
}

#[async_trait]
impl RosterSource for NbaStatsClient {
    async fn active_players(&self) -> anyhow::Result<Vec<PlayerEntry>> {
        let season = current_season(Local::now().date_naive());
        let snapshot = self.fetch_active_roster(&season).await?;
        Ok(snapshot.players)
    }
}
