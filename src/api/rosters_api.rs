use crate::models::{EntryId, League, PlayerEntry, RosterSnapshot, TeamEntry};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const MLB_API_BASE: &str = "https://statsapi.mlb.com/api/v1";
const NHL_API_BASE: &str = "https://api-web.nhle.com/v1";
const ESPN_NFL_TEAMS_URL: &str = "http://site.api.espn.com/apis/site/v2/sports/football/nfl/teams";
const ESPN_NFL_ATHLETES_URL: &str =
    "https://sports.core.api.espn.com/v3/sports/football/nfl/athletes?limit=20000&active=true";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// ESPN team ids for the 32 NFL franchises
const NFL_TEAMS: [(&str, u32); 32] = [
    ("ARI", 22), ("ATL", 1), ("BAL", 33), ("BUF", 2), ("CAR", 29), ("CHI", 3),
    ("CIN", 4), ("CLE", 5), ("DAL", 6), ("DEN", 7), ("DET", 8), ("GB", 9),
    ("HOU", 34), ("IND", 11), ("JAX", 30), ("KC", 12), ("LAC", 24), ("LAR", 14),
    ("LV", 13), ("MIA", 15), ("MIN", 16), ("NE", 17), ("NO", 18), ("NYG", 19),
    ("NYJ", 20), ("PHI", 21), ("PIT", 23), ("SEA", 26), ("SF", 25), ("TB", 27),
    ("TEN", 10), ("WSH", 28),
];

const NHL_ROSTER_GROUPS: [&str; 3] = ["forwards", "defensemen", "goalies"];

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn id_at(value: &Value, pointer: &str) -> Option<EntryId> {
    match value.pointer(pointer)? {
        Value::Number(n) => n.as_u64().map(EntryId::Num),
        Value::String(s) if !s.is_empty() => Some(EntryId::Text(s.clone())),
        _ => None,
    }
}

fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn parse_mlb_teams(data: &Value) -> Vec<TeamEntry> {
    array_at(data, "/teams")
        .iter()
        .filter_map(|team| {
            Some(TeamEntry {
                id: id_at(team, "/id")?,
                full_name: str_at(team, "/name")?.to_string(),
                abbreviation: str_at(team, "/abbreviation").unwrap_or_default().to_string(),
                city: str_at(team, "/locationName").map(str::to_string),
                nickname: str_at(team, "/teamName").map(str::to_string),
                league: League::Mlb,
            })
        })
        .collect()
}

pub fn parse_mlb_roster(data: &Value, team_id: &EntryId) -> Vec<PlayerEntry> {
    array_at(data, "/roster")
        .iter()
        .filter_map(|player| {
            Some(PlayerEntry {
                id: id_at(player, "/person/id")?,
                full_name: str_at(player, "/person/fullName")?.to_string(),
                first_name: None,
                last_name: None,
                is_active: true,
                league: League::Mlb,
                team_id: Some(team_id.clone()),
                position: str_at(player, "/position/abbreviation").map(str::to_string),
            })
        })
        .collect()
}

/// NHL teams are keyed by their abbreviation
pub fn parse_nhl_teams(data: &Value) -> Vec<TeamEntry> {
    array_at(data, "/standings")
        .iter()
        .filter_map(|team| {
            let abbrev = str_at(team, "/teamAbbrev/default")?;
            Some(TeamEntry {
                id: EntryId::Text(abbrev.to_string()),
                full_name: str_at(team, "/teamName/default").unwrap_or_default().to_string(),
                abbreviation: abbrev.to_string(),
                city: None,
                nickname: None,
                league: League::Nhl,
            })
        })
        .collect()
}

pub fn parse_nhl_roster(data: &Value, team_id: &EntryId) -> Vec<PlayerEntry> {
    NHL_ROSTER_GROUPS
        .iter()
        .flat_map(|group| array_at(data, &format!("/{}", group)))
        .filter_map(|player| {
            let first = str_at(player, "/firstName/default").unwrap_or_default();
            let last = str_at(player, "/lastName/default").unwrap_or_default();
            Some(PlayerEntry {
                id: id_at(player, "/id")?,
                full_name: format!("{} {}", first, last).trim().to_string(),
                first_name: Some(first.to_string()).filter(|s| !s.is_empty()),
                last_name: Some(last.to_string()).filter(|s| !s.is_empty()),
                is_active: true,
                league: League::Nhl,
                team_id: Some(team_id.clone()),
                position: str_at(player, "/positionCode").map(str::to_string),
            })
        })
        .collect()
}

/// Only franchises in the fixed id table are kept
pub fn parse_nfl_teams(data: &Value) -> Vec<TeamEntry> {
    array_at(data, "/sports/0/leagues/0/teams")
        .iter()
        .filter_map(|entry| {
            let team = entry.get("team")?;
            let id = match team.get("id")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let (abbrev, _) = NFL_TEAMS.iter().find(|(_, espn_id)| espn_id.to_string() == id)?;
            Some(TeamEntry {
                id: EntryId::Text(id),
                full_name: str_at(team, "/displayName").unwrap_or_default().to_string(),
                abbreviation: abbrev.to_string(),
                city: str_at(team, "/location").map(str::to_string),
                nickname: str_at(team, "/name").map(str::to_string),
                league: League::Nfl,
            })
        })
        .collect()
}

pub fn parse_nfl_players(data: &Value) -> Vec<PlayerEntry> {
    array_at(data, "/items")
        .iter()
        .filter(|player| player.get("active").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|player| {
            Some(PlayerEntry {
                id: id_at(player, "/id")?,
                full_name: str_at(player, "/displayName").unwrap_or_default().to_string(),
                first_name: str_at(player, "/firstName").map(str::to_string),
                last_name: str_at(player, "/lastName").map(str::to_string),
                is_active: true,
                league: League::Nfl,
                team_id: id_at(player, "/team/id"),
                position: str_at(player, "/position/abbreviation").map(str::to_string),
            })
        })
        .collect()
}

/// Client for the public MLB, NHL and ESPN roster endpoints
pub struct RostersApiClient {
    client: Client,
    pause: Duration,
}

impl RostersApiClient {
    /// `pause` is slept between per-team roster calls
    pub fn new(pause: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, pause })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned error: {}", url, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// MLB teams plus each team's 40-man roster
    pub async fn fetch_mlb(&self) -> Result<RosterSnapshot> {
        info!("Fetching MLB data...");
        let teams_data = self
            .get_json(&format!("{}/teams?sportId=1", MLB_API_BASE))
            .await?;
        let teams = parse_mlb_teams(&teams_data);

        let mut players = Vec::new();
        for team in &teams {
            let url = format!("{}/teams/{}/roster/40man", MLB_API_BASE, team.id);
            match self.get_json(&url).await {
                Ok(roster) => players.extend(parse_mlb_roster(&roster, &team.id)),
                Err(e) => warn!("Error fetching roster for MLB team {}: {:#}", team.id, e),
            }
            tokio::time::sleep(self.pause).await;
        }

        Ok(RosterSnapshot { players, teams })
    }

    /// NHL teams from the current standings plus each team's current roster
    pub async fn fetch_nhl(&self) -> Result<RosterSnapshot> {
        info!("Fetching NHL data...");
        let standings = self
            .get_json(&format!("{}/standings/now", NHL_API_BASE))
            .await?;
        let teams = parse_nhl_teams(&standings);

        let mut players = Vec::new();
        for team in &teams {
            let url = format!("{}/roster/{}/current", NHL_API_BASE, team.abbreviation);
            match self.get_json(&url).await {
                Ok(roster) => players.extend(parse_nhl_roster(&roster, &team.id)),
                Err(e) => warn!("Error fetching roster for NHL team {}: {:#}", team.abbreviation, e),
            }
            tokio::time::sleep(self.pause).await;
        }

        Ok(RosterSnapshot { players, teams })
    }

    /// NFL teams and all active athletes from ESPN
    pub async fn fetch_nfl(&self) -> Result<RosterSnapshot> {
        info!("Fetching NFL data...");
        let teams_data = self.get_json(ESPN_NFL_TEAMS_URL).await?;
        let teams = parse_nfl_teams(&teams_data);

        let players = match self.get_json(ESPN_NFL_ATHLETES_URL).await {
            Ok(data) => parse_nfl_players(&data),
            Err(e) => {
                warn!("Error fetching NFL players: {:#}", e);
                Vec::new()
            }
        };

        Ok(RosterSnapshot { players, teams })
    }
}
