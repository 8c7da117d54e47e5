use crate::error::StatsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider-assigned player identifier
pub type PlayerId = u32;

/// One row of a player's game log as returned by the stats provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameRecord {
    #[serde(rename = "Game_ID", default)]
    pub game_id: Option<String>,
    #[serde(rename = "GAME_DATE", default)]
    pub game_date: Option<String>,
    #[serde(rename = "MATCHUP", default)]
    pub matchup: Option<String>,
    #[serde(rename = "WL", default)]
    pub result: Option<String>,
    #[serde(rename = "MIN", default)]
    pub minutes: Option<f64>,
    #[serde(rename = "PTS", default)]
    pub points: Option<f64>,
    #[serde(rename = "REB", default)]
    pub rebounds: Option<f64>,
    #[serde(rename = "AST", default)]
    pub assists: Option<f64>,
    #[serde(rename = "STL", default)]
    pub steals: Option<f64>,
    #[serde(rename = "BLK", default)]
    pub blocks: Option<f64>,
    #[serde(rename = "TOV", default)]
    pub turnovers: Option<f64>,
    #[serde(rename = "FG3M", default)]
    pub threes_made: Option<f64>,
    #[serde(rename = "PF", default)]
    pub personal_fouls: Option<f64>,
}

impl GameRecord {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::Points => self.points,
            Stat::Rebounds => self.rebounds,
            Stat::Assists => self.assists,
            Stat::Steals => self.steals,
            Stat::Blocks => self.blocks,
            Stat::Turnovers => self.turnovers,
            Stat::ThreesMade => self.threes_made,
            Stat::PersonalFouls => self.personal_fouls,
        }
    }

    /// Stat value with absent treated as zero
    pub fn value_or_zero(&self, stat: Stat) -> f64 {
        self.get(stat).unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: Stat, value: Option<f64>) {
        let slot = match stat {
            Stat::Points => &mut self.points,
            Stat::Rebounds => &mut self.rebounds,
            Stat::Assists => &mut self.assists,
            Stat::Steals => &mut self.steals,
            Stat::Blocks => &mut self.blocks,
            Stat::Turnovers => &mut self.turnovers,
            Stat::ThreesMade => &mut self.threes_made,
            Stat::PersonalFouls => &mut self.personal_fouls,
        };
        *slot = value;
    }
}

/// The eight raw box-score statistics tracked per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
    ThreesMade,
    PersonalFouls,
}

impl Stat {
    pub const ALL: [Stat; 8] = [
        Stat::Points,
        Stat::Rebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
        Stat::Turnovers,
        Stat::ThreesMade,
        Stat::PersonalFouls,
    ];

    /// Categories that count towards double-doubles and triple-doubles
    pub const DOUBLE_CATEGORIES: [Stat; 5] = [
        Stat::Points,
        Stat::Rebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Blocks,
    ];

    /// Column name used by the provider
    pub fn code(&self) -> &'static str {
        match self {
            Stat::Points => "PTS",
            Stat::Rebounds => "REB",
            Stat::Assists => "AST",
            Stat::Steals => "STL",
            Stat::Blocks => "BLK",
            Stat::Turnovers => "TOV",
            Stat::ThreesMade => "FG3M",
            Stat::PersonalFouls => "PF",
        }
    }

    pub fn from_code(code: &str) -> Option<Stat> {
        Stat::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// Synthetic per-game sums of raw statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedStat {
    PointsAssists,
    PointsRebounds,
    PointsAssistsRebounds,
}

impl CombinedStat {
    pub fn code(&self) -> &'static str {
        match self {
            CombinedStat::PointsAssists => "PTS_AST",
            CombinedStat::PointsRebounds => "PTS_REB",
            CombinedStat::PointsAssistsRebounds => "PTS_AST_REB",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CombinedStat::PointsAssists => "Points + Assists",
            CombinedStat::PointsRebounds => "Points + Rebounds",
            CombinedStat::PointsAssistsRebounds => "Points + Assists + Rebounds",
        }
    }

    pub fn components(&self) -> &'static [Stat] {
        match self {
            CombinedStat::PointsAssists => &[Stat::Points, Stat::Assists],
            CombinedStat::PointsRebounds => &[Stat::Points, Stat::Rebounds],
            CombinedStat::PointsAssistsRebounds => &[Stat::Points, Stat::Assists, Stat::Rebounds],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagStat {
    DoubleDouble,
    TripleDouble,
}

impl FlagStat {
    pub fn code(&self) -> &'static str {
        match self {
            FlagStat::DoubleDouble => "DD",
            FlagStat::TripleDouble => "TD",
        }
    }
}

/// Statistic a line can be set on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStat {
    Raw(Stat),
    Combined(CombinedStat),
    Flag(FlagStat),
}

impl LineStat {
    pub fn code(&self) -> &'static str {
        match self {
            LineStat::Raw(stat) => stat.code(),
            LineStat::Combined(combined) => combined.code(),
            LineStat::Flag(flag) => flag.code(),
        }
    }

    /// Human-readable name; combined kinds get a fixed label, everything else its code
    pub fn label(&self) -> &'static str {
        match self {
            LineStat::Combined(combined) => combined.label(),
            other => other.code(),
        }
    }
}

impl FromStr for LineStat {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stat = match s {
            "PTS_AST" => LineStat::Combined(CombinedStat::PointsAssists),
            "PTS_REB" => LineStat::Combined(CombinedStat::PointsRebounds),
            "PTS_AST_REB" => LineStat::Combined(CombinedStat::PointsAssistsRebounds),
            "DD" => LineStat::Flag(FlagStat::DoubleDouble),
            "TD" => LineStat::Flag(FlagStat::TripleDouble),
            other => LineStat::Raw(Stat::from_code(other).ok_or_else(|| {
                StatsError::Validation(format!("Unknown stat type: {}", other))
            })?),
        };
        Ok(stat)
    }
}

impl fmt::Display for LineStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Over,
    Under,
}

impl FromStr for Direction {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "over" => Ok(Direction::Over),
            "under" => Ok(Direction::Under),
            other => Err(StatsError::Validation(format!(
                "over_under must be 'over' or 'under', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => f.write_str("over"),
            Direction::Under => f.write_str("under"),
        }
    }
}

/// A line to check against a game log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineQuery {
    pub statistic: LineStat,
    pub direction: Direction,
    /// Ignored for flag statistics
    pub threshold: f64,
}

impl LineQuery {
    pub fn new(statistic: LineStat, direction: Direction, threshold: f64) -> Result<Self, StatsError> {
        if !threshold.is_finite() {
            return Err(StatsError::Validation(format!(
                "stat_value must be a finite number, got {}",
                threshold
            )));
        }
        Ok(Self {
            statistic,
            direction,
            threshold,
        })
    }

    /// Build a query from the raw request fields
    pub fn parse(stat_type: &str, over_under: &str, threshold: f64) -> Result<Self, StatsError> {
        Self::new(stat_type.parse()?, over_under.parse()?, threshold)
    }
}

/// Outcome of checking a line against a game log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineResult {
    pub hits: usize,
    pub total: usize,
    pub hit_percentage: f64,
    pub label: String,
    pub direction: Direction,
    pub threshold: f64,
}

impl LineResult {
    /// Format the result as a readable string
    pub fn message(&self) -> String {
        format!(
            "Line {} {} {} hit {}/{} times ({:.1}%)",
            self.direction,
            format_threshold(self.threshold),
            self.label,
            self.hits,
            self.total,
            self.hit_percentage
        )
    }
}

// 20 renders as "20.0", 25.5 as "25.5"
fn format_threshold(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Double-double / triple-double flags derived from a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedFlags {
    #[serde(rename = "DD")]
    pub is_double_double: bool,
    #[serde(rename = "TD")]
    pub is_triple_double: bool,
}

/// A game record together with its derived flags
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedGame {
    #[serde(flatten)]
    pub record: GameRecord,
    #[serde(flatten)]
    pub flags: DerivedFlags,
}

/// Season averages for a game log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub games: usize,
    pub avg_pts: f64,
    pub avg_ast: f64,
    pub avg_reb: f64,
    pub avg_stl: f64,
    pub avg_blk: f64,
    pub avg_tov: f64,
    pub avg_3pts: f64,
    pub avg_pf: f64,
}

/// Season identifier in "YYYY-YY" form, e.g. "2023-24"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Season(String);

impl Season {
    pub fn from_start_year(year: i32) -> Self {
        Season(format!("{}-{:02}", year, (year + 1).rem_euclid(100)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn start_year(&self) -> i32 {
        // Validated on construction
        self.0[..4].parse().unwrap_or_default()
    }
}

impl FromStr for Season {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            StatsError::Validation(format!(
                "Season must look like 2023-24, got '{}'",
                s
            ))
        };

        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        if start.len() != 4 || end.len() != 2 {
            return Err(invalid());
        }
        if !start.chars().chain(end.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let start_year: i32 = start.parse().map_err(|_| invalid())?;
        let end_year: i32 = end.parse().map_err(|_| invalid())?;
        if (start_year + 1) % 100 != end_year {
            return Err(invalid());
        }

        Ok(Season(s.to_string()))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Leagues covered by the roster snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum League {
    Nba,
    Mlb,
    Nhl,
    Nfl,
}

impl League {
    pub const ALL: [League; 4] = [League::Nba, League::Mlb, League::Nhl, League::Nfl];

    pub fn code(&self) -> &'static str {
        match self {
            League::Nba => "NBA",
            League::Mlb => "MLB",
            League::Nhl => "NHL",
            League::Nfl => "NFL",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Identifiers differ per provider: numeric for most, strings for ESPN and NHL teams
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Num(u64),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Num(n) => write!(f, "{}", n),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

/// A player row in a roster snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: EntryId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub league: League,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<EntryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

fn default_active() -> bool {
    true
}

/// A team row in a roster snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id: EntryId,
    pub full_name: String,
    pub abbreviation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub league: League,
}

/// Players and teams of one league
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub players: Vec<PlayerEntry>,
    pub teams: Vec<TeamEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_stat_codes_and_labels() {
        let stat: LineStat = "PTS_AST_REB".parse().unwrap();
        assert_eq!(stat.label(), "Points + Assists + Rebounds");
        assert_eq!(stat.code(), "PTS_AST_REB");

        let stat: LineStat = "FG3M".parse().unwrap();
        assert_eq!(stat, LineStat::Raw(Stat::ThreesMade));
        assert_eq!(stat.label(), "FG3M");

        let stat: LineStat = "TD".parse().unwrap();
        assert_eq!(stat.label(), "TD");

        assert!(matches!(
            "MINUTES".parse::<LineStat>(),
            Err(StatsError::Validation(_))
        ));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("over".parse::<Direction>().unwrap(), Direction::Over);
        assert_eq!("under".parse::<Direction>().unwrap(), Direction::Under);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_query_rejects_non_finite_threshold() {
        assert!(LineQuery::parse("PTS", "over", f64::NAN).is_err());
        assert!(LineQuery::parse("PTS", "over", f64::INFINITY).is_err());
        assert!(LineQuery::parse("PTS", "over", 25.5).is_ok());
    }

    #[test]
    fn test_season_parse() {
        let season: Season = "2023-24".parse().unwrap();
        assert_eq!(season.start_year(), 2023);
        assert_eq!(season.to_string(), "2023-24");
        assert_eq!(Season::from_start_year(1999).as_str(), "1999-00");
        assert!("1999-00".parse::<Season>().is_ok());

        assert!("2023-25".parse::<Season>().is_err());
        assert!("2023".parse::<Season>().is_err());
        assert!("23-24".parse::<Season>().is_err());
        assert!("abcd-ef".parse::<Season>().is_err());
    }

    #[test]
    fn test_game_record_rejects_unknown_keys() {
        let ok: GameRecord = serde_json::from_str(r#"{"PTS": 30, "REB": null}"#).unwrap();
        assert_eq!(ok.points, Some(30.0));
        assert_eq!(ok.rebounds, None);
        assert_eq!(ok.value_or_zero(Stat::Rebounds), 0.0);

        let err = serde_json::from_str::<GameRecord>(r#"{"PTS": 30, "PLUS_MINUS": 4}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_annotated_game_serializes_flags_alongside_record() {
        let game = AnnotatedGame {
            record: GameRecord {
                points: Some(12.0),
                ..Default::default()
            },
            flags: DerivedFlags {
                is_double_double: true,
                is_triple_double: false,
            },
        };
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["PTS"], 12.0);
        assert_eq!(value["DD"], true);
        assert_eq!(value["TD"], false);
    }

    #[test]
    fn test_line_result_message() {
        let result = LineResult {
            hits: 3,
            total: 10,
            hit_percentage: 30.0,
            label: "Points + Assists".to_string(),
            direction: Direction::Over,
            threshold: 35.0,
        };
        assert_eq!(
            result.message(),
            "Line over 35.0 Points + Assists hit 3/10 times (30.0%)"
        );

        let result = LineResult {
            threshold: 25.5,
            ..result
        };
        assert!(result.message().starts_with("Line over 25.5 "));
    }
}
