use anyhow::{Context, Result};
use basketbase::api::nba_stats_api::NbaStatsClient;
use basketbase::api::rosters_api::RostersApiClient;
use basketbase::config::{Config, ROSTER_REQUEST_PAUSE};
use basketbase::data::{save_all_snapshots, save_game_log_to_csv, save_roster_snapshot};
use basketbase::fetcher::StatLogFetcher;
use basketbase::line_evaluator::{covered, evaluate};
use basketbase::player_directory::PlayerDirectory;
use basketbase::seasons::generate_seasons;
use basketbase::{
    aggregator::aggregate, annotator::annotate, load_directory, roster_source, snapshot_all_leagues,
    snapshot_league, Direction, League, LineQuery, LineStat, Season, Stat,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "basketbase")]
#[command(about = "Check player prop lines against season game logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the games in a season that covered a line
    CheckLine {
        /// Player as "First Last"
        #[arg(long)]
        player: String,
        /// Season, e.g. 2023-24
        #[arg(long)]
        season: Season,
        /// PTS, REB, AST, STL, BLK, TOV, FG3M, PF, PTS_AST, PTS_REB, PTS_AST_REB, DD or TD
        #[arg(long)]
        stat: LineStat,
        /// over or under
        #[arg(long)]
        direction: Direction,
        #[arg(long)]
        threshold: f64,
    },
    /// Print a player's annotated game log and season averages
    Stats {
        #[arg(long)]
        player: String,
        #[arg(long)]
        season: Season,
        /// Mark games covering this line in the CSV export, e.g. --line PTS over 20.5
        #[arg(long, num_args = 3, value_names = ["STAT", "DIRECTION", "THRESHOLD"])]
        line: Option<Vec<String>>,
        /// Save the log to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Suggest player names containing the query
    Suggest { query: String },
    /// List the selectable seasons
    Seasons,
    /// Save player and team rosters to a JSON file
    Snapshot {
        /// nba, mlb, nhl, nfl or all
        #[arg(long, default_value = "all")]
        league: LeagueTarget,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy)]
enum LeagueTarget {
    One(League),
    All,
}

impl std::str::FromStr for LeagueTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nba" => Ok(LeagueTarget::One(League::Nba)),
            "mlb" => Ok(LeagueTarget::One(League::Mlb)),
            "nhl" => Ok(LeagueTarget::One(League::Nhl)),
            "nfl" => Ok(LeagueTarget::One(League::Nfl)),
            "all" => Ok(LeagueTarget::All),
            _ => Err(format!("Unknown league: {}. Use nba, mlb, nhl, nfl or all.", s)),
        }
    }
}

struct Session {
    config: Config,
    nba: Arc<NbaStatsClient>,
}

impl Session {
    fn new() -> Result<Self> {
        let config = Config::from_env().context("Invalid configuration")?;
        let nba = Arc::new(
            NbaStatsClient::new(&config.nba_stats_base_url, config.fetch_timeout)
                .context("Failed to build NBA stats client")?,
        );
        Ok(Self { config, nba })
    }

    fn fetcher(&self) -> StatLogFetcher {
        StatLogFetcher::new(self.nba.clone(), self.config.retry.clone())
    }

    async fn directory(&self) -> Result<PlayerDirectory> {
        let roster = roster_source(&self.config, self.nba.clone());
        load_directory(roster.as_ref())
            .await
            .context("Failed to load player directory")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let session = Session::new()?;

    match cli.command {
        Commands::CheckLine {
            player,
            season,
            stat,
            direction,
            threshold,
        } => {
            let query = LineQuery::new(stat, direction, threshold)?;
            let player_id = session.directory().await?.resolve(&player)?;
            let games = session.fetcher().fetch(player_id, &season).await?;

            let result = evaluate(&games, &query);
            println!("{} ({})", player, season);
            println!("{}", result.message());
        }
        Commands::Stats {
            player,
            season,
            line,
            csv,
        } => {
            let query = match line.as_deref() {
                Some([stat, direction, threshold]) => {
                    let threshold: f64 = threshold
                        .parse()
                        .with_context(|| format!("Invalid threshold '{}'", threshold))?;
                    Some(LineQuery::parse(stat, direction, threshold)?)
                }
                _ => None,
            };

            let player_id = session.directory().await?.resolve(&player)?;
            let games = session.fetcher().fetch(player_id, &season).await?;
            let annotated = annotate(&games);

            println!("{} ({}), {} games\n", player, season, annotated.len());
            for game in &annotated {
                let r = &game.record;
                println!(
                    "{:<12} {:<12} {:>2}  {:>3} PTS {:>3} REB {:>3} AST{}{}",
                    r.game_date.as_deref().unwrap_or("-"),
                    r.matchup.as_deref().unwrap_or("-"),
                    r.result.as_deref().unwrap_or("-"),
                    r.value_or_zero(Stat::Points),
                    r.value_or_zero(Stat::Rebounds),
                    r.value_or_zero(Stat::Assists),
                    if game.flags.is_double_double { "  DD" } else { "" },
                    if game.flags.is_triple_double { " TD" } else { "" },
                );
            }

            let averages = aggregate(&games);
            println!(
                "\nAverages: {} PTS, {} REB, {} AST, {} STL, {} BLK, {} TOV, {} 3PM, {} PF",
                averages.avg_pts,
                averages.avg_reb,
                averages.avg_ast,
                averages.avg_stl,
                averages.avg_blk,
                averages.avg_tov,
                averages.avg_3pts,
                averages.avg_pf
            );

            if let Some(query) = &query {
                println!("{}", evaluate(&games, query).message());
            }

            if let Some(path) = csv {
                let marks = match &query {
                    Some(query) => covered(&games, query),
                    None => vec![false; games.len()],
                };
                save_game_log_to_csv(&annotated, &marks, &path)?;
                println!("\nSaved game log to {}", path.display());
            }
        }
        Commands::Suggest { query } => {
            let suggestions = session.directory().await?.suggest(&query);
            if suggestions.is_empty() {
                println!("No players found.");
            }
            for name in suggestions {
                println!("{}", name);
            }
        }
        Commands::Seasons => {
            for season in generate_seasons(Local::now().date_naive()) {
                println!("{}", season);
            }
        }
        Commands::Snapshot { league, output } => {
            let rosters = RostersApiClient::new(ROSTER_REQUEST_PAUSE)?;
            let today = Local::now().date_naive();

            match league {
                LeagueTarget::One(league) => {
                    let snapshot = snapshot_league(league, &session.nba, &rosters, today).await;
                    println!(
                        "{}: {} players, {} teams",
                        league,
                        snapshot.players.len(),
                        snapshot.teams.len()
                    );
                    save_roster_snapshot(&snapshot, &output)?;
                }
                LeagueTarget::All => {
                    let snapshots = snapshot_all_leagues(&session.nba, &rosters, today).await;
                    save_all_snapshots(&snapshots, &output)?;
                }
            }
            println!("Saved data to {}", output.display());
        }
    }

    Ok(())
}
