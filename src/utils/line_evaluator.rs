use crate::models::{Direction, FlagStat, GameRecord, LineQuery, LineResult, LineStat};
use crate::utils::annotator::derive_flags;

/// Value compared against the threshold; absent stats count as zero
fn line_value(game: &GameRecord, statistic: LineStat) -> f64 {
    match statistic {
        LineStat::Raw(stat) => game.value_or_zero(stat),
        LineStat::Combined(combined) => combined
            .components()
            .iter()
            .map(|stat| game.value_or_zero(*stat))
            .sum(),
        // Flags never reach a numeric comparison
        LineStat::Flag(_) => 0.0,
    }
}

/// Whether a single game hit the line.
/// Numeric lines are strict: a value equal to the threshold is neither over nor under.
pub fn is_hit(game: &GameRecord, query: &LineQuery) -> bool {
    match query.statistic {
        LineStat::Flag(flag) => {
            let flags = derive_flags(game);
            let set = match flag {
                FlagStat::DoubleDouble => flags.is_double_double,
                FlagStat::TripleDouble => flags.is_triple_double,
            };
            match query.direction {
                Direction::Over => set,
                Direction::Under => !set,
            }
        }
        statistic => {
            let value = line_value(game, statistic);
            match query.direction {
                Direction::Over => value > query.threshold,
                Direction::Under => value < query.threshold,
            }
        }
    }
}

/// Per-game hit flags in provider order, for highlighting covered games
pub fn covered(games: &[GameRecord], query: &LineQuery) -> Vec<bool> {
    games.iter().map(|game| is_hit(game, query)).collect()
}

/// Count how often the line was hit over the whole log
pub fn evaluate(games: &[GameRecord], query: &LineQuery) -> LineResult {
    let hits = covered(games, query).into_iter().filter(|hit| *hit).count();
    let total = games.len();
    let hit_percentage = if total > 0 {
        100.0 * hits as f64 / total as f64
    } else {
        0.0
    };

    LineResult {
        hits,
        total,
        hit_percentage,
        label: query.statistic.label().to_string(),
        direction: query.direction,
        threshold: query.threshold,
    }
}
