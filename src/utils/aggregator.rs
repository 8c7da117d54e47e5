use crate::models::{AggregateSummary, GameRecord, Stat};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Season averages, dividing by the number of games played.
/// Missing values count as zero; an empty log yields all zeros.
pub fn aggregate(games: &[GameRecord]) -> AggregateSummary {
    let total = games.len();
    if total == 0 {
        return AggregateSummary::default();
    }

    let average = |stat: Stat| {
        let sum: f64 = games.iter().map(|g| g.value_or_zero(stat)).sum();
        round2(sum / total as f64)
    };

    AggregateSummary {
        games: total,
        avg_pts: average(Stat::Points),
        avg_ast: average(Stat::Assists),
        avg_reb: average(Stat::Rebounds),
        avg_stl: average(Stat::Steals),
        avg_blk: average(Stat::Blocks),
        avg_tov: average(Stat::Turnovers),
        avg_3pts: average(Stat::ThreesMade),
        avg_pf: average(Stat::PersonalFouls),
    }
}
