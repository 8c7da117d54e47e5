use crate::models::Season;
use chrono::{Datelike, NaiveDate};

const SEASON_START_MONTH: u32 = 10;
const SEASONS_SHOWN: i32 = 5;

/// Season in progress on `today`; a new season starts in October
pub fn current_season(today: NaiveDate) -> Season {
    let start = if today.month() >= SEASON_START_MONTH {
        today.year()
    } else {
        today.year() - 1
    };
    Season::from_start_year(start)
}

/// The last five seasons, oldest first, ending with the current one
pub fn generate_seasons(today: NaiveDate) -> Vec<Season> {
    let current = current_season(today).start_year();
    (current - (SEASONS_SHOWN - 1)..=current)
        .map(Season::from_start_year)
        .collect()
}
