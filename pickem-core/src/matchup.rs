/// Display texts for a weekly matchup card, in the shape the dashboard
/// renders them.
pub fn away_vs_home_text(away_team: &str, home_team: &str) -> String {
    format!("{} @ {}", away_team, home_team)
}

pub fn day_time_place_text(weekday: &str, gametime: &str, stadium: &str) -> String {
    format!("{} - {} ET @ {}", weekday, gametime, stadium)
}

pub fn rest_and_spread_text(
    away_team: &str,
    away_rest: i32,
    home_team: &str,
    home_rest: i32,
    spread_line: f64,
) -> String {
    format!(
        "{} rested {} days - {} rested {} days - Spread is {}",
        away_team, away_rest, home_team, home_rest, spread_line
    )
}
