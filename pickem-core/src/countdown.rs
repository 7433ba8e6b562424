use chrono::{DateTime, Utc};

pub const GAME_STARTED_TEXT: &str = "Game has started - You can't make a pick post-kickoff";

/// Whole days, hours and minutes until kickoff, clamped to zero once the
/// game has started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    pub fn until(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
        let remaining = kickoff - now;
        if remaining.num_seconds() <= 0 {
            return Countdown {
                days: 0,
                hours: 0,
                minutes: 0,
            };
        }
        let seconds = remaining.num_seconds();
        Countdown {
            days: seconds / 86400,
            hours: (seconds % 86400) / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }

    pub fn has_kicked_off(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }

    pub fn text(&self) -> String {
        if self.has_kicked_off() {
            return GAME_STARTED_TEXT.to_string();
        }
        let day_unit = if self.days == 1 { "day" } else { "days" };
        let hour_unit = if self.hours == 1 { "hour" } else { "hours" };
        let minute_unit = if self.minutes == 1 { "minute" } else { "minutes" };
        format!(
            "{} {} : {} {} : {} {} to make your picks...",
            self.days, day_unit, self.hours, hour_unit, self.minutes, minute_unit
        )
    }
}
