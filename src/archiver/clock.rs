use chrono::{DateTime, Datelike, FixedOffset, Local};
use chrono_tz::Tz;

/// Fixed English timestamp form used by the platform, after the weekday,
/// e.g. `Jan 02 15:04:05 +0800 2023` of `Mon Jan 02 15:04:05 +0800 2023`.
pub const CREATED_AT_FORMAT: &str = "%b %d %H:%M:%S %z %Y";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Strict parse: no surrounding whitespace is accepted. The weekday must be
/// a valid short name but is not checked against the date.
pub fn parse_created_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    let (weekday, rest) = raw.split_once(' ')?;
    if !WEEKDAYS.contains(&weekday) {
        return None;
    }
    DateTime::parse_from_str(rest, CREATED_AT_FORMAT).ok()
}

/// Zone in which a post's month is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthClock {
    #[default]
    Local,
    Zone(Tz),
}

impl MonthClock {
    pub fn from_name(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Some(Self::Local);
        }
        trimmed.parse::<Tz>().ok().map(Self::Zone)
    }

    /// `YYYY-MM` of `created_at` in this clock's zone, or `None` when the
    /// timestamp does not parse.
    pub fn month_key(&self, created_at: &str) -> Option<String> {
        let parsed = parse_created_at(created_at)?;
        let (year, month) = match self {
            Self::Local => {
                let local = parsed.with_timezone(&Local);
                (local.year(), local.month())
            }
            Self::Zone(tz) => {
                let zoned = parsed.with_timezone(tz);
                (zoned.year(), zoned.month())
            }
        };
        Some(format!("{year:04}-{month:02}"))
    }
}
