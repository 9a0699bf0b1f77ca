use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

/// Local event activity for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub count: u32,
    #[serde(serialize_with = "as_flag")]
    pub major: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Numeric code fed to the model. Spring and fall share code 2.
    pub fn code(self) -> u8 {
        match self {
            Season::Winter => 1,
            Season::Spring | Season::Fall => 2,
            Season::Summer => 3,
        }
    }
}

impl Serialize for Season {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Time- and location-derived signals for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextSignals {
    pub demand: u32,
    pub event: EventInfo,
    pub weather: bool,
    pub season: Season,
    pub day_of_week: u32,
    pub month: u32,
}

impl ContextSignals {
    /// Fill in the calendar-derived fields from `date`.
    pub fn with_date(demand: u32, event: EventInfo, weather: bool, date: NaiveDate) -> Self {
        let month = date.month();
        Self {
            demand,
            event,
            weather,
            season: Season::from_month(month),
            day_of_week: date.weekday().number_from_monday(),
            month,
        }
    }
}

pub(crate) fn as_flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_buckets() {
        let codes: Vec<u8> = (1..=12).map(|m| Season::from_month(m).code()).collect();
        assert_eq!(codes, vec![1, 1, 2, 2, 2, 3, 3, 3, 2, 2, 2, 1]);
        assert_eq!(Season::from_month(10), Season::Fall);
        assert_eq!(Season::from_month(4), Season::Spring);
    }

    #[test]
    fn test_calendar_fields() {
        // 2024-07-15 was a Monday
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let ctx = ContextSignals::with_date(70, EventInfo { count: 2, major: false }, false, date);
        assert_eq!(ctx.day_of_week, 1);
        assert_eq!(ctx.month, 7);
        assert_eq!(ctx.season, Season::Summer);

        // 2024-12-01 was a Sunday
        let date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let ctx = ContextSignals::with_date(70, EventInfo { count: 2, major: false }, false, date);
        assert_eq!(ctx.day_of_week, 7);
        assert_eq!(ctx.season.code(), 1);
    }

    #[test]
    fn test_event_serializes_major_as_flag() {
        let json = serde_json::to_value(EventInfo { count: 6, major: true }).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 6, "major": 1 }));
    }
}
