//! Festival calendar for 2024–2026 with historical surge multipliers.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Days ahead the festival detector looks.
pub const FESTIVAL_WINDOW_DAYS: i64 = 30;

// (year, month, day, name, surge multiplier)
const CALENDAR: &[(i32, u32, u32, &str, f64)] = &[
    (2024, 1, 15, "Makar Sankranti", 1.3),
    (2024, 3, 25, "Holi", 1.8),
    (2024, 4, 11, "Eid al-Fitr", 1.5),
    (2024, 4, 17, "Ram Navami", 1.4),
    (2024, 8, 15, "Independence Day", 1.2),
    (2024, 9, 7, "Ganesh Chaturthi", 2.0),
    (2024, 10, 12, "Dussehra", 2.2),
    (2024, 11, 1, "Diwali", 3.0),
    (2024, 12, 25, "Christmas", 1.5),
    (2025, 1, 14, "Makar Sankranti", 1.3),
    (2025, 3, 14, "Holi", 1.8),
    (2025, 3, 31, "Eid al-Fitr", 1.5),
    (2025, 4, 6, "Ram Navami", 1.4),
    (2025, 8, 15, "Independence Day", 1.2),
    (2025, 8, 27, "Ganesh Chaturthi", 2.0),
    (2025, 10, 2, "Dussehra", 2.2),
    (2025, 10, 20, "Diwali", 3.0),
    (2025, 12, 25, "Christmas", 1.5),
    (2026, 1, 14, "Makar Sankranti", 1.3),
    (2026, 3, 4, "Holi", 1.8),
    (2026, 3, 21, "Eid al-Fitr", 1.5),
    (2026, 3, 27, "Ram Navami", 1.4),
    (2026, 8, 15, "Independence Day", 1.2),
    (2026, 9, 16, "Ganesh Chaturthi", 2.0),
    (2026, 10, 22, "Dussehra", 2.2),
    (2026, 11, 8, "Diwali", 3.0),
    (2026, 12, 25, "Christmas", 1.5),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Festival {
    pub name: String,
    pub date: NaiveDate,
    pub surge_multiplier: f64,
}

/// A festival inside the look-ahead window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingFestival {
    #[serde(flatten)]
    pub festival: Festival,
    pub days_until: i64,
}

/// Every festival in the calendar, in date order.
pub fn calendar() -> Vec<Festival> {
    CALENDAR
        .iter()
        .filter_map(|&(y, m, d, name, surge_multiplier)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|date| Festival {
                name: name.to_string(),
                date,
                surge_multiplier,
            })
        })
        .collect()
}

/// Festivals falling on `now`'s date or within `days_ahead` days after it.
///
/// The window may cross a year boundary. Outside 2024–2026 nothing is found.
pub fn upcoming_festivals(now: DateTime<Utc>, days_ahead: i64) -> Vec<UpcomingFestival> {
    let today = now.date_naive();
    let horizon = today + Duration::days(days_ahead);

    calendar()
        .into_iter()
        .filter(|f| f.date >= today && f.date <= horizon)
        .map(|festival| {
            let days_until = (festival.date - today).num_days();
            UpcomingFestival { festival, days_until }
        })
        .collect()
}
