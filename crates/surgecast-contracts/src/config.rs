//! Hospital configuration snapshot and the seasonal/hazard vocabulary it is
//! keyed by.
//!
//! A `HospitalConfig` is built once by the hosting application (usually from
//! TOML) and shared read-only across every agent in a run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Indian-climate seasons the uplift factors are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Winter,
    Summer,
    Monsoon,
    PostMonsoon,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Summer, Season::Monsoon, Season::PostMonsoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Summer => "SUMMER",
            Season::Monsoon => "MONSOON",
            Season::PostMonsoon => "POST_MONSOON",
        }
    }

    /// Parse the wire form (`"WINTER"`, `"POST_MONSOON"`, …), case-insensitively.
    pub fn parse(s: &str) -> Option<Season> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named hazards that may carry their own uplift override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardType {
    PollutionSpike,
    Heatwave,
    DengueOutbreak,
    InfluenzaSurge,
}

impl HazardType {
    pub const ALL: [HazardType; 4] = [
        HazardType::PollutionSpike,
        HazardType::Heatwave,
        HazardType::DengueOutbreak,
        HazardType::InfluenzaSurge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::PollutionSpike => "POLLUTION_SPIKE",
            HazardType::Heatwave => "HEATWAVE",
            HazardType::DengueOutbreak => "DENGUE_OUTBREAK",
            HazardType::InfluenzaSurge => "INFLUENZA_SURGE",
        }
    }

    pub fn parse(s: &str) -> Option<HazardType> {
        HazardType::ALL
            .into_iter()
            .find(|hazard| hazard.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for HazardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Expert-provided load multipliers per season, plus a festival multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UpliftFactors {
    pub winter: f64,
    pub summer: f64,
    pub monsoon: f64,
    pub post_monsoon: f64,
    pub festival: f64,
}

impl UpliftFactors {
    pub fn for_season(&self, season: Season) -> f64 {
        match season {
            Season::Winter => self.winter,
            Season::Summer => self.summer,
            Season::Monsoon => self.monsoon,
            Season::PostMonsoon => self.post_monsoon,
        }
    }
}

/// Optional per-hazard multipliers. Missing entries mean "no override".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct HazardUplifts {
    pub pollution_spike: Option<f64>,
    pub heatwave: Option<f64>,
    pub dengue_outbreak: Option<f64>,
    pub influenza_surge: Option<f64>,
}

impl HazardUplifts {
    pub fn get(&self, hazard: HazardType) -> Option<f64> {
        match hazard {
            HazardType::PollutionSpike => self.pollution_spike,
            HazardType::Heatwave => self.heatwave,
            HazardType::DengueOutbreak => self.dengue_outbreak,
            HazardType::InfluenzaSurge => self.influenza_surge,
        }
    }
}

/// Immutable-per-run configuration snapshot for one hospital.
///
/// The core never validates numeric ranges: callers supply sane values
/// (positive occupancy target, non-zero staff ratios).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalConfig {
    pub hospital_id: String,
    pub name: String,
    pub location: Location,

    // Beds
    pub total_beds: u32,
    pub allocated_beds_for_risk: u32,
    pub avg_length_of_stay_days: f64,
    /// Fraction in `(0, 1)`, e.g. 0.85.
    pub target_occupancy: f64,

    // Staff per shift
    pub current_doctors_per_shift: u32,
    pub current_nurses_per_shift: u32,
    pub max_patients_per_doctor_per_shift: f64,
    pub max_patients_per_nurse_per_shift: f64,

    pub baseline_patients_per_day: f64,

    pub uplift_factors: UpliftFactors,
    #[serde(default)]
    pub hazard_uplift_overrides: HazardUplifts,
}

impl HospitalConfig {
    pub fn season_uplift(&self, season: Season) -> f64 {
        self.uplift_factors.for_season(season)
    }

    /// Uplift override for a hazard, or 1.0 when none is configured.
    pub fn hazard_uplift(&self, hazard: HazardType) -> f64 {
        self.hazard_uplift_overrides.get(hazard).unwrap_or(1.0)
    }
}
