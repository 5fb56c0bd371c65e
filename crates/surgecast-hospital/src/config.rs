//! Loading `HospitalConfig` snapshots.
//!
//! The bundled `configs/aiims-delhi.toml` mirrors `default_config()`.

use std::path::Path;

use tracing::debug;

use surgecast_contracts::{
    config::{HazardUplifts, HospitalConfig, Location, UpliftFactors},
    error::{SurgeError, SurgeResult},
};

/// The reference configuration: AIIMS Delhi.
pub fn default_config() -> HospitalConfig {
    HospitalConfig {
        hospital_id: "AIIMS-DEL-001".to_string(),
        name: "All India Institute of Medical Sciences, Delhi".to_string(),
        location: Location {
            city: "Delhi".to_string(),
            state: "Delhi".to_string(),
            lat: Some(28.5672),
            lon: Some(77.2100),
        },
        total_beds: 500,
        allocated_beds_for_risk: 100,
        avg_length_of_stay_days: 3.0,
        target_occupancy: 0.85,
        current_doctors_per_shift: 15,
        current_nurses_per_shift: 40,
        max_patients_per_doctor_per_shift: 15.0,
        max_patients_per_nurse_per_shift: 5.0,
        baseline_patients_per_day: 50.0,
        uplift_factors: UpliftFactors {
            winter: 1.4,
            summer: 1.2,
            monsoon: 1.3,
            post_monsoon: 1.3,
            festival: 1.5,
        },
        hazard_uplift_overrides: HazardUplifts {
            pollution_spike: Some(1.35),
            heatwave: Some(1.25),
            dengue_outbreak: Some(1.4),
            influenza_surge: Some(1.45),
        },
    }
}

/// Parse `s` as a TOML hospital configuration.
///
/// Returns `SurgeError::ConfigError` if the TOML is malformed or a required
/// field is missing. Numeric ranges are not checked.
pub fn from_toml_str(s: &str) -> SurgeResult<HospitalConfig> {
    let config: HospitalConfig = toml::from_str(s).map_err(|e| SurgeError::ConfigError {
        reason: format!("failed to parse hospital config TOML: {}", e),
    })?;
    debug!(hospital_id = %config.hospital_id, "hospital config parsed");
    Ok(config)
}

/// Read the file at `path` and parse it with `from_toml_str`.
pub fn from_file(path: &Path) -> SurgeResult<HospitalConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| SurgeError::ConfigError {
        reason: format!("failed to read hospital config '{}': {}", path.display(), e),
    })?;
    from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use surgecast_contracts::config::{HazardType, Season};

    use super::*;

    const BUNDLED: &str = include_str!("../../../configs/aiims-delhi.toml");

    #[test]
    fn bundled_file_matches_default_config() {
        let parsed = from_toml_str(BUNDLED).unwrap();
        assert_eq!(parsed, default_config());
    }

    #[test]
    fn hazard_overrides_are_optional() {
        let without_overrides = BUNDLED
            .split("[hazard_uplift_overrides]")
            .next()
            .unwrap();
        let parsed = from_toml_str(without_overrides).unwrap();

        assert_eq!(parsed.hazard_uplift(HazardType::Heatwave), 1.0);
        assert_eq!(parsed.season_uplift(Season::Winter), 1.4);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        match from_toml_str("total_beds = [") {
            Err(SurgeError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let err = from_toml_str("hospital_id = \"X\"").unwrap_err();
        assert!(matches!(err, SurgeError::ConfigError { .. }));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = from_file(Path::new("/nonexistent/surgecast.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
