//! Deterministic capacity formulas: beds, staff, and supplies.
//!
//! Every function is pure. Each result carries a `CalculationExplanation`
//! naming the formula, its inputs, and the arithmetic chain, so a planner
//! can audit how a number was reached.
//!
//! Counts are rounded up ("units needed") and shortfalls clamp at zero.
//! A small tolerance is subtracted before rounding up so that floating-point
//! noise on an exact integer never adds a unit. It is `CEIL_EPSILON` for
//! small values and `CEIL_RELATIVE_EPSILON` times the value for large ones.
//! Integer allocations are subtracted after rounding, never before.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use surgecast_contracts::config::HospitalConfig;

use crate::forecasting::Severity;

/// Patients on the busiest shift relative to the daily mean.
pub const PEAK_SHIFT_FACTOR: f64 = 1.5;

/// Supply planning horizon in days.
pub const SUPPLY_HORIZON_DAYS: f64 = 7.0;

/// Share of predicted patients needing oxygen, and liters per patient-day.
pub const OXYGEN_PATIENT_SHARE: f64 = 0.4;
pub const OXYGEN_LITERS_PER_PATIENT_DAY: f64 = 10.0;

/// Share of predicted patients needing nebulizer treatment.
pub const NEBULIZER_PATIENT_SHARE: f64 = 0.3;

pub const CEIL_EPSILON: f64 = 1e-9;
pub const CEIL_RELATIVE_EPSILON: f64 = 1e-12;

// ── Inputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityInputs {
    pub baseline_patients_per_day: f64,
    pub seasonal_uplift: f64,
    pub risk_multiplier: f64,
    pub avg_length_of_stay_days: f64,
    pub target_occupancy: f64,
    pub allocated_beds_for_risk: u32,
    pub current_doctors_per_shift: u32,
    pub current_nurses_per_shift: u32,
    pub max_patients_per_doctor_per_shift: f64,
    pub max_patients_per_nurse_per_shift: f64,
}

impl CapacityInputs {
    /// Take the hospital's fixed parameters from `config`.
    pub fn from_config(config: &HospitalConfig, seasonal_uplift: f64, risk_multiplier: f64) -> Self {
        Self {
            baseline_patients_per_day: config.baseline_patients_per_day,
            seasonal_uplift,
            risk_multiplier,
            avg_length_of_stay_days: config.avg_length_of_stay_days,
            target_occupancy: config.target_occupancy,
            allocated_beds_for_risk: config.allocated_beds_for_risk,
            current_doctors_per_shift: config.current_doctors_per_shift,
            current_nurses_per_shift: config.current_nurses_per_shift,
            max_patients_per_doctor_per_shift: config.max_patients_per_doctor_per_shift,
            max_patients_per_nurse_per_shift: config.max_patients_per_nurse_per_shift,
        }
    }

    /// `baseline × uplift × risk`
    pub fn predicted_admissions(&self) -> f64 {
        self.baseline_patients_per_day * self.seasonal_uplift * self.risk_multiplier
    }
}

// ── Outputs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationExplanation {
    pub formula: String,
    pub inputs: BTreeMap<String, f64>,
    pub result: u64,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedCalculation {
    pub predicted_admissions: f64,
    pub peak_occupancy: f64,
    pub required_beds: f64,
    pub extra_beds: u64,
    pub explanation: CalculationExplanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCalculation {
    pub peak_load: f64,
    pub required_doctors: u64,
    pub required_nurses: u64,
    pub extra_doctors: u64,
    pub extra_nurses: u64,
    pub explanation: CalculationExplanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyRecommendation {
    pub item: String,
    pub quantity: u64,
    pub unit: String,
    pub urgency: Severity,
    pub explanation: CalculationExplanation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyCalculation {
    pub supplies: Vec<SupplyRecommendation>,
    pub explanation: CalculationExplanation,
}

/// The full plan the capacity calculator emits as its action data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRecommendation {
    pub extra_beds: u64,
    pub bed_explanation: CalculationExplanation,
    pub extra_doctors: u64,
    pub extra_nurses: u64,
    pub staff_explanation: CalculationExplanation,
    pub supplies: Vec<SupplyRecommendation>,
    pub overall_severity: Severity,
    pub summary: String,
}

// ── Formulas ─────────────────────────────────────────────────────────────────

/// Round `x` up to whole units, treating values within rounding tolerance
/// above an integer as that integer. Negative values become zero.
pub fn units_needed(x: f64) -> u64 {
    let tolerance = CEIL_EPSILON.max(x.abs() * CEIL_RELATIVE_EPSILON);
    let units = (x - tolerance).ceil();
    if units.is_finite() && units > 0.0 {
        units as u64
    } else {
        0
    }
}

/// `extra_beds = max(0, ceil(baseline × uplift × risk × LOS / target_occupancy − allocated))`
pub fn calculate_beds(inputs: &CapacityInputs) -> BedCalculation {
    let predicted_admissions = inputs.predicted_admissions();
    let peak_occupancy = predicted_admissions * inputs.avg_length_of_stay_days;
    let required_beds = peak_occupancy / inputs.target_occupancy;
    let extra_beds = units_needed(required_beds).saturating_sub(u64::from(inputs.allocated_beds_for_risk));

    let explanation = CalculationExplanation {
        formula: "extraBeds = max(0, ceil((baseline × uplift × risk × LOS / targetOcc) - allocated))".to_string(),
        inputs: BTreeMap::from([
            ("baseline".to_string(), inputs.baseline_patients_per_day),
            ("uplift".to_string(), inputs.seasonal_uplift),
            ("riskMultiplier".to_string(), inputs.risk_multiplier),
            ("avgLOS".to_string(), inputs.avg_length_of_stay_days),
            ("targetOcc".to_string(), inputs.target_occupancy),
            ("allocated".to_string(), f64::from(inputs.allocated_beds_for_risk)),
        ]),
        result: extra_beds,
        reasoning: format!(
            "Predicted {:.1} admissions/day → {:.1} patient-days → {:.1} beds required → {} extra beds needed",
            predicted_admissions, peak_occupancy, required_beds, extra_beds
        ),
    };

    BedCalculation {
        predicted_admissions,
        peak_occupancy,
        required_beds,
        extra_beds,
        explanation,
    }
}

/// `required = ceil(predicted × 1.5 / max_per_staff)`, `extra = max(0, required − current)`
pub fn calculate_staff(inputs: &CapacityInputs) -> StaffCalculation {
    let peak_load = inputs.predicted_admissions() * PEAK_SHIFT_FACTOR;
    let required_doctors = units_needed(peak_load / inputs.max_patients_per_doctor_per_shift);
    let required_nurses = units_needed(peak_load / inputs.max_patients_per_nurse_per_shift);
    let extra_doctors = required_doctors.saturating_sub(u64::from(inputs.current_doctors_per_shift));
    let extra_nurses = required_nurses.saturating_sub(u64::from(inputs.current_nurses_per_shift));

    let explanation = CalculationExplanation {
        formula: "extraStaff = max(0, ceil(peakLoad / maxPatientsPerStaff) - current)".to_string(),
        inputs: BTreeMap::from([
            ("peakLoad".to_string(), peak_load),
            ("maxPatientsPerDoctor".to_string(), inputs.max_patients_per_doctor_per_shift),
            ("maxPatientsPerNurse".to_string(), inputs.max_patients_per_nurse_per_shift),
            ("currentDoctors".to_string(), f64::from(inputs.current_doctors_per_shift)),
            ("currentNurses".to_string(), f64::from(inputs.current_nurses_per_shift)),
        ]),
        result: extra_doctors + extra_nurses,
        reasoning: format!(
            "Peak load {:.1} patients → Need {} doctors (+{}), {} nurses (+{})",
            peak_load, required_doctors, extra_doctors, required_nurses, extra_nurses
        ),
    };

    StaffCalculation {
        peak_load,
        required_doctors,
        required_nurses,
        extra_doctors,
        extra_nurses,
        explanation,
    }
}

/// Oxygen and nebulizers over a `SUPPLY_HORIZON_DAYS` horizon.
pub fn calculate_supplies(inputs: &CapacityInputs) -> SupplyCalculation {
    let predicted = inputs.predicted_admissions();

    let oxygen = units_needed(predicted * OXYGEN_PATIENT_SHARE * SUPPLY_HORIZON_DAYS * OXYGEN_LITERS_PER_PATIENT_DAY);
    let nebulizers = units_needed(predicted * NEBULIZER_PATIENT_SHARE);

    let supplies = vec![
        SupplyRecommendation {
            item: "Oxygen".to_string(),
            quantity: oxygen,
            unit: "liters".to_string(),
            urgency: Severity::High,
            explanation: CalculationExplanation {
                formula: "oxygen = patients × 0.4 × days × 10".to_string(),
                inputs: BTreeMap::from([
                    ("predictedPatients".to_string(), predicted),
                    ("duration".to_string(), SUPPLY_HORIZON_DAYS),
                ]),
                result: oxygen,
                reasoning: "40% of patients need oxygen support".to_string(),
            },
        },
        SupplyRecommendation {
            item: "Nebulizers".to_string(),
            quantity: nebulizers,
            unit: "units".to_string(),
            urgency: Severity::Medium,
            explanation: CalculationExplanation {
                formula: "nebulizers = ceil(patients × 0.3)".to_string(),
                inputs: BTreeMap::from([("predictedPatients".to_string(), predicted)]),
                result: nebulizers,
                reasoning: "30% of patients need nebulizer treatment".to_string(),
            },
        },
    ];

    let explanation = CalculationExplanation {
        formula: "Various supply-specific formulas".to_string(),
        inputs: BTreeMap::from([
            ("predictedPatients".to_string(), predicted),
            ("duration".to_string(), SUPPLY_HORIZON_DAYS),
        ]),
        result: supplies.len() as u64,
        reasoning: format!("Calculated {} critical supply categories", supplies.len()),
    };

    SupplyCalculation { supplies, explanation }
}

/// Severity of a bed shortfall, from required beds per allocated bed.
///
/// `≤ 1` LOW, `≤ 2` MEDIUM, `≤ 4` HIGH, otherwise CRITICAL.
pub fn bed_pressure_severity(required_beds: f64, allocated_beds: u32) -> Severity {
    if allocated_beds == 0 {
        return if required_beds > 0.0 { Severity::Critical } else { Severity::Low };
    }
    let ratio = required_beds / f64::from(allocated_beds);
    if ratio <= 1.0 {
        Severity::Low
    } else if ratio <= 2.0 {
        Severity::Medium
    } else if ratio <= 4.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Run every formula and assemble the recommendation.
pub fn plan(inputs: &CapacityInputs, summary: impl Into<String>) -> CapacityRecommendation {
    let beds = calculate_beds(inputs);
    let staff = calculate_staff(inputs);
    let supplies = calculate_supplies(inputs);

    CapacityRecommendation {
        extra_beds: beds.extra_beds,
        overall_severity: bed_pressure_severity(beds.required_beds, inputs.allocated_beds_for_risk),
        bed_explanation: beds.explanation,
        extra_doctors: staff.extra_doctors,
        extra_nurses: staff.extra_nurses,
        staff_explanation: staff.explanation,
        supplies: supplies.supplies,
        summary: summary.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    /// AIIMS Delhi with a 1.3 seasonal uplift and the default 1.5 risk.
    fn reference_inputs() -> CapacityInputs {
        CapacityInputs::from_config(&default_config(), 1.3, 1.5)
    }

    #[test]
    fn reference_bed_scenario() {
        let beds = calculate_beds(&reference_inputs());

        assert!((beds.predicted_admissions - 97.5).abs() < 1e-9);
        assert!((beds.peak_occupancy - 292.5).abs() < 1e-9);
        assert!((beds.required_beds - 344.117_647).abs() < 1e-4);
        assert_eq!(beds.extra_beds, 245);
        assert_eq!(beds.explanation.result, 245);
        assert_eq!(beds.explanation.inputs["allocated"], 100.0);
    }

    #[test]
    fn reference_staff_scenario() {
        let staff = calculate_staff(&reference_inputs());

        assert!((staff.peak_load - 146.25).abs() < 1e-9);
        assert_eq!(staff.required_doctors, 10);
        assert_eq!(staff.extra_doctors, 0, "15 doctors on shift already cover 10");
        assert_eq!(staff.required_nurses, 30);
        assert_eq!(staff.extra_nurses, 0);
        assert_eq!(staff.explanation.result, 0);
    }

    #[test]
    fn reference_supply_scenario() {
        let supplies = calculate_supplies(&reference_inputs());

        assert_eq!(supplies.supplies.len(), 2);
        assert_eq!(supplies.supplies[0].item, "Oxygen");
        assert_eq!(supplies.supplies[0].quantity, 2730);
        assert_eq!(supplies.supplies[1].quantity, 30);
        assert_eq!(supplies.explanation.result, 2);
    }

    #[test]
    fn exact_boundary_adds_no_unit() {
        // 10 × 8.5 / 0.85 = 100 beds required, 100 allocated.
        let inputs = CapacityInputs {
            baseline_patients_per_day: 10.0,
            seasonal_uplift: 1.0,
            risk_multiplier: 1.0,
            avg_length_of_stay_days: 8.5,
            target_occupancy: 0.85,
            ..reference_inputs()
        };
        assert_eq!(calculate_beds(&inputs).extra_beds, 0);

        // peak load 15 patients, 15 per doctor → exactly one doctor.
        let staff = calculate_staff(&inputs);
        assert_eq!(staff.required_doctors, 1);
        assert_eq!(staff.required_nurses, 3);
    }

    #[test]
    fn results_are_never_negative() {
        let quiet = CapacityInputs {
            risk_multiplier: 0.0,
            ..reference_inputs()
        };
        let rec = plan(&quiet, "nothing expected");

        assert_eq!(rec.extra_beds, 0);
        assert_eq!(rec.extra_doctors, 0);
        assert_eq!(rec.extra_nurses, 0);
        assert!(rec.supplies.iter().all(|s| s.quantity == 0));
        assert_eq!(rec.overall_severity, Severity::Low);
    }

    #[test]
    fn plan_is_deterministic() {
        let a = plan(&reference_inputs(), "summary");
        let b = plan(&reference_inputs(), "summary");
        assert_eq!(a, b);
        assert_eq!(a.overall_severity, Severity::High);
    }

    #[test]
    fn units_needed_handles_noise_and_negatives() {
        assert_eq!(units_needed(3.0 + 1e-12), 3);
        assert_eq!(units_needed(3.000_001), 4);
        assert_eq!(units_needed(-7.5), 0);
        assert_eq!(units_needed(f64::NAN), 0);
    }

    #[test]
    fn units_needed_tolerance_scales_with_magnitude() {
        // A few ulps above 2e7 is larger than the absolute epsilon.
        let noisy = 2.0e7 * (1.0 + 4.0 * f64::EPSILON);
        assert!(noisy - 2.0e7 > CEIL_EPSILON);
        assert_eq!(units_needed(noisy), 20_000_000);
        assert_eq!(units_needed(2.0e7 + 0.5), 20_000_001);
    }

    #[test]
    fn large_hospital_at_exact_capacity_needs_no_extra_beds() {
        // 3_000_000 × 3 / 0.9 lands on 10_000_000 give or take a few ulps.
        let inputs = CapacityInputs {
            baseline_patients_per_day: 3_000_000.0,
            seasonal_uplift: 1.0,
            risk_multiplier: 1.0,
            avg_length_of_stay_days: 3.0,
            target_occupancy: 0.9,
            allocated_beds_for_risk: 10_000_000,
            current_doctors_per_shift: 0,
            current_nurses_per_shift: 0,
            max_patients_per_doctor_per_shift: 15.0,
            max_patients_per_nurse_per_shift: 5.0,
        };
        assert_eq!(calculate_beds(&inputs).extra_beds, 0);
    }

    #[test]
    fn bed_pressure_bands() {
        assert_eq!(bed_pressure_severity(90.0, 100), Severity::Low);
        assert_eq!(bed_pressure_severity(150.0, 100), Severity::Medium);
        assert_eq!(bed_pressure_severity(344.0, 100), Severity::High);
        assert_eq!(bed_pressure_severity(401.0, 100), Severity::Critical);
        assert_eq!(bed_pressure_severity(1.0, 0), Severity::Critical);
    }
}
