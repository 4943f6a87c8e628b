//! Taur body proportions.
//!
//! An anthro height is split into legs (4/8), torso (3/8) and head (1/8).
//! The taur's upper body keeps the anthro torso and head scaled by the anthro
//! ratio `full_height / anthro_height`, while the lower body keeps the species
//! proportions scaled by the taur ratio `taur_height / species_height`.
//! Weight scales with the cube of the anthro ratio, reported with a ±10% band.

use crate::error::{SizeDiffError, SizeDiffResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How the lower body length is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaurMeasurement {
    /// Mammal-style: the taur stands as tall as the anthro legs.
    #[default]
    Limb,
    /// Reptile-style: the body length is twice the torso less the head.
    Vitruvian,
}

impl FromStr for TaurMeasurement {
    type Err = SizeDiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "limb" => Ok(TaurMeasurement::Limb),
            "vitruvian" => Ok(TaurMeasurement::Vitruvian),
            other => Err(SizeDiffError::Measurement(format!(
                "unknown measurement type {other:?}, expected limb or vitruvian"
            ))),
        }
    }
}

impl fmt::Display for TaurMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaurMeasurement::Limb => "limb",
            TaurMeasurement::Vitruvian => "vitruvian",
        })
    }
}

/// Measurements in inches and pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaurInput {
    /// Height of the anthro form before taurification.
    pub anthro_height: f64,
    /// Shoulder height of the feral species.
    pub species_height: f64,
    /// Body length of the feral species, without the tail.
    pub species_length: f64,
    pub species_tail_length: f64,
    /// Desired height of the taur from the ground to the top of the head.
    pub taur_full_height: f64,
    pub species_weight: f64,
    /// Body length override for limb measurement.
    #[serde(default)]
    pub taur_length: Option<f64>,
    #[serde(default)]
    pub measurement: TaurMeasurement,
    /// Extra anthro measurements to carry over, scaled by the anthro ratio.
    #[serde(default)]
    pub custom_body_parts: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaurDimensions {
    pub taur_height: f64,
    pub taur_full_height: f64,
    pub taur_length: f64,
    pub taur_tail: f64,
    pub taur_torso: f64,
    pub taur_head: f64,
    pub weight: f64,
    pub weight_low: f64,
    pub weight_high: f64,
    pub custom_body_parts: BTreeMap<String, f64>,
    pub anthro_ratio: f64,
    pub taur_ratio: f64,
}

fn check(name: &str, value: f64) -> SizeDiffResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SizeDiffError::Measurement(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

/// Compute taur proportions. A zero species height gives a zero taur ratio.
pub fn calculate_taur(input: &TaurInput) -> SizeDiffResult<TaurDimensions> {
    let anthro_height = check("anthro_height", input.anthro_height)?;
    if anthro_height == 0.0 {
        return Err(SizeDiffError::Measurement(
            "anthro_height must be greater than zero".to_string(),
        ));
    }
    let species_height = check("species_height", input.species_height)?;
    let species_length = check("species_length", input.species_length)?;
    let species_tail_length = check("species_tail_length", input.species_tail_length)?;
    let taur_full_height = check("taur_full_height", input.taur_full_height)?;
    let species_weight = check("species_weight", input.species_weight)?;
    let taur_length_override = input
        .taur_length
        .map(|length| check("taur_length", length))
        .transpose()?;

    let anthro_legs = anthro_height * 4.0 / 8.0;
    let anthro_torso = anthro_height * 3.0 / 8.0;
    let anthro_head = anthro_height / 8.0;
    let anthro_ratio = taur_full_height / anthro_height;

    let (taur_height, taur_length) = match input.measurement {
        TaurMeasurement::Limb => (
            anthro_legs,
            taur_length_override.unwrap_or(species_length),
        ),
        TaurMeasurement::Vitruvian => (
            species_height * anthro_ratio,
            2.0 * anthro_torso - anthro_head,
        ),
    };
    let taur_ratio = if species_height > 0.0 {
        taur_height / species_height
    } else {
        0.0
    };

    let mut custom_body_parts = BTreeMap::new();
    for (part, value) in &input.custom_body_parts {
        custom_body_parts.insert(part.clone(), check(part, *value)? * anthro_ratio);
    }

    let weight = species_weight * anthro_ratio.powi(3);
    Ok(TaurDimensions {
        taur_height,
        taur_full_height,
        taur_length,
        taur_tail: species_tail_length * taur_ratio,
        taur_torso: anthro_torso * anthro_ratio,
        taur_head: anthro_head * anthro_ratio,
        weight,
        weight_low: weight * 0.9,
        weight_high: weight * 1.1,
        custom_body_parts,
        anthro_ratio,
        taur_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn input(measurement: TaurMeasurement) -> TaurInput {
        TaurInput {
            anthro_height: 72.0,
            species_height: 30.0,
            species_length: 40.0,
            species_tail_length: 15.0,
            taur_full_height: 96.0,
            species_weight: 100.0,
            taur_length: None,
            measurement,
            custom_body_parts: BTreeMap::new(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_limb_taur() {
        let mut request = input(TaurMeasurement::Limb);
        request
            .custom_body_parts
            .insert("wingspan".to_string(), 90.0);
        let taur = calculate_taur(&request).unwrap();

        assert!(close(taur.anthro_ratio, 96.0 / 72.0));
        assert!(close(taur.taur_height, 36.0));
        assert!(close(taur.taur_ratio, 1.2));
        assert!(close(taur.taur_length, 40.0));
        assert!(close(taur.taur_tail, 18.0));
        assert!(close(taur.taur_torso, 36.0));
        assert!(close(taur.taur_head, 12.0));
        assert!(close(taur.custom_body_parts["wingspan"], 120.0));
        assert_eq!(taur.taur_full_height, 96.0);
    }

    #[test]
    fn test_limb_length_override() {
        let request = TaurInput {
            taur_length: Some(55.0),
            ..input(TaurMeasurement::Limb)
        };
        assert!(close(calculate_taur(&request).unwrap().taur_length, 55.0));
    }

    #[test]
    fn test_vitruvian_taur() {
        let request = TaurInput {
            // Ignored for vitruvian bodies
            taur_length: Some(55.0),
            ..input(TaurMeasurement::Vitruvian)
        };
        let taur = calculate_taur(&request).unwrap();
        // 2 * 27 - 9
        assert!(close(taur.taur_length, 45.0));
        assert!(close(taur.taur_height, 40.0));
        assert!(close(taur.taur_ratio, 40.0 / 30.0));
        assert!(close(taur.taur_tail, 20.0));
    }

    #[test]
    fn test_weight_band() {
        let request = TaurInput {
            taur_full_height: 144.0,
            ..input(TaurMeasurement::Limb)
        };
        let taur = calculate_taur(&request).unwrap();
        assert!(close(taur.weight, 800.0));
        assert!(close(taur.weight_low, 720.0));
        assert!(close(taur.weight_high, 880.0));
    }

    #[test]
    fn test_zero_species_height_gives_zero_ratio() {
        let request = TaurInput {
            species_height: 0.0,
            ..input(TaurMeasurement::Limb)
        };
        let taur = calculate_taur(&request).unwrap();
        assert_eq!(taur.taur_ratio, 0.0);
        assert_eq!(taur.taur_tail, 0.0);
    }

    #[rstest]
    #[case(0.0, 30.0)]
    #[case(-72.0, 30.0)]
    #[case(72.0, f64::NAN)]
    #[case(72.0, -1.0)]
    fn test_rejects_bad_measurements(#[case] anthro_height: f64, #[case] species_height: f64) {
        let request = TaurInput {
            anthro_height,
            species_height,
            ..input(TaurMeasurement::Limb)
        };
        assert!(matches!(
            calculate_taur(&request),
            Err(SizeDiffError::Measurement(_))
        ));
    }

    #[rstest]
    #[case("limb", TaurMeasurement::Limb)]
    #[case("Vitruvian", TaurMeasurement::Vitruvian)]
    fn test_measurement_names(#[case] name: &str, #[case] expected: TaurMeasurement) {
        assert_eq!(name.parse::<TaurMeasurement>().unwrap(), expected);
        assert_eq!(expected.to_string(), name.to_ascii_lowercase());
    }

    #[test]
    fn test_input_json_defaults() {
        let request: TaurInput = serde_json::from_str(
            r#"{"anthro_height": 72, "species_height": 30, "species_length": 40,
                "species_tail_length": 15, "taur_full_height": 96, "species_weight": 100}"#,
        )
        .unwrap();
        assert_eq!(request, input(TaurMeasurement::Limb));
        assert!("quadruped".parse::<TaurMeasurement>().is_err());
    }
}
