//! Reference data for the COMAU Smart Six 6-1.4.
//!
//! Positions are from Table 2 of Guida et al. (2019). The paper only prints
//! joint values for the zero and base-rotation poses; the singular and
//! numerical-example joint vectors were recovered by grid search and land
//! 21 mm and 13 mm from the printed positions.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationTarget, Refinement, SearchAxis, SearchUnit};
use crate::link::DhParam;
use crate::validation::{ValidationCase, DEFAULT_TOLERANCE};

fn degrees(q: [f64; 6]) -> Vec<f64> {
    q.iter().map(|v| v.to_radians()).collect()
}

pub const ZERO_POSITION: [f64; 3] = [0.87, 0.0, 1.17];
pub const BASE_ROTATION_POSITION: [f64; 3] = [0.0, 0.87, 1.17];
pub const SINGULAR_POSITION: [f64; 3] = [0.45, 0.0, 0.87];
pub const NUMERICAL_POSITION: [f64; 3] = [1.19, 0.0, 0.501];

/// The four Table 2 configurations with the 50 mm tolerance.
pub fn paper_cases() -> Vec<ValidationCase> {
    vec![
        ValidationCase::new("q_z", vec![0.0; 6], Vector3::from(ZERO_POSITION))
            .with_description("Home position, all joints at zero"),
        ValidationCase::new(
            "q_r",
            degrees([90.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            Vector3::from(BASE_ROTATION_POSITION),
        )
        .with_description("90° rotation about the base Z axis"),
        ValidationCase::new(
            "q_s",
            degrees([0.0, 45.0, -60.0, 0.0, 60.0, 0.0]),
            Vector3::from(SINGULAR_POSITION),
        )
        .with_description("Singular configuration"),
        ValidationCase::new(
            "q_n",
            degrees([0.0, -45.0, 0.0, 0.0, 60.0, 0.0]),
            Vector3::from(NUMERICAL_POSITION),
        )
        .with_description("Numerical example configuration"),
    ]
    .into_iter()
    .map(|case| case.with_tolerance(DEFAULT_TOLERANCE))
    .collect()
}

/// Named search setups that were used to calibrate the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationPreset {
    /// Shoulder offset a1 over 0..200 mm against the zero pose.
    ShoulderOffset,
    /// Joint 2 angular offset over ±180° against the zero pose.
    Joint2Offset,
    /// q2, q3, q5 sweep towards the singular position.
    SingularConfig,
    /// q1..q5 sweep towards the numerical example, refined ±10° at 2°.
    NumericalExample,
}

impl CalibrationPreset {
    pub const ALL: [CalibrationPreset; 4] = [
        CalibrationPreset::ShoulderOffset,
        CalibrationPreset::Joint2Offset,
        CalibrationPreset::SingularConfig,
        CalibrationPreset::NumericalExample,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CalibrationPreset::ShoulderOffset => "a1",
            CalibrationPreset::Joint2Offset => "offset2",
            CalibrationPreset::SingularConfig => "q_s",
            CalibrationPreset::NumericalExample => "q_n",
        }
    }

    pub fn target(&self) -> CalibrationTarget {
        match self {
            CalibrationPreset::ShoulderOffset => {
                CalibrationTarget::new(Vector3::from(ZERO_POSITION), DEFAULT_TOLERANCE).with_axis(
                    SearchAxis::parameter(0, DhParam::A, 0.0, 200.0, 1.0, SearchUnit::Millimeters),
                )
            }
            CalibrationPreset::Joint2Offset => {
                CalibrationTarget::new(Vector3::from(ZERO_POSITION), DEFAULT_TOLERANCE).with_axis(
                    SearchAxis::parameter(
                        1,
                        DhParam::Offset,
                        -180.0,
                        180.0,
                        15.0,
                        SearchUnit::Degrees,
                    ),
                )
            }
            CalibrationPreset::SingularConfig => {
                CalibrationTarget::new(Vector3::from(SINGULAR_POSITION), DEFAULT_TOLERANCE)
                    .with_axis(SearchAxis::joint_degrees(1, -90.0, 180.0, 15.0))
                    .with_axis(SearchAxis::joint_degrees(2, -90.0, 90.0, 15.0))
                    .with_axis(SearchAxis::joint_degrees(4, 0.0, 90.0, 30.0))
            }
            CalibrationPreset::NumericalExample => {
                CalibrationTarget::new(Vector3::from(NUMERICAL_POSITION), DEFAULT_TOLERANCE)
                    .with_axis(SearchAxis::joint_degrees(0, 0.0, 90.0, 15.0))
                    .with_axis(SearchAxis::joint_degrees(1, -90.0, 180.0, 15.0))
                    .with_axis(SearchAxis::joint_degrees(2, -90.0, 90.0, 15.0))
                    .with_axis(SearchAxis::joint_degrees(3, 0.0, 90.0, 30.0))
                    .with_axis(SearchAxis::joint_degrees(4, 0.0, 90.0, 30.0))
                    .with_refinement(Refinement::new(10.0, 2.0))
            }
        }
    }
}

impl fmt::Display for CalibrationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CalibrationPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalibrationPreset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = CalibrationPreset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset `{}`, expected one of {}", s, names.join(", "))
            })
    }
}
