//! Batch comparison of forward kinematics against reference positions.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::KinematicChain;
use crate::error::KinematicsError;
use crate::kinematics::ForwardKinematics;

/// Default pass threshold, 50 mm.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// One reference configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Joint values in radians.
    pub q: Vec<f64>,
    /// Expected end-effector position in meters.
    pub reference: Vector3<f64>,
    /// Overrides the harness tolerance when set.
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl ValidationCase {
    pub fn new(name: impl Into<String>, q: Vec<f64>, reference: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            q,
            reference,
            tolerance: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

/// Outcome of a single case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub name: String,
    pub description: String,
    pub q: Vec<f64>,
    pub reference: Vector3<f64>,
    /// Computed end-effector position, absent when evaluation failed.
    pub computed: Option<Vector3<f64>>,
    /// Signed `computed - reference` per axis.
    pub delta: Option<Vector3<f64>>,
    pub error: Option<f64>,
    pub tolerance: f64,
    pub passed: bool,
    /// Set when the case could not be evaluated at all.
    pub failure: Option<KinematicsError>,
}

/// Per-case results plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub cases: Vec<CaseReport>,
    pub all_passed: bool,
}

impl ValidationReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.passed)
    }

    /// Largest error among evaluated cases.
    pub fn max_error(&self) -> Option<f64> {
        self.cases.iter().filter_map(|c| c.error).reduce(f64::max)
    }
}

/// Runs every case and reports each one; a failing case never stops the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationHarness {
    default_tolerance: f64,
    engine: ForwardKinematics,
}

impl Default for ValidationHarness {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ValidationHarness {
    pub fn new(default_tolerance: f64) -> Self {
        Self {
            default_tolerance,
            engine: ForwardKinematics::new(),
        }
    }

    pub fn default_tolerance(&self) -> f64 {
        self.default_tolerance
    }

    pub fn validate(&self, chain: &KinematicChain, cases: &[ValidationCase]) -> ValidationReport {
        let reports: Vec<CaseReport> =
            cases.iter().map(|case| self.run_case(chain, case)).collect();
        let all_passed = reports.iter().all(|r| r.passed);

        let passed = reports.iter().filter(|r| r.passed).count();
        info!(passed, total = reports.len(), all_passed, "validation finished");

        ValidationReport {
            cases: reports,
            all_passed,
        }
    }

    fn run_case(&self, chain: &KinematicChain, case: &ValidationCase) -> CaseReport {
        let tolerance = case.tolerance.unwrap_or(self.default_tolerance);
        let mut report = CaseReport {
            name: case.name.clone(),
            description: case.description.clone(),
            q: case.q.clone(),
            reference: case.reference,
            computed: None,
            delta: None,
            error: None,
            tolerance,
            passed: false,
            failure: None,
        };

        match self.engine.end_effector_position(chain, &case.q) {
            Ok(computed) => {
                let delta = computed - case.reference;
                let error = delta.norm();
                report.computed = Some(computed);
                report.delta = Some(delta);
                report.error = Some(error);
                report.passed = error <= tolerance;
                if !report.passed {
                    warn!(
                        case = %case.name,
                        error_mm = error * 1000.0,
                        tolerance_mm = tolerance * 1000.0,
                        "case outside tolerance"
                    );
                }
            }
            Err(err) => {
                warn!(case = %case.name, %err, "case could not be evaluated");
                report.failure = Some(err);
            }
        }
        report
    }
}
