//! Bounded grid search over DH parameters and joint angles.
//!
//! A [`CalibrationTarget`] names the free dimensions, each with an inclusive
//! range and a step. The search scores every point of the Cartesian product of
//! those ranges by the Euclidean distance between the resulting end-effector
//! position and the target, then optionally repeats the sweep on a finer grid
//! centred on the best point.
//!
//! Points are enumerated with the first configured axis outermost and the last
//! axis innermost. Among equal errors the earliest point in that order wins, so
//! results are reproducible, including with the `parallel` feature.

use std::borrow::Cow;
use std::f64::consts::PI;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::KinematicChain;
use crate::error::{KinematicsError, Result};
use crate::kinematics::ForwardKinematics;
use crate::link::DhParam;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// Absorbs rounding in (max - min) / step so the max itself is enumerated.
const RANGE_EPSILON: f64 = 1e-9;

/// Quantity swept by one search axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDimension {
    /// Zero-based joint index. Replaces the joint's value in the base joint vector.
    Joint(usize),
    /// One DH scalar of a zero-based link index.
    Parameter { link: usize, param: DhParam },
}

impl SearchDimension {
    /// Joints, twists and joint offsets are angles; `d` and `a` are lengths.
    pub fn is_angular(&self) -> bool {
        match self {
            SearchDimension::Joint(_) => true,
            SearchDimension::Parameter { param, .. } => {
                matches!(param, DhParam::Alpha | DhParam::Offset)
            }
        }
    }
}

impl fmt::Display for SearchDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDimension::Joint(j) => write!(f, "q{}", j + 1),
            SearchDimension::Parameter { link, param } => write!(f, "{}{}", param, link + 1),
        }
    }
}

/// Unit in which an axis range is written. Values are converted to radians or
/// meters before they reach the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchUnit {
    Radians,
    Degrees,
    Meters,
    Millimeters,
}

impl SearchUnit {
    pub fn to_si(&self, value: f64) -> f64 {
        match self {
            SearchUnit::Radians | SearchUnit::Meters => value,
            SearchUnit::Degrees => value * PI / 180.0,
            SearchUnit::Millimeters => value / 1000.0,
        }
    }

    pub fn is_angular(&self) -> bool {
        matches!(self, SearchUnit::Radians | SearchUnit::Degrees)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            SearchUnit::Radians => "rad",
            SearchUnit::Degrees => "°",
            SearchUnit::Meters => "m",
            SearchUnit::Millimeters => "mm",
        }
    }
}

/// Inclusive range `min..=max` walked at `step`, all in `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchAxis {
    pub dimension: SearchDimension,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: SearchUnit,
}

impl SearchAxis {
    /// Joint angle range in degrees. `joint` is zero-based.
    pub fn joint_degrees(joint: usize, min: f64, max: f64, step: f64) -> Self {
        Self {
            dimension: SearchDimension::Joint(joint),
            min,
            max,
            step,
            unit: SearchUnit::Degrees,
        }
    }

    /// DH parameter range. `link` is zero-based.
    pub fn parameter(
        link: usize,
        param: DhParam,
        min: f64,
        max: f64,
        step: f64,
        unit: SearchUnit,
    ) -> Self {
        Self {
            dimension: SearchDimension::Parameter { link, param },
            min,
            max,
            step,
            unit,
        }
    }

    fn validate(&self, chain: &KinematicChain) -> Result<()> {
        let dim = self.dimension;
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(KinematicsError::invalid_range(dim, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(KinematicsError::invalid_range(
                dim,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(KinematicsError::invalid_range(
                dim,
                format!("step must be positive, got {}", self.step),
            ));
        }
        if dim.is_angular() != self.unit.is_angular() {
            return Err(KinematicsError::invalid_range(
                dim,
                format!("unit {} does not fit this dimension", self.unit.symbol()),
            ));
        }
        self.count()?;
        let index = match dim {
            SearchDimension::Joint(j) => j,
            SearchDimension::Parameter { link, .. } => link,
        };
        if index >= chain.dof() {
            return Err(KinematicsError::invalid_range(
                dim,
                format!("chain only has {} joints", chain.dof()),
            ));
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        grid_count(self.dimension, self.max - self.min, self.step)
    }

    fn value(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step
    }

    fn around(&self, center: f64, refinement: &Refinement) -> Self {
        Self {
            min: center - refinement.half_width,
            max: center + refinement.half_width,
            step: refinement.step,
            ..*self
        }
    }
}

/// Second pass around the coarse optimum: `±half_width` at `step`, in each
/// axis's own unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Refinement {
    pub half_width: f64,
    pub step: f64,
}

impl Refinement {
    pub fn new(half_width: f64, step: f64) -> Self {
        Self { half_width, step }
    }
}

/// What to search for and where to look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTarget {
    /// Target end-effector position in meters.
    pub position: Vector3<f64>,
    /// Candidates closer than this (meters) are collected as matches.
    pub tolerance: f64,
    /// Free dimensions, outermost first.
    pub axes: Vec<SearchAxis>,
    pub refinement: Option<Refinement>,
}

impl CalibrationTarget {
    pub fn new(position: Vector3<f64>, tolerance: f64) -> Self {
        Self {
            position,
            tolerance,
            axes: Vec::new(),
            refinement: None,
        }
    }

    pub fn with_axis(mut self, axis: SearchAxis) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }

    fn validate(&self, chain: &KinematicChain) -> Result<()> {
        if self.axes.is_empty() {
            return Err(KinematicsError::invalid_range("search", "no free dimensions"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(KinematicsError::invalid_parameter(
                "tolerance",
                format!("must be a non-negative distance, got {}", self.tolerance),
            ));
        }
        if self.position.iter().any(|v| !v.is_finite()) {
            return Err(KinematicsError::invalid_parameter("position", "target must be finite"));
        }
        for (i, axis) in self.axes.iter().enumerate() {
            axis.validate(chain)?;
            if self.axes[..i].iter().any(|prev| prev.dimension == axis.dimension) {
                return Err(KinematicsError::invalid_range(
                    axis.dimension,
                    "dimension listed twice",
                ));
            }
        }
        if let Some(refinement) = &self.refinement {
            if !refinement.half_width.is_finite() || refinement.half_width < 0.0 {
                return Err(KinematicsError::invalid_range(
                    "refinement",
                    format!("half width must be non-negative, got {}", refinement.half_width),
                ));
            }
            if !refinement.step.is_finite() || refinement.step <= 0.0 {
                return Err(KinematicsError::invalid_range(
                    "refinement",
                    format!("step must be positive, got {}", refinement.step),
                ));
            }
            for axis in &self.axes {
                grid_count(axis.dimension, 2.0 * refinement.half_width, refinement.step)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchPhase {
    Coarse,
    Refine,
}

/// One scored grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Axis values in axis units, same order as the target's axes.
    pub assignment: Vec<f64>,
    pub position: Vector3<f64>,
    pub error: f64,
    pub phase: SearchPhase,
}

/// Best point found over both phases.
///
/// Best within the searched grid only; nothing is claimed about points
/// between grid nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub best: Candidate,
    /// Every candidate closer than the target tolerance, in enumeration order,
    /// coarse phase first.
    pub matches: Vec<Candidate>,
    /// Number of forward kinematics evaluations performed.
    pub evaluated: usize,
    pub axes: Vec<SearchAxis>,
}

impl CalibrationResult {
    pub fn assignment(&self) -> &[f64] {
        &self.best.assignment
    }

    pub fn error(&self) -> f64 {
        self.best.error
    }

    pub fn position(&self) -> Vector3<f64> {
        self.best.position
    }

    /// Best assignment converted to radians / meters.
    pub fn assignment_si(&self) -> Vec<f64> {
        self.axes
            .iter()
            .zip(&self.best.assignment)
            .map(|(axis, &v)| axis.unit.to_si(v))
            .collect()
    }

    pub fn is_within(&self, tolerance: f64) -> bool {
        self.best.error <= tolerance
    }
}

/// Running minimum and matches of one phase, keyed by enumeration index.
#[derive(Debug, Default)]
struct PhaseBest {
    best: Option<(usize, Candidate)>,
    matches: Vec<(usize, Candidate)>,
    evaluated: usize,
}

impl PhaseBest {
    fn absorb(mut self, index: usize, candidate: Candidate, tolerance: f64) -> Self {
        self.evaluated += 1;
        if candidate.error < tolerance {
            self.matches.push((index, candidate.clone()));
        }
        let better = match &self.best {
            None => true,
            Some((best_index, best)) => {
                candidate.error < best.error
                    || (candidate.error == best.error && index < *best_index)
            }
        };
        if better {
            self.best = Some((index, candidate));
        }
        self
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn merge(mut self, other: PhaseBest) -> Self {
        self.evaluated += other.evaluated;
        self.matches.extend(other.matches);
        if let Some((index, candidate)) = other.best {
            let better = match &self.best {
                None => true,
                Some((best_index, best)) => {
                    candidate.error < best.error
                    || (candidate.error == best.error && index < *best_index)
                }
            };
            if better {
                self.best = Some((index, candidate));
            }
        }
        self
    }
}

/// Grid search driver bound to one template chain.
///
/// Joints that are not free keep the values of the base joint vector (zeros
/// unless set with [`with_joints`](Self::with_joints)).
#[derive(Debug, Clone)]
pub struct CalibrationSearch<'a> {
    chain: &'a KinematicChain,
    joints: Vec<f64>,
    engine: ForwardKinematics,
}

impl<'a> CalibrationSearch<'a> {
    pub fn new(chain: &'a KinematicChain) -> Self {
        Self {
            chain,
            joints: vec![0.0; chain.dof()],
            engine: ForwardKinematics::new(),
        }
    }

    /// Base joint vector in radians.
    pub fn with_joints(mut self, joints: &[f64]) -> Result<Self> {
        self.chain.check_dimension(joints)?;
        self.joints = joints.to_vec();
        Ok(self)
    }

    /// Run the coarse sweep and, if configured, the refinement sweep.
    pub fn run(&self, target: &CalibrationTarget) -> Result<CalibrationResult> {
        target.validate(self.chain)?;

        let coarse = self.sweep(&target.axes, target, SearchPhase::Coarse)?;
        let mut evaluated = coarse.evaluated;
        let mut matches: Vec<Candidate> = coarse.matches;
        let mut best = coarse.best;

        if let Some(refinement) = &target.refinement {
            let axes: Vec<SearchAxis> = target
                .axes
                .iter()
                .zip(&best.assignment)
                .map(|(axis, &center)| axis.around(center, refinement))
                .collect();
            let refined = self.sweep(&axes, target, SearchPhase::Refine)?;
            evaluated += refined.evaluated;
            matches.extend(refined.matches);
            if refined.best.error < best.error {
                debug!(
                    coarse_error = best.error,
                    refined_error = refined.best.error,
                    "refinement improved the coarse optimum"
                );
                best = refined.best;
            }
        }

        info!(
            best = ?best.assignment,
            error_mm = best.error * 1000.0,
            matches = matches.len(),
            evaluated,
            "calibration search finished"
        );

        Ok(CalibrationResult {
            best,
            matches,
            evaluated,
            axes: target.axes.clone(),
        })
    }

    /// Chain and joint vector for an assignment in axis units.
    pub fn apply(
        &self,
        axes: &[SearchAxis],
        assignment: &[f64],
    ) -> Result<(KinematicChain, Vec<f64>)> {
        let (chain, joints) = self.instantiate(axes, assignment)?;
        Ok((chain.into_owned(), joints))
    }

    fn instantiate(
        &self,
        axes: &[SearchAxis],
        assignment: &[f64],
    ) -> Result<(Cow<'a, KinematicChain>, Vec<f64>)> {
        let mut chain = Cow::Borrowed(self.chain);
        let mut joints = self.joints.clone();
        for (axis, &value) in axes.iter().zip(assignment) {
            let value = axis.unit.to_si(value);
            match axis.dimension {
                SearchDimension::Joint(j) => joints[j] = value,
                SearchDimension::Parameter { link, param } => {
                    chain = Cow::Owned(chain.with_parameter(link, param, value)?);
                }
            }
        }
        Ok((chain, joints))
    }

    fn score(
        &self,
        axes: &[SearchAxis],
        counts: &[usize],
        index: usize,
        target: &CalibrationTarget,
        phase: SearchPhase,
    ) -> Result<Candidate> {
        let assignment = grid_point(axes, counts, index);
        let (chain, joints) = self.instantiate(axes, &assignment)?;
        let position = self.engine.end_effector_position(&chain, &joints)?;
        let error = (position - target.position).norm();
        Ok(Candidate {
            assignment,
            position,
            error,
            phase,
        })
    }

    fn sweep(
        &self,
        axes: &[SearchAxis],
        target: &CalibrationTarget,
        phase: SearchPhase,
    ) -> Result<PhaseResult> {
        let counts = axes.iter().map(SearchAxis::count).collect::<Result<Vec<usize>>>()?;
        let total = counts
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| KinematicsError::invalid_range("search", "grid has too many points"))?;
        debug!(?phase, points = total, "grid search phase");

        let tolerance = target.tolerance;

        #[cfg(not(feature = "parallel"))]
        let phase_best = {
            let mut acc = PhaseBest::default();
            for index in 0..total {
                let candidate = self.score(axes, &counts, index, target, phase)?;
                acc = acc.absorb(index, candidate, tolerance);
            }
            acc
        };

        #[cfg(feature = "parallel")]
        let phase_best = (0..total)
            .into_par_iter()
            .map(|index| {
                self.score(axes, &counts, index, target, phase)
                    .map(|candidate| PhaseBest::default().absorb(index, candidate, tolerance))
            })
            .try_reduce(PhaseBest::default, |a, b| Ok(a.merge(b)))?;

        let PhaseBest {
            best,
            mut matches,
            evaluated,
        } = phase_best;
        matches.sort_by_key(|(index, _)| *index);

        // total >= 1 since every axis has at least one value.
        let (_, best) = best.ok_or_else(|| KinematicsError::invalid_range("search", "empty grid"))?;
        debug!(?phase, error = best.error, assignment = ?best.assignment, "phase optimum");

        Ok(PhaseResult {
            best,
            matches: matches.into_iter().map(|(_, c)| c).collect(),
            evaluated,
        })
    }
}

struct PhaseResult {
    best: Candidate,
    matches: Vec<Candidate>,
    evaluated: usize,
}

/// Number of grid values in an inclusive span walked at `step`.
fn grid_count(dimension: SearchDimension, span: f64, step: f64) -> Result<usize> {
    let intervals = (span / step + RANGE_EPSILON).floor();
    if !intervals.is_finite() || intervals >= usize::MAX as f64 {
        return Err(KinematicsError::invalid_range(dimension, "too many grid points"));
    }
    (intervals as usize)
        .checked_add(1)
        .ok_or_else(|| KinematicsError::invalid_range(dimension, "too many grid points"))
}

/// Decode a flat index into axis values, last axis varying fastest.
fn grid_point(axes: &[SearchAxis], counts: &[usize], mut index: usize) -> Vec<f64> {
    let mut point = vec![0.0; axes.len()];
    for k in (0..axes.len()).rev() {
        let i = index % counts[k];
        index /= counts[k];
        point[k] = axes[k].value(i);
    }
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Link;
    use crate::robot_config::RobotConfig;

    fn comau() -> KinematicChain {
        RobotConfig::comau_smart_six().build_chain().unwrap()
    }

    fn zero_pose() -> Vector3<f64> {
        Vector3::new(0.87, 0.0, 1.17)
    }

    #[test]
    fn test_axis_enumeration_is_inclusive() {
        let axis = SearchAxis::joint_degrees(0, 0.0, 90.0, 15.0);
        assert_eq!(axis.count().unwrap(), 7);
        assert_eq!(axis.value(6), 90.0);

        let single = SearchAxis::joint_degrees(0, 0.0, 0.0, 1.0);
        assert_eq!(single.count().unwrap(), 1);

        // 0.1 steps do not divide evenly in binary; max must still be reached.
        let fine = SearchAxis::parameter(0, DhParam::A, 0.0, 0.3, 0.1, SearchUnit::Meters);
        assert_eq!(fine.count().unwrap(), 4);
    }

    #[test]
    fn test_grid_order_last_axis_fastest() {
        let axes = [
            SearchAxis::joint_degrees(0, 0.0, 1.0, 1.0),
            SearchAxis::joint_degrees(1, 10.0, 30.0, 10.0),
        ];
        let counts = [2, 3];
        let points: Vec<Vec<f64>> = (0..6).map(|i| grid_point(&axes, &counts, i)).collect();
        assert_eq!(points[0], vec![0.0, 10.0]);
        assert_eq!(points[1], vec![0.0, 20.0]);
        assert_eq!(points[3], vec![1.0, 10.0]);
        assert_eq!(points[5], vec![1.0, 30.0]);
    }

    #[test]
    fn test_single_zero_joint_axis() {
        let chain = comau();
        let target = CalibrationTarget::new(zero_pose(), 0.001).with_axis(SearchAxis::joint_degrees(0, 0.0, 0.0, 1.0));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.assignment(), &[0.0]);
        assert!(result.error() < 1e-9);
        assert_eq!(result.evaluated, 1);
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn test_first_minimum_wins_ties() {
        // The last link has no length, so its joint never moves the origin.
        let chain = KinematicChain::new(
            "tie",
            vec![
                Link::revolute(0.0, 1.0, 0.0).unwrap(),
                Link::revolute(0.0, 0.0, 0.0).unwrap(),
            ],
        )
        .unwrap();
        let target = CalibrationTarget::new(Vector3::new(2.0, 0.0, 0.0), 0.0)
            .with_axis(SearchAxis::joint_degrees(1, -90.0, 90.0, 45.0));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.assignment(), &[-90.0]);
        assert!((result.error() - 1.0).abs() < 1e-12);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_a1_sweep_recovers_calibrated_value() {
        let chain = RobotConfig::comau_smart_six().build_chain().unwrap().with_parameter(0, DhParam::A, 0.0).unwrap();
        let target = CalibrationTarget::new(zero_pose(), 0.05)
            .with_axis(SearchAxis::parameter(0, DhParam::A, 0.0, 200.0, 1.0, SearchUnit::Millimeters));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.assignment(), &[101.0]);
        assert!((result.assignment_si()[0] - 0.101).abs() < 1e-12);
        assert!(result.error() < 1e-9);
        assert_eq!(result.evaluated, 201);

        // Everything within 50mm of 101mm is a match, in sweep order.
        assert!(result.matches.len() >= 97 && result.matches.len() <= 101);
        assert!(result.matches.iter().all(|m| m.error < 0.05));
        assert!(result
            .matches
            .windows(2)
            .all(|w| w[0].assignment[0] < w[1].assignment[0]));
    }

    #[test]
    fn test_refinement_improves_coarse_result() {
        let chain = comau().with_parameter(0, DhParam::A, 0.0).unwrap();
        let target = CalibrationTarget::new(zero_pose(), 0.0)
            .with_axis(SearchAxis::parameter(0, DhParam::A, 0.0, 200.0, 20.0, SearchUnit::Millimeters))
            .with_refinement(Refinement::new(10.0, 1.0));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.best.phase, SearchPhase::Refine);
        assert!((result.assignment()[0] - 101.0).abs() < 1e-9);
        assert!(result.error() < 1e-9);
        assert_eq!(result.evaluated, 11 + 21);
    }

    #[test]
    fn test_refinement_keeps_coarse_when_not_better() {
        let chain = comau();
        let target = CalibrationTarget::new(zero_pose(), 0.0)
            .with_axis(SearchAxis::joint_degrees(0, -30.0, 30.0, 30.0))
            .with_refinement(Refinement::new(10.0, 2.0));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.best.phase, SearchPhase::Coarse);
        assert_eq!(result.assignment(), &[0.0]);
    }

    #[test]
    fn test_base_joints_fill_fixed_dimensions() {
        let chain = comau();
        let q = [90.0_f64.to_radians(), 0.0, 0.0, 0.0, 0.0, 0.0];
        // Only q2 is free; q1 = 90° moves the target onto +Y.
        let target = CalibrationTarget::new(Vector3::new(0.0, 0.87, 1.17), 0.001)
            .with_axis(SearchAxis::joint_degrees(1, -30.0, 30.0, 15.0));
        let result = CalibrationSearch::new(&chain).with_joints(&q).unwrap().run(&target).unwrap();

        assert_eq!(result.assignment(), &[0.0]);
        assert!(result.error() < 1e-9);
        assert!(CalibrationSearch::new(&chain).with_joints(&q[..5]).is_err());
    }

    #[test]
    fn test_invalid_ranges_fail_before_evaluation() {
        let chain = comau();
        let bad_axes = [
            SearchAxis::joint_degrees(0, 10.0, -10.0, 1.0),
            SearchAxis::joint_degrees(0, 0.0, 10.0, 0.0),
            SearchAxis::joint_degrees(0, 0.0, 10.0, -1.0),
            SearchAxis::joint_degrees(0, f64::NAN, 10.0, 1.0),
            SearchAxis::joint_degrees(0, 0.0, 10.0, f64::INFINITY),
            SearchAxis::joint_degrees(6, 0.0, 10.0, 1.0),
            SearchAxis::parameter(9, DhParam::D, 0.0, 1.0, 0.1, SearchUnit::Meters),
            // Lengths swept in angles and angles swept in lengths.
            SearchAxis::parameter(0, DhParam::A, 101.0, 101.0, 1.0, SearchUnit::Degrees),
            SearchAxis::parameter(3, DhParam::D, 0.0, 1.0, 0.1, SearchUnit::Radians),
            SearchAxis::parameter(1, DhParam::Offset, 0.0, 90.0, 1.0, SearchUnit::Millimeters),
            SearchAxis::parameter(0, DhParam::Alpha, 0.0, 1.0, 0.1, SearchUnit::Meters),
            SearchAxis {
                dimension: SearchDimension::Joint(0),
                min: 0.0,
                max: 1.0,
                step: 0.1,
                unit: SearchUnit::Millimeters,
            },
        ];
        for axis in bad_axes {
            let target = CalibrationTarget::new(zero_pose(), 0.05).with_axis(axis);
            let err = CalibrationSearch::new(&chain).run(&target).unwrap_err();
            assert_eq!(err.kind(), "InvalidSearchRangeError", "{:?} should be rejected", axis);
        }

        let empty = CalibrationTarget::new(zero_pose(), 0.05);
        assert_eq!(CalibrationSearch::new(&chain).run(&empty).unwrap_err().kind(), "InvalidSearchRangeError");

        let bad_refine = CalibrationTarget::new(zero_pose(), 0.05)
            .with_axis(SearchAxis::joint_degrees(0, 0.0, 10.0, 1.0))
            .with_refinement(Refinement::new(10.0, 0.0));
        assert_eq!(CalibrationSearch::new(&chain).run(&bad_refine).unwrap_err().kind(), "InvalidSearchRangeError");

        let twice = CalibrationTarget::new(zero_pose(), 0.05)
            .with_axis(SearchAxis::joint_degrees(0, 0.0, 10.0, 1.0))
            .with_axis(SearchAxis::joint_degrees(0, 0.0, 10.0, 5.0));
        assert_eq!(CalibrationSearch::new(&chain).run(&twice).unwrap_err().kind(), "InvalidSearchRangeError");
    }

    #[test]
    fn test_tiny_step_rejected_as_too_many_points() {
        let chain = comau();
        let axis = SearchAxis::joint_degrees(0, 0.0, 1.0, 1e-300);
        assert!(axis.count().is_err());

        let target = CalibrationTarget::new(zero_pose(), 0.05).with_axis(axis);
        let err = CalibrationSearch::new(&chain).run(&target).unwrap_err();
        assert_eq!(err.kind(), "InvalidSearchRangeError");
        assert!(err.to_string().contains("too many grid points"), "{}", err);

        // The coarse grid is fine; the refinement grid would overflow.
        let refined = CalibrationTarget::new(zero_pose(), 0.05)
            .with_axis(SearchAxis::joint_degrees(0, 0.0, 10.0, 5.0))
            .with_refinement(Refinement::new(1.0, 1e-300));
        let err = CalibrationSearch::new(&chain).run(&refined).unwrap_err();
        assert_eq!(err.kind(), "InvalidSearchRangeError");
    }

    #[test]
    fn test_matching_units_accepted() {
        let chain = comau();
        let axes = [
            SearchAxis::parameter(0, DhParam::A, 0.1, 0.1, 0.01, SearchUnit::Meters),
            SearchAxis::parameter(3, DhParam::D, 674.0, 674.0, 1.0, SearchUnit::Millimeters),
            SearchAxis::parameter(1, DhParam::Offset, 1.5, 1.5, 0.1, SearchUnit::Radians),
            SearchAxis::parameter(0, DhParam::Alpha, 90.0, 90.0, 1.0, SearchUnit::Degrees),
        ];
        for axis in axes {
            let target = CalibrationTarget::new(zero_pose(), 0.05).with_axis(axis);
            assert!(CalibrationSearch::new(&chain).run(&target).is_ok(), "{:?}", axis);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_reduction_keeps_first_tie_and_match_order() {
        // Joint 2 drives a zero-length link, so every q2 value ties for a given q1.
        let chain = KinematicChain::new(
            "tie",
            vec![
                Link::revolute(0.0, 1.0, 0.0).unwrap(),
                Link::revolute(0.0, 0.0, 0.0).unwrap(),
            ],
        )
        .unwrap();
        let target = CalibrationTarget::new(Vector3::new(1.0, 0.0, 0.0), 0.5)
            .with_axis(SearchAxis::joint_degrees(0, -20.0, 20.0, 5.0))
            .with_axis(SearchAxis::joint_degrees(1, -180.0, 180.0, 1.0));
        let result = CalibrationSearch::new(&chain).run(&target).unwrap();

        assert_eq!(result.assignment(), &[0.0, -180.0]);
        assert_eq!(result.evaluated, 9 * 361);
        assert_eq!(result.matches.len(), 9 * 361);

        let expected: Vec<Vec<f64>> = (0..9)
            .flat_map(|i| (0..361).map(move |j| vec![-20.0 + 5.0 * i as f64, -180.0 + j as f64]))
            .collect();
        let found: Vec<Vec<f64>> = result.matches.iter().map(|m| m.assignment.clone()).collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_search_is_deterministic() {
        let chain = comau();
        let target = CalibrationTarget::new(Vector3::new(0.45, 0.0, 0.87), 0.05)
            .with_axis(SearchAxis::joint_degrees(1, -90.0, 180.0, 15.0))
            .with_axis(SearchAxis::joint_degrees(2, -90.0, 90.0, 15.0));
        let search = CalibrationSearch::new(&chain);
        let first = search.run(&target).unwrap();
        let second = search.run(&target).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(SearchDimension::Joint(1).to_string(), "q2");
        let dim = SearchDimension::Parameter { link: 0, param: DhParam::A };
        assert_eq!(dim.to_string(), "a1");
    }
}
