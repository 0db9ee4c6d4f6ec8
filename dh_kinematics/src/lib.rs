// Library exports for DH forward kinematics and calibration

pub mod calibration;
pub mod chain;
pub mod error;
pub mod kinematics;
pub mod link;
pub mod reference;
pub mod robot_config;
pub mod validation;

pub use calibration::{
    CalibrationResult, CalibrationSearch, CalibrationTarget, Candidate, Refinement, SearchAxis,
    SearchDimension, SearchPhase, SearchUnit,
};
pub use chain::{DhConvention, KinematicChain};
pub use error::{KinematicsError, Result};
pub use kinematics::{evaluate, link_transform, ForwardKinematics, Frame, FrameSequence};
pub use link::{DhParam, JointLimits, Link};
pub use reference::CalibrationPreset;
pub use robot_config::{LinkConfig, RobotConfig, RobotModel};
pub use validation::{CaseReport, ValidationCase, ValidationHarness, ValidationReport};
