//! Robot configuration module for DH-described manipulators
//!
//! This module provides configuration data for the COMAU Smart Six 6-1.4
//! based on the Standard Denavit-Hartenberg parameters from
//! Guida et al. (2019), "Multibody Model of the COMAU Smart Six 6-1.4
//! Industrial Robot", IOP Conf. Ser.: Mater. Sci. Eng. 568 012115.
//!
//! The published table does not reproduce the paper's own test positions.
//! The calibrated preset uses a1 = 101 mm, d4 = 674 mm and a +90° offset on
//! joint 2, values found by grid search against those positions. Treat them
//! as configuration data, not measurements.

use std::f64::consts::FRAC_PI_2;
use std::fs;
use std::path::Path;

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::chain::{DhConvention, KinematicChain};
use crate::error::{KinematicsError, Result};
use crate::link::{JointLimits, Link};

/// Known robot presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RobotModel {
    /// Calibrated parameters.
    #[default]
    SmartSix,
    /// Parameters exactly as printed in Table 1 of the paper.
    SmartSixTable1,
}

/// One row of the DH table. Lengths in meters, angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub d: f64,
    pub a: f64,
    pub alpha: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub qlim: Option<[f64; 2]>,
}

impl LinkConfig {
    fn with_limits_deg(
        d: f64,
        a: f64,
        alpha: f64,
        offset: f64,
        min_deg: f64,
        max_deg: f64,
    ) -> Self {
        Self {
            d,
            a,
            alpha,
            offset,
            qlim: Some([min_deg.to_radians(), max_deg.to_radians()]),
        }
    }

    pub fn to_link(&self) -> Result<Link> {
        let qlim = match self.qlim {
            Some([min, max]) => JointLimits::new(min, max)?,
            None => JointLimits::default(),
        };
        Link::new(self.d, self.a, self.alpha, self.offset, qlim)
    }
}

/// Robot configuration with DH parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Human readable robot name
    pub name: String,

    /// DH convention used by every link
    #[serde(default)]
    pub convention: DhConvention,

    /// Base translation [x, y, z] in meters
    #[serde(default)]
    pub base_translation: Option<[f64; 3]>,

    /// Base yaw about the world Z axis in radians
    #[serde(default)]
    pub base_yaw: Option<f64>,

    /// DH table, base to flange
    pub links: Vec<LinkConfig>,
}

impl RobotConfig {
    /// Create configuration for the COMAU Smart Six 6-1.4 (calibrated)
    ///
    /// Joint | d     | a     | alpha | offset | qlim
    /// ------|-------|-------|-------|--------|-------------
    /// 1     | 0.45  | 0.101 | π/2   | 0      | ±170°
    /// 2     | 0     | 0.59  | 0     | π/2    | -85°..155°
    /// 3     | 0     | 0.13  | π/2   | 0      | -170°..158°
    /// 4     | 0.674 | 0     | -π/2  | 0      | ±270°
    /// 5     | 0     | 0     | π/2   | 0      | ±130°
    /// 6     | 0.095 | 0     | 0     | 0      | ±270°
    pub fn comau_smart_six() -> Self {
        Self {
            name: "COMAU Smart Six 6-1.4".to_string(),
            convention: DhConvention::Standard,
            base_translation: None,
            base_yaw: None,
            links: vec![
                LinkConfig::with_limits_deg(0.45, 0.101, FRAC_PI_2, 0.0, -170.0, 170.0),
                LinkConfig::with_limits_deg(0.0, 0.59, 0.0, FRAC_PI_2, -85.0, 155.0),
                LinkConfig::with_limits_deg(0.0, 0.13, FRAC_PI_2, 0.0, -170.0, 158.0),
                LinkConfig::with_limits_deg(0.674, 0.0, -FRAC_PI_2, 0.0, -270.0, 270.0),
                LinkConfig::with_limits_deg(0.0, 0.0, FRAC_PI_2, 0.0, -130.0, 130.0),
                LinkConfig::with_limits_deg(0.095, 0.0, 0.0, 0.0, -270.0, 270.0),
            ],
        }
    }

    /// Create configuration for the COMAU Smart Six from the uncalibrated table
    ///
    /// Same limits as [`comau_smart_six`](Self::comau_smart_six) but with
    /// a1 = 0, d4 = 0.647 and no joint-2 offset.
    pub fn comau_smart_six_table1() -> Self {
        let mut config = Self::comau_smart_six();
        config.name = "COMAU Smart Six 6-1.4 (Table 1)".to_string();
        config.links[0].a = 0.0;
        config.links[1].offset = 0.0;
        config.links[3].d = 0.647;
        config
    }

    /// Create configuration for a specific robot model
    pub fn from_model(model: RobotModel) -> Self {
        match model {
            RobotModel::SmartSix => Self::comau_smart_six(),
            RobotModel::SmartSixTable1 => Self::comau_smart_six_table1(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| KinematicsError::Config(e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| KinematicsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Load from the JSON file named by `var`, or fall back to the default preset.
    pub fn from_env_or_default(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(path) if !path.is_empty() => Self::from_json_file(path),
            _ => Ok(Self::default()),
        }
    }

    fn base(&self) -> Isometry3<f64> {
        let [x, y, z] = self.base_translation.unwrap_or([0.0; 3]);
        let yaw = self.base_yaw.unwrap_or(0.0);
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        )
    }

    /// Validate every row and build the immutable chain.
    pub fn build_chain(&self) -> Result<KinematicChain> {
        let links = self
            .links
            .iter()
            .map(LinkConfig::to_link)
            .collect::<Result<Vec<_>>>()?;

        Ok(KinematicChain::new(self.name.clone(), links)?
            .with_convention(self.convention)
            .with_base(self.base()))
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::comau_smart_six()
    }
}
