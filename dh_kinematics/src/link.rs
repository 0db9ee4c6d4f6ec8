//! Revolute link description in Denavit-Hartenberg form.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, Result};

/// Inclusive joint range in radians.
///
/// Advisory only: the transform math never clamps to it. Strict evaluation
/// reports values outside the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(KinematicsError::invalid_parameter(
                "qlim",
                format!("limits must be finite, got [{}, {}]", min, max),
            ));
        }
        if min > max {
            return Err(KinematicsError::invalid_parameter(
                "qlim",
                format!("min {} is greater than max {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// Symmetric range given in degrees, e.g. `±170°`.
    pub fn symmetric_degrees(limit: f64) -> Result<Self> {
        Self::new(-limit.to_radians(), limit.to_radians())
    }

    /// Range given in degrees.
    pub fn degrees(min: f64, max: f64) -> Result<Self> {
        Self::new(min.to_radians(), max.to_radians())
    }

    pub fn contains(&self, q: f64) -> bool {
        q >= self.min && q <= self.max
    }
}

impl Default for JointLimits {
    /// Two full turns in either direction.
    fn default() -> Self {
        Self {
            min: -2.0 * PI,
            max: 2.0 * PI,
        }
    }
}

/// One of the four DH scalars of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DhParam {
    D,
    A,
    Alpha,
    Offset,
}

impl fmt::Display for DhParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhParam::D => write!(f, "d"),
            DhParam::A => write!(f, "a"),
            DhParam::Alpha => write!(f, "alpha"),
            DhParam::Offset => write!(f, "offset"),
        }
    }
}

/// Immutable revolute joint described by its DH parameters.
///
/// * `d` - offset along the previous joint axis (m)
/// * `a` - common normal length (m)
/// * `alpha` - twist about the common normal (rad)
/// * `offset` - added to the joint variable before the transform (rad)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    d: f64,
    a: f64,
    alpha: f64,
    offset: f64,
    qlim: JointLimits,
}

impl Link {
    /// Build a link, rejecting non-finite values and an inverted `qlim`.
    pub fn new(d: f64, a: f64, alpha: f64, offset: f64, qlim: JointLimits) -> Result<Self> {
        for (field, value) in [("d", d), ("a", a), ("alpha", alpha), ("offset", offset)] {
            if !value.is_finite() {
                return Err(KinematicsError::invalid_parameter(
                    field,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        // Limits may have been built as a literal, so check again here.
        let qlim = JointLimits::new(qlim.min, qlim.max)?;

        Ok(Self {
            d,
            a,
            alpha,
            offset,
            qlim,
        })
    }

    /// Link with no joint offset and the default joint range.
    pub fn revolute(d: f64, a: f64, alpha: f64) -> Result<Self> {
        Self::new(d, a, alpha, 0.0, JointLimits::default())
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn qlim(&self) -> JointLimits {
        self.qlim
    }

    pub fn param(&self, param: DhParam) -> f64 {
        match param {
            DhParam::D => self.d,
            DhParam::A => self.a,
            DhParam::Alpha => self.alpha,
            DhParam::Offset => self.offset,
        }
    }

    /// Copy of this link with one DH scalar replaced.
    pub fn with_param(&self, param: DhParam, value: f64) -> Result<Self> {
        let mut next = *self;
        match param {
            DhParam::D => next.d = value,
            DhParam::A => next.a = value,
            DhParam::Alpha => next.alpha = value,
            DhParam::Offset => next.offset = value,
        }
        Self::new(next.d, next.a, next.alpha, next.offset, next.qlim)
    }

    /// Joint angle fed to the transform once the offset is applied.
    pub fn theta(&self, q: f64) -> f64 {
        q + self.offset
    }
}
