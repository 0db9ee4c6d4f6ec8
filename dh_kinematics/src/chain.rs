//! Ordered, immutable chain of revolute links.

use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

use crate::error::{KinematicsError, Result};
use crate::link::{DhParam, Link};

/// Order in which the four DH scalars are applied to a link.
///
/// A chain uses one convention for all of its links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DhConvention {
    /// `Rz(theta) · Tz(d) · Tx(a) · Rx(alpha)`
    #[default]
    Standard,
    /// `Rx(alpha) · Tx(a) · Rz(theta) · Tz(d)`, with the link's `a` and `alpha`
    /// read as the values of the previous axis (Craig's convention).
    Modified,
}

/// Serial manipulator made of `N >= 1` revolute links.
///
/// Built once and shared read-only. Changing a parameter means building a new
/// chain with [`KinematicChain::with_parameter`].
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicChain {
    name: String,
    links: Vec<Link>,
    convention: DhConvention,
    base: Isometry3<f64>,
}

impl KinematicChain {
    /// Standard DH chain with the base at the world origin.
    pub fn new(name: impl Into<String>, links: Vec<Link>) -> Result<Self> {
        if links.is_empty() {
            return Err(KinematicsError::EmptyChain);
        }
        Ok(Self {
            name: name.into(),
            links,
            convention: DhConvention::Standard,
            base: Isometry3::identity(),
        })
    }

    /// Same chain evaluated with another DH convention.
    pub fn with_convention(mut self, convention: DhConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Same chain mounted on a rigid base transform.
    pub fn with_base(mut self, base: Isometry3<f64>) -> Self {
        self.base = base;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Number of joints.
    pub fn dof(&self) -> usize {
        self.links.len()
    }

    pub fn convention(&self) -> DhConvention {
        self.convention
    }

    pub fn base(&self) -> &Isometry3<f64> {
        &self.base
    }

    /// Joint vector that cancels every link offset, i.e. the mechanical zero.
    pub fn mechanical_zero(&self) -> Vec<f64> {
        self.links.iter().map(|link| -link.offset()).collect()
    }

    /// New chain with one DH scalar of one link replaced.
    pub fn with_parameter(&self, link: usize, param: DhParam, value: f64) -> Result<Self> {
        let current = self.links.get(link).ok_or_else(|| {
            KinematicsError::invalid_parameter(
                format!("link {}", link + 1),
                format!("chain only has {} links", self.links.len()),
            )
        })?;
        let replaced = current.with_param(param, value)?;

        let mut links = self.links.clone();
        links[link] = replaced;
        Ok(Self {
            name: self.name.clone(),
            links,
            convention: self.convention,
            base: self.base,
        })
    }

    /// Fail with `DimensionMismatch` unless `q` has one value per link.
    pub fn check_dimension(&self, q: &[f64]) -> Result<()> {
        if q.len() != self.links.len() {
            return Err(KinematicsError::DimensionMismatch {
                expected: self.links.len(),
                actual: q.len(),
            });
        }
        Ok(())
    }
}
