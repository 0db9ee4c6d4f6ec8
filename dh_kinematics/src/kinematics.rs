// Forward kinematics for serial chains described with Denavit-Hartenberg parameters.
//
// Every link contributes one homogeneous transform. The pose of link i's output
// frame is the ordered product base · A1 · A2 · ... · Ai. Matrix products do not
// commute, so the order always follows the link order of the chain.

use nalgebra::{Matrix3, Matrix4, Vector3};
use tracing::warn;

use crate::chain::{DhConvention, KinematicChain};
use crate::error::Result;
use crate::link::Link;

/// Rigid pose relative to the world frame, as a 4x4 homogeneous transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame(Matrix4<f64>);

impl Frame {
    pub fn identity() -> Self {
        Self(Matrix4::identity())
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.0
    }

    /// Origin of the frame.
    pub fn translation(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    /// Upper-left 3x3 rotation block.
    pub fn rotation(&self) -> Matrix3<f64> {
        self.0.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Joint axis direction of the next link (third rotation column).
    pub fn z_axis(&self) -> Vector3<f64> {
        Vector3::new(self.0[(0, 2)], self.0[(1, 2)], self.0[(2, 2)])
    }

    /// Row-major nested arrays, the shape callers serialize.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        let mut rows = [[0.0; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.0[(i, j)];
            }
        }
        rows
    }

    /// Largest entry of `RᵀR - I`. Zero for an exact rotation; grows with
    /// accumulated rounding over long chains.
    pub fn orthonormality_error(&self) -> f64 {
        let r = self.rotation();
        (r.transpose() * r - Matrix3::identity()).amax()
    }
}

impl From<Matrix4<f64>> for Frame {
    fn from(m: Matrix4<f64>) -> Self {
        Self(m)
    }
}

/// Result of one forward kinematics evaluation: `N + 1` frames, base first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    limit_flags: Vec<bool>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn base(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn end_effector(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn end_effector_position(&self) -> Vector3<f64> {
        self.end_effector().translation()
    }

    /// Origins of every frame, base included.
    pub fn joint_origins(&self) -> Vec<Vector3<f64>> {
        self.frames.iter().map(Frame::translation).collect()
    }

    /// One flag per joint, set when strict evaluation found the joint value
    /// outside its `qlim`. All false when strict mode was off.
    pub fn limit_flags(&self) -> &[bool] {
        &self.limit_flags
    }

    pub fn has_limit_violation(&self) -> bool {
        self.limit_flags.iter().any(|&flag| flag)
    }

    /// Zero-based indices of the joints outside their limits.
    pub fn violated_joints(&self) -> Vec<usize> {
        self.limit_flags
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
            .collect()
    }
}

/// Local transform of one link for joint value `q`.
#[rustfmt::skip]
pub fn link_transform(link: &Link, q: f64, convention: DhConvention) -> Matrix4<f64> {
    let theta = link.theta(q);
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = link.alpha().sin_cos();
    let a = link.a();
    let d = link.d();

    match convention {
        // Rz(theta) · Tz(d) · Tx(a) · Rx(alpha)
        DhConvention::Standard => Matrix4::new(
            ct, -st * ca, st * sa, a * ct,
            st, ct * ca, -ct * sa, a * st,
            0.0, sa, ca, d,
            0.0, 0.0, 0.0, 1.0,
        ),
        // Rx(alpha) · Tx(a) · Rz(theta) · Tz(d)
        DhConvention::Modified => Matrix4::new(
            ct, -st, 0.0, a,
            st * ca, ct * ca, -sa, -d * sa,
            st * sa, ct * sa, ca, d * ca,
            0.0, 0.0, 0.0, 1.0,
        ),
    }
}

/// Forward kinematics engine.
///
/// Holds no state besides the strict-mode switch, so one engine can serve any
/// number of chains and calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardKinematics {
    strict: bool,
}

impl ForwardKinematics {
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Engine that flags joint values outside `qlim`. Evaluation still succeeds.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Every frame from the base to the end effector.
    pub fn evaluate(&self, chain: &KinematicChain, q: &[f64]) -> Result<FrameSequence> {
        chain.check_dimension(q)?;

        let mut frames = Vec::with_capacity(chain.dof() + 1);
        let mut current = chain.base().to_homogeneous();
        frames.push(Frame(current));
        for (link, &qi) in chain.links().iter().zip(q) {
            current *= link_transform(link, qi, chain.convention());
            frames.push(Frame(current));
        }

        let limit_flags = if self.strict {
            self.check_limits(chain, q)
        } else {
            vec![false; q.len()]
        };

        Ok(FrameSequence {
            frames,
            limit_flags,
        })
    }

    /// End-effector origin only. Same product as [`evaluate`](Self::evaluate)
    /// without keeping the intermediate frames.
    pub fn end_effector_position(&self, chain: &KinematicChain, q: &[f64]) -> Result<Vector3<f64>> {
        chain.check_dimension(q)?;

        let pose = chain
            .links()
            .iter()
            .zip(q)
            .fold(chain.base().to_homogeneous(), |acc, (link, &qi)| {
                acc * link_transform(link, qi, chain.convention())
            });
        Ok(Frame(pose).translation())
    }

    fn check_limits(&self, chain: &KinematicChain, q: &[f64]) -> Vec<bool> {
        chain
            .links()
            .iter()
            .zip(q)
            .enumerate()
            .map(|(i, (link, &qi))| {
                let qlim = link.qlim();
                let outside = !qlim.contains(qi);
                if outside {
                    warn!(
                        joint = i + 1,
                        value = qi,
                        min = qlim.min,
                        max = qlim.max,
                        "joint value outside its limits"
                    );
                }
                outside
            })
            .collect()
    }
}

/// Evaluate `chain` at `q` with the non-strict engine.
pub fn evaluate(chain: &KinematicChain, q: &[f64]) -> Result<FrameSequence> {
    ForwardKinematics::new().evaluate(chain, q)
}
