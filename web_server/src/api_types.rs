//! HTTP API types for the forward-kinematics endpoint.
//!
//! Joint values arrive as flat `q1..qN` fields in radians. Transforms go out
//! as row-major 4x4 arrays, base frame first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row-major homogeneous transform.
pub type TransformRows = [[f64; 4]; 4];

/// Body of `POST /fkine`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FkineRequest {
    /// Every body field by name. Only numeric `q1`, `q2`, ... are read.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl FkineRequest {
    /// Joint vector of length `dof`; missing or non-numeric joints are zero.
    pub fn joint_vector(&self, dof: usize) -> Vec<f64> {
        (1..=dof)
            .map(|i| {
                self.fields
                    .get(&format!("q{}", i))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FkineResponse {
    pub transforms: Vec<TransformRows>,
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_joints_default_to_zero() {
        let req: FkineRequest = serde_json::from_str(r#"{"q1": 1.5, "q3": -0.25}"#).unwrap();
        assert_eq!(req.joint_vector(6), vec![1.5, 0.0, -0.25, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let req: FkineRequest =
            serde_json::from_str(r#"{"q1": 1.0, "q7": 2.0, "speed": 3.0}"#).unwrap();
        assert_eq!(req.joint_vector(6), vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_non_numeric_fields_ignored() {
        let req: FkineRequest =
            serde_json::from_str(r#"{"q1": 0.5, "mode": "rad", "q2": null, "tags": [1, 2]}"#)
                .unwrap();
        assert_eq!(req.joint_vector(3), vec![0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_body_is_zero_pose() {
        let req: FkineRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.joint_vector(3), vec![0.0; 3]);
    }

    #[test]
    fn test_error_response_shape() {
        let body = ErrorResponse {
            error: "expected 6 joint values, got 5".to_string(),
            kind: "DimensionMismatchError".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["kind"], "DimensionMismatchError");
        assert!(value["error"].as_str().unwrap().contains("got 5"));
    }
}
