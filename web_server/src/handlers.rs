// Request handlers for the forward-kinematics API

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dh_kinematics::{ForwardKinematics, KinematicChain, KinematicsError, RobotConfig};
use tracing::{debug, error};

use crate::api_types::{ErrorResponse, FkineRequest, FkineResponse, TransformRows};

const IDENTITY: TransformRows = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Shared server state, built once at startup.
pub struct AppState {
    pub config: RobotConfig,
    pub chain: KinematicChain,
    pub engine: ForwardKinematics,
}

impl AppState {
    pub fn new(config: RobotConfig) -> Result<Self, KinematicsError> {
        let chain = config.build_chain()?;
        Ok(Self {
            config,
            chain,
            engine: ForwardKinematics::new(),
        })
    }
}

/// Kinematics failure mapped to HTTP 500.
#[derive(Debug)]
pub struct ApiError(pub KinematicsError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Force exactly `dof + 1` frames: prepend identity when short, truncate when long.
pub fn normalize_frames(mut frames: Vec<TransformRows>, dof: usize) -> Vec<TransformRows> {
    let expected = dof + 1;
    if frames.len() < expected {
        let mut padded = vec![IDENTITY; expected - frames.len()];
        padded.append(&mut frames);
        frames = padded;
    }
    frames.truncate(expected);
    frames
}

pub async fn fkine_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FkineRequest>,
) -> Result<Json<FkineResponse>, ApiError> {
    let q = request.joint_vector(state.chain.dof());
    debug!(?q, "fkine request");

    let frames = state.engine.evaluate(&state.chain, &q).map_err(|e| {
        error!(kind = e.kind(), %e, "forward kinematics failed");
        ApiError(e)
    })?;

    let rows = frames.frames().iter().map(|f| f.to_rows()).collect();
    Ok(Json(FkineResponse {
        transforms: normalize_frames(rows, state.chain.dof()),
    }))
}

pub async fn robot_handler(State(state): State<Arc<AppState>>) -> Json<RobotConfig> {
    Json(state.config.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(RobotConfig::comau_smart_six()).unwrap())
    }

    fn marked(value: f64) -> TransformRows {
        let mut rows = IDENTITY;
        rows[0][3] = value;
        rows
    }

    #[test]
    fn test_normalize_prepends_identity() {
        let frames = normalize_frames(vec![marked(1.0), marked(2.0)], 3);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], IDENTITY);
        assert_eq!(frames[1], IDENTITY);
        assert_eq!(frames[2][0][3], 1.0);
        assert_eq!(frames[3][0][3], 2.0);
    }

    #[test]
    fn test_normalize_truncates() {
        let frames = normalize_frames((0..5).map(|i| marked(i as f64)).collect(), 2);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2][0][3], 2.0);
    }

    #[test]
    fn test_normalize_keeps_exact_length() {
        let input: Vec<TransformRows> = (0..7).map(|i| marked(i as f64)).collect();
        assert_eq!(normalize_frames(input.clone(), 6), input);
    }

    #[tokio::test]
    async fn test_fkine_zero_pose() {
        let Json(response) = fkine_handler(State(state()), Json(FkineRequest::default()))
            .await
            .unwrap();
        assert_eq!(response.transforms.len(), 7);
        assert_eq!(response.transforms[0], IDENTITY);
        let flange = response.transforms[6];
        assert!((flange[0][3] - 0.87).abs() < 1e-9);
        assert!(flange[1][3].abs() < 1e-9);
        assert!((flange[2][3] - 1.17).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fkine_base_rotation() {
        let mut request = FkineRequest::default();
        request
            .fields
            .insert("q1".to_string(), std::f64::consts::FRAC_PI_2.into());
        let Json(response) = fkine_handler(State(state()), Json(request)).await.unwrap();
        let flange = response.transforms[6];
        assert!(flange[0][3].abs() < 1e-9);
        assert!((flange[1][3] - 0.87).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fkine_accepts_text_fields() {
        let request: FkineRequest = serde_json::from_str(r#"{"q1": 0, "mode": "rad"}"#).unwrap();
        let Json(response) = fkine_handler(State(state()), Json(request)).await.unwrap();
        assert_eq!(response.transforms.len(), 7);
        assert!((response.transforms[6][0][3] - 0.87).abs() < 1e-9);
    }

    #[test]
    fn test_api_error_is_500() {
        let response = ApiError(KinematicsError::EmptyChain).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_robot_returns_config() {
        let Json(config) = robot_handler(State(state())).await;
        assert_eq!(config, RobotConfig::comau_smart_six());
    }
}
