// HTTP server exposing forward kinematics for one configured robot
// Run with: cargo run -p web_server
//
// DH_ROBOT_CONFIG  JSON robot file (default: calibrated COMAU Smart Six)
// DH_SERVER_ADDR   listen address (default: 127.0.0.1:5000)

mod api_types;
mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use dh_kinematics::RobotConfig;
use handlers::{fkine_handler, robot_handler, AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fkine", post(fkine_handler))
        .route("/robot", get(robot_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match RobotConfig::from_env_or_default("DH_ROBOT_CONFIG") {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load robot configuration: {}", e);
            return;
        }
    };

    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Invalid robot configuration: {}", e);
            return;
        }
    };
    info!(robot = %state.config.name, dof = state.chain.dof(), "robot loaded");

    let addr = std::env::var("DH_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("Forward kinematics server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router(state)).await {
        error!("Server error: {}", e);
    }
}
