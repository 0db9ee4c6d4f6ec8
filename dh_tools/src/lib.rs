// Shared plumbing for the dh_tools binaries
//
// Every tool loads its robot from DH_ROBOT_CONFIG (a JSON file) or falls back
// to the calibrated COMAU Smart Six, logs through tracing to stderr, and
// prints either a human table or JSON (`--json`) on stdout.

use dh_kinematics::{KinematicChain, KinematicsError, RobotConfig};
use tracing_subscriber::EnvFilter;

pub const CONFIG_ENV: &str = "DH_ROBOT_CONFIG";

/// Install a stderr subscriber honoring RUST_LOG, defaulting to `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_chain() -> Result<(RobotConfig, KinematicChain), KinematicsError> {
    let config = RobotConfig::from_env_or_default(CONFIG_ENV)?;
    let chain = config.build_chain()?;
    tracing::info!(robot = %config.name, dof = chain.dof(), "robot loaded");
    Ok((config, chain))
}

/// Parsed command line: the `--json` switch plus positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub json: bool,
    pub positional: Vec<String>,
}

impl CliArgs {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut parsed = CliArgs::default();
        for arg in args {
            match arg.as_str() {
                "--json" => parsed.json = true,
                flag if flag.starts_with("--") => return Err(format!("unknown flag `{}`", flag)),
                _ => parsed.positional.push(arg),
            }
        }
        Ok(parsed)
    }

    pub fn from_env() -> Result<Self, String> {
        Self::parse(std::env::args().skip(1))
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

/// Millimeter formatting used by every table.
pub fn mm(meters: f64) -> String {
    format!("{:8.1}", meters * 1000.0)
}

pub fn degrees(radians: &[f64]) -> Vec<f64> {
    radians.iter().map(|r| (r.to_degrees() * 1e6).round() / 1e6).collect()
}
