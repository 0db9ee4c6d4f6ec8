// Run the calibration grid-search presets
// Run with: cargo run -p dh_tools --bin calibrate [-- <preset>] [--json]
//
// Presets: a1, offset2, q_s, q_n. Without a preset every one runs in turn.
// a1 and offset2 start from the chain with that parameter zeroed so the
// search has something to recover.

use std::process::ExitCode;

use dh_kinematics::{
    CalibrationPreset, CalibrationResult, CalibrationSearch, DhParam, KinematicChain,
    KinematicsError,
};
use dh_tools::{init_tracing, load_chain, mm, print_json, CliArgs};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PresetOutcome {
    preset: String,
    result: CalibrationResult,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("calibrate: {}", e);
            ExitCode::from(2)
        }
    }
}

fn template_for(
    preset: CalibrationPreset,
    chain: &KinematicChain,
) -> Result<KinematicChain, KinematicsError> {
    match preset {
        CalibrationPreset::ShoulderOffset => chain.with_parameter(0, DhParam::A, 0.0),
        CalibrationPreset::Joint2Offset => chain.with_parameter(1, DhParam::Offset, 0.0),
        CalibrationPreset::SingularConfig | CalibrationPreset::NumericalExample => {
            Ok(chain.clone())
        }
    }
}

fn run() -> Result<(), String> {
    let args = CliArgs::from_env()?;
    let presets: Vec<CalibrationPreset> = match args.positional.as_slice() {
        [] => CalibrationPreset::ALL.to_vec(),
        names => names
            .iter()
            .map(|n| n.parse::<CalibrationPreset>())
            .collect::<Result<_, _>>()?,
    };

    let (_, chain) = load_chain().map_err(|e| e.to_string())?;
    let mut outcomes = Vec::with_capacity(presets.len());
    for preset in presets {
        let template = template_for(preset, &chain).map_err(|e| e.to_string())?;
        let result = CalibrationSearch::new(&template)
            .run(&preset.target())
            .map_err(|e| e.to_string())?;
        outcomes.push(PresetOutcome {
            preset: preset.name().to_string(),
            result,
        });
    }

    if args.json {
        return print_json(&outcomes);
    }

    for outcome in &outcomes {
        let result = &outcome.result;
        let labels: Vec<String> = result
            .axes
            .iter()
            .zip(result.assignment())
            .map(|(axis, value)| format!("{}={}{}", axis.dimension, value, axis.unit.symbol()))
            .collect();
        println!("[{}] best: {}", outcome.preset, labels.join(" "));
        println!(
            "    error {} mm ({:?}), {} matches, {} evaluated",
            mm(result.error()).trim(),
            result.best.phase,
            result.matches.len(),
            result.evaluated
        );
        let p = result.position();
        println!("    position [{:.4}, {:.4}, {:.4}]", p.x, p.y, p.z);
    }
    Ok(())
}
