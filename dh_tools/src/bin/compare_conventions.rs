// Compare DH interpretations against the reference positions
// Run with: cargo run -p dh_tools --bin compare_conventions [-- --json]
//
// Reading a table in the wrong convention moves the end effector by whole
// link lengths; this prints how far for each reference configuration, next
// to the error of the uncalibrated Table 1 parameters.

use std::process::ExitCode;

use dh_kinematics::reference::paper_cases;
use dh_kinematics::{DhConvention, ForwardKinematics, RobotConfig};
use dh_tools::{init_tracing, load_chain, mm, print_json, CliArgs};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConventionRow {
    case: String,
    standard: [f64; 3],
    modified: [f64; 3],
    table1: [f64; 3],
    reference: [f64; 3],
    standard_error: f64,
    modified_error: f64,
    table1_error: f64,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("compare_conventions: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<(), String> {
    let args = CliArgs::from_env()?;
    let (_, chain) = load_chain().map_err(|e| e.to_string())?;
    let standard = chain.clone().with_convention(DhConvention::Standard);
    let modified = chain.with_convention(DhConvention::Modified);
    let table1 = RobotConfig::comau_smart_six_table1()
        .build_chain()
        .map_err(|e| e.to_string())?;
    let engine = ForwardKinematics::new();

    let mut rows = Vec::new();
    for case in paper_cases() {
        let s = engine.end_effector_position(&standard, &case.q).map_err(|e| e.to_string())?;
        let m = engine.end_effector_position(&modified, &case.q).map_err(|e| e.to_string())?;
        let t = engine.end_effector_position(&table1, &case.q).map_err(|e| e.to_string())?;
        rows.push(ConventionRow {
            standard_error: (s - case.reference).norm(),
            modified_error: (m - case.reference).norm(),
            table1_error: (t - case.reference).norm(),
            standard: s.into(),
            modified: m.into(),
            table1: t.into(),
            reference: case.reference.into(),
            case: case.name,
        });
    }

    if args.json {
        return print_json(&rows);
    }

    println!(
        "{:<5} {:>14} {:>14} {:>14}",
        "case", "standard [mm]", "modified [mm]", "table 1 [mm]"
    );
    for row in &rows {
        println!(
            "{:<5} {:>14} {:>14} {:>14}",
            row.case,
            mm(row.standard_error),
            mm(row.modified_error),
            mm(row.table1_error)
        );
    }
    Ok(())
}
