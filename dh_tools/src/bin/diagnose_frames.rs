// Print every intermediate frame for one joint configuration
// Run with: cargo run -p dh_tools --bin diagnose_frames [-- q1 .. qN (deg)] [--json]
//
// Missing joints default to zero. Frames whose rotation drifted from
// orthonormal are flagged.

use std::process::ExitCode;

use dh_kinematics::ForwardKinematics;
use dh_tools::{init_tracing, load_chain, print_json, CliArgs};
use serde::Serialize;

const ORTHONORMAL_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Serialize)]
struct FrameReport {
    index: usize,
    origin: [f64; 3],
    z_axis: [f64; 3],
    orthonormality_error: f64,
    matrix: [[f64; 4]; 4],
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("diagnose_frames: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<(), String> {
    let args = CliArgs::from_env()?;
    let (config, chain) = load_chain().map_err(|e| e.to_string())?;

    let mut q = vec![0.0; chain.dof()];
    if args.positional.len() > q.len() {
        return Err(format!("{} joints given, robot has {}", args.positional.len(), q.len()));
    }
    for (slot, text) in q.iter_mut().zip(&args.positional) {
        let deg: f64 = text.parse().map_err(|_| format!("invalid joint value `{}`", text))?;
        *slot = deg.to_radians();
    }

    let frames = ForwardKinematics::strict()
        .evaluate(&chain, &q)
        .map_err(|e| e.to_string())?;

    let reports: Vec<FrameReport> = frames
        .frames()
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let t = frame.translation();
            let z = frame.z_axis();
            FrameReport {
                index,
                origin: [t.x, t.y, t.z],
                z_axis: [z.x, z.y, z.z],
                orthonormality_error: frame.orthonormality_error(),
                matrix: frame.to_rows(),
            }
        })
        .collect();

    if args.json {
        return print_json(&reports);
    }

    println!("{}: {} frames\n", config.name, reports.len());
    for report in &reports {
        let [x, y, z] = report.origin;
        let [zx, zy, zz] = report.z_axis;
        let flag = if report.orthonormality_error > ORTHONORMAL_TOLERANCE {
            "  NOT ORTHONORMAL"
        } else {
            ""
        };
        println!(
            "frame {}: origin [{:8.4} {:8.4} {:8.4}]  z [{:6.3} {:6.3} {:6.3}]{}",
            report.index, x, y, z, zx, zy, zz, flag
        );
    }
    let violated = frames.violated_joints();
    if !violated.is_empty() {
        let names: Vec<String> = violated.iter().map(|j| format!("q{}", j + 1)).collect();
        println!("\njoint limits exceeded: {}", names.join(", "));
    }
    Ok(())
}
