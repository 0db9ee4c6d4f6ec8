// Validate forward kinematics against the published test positions
// Run with: cargo run -p dh_tools --bin validate_fk [-- --json]
//
// Exits with status 1 when any case is outside its tolerance.

use std::process::ExitCode;

use dh_kinematics::reference::paper_cases;
use dh_kinematics::ValidationHarness;
use dh_tools::{degrees, init_tracing, load_chain, mm, print_json, CliArgs};

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("validate_fk: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool, String> {
    let args = CliArgs::from_env()?;
    let (config, chain) = load_chain().map_err(|e| e.to_string())?;
    let report = ValidationHarness::default().validate(&chain, &paper_cases());

    if args.json {
        print_json(&report)?;
        return Ok(report.all_passed);
    }

    println!("Forward kinematics validation: {}\n", config.name);
    println!(
        "{:<5} {:<34} {:>8} {:>8} {:>8} {:>8}  result",
        "case", "q [deg]", "dx [mm]", "dy [mm]", "dz [mm]", "err [mm]"
    );
    for case in &report.cases {
        let q = format!("{:?}", degrees(&case.q));
        match (case.delta, case.error) {
            (Some(delta), Some(error)) => println!(
                "{:<5} {:<34} {} {} {} {}  {}",
                case.name,
                q,
                mm(delta.x),
                mm(delta.y),
                mm(delta.z),
                mm(error),
                if case.passed { "PASS" } else { "FAIL" }
            ),
            _ => println!(
                "{:<5} {:<34} {}",
                case.name,
                q,
                case.failure.as_ref().map(|e| e.to_string()).unwrap_or_default()
            ),
        }
    }

    println!(
        "\n{}/{} cases within tolerance",
        report.passed(),
        report.cases.len()
    );
    if let Some(max) = report.max_error() {
        println!("max error: {} mm", mm(max).trim());
    }
    Ok(report.all_passed)
}
