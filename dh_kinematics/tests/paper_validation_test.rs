/// Forward kinematics against the published COMAU Smart Six test positions
use dh_kinematics::reference::paper_cases;
use dh_kinematics::{evaluate, RobotConfig, RobotModel, ValidationHarness};

#[test]
fn test_calibrated_model_passes_all_paper_cases() {
    let chain = RobotConfig::comau_smart_six().build_chain().unwrap();
    let report = ValidationHarness::default().validate(&chain, &paper_cases());

    for case in &report.cases {
        println!(
            "{:<5} error={:6.1}mm passed={}",
            case.name,
            case.error.unwrap() * 1000.0,
            case.passed
        );
    }

    assert!(report.all_passed);
    assert_eq!(report.passed(), 4);

    let errors: Vec<f64> = report.cases.iter().map(|c| c.error.unwrap()).collect();
    assert!(errors[0] < 1e-3, "zero pose should be exact");
    assert!(errors[1] < 1e-3, "base rotation should be exact");
    assert!((errors[2] - 0.0211).abs() < 5e-4, "singular case is ~21.1mm off");
    assert!((errors[3] - 0.0131).abs() < 5e-4, "numerical case is ~13.1mm off");
}

#[test]
fn test_table1_model_misses_zero_pose() {
    let chain = RobotConfig::from_model(RobotModel::SmartSixTable1).build_chain().unwrap();
    let report = ValidationHarness::default().validate(&chain, &paper_cases());

    assert!(!report.all_passed);
    // Every case still ran and carries its own verdict.
    assert_eq!(report.cases.len(), 4);
    assert!(report.cases.iter().all(|c| c.error.is_some()));
    assert!(!report.cases[0].passed);
}

#[test]
fn test_signed_deltas_for_singular_case() {
    let chain = RobotConfig::comau_smart_six().build_chain().unwrap();
    let report = ValidationHarness::default().validate(&chain, &paper_cases());
    let singular = &report.cases[2];
    let delta = singular.delta.unwrap();

    // Computed [0.4357, 0, 0.8855] vs reference [0.45, 0, 0.87].
    assert!(delta.x < 0.0);
    assert!(delta.z > 0.0);
    assert!(delta.y.abs() < 1e-9);
}

#[test]
fn test_frames_serialize_as_row_major_arrays() {
    let chain = RobotConfig::comau_smart_six().build_chain().unwrap();
    let frames = evaluate(&chain, &[0.0; 6]).unwrap();
    let rows: Vec<[[f64; 4]; 4]> = frames.frames().iter().map(|f| f.to_rows()).collect();
    let json = serde_json::to_string(&rows).unwrap();

    let back: Vec<Vec<Vec<f64>>> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 7);
    assert_eq!(back[0], vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
    ]);
    assert!((back[6][0][3] - 0.87).abs() < 1e-9);
    assert!((back[6][2][3] - 1.17).abs() < 1e-9);
}
