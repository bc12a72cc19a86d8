use approx::assert_relative_eq;
use assert_cmd::Command;
use serde_json::Value;

fn snake_matrix(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("snake-matrix").unwrap();
    // Keep a stray snake.config in the working directory out of the way.
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_report_contains_inverse() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = temp_dir.path().join("reports").join("inverse.json");

    snake_matrix(temp_dir.path())
        .args(["--points", "5", "--alpha", "0.1", "--beta", "0.1", "--gamma", "1.0"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["num_points"], 5);
    assert_eq!(report["boundary"], "closed");
    assert_eq!(report["inversion"], "dense");
    assert_relative_eq!(report["coefficients"]["q"].as_f64().unwrap(), -0.5, epsilon = 1e-12);
    assert!(report["identity_residual"].as_f64().unwrap() < 1e-8);

    let expected = snake_energy::build_internal_energy_inverse(0.1, 0.1, 1.0, 5).unwrap();
    let rows = report["inverse"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    for (i, row) in rows.iter().enumerate() {
        let row = row.as_array().unwrap();
        assert_eq!(row.len(), 5);
        for (j, value) in row.iter().enumerate() {
            assert_relative_eq!(value.as_f64().unwrap(), expected[(i, j)], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_config_file_supplies_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("weights.config");
    let output = temp_dir.path().join("inverse.json");
    std::fs::write(&config, "alpha = 0.2\nbeta = 0.05\ngamma = 0.5\n").unwrap();

    snake_matrix(temp_dir.path())
        .args(["--points", "12", "--inversion", "circulant", "--alpha", "0.3"])
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let report: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["params"]["alpha"].as_f64().unwrap(), 0.3);
    assert_eq!(report["params"]["beta"].as_f64().unwrap(), 0.05);
    assert_eq!(report["params"]["gamma"].as_f64().unwrap(), 0.5);
    assert_eq!(report["inversion"], "circulant");
}

#[test]
fn test_singular_parameters_fail() {
    let temp_dir = tempfile::tempdir().unwrap();

    snake_matrix(temp_dir.path())
        .args(["--points", "8", "--alpha", "0", "--beta", "0", "--gamma", "0"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_point_count_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    snake_matrix(temp_dir.path())
        .args(["--points", "0"])
        .assert()
        .failure();
}

#[test]
fn test_open_boundary_with_circulant_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    snake_matrix(temp_dir.path())
        .args(["--points", "10", "--boundary", "open", "--inversion", "circulant"])
        .assert()
        .failure();
}

#[test]
fn test_print_and_negative_weights() {
    let temp_dir = tempfile::tempdir().unwrap();

    let assert = snake_matrix(temp_dir.path())
        .args(["--points", "6", "--alpha", "-0.01", "--gamma", "2.0", "--print"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Inverse matrix"));
    assert!(stdout.contains("Negative tension or rigidity"));
}
