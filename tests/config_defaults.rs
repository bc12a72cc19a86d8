use snake_energy::config::{load_config_value, EnergyDefaults, DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_GAMMA};
use snake_energy::EnergyParams;

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("missing.config");

    assert_eq!(load_config_value(&path, "alpha"), None);
    assert_eq!(EnergyDefaults::load(&path), EnergyDefaults::default());
}

#[test]
fn test_values_are_read_and_trimmed() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("snake.config");
    std::fs::write(
        &path,
        "# contour weights\nalpha = 0.25\n  beta=0.5  \ngamma = not-a-number\n",
    )
    .unwrap();

    assert_eq!(load_config_value(&path, "alpha").as_deref(), Some("0.25"));
    assert_eq!(load_config_value(&path, "beta").as_deref(), Some("0.5"));
    assert_eq!(load_config_value(&path, "delta"), None);

    let defaults = EnergyDefaults::load(&path);
    assert_eq!(defaults.alpha, 0.25);
    assert_eq!(defaults.beta, 0.5);
    // Unparsable values fall back.
    assert_eq!(defaults.gamma, DEFAULT_GAMMA);
}

#[test]
fn test_commented_keys_are_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("snake.config");
    std::fs::write(&path, "# alpha = 3.0\n").unwrap();

    assert_eq!(EnergyDefaults::load(&path).alpha, DEFAULT_ALPHA);
}

#[test]
fn test_overrides_take_precedence() {
    let defaults = EnergyDefaults::default();

    assert_eq!(
        defaults.resolve(None, None, None),
        EnergyParams::new(DEFAULT_ALPHA, DEFAULT_BETA, DEFAULT_GAMMA)
    );
    assert_eq!(
        defaults.resolve(Some(0.3), None, Some(2.0)),
        EnergyParams::new(0.3, DEFAULT_BETA, 2.0)
    );
}
