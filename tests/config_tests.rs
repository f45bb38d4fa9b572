use malo::config::KioskConfig;
use std::collections::HashMap;

#[test]
fn test_defaults() {
    let config = KioskConfig::default();
    assert_eq!(config.quarantine_ms, 5_000);
    assert_eq!(config.pulse_half_period_ms, 500);
    assert_eq!(config.pulse_iterations, 10);
    assert_eq!(config.barcode_scan_ms, 10_000);
    assert_eq!(config.card_insert_ms, 3_000);
    assert_eq!(config.payment_processing_ms, 2_000);
}

#[test]
fn test_env_overrides_and_bad_values() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("KIOSK_BACKEND_URL", "http://10.0.0.2:9000/"),
        ("KIOSK_QUARANTINE_MS", "750"),
        ("KIOSK_PULSE_ITERATIONS", "many"),
    ]);
    let config = KioskConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.backend_url, "http://10.0.0.2:9000");
    assert_eq!(config.quarantine_ms, 750);
    assert_eq!(config.pulse_iterations, 10, "Invalid value keeps the default");
}

#[test]
fn test_partial_json() {
    let config = KioskConfig::from_json(r#"{ "barcode_scan_ms": 3000 }"#).unwrap();
    assert_eq!(config.barcode_scan_ms, 3_000);
    assert_eq!(config.payment_processing_ms, 2_000, "Unset fields keep defaults");
}
