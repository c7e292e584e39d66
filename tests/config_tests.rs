//! Tests for environment-driven configuration
//!
//! These mutate process environment variables, so they run serially.

use ambudispatch::config::Config;
use serial_test::serial;
use std::time::Duration;

const KEYS: [&str; 8] = [
    "PORT",
    "SIM_ENABLED",
    "SIM_TICK_MS",
    "SIM_CALL_INTERVAL_MS",
    "SIM_JITTER_DEG",
    "SIM_SEED",
    "SEED_FLEET",
    "EVENT_CAPACITY",
];

fn clear_env() {
    for key in KEYS {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    let config = Config::from_env().unwrap();
    assert_eq!(config.port, 8080);
    assert!(config.seed_fleet);
    assert_eq!(config.event_capacity, 256);
    assert!(config.simulation.enabled);
    assert_eq!(config.simulation.tick_interval, Duration::from_millis(4000));
    assert_eq!(config.simulation.call_interval, Duration::from_millis(12000));
    assert!(config.simulation.seed.is_none());
}

#[test]
#[serial]
fn test_from_env_reads_overrides() {
    clear_env();
    std::env::set_var("PORT", "3100");
    std::env::set_var("SIM_ENABLED", "false");
    std::env::set_var("SIM_CALL_INTERVAL_MS", "500");
    std::env::set_var("SIM_JITTER_DEG", "0");
    std::env::set_var("SIM_SEED", "7");
    std::env::set_var("EVENT_CAPACITY", "16");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.port, 3100);
    assert!(!config.simulation.enabled);
    assert_eq!(config.simulation.call_interval, Duration::from_millis(500));
    assert_eq!(config.simulation.jitter_degrees, 0.0);
    assert_eq!(config.simulation.seed, Some(7));
    assert_eq!(config.event_capacity, 16);
}

#[test]
#[serial]
fn test_from_env_bad_value_is_an_error_not_a_panic() {
    clear_env();
    std::env::set_var("SIM_SEED", "lucky");
    let result = Config::from_env();
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("SIM_SEED"));
}
