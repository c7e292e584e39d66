use anyhow::{anyhow, bail, Context};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::notification::DEFAULT_EVENT_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub seed_fleet: bool,
    pub event_capacity: usize,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub enabled: bool,
    pub tick_interval: Duration,
    pub call_interval: Duration,
    /// Full width, in degrees, of the per-tick position jitter.
    pub jitter_degrees: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval: Duration::from_millis(4000),
            call_interval: Duration::from_millis(12000),
            jitter_degrees: 0.003,
            seed: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            seed_fleet: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let sim = defaults.simulation;

        let config = Config {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            seed_fleet: parse_bool_or(&lookup, "SEED_FLEET", defaults.seed_fleet)?,
            event_capacity: parse_or(&lookup, "EVENT_CAPACITY", defaults.event_capacity)?,
            simulation: SimulationConfig {
                enabled: parse_bool_or(&lookup, "SIM_ENABLED", sim.enabled)?,
                tick_interval: parse_millis_or(&lookup, "SIM_TICK_MS", sim.tick_interval)?,
                call_interval: parse_millis_or(&lookup, "SIM_CALL_INTERVAL_MS", sim.call_interval)?,
                jitter_degrees: parse_or(&lookup, "SIM_JITTER_DEG", sim.jitter_degrees)?,
                seed: match lookup("SIM_SEED") {
                    Some(raw) => Some(
                        raw.trim()
                            .parse()
                            .with_context(|| format!("Invalid SIM_SEED value: {}", raw))?,
                    ),
                    None => None,
                },
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.event_capacity == 0 {
            bail!("EVENT_CAPACITY must be positive");
        }
        if !self.simulation.jitter_degrees.is_finite() || self.simulation.jitter_degrees < 0.0 {
            bail!("SIM_JITTER_DEG must be a non-negative number");
        }
        Ok(())
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {} value {:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(lookup: &F, key: &str, default: bool) -> anyhow::Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| raw.trim().to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid {} value {:?}: expected a boolean", key, raw)),
        },
        None => Ok(default),
    }
}

fn parse_millis_or<F>(lookup: &F, key: &str, default: Duration) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let millis: u64 = parse_or(lookup, key, default.as_millis() as u64)?;
    if millis == 0 {
        bail!("{} must be positive", key);
    }
    Ok(Duration::from_millis(millis))
}
