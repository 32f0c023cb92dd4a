use crate::pricing::PricingPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the fare service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pricing: PricingPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let pricing = load_pricing_policy()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pricing,
        })
    }
}

/// Pricing knobs are policy decisions, not derived from data, so they are
/// surfaced as environment overrides while keeping the calibrated defaults.
fn load_pricing_policy() -> Result<PricingPolicy, ConfigError> {
    let mut policy = PricingPolicy::default();

    if let Some(value) = read_f64("FARE_CONTEXT_FACTOR_MIN")? {
        policy.context_factor_min = value;
    }
    if let Some(value) = read_f64("FARE_CONTEXT_FACTOR_MAX")? {
        policy.context_factor_max = value;
    }
    if let Some(value) = read_f64("FARE_REFERENCE_DISTANCE_KM")? {
        policy.reference_distance_km = value;
    }
    if let Ok(raw) = env::var("FARE_TRAINING_SEED") {
        policy.training_seed = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidPricingKnob {
                name: "FARE_TRAINING_SEED",
            })?;
    }

    if policy.context_factor_min > policy.context_factor_max {
        return Err(ConfigError::InvalidContextBand {
            min: policy.context_factor_min,
            max: policy.context_factor_max,
        });
    }

    Ok(policy)
}

fn read_f64(name: &'static str) -> Result<Option<f64>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidPricingKnob { name }),
        Err(_) => Ok(None),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPricingKnob { name: &'static str },
    InvalidContextBand { min: f64, max: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPricingKnob { name } => {
                write!(f, "{name} must parse to a number")
            }
            ConfigError::InvalidContextBand { min, max } => {
                write!(
                    f,
                    "context factor band is inverted: min {min} exceeds max {max}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("FARE_CONTEXT_FACTOR_MIN");
        env::remove_var("FARE_CONTEXT_FACTOR_MAX");
        env::remove_var("FARE_REFERENCE_DISTANCE_KM");
        env::remove_var("FARE_TRAINING_SEED");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.pricing, PricingPolicy::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn pricing_knobs_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FARE_CONTEXT_FACTOR_MIN", "0.95");
        env::set_var("FARE_CONTEXT_FACTOR_MAX", "1.10");
        env::set_var("FARE_REFERENCE_DISTANCE_KM", "7.5");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.pricing.context_factor_min, 0.95);
        assert_eq!(config.pricing.context_factor_max, 1.10);
        assert_eq!(config.pricing.reference_distance_km, 7.5);
        reset_env();
    }

    #[test]
    fn rejects_inverted_context_band() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("FARE_CONTEXT_FACTOR_MIN", "1.2");
        env::set_var("FARE_CONTEXT_FACTOR_MAX", "1.0");
        let result = AppConfig::load();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidContextBand { .. })
        ));
        reset_env();
    }
}
