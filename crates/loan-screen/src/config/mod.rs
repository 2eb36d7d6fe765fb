use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::credit::{EvaluationConfig, Kernel};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub models: ModelConfig,
    pub evaluation: EvaluationConfig,
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

        let artifact_dir =
            PathBuf::from(env::var("APP_MODEL_DIR").unwrap_or_else(|_| "models".to_string()));
        let default_kernel = match env::var("APP_DEFAULT_KERNEL") {
            Ok(raw) => raw
                .parse::<Kernel>()
                .map_err(|_| ConfigError::InvalidKernel { value: raw })?,
            Err(_) => Kernel::Linear,
        };

        let mut evaluation = EvaluationConfig::default();
        if let Ok(raw) = env::var("APP_GUARD_INCOME_FLOOR") {
            evaluation.income_floor = parse_finite(&raw)
                .filter(|floor| *floor >= 0.0)
                .ok_or(ConfigError::InvalidIncomeFloor { value: raw })?;
        }
        if let Ok(raw) = env::var("APP_GUARD_CONFIDENCE") {
            evaluation.guard_confidence = parse_finite(&raw)
                .filter(|confidence| (0.0..=100.0).contains(confidence))
                .ok_or(ConfigError::InvalidGuardConfidence { value: raw })?;
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            models: ModelConfig {
                artifact_dir,
                default_kernel,
            },
            evaluation,
        })
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
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
    pub ansi: bool,
}

/// Where trained artifacts live and which kernel serves requests at startup.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub artifact_dir: PathBuf,
    pub default_kernel: Kernel,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidKernel { value: String },
    InvalidIncomeFloor { value: String },
    InvalidGuardConfidence { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidKernel { value } => write!(
                f,
                "APP_DEFAULT_KERNEL '{}' is not one of linear, poly, rbf",
                value
            ),
            ConfigError::InvalidIncomeFloor { value } => write!(
                f,
                "APP_GUARD_INCOME_FLOOR '{}' must be a non-negative number",
                value
            ),
            ConfigError::InvalidGuardConfidence { value } => write!(
                f,
                "APP_GUARD_CONFIDENCE '{}' must be a number between 0 and 100",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidKernel { .. }
            | ConfigError::InvalidIncomeFloor { .. }
            | ConfigError::InvalidGuardConfidence { .. } => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_MODEL_DIR",
            "APP_DEFAULT_KERNEL",
            "APP_GUARD_INCOME_FLOOR",
            "APP_GUARD_CONFIDENCE",
        ] {
            env::remove_var(key);
        }
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
        assert_eq!(config.models.artifact_dir, PathBuf::from("models"));
        assert_eq!(config.models.default_kernel, Kernel::Linear);
        assert_eq!(config.evaluation.income_floor, 2000.0);
        assert_eq!(config.evaluation.guard_confidence, 95.0);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_model_and_guard_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MODEL_DIR", "/srv/models");
        env::set_var("APP_DEFAULT_KERNEL", "RBF");
        env::set_var("APP_GUARD_CONFIDENCE", "92");
        env::set_var("APP_GUARD_INCOME_FLOOR", "2500");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.models.artifact_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.models.default_kernel, Kernel::Rbf);
        assert_eq!(config.evaluation.guard_confidence, 92.0);
        assert_eq!(config.evaluation.income_floor, 2500.0);
        reset_env();
    }

    #[test]
    fn rejects_guard_confidence_outside_percentage_range() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_GUARD_CONFIDENCE", "120");
        let err = AppConfig::load().expect_err("confidence above 100 is invalid");
        assert!(matches!(err, ConfigError::InvalidGuardConfidence { .. }));
        reset_env();
    }

    #[test]
    fn rejects_unknown_kernel() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_KERNEL", "sigmoid");
        let err = AppConfig::load().expect_err("sigmoid is not trained");
        assert!(err.to_string().contains("sigmoid"));
        reset_env();
    }
}
