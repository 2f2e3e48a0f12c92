use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_COST_WEIGHT: f64 = 50.0;
const DEFAULT_DEVELOPMENT_COST_WEIGHT: f64 = 30.0;
const DEFAULT_LEAD_TIME_WEIGHT: f64 = 20.0;

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
    pub ranking: RankingConfig,
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

        let ranking = RankingConfig {
            cost_weight: weight_from_env("APP_DEFAULT_COST_WEIGHT", DEFAULT_COST_WEIGHT)?,
            development_cost_weight: weight_from_env(
                "APP_DEFAULT_DEVELOPMENT_COST_WEIGHT",
                DEFAULT_DEVELOPMENT_COST_WEIGHT,
            )?,
            lead_time_weight: weight_from_env(
                "APP_DEFAULT_LEAD_TIME_WEIGHT",
                DEFAULT_LEAD_TIME_WEIGHT,
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            ranking,
        })
    }
}

fn weight_from_env(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(default),
    };

    match raw.trim().parse::<f64>() {
        Ok(weight) if weight.is_finite() && (0.0..=100.0).contains(&weight) => Ok(weight),
        _ => Err(ConfigError::InvalidWeight { key, value: raw }),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Factor weights applied to nominations opened without an explicit baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    pub cost_weight: f64,
    pub development_cost_weight: f64,
    pub lead_time_weight: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            cost_weight: DEFAULT_COST_WEIGHT,
            development_cost_weight: DEFAULT_DEVELOPMENT_COST_WEIGHT,
            lead_time_weight: DEFAULT_LEAD_TIME_WEIGHT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { key, value } => {
                write!(f, "{key} must be a percentage between 0 and 100 (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidWeight { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
