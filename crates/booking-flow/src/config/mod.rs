use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub booking: BookingConfig,
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

        let payment_delay_ms = env::var("BOOKING_PAYMENT_DELAY_MS")
            .unwrap_or_else(|_| DEFAULT_PAYMENT_DELAY_MS.to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidPaymentDelay)?;

        let payment_success_rate = env::var("BOOKING_PAYMENT_SUCCESS_RATE")
            .unwrap_or_else(|_| DEFAULT_PAYMENT_SUCCESS_RATE.to_string())
            .parse::<f64>()
            .ok()
            .filter(|rate| (0.0..=1.0).contains(rate))
            .ok_or(ConfigError::InvalidSuccessRate)?;

        let fleet_csv = env::var("BOOKING_FLEET_CSV")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            booking: BookingConfig {
                payment_delay_ms,
                payment_success_rate,
                fleet_csv,
            },
        })
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

pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2_000;
pub const DEFAULT_PAYMENT_SUCCESS_RATE: f64 = 0.7;

/// Knobs for the simulated payment step and the vehicle fleet source.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    pub payment_delay_ms: u64,
    pub payment_success_rate: f64,
    pub fleet_csv: Option<PathBuf>,
}

impl BookingConfig {
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            payment_delay_ms: DEFAULT_PAYMENT_DELAY_MS,
            payment_success_rate: DEFAULT_PAYMENT_SUCCESS_RATE,
            fleet_csv: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPaymentDelay,
    InvalidSuccessRate,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPaymentDelay => {
                write!(f, "BOOKING_PAYMENT_DELAY_MS must be a whole number of milliseconds")
            }
            ConfigError::InvalidSuccessRate => {
                write!(f, "BOOKING_PAYMENT_SUCCESS_RATE must be a number between 0 and 1")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPaymentDelay
            | ConfigError::InvalidSuccessRate => None,
        }
    }
}
