use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::damage::{InvalidSeverityBands, SeverityBands};
use crate::valuation::{CalculationSettings, ExchangeRate};

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
    pub valuation: ValuationConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            valuation: ValuationConfig::from_env()?,
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

/// Business inputs handed to every calculation. Unset variables keep the defaults.
#[derive(Debug, Clone, Default)]
pub struct ValuationConfig {
    pub settings: CalculationSettings,
    pub exchange_rate: ExchangeRate,
    pub severity_bands: SeverityBands,
}

impl ValuationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = CalculationSettings::default();
        let settings = CalculationSettings {
            target_profit_pct: number_var("BID_TARGET_PROFIT_PCT", defaults.target_profit_pct)?,
            safety_deduction: number_var("BID_SAFETY_DEDUCTION", defaults.safety_deduction)?,
            transport_cost: number_var("BID_TRANSPORT_COST", defaults.transport_cost)?,
            tuv_cost: number_var("BID_TUV_COST", defaults.tuv_cost)?,
            misc_cost: number_var("BID_MISC_COST", defaults.misc_cost)?,
            repair_buffer_pct: number_var("BID_REPAIR_BUFFER_PCT", defaults.repair_buffer_pct)?,
        };

        let exchange_rate = ExchangeRate::new(number_var(
            "BID_EXCHANGE_RATE",
            ExchangeRate::default().aed_per_eur(),
        )?);

        let severity_bands = match env::var("BID_SEVERITY_BANDS_AED") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<SeverityBands>()
                .map_err(|source| ConfigError::InvalidSeverityBands { source })?,
            _ => SeverityBands::default(),
        };

        Ok(Self {
            settings,
            exchange_rate,
            severity_bands,
        })
    }
}

fn number_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidNumber { name, value: raw }),
        _ => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidSeverityBands { source: InvalidSeverityBands },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a number, got '{value}'")
            }
            ConfigError::InvalidSeverityBands { .. } => write!(
                f,
                "BID_SEVERITY_BANDS_AED must list ascending positive AED limits"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidSeverityBands { source } => Some(source),
        }
    }
}
