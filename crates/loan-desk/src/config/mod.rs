use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FRAUD_AUTHORITY_URL: &str = "http://localhost:8081";
const DEFAULT_FRAUD_AUTHORITY_TIMEOUT_MS: u64 = 2_000;

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

/// Top-level configuration shared by the loan intake and fraud authority processes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub loan_server: ServerConfig,
    pub fraud_server: ServerConfig,
    pub fraud_authority: FraudAuthorityConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let loan_port = read_port("LOAN_PORT", 8080)?;
        let fraud_port = read_port("FRAUD_PORT", 8081)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let base_url = env::var("FRAUD_AUTHORITY_URL")
            .unwrap_or_else(|_| DEFAULT_FRAUD_AUTHORITY_URL.to_string());
        let base_url = reqwest::Url::parse(&base_url)
            .map_err(|err| ConfigError::InvalidAuthorityUrl {
                value: base_url.clone(),
                reason: err.to_string(),
            })?
            .to_string()
            .trim_end_matches('/')
            .to_string();

        let timeout_ms = match env::var("FRAUD_AUTHORITY_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidTimeout),
            },
            Err(_) => DEFAULT_FRAUD_AUTHORITY_TIMEOUT_MS,
        };

        Ok(Self {
            environment,
            loan_server: ServerConfig {
                host: host.clone(),
                port: loan_port,
            },
            fraud_server: ServerConfig {
                host,
                port: fraud_port,
            },
            fraud_authority: FraudAuthorityConfig {
                base_url,
                timeout: Duration::from_millis(timeout_ms),
            },
            storage: StorageConfig {
                loan_database: read_path("LOAN_DATABASE_PATH"),
                fraud_database: read_path("FRAUD_DATABASE_PATH"),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn read_port(var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort { var }),
        Err(_) => Ok(default),
    }
}

fn read_path(var: &str) -> Option<PathBuf> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
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

/// Where loan intake finds the fraud authority and how long it waits for an answer.
#[derive(Debug, Clone)]
pub struct FraudAuthorityConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// SQLite files backing each store. `None` keeps the store in memory.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub loan_database: Option<PathBuf>,
    pub fraud_database: Option<PathBuf>,
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        var: &'static str,
    },
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidTimeout,
    InvalidAuthorityUrl {
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { var } => write!(f, "{var} must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(
                    f,
                    "FRAUD_AUTHORITY_TIMEOUT_MS must be a positive number of milliseconds"
                )
            }
            ConfigError::InvalidAuthorityUrl { value, reason } => {
                write!(f, "FRAUD_AUTHORITY_URL '{value}' is not a valid URL ({reason})")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidAuthorityUrl { .. } => None,
        }
    }
}
