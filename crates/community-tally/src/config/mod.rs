use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::FixedOffset;

use crate::workflows::engagement::{
    AcknowledgmentPolicy, Calendar, EngagementConfig, QuotaPolicy, ScoringConfig, SlabTable,
    SlabTableError, UserId,
};

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
    pub engagement: EngagementConfig,
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
            engagement: load_engagement()?,
        })
    }
}

fn load_engagement() -> Result<EngagementConfig, ConfigError> {
    let admin_id = match env::var("TALLY_ADMIN_ID") {
        Ok(raw) if !raw.trim().is_empty() => Some(UserId(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidAdminId)?,
        )),
        _ => None,
    };

    let calendar = match env::var("TALLY_UTC_OFFSET") {
        Ok(raw) => Calendar::new(parse_utc_offset(&raw).ok_or(ConfigError::InvalidUtcOffset {
            value: raw.clone(),
        })?),
        Err(_) => Calendar::utc(),
    };

    let defaults = QuotaPolicy::default();
    let quota = QuotaPolicy {
        analysis_daily_limit: limit_var(
            "TALLY_ANALYSIS_DAILY_LIMIT",
            defaults.analysis_daily_limit,
        )?,
        signal_daily_limit: limit_var("TALLY_SIGNAL_DAILY_LIMIT", defaults.signal_daily_limit)?,
        twitter_weekly_limit: limit_var(
            "TALLY_TWITTER_WEEKLY_LIMIT",
            defaults.twitter_weekly_limit,
        )?,
    };

    let trade_slabs = match env::var("TALLY_TRADE_SLABS") {
        Ok(raw) => raw
            .parse::<SlabTable>()
            .map_err(|source| ConfigError::InvalidSlabTable { source })?,
        Err(_) => SlabTable::standard(),
    };

    let announce_rejections = match env::var("TALLY_ANNOUNCE_REJECTIONS") {
        Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
            variable: "TALLY_ANNOUNCE_REJECTIONS",
        })?,
        Err(_) => false,
    };

    Ok(EngagementConfig {
        admin_id,
        calendar,
        quota,
        scoring: ScoringConfig {
            trade_slabs,
            ..ScoringConfig::default()
        },
        acknowledgments: AcknowledgmentPolicy {
            announce_rejections,
        },
    })
}

fn limit_var(variable: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidLimit { variable }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parses `+HH:MM`, `-HH:MM`, or `Z`.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours = hours.parse::<i32>().ok()?;
    let minutes = minutes.parse::<i32>().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
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
    InvalidAdminId,
    InvalidUtcOffset { value: String },
    InvalidLimit { variable: &'static str },
    InvalidSlabTable { source: SlabTableError },
    InvalidFlag { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAdminId => write!(f, "TALLY_ADMIN_ID must be a numeric user id"),
            ConfigError::InvalidUtcOffset { value } => {
                write!(f, "TALLY_UTC_OFFSET '{value}' must look like +05:30 or -04:00")
            }
            ConfigError::InvalidLimit { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
            ConfigError::InvalidSlabTable { source } => {
                write!(f, "TALLY_TRADE_SLABS is invalid: {source}")
            }
            ConfigError::InvalidFlag { variable } => write!(f, "{variable} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidSlabTable { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidAdminId
            | ConfigError::InvalidUtcOffset { .. }
            | ConfigError::InvalidLimit { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
