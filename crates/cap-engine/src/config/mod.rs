use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveDate;

use crate::cap::rules::{CapRules, PoolTotals, RuleSetError};

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
    pub cap: CapConfig,
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
            cap: CapConfig::from_env()?,
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

/// League rule constants and the team's pool totals, loaded once at start-up.
#[derive(Debug, Clone, Default)]
pub struct CapConfig {
    pub rules: CapRules,
    pub pools: PoolTotals,
}

impl CapConfig {
    /// Read `CAP_*` overrides on top of the league defaults and validate them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = CapRules::default();
        let rules = CapRules {
            salary_budget: amount_var("CAP_SALARY_BUDGET", defaults.salary_budget)?,
            max_budget_charge: amount_var("CAP_MAX_BUDGET_CHARGE", defaults.max_budget_charge)?,
            designated_player_charge: amount_var(
                "CAP_DP_CHARGE",
                defaults.designated_player_charge,
            )?,
            young_designated_player_charge: amount_var(
                "CAP_YOUNG_DP_CHARGE",
                defaults.young_designated_player_charge,
            )?,
            young_designated_player_max_age: age_var(
                "CAP_YOUNG_DP_MAX_AGE",
                defaults.young_designated_player_max_age,
            )?,
            youth_charge: amount_var("CAP_YOUTH_CHARGE", defaults.youth_charge)?,
            youth_max_salary: amount_var("CAP_YOUTH_MAX_SALARY", defaults.youth_max_salary)?,
            youth_age_limit: age_var("CAP_YOUTH_AGE_LIMIT", defaults.youth_age_limit)?,
            supplemental_floor: amount_var(
                "CAP_SUPPLEMENTAL_FLOOR",
                defaults.supplemental_floor,
            )?,
            supplemental_discount_eligible: flag_var(
                "CAP_SUPPLEMENTAL_ELIGIBLE",
                defaults.supplemental_discount_eligible,
            )?,
        };
        rules.validate()?;

        let default_pools = PoolTotals::default();
        let pools = PoolTotals {
            pool_a_total: amount_var("CAP_POOL_A_TOTAL", default_pools.pool_a_total)?,
            pool_b_total: amount_var("CAP_POOL_B_TOTAL", default_pools.pool_b_total)?,
            pool_a_forfeits_on: date_var("CAP_POOL_A_FORFEITS_ON")?,
        };

        Ok(Self { rules, pools })
    }
}

fn amount_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != '_').collect();
    let value = cleaned
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidValue {
            var: name,
            value: raw.clone(),
        })?;
    if value < 0 {
        return Err(RuleSetError::NegativeConstant { field: name, value }.into());
    }
    Ok(value as u64)
}

fn age_var(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidValue {
                var: name,
                value: raw,
            }),
        Err(_) => Ok(default),
    }
}

fn flag_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: name,
            value: raw,
        }),
    }
}

fn date_var(name: &'static str) -> Result<Option<NaiveDate>, ConfigError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: name,
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidValue { var: &'static str, value: String },
    Rules(RuleSetError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidValue { var, value } => {
                write!(f, "{var} has an unusable value '{value}'")
            }
            ConfigError::Rules(err) => write!(f, "invalid cap rules: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidValue { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Rules(err) => Some(err),
        }
    }
}

impl From<RuleSetError> for ConfigError {
    fn from(value: RuleSetError) -> Self {
        Self::Rules(value)
    }
}
