use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use fieldtrack_application::RateLimitRule;
use fieldtrack_core::AppError;
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::RateLimitRules;

/// Backing store of the rate limit counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitStoreConfig {
    Memory,
    Postgres,
    Redis { url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub public_base_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub media_root: PathBuf,
    pub rate_limit_store: RateLimitStoreConfig,
    pub trusted_proxies: Vec<IpNet>,
    pub rate_limits: RateLimitRules,
    pub watermark_brand: String,
    pub watermark_logo_path: Option<PathBuf>,
    pub dev_seed: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let public_base_url = optional_env("PUBLIC_BASE_URL").unwrap_or_else(|| frontend_url.clone());
        Url::parse(&public_base_url)
            .map_err(|error| AppError::Validation(format!("invalid PUBLIC_BASE_URL: {error}")))?;

        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env_flag("SESSION_COOKIE_SECURE");

        let rate_limit_store = match env::var("RATE_LIMIT_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => RateLimitStoreConfig::Memory,
            "postgres" => RateLimitStoreConfig::Postgres,
            "redis" => RateLimitStoreConfig::Redis {
                url: required_non_empty_env("REDIS_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be 'memory', 'postgres' or 'redis', got '{other}'"
                )));
            }
        };

        let trusted_proxies =
            parse_trusted_proxies(&env::var("TRUSTED_PROXY_CIDRS").unwrap_or_default())?;

        let rate_limits = RateLimitRules {
            login: rate_limit_rule("login", "LOGIN_RATE_LIMIT", "10/900")?,
            client_dashboard: rate_limit_rule(
                "client_dashboard",
                "CLIENT_DASHBOARD_RATE_LIMIT",
                "60/60",
            )?,
            client_view: rate_limit_rule("client_view", "CLIENT_VIEW_RATE_LIMIT", "60/60")?,
            client_image: rate_limit_rule("client_image", "CLIENT_IMAGE_RATE_LIMIT", "600/60")?,
            issue_report: rate_limit_rule("issue_report", "ISSUE_REPORT_RATE_LIMIT", "5/3600")?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            public_base_url,
            api_host,
            api_port,
            cookie_secure,
            media_root: PathBuf::from(
                optional_env("MEDIA_ROOT").unwrap_or_else(|| "./media".to_owned()),
            ),
            rate_limit_store,
            trusted_proxies,
            rate_limits,
            watermark_brand: optional_env("WATERMARK_BRAND")
                .unwrap_or_else(|| "Fieldtrack".to_owned()),
            watermark_logo_path: optional_env("WATERMARK_LOGO_PATH").map(PathBuf::from),
            dev_seed: env_flag("DEV_SEED"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|cidr| !cidr.is_empty())
        .map(|cidr| {
            cidr.parse::<IpNet>()
                .or_else(|_| cidr.parse::<IpAddr>().map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!("invalid TRUSTED_PROXY_CIDRS entry '{cidr}': {error}"))
                })
        })
        .collect()
}

fn rate_limit_rule(category: &str, name: &str, default: &str) -> Result<RateLimitRule, AppError> {
    let budget = optional_env(name).unwrap_or_else(|| default.to_owned());
    RateLimitRule::parse(category, &budget)
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true")
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
