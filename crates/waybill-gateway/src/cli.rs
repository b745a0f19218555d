use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;
use waybill_limiter::LimiterSettings;

use crate::middleware::Credentials;

pub const LISTEN_ADDR_ENV: &str = "WAYBILL_LISTEN_ADDR";
pub const AUTH_USERNAME_ENV: &str = "WAYBILL_AUTH_USERNAME";
pub const AUTH_PASSWORD_ENV: &str = "WAYBILL_AUTH_PASSWORD";
pub const BUCKET_CAPACITY_ENV: &str = "WAYBILL_BUCKET_CAPACITY";
pub const REFILL_INTERVAL_ENV: &str = "WAYBILL_REFILL_INTERVAL_SECS";
pub const IDLE_TTL_ENV: &str = "WAYBILL_IDLE_TTL_SECS";
pub const MAX_CLIENTS_ENV: &str = "WAYBILL_MAX_CLIENTS";
pub const EVICTION_INTERVAL_ENV: &str = "WAYBILL_EVICTION_INTERVAL_SECS";
pub const LOG_FORMAT_ENV: &str = "WAYBILL_LOG_FORMAT";
pub const LOG_FILTER_ENV: &str = "WAYBILL_LOG_FILTER";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_AUTH_USERNAME: &str = "developer";
pub const DEFAULT_AUTH_PASSWORD: &str = "test123";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waybill-gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(long, env = AUTH_USERNAME_ENV, default_value = DEFAULT_AUTH_USERNAME)]
    pub auth_username: String,

    #[arg(
        long,
        env = AUTH_PASSWORD_ENV,
        default_value = DEFAULT_AUTH_PASSWORD,
        hide_env_values = true
    )]
    pub auth_password: String,

    /// Requests a client may burst before being limited.
    #[arg(long, env = BUCKET_CAPACITY_ENV, default_value_t = 100)]
    pub bucket_capacity: u32,

    /// Seconds between bucket refills; each refill restores full capacity.
    #[arg(long, env = REFILL_INTERVAL_ENV, default_value_t = 60)]
    pub refill_interval_secs: u64,

    #[arg(long, env = IDLE_TTL_ENV, default_value_t = 600)]
    pub idle_ttl_secs: u64,

    #[arg(long, env = MAX_CLIENTS_ENV, default_value_t = 100_000)]
    pub max_clients: usize,

    #[arg(long, env = EVICTION_INTERVAL_ENV, default_value_t = 60)]
    pub eviction_interval_secs: u64,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl Cli {
    pub fn limiter_settings(&self) -> LimiterSettings {
        LimiterSettings::builder()
            .capacity(self.bucket_capacity)
            .refill_tokens(self.bucket_capacity)
            .refill_interval(Duration::from_secs(self.refill_interval_secs))
            .idle_ttl(Duration::from_secs(self.idle_ttl_secs))
            .max_clients(self.max_clients)
            .build()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.auth_username.as_str(), self.auth_password.as_str())
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }
}
