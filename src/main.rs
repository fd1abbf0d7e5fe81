//! application entry point

use anyhow::Context;
use lasku::server;
use lasku::server::engine::currency::{CurrencyFormat, DEFAULT_CURRENCY_SYMBOL};
use lasku::server::model::config::{ServerConfig, DEFAULT_HANDOFF_TTL, DEFAULT_RENDER_TIMEOUT};
use lasku::server::validation::ValidationRules;
use log::{error, info, warn};
use std::env;
use std::net::SocketAddrV4;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use derive_more::Display;

const HOST_PARSING_FAILED_MSG: &str = "failed to parse HOST, aborting";
const DEFAULT_HOST_ADDR: &str = "127.0.0.1:8080";

#[actix_web::main()]
async fn main() -> std::io::Result<()> {
    // bootstrap
    // a. env
    let env = env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Env::Dev); // default dev env if absent

    let dotenv = match env {
        Env::Prod | Env::Stg => Ok(()), // load in CI
        Env::Dev => dotenvy::from_path(Path::new(".env.dev")),
    };

    // b. logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    if let Err(e) = dotenv {
        warn!("no envs loaded from .env.dev, using defaults, {}", e);
    }

    // c. run app
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration, {:#}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    info!("App is starting in env={}", env);
    info!(
        "required invoice fields: {:?}",
        config.rules.required_fields().iter().map(|f| f.path()).collect::<Vec<_>>()
    );

    server::run(config).await
}

fn load_config() -> anyhow::Result<ServerConfig> {
    let addr = SocketAddrV4::from_str(
        env::var("HOST")
            .unwrap_or(DEFAULT_HOST_ADDR.to_string())
            .as_str(),
    )
    .context(HOST_PARSING_FAILED_MSG)?;

    let rules = match env::var("REQUIRED_FIELDS") {
        Ok(list) => ValidationRules::from_required_list(&list).context("failed to parse REQUIRED_FIELDS")?,
        Err(_) => ValidationRules::default(),
    };
    let currency = CurrencyFormat::with_symbol(
        env::var("CURRENCY_SYMBOL").unwrap_or(DEFAULT_CURRENCY_SYMBOL.to_string()),
    );

    Ok(ServerConfig::new(addr)
        .with_rules(rules)
        .with_currency(currency)
        .with_handoff_ttl(seconds_from_env("HANDOFF_TTL_SECONDS", DEFAULT_HANDOFF_TTL)?)
        .with_render_timeout(seconds_from_env("RENDER_TIMEOUT_SECONDS", DEFAULT_RENDER_TIMEOUT)?))
}

fn seconds_from_env(key: &str, default: Duration) -> anyhow::Result<Duration> {
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .with_context(|| format!("failed to parse {key}={v}")),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Display)]
#[non_exhaustive]
enum Env {
    Dev,
    Stg,
    Prod,
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "stg" => Ok(Self::Stg),
            "prod" => Ok(Self::Prod),
            s => Err(format!("Invalid Env: {s}")),
        }
    }
}
