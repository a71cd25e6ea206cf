use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};

use crate::services::gate::DEFAULT_THRESHOLD;
use crate::submission::desk::DEFAULT_IDLE_TTL;

pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    pub public_origin: String,
    pub summary_threshold: usize,
    pub ollama_url: String,
    pub summary_model: String,
    pub summarizer_timeout: Option<Duration>,
    pub client_idle_ttl: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port = try_load("PORT", "8080")?;
        let public_origin = match env::var("PUBLIC_ORIGIN") {
            Ok(origin) if !origin.trim().is_empty() => origin.trim().to_string(),
            _ => lan_origin(port),
        };

        let summary_threshold: usize = try_load("SUMMARY_THRESHOLD", &DEFAULT_THRESHOLD.to_string())?;
        if summary_threshold == 0 {
            return Err(anyhow!("SUMMARY_THRESHOLD must be greater than zero"));
        }

        let summarizer_timeout = match env::var("SUMMARIZER_TIMEOUT_SECS") {
            Ok(secs) => {
                let secs: u64 = secs
                    .trim()
                    .parse()
                    .context("SUMMARIZER_TIMEOUT_SECS must be a whole number of seconds")?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let idle_secs: u64 = try_load("CLIENT_IDLE_SECS", &DEFAULT_IDLE_TTL.as_secs().to_string())?;

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "127.0.0.1")?,
            port,
            public_origin,
            summary_threshold,
            ollama_url: try_load("OLLAMA_URL", "http://127.0.0.1:11434")?,
            summary_model: try_load("SUMMARY_MODEL", "gemma3")?,
            summarizer_timeout,
            client_idle_ttl: Duration::from_secs(idle_secs),
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value '{raw}': {e}"))
}

/// Phones scanning the code need an address on the local network, not localhost.
fn lan_origin(port: u16) -> String {
    match local_ip_address::local_ip() {
        Ok(ip) => format!("http://{}:{}", ip, port),
        Err(e) => {
            warn!("Could not detect LAN address ({e}), QR links will point at 127.0.0.1");
            format!("http://127.0.0.1:{}", port)
        }
    }
}
