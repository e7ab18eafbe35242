//! A TOML config to specify the Prometheus endpoint and the scrape target.
//!
//! Format of config file:
//! ```rust
//! let cfg = r#"
//! [prometheus]
//! url = "http://127.0.0.1:9090/api/v1/query"
//! request_timeout = "10s"
//!
//! [target]
//! instance = "web1:9100"
//! tags = "job"
//! timeout_warning = 5.0
//! timeout_critical = 30.0
//! "#;
//! check_prometheus_scraper::parse_config_str(cfg).unwrap();
//! ```
//!
//! `tags` lands inside double quotes after the instance matcher, so the
//! liveness query for the file above is `up{instance="web1:9100","job"}`.
//!
//! Every key is optional; what is missing falls back to the defaults of
//! [`ProbeRequest`].

use std::path::Path;

use chrono::Duration;
use color_eyre::{
    eyre::{eyre, Context},
    Report,
};
use serde::Deserialize;

use crate::ProbeRequest;

pub fn parse_config(config_file: impl AsRef<Path>) -> Result<Config, Report> {
    let path = config_file.as_ref();
    let cfg = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    parse_config_str(&cfg)
}

pub fn parse_config_str(cfg: &str) -> Result<Config, Report> {
    toml::from_str::<Config>(cfg)
        .wrap_err("TOML file did not match deserialization struct, or was malformed")
}

// rust toml uses serde, so we define structs to deserialize into.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub prometheus: Prometheus,
    #[serde(default)]
    pub target: Target,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Prometheus {
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "duration_str::deserialize_option_duration_chrono"
    )]
    pub request_timeout: Option<Duration>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub instance: Option<String>,
    pub tags: Option<String>,
    pub timeout_warning: Option<f64>,
    pub timeout_critical: Option<f64>,
}

impl TryFrom<Config> for ProbeRequest {
    type Error = Report;
    fn try_from(value: Config) -> Result<Self, Self::Error> {
        let mut req = ProbeRequest::default();
        value.apply_to(&mut req)?;
        Ok(req)
    }
}

impl Config {
    /// Overwrites the fields of `req` that this file sets.
    pub fn apply_to(self, req: &mut ProbeRequest) -> Result<(), Report> {
        let Config { prometheus, target } = self;
        if let Some(url) = prometheus.url {
            req.url = url;
        }
        if let Some(timeout) = prometheus.request_timeout {
            req.request_timeout = Some(
                timeout
                    .to_std()
                    .map_err(|_| eyre!("request_timeout must not be negative"))?,
            );
        }
        if let Some(instance) = target.instance {
            req.instance = instance;
        }
        if let Some(tags) = target.tags {
            req.tags = tags;
        }
        if let Some(warning) = target.timeout_warning {
            req.thresholds.warning = warning;
        }
        if let Some(critical) = target.timeout_critical {
            req.thresholds.critical = critical;
        }
        Ok(())
    }
}
