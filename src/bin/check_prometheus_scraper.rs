use std::time::Duration;

use check_prometheus_scraper::{Outcome, ProbeRequest, ScrapeHealth};
use clap::Parser;
use color_eyre::eyre::{Report, WrapErr};
use tracing_subscriber::EnvFilter;

/// Check how Prometheus scrapes a target: liveness, scrape duration and
/// sample count. Exits 0 (OK), 1 (WARNING) or 2 (CRITICAL).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML file with [prometheus] and [target] sections
    #[arg(short, long)]
    config: Option<String>,

    /// Prometheus instant-query endpoint [default: http://127.0.0.1:9090/api/v1/query]
    #[arg(long)]
    url: Option<String>,

    /// Instance label of the scrape target [default: default]
    #[arg(long)]
    instance: Option<String>,

    /// Extra label selector fragment, inserted verbatim
    #[arg(long)]
    tags: Option<String>,

    /// Scrape duration, in seconds, above which the check warns [default: 5]
    #[arg(long)]
    timeout_warning: Option<f64>,

    /// Scrape duration, in seconds, above which the check is critical [default: 30]
    #[arg(long)]
    timeout_critical: Option<f64>,

    /// Bound on each HTTP call, e.g. "10s". Unbounded when unset.
    #[arg(long, value_parser = parse_duration)]
    request_timeout: Option<Duration>,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    duration_str::parse(s).map_err(|e| e.to_string())
}

impl Args {
    /// Flags win over the config file, which wins over the defaults.
    fn into_request(self) -> Result<ProbeRequest, Report> {
        let mut req = ProbeRequest::default();
        if let Some(path) = &self.config {
            check_prometheus_scraper::parse_config(path)?.apply_to(&mut req)?;
        }
        if let Some(url) = self.url {
            req.url = url;
        }
        if let Some(instance) = self.instance {
            req.instance = instance;
        }
        if let Some(tags) = self.tags {
            req.tags = tags;
        }
        if let Some(warning) = self.timeout_warning {
            req.thresholds.warning = warning;
        }
        if let Some(critical) = self.timeout_critical {
            req.thresholds.critical = critical;
        }
        if self.request_timeout.is_some() {
            req.request_timeout = self.request_timeout;
        }
        Ok(req)
    }
}

fn run(args: Args) -> Result<Outcome, Report> {
    color_eyre::install()?;
    let req = args.into_request()?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("building tokio runtime")?;
    let health = ScrapeHealth::new(req)?;
    Ok(rt.block_on(health.check()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let outcome = run(args).unwrap_or_else(|e| Outcome::critical(format!("{e:#}")));
    println!("{}", outcome.message);
    std::process::exit(outcome.severity.exit_code());
}
