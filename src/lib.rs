//! Nagios-style check of how Prometheus scrapes one target: is it up, how long
//! did the last scrape take, and how many samples did it return.

pub mod api;
mod bound;
pub mod config_file;
mod evaluator;
pub mod probe;
mod query;
mod severity;

pub use bound::Thresholds;
pub use config_file::{parse_config, parse_config_str, Config};
pub use evaluator::ScrapeHealth;
pub use probe::{ProbeError, ScrapeProbe};
pub use query::{ProbeRequest, QueryKind, DEFAULT_INSTANCE, DEFAULT_URL};
pub use severity::{Outcome, Severity};
