//! The three fixed PromQL queries a probe run issues.

use std::time::Duration;

use crate::Thresholds;

pub const DEFAULT_URL: &str = "http://127.0.0.1:9090/api/v1/query";
pub const DEFAULT_INSTANCE: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Liveness,
    ScrapeDuration,
    SampleCount,
}

impl QueryKind {
    pub fn metric_name(self) -> &'static str {
        match self {
            Self::Liveness => "up",
            Self::ScrapeDuration => "scrape_duration_seconds",
            Self::SampleCount => "scrape_samples_scraped",
        }
    }
}

/// Everything one run needs to know about the target and the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    /// the Prometheus instant-query endpoint
    pub url: String,
    /// value of the `instance` label of the scrape target
    pub instance: String,
    /// extra selector fragment, pasted into the label set as-is
    pub tags: String,
    pub thresholds: Thresholds,
    /// bound on each HTTP call; `None` waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for ProbeRequest {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            instance: DEFAULT_INSTANCE.to_string(),
            tags: String::new(),
            thresholds: Thresholds::default(),
            request_timeout: None,
        }
    }
}

impl ProbeRequest {
    /// Value of the `query` parameter for `kind`.
    ///
    /// The tag fragment is not escaped: a malformed fragment yields a malformed
    /// query, which the backend then rejects.
    pub fn query(&self, kind: QueryKind) -> String {
        let metric = kind.metric_name();
        if self.tags.is_empty() {
            format!(r#"{metric}{{instance="{}"}}"#, self.instance)
        } else {
            format!(r#"{metric}{{instance="{}","{}"}}"#, self.instance, self.tags)
        }
    }
}
