//! Express warning/critical bounds on the reported scrape duration.

use crate::Severity;

/// Upper bounds, in seconds, on `scrape_duration_seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: 5.0,
            critical: 30.0,
        }
    }
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    /// Comparisons are strict: a duration equal to a bound does not trip it.
    pub fn check(&self, duration: f64) -> Severity {
        if duration > self.critical {
            Severity::Critical
        } else if duration > self.warning {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    /// Nagios perfdata segment for a duration, `duration=<d>s;<warn>;<crit>;0;`.
    pub fn perfdata(&self, duration: f64) -> String {
        format!(
            "duration={:.6}s;{:.0};{:.0};0;",
            duration, self.warning, self.critical
        )
    }
}
