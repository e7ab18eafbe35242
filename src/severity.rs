//! Plugin severities and the line/exit code a run ends with.

use std::fmt;

/// Three-level health classification. The ordering is "worse than".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    Ok = 0,
    Warning = 1,
    Critical = 2,
}

impl Severity {
    pub fn exit_code(self) -> i32 {
        self as i32
    }

    /// Prefix put in front of the final status line. OK carries none.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::Warning => "WARNING  - ",
            Self::Critical => "CRITICAL - ",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// What a run prints on stdout and exits with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub severity: Severity,
    pub message: String,
}

impl Outcome {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn critical(reason: impl fmt::Display) -> Self {
        Self::new(
            Severity::Critical,
            format!("{}{}", Severity::Critical.prefix(), reason),
        )
    }
}
