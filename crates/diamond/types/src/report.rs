//! Validation report vocabulary shared by the cross-chain validator and the
//! compliance gate. Reports are snapshots and are never persisted as state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    /// Passed, with something worth attention
    Warn,
    Fail,
    /// Could not be evaluated (unreachable endpoint, cancelled)
    Unknown,
}

impl CheckStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Pass => write!(f, "pass"),
            CheckStatus::Warn => write!(f, "warn"),
            CheckStatus::Fail => write!(f, "fail"),
            CheckStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub gate_name: String,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckResult {
    pub fn new(gate_name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            gate_name: gate_name.into(),
            status,
            details: Vec::new(),
        }
    }

    pub fn pass(gate_name: impl Into<String>) -> Self {
        Self::new(gate_name, CheckStatus::Pass)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn with_details(mut self, details: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(details);
        self
    }
}

/// Aggregated checks with an overall verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckResult>,
    pub passed: bool,
}

impl ValidationReport {
    /// A report passes when no check failed; `Unknown` fails only when
    /// `unknown_fails` is set.
    pub fn from_checks(checks: Vec<CheckResult>, unknown_fails: bool) -> Self {
        let passed = checks.iter().all(|check| match check.status {
            CheckStatus::Fail => false,
            CheckStatus::Unknown => !unknown_fails,
            CheckStatus::Pass | CheckStatus::Warn => true,
        });
        Self { checks, passed }
    }

    pub fn check(&self, gate_name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.gate_name == gate_name)
    }
}
