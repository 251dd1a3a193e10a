//! Gate report

use chrono::{DateTime, Utc};
use diamond_types::{hex, Address, CheckResult, CheckStatus, ValidationReport, B256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Violation;

/// The four independent compliance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GateKind {
    SelectorParity,
    CodehashParity,
    SizeCompliance,
    MerkleLoupe,
}

impl GateKind {
    pub const ALL: [GateKind; 4] = [
        GateKind::SelectorParity,
        GateKind::CodehashParity,
        GateKind::SizeCompliance,
        GateKind::MerkleLoupe,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GateKind::SelectorParity => "selector-parity",
            GateKind::CodehashParity => "codehash-parity",
            GateKind::SizeCompliance => "size-compliance",
            GateKind::MerkleLoupe => "merkle-loupe",
        }
    }

    /// Process exit code when this gate fails.
    pub fn exit_code(&self) -> i32 {
        match self {
            GateKind::SelectorParity => 10,
            GateKind::CodehashParity => 11,
            GateKind::SizeCompliance => 12,
            GateKind::MerkleLoupe => 13,
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateCheck {
    pub gate: GateKind,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Why parts of the check could not be evaluated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknowns: Vec<String>,
}

impl GateCheck {
    /// Derive the status: any violation fails, then anything unknown, then
    /// any warning.
    pub fn new(
        gate: GateKind,
        violations: Vec<Violation>,
        warnings: Vec<String>,
        unknowns: Vec<String>,
    ) -> Self {
        let status = if !violations.is_empty() {
            CheckStatus::Fail
        } else if !unknowns.is_empty() {
            CheckStatus::Unknown
        } else if !warnings.is_empty() {
            CheckStatus::Warn
        } else {
            CheckStatus::Pass
        };
        Self {
            gate,
            status,
            violations,
            warnings,
            unknowns,
        }
    }

    pub fn to_check_result(&self) -> CheckResult {
        let details = self
            .violations
            .iter()
            .map(ToString::to_string)
            .chain(self.unknowns.iter().cloned())
            .chain(self.warnings.iter().map(|w| format!("warning: {w}")));
        CheckResult::new(self.gate.name(), self.status).with_details(details)
    }
}

/// Full compliance report for one dispatcher on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diamond: Option<String>,
    pub manifest_version: String,
    #[serde(with = "hex::hash")]
    pub merkle_root: B256,
    pub strict: bool,
    /// Strict mode stopped observation early
    pub cancelled: bool,
    pub checks: Vec<GateCheck>,
}

impl GateReport {
    pub(crate) fn new(
        network: Option<String>,
        diamond: Option<Address>,
        manifest_version: String,
        merkle_root: B256,
        strict: bool,
        cancelled: bool,
        checks: Vec<GateCheck>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            network,
            diamond: diamond.map(|d| hex::encode_address(&d)),
            manifest_version,
            merkle_root,
            strict,
            cancelled,
            checks,
        }
    }

    pub fn check(&self, gate: GateKind) -> Option<&GateCheck> {
        self.checks.iter().find(|check| check.gate == gate)
    }

    /// Whether a check counts as failed; unknowns fail only in strict mode.
    fn failed(&self, check: &GateCheck) -> bool {
        match check.status {
            CheckStatus::Fail => true,
            CheckStatus::Unknown => self.strict,
            CheckStatus::Pass | CheckStatus::Warn => false,
        }
    }

    pub fn failed_gates(&self) -> Vec<GateKind> {
        let mut gates: Vec<GateKind> = self
            .checks
            .iter()
            .filter(|check| self.failed(check))
            .map(|check| check.gate)
            .collect();
        gates.sort();
        gates
    }

    pub fn passed(&self) -> bool {
        self.failed_gates().is_empty()
    }

    /// Lowest failing gate's exit code, or 0.
    pub fn exit_code(&self) -> i32 {
        self.failed_gates()
            .first()
            .map(GateKind::exit_code)
            .unwrap_or(0)
    }

    pub fn validation(&self) -> ValidationReport {
        let checks = self.checks.iter().map(GateCheck::to_check_result).collect();
        ValidationReport::from_checks(checks, self.strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diamond_types::Selector;

    fn report(strict: bool, checks: Vec<GateCheck>) -> GateReport {
        GateReport::new(None, None, "1.0.0".into(), B256::ZERO, strict, false, checks)
    }

    #[test]
    fn test_status_precedence() {
        let check = GateCheck::new(
            GateKind::SizeCompliance,
            vec![],
            vec!["close".into()],
            vec![],
        );
        assert_eq!(check.status, CheckStatus::Warn);

        let check = GateCheck::new(GateKind::MerkleLoupe, vec![], vec![], vec!["loupe down".into()]);
        assert_eq!(check.status, CheckStatus::Unknown);

        let check = GateCheck::new(
            GateKind::SelectorParity,
            vec![Violation::MissingOnChain {
                selector: Selector::new([0xaa; 4]),
                facet: "A".into(),
            }],
            vec![],
            vec!["partial".into()],
        );
        assert_eq!(check.status, CheckStatus::Fail);
    }

    #[test]
    fn test_lowest_exit_code_wins() {
        let failing = |gate| {
            GateCheck::new(
                gate,
                vec![Violation::MissingDeclaredCodehash { facet: "A".into() }],
                vec![],
                vec![],
            )
        };
        let report = report(
            false,
            vec![
                GateCheck::new(GateKind::SelectorParity, vec![], vec![], vec![]),
                failing(GateKind::MerkleLoupe),
                failing(GateKind::CodehashParity),
            ],
        );
        assert!(!report.passed());
        assert_eq!(report.failed_gates(), vec![GateKind::CodehashParity, GateKind::MerkleLoupe]);
        assert_eq!(report.exit_code(), 11);
    }

    #[test]
    fn test_unknown_fails_only_when_strict() {
        let unknown = || {
            vec![GateCheck::new(
                GateKind::SelectorParity,
                vec![],
                vec![],
                vec!["loupe unavailable".into()],
            )]
        };
        assert_eq!(report(false, unknown()).exit_code(), 0);
        assert_eq!(report(true, unknown()).exit_code(), 10);
        assert!(!report(true, unknown()).validation().passed);
    }

    #[test]
    fn test_check_result_details() {
        let check = GateCheck::new(
            GateKind::SizeCompliance,
            vec![Violation::SizeLimitExceeded {
                facet: "Big".into(),
                size: 24_577,
                limit: 24_576,
            }],
            vec!["Small is 18001 bytes".into()],
            vec![],
        );
        let result = check.to_check_result();
        assert_eq!(result.gate_name, "size-compliance");
        assert_eq!(result.details[0], "SizeLimitExceeded(24577, 24576): facet Big");
        assert_eq!(result.details[1], "warning: Small is 18001 bytes");
    }
}
