use std::sync::Arc;

use diamond_manifest::Manifest;
use diamond_probe::{NetworkProbe, ResilientProbe};
use diamond_types::Address;
use tracing::{info, instrument};

use crate::checks;
use crate::config::GateConfig;
use crate::error::Result;
use crate::observe::{self, LiveState};
use crate::report::GateReport;

/// The routing compliance gate.
///
/// Phases:
/// 1. Verify the manifest's own integrity (structural, fails fast)
/// 2. Observe the live dispatcher: loupe once, facet code concurrently
/// 3. Run selector parity, codehash parity, size compliance and
///    Merkle/loupe agreement independently
/// 4. Aggregate into a [`GateReport`]
pub struct ComplianceGate {
    config: GateConfig,
}

impl ComplianceGate {
    pub fn new(config: GateConfig) -> Result<Self> {
        config.limits.validated()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Check a deployed dispatcher against `manifest`.
    #[instrument(skip(self, manifest, probe), fields(network = %probe.network(), version = %manifest.version))]
    pub async fn run(
        &self,
        manifest: &Manifest,
        diamond: Address,
        probe: Arc<dyn NetworkProbe>,
    ) -> Result<GateReport> {
        manifest.verify_integrity()?;

        let network = probe.network().to_string();
        let probe: Arc<dyn NetworkProbe> = Arc::new(ResilientProbe::new(probe, self.config.probe));
        let live = observe::observe(probe, manifest, diamond, &self.config).await;

        let report = self.report(manifest, &live, Some(network), Some(diamond));
        info!(
            run_id = %report.run_id,
            passed = report.passed(),
            exit_code = report.exit_code(),
            "Compliance gate complete"
        );
        Ok(report)
    }

    /// Evaluate a manifest with no live system. Only size compliance can
    /// pass; the live checks come back unknown.
    pub fn run_static(&self, manifest: &Manifest) -> Result<GateReport> {
        manifest.verify_integrity()?;
        let live = LiveState::unobserved(manifest);
        Ok(self.report(manifest, &live, None, None))
    }

    /// Evaluate an already observed live state.
    pub fn evaluate(&self, manifest: &Manifest, live: &LiveState) -> GateReport {
        self.report(manifest, live, None, None)
    }

    fn report(
        &self,
        manifest: &Manifest,
        live: &LiveState,
        network: Option<String>,
        diamond: Option<Address>,
    ) -> GateReport {
        let checks = checks::evaluate(manifest, live, &self.config);
        GateReport::new(
            network,
            diamond,
            manifest.version.clone(),
            manifest.merkle_root,
            self.config.strict,
            live.cancelled,
            checks,
        )
    }
}
