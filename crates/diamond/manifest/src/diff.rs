//! Upgrade planning
//!
//! Diffs two manifest versions into facet cuts: selectors new in the next
//! version are added, selectors routed to a different facet are replaced,
//! selectors dropped from the next version are removed. Cuts are grouped by
//! action then by facet address, in first-appearance order.

use std::collections::HashMap;

use diamond_types::hex;
use diamond_types::{Address, Selector};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ManifestError, Result};
use crate::manifest::Manifest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetCutAction {
    Add,
    Replace,
    Remove,
}

impl FacetCutAction {
    /// Action code used by the dispatcher's cut entry point.
    pub fn code(&self) -> u8 {
        match self {
            FacetCutAction::Add => 0,
            FacetCutAction::Replace => 1,
            FacetCutAction::Remove => 2,
        }
    }
}

impl std::fmt::Display for FacetCutAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacetCutAction::Add => write!(f, "add"),
            FacetCutAction::Replace => write!(f, "replace"),
            FacetCutAction::Remove => write!(f, "remove"),
        }
    }
}

/// One cut: an action applied to a group of selectors on one facet.
///
/// Removals target the zero address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCut {
    #[serde(with = "hex::address")]
    pub facet_address: Address,
    pub action: FacetCutAction,
    pub selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradePlan {
    pub from_version: String,
    pub to_version: String,
    pub cuts: Vec<FacetCut>,
    pub unchanged: usize,
}

impl UpgradePlan {
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }

    pub fn count(&self, action: FacetCutAction) -> usize {
        self.cuts
            .iter()
            .filter(|cut| cut.action == action)
            .map(|cut| cut.selectors.len())
            .sum()
    }
}

/// Diff `previous` into `next`.
pub fn plan_upgrade(previous: &Manifest, next: &Manifest) -> Result<UpgradePlan> {
    if previous.version == next.version {
        return Err(ManifestError::VersionNotAdvanced {
            version: next.version.clone(),
        });
    }

    let before: HashMap<Selector, Address> = previous
        .routes
        .iter()
        .map(|r| (r.selector, r.facet))
        .collect();
    let after: HashMap<Selector, Address> =
        next.routes.iter().map(|r| (r.selector, r.facet)).collect();

    let mut cuts = CutGroups::default();
    let mut unchanged = 0;

    for route in &next.routes {
        match before.get(&route.selector) {
            None => cuts.push(FacetCutAction::Add, route.facet, route.selector),
            Some(facet) if *facet != route.facet => {
                cuts.push(FacetCutAction::Replace, route.facet, route.selector)
            }
            Some(_) => unchanged += 1,
        }
    }
    for route in &previous.routes {
        if !after.contains_key(&route.selector) {
            cuts.push(FacetCutAction::Remove, Address::ZERO, route.selector);
        }
    }

    let plan = UpgradePlan {
        from_version: previous.version.clone(),
        to_version: next.version.clone(),
        cuts: cuts.finish(),
        unchanged,
    };
    info!(
        from = %plan.from_version,
        to = %plan.to_version,
        add = plan.count(FacetCutAction::Add),
        replace = plan.count(FacetCutAction::Replace),
        remove = plan.count(FacetCutAction::Remove),
        unchanged,
        "Planned upgrade"
    );
    Ok(plan)
}

#[derive(Default)]
struct CutGroups {
    cuts: Vec<FacetCut>,
}

impl CutGroups {
    fn push(&mut self, action: FacetCutAction, facet: Address, selector: Selector) {
        match self
            .cuts
            .iter_mut()
            .find(|cut| cut.action == action && cut.facet_address == facet)
        {
            Some(cut) => cut.selectors.push(selector),
            None => self.cuts.push(FacetCut {
                facet_address: facet,
                action,
                selectors: vec![selector],
            }),
        }
    }

    fn finish(mut self) -> Vec<FacetCut> {
        // Stable: keeps first-appearance order within each action.
        self.cuts.sort_by_key(|cut| cut.action.code());
        self.cuts
    }
}
