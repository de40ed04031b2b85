use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{CampaignAsset, Geography, Mounter, WorkloadEntry};
use crate::scoring::AffinityScorer;
use crate::status::{forward_status_on_assign, InstallationStatus};

/// Open tasks per mounter for the duration of one run. Loaded once from the
/// store, then bumped in memory as the run hands out work.
#[derive(Debug, Default, Clone)]
pub struct WorkloadTally {
    open_tasks: HashMap<Uuid, i64>,
}

impl WorkloadTally {
    pub fn from_entries(entries: &[WorkloadEntry]) -> Self {
        let mut open_tasks = HashMap::new();
        for entry in entries {
            *open_tasks.entry(entry.mounter_id).or_insert(0) += entry.count.max(0);
        }
        Self { open_tasks }
    }

    pub fn open_tasks(&self, mounter_id: Uuid) -> i64 {
        self.open_tasks.get(&mounter_id).copied().unwrap_or(0)
    }

    pub fn record_assignment(&mut self, mounter_id: Uuid) {
        *self.open_tasks.entry(mounter_id).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAssignment {
    pub campaign_asset_id: Uuid,
    pub asset_id: String,
    pub mounter_id: Uuid,
    pub score: i64,
    /// `Some` only when the asset's status has to move forward.
    pub status_update: Option<InstallationStatus>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AssignmentPlan {
    pub assignments: Vec<PlannedAssignment>,
    pub skipped_assets: Vec<Uuid>,
}

/// Picks a mounter for every asset, in asset order. Assets without a resolved
/// media asset, or with no active mounter to choose from, are skipped.
pub fn plan_assignments(
    scorer: &dyn AffinityScorer,
    mounters: &[Mounter],
    assets: &[CampaignAsset],
    tally: &mut WorkloadTally,
) -> AssignmentPlan {
    let mut plan = AssignmentPlan::default();

    for asset in assets {
        let Some(geography) = asset.geography.as_ref() else {
            tracing::warn!(
                campaign_id = %asset.campaign_id,
                campaign_asset_id = %asset.id,
                asset_id = asset.asset_id.as_str(),
                "media asset not found, skipping"
            );
            plan.skipped_assets.push(asset.id);
            continue;
        };

        let Some((mounter, score)) = best_mounter(scorer, mounters, geography, tally) else {
            tracing::warn!(
                campaign_id = %asset.campaign_id,
                campaign_asset_id = %asset.id,
                asset_id = asset.asset_id.as_str(),
                "no suitable mounter, skipping"
            );
            plan.skipped_assets.push(asset.id);
            continue;
        };

        tally.record_assignment(mounter.id);
        tracing::debug!(
            campaign_id = %asset.campaign_id,
            campaign_asset_id = %asset.id,
            mounter_id = %mounter.id,
            mounter = mounter.name.as_str(),
            previous_mounter = ?asset.assigned_mounter_id,
            score,
            open_tasks = tally.open_tasks(mounter.id),
            "mounter selected"
        );

        plan.assignments.push(PlannedAssignment {
            campaign_asset_id: asset.id,
            asset_id: asset.asset_id.clone(),
            mounter_id: mounter.id,
            score,
            status_update: forward_status_on_assign(asset.installation_status.as_deref()),
        });
    }

    plan
}

// Strictly greater keeps the first mounter on ties.
fn best_mounter<'a>(
    scorer: &dyn AffinityScorer,
    mounters: &'a [Mounter],
    site: &Geography,
    tally: &WorkloadTally,
) -> Option<(&'a Mounter, i64)> {
    let mut best: Option<(&Mounter, i64)> = None;
    for mounter in mounters.iter().filter(|mounter| mounter.is_active) {
        let score = scorer.compute_affinity_score(mounter, site, tally.open_tasks(mounter.id));
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((mounter, score)),
        }
    }
    best
}
