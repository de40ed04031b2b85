use axum::http::StatusCode;
use chrono::Utc;
use uuid::Uuid;

use crate::assignment::{plan_assignments, AssignmentPlan, WorkloadTally};
use crate::models::{
    AssignedResponse, AutoAssignRequest, AutoAssignResponse, CampaignAsset, CampaignAssetUpdate,
    ErrorResponse, Mounter, NewOperation, NoMountersResponse, PlannedAssignmentView,
    PreviewRequest, PreviewResponse, SkippedResponse,
};
use crate::state::AppState;
use crate::status::InstallationStatus;

pub const NO_ACTIVE_MOUNTERS: &str = "NO_ACTIVE_MOUNTERS";
const ALREADY_ASSIGNED_MESSAGE: &str = "Operations already assigned for this campaign";

pub struct ServiceError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ServiceError {
    pub fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status,
            body: ErrorResponse {
                code,
                error: message,
            },
        }
    }

    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message.into())
    }

    fn store(err: String) -> Self {
        tracing::error!(error = %err, "store request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err)
    }
}

/// Everything a run needs once the preconditions hold.
struct LoadedCampaign {
    mounters: Vec<Mounter>,
    assets: Vec<CampaignAsset>,
    tally: WorkloadTally,
}

enum Loaded {
    NoActiveMounters,
    Ready(LoadedCampaign),
}

fn required(value: Option<Uuid>, field: &'static str) -> Result<Uuid, ServiceError> {
    value.ok_or_else(|| ServiceError::bad_request("missing_field", format!("{field} is required")))
}

fn no_mounters_response() -> NoMountersResponse {
    NoMountersResponse {
        success: false,
        code: NO_ACTIVE_MOUNTERS,
        error: "No active mounters found for this company".to_string(),
        message: "Add at least one active mounter before assigning operations".to_string(),
    }
}

async fn load_campaign(
    state: &AppState,
    campaign_id: Uuid,
    company_id: Uuid,
) -> Result<Loaded, ServiceError> {
    let mounters: Vec<Mounter> = state
        .store
        .active_mounters(company_id)
        .await
        .map_err(ServiceError::store)?
        .into_iter()
        .filter(|mounter| mounter.is_active)
        .collect();
    if mounters.is_empty() {
        tracing::warn!(company_id = %company_id, "no active mounters");
        return Ok(Loaded::NoActiveMounters);
    }

    let assets = state
        .store
        .campaign_assets(campaign_id)
        .await
        .map_err(ServiceError::store)?;
    if assets.is_empty() {
        return Err(ServiceError::bad_request(
            "no_campaign_assets",
            "No campaign assets found",
        ));
    }

    let workload = state
        .store
        .mounter_workload()
        .await
        .map_err(ServiceError::store)?;

    Ok(Loaded::Ready(LoadedCampaign {
        mounters,
        assets,
        tally: WorkloadTally::from_entries(&workload),
    }))
}

fn plan_for(state: &AppState, loaded: &mut LoadedCampaign) -> AssignmentPlan {
    plan_assignments(
        state.scorer.as_ref(),
        &loaded.mounters,
        &loaded.assets,
        &mut loaded.tally,
    )
}

pub async fn auto_assign_operations(
    state: &AppState,
    payload: AutoAssignRequest,
) -> Result<AutoAssignResponse, ServiceError> {
    let campaign_id = required(payload.campaign_id, "campaign_id")?;
    let company_id = required(payload.company_id, "company_id")?;
    let assigned_by = required(payload.assigned_by, "assigned_by")?;

    let already_assigned = state
        .store
        .campaign_has_operations(campaign_id)
        .await
        .map_err(ServiceError::store)?;
    if already_assigned {
        tracing::info!(campaign_id = %campaign_id, "operations already assigned, skipping");
        return Ok(AutoAssignResponse::Skipped(SkippedResponse {
            message: ALREADY_ASSIGNED_MESSAGE,
            skipped: true,
        }));
    }

    let mut loaded = match load_campaign(state, campaign_id, company_id).await? {
        Loaded::NoActiveMounters => {
            return Ok(AutoAssignResponse::NoActiveMounters(no_mounters_response()))
        }
        Loaded::Ready(loaded) => loaded,
    };
    let plan = plan_for(state, &mut loaded);

    let assigned_at = Utc::now();
    let operations: Vec<NewOperation> = plan
        .assignments
        .iter()
        .map(|assignment| NewOperation {
            company_id,
            campaign_id,
            campaign_asset_id: assignment.campaign_asset_id,
            asset_id: assignment.asset_id.clone(),
            mounter_id: assignment.mounter_id,
            assigned_by,
            assigned_at,
            deadline: None,
            status: InstallationStatus::Assigned,
        })
        .collect();

    let inserted = if operations.is_empty() {
        0
    } else {
        state
            .store
            .insert_operations(&operations)
            .await
            .map_err(ServiceError::store)?
    };
    let assigned_count = usize::try_from(inserted).unwrap_or(usize::MAX);
    if assigned_count != operations.len() {
        tracing::warn!(
            campaign_id = %campaign_id,
            planned = operations.len(),
            inserted,
            "operation insert count differs from plan"
        );
    }

    // Best effort: one bad row must not block the rest.
    let mut failed_updates = 0;
    for assignment in &plan.assignments {
        let update = CampaignAssetUpdate {
            campaign_asset_id: assignment.campaign_asset_id,
            mounter_id: assignment.mounter_id,
            installation_status: assignment.status_update,
        };
        if let Err(err) = state.store.update_campaign_asset(&update).await {
            failed_updates += 1;
            tracing::error!(
                error = %err,
                campaign_asset_id = %assignment.campaign_asset_id,
                "campaign asset update failed"
            );
        }
    }

    tracing::info!(
        campaign_id = %campaign_id,
        assigned = assigned_count,
        skipped = plan.skipped_assets.len(),
        failed_updates,
        "auto-assignment finished"
    );

    Ok(AutoAssignResponse::Assigned(AssignedResponse {
        success: true,
        message: format!("Successfully assigned {assigned_count} operations"),
        assigned_count,
        skipped_assets: plan.skipped_assets,
        failed_updates,
    }))
}

pub enum PreviewOutcome {
    Plan(PreviewResponse),
    NoActiveMounters(NoMountersResponse),
}

/// Same loading and scoring as a real run, without writes.
pub async fn preview_assignment(
    state: &AppState,
    payload: PreviewRequest,
) -> Result<PreviewOutcome, ServiceError> {
    let campaign_id = required(payload.campaign_id, "campaign_id")?;
    let company_id = required(payload.company_id, "company_id")?;

    let already_assigned = state
        .store
        .campaign_has_operations(campaign_id)
        .await
        .map_err(ServiceError::store)?;

    let mut loaded = match load_campaign(state, campaign_id, company_id).await? {
        Loaded::NoActiveMounters => {
            return Ok(PreviewOutcome::NoActiveMounters(no_mounters_response()))
        }
        Loaded::Ready(loaded) => loaded,
    };
    let plan = plan_for(state, &mut loaded);

    Ok(PreviewOutcome::Plan(PreviewResponse {
        campaign_id,
        already_assigned,
        assignments: plan
            .assignments
            .into_iter()
            .map(|assignment| PlannedAssignmentView {
                campaign_asset_id: assignment.campaign_asset_id,
                asset_id: assignment.asset_id,
                mounter_id: assignment.mounter_id,
                score: assignment.score,
                status_change: assignment.status_update.is_some(),
            })
            .collect(),
        skipped_assets: plan.skipped_assets,
    }))
}
