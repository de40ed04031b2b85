use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::InstallationStatus;

#[derive(Deserialize)]
pub struct AutoAssignRequest {
    pub campaign_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub assigned_by: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct PreviewRequest {
    pub campaign_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

/// Zone / sub-zone / area of a site or of a mounter's home base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geography {
    pub zone: Option<String>,
    pub sub_zone: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Mounter {
    pub id: Uuid,
    pub name: String,
    pub home: Geography,
    pub daily_capacity: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct CampaignAsset {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub asset_id: String,
    /// Raw status column; may hold values outside the known sequence.
    pub installation_status: Option<String>,
    pub assigned_mounter_id: Option<Uuid>,
    /// `None` when the linked media asset could not be resolved.
    pub geography: Option<Geography>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOperation {
    pub company_id: Uuid,
    pub campaign_id: Uuid,
    pub campaign_asset_id: Uuid,
    pub asset_id: String,
    pub mounter_id: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: InstallationStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignAssetUpdate {
    pub campaign_asset_id: Uuid,
    pub mounter_id: Uuid,
    /// Only set when the status has to move forward.
    pub installation_status: Option<InstallationStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadEntry {
    pub mounter_id: Uuid,
    pub count: i64,
}

#[derive(Serialize)]
pub struct SkippedResponse {
    pub message: &'static str,
    pub skipped: bool,
}

#[derive(Serialize)]
pub struct NoMountersResponse {
    pub success: bool,
    pub code: &'static str,
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct AssignedResponse {
    pub success: bool,
    pub message: String,
    pub assigned_count: usize,
    pub skipped_assets: Vec<Uuid>,
    pub failed_updates: usize,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum AutoAssignResponse {
    Skipped(SkippedResponse),
    NoActiveMounters(NoMountersResponse),
    Assigned(AssignedResponse),
}

#[derive(Serialize)]
pub struct PlannedAssignmentView {
    pub campaign_asset_id: Uuid,
    pub asset_id: String,
    pub mounter_id: Uuid,
    pub score: i64,
    pub status_change: bool,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub campaign_id: Uuid,
    pub already_assigned: bool,
    pub assignments: Vec<PlannedAssignmentView>,
    pub skipped_assets: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}
