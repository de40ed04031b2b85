use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{CampaignAsset, CampaignAssetUpdate, Mounter, NewOperation, WorkloadEntry};

/// Row store the assignment routine reads from and writes to. Errors are
/// human-readable messages prefixed with the failing step.
#[async_trait]
pub trait OperationsStore: Send + Sync {
    async fn campaign_has_operations(&self, campaign_id: Uuid) -> Result<bool, String>;

    async fn active_mounters(&self, company_id: Uuid) -> Result<Vec<Mounter>, String>;

    /// Campaign assets joined with their media asset's geography, in a
    /// stable order.
    async fn campaign_assets(&self, campaign_id: Uuid) -> Result<Vec<CampaignAsset>, String>;

    async fn mounter_workload(&self) -> Result<Vec<WorkloadEntry>, String>;

    /// Writes all operations in one statement; returns the number inserted.
    async fn insert_operations(&self, operations: &[NewOperation]) -> Result<u64, String>;

    async fn update_campaign_asset(&self, update: &CampaignAssetUpdate) -> Result<(), String>;
}
