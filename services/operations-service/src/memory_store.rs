//! In-process `OperationsStore` for tests, with call recording and
//! injectable failures.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    CampaignAsset, CampaignAssetUpdate, Geography, Mounter, NewOperation, WorkloadEntry,
};
use crate::scoring::{GeographicScorer, ScoringConfig};
use crate::state::AppState;
use crate::store::OperationsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    CampaignHasOperations,
    ActiveMounters,
    CampaignAssets,
    MounterWorkload,
    InsertOperations,
    UpdateCampaignAsset,
}

#[derive(Default)]
struct Tables {
    mounters: Vec<(Uuid, Mounter)>,
    campaign_assets: Vec<CampaignAsset>,
    operations: Vec<NewOperation>,
    open_tasks: HashMap<Uuid, i64>,
    failing_calls: HashSet<StoreCall>,
    failing_updates: HashSet<Uuid>,
    reported_inserts: Option<u64>,
    calls: Vec<StoreCall>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            store: Arc::new(self.clone()),
            scorer: Arc::new(GeographicScorer::new(ScoringConfig::default())),
        }
    }

    pub fn add_mounter(&self, company_id: Uuid, zone: Option<&str>, capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.tables().mounters.push((
            company_id,
            Mounter {
                id,
                name: format!("mounter-{id}"),
                home: Geography {
                    zone: zone.map(str::to_string),
                    sub_zone: None,
                    area: None,
                },
                daily_capacity: capacity,
                is_active: true,
            },
        ));
        id
    }

    pub fn deactivate_mounter(&self, mounter_id: Uuid) {
        for (_, mounter) in self.tables().mounters.iter_mut() {
            if mounter.id == mounter_id {
                mounter.is_active = false;
            }
        }
    }

    /// A `None` zone stands for a campaign asset whose media asset is gone.
    pub fn add_campaign_asset(&self, campaign_id: Uuid, zone: Option<&str>, status: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables().campaign_assets.push(CampaignAsset {
            id,
            campaign_id,
            asset_id: format!("SITE-{}", &id.simple().to_string()[..8]),
            installation_status: Some(status.to_string()),
            assigned_mounter_id: None,
            geography: zone.map(|zone| Geography {
                zone: Some(zone.to_string()),
                sub_zone: None,
                area: None,
            }),
        });
        id
    }

    pub fn set_workload(&self, mounter_id: Uuid, open_tasks: i64) {
        self.tables().open_tasks.insert(mounter_id, open_tasks);
    }

    pub fn fail_call(&self, call: StoreCall) {
        self.tables().failing_calls.insert(call);
    }

    pub fn fail_update_for(&self, campaign_asset_id: Uuid) {
        self.tables().failing_updates.insert(campaign_asset_id);
    }

    /// Makes `insert_operations` report `rows` instead of the batch size.
    pub fn report_inserted_rows(&self, rows: u64) {
        self.tables().reported_inserts = Some(rows);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.tables().calls.clone()
    }

    pub fn operations(&self) -> Vec<NewOperation> {
        self.tables().operations.clone()
    }

    pub fn operation_mounter(&self, campaign_asset_id: Uuid) -> Option<Uuid> {
        self.tables()
            .operations
            .iter()
            .find(|op| op.campaign_asset_id == campaign_asset_id)
            .map(|op| op.mounter_id)
    }

    pub fn asset_status(&self, campaign_asset_id: Uuid) -> Option<String> {
        self.find_asset(campaign_asset_id)
            .and_then(|asset| asset.installation_status)
    }

    pub fn asset_mounter(&self, campaign_asset_id: Uuid) -> Option<Uuid> {
        self.find_asset(campaign_asset_id)
            .and_then(|asset| asset.assigned_mounter_id)
    }

    fn find_asset(&self, campaign_asset_id: Uuid) -> Option<CampaignAsset> {
        self.tables()
            .campaign_assets
            .iter()
            .find(|asset| asset.id == campaign_asset_id)
            .cloned()
    }

    fn record(&self, call: StoreCall) -> Result<MutexGuard<'_, Tables>, String> {
        let mut tables = self.tables();
        tables.calls.push(call);
        if tables.failing_calls.contains(&call) {
            return Err(format!("{} failed: injected failure", call_label(call)));
        }
        Ok(tables)
    }
}

fn call_label(call: StoreCall) -> &'static str {
    match call {
        StoreCall::CampaignHasOperations => "check existing operations",
        StoreCall::ActiveMounters => "select mounters",
        StoreCall::CampaignAssets => "select campaign assets",
        StoreCall::MounterWorkload => "get_mounter_workload",
        StoreCall::InsertOperations => "insert operations",
        StoreCall::UpdateCampaignAsset => "update campaign asset",
    }
}

#[async_trait]
impl OperationsStore for MemoryStore {
    async fn campaign_has_operations(&self, campaign_id: Uuid) -> Result<bool, String> {
        let tables = self.record(StoreCall::CampaignHasOperations)?;
        Ok(tables
            .operations
            .iter()
            .any(|op| op.campaign_id == campaign_id))
    }

    async fn active_mounters(&self, company_id: Uuid) -> Result<Vec<Mounter>, String> {
        let tables = self.record(StoreCall::ActiveMounters)?;
        Ok(tables
            .mounters
            .iter()
            .filter(|(company, mounter)| *company == company_id && mounter.is_active)
            .map(|(_, mounter)| mounter.clone())
            .collect())
    }

    async fn campaign_assets(&self, campaign_id: Uuid) -> Result<Vec<CampaignAsset>, String> {
        let tables = self.record(StoreCall::CampaignAssets)?;
        Ok(tables
            .campaign_assets
            .iter()
            .filter(|asset| asset.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn mounter_workload(&self) -> Result<Vec<WorkloadEntry>, String> {
        let tables = self.record(StoreCall::MounterWorkload)?;
        let mut counts = tables.open_tasks.clone();
        for op in &tables.operations {
            *counts.entry(op.mounter_id).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(mounter_id, count)| WorkloadEntry { mounter_id, count })
            .collect())
    }

    async fn insert_operations(&self, operations: &[NewOperation]) -> Result<u64, String> {
        let mut tables = self.record(StoreCall::InsertOperations)?;
        tables.operations.extend_from_slice(operations);
        Ok(tables
            .reported_inserts
            .unwrap_or(operations.len() as u64))
    }

    async fn update_campaign_asset(&self, update: &CampaignAssetUpdate) -> Result<(), String> {
        let mut tables = self.record(StoreCall::UpdateCampaignAsset)?;
        if tables.failing_updates.contains(&update.campaign_asset_id) {
            return Err("update campaign asset failed: injected failure".to_string());
        }
        let asset = tables
            .campaign_assets
            .iter_mut()
            .find(|asset| asset.id == update.campaign_asset_id)
            .ok_or_else(|| format!("campaign asset {} not found", update.campaign_asset_id))?;
        asset.assigned_mounter_id = Some(update.mounter_id);
        if let Some(status) = update.installation_status {
            asset.installation_status = Some(status.as_str().to_string());
        }
        Ok(())
    }
}
