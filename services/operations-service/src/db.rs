use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_postgres::{types::ToSql, Client, Row};
use uuid::Uuid;

use crate::models::{
    CampaignAsset, CampaignAssetUpdate, Geography, Mounter, NewOperation, WorkloadEntry,
};
use crate::store::OperationsStore;

const SQL_OPERATION_EXISTS: &str = "SELECT 1 FROM operations WHERE campaign_id = $1 LIMIT 1";
const SQL_ACTIVE_MOUNTERS: &str = "SELECT id, name, zone, sub_zone, area, daily_capacity, is_active \
FROM mounters WHERE company_id = $1 AND is_active = TRUE ORDER BY created_at, id";
const SQL_CAMPAIGN_ASSETS: &str = "SELECT ca.id, ca.campaign_id, ca.asset_id, ca.installation_status, \
ca.assigned_mounter_id, ma.id IS NOT NULL AS has_media_asset, ma.zone, ma.sub_zone, ma.area \
FROM campaign_assets ca \
LEFT JOIN media_assets ma ON ma.id = ca.asset_id \
WHERE ca.campaign_id = $1 \
ORDER BY ca.created_at, ca.id";
const SQL_MOUNTER_WORKLOAD: &str =
    "SELECT mounter_id, count::bigint AS count FROM get_mounter_workload()";
const SQL_INSERT_OPERATIONS: &str = "INSERT INTO operations \
(company_id, campaign_id, campaign_asset_id, asset_id, mounter_id, assigned_by, assigned_at, deadline, status) \
SELECT * FROM UNNEST(\
$1::uuid[], $2::uuid[], $3::uuid[], $4::text[], $5::uuid[], $6::uuid[], \
$7::timestamptz[], $8::timestamptz[], $9::text[])";
const SQL_ASSIGN_AND_ADVANCE: &str = "UPDATE campaign_assets \
SET assigned_mounter_id = $2, installation_status = $3, updated_at = NOW() WHERE id = $1";
const SQL_ASSIGN_ONLY: &str =
    "UPDATE campaign_assets SET assigned_mounter_id = $2, updated_at = NOW() WHERE id = $1";

/// `OperationsStore` over a single shared PostgreSQL connection.
#[derive(Clone)]
pub struct PgStore {
    db: Arc<Mutex<Client>>,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self {
            db: Arc::new(Mutex::new(client)),
        }
    }
}

fn mounter_from_row(row: &Row) -> Mounter {
    Mounter {
        id: row.get("id"),
        name: row.get("name"),
        home: Geography {
            zone: row.get("zone"),
            sub_zone: row.get("sub_zone"),
            area: row.get("area"),
        },
        daily_capacity: row.get("daily_capacity"),
        is_active: row.get("is_active"),
    }
}

fn campaign_asset_from_row(row: &Row) -> CampaignAsset {
    CampaignAsset {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        asset_id: row.get("asset_id"),
        installation_status: row.get("installation_status"),
        assigned_mounter_id: row.get("assigned_mounter_id"),
        geography: media_geography(
            row.get("has_media_asset"),
            row.get("zone"),
            row.get("sub_zone"),
            row.get("area"),
        ),
    }
}

/// The LEFT JOIN yields null zone columns both for a missing media asset and
/// for a media asset without geography; only the former loses its geography.
fn media_geography(
    has_media_asset: bool,
    zone: Option<String>,
    sub_zone: Option<String>,
    area: Option<String>,
) -> Option<Geography> {
    has_media_asset.then_some(Geography {
        zone,
        sub_zone,
        area,
    })
}

/// Column-major view of an operation batch, one array per `UNNEST` argument.
struct OperationColumns<'a> {
    company_ids: Vec<Uuid>,
    campaign_ids: Vec<Uuid>,
    campaign_asset_ids: Vec<Uuid>,
    asset_ids: Vec<&'a str>,
    mounter_ids: Vec<Uuid>,
    assigned_by: Vec<Uuid>,
    assigned_at: Vec<DateTime<Utc>>,
    deadlines: Vec<Option<DateTime<Utc>>>,
    statuses: Vec<&'static str>,
}

impl<'a> OperationColumns<'a> {
    fn from_operations(operations: &'a [NewOperation]) -> Self {
        let mut columns = Self {
            company_ids: Vec::with_capacity(operations.len()),
            campaign_ids: Vec::with_capacity(operations.len()),
            campaign_asset_ids: Vec::with_capacity(operations.len()),
            asset_ids: Vec::with_capacity(operations.len()),
            mounter_ids: Vec::with_capacity(operations.len()),
            assigned_by: Vec::with_capacity(operations.len()),
            assigned_at: Vec::with_capacity(operations.len()),
            deadlines: Vec::with_capacity(operations.len()),
            statuses: Vec::with_capacity(operations.len()),
        };
        for op in operations {
            columns.company_ids.push(op.company_id);
            columns.campaign_ids.push(op.campaign_id);
            columns.campaign_asset_ids.push(op.campaign_asset_id);
            columns.asset_ids.push(op.asset_id.as_str());
            columns.mounter_ids.push(op.mounter_id);
            columns.assigned_by.push(op.assigned_by);
            columns.assigned_at.push(op.assigned_at);
            columns.deadlines.push(op.deadline);
            columns.statuses.push(op.status.as_str());
        }
        columns
    }

    fn params(&self) -> [&(dyn ToSql + Sync); 9] {
        [
            &self.company_ids,
            &self.campaign_ids,
            &self.campaign_asset_ids,
            &self.asset_ids,
            &self.mounter_ids,
            &self.assigned_by,
            &self.assigned_at,
            &self.deadlines,
            &self.statuses,
        ]
    }
}

#[async_trait]
impl OperationsStore for PgStore {
    async fn campaign_has_operations(&self, campaign_id: Uuid) -> Result<bool, String> {
        let db = self.db.lock().await;
        let row = db
            .query_opt(SQL_OPERATION_EXISTS, &[&campaign_id])
            .await
            .map_err(|err| format!("check existing operations failed: {err}"))?;
        Ok(row.is_some())
    }

    async fn active_mounters(&self, company_id: Uuid) -> Result<Vec<Mounter>, String> {
        let db = self.db.lock().await;
        let rows = db
            .query(SQL_ACTIVE_MOUNTERS, &[&company_id])
            .await
            .map_err(|err| format!("select mounters failed: {err}"))?;
        Ok(rows.iter().map(mounter_from_row).collect())
    }

    async fn campaign_assets(&self, campaign_id: Uuid) -> Result<Vec<CampaignAsset>, String> {
        let db = self.db.lock().await;
        let rows = db
            .query(SQL_CAMPAIGN_ASSETS, &[&campaign_id])
            .await
            .map_err(|err| format!("select campaign assets failed: {err}"))?;
        Ok(rows.iter().map(campaign_asset_from_row).collect())
    }

    async fn mounter_workload(&self) -> Result<Vec<WorkloadEntry>, String> {
        let db = self.db.lock().await;
        let rows = db
            .query(SQL_MOUNTER_WORKLOAD, &[])
            .await
            .map_err(|err| format!("get_mounter_workload failed: {err}"))?;
        Ok(rows
            .into_iter()
            .map(|row| WorkloadEntry {
                mounter_id: row.get("mounter_id"),
                count: row.get("count"),
            })
            .collect())
    }

    async fn insert_operations(&self, operations: &[NewOperation]) -> Result<u64, String> {
        if operations.is_empty() {
            return Ok(0);
        }

        let columns = OperationColumns::from_operations(operations);
        let db = self.db.lock().await;
        db.execute(SQL_INSERT_OPERATIONS, &columns.params())
            .await
            .map_err(|err| format!("insert operations failed: {err}"))
    }

    async fn update_campaign_asset(&self, update: &CampaignAssetUpdate) -> Result<(), String> {
        let db = self.db.lock().await;
        let updated = match update.installation_status {
            Some(status) => {
                db.execute(
                    SQL_ASSIGN_AND_ADVANCE,
                    &[&update.campaign_asset_id, &update.mounter_id, &status.as_str()],
                )
                .await
            }
            None => {
                db.execute(
                    SQL_ASSIGN_ONLY,
                    &[&update.campaign_asset_id, &update.mounter_id],
                )
                .await
            }
        }
        .map_err(|err| format!("update campaign asset failed: {err}"))?;

        if updated == 0 {
            return Err(format!(
                "campaign asset {} not found",
                update.campaign_asset_id
            ));
        }
        Ok(())
    }
}
