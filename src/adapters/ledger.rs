use crate::adapters::backend::{eq, param, BackendClient, Query};
use crate::domain::model::{NewRelocationRecord, RelocationEntry, SessionContext};
use crate::domain::ports::HistoryLedger;
use crate::utils::error::Result;
use async_trait::async_trait;

pub const MOVEMENTS_TABLE: &str = "animal_movements";

pub const MOVEMENT_SELECT: &str = "id,animal_id,from_enclosure_id,to_enclosure_id,notes,created_at,\
animal:animals(id,name),\
from_enclosure:enclosures!animal_movements_from_enclosure_id_fkey(id,name),\
to_enclosure:enclosures!animal_movements_to_enclosure_id_fkey(id,name)";

/// History ledger backed by the `animal_movements` table.
#[derive(Debug, Clone)]
pub struct RestHistoryLedger {
    client: BackendClient,
    cap: usize,
}

impl RestHistoryLedger {
    pub fn new(client: BackendClient, cap: usize) -> Self {
        Self {
            client,
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    async fn list(
        &self,
        ctx: &SessionContext,
        mut query: Query,
        limit: usize,
    ) -> Result<Vec<RelocationEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = limit.min(self.cap);
        query.push(param("select", MOVEMENT_SELECT));
        query.push(param("order", "created_at.desc"));
        query.push(param("limit", limit));

        let entries: Vec<RelocationEntry> = self.client.select(ctx, MOVEMENTS_TABLE, &query).await?;
        Ok(newest_first(entries, limit))
    }
}

/// 依建立時間由新到舊排序並截斷
pub fn newest_first(mut entries: Vec<RelocationEntry>, limit: usize) -> Vec<RelocationEntry> {
    entries.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    entries.truncate(limit);
    entries
}

#[async_trait]
impl HistoryLedger for RestHistoryLedger {
    async fn append(&self, ctx: &SessionContext, record: &NewRelocationRecord) -> Result<()> {
        self.client.insert(ctx, MOVEMENTS_TABLE, record).await
    }

    async fn list_recent(
        &self,
        ctx: &SessionContext,
        limit: usize,
    ) -> Result<Vec<RelocationEntry>> {
        self.list(ctx, Vec::new(), limit).await
    }

    async fn list_for_animal(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        limit: usize,
    ) -> Result<Vec<RelocationEntry>> {
        self.list(ctx, vec![eq("animal_id", animal_id)], limit).await
    }
}
