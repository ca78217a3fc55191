use crate::domain::model::{
    AnimalDetails, Enclosure, NewAnimal, NewRelocationRecord, RelocationEntry, SessionContext,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read/write access to animal rows.
#[async_trait]
pub trait AnimalRegistry: Send + Sync {
    /// Fails with `NotFound` when the animal does not exist.
    async fn get_current_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
    ) -> Result<Option<String>>;

    async fn set_current_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        enclosure_id: &str,
    ) -> Result<AnimalDetails>;

    /// Writes back a previously read assignment, which may be empty.
    async fn restore_enclosure(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        enclosure_id: Option<&str>,
    ) -> Result<()>;

    async fn get_animal(&self, ctx: &SessionContext, animal_id: &str) -> Result<AnimalDetails>;

    async fn create_animal(&self, ctx: &SessionContext, animal: &NewAnimal)
        -> Result<AnimalDetails>;
}

/// Append-only relocation history.
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    async fn append(&self, ctx: &SessionContext, record: &NewRelocationRecord) -> Result<()>;

    /// Newest first, never more than the configured cap.
    async fn list_recent(&self, ctx: &SessionContext, limit: usize)
        -> Result<Vec<RelocationEntry>>;

    async fn list_for_animal(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        limit: usize,
    ) -> Result<Vec<RelocationEntry>>;
}

#[async_trait]
pub trait EnclosureDirectory: Send + Sync {
    async fn list_enclosures(
        &self,
        ctx: &SessionContext,
        area_id: Option<&str>,
    ) -> Result<Vec<Enclosure>>;
}
