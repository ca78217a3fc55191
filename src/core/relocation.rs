use crate::domain::model::{AnimalDetails, NewRelocationRecord, SessionContext};
use crate::domain::ports::{AnimalRegistry, HistoryLedger};
use crate::utils::error::{Result, ZooError};
use crate::utils::validation::require_identifier;
use tracing::Instrument;

#[derive(Debug, Clone, Copy, Default)]
pub struct RelocationOptions {
    /// Revert the animal when the history append fails after the move.
    pub compensate_on_ledger_failure: bool,
}

/// Moves an animal to a new enclosure and records the move in the history ledger.
///
/// The three backend calls (read, update, append) run in order with no
/// transaction around them.
pub struct RelocationService<A: AnimalRegistry, L: HistoryLedger> {
    animals: A,
    ledger: L,
    options: RelocationOptions,
}

impl<A: AnimalRegistry, L: HistoryLedger> RelocationService<A, L> {
    pub fn new(animals: A, ledger: L) -> Self {
        Self::with_options(animals, ledger, RelocationOptions::default())
    }

    pub fn with_options(animals: A, ledger: L, options: RelocationOptions) -> Self {
        Self {
            animals,
            ledger,
            options,
        }
    }

    pub fn animals(&self) -> &A {
        &self.animals
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub async fn relocate(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        destination: Option<&str>,
        notes: Option<&str>,
    ) -> Result<AnimalDetails> {
        let animal_id =
            require_identifier("animal_id", Some(animal_id), "Please select an animal")?;
        let destination = require_identifier(
            "destination",
            destination,
            "Please select a destination enclosure",
        )?;
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let span = tracing::info_span!(
            "relocate",
            animal_id,
            destination,
            user = ctx.user_label()
        );
        self.move_and_record(ctx, animal_id, destination, notes)
            .instrument(span)
            .await
    }

    async fn move_and_record(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        destination: &str,
        notes: Option<String>,
    ) -> Result<AnimalDetails> {
        // 1. 讀取目前圍欄
        let from_enclosure = self.animals.get_current_enclosure(ctx, animal_id).await?;
        tracing::debug!("current enclosure: {:?}", from_enclosure);

        // 2. 更新動物的圍欄
        let updated = self
            .animals
            .set_current_enclosure(ctx, animal_id, destination)
            .await?;
        tracing::debug!("animal enclosure updated");

        // 3. 寫入歷史紀錄
        let record = NewRelocationRecord {
            animal_id: animal_id.to_string(),
            from_enclosure_id: from_enclosure.clone(),
            to_enclosure_id: destination.to_string(),
            notes,
        };

        if let Err(err) = self.ledger.append(ctx, &record).await {
            tracing::error!(
                animal_id,
                destination,
                from = ?from_enclosure,
                "❌ animal was moved but the history record failed: {}",
                err
            );
            let compensated = self.compensate(ctx, animal_id, from_enclosure.as_deref()).await;
            return Err(ZooError::LedgerAppendFailed {
                animal_id: animal_id.to_string(),
                destination: destination.to_string(),
                compensated,
                source: Box::new(err),
            });
        }

        tracing::info!(
            "✅ {} moved from {} to {}",
            animal_id,
            from_enclosure.as_deref().unwrap_or("(none)"),
            destination
        );
        Ok(updated)
    }

    async fn compensate(
        &self,
        ctx: &SessionContext,
        animal_id: &str,
        previous: Option<&str>,
    ) -> bool {
        if !self.options.compensate_on_ledger_failure {
            return false;
        }

        match self.animals.restore_enclosure(ctx, animal_id, previous).await {
            Ok(()) => {
                tracing::warn!("↩️ reverted {} to {:?}", animal_id, previous);
                true
            }
            Err(err) => {
                tracing::error!("revert of {} failed, animal stays moved: {}", animal_id, err);
                false
            }
        }
    }
}
