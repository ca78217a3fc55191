// App layer: wires configuration, adapters and core services together.

pub mod export;

use crate::adapters::{BackendClient, RestAnimalRegistry, RestEnclosureDirectory, RestHistoryLedger};
use crate::config::ZooConfig;
use crate::core::relocation::{RelocationOptions, RelocationService};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

pub type RestRelocationService = RelocationService<RestAnimalRegistry, RestHistoryLedger>;

/// 所有服務共用同一個 BackendClient
pub struct ZooApp {
    pub relocation: RestRelocationService,
    pub enclosures: RestEnclosureDirectory,
    pub history_cap: usize,
}

impl ZooApp {
    pub fn from_config(config: &ZooConfig) -> Result<Self> {
        config.validate()?;

        let client = BackendClient::new(&config.backend)?;
        let animals = RestAnimalRegistry::new(client.clone());
        let ledger = RestHistoryLedger::new(client.clone(), config.history.list_cap);
        let relocation = RelocationService::with_options(
            animals,
            ledger,
            RelocationOptions {
                compensate_on_ledger_failure: config.relocation.compensate_on_ledger_failure,
            },
        );

        tracing::debug!(
            "backend at {}, history cap {}, compensation {}",
            config.backend.url,
            config.history.list_cap,
            config.relocation.compensate_on_ledger_failure
        );

        Ok(Self {
            relocation,
            enclosures: RestEnclosureDirectory::new(client),
            history_cap: config.history.list_cap,
        })
    }

    pub fn animals(&self) -> &RestAnimalRegistry {
        self.relocation.animals()
    }

    pub fn ledger(&self) -> &RestHistoryLedger {
        self.relocation.ledger()
    }
}
