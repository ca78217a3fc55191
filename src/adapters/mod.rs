// Adapters layer: port implementations against the backend's REST API.

pub mod animals;
pub mod backend;
pub mod enclosures;
pub mod ledger;

pub use animals::RestAnimalRegistry;
pub use backend::BackendClient;
pub use enclosures::RestEnclosureDirectory;
pub use ledger::RestHistoryLedger;
