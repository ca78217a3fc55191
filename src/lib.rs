pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::{BackendClient, RestAnimalRegistry, RestEnclosureDirectory, RestHistoryLedger};
pub use app::ZooApp;
pub use config::ZooConfig;
pub use crate::core::qr::{dispatch, QrOutcome, QrPayload};
pub use crate::core::relocation::{RelocationOptions, RelocationService};
pub use domain::model::{AnimalDetails, NewAnimal, RelocationEntry, SessionContext};
pub use utils::error::{Result, ZooError};
