pub mod qr;
pub mod relocation;

pub use crate::domain::model::{AnimalDetails, RelocationEntry, SessionContext};
pub use crate::domain::ports::{AnimalRegistry, EnclosureDirectory, HistoryLedger};
pub use crate::utils::error::Result;
