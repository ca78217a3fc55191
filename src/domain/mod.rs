// Domain layer: models and ports.
// Adapters in `crate::adapters` implement the ports against the backend.

pub mod model;
pub mod ports;
