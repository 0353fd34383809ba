pub mod repository;
pub mod service;

pub use repository::{CaballeroRepository, MongoCaballeroRepository, UpdateOutcome};
pub use service::{parse_id, CaballeroService};
