pub mod errors;
pub mod db;
pub mod caballero;

pub use caballero::{Caballero, CaballeroField, CaballeroUpdate, Change, ChangeSet, FieldValue};
