//! Service layer for knight edits.
//! - Framework independent: no axum types cross this boundary.
//! - Persistence sits behind `caballero::repository::CaballeroRepository`.

pub mod errors;
pub mod caballero;
#[cfg(test)]
pub mod test_support;
