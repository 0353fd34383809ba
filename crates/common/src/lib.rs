pub mod types;
pub mod utils;

/// Name reported by the root endpoint and the startup logs.
pub const SERVICE_NAME: &str = "MS Edición Caballeros";
