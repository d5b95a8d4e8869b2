// Adapters layer: concrete metadata providers (in-memory registry, TOML manifest).

pub mod manifest;
pub mod registry;
