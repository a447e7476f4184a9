/// Database configuration and connection management
pub mod database;

/// Membership plan catalog loading from config.toml
pub mod plans;

/// Application settings: bind address, database URL, seeded plans
pub mod settings;
