// Open Wearables Domain
// This crate contains the query and aggregation logic behind the MCP tools

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data layer for convenience
pub use open_wearables_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
