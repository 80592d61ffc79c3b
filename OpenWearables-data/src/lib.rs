// Open Wearables Data
// This crate handles storage and query access for users and health records

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
