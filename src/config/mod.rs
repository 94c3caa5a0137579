// src/config/mod.rs
// DOCUMENTATION: Configuration module organization
// PURPOSE: Re-export configuration components

pub mod db;
pub mod env;

pub use db::{init_db_pool, init_memory_pool, init_schema};
pub use env::Config;
