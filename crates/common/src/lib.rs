//! Shared configuration, database, error and model types for the Herald server.

pub mod config;
pub mod db;
pub mod error;
pub mod types;
