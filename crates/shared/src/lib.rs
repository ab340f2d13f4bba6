//! Shared types, errors, and configuration for invoicing behaviors.
//!
//! This crate provides common types used across all other crates:
//! - Currency descriptors with decimal rounding units
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
