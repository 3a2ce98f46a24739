//! Core module - shared infrastructure for the career assistant
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ProviderType, RunConfig};
pub use error::{CareerError, Result};
pub use types::*;
