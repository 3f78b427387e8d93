//! Error types for the ReadThrough crate
//!
//! This module contains all error types that can be returned by ReadThrough operations.

use cache_system::cache_key::KeyError;
use cache_system::CacheError;
use config::ConfigError;
use signal_system::SignalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadThroughError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Invalid resource key: {0}")]
    InvalidKey(#[from] KeyError),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already registered: {0}")]
    ResourceAlreadyRegistered(String),

    #[error("Resource {kind} does not cache values of type {expected}")]
    TypeMismatch { kind: String, expected: &'static str },
}
