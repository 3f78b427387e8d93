//! # ReadThrough
//!
//! Read-through caching for REST resources: TTL expiry, coalescing of
//! concurrent fetches for the same query, and explicit invalidation once a
//! write has succeeded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use readthrough::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! pub struct Categoria {
//!     pub id: u32,
//!     pub nombre: String,
//! }
//!
//! async fn fetch_categorias() -> anyhow::Result<Vec<Categoria>> {
//!     Ok(vec![Categoria { id: 1, nombre: "General".to_string() }])
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig {
//!         cache: CacheConfig::new(300_000)
//!             .with_resource("categorias", ResourceConfig::with_ttl(600_000)),
//!         signal: SignalConfig::default(),
//!     };
//!
//!     let mut readthrough = ReadThrough::new(config)?;
//!     let categorias = readthrough.register::<Vec<Categoria>>("categorias")?;
//!
//!     let list = categorias
//!         .load("categorias", Vec::<(&str, ParamValue)>::new(), fetch_categorias, LoadOptions::new())
//!         .await?;
//!     println!("{} categories", list.len());
//!
//!     // After a successful POST /categorias
//!     readthrough.notify_mutation(EventType::Create, "categorias", Some("2"));
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::ReadThrough;
pub use errors::ReadThroughError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, ResourceConfig, SignalConfig};

// Re-export internal crates
pub use cache_system;
pub use cache_system::cache_key;
pub use signal_system;
