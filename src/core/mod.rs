//! Core engine infrastructure.
//!
//! - `config`: configuration loading

mod config;

pub use config::{Config, GeneralConfig, ResolverConfig, LOCAL_CONFIG_FILE};
