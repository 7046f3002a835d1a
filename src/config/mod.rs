//! Configuration loading and management for the site ledger.
//!
//! This module loads the ledger policy (accepted presence levels, entry
//! window, snapshot window, salary ceiling) and the database location from
//! a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use site_ledger::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded ledger: {}", config.config().ledger.name);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{
    AttendancePolicy, LedgerConfig, LedgerMetadata, MAX_WINDOW_DAYS, PromotionPolicy,
    ServerConfig, SettlementPolicy, StorageConfig,
};
