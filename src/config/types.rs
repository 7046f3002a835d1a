//! Configuration types for the site ledger.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML policy file.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

/// Largest accepted entry or snapshot window, in days.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Metadata about this ledger deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerMetadata {
    /// Human-readable name of the ledger.
    pub name: String,
    /// Currency code used for every monetary amount.
    pub currency: String,
    /// Decimal places kept when earned salary is rounded.
    #[serde(default)]
    pub currency_scale: u32,
}

/// Attendance entry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendancePolicy {
    /// Accepted presence fractions (e.g. 0, 0.5, 1, 1.5).
    pub presence_levels: Vec<Decimal>,
    /// Maximum subsistence allowance per entry.
    pub max_subsistence: Decimal,
    /// How many days before today an entry may be dated (1 = today or yesterday).
    pub entry_window_days: u32,
    /// Longest accepted entry comment, in characters.
    #[serde(default = "default_max_comment_length")]
    pub max_comment_length: usize,
}

fn default_max_comment_length() -> usize {
    150
}

/// Settlement policy.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementPolicy {
    /// Entries dated within this many days before the settlement day are snapshotted.
    pub snapshot_window_days: u32,
}

/// Promotion policy.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionPolicy {
    /// Upper bound for a promotion's daily salary rate.
    pub max_salary_rate: Decimal,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_address: String,
}

/// Where the ledger database lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the SQLite database file; created on first start.
    pub database_path: PathBuf,
}

/// The complete ledger configuration loaded from `ledger.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Deployment metadata.
    pub ledger: LedgerMetadata,
    /// Attendance entry policy.
    pub attendance: AttendancePolicy,
    /// Settlement policy.
    pub settlement: SettlementPolicy,
    /// Promotion policy.
    pub promotions: PromotionPolicy,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub storage: StorageConfig,
}

impl LedgerConfig {
    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> EngineResult<()> {
        let windows = [
            ("attendance.entry_window_days", self.attendance.entry_window_days),
            ("settlement.snapshot_window_days", self.settlement.snapshot_window_days),
        ];
        for (field, days) in windows {
            if days > MAX_WINDOW_DAYS {
                return Err(EngineError::InvalidConfig {
                    field,
                    message: format!("{days} days exceeds the maximum of {MAX_WINDOW_DAYS}"),
                });
            }
        }
        if self.attendance.presence_levels.is_empty() {
            return Err(EngineError::InvalidConfig {
                field: "attendance.presence_levels",
                message: "at least one presence level is required".to_string(),
            });
        }
        if self.attendance.max_comment_length == 0 {
            return Err(EngineError::InvalidConfig {
                field: "attendance.max_comment_length",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Returns true if `presence` is one of the configured presence levels.
    pub fn is_presence_level(&self, presence: Decimal) -> bool {
        self.attendance
            .presence_levels
            .iter()
            .any(|level| *level == presence)
    }
}

impl Default for LedgerConfig {
    /// Mirrors `config/default/ledger.yaml`.
    fn default() -> Self {
        let presence_levels = [0, 5, 10, 15, 20, 25, 30]
            .into_iter()
            .map(|tenths| Decimal::new(tenths, 1))
            .collect();

        Self {
            ledger: LedgerMetadata {
                name: "Site Labour Ledger".to_string(),
                currency: "BDT".to_string(),
                currency_scale: 0,
            },
            attendance: AttendancePolicy {
                presence_levels,
                max_subsistence: Decimal::from(1000),
                entry_window_days: 1,
                max_comment_length: default_max_comment_length(),
            },
            settlement: SettlementPolicy {
                snapshot_window_days: 1,
            },
            promotions: PromotionPolicy {
                max_salary_rate: Decimal::from(5000),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0:8080".to_string(),
            },
            storage: StorageConfig {
                database_path: PathBuf::from("data/site-ledger.db"),
            },
        }
    }
}
