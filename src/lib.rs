//! Labour ledger and work-session settlement for construction sites.
//!
//! Site managers record each worker's daily attendance, subsistence and
//! advances. Settling an employee turns their open entries into an
//! immutable [`Settlement`](models::Settlement) with one
//! [`SiteWorkRecord`](models::SiteWorkRecord) per site, carrying the
//! unpaid balance forward to the next session. Site summaries combine
//! open entries, snapshots and settled work with the site's cash, costs
//! and bills.
//!
//! The [`ledger::Ledger`] is the engine; [`api`] exposes it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;
