//! Bridge forwarding munin-node measurements to a carbon (graphite) listener
//!
//! ```text
//! Bridge::run_once
//!   └─ fetch::fetch_cycle ── munin::MuninClient + naming ──→ Batch
//!   └─ carbon::CarbonClient::publish(Batch)
//! ```

pub mod bridge;
pub mod carbon;
pub mod config;
pub mod error;
pub mod fetch;
pub mod grammar;
pub mod health;
pub mod munin;
pub mod naming;
pub mod report;
pub mod schedule;
pub mod util;
