//! Data models for the remote breach API.

mod account;
mod breach;
mod stats;

pub use account::{AccountBreach, AccountReport, SourceVerdict};
pub use breach::BreachSummary;
pub use stats::{DataClassCount, NotifyReceipt, NotifyRequest, SiteStats};
