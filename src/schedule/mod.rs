//! Session timing and room lookup.

use async_trait::async_trait;

pub mod client;
pub mod errors;
pub mod normalize;
pub mod wire;

pub use client::ScheduleClient;
pub use errors::ScheduleError;
pub use normalize::ScheduleInfo;
pub use wire::{ScheduleFields, decode};

/// Fetches the raw scheduling reply for one session id.
#[async_trait]
pub trait ScheduleLookup: Send + Sync {
    async fn lookup(&self, session_id: &str) -> Result<String, ScheduleError>;
}
