//! Session catalog scraping: portal client and session row parsing.

use async_trait::async_trait;

use crate::config::Facet;

pub mod card;
pub mod client;
pub mod errors;

pub use card::SessionCard;
pub use client::CatalogClient;
pub use errors::{CardError, CatalogError};

/// Something that can list the session rows for one (day, venue) search.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Outer HTML of every session row for the day at the venue, across all
    /// result pages.
    async fn fetch_rows(&self, day: &Facet, venue: &Facet) -> Result<Vec<String>, CatalogError>;
}
