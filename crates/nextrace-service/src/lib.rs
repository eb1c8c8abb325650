//! Race data service: aggregation, fallback, calendar export.
//!
//! This crate turns the configured categories into an always-available
//! race set:
//! - Concurrent per-category fetch chains with independent timeouts
//! - A fallback to placeholder data when every source fails
//! - A revalidation window reusing the last live result
//! - Calendar exports of one category or the whole set
//!
//! # Example
//!
//! ```rust,no_run
//! use nextrace_service::{RaceService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = RaceService::new(ServiceConfig::load()?)?;
//!     let races = service.get_race_data().await;
//!     let calendar = service.get_calendar_document(Some("tc")).await?;
//!     println!("{} races, {}", races.len(), calendar.filename);
//!     Ok(())
//! }
//! ```

mod aggregator;
mod cache;
mod config;
mod error;
mod fallback;
mod service;

pub use aggregator::{Aggregator, assemble};
pub use cache::{CacheEntry, RevalidationWindow};
pub use config::{AggregatorSettings, HttpSettings, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use fallback::{
    PLACEHOLDER_CIRCUIT, PLACEHOLDER_IMAGE, PLACEHOLDER_LOCATION, placeholder_races,
    placeholder_schedule, settle,
};
pub use service::RaceService;
