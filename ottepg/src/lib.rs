//! # ottepg - Schedule store, event resolution and guide rendering
//!
//! This crate owns everything guide-side of OTTGate:
//!
//! - The schedule document model, loaded from the external generator's JSON
//!   file ([`models`])
//! - A TTL-cached, failure-absorbing schedule store behind the
//!   [`ScheduleProvider`] seam ([`store`])
//! - Resolution of "channel + now" to the active event, with gap filling and
//!   stream-URL fallback ([`resolver`])
//! - Guide serializers: M3U playlist ([`guide`]) and XMLTV ([`xmltv`])
//! - The guide HTTP routes: `/`, `/health`, `/playlist.m3u`, `/epg.xml`
//!   ([`api`])
//!
//! The stream relay itself lives in `ottrelay`, which consumes this crate's
//! resolver.
//!
//! # Example
//!
//! ```no_run
//! use ottepg::{FileScheduleStore, ScheduleProvider};
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = FileScheduleStore::new("/output/schedule.json");
//!     let doc = store.get().await;
//!     if let Some(resolution) = ottepg::resolve(&doc, "News1", Utc::now(), None) {
//!         println!(
//!             "{} is airing {:?}",
//!             resolution.channel_name,
//!             resolution.event.map(|e| e.program_name)
//!         );
//!     }
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod guide;
pub mod models;
pub mod resolver;
pub mod store;
pub mod xmltv;

pub use api::{create_guide_router, GuideApiDoc, GuideState, HealthResponse};
pub use config::GuideConfig;
pub use error::{Error, Result};
pub use guide::render_playlist;
pub use models::{Channel, PatternGroup, Program, ScheduleDocument};
pub use resolver::{gap_filled_programs, resolve, visibility_window, Resolution};
pub use store::{FileScheduleStore, ScheduleProvider, StaticSchedule, DEFAULT_SCHEDULE_TTL};
pub use xmltv::render_epg;
