//! # ottrelay - Upstream MPEG-TS relay for OTTGate
//!
//! The streaming half of OTTGate. For one client request the crate resolves
//! the channel's active event through `ottepg`, opens the upstream source
//! with bounded redirect following, realigns the byte stream to 188-byte TS
//! packet boundaries and relays the packets to the client with pull-based
//! backpressure.
//!
//! Modules:
//!
//! - [`ts`]: the packet realigner, a pure chunk-to-packet transform
//! - [`fetch`]: the upstream HTTP fetcher with its explicit redirect loop
//! - [`session`]: the per-client relay session (a `futures::Stream`)
//! - [`api`]: the `/stream/{channel}` Axum route
//!
//! A relay session never retries: when either peer goes away the session
//! ends and a fresh client request is the retry mechanism.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod session;
pub mod ts;

pub use api::{create_relay_router, RelayApiDoc, RelayState};
pub use config::RelayConfig;
pub use error::{Error, Result};
pub use fetch::UpstreamFetcher;
pub use session::RelaySession;
pub use ts::{TsRealigner, TS_PACKET_SIZE, TS_SYNC_BYTE};
