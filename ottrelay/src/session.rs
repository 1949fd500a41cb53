//! Per-client relay session
//!
//! One `RelaySession` couples one upstream body to one client response body.
//! It is a pull-based `Stream`: packets are only produced when the client's
//! connection can accept more data, so a slow client suspends upstream
//! consumption instead of growing a buffer. Dropping the session (the client
//! went away, or the response was aborted) drops the upstream body with it,
//! which cancels the upstream connection immediately.

use crate::error::Error;
use crate::ts::TsRealigner;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

/// Packets between progress log lines
const PROGRESS_LOG_INTERVAL: u64 = 5000;

type UpstreamStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, Error>> + Send>>;

/// Relay of one upstream TS body to one client, realigned to packet
/// boundaries
pub struct RelaySession {
    channel: String,
    upstream: UpstreamStream,
    realigner: TsRealigner,
    pending: VecDeque<Bytes>,
    bytes_relayed: u64,
    packets_relayed: u64,
    finished: bool,
}

impl RelaySession {
    /// Wrap an open upstream response
    pub fn new(channel: impl Into<String>, response: reqwest::Response) -> Self {
        let upstream = response.bytes_stream().map(|r| r.map_err(Error::Read));
        Self::from_stream(channel, upstream)
    }

    /// Wrap any byte-chunk stream (tests feed synthetic upstreams here)
    pub fn from_stream(
        channel: impl Into<String>,
        upstream: impl Stream<Item = std::result::Result<Bytes, Error>> + Send + 'static,
    ) -> Self {
        Self {
            channel: channel.into(),
            upstream: Box::pin(upstream),
            realigner: TsRealigner::new(),
            pending: VecDeque::new(),
            bytes_relayed: 0,
            packets_relayed: 0,
            finished: false,
        }
    }

    /// Bytes written towards the client so far
    pub fn bytes_relayed(&self) -> u64 {
        self.bytes_relayed
    }

    /// Packets written towards the client so far
    pub fn packets_relayed(&self) -> u64 {
        self.packets_relayed
    }

    fn take_packet(&mut self) -> Option<Bytes> {
        let packet = self.pending.pop_front()?;
        self.bytes_relayed += packet.len() as u64;
        self.packets_relayed += 1;

        if self.packets_relayed == 1 {
            debug!("{}: first packet relayed", self.channel);
        } else if self.packets_relayed % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                "{}: {:.1}MB relayed ({} packets)",
                self.channel,
                self.bytes_relayed as f64 / (1024.0 * 1024.0),
                self.packets_relayed
            );
        }

        Some(packet)
    }
}

impl Stream for RelaySession {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(packet) = this.take_packet() {
                return Poll::Ready(Some(Ok(packet)));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match this.upstream.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    // May yield zero packets (partial packet, resync); keep
                    // pulling upstream until one completes.
                    this.pending.extend(this.realigner.push(&chunk));
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    warn!(
                        "{}: upstream error after {} bytes: {}",
                        this.channel, this.bytes_relayed, e
                    );
                    return Poll::Ready(Some(Err(io::Error::new(io::ErrorKind::Other, e))));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    info!(
                        "{}: upstream ended, {:.2}MB relayed in {} packets",
                        this.channel,
                        this.bytes_relayed as f64 / (1024.0 * 1024.0),
                        this.packets_relayed
                    );
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        // Reaching drop without finishing means the client went away; the
        // upstream body is dropped with us, which aborts the connection.
        if !self.finished {
            info!(
                "{}: client disconnected after {:.2}MB ({} packets)",
                self.channel,
                self.bytes_relayed as f64 / (1024.0 * 1024.0),
                self.packets_relayed
            );
        }
    }
}
