//! MPEG-TS packet realignment
//!
//! Upstream feeds join mid-stream, so the first bytes of a relay are usually
//! not on a packet boundary, and a flaky upstream can drop bytes anywhere.
//! The realigner turns an arbitrary chunked byte sequence into whole 188-byte
//! packets, each starting with the 0x47 sync byte, discarding whatever cannot
//! belong to a complete packet. It validates nothing beyond the sync
//! position: continuity counters, adaptation fields and PSI contents pass
//! through untouched.

use bytes::{Buf, Bytes, BytesMut};
use tracing::warn;

/// Fixed size of an MPEG transport-stream packet
pub const TS_PACKET_SIZE: usize = 188;

/// Marker byte starting every TS packet
pub const TS_SYNC_BYTE: u8 = 0x47;

/// Stateful chunk-to-packet transform.
///
/// One realigner serves one relay session; feed it chunks with
/// [`TsRealigner::push`] and forward the returned packets in order.
#[derive(Debug, Default)]
pub struct TsRealigner {
    buffer: BytesMut,
    packets_emitted: u64,
    bytes_discarded: u64,
}

impl TsRealigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete packet it completes.
    ///
    /// Leading bytes that precede the next sync byte are dropped (and
    /// logged); a buffer with no sync byte at all is discarded wholesale.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(chunk);
        let mut packets = Vec::new();

        loop {
            if self.buffer.is_empty() {
                break;
            }

            if self.buffer[0] != TS_SYNC_BYTE {
                match self.buffer.iter().position(|&b| b == TS_SYNC_BYTE) {
                    Some(offset) => {
                        warn!("TS resync: discarding {} bytes before sync byte", offset);
                        self.bytes_discarded += offset as u64;
                        self.buffer.advance(offset);
                    }
                    None => {
                        let dropped = self.buffer.len();
                        warn!("TS resync: no sync byte in {} buffered bytes, discarding", dropped);
                        self.bytes_discarded += dropped as u64;
                        self.buffer.clear();
                        break;
                    }
                }
            }

            if self.buffer.len() < TS_PACKET_SIZE {
                break;
            }

            packets.push(self.buffer.split_to(TS_PACKET_SIZE).freeze());
            self.packets_emitted += 1;
        }

        packets
    }

    /// Total packets emitted since creation
    pub fn packets_emitted(&self) -> u64 {
        self.packets_emitted
    }

    /// Total bytes dropped by resynchronization
    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }
}
