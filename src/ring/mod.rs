//! Shared distribution ring
//!
//! All encoders of one muxer, plus the direct packet relay path, write into a
//! single [`PacketRing`]. Players subscribe to it and receive one merged,
//! ordered packet stream.
//!
//! ```text
//!   [H264 encoder]  [AAC encoder]  [input_packet()]
//!          │              │              │
//!          └──────────────┼──────────────┘
//!                         ▼
//!               Arc<PacketRing>::write(packet, key_pos)
//!                 ├─ GopCache (metadata, headers, current GOP)
//!                 └─ broadcast::Sender<RingEntry>
//!                         │
//!          ┌──────────────┼──────────────┐
//!          ▼              ▼              ▼
//!     [Subscriber]   [Subscriber]   [Subscriber]
//! ```
//!
//! Packet bodies are `bytes::Bytes`, so fan-out clones only bump reference
//! counts.

pub mod cache;
pub mod config;
pub mod entry;
pub mod store;

pub use cache::GopCache;
pub use config::RingConfig;
pub use entry::{RingEntry, RingStats};
pub use store::PacketRing;
