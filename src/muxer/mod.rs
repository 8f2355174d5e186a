//! RTMP muxer
//!
//! Binds codec tracks to RTMP encoders and merges their output into one
//! shared [`PacketRing`](crate::ring::PacketRing).
//!
//! # Flow
//!
//! ```text
//!   add_track(track)
//!        │
//!        ├─ ready ──────────► perform_binding() ─► fold metadata
//!        │                                          attach ring + delegate
//!        └─ not ready ──► pending[codec] = BindingRecord
//!
//!   input_frame(frame)
//!        │
//!        ├─ tracks[codec]?.input_frame(frame) ──► encoder ──► ring
//!        ├─ track became ready? ──► take pending[codec], bind
//!        └─ pending empty? ──► Pending → Initialized (once)
//!                               ├─ onMetaData ──► ring
//!                               └─ listener.on_all_tracks_ready()
//!
//!   input_packet(packet, key_pos) ──────────────────────► ring
//! ```
//!
//! The metadata descriptor reads as empty until no binding is pending.

pub mod binding;
pub mod config;
pub mod listener;
pub mod metadata;
pub mod rtmp;
pub mod state;

pub use binding::{perform_binding, Binding, BindingRecord};
pub use config::MuxerConfig;
pub use listener::MuxerListener;
pub use metadata::{AudioMetadata, MetadataDescriptor, TrackMetadata, VideoMetadata};
pub use rtmp::RtmpMuxer;
pub use state::InitState;
