//! Muxer statistics

pub mod metrics;

pub use metrics::MuxerStats;
