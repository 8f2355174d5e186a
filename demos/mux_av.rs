//! Mux a synthetic H.264 + AAC stream and watch it from two players
//!
//! Run with: cargo run --example mux_av [SECONDS]
//!
//! The publisher side pushes 25 fps video and ~43 fps audio into an
//! `RtmpMuxer`. One player subscribes before the stream starts, a second
//! one joins halfway and starts from the cached headers and current GOP.
//!
//! ```text
//!   [synthetic source] ──frames──► RtmpMuxer ──► PacketRing
//!                                                   │
//!                                       ┌───────────┴───────────┐
//!                                       ▼                       ▼
//!                                  [early player]          [late player]
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::broadcast::error::RecvError;

use rtmp_mux::{
    AacTrack, Frame, H264Track, MetadataDescriptor, MuxerListener, PacketRing, RingEntry,
    RtmpMuxer,
};

/// Baseline 320x240 SPS
const SPS: &[u8] = &[0, 0, 0, 1, 0x67, 0x42, 0xC0, 0x1F, 0xDA, 0x05, 0x07, 0xE4];
const PPS: &[u8] = &[0, 0, 0, 1, 0x68, 0xCE, 0x3C, 0x80];
const IDR: &[u8] = &[0, 0, 0, 1, 0x65, 0x88, 0x84, 0x00, 0x33, 0xFF];
const NON_IDR: &[u8] = &[0, 0, 0, 1, 0x41, 0x9A, 0x02, 0x0C];
/// AAC LC, 44.1 kHz, stereo
const ADTS_FRAME: &[u8] = &[0xFF, 0xF1, 0x50, 0x80, 0x01, 0x7F, 0xFC, 0x21, 0x10, 0x04, 0x60];

const GOP_LENGTH: u32 = 25;
const VIDEO_INTERVAL_MS: u32 = 40;
const AUDIO_INTERVAL_MS: u32 = 23;

struct LogListener;

impl MuxerListener for LogListener {
    fn on_all_tracks_ready(&self, metadata: &MetadataDescriptor) {
        for (key, value) in metadata.iter() {
            tracing::info!(key = key, value = ?value, "onMetaData");
        }
    }
}

fn describe(entry: &RingEntry) -> &'static str {
    let packet = &entry.packet;
    if packet.is_script() {
        "metadata"
    } else if packet.is_avc_sequence_header() {
        "avc header"
    } else if packet.is_aac_sequence_header() {
        "aac header"
    } else if packet.is_keyframe() {
        "keyframe"
    } else if packet.is_video() {
        "video"
    } else {
        "audio"
    }
}

fn spawn_player(name: &'static str, ring: &PacketRing) -> tokio::task::JoinHandle<u64> {
    let (mut rx, catchup) = ring.subscribe();
    tokio::spawn(async move {
        let mut received = 0u64;
        for entry in &catchup {
            tracing::info!(player = name, kind = describe(entry), ts = entry.packet.timestamp, "Catch-up");
            received += 1;
        }
        loop {
            match rx.recv().await {
                Ok(entry) => {
                    received += 1;
                    if entry.key_pos || entry.packet.is_script() {
                        tracing::info!(
                            player = name,
                            kind = describe(&entry),
                            ts = entry.packet.timestamp,
                            "Packet"
                        );
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(player = name, skipped = n, "Player lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        received
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rtmp_mux=debug".parse()?)
                .add_directive("mux_av=info".parse()?),
        )
        .init();

    let seconds: u32 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 4,
    };

    let mut muxer = RtmpMuxer::new();
    muxer.set_listener(Arc::new(LogListener));
    muxer.add_track(Arc::new(H264Track::new()));
    muxer.add_track(Arc::new(AacTrack::new()));

    let ring = muxer.ring();
    let early = spawn_player("early", &ring);
    let mut late = None;

    let duration_ms = seconds * 1000;
    let mut video_ts = 0u32;
    let mut audio_ts = 0u32;
    let mut video_frame = 0u32;
    let mut ticker = tokio::time::interval(Duration::from_millis(1));

    while video_ts < duration_ms {
        ticker.tick().await;

        while audio_ts <= video_ts {
            muxer.input_frame(&Frame::aac(audio_ts, Bytes::from_static(ADTS_FRAME)));
            audio_ts += AUDIO_INTERVAL_MS;
        }

        if video_frame % GOP_LENGTH == 0 {
            muxer.input_frame(&Frame::h264(video_ts, video_ts, Bytes::from_static(SPS)));
            muxer.input_frame(&Frame::h264(video_ts, video_ts, Bytes::from_static(PPS)));
            muxer.input_frame(&Frame::h264(video_ts, video_ts, Bytes::from_static(IDR)));
        } else {
            muxer.input_frame(&Frame::h264(video_ts, video_ts, Bytes::from_static(NON_IDR)));
        }
        video_frame += 1;
        video_ts += VIDEO_INTERVAL_MS;

        if late.is_none() && video_ts >= duration_ms / 2 + 200 {
            late = Some(spawn_player("late", &ring));
        }
    }

    let stats = muxer.stats();
    let ring_stats = ring.stats();
    tracing::info!(
        frames = stats.frames_routed,
        encoders = stats.encoders_bound,
        packets = ring_stats.packets_written,
        key_positions = ring_stats.key_positions,
        cached = ring_stats.cached_packets,
        "Publishing finished"
    );

    // Dropping the muxer and our ring handle closes the channel
    drop(muxer);
    drop(ring);

    let early = early.await?;
    tracing::info!(player = "early", received = early, "Player done");
    if let Some(late) = late {
        let late = late.await?;
        tracing::info!(player = "late", received = late, "Player done");
    }

    Ok(())
}
