//! Per-frame snapshot serialization: buffers one [TraceEntry] per traced
//! track per frame, in memory, and hands the caller the finished document
//! on request. In the spirit of comparable tracking pipelines' JSON trace
//! writers — the schema and the buffer-then-dump lifecycle are this
//! crate's concern; the actual file handle and when to flush it belong to
//! the caller.

use crate::config::TracerConfig;
use crate::track::Track;
use crate::world::World;
use anyhow::Result;
use serde::Serialize;

/// One track's state in one frame. Every optional field is emitted only
/// when its name appears in [TracerConfig::enable_tracer].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    /// `0` current, `1` new, `2` out-of-scene, `3` dead.
    pub status: u8,
    /// `-1` if the track has no label yet.
    pub label: i64,
    pub spawn_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_position: Option<(f32, f32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_position: Option<(f32, f32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<(f32, f32)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_histogram: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hog_histogram: Option<Vec<f32>>,
}

/// Track status codes used on the wire.
pub const STATUS_CURRENT: u8 = 0;
pub const STATUS_NEW: u8 = 1;
pub const STATUS_OUT: u8 = 2;
pub const STATUS_DEAD: u8 = 3;

/// Buffers [TraceEntry] snapshots of a [World], one call to [Tracer::push]
/// per frame.
pub struct Tracer {
    config: TracerConfig,
    frames: Vec<Vec<TraceEntry>>,
}

impl Tracer {
    pub fn new(config: TracerConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
        }
    }

    fn enabled(&self, key: &str) -> bool {
        self.config.enable_tracer.iter().any(|k| k == key)
    }

    fn traces(&self, status: u8) -> bool {
        self.config.trace_status.is_empty() || self.config.trace_status.contains(&status)
    }

    fn build_entry(&self, track: &Track, status: u8) -> TraceEntry {
        let rel_position = track.roi().center();

        TraceEntry {
            status,
            label: track.label().map(|l| l.id as i64).unwrap_or(-1),
            spawn_time: track.label().map(|l| l.spawn_time).unwrap_or(0),
            rel_position: self.enabled("rel_position").then_some(rel_position),
            abs_position: self.enabled("abs_position").then(|| {
                let (ox, oy) = track.roi_offset();
                (rel_position.0 + ox as f32, rel_position.1 + oy as f32)
            }),
            speed: self
                .enabled("speed")
                .then(|| track.velocity().and_then(|v| v.speed()))
                .flatten(),
            direction: self
                .enabled("direction")
                .then(|| track.velocity().map(|v| v.direction()))
                .flatten(),
            col_histogram: self
                .enabled("col_histogram")
                .then(|| {
                    track.histogram().and_then(|h| h.values()).map(|values| {
                        values.iter().flat_map(|v| v.iter().copied()).collect()
                    })
                })
                .flatten(),
            hog_histogram: self
                .enabled("hog_histogram")
                .then(|| {
                    track
                        .hog()
                        .and_then(|h| h.values())
                        .map(|v| v.iter().copied().collect())
                })
                .flatten(),
        }
    }

    /// Appends one frame's worth of entries, one per traced track, drawn
    /// from `world`'s current/new/out/dead populations. Skips statuses not
    /// named in `trace_status` (an empty list traces everything).
    pub fn push(&mut self, world: &World) {
        let mut entries = Vec::new();
        for track in world.current() {
            if self.traces(STATUS_CURRENT) {
                entries.push(self.build_entry(track, STATUS_CURRENT));
            }
        }
        for track in world.new_tracks() {
            if self.traces(STATUS_NEW) {
                entries.push(self.build_entry(track, STATUS_NEW));
            }
        }
        for track in world.out_of_scene() {
            if self.traces(STATUS_OUT) {
                entries.push(self.build_entry(track, STATUS_OUT));
            }
        }
        for track in world.dead() {
            if self.traces(STATUS_DEAD) {
                entries.push(self.build_entry(track, STATUS_DEAD));
            }
        }
        log::trace!(
            "tracer: frame {} recorded {} entries",
            world.frame_count(),
            entries.len()
        );
        self.frames.push(entries);
    }

    pub fn frames(&self) -> &[Vec<TraceEntry>] {
        &self.frames
    }

    /// The whole buffered document, as a JSON array of frames.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.frames)?)
    }

    /// Writes the buffered document to `writer`. The file is conventionally
    /// written once on shutdown as `<file_prefix>.json`; opening that file
    /// is the caller's concern, this only serializes into it.
    pub fn dump_to_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.frames)?;
        Ok(())
    }

    pub fn file_prefix(&self) -> &str {
        &self.config.file_prefix
    }
}
