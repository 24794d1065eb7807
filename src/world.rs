//! The global coordinator: owns every [Scene](crate::scene::Scene), drives
//! them one frame at a time, and fuses their per-frame outcomes into a
//! single identity-stable population.
//!
//! `current` and `new` are never separately stored — they are filters over
//! the scene-owned `buckets` by [TrackState]. `out` and `dead` are the two
//! reservoirs a [Scene] truly relinquishes ownership of (`SceneOutcome::left`
//! and `SceneOutcome::dead`), so "a track belongs to exactly one list" falls
//! directly out of Rust's ownership model rather than needing separate
//! bookkeeping.

use crate::config::Config;
use crate::external::{BlobDetector, ColorFrame, Frame, HogDescriptor, ShortTermTracker};
use crate::matcher::{greedy_match, pre_clean};
use crate::scene::Scene;
use crate::track::{Label, Track, TrackState};
use rayon::prelude::*;

/// Owns the scenes, their track buckets, and the two persistent reservoirs:
/// current, new, out-of-scene and dead, the four global track populations.
pub struct World {
    scenes: Vec<Scene>,
    buckets: Vec<Vec<Track>>,
    out: Vec<Track>,
    dead: Vec<Track>,
    last_id: u64,
    frame_count: u64,
    config: Config,
}

impl World {
    pub fn new(scenes: Vec<Scene>, config: Config) -> Self {
        let buckets = scenes.iter().map(|_| Vec::new()).collect();
        Self {
            scenes,
            buckets,
            out: Vec::new(),
            dead: Vec::new(),
            last_id: 0,
            frame_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Every track in [TrackState::Current], across all scenes. Virtual: a
    /// filter, not a stored list (see module docs).
    pub fn current(&self) -> Vec<&Track> {
        self.buckets
            .iter()
            .flatten()
            .filter(|t| t.state() == TrackState::Current)
            .collect()
    }

    /// Every track still in [TrackState::New] (below `sample_bins`, not yet
    /// eligible for matching).
    pub fn new_tracks(&self) -> Vec<&Track> {
        self.buckets
            .iter()
            .flatten()
            .filter(|t| t.state() == TrackState::New)
            .collect()
    }

    pub fn out_of_scene(&self) -> &[Track] {
        &self.out
    }

    pub fn dead(&self) -> &[Track] {
        &self.dead
    }

    /// Advances every scene by one frame and runs the full fusion sequence:
    /// pre-clean the reservoirs, re-associate against `dead` then `out`
    /// (dead is consulted first, since disappear-then-reappear in place is
    /// more identity-preserving than drifting out of a neighboring scene),
    /// mint fresh labels for the remainder, then age and prune both
    /// reservoirs.
    ///
    /// `frames`/`color_frames` are indexed in the same order as the scenes
    /// this `World` was constructed with.
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &mut self,
        frames: &[Frame],
        color_frames: Option<&[ColorFrame]>,
        detector: &dyn BlobDetector,
        hog_descriptor: &dyn HogDescriptor,
        make_tracker: &(dyn Fn() -> Box<dyn ShortTermTracker> + Sync),
    ) {
        assert_eq!(
            frames.len(),
            self.scenes.len(),
            "one frame is required per scene"
        );

        let overlap = self.config.overlap_filter;
        let tracker_timeout = self.config.tracker_timeout;
        let sample_bins = self.config.sample_bins;
        let config = &self.config;

        let outcomes: Vec<_> = self
            .scenes
            .par_iter()
            .zip(self.buckets.par_iter_mut())
            .enumerate()
            .map(|(i, (scene, bucket))| {
                let color = color_frames.map(|c| &c[i]);
                scene.advance(
                    bucket,
                    &frames[i],
                    color,
                    detector,
                    hog_descriptor,
                    make_tracker,
                    tracker_timeout,
                    sample_bins,
                    &overlap,
                    config,
                )
            })
            .collect();

        self.frame_count += 1;

        for t in self.out.iter_mut() {
            t.increment_age();
        }
        for t in self.dead.iter_mut() {
            t.increment_age();
        }

        let mut promoted: Vec<(usize, usize)> = Vec::new();
        for (scene_idx, outcome) in outcomes.into_iter().enumerate() {
            for idx in outcome.promoted_indices {
                promoted.push((scene_idx, idx));
            }
            log::trace!(
                "scene {}: {} left scene, {} died this frame",
                scene_idx,
                outcome.left.len(),
                outcome.dead.len()
            );
            self.out.extend(outcome.left);
            self.dead.extend(outcome.dead);
        }

        pre_clean(&mut self.dead, &overlap);
        pre_clean(&mut self.out, &overlap);

        log::debug!(
            "frame {}: {} newly-promoted candidates, {} out, {} dead",
            self.frame_count,
            promoted.len(),
            self.out.len(),
            self.dead.len()
        );

        let dead_weights = self.config.dead_tracker_matcher;
        let matched_dead = self.match_against_reservoir(&promoted, true, &dead_weights);

        let remaining: Vec<(usize, usize)> = promoted
            .iter()
            .zip(matched_dead.iter())
            .filter_map(|(&pos, &matched)| if matched { None } else { Some(pos) })
            .collect();

        let global_weights = self.config.global_matcher;
        let matched_out = self.match_against_reservoir(&remaining, false, &global_weights);

        for (&pos, &matched) in remaining.iter().zip(matched_out.iter()) {
            if matched {
                continue;
            }
            self.last_id += 1;
            let label = Label::new(self.last_id, self.frame_count);
            let (scene_idx, bucket_idx) = pos;
            self.buckets[scene_idx][bucket_idx].set_label(label);
            log::debug!(
                "scene {}: minted fresh label {} for track {}",
                scene_idx,
                self.last_id,
                bucket_idx
            );
        }

        let dead_max = self.config.dead_tracker_matcher.max_death_time;
        let out_max = self.config.global_matcher.max_death_time;
        self.dead.retain(|t| t.age() < dead_max);
        self.out.retain(|t| t.age() < out_max);
    }

    /// Runs one greedy-match pass of `positions` (candidate tracks,
    /// identified by `(scene_idx, bucket_idx)`) against `self.dead` (if
    /// `against_dead`) or `self.out`, applying any accepted label directly
    /// and removing the consumed reservoir entries. Returns, per position,
    /// whether it was matched (label assigned).
    fn match_against_reservoir(
        &mut self,
        positions: &[(usize, usize)],
        against_dead: bool,
        weights: &crate::config::WeightSetConfig,
    ) -> Vec<bool> {
        if positions.is_empty() {
            return Vec::new();
        }

        let candidates: Vec<&Track> = positions
            .iter()
            .map(|&(s, b)| &self.buckets[s][b])
            .collect();
        let reservoir: &[Track] = if against_dead { &self.dead } else { &self.out };
        let (labels, mut consumed) = greedy_match(&candidates, reservoir, weights);

        let mut matched = vec![false; positions.len()];
        for (i, label) in labels.into_iter().enumerate() {
            if let Some(label) = label {
                let (scene_idx, bucket_idx) = positions[i];
                self.buckets[scene_idx][bucket_idx].set_label(label);
                matched[i] = true;
                log::debug!(
                    "{} match: scene {} track {} inherits label {}",
                    if against_dead { "dead" } else { "out-of-scene" },
                    scene_idx,
                    bucket_idx,
                    label.id
                );
            }
        }

        consumed.sort_unstable_by(|a, b| b.cmp(a));
        let reservoir_mut: &mut Vec<Track> = if against_dead {
            &mut self.dead
        } else {
            &mut self.out
        };
        for idx in consumed {
            reservoir_mut.remove(idx);
        }

        matched
    }
}
