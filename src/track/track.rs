use super::adapter::TrackAdapter;
use super::label::Label;
use crate::config::{Config, WeightSetConfig};
use crate::external::{ColorFrame, Frame, HogDescriptor, ShortTermTracker};
use crate::features::histogram::Patch;
use crate::features::velocity::VelocityCompareFlags;
use crate::features::{Histogram, Hog, Mosse, Velocity};
use crate::geometry::BBox;

/// Where a track sits in the NEW → CURRENT → {OUT, DEAD} lifecycle.
/// Promotion to `Current`, demotion to `Out` and the terminal
/// `Dead` transition all happen inside [Track::update]; moving a `Track`
/// between a [Scene](crate::scene::Scene)'s and the
/// [World](crate::world::World)'s reservoirs, and the final `Out`/`Dead`
/// removal once it ages past `max_death_time`, is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    New,
    Current,
    Out,
    Dead,
}

/// What happened to a track during one [Track::update] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Still tracking, no state transition.
    Alive,
    /// Sample count crossed `sample_bins`; now [TrackState::Current].
    Promoted,
    /// The updated ROI no longer lies within the scene bounds.
    LeftScene,
    /// The short-term tracker exhausted its timeout.
    Lost,
    /// The short-term tracker missed this frame but has not yet timed out.
    Stalled,
}

/// One tracked object: a short-term tracker plus up to four appearance and
/// motion features, each an independent "feature slot" that disables
/// itself (`None`) rather than fail the whole track.
pub struct Track {
    adapter: TrackAdapter,
    histogram: Option<Histogram>,
    hog: Option<Hog>,
    mosse: Option<Mosse>,
    velocity: Option<Velocity>,
    roi: BBox,
    roi_offset: (i32, i32),
    samples: u32,
    sample_bins: u32,
    label: Option<Label>,
    state: TrackState,
    age: u32,
}

impl Track {
    /// Creates a track in [TrackState::New], not yet initialised. Call
    /// [Track::init] on the same frame before the first [Track::update].
    pub fn spawn(
        tracker: Box<dyn ShortTermTracker>,
        tracker_timeout: u32,
        sample_bins: u32,
        roi: BBox,
        roi_offset: (i32, i32),
    ) -> Self {
        Self {
            adapter: TrackAdapter::new(tracker, tracker_timeout),
            histogram: None,
            hog: None,
            mosse: None,
            velocity: None,
            roi,
            roi_offset,
            samples: 0,
            sample_bins: sample_bins.max(1),
            label: None,
            state: TrackState::New,
            age: 0,
        }
    }

    /// Seeds the short-term tracker and every feature on the spawning
    /// frame. Returns `false` if the short-term tracker itself rejected
    /// initialisation — in that case the
    /// scene should drop the track outright rather than keep it around
    /// with a dead adapter.
    pub fn init(
        &mut self,
        frame: &Frame,
        color_frame: Option<&ColorFrame>,
        hog_descriptor: &dyn HogDescriptor,
        config: &Config,
    ) -> bool {
        if !self.adapter.init(frame, self.roi) {
            return false;
        }

        let hist_cfg = &config.histogram;
        let mut histogram = Histogram::new(
            hist_cfg.channels,
            hist_cfg.bins,
            hist_cfg.range,
            hist_cfg.lr,
        );
        let initialised = match (hist_cfg.channels, color_frame) {
            (3, Some(color)) => {
                histogram.initialise(&Patch::Color(color, self.roi));
                true
            }
            (1, _) => {
                histogram.initialise(&Patch::Gray(frame, self.roi));
                true
            }
            _ => false,
        };
        self.histogram = if initialised {
            Some(histogram)
        } else {
            log::warn!("histogram feature disabled: {}-channel config has no matching frame", hist_cfg.channels);
            None
        };

        let mut hog = Hog::new(config.hog.orientations, config.hog.lr);
        hog.initialise(hog_descriptor, frame, self.roi);
        self.hog = if hog.is_initialised() {
            Some(hog)
        } else {
            log::warn!("hog feature disabled: descriptor returned no result");
            None
        };

        let mut mosse = Mosse::new(
            config.mosse.lr,
            config.mosse.psr_threshold,
            config.mosse.compare_norm,
            config.mosse.warp_perturbation,
            config.mosse.warp_count,
        );
        self.mosse = if mosse.initialise(frame, self.roi) {
            Some(mosse)
        } else {
            log::warn!("mosse feature disabled: degenerate correlation filter");
            None
        };

        let mut velocity = Velocity::new(config.velocity.mmp);
        velocity.initialise(self.roi);
        self.velocity = Some(velocity);

        true
    }

    /// Advances the short-term tracker and every enabled feature by one
    /// frame. `scene_bounds` is this scene's ROI in its own local
    /// coordinates.
    pub fn update(
        &mut self,
        frame: &Frame,
        color_frame: Option<&ColorFrame>,
        hog_descriptor: &dyn HogDescriptor,
        scene_bounds: BBox,
    ) -> UpdateOutcome {
        let new_roi = match self.adapter.update(frame) {
            Some(roi) => roi,
            None => {
                // Velocity and the sample count advance every frame, even
                // one the short-term tracker missed: carry the last known
                // center forward rather than leaving the motion buffers
                // stale until the tracker recovers.
                self.samples += 1;
                if let Some(velocity) = &mut self.velocity {
                    velocity.update(self.roi);
                }
                return if self.adapter.is_timed_out() {
                    self.state = TrackState::Dead;
                    UpdateOutcome::Lost
                } else if self.state == TrackState::New && self.samples >= self.sample_bins {
                    self.state = TrackState::Current;
                    UpdateOutcome::Promoted
                } else {
                    UpdateOutcome::Stalled
                };
            }
        };
        self.roi = new_roi;
        self.samples += 1;

        if let Some(velocity) = &mut self.velocity {
            velocity.update(self.roi);
        }
        if let Some(histogram) = &mut self.histogram {
            let patch = match color_frame {
                Some(color) if histogram.channels() == 3 => Patch::Color(color, self.roi),
                _ => Patch::Gray(frame, self.roi),
            };
            histogram.update(&patch);
        }
        if let Some(hog) = &mut self.hog {
            hog.update(hog_descriptor, frame, self.roi);
        }
        if let Some(mosse) = &mut self.mosse {
            mosse.refresh(frame, self.roi);
        }

        if !scene_bounds.contains(&self.roi) {
            self.state = TrackState::Out;
            return UpdateOutcome::LeftScene;
        }

        if self.state == TrackState::New && self.samples >= self.sample_bins {
            self.state = TrackState::Current;
            return UpdateOutcome::Promoted;
        }

        UpdateOutcome::Alive
    }

    /// Weighted-sum similarity against `other` under `weights` (a sum
    /// aggregator, not a product). `weights.velocity` (speed) and
    /// `weights.angle` (direction) come from the velocity feature's own
    /// comparison; `weights.position` is a separate world-coordinate
    /// comparison of the two tracks' [Track::world_roi] centers, since
    /// position is a global, cross-scene quantity rather than a per-track
    /// motion feature. Like the speed component, the position component is
    /// a normalised *distance* (0 for coincident centers, growing with
    /// separation) so that `weights.position`'s customary negative sign
    /// penalizes distant pairs rather than rewarding them.
    /// `weights.hog`/`histogram`/`mosse` weight the matching appearance
    /// features.
    pub fn similarity(&self, other: &Track, weights: &WeightSetConfig) -> f32 {
        let velocity_components = match (&self.velocity, &other.velocity) {
            (Some(a), Some(b)) => a.compare(
                b,
                VelocityCompareFlags {
                    speed: weights.velocity != 0.0,
                    direction: weights.angle != 0.0,
                    position: false,
                },
                weights.nominal_diagonal,
            ),
            _ => [0.0, 0.0, 0.0],
        };
        let position_distance =
            self.world_roi().center_distance(&other.world_roi()) / weights.nominal_diagonal;
        let hog_sim = match (&self.hog, &other.hog) {
            (Some(a), Some(b)) => a.compare(b),
            _ => 0.0,
        };
        let histogram_sim = match (&self.histogram, &other.histogram) {
            (Some(a), Some(b)) => a.compare(b),
            _ => 0.0,
        };
        let mosse_sim = match (&self.mosse, &other.mosse) {
            (Some(a), Some(b)) => a.compare(b),
            _ => 0.0,
        };

        weights.velocity * velocity_components[0]
            + weights.angle * velocity_components[1]
            + weights.position * position_distance
            + weights.hog * hog_sim
            + weights.histogram * histogram_sim
            + weights.mosse * mosse_sim
    }

    pub fn roi(&self) -> BBox {
        self.roi
    }

    /// This track's ROI translated into world coordinates by its owning
    /// scene's offset, fixed at spawn time.
    pub fn world_roi(&self) -> BBox {
        self.roi.translated(self.roi_offset)
    }

    pub fn roi_offset(&self) -> (i32, i32) {
        self.roi_offset
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn set_state(&mut self, state: TrackState) {
        self.state = state;
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn set_label(&mut self, label: Label) {
        self.label = Some(label);
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn is_timed_out(&self) -> bool {
        self.adapter.is_timed_out()
    }

    pub fn histogram(&self) -> Option<&Histogram> {
        self.histogram.as_ref()
    }

    pub fn hog(&self) -> Option<&Hog> {
        self.hog.as_ref()
    }

    pub fn velocity(&self) -> Option<&Velocity> {
        self.velocity.as_ref()
    }

    /// Frames spent sitting in a reservoir (out-of-scene or dead) since it
    /// was last seen alive. Zero for any track still owned by a scene.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Advances the reservoir age by one frame; callers reset it to 0 via
    /// [Track::reset_age] when a track re-enters a scene's bucket.
    pub fn increment_age(&mut self) {
        self.age += 1;
    }

    pub fn reset_age(&mut self) {
        self.age = 0;
    }
}
