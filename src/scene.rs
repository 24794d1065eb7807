//! A scene is a fixed region of the world frame, tracked independently of
//! its neighbors (overlapping ROIs tiling the field of view). It owns no
//! track storage itself — [World](crate::world::World) does, one bucket
//! per scene — so that scenes can be advanced under
//! [rayon](https://docs.rs/rayon) with each bucket borrowed independently.

use crate::config::{Config, OverlapFilterConfig};
use crate::external::{BlobDetector, ColorFrame, Frame, HogDescriptor, ShortTermTracker};
use crate::geometry::BBox;
use crate::track::{Track, UpdateOutcome};

/// A scene's fixed geometry: its ROI in local (per-frame) coordinates, and
/// the offset that maps that ROI into world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Scene {
    pub bounds: BBox,
    pub offset: (i32, i32),
}

impl Scene {
    pub fn new(bounds: BBox, offset: (i32, i32)) -> Self {
        Self { bounds, offset }
    }

    /// Advances every track in `bucket` by one frame, removes the ones that
    /// left the scene or died, spawns new tracks from blob detections that
    /// don't already overlap a tracked object, and reports which surviving
    /// indices were promoted `New -> Current` this frame.
    ///
    /// `bucket` only ever holds this scene's tracks; it is mutated in
    /// place so indices World collected earlier in the frame (if any)
    /// aren't invalidated across unrelated scenes.
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &self,
        bucket: &mut Vec<Track>,
        frame: &Frame,
        color_frame: Option<&ColorFrame>,
        detector: &dyn BlobDetector,
        hog_descriptor: &dyn HogDescriptor,
        make_tracker: &dyn Fn() -> Box<dyn ShortTermTracker>,
        tracker_timeout: u32,
        sample_bins: u32,
        overlap: &OverlapFilterConfig,
        config: &Config,
    ) -> SceneOutcome {
        let mut left = Vec::new();
        let mut dead = Vec::new();
        let mut promoted_indices = Vec::new();

        let taken = std::mem::take(bucket);
        let mut survivors = Vec::with_capacity(taken.len());
        for mut track in taken {
            match track.update(frame, color_frame, hog_descriptor, self.bounds) {
                UpdateOutcome::Lost => dead.push(track),
                UpdateOutcome::LeftScene => left.push(track),
                UpdateOutcome::Promoted => {
                    promoted_indices.push(survivors.len());
                    survivors.push(track);
                }
                UpdateOutcome::Alive | UpdateOutcome::Stalled => survivors.push(track),
            }
        }

        for bbox in detector.detect(frame) {
            let overlaps_existing = survivors
                .iter()
                .any(|t: &Track| bbox.intersection_over_min(&t.roi()) >= overlap.iom
                    || bbox.center_distance(&t.roi()) <= overlap.cd);
            if overlaps_existing {
                continue;
            }
            let mut track = Track::spawn(make_tracker(), tracker_timeout, sample_bins, bbox, self.offset);
            if track.init(frame, color_frame, hog_descriptor, config) {
                survivors.push(track);
            }
        }

        *bucket = survivors;
        SceneOutcome {
            promoted_indices,
            left,
            dead,
        }
    }
}

/// What one scene produced this frame: which of its surviving tracks were
/// just promoted to [TrackState::Current](crate::track::TrackState::Current)
/// (candidates for re-identification), and the tracks it gave up entirely
/// (left the scene, or the short-term tracker timed out).
pub struct SceneOutcome {
    pub promoted_indices: Vec<usize>,
    pub left: Vec<Track>,
    pub dead: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    struct AlwaysTrack(BBox);
    impl ShortTermTracker for AlwaysTrack {
        fn init(&mut self, _f: &Frame, roi: BBox) -> bool {
            self.0 = roi;
            true
        }
        fn update(&mut self, _f: &Frame) -> Option<BBox> {
            Some(self.0)
        }
    }

    struct NoDetections;
    impl BlobDetector for NoDetections {
        fn detect(&self, _frame: &Frame) -> Vec<BBox> {
            Vec::new()
        }
    }

    struct OneDetection(BBox);
    impl BlobDetector for OneDetection {
        fn detect(&self, _frame: &Frame) -> Vec<BBox> {
            vec![self.0]
        }
    }

    struct StubHog;
    impl HogDescriptor for StubHog {
        fn compute(&self, _f: &Frame, _r: BBox, _o: usize, _p: (u32, u32)) -> Option<Vec<f32>> {
            None
        }
    }

    #[test]
    fn spawns_a_track_from_a_fresh_detection() {
        let scene = Scene::new(BBox::new((0, 0), (100, 100)), (0, 0));
        let mut bucket = Vec::new();
        let frame = GrayImage::new(100, 100);
        let detector = OneDetection(BBox::new((10, 10), (20, 20)));
        let config = Config::default();
        let overlap = config.overlap_filter;
        let outcome = scene.advance(
            &mut bucket,
            &frame,
            None,
            &detector,
            &StubHog,
            &|| Box::new(AlwaysTrack(BBox::new((0, 0), (1, 1)))),
            5,
            3,
            &overlap,
            &config,
        );
        assert_eq!(bucket.len(), 1);
        assert!(outcome.promoted_indices.is_empty());
        assert!(outcome.left.is_empty());
        assert!(outcome.dead.is_empty());
    }

    #[test]
    fn does_not_spawn_over_an_existing_track() {
        let scene = Scene::new(BBox::new((0, 0), (100, 100)), (0, 0));
        let config = Config::default();
        let overlap = config.overlap_filter;
        let roi = BBox::new((10, 10), (20, 20));
        let mut seed = Track::spawn(
            Box::new(AlwaysTrack(roi)),
            5,
            3,
            roi,
            (0, 0),
        );
        let frame = GrayImage::new(100, 100);
        seed.init(&frame, None, &StubHog, &config);
        let mut bucket = vec![seed];

        let detector = OneDetection(roi);
        scene.advance(
            &mut bucket,
            &frame,
            None,
            &detector,
            &StubHog,
            &|| Box::new(AlwaysTrack(BBox::new((0, 0), (1, 1)))),
            5,
            3,
            &overlap,
            &config,
        );
        assert_eq!(bucket.len(), 1);
    }

    #[test]
    fn no_detections_leaves_bucket_untouched() {
        let scene = Scene::new(BBox::new((0, 0), (100, 100)), (0, 0));
        let config = Config::default();
        let overlap = config.overlap_filter;
        let frame = GrayImage::new(100, 100);
        let mut bucket = Vec::new();
        let outcome = scene.advance(
            &mut bucket,
            &frame,
            None,
            &NoDetections,
            &StubHog,
            &|| Box::new(AlwaysTrack(BBox::new((0, 0), (1, 1)))),
            5,
            3,
            &overlap,
            &config,
        );
        assert!(bucket.is_empty());
        assert!(outcome.promoted_indices.is_empty());
    }
}
