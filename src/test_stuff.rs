//! Deterministic test doubles and synthetic generators for the four
//! external contracts, in the same spirit as the hand-written stand-ins
//! many tracking crates keep in their own `test_stuff` module: trivial
//! attribute/metric doubles there, trivial tracker/detector/HOG doubles
//! here. Used by this crate's own `#[cfg(test)]` modules and by
//! `tests/scenarios.rs`.

use crate::external::{BlobDetector, ColorFrame, Frame, FrameSource, HogDescriptor, ShortTermTracker};
use crate::geometry::BBox;
use image::{GrayImage, Luma, RgbImage};
use rand::distributions::Uniform;
use rand::prelude::ThreadRng;
use rand::Rng;

/// A short-term tracker that follows a fixed per-frame displacement,
/// optionally going blind (reporting [None]) for a window of frames to
/// simulate occlusion.
pub struct LinearTracker {
    roi: BBox,
    step: (i32, i32),
    frame: u32,
    blind_from: Option<u32>,
    blind_until: Option<u32>,
}

impl LinearTracker {
    pub fn new(roi: BBox, step: (i32, i32)) -> Self {
        Self {
            roi,
            step,
            frame: 0,
            blind_from: None,
            blind_until: None,
        }
    }

    /// Reports no detection for `[from, until)` frames since `init`,
    /// simulating an occluded object.
    pub fn with_occlusion(mut self, from: u32, until: u32) -> Self {
        self.blind_from = Some(from);
        self.blind_until = Some(until);
        self
    }
}

impl ShortTermTracker for LinearTracker {
    fn init(&mut self, _frame: &Frame, roi: BBox) -> bool {
        self.roi = roi;
        self.frame = 0;
        true
    }

    fn update(&mut self, _frame: &Frame) -> Option<BBox> {
        self.frame += 1;
        if let (Some(from), Some(until)) = (self.blind_from, self.blind_until) {
            if self.frame >= from && self.frame < until {
                return None;
            }
        }
        self.roi = self.roi.translated(self.step);
        Some(self.roi)
    }
}

/// A detector that reports the same fixed boxes on every call. Repeated
/// deployment of the same detection is harmless: the intra-frame overlap
/// filter in `Scene::advance` drops any detection that still overlaps a
/// live track, so this is enough to model both "one spawn, then quiet" and
/// "the object reappears here later" without extra state.
pub struct FixedDetector {
    pub detections: Vec<BBox>,
}

impl FixedDetector {
    pub fn new(detections: Vec<BBox>) -> Self {
        Self { detections }
    }
}

impl BlobDetector for FixedDetector {
    fn detect(&self, _frame: &Frame) -> Vec<BBox> {
        self.detections.clone()
    }
}

pub struct NoDetections;

impl BlobDetector for NoDetections {
    fn detect(&self, _frame: &Frame) -> Vec<BBox> {
        Vec::new()
    }
}

/// A HOG descriptor that always reports the same constant vector,
/// regardless of frame or ROI — enough to exercise the `Hog` feature slot's
/// EMA update without a real gradient-histogram implementation.
pub struct ConstHog(pub Vec<f32>);

impl HogDescriptor for ConstHog {
    fn compute(&self, _frame: &Frame, _roi: BBox, _orientations: usize, _ppc: (u32, u32)) -> Option<Vec<f32>> {
        Some(self.0.clone())
    }
}

/// A HOG descriptor that never returns a result, exercising the "disabled
/// feature slot" path.
pub struct NoHog;

impl HogDescriptor for NoHog {
    fn compute(&self, _frame: &Frame, _roi: BBox, _orientations: usize, _ppc: (u32, u32)) -> Option<Vec<f32>> {
        None
    }
}

/// A blank grayscale frame of the given size, bright enough that histogram
/// binning has something to chew on.
pub fn blank_frame(width: u32, height: u32) -> Frame {
    GrayImage::from_fn(width, height, |_, _| Luma([128]))
}

pub fn blank_color_frame(width: u32, height: u32) -> ColorFrame {
    RgbImage::from_fn(width, height, |_, _| image::Rgb([128, 128, 128]))
}

/// Synthetic linear motion generator: yields successive `BBox` centers
/// moving by a fixed step plus small random jitter, in the style of the
/// drift-iterator generators comparable tracking test suites use, but over
/// bounding boxes rather than raw feature vectors.
pub struct LinearMotion {
    roi: BBox,
    step: (f32, f32),
    jitter: f32,
    gen: ThreadRng,
    dist: Uniform<f32>,
}

impl LinearMotion {
    pub fn new(roi: BBox, step: (f32, f32), jitter: f32) -> Self {
        Self {
            roi,
            step,
            jitter,
            gen: rand::thread_rng(),
            dist: Uniform::new(-jitter.max(f32::EPSILON), jitter.max(f32::EPSILON)),
        }
    }
}

impl Iterator for LinearMotion {
    type Item = BBox;

    fn next(&mut self) -> Option<Self::Item> {
        let jx = if self.jitter > 0.0 {
            self.gen.sample(self.dist)
        } else {
            0.0
        };
        let jy = if self.jitter > 0.0 {
            self.gen.sample(self.dist)
        } else {
            0.0
        };
        let dx = (self.step.0 + jx).round() as i32;
        let dy = (self.step.1 + jy).round() as i32;
        self.roi = self.roi.translated((dx, dy));
        Some(self.roi)
    }
}

/// A [FrameSource] that yields a fixed number of identical blank frames per
/// scene, for tests that only care about detector/tracker-driven motion and
/// not actual pixel content.
pub struct BlankFrameSource {
    remaining: u32,
    scenes: usize,
    width: u32,
    height: u32,
}

impl BlankFrameSource {
    pub fn new(scenes: usize, width: u32, height: u32, frame_count: u32) -> Self {
        Self {
            remaining: frame_count,
            scenes,
            width,
            height,
        }
    }
}

impl FrameSource for BlankFrameSource {
    fn next_frames(&mut self) -> Option<Vec<Frame>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some((0..self.scenes).map(|_| blank_frame(self.width, self.height)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tracker_moves_by_step() {
        let roi = BBox::new((0, 0), (10, 10));
        let mut tracker = LinearTracker::new(roi, (2, 0));
        let frame = blank_frame(64, 64);
        tracker.init(&frame, roi);
        let next = tracker.update(&frame).unwrap();
        assert_eq!(next, BBox::new((2, 0), (12, 10)));
    }

    #[test]
    fn occluded_tracker_reports_none_in_window() {
        let roi = BBox::new((0, 0), (10, 10));
        let mut tracker = LinearTracker::new(roi, (1, 0)).with_occlusion(2, 5);
        let frame = blank_frame(64, 64);
        tracker.init(&frame, roi);
        assert!(tracker.update(&frame).is_some());
        assert!(tracker.update(&frame).is_none());
        assert!(tracker.update(&frame).is_none());
        assert!(tracker.update(&frame).is_some());
    }

    #[test]
    fn fixed_detector_reports_its_boxes() {
        let detector = FixedDetector::new(vec![BBox::new((0, 0), (5, 5))]);
        let frame = blank_frame(64, 64);
        assert_eq!(detector.detect(&frame).len(), 1);
    }

    #[test]
    fn blank_frame_source_yields_requested_count() {
        let mut source = BlankFrameSource::new(2, 32, 32, 3);
        let mut count = 0;
        while let Some(frames) = source.next_frames() {
            assert_eq!(frames.len(), 2);
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn linear_motion_advances_deterministically_without_jitter() {
        let roi = BBox::new((0, 0), (10, 10));
        let mut motion = LinearMotion::new(roi, (2.0, 0.0), 0.0);
        let first = motion.next().unwrap();
        let second = motion.next().unwrap();
        assert_eq!(first, BBox::new((2, 0), (12, 10)));
        assert_eq!(second, BBox::new((4, 0), (14, 10)));
    }
}
