use crate::external::{Frame, ShortTermTracker};
use crate::geometry::BBox;

/// Wraps a [ShortTermTracker] with the countdown that turns a string of
/// silent `update` failures into a hard "lost" signal (`tracker_timeout`).
/// A single missed frame is tolerated (motion blur, brief occlusion);
/// `timeout` consecutive misses is not.
pub struct TrackAdapter {
    tracker: Box<dyn ShortTermTracker>,
    timeout: u32,
    remaining: u32,
}

impl TrackAdapter {
    pub fn new(tracker: Box<dyn ShortTermTracker>, timeout: u32) -> Self {
        Self {
            tracker,
            timeout,
            remaining: timeout,
        }
    }

    /// Seeds the underlying tracker and resets the countdown. Returns
    /// `false` if the underlying tracker rejected initialisation — internal
    /// control flow, not an `Error`.
    pub fn init(&mut self, frame: &Frame, roi: BBox) -> bool {
        self.remaining = self.timeout;
        self.tracker.init(frame, roi)
    }

    /// `Some(bbox)` and a reset countdown on a successful update; `None`
    /// and one fewer remaining life otherwise.
    pub fn update(&mut self, frame: &Frame) -> Option<BBox> {
        match self.tracker.update(frame) {
            Some(bbox) => {
                self.remaining = self.timeout;
                Some(bbox)
            }
            None => {
                self.remaining = self.remaining.saturating_sub(1);
                None
            }
        }
    }

    pub fn is_timed_out(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    struct FlakyTracker {
        fail_from: u32,
        calls: u32,
    }
    impl ShortTermTracker for FlakyTracker {
        fn init(&mut self, _frame: &Frame, _roi: BBox) -> bool {
            true
        }
        fn update(&mut self, _frame: &Frame) -> Option<BBox> {
            self.calls += 1;
            if self.calls >= self.fail_from {
                None
            } else {
                Some(BBox::new((0, 0), (1, 1)))
            }
        }
    }

    #[test]
    fn times_out_after_consecutive_misses() {
        let tracker = FlakyTracker { fail_from: 1, calls: 0 };
        let mut adapter = TrackAdapter::new(Box::new(tracker), 3);
        let frame = GrayImage::new(4, 4);
        adapter.init(&frame, BBox::new((0, 0), (1, 1)));
        assert!(!adapter.is_timed_out());
        adapter.update(&frame);
        adapter.update(&frame);
        assert!(!adapter.is_timed_out());
        adapter.update(&frame);
        assert!(adapter.is_timed_out());
    }

    #[test]
    fn success_resets_countdown() {
        let tracker = FlakyTracker { fail_from: 100, calls: 0 };
        let mut adapter = TrackAdapter::new(Box::new(tracker), 2);
        let frame = GrayImage::new(4, 4);
        adapter.init(&frame, BBox::new((0, 0), (1, 1)));
        adapter.update(&frame);
        adapter.update(&frame);
        adapter.update(&frame);
        assert!(!adapter.is_timed_out());
    }
}
