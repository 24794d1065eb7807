//! Abstract contracts for collaborators this crate deliberately does not
//! implement: dataset decoding, the short-term tracker (KCF), the blob
//! detector (Otsu + morphology + connected components), and the HOG
//! descriptor. The crate consumes these through traits and owns everything
//! that happens once a frame, a bounding box, or a feature vector crosses
//! the boundary.

use crate::geometry::BBox;

/// A borrowed grayscale frame. Decoding (TIFF stacks, video, mosaic
/// de-stitching) is the caller's concern; the crate only ever borrows a
/// frame for the duration of a single update.
pub type Frame = image::GrayImage;

/// A borrowed color frame, used when histograms are configured for 3
/// channels (`Histogram` with `channels = 3`, vs. `1` for grayscale).
pub type ColorFrame = image::RgbImage;

/// Abstract short-term (single-object) tracker, e.g. a KCF wrapper. `init`
/// seeds the tracker on a bounding box; `update` asks it to locate the
/// object in a new frame.
pub trait ShortTermTracker: Send {
    /// Seeds the tracker. Returns `false` if initialisation failed.
    fn init(&mut self, frame: &Frame, roi: BBox) -> bool;

    /// Returns the updated bounding box, or `None` if the tracker lost the
    /// object this frame.
    fn update(&mut self, frame: &Frame) -> Option<BBox>;
}

/// Abstract blob detector: Otsu binarization, morphological dilation/
/// opening, connected-component labeling, min/max size filtering, and
/// padding all happen on the far side of this trait.
pub trait BlobDetector: Send + Sync {
    fn detect(&self, frame: &Frame) -> Vec<BBox>;
}

/// Abstract HOG descriptor: gradient-histogram computation is a low-level
/// image operation this crate treats as external; it only stores,
/// EMA-updates, and compares whatever vector the descriptor returns.
pub trait HogDescriptor: Send + Sync {
    /// Computes the HOG feature vector over `roi` in `frame` at the given
    /// `orientations` and `pixels_per_cell` geometry. `None` on an empty
    /// result, which the caller treats as "skip this update".
    fn compute(
        &self,
        frame: &Frame,
        roi: BBox,
        orientations: usize,
        pixels_per_cell: (u32, u32),
    ) -> Option<Vec<f32>>;
}

/// Abstract dataset source: yields `(scene_index, frame)` pairs for one
/// timestep. Implementations wrap TIFF image stacks or per-scene video
/// files; this crate never decodes media itself.
pub trait FrameSource {
    /// Returns the next frame for every scene, in scene-index order, or
    /// `None` once the stream ends.
    fn next_frames(&mut self) -> Option<Vec<Frame>>;
}
