use crate::external::{Frame, HogDescriptor};
use crate::geometry::BBox;
use nalgebra::DVector;

/// Histogram-of-Oriented-Gradients feature, EMA-updated. The descriptor
/// computation itself is delegated to a [HogDescriptor] — a low-level
/// image operation this crate treats as an external collaborator.
#[derive(Debug, Clone)]
pub struct Hog {
    orientations: usize,
    pixels_per_cell: (u32, u32),
    lr: f32,
    data: Option<DVector<f32>>,
}

impl Hog {
    pub fn new(orientations: usize, lr: f32) -> Self {
        Self {
            orientations,
            pixels_per_cell: (1, 1),
            lr,
            data: None,
        }
    }

    /// `pixels_per_cell` is `(h_box, w_box)` — the whole ROI is one cell.
    fn cell_size(roi: BBox) -> (u32, u32) {
        (roi.height().max(1) as u32, roi.width().max(1) as u32)
    }

    pub fn initialise(&mut self, descriptor: &dyn HogDescriptor, frame: &Frame, roi: BBox) {
        self.pixels_per_cell = Self::cell_size(roi);
        self.data = descriptor
            .compute(frame, roi, self.orientations, self.pixels_per_cell)
            .map(DVector::from_vec);
    }

    /// On an empty result from the descriptor, skips the update.
    pub fn update(&mut self, descriptor: &dyn HogDescriptor, frame: &Frame, roi: BBox) {
        self.pixels_per_cell = Self::cell_size(roi);
        if let Some(fresh) = descriptor.compute(frame, roi, self.orientations, self.pixels_per_cell)
        {
            let fresh = DVector::from_vec(fresh);
            match &mut self.data {
                None => self.data = Some(fresh),
                Some(existing) if existing.len() == fresh.len() => {
                    *existing = &*existing * (1.0 - self.lr) + fresh * self.lr;
                }
                slot => *slot = Some(fresh),
            }
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.data.is_some()
    }

    pub fn values(&self) -> Option<&DVector<f32>> {
        self.data.as_ref()
    }

    /// L1-normalises both vectors, returns the Bhattacharyya coefficient
    /// `sum(sqrt(x_i * y_i))` in `[0, 1]`. `0.0` when either side is
    /// uninitialised.
    pub fn compare(&self, other: &Hog) -> f32 {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => crate::distance::bhattacharyya(a.as_slice(), b.as_slice()),
            _ => 0.0,
        }
    }
}
