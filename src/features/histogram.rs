use crate::external::{ColorFrame, Frame};
use crate::geometry::BBox;
use nalgebra::DVector;

/// A patch to compute a histogram over: either a single-channel grayscale
/// crop or a 3-channel color crop.
pub enum Patch<'a> {
    Gray(&'a Frame, BBox),
    Color(&'a ColorFrame, BBox),
}

fn clamp_roi(roi: BBox, width: i32, height: i32) -> BBox {
    BBox::new(
        (roi.x0.max(0), roi.y0.max(0)),
        (roi.x1.min(width), roi.y1.min(height)),
    )
}

fn gray_channel(frame: &Frame, roi: BBox) -> Vec<u8> {
    let roi = clamp_roi(roi, frame.width() as i32, frame.height() as i32);
    let mut samples = Vec::new();
    for y in roi.y0..roi.y1 {
        for x in roi.x0..roi.x1 {
            samples.push(frame.get_pixel(x as u32, y as u32).0[0]);
        }
    }
    samples
}

fn color_channels(frame: &ColorFrame, roi: BBox) -> [Vec<u8>; 3] {
    let roi = clamp_roi(roi, frame.width() as i32, frame.height() as i32);
    let mut channels = [Vec::new(), Vec::new(), Vec::new()];
    for y in roi.y0..roi.y1 {
        for x in roi.x0..roi.x1 {
            let px = frame.get_pixel(x as u32, y as u32).0;
            for c in 0..3 {
                channels[c].push(px[c]);
            }
        }
    }
    channels
}

fn bin(samples: &[u8], bins: usize, range: (u32, u32)) -> DVector<f32> {
    let mut hist = DVector::zeros(bins);
    if samples.is_empty() || range.1 <= range.0 {
        return hist;
    }
    let span = (range.1 - range.0) as f32;
    for &s in samples {
        let v = (s as f32).clamp(range.0 as f32, range.1 as f32 - 1.0);
        let idx = (((v - range.0 as f32) / span) * bins as f32) as usize;
        hist[idx.min(bins - 1)] += 1.0;
    }
    hist
}

/// Per-channel binned histogram feature with an exponential moving average
/// update.
#[derive(Debug, Clone)]
pub struct Histogram {
    channels: usize,
    bins: usize,
    range: (u32, u32),
    lr: f32,
    data: Option<Vec<DVector<f32>>>,
}

impl Histogram {
    pub fn new(channels: usize, bins: usize, range: (u32, u32), lr: f32) -> Self {
        Self {
            channels,
            bins,
            range,
            lr,
            data: None,
        }
    }

    fn compute(&self, patch: &Patch) -> Vec<DVector<f32>> {
        match patch {
            Patch::Gray(frame, roi) => {
                debug_assert_eq!(self.channels, 1);
                vec![bin(&gray_channel(frame, *roi), self.bins, self.range)]
            }
            Patch::Color(frame, roi) => {
                debug_assert_eq!(self.channels, 3);
                color_channels(frame, *roi)
                    .iter()
                    .map(|c| bin(c, self.bins, self.range))
                    .collect()
            }
        }
    }

    /// Computes and stores the initial histogram.
    pub fn initialise(&mut self, patch: &Patch) {
        self.data = Some(self.compute(patch));
    }

    /// `H <- (1 - lr) * H + lr * hist(patch)`.
    pub fn update(&mut self, patch: &Patch) {
        let fresh = self.compute(patch);
        match &mut self.data {
            None => self.data = Some(fresh),
            Some(existing) => {
                for (h, f) in existing.iter_mut().zip(fresh.iter()) {
                    *h = &*h * (1.0 - self.lr) + f * self.lr;
                }
            }
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.data.is_some()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn values(&self) -> Option<&[DVector<f32>]> {
        self.data.as_deref()
    }

    /// Pearson correlation per channel, absolute value, averaged across
    /// channels. Returns `0.0` if either side has no stored histogram.
    pub fn compare(&self, other: &Histogram) -> f32 {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => {
                let n = a.len().min(b.len());
                if n == 0 {
                    return 0.0;
                }
                let sum: f32 = a
                    .iter()
                    .zip(b.iter())
                    .take(n)
                    .map(|(x, y)| crate::distance::pearson(x, y).abs())
                    .sum();
                sum / n as f32
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPS;
    use image::{GrayImage, Luma};

    fn solid_frame(w: u32, h: u32, value: u8) -> Frame {
        GrayImage::from_fn(w, h, |_, _| Luma([value]))
    }

    #[test]
    fn compare_self_is_one() {
        let frame = solid_frame(20, 20, 120);
        let roi = BBox::new((0, 0), (20, 20));
        let mut h = Histogram::new(1, 96, (64, 256), 0.1);
        h.initialise(&Patch::Gray(&frame, roi));
        assert!((h.compare(&h) - 1.0).abs() < EPS);
    }

    #[test]
    fn uninitialised_compares_to_zero() {
        let h1 = Histogram::new(1, 96, (64, 256), 0.1);
        let h2 = Histogram::new(1, 96, (64, 256), 0.1);
        assert_eq!(h1.compare(&h2), 0.0);
    }

    #[test]
    fn update_is_an_ema() {
        let frame_a = solid_frame(10, 10, 100);
        let frame_b = solid_frame(10, 10, 200);
        let roi = BBox::new((0, 0), (10, 10));
        let mut h = Histogram::new(1, 96, (64, 256), 0.5);
        h.initialise(&Patch::Gray(&frame_a, roi));
        let before = h.values().unwrap()[0].clone();
        h.update(&Patch::Gray(&frame_b, roi));
        let after = h.values().unwrap()[0].clone();
        assert_ne!(before, after);
    }
}
