use super::spectrum;
use crate::external::Frame;
use crate::geometry::BBox;
use num_complex::Complex32;
use rand::Rng;

fn sample_nearest(frame: &Frame, x: f32, y: f32) -> f32 {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let xi = x.round() as i32;
    let yi = y.round() as i32;
    if xi < 0 || yi < 0 || xi >= w || yi >= h {
        0.0
    } else {
        frame.get_pixel(xi as u32, yi as u32).0[0] as f32 / 255.0
    }
}

/// Crops a `rows x cols` patch centered on `roi`'s center, zero-padding
/// outside the frame.
fn extract_patch(frame: &Frame, roi: BBox, rows: usize, cols: usize) -> Vec<f32> {
    let (cx, cy) = roi.center();
    let mut out = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            let x = cx - cols as f32 / 2.0 + c as f32;
            let y = cy - rows as f32 / 2.0 + r as f32;
            out[r * cols + c] = sample_nearest(frame, x, y);
        }
    }
    out
}

/// Samples a small random affine perturbation (rotation + scale +
/// translation) of the patch under `roi`, used to synthesize the training
/// set a single observation is turned into at filter initialisation.
fn random_warp(
    frame: &Frame,
    roi: BBox,
    rows: usize,
    cols: usize,
    perturbation: f32,
    rng: &mut impl Rng,
) -> Vec<f32> {
    let (cx, cy) = roi.center();
    let angle = rng.gen_range(-perturbation..perturbation);
    let scale = 1.0 + rng.gen_range(-perturbation..perturbation);
    let tx = rng.gen_range(-perturbation..perturbation) * cols as f32;
    let ty = rng.gen_range(-perturbation..perturbation) * rows as f32;
    let (sin_a, cos_a) = angle.sin_cos();

    let mut out = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            let ux = c as f32 - cols as f32 / 2.0;
            let uy = r as f32 - rows as f32 / 2.0;
            let sx = scale * (cos_a * ux - sin_a * uy) + tx;
            let sy = scale * (sin_a * ux + cos_a * uy) + ty;
            out[r * cols + c] = sample_nearest(frame, cx + sx, cy + sy);
        }
    }
    out
}

fn window_mul(patch: &[f32], window: &[f32]) -> Vec<f32> {
    patch.iter().zip(window.iter()).map(|(p, w)| p * w).collect()
}

fn add(a: &[Complex32], b: &[Complex32]) -> Vec<Complex32> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

fn scale(a: &[Complex32], s: f32) -> Vec<Complex32> {
    a.iter().map(|c| c * s).collect()
}

/// Peak-to-sidelobe ratio of a correlation response: `(peak - mean) / std`
/// over every bin outside an exclusion window centered on the peak.
fn psr(response: &[f32], rows: usize, cols: usize) -> f32 {
    let (mut peak_idx, mut peak_val) = (0usize, f32::MIN);
    for (i, &v) in response.iter().enumerate() {
        if v > peak_val {
            peak_val = v;
            peak_idx = i;
        }
    }
    let (py, px) = (peak_idx / cols, peak_idx % cols);
    let excl = 5_i32;

    let mut sum = 0.0_f64;
    let mut sum_sq = 0.0_f64;
    let mut n = 0usize;
    for r in 0..rows {
        for c in 0..cols {
            if (r as i32 - py as i32).abs() <= excl && (c as i32 - px as i32).abs() <= excl {
                continue;
            }
            let v = response[r * cols + c] as f64;
            sum += v;
            sum_sq += v * v;
            n += 1;
        }
    }
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    let std = variance.sqrt().max(1e-6);
    ((peak_val as f64 - mean) / std) as f32
}

/// FFT-based correlation filter tracking feature. Trained from
/// `warp_count` random affine perturbations of the first observation, then
/// refined with an exponential moving average on every subsequent frame.
#[derive(Debug, Clone)]
pub struct Mosse {
    lr: f32,
    psr_threshold: f32,
    compare_norm: f32,
    warp_perturbation: f32,
    warp_count: usize,
    rows: usize,
    cols: usize,
    goal_freq: Option<Vec<Complex32>>,
    a: Option<Vec<Complex32>>,
    b: Option<Vec<Complex32>>,
    last_frame: Option<Frame>,
    last_roi: Option<BBox>,
}

impl Mosse {
    pub fn new(
        lr: f32,
        psr_threshold: f32,
        compare_norm: f32,
        warp_perturbation: f32,
        warp_count: usize,
    ) -> Self {
        Self {
            lr,
            psr_threshold,
            compare_norm,
            warp_perturbation,
            warp_count,
            rows: 0,
            cols: 0,
            goal_freq: None,
            a: None,
            b: None,
            last_frame: None,
            last_roi: None,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.a.is_some()
    }

    fn sigma(rows: usize, cols: usize) -> f32 {
        (rows.min(cols) as f32 / 8.0).max(1.0)
    }

    /// Builds the filter from `warp_count` synthetic warps of the patch
    /// under `roi`. Returns `false` (the feature stays disabled) if the
    /// accumulated denominator is degenerate.
    pub fn initialise(&mut self, frame: &Frame, roi: BBox) -> bool {
        let rows = roi.height().max(1) as usize;
        let cols = roi.width().max(1) as usize;
        let window = spectrum::hanning_2d(rows, cols);
        let goal = spectrum::gaussian_goal(rows, cols, Self::sigma(rows, cols));
        let goal_freq = spectrum::fft2(&goal, rows, cols);

        let mut rng = rand::thread_rng();
        let mut a_acc = vec![Complex32::new(0.0, 0.0); rows * cols];
        let mut b_acc = vec![Complex32::new(0.0, 0.0); rows * cols];
        for _ in 0..self.warp_count.max(1) {
            let patch = random_warp(frame, roi, rows, cols, self.warp_perturbation, &mut rng);
            let f = spectrum::fft2(&window_mul(&patch, &window), rows, cols);
            let fc = spectrum::conj(&f);
            a_acc = add(&a_acc, &spectrum::mul(&goal_freq, &fc));
            b_acc = add(&b_acc, &spectrum::mul(&f, &fc));
        }

        if spectrum::is_degenerate(&b_acc, 1e-6) {
            return false;
        }

        self.rows = rows;
        self.cols = cols;
        self.goal_freq = Some(goal_freq);
        self.a = Some(a_acc);
        self.b = Some(b_acc);
        self.last_frame = Some(frame.clone());
        self.last_roi = Some(roi);
        true
    }

    fn apply(&self, frame: &Frame, roi: BBox) -> Option<(f32, BBox)> {
        let (a, b) = (self.a.as_ref()?, self.b.as_ref()?);
        let window = spectrum::hanning_2d(self.rows, self.cols);
        let patch = extract_patch(frame, roi, self.rows, self.cols);
        let f = spectrum::fft2(&window_mul(&patch, &window), self.rows, self.cols);
        let h_conj = spectrum::conj(&spectrum::div_regularised(a, b, 1e-6));
        let response_freq = spectrum::mul(&h_conj, &f);
        let response = spectrum::ifft2_real(&response_freq, self.rows, self.cols);

        let (mut peak_idx, mut peak_val) = (0usize, f32::MIN);
        for (i, &v) in response.iter().enumerate() {
            if v > peak_val {
                peak_val = v;
                peak_idx = i;
            }
        }
        let dy = (peak_idx / self.cols) as i32 - (self.rows / 2) as i32;
        let dx = (peak_idx % self.cols) as i32 - (self.cols / 2) as i32;
        let predicted = roi.translated((dx, dy));
        Some((psr(&response, self.rows, self.cols), predicted))
    }

    /// Correlates the filter against `frame` at the last known location,
    /// refreshes the filter by EMA, and returns the predicted box, or
    /// `None` if the response's PSR falls below threshold (the caller
    /// treats this like any other lost short-term track).
    pub fn update(&mut self, frame: &Frame) -> Option<BBox> {
        let roi = self.last_roi?;
        let (value, predicted) = self.apply(frame, roi)?;
        if value < self.psr_threshold {
            return None;
        }

        let window = spectrum::hanning_2d(self.rows, self.cols);
        let patch = extract_patch(frame, predicted, self.rows, self.cols);
        let f = spectrum::fft2(&window_mul(&patch, &window), self.rows, self.cols);
        let fc = spectrum::conj(&f);
        let goal_freq = self.goal_freq.as_ref().expect("initialised filter has a goal");
        let a_new = add(&scale(self.a.as_ref().unwrap(), 1.0 - self.lr), &scale(&spectrum::mul(goal_freq, &fc), self.lr));
        let b_new = add(&scale(self.b.as_ref().unwrap(), 1.0 - self.lr), &scale(&spectrum::mul(&f, &fc), self.lr));

        if !spectrum::is_degenerate(&b_new, 1e-6) {
            self.a = Some(a_new);
            self.b = Some(b_new);
        }
        self.last_frame = Some(frame.clone());
        self.last_roi = Some(predicted);
        Some(predicted)
    }

    /// Retrains the filter at a position supplied by an authoritative
    /// external tracker (the scene's short-term tracker owns `Track`'s
    /// bounding box; MOSSE only needs to stay centered on it to keep
    /// producing useful `compare` calls later). Unlike [Mosse::update], this
    /// never searches for the object itself.
    pub fn refresh(&mut self, frame: &Frame, roi: BBox) {
        if !self.is_initialised() {
            return;
        }
        let window = spectrum::hanning_2d(self.rows, self.cols);
        let patch = extract_patch(frame, roi, self.rows, self.cols);
        let f = spectrum::fft2(&window_mul(&patch, &window), self.rows, self.cols);
        let fc = spectrum::conj(&f);
        let goal_freq = self.goal_freq.as_ref().expect("initialised filter has a goal");
        let a_new = add(
            &scale(self.a.as_ref().unwrap(), 1.0 - self.lr),
            &scale(&spectrum::mul(goal_freq, &fc), self.lr),
        );
        let b_new = add(
            &scale(self.b.as_ref().unwrap(), 1.0 - self.lr),
            &scale(&spectrum::mul(&f, &fc), self.lr),
        );
        if !spectrum::is_degenerate(&b_new, 1e-6) {
            self.a = Some(a_new);
            self.b = Some(b_new);
        }
        self.last_frame = Some(frame.clone());
        self.last_roi = Some(roi);
    }

    /// Cross-applies each filter to the other's last observed patch and
    /// takes the max of the two PSRs, normalised by `compare_norm` into
    /// `[0, 1]`. Does not mutate either filter: compare stays pure so the
    /// matcher can evaluate candidates in any order.
    pub fn compare(&self, other: &Mosse) -> f32 {
        let (self_frame, self_roi) = match (&self.last_frame, self.last_roi) {
            (Some(f), Some(r)) => (f, r),
            _ => return 0.0,
        };
        let (other_frame, other_roi) = match (&other.last_frame, other.last_roi) {
            (Some(f), Some(r)) => (f, r),
            _ => return 0.0,
        };
        if !self.is_initialised() || !other.is_initialised() {
            return 0.0;
        }

        let psr_self_on_other = self.apply(other_frame, other_roi).map(|(p, _)| p).unwrap_or(0.0);
        let psr_other_on_self = other.apply(self_frame, self_roi).map(|(p, _)| p).unwrap_or(0.0);
        let best = psr_self_on_other.max(psr_other_on_self);
        (best / self.compare_norm).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn blob_frame(w: u32, h: u32, cx: i32, cy: i32) -> Frame {
        GrayImage::from_fn(w, h, |x, y| {
            let d = ((x as i32 - cx).pow(2) + (y as i32 - cy).pow(2)) as f32;
            Luma([(255.0 * (-d / 200.0).exp()) as u8])
        })
    }

    #[test]
    fn initialise_succeeds_on_textured_patch() {
        let frame = blob_frame(64, 64, 32, 32);
        let roi = BBox::new((16, 16), (48, 48));
        let mut m = Mosse::new(0.2, 5.7, 11.4, 0.1, 8);
        assert!(m.initialise(&frame, roi));
        assert!(m.is_initialised());
    }

    #[test]
    fn compare_self_is_positive() {
        let frame = blob_frame(64, 64, 32, 32);
        let roi = BBox::new((16, 16), (48, 48));
        let mut m = Mosse::new(0.2, 5.7, 11.4, 0.1, 8);
        m.initialise(&frame, roi);
        assert!(m.compare(&m) > 0.0);
    }

    #[test]
    fn uninitialised_compares_to_zero() {
        let m1 = Mosse::new(0.2, 5.7, 11.4, 0.1, 8);
        let m2 = Mosse::new(0.2, 5.7, 11.4, 0.1, 8);
        assert_eq!(m1.compare(&m2), 0.0);
    }

    #[test]
    fn update_tracks_static_blob() {
        let frame = blob_frame(64, 64, 32, 32);
        let roi = BBox::new((16, 16), (48, 48));
        let mut m = Mosse::new(0.2, 5.7, 11.4, 0.1, 8);
        assert!(m.initialise(&frame, roi));
        let predicted = m.update(&frame);
        assert!(predicted.is_some());
    }
}
