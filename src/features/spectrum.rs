//! Minimal row-column 2D FFT wrapper over `rustfft`, used by [Mosse](super::mosse::Mosse)
//! to build and apply its correlation filter in the frequency domain.

use num_complex::Complex32;
use rustfft::FftPlanner;

fn transpose(data: &[Complex32], rows: usize, cols: usize) -> Vec<Complex32> {
    let mut out = vec![Complex32::new(0.0, 0.0); data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

fn fft_2d(mut data: Vec<Complex32>, rows: usize, cols: usize, inverse: bool) -> Vec<Complex32> {
    let mut planner = FftPlanner::<f32>::new();
    let row_fft = if inverse {
        planner.plan_fft_inverse(cols)
    } else {
        planner.plan_fft_forward(cols)
    };
    for chunk in data.chunks_mut(cols) {
        row_fft.process(chunk);
    }

    let transposed = transpose(&data, rows, cols);
    let mut transposed = transposed;
    let col_fft = if inverse {
        planner.plan_fft_inverse(rows)
    } else {
        planner.plan_fft_forward(rows)
    };
    for chunk in transposed.chunks_mut(rows) {
        col_fft.process(chunk);
    }

    transpose(&transposed, cols, rows)
}

/// Forward 2D FFT of a real-valued `rows x cols` patch.
pub fn fft2(real: &[f32], rows: usize, cols: usize) -> Vec<Complex32> {
    debug_assert_eq!(real.len(), rows * cols);
    let data: Vec<Complex32> = real.iter().map(|&v| Complex32::new(v, 0.0)).collect();
    fft_2d(data, rows, cols, false)
}

/// Inverse 2D FFT, returning the real part normalised by `rows * cols`.
pub fn ifft2_real(freq: &[Complex32], rows: usize, cols: usize) -> Vec<f32> {
    debug_assert_eq!(freq.len(), rows * cols);
    let out = fft_2d(freq.to_vec(), rows, cols, true);
    let scale = (rows * cols) as f32;
    out.iter().map(|c| c.re / scale).collect()
}

pub fn conj(data: &[Complex32]) -> Vec<Complex32> {
    data.iter().map(|c| c.conj()).collect()
}

pub fn mul(a: &[Complex32], b: &[Complex32]) -> Vec<Complex32> {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).collect()
}

/// Elementwise `a / b`, with a small epsilon added to `b`'s magnitude to
/// avoid dividing by an exact zero.
pub fn div_regularised(a: &[Complex32], b: &[Complex32], eps: f32) -> Vec<Complex32> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x / (y + Complex32::new(eps, 0.0)))
        .collect()
}

/// `true` if every bin of `b` is within `eps` of zero magnitude — the
/// correlation filter's denominator has collapsed and the accumulated
/// warps carried no usable energy.
pub fn is_degenerate(b: &[Complex32], eps: f32) -> bool {
    b.iter().all(|c| c.norm() < eps)
}

/// Separable Hanning window of size `rows x cols`.
pub fn hanning_2d(rows: usize, cols: usize) -> Vec<f32> {
    let hr: Vec<f32> = (0..rows)
        .map(|i| hanning_coeff(i, rows))
        .collect();
    let hc: Vec<f32> = (0..cols)
        .map(|i| hanning_coeff(i, cols))
        .collect();
    let mut out = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[r * cols + c] = hr[r] * hc[c];
        }
    }
    out
}

fn hanning_coeff(i: usize, n: usize) -> f32 {
    if n <= 1 {
        1.0
    } else {
        0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (n - 1) as f32).cos()
    }
}

/// Centered 2D Gaussian goal response, `sigma` in pixels.
pub fn gaussian_goal(rows: usize, cols: usize, sigma: f32) -> Vec<f32> {
    let cy = (rows as f32 - 1.0) / 2.0;
    let cx = (cols as f32 - 1.0) / 2.0;
    let mut out = vec![0.0_f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            let dy = r as f32 - cy;
            let dx = c as f32 - cx;
            out[r * cols + c] = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPS;

    #[test]
    fn round_trip_is_identity() {
        let rows = 8;
        let cols = 8;
        let signal: Vec<f32> = (0..rows * cols).map(|i| (i as f32) * 0.37).collect();
        let freq = fft2(&signal, rows, cols);
        let back = ifft2_real(&freq, rows, cols);
        for (a, b) in signal.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
        }
    }

    #[test]
    fn hanning_window_is_zero_at_edges() {
        let w = hanning_2d(8, 8);
        assert!(w[0].abs() < EPS);
    }

    #[test]
    fn gaussian_goal_peaks_at_center() {
        let g = gaussian_goal(9, 9, 2.0);
        let center = g[4 * 9 + 4];
        assert!(g.iter().all(|&v| v <= center + EPS));
    }
}
