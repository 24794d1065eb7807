use nalgebra::DVector;

/// Euclidian distance between two vectors.
///
/// When the vectors' lengths don't match, the longer one is truncated to the
/// shorter one's length before the distance is computed.
pub fn euclidean(f1: &DVector<f32>, f2: &DVector<f32>) -> f32 {
    let len = f1.len().min(f2.len());
    let mut acc = 0.0_f32;
    for i in 0..len {
        let d = f1[i] - f2[i];
        acc += d * d;
    }
    acc.sqrt()
}

/// Pearson correlation coefficient between two vectors, in `[-1, 1]`.
///
/// Returns `0.0` when either vector has zero variance (a flat histogram).
pub fn pearson(f1: &DVector<f32>, f2: &DVector<f32>) -> f32 {
    let len = f1.len().min(f2.len());
    if len == 0 {
        return 0.0;
    }
    let mean1 = f1.iter().take(len).sum::<f32>() / len as f32;
    let mean2 = f2.iter().take(len).sum::<f32>() / len as f32;

    let mut cov = 0.0_f32;
    let mut var1 = 0.0_f32;
    let mut var2 = 0.0_f32;
    for i in 0..len {
        let d1 = f1[i] - mean1;
        let d2 = f2[i] - mean2;
        cov += d1 * d2;
        var1 += d1 * d1;
        var2 += d2 * d2;
    }

    if var1 <= 0.0 || var2 <= 0.0 {
        return 0.0;
    }

    cov / (var1.sqrt() * var2.sqrt())
}

/// Bhattacharyya coefficient between two L1-normalised vectors, in `[0, 1]`.
///
/// Both inputs are normalised (`sum = 1`) before the coefficient
/// `sum(sqrt(x_i * y_i))` is computed.
pub fn bhattacharyya(f1: &[f32], f2: &[f32]) -> f32 {
    let len = f1.len().min(f2.len());
    if len == 0 {
        return 0.0;
    }
    let sum1: f32 = f1.iter().take(len).sum();
    let sum2: f32 = f2.iter().take(len).sum();
    if sum1 <= 0.0 || sum2 <= 0.0 {
        return 0.0;
    }

    (0..len)
        .map(|i| ((f1[i] / sum1) * (f2[i] / sum2)).max(0.0).sqrt())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPS;

    #[test]
    fn euclidean_distances() {
        let v1 = DVector::from_vec(vec![1.0_f32, 0.0, 0.0]);
        let v2 = DVector::from_vec(vec![0.0_f32, 1.0, 0.0]);
        assert!(euclidean(&v1, &v1).abs() < EPS);
        assert!((euclidean(&v1, &v2) - 2.0_f32.sqrt()).abs() < EPS);
    }

    #[test]
    fn pearson_self_is_one() {
        let v1 = DVector::from_vec(vec![1.0_f32, 2.0, 3.0, 2.0, 1.0]);
        assert!((pearson(&v1, &v1) - 1.0).abs() < EPS);
    }

    #[test]
    fn pearson_flat_is_zero() {
        let v1 = DVector::from_vec(vec![1.0_f32, 1.0, 1.0]);
        let v2 = DVector::from_vec(vec![1.0_f32, 2.0, 3.0]);
        assert_eq!(pearson(&v1, &v1), 0.0);
        assert_eq!(pearson(&v1, &v2), 0.0);
    }

    #[test]
    fn bhattacharyya_identical_is_one() {
        let v = vec![1.0_f32, 2.0, 3.0, 4.0];
        assert!((bhattacharyya(&v, &v) - 1.0).abs() < EPS);
    }

    #[test]
    fn bhattacharyya_disjoint_is_zero() {
        let v1 = vec![1.0_f32, 0.0];
        let v2 = vec![0.0_f32, 1.0];
        assert!(bhattacharyya(&v1, &v2).abs() < EPS);
    }
}
