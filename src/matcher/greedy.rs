use crate::config::WeightSetConfig;
use crate::track::{Label, Track};
use itertools::iproduct;
use std::collections::HashSet;

/// Per-candidate-track, per-reservoir-entry similarity, assignment, and
/// reservoir consumption: greedy per-candidate argmax, not a global
/// assignment like the Hungarian algorithm.
///
/// Every candidate independently picks its best still-available reservoir
/// entry. A reservoir entry is consumed as soon as any candidate claims it
/// above `threshold`, even if that entry carries no label yet — a later,
/// worse-scoring candidate must not be allowed to also claim it.
pub fn greedy_match(
    candidates: &[&Track],
    reservoir: &[Track],
    weights: &WeightSetConfig,
) -> (Vec<Option<Label>>, Vec<usize>) {
    let mut similarity = vec![0.0_f32; candidates.len() * reservoir.len()];
    for (i, j) in iproduct!(0..candidates.len(), 0..reservoir.len()) {
        similarity[i * reservoir.len() + j] = candidates[i].similarity(&reservoir[j], weights);
    }

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut labels = vec![None; candidates.len()];

    for i in 0..candidates.len() {
        let mut best: Option<(usize, f32)> = None;
        for j in 0..reservoir.len() {
            if consumed.contains(&j) {
                continue;
            }
            let score = similarity[i * reservoir.len() + j];
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((j, score));
            }
        }
        if let Some((j, score)) = best {
            if score >= weights.threshold {
                consumed.insert(j);
                labels[i] = reservoir[j].label();
            }
        }
    }

    let mut consumed: Vec<usize> = consumed.into_iter().collect();
    consumed.sort_unstable();
    (labels, consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{Frame, HogDescriptor, ShortTermTracker};
    use crate::geometry::BBox;
    use crate::track::TrackAdapter;
    use image::GrayImage;

    struct Stub(BBox);
    impl ShortTermTracker for Stub {
        fn init(&mut self, _f: &Frame, _r: BBox) -> bool {
            true
        }
        fn update(&mut self, _f: &Frame) -> Option<BBox> {
            Some(self.0)
        }
    }
    struct StubHog;
    impl HogDescriptor for StubHog {
        fn compute(&self, _f: &Frame, _r: BBox, _o: usize, _p: (u32, u32)) -> Option<Vec<f32>> {
            None
        }
    }

    fn track_with_label(roi: BBox, label: Option<Label>) -> Track {
        let mut t = Track::spawn(Box::new(Stub(roi)), 5, 1, roi, (0, 0));
        let config = crate::config::Config::default();
        let frame = GrayImage::new(32, 32);
        t.init(&frame, None, &StubHog, &config);
        if let Some(label) = label {
            t.set_label(label);
        }
        t
    }

    #[test]
    fn unlabeled_reservoir_entry_is_still_consumed() {
        let candidate = track_with_label(BBox::new((0, 0), (10, 10)), None);
        let reservoir_entry = track_with_label(BBox::new((0, 0), (10, 10)), None);
        let mut weights = WeightSetConfig::global_default();
        weights.threshold = -1000.0; // force a match regardless of similarity
        let (labels, consumed) =
            greedy_match(&[&candidate], &[reservoir_entry], &weights);
        assert_eq!(labels, vec![None]);
        assert_eq!(consumed, vec![0]);
    }

    #[test]
    fn below_threshold_consumes_nothing() {
        let candidate = track_with_label(BBox::new((0, 0), (10, 10)), None);
        let reservoir_entry =
            track_with_label(BBox::new((500, 500), (510, 510)), Some(Label::new(1, 0)));
        let weights = WeightSetConfig::global_default();
        let (labels, consumed) =
            greedy_match(&[&candidate], &[reservoir_entry], &weights);
        assert_eq!(labels, vec![None]);
        assert!(consumed.is_empty());
    }
}
