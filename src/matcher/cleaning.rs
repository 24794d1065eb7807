use crate::config::OverlapFilterConfig;
use crate::track::{Label, Track};

/// Drops duplicate detections among the world's incoming `new` tracks
/// before they're offered to the dead/out-of-scene reservoirs. Two tracks
/// whose world-space ROIs overlap past `iom` or whose centers sit within
/// `cd` pixels are treated as the same physical object; the one with fewer
/// accumulated samples is dropped.
pub fn pre_clean(tracks: &mut Vec<Track>, overlap: &OverlapFilterConfig) {
    tracks.sort_by(|a, b| b.samples().cmp(&a.samples()));

    let mut kept: Vec<usize> = Vec::new();
    'candidates: for i in 0..tracks.len() {
        for &k in &kept {
            let a = tracks[i].world_roi();
            let b = tracks[k].world_roi();
            if a.intersection_over_min(&b) >= overlap.iom || a.center_distance(&b) <= overlap.cd {
                continue 'candidates;
            }
        }
        kept.push(i);
    }

    let mut idx = 0;
    tracks.retain(|_| {
        let keep = kept.contains(&idx);
        idx += 1;
        keep
    });
}

/// Applies the assignment computed by
/// [greedy_match](super::greedy::greedy_match): matched tracks inherit
/// their reservoir label, unmatched ones are minted a fresh one.
pub fn post_clean(
    tracks: &mut [&mut Track],
    labels: &[Option<Label>],
    next_id: &mut u64,
    frame_count: u64,
) {
    for (track, label) in tracks.iter_mut().zip(labels.iter()) {
        let label = label.unwrap_or_else(|| {
            let label = Label::new(*next_id, frame_count);
            *next_id += 1;
            label
        });
        track.set_label(label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{Frame, HogDescriptor, ShortTermTracker};
    use crate::geometry::BBox;
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

    fn track(roi: BBox) -> Track {
        let mut t = Track::spawn(Box::new(Stub(roi)), 5, 1, roi, (0, 0));
        let config = crate::config::Config::default();
        let frame = GrayImage::new(32, 32);
        t.init(&frame, None, &StubHog, &config);
        t
    }

    #[test]
    fn overlapping_duplicates_are_dropped() {
        let mut tracks = vec![
            track(BBox::new((0, 0), (20, 20))),
            track(BBox::new((2, 2), (22, 22))),
        ];
        let overlap = OverlapFilterConfig::default();
        pre_clean(&mut tracks, &overlap);
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn disjoint_tracks_all_survive() {
        let mut tracks = vec![
            track(BBox::new((0, 0), (10, 10))),
            track(BBox::new((500, 500), (510, 510))),
        ];
        let overlap = OverlapFilterConfig::default();
        pre_clean(&mut tracks, &overlap);
        assert_eq!(tracks.len(), 2);
    }

    #[test]
    fn unmatched_tracks_get_fresh_labels() {
        let mut tracks = vec![track(BBox::new((0, 0), (10, 10)))];
        let mut next_id = 5;
        let mut refs: Vec<&mut Track> = tracks.iter_mut().collect();
        post_clean(&mut refs, &[None], &mut next_id, 42);
        assert_eq!(tracks[0].label(), Some(Label::new(5, 42)));
        assert_eq!(next_id, 6);
    }

    #[test]
    fn matched_tracks_inherit_label() {
        let mut tracks = vec![track(BBox::new((0, 0), (10, 10)))];
        let mut next_id = 5;
        let mut refs: Vec<&mut Track> = tracks.iter_mut().collect();
        post_clean(&mut refs, &[Some(Label::new(1, 0))], &mut next_id, 42);
        assert_eq!(tracks[0].label(), Some(Label::new(1, 0)));
        assert_eq!(next_id, 5);
    }
}
