/// Axis-aligned integer bounding box, `((x0, y0), (x1, y1))`, pixel units in
/// the local scene frame. Invariant: `x0 <= x1` and `y0 <= y1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BBox {
    pub fn new(p0: (i32, i32), p1: (i32, i32)) -> Self {
        let bbox = Self {
            x0: p0.0,
            y0: p0.1,
            x1: p1.0,
            y1: p1.1,
        };
        debug_assert!(bbox.x0 <= bbox.x1 && bbox.y0 <= bbox.y1, "malformed bbox");
        bbox
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        (self.width() as f64) * (self.height() as f64)
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.x0 + self.x1) as f32 / 2.0,
            (self.y0 + self.y1) as f32 / 2.0,
        )
    }

    /// `true` when `other` is fully contained within `self` (used to check
    /// that a Track's initial ROI lies within its owning Scene's ROI).
    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Intersection area of two boxes (0 when disjoint).
    pub fn intersection_area(&self, other: &BBox) -> f64 {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);

        if x1 > x0 && y1 > y0 {
            ((x1 - x0) as f64) * ((y1 - y0) as f64)
        } else {
            0.0
        }
    }

    /// Intersection-over-minimum-area, `intersection / min(area_a, area_b)`.
    ///
    /// Used instead of IoU because detections are padded and sizes vary.
    /// Returns `0.0` when either box is empty.
    pub fn intersection_over_min(&self, other: &BBox) -> f32 {
        let min_area = self.area().min(other.area());
        if min_area <= 0.0 {
            return 0.0;
        }
        (self.intersection_area(other) / min_area) as f32
    }

    /// Euclidian distance between the two boxes' centers.
    pub fn center_distance(&self, other: &BBox) -> f32 {
        let (cx1, cy1) = self.center();
        let (cx2, cy2) = other.center();
        let dx = cx1 - cx2;
        let dy = cy1 - cy2;
        (dx * dx + dy * dy).sqrt()
    }

    /// Shifts the box by a world-space offset (e.g. a scene's `roi_offset`).
    pub fn translated(&self, offset: (i32, i32)) -> BBox {
        BBox::new(
            (self.x0 + offset.0, self.y0 + offset.1),
            (self.x1 + offset.0, self.y1 + offset.1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EPS;

    #[test]
    fn area_and_center() {
        let b = BBox::new((0, 0), (10, 20));
        assert_eq!(b.area(), 200.0);
        assert_eq!(b.center(), (5.0, 10.0));
    }

    #[test]
    fn contains() {
        let scene = BBox::new((0, 0), (100, 100));
        let inside = BBox::new((10, 10), (20, 20));
        let outside = BBox::new((90, 90), (110, 110));
        assert!(scene.contains(&inside));
        assert!(!scene.contains(&outside));
    }

    #[test]
    fn intersection_over_min_full_overlap() {
        let a = BBox::new((0, 0), (10, 10));
        let b = BBox::new((0, 0), (5, 5));
        // b fully inside a: intersection == area(b), min == area(b) -> 1.0
        assert!((a.intersection_over_min(&b) - 1.0).abs() < EPS);
    }

    #[test]
    fn intersection_over_min_disjoint() {
        let a = BBox::new((0, 0), (10, 10));
        let b = BBox::new((20, 20), (30, 30));
        assert_eq!(a.intersection_over_min(&b), 0.0);
    }

    #[test]
    fn center_distance() {
        let a = BBox::new((0, 0), (10, 10));
        let b = BBox::new((10, 0), (20, 10));
        assert!((a.center_distance(&b) - 10.0).abs() < EPS);
    }

    #[test]
    fn idempotent_under_translation() {
        let a = BBox::new((0, 0), (10, 10));
        let b = a.translated((5, 5));
        assert_eq!(b, BBox::new((5, 5), (15, 15)));
    }
}
