/// Axis-aligned integer bounding box and the geometric predicates the
/// tracker needs (area, center, containment, IoM, center distance).
pub mod bbox;

pub use bbox::BBox;
