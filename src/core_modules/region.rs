// THEORY:
// A `Region` is the only geometric currency of the engine. The detector emits
// regions for marked ink, the text extractor reads them back out of the image, and
// the reconstructor reasons about their positions to recover the calendar grid.
//
// Key architectural principles:
// 1.  **Value Type**: A region is four integers and nothing else. It is `Copy`,
//     hashable, and never refers to an image, so it can travel freely between
//     stages and across async tasks.
// 2.  **Closed Edges**: Overlap tests treat each box as the closed interval
//     `[x, x + width]` on each axis. Two boxes that merely share an edge therefore
//     "touch", which is what the merge step needs to fuse strokes of one mark.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the box spanning two inclusive pixel corners.
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// One past the rightmost pixel column.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom pixel row.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y as f64 + self.height as f64 / 2.0
    }

    /// Closed-interval overlap test on both axes; shared edges count.
    pub fn overlaps_or_touches(&self, other: &Region) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// The smallest box containing both regions.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Region {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_union_to_their_hull() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert!(a.overlaps_or_touches(&b));
        assert_eq!(a.union(&b), Region::new(0, 0, 15, 15));
    }

    #[test]
    fn shared_edge_counts_as_touching() {
        let a = Region::new(0, 0, 10, 10);
        let right_neighbour = Region::new(10, 0, 4, 4);
        let below_neighbour = Region::new(3, 10, 4, 4);
        assert!(a.overlaps_or_touches(&right_neighbour));
        assert!(a.overlaps_or_touches(&below_neighbour));
    }

    #[test]
    fn separated_boxes_do_not_touch() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(11, 0, 4, 4);
        let c = Region::new(0, 11, 4, 4);
        assert!(!a.overlaps_or_touches(&b));
        assert!(!a.overlaps_or_touches(&c));
        assert!(!b.overlaps_or_touches(&a));
    }

    #[test]
    fn corners_are_inclusive() {
        let region = Region::from_corners(4, 6, 13, 11);
        assert_eq!(region, Region::new(4, 6, 10, 6));
        assert_eq!(region.right(), 14);
        assert_eq!(region.center_y(), 9.0);
    }
}
