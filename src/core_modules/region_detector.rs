// THEORY:
// The `RegionDetector` is the spatial grouping layer of the engine. It turns a raw
// RGBA photograph into a short list of bounding boxes, one per hand-drawn mark,
// with no knowledge of calendars or text.
//
// Key architectural principles & algorithm steps:
// 1.  **Coarse Seeding**: Every pixel of every 2nd row (by default) is checked for
//     marked, unvisited ink. A connected component has ink on each row its box
//     spans, and the row stride never exceeds the minimum region height, so a
//     component tall enough to survive filtering always crosses a scanned row.
// 2.  **Flood Fill**: Each seed is grown into its full 4-connected component at full
//     resolution. The fill runs on an explicit stack rather than recursion, so a
//     large blob of ink cannot exhaust the call stack. A `visited` grid guarantees
//     each pixel joins at most one component.
// 3.  **Noise Filtering**: Components whose bounding box is narrower or shorter than
//     the configured minimum are discarded as specks.
// 4.  **Fixed-Point Merging**: A pen circle is rarely one connected stroke. Boxes
//     that overlap or touch are fused into their union, and the merge loop repeats
//     full passes until one completes without a merge, since a fused box can reach
//     a third box that neither part touched.
// 5.  **Stateless Utility**: Detection is a pure function of the buffer, the
//     predicate and the thresholds. It has no memory between calls.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region::Region;

pub mod region_detector {
    use super::*;
    use log::debug;

    /// Row stride of the seed scan when the caller has no preference.
    pub const DEFAULT_SCAN_STRIDE: u32 = 2;

    /// Finds every marked region in `buffer` and merges touching boxes.
    pub fn detect<F>(
        buffer: &PixelBuffer<'_>,
        is_marked: F,
        min_width: u32,
        min_height: u32,
    ) -> Vec<Region>
    where
        F: Fn(u8, u8, u8) -> bool,
    {
        detect_with_stride(buffer, is_marked, min_width, min_height, DEFAULT_SCAN_STRIDE)
    }

    /// `detect` with an explicit seed-scan stride.
    pub fn detect_with_stride<F>(
        buffer: &PixelBuffer<'_>,
        is_marked: F,
        min_width: u32,
        min_height: u32,
        stride: u32,
    ) -> Vec<Region>
    where
        F: Fn(u8, u8, u8) -> bool,
    {
        if buffer.is_empty() {
            return Vec::new();
        }

        let width = buffer.width();
        let height = buffer.height();
        let stride = stride.min(min_height).max(1) as usize;

        let mut visited = vec![false; width as usize * height as usize];
        let mut components: Vec<Region> = Vec::new();
        let mut discarded = 0usize;

        for y in (0..height).step_by(stride) {
            for x in 0..width {
                if visited[y as usize * width as usize + x as usize] {
                    continue;
                }
                let (red, green, blue) = buffer.rgb(x, y);
                if !is_marked(red, green, blue) {
                    continue;
                }

                let component = flood_fill(buffer, &is_marked, &mut visited, x, y);
                if component.width >= min_width && component.height >= min_height {
                    components.push(component);
                } else {
                    discarded += 1;
                }
            }
        }

        debug!(
            "region detector found {} components ({} discarded as noise)",
            components.len(),
            discarded
        );

        merge_regions(components)
    }

    /// Grows the 4-connected component containing `(seed_x, seed_y)` and returns its box.
    fn flood_fill<F>(
        buffer: &PixelBuffer<'_>,
        is_marked: &F,
        visited: &mut [bool],
        seed_x: u32,
        seed_y: u32,
    ) -> Region
    where
        F: Fn(u8, u8, u8) -> bool,
    {
        let width = buffer.width();
        let height = buffer.height();

        let mut min_x = seed_x;
        let mut min_y = seed_y;
        let mut max_x = seed_x;
        let mut max_y = seed_y;

        let mut stack: Vec<(u32, u32)> = vec![(seed_x, seed_y)];
        visited[seed_y as usize * width as usize + seed_x as usize] = true;

        while let Some((x, y)) = stack.pop() {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            // Check all 4 direct neighbors (not diagonals).
            for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }

                let (nx, ny) = (nx as u32, ny as u32);
                let index = ny as usize * width as usize + nx as usize;
                if visited[index] {
                    continue;
                }
                let (red, green, blue) = buffer.rgb(nx, ny);
                if is_marked(red, green, blue) {
                    visited[index] = true;
                    stack.push((nx, ny));
                }
            }
        }

        Region::from_corners(min_x, min_y, max_x, max_y)
    }

    /// Fuses overlapping or touching regions until no pair overlaps.
    /// The result is sorted top-to-bottom, then left-to-right.
    pub fn merge_regions(mut regions: Vec<Region>) -> Vec<Region> {
        loop {
            let mut merged = false;

            let mut i = 0;
            while i < regions.len() {
                let mut j = i + 1;
                while j < regions.len() {
                    if regions[i].overlaps_or_touches(&regions[j]) {
                        let absorbed = regions.swap_remove(j);
                        regions[i] = regions[i].union(&absorbed);
                        merged = true;
                        // The grown box may now reach partners already passed over.
                        j = i + 1;
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }

            if !merged {
                break;
            }
        }

        regions.sort_by_key(|region| (region.y, region.x));
        regions
    }
}
