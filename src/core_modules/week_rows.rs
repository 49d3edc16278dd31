use crate::core_modules::event_text::has_day;
use crate::core_modules::fragment::{RecognizedFragment, ROW_TOLERANCE};
use log::debug;

/// A month grid never spans more than six weeks.
pub const MAX_WEEK_ROWS: usize = 6;

/// Vertical centers of the calendar's week rows, top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekRows {
    centers: Vec<f64>,
}

impl WeekRows {
    /// Clusters the Y-centers of every fragment carrying a day number.
    ///
    /// A center joins the current cluster while it lies within `ROW_TOLERANCE` of
    /// that cluster's running mean. Extra rows above the sixth-from-bottom are
    /// headers or noise and are dropped.
    pub fn infer(fragments: &[RecognizedFragment]) -> Self {
        let mut ys: Vec<f64> = fragments
            .iter()
            .filter(|fragment| has_day(&fragment.text))
            .map(|fragment| fragment.region.center_y())
            .collect();
        ys.sort_by(f64::total_cmp);

        let mut clusters: Vec<(f64, usize)> = Vec::new();
        for y in ys {
            match clusters.last_mut() {
                Some((sum, count)) if (y - *sum / *count as f64).abs() < ROW_TOLERANCE as f64 => {
                    *sum += y;
                    *count += 1;
                }
                _ => clusters.push((y, 1)),
            }
        }

        let mut centers: Vec<f64> = clusters
            .into_iter()
            .map(|(sum, count)| sum / count as f64)
            .collect();
        if centers.len() > MAX_WEEK_ROWS {
            let excess = centers.len() - MAX_WEEK_ROWS;
            debug!("dropping {excess} leading rows above the month grid");
            centers.drain(..excess);
        }

        Self { centers }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Zero-based index of the row nearest to the fragment's center. 0 when no rows exist.
    pub fn week_index(&self, fragment: &RecognizedFragment) -> usize {
        let y = fragment.region.center_y();
        self.centers
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - y).abs().total_cmp(&(*b - y).abs()))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::region::Region;

    fn cell(text: &str, x: u32, y: u32) -> RecognizedFragment {
        RecognizedFragment::new(text, Region::new(x, y, 60, 30), 0.9)
    }

    #[test]
    fn rows_cluster_with_jitter() {
        let fragments = vec![
            cell("1", 40, 100),
            cell("2", 200, 108),
            cell("9", 40, 210),
            cell("10 Gym", 200, 204),
        ];
        let rows = WeekRows::infer(&fragments);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.centers(), &[119.0, 222.0]);
        assert_eq!(rows.week_index(&fragments[1]), 0);
        assert_eq!(rows.week_index(&fragments[3]), 1);
    }

    #[test]
    fn fragments_without_day_numbers_do_not_form_rows() {
        let fragments = vec![cell("Dentist", 40, 20), cell("4", 40, 300)];
        let rows = WeekRows::infer(&fragments);
        assert_eq!(rows.len(), 1);
        // A title snaps to the nearest row anyway.
        assert_eq!(rows.week_index(&fragments[0]), 0);
    }

    #[test]
    fn leading_excess_rows_are_dropped() {
        // A "2024" header plus a title row holding a stray number above six week rows.
        let mut fragments = vec![cell("2024 March", 40, 0), cell("Due 3", 40, 60)];
        for week in 0..6 {
            fragments.push(cell("5", 40, 200 + week * 110));
        }
        let rows = WeekRows::infer(&fragments);
        assert_eq!(rows.len(), MAX_WEEK_ROWS);
        assert_eq!(rows.week_index(&fragments[2]), 0);
        assert_eq!(rows.week_index(&fragments[7]), 5);
        // The title row now snaps to the first week.
        assert_eq!(rows.week_index(&fragments[1]), 0);
    }

    #[test]
    fn no_rows_means_week_zero() {
        let rows = WeekRows::infer(&[]);
        assert!(rows.is_empty());
        assert_eq!(rows.week_index(&cell("12", 0, 900)), 0);
    }
}
