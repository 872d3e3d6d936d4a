use crate::colormap::Rgb;
use crate::diff::{diff_keys, KeyedDiff};
use crate::incidents::GroupCount;
use crate::scale::ColorDomain;
use crate::transition::Tween;
use std::collections::HashMap;

/// One bar on screen
#[derive(Clone, Debug)]
pub struct Bar {
    pub group: String,
    pub count: u32,
    /// Length as a fraction of the full bar width
    pub length: Tween,
}

impl Bar {
    /// Value label drawn past the end of the bar
    pub fn label(&self) -> String {
        format!("{}: {}", self.group, self.count)
    }
}

/// Rows per bar band when `n` bars share `height` rows (at least one)
pub fn band_height(n: usize, height: u16) -> u16 {
    if n == 0 {
        return 0;
    }
    (height as usize / n).max(1) as u16
}

/// Rows a bar fills inside its band; bands of 3+ rows keep one row of padding
fn bar_thickness(band: u16) -> u16 {
    if band >= 3 {
        band - 1
    } else {
        band
    }
}

/// The ranked bars currently drawn, in rank order (largest first)
#[derive(Default)]
pub struct BarChartState {
    bars: Vec<Bar>,
    domain: Option<ColorDomain>,
}

impl BarChartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join a new group aggregate against the bars on screen.
    ///
    /// Exiting bars are removed at once, updated bars grow or shrink from
    /// their displayed length, entering bars grow from zero.
    pub fn apply(&mut self, groups: Vec<GroupCount>, frame: u64) -> KeyedDiff<String> {
        let domain = ColorDomain::for_bars(&groups);
        let previous: Vec<String> = self.bars.iter().map(|b| b.group.clone()).collect();
        let next: Vec<String> = groups.iter().map(|g| g.group.clone()).collect();
        let diff = diff_keys(&previous, &next);

        let mut current: HashMap<String, Bar> =
            self.bars.drain(..).map(|b| (b.group.clone(), b)).collect();
        for key in &diff.exit {
            current.remove(key);
        }

        self.bars = groups
            .into_iter()
            .map(|g| {
                let target = domain.normalize(g.count as f64);
                match current.remove(&g.group) {
                    Some(mut bar) => {
                        bar.length.retarget(target, frame);
                        bar.count = g.count;
                        bar
                    }
                    None => Bar {
                        group: g.group,
                        count: g.count,
                        length: Tween::new(0.0, target, frame),
                    },
                }
            })
            .collect();
        self.domain = Some(domain);
        diff
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Linear domain of the last applied aggregate
    pub fn domain(&self) -> ColorDomain {
        self.domain.unwrap_or(ColorDomain { min: 0.0, max: 1.0 })
    }

    pub fn color(&self, bar: &Bar) -> Rgb {
        self.domain().bar_color(bar.count as f64)
    }

    /// Bar drawn at `row` (relative to the plot top) for a plot `height` rows tall
    pub fn bar_at(&self, row: u16, height: u16) -> Option<usize> {
        let band = band_height(self.bars.len(), height);
        if band == 0 || row >= height {
            return None;
        }
        let idx = (row / band) as usize;
        (idx < self.bars.len() && row % band < bar_thickness(band)).then_some(idx)
    }

    /// First row and thickness of bar `idx`, if it fits in `height`
    pub fn bar_rows(&self, idx: usize, height: u16) -> Option<(u16, u16)> {
        let band = band_height(self.bars.len(), height);
        let top = band as usize * idx;
        if band == 0 || idx >= self.bars.len() || top >= height as usize {
            return None;
        }
        Some((top as u16, bar_thickness(band)))
    }

    pub fn is_animating(&self, frame: u64) -> bool {
        self.bars.iter().any(|b| !b.length.is_done(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::TRANSITION_FRAMES;

    fn groups(pairs: &[(&str, u32)]) -> Vec<GroupCount> {
        pairs
            .iter()
            .map(|(g, n)| GroupCount {
                group: g.to_string(),
                count: *n,
            })
            .collect()
    }

    #[test]
    fn test_enter_grows_from_zero() {
        let mut chart = BarChartState::new();
        let diff = chart.apply(groups(&[("ISIL", 40), ("Taliban", 10)]), 0);
        assert_eq!(diff.enter.len(), 2);

        let bars = chart.bars();
        assert_eq!(bars[0].length.value(0), 0.0);
        assert_eq!(bars[0].length.value(TRANSITION_FRAMES), 1.0);
        assert_eq!(bars[1].length.value(TRANSITION_FRAMES), 0.25);
        assert_eq!(bars[0].label(), "ISIL: 40");
    }

    #[test]
    fn test_update_and_exit() {
        let mut chart = BarChartState::new();
        chart.apply(groups(&[("ISIL", 40), ("Taliban", 10)]), 0);

        let diff = chart.apply(groups(&[("Taliban", 20), ("Al-Shabaab", 5)]), 100);
        assert_eq!(diff.exit, vec!["ISIL".to_string()]);
        assert_eq!(diff.update, vec!["Taliban".to_string()]);
        assert_eq!(diff.enter, vec!["Al-Shabaab".to_string()]);

        let bars = chart.bars();
        assert_eq!(bars.len(), 2);
        // Taliban was at 0.25 and now spans the whole domain
        assert_eq!(bars[0].length.value(100), 0.25);
        assert_eq!(bars[0].length.value(100 + TRANSITION_FRAMES), 1.0);
        assert_eq!(bars[0].count, 20);
        assert_eq!(bars[1].length.value(100), 0.0);
        assert!(chart.is_animating(110));
        assert!(!chart.is_animating(100 + TRANSITION_FRAMES));
    }

    #[test]
    fn test_empty_aggregate_clears() {
        let mut chart = BarChartState::new();
        chart.apply(groups(&[("ISIL", 4)]), 0);
        let diff = chart.apply(Vec::new(), 50);
        assert_eq!(diff.exit.len(), 1);
        assert!(chart.is_empty());
        assert_eq!(chart.domain().max, 1.0);
    }

    #[test]
    fn test_bar_hit_testing() {
        let mut chart = BarChartState::new();
        chart.apply(groups(&[("a", 3), ("b", 2), ("c", 1)]), 0);

        // 9 rows / 3 bars -> bands of 3 with one padding row
        assert_eq!(chart.bar_at(0, 9), Some(0));
        assert_eq!(chart.bar_at(1, 9), Some(0));
        assert_eq!(chart.bar_at(2, 9), None);
        assert_eq!(chart.bar_at(3, 9), Some(1));
        assert_eq!(chart.bar_at(8, 9), None);
        assert_eq!(chart.bar_at(9, 9), None);
        assert_eq!(chart.bar_rows(2, 9), Some((6, 2)));

        // Too short: one row per bar, overflow is not drawn
        assert_eq!(chart.bar_at(1, 2), Some(1));
        assert_eq!(chart.bar_rows(2, 2), None);
    }
}
