use crate::colormap::{lerp_rgb, Rgb, NEUTRAL};
use crate::diff::{diff_keys, KeyedDiff};
use crate::incidents::CountMap;
use crate::map::World;
use crate::scale::ColorDomain;
use crate::transition::Tween;

/// A country fill moving between two colours
#[derive(Clone, Copy, Debug)]
struct FillTween {
    from: Rgb,
    to: Rgb,
    start_frame: u64,
}

impl FillTween {
    fn settled(color: Rgb) -> Self {
        Self {
            from: color,
            to: color,
            start_frame: 0,
        }
    }

    fn color(&self, frame: u64) -> Rgb {
        if self.from == self.to {
            return self.to;
        }
        let t = Tween::new(0.0, 1.0, self.start_frame).progress(frame);
        lerp_rgb(self.from, self.to, t)
    }

    fn retarget(&mut self, to: Rgb, frame: u64) {
        self.from = self.color(frame);
        self.to = to;
        self.start_frame = frame;
    }

    fn is_done(&self, frame: u64) -> bool {
        self.from == self.to || Tween::new(0.0, 1.0, self.start_frame).is_done(frame)
    }
}

/// What the map currently shows: one fill per world feature plus the
/// aggregate and domain it was painted from
pub struct ChoroplethState {
    fills: Vec<FillTween>,
    counts: CountMap,
    domain: ColorDomain,
    /// Countries painted with a non-zero count, sorted
    painted: Vec<String>,
}

impl ChoroplethState {
    /// All `features` start with the neutral fill
    pub fn new(features: usize) -> Self {
        Self {
            fills: vec![FillTween::settled(NEUTRAL); features],
            counts: CountMap::new(),
            domain: ColorDomain::for_map(&CountMap::new()),
            painted: Vec::new(),
        }
    }

    /// Paint a new country aggregate.
    ///
    /// Countries entering or staying get their new scale colour, countries
    /// leaving fade back to neutral, the rest are untouched.
    pub fn apply(&mut self, world: &World, counts: CountMap, frame: u64) -> KeyedDiff<String> {
        let domain = ColorDomain::for_map(&counts);

        let mut next: Vec<String> = counts
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(k, _)| k.clone())
            .collect();
        next.sort();

        let diff = diff_keys(&self.painted, &next);

        for name in diff.enter.iter().chain(&diff.update) {
            let color = domain.map_color(counts.get(name).copied().unwrap_or(0));
            self.retarget(world, name, color, frame);
        }
        for name in &diff.exit {
            self.retarget(world, name, NEUTRAL, frame);
        }

        self.painted = next;
        self.counts = counts;
        self.domain = domain;
        diff
    }

    fn retarget(&mut self, world: &World, name: &str, color: Rgb, frame: u64) {
        for &idx in world.indices_of(name) {
            if let Some(fill) = self.fills.get_mut(idx) {
                fill.retarget(color, frame);
            }
        }
    }

    /// Fill of feature `idx` at `frame`
    pub fn color(&self, idx: usize, frame: u64) -> Rgb {
        self.fills.get(idx).map(|f| f.color(frame)).unwrap_or(NEUTRAL)
    }

    /// Incidents for a country; a lookup miss counts as zero
    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn domain(&self) -> ColorDomain {
        self.domain
    }

    pub fn total(&self) -> u64 {
        self.counts.values().map(|&n| n as u64).sum()
    }

    pub fn is_animating(&self, frame: u64) -> bool {
        self.fills.iter().any(|f| !f.is_done(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::GREENS;
    use crate::map::box_country;
    use crate::transition::TRANSITION_FRAMES;

    fn world() -> World {
        World::new(vec![
            box_country("Iraq", (39.0, 29.0), (48.0, 37.0)),
            box_country("Syria", (35.0, 32.0), (39.0, 37.0)),
            box_country("Peru", (-81.0, -18.0), (-69.0, 0.0)),
        ])
    }

    fn counts(pairs: &[(&str, u32)]) -> CountMap {
        pairs.iter().map(|(k, n)| (k.to_string(), *n)).collect()
    }

    #[test]
    fn test_first_paint_enters_and_settles() {
        let w = world();
        let mut state = ChoroplethState::new(w.len());
        let diff = state.apply(&w, counts(&[("Iraq", 100), ("Syria", 10)]), 0);

        assert_eq!(diff.enter, vec!["Iraq".to_string(), "Syria".to_string()]);
        assert!(state.is_animating(1));

        let done = TRANSITION_FRAMES;
        assert!(!state.is_animating(done));
        assert_eq!(state.color(0, done), GREENS.sample(1.0));
        assert_eq!(state.color(1, done), GREENS.sample(0.5));
        assert_eq!(state.color(2, done), NEUTRAL);
        assert_eq!(state.count("Peru"), 0);
        assert_eq!(state.total(), 110);
    }

    #[test]
    fn test_exit_fades_to_neutral() {
        let w = world();
        let mut state = ChoroplethState::new(w.len());
        state.apply(&w, counts(&[("Iraq", 5), ("Syria", 3)]), 0);

        let diff = state.apply(&w, counts(&[("Iraq", 1)]), 100);
        assert_eq!(diff.exit, vec!["Syria".to_string()]);
        assert_eq!(diff.update, vec!["Iraq".to_string()]);

        let end = 100 + TRANSITION_FRAMES;
        assert_eq!(state.color(1, end), NEUTRAL);
        // Single incident sits at the bottom of a zero-width log domain
        assert_eq!(state.color(0, end), GREENS.sample(0.0));
    }

    #[test]
    fn test_unmatched_names_are_ignored() {
        let w = world();
        let mut state = ChoroplethState::new(w.len());
        state.apply(&w, counts(&[("Atlantis", 50)]), 0);
        assert!(!state.is_animating(1));
        assert_eq!(state.count("Atlantis"), 50);
        assert!((state.domain().max - 50f64.log10()).abs() < 1e-12);
    }
}
