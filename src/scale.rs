use crate::colormap::{Rgb, GREENS, NEUTRAL, VIRIDIS};
use crate::incidents::{CountMap, GroupCount};

/// Legend tick candidates, powers of ten
pub const LEGEND_TICKS: [f64; 6] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0];

/// Scalar domain `[min, max]` feeding a colour scale and its legend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

impl ColorDomain {
    /// Map domain: `[0, log10(max count)]`, max count defaults to 1 when empty
    pub fn for_map(counts: &CountMap) -> Self {
        let max_count = counts.values().copied().max().unwrap_or(0).max(1);
        Self {
            min: 0.0,
            max: (max_count as f64).log10(),
        }
    }

    /// Bar domain: `[0, max count]`, linear, max defaults to 1 when empty
    pub fn for_bars(groups: &[GroupCount]) -> Self {
        let max_count = groups.iter().map(|g| g.count).max().unwrap_or(0).max(1);
        Self {
            min: 0.0,
            max: max_count as f64,
        }
    }

    /// Position of `v` inside the domain, clamped to `[0, 1]`.
    /// A zero-width domain maps everything to 0.
    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }

    /// Fill for a country with `count` incidents. Zero skips the log scale.
    pub fn map_color(&self, count: u32) -> Rgb {
        if count == 0 {
            return NEUTRAL;
        }
        GREENS.sample(self.normalize((count as f64).log10()))
    }

    /// Fill for a bar with `count` incidents
    pub fn bar_color(&self, count: f64) -> Rgb {
        VIRIDIS.sample(self.normalize(count))
    }
}

/// A legend tick: where it sits (0 = bottom, 1 = top) and its label
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Log-scaled legend ticks for a map domain.
///
/// Ticks are the powers of ten in [`LEGEND_TICKS`] that do not exceed
/// `10^domain.max`, placed on a log scale spanning `[1, 10^domain.max]`.
pub fn legend_ticks(domain: &ColorDomain) -> Vec<Tick> {
    let top = 10f64.powf(domain.max);
    LEGEND_TICKS
        .iter()
        // Small slack so an exact power of ten survives float rounding in powf
        .filter(|&&v| v <= top * (1.0 + 1e-9))
        .map(|&v| Tick {
            position: domain.normalize(v.log10()),
            label: format_si(v),
        })
        .collect()
}

/// Short SI formatting without trailing zeros: 1, 10, 100, 1k, 10k, 2.5M
pub fn format_si(v: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "G"), (1e6, "M"), (1e3, "k")];

    for (scale, suffix) in UNITS {
        if v.abs() >= scale {
            return format!("{}{}", trim_float(v / scale), suffix);
        }
    }
    trim_float(v)
}

fn trim_float(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
