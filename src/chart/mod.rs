//! Rendered state of the two charts, updated through keyed diffs.

mod bars;
mod choropleth;

pub use bars::{band_height, Bar, BarChartState};
pub use choropleth::ChoroplethState;
