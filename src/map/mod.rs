mod geometry;
mod polygon;
mod projection;
mod renderer;
mod spatial;
mod world;

pub use polygon::{Bounds, Country, Polygon, Ring};
pub use projection::Viewport;
pub use renderer::{fill_cells, DisplaySettings, MapLayers, MapRenderer};
pub use world::{box_country, World};
