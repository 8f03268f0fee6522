mod geometry;
mod projection;
mod renderer;

pub use projection::MapView;
pub use renderer::{MapLayers, MapRenderer};
