/// Chart description consumed by surfaces.
pub mod chart;
/// Colors and the per-entity palette.
pub mod color;
/// Linear scales and tick generation.
pub mod scale;
/// Surface trait and the recording surface.
pub mod surface;
/// SVG surface and PNG rasterization.
pub mod svg;
