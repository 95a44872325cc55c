//! Zonal extraction
//!
//! Masks a decoded grid with a polygon and reduces the covered pixels to
//! per-band means. The pixel window is narrowed to the polygon's bounding
//! box first so large scenes with small zones stay cheap.

pub mod mask;
pub mod region;

pub use mask::polygon_band_means;
pub use region::Region;
