//! Polygon zones
//!
//! Labelled polygons in the raster's coordinate reference system, with
//! the point-in-polygon test the masking step is built on. Multi-part
//! polygons and interior rings are supported; a pixel counts when its
//! center lies inside any exterior ring and outside that part's holes.

pub mod geojson;

use crate::errors::{ZonalError, ZonalResult};

pub use geojson::load_polygons;

/// A linear ring: closed sequence of (x, y) vertices
pub type Ring = Vec<(f64, f64)>;

/// One polygon part: an exterior ring plus zero or more holes
#[derive(Debug, Clone)]
pub struct PolygonPart {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

/// Polygon or multipolygon geometry
#[derive(Debug, Clone)]
pub struct PolygonGeometry {
    pub parts: Vec<PolygonPart>,
}

impl PolygonGeometry {
    /// Even-odd point-in-polygon test across all parts and holes
    pub fn contains(&self, x: f64, y: f64) -> bool {
        for part in &self.parts {
            if ring_contains(&part.exterior, x, y)
                && !part.holes.iter().any(|hole| ring_contains(hole, x, y))
            {
                return true;
            }
        }
        false
    }

    /// Axis-aligned bounds over every ring: (min_x, min_y, max_x, max_y)
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for part in &self.parts {
            for &(x, y) in &part.exterior {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }

        (min_x, min_y, max_x, max_y)
    }
}

/// A zone to aggregate over: label plus geometry
///
/// The geometry is `None` when the source feature was malformed. Such
/// zones still produce output rows so the table stays rectangular.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub label: String,
    pub geometry: Option<PolygonGeometry>,
}

impl Polygon {
    /// Geometry of a well-formed zone
    ///
    /// # Returns
    /// `GeometryError` naming the zone when the geometry is missing
    pub fn require_geometry(&self) -> ZonalResult<&PolygonGeometry> {
        self.geometry.as_ref().ok_or_else(|| {
            ZonalError::GeometryError(format!("Zone '{}' has no usable geometry", self.label))
        })
    }
}

/// Ray casting with even-odd rule against a single ring
fn ring_contains(ring: &Ring, x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
