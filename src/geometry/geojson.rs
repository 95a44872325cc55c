//! GeoJSON zone loading
//!
//! Reads a FeatureCollection and turns each feature into a labelled
//! `Polygon`. Coordinates are taken as-is; they must already be in the
//! raster's coordinate reference system. Features with a broken geometry
//! become placeholder zones so the output table keeps one row per zone,
//! while a feature without the label property aborts the run.

use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::errors::{ZonalError, ZonalResult};
use crate::geometry::{Polygon, PolygonGeometry, PolygonPart, Ring};

/// Loads zones from a GeoJSON FeatureCollection
///
/// # Arguments
/// * `path` - GeoJSON file
/// * `label_field` - Feature property to use as the zone label
pub fn load_polygons(path: &Path, label_field: &str) -> ZonalResult<Vec<Polygon>> {
    let text = fs::read_to_string(path)
        .map_err(|_| ZonalError::InputNotFound(path.display().to_string()))?;
    let root: Value = serde_json::from_str(&text)
        .map_err(|e| ZonalError::GeometryError(format!("Invalid GeoJSON: {}", e)))?;

    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ZonalError::GeometryError("Expected a FeatureCollection with features".to_string())
        })?;

    let mut polygons = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let label = feature_label(feature, label_field, index)?;

        let geometry = match parse_geometry(feature.get("geometry")) {
            Ok(geom) => Some(geom),
            Err(e) => {
                warn!("Zone '{}' has unusable geometry: {}", label, e);
                None
            }
        };

        polygons.push(Polygon { label, geometry });
    }

    info!("Loaded {} zones from {}", polygons.len(), path.display());
    Ok(polygons)
}

/// Resolves the label property, stringifying numeric values
fn feature_label(feature: &Value, label_field: &str, index: usize) -> ZonalResult<String> {
    let value = feature
        .get("properties")
        .and_then(|p| p.get(label_field))
        .ok_or_else(|| {
            ZonalError::GeometryError(format!(
                "Feature {} is missing the label property '{}'",
                index, label_field
            ))
        })?;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ZonalError::GeometryError(format!(
            "Label property '{}' of feature {} has unsupported type: {}",
            label_field, index, other
        ))),
    }
}

fn parse_geometry(geometry: Option<&Value>) -> ZonalResult<PolygonGeometry> {
    let geometry = geometry
        .filter(|g| !g.is_null())
        .ok_or_else(|| ZonalError::GeometryError("null geometry".to_string()))?;

    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ZonalError::GeometryError("geometry without type".to_string()))?;
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| ZonalError::GeometryError("geometry without coordinates".to_string()))?;

    let parts = match kind {
        "Polygon" => vec![parse_part(coordinates)?],
        "MultiPolygon" => {
            let outer = coordinates
                .as_array()
                .ok_or_else(|| ZonalError::GeometryError("MultiPolygon coordinates must be an array".to_string()))?;
            outer.iter().map(parse_part).collect::<ZonalResult<Vec<_>>>()?
        }
        other => {
            return Err(ZonalError::GeometryError(format!(
                "unsupported geometry type '{}'",
                other
            )))
        }
    };

    if parts.is_empty() || parts.iter().all(|p| p.exterior.len() < 3) {
        return Err(ZonalError::GeometryError("geometry has no usable ring".to_string()));
    }

    Ok(PolygonGeometry { parts })
}

/// One Polygon coordinate block: first ring exterior, rest holes
fn parse_part(coordinates: &Value) -> ZonalResult<PolygonPart> {
    let rings = coordinates
        .as_array()
        .ok_or_else(|| ZonalError::GeometryError("Polygon coordinates must be an array".to_string()))?;

    let mut parsed: Vec<Ring> = Vec::with_capacity(rings.len());
    for ring in rings {
        parsed.push(parse_ring(ring)?);
    }

    let mut iter = parsed.into_iter();
    let exterior = iter
        .next()
        .ok_or_else(|| ZonalError::GeometryError("Polygon part without rings".to_string()))?;

    Ok(PolygonPart {
        exterior,
        holes: iter.collect(),
    })
}

fn parse_ring(ring: &Value) -> ZonalResult<Ring> {
    let positions = ring
        .as_array()
        .ok_or_else(|| ZonalError::GeometryError("ring must be an array".to_string()))?;

    let mut out = Ring::with_capacity(positions.len());
    for position in positions {
        let coords = position
            .as_array()
            .ok_or_else(|| ZonalError::GeometryError("position must be an array".to_string()))?;
        if coords.len() < 2 {
            return Err(ZonalError::GeometryError("position needs x and y".to_string()));
        }
        let x = coords[0]
            .as_f64()
            .ok_or_else(|| ZonalError::GeometryError("non-numeric coordinate".to_string()))?;
        let y = coords[1]
            .as_f64()
            .ok_or_else(|| ZonalError::GeometryError("non-numeric coordinate".to_string()))?;
        out.push((x, y));
    }

    Ok(out)
}
