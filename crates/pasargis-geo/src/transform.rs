//! Web Mercator (EPSG:3857) to WGS84 (EPSG:4326) reprojection

use serde_json::{json, Number, Value};
use std::f64::consts::PI;

use crate::crs::{needs_reprojection, WGS84_CRS_NAME};

/// Half the Web Mercator world width in meters
pub const WEB_MERCATOR_EXTENT: f64 = 20037508.342789244;

const DECIMAL_PLACES: f64 = 1e8;

/// Inverse Web Mercator projection, rounded to 8 decimal places.
///
/// Input: (x, y) in meters. Output: (longitude, latitude) in degrees.
pub fn web_mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WEB_MERCATOR_EXTENT) * 180.0;
    let lat = (y / WEB_MERCATOR_EXTENT) * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);

    (round8(lon), round8(lat))
}

fn round8(value: f64) -> f64 {
    (value * DECIMAL_PLACES).round() / DECIMAL_PLACES
}

/// Reproject every feature geometry of a FeatureCollection in place and stamp
/// the WGS84 CRS on the document.
pub fn reproject_document(document: &mut Value) {
    if let Some(features) = document.get_mut("features").and_then(Value::as_array_mut) {
        for feature in features {
            if let Some(geometry) = feature.get_mut("geometry") {
                reproject_geometry(geometry);
            }
        }
    }

    if let Some(object) = document.as_object_mut() {
        object.insert(
            "crs".to_string(),
            json!({
                "type": "name",
                "properties": { "name": WGS84_CRS_NAME }
            }),
        );
    }
}

/// Reproject a single geometry object in place, whatever its type
pub fn reproject_geometry(geometry: &mut Value) {
    if let Some(coordinates) = geometry.get_mut("coordinates") {
        reproject_coordinates(coordinates);
    }

    if let Some(members) = geometry.get_mut("geometries").and_then(Value::as_array_mut) {
        for member in members {
            reproject_geometry(member);
        }
    }
}

/// Recursively reproject a coordinate tree.
///
/// An array whose first two elements are numbers is a position; any other
/// array is a nesting level. Non-array values are left as they are.
pub fn reproject_coordinates(node: &mut Value) {
    let Value::Array(items) = node else {
        return;
    };

    if let Some(position) = reproject_position(items) {
        *node = Value::Array(position);
        return;
    }

    for item in items.iter_mut() {
        reproject_coordinates(item);
    }
}

fn reproject_position(items: &[Value]) -> Option<Vec<Value>> {
    let x = items.first()?.as_f64()?;
    let y = items.get(1)?.as_f64()?;

    let (lon, lat) = web_mercator_to_wgs84(x, y);
    let mut position = vec![
        Value::Number(Number::from_f64(lon)?),
        Value::Number(Number::from_f64(lat)?),
    ];

    // Elevation is carried over verbatim
    if let Some(z) = items.get(2).filter(|z| z.is_number()) {
        position.push(z.clone());
    }

    Some(position)
}

/// Reproject the document if the CRS heuristic flags it as projected.
///
/// Returns whether a reprojection took place.
pub fn normalize_to_wgs84(document: &mut Value) -> bool {
    if !needs_reprojection(document) {
        return false;
    }

    reproject_document(document);
    tracing::debug!(crs = WGS84_CRS_NAME, "Reprojected document from EPSG:3857");
    true
}
