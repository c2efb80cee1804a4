//! CRS detection heuristic

use serde_json::Value;

/// OGC identifier for WGS84 with longitude/latitude axis order
pub const WGS84_CRS_NAME: &str = "urn:ogc:def:crs:OGC:1.3:CRS84";

/// Longitude bound in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// Latitude bound in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Check if a document's coordinates are in a projected (meter-scale) CRS.
///
/// Only the first coordinate pair found in the feature list is sampled; a value
/// outside the geographic degree range means the whole document is projected.
/// Documents without any coordinate pair are treated as geographic.
pub fn needs_reprojection(document: &Value) -> bool {
    let Some(features) = document.get("features").and_then(Value::as_array) else {
        return false;
    };

    for feature in features {
        let Some(geometry) = feature.get("geometry") else {
            continue;
        };

        if let Some((x, y)) = first_coordinate(geometry) {
            return !is_geographic(x, y);
        }
    }

    false
}

/// Whether `(x, y)` lies inside the longitude/latitude degree range
pub fn is_geographic(x: f64, y: f64) -> bool {
    x.abs() <= MAX_LONGITUDE && y.abs() <= MAX_LATITUDE
}

/// Get the first coordinate pair of a geometry, digging through nested arrays.
pub fn first_coordinate(geometry: &Value) -> Option<(f64, f64)> {
    if geometry.get("type").and_then(Value::as_str) == Some("GeometryCollection") {
        return geometry
            .get("geometries")
            .and_then(Value::as_array)?
            .iter()
            .find_map(first_coordinate);
    }

    let mut current = geometry.get("coordinates")?.as_array()?;
    while let Some(Value::Array(inner)) = current.first() {
        current = inner;
    }

    match current.as_slice() {
        [x, y, ..] => Some((x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn collection(geometry: Value) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "geometry": geometry, "properties": {} }]
        })
    }

    #[test]
    fn test_wgs84_point_not_projected() {
        let doc = collection(json!({ "type": "Point", "coordinates": [110.4221, -6.9388] }));
        assert!(!needs_reprojection(&doc));
    }

    #[test]
    fn test_mercator_polygon_projected() {
        let doc = collection(json!({
            "type": "Polygon",
            "coordinates": [[[12292215.25, -772788.13], [12292300.0, -772788.13], [12292215.25, -772700.0]]]
        }));
        assert!(needs_reprojection(&doc));
    }

    #[test]
    fn test_latitude_alone_triggers() {
        let doc = collection(json!({ "type": "Point", "coordinates": [10.0, 95.0] }));
        assert!(needs_reprojection(&doc));
    }

    #[test]
    fn test_null_geometry_skipped() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": {} },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [11806028.99, -872737.11] } }
            ]
        });
        assert!(needs_reprojection(&doc));
    }

    #[test]
    fn test_only_first_pair_is_sampled() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [110.0, -7.0] } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [11806028.99, -872737.11] } }
            ]
        });
        assert!(!needs_reprojection(&doc));
    }

    #[test]
    fn test_no_coordinates_defaults_to_false() {
        assert!(!needs_reprojection(&json!({ "type": "FeatureCollection", "features": [] })));
        assert!(!needs_reprojection(&json!({ "type": "FeatureCollection" })));
        assert!(!needs_reprojection(&collection(json!({ "type": "Point", "coordinates": [] }))));
        assert!(!needs_reprojection(&json!([1, 2, 3])));
    }

    #[test]
    fn test_geometry_collection_is_searched() {
        let geometry = json!({
            "type": "GeometryCollection",
            "geometries": [
                { "type": "Point", "coordinates": [] },
                { "type": "LineString", "coordinates": [[500000.0, 300.0], [500010.0, 310.0]] }
            ]
        });
        assert_eq!(first_coordinate(&geometry), Some((500000.0, 300.0)));
    }

    #[test]
    fn test_non_numeric_pair_ignored() {
        let geometry = json!({ "type": "Point", "coordinates": ["a", "b"] });
        assert_eq!(first_coordinate(&geometry), None);
    }
}
