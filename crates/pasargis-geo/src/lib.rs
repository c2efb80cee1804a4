//! Pasar GIS Geo - CRS detection and Web Mercator reprojection
//!
//! This crate works directly on decoded GeoJSON (`serde_json::Value`) so that
//! properties, foreign members, and unusual nesting survive untouched.

pub mod crs;
pub mod transform;

pub use crs::{first_coordinate, needs_reprojection, WGS84_CRS_NAME};
pub use transform::{normalize_to_wgs84, reproject_document, web_mercator_to_wgs84};
