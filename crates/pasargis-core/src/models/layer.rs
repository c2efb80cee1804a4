use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IngestError, Result};

/// Unique identifier for a GIS layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry family a layer is drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Polygon,
    Point,
    Line,
}

impl FromStr for LayerType {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "polygon" => Ok(LayerType::Polygon),
            "point" => Ok(LayerType::Point),
            "line" => Ok(LayerType::Line),
            _ => Err(IngestError::Validation {
                field: "type".to_string(),
                reason: format!("Invalid layer type: {}. Use polygon, point, or line", s),
            }),
        }
    }
}

/// A named geographic layer belonging to a market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GisLayer {
    pub id: LayerId,

    /// Owning market (pasar)
    pub pasar_id: u64,

    pub name: String,

    #[serde(rename = "type")]
    pub layer_type: LayerType,

    /// Serialized WGS84 GeoJSON payload
    pub geojson: Option<String>,

    /// Display color as `#RRGGBB`
    pub color: Option<String>,

    /// Fill opacity in [0, 1]
    pub opacity: Option<f64>,

    pub is_active: bool,

    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a layer
#[derive(Debug, Clone, Deserialize)]
pub struct NewLayer {
    pub pasar_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    pub geojson: Option<String>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_active() -> bool {
    true
}

/// Partial update of a layer; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayerUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub layer_type: Option<LayerType>,
    pub geojson: Option<String>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

impl NewLayer {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_color(self.color.as_deref())?;
        validate_opacity(self.opacity)
    }
}

impl LayerUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_color(self.color.as_deref())?;
        validate_opacity(self.opacity)
    }
}

impl GisLayer {
    /// Build a stored layer from creation fields
    pub fn from_new(id: LayerId, new: NewLayer, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pasar_id: new.pasar_id,
            name: new.name,
            layer_type: new.layer_type,
            geojson: new.geojson,
            color: new.color,
            opacity: new.opacity,
            is_active: new.is_active,
            sort_order: new.sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: LayerUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(layer_type) = update.layer_type {
            self.layer_type = layer_type;
        }
        if update.geojson.is_some() {
            self.geojson = update.geojson;
        }
        if update.color.is_some() {
            self.color = update.color;
        }
        if update.opacity.is_some() {
            self.opacity = update.opacity;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(order) = update.sort_order {
            self.sort_order = order;
        }
        self.updated_at = now;
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.chars().count() > 255 {
        return Err(IngestError::Validation {
            field: "name".to_string(),
            reason: "Name must be 1 to 255 characters".to_string(),
        });
    }
    Ok(())
}

fn validate_color(color: Option<&str>) -> Result<()> {
    match color {
        Some(c) if c.chars().count() > 7 => Err(IngestError::Validation {
            field: "color".to_string(),
            reason: format!("Color '{}' is longer than 7 characters", c),
        }),
        _ => Ok(()),
    }
}

fn validate_opacity(opacity: Option<f64>) -> Result<()> {
    match opacity {
        Some(o) if !(0.0..=1.0).contains(&o) => Err(IngestError::Validation {
            field: "opacity".to_string(),
            reason: format!("Opacity {} is outside [0, 1]", o),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_layer() -> NewLayer {
        NewLayer {
            pasar_id: 1,
            name: "Kios Rejomulyo".to_string(),
            layer_type: LayerType::Polygon,
            geojson: None,
            color: Some("#0057A8".to_string()),
            opacity: Some(0.6),
            is_active: true,
            sort_order: 0,
        }
    }

    #[test]
    fn test_layer_type_parsing() {
        assert_eq!("POLYGON".parse::<LayerType>().unwrap(), LayerType::Polygon);
        assert_eq!("line".parse::<LayerType>().unwrap(), LayerType::Line);
        assert!("raster".parse::<LayerType>().is_err());
    }

    #[test]
    fn test_new_layer_validation() {
        assert!(new_layer().validate().is_ok());

        let mut bad = new_layer();
        bad.opacity = Some(1.5);
        assert!(bad.validate().is_err());

        let mut bad = new_layer();
        bad.color = Some("#0057A8FF".to_string());
        assert!(bad.validate().is_err());

        let mut bad = new_layer();
        bad.name = "   ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let created = Utc::now();
        let mut layer = GisLayer::from_new(LayerId(7), new_layer(), created);

        layer.apply(
            LayerUpdate {
                sort_order: Some(3),
                is_active: Some(false),
                ..Default::default()
            },
            created,
        );

        assert_eq!(layer.sort_order, 3);
        assert!(!layer.is_active);
        assert_eq!(layer.name, "Kios Rejomulyo");
        assert_eq!(layer.color.as_deref(), Some("#0057A8"));
    }

    #[test]
    fn test_layer_serializes_type_field() {
        let layer = GisLayer::from_new(LayerId(1), new_layer(), Utc::now());
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "polygon");
        assert_eq!(json["id"], 1);
    }
}
