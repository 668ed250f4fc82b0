// catalog/geometry.rs
// GeoJSON footprint geometry: decoding, containment and bounds

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A WGS84 position, longitude first as in GeoJSON.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

impl Coord {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<Coord> for Point<f64> {
    fn from(c: Coord) -> Self {
        Point::new(c.lon, c.lat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn center(&self) -> Coord {
        Coord::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Spatial coverage footprint of a dataset. A single polygon is held as a one-part multipolygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(MultiPolygon<f64>);

impl Geometry {
    /// Interior containment; holes are excluded.
    pub fn contains(&self, point: Coord) -> bool {
        self.0.contains(&Point::from(point))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.0.bounding_rect().map(|r| Bounds {
            min_lon: r.min().x,
            min_lat: r.min().y,
            max_lon: r.max().x,
            max_lat: r.max().y,
        })
    }

    /// Parses a GeoJSON `Polygon` or `MultiPolygon` object. Anything else yields `None`.
    pub fn from_geojson(value: &Value) -> Option<Self> {
        let parsed: geojson::Geometry = serde_json::from_value(value.clone()).ok()?;
        let polygons = match geo::Geometry::<f64>::try_from(parsed).ok()? {
            geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
            geo::Geometry::MultiPolygon(mp) => mp,
            _ => return None,
        };
        // a closed ring needs at least three distinct positions
        if polygons.0.is_empty() || polygons.0.iter().any(|p| p.exterior().0.len() < 4) {
            return None;
        }
        Some(Geometry(polygons))
    }
}

impl Serialize for Geometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        geojson::Geometry::new(geojson::Value::from(&self.0)).serialize(serializer)
    }
}

/// Accepts any JSON for the field and keeps it only when it is a usable polygon footprint.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| {
        let parsed = Geometry::from_geojson(v);
        if parsed.is_none() && !v.is_null() {
            tracing::debug!("dropping unusable footprint geometry");
        }
        parsed
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(min: f64, max: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
        })
    }

    #[test]
    fn polygon_contains_interior_point() {
        let g = Geometry::from_geojson(&square(0.0, 10.0)).unwrap();
        assert!(g.contains(Coord::new(5.0, 5.0)));
        assert!(!g.contains(Coord::new(15.0, 5.0)));
    }

    #[test]
    fn hole_excludes_point() {
        let g = Geometry::from_geojson(&json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
            ]
        }))
        .unwrap();
        assert!(!g.contains(Coord::new(5.0, 5.0)));
        assert!(g.contains(Coord::new(2.0, 2.0)));
    }

    #[test]
    fn multipolygon_contains_any_part() {
        let g = Geometry::from_geojson(&json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]
            ]
        }))
        .unwrap();
        assert!(g.contains(Coord::new(5.5, 5.5)));
        assert!(!g.contains(Coord::new(3.0, 3.0)));
        let b = g.bounds().unwrap();
        assert_eq!((b.min_lon, b.max_lat), (0.0, 6.0));
    }

    #[test]
    fn rejects_non_polygon_shapes() {
        assert!(Geometry::from_geojson(&json!({"type": "Point", "coordinates": [1.0, 2.0]})).is_none());
        assert!(Geometry::from_geojson(&json!({"type": "Polygon", "coordinates": "nope"})).is_none());
        assert!(Geometry::from_geojson(&json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0]]]})).is_none());
        assert!(Geometry::from_geojson(&json!("0103000020E6100000")).is_none());
    }

    #[test]
    fn serialized_geojson_parses_back() {
        let g = Geometry::from_geojson(&square(1.0, 2.0)).unwrap();
        let written = serde_json::to_value(&g).unwrap();
        assert_eq!(written["type"], "MultiPolygon");
        assert_eq!(Geometry::from_geojson(&written), Some(g));
    }
}
