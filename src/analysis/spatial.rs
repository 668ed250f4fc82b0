// analysis/spatial.rs
// Footprint queries for the map: which datasets cover a point, overlap shading, viewport math

use crate::catalog::geometry::{Bounds, Coord};
use crate::catalog::models::{MetadataRecord, SchemaId};

pub const DEFAULT_CENTER: Coord = Coord {
    lon: 6.083861,
    lat: 50.775132,
};
const DEFAULT_HALF_LON: f64 = 30.0;
const DEFAULT_HALF_LAT: f64 = 15.0;
const MIN_HALF_SPAN: f64 = 0.05;
const FIT_PADDING: f64 = 1.1;

/// Footprints to draw: the selected record's alone when it has one, otherwise every catalog footprint.
pub fn render_set<'a>(catalog: &'a [MetadataRecord], selection: Option<&'a MetadataRecord>) -> Vec<&'a MetadataRecord> {
    match selection {
        Some(s) if s.has_spatial() => vec![s],
        _ => catalog.iter().filter(|r| r.has_spatial()).collect(),
    }
}

/// Names of every record whose footprint contains `point`. Footprints may overlap.
pub fn records_at(records: &[&MetadataRecord], point: Coord) -> Vec<SchemaId> {
    records
        .iter()
        .filter(|r| r.concave_hull_geometry.as_ref().is_some_and(|g| g.contains(point)))
        .map(|r| r.schema_name.clone())
        .collect()
}

pub fn coverage_count(records: &[&MetadataRecord], point: Coord) -> usize {
    records
        .iter()
        .filter(|r| r.concave_hull_geometry.as_ref().is_some_and(|g| g.contains(point)))
        .count()
}

/// Fill opacity for an area covered by `covering` footprints: 0.2 per footprint, capped at 1.
pub fn fill_opacity(covering: usize) -> f64 {
    (covering as f64 * 0.2).min(1.0)
}

/// Visible map window in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coord,
    pub half_lon: f64,
    pub half_lat: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            half_lon: DEFAULT_HALF_LON,
            half_lat: DEFAULT_HALF_LAT,
        }
    }
}

impl Viewport {
    pub fn fit(bounds: &Bounds) -> Self {
        Self {
            center: bounds.center(),
            half_lon: (bounds.width() / 2.0 * FIT_PADDING).max(MIN_HALF_SPAN),
            half_lat: (bounds.height() / 2.0 * FIT_PADDING).max(MIN_HALF_SPAN),
        }
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        [self.center.lon - self.half_lon, self.center.lon + self.half_lon]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        [self.center.lat - self.half_lat, self.center.lat + self.half_lat]
    }

    pub fn zoom(&mut self, factor: f64) {
        self.half_lon = (self.half_lon * factor).clamp(MIN_HALF_SPAN, 180.0);
        self.half_lat = (self.half_lat * factor).clamp(MIN_HALF_SPAN, 90.0);
    }

    /// Moves the center by a fraction of the visible span.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center.lon = (self.center.lon + dx * self.half_lon).clamp(-180.0, 180.0);
        self.center.lat = (self.center.lat + dy * self.half_lat).clamp(-90.0, 90.0);
    }

    /// Map coordinate under a terminal cell of a `width` x `height` drawing area.
    pub fn coord_at(&self, col: u16, row: u16, width: u16, height: u16) -> Coord {
        let [x0, x1] = self.x_bounds();
        let [y0, y1] = self.y_bounds();
        let fx = (f64::from(col) + 0.5) / f64::from(width.max(1));
        let fy = (f64::from(row) + 0.5) / f64::from(height.max(1));
        Coord::new(x0 + fx * (x1 - x0), y1 - fy * (y1 - y0))
    }
}

/// Per-cell coverage counts over a viewport, row 0 at the top.
pub fn coverage_grid(records: &[&MetadataRecord], viewport: &Viewport, width: u16, height: u16) -> Vec<Vec<usize>> {
    (0..height)
        .map(|row| {
            (0..width)
                .map(|col| coverage_count(records, viewport.coord_at(col, row, width, height)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::geometry::Geometry;
    use serde_json::json;

    fn square(name: &str, min: f64, max: f64) -> MetadataRecord {
        MetadataRecord {
            schema_name: name.into(),
            concave_hull_geometry: Geometry::from_geojson(&json!({
                "type": "Polygon",
                "coordinates": [[[min, min], [max, min], [max, max], [min, max], [min, min]]]
            })),
            ..Default::default()
        }
    }

    #[test]
    fn selection_with_footprint_is_drawn_alone() {
        let catalog = vec![square("a", 0.0, 1.0), square("b", 2.0, 3.0), MetadataRecord::default()];
        assert_eq!(render_set(&catalog, None).len(), 2);
        assert_eq!(render_set(&catalog, Some(&catalog[1]))[0].schema_name, "b");
        assert_eq!(render_set(&catalog, Some(&catalog[2])).len(), 2);
    }

    #[test]
    fn opacity_grows_with_overlap_and_caps() {
        assert_eq!(fill_opacity(0), 0.0);
        assert!(fill_opacity(1) < fill_opacity(2));
        assert_eq!(fill_opacity(5), 1.0);
        assert_eq!(fill_opacity(9), 1.0);
    }

    #[test]
    fn fit_centers_on_bounds() {
        let r = square("a", 10.0, 20.0);
        let v = Viewport::fit(&r.concave_hull_geometry.unwrap().bounds().unwrap());
        assert_eq!(v.center, Coord::new(15.0, 15.0));
        assert!(v.half_lon >= 5.0);
    }

    #[test]
    fn cell_to_coord_corners() {
        let v = Viewport {
            center: Coord::new(0.0, 0.0),
            half_lon: 10.0,
            half_lat: 10.0,
        };
        let top_left = v.coord_at(0, 0, 10, 10);
        assert!(top_left.lon < -8.0 && top_left.lat > 8.0);
        let bottom_right = v.coord_at(9, 9, 10, 10);
        assert!(bottom_right.lon > 8.0 && bottom_right.lat < -8.0);
    }

    #[test]
    fn grid_counts_overlaps() {
        let a = square("a", -10.0, 10.0);
        let b = square("b", 0.0, 10.0);
        let records = vec![&a, &b];
        let v = Viewport {
            center: Coord::new(0.0, 0.0),
            half_lon: 10.0,
            half_lat: 10.0,
        };
        let grid = coverage_grid(&records, &v, 2, 2);
        // top-right quadrant is covered twice, bottom-left once
        assert_eq!(grid[0][1], 2);
        assert_eq!(grid[1][0], 1);
    }
}
