// app/view.rs
// Ephemeral view state: active tab, focus, search, selection, map and timeline cursors

use crate::analysis::overview::{filter_records, toggle_selection};
use crate::analysis::spatial::{records_at, render_set, Viewport};
use crate::catalog::geometry::Coord;
use crate::catalog::models::{MetadataRecord, SchemaId};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Rest,
    Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Cards,
    Map,
    Timeline,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Search | Focus::Cards => Focus::Map,
            Focus::Map => Focus::Timeline,
            Focus::Timeline => Focus::Cards,
        }
    }
}

/// Result of the last point query on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PointQuery {
    pub at: Coord,
    pub covering: Vec<SchemaId>,
}

#[derive(Debug)]
pub struct ViewState {
    pub tab: Tab,
    pub focus: Focus,
    pub search: String,
    pub profile_cursor: usize,
    pub spec_scroll: usize,
    pub card_cursor: usize,
    pub selected: Option<SchemaId>,
    pub viewport: Viewport,
    pub crosshair: Coord,
    pub last_query: Option<PointQuery>,
    pub hover: usize,
    /// Inclusive bucket range shown by the timeline, `None` for everything.
    pub brush: Option<(usize, usize)>,
    /// Inner area of the map canvas as last drawn, for mouse hit-testing.
    pub map_area: Option<Rect>,
}

impl Default for ViewState {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            tab: Tab::Rest,
            focus: Focus::Cards,
            search: String::new(),
            profile_cursor: 0,
            spec_scroll: 0,
            card_cursor: 0,
            selected: None,
            crosshair: viewport.center,
            viewport,
            last_query: None,
            hover: 0,
            brush: None,
            map_area: None,
        }
    }
}

impl ViewState {
    pub fn selected_record<'a>(&self, catalog: &'a [MetadataRecord]) -> Option<&'a MetadataRecord> {
        let name = self.selected.as_deref()?;
        catalog.iter().find(|r| r.schema_name == name)
    }

    pub fn visible_cards<'a>(&self, catalog: &'a [MetadataRecord]) -> Vec<&'a MetadataRecord> {
        filter_records(catalog, &self.search)
    }

    pub fn move_card_cursor(&mut self, catalog: &[MetadataRecord], delta: isize) {
        let len = self.visible_cards(catalog).len();
        self.card_cursor = step(self.card_cursor, delta, len);
    }

    pub fn edit_search(&mut self, catalog: &[MetadataRecord], edit: impl FnOnce(&mut String)) {
        edit(&mut self.search);
        let len = self.visible_cards(catalog).len();
        self.card_cursor = self.card_cursor.min(len.saturating_sub(1));
    }

    /// Toggles the card under the cursor. A new selection clears the last point query.
    pub fn toggle_card(&mut self, catalog: &[MetadataRecord]) {
        let Some(name) = self.visible_cards(catalog).get(self.card_cursor).map(|r| r.schema_name.clone()) else {
            return;
        };
        self.selected = toggle_selection(self.selected.take(), &name);
        self.last_query = None;
    }

    pub fn query_point(&mut self, catalog: &[MetadataRecord], at: Coord) {
        let selection = self.selected_record(catalog);
        let covering = records_at(&render_set(catalog, selection), at);
        tracing::debug!(lon = at.lon, lat = at.lat, hits = covering.len(), "map point query");
        self.crosshair = at;
        self.last_query = Some(PointQuery { at, covering });
    }

    /// Fits the map to the selected record's footprint. Returns false when there is nothing to zoom to.
    pub fn zoom_to_selection(&mut self, catalog: &[MetadataRecord]) -> bool {
        let bounds = self
            .selected_record(catalog)
            .and_then(|r| r.concave_hull_geometry.as_ref())
            .and_then(|g| g.bounds());
        match bounds {
            Some(b) => {
                self.viewport = Viewport::fit(&b);
                self.crosshair = self.viewport.center;
                true
            }
            None => false,
        }
    }

    pub fn reset_map(&mut self) {
        self.viewport = Viewport::default();
        self.crosshair = self.viewport.center;
    }

    /// Moves the crosshair by a fraction of the visible span, panning when it leaves the view.
    pub fn move_crosshair(&mut self, dx: f64, dy: f64) {
        self.crosshair.lon += dx * self.viewport.half_lon;
        self.crosshair.lat += dy * self.viewport.half_lat;
        let [x0, x1] = self.viewport.x_bounds();
        let [y0, y1] = self.viewport.y_bounds();
        if self.crosshair.lon < x0 || self.crosshair.lon > x1 || self.crosshair.lat < y0 || self.crosshair.lat > y1 {
            self.viewport.center = self.crosshair;
        }
    }

    /// Translates a terminal cell to a map coordinate if it falls inside the map canvas.
    pub fn map_coord_at(&self, column: u16, row: u16) -> Option<Coord> {
        let area = self.map_area?;
        if column < area.x || row < area.y || column >= area.x + area.width || row >= area.y + area.height {
            return None;
        }
        Some(self.viewport.coord_at(column - area.x, row - area.y, area.width, area.height))
    }

    /// Scrolls the spec summary, keeping at least its last line on screen.
    pub fn scroll_spec(&mut self, delta: isize, line_count: usize) {
        self.spec_scroll = step(self.spec_scroll, delta, line_count);
    }

    pub fn brush_window(&self, len: usize) -> Option<(usize, usize)> {
        if len == 0 {
            return None;
        }
        let (start, end) = self.brush.unwrap_or((0, len - 1));
        let end = end.min(len - 1);
        Some((start.min(end), end))
    }

    pub fn move_brush(&mut self, len: usize, start_delta: isize, end_delta: isize) {
        let Some((start, end)) = self.brush_window(len) else {
            return;
        };
        let end = step(end, end_delta, len).max(start);
        let start = step(start, start_delta, len).min(end);
        self.brush = Some((start, end));
        self.hover = self.hover.clamp(start, end);
    }

    pub fn move_hover(&mut self, len: usize, delta: isize) {
        if let Some((start, end)) = self.brush_window(len) {
            self.hover = step(self.hover, delta, len).clamp(start, end);
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}
