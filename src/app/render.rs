// app/render.rs
// Drawing of the tab shell, REST view and Metadata view

use super::provider::AppState;
use super::view::{Focus, Tab, ViewState};
use crate::analysis::format::{format_size, DataFormat};
use crate::analysis::spatial::{coverage_grid, fill_opacity, render_set, Viewport};
use crate::analysis::timeline::{build_timeline, TimelineBucket};
use crate::catalog::models::{ApiSpecification, MetadataRecord, SchemaId};
use ratatui::prelude::*;
use ratatui::widgets::canvas::{Canvas, Map, MapResolution, Points};
use ratatui::widgets::*;

const NOTHING_SELECTED: &str = "Nothing selected";
const NOT_AVAILABLE: &str = "N/A";
const NO_TIMELINE: &str = "No temporal coverage to show.";

/// Coverage counts for the map, reused while the inputs stay the same.
#[derive(Debug, Clone)]
pub struct MapCache {
    key: (Viewport, Rect, Option<SchemaId>, usize),
    grid: Vec<Vec<usize>>,
}

pub fn draw(f: &mut Frame, state: &AppState, view: &mut ViewState, map_cache: &mut Option<MapCache>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    let selected_tab = match view.tab {
        Tab::Rest => 0,
        Tab::Metadata => 1,
    };
    let tabs = Tabs::new(vec!["[1] REST", "[2] Metadata"])
        .block(Block::default().title("OEDS Explorer").borders(Borders::ALL))
        .select(selected_tab)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    match view.tab {
        Tab::Rest => draw_rest(f, chunks[1], state, view),
        Tab::Metadata => draw_metadata(f, chunks[1], state, view, map_cache),
    }

    let help = match (view.tab, view.focus) {
        (Tab::Rest, _) => "↑/↓ profile  Enter select  PgUp/PgDn scroll  2 metadata  q quit",
        (Tab::Metadata, Focus::Search) => "type to search  Enter/Esc done",
        (Tab::Metadata, Focus::Cards) => "↑/↓ move  Enter toggle  / search  z zoom  Tab focus  1 REST  q quit",
        (Tab::Metadata, Focus::Map) => "arrows move  Enter/click query  +/- zoom  z fit selection  0 reset  Tab focus",
        (Tab::Metadata, Focus::Timeline) => "←/→ hover  [ ] brush start  { } brush end  Tab focus",
    };
    f.render_widget(Paragraph::new(help).style(Style::default().fg(Color::DarkGray)), chunks[2]);
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default().title(title).borders(Borders::ALL).border_style(style)
}

fn loading(f: &mut Frame, area: Rect, title: &str) {
    let block = Block::default().title(title).borders(Borders::ALL);
    f.render_widget(Paragraph::new("Loading...").block(block), area);
}

// ------------------- REST -------------------
const SPEC_HEADER_LINES: usize = 3;

/// Number of lines the spec summary occupies.
pub fn spec_line_count(spec: &ApiSpecification) -> usize {
    SPEC_HEADER_LINES + spec.endpoints().len()
}

fn draw_rest(f: &mut Frame, area: Rect, state: &AppState, view: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    if state.schemas.is_empty() {
        loading(f, columns[0], "Profiles");
    } else {
        let items: Vec<ListItem> = state
            .schemas
            .iter()
            .map(|s| {
                let marker = if state.active_schema.as_deref() == Some(s.as_str()) { "* " } else { "  " };
                ListItem::new(format!("{}{}", marker, s))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Profiles").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let mut list_state = ListState::default().with_selected(Some(view.profile_cursor));
        f.render_stateful_widget(list, columns[0], &mut list_state);
    }

    let spec = match (&state.spec, state.schemas.is_empty()) {
        (Some(spec), false) => spec,
        _ => return loading(f, columns[1], "API"),
    };
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(spec.title().unwrap_or(NOT_AVAILABLE).to_string()),
        ]),
        Line::from(vec![
            Span::styled("Version: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(spec.version().unwrap_or(NOT_AVAILABLE).to_string()),
        ]),
        Line::from(""),
    ];
    lines.extend(spec.endpoints().into_iter().map(|e| {
        Line::from(vec![
            Span::styled(format!("{:<24}", e.methods.join(",")), Style::default().fg(Color::Cyan)),
            Span::raw(e.path),
        ])
    }));
    let title = format!("API: {}", state.active_schema.as_deref().unwrap_or_default());
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .scroll((view.spec_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, columns[1]);
}

// ------------------- Metadata -------------------
fn draw_metadata(f: &mut Frame, area: Rect, state: &AppState, view: &mut ViewState, map_cache: &mut Option<MapCache>) {
    if state.catalog.is_empty() {
        view.map_area = None;
        return loading(f, area, "Metadata");
    }
    let catalog = state.catalog.as_slice();
    let selection = view.selected_record(catalog);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(30), Constraint::Percentage(45)])
        .split(rows[0]);

    draw_cards(f, top[0], catalog, view);
    draw_details(f, top[1], selection);
    draw_map(f, top[2], catalog, selection, view, map_cache);
    draw_timeline(f, rows[1], catalog, selection, view);
}

fn draw_cards(f: &mut Frame, area: Rect, catalog: &[MetadataRecord], view: &ViewState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search = Paragraph::new(view.search.as_str())
        .block(focused_block("Search schemas (/)", view.focus == Focus::Search));
    f.render_widget(search, parts[0]);

    let items: Vec<ListItem> = view
        .visible_cards(catalog)
        .into_iter()
        .map(|r| {
            let style = if view.selected.as_deref() == Some(r.schema_name.as_str()) {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(r.schema_name.clone()),
                Line::from(Span::styled(
                    format!("Form: {}", DataFormat::classify(r)),
                    Style::default().fg(Color::Gray),
                )),
            ])
            .style(style)
        })
        .collect();
    let list = List::new(items)
        .block(focused_block("Datasets", view.focus == Focus::Cards))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(Some(view.card_cursor));
    f.render_stateful_widget(list, parts[1], &mut list_state);
}

fn detail_rows(selection: Option<&MetadataRecord>) -> Vec<(&'static str, String)> {
    let Some(r) = selection else {
        let mut rows = vec![("Name", NOTHING_SELECTED.to_string())];
        rows.extend(
            ["Crawl Date", "Data Date", "Data Source", "Licence", "Description", "Contact", "Tables", "Size", "Type"]
                .into_iter()
                .map(|label| (label, NOT_AVAILABLE.to_string())),
        );
        return rows;
    };
    let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let mut rows = vec![
        ("Name", r.schema_name.clone()),
        ("Crawl Date", text(&r.crawl_date)),
        ("Data Date", text(&r.data_date)),
        ("Data Source", text(&r.data_source)),
        ("Licence", text(&r.licence)),
        ("Description", text(&r.description)),
        ("Contact", text(&r.contact)),
        ("Tables", r.tables.map_or_else(|| NOT_AVAILABLE.to_string(), |t| t.to_string())),
        ("Size", r.size.map_or_else(|| NOT_AVAILABLE.to_string(), format_size)),
        ("Type", DataFormat::classify(r).to_string()),
    ];
    if r.has_spatial() {
        rows.push(("Map", "[z] zoom to footprint".to_string()));
    }
    rows
}

fn draw_details(f: &mut Frame, area: Rect, selection: Option<&MetadataRecord>) {
    let rows: Vec<Row> = detail_rows(selection)
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(label).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(value),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(10)])
        .block(Block::default().title("Details").borders(Borders::ALL));
    f.render_widget(table, area);
}

fn opacity_color(opacity: f64) -> Color {
    let level = (55.0 + 200.0 * opacity).round() as u8;
    Color::Rgb(level, 0, 0)
}

fn draw_map(
    f: &mut Frame,
    area: Rect,
    catalog: &[MetadataRecord],
    selection: Option<&MetadataRecord>,
    view: &mut ViewState,
    map_cache: &mut Option<MapCache>,
) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(area);
    let block = focused_block("Availability Map", view.focus == Focus::Map);
    let inner = block.inner(parts[0]);
    view.map_area = Some(inner);

    let footprints = render_set(catalog, selection);
    let key = (view.viewport, inner, selection.map(|r| r.schema_name.clone()), catalog.len());
    if !matches!(map_cache, Some(cache) if cache.key == key) {
        let grid = coverage_grid(&footprints, &view.viewport, inner.width, inner.height);
        *map_cache = Some(MapCache { key, grid });
    }
    let grid: &[Vec<usize>] = match map_cache {
        Some(cache) => &cache.grid,
        None => &[],
    };

    // one point layer per overlap level
    let max_level = grid.iter().flatten().copied().max().unwrap_or(0);
    let layers: Vec<(Color, Vec<(f64, f64)>)> = (1..=max_level)
        .map(|level| {
            let coords = grid
                .iter()
                .enumerate()
                .flat_map(|(row, cells)| {
                    cells.iter().enumerate().filter(move |(_, c)| **c == level).map(move |(col, _)| (col, row))
                })
                .map(|(col, row)| {
                    let c = view.viewport.coord_at(col as u16, row as u16, inner.width, inner.height);
                    (c.lon, c.lat)
                })
                .collect();
            (opacity_color(fill_opacity(level)), coords)
        })
        .collect();

    let crosshair = (view.crosshair.lon, view.crosshair.lat);
    let query = view.last_query.as_ref().map(|q| (q.at.lon, q.at.lat));
    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Block)
        .x_bounds(view.viewport.x_bounds())
        .y_bounds(view.viewport.y_bounds())
        .paint(|ctx| {
            for (color, coords) in &layers {
                ctx.draw(&Points { coords, color: *color });
            }
            ctx.layer();
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::Gray,
            });
            if let Some((x, y)) = query {
                ctx.print(x, y, Span::styled("x", Style::default().fg(Color::Cyan)));
            }
            ctx.print(crosshair.0, crosshair.1, Span::styled("+", Style::default().fg(Color::Yellow)));
        });
    f.render_widget(canvas, parts[0]);

    let summary = match &view.last_query {
        None => "Move the crosshair or click to list datasets covering a location.".to_string(),
        Some(q) if q.covering.is_empty() => format!("No dataset covers {:.3}, {:.3}", q.at.lon, q.at.lat),
        Some(q) => format!("At {:.3}, {:.3}: {}", q.at.lon, q.at.lat, q.covering.join(", ")),
    };
    let panel = Paragraph::new(summary)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Overlapping sources").borders(Borders::ALL));
    f.render_widget(panel, parts[1]);
}

fn draw_timeline(f: &mut Frame, area: Rect, catalog: &[MetadataRecord], selection: Option<&MetadataRecord>, view: &mut ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);
    let block = focused_block("Availability Timeline", view.focus == Focus::Timeline);

    let chart_data = build_timeline(catalog, selection)
        .and_then(|buckets| view.brush_window(buckets.len()).map(|window| (buckets, window)));
    let Some((buckets, (start, end))) = chart_data else {
        f.render_widget(Paragraph::new(NO_TIMELINE).block(block), columns[0]);
        return;
    };
    view.hover = view.hover.clamp(start, end);
    let window = &buckets[start..=end];

    let points: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, b)| ((start + i) as f64, b.active_count as f64))
        .collect();
    let max_count = window.iter().map(|b| b.active_count).max().unwrap_or(0).max(1) as f64;
    let hover_line = [(view.hover as f64, 0.0), (view.hover as f64, max_count)];

    let x_labels: Vec<Span> = [start, (start + end) / 2, end]
        .iter()
        .map(|&i| Span::raw(buckets[i].month_key.clone()))
        .collect();
    let datasets = vec![
        Dataset::default()
            .name("active schemas")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightBlue))
            .data(&points),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&hover_line),
    ];
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([start as f64, (end as f64).max(start as f64 + 1.0)])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, max_count])
                .labels(vec![Span::raw("0"), Span::raw(format!("{}", max_count as usize))]),
        );
    f.render_widget(chart, columns[0]);

    f.render_widget(hover_panel(&buckets[view.hover]), columns[1]);
}

fn hover_panel(bucket: &TimelineBucket) -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} : {}", bucket.month_key, bucket.active_count),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Active schemas:"),
    ];
    lines.extend(bucket.active_schema_names.iter().map(|n| Line::from(format!("  {}", n))));
    Paragraph::new(lines).block(Block::default().title("Month").borders(Borders::ALL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_without_selection() {
        let rows = detail_rows(None);
        assert_eq!(rows[0], ("Name", NOTHING_SELECTED.to_string()));
        assert!(rows[1..].iter().all(|(_, v)| v == NOT_AVAILABLE));
        assert!(rows.iter().all(|(label, _)| *label != "Map"));
    }

    #[test]
    fn selected_record_rows() {
        let r = MetadataRecord {
            schema_name: "opsd".into(),
            size: Some(2_500_000),
            licence: Some("CC-BY".into()),
            ..Default::default()
        };
        let rows = detail_rows(Some(&r));
        let get = |label: &str| rows.iter().find(|(l, _)| *l == label).map(|(_, v)| v.clone()).unwrap();
        assert_eq!(get("Size"), "2.50 MB");
        assert_eq!(get("Licence"), "CC-BY");
        assert_eq!(get("Contact"), NOT_AVAILABLE);
        assert_eq!(get("Type"), "Relational");
    }

    #[test]
    fn inverted_range_shows_placeholder_instead_of_blank_pane() {
        use ratatui::backend::TestBackend;

        let catalog = vec![MetadataRecord {
            schema_name: "inverted".into(),
            temporal_start: Some("2021-05-01".into()),
            temporal_end: Some("2020-01-01".into()),
            ..Default::default()
        }];
        let mut view = ViewState::default();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                draw_timeline(f, area, &catalog, None, &mut view)
            })
            .unwrap();
        let screen: String = terminal.backend().buffer().content.iter().map(|c| c.symbol()).collect();
        assert!(screen.contains(NO_TIMELINE));
        assert!(screen.contains("Availability Timeline"));
    }

    #[test]
    fn spec_lines_count_header_and_paths() {
        let spec = ApiSpecification(serde_json::json!({"paths": {"/a": {"get": {}}, "/b": {"get": {}}}}));
        assert_eq!(spec_line_count(&spec), 5);
        assert_eq!(spec_line_count(&ApiSpecification::default()), SPEC_HEADER_LINES);
    }
}
