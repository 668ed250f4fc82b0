// app/tui.rs
// Terminal User Interface loop and input handling

use super::provider::Provider;
use super::render::{draw, spec_line_count, MapCache};
use super::view::{Focus, Tab, ViewState};
use crate::analysis::timeline::build_timeline;
use crate::catalog::client::CatalogSource;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;
use std::io;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const CROSSHAIR_STEP: f64 = 0.1;
const SPEC_PAGE: isize = 10;

pub async fn run_tui(source: Arc<dyn CatalogSource>) -> Result<()> {
    enable_raw_mode()?;
    let result = run_in_terminal(source).await;
    // every teardown step runs, whatever happened before
    let teardown = [
        disable_raw_mode(),
        crossterm::execute!(
            io::stdout(),
            LeaveAlternateScreen,
            event::DisableMouseCapture,
            crossterm::cursor::Show
        ),
    ];
    first_error(result, teardown)
}

async fn run_in_terminal(source: Arc<dyn CatalogSource>) -> Result<()> {
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, event::EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    event_loop(&mut terminal, source).await
}

/// The session error wins over teardown errors; otherwise the first failed teardown step is reported.
fn first_error<const N: usize>(session: Result<()>, teardown: [io::Result<()>; N]) -> Result<()> {
    session?;
    teardown.into_iter().collect::<io::Result<()>>()?;
    Ok(())
}

async fn event_loop<B: Backend>(terminal: &mut Terminal<B>, source: Arc<dyn CatalogSource>) -> Result<()> {
    let mut provider = Provider::new(source);
    let mut view = ViewState::default();
    let mut map_cache: Option<MapCache> = None;
    provider.start();

    loop {
        provider.drain();
        terminal.draw(|f| draw(f, &provider.state, &mut view, &mut map_cache))?;

        if !event::poll(POLL_INTERVAL)? {
            // let the fetch tasks make progress between frames
            tokio::task::yield_now().await;
            continue;
        }
        let flow = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut provider, &mut view, key),
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    if let Some(at) = view.map_coord_at(mouse.column, mouse.row) {
                        view.focus = Focus::Map;
                        view.query_point(&provider.state.catalog, at);
                    }
                }
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        };
        if flow.is_break() {
            return Ok(());
        }
    }
}

fn handle_key(provider: &mut Provider, view: &mut ViewState, key: KeyEvent) -> ControlFlow<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return ControlFlow::Break(());
    }
    if view.tab == Tab::Metadata && view.focus == Focus::Search {
        let catalog = &provider.state.catalog;
        match key.code {
            KeyCode::Char(c) => view.edit_search(catalog, |s| s.push(c)),
            KeyCode::Backspace => view.edit_search(catalog, |s| {
                s.pop();
            }),
            KeyCode::Enter | KeyCode::Esc => view.focus = Focus::Cards,
            _ => {}
        }
        return ControlFlow::Continue(());
    }
    match key.code {
        KeyCode::Char('q') => return ControlFlow::Break(()),
        KeyCode::Char('1') => view.tab = Tab::Rest,
        KeyCode::Char('2') => view.tab = Tab::Metadata,
        _ => match view.tab {
            Tab::Rest => handle_rest_key(provider, view, key.code),
            Tab::Metadata => handle_metadata_key(provider, view, key.code),
        },
    }
    ControlFlow::Continue(())
}

fn handle_rest_key(provider: &mut Provider, view: &mut ViewState, code: KeyCode) {
    let count = provider.state.schemas.len();
    let spec_lines = provider.state.spec.as_ref().map_or(0, spec_line_count);
    match code {
        KeyCode::Up => view.profile_cursor = view.profile_cursor.saturating_sub(1),
        KeyCode::Down => {
            if view.profile_cursor + 1 < count {
                view.profile_cursor += 1;
            }
        }
        KeyCode::Enter => {
            if let Some(schema) = provider.state.schemas.get(view.profile_cursor).cloned() {
                view.spec_scroll = 0;
                provider.select_schema(&schema);
            }
        }
        KeyCode::PageDown => view.scroll_spec(SPEC_PAGE, spec_lines),
        KeyCode::PageUp => view.scroll_spec(-SPEC_PAGE, spec_lines),
        KeyCode::Tab => view.tab = Tab::Metadata,
        _ => {}
    }
}

fn handle_metadata_key(provider: &mut Provider, view: &mut ViewState, code: KeyCode) {
    let catalog = &provider.state.catalog;
    match code {
        KeyCode::Tab => {
            view.focus = view.focus.next();
            return;
        }
        KeyCode::Char('/') => {
            view.focus = Focus::Search;
            return;
        }
        KeyCode::Char('z') => {
            view.zoom_to_selection(catalog);
            return;
        }
        _ => {}
    }
    match view.focus {
        Focus::Search => {}
        Focus::Cards => match code {
            KeyCode::Up => view.move_card_cursor(catalog, -1),
            KeyCode::Down => view.move_card_cursor(catalog, 1),
            KeyCode::Enter | KeyCode::Char(' ') => view.toggle_card(catalog),
            _ => {}
        },
        Focus::Map => match code {
            KeyCode::Left => view.move_crosshair(-CROSSHAIR_STEP, 0.0),
            KeyCode::Right => view.move_crosshair(CROSSHAIR_STEP, 0.0),
            KeyCode::Up => view.move_crosshair(0.0, CROSSHAIR_STEP),
            KeyCode::Down => view.move_crosshair(0.0, -CROSSHAIR_STEP),
            KeyCode::Enter => view.query_point(catalog, view.crosshair),
            KeyCode::Char('+') | KeyCode::Char('=') => view.viewport.zoom(0.5),
            KeyCode::Char('-') => view.viewport.zoom(2.0),
            KeyCode::Char('0') => view.reset_map(),
            _ => {}
        },
        Focus::Timeline => {
            // the span does not depend on the selection, so the full catalog gives the bucket count
            let len = build_timeline(catalog, None).map_or(0, |b| b.len());
            match code {
                KeyCode::Left => view.move_hover(len, -1),
                KeyCode::Right => view.move_hover(len, 1),
                KeyCode::Char('[') => view.move_brush(len, -1, 0),
                KeyCode::Char(']') => view.move_brush(len, 1, 0),
                KeyCode::Char('{') => view.move_brush(len, 0, -1),
                KeyCode::Char('}') => view.move_brush(len, 0, 1),
                _ => {}
            }
        }
    }
}
