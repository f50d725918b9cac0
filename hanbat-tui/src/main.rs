//! Terminal map of Daejeon attractions, restaurants, and parking lots.

mod app;
mod canvas_map;
mod config;
mod input;
mod ui;

use std::{fs::File, io, path::Path, sync::Arc, time::Duration as StdDuration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use reqwest::Client;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use hanbat_core::{
    controller::MapController,
    map::{MapError, MapEvent},
    model::{Category, Place},
    page::{FetchTicket, MapPage},
    plugin::SourceRegistry,
    service::PlaceService,
    validate::{CoordinateValidator, MUNICIPAL_REGION},
};
use hanbat_provider_food as food;
use hanbat_provider_parking as parking;
use hanbat_provider_tour as tour;

use crate::app::App;
use crate::canvas_map::{KakaoScript, TerminalMap};
use crate::config::Settings;
use crate::input::Action;

type FetchResult = (FetchTicket, Vec<Place>);

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;
    init_logging(&settings.log_file)?;
    if settings.data_service_key.is_empty() {
        log::warn!("HANBAT_DATA_SERVICE_KEY is not set, the open-data APIs will reject requests");
    }

    // HTTP + service setup
    let client = Client::builder()
        .user_agent("hanbat/0.1")
        .timeout(StdDuration::from_secs(15))
        .build()?;

    let plugins = vec![
        tour::plugin(client.clone(), settings.data_service_key.clone()),
        food::plugin(client.clone(), settings.data_service_key.clone()),
        parking::plugin(client.clone(), settings.data_service_key.clone()),
    ];
    let registry = Arc::new(SourceRegistry::new(plugins));
    let service = Arc::new(PlaceService::new(registry, CoordinateValidator::default()));

    // Map + page state
    let (map_events, map_rx) = mpsc::unbounded_channel();
    let script = KakaoScript::new(client, settings.map_api_key.clone());
    let map = TerminalMap::new(script.clone());
    let page = MapPage::new(MapController::new(map, map_events), Category::Tour);
    let app = App::new(page, service, settings.page_size);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, app, script, map_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    script: KakaoScript,
    mut map_rx: UnboundedReceiver<MapEvent>,
) -> Result<()> {
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchResult>();
    let (sdk_tx, mut sdk_rx) = mpsc::unbounded_channel();

    let ticket = app.page.reload();
    spawn_fetch(&app, ticket, &fetch_tx);
    spawn_key_check(script, sdk_tx);

    loop {
        while let Ok(outcome) = sdk_rx.try_recv() {
            // The map is laid out against the pane, so size it before creating it.
            sync_pane(terminal, &app)?;
            app.page.controller().provider().sdk_checked(outcome);
            // The loader is settled now; this does not wait on the network.
            if let Err(err) = app.page.initialize_map(MUNICIPAL_REGION.center()).await {
                app.status = Some(format!("Map unavailable: {err}"));
            }
        }
        while let Ok(event) = map_rx.try_recv() {
            app.page.handle_map_event(event);
            app.follow_selection();
        }
        while let Ok((ticket, places)) = fetch_rx.try_recv() {
            if app.page.complete_fetch(ticket, places) {
                app.clamp_cursor();
            }
        }

        sync_pane(terminal, &app)?;
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if !event::poll(StdDuration::from_millis(100))? {
            continue;
        }
        match event::read()? {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                match input::handle_key_event(key, &mut app) {
                    Action::Quit => break,
                    Action::None => {}
                    Action::SwitchTab(category) => {
                        let ticket = app.page.switch_tab(category);
                        app.list_index = 0;
                        spawn_fetch(&app, ticket, &fetch_tx);
                    }
                    Action::Reload => {
                        let ticket = app.page.reload();
                        app.list_index = 0;
                        spawn_fetch(&app, ticket, &fetch_tx);
                    }
                }
            }
            CEvent::Mouse(mouse) => input::handle_mouse_event(mouse, &app),
            _ => {}
        }
    }

    Ok(())
}

/// Fetch in the background; the page decides on arrival whether the result still matters.
fn spawn_fetch(app: &App, ticket: FetchTicket, results: &UnboundedSender<FetchResult>) {
    let service = Arc::clone(&app.service);
    let page_size = app.page_size;
    let results = results.clone();
    tokio::spawn(async move {
        let places = service.places(ticket.category, 1, page_size).await;
        log::info!("Fetched {} {} places", places.len(), ticket.category);
        if results.send((ticket, places)).is_err() {
            log::debug!("UI gone before {} fetch finished", ticket.category);
        }
    });
}

/// Check the map key off the UI loop; the list keeps rendering meanwhile.
fn spawn_key_check(script: KakaoScript, outcome: UnboundedSender<Result<(), MapError>>) {
    tokio::spawn(async move {
        let checked = script.check_key().await;
        if outcome.send(checked).is_err() {
            log::debug!("UI gone before the map key check finished");
        }
    });
}

fn sync_pane(terminal: &Terminal<CrosstermBackend<io::Stdout>>, app: &App) -> Result<()> {
    let size = terminal.size()?;
    let panes = ui::layout(Rect::new(0, 0, size.width, size.height));
    app.page.controller().provider().set_pane(panes.map_inner());
    Ok(())
}
