use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blyv::config::fetch_config;
use blyv::credentials::{CredentialKey, is_set, populate_env_from_keychain, save};
use blyv::market::{CoinGeckoClient, MarketData, TrackerClient, build_http_client};
use blyv::narration::narrator_from_config;
use blyv::session::Workflow;
use blyv::tui::event::{spawn_event_reader, spawn_price_poller, spawn_tick_timer, update};
use blyv::tui::{Action, App, Message, Tui, render, restore_terminal, setup_terminal};
use blyv::{BlyvError, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Spinner and redraw cadence.
const TICK_MS: u64 = 100;

/// How often the header's SOL price is refreshed.
const PRICE_REFRESH: Duration = Duration::from_secs(60);

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BlyvError::Io(format!("failed to open log file {}: {e}", path.display())))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// `blyv store-keys`: copies API keys from the environment into the keychain.
fn store_keys() -> Result<()> {
    for key in CredentialKey::ALL {
        match std::env::var(key.env_var()) {
            Ok(value) if !value.trim().is_empty() => {
                save(key, value.trim())?;
                println!("{}: saved", key.label());
            }
            _ if is_set(key) => println!("{}: unchanged (already in keychain)", key.label()),
            _ => println!("{}: not set ({} is empty)", key.label(), key.env_var()),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().nth(1).as_deref() == Some("store-keys") {
        return store_keys();
    }

    populate_env_from_keychain();
    let app_config = fetch_config()?;
    init_logging(&app_config.log_file)?;
    info!(
        tracker = %app_config.tracker.base_url,
        model = %app_config.llm.model,
        chart_delay_ms = app_config.chart_delay.as_millis() as u64,
        "starting BLYV Terminal"
    );

    let http = build_http_client(app_config.http_timeout)?;
    let market: Arc<dyn MarketData> =
        Arc::new(TrackerClient::new(http.clone(), &app_config.tracker));
    let narrator = narrator_from_config(&app_config.llm, app_config.http_timeout)?;
    let workflow = Workflow::new(market, narrator, app_config.chart_delay);
    let price_feed = CoinGeckoClient::new(http, app_config.price_feed_url.clone());

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, workflow, price_feed).await;
    restore_terminal(&mut terminal)?;

    if let Err(e) = &result {
        warn!(error = %e, "terminal exited with error");
    }
    info!("BLYV Terminal stopped");
    result
}

/// Runs the message loop until the user quits.
async fn run(terminal: &mut Tui, workflow: Workflow, price_feed: CoinGeckoClient) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx.clone(), TICK_MS);
    spawn_price_poller(price_feed, tx.clone(), PRICE_REFRESH);

    let mut app = App::new();

    loop {
        terminal
            .draw(|frame| render(frame, &app))
            .map_err(|e| BlyvError::Io(format!("failed to draw: {e}")))?;

        let Some(message) = rx.recv().await else {
            break;
        };

        if let Some(Action::Submit(submission)) = update(&mut app, message) {
            let workflow = workflow.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let id = submission.id;
                let progress_tx = tx.clone();
                let outcome = workflow
                    .execute(&submission, move |state| {
                        let _ = progress_tx.send(Message::Progress { id, state });
                    })
                    .await;
                let _ = tx.send(Message::Completed { id, outcome });
            });
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
