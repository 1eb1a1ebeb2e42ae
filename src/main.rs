mod api;
mod app;
mod config;
mod constants;
mod display;
mod graphics;
mod input;
mod location;
mod logging;
mod neighbors;
mod pagination;
mod query;
mod session;
mod theme;
mod ui;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use api::{ApiClient, ResultItem};
use app::App;
use config::Config;
use display::CliDisplayMode;
use location::Location;
use query::Overrides;
use session::{SearchOutcome, SearchSession};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Keyframe search client", long_about = None)]
struct Args {
  /// Retrieval backend base URL (overrides the saved preference)
  #[arg(long)]
  base_url: Option<String>,

  /// Restore a search from a shared location, either a full URL or its query string
  #[arg(short, long)]
  location: Option<String>,

  /// Display mode: 'auto', 'direct', or 'ascii' (default: auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Results per page when the location does not set one
  #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
  size: Option<u32>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the restored search once and print the results as JSON
  Search {
    /// Page to fetch instead of the location's page (1-based)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    page: Option<u32>,
  },
}

#[derive(Serialize)]
struct SearchReport<'a> {
  location: String,
  total_page: u32,
  results: &'a [ResultItem],
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let _log_guard = logging::init()?;
  let config = Config::load();

  let base_url = args.base_url.clone().unwrap_or_else(|| config.base_url());
  let client = ApiClient::new(&base_url, config.request_timeout())?;

  let mut location = Location::parse(args.location.as_deref().unwrap_or(""));
  if location.get("size").is_none()
    && let Some(size) = args.size.or(config.page_size)
  {
    location.set("size", size.to_string());
  }
  info!(base_url = %base_url, restored = !location.is_empty(), "startup");

  if let Some(Command::Search { page }) = args.command {
    return search_once(&client, location, page).await;
  }

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let display_mode = display::resolve_display_mode(args.display_mode, config.display_mode.as_deref());
  let mut app = App::new(client, SearchSession::new(location), display_mode, &config);

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app);
  ratatui::restore();
  result
}

/// Headless mode: one search, JSON on stdout.
async fn search_once(client: &ApiClient, location: Location, page: Option<u32>) -> Result<()> {
  let mut session = SearchSession::new(location);
  let overrides = Overrides { page, ..Overrides::default() };
  match session.search(client, &overrides).await {
    SearchOutcome::Applied { .. } => {
      let report = SearchReport {
        location: session.location().to_url(client.base_url(), &constants::constants().route_location),
        total_page: session.total_pages(),
        results: session.results(),
      };
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    SearchOutcome::Failed(e) => bail!("Search failed: {}", e),
    SearchOutcome::Stale => bail!("Search was superseded"),
  }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  app.start();

  loop {
    app.check_pending();
    app.expire_error();
    app.sync_preview();

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(app, key),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  info!("shutdown");
  Ok(())
}
