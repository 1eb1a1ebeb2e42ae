use anyhow::{Result, anyhow};
use image::DynamicImage;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, NeighborFrame, Rating, ResultItem, SearchResponse};
use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::neighbors::NeighborUpdate;
use crate::pagination::PageMarker;
use crate::query::{FilterRow, FrameId, Overrides, TextField};
use crate::session::{PendingSearch, SearchOutcome, SearchSession};
use crate::theme::THEMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Editing the text fields of the search form.
  Form,
  /// Editing object filter rows.
  Filters,
  Results,
  /// Browsing the frames around a result.
  Neighbors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
  Name,
  Comparator,
  Count,
}

impl FilterColumn {
  pub fn next(self) -> Self {
    match self {
      FilterColumn::Name => FilterColumn::Comparator,
      FilterColumn::Comparator => FilterColumn::Count,
      FilterColumn::Count => FilterColumn::Name,
    }
  }

  pub fn prev(self) -> Self {
    match self {
      FilterColumn::Name => FilterColumn::Count,
      FilterColumn::Comparator => FilterColumn::Name,
      FilterColumn::Count => FilterColumn::Comparator,
    }
  }
}

/// Completion of a background task, delivered to the UI loop.
pub enum TaskEvent {
  Searched(PendingSearch, Result<SearchResponse, ApiError>),
  Neighbors(u64, Result<Vec<NeighborFrame>, ApiError>),
  ObjectClasses(Vec<String>),
  Preview(String, Result<DynamicImage>),
  FeedbackFailed(FrameId, ApiError),
}

/// Something the user asked to do with one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultAction {
  ImageSearch(FrameId),
  Rate(FrameId, Rating),
  Neighbors(FrameId),
}

/// Preview image for the selected result or focused neighbor.
#[derive(Default)]
pub struct PreviewCache {
  /// Path of the last fetch issued; arrivals for other paths are ignored.
  pub requested: Option<String>,
  pub image: Option<(String, DynamicImage)>,
  pub resized: Option<(String, u16, u16, DynamicImage)>,
}

pub struct App {
  pub session: SearchSession,
  client: ApiClient,
  pub mode: AppMode,
  pub field: TextField,
  pub filter_row: usize,
  pub filter_column: FilterColumn,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub theme_index: usize,
  pub display_mode: DisplayMode,
  pub list_state: ListState,
  /// Page highlighted in the pagination strip.
  pub page_cursor: Option<u32>,
  /// Selection of the neighbor strip; follows the focused frame.
  pub strip_state: ListState,
  /// The open neighbor lookup came back with nothing to show.
  pub neighbors_empty: bool,
  pub object_classes: Vec<String>,
  pub preview: PreviewCache,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Informational message, shown below status and error.
  pub info_message: Option<String>,
  pub should_quit: bool,
  events_tx: mpsc::UnboundedSender<TaskEvent>,
  events_rx: mpsc::UnboundedReceiver<TaskEvent>,
  /// When the last error was set, for auto-dismiss.
  error_time: Option<Instant>,
}

impl App {
  pub fn new(client: ApiClient, session: SearchSession, display_mode: DisplayMode, config: &Config) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut app = Self {
      session,
      client,
      mode: AppMode::Form,
      field: TextField::Query,
      filter_row: 0,
      filter_column: FilterColumn::Name,
      cursor_position: 0,
      input_scroll: 0,
      theme_index,
      display_mode,
      list_state: ListState::default(),
      page_cursor: None,
      strip_state: ListState::default(),
      neighbors_empty: false,
      object_classes: Vec::new(),
      preview: PreviewCache::default(),
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      events_tx,
      events_rx,
      error_time: None,
    };
    app.reset_cursor();
    app
  }

  /// Kick off startup fetches. A restored location re-runs its search.
  pub fn start(&mut self) {
    let client = self.client.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let _ = tx.send(TaskEvent::ObjectClasses(client.object_classes().await));
    });
    if !self.session.location().is_empty() {
      self.trigger_search(Overrides::default());
    }
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // theme_index stays in bounds: next_theme() wraps and load uses position().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  pub fn toggle_display_mode(&mut self) {
    self.display_mode = self.display_mode.toggle();
    self.preview.resized = None;
    self.save_config();
  }

  fn save_config(&self) {
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.display_mode = Some(self.display_mode.label().to_string());
    config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  /// Shareable URL of the last successful search.
  pub fn share_url(&self) -> String {
    self.session.location().to_url(self.client.base_url(), &constants().route_location)
  }

  // --- Text editing ---

  /// The text buffer the cursor is in, if any.
  pub fn active_text(&self) -> Option<&str> {
    match self.mode {
      AppMode::Form => Some(self.session.form.text(self.field)),
      AppMode::Filters => {
        let row = self.session.form.filters.get(self.filter_row)?;
        match self.filter_column {
          FilterColumn::Name => Some(&row.name),
          FilterColumn::Count => Some(&row.count),
          FilterColumn::Comparator => None,
        }
      }
      AppMode::Results | AppMode::Neighbors => None,
    }
  }

  pub fn active_text_mut(&mut self) -> Option<&mut String> {
    match self.mode {
      AppMode::Form => Some(self.session.form.text_mut(self.field)),
      AppMode::Filters => {
        let row = self.session.form.filters.get_mut(self.filter_row)?;
        match self.filter_column {
          FilterColumn::Name => Some(&mut row.name),
          FilterColumn::Count => Some(&mut row.count),
          FilterColumn::Comparator => None,
        }
      }
      AppMode::Results | AppMode::Neighbors => None,
    }
  }

  /// Put the cursor at the end of whatever buffer just got focus.
  pub fn reset_cursor(&mut self) {
    self.cursor_position = self.active_text().map_or(0, |t| t.chars().count());
    self.input_scroll = 0;
  }

  pub fn focus_field(&mut self, step: isize) {
    let len = TextField::ALL.len() as isize;
    let idx = TextField::ALL.iter().position(|f| *f == self.field).unwrap_or(0) as isize;
    self.field = TextField::ALL[(idx + step).rem_euclid(len) as usize];
    self.reset_cursor();
  }

  pub fn enter_mode(&mut self, mode: AppMode) {
    self.mode = mode;
    self.reset_cursor();
  }

  // --- Filter rows ---

  pub fn focus_filter_row(&mut self, step: isize) {
    let len = self.session.form.filters.len();
    if len == 0 {
      return;
    }
    self.filter_row = self.filter_row.saturating_add_signed(step).min(len - 1);
    self.reset_cursor();
  }

  pub fn focus_filter_column(&mut self, forward: bool) {
    self.filter_column = if forward { self.filter_column.next() } else { self.filter_column.prev() };
    self.reset_cursor();
  }

  pub fn add_filter_row(&mut self) {
    self.session.form.filters.push(FilterRow::default());
    self.filter_row = self.session.form.filters.len() - 1;
    self.filter_column = FilterColumn::Name;
    self.reset_cursor();
  }

  /// Remove the focused row; the form always keeps one row to type into.
  pub fn delete_filter_row(&mut self) {
    let filters = &mut self.session.form.filters;
    if self.filter_row < filters.len() {
      filters.remove(self.filter_row);
    }
    if filters.is_empty() {
      filters.push(FilterRow::default());
    }
    self.filter_row = self.filter_row.min(filters.len() - 1);
    self.reset_cursor();
  }

  pub fn cycle_comparator(&mut self) {
    if let Some(row) = self.session.form.filters.get_mut(self.filter_row) {
      row.cycle_comparator();
    }
  }

  /// Complete the focused filter name from the object class list.
  pub fn complete_filter_name(&mut self) {
    let Some(row) = self.session.form.filters.get(self.filter_row) else { return };
    let prefix = row.name.trim().to_lowercase();
    let found = self
      .object_classes
      .iter()
      .find(|c| c.to_lowercase().starts_with(&prefix) && c.to_lowercase() != prefix)
      .cloned();
    if let Some(class) = found
      && let Some(row) = self.session.form.filters.get_mut(self.filter_row)
    {
      row.name = class;
      self.filter_column = FilterColumn::Name;
      self.reset_cursor();
    }
  }

  // --- Search ---

  /// Issue a search with `overrides` on a background task.
  pub fn trigger_search(&mut self, overrides: Overrides) {
    let pending = self.session.begin_search(&overrides);
    self.clear_error();
    self.info_message = None;
    self.status_message = Some(format!("Searching page {}…", pending.payload.page));

    let client = self.client.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let result = client.search(&pending.payload).await;
      let _ = tx.send(TaskEvent::Searched(pending, result));
    });
  }

  pub fn reset_and_search(&mut self) {
    self.session.reset_form();
    self.field = TextField::Query;
    self.filter_row = 0;
    self.filter_column = FilterColumn::Name;
    self.reset_cursor();
    self.trigger_search(Overrides::page(1));
  }

  /// Go to `page` if it is one of the rendered page controls.
  pub fn select_page(&mut self, page: u32) -> bool {
    match self.session.page_window() {
      Some(window) if window.contains(page) => {
        self.trigger_search(Overrides::page(page));
        true
      }
      _ => false,
    }
  }

  /// Page under the strip cursor; the current page until the cursor moves.
  pub fn cursor_page(&self) -> Option<u32> {
    let window = self.session.page_window()?;
    Some(self.page_cursor.filter(|p| window.contains(*p)).unwrap_or(window.current))
  }

  /// Move the strip cursor across the visible page numbers without searching.
  pub fn move_page_cursor(&mut self, delta: isize) {
    let Some(window) = self.session.page_window() else { return };
    let Some(at) = self.cursor_page() else { return };
    let pages: Vec<u32> = window
      .markers()
      .into_iter()
      .filter_map(|m| match m {
        PageMarker::Page { number, .. } => Some(number),
        PageMarker::Ellipsis => None,
      })
      .collect();
    let idx = pages.iter().position(|p| *p == at).unwrap_or(0);
    let target = idx.saturating_add_signed(delta).min(pages.len().saturating_sub(1));
    self.page_cursor = pages.get(target).copied();
  }

  /// Search the page under the strip cursor.
  pub fn pick_page(&mut self) {
    if let Some(page) = self.cursor_page() {
      self.select_page(page);
    }
  }

  pub fn selected_result(&self) -> Option<&ResultItem> {
    self.list_state.selected().and_then(|i| self.session.results().get(i))
  }

  fn apply_search(&mut self, pending: PendingSearch, result: Result<SearchResponse, ApiError>) {
    match self.session.complete_search(pending, result) {
      SearchOutcome::Applied { count, .. } => {
        self.status_message = None;
        self.page_cursor = None;
        if count == 0 {
          self.list_state.select(None);
          self.info_message = Some("No results.".to_string());
        } else {
          self.list_state.select(Some(0));
          if matches!(self.mode, AppMode::Form | AppMode::Filters) {
            self.mode = AppMode::Results;
          }
        }
      }
      SearchOutcome::Stale => {}
      SearchOutcome::Failed(e) => {
        self.status_message = None;
        self.set_error(format!("Search failed: {}", e));
      }
    }
  }

  // --- Result actions ---

  pub fn dispatch(&mut self, action: ResultAction) {
    match action {
      ResultAction::ImageSearch(id) => {
        let url = self.client.image_search_url(&id);
        info!(id = %id, "action: image search");
        if let Err(e) = open_in_browser(&url) {
          self.set_error(format!("Failed to open browser: {}", e));
        }
      }
      ResultAction::Rate(id, rating) => {
        self.session.rate(id.clone(), rating);
        self.info_message = Some(format!("Marked {} as {}", id, if rating == Rating::Positive { "relevant" } else { "irrelevant" }));
        let client = self.client.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
          if let Err(e) = client.submit_feedback(&id, rating).await {
            let _ = tx.send(TaskEvent::FeedbackFailed(id, e));
          }
        });
      }
      ResultAction::Neighbors(id) => self.open_neighbors(id),
    }
  }

  // --- Neighbors ---

  pub fn open_neighbors(&mut self, id: FrameId) {
    let seq = self.session.neighbors.open(id.clone());
    self.mode = AppMode::Neighbors;
    self.neighbors_empty = false;
    self.strip_state = ListState::default();

    let k = constants().neighbor_count;
    let client = self.client.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let result = client.neighbors(&id, k).await;
      let _ = tx.send(TaskEvent::Neighbors(seq, result));
    });
  }

  pub fn close_neighbors(&mut self) {
    self.session.neighbors.close();
    self.strip_state = ListState::default();
    self.mode = AppMode::Results;
  }

  pub fn step_neighbor(&mut self, delta: isize) {
    if self.session.neighbors.step(delta) {
      self.on_neighbor_focus();
    }
  }

  pub fn select_neighbor(&mut self, index: usize) {
    if self.session.neighbors.select_index(index) {
      self.on_neighbor_focus();
    }
  }

  /// Keep the strip scrolled to the focused frame; the preview follows on the next sync.
  fn on_neighbor_focus(&mut self) {
    self.strip_state.select(self.session.neighbors.focused_index());
  }

  // --- Preview ---

  fn wanted_preview(&self) -> Option<String> {
    match self.mode {
      AppMode::Neighbors => self.session.neighbors.focused_frame().map(|f| f.path.clone()),
      _ => self.selected_result().map(|r| r.path.clone()),
    }
  }

  /// Fetch the image for whatever is selected, if it isn't the one already requested.
  pub fn sync_preview(&mut self) {
    let wanted = self.wanted_preview();
    if wanted == self.preview.requested {
      return;
    }
    self.preview.requested = wanted.clone();
    let Some(path) = wanted else { return };
    if self.preview.image.as_ref().is_some_and(|(p, _)| *p == path) {
      return;
    }
    let client = self.client.clone();
    let tx = self.events_tx.clone();
    tokio::spawn(async move {
      let result = client.fetch_image(&path).await;
      let _ = tx.send(TaskEvent::Preview(path, result));
    });
  }

  // --- Task completions ---

  /// Apply every completion that arrived since the last tick.
  pub fn check_pending(&mut self) {
    while let Ok(event) = self.events_rx.try_recv() {
      self.handle_event(event);
    }
  }

  pub fn handle_event(&mut self, event: TaskEvent) {
    match event {
      TaskEvent::Searched(pending, result) => self.apply_search(pending, result),
      TaskEvent::Neighbors(seq, result) => {
        match self.session.neighbors.resolve(seq, result) {
          NeighborUpdate::Ready { focused } => self.strip_state.select(Some(focused)),
          NeighborUpdate::Empty => self.neighbors_empty = true,
          NeighborUpdate::Stale => {}
        }
      }
      TaskEvent::ObjectClasses(classes) => {
        debug!(count = classes.len(), "objects: class list loaded");
        self.object_classes = classes;
      }
      TaskEvent::Preview(path, result) => {
        if self.preview.requested.as_deref() != Some(path.as_str()) {
          return;
        }
        match result {
          Ok(image) => {
            self.preview.image = Some((path, image));
            self.preview.resized = None;
          }
          Err(e) => warn!(path = %path, err = %e, "preview: fetch failed"),
        }
      }
      TaskEvent::FeedbackFailed(id, e) => {
        warn!(id = %id, err = %e, "feedback: submit failed");
        self.set_error("Failed to send feedback.".to_string());
      }
    }
  }
}

/// Open `url` with the platform's default handler.
pub fn open_in_browser(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .map_err(|e| anyhow!("{} failed: {}", cmd, e))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::location::Location;
  use reqwest::StatusCode;

  fn make_app(location: &str) -> App {
    let client = ApiClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
    App::new(client, SearchSession::new(Location::parse(location)), DisplayMode::Ascii, &Config::default())
  }

  fn response(ids: &[&str], total_page: u32) -> SearchResponse {
    SearchResponse {
      results: ids.iter().map(|id| ResultItem { id: FrameId::new(*id), path: format!("/kf/{}.jpg", id) }).collect(),
      total_page,
    }
  }

  fn frames(n: usize) -> Vec<NeighborFrame> {
    (0..n).map(|i| NeighborFrame { path: format!("/kf/n{}.jpg", i), id: None }).collect()
  }

  // --- FilterColumn ---

  #[test]
  fn filter_column_cycles() {
    assert_eq!(FilterColumn::Name.next().next().next(), FilterColumn::Name);
    assert_eq!(FilterColumn::Name.prev(), FilterColumn::Count);
  }

  // --- text focus ---

  #[test]
  fn cursor_starts_at_end_of_restored_field() {
    let app = make_app("query=red%20car");
    assert_eq!(app.active_text(), Some("red car"));
    assert_eq!(app.cursor_position, 7);
  }

  #[test]
  fn focus_field_wraps() {
    let mut app = make_app("");
    app.focus_field(-1);
    assert_eq!(app.field, TextField::IncludeIds);
    app.focus_field(1);
    assert_eq!(app.field, TextField::Query);
  }

  #[test]
  fn comparator_column_has_no_text() {
    let mut app = make_app("");
    app.enter_mode(AppMode::Filters);
    app.focus_filter_column(true);
    assert_eq!(app.filter_column, FilterColumn::Comparator);
    assert!(app.active_text().is_none());
    app.cycle_comparator();
    assert_eq!(app.session.form.filters[0].cmp, "gte");
  }

  // --- filter rows ---

  #[test]
  fn add_and_delete_rows_keep_one() {
    let mut app = make_app("");
    app.enter_mode(AppMode::Filters);
    app.add_filter_row();
    assert_eq!(app.session.form.filters.len(), 2);
    assert_eq!(app.filter_row, 1);
    app.delete_filter_row();
    app.delete_filter_row();
    assert_eq!(app.session.form.filters, vec![FilterRow::default()]);
    assert_eq!(app.filter_row, 0);
  }

  #[test]
  fn complete_filter_name_from_classes() {
    let mut app = make_app("");
    app.enter_mode(AppMode::Filters);
    app.object_classes = vec!["car".into(), "person".into(), "pen".into()];
    app.session.form.filters[0].name = "pe".into();
    app.complete_filter_name();
    assert_eq!(app.session.form.filters[0].name, "person");
    assert_eq!(app.cursor_position, 6);
  }

  // --- task completions ---

  #[test]
  fn search_completion_moves_to_results() {
    let mut app = make_app("");
    let pending = app.session.begin_search(&Overrides::page(1));
    app.handle_event(TaskEvent::Searched(pending, Ok(response(&["1", "2"], 3))));
    assert_eq!(app.mode, AppMode::Results);
    assert_eq!(app.selected_result().map(|r| r.id.clone()), Some(FrameId::new("1")));
    assert!(app.share_url().starts_with("http://localhost:8000/keyframe/?page=1"));
  }

  #[test]
  fn search_failure_sets_error_and_keeps_state() {
    let mut app = make_app("");
    let pending = app.session.begin_search(&Overrides::page(1));
    app.handle_event(TaskEvent::Searched(pending, Ok(response(&["1"], 1))));
    let url_before = app.share_url();

    let pending = app.session.begin_search(&Overrides::page(2));
    let err = ApiError::Status { status: StatusCode::BAD_GATEWAY, body: "down".into() };
    app.handle_event(TaskEvent::Searched(pending, Err(err)));

    assert!(app.last_error.as_deref().is_some_and(|e| e.starts_with("Search failed")));
    assert_eq!(app.share_url(), url_before);
    assert_eq!(app.session.results().len(), 1);
  }

  #[test]
  fn neighbor_completion_focuses_strip() {
    let mut app = make_app("");
    let seq = app.session.neighbors.open(FrameId::new("3"));
    app.mode = AppMode::Neighbors;
    app.handle_event(TaskEvent::Neighbors(seq, Ok(frames(5))));
    assert_eq!(app.strip_state.selected(), Some(2));

    app.step_neighbor(1);
    assert_eq!(app.strip_state.selected(), Some(3));
    app.select_neighbor(0);
    assert_eq!(app.strip_state.selected(), Some(0));
    app.step_neighbor(-1);
    assert_eq!(app.strip_state.selected(), Some(0));

    app.close_neighbors();
    assert_eq!(app.mode, AppMode::Results);
    assert!(!app.session.neighbors.is_open());
  }

  // --- pagination ---

  fn app_on_page(page: u32, total: u32) -> App {
    let mut app = make_app("");
    let pending = app.session.begin_search(&Overrides::page(page));
    app.handle_event(TaskEvent::Searched(pending, Ok(response(&["1"], total))));
    app
  }

  #[test]
  fn page_cursor_walks_visible_pages_only() {
    let mut app = app_on_page(1, 20);
    assert_eq!(app.cursor_page(), Some(1));
    app.move_page_cursor(4);
    assert_eq!(app.cursor_page(), Some(5));
    app.move_page_cursor(10);
    assert_eq!(app.cursor_page(), Some(5));
    app.move_page_cursor(-10);
    assert_eq!(app.cursor_page(), Some(1));
    assert!(app.status_message.is_none());
  }

  #[tokio::test]
  async fn selecting_visible_page_issues_that_page() {
    let mut app = app_on_page(1, 20);
    app.move_page_cursor(4);
    app.pick_page();
    match app.events_rx.recv().await {
      Some(TaskEvent::Searched(pending, _)) => assert_eq!(pending.payload.page, 5),
      _ => panic!("expected a search completion"),
    }
  }

  #[tokio::test]
  async fn page_outside_window_is_ignored() {
    let mut app = app_on_page(1, 20);
    assert!(!app.select_page(9));
    assert!(!app.select_page(0));
    assert!(app.status_message.is_none());
    assert!(app.events_rx.try_recv().is_err());
    assert!(app.select_page(3));
    assert_eq!(app.status_message.as_deref(), Some("Searching page 3…"));
  }

  #[test]
  fn empty_neighbor_lookup_settles_without_frames() {
    let mut app = make_app("");
    let seq = app.session.neighbors.open(FrameId::new("3"));
    app.mode = AppMode::Neighbors;
    app.handle_event(TaskEvent::Neighbors(seq, Ok(Vec::new())));
    assert!(app.neighbors_empty);
    assert!(app.session.neighbors.frames().is_empty());
    assert_eq!(app.strip_state.selected(), None);

    let err = ApiError::Status { status: StatusCode::INTERNAL_SERVER_ERROR, body: String::new() };
    let seq = app.session.neighbors.open(FrameId::new("4"));
    app.neighbors_empty = false;
    app.handle_event(TaskEvent::Neighbors(seq, Err(err)));
    assert!(app.neighbors_empty);
  }

  #[test]
  fn preview_for_other_path_is_ignored() {
    let mut app = make_app("");
    app.preview.requested = Some("/kf/a.jpg".into());
    let img = DynamicImage::new_rgb8(2, 2);
    app.handle_event(TaskEvent::Preview("/kf/b.jpg".into(), Ok(img.clone())));
    assert!(app.preview.image.is_none());
    app.handle_event(TaskEvent::Preview("/kf/a.jpg".into(), Ok(img)));
    assert!(app.preview.image.is_some());
  }
}
