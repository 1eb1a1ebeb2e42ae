use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::api::Rating;
use crate::app::{App, AppMode, FilterColumn, ResultAction, open_in_browser};
use crate::query::{FrameId, Overrides};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Apply a line-editing key to `text`. Returns `false` if the key is not an edit.
pub fn edit_text(text: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(text, *cursor);
      text.insert(byte_idx, c);
      *cursor += 1;
    }
    KeyCode::Backspace => {
      if *cursor > 0 {
        *cursor -= 1;
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if *cursor < text.chars().count() {
        let byte_idx = char_to_byte_index(text, *cursor);
        text.remove(byte_idx);
      }
    }
    KeyCode::Left => *cursor = cursor.saturating_sub(1),
    KeyCode::Right => {
      if *cursor < text.chars().count() {
        *cursor += 1;
      }
    }
    KeyCode::Home => *cursor = 0,
    KeyCode::End => *cursor = text.chars().count(),
    _ => return false,
  }
  true
}

// --- Result actions ---

/// Kinds of per-result actions, bound to a result id at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
  ImageSearch,
  RatePositive,
  RateNegative,
  Neighbors,
}

impl ActionKind {
  pub fn bind(self, id: FrameId) -> ResultAction {
    match self {
      ActionKind::ImageSearch => ResultAction::ImageSearch(id),
      ActionKind::RatePositive => ResultAction::Rate(id, Rating::Positive),
      ActionKind::RateNegative => ResultAction::Rate(id, Rating::Negative),
      ActionKind::Neighbors => ResultAction::Neighbors(id),
    }
  }
}

/// Keys available on a selected result.
pub const RESULT_ACTIONS: [(KeyCode, ActionKind); 5] = [
  (KeyCode::Enter, ActionKind::Neighbors),
  (KeyCode::Char('n'), ActionKind::Neighbors),
  (KeyCode::Char('i'), ActionKind::ImageSearch),
  (KeyCode::Char('+'), ActionKind::RatePositive),
  (KeyCode::Char('-'), ActionKind::RateNegative),
];

pub fn lookup_action(code: KeyCode) -> Option<ActionKind> {
  RESULT_ACTIONS.iter().find(|(k, _)| *k == code).map(|(_, kind)| *kind)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if ctrl && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  if ctrl && key.code == KeyCode::Char('g') {
    app.toggle_display_mode();
    return;
  }

  // Ctrl+O: open the shareable location of the current search
  if ctrl && key.code == KeyCode::Char('o') {
    let url = app.share_url();
    if let Err(e) = open_in_browser(&url) {
      app.set_error(format!("Failed to open browser: {}", e));
    }
    return;
  }

  if ctrl && key.code == KeyCode::Char('r') {
    app.reset_and_search();
    return;
  }

  match app.mode {
    AppMode::Form => handle_form_key(app, key),
    AppMode::Filters => handle_filter_key(app, key),
    AppMode::Results => handle_results_key(app, key),
    AppMode::Neighbors => handle_neighbors_key(app, key),
  }
}

fn handle_form_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  match key.code {
    KeyCode::Enter => app.trigger_search(Overrides::page(1)),
    KeyCode::Tab | KeyCode::Down => app.focus_field(1),
    KeyCode::BackTab | KeyCode::Up => app.focus_field(-1),
    KeyCode::Char('f') if ctrl => app.enter_mode(AppMode::Filters),
    // Unbound chords never type their letter.
    KeyCode::Char(_) if ctrl => {}
    KeyCode::Esc => {
      if !app.session.results().is_empty() {
        app.enter_mode(AppMode::Results);
      } else {
        app.should_quit = true;
      }
    }
    code => {
      let mut cursor = app.cursor_position;
      if let Some(text) = app.active_text_mut() {
        edit_text(text, &mut cursor, code);
      }
      app.cursor_position = cursor;
    }
  }
}

fn handle_filter_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
  match key.code {
    KeyCode::Enter => app.trigger_search(Overrides::page(1)),
    KeyCode::Esc => app.enter_mode(AppMode::Form),
    KeyCode::Tab => app.focus_filter_column(true),
    KeyCode::BackTab => app.focus_filter_column(false),
    KeyCode::Up => app.focus_filter_row(-1),
    KeyCode::Down => app.focus_filter_row(1),
    KeyCode::Char('n') if ctrl => app.add_filter_row(),
    KeyCode::Char('d') if ctrl => app.delete_filter_row(),
    KeyCode::Char('e') if ctrl => app.complete_filter_name(),
    KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if app.filter_column == FilterColumn::Comparator => {
      app.cycle_comparator();
    }
    KeyCode::Char(_) if ctrl => {}
    code => {
      let mut cursor = app.cursor_position;
      if let Some(text) = app.active_text_mut() {
        edit_text(text, &mut cursor, code);
      }
      app.cursor_position = cursor;
    }
  }
}

fn handle_results_key(app: &mut App, key: event::KeyEvent) {
  if let Some(kind) = lookup_action(key.code) {
    if let Some(id) = app.selected_result().map(|r| r.id.clone()) {
      app.dispatch(kind.bind(id));
    }
    return;
  }
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.session.results().len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.session.results().len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Char(']') | KeyCode::Right | KeyCode::PageDown => app.move_page_cursor(1),
    KeyCode::Char('[') | KeyCode::Left | KeyCode::PageUp => app.move_page_cursor(-1),
    KeyCode::Char('g') => app.pick_page(),
    KeyCode::Char('/') | KeyCode::Esc => app.enter_mode(AppMode::Form),
    KeyCode::Char('f') => app.enter_mode(AppMode::Filters),
    _ => {}
  }
}

fn handle_neighbors_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc | KeyCode::Char('q') => app.close_neighbors(),
    KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => app.step_neighbor(-1),
    KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => app.step_neighbor(1),
    KeyCode::Home => app.select_neighbor(0),
    KeyCode::End => {
      let last = app.session.neighbors.frames().len().saturating_sub(1);
      app.select_neighbor(last);
    }
    KeyCode::Char(c) if c.is_ascii_digit() => {
      // 1-9 jump to that frame, 0 to the tenth
      let n = c.to_digit(10).unwrap_or(0) as usize;
      app.select_neighbor(if n == 0 { 9 } else { n - 1 });
    }
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiClient;
  use crate::config::Config;
  use crate::display::DisplayMode;
  use crate::location::Location;
  use crate::session::SearchSession;
  use ratatui::crossterm::event::KeyEvent;
  use std::time::Duration;

  fn make_app(location: &str) -> App {
    let client = ApiClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
    App::new(client, SearchSession::new(Location::parse(location)), DisplayMode::Ascii, &Config::default())
  }

  fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- edit_text ---

  #[test]
  fn edit_inserts_at_cursor() {
    let mut text = "cr".to_string();
    let mut cursor = 1;
    assert!(edit_text(&mut text, &mut cursor, KeyCode::Char('a')));
    assert_eq!(text, "car");
    assert_eq!(cursor, 2);
  }

  #[test]
  fn edit_backspace_and_delete_multibyte() {
    let mut text = "xe日y".to_string();
    let mut cursor = 3;
    edit_text(&mut text, &mut cursor, KeyCode::Backspace);
    assert_eq!(text, "xey");
    edit_text(&mut text, &mut cursor, KeyCode::Delete);
    assert_eq!(text, "xe");
    assert_eq!(cursor, 2);
  }

  #[test]
  fn edit_ignores_non_edit_keys() {
    let mut text = String::new();
    let mut cursor = 0;
    assert!(!edit_text(&mut text, &mut cursor, KeyCode::Enter));
    assert!(!edit_text(&mut text, &mut cursor, KeyCode::Esc));
  }

  // --- lookup_action ---

  #[test]
  fn action_table_binds_ids() {
    let id = FrameId::new("12");
    assert_eq!(lookup_action(KeyCode::Enter), Some(ActionKind::Neighbors));
    assert_eq!(lookup_action(KeyCode::Char('x')), None);
    assert_eq!(
      lookup_action(KeyCode::Char('-')).map(|k| k.bind(id.clone())),
      Some(ResultAction::Rate(id.clone(), Rating::Negative))
    );
    assert_eq!(ActionKind::ImageSearch.bind(id.clone()), ResultAction::ImageSearch(id));
  }

  // --- handle_key_event ---

  #[test]
  fn unbound_ctrl_chords_do_not_type() {
    let mut app = make_app("query=car");
    handle_key_event(&mut app, ctrl('e'));
    handle_key_event(&mut app, ctrl('x'));
    assert_eq!(app.session.form.query, "car");
    assert_eq!(app.cursor_position, 3);

    handle_key_event(&mut app, ctrl('f'));
    assert_eq!(app.mode, AppMode::Filters);
    handle_key_event(&mut app, ctrl('x'));
    assert_eq!(app.session.form.filters[0].name, "");
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
    assert_eq!(app.session.form.filters[0].name, "x");
  }
}
