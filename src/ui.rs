use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, List, ListItem, Padding, Paragraph},
};

use crate::api::Rating;
use crate::app::{App, AppMode, FilterColumn};
use crate::graphics::{PreviewWidget, fit_to_area};
use crate::neighbors::NeighborState;
use crate::pagination::PageMarker;
use crate::query::TextField;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Short frame name: the last two path components (`L30_V083/051.jpg`).
pub fn display_name(path: &str) -> String {
  let parts: Vec<&str> = path.split(['/', '\\']).filter(|p| !p.is_empty()).collect();
  parts[parts.len().saturating_sub(2)..].join("/")
}

/// Characters of `text` visible in a `width`-column window starting at display column `scroll`.
fn visible_slice(text: &str, scroll: usize, width: usize) -> String {
  text
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + width)
    .map(|(_, _, c)| c)
    .collect()
}

fn rounded_block<'a>(theme: &Theme, title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(5), Constraint::Length(1), Constraint::Length(1)])
      .areas(frame.area());

  render_header(frame, app, header_area);
  if app.mode == AppMode::Neighbors {
    render_neighbors(frame, app, main_area);
  } else {
    let [left, right] = Layout::horizontal([Constraint::Percentage(42), Constraint::Percentage(58)]).areas(main_area);
    if app.mode == AppMode::Results {
      let block = rounded_block(theme, " Preview ", false);
      let inner = block.inner(left);
      frame.render_widget(block, left);
      render_preview(frame, app, inner);
    } else {
      render_form(frame, app, left);
    }
    render_results(frame, app, right);
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let title = " ▶ kfs ";
  let left = Line::from(Span::styled(title, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(Line::from(Span::styled(&version, Style::default().fg(theme.muted))), right_area);

  // Shareable location of the last search, between title and version.
  let url_w = (area.width as usize).saturating_sub(title.chars().count() + version.len() + 2);
  let url_area = Rect { x: area.x + title.chars().count() as u16 + 1, width: url_w as u16, ..area };
  let url = truncate_str(&app.share_url(), url_w);
  frame.render_widget(Line::from(Span::styled(url, Style::default().fg(theme.muted))), url_area);
}

fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let editing_form = app.mode == AppMode::Form;
  let block = rounded_block(theme, " Search ", true).padding(Padding::horizontal(1));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  const LABEL_W: usize = 15;
  let value_w = (inner.width as usize).saturating_sub(LABEL_W);
  let mut lines = Vec::new();
  let mut cursor_line = None;

  for field in TextField::ALL {
    let focused = editing_form && app.field == field;
    let value = app.session.form.text(field);
    let shown = if focused { visible_slice(value, app.input_scroll, value_w) } else { truncate_str(value, value_w) };
    if focused {
      cursor_line = Some(lines.len());
    }
    let label_style = if focused { Style::default().fg(theme.accent).add_modifier(Modifier::BOLD) } else { Style::default().fg(theme.muted) };
    lines.push(Line::from(vec![
      Span::styled(format!("{:<width$}", field.label(), width = LABEL_W), label_style),
      Span::styled(shown, Style::default().fg(theme.fg)),
    ]));
  }

  lines.push(Line::from(""));
  let filters_title_style = if app.mode == AppMode::Filters { theme.accent } else { theme.muted };
  lines.push(Line::from(Span::styled("Object filters", Style::default().fg(filters_title_style).add_modifier(Modifier::BOLD))));

  const NAME_W: usize = 18;
  for (i, row) in app.session.form.filters.iter().enumerate() {
    let row_focused = app.mode == AppMode::Filters && app.filter_row == i;
    let cell = |col: FilterColumn| {
      let style = Style::default().fg(theme.fg);
      if row_focused && app.filter_column == col { style.add_modifier(Modifier::REVERSED) } else { style }
    };
    let name = if row.name.is_empty() { "object".to_string() } else { truncate_str(&row.name, NAME_W) };
    let name_style = if row.name.is_empty() { cell(FilterColumn::Name).fg(theme.muted) } else { cell(FilterColumn::Name) };
    let count = if row.count.is_empty() { "n".to_string() } else { row.count.clone() };
    if row_focused && app.filter_column != FilterColumn::Comparator {
      cursor_line = Some(lines.len());
    }
    lines.push(Line::from(vec![
      Span::styled(if row_focused { "▶ " } else { "  " }, Style::default().fg(theme.accent)),
      Span::styled(format!("{:<width$}", name, width = NAME_W), name_style),
      Span::raw(" "),
      Span::styled(format!(" {} ", row.comparator().symbol()), cell(FilterColumn::Comparator)),
      Span::raw(" "),
      Span::styled(count, cell(FilterColumn::Count)),
    ]));
  }

  frame.render_widget(Paragraph::new(lines), inner);

  // Cursor placement for the active text buffer.
  let Some(line_idx) = cursor_line else { return };
  let Some(text) = app.active_text() else { return };
  let cursor_col = display_width(text, app.cursor_position);
  let (offset, width) = match app.mode {
    AppMode::Form => (LABEL_W, value_w),
    _ => match app.filter_column {
      FilterColumn::Name => (2, NAME_W),
      _ => {
        let sym_w = app.session.form.filters.get(app.filter_row).map_or(1, |r| r.comparator().symbol().chars().count());
        (2 + NAME_W + 1 + sym_w + 2 + 1, 6)
      }
    },
  };
  if app.mode == AppMode::Form {
    if cursor_col < app.input_scroll {
      app.input_scroll = cursor_col;
    } else if cursor_col >= app.input_scroll + width {
      app.input_scroll = cursor_col.saturating_sub(width) + 1;
    }
  }
  let scroll = if app.mode == AppMode::Form { app.input_scroll } else { 0 };
  let x = inner.x + (offset + cursor_col.saturating_sub(scroll).min(width)) as u16;
  let y = inner.y + line_idx as u16;
  if y < inner.y + inner.height {
    frame.set_cursor_position((x.min(inner.x + inner.width.saturating_sub(1)), y));
  }
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [list_area, pages_area] = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
  let inner_w = list_area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .session
    .results()
    .iter()
    .enumerate()
    .map(|(i, item)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      let (mark, mark_color) = match app.session.rating(&item.id) {
        Some(Rating::Positive) => ("▲", theme.positive),
        Some(Rating::Negative) => ("▼", theme.negative),
        None => (" ", theme.muted),
      };
      let id = format!("#{}", item.id);
      let name_w = inner_w.saturating_sub(id.chars().count() + 4);
      let name = truncate_str(&display_name(&item.path), name_w);
      let gap = inner_w.saturating_sub(name.chars().count() + id.chars().count() + 2);
      let line = Line::from(vec![
        Span::styled(format!("{} ", mark), Style::default().fg(mark_color)),
        Span::styled(name, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(id, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let title = format!(" Results ({}) ", app.session.results().len());
  let list = List::new(items)
    .block(rounded_block(theme, title, app.mode == AppMode::Results))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, list_area, &mut app.list_state);

  render_pages(frame, app, pages_area);
}

fn render_pages(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let total = app.session.total_pages();
  let Some(window) = app.session.page_window() else {
    frame.render_widget(Line::from(Span::styled(" Total: 0 page", Style::default().fg(theme.muted))), area);
    return;
  };
  let cursor = if app.mode == AppMode::Results { app.cursor_page() } else { None };
  let mut spans = vec![Span::raw(" ")];
  for marker in window.markers() {
    match marker {
      PageMarker::Ellipsis => spans.push(Span::styled(" … ", Style::default().fg(theme.muted))),
      PageMarker::Page { number, active: true } => spans.push(Span::styled(
        format!(" {} ", number),
        Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD),
      )),
      PageMarker::Page { number, active: false } => {
        let style = Style::default().fg(theme.fg);
        let style = if cursor == Some(number) { style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD) } else { style };
        spans.push(Span::styled(format!(" {} ", number), style))
      }
    }
  }
  spans.push(Span::styled(format!("  Total: {} page", total), Style::default().fg(theme.muted)));
  frame.render_widget(Line::from(spans), area);
}

fn render_preview(frame: &mut Frame, app: &mut App, area: Rect) {
  if area.is_empty() {
    return;
  }
  let Some((ref path, ref image)) = app.preview.image else {
    let theme = app.theme();
    let msg = if app.preview.requested.is_some() { "Loading…" } else { "" };
    frame.render_widget(Paragraph::new(msg).style(Style::default().fg(theme.muted)).alignment(Alignment::Center), area);
    return;
  };
  if app.preview.requested.as_deref() != Some(path.as_str()) {
    return;
  }
  let [img_area, name_area] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
  let needs_resize = match &app.preview.resized {
    Some((p, w, h, _)) => p != path || *w != img_area.width || *h != img_area.height,
    None => true,
  };
  if needs_resize {
    let resized = fit_to_area(image, img_area, app.display_mode);
    app.preview.resized = Some((path.clone(), img_area.width, img_area.height, resized));
  }
  if let Some((_, _, _, ref resized)) = app.preview.resized {
    frame.render_widget(PreviewWidget { image: resized, display_mode: app.display_mode }, img_area);
  }
  let theme = app.theme();
  let name = Paragraph::new(display_name(path)).style(Style::default().fg(theme.muted)).alignment(Alignment::Center);
  frame.render_widget(name, name_area);
}

fn render_neighbors(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let title = match app.session.neighbors.item().and_then(|id| app.session.results().iter().find(|r| r.id == *id)) {
    Some(item) => format!(" Frames around: {} ", display_name(&item.path)),
    None => format!(" Frames around: #{} ", app.session.neighbors.item().map(|id| id.to_string()).unwrap_or_default()),
  };
  let block = rounded_block(theme, title, true);
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let [strip_area, preview_area] = Layout::horizontal([Constraint::Length(28), Constraint::Min(10)]).areas(inner);

  if let NeighborState::Loading { .. } = app.session.neighbors.state() {
    // A finished lookup with no frames shows nothing.
    if !app.neighbors_empty {
      frame.render_widget(Paragraph::new(" Loading…").style(Style::default().fg(theme.muted)), strip_area);
    }
    return;
  }

  let items: Vec<ListItem> = app
    .session
    .neighbors
    .frames()
    .iter()
    .map(|f| ListItem::new(truncate_str(&display_name(&f.path), 24)).fg(theme.fg))
    .collect();
  let strip = List::new(items)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(strip, strip_area, &mut app.strip_state);

  render_preview(frame, app, preview_area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.muted))
  } else {
    let total = app.session.total_pages();
    if total > 0 {
      (format!(" Page {} of {}", app.session.current_page(), total), Style::default().fg(theme.muted))
    } else {
      (" Ready".to_string(), Style::default().fg(theme.muted))
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_results = !app.session.results().is_empty();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Form => {
      let mut k = vec![("Enter", "Search"), ("Tab", "Field"), ("^f", "Filters"), ("^r", "Reset")];
      k.push(if has_results { ("Esc", "Results") } else { ("Esc", "Quit") });
      k
    }
    AppMode::Filters => {
      vec![("Enter", "Search"), ("Tab", "Column"), ("^n", "Add"), ("^d", "Delete"), ("^e", "Complete"), ("Esc", "Back")]
    }
    AppMode::Results => vec![
      ("Enter", "Neighbors"),
      ("i", "Image search"),
      ("+/-", "Rate"),
      ("[/]", "Page"),
      ("g", "Go"),
      ("^o", "Open link"),
      ("Esc", "Edit"),
    ],
    AppMode::Neighbors => vec![("←/→", "Step"), ("1-9", "Jump"), ("Home/End", "Ends"), ("Esc", "Close")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} · {} ", theme.name, app.display_mode.label());
  let label_w = theme_label.chars().count() as u16;
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(label_w), width: label_w, ..area };
  frame.render_widget(right, right_area);
}
