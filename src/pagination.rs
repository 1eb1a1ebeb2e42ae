//! Bounded window of page controls around the current page.

use crate::constants::constants;

/// One entry of the rendered page strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMarker {
  Ellipsis,
  Page { number: u32, active: bool },
}

/// Visible page range `[start, end]` (inclusive) and where ellipses go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub current: u32,
  pub total: u32,
  pub start: u32,
  pub end: u32,
}

impl PageWindow {
  pub fn leading_ellipsis(&self) -> bool {
    self.start > 1
  }

  pub fn trailing_ellipsis(&self) -> bool {
    self.end < self.total
  }

  pub fn contains(&self, page: u32) -> bool {
    (self.start..=self.end).contains(&page)
  }

  pub fn markers(&self) -> Vec<PageMarker> {
    let mut out = Vec::with_capacity((self.end - self.start + 3) as usize);
    if self.leading_ellipsis() {
      out.push(PageMarker::Ellipsis);
    }
    out.extend((self.start..=self.end).map(|number| PageMarker::Page { number, active: number == self.current }));
    if self.trailing_ellipsis() {
      out.push(PageMarker::Ellipsis);
    }
    out
  }
}

/// Compute the window for `current` of `total` pages with the configured radius.
/// Returns `None` when there are no pages to render.
pub fn page_window(current: u32, total: u32) -> Option<PageWindow> {
  page_window_with_radius(current, total, constants().page_window_radius)
}

pub fn page_window_with_radius(current: u32, total: u32, radius: u32) -> Option<PageWindow> {
  if total == 0 {
    return None;
  }
  let start = current.saturating_sub(radius).max(1);
  let end = current.saturating_add(radius).min(total);
  // A current page past the end still shows the tail of the range.
  let start = start.min(end);
  Some(PageWindow { current, total, start, end })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn numbers(w: &PageWindow) -> Vec<u32> {
    w.markers()
      .into_iter()
      .filter_map(|m| match m {
        PageMarker::Page { number, .. } => Some(number),
        PageMarker::Ellipsis => None,
      })
      .collect()
  }

  #[test]
  fn no_pages_renders_nothing() {
    assert_eq!(page_window(1, 0), None);
  }

  #[test]
  fn first_of_ten() {
    let w = page_window(1, 10).unwrap();
    assert_eq!((w.start, w.end), (1, 5));
    assert!(!w.leading_ellipsis());
    assert!(w.trailing_ellipsis());
    assert_eq!(w.markers().last(), Some(&PageMarker::Ellipsis));
  }

  #[test]
  fn last_of_ten() {
    let w = page_window(10, 10).unwrap();
    assert_eq!((w.start, w.end), (6, 10));
    assert!(w.leading_ellipsis());
    assert!(!w.trailing_ellipsis());
    assert_eq!(w.markers().first(), Some(&PageMarker::Ellipsis));
  }

  #[test]
  fn middle_has_both_ellipses() {
    let w = page_window(10, 20).unwrap();
    assert_eq!(numbers(&w), (6..=14).collect::<Vec<_>>());
    let markers = w.markers();
    assert_eq!(markers.len(), 11);
    assert!(markers.contains(&PageMarker::Page { number: 10, active: true }));
    assert!(markers.contains(&PageMarker::Page { number: 9, active: false }));
  }

  #[test]
  fn small_total_fits_entirely() {
    let w = page_window(2, 3).unwrap();
    assert_eq!(numbers(&w), vec![1, 2, 3]);
    assert!(!w.leading_ellipsis() && !w.trailing_ellipsis());
  }

  #[test]
  fn current_beyond_total_stays_in_range() {
    let w = page_window(50, 3).unwrap();
    assert!(w.start <= w.end);
    assert_eq!(w.end, 3);
    assert!(w.markers().iter().all(|m| !matches!(m, PageMarker::Page { active: true, .. })));
  }

  #[test]
  fn custom_radius() {
    let w = page_window_with_radius(5, 10, 1).unwrap();
    assert_eq!((w.start, w.end), (4, 6));
    assert!(w.contains(4) && !w.contains(7));
  }
}
