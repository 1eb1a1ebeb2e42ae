//! Neighbor browser: steps through the frames around a selected result.
//!
//! `Closed → Loading → Ready(frames, focused)`. Every `open` issues a new
//! sequence number and only the completion carrying the latest one is
//! applied, so a slow lookup cannot overwrite a newer one.

use tracing::{debug, warn};

use crate::api::{ApiError, NeighborFrame};
use crate::query::FrameId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NeighborState {
  #[default]
  Closed,
  /// Lookup in flight, or finished with nothing to show.
  Loading { item: FrameId, seq: u64 },
  Ready { item: FrameId, frames: Vec<NeighborFrame>, focused: usize },
}

/// What a completed lookup did to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborUpdate {
  /// Superseded by a newer `open`, or the browser was closed.
  Stale,
  /// Nothing to show; the browser stays open and empty.
  Empty,
  Ready { focused: usize },
}

#[derive(Debug, Default)]
pub struct NeighborBrowser {
  state: NeighborState,
  issued: u64,
}

impl NeighborBrowser {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &NeighborState {
    &self.state
  }

  pub fn is_open(&self) -> bool {
    !matches!(self.state, NeighborState::Closed)
  }

  /// Item the browser was opened on.
  pub fn item(&self) -> Option<&FrameId> {
    match &self.state {
      NeighborState::Closed => None,
      NeighborState::Loading { item, .. } | NeighborState::Ready { item, .. } => Some(item),
    }
  }

  pub fn frames(&self) -> &[NeighborFrame] {
    match &self.state {
      NeighborState::Ready { frames, .. } => frames,
      _ => &[],
    }
  }

  pub fn focused_index(&self) -> Option<usize> {
    match &self.state {
      NeighborState::Ready { focused, .. } => Some(*focused),
      _ => None,
    }
  }

  pub fn focused_frame(&self) -> Option<&NeighborFrame> {
    match &self.state {
      NeighborState::Ready { frames, focused, .. } => frames.get(*focused),
      _ => None,
    }
  }

  /// Start a lookup around `item`, discarding whatever was shown. Returns the
  /// sequence number the completion must carry.
  pub fn open(&mut self, item: FrameId) -> u64 {
    self.issued += 1;
    let seq = self.issued;
    debug!(item = %item, seq, "neighbors: open");
    self.state = NeighborState::Loading { item, seq };
    seq
  }

  /// Apply the outcome of lookup `seq`. A non-empty list focuses the middle frame.
  pub fn resolve(&mut self, seq: u64, result: Result<Vec<NeighborFrame>, ApiError>) -> NeighborUpdate {
    let item = match &self.state {
      NeighborState::Loading { item, seq: pending } if *pending == seq => item.clone(),
      _ => {
        debug!(seq, latest = self.issued, "neighbors: dropping stale lookup");
        return NeighborUpdate::Stale;
      }
    };
    match result {
      Ok(frames) if !frames.is_empty() => {
        let focused = frames.len() / 2;
        self.state = NeighborState::Ready { item, frames, focused };
        NeighborUpdate::Ready { focused }
      }
      Ok(_) => {
        debug!(item = %item, "neighbors: lookup returned no frames");
        NeighborUpdate::Empty
      }
      Err(e) => {
        warn!(item = %item, err = %e, "neighbors: lookup failed");
        NeighborUpdate::Empty
      }
    }
  }

  /// Focus frame `index`. Returns `true` if the focus changed.
  pub fn select_index(&mut self, index: usize) -> bool {
    match &mut self.state {
      NeighborState::Ready { frames, focused, .. } if index < frames.len() && index != *focused => {
        *focused = index;
        true
      }
      _ => false,
    }
  }

  /// Move the focus by `delta`, clamped to the ends (no wraparound).
  /// Returns `true` if the focus changed.
  pub fn step(&mut self, delta: isize) -> bool {
    let NeighborState::Ready { frames, focused, .. } = &self.state else { return false };
    let last = frames.len().saturating_sub(1);
    let next = focused.saturating_add_signed(delta).min(last);
    self.select_index(next)
  }

  pub fn close(&mut self) {
    self.state = NeighborState::Closed;
  }
}
