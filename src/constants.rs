//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` and parsed once on first
//! access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Neighbor browsing
  pub neighbor_count: usize,

  // Pagination
  pub page_window_radius: u32,
  pub default_page: u32,
  pub default_page_size: u32,

  // Backend routes, relative to the configured base URL
  pub default_base_url: String,
  pub route_objects: String,
  pub route_search: String,
  pub route_neighbors: String,
  pub route_image: String,
  pub route_image_search: String,
  pub route_feedback: String,
  /// Page the location string points at when shared.
  pub route_location: String,

  pub error_dismiss_secs: u64,
  pub request_timeout_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed every test fails immediately.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
