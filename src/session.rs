//! Search session state and the search orchestration steps.
//!
//! A search is split in two so the UI loop can run the transport call on a
//! background task: `begin_search` builds the payload and tags it with a
//! sequence number, `complete_search` applies the response. Only the latest
//! issued search is ever applied; a failure leaves results and location as
//! they were.

use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::api::{ApiClient, ApiError, Rating, ResultItem, SearchResponse};
use crate::location::{self, Location};
use crate::neighbors::NeighborBrowser;
use crate::pagination::{PageWindow, page_window};
use crate::query::{FrameId, Overrides, QueryForm, SearchPayload, build_payload};

/// A search that has been issued but not yet applied.
#[derive(Debug, Clone)]
pub struct PendingSearch {
  pub seq: u64,
  pub payload: SearchPayload,
}

#[derive(Debug)]
pub enum SearchOutcome {
  Applied { count: usize, total_pages: u32 },
  /// A newer search was issued after this one.
  Stale,
  Failed(ApiError),
}

#[derive(Debug)]
pub struct SearchSession {
  pub form: QueryForm,
  pub neighbors: NeighborBrowser,
  location: Location,
  results: Vec<ResultItem>,
  current_page: u32,
  total_pages: u32,
  ratings: HashMap<FrameId, Rating>,
  issued: u64,
}

impl SearchSession {
  /// Start a session from a (possibly empty) location, restoring the form it encodes.
  pub fn new(location: Location) -> Self {
    Self {
      form: location::decode(&location),
      neighbors: NeighborBrowser::new(),
      location,
      results: Vec::new(),
      current_page: 1,
      total_pages: 0,
      ratings: HashMap::new(),
      issued: 0,
    }
  }

  pub fn location(&self) -> &Location {
    &self.location
  }

  pub fn results(&self) -> &[ResultItem] {
    &self.results
  }

  pub fn current_page(&self) -> u32 {
    self.current_page
  }

  pub fn total_pages(&self) -> u32 {
    self.total_pages
  }

  pub fn page_window(&self) -> Option<PageWindow> {
    page_window(self.current_page, self.total_pages)
  }

  pub fn begin_search(&mut self, overrides: &Overrides) -> PendingSearch {
    self.issued += 1;
    let payload = build_payload(&self.form, &self.location, overrides);
    info!(seq = self.issued, page = payload.page, size = payload.size, "search: issued");
    PendingSearch { seq: self.issued, payload }
  }

  pub fn complete_search(
    &mut self,
    pending: PendingSearch,
    result: Result<SearchResponse, ApiError>,
  ) -> SearchOutcome {
    if pending.seq != self.issued {
      debug!(seq = pending.seq, latest = self.issued, "search: dropping stale response");
      return SearchOutcome::Stale;
    }
    match result {
      Ok(response) => {
        self.results = response.results;
        self.total_pages = response.total_page;
        self.current_page = pending.payload.page;
        self.location = location::encode(&pending.payload);
        info!(count = self.results.len(), total_pages = self.total_pages, "search: applied");
        SearchOutcome::Applied { count: self.results.len(), total_pages: self.total_pages }
      }
      Err(e) => {
        error!(err = %e, "search: failed");
        SearchOutcome::Failed(e)
      }
    }
  }

  /// Run one search to completion on the current task.
  pub async fn search(&mut self, client: &ApiClient, overrides: &Overrides) -> SearchOutcome {
    let pending = self.begin_search(overrides);
    let result = client.search(&pending.payload).await;
    self.complete_search(pending, result)
  }

  /// Clear every field, leaving one empty filter row.
  pub fn reset_form(&mut self) {
    self.form.reset();
  }

  /// Record a rating, replacing any earlier one for `id`.
  pub fn rate(&mut self, id: FrameId, rating: Rating) -> Option<Rating> {
    self.ratings.insert(id, rating)
  }

  pub fn rating(&self, id: &FrameId) -> Option<Rating> {
    self.ratings.get(id).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::StatusCode;

  fn response(ids: &[&str], total_page: u32) -> SearchResponse {
    SearchResponse {
      results: ids.iter().map(|id| ResultItem { id: FrameId::new(*id), path: format!("/kf/{}.jpg", id) }).collect(),
      total_page,
    }
  }

  fn server_error() -> ApiError {
    ApiError::Status { status: StatusCode::INTERNAL_SERVER_ERROR, body: "boom".into() }
  }

  // --- new ---

  #[test]
  fn new_restores_form_from_location() {
    let session = SearchSession::new(Location::parse("query=cat&obj_filters=person:gte:2&page=3"));
    assert_eq!(session.form.query, "cat");
    assert_eq!(session.form.filters.len(), 1);
    assert!(session.results().is_empty());
    assert_eq!(session.page_window(), None);
  }

  // --- complete_search ---

  #[test]
  fn success_replaces_results_and_location() {
    let mut session = SearchSession::new(Location::default());
    session.form.query = "cat".into();
    let pending = session.begin_search(&Overrides::page(2));
    let outcome = session.complete_search(pending, Ok(response(&["1", "2"], 5)));

    assert!(matches!(outcome, SearchOutcome::Applied { count: 2, total_pages: 5 }));
    assert_eq!(session.current_page(), 2);
    assert_eq!(session.total_pages(), 5);
    assert_eq!(session.location().query_string(), "query=cat&page=2&size=100");
  }

  #[test]
  fn next_search_reads_paging_from_location() {
    let mut session = SearchSession::new(Location::default());
    let pending = session.begin_search(&Overrides { size: Some(20), ..Overrides::page(4) });
    session.complete_search(pending, Ok(response(&["1"], 9)));
    let pending = session.begin_search(&Overrides::default());
    assert_eq!((pending.payload.page, pending.payload.size), (4, 20));
  }

  #[test]
  fn results_replaced_wholesale() {
    let mut session = SearchSession::new(Location::default());
    let pending = session.begin_search(&Overrides::page(1));
    session.complete_search(pending, Ok(response(&["1", "2", "3"], 1)));
    let pending = session.begin_search(&Overrides::page(1));
    session.complete_search(pending, Ok(response(&["9"], 1)));
    assert_eq!(session.results().len(), 1);
    assert_eq!(session.results()[0].id, FrameId::new("9"));
  }

  #[test]
  fn failure_preserves_results_and_location() {
    let mut session = SearchSession::new(Location::default());
    session.form.query = "dog".into();
    let pending = session.begin_search(&Overrides::page(1));
    session.complete_search(pending, Ok(response(&["1", "2"], 3)));
    let before_results = session.results().to_vec();
    let before_location = session.location().query_string();

    session.form.query = "cat".into();
    let pending = session.begin_search(&Overrides::page(2));
    let outcome = session.complete_search(pending, Err(server_error()));

    assert!(matches!(outcome, SearchOutcome::Failed(ApiError::Status { .. })));
    assert_eq!(session.results(), before_results.as_slice());
    assert_eq!(session.location().query_string(), before_location);
    assert_eq!(session.current_page(), 1);
  }

  #[test]
  fn out_of_order_completion_keeps_latest() {
    let mut session = SearchSession::new(Location::default());
    let older = session.begin_search(&Overrides::page(1));
    let newer = session.begin_search(&Overrides::page(2));

    let outcome = session.complete_search(newer, Ok(response(&["new"], 2)));
    assert!(matches!(outcome, SearchOutcome::Applied { .. }));
    let outcome = session.complete_search(older, Ok(response(&["old"], 9)));
    assert!(matches!(outcome, SearchOutcome::Stale));

    assert_eq!(session.results()[0].id, FrameId::new("new"));
    assert_eq!(session.current_page(), 2);
  }

  // --- ratings ---

  #[test]
  fn ratings_overwrite_and_survive_searches() {
    let mut session = SearchSession::new(Location::default());
    let id = FrameId::new("4");
    assert_eq!(session.rate(id.clone(), Rating::Positive), None);
    assert_eq!(session.rate(id.clone(), Rating::Negative), Some(Rating::Positive));

    let pending = session.begin_search(&Overrides::page(1));
    session.complete_search(pending, Ok(response(&["5"], 1)));
    assert_eq!(session.rating(&id), Some(Rating::Negative));
  }

  // --- reset_form ---

  #[test]
  fn reset_leaves_one_empty_row() {
    let mut session = SearchSession::new(Location::parse("query=x&obj_filters=a:eq:1,b:lt:2"));
    session.reset_form();
    assert_eq!(session.form, QueryForm::new());
  }
}
