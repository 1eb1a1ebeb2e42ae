//! Search request construction: identifier tokens, object filter rows and
//! the unified search payload.
//!
//! Everything here is pure. Malformed user input is dropped or coerced,
//! never reported: a bad identifier token contributes nothing, a bad filter
//! count becomes `0`.

use serde::{Deserialize, Serialize, Serializer};

use crate::constants::constants;
use crate::location::Location;

// --- Identifiers ---

/// Opaque keyframe identifier.
///
/// The backend sends numeric ids in search results and string ids in
/// neighbor listings; both compare by their text. An id goes back over the
/// wire in the JSON form it arrived in.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawFrameId")]
pub struct FrameId {
  text: String,
  numeric: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrameId {
  Num(i64),
  Str(String),
}

impl From<RawFrameId> for FrameId {
  fn from(raw: RawFrameId) -> Self {
    match raw {
      RawFrameId::Num(n) => FrameId::number(n),
      RawFrameId::Str(s) => FrameId::new(s),
    }
  }
}

impl FrameId {
  /// A string id.
  pub fn new(id: impl Into<String>) -> Self {
    FrameId { text: id.into(), numeric: false }
  }

  pub fn number(id: i64) -> Self {
    FrameId { text: id.to_string(), numeric: true }
  }

  pub fn as_str(&self) -> &str {
    &self.text
  }
}

impl PartialEq for FrameId {
  fn eq(&self, other: &Self) -> bool {
    self.text == other.text
  }
}

impl Eq for FrameId {}

impl std::hash::Hash for FrameId {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.text.hash(state);
  }
}

impl std::fmt::Display for FrameId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.text)
  }
}

impl Serialize for FrameId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self.text.parse::<i64>() {
      Ok(n) if self.numeric => serializer.serialize_i64(n),
      _ => serializer.serialize_str(&self.text),
    }
  }
}

/// Video number meaning "any video in this group".
pub const ANY_VIDEO: i64 = -1;

/// Parallel group/video number lists parsed from the identifier field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifiers {
  pub group_nums: Vec<i64>,
  pub video_nums: Vec<i64>,
}

impl Identifiers {
  fn push(&mut self, group: i64, video: i64) {
    self.group_nums.push(group);
    self.video_nums.push(video);
  }

  /// Re-join the pairs into the comma-separated token form (`21/9,7`).
  pub fn to_tokens(&self) -> String {
    self
      .group_nums
      .iter()
      .zip(&self.video_nums)
      .map(|(g, v)| if *v == ANY_VIDEO { g.to_string() } else { format!("{}/{}", g, v) })
      .collect::<Vec<_>>()
      .join(",")
  }
}

/// Parse a comma-separated identifier string (`"21/9, 7"`) into group/video pairs.
///
/// `g/v` tokens need both halves to be integers; anything else must be a
/// single integer and yields `(g, ANY_VIDEO)`. Tokens that fail either form
/// are dropped. `"L21"` is not an integer and is dropped too, and so are
/// numeric prefixes like `"21abc"` and tokens with a second `/`.
pub fn parse_identifiers(raw: &str) -> Identifiers {
  let mut ids = Identifiers::default();
  for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
    if let Some((group, video)) = token.split_once('/') {
      if let (Ok(g), Ok(v)) = (group.trim().parse::<i64>(), video.trim().parse::<i64>()) {
        ids.push(g, v);
      }
    } else if let Ok(g) = token.parse::<i64>() {
      ids.push(g, ANY_VIDEO);
    }
  }
  ids
}

// --- Object filters ---

/// Count comparison applied to one detected object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
  #[default]
  Eq,
  Gte,
  Gt,
  Lte,
  Lt,
}

impl Comparator {
  pub const ALL: [Comparator; 5] = [Comparator::Eq, Comparator::Gte, Comparator::Gt, Comparator::Lte, Comparator::Lt];

  /// Wire name, also used in the packed `obj_filters` location parameter.
  pub fn label(self) -> &'static str {
    match self {
      Comparator::Eq => "eq",
      Comparator::Gte => "gte",
      Comparator::Gt => "gt",
      Comparator::Lte => "lte",
      Comparator::Lt => "lt",
    }
  }

  pub fn symbol(self) -> &'static str {
    match self {
      Comparator::Eq => "=",
      Comparator::Gte => "≥",
      Comparator::Gt => ">",
      Comparator::Lte => "≤",
      Comparator::Lt => "<",
    }
  }

  /// Unrecognized labels fall back to `Eq`.
  pub fn from_label(s: &str) -> Self {
    match s.trim() {
      "gte" => Comparator::Gte,
      "gt" => Comparator::Gt,
      "lte" => Comparator::Lte,
      "lt" => Comparator::Lt,
      _ => Comparator::Eq,
    }
  }

  pub fn next(self) -> Self {
    let idx = Comparator::ALL.iter().position(|c| *c == self).unwrap_or(0);
    Comparator::ALL[(idx + 1) % Comparator::ALL.len()]
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFilter {
  pub name: String,
  pub cmp: Comparator,
  pub count: u32,
}

/// One editable filter row, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRow {
  pub name: String,
  pub cmp: String,
  pub count: String,
}

impl FilterRow {
  pub fn new(name: &str, cmp: &str, count: &str) -> Self {
    Self { name: name.to_string(), cmp: cmp.to_string(), count: count.to_string() }
  }

  pub fn comparator(&self) -> Comparator {
    Comparator::from_label(&self.cmp)
  }

  pub fn cycle_comparator(&mut self) {
    self.cmp = self.comparator().next().label().to_string();
  }
}

/// Collect the rows that carry both a name and a count into filters, in row order.
pub fn collect_filters(rows: &[FilterRow]) -> Vec<ObjectFilter> {
  rows
    .iter()
    .filter_map(|row| {
      let name = row.name.trim();
      if name.is_empty() || row.count.is_empty() {
        return None;
      }
      let count = row.count.trim().parse::<i64>().unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
      Some(ObjectFilter { name: name.to_string(), cmp: row.comparator(), count })
    })
    .collect()
}

// --- Form ---

/// The free-text fields of the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
  Prev,
  Query,
  Next,
  Ocr,
  Asr,
  IncludeIds,
}

impl TextField {
  pub const ALL: [TextField; 6] =
    [TextField::Query, TextField::Prev, TextField::Next, TextField::Ocr, TextField::Asr, TextField::IncludeIds];

  /// Location query parameter carrying this field.
  pub fn param(self) -> &'static str {
    match self {
      TextField::Prev => "prev",
      TextField::Query => "query",
      TextField::Next => "next",
      TextField::Ocr => "ocr",
      TextField::Asr => "asr",
      TextField::IncludeIds => "include_ids",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      TextField::Prev => "Previous",
      TextField::Query => "Query",
      TextField::Next => "Next",
      TextField::Ocr => "OCR",
      TextField::Asr => "ASR",
      TextField::IncludeIds => "Groups/Videos",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryForm {
  pub prev: String,
  pub query: String,
  pub next: String,
  pub ocr: String,
  pub asr: String,
  pub include_ids: String,
  pub filters: Vec<FilterRow>,
}

impl QueryForm {
  /// Blank form with the single empty filter row users start editing from.
  pub fn new() -> Self {
    Self { filters: vec![FilterRow::default()], ..Self::default() }
  }

  pub fn reset(&mut self) {
    *self = Self::new();
  }

  pub fn text(&self, field: TextField) -> &str {
    match field {
      TextField::Prev => &self.prev,
      TextField::Query => &self.query,
      TextField::Next => &self.next,
      TextField::Ocr => &self.ocr,
      TextField::Asr => &self.asr,
      TextField::IncludeIds => &self.include_ids,
    }
  }

  pub fn text_mut(&mut self, field: TextField) -> &mut String {
    match field {
      TextField::Prev => &mut self.prev,
      TextField::Query => &mut self.query,
      TextField::Next => &mut self.next,
      TextField::Ocr => &mut self.ocr,
      TextField::Asr => &mut self.asr,
      TextField::IncludeIds => &mut self.include_ids,
    }
  }
}

// --- Payload ---

/// Body of `POST /keyframe/search`. Field names are the backend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPayload {
  pub page: u32,
  pub size: u32,
  pub prev: Option<String>,
  pub query: Option<String>,
  pub next: Option<String>,
  pub ocr: Option<String>,
  pub asr: Option<String>,
  pub obj_filters: Vec<ObjectFilter>,
  pub group_nums: Vec<i64>,
  pub video_nums: Vec<i64>,
  pub exclude_ids: Vec<FrameId>,
}

impl SearchPayload {
  pub fn identifiers(&self) -> Identifiers {
    Identifiers { group_nums: self.group_nums.clone(), video_nums: self.video_nums.clone() }
  }
}

/// Values that take precedence over the ones computed from form and location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
  pub page: Option<u32>,
  pub size: Option<u32>,
  pub exclude_ids: Option<Vec<FrameId>>,
}

impl Overrides {
  pub fn page(page: u32) -> Self {
    Self { page: Some(page), ..Self::default() }
  }
}

/// Parse a positive integer, falling back to `default` when missing, zero or non-numeric.
fn positive_or(raw: Option<&str>, default: u32) -> u32 {
  raw.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0).unwrap_or(default)
}

/// Blank fields are absent, not empty strings.
fn present(s: &str) -> Option<String> {
  if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Assemble the search request from the form, the paging held in the current
/// location, and caller overrides.
pub fn build_payload(form: &QueryForm, location: &Location, overrides: &Overrides) -> SearchPayload {
  let c = constants();
  let ids = parse_identifiers(&form.include_ids);
  let page = positive_or(location.get("page"), c.default_page);
  let size = positive_or(location.get("size"), c.default_page_size);

  SearchPayload {
    page: overrides.page.filter(|p| *p > 0).unwrap_or(page),
    size: overrides.size.filter(|s| *s > 0).unwrap_or(size),
    prev: present(&form.prev),
    query: present(&form.query),
    next: present(&form.next),
    ocr: present(&form.ocr),
    asr: present(&form.asr),
    obj_filters: collect_filters(&form.filters),
    group_nums: ids.group_nums,
    video_nums: ids.video_nums,
    exclude_ids: overrides.exclude_ids.clone().unwrap_or_default(),
  }
}
