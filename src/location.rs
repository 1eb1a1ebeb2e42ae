//! Location string codec: the shareable query string that mirrors the last
//! submitted search.
//!
//! Encoding writes only the fields that were present in the payload, so an
//! explicitly empty field does not survive a round trip. Decoding restores
//! the form, including the packed `obj_filters` rows.

use crate::query::{FilterRow, QueryForm, SearchPayload, TextField};

/// Parsed query parameters, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
  params: Vec<(String, String)>,
}

/// Decode one form-urlencoded component; `+` is a space.
fn decode_component(raw: &str) -> String {
  let spaced = raw.replace('+', " ");
  urlencoding::decode(&spaced).map(|s| s.into_owned()).unwrap_or(spaced)
}

impl Location {
  /// Parse a full URL, a `?query` suffix, or a bare query string.
  pub fn parse(input: &str) -> Self {
    let qs = match input.split_once('?') {
      Some((_, rest)) => rest,
      None if input.contains("://") => "",
      None => input,
    };
    let qs = qs.split_once('#').map_or(qs, |(q, _)| q);
    let params = qs
      .split('&')
      .filter(|pair| !pair.is_empty())
      .map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        (decode_component(k), decode_component(v))
      })
      .collect();
    Self { params }
  }

  /// First value of `name`, if set.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
  }

  /// Replace `name` in place, or append it.
  pub fn set(&mut self, name: &str, value: impl Into<String>) {
    let value = value.into();
    match self.params.iter_mut().find(|(k, _)| k == name) {
      Some(slot) => slot.1 = value,
      None => self.params.push((name.to_string(), value)),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.params.is_empty()
  }

  pub fn query_string(&self) -> String {
    self
      .params
      .iter()
      .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
      .collect::<Vec<_>>()
      .join("&")
  }

  /// Full shareable URL under `base_url`.
  pub fn to_url(&self, base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if self.is_empty() { format!("{}{}", base, path) } else { format!("{}{}?{}", base, path, self.query_string()) }
  }
}

/// Serialize a submitted payload into its location.
pub fn encode(payload: &SearchPayload) -> Location {
  let mut location = Location::default();
  let texts = [
    ("prev", &payload.prev),
    ("query", &payload.query),
    ("next", &payload.next),
    ("ocr", &payload.ocr),
    ("asr", &payload.asr),
  ];
  for (name, value) in texts {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
      location.set(name, v);
    }
  }
  if !payload.obj_filters.is_empty() {
    let packed = payload
      .obj_filters
      .iter()
      .map(|f| format!("{}:{}:{}", f.name, f.cmp.label(), f.count))
      .collect::<Vec<_>>()
      .join(",");
    location.set("obj_filters", packed);
  }
  let tokens = payload.identifiers().to_tokens();
  if !tokens.is_empty() {
    location.set(TextField::IncludeIds.param(), tokens);
  }
  location.set("page", payload.page.to_string());
  location.set("size", payload.size.to_string());
  location
}

/// Split `person:gte:2,car:eq:1` into editable rows.
fn unpack_filters(packed: &str) -> Vec<FilterRow> {
  packed
    .split(',')
    .map(|tok| {
      let mut parts = tok.split(':');
      let name = parts.next().unwrap_or("");
      let cmp = parts.next().filter(|c| !c.is_empty()).unwrap_or("eq");
      let count = parts.next().unwrap_or("");
      FilterRow::new(name, cmp, count)
    })
    .collect()
}

/// Restore the search form from a location. Without packed filters the form
/// gets one empty row to edit.
pub fn decode(location: &Location) -> QueryForm {
  let mut form = QueryForm::default();
  for field in TextField::ALL {
    if let Some(v) = location.get(field.param()).filter(|v| !v.is_empty()) {
      *form.text_mut(field) = v.to_string();
    }
  }
  form.filters = match location.get("obj_filters").filter(|v| !v.is_empty()) {
    Some(packed) => unpack_filters(packed),
    None => vec![FilterRow::default()],
  };
  form
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::query::{Comparator, ObjectFilter, Overrides, build_payload};

  fn payload_with(query: &str, filters: Vec<ObjectFilter>, page: u32) -> SearchPayload {
    let mut form = QueryForm::new();
    form.query = query.to_string();
    let mut payload = build_payload(&form, &Location::default(), &Overrides::page(page));
    payload.obj_filters = filters;
    payload
  }

  // --- parse ---

  #[test]
  fn parse_full_url_and_bare_query() {
    let a = Location::parse("http://host:8000/keyframe/?query=cat&page=3");
    let b = Location::parse("query=cat&page=3");
    let c = Location::parse("?query=cat&page=3");
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a.get("page"), Some("3"));
  }

  #[test]
  fn parse_decodes_plus_and_percent() {
    let loc = Location::parse("query=red+car%2C%20night&ocr=caf%C3%A9");
    assert_eq!(loc.get("query"), Some("red car, night"));
    assert_eq!(loc.get("ocr"), Some("café"));
  }

  #[test]
  fn parse_url_without_query() {
    assert!(Location::parse("http://host/keyframe/").is_empty());
    assert!(Location::parse("").is_empty());
  }

  // --- encode ---

  #[test]
  fn encode_omits_absent_fields_and_always_sets_paging() {
    let loc = encode(&payload_with("", Vec::new(), 1));
    assert_eq!(loc.query_string(), "page=1&size=100");
  }

  #[test]
  fn encode_packs_filters_and_identifiers() {
    let mut payload = payload_with("cat", vec![ObjectFilter { name: "person".into(), cmp: Comparator::Gte, count: 2 }], 3);
    payload.group_nums = vec![21, 7];
    payload.video_nums = vec![9, -1];
    let loc = encode(&payload);
    assert_eq!(loc.get("obj_filters"), Some("person:gte:2"));
    assert_eq!(loc.get("include_ids"), Some("21/9,7"));
    assert_eq!(loc.query_string(), "query=cat&obj_filters=person%3Agte%3A2&include_ids=21%2F9%2C7&page=3&size=100");
  }

  // --- round trip ---

  #[test]
  fn round_trip_restores_text_filter_and_paging() {
    let payload = payload_with("cat", vec![ObjectFilter { name: "person".into(), cmp: Comparator::Gte, count: 2 }], 3);
    let shared = encode(&payload).to_url("http://localhost:8000", "/keyframe/");
    let restored = Location::parse(&shared);
    let form = decode(&restored);

    assert_eq!(form.query, "cat");
    assert_eq!(form.filters, vec![FilterRow::new("person", "gte", "2")]);
    let rebuilt = build_payload(&form, &restored, &Overrides::default());
    assert_eq!((rebuilt.page, rebuilt.size), (3, 100));
    assert_eq!(rebuilt.obj_filters, payload.obj_filters);
  }

  #[test]
  fn round_trip_identifiers() {
    let mut form = QueryForm::new();
    form.include_ids = "21/9, L21, 7".into();
    let payload = build_payload(&form, &Location::default(), &Overrides::default());
    let restored = decode(&Location::parse(&encode(&payload).query_string()));
    assert_eq!(restored.include_ids, "21/9,7");
  }

  // --- decode ---

  #[test]
  fn decode_without_filters_gives_one_empty_row() {
    let form = decode(&Location::parse("query=dog"));
    assert_eq!(form.filters, vec![FilterRow::default()]);
  }

  #[test]
  fn decode_partial_filter_tokens() {
    let form = decode(&Location::parse("obj_filters=person,car:lt"));
    assert_eq!(form.filters, vec![FilterRow::new("person", "eq", ""), FilterRow::new("car", "lt", "")]);
  }
}
