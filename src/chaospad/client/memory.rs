use super::{ApiClient, Method};
use crate::endpoints::DEFAULT_API_BASE;
use crate::error::{ChaospadError, Result};
use crate::model::{Pad, Page, SimpleStatus};
use crate::query::FilterQuery;
use crate::state::LoadingFlag;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::VecDeque;
use uuid::Uuid;

/// The backend truncates pad content to this many characters.
pub const MAX_CONTENT_CHARS: usize = 6000;
const ID_LEN: usize = 22;

/// A request as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// State of the observed loading flag when the request arrived, if one is
    /// being observed.
    pub loading: Option<bool>,
}

/// In-memory emulation of the pads routes, for testing and development.
/// Does NOT persist data.
#[derive(Debug)]
pub struct InMemoryBackend {
    api_base: String,
    pads: Vec<Pad>,
    requests: Vec<RecordedRequest>,
    failures: VecDeque<(Option<Method>, ChaospadError)>,
    loading: Option<LoadingFlag>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            pads: Vec::new(),
            requests: Vec::new(),
            failures: VecDeque::new(),
            loading: None,
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_pads(mut self, pads: impl IntoIterator<Item = Pad>) -> Self {
        self.pads.extend(pads);
        self
    }

    pub fn insert(&mut self, pad: Pad) {
        self.pads.push(pad);
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }

    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }

    pub fn count(&self, method: Method) -> usize {
        self.requests.iter().filter(|r| r.method == method).count()
    }

    /// Fail the next request with `error` instead of serving it. Queued
    /// failures are consumed in order.
    pub fn fail_next(&mut self, error: ChaospadError) {
        self.failures.push_back((None, error));
    }

    /// Like [`fail_next`](Self::fail_next), but only the next request with
    /// `method` fails; other requests pass through.
    pub fn fail_next_on(&mut self, method: Method, error: ChaospadError) {
        self.failures.push_back((Some(method), error));
    }

    fn take_failure(&mut self, method: Method) -> Option<ChaospadError> {
        let index = self
            .failures
            .iter()
            .position(|(on, _)| on.is_none_or(|on| on == method))?;
        self.failures.remove(index).map(|(_, error)| error)
    }

    /// Record the value of `flag` on every incoming request.
    pub fn observe_loading(&mut self, flag: LoadingFlag) {
        self.loading = Some(flag);
    }

    fn list(&self, query: &FilterQuery) -> Result<Value> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&Pad> = self
            .pads
            .iter()
            .filter(|pad| match &needle {
                Some(needle) => {
                    pad.name.to_lowercase().contains(needle)
                        || pad
                            .content
                            .as_deref()
                            .is_some_and(|c| c.to_lowercase().contains(needle))
                }
                None => true,
            })
            .collect();

        matches.sort_by(|a, b| {
            let ord = compare_field(a, b, &query.sort_by);
            if query.descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let total = matches.len();
        let data = matches
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        Ok(serde_json::to_value(Page { data, total })?)
    }

    fn get(&self, id: &str) -> Result<Value> {
        let pad = self
            .pads
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(not_found)?;
        Ok(serde_json::to_value(pad)?)
    }

    fn create(&mut self, body: Option<&Value>) -> Result<Value> {
        let fields = PadFields::from_body(body)?;
        let id: String = Uuid::new_v4().simple().to_string().chars().take(ID_LEN).collect();
        let mut pad = Pad::new(id, fields.name, String::new());
        pad.content = fields.content;
        pad.extra = fields.extra;
        let value = serde_json::to_value(&pad)?;
        self.pads.push(pad);
        Ok(value)
    }

    fn update(&mut self, id: &str, body: Option<&Value>) -> Result<Value> {
        let fields = PadFields::from_body(body)?;
        let pad = self
            .pads
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(not_found)?;
        pad.name = fields.name;
        pad.content = fields.content;
        pad.extra = fields.extra;
        pad.updated_at = Utc::now();
        Ok(serde_json::to_value(&*pad)?)
    }

    fn delete(&mut self, id: &str) -> Result<Value> {
        // The backend deletes by filter, so an unknown id still succeeds.
        self.pads.retain(|p| p.id != id);
        Ok(serde_json::to_value(SimpleStatus {
            success: true,
            message: "Pads Deleted".to_string(),
        })?)
    }
}

impl ApiClient for InMemoryBackend {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        self.requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
            loading: self.loading.as_ref().map(LoadingFlag::is_loading),
        });

        if let Some(error) = self.take_failure(method) {
            return Err(error);
        }

        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let collection = format!("{}/pads", self.api_base);
        let Some(rest) = route.strip_prefix(collection.as_str()) else {
            return Err(ChaospadError::api(404, "Not Found"));
        };
        let id = rest
            .strip_prefix('/')
            .filter(|id| !id.is_empty() && !id.contains('/'));

        match (method, rest, id) {
            (Method::Get, "/paginated", _) => self.list(&FilterQuery::parse(query)),
            (Method::Post, "", _) => self.create(body),
            (Method::Get, _, Some(id)) => self.get(id),
            (Method::Put, _, Some(id)) => self.update(id, body),
            (Method::Delete, _, Some(id)) => self.delete(id),
            _ => Err(ChaospadError::api(405, "Method Not Allowed")),
        }
    }
}

fn not_found() -> ChaospadError {
    ChaospadError::api(404, "Pads not found.")
}

fn compare_field(a: &Pad, b: &Pad, field: &str) -> Ordering {
    match field {
        "name" => a.name.cmp(&b.name),
        "content" => a.content.cmp(&b.content),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => Ordering::Equal,
    }
}

/// The writable subset of a pad, as the create/update routes accept it.
struct PadFields {
    name: String,
    content: Option<String>,
    extra: Map<String, Value>,
}

impl PadFields {
    fn from_body(body: Option<&Value>) -> Result<Self> {
        let body = body.ok_or_else(|| ChaospadError::api(422, "body: field required"))?;
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ChaospadError::api(422, "name: field required"))?
            .to_string();
        let content = body
            .get("content")
            .and_then(Value::as_str)
            .map(|c| c.chars().take(MAX_CONTENT_CHARS).collect());
        let extra = match body.get("extra") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        Ok(Self {
            name,
            content,
            extra,
        })
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// `count` pads named "Pad 1".."Pad N", one hour apart, newest last.
    pub fn numbered_pads(count: usize) -> Vec<Pad> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (1..=count)
            .map(|i| {
                let mut pad = Pad::new(
                    format!("p{i}"),
                    format!("Pad {i}"),
                    format!("Content for pad {i}"),
                );
                let at = start + Duration::hours(i as i64);
                pad.updated_at = at;
                pad.created_at = Some(at);
                pad
            })
            .collect()
    }

    pub fn backend_with(count: usize) -> InMemoryBackend {
        InMemoryBackend::new().with_pads(numbered_pads(count))
    }
}
